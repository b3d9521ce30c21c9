//! Input model handed over by the capture and token/report collaborators
//!
//! All types deserialize from the collaborators' camelCase JSON. Style values
//! stay as raw CSS strings; the helpers on [`StyleNode`] parse the few
//! properties the encoders need and return `None` for anything unusable.

use serde::{Deserialize, Serialize};
use stylevec_core::{BoundingBox, Error, Result};

/// Viewport of the capture, in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Area in px², 0 for degenerate viewports
    pub fn area(&self) -> f64 {
        if self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0 {
            self.width * self.height
        } else {
            0.0
        }
    }
}

/// Subset of computed styles captured per element
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StyleSubset {
    pub color: Option<String>,
    pub background_color: Option<String>,
    pub background_image: Option<String>,
    pub font_size: Option<String>,
    pub font_weight: Option<String>,
    pub padding: Option<String>,
    pub border_width: Option<String>,
    pub border_style: Option<String>,
    pub box_shadow: Option<String>,
    pub border_radius: Option<String>,
}

/// One visible element from a page capture
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleNode {
    pub id: String,
    pub tag: String,
    pub bbox: BoundingBox,
    #[serde(default)]
    pub styles: StyleSubset,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, rename = "class", skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    #[serde(default, alias = "textContent", skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

const IMAGE_TAGS: [&str; 5] = ["img", "picture", "video", "svg", "canvas"];

impl StyleNode {
    pub fn new(id: impl Into<String>, tag: impl Into<String>, bbox: BoundingBox) -> Self {
        Self {
            id: id.into(),
            tag: tag.into(),
            bbox,
            styles: StyleSubset::default(),
            role: None,
            class_name: None,
            text: None,
        }
    }

    pub fn has_text(&self) -> bool {
        self.text.as_deref().is_some_and(|t| !t.trim().is_empty())
    }

    /// Media elements and elements painted with a background image
    pub fn is_image(&self) -> bool {
        let tag = self.tag.to_ascii_lowercase();
        IMAGE_TAGS.contains(&tag.as_str())
            || self
                .styles
                .background_image
                .as_deref()
                .is_some_and(|bg| bg.contains("url("))
    }

    pub fn font_size_px(&self) -> Option<f64> {
        self.styles.font_size.as_deref().and_then(parse_px)
    }

    /// Numeric font weight; keywords `normal` and `bold` map to 400 and 700
    pub fn font_weight(&self) -> Option<f64> {
        let raw = self.styles.font_weight.as_deref()?.trim();
        match raw.to_ascii_lowercase().as_str() {
            "normal" => Some(400.0),
            "bold" => Some(700.0),
            other => other
                .parse::<f64>()
                .ok()
                .filter(|w| w.is_finite() && *w > 0.0),
        }
    }

    /// Positive padding lengths from the `padding` shorthand
    pub fn padding_values(&self) -> Vec<f64> {
        self.styles
            .padding
            .as_deref()
            .map(|p| {
                p.split_whitespace()
                    .filter_map(parse_px)
                    .filter(|v| *v > 0.0)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Border width in px when the border is actually drawn
    pub fn visible_border_px(&self) -> Option<f64> {
        let style = self.styles.border_style.as_deref().unwrap_or("solid").trim();
        if style.is_empty() || style.starts_with("none") || style.starts_with("hidden") {
            return None;
        }
        let width = self
            .styles
            .border_width
            .as_deref()?
            .split_whitespace()
            .filter_map(parse_px)
            .fold(0.0_f64, f64::max);
        (width > 0.0).then_some(width)
    }

    /// Largest blur radius across `box-shadow` layers; `None` without a shadow
    pub fn shadow_blur_px(&self) -> Option<f64> {
        parse_shadow_blur(self.styles.box_shadow.as_deref()?)
    }
}

/// Parse a CSS length into px. Unitless numbers are px; `rem`/`em` assume a
/// 16px root.
pub fn parse_px(value: &str) -> Option<f64> {
    let v = value.trim().trim_end_matches(',');
    let (number, scale) = if let Some(n) = v.strip_suffix("px") {
        (n, 1.0)
    } else if let Some(n) = v.strip_suffix("rem") {
        (n, 16.0)
    } else if let Some(n) = v.strip_suffix("em") {
        (n, 16.0)
    } else {
        (v, 1.0)
    };
    let parsed: f64 = number.trim().parse().ok()?;
    parsed.is_finite().then_some(parsed * scale)
}

/// Split on commas that are not inside parentheses
fn split_top_level(value: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, ch) in value.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&value[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&value[start..]);
    parts
}

fn parse_shadow_blur(shadow: &str) -> Option<f64> {
    let shadow = shadow.trim();
    if shadow.is_empty() || shadow.eq_ignore_ascii_case("none") {
        return None;
    }

    let mut found = false;
    let mut max_blur = 0.0_f64;
    for layer in split_top_level(shadow) {
        // Drop color functions so their numbers are not read as lengths
        let mut cleaned = String::with_capacity(layer.len());
        let mut depth = 0usize;
        for ch in layer.chars() {
            match ch {
                '(' => depth += 1,
                ')' => depth = depth.saturating_sub(1),
                _ if depth == 0 => cleaned.push(ch),
                _ => {}
            }
        }
        let lengths: Vec<f64> = cleaned.split_whitespace().filter_map(parse_px).collect();
        if lengths.len() >= 2 {
            found = true;
            max_blur = max_blur.max(lengths.get(2).copied().unwrap_or(0.0).max(0.0));
        }
    }

    found.then_some(max_blur)
}

/// Semantic color roles resolved by the token collaborator
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SemanticColors {
    pub background: Option<String>,
    pub text: Option<String>,
    pub cta: Option<String>,
}

/// Color tokens grouped by role
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ColorTokens {
    /// Generic primary pool, used only when both brand pools are empty
    pub primary: Vec<String>,
    pub brand_vibrant: Vec<String>,
    pub brand_muted: Vec<String>,
    pub neutral: Vec<String>,
    pub semantic: SemanticColors,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TypographyTokens {
    pub font_families: Vec<String>,
    /// Font sizes in px
    pub font_sizes: Vec<f64>,
    pub font_weights: Vec<f64>,
    /// Unitless line-height multipliers
    pub line_heights: Vec<f64>,
}

/// A button style variant (primary, secondary, ghost...)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ButtonVariant {
    pub variant: String,
    pub background: Option<String>,
    pub color: Option<String>,
    pub border_radius: Option<f64>,
    pub padding_x: Option<f64>,
    pub padding_y: Option<f64>,
    pub font_size: Option<f64>,
    pub font_weight: Option<f64>,
    pub border_width: Option<f64>,
    pub box_shadow: Option<String>,
}

impl ButtonVariant {
    pub fn has_shadow(&self) -> bool {
        self.box_shadow.as_deref().and_then(parse_shadow_blur).is_some()
    }

    pub fn has_border(&self) -> bool {
        self.border_width.is_some_and(|w| w.is_finite() && w > 0.0)
    }
}

/// Design-token summary of one capture
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DesignTokens {
    pub colors: ColorTokens,
    pub typography: TypographyTokens,
    /// Spacing scale in px
    pub spacing: Vec<f64>,
    /// Border-radius scale in px
    pub border_radius: Vec<f64>,
    pub buttons: Vec<ButtonVariant>,
}

impl DesignTokens {
    /// The primary call-to-action variant: the one named `primary`, else the
    /// first declared variant
    pub fn primary_button(&self) -> Option<&ButtonVariant> {
        self.buttons
            .iter()
            .find(|b| b.variant.trim().eq_ignore_ascii_case("primary"))
            .or_else(|| self.buttons.first())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BrandCoherence {
    pub overall: Option<f64>,
    pub color_consistency: Option<f64>,
    pub typography_consistency: Option<f64>,
    pub spacing_consistency: Option<f64>,
}

/// Precomputed aggregate scores. Every field is optional on the wire so a
/// missing one can be reported by name instead of failing deserialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StyleReport {
    pub contrast_pass_rate: Option<f64>,
    pub color_harmony_score: Option<f64>,
    pub brand_coherence: Option<BrandCoherence>,
}

/// Aggregate metrics required by the global style vector, validated and
/// scaled to [0, 1]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReportMetrics {
    pub contrast_pass_rate: f64,
    pub color_harmony: f64,
    pub coherence_overall: f64,
    pub coherence_color: f64,
    pub coherence_typography: f64,
    pub coherence_spacing: f64,
}

impl StyleReport {
    /// Required `contrastPassRate`, scaled to [0, 1]
    pub fn require_contrast_pass_rate(&self) -> Result<f64> {
        require_score(self.contrast_pass_rate, "StyleReport.contrastPassRate")
    }

    /// Validate every field the global style vector needs.
    ///
    /// Fails on the first absent field, naming it by its wire path.
    pub fn require_metrics(&self) -> Result<ReportMetrics> {
        let contrast_pass_rate = self.require_contrast_pass_rate()?;
        let color_harmony = require_score(self.color_harmony_score, "StyleReport.colorHarmonyScore")?;
        let coherence = self
            .brand_coherence
            .as_ref()
            .ok_or_else(|| Error::missing("StyleReport.brandCoherence"))?;

        Ok(ReportMetrics {
            contrast_pass_rate,
            color_harmony,
            coherence_overall: require_score(coherence.overall, "StyleReport.brandCoherence.overall")?,
            coherence_color: require_score(
                coherence.color_consistency,
                "StyleReport.brandCoherence.colorConsistency",
            )?,
            coherence_typography: require_score(
                coherence.typography_consistency,
                "StyleReport.brandCoherence.typographyConsistency",
            )?,
            coherence_spacing: require_score(
                coherence.spacing_consistency,
                "StyleReport.brandCoherence.spacingConsistency",
            )?,
        })
    }
}

/// Scores arrive either as fractions or as percentages; values above 1 are
/// read as percent.
fn require_score(value: Option<f64>, field: &str) -> Result<f64> {
    match value {
        Some(v) if v.is_finite() => {
            let unit = if v > 1.0 { v / 100.0 } else { v };
            Ok(unit.clamp(0.0, 1.0))
        }
        _ => Err(Error::missing(field)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn node_with(styles: StyleSubset) -> StyleNode {
        let mut node = StyleNode::new("n1", "div", BoundingBox::new(0, 0, 10, 10));
        node.styles = styles;
        node
    }

    #[test]
    fn test_parse_px() {
        assert_eq!(parse_px("16px"), Some(16.0));
        assert_eq!(parse_px(" 1.5rem "), Some(24.0));
        assert_eq!(parse_px("0"), Some(0.0));
        assert_eq!(parse_px("auto"), None);
    }

    #[test]
    fn test_node_deserializes_capture_json() {
        let node: StyleNode = serde_json::from_value(json!({
            "id": "hero-title",
            "tag": "h1",
            "bbox": {"x": 10, "y": 20, "w": 600, "h": 80},
            "styles": {"fontSize": "48px", "fontWeight": "bold", "backgroundColor": "rgba(0, 0, 0, 0)"},
            "textContent": "Payments infrastructure"
        }))
        .unwrap();

        assert_eq!(node.bbox.w, 600);
        assert_eq!(node.font_size_px(), Some(48.0));
        assert_eq!(node.font_weight(), Some(700.0));
        assert!(node.has_text());
        assert!(!node.is_image());
    }

    #[test]
    fn test_padding_and_border() {
        let node = node_with(StyleSubset {
            padding: Some("12px 24px 0px 24px".into()),
            border_width: Some("2px".into()),
            border_style: Some("solid".into()),
            ..Default::default()
        });
        assert_eq!(node.padding_values(), vec![12.0, 24.0, 24.0]);
        assert_eq!(node.visible_border_px(), Some(2.0));

        let hidden = node_with(StyleSubset {
            border_width: Some("3px".into()),
            border_style: Some("none".into()),
            ..Default::default()
        });
        assert_eq!(hidden.visible_border_px(), None);
    }

    #[test]
    fn test_shadow_blur() {
        let node = node_with(StyleSubset {
            box_shadow: Some("rgba(0, 0, 0, 0.1) 0px 4px 12px 0px, rgba(0, 0, 0, 0.2) 0px 1px 3px".into()),
            ..Default::default()
        });
        assert_eq!(node.shadow_blur_px(), Some(12.0));

        let none = node_with(StyleSubset {
            box_shadow: Some("none".into()),
            ..Default::default()
        });
        assert_eq!(none.shadow_blur_px(), None);
    }

    #[test]
    fn test_image_detection() {
        let img = StyleNode::new("i", "IMG", BoundingBox::new(0, 0, 10, 10));
        assert!(img.is_image());

        let bg = node_with(StyleSubset {
            background_image: Some("url(\"hero.png\")".into()),
            ..Default::default()
        });
        assert!(bg.is_image());

        let gradient = node_with(StyleSubset {
            background_image: Some("none".into()),
            ..Default::default()
        });
        assert!(!gradient.is_image());
    }

    #[test]
    fn test_require_metrics_names_missing_field() {
        let report: StyleReport = serde_json::from_value(json!({
            "contrastPassRate": 0.92,
            "brandCoherence": {
                "overall": 0.8, "colorConsistency": 0.7,
                "typographyConsistency": 0.9, "spacingConsistency": 0.6
            }
        }))
        .unwrap();

        let err = report.require_metrics().unwrap_err();
        assert!(
            matches!(err, Error::MissingRequiredData { ref field } if field == "StyleReport.colorHarmonyScore"),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn test_require_metrics_scales_percentages() {
        let report = StyleReport {
            contrast_pass_rate: Some(85.0),
            color_harmony_score: Some(0.5),
            brand_coherence: Some(BrandCoherence {
                overall: Some(0.8),
                color_consistency: Some(0.7),
                typography_consistency: Some(0.9),
                spacing_consistency: Some(0.6),
            }),
        };
        let metrics = report.require_metrics().unwrap();
        assert!((metrics.contrast_pass_rate - 0.85).abs() < 1e-12);
        assert_eq!(metrics.color_harmony, 0.5);
    }

    #[test]
    fn test_primary_button_selection() {
        let tokens = DesignTokens {
            buttons: vec![
                ButtonVariant { variant: "secondary".into(), ..Default::default() },
                ButtonVariant { variant: "Primary".into(), ..Default::default() },
            ],
            ..Default::default()
        };
        assert_eq!(tokens.primary_button().unwrap().variant, "Primary");
        assert!(DesignTokens::default().primary_button().is_none());
    }
}
