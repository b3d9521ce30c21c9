//! Encoder configuration
//!
//! Normalization ranges and geometry thresholds were fitted against a set of
//! real captures. They are defaults, not laws: every field can be overridden
//! from JSON and missing fields fall back to the defaults below.

use serde::{Deserialize, Serialize};
use stylevec_core::stats::normalize_linear;
use stylevec_core::{Error, Result};

use crate::dimensions::{DEFAULT_FONT_EMBEDDING_DIM, DEFAULT_VISUAL_EMBEDDING_DIM};

/// Linear `[min, max]` mapping onto [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearRange {
    pub min: f64,
    pub max: f64,
}

impl LinearRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    #[inline]
    pub fn apply(&self, value: f64) -> f64 {
        normalize_linear(value, self.min, self.max)
    }

    fn validate(&self, name: &str) -> Result<()> {
        if !(self.min.is_finite() && self.max.is_finite() && self.max > self.min) {
            return Err(Error::InvalidConfig(format!(
                "{name} must be a finite range with max > min, got [{}, {}]",
                self.min, self.max
            )));
        }
        Ok(())
    }
}

fn check_positive(fields: &[(&str, f64)]) -> Result<()> {
    for (name, value) in fields {
        if !(value.is_finite() && *value > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "{name} must be a positive number, got {value}"
            )));
        }
    }
    Ok(())
}

/// Ranges for the typography, spacing and shape token groups
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenNormalization {
    pub font_family_count: LinearRange,
    /// Smallest declared font size in px
    pub font_size_min: LinearRange,
    /// Largest declared font size in px that maps to 0.5
    pub font_size_max_midpoint: f64,
    pub font_size_ratio: LinearRange,
    pub font_size_steps: LinearRange,
    pub font_weight_steps: LinearRange,
    pub line_height: LinearRange,
    pub spacing_steps: LinearRange,
    pub spacing_median_midpoint: f64,
    pub spacing_max_midpoint: f64,
    /// Spacing values on this grid count as adherent
    pub spacing_grid_px: f64,
    pub radius_median_midpoint: f64,
    /// Pill radii (9999px) clamp to the top of this range
    pub radius_max: LinearRange,
    pub radius_steps: LinearRange,
    pub button_variants: LinearRange,
}

impl Default for TokenNormalization {
    fn default() -> Self {
        Self {
            font_family_count: LinearRange::new(1.0, 4.0),
            font_size_min: LinearRange::new(8.0, 24.0),
            font_size_max_midpoint: 48.0,
            font_size_ratio: LinearRange::new(1.0, 8.0),
            font_size_steps: LinearRange::new(1.0, 12.0),
            font_weight_steps: LinearRange::new(1.0, 6.0),
            line_height: LinearRange::new(1.0, 2.0),
            spacing_steps: LinearRange::new(1.0, 12.0),
            spacing_median_midpoint: 16.0,
            spacing_max_midpoint: 64.0,
            spacing_grid_px: 4.0,
            radius_median_midpoint: 8.0,
            radius_max: LinearRange::new(0.0, 32.0),
            radius_steps: LinearRange::new(0.0, 6.0),
            button_variants: LinearRange::new(0.0, 6.0),
        }
    }
}

impl TokenNormalization {
    pub fn validate(&self) -> Result<()> {
        for (name, range) in [
            ("tokens.font_family_count", self.font_family_count),
            ("tokens.font_size_min", self.font_size_min),
            ("tokens.font_size_ratio", self.font_size_ratio),
            ("tokens.font_size_steps", self.font_size_steps),
            ("tokens.font_weight_steps", self.font_weight_steps),
            ("tokens.line_height", self.line_height),
            ("tokens.spacing_steps", self.spacing_steps),
            ("tokens.radius_max", self.radius_max),
            ("tokens.radius_steps", self.radius_steps),
            ("tokens.button_variants", self.button_variants),
        ] {
            range.validate(name)?;
        }
        check_positive(&[
            ("tokens.font_size_max_midpoint", self.font_size_max_midpoint),
            ("tokens.spacing_median_midpoint", self.spacing_median_midpoint),
            ("tokens.spacing_max_midpoint", self.spacing_max_midpoint),
            ("tokens.spacing_grid_px", self.spacing_grid_px),
            ("tokens.radius_median_midpoint", self.radius_median_midpoint),
        ])
    }
}

/// Ranges for the primary call-to-action vector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CtaNormalization {
    /// WCAG contrast ratio between button background and label
    pub contrast_ratio: LinearRange,
    pub radius: LinearRange,
    pub padding_x: LinearRange,
    pub padding_y: LinearRange,
    pub font_size: LinearRange,
    pub font_weight: LinearRange,
}

impl Default for CtaNormalization {
    fn default() -> Self {
        Self {
            contrast_ratio: LinearRange::new(1.0, 21.0),
            radius: LinearRange::new(0.0, 32.0),
            padding_x: LinearRange::new(0.0, 48.0),
            padding_y: LinearRange::new(0.0, 24.0),
            font_size: LinearRange::new(10.0, 24.0),
            font_weight: LinearRange::new(100.0, 900.0),
        }
    }
}

impl CtaNormalization {
    pub fn validate(&self) -> Result<()> {
        for (name, range) in [
            ("cta.contrast_ratio", self.contrast_ratio),
            ("cta.radius", self.radius),
            ("cta.padding_x", self.padding_x),
            ("cta.padding_y", self.padding_y),
            ("cta.font_size", self.font_size),
            ("cta.font_weight", self.font_weight),
        ] {
            range.validate(name)?;
        }
        Ok(())
    }
}

/// Ranges and midpoints used to map raw measurements into [0, 1]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizationConfig {
    /// Upper bound for the mean pairwise ΔE of the brand palette
    pub palette_avg_distance_max: f64,
    pub palette_min_distance_max: f64,
    pub palette_max_distance_max: f64,
    /// Upper bound for ΔE between semantic roles (background, text, CTA, hero)
    pub semantic_distance_max: f64,
    /// Upper bound for LCh chroma
    pub chroma_max: f64,
    /// Colors closer than this ΔE are the same brand color
    pub palette_duplicate_delta_e: f64,
    /// Value used for a distance when one of its colors is missing
    pub fallback_distance: f64,
    /// Value used for a lightness when its color is missing
    pub fallback_lightness: f64,
    /// Piecewise knots for area-over-viewport density
    pub density_knots: Vec<(f64, f64)>,
    /// Gap in px that maps to a whitespace score of 0.5
    pub whitespace_midpoint: f64,
    pub rhythm_k: f64,
    pub padding_k: f64,
    pub scale_variance_p10: f64,
    pub scale_variance_p90: f64,
    /// Median element area as a viewport fraction that maps to 0.5
    pub median_size_midpoint: f64,
    /// Band count that maps to 0.5
    pub complexity_midpoint: f64,
    pub saturation_chroma_max: f64,
    pub role_distance_max: f64,
    pub border_heaviness_max: f64,
    pub shadow_fraction_max: f64,
    pub shadow_blur_max: f64,
    pub weight_contrast_max: f64,
    /// Distinct rounded text sizes
    pub hierarchy_size_steps: LinearRange,
    /// Largest over smallest text size
    pub hierarchy_size_ratio: LinearRange,
    /// Borders at least this thick count as fully heavy
    pub border_width_max_px: f64,
    pub tokens: TokenNormalization,
    pub cta: CtaNormalization,
}

impl Default for NormalizationConfig {
    fn default() -> Self {
        Self {
            palette_avg_distance_max: 50.0,
            palette_min_distance_max: 30.0,
            palette_max_distance_max: 80.0,
            semantic_distance_max: 100.0,
            chroma_max: 130.0,
            palette_duplicate_delta_e: 0.5,
            fallback_distance: 0.5,
            fallback_lightness: 0.5,
            density_knots: vec![(0.0, 0.0), (0.5, 0.25), (1.5, 0.45), (2.5, 0.85), (5.0, 1.0)],
            whitespace_midpoint: 48.0,
            rhythm_k: 0.7,
            padding_k: 0.7,
            scale_variance_p10: 0.8,
            scale_variance_p90: 6.0,
            median_size_midpoint: 0.02,
            complexity_midpoint: 12.0,
            saturation_chroma_max: 80.0,
            role_distance_max: 100.0,
            border_heaviness_max: 0.5,
            shadow_fraction_max: 0.3,
            shadow_blur_max: 32.0,
            weight_contrast_max: 600.0,
            hierarchy_size_steps: LinearRange::new(1.0, 8.0),
            hierarchy_size_ratio: LinearRange::new(1.0, 4.0),
            border_width_max_px: 4.0,
            tokens: TokenNormalization::default(),
            cta: CtaNormalization::default(),
        }
    }
}

impl NormalizationConfig {
    pub fn validate(&self) -> Result<()> {
        check_positive(&[
            ("palette_avg_distance_max", self.palette_avg_distance_max),
            ("palette_min_distance_max", self.palette_min_distance_max),
            ("palette_max_distance_max", self.palette_max_distance_max),
            ("semantic_distance_max", self.semantic_distance_max),
            ("chroma_max", self.chroma_max),
            ("whitespace_midpoint", self.whitespace_midpoint),
            ("rhythm_k", self.rhythm_k),
            ("padding_k", self.padding_k),
            ("median_size_midpoint", self.median_size_midpoint),
            ("complexity_midpoint", self.complexity_midpoint),
            ("saturation_chroma_max", self.saturation_chroma_max),
            ("role_distance_max", self.role_distance_max),
            ("border_heaviness_max", self.border_heaviness_max),
            ("shadow_fraction_max", self.shadow_fraction_max),
            ("shadow_blur_max", self.shadow_blur_max),
            ("weight_contrast_max", self.weight_contrast_max),
            ("border_width_max_px", self.border_width_max_px),
        ])?;
        self.hierarchy_size_steps.validate("hierarchy_size_steps")?;
        self.hierarchy_size_ratio.validate("hierarchy_size_ratio")?;

        if !(self.palette_duplicate_delta_e.is_finite() && self.palette_duplicate_delta_e >= 0.0) {
            return Err(Error::InvalidConfig(format!(
                "palette_duplicate_delta_e must not be negative, got {}",
                self.palette_duplicate_delta_e
            )));
        }

        for (name, value) in [
            ("fallback_distance", self.fallback_distance),
            ("fallback_lightness", self.fallback_lightness),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::InvalidConfig(format!(
                    "{name} must lie in [0, 1], got {value}"
                )));
            }
        }

        if !(self.scale_variance_p90 > self.scale_variance_p10) {
            return Err(Error::InvalidConfig(format!(
                "scale_variance_p90 ({}) must exceed scale_variance_p10 ({})",
                self.scale_variance_p90, self.scale_variance_p10
            )));
        }

        if self.density_knots.len() < 2 {
            return Err(Error::InvalidConfig(
                "density_knots needs at least two knots".to_string(),
            ));
        }
        if self.density_knots.windows(2).any(|w| !(w[1].0 > w[0].0)) {
            return Err(Error::InvalidConfig(
                "density_knots must be sorted by strictly increasing x".to_string(),
            ));
        }
        if self
            .density_knots
            .iter()
            .any(|(x, y)| !x.is_finite() || !(0.0..=1.0).contains(y))
        {
            return Err(Error::InvalidConfig(
                "density_knots need finite x and y in [0, 1]".to_string(),
            ));
        }

        self.tokens.validate()?;
        self.cta.validate()
    }
}

/// Thresholds for the greedy geometry passes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeometryConfig {
    /// Max distance in px between box tops within one horizontal band
    pub band_y_threshold: i64,
    /// Max center distance in px from a proximity group's seed
    pub proximity_threshold: f64,
    /// Max distance in px between edges on one alignment line
    pub alignment_tolerance: f64,
    /// Min edges for an alignment line to count
    pub min_alignment_cluster: usize,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            band_y_threshold: 24,
            proximity_threshold: 150.0,
            alignment_tolerance: 8.0,
            min_alignment_cluster: 3,
        }
    }
}

impl GeometryConfig {
    pub fn validate(&self) -> Result<()> {
        if self.band_y_threshold < 0 {
            return Err(Error::InvalidConfig(format!(
                "band_y_threshold must not be negative, got {}",
                self.band_y_threshold
            )));
        }
        if !(self.proximity_threshold.is_finite() && self.proximity_threshold > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "proximity_threshold must be positive, got {}",
                self.proximity_threshold
            )));
        }
        if !(self.alignment_tolerance.is_finite() && self.alignment_tolerance >= 0.0) {
            return Err(Error::InvalidConfig(format!(
                "alignment_tolerance must not be negative, got {}",
                self.alignment_tolerance
            )));
        }
        if self.min_alignment_cluster < 2 {
            return Err(Error::InvalidConfig(format!(
                "min_alignment_cluster must be at least 2, got {}",
                self.min_alignment_cluster
            )));
        }
        Ok(())
    }
}

/// Top-level encoder configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderConfig {
    pub normalization: NormalizationConfig,
    pub geometry: GeometryConfig,
    /// Expected length of the font embedding appended to the global vector
    pub font_embedding_dim: usize,
    /// Expected length of a visual embedding
    pub visual_embedding_dim: usize,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            normalization: NormalizationConfig::default(),
            geometry: GeometryConfig::default(),
            font_embedding_dim: DEFAULT_FONT_EMBEDDING_DIM,
            visual_embedding_dim: DEFAULT_VISUAL_EMBEDDING_DIM,
        }
    }
}

impl EncoderConfig {
    pub fn validate(&self) -> Result<()> {
        self.normalization.validate()?;
        self.geometry.validate()?;
        if self.font_embedding_dim == 0 {
            return Err(Error::InvalidConfig(
                "font_embedding_dim must be greater than zero".to_string(),
            ));
        }
        if self.visual_embedding_dim == 0 {
            return Err(Error::InvalidConfig(
                "visual_embedding_dim must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = EncoderConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.font_embedding_dim, 256);
        assert_eq!(config.geometry.min_alignment_cluster, 3);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: EncoderConfig = serde_json::from_str(
            r#"{"normalization": {"whitespace_midpoint": 32.0}, "font_embedding_dim": 64}"#,
        )
        .unwrap();
        assert_eq!(config.normalization.whitespace_midpoint, 32.0);
        assert_eq!(config.normalization.rhythm_k, 0.7);
        assert_eq!(config.font_embedding_dim, 64);
        assert_eq!(config.geometry, GeometryConfig::default());
    }

    #[test]
    fn test_rejects_unsorted_knots() {
        let mut config = EncoderConfig::default();
        config.normalization.density_knots = vec![(0.0, 0.0), (2.0, 0.5), (1.0, 1.0)];
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_inverted_percentiles_and_zero_midpoint() {
        let mut config = EncoderConfig::default();
        config.normalization.scale_variance_p10 = 7.0;
        assert!(config.validate().is_err());

        let mut config = EncoderConfig::default();
        config.normalization.whitespace_midpoint = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_degenerate_geometry_and_dims() {
        let mut config = EncoderConfig::default();
        config.geometry.min_alignment_cluster = 1;
        assert!(config.validate().is_err());

        let mut config = EncoderConfig::default();
        config.font_embedding_dim = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_nested_ranges_override_and_validate() {
        let config: EncoderConfig = serde_json::from_str(
            r#"{"normalization": {"tokens": {"radius_max": {"min": 0, "max": 16}}, "cta": {"padding_x": {"min": 0, "max": 64}}}}"#,
        )
        .unwrap();
        assert_eq!(config.normalization.tokens.radius_max, LinearRange::new(0.0, 16.0));
        assert_eq!(config.normalization.tokens.spacing_grid_px, 4.0);
        assert_eq!(config.normalization.cta.padding_x.apply(32.0), 0.5);
        assert_eq!(config.normalization.cta.font_weight, LinearRange::new(100.0, 900.0));
        assert!(config.validate().is_ok());

        let mut config = EncoderConfig::default();
        config.normalization.cta.font_size = LinearRange::new(24.0, 10.0);
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(ref m)) if m.contains("cta.font_size")));

        let mut config = EncoderConfig::default();
        config.normalization.tokens.spacing_grid_px = 0.0;
        assert!(config.validate().is_err());

        let mut config = EncoderConfig::default();
        config.normalization.palette_duplicate_delta_e = -1.0;
        assert!(config.validate().is_err());
    }
}
