//! Vector assembly
//!
//! Both builders funnel into [`StyleVector::compose`], which checks the
//! interpretable length against the kind's declared schema, appends the
//! external embedding and L2-normalizes the result.

use serde::{Deserialize, Serialize};
use stylevec_core::{contrast_ratio, parse_color, Color, Error, Result, Vector};
use tracing::debug;

use crate::config::{EncoderConfig, LinearRange};
use crate::dimensions::{VectorKind, PRIMARY_CTA_DIM};
use crate::feature::FeatureVector;
use crate::layout::extract_layout_features;
use crate::model::{DesignTokens, StyleNode, StyleReport, Viewport};
use crate::palette::{build_palette_features, chroma_or_zero, hue_or_neutral, lightness_or, relation};
use crate::provider::{check_declared_dimension, font_description, validate_embedding, FontEmbeddingProvider};
use crate::tokens::{color_report_features, shape_features, spacing_features, typography_features};

/// Bumped whenever feature semantics change
pub const ENCODER_VERSION: &str = "1";

pub const CTA_FEATURE_NAMES: [&str; PRIMARY_CTA_DIM] = [
    "cta_bg_lightness",
    "cta_bg_chroma",
    "cta_hue_cos",
    "cta_hue_sin",
    "cta_text_lightness",
    "cta_text_distance",
    "cta_contrast_ratio",
    "cta_page_bg_distance",
    "cta_radius",
    "cta_padding_x",
    "cta_padding_y",
    "cta_font_size",
    "cta_font_weight",
    "cta_has_border",
    "cta_has_shadow",
    "cta_contrast_pass_rate",
];

/// Position of one feature group inside the interpretable block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSpan {
    pub name: String,
    pub start: usize,
    pub len: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorMetadata {
    pub kind: VectorKind,
    pub encoder_version: String,
    pub interpretable_dim: usize,
    pub embedding_dim: usize,
    pub groups: Vec<GroupSpan>,
    /// Provider that produced the external embedding, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding_provider: Option<String>,
    /// Text sent to the embedding provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding_input: Option<String>,
}

/// An encoded style vector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleVector {
    pub interpretable: FeatureVector,
    pub external_embedding: Vec<f32>,
    /// Interpretable features followed by the embedding, L2-normalized
    pub combined: Vector,
    pub metadata: VectorMetadata,
}

impl StyleVector {
    /// Validate the interpretable block against `kind` and build the
    /// combined vector.
    pub fn compose(kind: VectorKind, interpretable: FeatureVector, external_embedding: Vec<f32>) -> Result<Self> {
        if interpretable.len() != kind.interpretable_dim() {
            return Err(Error::SchemaMismatch {
                kind: kind.name().to_string(),
                expected: kind.interpretable_dim(),
                actual: interpretable.len(),
                breakdown: kind.breakdown(),
            });
        }
        if kind == VectorKind::PrimaryCta && !external_embedding.is_empty() {
            return Err(Error::EmbeddingDimension {
                provider: kind.name().to_string(),
                expected: 0,
                actual: external_embedding.len(),
            });
        }

        let features = interpretable.to_vector();
        let combined = Vector::concat(&[features.as_slice(), external_embedding.as_slice()]).normalized();

        let mut start = 0;
        let groups = kind
            .groups()
            .iter()
            .map(|(name, len)| {
                let span = GroupSpan {
                    name: name.to_string(),
                    start,
                    len: *len,
                };
                start += len;
                span
            })
            .collect();

        Ok(Self {
            metadata: VectorMetadata {
                kind,
                encoder_version: ENCODER_VERSION.to_string(),
                interpretable_dim: interpretable.len(),
                embedding_dim: external_embedding.len(),
                groups,
                embedding_provider: None,
                embedding_input: None,
            },
            interpretable,
            external_embedding,
            combined,
        })
    }

    pub fn kind(&self) -> VectorKind {
        self.metadata.kind
    }

    /// Total length of the combined vector
    pub fn dim(&self) -> usize {
        self.combined.dim()
    }

    /// Features of one named group
    pub fn group(&self, name: &str) -> Option<FeatureVector> {
        let span = self.metadata.groups.iter().find(|g| g.name == name)?;
        let end = span.start + span.len;
        FeatureVector::new(
            self.interpretable.values().get(span.start..end)?.to_vec(),
            self.interpretable.names().get(span.start..end)?.to_vec(),
        )
        .ok()
    }
}

/// Build the page-level style vector.
///
/// Required report fields are checked before anything else, so a missing
/// field never costs a provider call.
pub async fn build_global_style_vector<P>(
    tokens: &DesignTokens,
    report: &StyleReport,
    nodes: &[StyleNode],
    viewport: &Viewport,
    provider: &P,
    config: &EncoderConfig,
) -> Result<StyleVector>
where
    P: FontEmbeddingProvider + ?Sized,
{
    config.validate()?;
    let metrics = report.require_metrics()?;
    let norm = &config.normalization;

    let groups = [
        ("color_palette", build_palette_features(tokens, norm)),
        ("color_report", color_report_features(&metrics)),
        ("typography", typography_features(&tokens.typography, &metrics, &norm.tokens)),
        ("spacing", spacing_features(&tokens.spacing, &metrics, &norm.tokens)),
        ("shape", shape_features(tokens, &norm.tokens)),
        (
            "layout",
            extract_layout_features(nodes, viewport, config).to_feature_vector(),
        ),
    ];

    let mut interpretable = FeatureVector::with_capacity(VectorKind::GlobalStyle.interpretable_dim());
    for (name, group) in groups {
        debug!(group = name, features = group.len(), "assembled feature group");
        interpretable.extend(group);
    }
    if interpretable.len() != VectorKind::GlobalStyle.interpretable_dim() {
        return Err(Error::SchemaMismatch {
            kind: VectorKind::GlobalStyle.name().to_string(),
            expected: VectorKind::GlobalStyle.interpretable_dim(),
            actual: interpretable.len(),
            breakdown: VectorKind::GlobalStyle.breakdown(),
        });
    }

    check_declared_dimension(provider.name(), provider.dimension(), config.font_embedding_dim)?;
    let description = font_description(&tokens.typography);
    let embedding = provider.embed_text(&description).await?;
    validate_embedding(provider.name(), &embedding, config.font_embedding_dim)?;

    let mut vector = StyleVector::compose(VectorKind::GlobalStyle, interpretable, embedding)?;
    vector.metadata.embedding_provider = Some(provider.name().to_string());
    vector.metadata.embedding_input = Some(description);

    debug!(
        nodes = nodes.len(),
        dim = vector.dim(),
        provider = provider.name(),
        "built global style vector"
    );
    Ok(vector)
}

/// Build the primary call-to-action vector from the button tokens.
///
/// Falls back to the semantic CTA color as background when no button
/// variant is declared.
pub fn build_primary_cta_vector(
    tokens: &DesignTokens,
    report: &StyleReport,
    config: &EncoderConfig,
) -> Result<StyleVector> {
    config.validate()?;
    let pass_rate = report.require_contrast_pass_rate()?;
    let norm = &config.normalization;
    let ranges = &norm.cta;

    let button = tokens.primary_button();
    let semantic = &tokens.colors.semantic;
    let background: Option<Color> = button
        .and_then(|b| b.background.as_deref())
        .and_then(parse_color)
        .or_else(|| semantic.cta.as_deref().and_then(parse_color));
    let text: Option<Color> = button.and_then(|b| b.color.as_deref()).and_then(parse_color);
    let page_background: Option<Color> = semantic.background.as_deref().and_then(parse_color);

    let (hue_cos, hue_sin) = hue_or_neutral(background.as_ref());
    let contrast = match (background.as_ref(), text.as_ref()) {
        (Some(bg), Some(fg)) => ranges.contrast_ratio.apply(contrast_ratio(bg, fg)),
        _ => norm.fallback_distance,
    };
    let numeric = |value: Option<f64>, range: LinearRange| value.map_or(0.0, |v| range.apply(v));
    let flag = |set: bool| if set { 1.0 } else { 0.0 };

    let values = [
        lightness_or(background.as_ref(), norm.fallback_lightness),
        chroma_or_zero(background.as_ref(), norm.chroma_max),
        hue_cos,
        hue_sin,
        lightness_or(text.as_ref(), norm.fallback_lightness),
        relation(text.as_ref(), background.as_ref(), norm.semantic_distance_max, norm.fallback_distance),
        contrast,
        relation(
            background.as_ref(),
            page_background.as_ref(),
            norm.semantic_distance_max,
            norm.fallback_distance,
        ),
        numeric(button.and_then(|b| b.border_radius), ranges.radius),
        numeric(button.and_then(|b| b.padding_x), ranges.padding_x),
        numeric(button.and_then(|b| b.padding_y), ranges.padding_y),
        numeric(button.and_then(|b| b.font_size), ranges.font_size),
        numeric(button.and_then(|b| b.font_weight), ranges.font_weight),
        flag(button.is_some_and(|b| b.has_border())),
        flag(button.is_some_and(|b| b.has_shadow())),
        pass_rate,
    ];

    let interpretable = FeatureVector::from_named(&CTA_FEATURE_NAMES, &values)?;
    let vector = StyleVector::compose(VectorKind::PrimaryCta, interpretable, Vec::new())?;
    debug!(
        variant = button.map(|b| b.variant.as_str()).unwrap_or("semantic"),
        "built primary CTA vector"
    );
    Ok(vector)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BrandCoherence, ButtonVariant, SemanticColors};
    use crate::provider::HashingTextEmbedder;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use stylevec_core::{BoundingBox, ProviderError};

    fn report() -> StyleReport {
        StyleReport {
            contrast_pass_rate: Some(0.9),
            color_harmony_score: Some(0.7),
            brand_coherence: Some(BrandCoherence {
                overall: Some(0.8),
                color_consistency: Some(0.6),
                typography_consistency: Some(0.75),
                spacing_consistency: Some(0.5),
            }),
        }
    }

    fn tokens() -> DesignTokens {
        let mut tokens = DesignTokens::default();
        tokens.colors.brand_vibrant = vec!["#635bff".into(), "#00d4ff".into()];
        tokens.colors.semantic = SemanticColors {
            background: Some("#ffffff".into()),
            text: Some("#0a2540".into()),
            cta: Some("#635bff".into()),
        };
        tokens.typography.font_families = vec!["Inter".into()];
        tokens.typography.font_sizes = vec![14.0, 16.0, 48.0];
        tokens.spacing = vec![4.0, 8.0, 16.0, 32.0];
        tokens.border_radius = vec![4.0, 8.0];
        tokens.buttons = vec![ButtonVariant {
            variant: "primary".into(),
            background: Some("#635bff".into()),
            color: Some("#ffffff".into()),
            border_radius: Some(16.0),
            padding_x: Some(24.0),
            padding_y: Some(12.0),
            font_size: Some(16.0),
            font_weight: Some(600.0),
            border_width: None,
            box_shadow: Some("rgba(50, 50, 93, 0.25) 0px 6px 12px -2px".into()),
        }];
        tokens
    }

    fn nodes() -> Vec<StyleNode> {
        (0..6)
            .map(|i| StyleNode::new(format!("n{i}"), "section", BoundingBox::new(0, i * 200, 1200, 160)))
            .collect()
    }

    struct CountingProvider {
        calls: AtomicUsize,
        dim: usize,
    }

    #[async_trait]
    impl FontEmbeddingProvider for CountingProvider {
        async fn embed_text(&self, _text: &str) -> std::result::Result<Vec<f32>, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![0.5; self.dim])
        }

        fn dimension(&self) -> usize {
            256
        }

        fn name(&self) -> &str {
            "counting"
        }
    }

    #[tokio::test]
    async fn test_global_vector_dimensions() {
        let provider = HashingTextEmbedder::new(256);
        let config = EncoderConfig::default();
        let viewport = Viewport::new(1280.0, 800.0);
        let vector = build_global_style_vector(&tokens(), &report(), &nodes(), &viewport, &provider, &config)
            .await
            .unwrap();

        assert_eq!(vector.interpretable.len(), 55);
        assert_eq!(vector.external_embedding.len(), 256);
        assert_eq!(vector.dim(), 311);
        assert!((vector.combined.norm() - 1.0).abs() < 1e-4);
        assert_eq!(vector.group("layout").unwrap().len(), 17);
        assert_eq!(vector.group("color_palette").unwrap().names()[0], "brand_color_avg_distance");
        assert!(vector.metadata.embedding_input.as_deref().unwrap().contains("Inter"));
    }

    #[tokio::test]
    async fn test_missing_field_skips_provider() {
        let provider = CountingProvider { calls: AtomicUsize::new(0), dim: 256 };
        let mut report = report();
        report.color_harmony_score = None;

        let err = build_global_style_vector(
            &tokens(),
            &report,
            &nodes(),
            &Viewport::new(1280.0, 800.0),
            &provider,
            &EncoderConfig::default(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, Error::MissingRequiredData { ref field } if field.ends_with("colorHarmonyScore")));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_wrong_embedding_size_is_rejected() {
        let provider = CountingProvider { calls: AtomicUsize::new(0), dim: 100 };
        let err = build_global_style_vector(
            &tokens(),
            &report(),
            &nodes(),
            &Viewport::new(1280.0, 800.0),
            &provider,
            &EncoderConfig::default(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, Error::EmbeddingDimension { expected: 256, actual: 100, .. }));
    }

    #[test]
    fn test_compose_rejects_wrong_length() {
        let fv = FeatureVector::from_named(&["a", "b"], &[0.1, 0.2]).unwrap();
        let err = StyleVector::compose(VectorKind::PrimaryCta, fv, Vec::new()).unwrap_err();
        match err {
            Error::SchemaMismatch { expected, actual, breakdown, .. } => {
                assert_eq!(expected, 16);
                assert_eq!(actual, 2);
                assert_eq!(breakdown, "primary_cta=16");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_compose_zero_vector_stays_zero() {
        let fv = FeatureVector::from_named(&CTA_FEATURE_NAMES, &[0.0; PRIMARY_CTA_DIM]).unwrap();
        let vector = StyleVector::compose(VectorKind::PrimaryCta, fv, Vec::new()).unwrap();
        assert!(vector.combined.as_slice().iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_primary_cta_vector() {
        let vector = build_primary_cta_vector(&tokens(), &report(), &EncoderConfig::default()).unwrap();
        assert_eq!(vector.dim(), PRIMARY_CTA_DIM);
        assert_eq!(vector.kind(), VectorKind::PrimaryCta);

        let fv = &vector.interpretable;
        assert_eq!(fv.get("cta_has_shadow"), Some(1.0));
        assert_eq!(fv.get("cta_has_border"), Some(0.0));
        assert_eq!(fv.get("cta_radius"), Some(0.5));
        assert_eq!(fv.get("cta_contrast_pass_rate"), Some(0.9));
        assert!(fv.get("cta_text_lightness").unwrap() > 0.9);
        assert!(fv.get("cta_contrast_ratio").unwrap() > 0.1);
    }

    #[test]
    fn test_cta_falls_back_to_semantic_color() {
        let mut tokens = tokens();
        tokens.buttons.clear();
        let vector = build_primary_cta_vector(&tokens, &report(), &EncoderConfig::default()).unwrap();
        let fv = &vector.interpretable;
        assert!(fv.get("cta_bg_chroma").unwrap() > 0.3);
        assert_eq!(fv.get("cta_radius"), Some(0.0));
        assert_eq!(fv.get("cta_text_distance"), Some(0.5));
    }

    #[test]
    fn test_cta_requires_contrast_pass_rate() {
        let mut report = report();
        report.contrast_pass_rate = None;
        report.brand_coherence = None;
        let err = build_primary_cta_vector(&tokens(), &report, &EncoderConfig::default()).unwrap_err();
        assert!(matches!(err, Error::MissingRequiredData { ref field } if field == "StyleReport.contrastPassRate"));
    }

    #[test]
    fn test_gray_cta_has_neutral_hue() {
        let hue = |bg: &str| {
            let mut tokens = tokens();
            tokens.buttons[0].background = Some(bg.into());
            let vector = build_primary_cta_vector(&tokens, &report(), &EncoderConfig::default()).unwrap();
            (vector.interpretable.get("cta_hue_cos"), vector.interpretable.get("cta_hue_sin"))
        };
        assert_eq!(hue("#808080"), hue("#818181"));
        assert_eq!(hue("#111111"), (Some(1.0), Some(0.0)));
        assert_ne!(hue("#635bff"), (Some(1.0), Some(0.0)));
    }

    #[test]
    fn test_cta_ranges_follow_config() {
        let mut config = EncoderConfig::default();
        config.normalization.cta.radius = LinearRange::new(0.0, 64.0);
        config.normalization.cta.padding_x = LinearRange::new(0.0, 96.0);
        let vector = build_primary_cta_vector(&tokens(), &report(), &config).unwrap();
        assert_eq!(vector.interpretable.get("cta_radius"), Some(0.25));
        assert_eq!(vector.interpretable.get("cta_padding_x"), Some(0.25));
    }
}
