//! # stylevec Encoder
//!
//! Turns a page capture (element boxes with computed styles), its design
//! tokens and a precomputed style report into fixed-length style vectors.
//!
//! - [`build_palette_features`] - brand palette and semantic color roles
//! - [`extract_layout_features`] - 17 layout, spacing, shape and typography features
//! - [`tokens`] - feature groups taken straight from tokens and the report
//! - [`build_global_style_vector`] / [`build_primary_cta_vector`] - assembly
//! - [`compare_vectors`] - per-feature explanation of two vectors
//!
//! ## Example
//!
//! ```rust
//! use stylevec_encoder::{build_palette_features, DesignTokens, NormalizationConfig};
//!
//! let mut tokens = DesignTokens::default();
//! tokens.colors.brand_vibrant = vec!["#635bff".into()];
//! tokens.colors.semantic.background = Some("#0a2540".into());
//!
//! let features = build_palette_features(&tokens, &NormalizationConfig::default());
//! assert_eq!(features.len(), 17);
//! assert_eq!(features.get("brand_color_avg_distance"), Some(0.0));
//! assert!(features.get("brand_color_bg_lightness").unwrap() < 0.2);
//! ```

pub mod assemble;
pub mod config;
pub mod dimensions;
pub mod explain;
pub mod feature;
pub mod layout;
pub mod model;
pub mod palette;
pub mod provider;
pub mod tokens;

pub use assemble::{
    build_global_style_vector, build_primary_cta_vector, GroupSpan, StyleVector, VectorMetadata,
    CTA_FEATURE_NAMES,
};
pub use config::{
    CtaNormalization, EncoderConfig, GeometryConfig, LinearRange, NormalizationConfig,
    TokenNormalization,
};
pub use dimensions::{VectorKind, GLOBAL_STYLE_DIM, PRIMARY_CTA_DIM};
pub use explain::{compare_vectors, FeatureDelta, Verdict, VectorComparison};
pub use feature::FeatureVector;
pub use layout::{extract_layout_features, LayoutFeatures, LAYOUT_FEATURE_NAMES};
pub use model::{
    BrandCoherence, ButtonVariant, ColorTokens, DesignTokens, ReportMetrics, SemanticColors,
    StyleNode, StyleReport, StyleSubset, TypographyTokens, Viewport,
};
pub use palette::{build_palette_features, color_feature_names, BrandPalette, PaletteDescriptor};
pub use provider::{
    fetch_visual_embedding, font_description, FontEmbeddingProvider, HashingTextEmbedder,
    VisualEmbeddingProvider,
};
