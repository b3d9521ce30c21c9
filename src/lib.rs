//! # stylevec
//!
//! Style vector encoding engine: turns a captured web page (element boxes
//! with computed styles, design tokens and a style report) into fixed-length
//! vectors for cross-site visual similarity search.
//!
//! ## Quick Start
//!
//! ### From the command line
//!
//! ```bash
//! stylevec encode capture.json --kind all
//! stylevec compare stripe.json linear.json --top 5
//! ```
//!
//! ### As a Library
//!
//! ```rust,no_run
//! use stylevec::prelude::*;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let bundle = CaptureBundle::from_path("capture.json")?;
//! let config = EncoderConfig::default();
//! let provider = HashingTextEmbedder::new(config.font_embedding_dim);
//!
//! let vector = build_global_style_vector(
//!     &bundle.tokens,
//!     &bundle.report,
//!     &bundle.nodes,
//!     &bundle.viewport,
//!     &provider,
//!     &config,
//! )
//! .await?;
//! assert_eq!(vector.interpretable.len(), GLOBAL_STYLE_DIM);
//! # Ok(())
//! # }
//! ```
//!
//! ## Crate Structure
//!
//! - [`stylevec-core`](stylevec_core) - Color math, statistics, geometry, dense vectors
//! - [`stylevec-encoder`](stylevec_encoder) - Input model, feature encoders, assembler, providers

pub mod bundle;

pub use bundle::CaptureBundle;

// Re-export core types
pub use stylevec_core::{
    contrast_ratio, parse_color, perceptual_distance, BoundingBox, Color, ColorSpace, Error,
    ProviderError, Result, Vector,
};

// Re-export the encoder
pub use stylevec_encoder::{
    build_global_style_vector, build_palette_features, build_primary_cta_vector,
    color_feature_names, compare_vectors, extract_layout_features, fetch_visual_embedding,
    font_description, DesignTokens, EncoderConfig, FeatureVector, FontEmbeddingProvider,
    HashingTextEmbedder, LayoutFeatures, StyleNode, StyleReport, StyleVector, VectorComparison,
    VectorKind, Verdict, Viewport, VisualEmbeddingProvider, GLOBAL_STYLE_DIM, PRIMARY_CTA_DIM,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        build_global_style_vector, build_primary_cta_vector, compare_vectors, CaptureBundle,
        DesignTokens, EncoderConfig, Error, FontEmbeddingProvider, HashingTextEmbedder, Result,
        StyleNode, StyleReport, StyleVector, VectorKind, Viewport, GLOBAL_STYLE_DIM,
        PRIMARY_CTA_DIM,
    };
}
