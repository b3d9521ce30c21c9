//! # stylevec Core
//!
//! Core library for the stylevec encoding engine.
//!
//! This crate provides the leaf-level building blocks:
//!
//! - [`Color`] - CSS color parsing into CIE LCh with CIEDE2000 distance
//! - [`stats`] - Mean, deviation, quantiles and normalization strategies
//! - [`geometry`] - Bounding boxes, proximity groups, bands and alignment lines
//! - [`Vector`] - Dense vector with cosine similarity and L2 normalization
//!
//! ## Example
//!
//! ```rust
//! use stylevec_core::{parse_color, perceptual_distance};
//!
//! let navy = parse_color("#0a2540").unwrap();
//! let white = parse_color("rgb(255, 255, 255)").unwrap();
//!
//! assert!(white.lightness() > 90.0);
//! assert_eq!(perceptual_distance(&navy, &white), perceptual_distance(&white, &navy));
//! assert!(parse_color("transparent").is_none());
//! ```

pub mod color;
pub mod error;
pub mod geometry;
pub mod stats;
pub mod vector;

pub use color::{
    contrast_ratio, parse_color, perceptual_distance, Ciede2000Space, Color, ColorSpace,
};
pub use error::{Error, ProviderError, Result};
pub use geometry::{AlignmentLine, Band, BoundingBox};
pub use vector::Vector;
