//! Vector dimensions per kind
//!
//! Downstream similarity search indexes these vectors, so every length here
//! is part of the stored schema. Changing one means re-encoding every page.

use serde::{Deserialize, Serialize};
use std::fmt;

pub const COLOR_PALETTE_DIM: usize = 17;
pub const COLOR_REPORT_DIM: usize = 4;
pub const TYPOGRAPHY_DIM: usize = 8;
pub const SPACING_DIM: usize = 5;
pub const SHAPE_DIM: usize = 4;
pub const LAYOUT_DIM: usize = 17;

/// Interpretable features of the global style vector
pub const GLOBAL_STYLE_DIM: usize =
    COLOR_PALETTE_DIM + COLOR_REPORT_DIM + TYPOGRAPHY_DIM + SPACING_DIM + SHAPE_DIM + LAYOUT_DIM;

/// Interpretable features of the primary CTA vector
pub const PRIMARY_CTA_DIM: usize = 16;

pub const DEFAULT_FONT_EMBEDDING_DIM: usize = 256;
pub const DEFAULT_VISUAL_EMBEDDING_DIM: usize = 512;

const _: () = assert!(GLOBAL_STYLE_DIM == 55, "global style layout changed");

const GLOBAL_STYLE_GROUPS: [(&str, usize); 6] = [
    ("color_palette", COLOR_PALETTE_DIM),
    ("color_report", COLOR_REPORT_DIM),
    ("typography", TYPOGRAPHY_DIM),
    ("spacing", SPACING_DIM),
    ("shape", SHAPE_DIM),
    ("layout", LAYOUT_DIM),
];

const PRIMARY_CTA_GROUPS: [(&str, usize); 1] = [("primary_cta", PRIMARY_CTA_DIM)];

/// The kinds of style vector the encoder produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VectorKind {
    GlobalStyle,
    PrimaryCta,
}

impl VectorKind {
    pub fn name(&self) -> &'static str {
        match self {
            VectorKind::GlobalStyle => "global_style",
            VectorKind::PrimaryCta => "primary_cta",
        }
    }

    /// Ordered feature groups with their lengths
    pub fn groups(&self) -> &'static [(&'static str, usize)] {
        match self {
            VectorKind::GlobalStyle => &GLOBAL_STYLE_GROUPS,
            VectorKind::PrimaryCta => &PRIMARY_CTA_GROUPS,
        }
    }

    pub fn interpretable_dim(&self) -> usize {
        match self {
            VectorKind::GlobalStyle => GLOBAL_STYLE_DIM,
            VectorKind::PrimaryCta => PRIMARY_CTA_DIM,
        }
    }

    /// Human-readable group breakdown, e.g. `color_palette=17, layout=17`
    pub fn breakdown(&self) -> String {
        self.groups()
            .iter()
            .map(|(name, len)| format!("{name}={len}"))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for VectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
