//! Palette encoder
//!
//! Describes a page's brand colors by their perceptual relationships rather
//! than by absolute coordinates: pairwise spread of the brand palette, ΔE
//! between semantic roles, and a few absolute anchors (background, text, hero
//! and CTA lightness/chroma, hero hue on the circle).

use ordered_float::OrderedFloat;
use smallvec::SmallVec;
use std::cmp::Ordering;
use stylevec_core::stats::normalize_linear;
use stylevec_core::{parse_color, perceptual_distance, Color};
use tracing::debug;

use crate::config::NormalizationConfig;
use crate::dimensions::COLOR_PALETTE_DIM;
use crate::feature::FeatureVector;
use crate::model::{ColorTokens, DesignTokens};

/// Max colors kept in the brand palette
pub const PALETTE_LIMIT: usize = 5;

pub const COLOR_FEATURE_NAMES: [&str; COLOR_PALETTE_DIM] = [
    "brand_color_avg_distance",
    "brand_color_min_distance",
    "brand_color_max_distance",
    "brand_color_bg_text_distance",
    "brand_color_cta_bg_distance",
    "brand_color_cta_text_distance",
    "brand_color_hero_bg_distance",
    "brand_color_bg_lightness",
    "brand_color_bg_chroma",
    "brand_color_text_lightness",
    "brand_color_hero_lightness",
    "brand_color_hero_chroma",
    "brand_color_hero_hue_cos",
    "brand_color_hero_hue_sin",
    "brand_color_cta_lightness",
    "brand_color_cta_chroma",
    "brand_color_cta_hero_distance",
];

pub fn color_feature_names() -> &'static [&'static str] {
    &COLOR_FEATURE_NAMES
}

/// Chroma descending, then lightness, hue and Lab so the order is total
fn palette_order(a: &Color, b: &Color) -> Ordering {
    OrderedFloat(b.chroma())
        .cmp(&OrderedFloat(a.chroma()))
        .then_with(|| OrderedFloat(a.lightness()).cmp(&OrderedFloat(b.lightness())))
        .then_with(|| OrderedFloat(a.hue()).cmp(&OrderedFloat(b.hue())))
        .then_with(|| a.canonical_cmp(b))
}

fn parse_pool(pool: &[String]) -> Vec<Color> {
    let mut colors: Vec<Color> = pool.iter().filter_map(|c| parse_color(c)).collect();
    colors.sort_by(palette_order);
    colors
}

/// Up to five distinct brand colors in canonical order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BrandPalette {
    colors: SmallVec<[Color; PALETTE_LIMIT]>,
}

impl BrandPalette {
    /// Vibrant colors first, then muted. The generic primary pool is used
    /// only when neither brand pool yields a color.
    /// Colors within `duplicate_delta_e` of a kept color are dropped.
    pub fn from_tokens(tokens: &ColorTokens, duplicate_delta_e: f64) -> Self {
        let mut candidates = parse_pool(&tokens.brand_vibrant);
        candidates.extend(parse_pool(&tokens.brand_muted));
        if candidates.is_empty() {
            candidates = parse_pool(&tokens.primary);
        }
        Self::from_ordered(candidates, duplicate_delta_e)
    }

    fn from_ordered(candidates: Vec<Color>, duplicate_delta_e: f64) -> Self {
        let mut colors: SmallVec<[Color; PALETTE_LIMIT]> = SmallVec::new();
        for color in candidates {
            if colors.len() == PALETTE_LIMIT {
                break;
            }
            if colors
                .iter()
                .all(|kept| perceptual_distance(kept, &color) >= duplicate_delta_e)
            {
                colors.push(color);
            }
        }
        Self { colors }
    }

    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Most chromatic color; ties keep the first in palette order
    pub fn hero(&self) -> Option<&Color> {
        self.colors.iter().fold(None, |best: Option<&Color>, c| match best {
            Some(b) if c.chroma() <= b.chroma() => Some(b),
            _ => Some(c),
        })
    }

    /// ΔE for every unordered pair
    pub fn pairwise_distances(&self) -> Vec<f64> {
        let mut distances = Vec::with_capacity(self.len() * self.len().saturating_sub(1) / 2);
        for (i, a) in self.colors.iter().enumerate() {
            for b in &self.colors[i + 1..] {
                distances.push(perceptual_distance(a, b));
            }
        }
        distances
    }
}

/// Brand palette plus the parsed semantic roles
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaletteDescriptor {
    pub palette: BrandPalette,
    pub background: Option<Color>,
    pub text: Option<Color>,
    pub cta: Option<Color>,
}

impl PaletteDescriptor {
    pub fn from_tokens(tokens: &ColorTokens, config: &NormalizationConfig) -> Self {
        let semantic = &tokens.semantic;
        Self {
            palette: BrandPalette::from_tokens(tokens, config.palette_duplicate_delta_e),
            background: semantic.background.as_deref().and_then(parse_color),
            text: semantic.text.as_deref().and_then(parse_color),
            cta: semantic.cta.as_deref().and_then(parse_color),
        }
    }

    pub fn hero(&self) -> Option<&Color> {
        self.palette.hero()
    }
}

/// Normalized ΔE between two optional colors, `fallback` when either is
/// missing
pub(crate) fn relation(a: Option<&Color>, b: Option<&Color>, max: f64, fallback: f64) -> f64 {
    match (a, b) {
        (Some(a), Some(b)) => normalize_linear(perceptual_distance(a, b), 0.0, max),
        _ => fallback,
    }
}

pub(crate) fn lightness_or(color: Option<&Color>, fallback: f64) -> f64 {
    color.map_or(fallback, |c| (c.lightness() / 100.0).clamp(0.0, 1.0))
}

/// Hue as `(cos θ, sin θ)`; missing and achromatic colors have no hue and
/// take `(1, 0)`
pub(crate) fn hue_or_neutral(color: Option<&Color>) -> (f64, f64) {
    match color {
        Some(c) if !c.is_achromatic() => c.hue_circular(),
        _ => (1.0, 0.0),
    }
}

pub(crate) fn chroma_or_zero(color: Option<&Color>, chroma_max: f64) -> f64 {
    color.map_or(0.0, |c| normalize_linear(c.chroma(), 0.0, chroma_max))
}

/// Encode the palette and semantic colors of `tokens` into 17 features
pub fn build_palette_features(tokens: &DesignTokens, config: &NormalizationConfig) -> FeatureVector {
    let descriptor = PaletteDescriptor::from_tokens(&tokens.colors, config);
    palette_features(&descriptor, config)
}

pub fn palette_features(descriptor: &PaletteDescriptor, config: &NormalizationConfig) -> FeatureVector {
    let distances = descriptor.palette.pairwise_distances();
    let (avg, min, max) = if distances.is_empty() {
        (0.0, 0.0, 0.0)
    } else {
        let sum: f64 = distances.iter().sum();
        let min = distances.iter().copied().fold(f64::INFINITY, f64::min);
        let max = distances.iter().copied().fold(0.0_f64, f64::max);
        (
            normalize_linear(sum / distances.len() as f64, 0.0, config.palette_avg_distance_max),
            normalize_linear(min, 0.0, config.palette_min_distance_max),
            normalize_linear(max, 0.0, config.palette_max_distance_max),
        )
    };

    let bg = descriptor.background.as_ref();
    let text = descriptor.text.as_ref();
    let cta = descriptor.cta.as_ref();
    let hero = descriptor.hero();
    let semantic = |a: Option<&Color>, b: Option<&Color>| relation(a, b, config.semantic_distance_max, config.fallback_distance);

    let (hue_cos, hue_sin) = hue_or_neutral(hero);

    let values = [
        avg,
        min,
        max,
        semantic(bg, text),
        semantic(cta, bg),
        semantic(cta, text),
        semantic(hero, bg),
        lightness_or(bg, config.fallback_lightness),
        chroma_or_zero(bg, config.chroma_max),
        lightness_or(text, config.fallback_lightness),
        lightness_or(hero, config.fallback_lightness),
        chroma_or_zero(hero, config.chroma_max),
        hue_cos,
        hue_sin,
        lightness_or(cta, config.fallback_lightness),
        chroma_or_zero(cta, config.chroma_max),
        semantic(cta, hero),
    ];

    debug!(
        palette_size = descriptor.palette.len(),
        has_hero = hero.is_some(),
        "encoded palette features"
    );

    let mut features = FeatureVector::with_capacity(COLOR_PALETTE_DIM);
    for (name, value) in COLOR_FEATURE_NAMES.iter().zip(values) {
        features.push(*name, value);
    }
    features
}
