//! Feature groups derived from design tokens and the style report
//!
//! These complement the layout group: tokens describe the declared design
//! system (scales, families, radii) while layout measures what the page
//! actually renders.

use ahash::AHashSet;
use stylevec_core::stats::{median, normalize_log};

use crate::config::TokenNormalization;
use crate::dimensions::{COLOR_REPORT_DIM, SHAPE_DIM, SPACING_DIM, TYPOGRAPHY_DIM};
use crate::feature::FeatureVector;
use crate::model::{DesignTokens, ReportMetrics, TypographyTokens};

pub const COLOR_REPORT_FEATURE_NAMES: [&str; COLOR_REPORT_DIM] = [
    "report_contrast_pass_rate",
    "report_color_harmony",
    "report_brand_coherence",
    "report_color_consistency",
];

pub const TYPOGRAPHY_FEATURE_NAMES: [&str; TYPOGRAPHY_DIM] = [
    "typo_family_count",
    "typo_size_min",
    "typo_size_max",
    "typo_size_ratio",
    "typo_scale_steps",
    "typo_weight_count",
    "typo_line_height",
    "typo_coherence",
];

pub const SPACING_FEATURE_NAMES: [&str; SPACING_DIM] = [
    "spacing_scale_steps",
    "spacing_median",
    "spacing_max",
    "spacing_grid_adherence",
    "spacing_coherence",
];

pub const SHAPE_FEATURE_NAMES: [&str; SHAPE_DIM] = [
    "radius_median",
    "radius_max",
    "radius_steps",
    "button_variant_count",
];

fn named(names: &[&str], values: &[f64]) -> FeatureVector {
    let mut features = FeatureVector::with_capacity(names.len());
    for (name, value) in names.iter().zip(values) {
        features.push(*name, *value);
    }
    features
}

/// Finite, non-negative values only
fn usable(values: &[f64]) -> Vec<f64> {
    values
        .iter()
        .copied()
        .filter(|v| v.is_finite() && *v >= 0.0)
        .collect()
}

/// Distinct values at half-pixel resolution
fn distinct_count(values: &[f64]) -> usize {
    values
        .iter()
        .map(|v| (v * 2.0).round() as i64)
        .collect::<AHashSet<_>>()
        .len()
}

fn max_of(values: &[f64]) -> f64 {
    values.iter().copied().fold(0.0_f64, f64::max)
}

pub fn color_report_features(metrics: &ReportMetrics) -> FeatureVector {
    named(
        &COLOR_REPORT_FEATURE_NAMES,
        &[
            metrics.contrast_pass_rate,
            metrics.color_harmony,
            metrics.coherence_overall,
            metrics.coherence_color,
        ],
    )
}

pub fn typography_features(
    typography: &TypographyTokens,
    metrics: &ReportMetrics,
    ranges: &TokenNormalization,
) -> FeatureVector {
    let families: AHashSet<String> = typography
        .font_families
        .iter()
        .map(|f| f.trim().trim_matches(|c: char| c == '"' || c == '\'').to_ascii_lowercase())
        .filter(|f| !f.is_empty())
        .collect();

    let sizes: Vec<f64> = usable(&typography.font_sizes)
        .into_iter()
        .filter(|s| *s > 0.0)
        .collect();
    let (size_min, size_max, size_ratio) = if sizes.is_empty() {
        (0.0, 0.0, 0.0)
    } else {
        let min = sizes.iter().copied().fold(f64::INFINITY, f64::min);
        let max = max_of(&sizes);
        (
            ranges.font_size_min.apply(min),
            normalize_log(max, ranges.font_size_max_midpoint),
            ranges.font_size_ratio.apply(max / min),
        )
    };

    let weights = usable(&typography.font_weights);
    let line_heights = usable(&typography.line_heights);
    let line_height = if line_heights.is_empty() {
        0.0
    } else {
        ranges.line_height.apply(median(&line_heights))
    };

    named(
        &TYPOGRAPHY_FEATURE_NAMES,
        &[
            ranges.font_family_count.apply(families.len() as f64),
            size_min,
            size_max,
            size_ratio,
            ranges.font_size_steps.apply(distinct_count(&sizes) as f64),
            ranges.font_weight_steps.apply(distinct_count(&weights) as f64),
            line_height,
            metrics.coherence_typography,
        ],
    )
}

pub fn spacing_features(spacing: &[f64], metrics: &ReportMetrics, ranges: &TokenNormalization) -> FeatureVector {
    let grid = ranges.spacing_grid_px;
    let values: Vec<f64> = usable(spacing).into_iter().filter(|v| *v > 0.0).collect();
    let adherence = if values.is_empty() {
        0.0
    } else {
        let on_grid = values
            .iter()
            .filter(|v| {
                let r = v.rem_euclid(grid);
                r < 0.01 || grid - r < 0.01
            })
            .count();
        on_grid as f64 / values.len() as f64
    };

    named(
        &SPACING_FEATURE_NAMES,
        &[
            ranges.spacing_steps.apply(distinct_count(&values) as f64),
            normalize_log(median(&values), ranges.spacing_median_midpoint),
            normalize_log(max_of(&values), ranges.spacing_max_midpoint),
            adherence,
            metrics.coherence_spacing,
        ],
    )
}

pub fn shape_features(tokens: &DesignTokens, ranges: &TokenNormalization) -> FeatureVector {
    let radii = usable(&tokens.border_radius);
    named(
        &SHAPE_FEATURE_NAMES,
        &[
            normalize_log(median(&radii), ranges.radius_median_midpoint),
            ranges.radius_max.apply(max_of(&radii)),
            ranges.radius_steps.apply(distinct_count(&radii) as f64),
            ranges.button_variants.apply(tokens.buttons.len() as f64),
        ],
    )
}
