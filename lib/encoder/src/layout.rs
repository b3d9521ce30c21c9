//! Layout feature extraction
//!
//! Turns the captured element boxes and their computed styles into 17
//! scalar features covering typography, spacing, shape, color energy and
//! composition. Every geometric pass goes through `stylevec_core::geometry`,
//! which sorts by a full key first, so shuffling `nodes` never changes the
//! output.

use ahash::AHashSet;
use serde::{Deserialize, Serialize};
use stylevec_core::geometry::{
    alignment_coverage, alignment_lines, horizontal_bands, horizontal_gaps, proximity_groups,
    vertical_gaps,
};
use stylevec_core::stats::{
    coefficient_of_variation, consistency_sigmoid, mean, median, normalize_linear, normalize_log,
    normalize_percentile, normalize_piecewise, quantile,
};
use stylevec_core::{parse_color, perceptual_distance, BoundingBox, Color};
use tracing::debug;

use crate::config::{EncoderConfig, NormalizationConfig};
use crate::dimensions::LAYOUT_DIM;
use crate::feature::FeatureVector;
use crate::model::{StyleNode, Viewport};

pub const LAYOUT_FEATURE_NAMES: [&str; LAYOUT_DIM] = [
    "typo_hierarchy_depth",
    "typo_weight_contrast",
    "spacing_density_score",
    "spacing_whitespace_ratio",
    "spacing_padding_consistency",
    "spacing_image_text_balance",
    "shape_border_heaviness",
    "shape_shadow_depth",
    "shape_grouping_strength",
    "shape_compositional_complexity",
    "brand_color_saturation_energy",
    "brand_color_role_distinction",
    "layout_vertical_rhythm",
    "layout_grid_regularity",
    "layout_element_scale_variance",
    "layout_above_fold_density",
    "layout_median_element_size",
];

/// The 17 layout features, each in [0, 1]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutFeatures {
    pub typo_hierarchy_depth: f64,
    pub typo_weight_contrast: f64,
    pub spacing_density_score: f64,
    pub spacing_whitespace_ratio: f64,
    pub spacing_padding_consistency: f64,
    pub spacing_image_text_balance: f64,
    pub shape_border_heaviness: f64,
    pub shape_shadow_depth: f64,
    pub shape_grouping_strength: f64,
    pub shape_compositional_complexity: f64,
    pub brand_color_saturation_energy: f64,
    pub brand_color_role_distinction: f64,
    pub layout_vertical_rhythm: f64,
    pub layout_grid_regularity: f64,
    pub layout_element_scale_variance: f64,
    pub layout_above_fold_density: f64,
    pub layout_median_element_size: f64,
}

impl LayoutFeatures {
    /// Values in `LAYOUT_FEATURE_NAMES` order
    pub fn values(&self) -> [f64; LAYOUT_DIM] {
        [
            self.typo_hierarchy_depth,
            self.typo_weight_contrast,
            self.spacing_density_score,
            self.spacing_whitespace_ratio,
            self.spacing_padding_consistency,
            self.spacing_image_text_balance,
            self.shape_border_heaviness,
            self.shape_shadow_depth,
            self.shape_grouping_strength,
            self.shape_compositional_complexity,
            self.brand_color_saturation_energy,
            self.brand_color_role_distinction,
            self.layout_vertical_rhythm,
            self.layout_grid_regularity,
            self.layout_element_scale_variance,
            self.layout_above_fold_density,
            self.layout_median_element_size,
        ]
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        LAYOUT_FEATURE_NAMES
            .iter()
            .position(|n| *n == name)
            .map(|i| self.values()[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f64)> {
        LAYOUT_FEATURE_NAMES.into_iter().zip(self.values())
    }

    pub fn to_feature_vector(&self) -> FeatureVector {
        let mut features = FeatureVector::with_capacity(LAYOUT_DIM);
        for (name, value) in self.iter() {
            features.push(name, value);
        }
        features
    }
}

/// Extract layout features from captured nodes.
///
/// Nodes without a positive area are ignored. An empty node set or a
/// zero-area viewport yields all zeros.
pub fn extract_layout_features(
    nodes: &[StyleNode],
    viewport: &Viewport,
    config: &EncoderConfig,
) -> LayoutFeatures {
    let mut nodes: Vec<&StyleNode> = nodes.iter().filter(|n| n.bbox.area() > 0.0).collect();
    // Float accumulation below must not depend on capture order
    nodes.sort_by(|a, b| {
        let key = |n: &StyleNode| (n.bbox.y, n.bbox.x, n.bbox.h, n.bbox.w);
        key(*a)
            .cmp(&key(*b))
            .then_with(|| a.id.cmp(&b.id))
            .then_with(|| a.tag.cmp(&b.tag))
    });
    let viewport_area = viewport.area();
    if nodes.is_empty() || viewport_area <= 0.0 {
        debug!(nodes = nodes.len(), viewport_area, "no measurable layout, using zero features");
        return LayoutFeatures::default();
    }

    let norm = &config.normalization;
    let geo = &config.geometry;
    let boxes: Vec<BoundingBox> = nodes.iter().map(|n| n.bbox).collect();
    let bands = horizontal_bands(&boxes, geo.band_y_threshold);
    let areas: Vec<f64> = boxes.iter().map(BoundingBox::area).collect();

    let features = LayoutFeatures {
        typo_hierarchy_depth: hierarchy_depth(&nodes, norm),
        typo_weight_contrast: weight_contrast(&nodes, norm.weight_contrast_max),
        spacing_density_score: normalize_piecewise(
            areas.iter().sum::<f64>() / viewport_area,
            &norm.density_knots,
        ),
        spacing_whitespace_ratio: whitespace_ratio(&bands, norm.whitespace_midpoint),
        spacing_padding_consistency: padding_consistency(&nodes, norm.padding_k),
        spacing_image_text_balance: image_text_balance(&nodes),
        shape_border_heaviness: border_heaviness(&nodes, norm.border_width_max_px, norm.border_heaviness_max),
        shape_shadow_depth: shadow_depth(&nodes, norm.shadow_fraction_max, norm.shadow_blur_max),
        shape_grouping_strength: grouping_strength(&boxes, geo.proximity_threshold),
        shape_compositional_complexity: normalize_log(bands.len() as f64, norm.complexity_midpoint),
        brand_color_saturation_energy: saturation_energy(&nodes, norm.saturation_chroma_max),
        brand_color_role_distinction: role_distinction(&nodes, norm.role_distance_max),
        layout_vertical_rhythm: vertical_rhythm(&bands, norm.rhythm_k),
        layout_grid_regularity: grid_regularity(&boxes, geo.alignment_tolerance, geo.min_alignment_cluster),
        layout_element_scale_variance: scale_variance(&areas, norm.scale_variance_p10, norm.scale_variance_p90),
        layout_above_fold_density: above_fold_density(&boxes, viewport, &norm.density_knots),
        layout_median_element_size: normalize_log(median(&areas) / viewport_area, norm.median_size_midpoint),
    };

    debug!(
        nodes = nodes.len(),
        bands = bands.len(),
        grid = features.layout_grid_regularity,
        density = features.spacing_density_score,
        "extracted layout features"
    );

    features
}

fn hierarchy_depth(nodes: &[&StyleNode], norm: &NormalizationConfig) -> f64 {
    let sizes: Vec<f64> = nodes
        .iter()
        .filter(|n| n.has_text())
        .filter_map(|n| n.font_size_px())
        .filter(|s| *s > 0.0)
        .collect();
    if sizes.is_empty() {
        return 0.0;
    }

    let distinct: AHashSet<i64> = sizes.iter().map(|s| s.round() as i64).collect();
    let min = sizes.iter().copied().fold(f64::INFINITY, f64::min);
    let max = sizes.iter().copied().fold(0.0_f64, f64::max);
    let ratio = max / min;

    0.5 * norm.hierarchy_size_steps.apply(distinct.len() as f64) + 0.5 * norm.hierarchy_size_ratio.apply(ratio)
}

fn weight_contrast(nodes: &[&StyleNode], max_range: f64) -> f64 {
    let weights: Vec<f64> = nodes
        .iter()
        .filter(|n| n.has_text())
        .filter_map(|n| n.font_weight())
        .collect();
    if weights.len() < 2 {
        return 0.0;
    }
    let min = weights.iter().copied().fold(f64::INFINITY, f64::min);
    let max = weights.iter().copied().fold(0.0_f64, f64::max);
    normalize_linear(max - min, 0.0, max_range)
}

/// Vertical gaps weigh twice as much as horizontal ones. A gap kind with no
/// samples drops out of the average instead of counting as 0.
fn whitespace_ratio(bands: &[stylevec_core::Band], midpoint: f64) -> f64 {
    let vertical = vertical_gaps(bands);
    let horizontal = horizontal_gaps(bands);
    let gap = match (vertical.is_empty(), horizontal.is_empty()) {
        (false, false) => (2.0 * mean(&vertical) + mean(&horizontal)) / 3.0,
        (false, true) => mean(&vertical),
        (true, false) => mean(&horizontal),
        (true, true) => return 0.0,
    };
    normalize_log(gap, midpoint)
}

fn padding_consistency(nodes: &[&StyleNode], k: f64) -> f64 {
    let paddings: Vec<f64> = nodes.iter().flat_map(|n| n.padding_values()).collect();
    if paddings.len() < 2 {
        return 0.0;
    }
    consistency_sigmoid(coefficient_of_variation(&paddings), k)
}

fn image_text_balance(nodes: &[&StyleNode]) -> f64 {
    let mut image_area = 0.0;
    let mut text_area = 0.0;
    for node in nodes {
        if node.is_image() {
            image_area += node.bbox.area();
        } else if node.has_text() {
            text_area += node.bbox.area();
        }
    }
    let total = image_area + text_area;
    if total > 0.0 {
        (image_area / total).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

fn border_heaviness(nodes: &[&StyleNode], full_px: f64, max_raw: f64) -> f64 {
    let weights: Vec<f64> = nodes
        .iter()
        .map(|n| n.visible_border_px().map_or(0.0, |w| w.min(full_px) / full_px))
        .collect();
    normalize_linear(mean(&weights), 0.0, max_raw)
}

fn shadow_depth(nodes: &[&StyleNode], fraction_max: f64, blur_max: f64) -> f64 {
    let blurs: Vec<f64> = nodes.iter().filter_map(|n| n.shadow_blur_px()).collect();
    if blurs.is_empty() {
        return 0.0;
    }
    let fraction = blurs.len() as f64 / nodes.len() as f64;
    0.5 * normalize_linear(fraction, 0.0, fraction_max) + 0.5 * normalize_linear(mean(&blurs), 0.0, blur_max)
}

fn grouping_strength(boxes: &[BoundingBox], threshold: f64) -> f64 {
    if boxes.len() < 2 {
        return 0.0;
    }
    let groups = proximity_groups(boxes, threshold);
    (1.0 - groups.len() as f64 / boxes.len() as f64).clamp(0.0, 1.0)
}

fn saturation_energy(nodes: &[&StyleNode], chroma_max: f64) -> f64 {
    let mut seen: AHashSet<String> = AHashSet::new();
    for node in nodes {
        for css in [&node.styles.color, &node.styles.background_color]
            .into_iter()
            .flatten()
        {
            seen.insert(css.trim().to_ascii_lowercase());
        }
    }

    // Distinct strings can still spell the same color
    let mut colors: Vec<Color> = seen.iter().filter_map(|css| parse_color(css)).collect();
    colors.sort_by(Color::canonical_cmp);
    colors.dedup_by(|a, b| a.canonical_cmp(b).is_eq());

    let chroma: Vec<f64> = colors.iter().map(Color::chroma).collect();
    normalize_linear(mean(&chroma), 0.0, chroma_max)
}

fn role_distinction(nodes: &[&StyleNode], distance_max: f64) -> f64 {
    let distances: Vec<f64> = nodes
        .iter()
        .filter_map(|n| {
            let text = parse_color(n.styles.color.as_deref()?)?;
            let background = parse_color(n.styles.background_color.as_deref()?)?;
            Some(perceptual_distance(&text, &background))
        })
        .collect();
    normalize_linear(mean(&distances), 0.0, distance_max)
}

fn vertical_rhythm(bands: &[stylevec_core::Band], k: f64) -> f64 {
    let gaps = vertical_gaps(bands);
    if gaps.len() < 2 {
        return 0.0;
    }
    consistency_sigmoid(coefficient_of_variation(&gaps), k)
}

fn grid_regularity(boxes: &[BoundingBox], tolerance: f64, min_cluster: usize) -> f64 {
    let lefts: Vec<f64> = boxes.iter().map(|b| b.x as f64).collect();
    let tops: Vec<f64> = boxes.iter().map(|b| b.y as f64).collect();

    let x_lines = alignment_lines(&lefts, tolerance, min_cluster);
    let y_lines = alignment_lines(&tops, tolerance, min_cluster);

    let x_coverage = alignment_coverage(&lefts, &x_lines, tolerance);
    let y_coverage = alignment_coverage(&tops, &y_lines, tolerance);
    ((x_coverage + y_coverage) / 2.0).clamp(0.0, 1.0)
}

fn scale_variance(areas: &[f64], p10: f64, p90: f64) -> f64 {
    if areas.len() < 2 {
        return 0.0;
    }
    let mid = median(areas);
    let spread = if mid > 0.0 {
        (quantile(areas, 0.75) - quantile(areas, 0.25)) / mid
    } else {
        0.0
    };
    normalize_percentile(coefficient_of_variation(areas) + spread, p10, p90)
}

fn above_fold_density(boxes: &[BoundingBox], viewport: &Viewport, knots: &[(f64, f64)]) -> f64 {
    let fold = viewport.height.floor() as i64;
    let clipped: f64 = boxes
        .iter()
        .filter_map(|b| b.clip_to_height(fold))
        .map(|b| b.area())
        .sum();
    normalize_piecewise(clipped / viewport.area(), knots)
}
