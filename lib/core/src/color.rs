//! Perceptual color math
//!
//! CSS color strings are parsed into sRGB and converted to CIE Lab / LCh
//! (D65). Perceptual distance is CIEDE2000 ΔE: 0 for identical colors, about
//! 100 between black and white, and roughly 0-120 for any pair of sRGB
//! colors. Normalization constants downstream are tuned to this range.

use ordered_float::OrderedFloat;
use palette::color_difference::Ciede2000;
use palette::white_point::D65;
use palette::{FromColor, Hsl, Lab, Lch, LinSrgb, Srgb};
use serde::Serialize;
use std::cmp::Ordering;

/// Chroma below which a color is treated as gray; its hue carries no signal.
pub const ACHROMATIC_CHROMA: f64 = 2.0;

/// A parsed color in cylindrical perceptual space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Color {
    lightness: f64,
    chroma: f64,
    hue: f64,
    #[serde(skip)]
    lab: Lab<D65, f32>,
    #[serde(skip)]
    rgb: Srgb<f32>,
}

impl Color {
    /// Build from 8-bit sRGB channels
    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::from_srgb(Srgb::new(r, g, b).into_format::<f32>())
    }

    fn from_srgb(rgb: Srgb<f32>) -> Self {
        let rgb = Srgb::new(
            rgb.red.clamp(0.0, 1.0),
            rgb.green.clamp(0.0, 1.0),
            rgb.blue.clamp(0.0, 1.0),
        );
        let lab: Lab<D65, f32> = Lab::from_color(rgb);
        let lch: Lch<D65, f32> = Lch::from_color(lab);
        let hue = f64::from(lch.hue.into_positive_degrees());

        Self {
            lightness: f64::from(lch.l).clamp(0.0, 100.0),
            chroma: f64::from(lch.chroma).max(0.0),
            hue: if hue.is_finite() { hue.rem_euclid(360.0) } else { 0.0 },
            lab,
            rgb,
        }
    }

    /// Lightness L in [0, 100]
    #[inline]
    pub fn lightness(&self) -> f64 {
        self.lightness
    }

    /// Chroma C, 0 for grays and up to ~134 for saturated sRGB blues
    #[inline]
    pub fn chroma(&self) -> f64 {
        self.chroma
    }

    /// Hue angle in [0, 360)
    #[inline]
    pub fn hue(&self) -> f64 {
        self.hue
    }

    /// Hue as `(cos θ, sin θ)` so that 359° and 1° land next to each other
    pub fn hue_circular(&self) -> (f64, f64) {
        crate::stats::circular(self.hue)
    }

    pub fn is_achromatic(&self) -> bool {
        self.chroma < ACHROMATIC_CHROMA
    }

    pub fn lab(&self) -> Lab<D65, f32> {
        self.lab
    }

    /// WCAG 2.x relative luminance in [0, 1]
    pub fn relative_luminance(&self) -> f64 {
        let linear: LinSrgb<f32> = self.rgb.into_linear();
        let y = 0.2126 * linear.red + 0.7152 * linear.green + 0.0722 * linear.blue;
        f64::from(y).clamp(0.0, 1.0)
    }

    /// Total order on Lab coordinates, used to canonicalize operand order
    pub fn canonical_cmp(&self, other: &Color) -> Ordering {
        let key = |c: &Color| {
            (
                OrderedFloat(c.lab.l),
                OrderedFloat(c.lab.a),
                OrderedFloat(c.lab.b),
            )
        };
        key(self).cmp(&key(other))
    }
}

/// Colorimetry capability: parsing and perceptual distance.
pub trait ColorSpace {
    fn parse(&self, css: &str) -> Option<Color>;

    /// Symmetric perceptual distance, zero for identical colors
    fn distance(&self, a: &Color, b: &Color) -> f64;
}

/// CIEDE2000 over CIE Lab (D65). The default space.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ciede2000Space;

impl ColorSpace for Ciede2000Space {
    fn parse(&self, css: &str) -> Option<Color> {
        parse_css(css)
    }

    fn distance(&self, a: &Color, b: &Color) -> f64 {
        // Evaluate with a fixed operand order so the float result is
        // bit-identical for (a, b) and (b, a).
        let (first, second) = match a.canonical_cmp(b) {
            Ordering::Greater => (b, a),
            _ => (a, b),
        };
        let delta = f64::from(first.lab.difference(second.lab));
        if delta.is_finite() {
            delta.max(0.0)
        } else {
            0.0
        }
    }
}

/// Parse a CSS color with the default color space. `None` for
/// `transparent`, `none`, empty, fully transparent or unparseable input.
pub fn parse_color(css: &str) -> Option<Color> {
    Ciede2000Space.parse(css)
}

/// CIEDE2000 distance with the default color space
pub fn perceptual_distance(a: &Color, b: &Color) -> f64 {
    Ciede2000Space.distance(a, b)
}

/// WCAG contrast ratio in [1, 21]
pub fn contrast_ratio(a: &Color, b: &Color) -> f64 {
    let la = a.relative_luminance();
    let lb = b.relative_luminance();
    let (hi, lo) = if la >= lb { (la, lb) } else { (lb, la) };
    ((hi + 0.05) / (lo + 0.05)).clamp(1.0, 21.0)
}

fn parse_css(css: &str) -> Option<Color> {
    let s = css.trim().to_ascii_lowercase();
    match s.as_str() {
        "" | "none" | "transparent" | "currentcolor" | "inherit" | "initial" | "unset" => {
            return None
        }
        _ => {}
    }

    let (rgb, alpha) = if let Some(hex) = s.strip_prefix('#') {
        parse_hex(hex)?
    } else if let Some(args) = function_args(&s, &["rgba", "rgb"]) {
        parse_rgb_args(args)?
    } else if let Some(args) = function_args(&s, &["hsla", "hsl"]) {
        parse_hsl_args(args)?
    } else {
        let named = palette::named::from_str(&s)?;
        (named.into_format::<f32>(), 1.0)
    };

    if alpha <= 0.0 {
        return None;
    }
    Some(Color::from_srgb(rgb))
}

/// Returns the argument list of `name(...)` for the first matching name
fn function_args<'a>(s: &'a str, names: &[&str]) -> Option<&'a str> {
    names.iter().find_map(|name| {
        s.strip_prefix(name)
            .map(str::trim_start)
            .and_then(|rest| rest.strip_prefix('('))
            .and_then(|rest| rest.strip_suffix(')'))
    })
}

fn parse_hex(hex: &str) -> Option<(Srgb<f32>, f32)> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let expand = |c: &str| u8::from_str_radix(&c.repeat(2), 16).ok();
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();

    let (r, g, b, a) = match hex.len() {
        3 => (expand(&hex[0..1])?, expand(&hex[1..2])?, expand(&hex[2..3])?, 255),
        4 => (
            expand(&hex[0..1])?,
            expand(&hex[1..2])?,
            expand(&hex[2..3])?,
            expand(&hex[3..4])?,
        ),
        6 => (byte(0)?, byte(2)?, byte(4)?, 255),
        8 => (byte(0)?, byte(2)?, byte(4)?, byte(6)?),
        _ => return None,
    };

    Some((
        Srgb::new(r, g, b).into_format::<f32>(),
        f32::from(a) / 255.0,
    ))
}

/// Split `a, b, c[, d]` or `a b c[ / d]` into components
fn split_args(args: &str) -> Vec<&str> {
    args.split(|c: char| c == ',' || c == '/' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .collect()
}

fn parse_number(part: &str) -> Option<f32> {
    let v: f32 = part.parse().ok()?;
    v.is_finite().then_some(v)
}

fn parse_alpha(part: Option<&&str>) -> Option<f32> {
    match part {
        None => Some(1.0),
        Some(p) => match p.strip_suffix('%') {
            Some(pct) => parse_number(pct).map(|v| (v / 100.0).clamp(0.0, 1.0)),
            None => parse_number(p).map(|v| v.clamp(0.0, 1.0)),
        },
    }
}

fn parse_rgb_args(args: &str) -> Option<(Srgb<f32>, f32)> {
    let parts = split_args(args);
    if parts.len() != 3 && parts.len() != 4 {
        return None;
    }
    let channel = |p: &str| -> Option<f32> {
        match p.strip_suffix('%') {
            Some(pct) => parse_number(pct).map(|v| (v / 100.0).clamp(0.0, 1.0)),
            None => parse_number(p).map(|v| (v / 255.0).clamp(0.0, 1.0)),
        }
    };
    let rgb = Srgb::new(channel(parts[0])?, channel(parts[1])?, channel(parts[2])?);
    Some((rgb, parse_alpha(parts.get(3))?))
}

fn parse_hsl_args(args: &str) -> Option<(Srgb<f32>, f32)> {
    let parts = split_args(args);
    if parts.len() != 3 && parts.len() != 4 {
        return None;
    }
    let hue = parse_number(parts[0].trim_end_matches("deg"))?;
    let percent = |p: &str| parse_number(p.trim_end_matches('%')).map(|v| (v / 100.0).clamp(0.0, 1.0));
    let hsl: Hsl<palette::encoding::Srgb, f32> = Hsl::new(hue, percent(parts[1])?, percent(parts[2])?);
    let rgb: Srgb<f32> = Srgb::from_color(hsl);
    Some((rgb, parse_alpha(parts.get(3))?))
}
