//! Statistical utilities and normalization strategies
//!
//! Every normalization maps a raw measurement into [0, 1] and never returns
//! NaN or infinity, whatever the input.

use ordered_float::OrderedFloat;

/// Arithmetic mean; 0.0 for an empty slice
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    finite_or(values.iter().sum::<f64>() / values.len() as f64, 0.0)
}

/// Population standard deviation; 0.0 for fewer than two values
pub fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    finite_or(variance.sqrt(), 0.0)
}

/// Standard deviation divided by mean.
///
/// Returns 0.0 when there are fewer than two values or the mean is ~0.
pub fn coefficient_of_variation(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    if m.abs() < f64::EPSILON {
        return 0.0;
    }
    finite_or(std_dev(values) / m.abs(), 0.0)
}

fn sorted(values: &[f64]) -> Vec<f64> {
    let mut v: Vec<f64> = values.iter().copied().filter(|x| x.is_finite()).collect();
    v.sort_by_key(|x| OrderedFloat(*x));
    v
}

/// Quantile with linear interpolation between closest ranks, `q` in [0, 1]
pub fn quantile(values: &[f64], q: f64) -> f64 {
    let v = sorted(values);
    if v.is_empty() {
        return 0.0;
    }
    let q = q.clamp(0.0, 1.0);
    let pos = q * (v.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f64;
    v[lower] + (v[upper] - v[lower]) * frac
}

pub fn median(values: &[f64]) -> f64 {
    quantile(values, 0.5)
}

/// Linear normalization clamped to [0, 1]. Non-decreasing in `value`.
pub fn normalize_linear(value: f64, min: f64, max: f64) -> f64 {
    if !value.is_finite() || !(max > min) {
        return 0.0;
    }
    ((value - min) / (max - min)).clamp(0.0, 1.0)
}

/// Logarithmic normalization where `midpoint` maps to 0.5.
///
/// `ln(1 + v) / (2 ln(1 + midpoint))`, clamped. Values ≤ 0 map to 0 and the
/// curve saturates at `(1 + midpoint)² - 1`.
pub fn normalize_log(value: f64, midpoint: f64) -> f64 {
    if !value.is_finite() || value <= 0.0 || !(midpoint > 0.0) {
        return 0.0;
    }
    let scale = 2.0 * midpoint.ln_1p();
    finite_or(value.ln_1p() / scale, 0.0).clamp(0.0, 1.0)
}

/// Piecewise-linear normalization through `(x, y)` knots sorted by x.
///
/// Inputs below the first knot take its y, inputs above the last knot take
/// the last y.
pub fn normalize_piecewise(value: f64, knots: &[(f64, f64)]) -> f64 {
    let (first, last) = match (knots.first(), knots.last()) {
        (Some(f), Some(l)) => (*f, *l),
        _ => return 0.0,
    };
    if !value.is_finite() || value <= first.0 {
        return first.1.clamp(0.0, 1.0);
    }
    if value >= last.0 {
        return last.1.clamp(0.0, 1.0);
    }
    for pair in knots.windows(2) {
        let (x0, y0) = pair[0];
        let (x1, y1) = pair[1];
        if value <= x1 {
            if x1 <= x0 {
                return y1.clamp(0.0, 1.0);
            }
            let t = (value - x0) / (x1 - x0);
            return (y0 + (y1 - y0) * t).clamp(0.0, 1.0);
        }
    }
    last.1.clamp(0.0, 1.0)
}

/// Percentile-anchored normalization: `p10` maps to 0.1 and `p90` to 0.9.
///
/// Keeps headroom at both ends so typical values neither floor nor ceiling.
pub fn normalize_percentile(value: f64, p10: f64, p90: f64) -> f64 {
    if !value.is_finite() || !(p90 > p10) {
        return 0.0;
    }
    (0.1 + 0.8 * (value - p10) / (p90 - p10)).clamp(0.0, 1.0)
}

/// Consistency score from a coefficient of variation: `1 / (1 + (cv/k)²)`.
///
/// Spreads the common CV range (0.3 - 1.5) instead of compressing it the way
/// `1 / (1 + cv)` does.
pub fn consistency_sigmoid(cv: f64, k: f64) -> f64 {
    if !cv.is_finite() || !(k > 0.0) {
        return 0.0;
    }
    let ratio = cv.abs() / k;
    finite_or(1.0 / (1.0 + ratio * ratio), 0.0)
}

/// Circular encoding of an angle in degrees as `(cos θ, sin θ)`
pub fn circular(degrees: f64) -> (f64, f64) {
    if !degrees.is_finite() {
        return (1.0, 0.0);
    }
    let radians = degrees.rem_euclid(360.0).to_radians();
    (radians.cos(), radians.sin())
}

/// Replace NaN and infinities with `fallback`
#[inline]
pub fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_and_std() {
        assert_eq!(mean(&[]), 0.0);
        assert!((mean(&[1.0, 2.0, 3.0]) - 2.0).abs() < 1e-12);
        assert!((std_dev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]) - 2.0).abs() < 1e-12);
        assert_eq!(std_dev(&[5.0]), 0.0);
    }

    #[test]
    fn test_coefficient_of_variation() {
        assert_eq!(coefficient_of_variation(&[10.0, 10.0, 10.0]), 0.0);
        assert_eq!(coefficient_of_variation(&[0.0, 0.0]), 0.0);
        assert_eq!(coefficient_of_variation(&[3.0]), 0.0);
        let cv = coefficient_of_variation(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert!((cv - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_quantiles() {
        let values = [4.0, 1.0, 3.0, 2.0];
        assert!((median(&values) - 2.5).abs() < 1e-12);
        assert_eq!(quantile(&values, 0.0), 1.0);
        assert_eq!(quantile(&values, 1.0), 4.0);
        assert!((quantile(&values, 0.25) - 1.75).abs() < 1e-12);
        assert_eq!(median(&[]), 0.0);
    }

    #[test]
    fn test_linear_is_monotonic_and_clamped() {
        let mut prev = -1.0;
        for i in -10..=60 {
            let v = normalize_linear(i as f64, 0.0, 50.0);
            assert!(v >= prev);
            assert!((0.0..=1.0).contains(&v));
            prev = v;
        }
        assert_eq!(normalize_linear(25.0, 0.0, 50.0), 0.5);
        assert_eq!(normalize_linear(1.0, 5.0, 5.0), 0.0);
        assert_eq!(normalize_linear(f64::NAN, 0.0, 1.0), 0.0);
    }

    #[test]
    fn test_log_monotonic_with_fixed_midpoint() {
        assert!((normalize_log(48.0, 48.0) - 0.5).abs() < 1e-12);
        let mut prev = 0.0;
        for v in [0.0, 1.0, 5.0, 20.0, 48.0, 100.0, 500.0, 5000.0] {
            let n = normalize_log(v, 48.0);
            assert!(n >= prev, "log normalization decreased at {v}");
            assert!((0.0..=1.0).contains(&n));
            prev = n;
        }
        assert_eq!(normalize_log(-3.0, 10.0), 0.0);
        assert_eq!(normalize_log(3.0, 0.0), 0.0);
    }

    #[test]
    fn test_piecewise_curve() {
        let knots = [(0.0, 0.0), (0.5, 0.25), (1.5, 0.45), (2.5, 0.85), (5.0, 1.0)];
        assert_eq!(normalize_piecewise(-1.0, &knots), 0.0);
        assert!((normalize_piecewise(0.25, &knots) - 0.125).abs() < 1e-12);
        assert!((normalize_piecewise(2.0, &knots) - 0.65).abs() < 1e-12);
        assert_eq!(normalize_piecewise(10.0, &knots), 1.0);
        assert_eq!(normalize_piecewise(1.0, &[]), 0.0);
    }

    #[test]
    fn test_percentile_keeps_headroom() {
        assert!((normalize_percentile(0.8, 0.8, 6.0) - 0.1).abs() < 1e-12);
        assert!((normalize_percentile(6.0, 0.8, 6.0) - 0.9).abs() < 1e-12);
        assert_eq!(normalize_percentile(100.0, 0.8, 6.0), 1.0);
        assert_eq!(normalize_percentile(0.0, 0.8, 6.0), 0.0);
    }

    #[test]
    fn test_consistency_sigmoid() {
        assert_eq!(consistency_sigmoid(0.0, 0.7), 1.0);
        assert!((consistency_sigmoid(0.7, 0.7) - 0.5).abs() < 1e-12);
        assert!(consistency_sigmoid(0.3, 0.7) > consistency_sigmoid(1.5, 0.7));
        assert_eq!(consistency_sigmoid(f64::INFINITY, 0.7), 0.0);
    }

    #[test]
    fn test_circular_wraps() {
        let (c0, s0) = circular(0.0);
        let (c360, s360) = circular(360.0);
        assert!((c0 - c360).abs() < 1e-12 && (s0 - s360).abs() < 1e-12);

        let (c1, s1) = circular(1.0);
        let (c359, s359) = circular(359.0);
        assert!((c1 - c359).abs() < 1e-3);
        assert!((s1 + s359).abs() < 1e-12);

        for deg in [0.0, 45.0, 123.4, 270.0, 359.9] {
            let (c, s) = circular(deg);
            assert!((c * c + s * s - 1.0).abs() < 1e-9);
        }
    }
}
