//! Collinearity diagnostic for control points.

use glam::DVec2;

/// Zero variance below this is treated as a degenerate axis.
const VARIANCE_EPSILON: f64 = 1e-12;

/// Pearson correlation of the x and y coordinates of the set points.
///
/// `None` and non-finite entries are ignored. Fewer than two valid points
/// give `0.0`. When one axis has no spread at all (points on an
/// axis-parallel line, or all coincident) the set is as collinear as it can
/// be and `1.0` is returned.
pub fn correlation(points: &[Option<DVec2>]) -> f64 {
    let valid: Vec<DVec2> = points
        .iter()
        .flatten()
        .copied()
        .filter(|p| p.is_finite())
        .collect();
    if valid.len() < 2 {
        return 0.0;
    }

    let n = valid.len() as f64;
    let mean = valid.iter().copied().sum::<DVec2>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for p in &valid {
        let d = *p - mean;
        cov += d.x * d.y;
        var_x += d.x * d.x;
        var_y += d.y * d.y;
    }

    if var_x < VARIANCE_EPSILON || var_y < VARIANCE_EPSILON {
        return 1.0;
    }

    (cov / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0)
}

/// Whether a coefficient signals near-collinear points.
#[inline]
pub fn is_collinear(coefficient: f64, threshold: f64) -> bool {
    coefficient.abs() >= threshold
}
