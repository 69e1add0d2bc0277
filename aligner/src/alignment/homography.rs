//! Four-point planar homography estimation.
//!
//! Each correspondence `(x, y) -> (u, v)` contributes two rows of an 8x8
//! linear system in the unknowns `h0..h7` (with `h8` fixed at 1):
//!
//! ```text
//! [x y 1 0 0 0 -x*u -y*u] · h = u
//! [0 0 0 x y 1 -x*v -y*v] · h = v
//! ```
//!
//! Both point sets are Hartley-normalized (centroid at the origin, mean
//! distance √2) before the system is built, and the conditioning of the
//! normalized system is checked before solving.

use glam::DVec2;
use nalgebra::{SMatrix, SVector};
use serde::{Deserialize, Serialize};

use crate::math::DMat3;
use crate::pointer::MAX_CONTROL_POINTS;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum HomographyError {
    #[error("Missing control points: found {found}, need {required}")]
    MissingControlPoints { found: usize, required: usize },
    #[error("Too many control points: found {found}, need exactly {required}")]
    TooManyControlPoints { found: usize, required: usize },
    #[error("Control points must be finite")]
    NonFinitePoint,
    #[error(
        "Control points are degenerate (reciprocal condition {rcond:.3e}); adjust control points"
    )]
    IllConditioned { rcond: f64 },
    #[error("Three control points are collinear (area {area:.3e}); adjust control points")]
    CollinearTriple { area: f64 },
    #[error("Linear system is singular; adjust control points")]
    Singular,
    #[error("Solution misses its control points by {residual:.3e} px; adjust control points")]
    Inaccurate { residual: f64 },
}

/// Numerical thresholds for [`solve_homography`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Smallest accepted ratio of smallest to largest singular value of the
    /// normalized 8x8 system.
    pub min_reciprocal_condition: f64,
    /// Smallest accepted triangle area spanned by any three normalized points.
    pub min_triangle_area: f64,
    /// Reprojection error (pixels) above which the debug self-check logs a warning.
    pub residual_tolerance: f64,
    /// Reprojection error (pixels) above which the solution is rejected.
    pub max_residual: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            min_reciprocal_condition: 1e-10,
            min_triangle_area: 1e-4,
            residual_tolerance: 1e-9,
            max_residual: 1e-3,
        }
    }
}

impl SolverConfig {
    pub fn validate(&self) {
        assert!(
            self.min_reciprocal_condition >= 0.0 && self.min_reciprocal_condition < 1.0,
            "min_reciprocal_condition must be in [0, 1), got {}",
            self.min_reciprocal_condition
        );
        assert!(
            self.min_triangle_area >= 0.0,
            "min_triangle_area must be non-negative, got {}",
            self.min_triangle_area
        );
        assert!(
            self.residual_tolerance > 0.0,
            "residual_tolerance must be positive, got {}",
            self.residual_tolerance
        );
        assert!(
            self.max_residual >= self.residual_tolerance,
            "max_residual must be at least residual_tolerance, got {}",
            self.max_residual
        );
    }
}

/// Projective transform with the bottom-right entry fixed at 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Homography {
    matrix: DMat3,
}

impl Default for Homography {
    fn default() -> Self {
        Self::identity()
    }
}

impl std::fmt::Display for Homography {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let m = self.matrix.as_array();
        write!(
            f,
            "Homography([{:.6}, {:.6}, {:.3}], [{:.6}, {:.6}, {:.3}], [{:.3e}, {:.3e}, 1])",
            m[0], m[1], m[2], m[3], m[4], m[5], m[6], m[7]
        )
    }
}

impl Homography {
    pub const fn identity() -> Self {
        Self {
            matrix: DMat3::identity(),
        }
    }

    /// From `[h0..h7]`; `h8` is 1.
    pub fn from_coefficients(h: [f64; 8]) -> Self {
        Self {
            matrix: DMat3::from_array([h[0], h[1], h[2], h[3], h[4], h[5], h[6], h[7], 1.0]),
        }
    }

    /// From an arbitrary projective matrix, rescaled so `m[8] == 1`.
    pub fn from_matrix(matrix: DMat3) -> Option<Self> {
        matrix.normalized().map(|matrix| Self { matrix })
    }

    #[inline]
    pub fn matrix(&self) -> &DMat3 {
        &self.matrix
    }

    pub fn coefficients(&self) -> [f64; 8] {
        let m = self.matrix.as_array();
        [m[0], m[1], m[2], m[3], m[4], m[5], m[6], m[7]]
    }

    /// Map a point; `None` when it lands at infinity.
    #[inline]
    pub fn apply(&self, p: DVec2) -> Option<DVec2> {
        self.matrix.transform_point(p)
    }

    pub fn inverse(&self) -> Option<Homography> {
        self.matrix.inverse().and_then(Self::from_matrix)
    }

    /// Largest distance between `apply(from[i])` and `to[i]`.
    ///
    /// Points mapped to infinity count as infinite error.
    pub fn max_residual(&self, from: &[DVec2], to: &[DVec2]) -> f64 {
        from.iter()
            .zip(to)
            .map(|(&f, &t)| self.apply(f).map_or(f64::INFINITY, |p| p.distance(t)))
            .fold(0.0, f64::max)
    }

    pub fn is_finite(&self) -> bool {
        self.matrix.as_array().iter().all(|v| v.is_finite())
    }
}

/// Solve for `H` with `H(from[i]) == to[i]` for exactly four correspondences.
pub fn solve_homography(
    from: &[DVec2],
    to: &[DVec2],
    config: &SolverConfig,
) -> Result<Homography, HomographyError> {
    let found = from.len().min(to.len());
    if found < MAX_CONTROL_POINTS {
        return Err(HomographyError::MissingControlPoints {
            found,
            required: MAX_CONTROL_POINTS,
        });
    }
    let found = from.len().max(to.len());
    if found > MAX_CONTROL_POINTS {
        return Err(HomographyError::TooManyControlPoints {
            found,
            required: MAX_CONTROL_POINTS,
        });
    }
    if !from.iter().chain(to).all(|p| p.is_finite()) {
        return Err(HomographyError::NonFinitePoint);
    }

    let (from_norm, from_t) = normalize_points(from);
    let (to_norm, to_t) = normalize_points(to);

    // A collinear triple leaves the system solvable but H rank-deficient.
    let area = min_triangle_area(&from_norm).min(min_triangle_area(&to_norm));
    if area < config.min_triangle_area {
        tracing::debug!(area, "Homography rejected: collinear control points");
        return Err(HomographyError::CollinearTriple { area });
    }

    let mut a = SMatrix::<f64, 8, 8>::zeros();
    let mut b = SVector::<f64, 8>::zeros();
    for (i, (p, q)) in from_norm.iter().zip(&to_norm).enumerate() {
        let r = 2 * i;
        a.row_mut(r)
            .copy_from_slice(&[p.x, p.y, 1.0, 0.0, 0.0, 0.0, -p.x * q.x, -p.y * q.x]);
        a.row_mut(r + 1)
            .copy_from_slice(&[0.0, 0.0, 0.0, p.x, p.y, 1.0, -p.x * q.y, -p.y * q.y]);
        b[r] = q.x;
        b[r + 1] = q.y;
    }

    let singular_values = a.singular_values();
    let max_sv = singular_values.max();
    let rcond = if max_sv > 0.0 {
        singular_values.min() / max_sv
    } else {
        0.0
    };
    if !rcond.is_finite() || rcond < config.min_reciprocal_condition {
        tracing::debug!(rcond, "Homography system rejected as ill-conditioned");
        return Err(HomographyError::IllConditioned { rcond });
    }

    let h = a.lu().solve(&b).ok_or(HomographyError::Singular)?;
    let h_norm = Homography::from_coefficients([h[0], h[1], h[2], h[3], h[4], h[5], h[6], h[7]]);
    let det = h_norm.matrix().determinant().abs();
    if !det.is_finite() || det < config.min_reciprocal_condition {
        tracing::debug!(det, "Homography rejected: singular solution");
        return Err(HomographyError::Singular);
    }

    // Denormalize: H = T_to^-1 * H_norm * T_from
    let to_t_inv = to_t.inverse().ok_or(HomographyError::Singular)?;
    let denorm = to_t_inv.mul_mat(h_norm.matrix()).mul_mat(&from_t);
    let homography = Homography::from_matrix(denorm).ok_or(HomographyError::Singular)?;
    if !homography.is_finite() {
        return Err(HomographyError::Singular);
    }

    let residual = homography.max_residual(from, to);
    if !residual.is_finite() || residual > config.max_residual {
        tracing::warn!(residual, rcond, "Homography rejected: control points not reproduced");
        return Err(HomographyError::Inaccurate { residual });
    }
    if common::is_debug() {
        if residual > config.residual_tolerance {
            tracing::warn!(
                residual,
                tolerance = config.residual_tolerance,
                rcond,
                "Homography does not reproduce its control points exactly"
            );
        } else {
            tracing::debug!(residual, rcond, "Homography self-check passed");
        }
    }

    Ok(homography)
}

/// Smallest area of a triangle formed by any three of `points`.
fn min_triangle_area(points: &[DVec2]) -> f64 {
    let n = points.len();
    let mut min = f64::INFINITY;
    for i in 0..n {
        for j in i + 1..n {
            for k in j + 1..n {
                let area = (points[j] - points[i]).perp_dot(points[k] - points[i]).abs() * 0.5;
                min = min.min(area);
            }
        }
    }
    min
}

/// Translate to the centroid and scale so the mean distance from it is √2.
///
/// Returns the normalized points and the matrix that produced them.
/// Coincident points get the identity.
pub(crate) fn normalize_points(points: &[DVec2]) -> (Vec<DVec2>, DMat3) {
    if points.is_empty() {
        return (Vec::new(), DMat3::identity());
    }

    let c = points.iter().copied().sum::<DVec2>() / points.len() as f64;
    let avg_dist = points.iter().map(|p| p.distance(c)).sum::<f64>() / points.len() as f64;

    if avg_dist < 1e-10 {
        return (points.to_vec(), DMat3::identity());
    }

    let scale = std::f64::consts::SQRT_2 / avg_dist;
    let normalized = points.iter().map(|p| (*p - c) * scale).collect();

    (normalized, DMat3::scale_translate(scale, -c * scale))
}
