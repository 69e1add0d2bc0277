//! Row-major 3x3 matrix of f64 values.

use glam::DVec2;
use std::ops::{Index, Mul};

/// Row-major 3x3 matrix of f64 values.
///
/// For 2D projective transforms the layout is:
/// ```text
/// | m[0] m[1] m[2] |   | h0 h1 h2 |
/// | m[3] m[4] m[5] | = | h3 h4 h5 |
/// | m[6] m[7] m[8] |   | h6 h7 1  |
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DMat3 {
    data: [f64; 9],
}

impl DMat3 {
    /// Points whose homogeneous `w` falls below this are treated as being at infinity.
    pub const W_EPSILON: f64 = 1e-12;

    #[inline]
    pub const fn from_array(data: [f64; 9]) -> Self {
        Self { data }
    }

    #[inline]
    pub const fn identity() -> Self {
        Self {
            data: [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0],
        }
    }

    /// Scale-then-translate matrix: `p' = p * scale + offset`.
    #[inline]
    pub const fn scale_translate(scale: f64, offset: DVec2) -> Self {
        Self {
            data: [scale, 0.0, offset.x, 0.0, scale, offset.y, 0.0, 0.0, 1.0],
        }
    }

    #[inline]
    pub const fn as_array(&self) -> &[f64; 9] {
        &self.data
    }

    #[inline]
    pub const fn to_array(self) -> [f64; 9] {
        self.data
    }

    /// Lossy conversion for APIs that take `f32` matrices.
    pub fn to_f32_array(&self) -> [f32; 9] {
        self.data.map(|v| v as f32)
    }

    /// Matrix multiplication: `self * rhs`.
    pub fn mul_mat(&self, rhs: &DMat3) -> DMat3 {
        let a = &self.data;
        let b = &rhs.data;
        let mut out = [0.0; 9];
        for row in 0..3 {
            for col in 0..3 {
                out[row * 3 + col] = a[row * 3] * b[col]
                    + a[row * 3 + 1] * b[3 + col]
                    + a[row * 3 + 2] * b[6 + col];
            }
        }
        DMat3 { data: out }
    }

    pub fn determinant(&self) -> f64 {
        let d = &self.data;
        d[0] * (d[4] * d[8] - d[5] * d[7]) - d[1] * (d[3] * d[8] - d[5] * d[6])
            + d[2] * (d[3] * d[7] - d[4] * d[6])
    }

    /// Matrix inverse, or `None` if the determinant is below `1e-12`.
    pub fn inverse(&self) -> Option<DMat3> {
        let det = self.determinant();
        if !det.is_finite() || det.abs() < 1e-12 {
            return None;
        }
        let inv_det = 1.0 / det;
        let d = &self.data;
        Some(DMat3 {
            data: [
                (d[4] * d[8] - d[5] * d[7]) * inv_det,
                (d[2] * d[7] - d[1] * d[8]) * inv_det,
                (d[1] * d[5] - d[2] * d[4]) * inv_det,
                (d[5] * d[6] - d[3] * d[8]) * inv_det,
                (d[0] * d[8] - d[2] * d[6]) * inv_det,
                (d[2] * d[3] - d[0] * d[5]) * inv_det,
                (d[3] * d[7] - d[4] * d[6]) * inv_det,
                (d[1] * d[6] - d[0] * d[7]) * inv_det,
                (d[0] * d[4] - d[1] * d[3]) * inv_det,
            ],
        })
    }

    /// Divide every entry by `m[8]`, or `None` when `m[8]` is near zero.
    pub fn normalized(&self) -> Option<DMat3> {
        let scale = self.data[8];
        if !scale.is_finite() || scale.abs() < 1e-10 {
            return None;
        }
        Some(DMat3 {
            data: self.data.map(|v| v / scale),
        })
    }

    /// Apply as a 2D homogeneous transform.
    ///
    /// ```text
    /// w  = m[6]*x + m[7]*y + m[8]
    /// x' = (m[0]*x + m[1]*y + m[2]) / w
    /// y' = (m[3]*x + m[4]*y + m[5]) / w
    /// ```
    ///
    /// Returns `None` for points mapped to infinity.
    #[inline]
    pub fn transform_point(&self, p: DVec2) -> Option<DVec2> {
        let d = &self.data;
        let w = d[6] * p.x + d[7] * p.y + d[8];
        if !w.is_finite() || w.abs() < Self::W_EPSILON {
            return None;
        }
        Some(DVec2::new(
            (d[0] * p.x + d[1] * p.y + d[2]) / w,
            (d[3] * p.x + d[4] * p.y + d[5]) / w,
        ))
    }

    /// Largest absolute element-wise difference.
    pub fn max_abs_diff(&self, other: &DMat3) -> f64 {
        self.data
            .iter()
            .zip(other.data.iter())
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, f64::max)
    }
}

impl Default for DMat3 {
    #[inline]
    fn default() -> Self {
        Self::identity()
    }
}

impl From<[f64; 9]> for DMat3 {
    #[inline]
    fn from(data: [f64; 9]) -> Self {
        Self { data }
    }
}

impl Index<usize> for DMat3 {
    type Output = f64;
    #[inline]
    fn index(&self, idx: usize) -> &f64 {
        &self.data[idx]
    }
}

impl Mul for DMat3 {
    type Output = DMat3;
    #[inline]
    fn mul(self, rhs: DMat3) -> DMat3 {
        self.mul_mat(&rhs)
    }
}
