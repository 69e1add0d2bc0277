pub trait FloatExt: Sized {
    fn approximately_eq(self, other: Self) -> bool;

    fn approximately_eq_eps(self, other: Self, eps: Self) -> bool;

    /// Returns `self`, or `eps` with the sign of `self` when `|self| < eps`.
    ///
    /// Zero maps to `+eps`.
    fn nonzero_or(self, eps: Self) -> Self;
}

impl FloatExt for f32 {
    fn approximately_eq(self, other: Self) -> bool {
        self.approximately_eq_eps(other, crate::EPSILON as f32)
    }

    fn approximately_eq_eps(self, other: Self, eps: Self) -> bool {
        (self - other).abs() < eps
    }

    fn nonzero_or(self, eps: Self) -> Self {
        if self.abs() >= eps {
            self
        } else if self < 0.0 {
            -eps
        } else {
            eps
        }
    }
}

impl FloatExt for f64 {
    fn approximately_eq(self, other: Self) -> bool {
        self.approximately_eq_eps(other, crate::EPSILON)
    }

    fn approximately_eq_eps(self, other: Self, eps: Self) -> bool {
        (self - other).abs() < eps
    }

    fn nonzero_or(self, eps: Self) -> Self {
        if self.abs() >= eps {
            self
        } else if self < 0.0 {
            -eps
        } else {
            eps
        }
    }
}
