pub mod float_ext;
pub mod log_setup;

pub use float_ext::FloatExt;

/// Tolerance used for general-purpose float comparisons.
pub const EPSILON: f64 = 1e-6;

/// Guard used in place of zero denominators.
pub const DIV_EPSILON: f64 = 1e-9;

pub fn is_debug() -> bool {
    cfg!(debug_assertions)
}
