//! Control-point alignment: collinearity diagnostic, homography solve and warping.

pub mod correlation;
pub mod homography;
pub mod warp;


pub use correlation::{correlation, is_collinear};
pub use homography::{solve_homography, Homography, HomographyError, SolverConfig};
pub use warp::{
    FallbackWarper, ImageprocWarper, PerspectiveWarper, WarpConfig, WarpError, WarperKind,
};
