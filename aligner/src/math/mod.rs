//! Small fixed-size linear algebra used by the homography solver.

mod dmat3;

pub use dmat3::DMat3;
