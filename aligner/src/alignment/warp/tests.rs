use glam::DVec2;

use super::*;
use crate::alignment::homography::{solve_homography, SolverConfig};
use crate::raster::pack_rgba;
use crate::testing::{gradient_raster, smooth_raster};

fn warpers() -> Vec<Box<dyn PerspectiveWarper>> {
    vec![
        WarperKind::Fallback.build(WarpConfig::default()),
        WarperKind::Imageproc.build(WarpConfig::default()),
    ]
}

#[test]
fn test_build_selects_strategy() {
    assert_eq!(
        WarperKind::Fallback.build(WarpConfig::default()).kind(),
        WarperKind::Fallback
    );
    assert_eq!(
        WarperKind::Imageproc.build(WarpConfig::default()).kind(),
        WarperKind::Imageproc
    );
    assert_eq!(WarperKind::default(), WarperKind::Imageproc);
}

#[test]
fn test_identity_is_pixel_exact() {
    let src = gradient_raster(37, 23);
    for warper in warpers() {
        let out = warper
            .warp(&Homography::identity(), &src, src.size())
            .unwrap();
        assert_eq!(out, src, "{} identity warp changed pixels", warper.kind());
    }
}

#[test]
fn test_solved_identity_is_pixel_exact() {
    let pts = [
        DVec2::new(3.0, 4.0),
        DVec2::new(60.0, 2.0),
        DVec2::new(58.0, 40.0),
        DVec2::new(5.0, 44.0),
    ];
    let h = solve_homography(&pts, &pts, &SolverConfig::default()).unwrap();
    let src = gradient_raster(64, 48);
    for warper in warpers() {
        let out = warper.warp(&h, &src, src.size()).unwrap();
        assert_eq!(out, src, "{} solved identity changed pixels", warper.kind());
    }
}

#[test]
fn test_translation_samples_offset_source() {
    let src = gradient_raster(20, 10);
    // destination (x, y) reads source (x + 3, y + 2)
    let h = Homography::from_coefficients([1.0, 0.0, 3.0, 0.0, 1.0, 2.0, 0.0, 0.0]);
    for warper in warpers() {
        let out = warper.warp(&h, &src, src.size()).unwrap();
        assert_eq!(out.get(0, 0), src.get(3, 2), "{}", warper.kind());
        assert_eq!(out.get(16, 7), src.get(19, 9), "{}", warper.kind());
        // source column 20 / row 10 do not exist
        assert_eq!(out.get(17, 0), Some(0), "{}", warper.kind());
        assert_eq!(out.get(0, 8), Some(0), "{}", warper.kind());
    }
}

#[test]
fn test_out_of_range_uses_border() {
    let src = gradient_raster(8, 8);
    let border = [255, 0, 255, 255];
    let h = Homography::from_coefficients([1.0, 0.0, 100.0, 0.0, 1.0, 100.0, 0.0, 0.0]);
    for kind in [WarperKind::Fallback, WarperKind::Imageproc] {
        let out = kind
            .build(WarpConfig { border })
            .warp(&h, &src, Size::new(4, 4))
            .unwrap();
        assert!(out.pixels().iter().all(|&p| p == pack_rgba(border)), "{kind}");
    }
}

#[test]
fn test_destination_size_independent_of_source() {
    let src = gradient_raster(10, 10);
    for warper in warpers() {
        let out = warper
            .warp(&Homography::identity(), &src, Size::new(15, 5))
            .unwrap();
        assert_eq!(out.size(), Size::new(15, 5));
        assert_eq!(out.get(9, 4), src.get(9, 4));
        assert_eq!(out.get(12, 0), Some(0));
    }
}

#[test]
fn test_empty_destination_fails() {
    let src = gradient_raster(4, 4);
    for warper in warpers() {
        assert!(matches!(
            warper.warp(&Homography::identity(), &src, Size::new(0, 4)),
            Err(WarpError::EmptyDestination(_))
        ));
    }
}

#[test]
fn test_fallback_points_at_infinity_use_border() {
    let src = gradient_raster(8, 8);
    // w = 1 - x/4 vanishes at x = 4
    let h = Homography::from_coefficients([1.0, 0.0, 0.0, 0.0, 1.0, 0.0, -0.25, 0.0]);
    let out = FallbackWarper::new(WarpConfig::default())
        .warp(&h, &src, Size::new(8, 8))
        .unwrap();
    assert_eq!(out.get(4, 3), Some(0));
    assert_eq!(out.get(0, 0), src.get(0, 0));
}

#[test]
fn test_strategies_agree_on_interior() {
    let src = smooth_raster(96, 96);
    let h = Homography::from_coefficients([1.02, 0.03, 4.0, -0.02, 0.98, 3.0, 1e-4, -5e-5]);
    let dst = Size::new(96, 96);
    let a = FallbackWarper::new(WarpConfig::default())
        .warp(&h, &src, dst)
        .unwrap();
    let b = ImageprocWarper::new(WarpConfig::default())
        .warp(&h, &src, dst)
        .unwrap();

    let mut max_diff = 0i32;
    for y in 8..80 {
        for x in 8..80 {
            let pa = crate::raster::unpack_rgba(a.get(x, y).unwrap());
            let pb = crate::raster::unpack_rgba(b.get(x, y).unwrap());
            for c in 0..4 {
                max_diff = max_diff.max((pa[c] as i32 - pb[c] as i32).abs());
            }
        }
    }
    // smooth_raster changes by at most 2 per pixel step, so a one-pixel
    // sampling disagreement stays within a couple of levels
    assert!(max_diff <= 4, "strategies diverged by {max_diff}");
}
