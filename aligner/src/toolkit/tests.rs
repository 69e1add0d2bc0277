use glam::DVec2;

use super::*;
use crate::alignment::WarperKind;
use crate::pointer::ControlPointError;
use crate::testing::{gradient_raster, smooth_raster};

const A_POINTS: [(f64, f64); 4] = [
    (100.0, 100.0),
    (700.0, 100.0),
    (700.0, 500.0),
    (100.0, 500.0),
];
const B_POINTS: [(f64, f64); 4] = [
    (120.0, 110.0),
    (680.0, 105.0),
    (690.0, 480.0),
    (110.0, 490.0),
];

fn points(raw: &[(f64, f64)]) -> Vec<DVec2> {
    raw.iter().map(|&(x, y)| DVec2::new(x, y)).collect()
}

fn toolkit(warper: WarperKind) -> Toolkit {
    Toolkit::new(ToolkitConfig {
        warper,
        ..Default::default()
    })
}

/// Left: 800x600 reference, right: 820x620 target, both with control points.
fn scenario(warper: WarperKind) -> Toolkit {
    let mut tk = toolkit(warper);
    tk.load_panel(PanelId::Left, gradient_raster(800, 600));
    tk.load_panel(PanelId::Right, smooth_raster(820, 620));
    tk.set_control_points(PanelId::Left, &points(&A_POINTS))
        .unwrap();
    tk.set_control_points(PanelId::Right, &points(&B_POINTS))
        .unwrap();
    tk.drain_events();
    tk
}

fn statuses(events: &[ToolkitEvent], id: PanelId) -> Vec<PanelStatus> {
    events
        .iter()
        .filter_map(|e| match e {
            ToolkitEvent::StatusChanged { panel, status } if *panel == id => Some(*status),
            _ => None,
        })
        .collect()
}

fn messages(events: &[ToolkitEvent], kind: MessageKind) -> Vec<String> {
    events
        .iter()
        .filter_map(|e| match e {
            ToolkitEvent::Message { message, .. } if message.kind == kind => {
                Some(message.msg.clone())
            }
            _ => None,
        })
        .collect()
}

#[test]
fn test_panel_id_other() {
    assert_eq!(PanelId::Left.other(), PanelId::Right);
    assert_eq!(PanelId::Right.other(), PanelId::Left);
    assert_eq!(PanelId::ALL.map(PanelId::index), [0, 1]);
    assert_eq!(MessageKind::Warning.to_string(), "warning");
}

#[test]
fn test_configured_warper_is_used() {
    assert_eq!(toolkit(WarperKind::Fallback).warper_kind(), WarperKind::Fallback);
    assert_eq!(
        Toolkit::new(ToolkitConfig::default()).warper_kind(),
        WarperKind::Imageproc
    );
}

#[test]
fn test_load_emits_status_and_buffer_events() {
    let mut tk = toolkit(WarperKind::Fallback);
    tk.load_panel(PanelId::Right, gradient_raster(64, 48));

    assert_eq!(
        tk.drain_events(),
        vec![
            ToolkitEvent::StatusChanged {
                panel: PanelId::Right,
                status: PanelStatus::Loading
            },
            ToolkitEvent::StatusChanged {
                panel: PanelId::Right,
                status: PanelStatus::Loaded
            },
            ToolkitEvent::BufferUpdated {
                panel: PanelId::Right
            },
        ]
    );
    assert_eq!(tk.panel(PanelId::Left).status(), PanelStatus::Empty);
    assert!(tk.drain_events().is_empty());
}

#[test]
fn test_decode_failure_reports_error() {
    let mut tk = toolkit(WarperKind::Fallback);
    tk.load_panel(PanelId::Right, gradient_raster(8, 8));
    tk.drain_events();

    assert!(tk.load_panel_encoded(PanelId::Left, &[0u8; 16]).is_err());

    let events = tk.drain_events();
    assert_eq!(
        statuses(&events, PanelId::Left),
        vec![PanelStatus::Loading, PanelStatus::Error]
    );
    assert_eq!(messages(&events, MessageKind::Error).len(), 1);
    assert_eq!(tk.panel(PanelId::Right).status(), PanelStatus::Loaded);
}

// ============================================================================
// Align
// ============================================================================

#[test]
fn test_align_end_to_end() {
    let mut tk = scenario(WarperKind::Imageproc);
    assert!(tk.correlation(PanelId::Left).abs() < 0.3);

    let homography = tk.request_align(PanelId::Right).unwrap();

    let events = tk.drain_events();
    assert_eq!(
        statuses(&events, PanelId::Right),
        vec![PanelStatus::Loading, PanelStatus::Loaded]
    );
    assert!(statuses(&events, PanelId::Left).is_empty());
    assert!(messages(&events, MessageKind::Warning).is_empty());
    assert_eq!(messages(&events, MessageKind::Success), vec!["Image aligned"]);
    assert!(events.contains(&ToolkitEvent::BufferUpdated {
        panel: PanelId::Right
    }));

    let right = tk.panel(PanelId::Right);
    assert_eq!(right.status(), PanelStatus::Loaded);
    assert_eq!(right.working().map(|w| w.size()), Some(Size::new(800, 600)));
    assert_eq!(right.source().map(|s| s.size()), Some(Size::new(820, 620)));
    assert_eq!(right.points(), tk.panel(PanelId::Left).points());

    let from = points(&A_POINTS);
    let to = points(&B_POINTS);
    assert!(homography.max_residual(&from, &to) < 1e-6);
}

#[test]
fn test_align_moves_control_points_onto_reference() {
    let mut tk = scenario(WarperKind::Fallback);
    let target = tk.panel(PanelId::Right).working().cloned().unwrap();

    tk.request_align(PanelId::Right).unwrap();

    let warped = tk.panel(PanelId::Right).working().unwrap();
    for (&(ax, ay), &(bx, by)) in A_POINTS.iter().zip(B_POINTS.iter()) {
        assert_eq!(
            warped.get(ax as usize, ay as usize),
            target.get(bx as usize, by as usize),
            "reference point ({ax}, {ay})"
        );
    }
}

#[test]
fn test_align_with_missing_points_stays_loaded() {
    let mut tk = scenario(WarperKind::Fallback);
    tk.clear_control_points(PanelId::Left);
    for &(x, y) in &A_POINTS[..3] {
        tk.add_control_point(PanelId::Left, DVec2::new(x, y)).unwrap();
    }
    tk.drain_events();
    let before = tk.panel(PanelId::Right).working().cloned();

    let err = tk.request_align(PanelId::Right).unwrap_err();

    assert!(matches!(
        err,
        ToolkitError::Homography(HomographyError::MissingControlPoints {
            found: 3,
            required: 4
        })
    ));
    assert!(err.is_recoverable());
    let events = tk.drain_events();
    assert!(statuses(&events, PanelId::Right).is_empty());
    assert_eq!(
        messages(&events, MessageKind::Error),
        vec!["Missing control points: found 3, need 4"]
    );
    assert_eq!(tk.panel(PanelId::Right).status(), PanelStatus::Loaded);
    assert_eq!(tk.panel(PanelId::Right).working().cloned(), before);
}

#[test]
fn test_align_with_collinear_points_warns_then_fails() {
    let mut tk = scenario(WarperKind::Fallback);
    tk.set_control_points(
        PanelId::Left,
        &points(&[(100.0, 100.0), (200.0, 200.0), (300.0, 300.0), (400.0, 400.0)]),
    )
    .unwrap();
    tk.drain_events();

    let err = tk.request_align(PanelId::Right).unwrap_err();

    assert!(matches!(err, ToolkitError::Homography(_)), "got {err:?}");
    let events = tk.drain_events();
    assert_eq!(
        statuses(&events, PanelId::Right),
        vec![PanelStatus::Loading, PanelStatus::Loaded]
    );
    assert_eq!(messages(&events, MessageKind::Warning).len(), 1);
    assert_eq!(messages(&events, MessageKind::Error).len(), 1);
    assert!(events.iter().any(|e| matches!(
        e,
        ToolkitEvent::Message { panel: PanelId::Left, message } if message.kind == MessageKind::Warning
    )));
    assert_eq!(tk.panel(PanelId::Right).status(), PanelStatus::Loaded);
    assert_eq!(
        tk.panel(PanelId::Right).working().map(|w| w.size()),
        Some(Size::new(820, 620))
    );
}

#[test]
fn test_align_rejects_three_collinear_reference_points() {
    let mut tk = scenario(WarperKind::Fallback);
    tk.set_control_points(
        PanelId::Left,
        &points(&[(100.0, 100.0), (400.0, 100.0), (700.0, 100.0), (400.0, 500.0)]),
    )
    .unwrap();
    tk.drain_events();
    let before = tk.panel(PanelId::Right).working().cloned();
    let before_points = *tk.panel(PanelId::Right).points();

    assert_eq!(tk.correlation(PanelId::Left), 0.0);
    let err = tk.request_align(PanelId::Right).unwrap_err();

    assert!(
        matches!(
            err,
            ToolkitError::Homography(HomographyError::CollinearTriple { .. })
        ),
        "got {err:?}"
    );
    assert!(err.is_recoverable());
    let events = tk.drain_events();
    assert!(messages(&events, MessageKind::Success).is_empty());
    assert!(messages(&events, MessageKind::Warning).is_empty());
    assert_eq!(messages(&events, MessageKind::Error).len(), 1);
    assert_eq!(
        statuses(&events, PanelId::Right),
        vec![PanelStatus::Loading, PanelStatus::Loaded]
    );
    assert_eq!(tk.panel(PanelId::Right).working().cloned(), before);
    assert_eq!(tk.panel(PanelId::Right).points(), &before_points);
}

#[test]
fn test_align_requires_loaded_reference() {
    let mut tk = toolkit(WarperKind::Fallback);
    tk.load_panel(PanelId::Right, gradient_raster(40, 30));

    let err = tk.request_align(PanelId::Right).unwrap_err();

    assert!(matches!(
        err,
        ToolkitError::PanelNotReady {
            status: PanelStatus::Empty
        }
    ));
}

// ============================================================================
// Other requests
// ============================================================================

#[test]
fn test_crop_request_messages() {
    let mut tk = toolkit(WarperKind::Fallback);
    tk.load_panel(PanelId::Left, gradient_raster(800, 600));
    tk.drain_events();

    let size = tk
        .request_crop(PanelId::Left, &SelectionBox::new(-50.0, 0.0, 200.0, 100.0))
        .unwrap();
    assert_eq!(size, Size::new(150, 100));
    let events = tk.drain_events();
    assert_eq!(
        events,
        vec![
            ToolkitEvent::BufferUpdated {
                panel: PanelId::Left
            },
            ToolkitEvent::Message {
                panel: PanelId::Left,
                message: Message::new(MessageKind::Success, "Image cropped to 150x100"),
            },
        ]
    );

    let err = tk
        .request_crop(PanelId::Left, &SelectionBox::new(500.0, 500.0, 10.0, 10.0))
        .unwrap_err();
    assert!(matches!(err, ToolkitError::EmptySelection));
    assert_eq!(
        messages(&tk.drain_events(), MessageKind::Warning),
        vec!["Crop selection is empty"]
    );
}

#[test]
fn test_match_dimensions_resizes_to_other_panel() {
    let mut tk = toolkit(WarperKind::Fallback);
    tk.load_panel(PanelId::Left, gradient_raster(800, 600));
    tk.load_panel(PanelId::Right, gradient_raster(400, 300));
    tk.add_control_point(PanelId::Right, DVec2::new(200.0, 150.0))
        .unwrap();

    assert_eq!(tk.match_dimensions(PanelId::Right).unwrap(), Size::new(800, 600));

    let right = tk.panel(PanelId::Right);
    assert_eq!(right.working().map(|w| w.size()), Some(Size::new(800, 600)));
    let p = right.points().get(0).unwrap();
    assert!((p - DVec2::new(400.0, 300.0)).length() < 1e-9);

    tk.request_remove(PanelId::Left);
    assert!(matches!(
        tk.match_dimensions(PanelId::Right),
        Err(ToolkitError::PanelNotReady { .. })
    ));
}

#[test]
fn test_overlay_points_in_this_canvas() {
    let mut tk = toolkit(WarperKind::Fallback);
    tk.load_panel(PanelId::Left, gradient_raster(800, 600));
    tk.load_panel(PanelId::Right, gradient_raster(400, 300));
    tk.add_control_point(PanelId::Left, DVec2::new(400.0, 300.0))
        .unwrap();

    let overlay = tk.overlay_points(PanelId::Right);

    assert_eq!(overlay.len(), 1);
    assert_eq!(overlay[0].0, 0);
    assert!((overlay[0].1 - DVec2::new(300.0, 300.0)).length() < 1e-9);
    assert!(tk.overlay_points(PanelId::Left).is_empty());

    tk.request_remove(PanelId::Left);
    assert!(tk.overlay_points(PanelId::Right).is_empty());
}

#[test]
fn test_download_request_events() {
    let mut tk = toolkit(WarperKind::Fallback);
    tk.load_panel(PanelId::Left, gradient_raster(20, 10));
    tk.drain_events();

    let bytes = tk.request_download(PanelId::Left, EncodeFormat::Png).unwrap();

    assert!(!bytes.is_empty());
    let events = tk.drain_events();
    assert_eq!(
        statuses(&events, PanelId::Left),
        vec![PanelStatus::Downloading, PanelStatus::Loaded]
    );
    assert_eq!(
        messages(&events, MessageKind::Success),
        vec!["Image encoded as png"]
    );
}

#[test]
fn test_view_requests_on_empty_panel_warn() {
    let mut tk = toolkit(WarperKind::Fallback);
    assert!(tk.request_zoom_in(PanelId::Left).is_err());
    assert_eq!(
        messages(&tk.drain_events(), MessageKind::Warning),
        vec!["Panel is not ready (status: empty)"]
    );
}

#[test]
fn test_view_requests_update_buffer() {
    let mut tk = toolkit(WarperKind::Fallback);
    tk.load_panel(PanelId::Left, gradient_raster(800, 600));
    tk.drain_events();

    tk.request_zoom_in(PanelId::Left).unwrap();
    tk.request_zoom_out(PanelId::Left).unwrap();
    tk.request_expand(PanelId::Left).unwrap();
    tk.request_pan(PanelId::Left, DVec2::new(5.0, 5.0)).unwrap();
    tk.request_fit(PanelId::Left).unwrap();
    tk.request_reset(PanelId::Left).unwrap();

    let events = tk.drain_events();
    assert_eq!(events.len(), 6);
    assert!(events
        .iter()
        .all(|e| *e == ToolkitEvent::BufferUpdated { panel: PanelId::Left }));
}

#[test]
fn test_pointer_forwarding_reports_fifth_point() {
    let mut tk = toolkit(WarperKind::Fallback);
    tk.load_panel(PanelId::Left, gradient_raster(800, 600));
    tk.set_mode(PanelId::Left, Mode::Align);
    tk.drain_events();

    for &(x, y) in &[(100.0, 100.0), (500.0, 100.0), (500.0, 500.0), (100.0, 500.0)] {
        let event = PointerEvent::new(x, y);
        tk.pointer_down(PanelId::Left, &event).unwrap();
        tk.pointer_up(PanelId::Left, &event).unwrap();
    }
    assert!(tk.panel(PanelId::Left).points().is_full());

    let err = tk
        .pointer_down(PanelId::Left, &PointerEvent::new(300.0, 300.0))
        .unwrap_err();
    assert!(matches!(
        err,
        ToolkitError::ControlPoint(ControlPointError::MaxControlPoints)
    ));
    assert_eq!(
        messages(&tk.drain_events(), MessageKind::Error),
        vec!["Maximum of 4 control points already selected"]
    );
}

#[test]
fn test_set_control_points_rejects_fifth() {
    let mut tk = toolkit(WarperKind::Fallback);
    tk.load_panel(PanelId::Left, gradient_raster(80, 60));
    let mut five = points(&A_POINTS);
    five.push(DVec2::new(1.0, 1.0));

    assert!(matches!(
        tk.set_control_points(PanelId::Left, &five),
        Err(ToolkitError::ControlPoint(ControlPointError::MaxControlPoints))
    ));
    assert!(tk.panel(PanelId::Left).points().is_empty());
}
