//! Marker gating and text fitting observed through a full overlay refresh.

use glam::{Vec2, Vec3};
use measure_overlay_lib::fixtures::{edge_entity, face_entity, vertex_entity, FakeGeometry, FakeSdk, RecordingSurface};
use measure_overlay_lib::measure::{compute_duo_results, MarkerTransforms, MeasureOverlay, OverlayInput, OverlayStyle};
use shared::ActiveAxis;

fn flat_sdk() -> FakeSdk {
    FakeSdk::orthographic(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO, 720.0)
}

fn square(half: f32) -> FakeGeometry {
    FakeGeometry::Plane(vec![
        Vec3::new(-half, -half, 0.0),
        Vec3::new(half, -half, 0.0),
        Vec3::new(half, half, 0.0),
        Vec3::new(-half, half, 0.0),
    ])
}

fn single(entity: shared::MeasureEntity) -> OverlayInput {
    OverlayInput {
        sets: vec![vec![entity]],
        ..OverlayInput::default()
    }
}

#[tokio::test]
async fn test_plane_markers_by_camera_distance() {
    for (distance, visible) in [(99.0, true), (100.0, false), (101.0, false)] {
        let sdk = FakeSdk::looking_at(Vec3::new(0.0, 0.0, distance), Vec3::ZERO);
        sdk.add_geometry(1, square(1.0));
        let overlay = MeasureOverlay::new(sdk, OverlayStyle::default());
        assert!(overlay.update(&single(face_entity(1, 0))).await);

        let mut markers = MarkerTransforms::new();
        assert!(overlay.move_markers(&mut markers));
        assert_eq!(markers.is_visible("removeMeasure-0"), visible, "distance {distance}");
        assert_eq!(markers.is_visible("infoMeasure-0"), visible, "distance {distance}");
        if !visible {
            assert_eq!(markers.transform("removeMeasure-0").as_deref(), Some("translate(-1000, -1000)"));
        }
    }
}

#[tokio::test]
async fn test_edge_markers_by_screen_length() {
    for (half, visible) in [(55.0, false), (55.5, true)] {
        let sdk = flat_sdk();
        sdk.add_geometry(1, FakeGeometry::Edge(Vec3::new(-half, 0.0, 0.0), Vec3::new(half, 0.0, 0.0)));
        let overlay = MeasureOverlay::new(sdk, OverlayStyle::default());
        assert!(overlay.update(&single(edge_entity(1, 0))).await);

        let positions = overlay.positions().unwrap();
        assert_eq!(positions.sets[0].remove.is_some(), visible, "length {}", half * 2.0);
        if visible {
            let remove = positions.sets[0].remove.unwrap();
            let info = positions.sets[0].info.unwrap();
            assert!((remove - Vec2::new(640.0, 340.0)).length() < 1e-3);
            assert!((info - Vec2::new(665.0, 340.0)).length() < 1e-3);

            let mut markers = MarkerTransforms::new();
            overlay.move_markers(&mut markers);
            // Glyph box origin (100, 98) is subtracted from the marker position
            let translate = markers.get("removeMeasure-0").unwrap();
            assert!((translate - Vec2::new(540.0, 242.0)).length() < 1e-3);
        }
    }
}

async fn axis_markers_for(active: ActiveAxis) -> MarkerTransforms {
    let sdk = flat_sdk();
    let sets = vec![vec![vertex_entity(1, Vec3::ZERO), vertex_entity(2, Vec3::new(90.0, 130.0, 0.0))]];
    let results = compute_duo_results(&sdk, &sets, |_| active).await.unwrap();
    let overlay = MeasureOverlay::new(sdk, OverlayStyle::default());
    let input = OverlayInput {
        sets,
        results,
        ..OverlayInput::default()
    };
    let mut markers = MarkerTransforms::new();
    assert!(overlay.render(&input, &mut RecordingSurface::new(), &mut markers).await);
    markers
}

#[tokio::test]
async fn test_long_axis_displaces_short_axis_marker() {
    let axes_only = ActiveAxis {
        result: false,
        planar: false,
        ..ActiveAxis::default()
    };
    let markers = axis_markers_for(axes_only).await;
    // X is 90 px, Y 130 px, Z zero length
    assert!(!markers.is_visible("removeMeasureResultX-0"));
    assert!(!markers.is_visible("removeMeasureResultZ-0"));
    let y = markers.position("removeMeasureResultY-0").unwrap();
    // 55 px up from the start of the Y segment at (730, 360)
    assert!((y - Vec2::new(730.0, 305.0)).length() < 1e-3);

    let without_y = ActiveAxis { y: false, ..axes_only };
    let markers = axis_markers_for(without_y).await;
    let x = markers.position("removeMeasureResultX-0").unwrap();
    assert!((x - Vec2::new(695.0, 360.0)).length() < 1e-3);
    assert!(!markers.is_visible("removeMeasureResultZ-0"));
}

#[tokio::test]
async fn test_every_axis_marker_is_placed_or_parked() {
    let markers = axis_markers_for(ActiveAxis::default()).await;
    for id in [
        "removeMeasureResult-0",
        "removeMeasureResultPlanar-0",
        "removeMeasureResultX-0",
        "removeMeasureResultY-0",
        "removeMeasureResultZ-0",
        "removeMeasureResultNormal-0",
    ] {
        assert!(markers.get(id).is_some(), "{id}");
    }
    assert!(markers.is_visible("removeMeasureResult-0"));
    assert!(markers.is_visible("removeMeasureResultY-0"));
    assert!(!markers.is_visible("removeMeasureResultX-0"));
}

#[tokio::test]
async fn test_label_skipped_when_segment_too_short() {
    // "70.000 m" is 8 chars at 7 px: needs 56 + 20 px
    for (half, label, drawn) in [(35.0, "70.000 m", false), (40.0, "80.000 m", true)] {
        let sdk = flat_sdk();
        sdk.add_geometry(1, FakeGeometry::Edge(Vec3::new(-half, 0.0, 0.0), Vec3::new(half, 0.0, 0.0)));
        let overlay = MeasureOverlay::new(sdk, OverlayStyle::default());
        assert!(overlay.update(&single(edge_entity(1, 0))).await);

        let mut surface = RecordingSurface::new();
        assert!(overlay.draw(&mut surface));
        assert_eq!(surface.texts().contains(&label), drawn, "{label}");
    }
}
