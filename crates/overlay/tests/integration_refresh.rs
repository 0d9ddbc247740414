//! Refresh protocol: cache identity, generation ordering, eviction and
//! index alignment of the committed frame.

use glam::Vec3;
use measure_overlay_lib::fixtures::{
    cylinder_entity, edge_entity, entity, vertex_entity, FakeGeometry, FakeSdk, GatedSdk,
};
use measure_overlay_lib::measure::{compute_duo_results, MeasureOverlay, OverlayInput, OverlayStyle};
use measure_overlay_lib::sdk::DrawSettings;
use shared::{ActiveAxis, AxisName, CylinderMeasure, DrawKind, PartText};

/// Orthographic camera looking down at one pixel per world unit, origin at (640, 360)
fn flat_sdk() -> FakeSdk {
    FakeSdk::orthographic(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO, 720.0)
}

fn with_edges(sdk: FakeSdk, ids: &[u32]) -> FakeSdk {
    for (i, id) in ids.iter().enumerate() {
        let y = i as f32 * 50.0;
        sdk.add_geometry(*id, FakeGeometry::Edge(Vec3::new(-100.0, y, 0.0), Vec3::new(100.0, y, 0.0)));
    }
    sdk
}

fn sets_input(sets: Vec<Vec<shared::MeasureEntity>>) -> OverlayInput {
    OverlayInput {
        sets,
        ..OverlayInput::default()
    }
}

// ── Key stability ───────────────────────────────────────────

#[test]
fn test_entity_keys() {
    assert_eq!(entity(12, 3, Some(7), DrawKind::Edge).key(), "12_3_7");
    assert_eq!(entity(12, 3, None, DrawKind::Face).key(), "12_3_-");
    assert_eq!(cylinder_entity(4, 1, CylinderMeasure::Top).key(), "4_0_1_top");
    assert_ne!(
        cylinder_entity(4, 1, CylinderMeasure::Top).key(),
        cylinder_entity(4, 1, CylinderMeasure::Bottom).key()
    );
}

#[tokio::test]
async fn test_product_follows_key_not_index() {
    let overlay = MeasureOverlay::new(with_edges(flat_sdk(), &[1, 2]), OverlayStyle::default());

    let first = sets_input(vec![vec![edge_entity(1, 0)], vec![edge_entity(2, 0)]]);
    assert!(overlay.update(&first).await);
    assert_eq!(overlay.sdk().draw_entity_calls(), 2);

    // Same entities, swapped order: both products are re-used
    let swapped = sets_input(vec![vec![edge_entity(2, 0)], vec![edge_entity(1, 0)]]);
    assert!(overlay.update(&swapped).await);
    assert_eq!(overlay.sdk().draw_entity_calls(), 2);
    assert_eq!(overlay.sdk().update_calls(), 2);

    let frame = overlay.frame().unwrap();
    assert_eq!(frame.sets[0].key, "2_0_0");
    assert_eq!(frame.sets[1].key, "1_0_0");
    let positions = overlay.positions().unwrap();
    assert_eq!(positions.sets[0].key, "2_0_0");
    // Edge 2 lies 50 units below edge 1 in world y, i.e. 50 px higher on screen
    let (a, b) = (positions.sets[0].remove.unwrap(), positions.sets[1].remove.unwrap());
    assert!((b.y - a.y - 50.0).abs() < 1e-3);
}

#[tokio::test]
async fn test_entity_in_two_sets_is_converted_once() {
    let overlay = MeasureOverlay::new(with_edges(flat_sdk(), &[1, 2]), OverlayStyle::default());
    let input = sets_input(vec![
        vec![edge_entity(1, 0)],
        vec![edge_entity(1, 0), edge_entity(2, 0)],
    ]);
    assert!(overlay.update(&input).await);
    assert_eq!(overlay.sdk().draw_entity_calls(), 2);
    assert_eq!(overlay.cached_keys(), vec!["1_0_0".to_string(), "2_0_0".to_string()]);
}

// ── Generation ordering ─────────────────────────────────────

#[tokio::test]
async fn test_later_refresh_wins_when_it_finishes_first() {
    let sdk = GatedSdk::new(with_edges(flat_sdk(), &[1, 2]));
    let gate = sdk.gate();
    let overlay = MeasureOverlay::new(sdk, OverlayStyle::default());

    let older = sets_input(vec![vec![edge_entity(1, 0)]]);
    let newer = sets_input(vec![vec![edge_entity(2, 0)]]);

    let (older_committed, newer_committed) = tokio::join!(overlay.update(&older), async {
        // Start only once the older refresh is parked on its gate
        while overlay.generation() < 1 {
            tokio::task::yield_now().await;
        }
        let committed = overlay.update(&newer).await;
        let _ = gate.send(());
        committed
    });

    assert!(!older_committed);
    assert!(newer_committed);
    assert_eq!(overlay.generation(), 2);
    assert_eq!(overlay.stale_drops(), 1);

    let frame = overlay.frame().unwrap();
    assert_eq!(frame.generation, 2);
    assert_eq!(frame.sets.len(), 1);
    assert_eq!(frame.sets[0].key, "2_0_0");
    assert_eq!(overlay.cached_keys(), vec!["2_0_0".to_string()]);
    assert_eq!(overlay.cached_generation("2_0_0"), Some(2));
}

#[tokio::test]
async fn test_refreshes_in_order_both_commit() {
    let overlay = MeasureOverlay::new(with_edges(flat_sdk(), &[1, 2]), OverlayStyle::default());

    assert!(overlay.update(&sets_input(vec![vec![edge_entity(1, 0)]])).await);
    assert!(overlay.update(&sets_input(vec![vec![edge_entity(2, 0)]])).await);

    assert_eq!(overlay.stale_drops(), 0);
    assert_eq!(overlay.frame().unwrap().generation, 2);
}

#[tokio::test]
async fn test_stale_failure_counts_as_stale() {
    let inner = with_edges(flat_sdk(), &[1, 2]);
    inner.fail_object(1);
    let sdk = GatedSdk::new(inner);
    let gate = sdk.gate();
    let overlay = MeasureOverlay::new(sdk, OverlayStyle::default());

    let failing = sets_input(vec![vec![edge_entity(1, 0)]]);
    let fine = sets_input(vec![vec![edge_entity(2, 0)]]);

    let (failed, committed) = tokio::join!(overlay.update(&failing), async {
        while overlay.generation() < 1 {
            tokio::task::yield_now().await;
        }
        let committed = overlay.update(&fine).await;
        let _ = gate.send(());
        committed
    });

    assert!(!failed);
    assert!(committed);
    assert_eq!(overlay.stale_drops(), 1);
    assert_eq!(overlay.failures(), 0);
}

// ── Draw settings ───────────────────────────────────────────

#[tokio::test]
async fn test_draw_settings_reach_conversions() {
    let sdk = with_edges(flat_sdk(), &[1]);
    let pair = vec![vertex_entity(7, Vec3::ZERO), vertex_entity(8, Vec3::new(150.0, 0.0, 0.0))];
    let sets = vec![vec![edge_entity(1, 0)], pair];
    let results = compute_duo_results(&sdk, &sets, |_| ActiveAxis::default()).await.unwrap();
    let draw_settings = DrawSettings {
        segment_label_interval: Some(2.0),
        label_decimals: 1,
        unit_suffix: "ft".into(),
    };
    let overlay = MeasureOverlay::new(sdk, OverlayStyle::default());
    let input = OverlayInput {
        sets,
        results,
        draw_settings: draw_settings.clone(),
        ..OverlayInput::default()
    };
    assert!(overlay.update(&input).await);
    assert_eq!(overlay.sdk().draw_result_calls(), 1);
    assert_eq!(overlay.sdk().last_draw_settings(), Some(draw_settings));

    let frame = overlay.frame().unwrap();
    let edge = frame.sets[0].single_product().unwrap();
    let edge_label = edge.parts().find_map(|p| p.text.clone());
    assert_eq!(edge_label, Some(PartText::Label("200.0 ft".into())));
    let result = frame.results[1].as_ref().and_then(|r| r.product.as_ref()).unwrap();
    let result_label = result
        .parts()
        .find(|p| p.name() == Some(AxisName::Result.part_name()))
        .and_then(|p| p.text.clone());
    assert_eq!(result_label, Some(PartText::Label("150.0 ft".into())));
}

// ── Eviction ────────────────────────────────────────────────

#[tokio::test]
async fn test_removed_entities_and_results_are_evicted() {
    let sdk = with_edges(flat_sdk(), &[1]);
    let pair = vec![vec![vertex_entity(7, Vec3::ZERO), vertex_entity(8, Vec3::new(150.0, 0.0, 0.0))]];
    let results = compute_duo_results(&sdk, &pair, |_| ActiveAxis::default()).await.unwrap();
    let overlay = MeasureOverlay::new(sdk, OverlayStyle::default());

    let mut sets = pair.clone();
    sets.push(vec![edge_entity(1, 0)]);
    let mut aligned = results.clone();
    aligned.push(None);
    let full = OverlayInput {
        sets,
        results: aligned,
        ..OverlayInput::default()
    };
    assert!(overlay.update(&full).await);
    assert_eq!(overlay.cached_keys(), vec!["1_0_0".to_string()]);
    assert_eq!(overlay.cached_result_ids().len(), 1);

    assert!(overlay.update(&OverlayInput::default()).await);
    assert!(overlay.cached_keys().is_empty());
    assert!(overlay.cached_result_ids().is_empty());

    // Back again: converted afresh, not resurrected
    let calls = overlay.sdk().draw_entity_calls();
    assert!(overlay.update(&full).await);
    assert_eq!(overlay.sdk().draw_entity_calls(), calls + 3);
    assert_eq!(overlay.sdk().draw_result_calls(), 2);
}

// ── Index alignment ─────────────────────────────────────────

#[tokio::test]
async fn test_positions_align_with_sets_and_results() {
    let sdk = with_edges(flat_sdk(), &[1, 3]);
    let sets = vec![
        vec![edge_entity(1, 0)],
        vec![vertex_entity(7, Vec3::ZERO), vertex_entity(8, Vec3::new(150.0, 0.0, 0.0))],
        vec![edge_entity(3, 0)],
    ];
    let results = compute_duo_results(&sdk, &sets, |_| ActiveAxis::default()).await.unwrap();
    assert!(results[0].is_none() && results[1].is_some() && results[2].is_none());

    let overlay = MeasureOverlay::new(sdk, OverlayStyle::default());
    let input = OverlayInput {
        sets,
        results,
        ..OverlayInput::default()
    };
    assert!(overlay.update(&input).await);

    let positions = overlay.positions().unwrap();
    assert_eq!(positions.sets.len(), 3);
    assert_eq!(positions.results.len(), 3);
    assert_eq!(positions.sets[0].key, "1_0_0");
    assert_eq!(positions.sets[2].key, "3_0_0");
    assert!(positions.sets[0].remove.is_some());
    assert_eq!(positions.sets[1].remove, None);
    assert!(positions.sets[2].remove.is_some());

    assert_eq!(positions.remove().len(), 3);
    assert_eq!(positions.info().len(), 3);
    assert_eq!(positions.remove()[1], None);
    assert_eq!(positions.info()[0], positions.sets[0].info);
    assert!(positions.remove_axis(1, AxisName::Result).is_some());
    assert_eq!(positions.remove_axis(0, AxisName::Result), None);
    assert_eq!(positions.remove_axis(3, AxisName::Result), None);

    assert_eq!(positions.results[0].id, None);
    assert!(positions.results[1].id.is_some());
    assert!(!positions.results[1].axes.is_empty());
    assert_eq!(positions.results[2].id, None);
}
