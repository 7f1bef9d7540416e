use approx::assert_relative_eq;
use geometry_kernel::{GeometryKernel, MockKernel};
use layout_engine::*;
use mount_catalog::{BaseplateMount, LensHolder, MirrorMount, RotationStage, SplitterMount};
use optic_types::{BranchKey, Constraint, Placement};

// ── Helpers ──────────────────────────────────────────────────────────────

fn xy(layout: &Layout, id: ComponentId) -> [f64; 2] {
    let t = layout.graph().component(id).unwrap().world.translation();
    [t.x, t.y]
}

fn assert_at(layout: &Layout, id: ComponentId, x: f64, y: f64) {
    let [px, py] = xy(layout, id);
    assert_relative_eq!(px, x, epsilon = 1e-9);
    assert_relative_eq!(py, y, epsilon = 1e-9);
}

fn plate(layout: &mut Layout) -> ComponentId {
    layout
        .create_baseplate("plate", 200.0, 200.0, 25.4, BaseplateOptions::default())
        .unwrap()
}

/// Beam along +x at y = 20, 45° splitter at (50, 20), reflected branch heads +y.
fn split_layout() -> (Layout, BeamId) {
    let mut layout = Layout::default();
    plate(&mut layout);
    let beam = layout.add_beam_path(0.0, 20.0, 0.0);
    layout
        .place_element_along_beam(
            "bs",
            SplitterMount::default(),
            beam,
            BranchKey::ROOT,
            -45.0,
            Constraint::Distance(50.0),
            PlacementOptions::default(),
        )
        .unwrap();
    (layout, beam)
}

// ── Scenario Tests ───────────────────────────────────────────────────────

#[test]
fn mirror_on_beam_lands_at_expected_point() {
    let mut layout = Layout::default();
    plate(&mut layout);
    let beam = layout.add_beam_path(20.0, 0.0, 90.0);
    let mirror = layout
        .place_element_along_beam(
            "m1",
            MirrorMount::default(),
            beam,
            BranchKey::ROOT,
            -45.0,
            Constraint::Distance(20.0),
            PlacementOptions::default(),
        )
        .unwrap();
    let lens = layout
        .place_element_along_beam(
            "lens",
            LensHolder::default(),
            beam,
            BranchKey::ROOT,
            0.0,
            Constraint::Distance(30.0),
            PlacementOptions::default(),
        )
        .unwrap();

    let mut k = MockKernel::new();
    let report = layout.redraw(&mut k).unwrap();
    assert_eq!(report.placed, 2);
    assert_at(&layout, mirror, 20.0, 20.0);
    assert_at(&layout, lens, 50.0, 20.0);
    let yaw = layout.graph().component(mirror).unwrap().world.yaw_deg();
    assert_relative_eq!(yaw, -45.0, epsilon = 1e-9);
}

#[test]
fn element_on_reflected_branch_follows_splitter_output() {
    let (mut layout, beam) = split_layout();
    let up = layout
        .place_element_along_beam(
            "up",
            MirrorMount::default(),
            beam,
            BranchKey(1),
            45.0,
            Constraint::Distance(40.0),
            PlacementOptions::default(),
        )
        .unwrap();
    let mut k = MockKernel::new();
    layout.redraw(&mut k).unwrap();
    assert_at(&layout, up, 50.0, 60.0);
}

#[test]
fn perpendicular_absolute_x_reports_only_its_branch() {
    let (mut layout, beam) = split_layout();
    let straight = layout
        .place_element_along_beam(
            "lens",
            LensHolder::default(),
            beam,
            BranchKey::ROOT,
            0.0,
            Constraint::AbsoluteX(120.0),
            PlacementOptions::default(),
        )
        .unwrap();
    let bad = layout
        .place_element_along_beam(
            "bad",
            RotationStage::default(),
            beam,
            BranchKey(1),
            45.0,
            Constraint::AbsoluteX(80.0),
            PlacementOptions::default(),
        )
        .unwrap();
    let bad_adapter = layout.find("bad_Adapter").unwrap();

    let mut k = MockKernel::new();
    let err = layout.redraw(&mut k).unwrap_err();
    assert_eq!(err.errors.len(), 1);
    assert!(matches!(
        &err.errors[0],
        StageError::Beam(beam_path::BeamError::UnsatisfiableConstraint { component, .. }) if component == "bad"
    ));
    assert_at(&layout, straight, 120.0, 20.0);
    assert!(layout.graph().component(bad).unwrap().stale);
    assert!(layout.graph().component(bad_adapter).unwrap().stale);
    assert!(!layout.graph().component(straight).unwrap().stale);
    assert_eq!(err.report.plates.len(), 1);
}

// ── Redraw Properties ────────────────────────────────────────────────────

#[test]
fn redraw_twice_yields_identical_solids() {
    let (mut layout, beam) = split_layout();
    layout
        .place_element_along_beam(
            "up",
            MirrorMount::default(),
            beam,
            BranchKey(1),
            45.0,
            Constraint::Distance(40.0),
            PlacementOptions::default(),
        )
        .unwrap();
    let plate = layout.active_baseplate().unwrap();
    let mut k = MockKernel::new();

    layout.redraw(&mut k).unwrap();
    let first = k.node(layout.baseplate_solid(plate).unwrap()).cloned();
    layout.redraw(&mut k).unwrap();
    let second = k.node(layout.baseplate_solid(plate).unwrap()).cloned();
    assert!(first.is_some());
    assert_eq!(first, second);
}

#[test]
fn reversed_cut_order_removes_same_volume() {
    let mut layout = Layout::default();
    let plate = layout
        .create_baseplate("plate", 100.0, 100.0, 12.7, BaseplateOptions::default())
        .unwrap();
    for (i, (x, y)) in [(20.0, 20.0), (30.0, 70.0), (75.0, 50.0)].into_iter().enumerate() {
        layout
            .place_element(format!("m{i}"), MirrorMount::default(), x, y, 45.0, PlacementOptions::default())
            .unwrap();
    }
    let mut k = MockKernel::new();
    layout.redraw(&mut k).unwrap();

    let spec = layout.graph().component(plate).unwrap().baseplate_spec().cloned().unwrap();
    let mut cuts = collect_cuts(&mut k, layout.graph(), plate).unwrap();
    assert_eq!(cuts.len(), 3);
    let forward = cut_stock(&mut k, "plate", &spec, &cuts).unwrap();
    cuts.reverse();
    let backward = cut_stock(&mut k, "plate", &spec, &cuts).unwrap();
    let stock = spec.build_stock(&mut k).unwrap();

    let v_forward = k.volume(&forward).unwrap();
    assert_relative_eq!(v_forward, k.volume(&backward).unwrap(), epsilon = 1e-9);
    assert!(v_forward < k.volume(&stock).unwrap());
}

#[test]
fn failing_plate_does_not_block_other_plates() {
    let mut layout = Layout::default();
    let good = layout
        .create_baseplate("good", 100.0, 100.0, 12.7, BaseplateOptions::default())
        .unwrap();
    layout
        .place_element("m_good", MirrorMount::default(), 50.0, 50.0, 0.0, PlacementOptions::default())
        .unwrap();
    let bad = layout
        .create_baseplate("bad", 100.0, 100.0, 0.0, BaseplateOptions::default().at(300.0, 0.0))
        .unwrap();

    let mut k = MockKernel::new();
    let err = layout.redraw(&mut k).unwrap_err();
    assert!(err
        .errors
        .iter()
        .any(|e| matches!(e, StageError::Aggregate(AggregateError::Geometry { component, .. }) if component == "bad")));
    assert_eq!(err.report.plates, vec![good]);
    assert!(layout.baseplate_solid(good).is_ok());
    assert!(matches!(
        layout.baseplate_solid(bad),
        Err(LayoutError::NotAggregated { .. })
    ));
}

#[test]
fn part_attached_to_plate_is_drilled() {
    let mut layout = Layout::default();
    let plate = layout
        .create_baseplate("plate", 100.0, 100.0, 25.0, BaseplateOptions::default())
        .unwrap();
    layout
        .attach_child(plate, "post", BaseplateMount::default(), Placement::planar(50.0, 50.0, 0.0), None)
        .unwrap();
    let mut k = MockKernel::new();
    layout.redraw(&mut k).unwrap();

    let cuts = collect_cuts(&mut k, layout.graph(), plate).unwrap();
    assert!(cuts.iter().any(|c| c.component == "post"));
    let solid = layout.baseplate_solid(plate).unwrap().clone();
    let spec = layout.graph().component(plate).unwrap().baseplate_spec().cloned().unwrap();
    let stock = spec.build_stock(&mut k).unwrap();
    assert!(k.volume(&solid).unwrap() < k.volume(&stock).unwrap());
}

#[test]
fn undrilled_plate_is_bare_stock() {
    let mut layout = Layout::default();
    let plate = layout
        .create_baseplate("plate", 60.0, 60.0, 10.0, BaseplateOptions::default().without_drill())
        .unwrap();
    layout
        .place_element("m", MirrorMount::default(), 30.0, 30.0, 0.0, PlacementOptions::default())
        .unwrap();
    let mut k = MockKernel::new();
    layout.redraw(&mut k).unwrap();
    let solid = layout.baseplate_solid(plate).unwrap().clone();
    let spec = layout.graph().component(plate).unwrap().baseplate_spec().cloned().unwrap();
    let stock = spec.build_stock(&mut k).unwrap();
    assert_eq!(k.volume(&solid).unwrap(), k.volume(&stock).unwrap());
}

// ── Editing ──────────────────────────────────────────────────────────────

#[test]
fn relative_element_follows_beam_placed_reference() {
    let (mut layout, beam) = split_layout();
    let lens = layout
        .place_element_along_beam(
            "lens",
            LensHolder::default(),
            beam,
            BranchKey::ROOT,
            0.0,
            Constraint::Distance(25.0),
            PlacementOptions::default(),
        )
        .unwrap();
    let retro = layout
        .place_element_relative("retro", MirrorMount::default(), lens, 180.0, 10.0, 0.0, PlacementOptions::default())
        .unwrap();
    let mut k = MockKernel::new();
    layout.redraw(&mut k).unwrap();
    assert_at(&layout, retro, 85.0, 20.0);
    assert_relative_eq!(
        layout.graph().component(retro).unwrap().world.yaw_deg().abs(),
        180.0,
        epsilon = 1e-9
    );
}

#[test]
fn relative_element_follows_child_of_beam_element_in_one_redraw() {
    let mut layout = Layout::default();
    plate(&mut layout);
    let beam = layout.add_beam_path(0.0, 20.0, 0.0);
    layout
        .place_element_along_beam(
            "wp",
            RotationStage::default(),
            beam,
            BranchKey::ROOT,
            0.0,
            Constraint::Distance(50.0),
            PlacementOptions::default(),
        )
        .unwrap();
    let adapter = layout.find("wp_Adapter").unwrap();
    let retro = layout
        .place_element_relative("retro", MirrorMount::default(), adapter, 0.0, 10.0, 0.0, PlacementOptions::default())
        .unwrap();

    let mut k = MockKernel::new();
    layout.redraw(&mut k).unwrap();
    assert_at(&layout, adapter, 50.0, 20.0);
    assert_at(&layout, retro, 60.0, 20.0);
    layout.redraw(&mut k).unwrap();
    assert_at(&layout, retro, 60.0, 20.0);
}

#[test]
fn deleting_beam_element_drops_its_request() {
    let (mut layout, beam) = split_layout();
    let bs = layout.find("bs").unwrap();
    layout.delete(bs).unwrap();
    assert!(layout.beam(beam).unwrap().requests().is_empty());
    let mut k = MockKernel::new();
    assert!(layout.redraw(&mut k).is_ok());
}

#[test]
fn deleting_referenced_component_is_rejected() {
    let mut layout = Layout::default();
    plate(&mut layout);
    let lens = layout
        .place_element("lens", LensHolder::default(), 40.0, 40.0, 0.0, PlacementOptions::default())
        .unwrap();
    layout
        .place_element_relative("retro", MirrorMount::default(), lens, 180.0, 5.0, 0.0, PlacementOptions::default())
        .unwrap();
    let steps = layout.steps().len();
    assert!(matches!(
        layout.delete(lens),
        Err(LayoutError::Graph(scene_graph::GraphError::DanglingReference { .. }))
    ));
    assert_eq!(layout.steps().len(), steps);
}

#[test]
fn duplicate_names_are_rejected() {
    let mut layout = Layout::default();
    plate(&mut layout);
    layout
        .place_element("m", MirrorMount::default(), 0.0, 0.0, 0.0, PlacementOptions::default())
        .unwrap();
    let err = layout
        .place_element("m", MirrorMount::default(), 10.0, 0.0, 0.0, PlacementOptions::default())
        .unwrap_err();
    assert!(matches!(err, LayoutError::DuplicateName { .. }));
}

#[test]
fn placements_anchor_to_active_or_named_plate() {
    let mut layout = Layout::default();
    let first = layout
        .create_baseplate("first", 100.0, 100.0, 12.7, BaseplateOptions::default())
        .unwrap();
    let second = layout
        .create_baseplate("second", 100.0, 100.0, 12.7, BaseplateOptions::default().at(200.0, 0.0))
        .unwrap();
    assert_eq!(layout.active_baseplate(), Some(second));
    let a = layout
        .place_element("a", LensHolder::default(), 250.0, 50.0, 0.0, PlacementOptions::default())
        .unwrap();
    let b = layout
        .place_element("b", LensHolder::default(), 50.0, 50.0, 0.0, PlacementOptions::default().on("first"))
        .unwrap();
    assert_eq!(layout.graph().component(a).unwrap().baseplate, Some(second));
    assert_eq!(layout.graph().component(b).unwrap().baseplate, Some(first));

    layout.delete(second).unwrap();
    assert_eq!(layout.active_baseplate(), Some(first));
    assert!(layout.find("a").is_none());
}

#[test]
fn visibility_hides_everything_but_baseplates() {
    let (mut layout, _) = split_layout();
    let total = layout.visible_components().len();
    layout.set_visibility(false);
    let visible = layout.visible_components();
    assert_eq!(visible, layout.graph().baseplates());
    layout.set_visibility(true);
    assert_eq!(layout.visible_components().len(), total);
}

// ── Recipe ───────────────────────────────────────────────────────────────

#[test]
fn replayed_recipe_rebuilds_same_layout() {
    let (mut layout, beam) = split_layout();
    layout
        .place_element_along_beam(
            "up",
            MirrorMount::default(),
            beam,
            BranchKey(1),
            45.0,
            Constraint::Distance(40.0),
            PlacementOptions::default().pre_folds(0),
        )
        .unwrap();
    let mut k = MockKernel::new();
    layout.redraw(&mut k).unwrap();

    let mut copy = Layout::replay(*layout.config(), layout.steps()).unwrap();
    copy.redraw(&mut k).unwrap();
    assert_eq!(copy.steps(), layout.steps());
    for name in ["bs", "up"] {
        let a = xy(&layout, layout.find(name).unwrap());
        let b = xy(&copy, copy.find(name).unwrap());
        assert_eq!(a, b);
    }
    assert_eq!(copy.bill_of_materials(), layout.bill_of_materials());
}

#[test]
fn recipe_steps_round_trip_through_json() {
    let (layout, _) = split_layout();
    let json = serde_json::to_string(layout.steps()).unwrap();
    assert!(json.contains("\"op\":\"PlaceAlongBeam\""));
    let back: Vec<RecordedStep> = serde_json::from_str(&json).unwrap();
    assert_eq!(back, layout.steps());
}
