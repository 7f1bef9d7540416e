use approx::assert_relative_eq;
use beam_path::*;
use mount_catalog::{FiberportHolder, LensHolder, MirrorMount, PbsOnSkateMount, RotationStage, SplitterMount};
use optic_types::{BranchKey, Constraint};
use scene_graph::{ComponentId, SceneGraph};

// ── Helpers ──────────────────────────────────────────────────────────────

fn request(component: ComponentId, angle: f64, constraint: Constraint) -> PlacementRequest {
    PlacementRequest {
        component,
        angle,
        constraint,
        fold_count: 0,
    }
}

fn xy(g: &SceneGraph, id: ComponentId) -> [f64; 2] {
    let t = g.component(id).unwrap().world.translation();
    [t.x, t.y]
}

fn assert_at(g: &SceneGraph, id: ComponentId, x: f64, y: f64) {
    let [px, py] = xy(g, id);
    assert_relative_eq!(px, x, epsilon = 1e-9);
    assert_relative_eq!(py, y, epsilon = 1e-9);
}

/// Beam along +x through a 45° splitter at (50, 0); the reflected output
/// leaves along +y.
fn split_layout() -> (SceneGraph, BeamPath, ComponentId) {
    let mut g = SceneGraph::default();
    let splitter = g.add_part("bs", SplitterMount::default().into(), None).unwrap();
    let mut path = BeamPath::new(0.0, 0.0, 0.0);
    path.add_request(BranchKey::ROOT, request(splitter, -45.0, Constraint::Distance(50.0)));
    (g, path, splitter)
}

// ── Marching Tests ───────────────────────────────────────────────────────

#[test]
fn mirror_folds_beam_onto_new_heading() {
    let mut g = SceneGraph::default();
    let mirror = g.add_part("m1", MirrorMount::default().into(), None).unwrap();
    let lens = g.add_part("lens", LensHolder::default().into(), None).unwrap();
    let mut path = BeamPath::new(20.0, 0.0, 90.0);
    path.add_request(BranchKey::ROOT, request(mirror, -45.0, Constraint::Distance(20.0)));
    path.add_request(BranchKey::ROOT, request(lens, 0.0, Constraint::Distance(10.0)));

    let res = path.resolve(&mut g, &ResolverConfig::default());
    assert!(res.is_clean(), "{:?}", res.errors);
    assert_at(&g, mirror, 20.0, 20.0);
    assert_at(&g, lens, 30.0, 20.0);
    assert_relative_eq!(g.component(mirror).unwrap().world.yaw_deg(), -45.0, epsilon = 1e-9);
    assert_relative_eq!(res.placement_of(lens).unwrap().incoming, 0.0, epsilon = 1e-9);
    assert_eq!(res.segments.len(), 2);
    assert_eq!(path.state(), BeamState::Resolved);
}

#[test]
fn absolute_constraints_meet_coordinate_lines() {
    let mut g = SceneGraph::default();
    let mirror = g.add_part("m1", MirrorMount::default().into(), None).unwrap();
    let lens = g.add_part("lens", LensHolder::default().into(), None).unwrap();
    let mut path = BeamPath::new(0.0, 10.0, 0.0);
    path.add_request(BranchKey::ROOT, request(mirror, 135.0, Constraint::AbsoluteX(40.0)));
    path.add_request(BranchKey::ROOT, request(lens, 90.0, Constraint::AbsoluteY(75.0)));

    let res = path.resolve(&mut g, &ResolverConfig::default());
    assert!(res.is_clean(), "{:?}", res.errors);
    assert_at(&g, mirror, 40.0, 10.0);
    assert_at(&g, lens, 40.0, 75.0);
}

#[test]
fn negative_distance_is_unsatisfiable() {
    let mut g = SceneGraph::default();
    let lens = g.add_part("lens", LensHolder::default().into(), None).unwrap();
    let mut path = BeamPath::new(0.0, 0.0, 0.0);
    path.add_request(BranchKey::ROOT, request(lens, 0.0, Constraint::Distance(-5.0)));

    let res = path.resolve(&mut g, &ResolverConfig::default());
    assert!(matches!(res.errors[0], BeamError::UnsatisfiableConstraint { .. }));
    assert!(g.component(lens).unwrap().stale);
    assert!(res.placements.is_empty());
}

#[test]
fn parented_component_cannot_be_placed() {
    let mut g = SceneGraph::default();
    let stage = g.add_part("wp", RotationStage::default().into(), None).unwrap();
    let adapter = g.component(stage).unwrap().children[0];
    let mut path = BeamPath::new(0.0, 0.0, 0.0);
    path.add_request(BranchKey::ROOT, request(adapter, 0.0, Constraint::Distance(5.0)));

    let res = path.resolve(&mut g, &ResolverConfig::default());
    assert!(matches!(res.errors[0], BeamError::Placement { .. }));
}

#[test]
fn folded_mirror_sends_beam_back() {
    let mut g = SceneGraph::default();
    let mirror = g.add_part("m1", MirrorMount::default().into(), None).unwrap();
    let lens = g.add_part("lens", LensHolder::default().into(), None).unwrap();
    let mut path = BeamPath::new(20.0, 0.0, 90.0);
    path.add_request(
        BranchKey::ROOT,
        PlacementRequest {
            fold_count: 1,
            ..request(mirror, -45.0, Constraint::Distance(20.0))
        },
    );
    path.add_request(BranchKey::ROOT, request(lens, 0.0, Constraint::Distance(10.0)));

    let res = path.resolve(&mut g, &ResolverConfig::default());
    assert!(res.is_clean(), "{:?}", res.errors);
    assert_at(&g, mirror, 20.0, 20.0);
    // one extra fold turns the unfolded +x exit into -x
    assert_at(&g, lens, 10.0, 20.0);
    let incoming = res.placement_of(lens).unwrap().incoming;
    assert_relative_eq!(incoming.to_radians().cos(), -1.0, epsilon = 1e-9);
}

// ── Branch Tests ─────────────────────────────────────────────────────────

#[test]
fn split_spawns_reflected_branch() {
    let (mut g, mut path, splitter) = split_layout();
    let straight = g.add_part("lens", LensHolder::default().into(), None).unwrap();
    let up = g.add_part("m_up", MirrorMount::default().into(), None).unwrap();
    path.add_request(BranchKey::ROOT, request(straight, 0.0, Constraint::Distance(20.0)));
    path.add_request(BranchKey(1), request(up, 45.0, Constraint::Distance(30.0)));

    let res = path.resolve(&mut g, &ResolverConfig::default());
    assert!(res.is_clean(), "{:?}", res.errors);
    assert_at(&g, splitter, 50.0, 0.0);
    assert_at(&g, straight, 70.0, 0.0);
    assert_at(&g, up, 50.0, 30.0);

    let reflected: Vec<_> = res.segments_on(BranchKey(1)).collect();
    assert_eq!(reflected.len(), 1);
    assert_relative_eq!(reflected[0].start[0], 50.0, epsilon = 1e-9);
    assert_relative_eq!(reflected[0].length(), 30.0, epsilon = 1e-9);
}

#[test]
fn perpendicular_absolute_x_fails_only_its_branch() {
    let (mut g, mut path, _) = split_layout();
    let straight = g.add_part("lens", LensHolder::default().into(), None).unwrap();
    let bad = g.add_part("m_bad", RotationStage::default().into(), None).unwrap();
    let bad_adapter = g.component(bad).unwrap().children[0];
    let after = g.add_part("m_after", MirrorMount::default().into(), None).unwrap();
    path.add_request(BranchKey::ROOT, request(straight, 0.0, Constraint::Distance(20.0)));
    path.add_request(BranchKey(1), request(bad, 45.0, Constraint::AbsoluteX(100.0)));
    path.add_request(BranchKey(1), request(after, 45.0, Constraint::Distance(10.0)));

    let res = path.resolve(&mut g, &ResolverConfig::default());
    assert_eq!(res.errors.len(), 1);
    assert!(matches!(
        &res.errors[0],
        BeamError::UnsatisfiableConstraint { component, .. } if component == "m_bad"
    ));
    assert_at(&g, straight, 70.0, 0.0);
    assert!(g.component(bad).unwrap().stale);
    assert!(g.component(bad_adapter).unwrap().stale);
    assert!(g.component(after).unwrap().stale);
    assert!(!g.component(straight).unwrap().stale);
    assert!(res.placement_of(after).is_none());
}

#[test]
fn non_root_split_ends_branch() {
    let mut g = SceneGraph::default();
    let pbs = g.add_part("pbs", PbsOnSkateMount::default().into(), None).unwrap();
    let late = g.add_part("late", LensHolder::default().into(), None).unwrap();
    let t = g.add_part("t", LensHolder::default().into(), None).unwrap();
    let r = g.add_part("r", MirrorMount::default().into(), None).unwrap();
    let mut path = BeamPath::new(0.0, 0.0, 0.0).with_root_key(BranchKey(1));
    path.add_request(BranchKey(1), request(pbs, 0.0, Constraint::Distance(10.0)));
    path.add_request(BranchKey(1), request(late, 0.0, Constraint::Distance(10.0)));
    path.add_request(BranchKey(2), request(t, 0.0, Constraint::Distance(15.0)));
    path.add_request(BranchKey(3), request(r, 45.0, Constraint::Distance(25.0)));

    let res = path.resolve(&mut g, &ResolverConfig::default());
    assert_eq!(res.errors.len(), 1);
    assert!(matches!(&res.errors[0], BeamError::BranchTerminated { component, .. } if component == "late"));
    assert_at(&g, t, 25.0, 0.0);
    assert_at(&g, r, 10.0, 25.0);
}

#[test]
fn folded_split_keeps_child_keys() {
    let (mut g, mut path, _) = split_layout();
    let second = g.add_part("bs2", SplitterMount::default().into(), None).unwrap();
    let down = g.add_part("down", LensHolder::default().into(), None).unwrap();
    let right = g.add_part("right", LensHolder::default().into(), None).unwrap();
    path.add_request(
        BranchKey(1),
        PlacementRequest {
            fold_count: 1,
            ..request(second, 45.0, Constraint::Distance(30.0))
        },
    );
    path.add_request(BranchKey(2), request(down, 90.0, Constraint::Distance(10.0)));
    path.add_request(BranchKey(3), request(right, 0.0, Constraint::Distance(10.0)));

    let res = path.resolve(&mut g, &ResolverConfig::default());
    assert!(res.is_clean(), "{:?}", res.errors);
    assert_at(&g, second, 50.0, 30.0);
    // the fold reverses the +y input, so the straight output runs -y
    assert_at(&g, down, 50.0, 20.0);
    assert_at(&g, right, 60.0, 30.0);
    assert_eq!(res.placement_of(down).unwrap().branch, BranchKey(2));
    assert_eq!(res.placement_of(right).unwrap().branch, BranchKey(3));
    assert_eq!(res.segments_on(BranchKey(4)).count(), 0);
}

#[test]
fn second_split_on_root_conflicts() {
    let (mut g, mut path, _) = split_layout();
    let second = g.add_part("bs2", SplitterMount::default().into(), None).unwrap();
    let lens = g.add_part("lens", LensHolder::default().into(), None).unwrap();
    path.add_request(BranchKey::ROOT, request(second, -45.0, Constraint::Distance(20.0)));
    path.add_request(BranchKey::ROOT, request(lens, 0.0, Constraint::Distance(20.0)));

    let res = path.resolve(&mut g, &ResolverConfig::default());
    assert_eq!(res.errors.len(), 1);
    assert!(matches!(&res.errors[0], BeamError::BranchKeyConflict { key, .. } if *key == BranchKey(1)));
    assert_at(&g, lens, 90.0, 0.0);
}

#[test]
fn unreachable_branch_is_reported() {
    let mut g = SceneGraph::default();
    let lens = g.add_part("lens", LensHolder::default().into(), None).unwrap();
    let mut path = BeamPath::new(0.0, 0.0, 0.0);
    path.add_request(BranchKey(5), request(lens, 0.0, Constraint::Distance(5.0)));

    let res = path.resolve(&mut g, &ResolverConfig::default());
    assert!(matches!(&res.errors[0], BeamError::UnreachableBranch { key, .. } if *key == BranchKey(5)));
    assert!(g.component(lens).unwrap().stale);
}

#[test]
fn terminal_element_stops_the_beam() {
    let mut g = SceneGraph::default();
    let port = g.add_part("fiber", FiberportHolder::default().into(), None).unwrap();
    let lens = g.add_part("lens", LensHolder::default().into(), None).unwrap();
    let mut path = BeamPath::new(0.0, 0.0, 0.0);
    path.add_request(BranchKey::ROOT, request(port, 180.0, Constraint::Distance(40.0)));
    path.add_request(BranchKey::ROOT, request(lens, 0.0, Constraint::Distance(5.0)));

    let res = path.resolve(&mut g, &ResolverConfig::default());
    assert_eq!(res.errors.len(), 1);
    assert!(matches!(res.errors[0], BeamError::BranchTerminated { .. }));
    assert_at(&g, port, 40.0, 0.0);
}

// ── Warning Tests ────────────────────────────────────────────────────────

#[test]
fn tilted_lens_exceeds_acceptance() {
    let mut g = SceneGraph::default();
    let lens = g.add_part("lens", LensHolder::default().into(), None).unwrap();
    let mut path = BeamPath::new(0.0, 0.0, 0.0);
    path.add_request(BranchKey::ROOT, request(lens, 30.0, Constraint::Distance(5.0)));

    let res = path.resolve(&mut g, &ResolverConfig::default());
    assert!(res.is_clean());
    assert!(res
        .warnings
        .iter()
        .any(|w| matches!(w, BeamWarning::AcceptanceExceeded { .. })));
}

#[test]
fn grazing_mirror_narrows_aperture() {
    let mut g = SceneGraph::default();
    let mirror = g.add_part("m", MirrorMount::default().into(), None).unwrap();
    let mut path = BeamPath::new(0.0, 0.0, 0.0);
    path.add_request(BranchKey::ROOT, request(mirror, 89.5, Constraint::Distance(5.0)));

    let res = path.resolve(&mut g, &ResolverConfig::default());
    assert!(res
        .warnings
        .iter()
        .any(|w| matches!(w, BeamWarning::NarrowAperture { .. })));
}

// ── Determinism ──────────────────────────────────────────────────────────

#[test]
fn resolution_is_deterministic() {
    let build = || {
        let (mut g, mut path, _) = split_layout();
        let a = g.add_part("a", LensHolder::default().into(), None).unwrap();
        let b = g.add_part("b", MirrorMount::default().into(), None).unwrap();
        path.add_request(BranchKey(1), request(b, 45.0, Constraint::Distance(12.0)));
        path.add_request(BranchKey::ROOT, request(a, 0.0, Constraint::AbsoluteX(80.0)));
        let res = path.resolve(&mut g, &ResolverConfig::default());
        (xy(&g, a), xy(&g, b), res.segments)
    };
    let first = build();
    let second = build();
    assert_eq!(first.0, second.0);
    assert_eq!(first.1, second.1);
    assert_eq!(first.2, second.2);
}
