use geometry_kernel::{GeometryKernel, MockKernel};
use mount_catalog::*;
use optic_types::{OpticalTag, Placement, INCH};
use part_ops::FootprintSpec;

// ── Helpers ──────────────────────────────────────────────────────────────

fn child_context(parent: &BuildContext, child: &ChildPart) -> BuildContext {
    parent.at(parent.frame.compose(&child.relative))
}

// ── Role Tests ───────────────────────────────────────────────────────────

#[test]
fn adapters_are_optically_inert() {
    let adapters: Vec<PartModel> = vec![
        BaseplateMount::default().into(),
        SurfaceAdapter::default().into(),
        SkateMount::default().into(),
        SlideMount::default().into(),
        KinematicMountAdapter::default().into(),
        UniversalMount::default().into(),
    ];
    for adapter in adapters {
        assert!(adapter.optical_role().tags.is_empty(), "{}", adapter.kind_name());
    }
}

#[test]
fn aom_split_orders_changes_role() {
    let single = PartModel::from(IsometAom::default()).optical_role();
    let split = PartModel::from(IsometAom {
        split_orders: true,
        ..IsometAom::default()
    })
    .optical_role();
    assert!(!single.is_split());
    assert!(split.is_split());
    assert!(!split.has(OpticalTag::Reflect));
}

// ── Child Tests ──────────────────────────────────────────────────────────

#[test]
fn pbs_skate_drill_lands_on_working_surface() {
    let mut kernel = MockKernel::new();
    let ctx = BuildContext::default();
    let pbs = PartModel::from(PbsOnSkateMount::default());
    let children = pbs.children(&ctx);
    assert_eq!(children.len(), 1);
    assert_eq!(children[0].suffix, "_Mount");

    let skate_ctx = child_context(&ctx, &children[0]);
    let drill = children[0]
        .model
        .build_drill(&mut kernel, &skate_ctx)
        .unwrap()
        .unwrap();
    let world = kernel.transform(&drill, &skate_ctx.frame).unwrap();
    let bb = kernel.bounding_box(&world).unwrap();
    assert!((bb.max[2] + INCH / 2.0).abs() < 1e-9);
}

#[test]
fn rotation_stage_adapter_uses_requested_spacing() {
    let stage = PartModel::from(RotationStage {
        mount_hole_dy: 30.0,
        wave_plate: None,
    });
    let children = stage.children(&BuildContext::default());
    match &children[0].model {
        PartModel::SurfaceAdapter(adapter) => assert_eq!(adapter.mount_hole_dy, 30.0),
        other => panic!("unexpected child {}", other.kind_name()),
    }
    assert!(children[0]
        .relative
        .approx_eq(&Placement::from_translation(0.0, 0.0, -14.0), 1e-12));
}

#[test]
fn table_mount_periscope_cuts_through_surface() {
    let mut kernel = MockKernel::new();
    let ctx = BuildContext::default();
    let scope = PartModel::from(Periscope {
        table_mount: true,
        ..Periscope::default()
    });
    let drill = scope.build_drill(&mut kernel, &ctx).unwrap().unwrap();
    let bb = kernel.bounding_box(&drill).unwrap();
    assert!(bb.max[2] >= ctx.surface_z());
    assert!(bb.min[2] < ctx.surface_z() - INCH + 1e-9);
}

// ── Serialization Tests ──────────────────────────────────────────────────

#[test]
fn part_model_json_is_tagged_by_kind() {
    let model = PartModel::from(MirrorMount {
        universal_mount: Some(UniversalMountOptions::default()),
        ..MirrorMount::default()
    });
    let json = serde_json::to_value(&model).unwrap();
    assert_eq!(json["type"], "MirrorMount");
    assert_eq!(json["mirror_thickness"], 6.0);
    let back: PartModel = serde_json::from_value(json).unwrap();
    assert_eq!(back, model);
}

#[test]
fn custom_part_footprint_survives_serialization() {
    let part = CustomPart::new([10.0, 20.0, 5.0], optic_types::OpticalRole::inert())
        .with_footprint(FootprintSpec::new(1.0, 2.0));
    let model = PartModel::from(part);
    let text = serde_json::to_string(&model).unwrap();
    let back: PartModel = serde_json::from_str(&text).unwrap();
    assert_eq!(back, model);
}

// ── Bill of Materials Tests ──────────────────────────────────────────────

#[test]
fn mirror_part_numbers_include_optic() {
    let mirror = PartModel::from(MirrorMount::default());
    assert_eq!(
        mirror.part_numbers(),
        vec!["POLARIS-K05S2".to_string(), "BB05-E03".to_string()]
    );
}
