//! Optical elements.
//!
//! Each element's frame is centered on its optical surface at beam height,
//! with the optical axis along local +x. Reflective faces look along +x;
//! mount hardware sits behind them in -x. Bodies are primitive envelopes
//! of the real hardware.

use geometry_kernel::{GeometryKernel, SolidHandle};
use optic_types::{OpticalRole, Placement, BOLT_14_20, BOLT_8_32, INCH, PIN_DIA};
use part_ops::{bounding_prism, custom_box, mount_hole, BoxSpec, FootprintSpec, HoleSpec, OpError};
use serde::{Deserialize, Serialize};

use crate::adapters::{KinematicMountAdapter, SkateMount, SlideMount, SurfaceAdapter, UniversalMount};
use crate::context::{cut_all, fuse, height_to_surface, BuildContext, ChildPart, Hardware};

/// Acceptance of elements that take a beam from any direction.
const WIDE_ACCEPTANCE: f64 = 90.0;

/// Tapped 8-32 hole plus two alignment pin holes either side of it.
fn pinned_tap(
    kernel: &mut dyn GeometryKernel,
    ctx: &BuildContext,
    x: f64,
) -> Result<SolidHandle, OpError> {
    let z = ctx.local_surface_z();
    let tap = mount_hole(kernel, &HoleSpec::tapped(&BOLT_8_32, ctx.drill_depth).at(x, 0.0, z))?;
    let mut parts = vec![tap];
    for y in [-5.0, 5.0] {
        parts.push(mount_hole(kernel, &HoleSpec::new(PIN_DIA, 2.2).at(x, y, z))?);
    }
    fuse(kernel, &parts)
}

/// Half-inch optic disc facing +x, `thickness` deep behind the origin.
fn optic_disc(
    kernel: &mut dyn GeometryKernel,
    thickness: f64,
) -> Result<SolidHandle, OpError> {
    Ok(kernel.make_cylinder(INCH / 4.0, thickness, [0.0; 3], [-1.0, 0.0, 0.0])?)
}

/// Mount block centered at `x` standing on the working surface.
fn standing_block(
    kernel: &mut dyn GeometryKernel,
    ctx: &BuildContext,
    x: f64,
    dx: f64,
    top: f64,
) -> Result<SolidHandle, OpError> {
    let dz = height_to_surface("mount block", top, ctx)?;
    custom_box(
        kernel,
        &BoxSpec::new(dx, INCH * 0.65, dz).at(x, 0.0, ctx.local_surface_z()),
    )
}

// ── Fiberport ───────────────────────────────────────────────────────────────

/// Fiber coupler: the end of a beam path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FiberportHolder {
    pub port_part: String,
}

impl Default for FiberportHolder {
    fn default() -> Self {
        Self {
            port_part: "PAF2-5A".into(),
        }
    }
}

impl Hardware for FiberportHolder {
    fn kind_name(&self) -> &'static str {
        "fiberport_holder"
    }

    fn optical_role(&self) -> OpticalRole {
        OpticalRole::terminal(0.5, WIDE_ACCEPTANCE)
    }

    fn part_numbers(&self) -> Vec<String> {
        vec!["HCA3".into(), self.port_part.clone()]
    }

    fn body(
        &self,
        kernel: &mut dyn GeometryKernel,
        ctx: &BuildContext,
    ) -> Result<SolidHandle, OpError> {
        let top = INCH * 0.75;
        let dz = height_to_surface(self.kind_name(), top, ctx)?;
        let housing = custom_box(
            kernel,
            &BoxSpec::new(INCH / 2.0, INCH * 1.5, dz).at(-INCH / 4.0, 0.0, ctx.local_surface_z()),
        )?;
        let port = kernel.make_cylinder(6.0, 20.0, [0.0; 3], [1.0, 0.0, 0.0])?;
        fuse(kernel, &[housing, port])
    }

    fn drill(
        &self,
        kernel: &mut dyn GeometryKernel,
        ctx: &BuildContext,
    ) -> Result<Option<SolidHandle>, OpError> {
        let z = ctx.local_surface_z();
        let mut holes = Vec::new();
        for y in [-INCH / 2.0, 0.0, INCH / 2.0] {
            holes.push(mount_hole(
                kernel,
                &HoleSpec::tapped(&BOLT_8_32, ctx.drill_depth).at(-INCH / 4.0, y, z),
            )?);
        }
        fuse(kernel, &holes).map(Some)
    }
}

// ── Polarizing beam splitter cube ───────────────────────────────────────────

/// Cube splitter resting on a skate mount.
///
/// The reflected port leaves at +90° from the transmitted beam, or at
/// -90° when `invert` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PbsOnSkateMount {
    pub cube_size: f64,
    pub invert: bool,
    pub part_number: String,
}

impl Default for PbsOnSkateMount {
    fn default() -> Self {
        Self {
            cube_size: 10.0,
            invert: false,
            part_number: "PBS101".into(),
        }
    }
}

impl Hardware for PbsOnSkateMount {
    fn kind_name(&self) -> &'static str {
        "pbs_on_skate_mount"
    }

    fn optical_role(&self) -> OpticalRole {
        let offset = if self.invert { -135.0 } else { 135.0 };
        OpticalRole::splitter(self.cube_size * 2f64.sqrt() / 2.0, offset, 0.0)
    }

    fn part_numbers(&self) -> Vec<String> {
        vec![self.part_number.clone()]
    }

    fn children(&self, _ctx: &BuildContext) -> Vec<ChildPart> {
        vec![ChildPart::new(
            "_Mount",
            SkateMount::for_cube(self.cube_size),
            Placement::from_translation(0.0, 0.0, -self.cube_size / 2.0 + 1.0),
        )]
    }

    fn body(
        &self,
        kernel: &mut dyn GeometryKernel,
        _ctx: &BuildContext,
    ) -> Result<SolidHandle, OpError> {
        let c = self.cube_size;
        custom_box(kernel, &BoxSpec::new(c, c, c).anchored([0.0; 3]))
    }
}

// ── Rotation stage ──────────────────────────────────────────────────────────

/// RSP05 rotation mount on a surface adapter, typically holding a wave plate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RotationStage {
    pub mount_hole_dy: f64,
    pub wave_plate: Option<String>,
}

impl Default for RotationStage {
    fn default() -> Self {
        Self {
            mount_hole_dy: 25.0,
            wave_plate: None,
        }
    }
}

impl Hardware for RotationStage {
    fn kind_name(&self) -> &'static str {
        "rotation_stage_rsp05"
    }

    fn optical_role(&self) -> OpticalRole {
        OpticalRole::transmitter(INCH / 4.0, 0.0, WIDE_ACCEPTANCE)
    }

    fn part_numbers(&self) -> Vec<String> {
        std::iter::once("RSP05".to_string())
            .chain(self.wave_plate.clone())
            .collect()
    }

    fn children(&self, _ctx: &BuildContext) -> Vec<ChildPart> {
        vec![ChildPart::new(
            "_Adapter",
            SurfaceAdapter::with_hole_spacing(self.mount_hole_dy),
            Placement::from_translation(0.0, 0.0, -14.0),
        )]
    }

    fn body(
        &self,
        kernel: &mut dyn GeometryKernel,
        _ctx: &BuildContext,
    ) -> Result<SolidHandle, OpError> {
        let ring = kernel.make_cylinder(14.0, 10.0, [-5.0, 0.0, 0.0], [1.0, 0.0, 0.0])?;
        let aperture = kernel.make_cylinder(INCH / 4.0, 12.0, [-6.0, 0.0, 0.0], [1.0, 0.0, 0.0])?;
        cut_all(kernel, ring, &[aperture])
    }
}

// ── Mirror mount ────────────────────────────────────────────────────────────

/// Placement of a universal mount under an element, in the element frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UniversalMountOptions {
    pub size: [f64; 3],
    pub offset: [f64; 2],
}

impl Default for UniversalMountOptions {
    fn default() -> Self {
        Self {
            size: UniversalMount::default().size,
            offset: [-10.0, 0.0],
        }
    }
}

fn universal_child(options: &UniversalMountOptions, ctx: &BuildContext) -> ChildPart {
    let [x, y] = options.offset;
    ChildPart::new(
        "_Mount",
        UniversalMount { size: options.size },
        Placement::from_translation(x, y, -ctx.optics_dz),
    )
}

/// K05S2 kinematic mirror mount.
///
/// With a universal mount the element's own hole pattern is not drilled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MirrorMount {
    pub mirror_thickness: f64,
    pub mirror_part: String,
    pub universal_mount: Option<UniversalMountOptions>,
}

impl Default for MirrorMount {
    fn default() -> Self {
        Self {
            mirror_thickness: 6.0,
            mirror_part: "BB05-E03".into(),
            universal_mount: None,
        }
    }
}

impl MirrorMount {
    fn mount_x(&self) -> f64 {
        -8.0 - self.mirror_thickness
    }
}

impl Hardware for MirrorMount {
    fn kind_name(&self) -> &'static str {
        "mirror_mount_k05s2"
    }

    fn optical_role(&self) -> OpticalRole {
        OpticalRole::reflector(INCH / 4.0, WIDE_ACCEPTANCE)
    }

    fn part_numbers(&self) -> Vec<String> {
        vec!["POLARIS-K05S2".into(), self.mirror_part.clone()]
    }

    fn default_drill(&self) -> bool {
        self.universal_mount.is_none()
    }

    fn children(&self, ctx: &BuildContext) -> Vec<ChildPart> {
        self.universal_mount
            .iter()
            .map(|options| universal_child(options, ctx))
            .collect()
    }

    fn body(
        &self,
        kernel: &mut dyn GeometryKernel,
        ctx: &BuildContext,
    ) -> Result<SolidHandle, OpError> {
        let mirror = optic_disc(kernel, self.mirror_thickness)?;
        let block = standing_block(kernel, ctx, self.mount_x(), 9.0, INCH / 3.0)?;
        fuse(kernel, &[mirror, block])
    }

    fn drill(
        &self,
        kernel: &mut dyn GeometryKernel,
        ctx: &BuildContext,
    ) -> Result<Option<SolidHandle>, OpError> {
        pinned_tap(kernel, ctx, self.mount_x()).map(Some)
    }
}

// ── Splitter plate mount ────────────────────────────────────────────────────

/// C05G fixed mount holding a plate beam splitter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitterMount {
    pub plate_thickness: f64,
    pub plate_part: String,
}

impl Default for SplitterMount {
    fn default() -> Self {
        Self {
            plate_thickness: 3.0,
            plate_part: "BSW05".into(),
        }
    }
}

impl SplitterMount {
    fn mount_x(&self) -> f64 {
        -6.4 - self.plate_thickness
    }
}

impl Hardware for SplitterMount {
    fn kind_name(&self) -> &'static str {
        "splitter_mount_c05g"
    }

    fn optical_role(&self) -> OpticalRole {
        OpticalRole::splitter(INCH / 4.0, 0.0, WIDE_ACCEPTANCE)
    }

    fn part_numbers(&self) -> Vec<String> {
        vec!["POLARIS-C05G".into(), self.plate_part.clone()]
    }

    fn body(
        &self,
        kernel: &mut dyn GeometryKernel,
        ctx: &BuildContext,
    ) -> Result<SolidHandle, OpError> {
        let plate = optic_disc(kernel, self.plate_thickness)?;
        let block = standing_block(kernel, ctx, self.mount_x(), 6.4, INCH / 3.0)?;
        fuse(kernel, &[plate, block])
    }

    fn drill(
        &self,
        kernel: &mut dyn GeometryKernel,
        ctx: &BuildContext,
    ) -> Result<Option<SolidHandle>, OpError> {
        pinned_tap(kernel, ctx, self.mount_x()).map(Some)
    }
}

// ── Lens holder ─────────────────────────────────────────────────────────────

/// L05G fixed lens mount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LensHolder {
    pub focal_length: f64,
    pub lens_part: Option<String>,
}

impl Default for LensHolder {
    fn default() -> Self {
        Self {
            focal_length: 50.0,
            lens_part: None,
        }
    }
}

impl Hardware for LensHolder {
    fn kind_name(&self) -> &'static str {
        "lens_holder_l05g"
    }

    fn optical_role(&self) -> OpticalRole {
        OpticalRole::transmitter(INCH / 4.0, 0.0, 0.0)
    }

    fn part_numbers(&self) -> Vec<String> {
        std::iter::once("POLARIS-L05G".to_string())
            .chain(self.lens_part.clone())
            .collect()
    }

    fn body(
        &self,
        kernel: &mut dyn GeometryKernel,
        ctx: &BuildContext,
    ) -> Result<SolidHandle, OpError> {
        let lens = kernel.make_cylinder(INCH / 4.0, 2.0, [-1.0, 0.0, 0.0], [1.0, 0.0, 0.0])?;
        let holder = standing_block(kernel, ctx, -9.5, 6.0, INCH / 3.0)?;
        fuse(kernel, &[lens, holder])
    }

    fn drill(
        &self,
        kernel: &mut dyn GeometryKernel,
        ctx: &BuildContext,
    ) -> Result<Option<SolidHandle>, OpError> {
        pinned_tap(kernel, ctx, -9.5).map(Some)
    }
}

// ── Pinhole ─────────────────────────────────────────────────────────────────

/// IDA12 iris on a slide mount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pinhole {
    pub slot_length: f64,
    pub drill_offset: f64,
}

impl Default for Pinhole {
    fn default() -> Self {
        Self {
            slot_length: 10.0,
            drill_offset: 0.0,
        }
    }
}

impl Hardware for Pinhole {
    fn kind_name(&self) -> &'static str {
        "pinhole_ida12"
    }

    fn optical_role(&self) -> OpticalRole {
        OpticalRole::transmitter(INCH / 4.0, 0.0, 0.0)
    }

    fn part_numbers(&self) -> Vec<String> {
        vec!["IDA12-P5".into()]
    }

    fn children(&self, _ctx: &BuildContext) -> Vec<ChildPart> {
        vec![ChildPart::new(
            "_Mount",
            SlideMount {
                slot_length: self.slot_length,
                drill_offset: self.drill_offset,
            },
            Placement::from_translation(-0.75, -12.85, 0.0),
        )]
    }

    fn body(
        &self,
        kernel: &mut dyn GeometryKernel,
        _ctx: &BuildContext,
    ) -> Result<SolidHandle, OpError> {
        Ok(kernel.make_cylinder(INCH / 2.0, 5.0, [-2.5, 0.0, 0.0], [1.0, 0.0, 0.0])?)
    }
}

// ── Acousto-optic modulator ─────────────────────────────────────────────────

/// Isomet AOM on a kinematic mount.
///
/// By default the element passes only the first order, deflected by
/// `diffraction_deg`. With `split_orders` the undeviated order continues
/// on the transmitted branch and the first order on the other.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IsometAom {
    pub diffraction_deg: f64,
    pub split_orders: bool,
    pub slot_length: f64,
}

impl Default for IsometAom {
    fn default() -> Self {
        Self {
            diffraction_deg: (-0.026f64).to_degrees(),
            split_orders: false,
            slot_length: 5.0,
        }
    }
}

impl Hardware for IsometAom {
    fn kind_name(&self) -> &'static str {
        "isomet_aom"
    }

    fn optical_role(&self) -> OpticalRole {
        if self.split_orders {
            OpticalRole::diffractive_splitter(2.5, self.diffraction_deg, 0.0)
        } else {
            OpticalRole::transmitter(2.5, self.diffraction_deg, 0.0)
        }
    }

    fn part_numbers(&self) -> Vec<String> {
        vec!["ISOMET-1205C".into()]
    }

    fn children(&self, _ctx: &BuildContext) -> Vec<ChildPart> {
        vec![ChildPart::new(
            "_Mount",
            KinematicMountAdapter {
                slot_length: self.slot_length,
            },
            Placement::identity(),
        )]
    }

    fn body(
        &self,
        kernel: &mut dyn GeometryKernel,
        _ctx: &BuildContext,
    ) -> Result<SolidHandle, OpError> {
        custom_box(kernel, &BoxSpec::new(22.0, 50.8, 20.0).at(-11.0, -7.52, -10.0).anchored([0.0, 0.0, 1.0]))
    }
}

// ── Periscope ───────────────────────────────────────────────────────────────

/// Two stacked mirrors that lift the beam to `upper_dz` above the surface
/// while keeping its plan-view heading.
///
/// A table-mount periscope stands on the table through a cutout in the plate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Periscope {
    pub lower_dz: f64,
    pub upper_dz: f64,
    pub table_mount: bool,
}

impl Default for Periscope {
    fn default() -> Self {
        Self {
            lower_dz: INCH / 2.0,
            upper_dz: 2.0 * INCH,
            table_mount: false,
        }
    }
}

const PERISCOPE_BASE: [f64; 3] = [60.0, INCH, 6.0];
const PERISCOPE_BASE_X: f64 = -10.0;

impl Periscope {
    /// Height of the periscope base in the element frame.
    fn floor(&self, ctx: &BuildContext) -> f64 {
        if self.table_mount {
            -ctx.optics_dz - INCH
        } else {
            -ctx.optics_dz
        }
    }

    fn bolt_xs(&self) -> [f64; 2] {
        [PERISCOPE_BASE_X - 22.0, PERISCOPE_BASE_X + 22.0]
    }
}

impl Hardware for Periscope {
    fn kind_name(&self) -> &'static str {
        "periscope"
    }

    fn optical_role(&self) -> OpticalRole {
        OpticalRole::transmitter(0.5, 0.0, WIDE_ACCEPTANCE)
    }

    fn part_numbers(&self) -> Vec<String> {
        vec!["RS99".into()]
    }

    fn children(&self, ctx: &BuildContext) -> Vec<ChildPart> {
        let floor = self.floor(ctx);
        let lower = Placement::from_euler_deg([0.0, 0.0, floor + self.lower_dz], [0.0, -135.0, 0.0]);
        let upper = Placement::from_euler_deg([0.0, 0.0, floor + self.upper_dz], [0.0, 45.0, 0.0]);
        vec![
            ChildPart::new("_Lower", MirrorMount::default(), lower).without_drill(),
            ChildPart::new("_Upper", MirrorMount::default(), upper).without_drill(),
        ]
    }

    fn body(
        &self,
        kernel: &mut dyn GeometryKernel,
        ctx: &BuildContext,
    ) -> Result<SolidHandle, OpError> {
        let floor = self.floor(ctx);
        let [bx, by, bz] = PERISCOPE_BASE;
        let base = custom_box(
            kernel,
            &BoxSpec::new(bx, by, bz).at(PERISCOPE_BASE_X, 0.0, floor).fillet(3.0),
        )?;
        let tower = custom_box(
            kernel,
            &BoxSpec::new(12.0, INCH, self.upper_dz + 10.0).at(-25.0, 0.0, floor),
        )?;
        let solid = fuse(kernel, &[base, tower])?;
        let mut holes = Vec::new();
        for x in self.bolt_xs() {
            holes.push(mount_hole(
                kernel,
                &HoleSpec::clearance(&BOLT_14_20, bz).at(x, 0.0, floor + bz),
            )?);
        }
        cut_all(kernel, solid, &holes)
    }

    fn drill(
        &self,
        kernel: &mut dyn GeometryKernel,
        ctx: &BuildContext,
    ) -> Result<Option<SolidHandle>, OpError> {
        if self.table_mount {
            let body = self.body(kernel, ctx)?;
            let bounds = kernel.bounding_box(&body)?;
            let cutout = bounding_prism(
                kernel,
                &bounds,
                &ctx.frame,
                ctx.surface_z(),
                &FootprintSpec::new(1.0, 3.0),
            )?;
            return Ok(Some(cutout));
        }
        let z = ctx.local_surface_z();
        let mut holes = Vec::new();
        for x in self.bolt_xs() {
            holes.push(mount_hole(
                kernel,
                &HoleSpec::tapped(&BOLT_14_20, ctx.drill_depth).at(x, 0.0, z),
            )?);
        }
        fuse(kernel, &holes).map(Some)
    }
}

// ── Isolator ────────────────────────────────────────────────────────────────

/// Faraday isolator on a surface adapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Isolator {
    pub mount_hole_dy: f64,
    pub part_number: String,
}

impl Default for Isolator {
    fn default() -> Self {
        Self {
            mount_hole_dy: 50.0,
            part_number: "IO-3D-670-VLP".into(),
        }
    }
}

impl Hardware for Isolator {
    fn kind_name(&self) -> &'static str {
        "isolator_670"
    }

    fn optical_role(&self) -> OpticalRole {
        OpticalRole::transmitter(2.0, 0.0, WIDE_ACCEPTANCE)
    }

    fn part_numbers(&self) -> Vec<String> {
        vec![self.part_number.clone()]
    }

    fn children(&self, _ctx: &BuildContext) -> Vec<ChildPart> {
        vec![ChildPart::new(
            "_Adapter",
            SurfaceAdapter::with_hole_spacing(self.mount_hole_dy),
            Placement::from_translation(0.0, 0.0, -22.1),
        )]
    }

    fn body(
        &self,
        kernel: &mut dyn GeometryKernel,
        _ctx: &BuildContext,
    ) -> Result<SolidHandle, OpError> {
        Ok(kernel.make_cylinder(22.0, 60.0, [-30.0, 0.0, 0.0], [1.0, 0.0, 0.0])?)
    }

    fn drill(
        &self,
        kernel: &mut dyn GeometryKernel,
        ctx: &BuildContext,
    ) -> Result<Option<SolidHandle>, OpError> {
        let body = self.body(kernel, ctx)?;
        let bounds = kernel.bounding_box(&body)?;
        let spec = FootprintSpec::new(1.0, 5.0).max_offset([0.0, 0.0, -40.0]);
        bounding_prism(kernel, &bounds, &ctx.frame, ctx.surface_z(), &spec).map(Some)
    }
}

// ── Custom part ─────────────────────────────────────────────────────────────

/// User-described hardware: a box envelope with an arbitrary optical role
/// and, optionally, a generic bounding-prism footprint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomPart {
    pub size: [f64; 3],
    pub role: OpticalRole,
    pub footprint: Option<FootprintSpec>,
    pub part_numbers: Vec<String>,
}

impl CustomPart {
    pub fn new(size: [f64; 3], role: OpticalRole) -> Self {
        Self {
            size,
            role,
            footprint: None,
            part_numbers: Vec::new(),
        }
    }

    pub fn with_footprint(mut self, footprint: FootprintSpec) -> Self {
        self.footprint = Some(footprint);
        self
    }
}

impl Hardware for CustomPart {
    fn kind_name(&self) -> &'static str {
        "custom"
    }

    fn optical_role(&self) -> OpticalRole {
        self.role.clone()
    }

    fn part_numbers(&self) -> Vec<String> {
        self.part_numbers.clone()
    }

    fn body(
        &self,
        kernel: &mut dyn GeometryKernel,
        _ctx: &BuildContext,
    ) -> Result<SolidHandle, OpError> {
        let [dx, dy, dz] = self.size;
        custom_box(kernel, &BoxSpec::new(dx, dy, dz).anchored([0.0; 3]))
    }

    fn drill(
        &self,
        kernel: &mut dyn GeometryKernel,
        ctx: &BuildContext,
    ) -> Result<Option<SolidHandle>, OpError> {
        let Some(spec) = &self.footprint else {
            return Ok(None);
        };
        let body = self.body(kernel, ctx)?;
        let bounds = kernel.bounding_box(&body)?;
        bounding_prism(kernel, &bounds, &ctx.frame, ctx.surface_z(), spec).map(Some)
    }
}
