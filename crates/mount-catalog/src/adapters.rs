//! Mechanical adapters that carry an optical element and bolt it down.
//!
//! An adapter is built in its own frame, which the element it serves
//! places through a fixed relative offset. Bolt clearance is cut from the
//! adapter body; the drill footprint is what the baseplate loses.

use geometry_kernel::{BoundingBox, GeometryKernel, SolidHandle};
use optic_types::{BOLT_14_20, BOLT_8_32, INCH};
use part_ops::{bounding_prism, custom_box, mount_hole, BoxSpec, FootprintSpec, HoleSpec, OpError};
use serde::{Deserialize, Serialize};

use crate::context::{cut_all, fuse, height_to_surface, BuildContext, Hardware};

// ── Baseplate (table) mount ─────────────────────────────────────────────────

/// A 1/4-20 bolt holding the baseplate to the optical table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseplateMount {
    /// Depth of the counterbore below the working surface.
    pub bore_depth: f64,
}

impl Default for BaseplateMount {
    fn default() -> Self {
        Self { bore_depth: 10.0 }
    }
}

impl Hardware for BaseplateMount {
    fn kind_name(&self) -> &'static str {
        "baseplate_mount"
    }

    fn part_numbers(&self) -> Vec<String> {
        vec!["SH25S050".into()]
    }

    fn body(
        &self,
        kernel: &mut dyn GeometryKernel,
        ctx: &BuildContext,
    ) -> Result<SolidHandle, OpError> {
        let seat = ctx.local_surface_z() - self.bore_depth;
        let shaft = kernel.make_cylinder(
            BOLT_14_20.tap_dia / 2.0,
            INCH,
            [0.0, 0.0, seat],
            [0.0, 0.0, -1.0],
        )?;
        let head = kernel.make_cylinder(
            BOLT_14_20.head_dia / 2.0,
            self.bore_depth.min(INCH / 4.0),
            [0.0, 0.0, seat],
            [0.0, 0.0, 1.0],
        )?;
        fuse(kernel, &[shaft, head])
    }

    fn drill(
        &self,
        kernel: &mut dyn GeometryKernel,
        ctx: &BuildContext,
    ) -> Result<Option<SolidHandle>, OpError> {
        let hole = HoleSpec::clearance(&BOLT_14_20, ctx.drill_depth)
            .at(0.0, 0.0, ctx.local_surface_z())
            .head(BOLT_14_20.counterbore_dia(), self.bore_depth);
        Ok(Some(mount_hole(kernel, &hole)?))
    }
}

// ── Surface adapter ─────────────────────────────────────────────────────────

/// Block that converts a single center tap into two plate bolts.
///
/// The element bolts into the block from below; two 8-32 bolts at
/// `±mount_hole_dy / 2` hold the block down. If the block reaches below
/// the working surface, the plate is pocketed to receive it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceAdapter {
    pub mount_hole_dy: f64,
    pub adapter_height: f64,
    pub outer_thickness: f64,
}

impl Default for SurfaceAdapter {
    fn default() -> Self {
        Self {
            mount_hole_dy: 20.0,
            adapter_height: 8.0,
            outer_thickness: 2.0,
        }
    }
}

impl SurfaceAdapter {
    pub fn with_hole_spacing(mount_hole_dy: f64) -> Self {
        Self {
            mount_hole_dy,
            ..Self::default()
        }
    }

    fn footprint(&self) -> (f64, f64) {
        let dx = BOLT_8_32.head_dia + 2.0 * self.outer_thickness;
        let dy = self.mount_hole_dy + BOLT_8_32.head_dia + 2.0 * self.outer_thickness;
        (dx, dy)
    }
}

impl Hardware for SurfaceAdapter {
    fn kind_name(&self) -> &'static str {
        "surface_adapter"
    }

    fn body(
        &self,
        kernel: &mut dyn GeometryKernel,
        _ctx: &BuildContext,
    ) -> Result<SolidHandle, OpError> {
        let (dx, dy) = self.footprint();
        let dz = self.adapter_height;
        let block = custom_box(kernel, &BoxSpec::new(dx, dy, dz).hanging().fillet(3.0))?;
        let center = mount_hole(
            kernel,
            &HoleSpec::clearance(&BOLT_8_32, dz)
                .at(0.0, 0.0, -dz)
                .direction([0.0, 0.0, 1.0])
                .bolt_head(&BOLT_8_32),
        )?;
        let mut holes = vec![center];
        for y in [-1.0, 1.0] {
            holes.push(mount_hole(
                kernel,
                &HoleSpec::clearance(&BOLT_8_32, dz)
                    .at(0.0, y * self.mount_hole_dy / 2.0, 0.0)
                    .bolt_head(&BOLT_8_32),
            )?);
        }
        cut_all(kernel, block, &holes)
    }

    fn drill(
        &self,
        kernel: &mut dyn GeometryKernel,
        ctx: &BuildContext,
    ) -> Result<Option<SolidHandle>, OpError> {
        let bottom = -self.adapter_height;
        let mut parts = Vec::new();
        for y in [-1.0, 1.0] {
            parts.push(mount_hole(
                kernel,
                &HoleSpec::tapped(&BOLT_8_32, ctx.drill_depth).at(0.0, y * self.mount_hole_dy / 2.0, bottom),
            )?);
        }
        let pocket = ctx.local_surface_z() - bottom;
        if pocket > 0.0 {
            let (dx, dy) = self.footprint();
            parts.push(custom_box(
                kernel,
                &BoxSpec::new(dx + 1.0, dy + 1.0, pocket)
                    .at(0.0, 0.0, ctx.local_surface_z())
                    .hanging()
                    .fillet(3.0),
            )?);
        }
        fuse(kernel, &parts).map(Some)
    }
}

// ── Skate mount ─────────────────────────────────────────────────────────────

/// Printed skate that cradles a cube optic in a 1 mm recess.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkateMount {
    pub cube_size: f64,
    pub mount_hole_dy: f64,
    pub cube_tol: f64,
}

impl Default for SkateMount {
    fn default() -> Self {
        Self {
            cube_size: 10.0,
            mount_hole_dy: 20.0,
            cube_tol: 0.1,
        }
    }
}

impl SkateMount {
    pub fn for_cube(cube_size: f64) -> Self {
        Self {
            cube_size,
            ..Self::default()
        }
    }
}

impl Hardware for SkateMount {
    fn kind_name(&self) -> &'static str {
        "skate_mount"
    }

    fn body(
        &self,
        kernel: &mut dyn GeometryKernel,
        ctx: &BuildContext,
    ) -> Result<SolidHandle, OpError> {
        let dz = height_to_surface(self.kind_name(), 0.0, ctx)?;
        let dx = BOLT_8_32.head_dia + 5.0;
        let dy = self.mount_hole_dy + BOLT_8_32.head_dia + 3.0;
        let base = custom_box(kernel, &BoxSpec::new(dx, dy, dz).hanging().fillet(3.0))?;
        let seat = self.cube_size + self.cube_tol;
        let mut tools = vec![custom_box(
            kernel,
            &BoxSpec::new(seat, seat, 1.0 + 1e-3).at(0.0, 0.0, 1e-3).hanging(),
        )?];
        for y in [-1.0, 1.0] {
            tools.push(mount_hole(
                kernel,
                &HoleSpec::clearance(&BOLT_8_32, dz)
                    .at(0.0, y * self.mount_hole_dy / 2.0, 0.0)
                    .bolt_head(&BOLT_8_32),
            )?);
        }
        cut_all(kernel, base, &tools)
    }

    fn drill(
        &self,
        kernel: &mut dyn GeometryKernel,
        ctx: &BuildContext,
    ) -> Result<Option<SolidHandle>, OpError> {
        let z = ctx.local_surface_z();
        let mut holes = Vec::new();
        for y in [-1.0, 1.0] {
            holes.push(mount_hole(
                kernel,
                &HoleSpec::tapped(&BOLT_8_32, ctx.drill_depth).at(0.0, y * self.mount_hole_dy / 2.0, z),
            )?);
        }
        fuse(kernel, &holes).map(Some)
    }
}

// ── Slide mount ─────────────────────────────────────────────────────────────

/// Post with a slotted foot, so the optic can slide along the beam before
/// the bolt is tightened. The foot extends behind the post in -y.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlideMount {
    pub slot_length: f64,
    /// Shift of the plate hole along the slot.
    pub drill_offset: f64,
}

impl Default for SlideMount {
    fn default() -> Self {
        Self {
            slot_length: 10.0,
            drill_offset: 0.0,
        }
    }
}

const SLIDE_POST_DY: f64 = 3.0;
const SLIDE_FOOT_DZ: f64 = 4.0;

impl SlideMount {
    fn foot_dy(&self) -> f64 {
        self.slot_length + BOLT_8_32.head_dia + 4.0
    }

    fn foot_center_y(&self) -> f64 {
        -SLIDE_POST_DY / 2.0 - self.foot_dy() / 2.0
    }
}

impl Hardware for SlideMount {
    fn kind_name(&self) -> &'static str {
        "slide_mount"
    }

    fn body(
        &self,
        kernel: &mut dyn GeometryKernel,
        ctx: &BuildContext,
    ) -> Result<SolidHandle, OpError> {
        let dz = height_to_surface(self.kind_name(), 0.0, ctx)?;
        let z = ctx.local_surface_z();
        let foot_dx = BOLT_8_32.head_dia + 4.0;
        let post = custom_box(kernel, &BoxSpec::new(8.0, SLIDE_POST_DY, dz).hanging())?;
        let foot = custom_box(
            kernel,
            &BoxSpec::new(foot_dx, self.foot_dy(), SLIDE_FOOT_DZ)
                .at(0.0, self.foot_center_y(), z)
                .fillet(2.0),
        )?;
        let slot = custom_box(
            kernel,
            &BoxSpec::new(BOLT_8_32.clear_dia, self.slot_length, SLIDE_FOOT_DZ + 2.0)
                .at(0.0, self.foot_center_y(), z - 1.0),
        )?;
        let solid = fuse(kernel, &[post, foot])?;
        cut_all(kernel, solid, &[slot])
    }

    fn drill(
        &self,
        kernel: &mut dyn GeometryKernel,
        ctx: &BuildContext,
    ) -> Result<Option<SolidHandle>, OpError> {
        let hole = HoleSpec::tapped(&BOLT_8_32, ctx.drill_depth).at(
            0.0,
            self.foot_center_y() + self.drill_offset,
            ctx.local_surface_z(),
        );
        Ok(Some(mount_hole(kernel, &hole)?))
    }
}

// ── Kinematic mount adapter ─────────────────────────────────────────────────

/// KM100PM-style kinematic platform on a slotted foot.
///
/// Built in the carried element's frame: the platform sits behind and
/// below the element. The foot rests in a shallow pocket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KinematicMountAdapter {
    pub slot_length: f64,
}

impl Default for KinematicMountAdapter {
    fn default() -> Self {
        Self { slot_length: 5.0 }
    }
}

const KM_CENTER: [f64; 2] = [-29.27, -7.52];
const KM_TOP: f64 = 12.07;
const KM_FOOT_DZ: f64 = 5.0;
const KM_POCKET_DZ: f64 = 2.0;

impl Hardware for KinematicMountAdapter {
    fn kind_name(&self) -> &'static str {
        "kinematic_mount_adapter"
    }

    fn part_numbers(&self) -> Vec<String> {
        vec!["KM100PM".into()]
    }

    fn body(
        &self,
        kernel: &mut dyn GeometryKernel,
        ctx: &BuildContext,
    ) -> Result<SolidHandle, OpError> {
        let [cx, cy] = KM_CENTER;
        let floor = ctx.local_surface_z() - KM_POCKET_DZ;
        let plate_bottom = floor + KM_FOOT_DZ;
        let plate_dz = KM_TOP - plate_bottom;
        if plate_dz <= 0.0 {
            return Err(OpError::InvalidParameter {
                reason: format!("kinematic platform has no room above the foot ({plate_dz})"),
            });
        }
        let plate = custom_box(kernel, &BoxSpec::new(8.0, 38.1, plate_dz).at(cx, cy, plate_bottom))?;
        let foot = custom_box(
            kernel,
            &BoxSpec::new(self.slot_length + 15.0, 12.0, KM_FOOT_DZ)
                .at(cx, cy, floor)
                .fillet(2.0),
        )?;
        let slot = custom_box(
            kernel,
            &BoxSpec::new(self.slot_length + BOLT_8_32.clear_dia, BOLT_8_32.clear_dia, KM_FOOT_DZ + 2.0)
                .at(cx, cy, floor - 1.0),
        )?;
        let solid = fuse(kernel, &[plate, foot])?;
        cut_all(kernel, solid, &[slot])
    }

    fn drill(
        &self,
        kernel: &mut dyn GeometryKernel,
        ctx: &BuildContext,
    ) -> Result<Option<SolidHandle>, OpError> {
        let body = self.body(kernel, ctx)?;
        let bounds: BoundingBox = kernel.bounding_box(&body)?;
        let pocket = bounding_prism(
            kernel,
            &bounds,
            &ctx.frame,
            ctx.surface_z(),
            &FootprintSpec::new(1.0, 3.0),
        )?;
        let [cx, cy] = KM_CENTER;
        let tap = mount_hole(
            kernel,
            &HoleSpec::tapped(&BOLT_8_32, ctx.drill_depth).at(cx, cy, bounds.min[2]),
        )?;
        fuse(kernel, &[pocket, tap]).map(Some)
    }
}

// ── Universal mount ─────────────────────────────────────────────────────────

/// Printed block recessed into the plate, carrying an element whose own
/// hole pattern should not be drilled into the baseplate.
///
/// Its frame sits at the working surface; the block hangs `size[2]` below it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UniversalMount {
    pub size: [f64; 3],
}

impl Default for UniversalMount {
    fn default() -> Self {
        Self {
            size: [20.0, 30.0, 4.0],
        }
    }
}

impl UniversalMount {
    fn hole_ys(&self) -> [f64; 2] {
        let y = self.size[1] / 2.0 - 5.0;
        [-y, y]
    }
}

impl Hardware for UniversalMount {
    fn kind_name(&self) -> &'static str {
        "universal_mount"
    }

    fn body(
        &self,
        kernel: &mut dyn GeometryKernel,
        ctx: &BuildContext,
    ) -> Result<SolidHandle, OpError> {
        let [dx, dy, dz] = self.size;
        let height = dz - ctx.local_surface_z();
        if height <= 0.0 {
            return Err(OpError::InvalidParameter {
                reason: format!("universal mount frame is {dz} or more below the working surface"),
            });
        }
        let block = custom_box(kernel, &BoxSpec::new(dx, dy, height).hanging().fillet(4.0))?;
        let mut holes = Vec::new();
        for y in self.hole_ys() {
            holes.push(mount_hole(
                kernel,
                &HoleSpec::clearance(&BOLT_8_32, height)
                    .at(0.0, y, 0.0)
                    .bolt_head(&BOLT_8_32),
            )?);
        }
        cut_all(kernel, block, &holes)
    }

    fn drill(
        &self,
        kernel: &mut dyn GeometryKernel,
        ctx: &BuildContext,
    ) -> Result<Option<SolidHandle>, OpError> {
        let [dx, dy, dz] = self.size;
        let surface = ctx.local_surface_z();
        let mut parts = vec![custom_box(
            kernel,
            &BoxSpec::new(dx + 1.0, dy + 1.0, dz)
                .at(0.0, 0.0, surface)
                .hanging()
                .fillet(4.0),
        )?];
        for y in self.hole_ys() {
            parts.push(mount_hole(
                kernel,
                &HoleSpec::tapped(&BOLT_8_32, ctx.drill_depth).at(0.0, y, surface - dz),
            )?);
        }
        fuse(kernel, &parts).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geometry_kernel::MockKernel;
    use optic_types::Placement;

    #[test]
    fn test_surface_adapter_pockets_plate_when_below_surface() {
        let mut k = MockKernel::new();
        let adapter = SurfaceAdapter::with_hole_spacing(25.0);
        let ctx = BuildContext::default().at(Placement::from_translation(0.0, 0.0, -14.0));
        let drill = adapter.drill(&mut k, &ctx).unwrap().unwrap();
        let bb = k.bounding_box(&drill).unwrap();
        // pocket top sits on the working surface, 1.3 above the adapter frame
        assert!((bb.max[2] - 1.3).abs() < 1e-9);
        assert!((bb.min[2] + 8.0 + ctx.drill_depth).abs() < 1e-9);
    }

    #[test]
    fn test_surface_adapter_above_surface_only_taps() {
        let mut k = MockKernel::new();
        let adapter = SurfaceAdapter::default();
        let ctx = BuildContext::default().at(Placement::from_translation(0.0, 0.0, -4.0));
        let drill = adapter.drill(&mut k, &ctx).unwrap().unwrap();
        let bb = k.bounding_box(&drill).unwrap();
        assert!((bb.max[2] + 8.0).abs() < 1e-9);
        assert!((bb.max[0] - BOLT_8_32.tap_dia / 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_skate_reaches_working_surface() {
        let mut k = MockKernel::new();
        let skate = SkateMount::default();
        let ctx = BuildContext::default().at(Placement::from_translation(0.0, 0.0, -4.0));
        let body = skate.body(&mut k, &ctx).unwrap();
        let bb = k.bounding_box(&body).unwrap();
        assert!((bb.min[2] - ctx.local_surface_z()).abs() < 1e-9);
    }

    #[test]
    fn test_skate_above_beam_plane_is_rejected() {
        let mut k = MockKernel::new();
        let ctx = BuildContext::default().at(Placement::from_translation(0.0, 0.0, -20.0));
        assert!(SkateMount::default().body(&mut k, &ctx).is_err());
    }

    #[test]
    fn test_slide_drill_follows_offset() {
        let mut k = MockKernel::new();
        let ctx = BuildContext::default();
        let a = SlideMount::default().drill(&mut k, &ctx).unwrap().unwrap();
        let shifted = SlideMount {
            drill_offset: 3.0,
            ..SlideMount::default()
        };
        let b = shifted.drill(&mut k, &ctx).unwrap().unwrap();
        let (ba, bb) = (k.bounding_box(&a).unwrap(), k.bounding_box(&b).unwrap());
        assert!((bb.min[1] - ba.min[1] - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_universal_mount_pocket_matches_size() {
        let mut k = MockKernel::new();
        let mount = UniversalMount::default();
        let ctx = BuildContext::default().at(Placement::from_translation(0.0, 0.0, -12.7));
        let body = mount.body(&mut k, &ctx).unwrap();
        let bb = k.bounding_box(&body).unwrap();
        assert!((bb.min[2] + 4.0).abs() < 1e-9);
        assert!((bb.max[2]).abs() < 1e-9);
    }

    #[test]
    fn test_kinematic_adapter_drill_reaches_pocket_floor() {
        let mut k = MockKernel::new();
        let ctx = BuildContext::default();
        let drill = KinematicMountAdapter::default().drill(&mut k, &ctx).unwrap().unwrap();
        let bb = k.bounding_box(&drill).unwrap();
        assert!((bb.min[2] - (ctx.surface_z() - KM_POCKET_DZ - ctx.drill_depth)).abs() < 1e-9);
    }

    #[test]
    fn test_baseplate_mount_counterbore_at_surface() {
        let mut k = MockKernel::new();
        let ctx = BuildContext::default();
        let drill = BaseplateMount::default().drill(&mut k, &ctx).unwrap().unwrap();
        let bb = k.bounding_box(&drill).unwrap();
        assert!((bb.max[2] - ctx.surface_z()).abs() < 1e-9);
        assert!((bb.max[0] - BOLT_14_20.counterbore_dia() / 2.0).abs() < 1e-9);
    }
}
