use geometry_kernel::{GeometryKernel, KernelError, SolidHandle};
use optic_types::Placement;
use tracing::warn;

use crate::types::{BoxSpec, HoleSpec, OpError};

/// Build a positioned, optionally filleted box.
///
/// A kernel that cannot fillet leaves the edges sharp; the fallback is
/// logged, never silent.
pub fn custom_box(kernel: &mut dyn GeometryKernel, spec: &BoxSpec) -> Result<SolidHandle, OpError> {
    let [dx, dy, dz] = spec.size;
    let mut solid = kernel.make_box(dx, dy, dz)?;
    if spec.fillet > 0.0 {
        let axis = spec
            .fillet_axis
            .unwrap_or_else(|| spec.anchor.map(f64::abs));
        match kernel.fillet_edges_along(&solid, axis, spec.fillet) {
            Ok(rounded) => solid = rounded,
            Err(e @ (KernelError::NotSupported { .. } | KernelError::FilletFailed { .. })) => {
                warn!(size = ?spec.size, radius = spec.fillet, error = %e, "fillet skipped");
            }
            Err(e) => return Err(e.into()),
        }
    }
    let [x, y, z] = spec.origin();
    Ok(kernel.transform(&solid, &Placement::from_translation(x, y, z))?)
}

/// Build a bolt or pin hole with an optional head pocket.
pub fn mount_hole(
    kernel: &mut dyn GeometryKernel,
    spec: &HoleSpec,
) -> Result<SolidHandle, OpError> {
    if spec.dia <= 0.0 || spec.depth <= 0.0 {
        return Err(OpError::InvalidParameter {
            reason: format!("hole {} x {} is degenerate", spec.dia, spec.depth),
        });
    }
    let shaft = kernel.make_cylinder(spec.dia / 2.0, spec.depth, spec.position, spec.direction)?;
    if spec.head_dia <= 0.0 || spec.head_dz <= 0.0 {
        return Ok(shaft);
    }
    let head = if spec.countersink {
        kernel.make_cone(
            spec.head_dia / 2.0,
            spec.dia / 2.0,
            spec.head_dz,
            spec.position,
            spec.direction,
        )?
    } else {
        kernel.make_cylinder(spec.head_dia / 2.0, spec.head_dz, spec.position, spec.direction)?
    };
    Ok(kernel.boolean_union(&shaft, &head)?)
}
