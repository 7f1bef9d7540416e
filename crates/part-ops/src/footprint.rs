//! Generic drill footprint: a bounding prism around a body.
//!
//! Used by hardware whose hole pattern is not modeled precisely. The
//! prism is computed in the body's own frame; its z extent may be
//! stretched so that the pocket reaches the baseplate working surface.

use geometry_kernel::{BoundingBox, GeometryKernel, SolidHandle};
use optic_types::Placement;
use serde::{Deserialize, Serialize};

use crate::shapes::custom_box;
use crate::types::{BoxSpec, OpError};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FootprintSpec {
    /// Clearance added around the body on every enabled axis.
    pub tolerance: f64,
    /// Fillet radius for the vertical edges of the prism.
    pub fillet: f64,
    /// Which axes receive `tolerance`.
    pub tolerance_axes: [bool; 3],
    /// Added to the minimum face along each axis.
    pub min_offset: [f64; 3],
    /// Added to the maximum face along each axis.
    pub max_offset: [f64; 3],
    /// Lift applied to the working-surface clamp height.
    pub plate_offset: f64,
    /// Stretch the prism in z so it reaches the working surface.
    pub clamp_to_surface: bool,
}

impl FootprintSpec {
    pub fn new(tolerance: f64, fillet: f64) -> Self {
        Self {
            tolerance,
            fillet,
            tolerance_axes: [true, true, false],
            min_offset: [0.0; 3],
            max_offset: [0.0; 3],
            plate_offset: 0.0,
            clamp_to_surface: true,
        }
    }

    pub fn min_offset(mut self, offset: [f64; 3]) -> Self {
        self.min_offset = offset;
        self
    }

    pub fn max_offset(mut self, offset: [f64; 3]) -> Self {
        self.max_offset = offset;
        self
    }

    pub fn with_z_tolerance(mut self) -> Self {
        self.tolerance_axes[2] = true;
        self
    }

    pub fn plate_offset(mut self, offset: f64) -> Self {
        self.plate_offset = offset;
        self
    }

    pub fn unclamped(mut self) -> Self {
        self.clamp_to_surface = false;
        self
    }

    /// Prism bounds in the body frame.
    ///
    /// `body` is the body's bounding box in its own frame; `frame` places
    /// that frame relative to the beam-height frame in which `surface_z`
    /// (the working surface) is measured.
    pub fn prism_bounds(&self, body: &BoundingBox, frame: &Placement, surface_z: f64) -> BoundingBox {
        let mut min = [0.0; 3];
        let mut max = [0.0; 3];
        for i in 0..2 {
            let tol = if self.tolerance_axes[i] { self.tolerance } else { 0.0 };
            min[i] = body.min[i] - tol + self.min_offset[i];
            max[i] = body.max[i] + tol + self.max_offset[i];
        }
        let ztol = if self.tolerance_axes[2] { self.tolerance } else { 0.0 };
        let global = body.transformed(frame);
        let lo = global.min[2] - ztol + self.min_offset[2];
        let hi = global.max[2] + ztol + self.max_offset[2];
        let (lo, hi) = if self.clamp_to_surface {
            let surface = surface_z + self.plate_offset;
            (lo.min(surface), hi.max(surface))
        } else {
            (lo, hi)
        };
        min[2] = lo - global.min[2] + body.min[2];
        max[2] = hi - global.max[2] + body.max[2];
        BoundingBox::new(min, max)
    }
}

/// Build the generic footprint prism for a body.
pub fn bounding_prism(
    kernel: &mut dyn GeometryKernel,
    body: &BoundingBox,
    frame: &Placement,
    surface_z: f64,
    spec: &FootprintSpec,
) -> Result<SolidHandle, OpError> {
    let bounds = spec.prism_bounds(body, frame, surface_z);
    let [dx, dy, dz] = bounds.size();
    if dx <= 0.0 || dy <= 0.0 || dz <= 0.0 {
        return Err(OpError::InvalidParameter {
            reason: format!("footprint offsets collapse the prism to {:?}", bounds.size()),
        });
    }
    let box_spec = BoxSpec::new(dx, dy, dz)
        .at(bounds.min[0], bounds.min[1], bounds.min[2])
        .anchored([1.0, 1.0, 1.0])
        .fillet(spec.fillet)
        .fillet_along([0.0, 0.0, 1.0]);
    custom_box(kernel, &box_spec)
}
