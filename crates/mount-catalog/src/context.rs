use geometry_kernel::{GeometryKernel, SolidHandle};
use optic_types::{OpticalRole, Placement, DEFAULT_OPTICS_DZ, DRILL_DEPTH};
use part_ops::{combine, union_all, BooleanKind, OpError};

use crate::model::PartModel;

/// Where a part is being built.
///
/// `frame` places the part's own frame in the beam-height frame of its
/// baseplate, where the beam plane is `z = 0` and the working surface is
/// `z = -optics_dz`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BuildContext {
    pub optics_dz: f64,
    pub drill_depth: f64,
    pub frame: Placement,
}

impl BuildContext {
    pub fn new(optics_dz: f64, drill_depth: f64) -> Self {
        Self {
            optics_dz,
            drill_depth,
            frame: Placement::identity(),
        }
    }

    pub fn at(mut self, frame: Placement) -> Self {
        self.frame = frame;
        self
    }

    /// Working surface height in the beam-height frame.
    pub fn surface_z(&self) -> f64 {
        -self.optics_dz
    }

    /// Working surface height in the part's own frame.
    pub fn local_surface_z(&self) -> f64 {
        self.surface_z() - self.frame.translation().z
    }
}

impl Default for BuildContext {
    fn default() -> Self {
        Self::new(DEFAULT_OPTICS_DZ, DRILL_DEPTH)
    }
}

/// A sub-part created together with its parent and attached to it.
#[derive(Debug, Clone, PartialEq)]
pub struct ChildPart {
    /// Appended to the parent's name.
    pub suffix: &'static str,
    pub model: PartModel,
    pub relative: Placement,
    /// Overrides the child model's default drill flag.
    pub drill: Option<bool>,
}

impl ChildPart {
    pub fn new(suffix: &'static str, model: impl Into<PartModel>, relative: Placement) -> Self {
        Self {
            suffix,
            model: model.into(),
            relative,
            drill: None,
        }
    }

    pub fn without_drill(mut self) -> Self {
        self.drill = Some(false);
        self
    }
}

/// Behaviour shared by every catalog entry.
///
/// Bodies and drill footprints are built in the part's own frame.
pub trait Hardware {
    fn kind_name(&self) -> &'static str;

    fn optical_role(&self) -> OpticalRole {
        OpticalRole::inert()
    }

    fn part_numbers(&self) -> Vec<String> {
        Vec::new()
    }

    fn default_drill(&self) -> bool {
        true
    }

    fn children(&self, _ctx: &BuildContext) -> Vec<ChildPart> {
        Vec::new()
    }

    fn body(
        &self,
        kernel: &mut dyn GeometryKernel,
        ctx: &BuildContext,
    ) -> Result<SolidHandle, OpError>;

    fn drill(
        &self,
        _kernel: &mut dyn GeometryKernel,
        _ctx: &BuildContext,
    ) -> Result<Option<SolidHandle>, OpError> {
        Ok(None)
    }
}

pub(crate) fn fuse(
    kernel: &mut dyn GeometryKernel,
    parts: &[SolidHandle],
) -> Result<SolidHandle, OpError> {
    union_all(kernel, parts)?.ok_or_else(|| OpError::InvalidParameter {
        reason: "no solids to fuse".into(),
    })
}

pub(crate) fn cut_all(
    kernel: &mut dyn GeometryKernel,
    stock: SolidHandle,
    tools: &[SolidHandle],
) -> Result<SolidHandle, OpError> {
    let mut acc = stock;
    for tool in tools {
        acc = combine(kernel, &acc, tool, BooleanKind::Subtract)?;
    }
    Ok(acc)
}

/// Height between a part's top at `top` and the working surface, which must be below it.
pub(crate) fn height_to_surface(
    kind: &str,
    top: f64,
    ctx: &BuildContext,
) -> Result<f64, OpError> {
    let dz = top - ctx.local_surface_z();
    if dz <= 0.0 {
        return Err(OpError::InvalidParameter {
            reason: format!("{kind} top at {top} is not above the working surface"),
        });
    }
    Ok(dz)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_surface_follows_frame_height() {
        let ctx = BuildContext::default().at(Placement::from_translation(3.0, 4.0, -14.0));
        assert!((ctx.surface_z() + 12.7).abs() < 1e-12);
        assert!((ctx.local_surface_z() - 1.3).abs() < 1e-9);
    }
}
