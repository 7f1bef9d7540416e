use geometry_kernel::{GeometryKernel, SolidHandle};
use optic_types::OpticalRole;
use part_ops::OpError;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::adapters::*;
use crate::context::{BuildContext, ChildPart, Hardware};
use crate::elements::*;

/// Every part the layout knows how to build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PartModel {
    // Adapters
    BaseplateMount(BaseplateMount),
    SurfaceAdapter(SurfaceAdapter),
    SkateMount(SkateMount),
    SlideMount(SlideMount),
    KinematicMountAdapter(KinematicMountAdapter),
    UniversalMount(UniversalMount),

    // Elements
    FiberportHolder(FiberportHolder),
    PbsOnSkateMount(PbsOnSkateMount),
    RotationStage(RotationStage),
    MirrorMount(MirrorMount),
    SplitterMount(SplitterMount),
    LensHolder(LensHolder),
    Pinhole(Pinhole),
    IsometAom(IsometAom),
    Periscope(Periscope),
    Isolator(Isolator),
    Custom(CustomPart),
}

macro_rules! part_models {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        impl PartModel {
            pub fn hardware(&self) -> &dyn Hardware {
                match self {
                    $(PartModel::$variant(part) => part,)*
                }
            }
        }

        $(
            impl From<$ty> for PartModel {
                fn from(part: $ty) -> Self {
                    PartModel::$variant(part)
                }
            }
        )*
    };
}

part_models! {
    BaseplateMount(BaseplateMount),
    SurfaceAdapter(SurfaceAdapter),
    SkateMount(SkateMount),
    SlideMount(SlideMount),
    KinematicMountAdapter(KinematicMountAdapter),
    UniversalMount(UniversalMount),
    FiberportHolder(FiberportHolder),
    PbsOnSkateMount(PbsOnSkateMount),
    RotationStage(RotationStage),
    MirrorMount(MirrorMount),
    SplitterMount(SplitterMount),
    LensHolder(LensHolder),
    Pinhole(Pinhole),
    IsometAom(IsometAom),
    Periscope(Periscope),
    Isolator(Isolator),
    Custom(CustomPart),
}

impl PartModel {
    pub fn kind_name(&self) -> &'static str {
        self.hardware().kind_name()
    }

    pub fn optical_role(&self) -> OpticalRole {
        self.hardware().optical_role()
    }

    pub fn part_numbers(&self) -> Vec<String> {
        self.hardware().part_numbers()
    }

    pub fn default_drill(&self) -> bool {
        self.hardware().default_drill()
    }

    pub fn children(&self, ctx: &BuildContext) -> Vec<ChildPart> {
        self.hardware().children(ctx)
    }

    /// Body solid in the part's own frame.
    pub fn build_body(
        &self,
        kernel: &mut dyn GeometryKernel,
        ctx: &BuildContext,
    ) -> Result<SolidHandle, OpError> {
        debug!(kind = self.kind_name(), "building body");
        self.hardware().body(kernel, ctx)
    }

    /// Drill footprint in the part's own frame, if the part has one.
    pub fn build_drill(
        &self,
        kernel: &mut dyn GeometryKernel,
        ctx: &BuildContext,
    ) -> Result<Option<SolidHandle>, OpError> {
        debug!(kind = self.kind_name(), "building drill footprint");
        self.hardware().drill(kernel, ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_element_builds_with_default_context() {
        let mut k = geometry_kernel::MockKernel::new();
        let ctx = BuildContext::default();
        let models: Vec<PartModel> = vec![
            FiberportHolder::default().into(),
            PbsOnSkateMount::default().into(),
            RotationStage::default().into(),
            MirrorMount::default().into(),
            SplitterMount::default().into(),
            LensHolder::default().into(),
            Pinhole::default().into(),
            IsometAom::default().into(),
            Periscope::default().into(),
            Isolator::default().into(),
        ];
        for model in &models {
            model.build_body(&mut k, &ctx).unwrap();
            model.build_drill(&mut k, &ctx).unwrap();
            for child in model.children(&ctx) {
                let child_ctx = ctx.at(ctx.frame.compose(&child.relative));
                child.model.build_body(&mut k, &child_ctx).unwrap();
                child.model.build_drill(&mut k, &child_ctx).unwrap();
            }
        }
    }
}
