//! Batch recompute of world placements and geometry.
//!
//! Nothing is rebuilt as a side effect of an edit: callers run
//! [`SceneGraph::recompute`] (or [`SceneGraph::recompute_all`]) once a
//! batch of edits is done. Geometry failures are collected, never
//! propagated; the failing component keeps its previous shape and is
//! flagged stale.

use geometry_kernel::{GeometryKernel, SolidHandle};
use part_ops::OpError;
use tracing::{debug, info, instrument, warn};

use crate::graph::SceneGraph;
use crate::types::*;

impl SceneGraph {
    /// Recompute the subtree under `root` in pre-order.
    ///
    /// Each child's world placement becomes `parent.world ∘ relative`; a
    /// root keeps the world placement it was given.
    #[instrument(skip(self, kernel))]
    pub fn recompute(
        &mut self,
        kernel: &mut dyn GeometryKernel,
        root: ComponentId,
    ) -> Vec<GraphError> {
        let mut errors = Vec::new();
        for id in self.walk(root) {
            if let Err(e) = self.recompute_one(kernel, id) {
                errors.push(e);
            }
        }
        errors
    }

    /// Recompute every root, in creation order.
    #[instrument(skip(self, kernel))]
    pub fn recompute_all(&mut self, kernel: &mut dyn GeometryKernel) -> Vec<GraphError> {
        let roots = self.roots().to_vec();
        let mut errors = Vec::new();
        for root in roots {
            errors.extend(self.recompute(kernel, root));
        }
        info!(components = self.len(), errors = errors.len(), "scene recomputed");
        errors
    }

    fn recompute_one(
        &mut self,
        kernel: &mut dyn GeometryKernel,
        id: ComponentId,
    ) -> Result<(), GraphError> {
        let c = self.component(id)?;
        if let Some(parent) = c.parent {
            let world = self.component(parent)?.world.compose(&c.relative);
            self.component_mut(id)?.world = world;
        }

        let ctx = self.context_for(id)?;
        let c = self.component(id)?;
        let world = c.world;
        let built: Result<(SolidHandle, Option<SolidHandle>), OpError> = match &c.kind {
            ComponentKind::Baseplate(spec) => spec
                .build_stock(kernel)
                .and_then(|stock| Ok(kernel.transform(&stock, &world)?))
                .map(|shape| (shape, None)),
            ComponentKind::Part(model) => model.build_body(kernel, &ctx).and_then(|body| {
                let shape = kernel.transform(&body, &world)?;
                let drill = model.build_drill(kernel, &ctx)?;
                Ok((shape, drill))
            }),
        };

        let c = self.component_mut(id)?;
        c.dirty = false;
        match built {
            Ok((shape, drill)) => {
                c.shape = Some(shape);
                c.drill = drill;
                c.stale = false;
                debug!(name = %c.name, "component rebuilt");
                Ok(())
            }
            Err(source) => {
                c.stale = true;
                warn!(name = %c.name, error = %source, "component rebuild failed");
                Err(GraphError::Geometry {
                    component: c.name.clone(),
                    source,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geometry_kernel::MockKernel;
    use mount_catalog::{PbsOnSkateMount, RotationStage};
    use optic_types::Placement;

    #[test]
    fn test_child_world_follows_parent() {
        let mut g = SceneGraph::default();
        let mut k = MockKernel::new();
        let stage = g.add_part("wp", RotationStage::default().into(), None).unwrap();
        g.place_root(stage, Placement::planar(10.0, 20.0, 90.0)).unwrap();
        assert!(g.recompute(&mut k, stage).is_empty());
        let adapter = g.component(stage).unwrap().children[0];
        let expected = Placement::planar(10.0, 20.0, 90.0).compose(&Placement::from_translation(0.0, 0.0, -14.0));
        assert!(g.component(adapter).unwrap().world.approx_eq(&expected, 1e-12));
        assert!(!g.component(adapter).unwrap().dirty);
    }

    #[test]
    fn test_failed_build_keeps_previous_shape_and_flags_stale() {
        let mut g = SceneGraph::default();
        let pbs = g.add_part("pbs", PbsOnSkateMount::default().into(), None).unwrap();
        let mut ok = MockKernel::new();
        assert!(g.recompute(&mut ok, pbs).is_empty());
        let before = g.component(pbs).unwrap().shape.clone();

        let mut broken = MockKernel::new().failing("make_box");
        let errors = g.recompute(&mut broken, pbs);
        assert!(!errors.is_empty());
        assert!(matches!(&errors[0], GraphError::Geometry { component, .. } if component == "pbs"));
        let c = g.component(pbs).unwrap();
        assert!(c.stale);
        assert_eq!(c.shape, before);
    }
}
