//! The redraw pipeline.

use geometry_kernel::GeometryKernel;
use scene_graph::ComponentId;
use tracing::{info, instrument, warn};

use crate::aggregate::aggregate;
use crate::layout::Layout;
use crate::types::*;

impl Layout {
    /// Recompute the scene, resolve every beam path and rebuild what it
    /// moved, follow relative anchors, then aggregate each baseplate.
    ///
    /// Errors are collected rather than returned early: every stage runs
    /// over everything it can, and a failing plate keeps its previous
    /// solid while the others are rebuilt.
    #[instrument(skip_all)]
    pub fn redraw(&mut self, kernel: &mut dyn GeometryKernel) -> Result<RedrawReport, RedrawError> {
        let mut errors: Vec<StageError> = Vec::new();
        let mut report = RedrawReport::default();

        errors.extend(self.graph.recompute_all(kernel).into_iter().map(StageError::from));

        let mut moved: Vec<ComponentId> = Vec::new();
        for beam in &mut self.beams {
            let resolution = beam.resolve(&mut self.graph, &self.config.resolver);
            moved.extend(resolution.placements.iter().map(|p| p.component));
            report.warnings.extend(resolution.warnings);
            errors.extend(resolution.errors.into_iter().map(StageError::from));
        }

        for &id in &moved {
            errors.extend(self.graph.recompute(kernel, id).into_iter().map(StageError::from));
        }

        // Anchors read their reference after it has been rebuilt; each is
        // rebuilt in turn so a later anchor can follow an earlier one.
        for anchor in self.graph.anchors().to_vec() {
            let placed = self
                .graph
                .component(anchor.reference)
                .map(|r| anchor.resolve(&r.world))
                .and_then(|world| self.graph.place_root(anchor.component, world));
            match placed {
                Ok(()) => {
                    moved.push(anchor.component);
                    errors.extend(
                        self.graph
                            .recompute(kernel, anchor.component)
                            .into_iter()
                            .map(StageError::from),
                    );
                }
                Err(e) => {
                    self.graph.flag_stale(anchor.component);
                    errors.push(e.into());
                }
            }
        }
        report.placed = moved.len();

        for plate in self.graph.baseplates() {
            match aggregate(kernel, &self.graph, plate) {
                Ok(solid) => {
                    self.plate_solids.insert(plate, solid);
                    report.plates.push(plate);
                }
                Err(e) => {
                    self.graph.flag_solid_stale(plate);
                    warn!(error = %e, "baseplate aggregation failed");
                    errors.push(e.into());
                }
            }
        }

        info!(
            placed = report.placed,
            plates = report.plates.len(),
            warnings = report.warnings.len(),
            errors = errors.len(),
            "redraw finished"
        );
        if errors.is_empty() {
            Ok(report)
        } else {
            Err(RedrawError { errors, report })
        }
    }
}
