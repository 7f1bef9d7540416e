use std::collections::{BTreeMap, HashMap};

use beam_path::{BeamPath, PlacementRequest};
use geometry_kernel::SolidHandle;
use mount_catalog::PartModel;
use optic_types::{BranchKey, Constraint, Placement};
use scene_graph::{BaseplateSpec, ComponentId, RelativeAnchor, SceneGraph};
use tracing::{debug, info};

use crate::bom;
use crate::config::LayoutConfig;
use crate::recipe::{LayoutStep, RecordedStep};
use crate::types::*;

/// One layout session: the scene, its beam paths and the recipe that built them.
#[derive(Debug)]
pub struct Layout {
    pub(crate) config: LayoutConfig,
    pub(crate) graph: SceneGraph,
    pub(crate) beams: Vec<BeamPath>,
    /// Plate new components are anchored to when no plate is named.
    pub(crate) active_plate: Option<ComponentId>,
    pub(crate) steps: Vec<RecordedStep>,
    /// Aggregated solid of each baseplate, in its plate frame.
    pub(crate) plate_solids: HashMap<ComponentId, SolidHandle>,
    pub(crate) show_components: bool,
}

impl Layout {
    pub fn new(config: LayoutConfig) -> Self {
        Self {
            graph: SceneGraph::new(config.build_context()),
            config,
            beams: Vec::new(),
            active_plate: None,
            steps: Vec::new(),
            plate_solids: HashMap::new(),
            show_components: true,
        }
    }

    /// Rebuild a layout by replaying recorded steps. Step ids are kept.
    pub fn replay(config: LayoutConfig, steps: &[RecordedStep]) -> Result<Self, LayoutError> {
        let mut layout = Self::new(config);
        for recorded in steps {
            layout.apply_recorded(recorded)?;
        }
        info!(steps = steps.len(), "layout replayed");
        Ok(layout)
    }

    /// Apply one recorded step, keeping its id.
    pub fn apply_recorded(&mut self, recorded: &RecordedStep) -> Result<(), LayoutError> {
        self.execute(&recorded.step)?;
        self.steps.push(recorded.clone());
        Ok(())
    }

    // ── Queries ─────────────────────────────────────────────────────────

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    pub fn steps(&self) -> &[RecordedStep] {
        &self.steps
    }

    pub fn beam(&self, id: BeamId) -> Option<&BeamPath> {
        self.beams.get(id.0)
    }

    pub fn beam_count(&self) -> usize {
        self.beams.len()
    }

    pub fn active_baseplate(&self) -> Option<ComponentId> {
        self.active_plate
    }

    pub fn find(&self, name: &str) -> Option<ComponentId> {
        self.graph.find_by_name(name)
    }

    /// Machined solid of `plate` from the last redraw, in the plate frame.
    pub fn baseplate_solid(&self, plate: ComponentId) -> Result<&SolidHandle, LayoutError> {
        let name = self.graph.component(plate)?.name.clone();
        self.plate_solids
            .get(&plate)
            .ok_or(LayoutError::NotAggregated { name })
    }

    pub fn bill_of_materials(&self) -> BTreeMap<String, usize> {
        bom::bill_of_materials(&self.graph)
    }

    /// Show or hide every component that is not a baseplate.
    pub fn set_visibility(&mut self, show_components: bool) {
        self.show_components = show_components;
    }

    /// Components a viewer should draw.
    pub fn visible_components(&self) -> Vec<ComponentId> {
        self.graph
            .walk_all()
            .into_iter()
            .filter(|&id| {
                self.show_components || self.graph.get(id).is_some_and(|c| c.is_baseplate())
            })
            .collect()
    }

    // ── Placement calls ─────────────────────────────────────────────────

    /// Create a baseplate and make it the active plate.
    pub fn create_baseplate(
        &mut self,
        name: impl Into<String>,
        dx: f64,
        dy: f64,
        dz: f64,
        options: BaseplateOptions,
    ) -> Result<ComponentId, LayoutError> {
        let step = LayoutStep::CreateBaseplate {
            name: name.into(),
            size: [dx, dy, dz],
            options,
        };
        self.record(step)
    }

    /// Place a part at an absolute position and yaw.
    pub fn place_element(
        &mut self,
        name: impl Into<String>,
        model: impl Into<PartModel>,
        x: f64,
        y: f64,
        angle: f64,
        options: PlacementOptions,
    ) -> Result<ComponentId, LayoutError> {
        let step = LayoutStep::PlaceElement {
            name: name.into(),
            model: model.into(),
            x,
            y,
            angle,
            options,
        };
        self.record(step)
    }

    pub fn add_beam_path(&mut self, x: f64, y: f64, angle: f64) -> BeamId {
        let step = LayoutStep::AddBeamPath { x, y, angle };
        let id = self.run_add_beam_path(x, y, angle);
        self.steps.push(RecordedStep::new(step));
        id
    }

    /// Place a part on a beam branch; its position is found on `redraw()`.
    #[allow(clippy::too_many_arguments)]
    pub fn place_element_along_beam(
        &mut self,
        name: impl Into<String>,
        model: impl Into<PartModel>,
        beam: BeamId,
        branch: BranchKey,
        angle: f64,
        constraint: Constraint,
        options: PlacementOptions,
    ) -> Result<ComponentId, LayoutError> {
        let step = LayoutStep::PlaceAlongBeam {
            name: name.into(),
            model: model.into(),
            beam,
            branch,
            angle,
            constraint,
            options,
        };
        self.record(step)
    }

    /// Place a part at a fixed in-plane offset from `reference`, followed
    /// on every `redraw()`.
    #[allow(clippy::too_many_arguments)]
    pub fn place_element_relative(
        &mut self,
        name: impl Into<String>,
        model: impl Into<PartModel>,
        reference: ComponentId,
        angle: f64,
        x_offset: f64,
        y_offset: f64,
        options: PlacementOptions,
    ) -> Result<ComponentId, LayoutError> {
        let step = LayoutStep::PlaceRelative {
            name: name.into(),
            model: model.into(),
            reference: self.graph.component(reference)?.name.clone(),
            angle,
            x_offset,
            y_offset,
            options,
        };
        self.record(step)
    }

    /// Attach a new part under `parent` at a fixed relative placement.
    pub fn attach_child(
        &mut self,
        parent: ComponentId,
        name: impl Into<String>,
        model: impl Into<PartModel>,
        relative: Placement,
        drill: Option<bool>,
    ) -> Result<ComponentId, LayoutError> {
        let step = LayoutStep::AttachChild {
            parent: self.graph.component(parent)?.name.clone(),
            name: name.into(),
            model: model.into(),
            relative,
            drill,
        };
        self.record(step)
    }

    /// Delete a component with everything it owns. Beam requests for the
    /// deleted components are dropped.
    pub fn delete(&mut self, id: ComponentId) -> Result<Vec<ComponentId>, LayoutError> {
        let name = self.graph.component(id)?.name.clone();
        let deleted = self.run_delete(id)?;
        self.steps.push(RecordedStep::new(LayoutStep::Delete { name }));
        Ok(deleted)
    }

    // ── Step execution ──────────────────────────────────────────────────

    fn record(&mut self, step: LayoutStep) -> Result<ComponentId, LayoutError> {
        let created = self.execute(&step)?;
        let name = step.creates().unwrap_or_default().to_string();
        self.steps.push(RecordedStep::new(step));
        created.ok_or(LayoutError::UnknownComponent { name })
    }

    /// Apply one step; returns the component it created, if any.
    fn execute(&mut self, step: &LayoutStep) -> Result<Option<ComponentId>, LayoutError> {
        match step {
            LayoutStep::CreateBaseplate {
                name,
                size,
                options,
            } => self.run_create_baseplate(name, *size, options).map(Some),
            LayoutStep::PlaceElement {
                name,
                model,
                x,
                y,
                angle,
                options,
            } => {
                let id = self.spawn(name, model, options)?;
                self.graph.place_root(id, Placement::planar(*x, *y, *angle))?;
                Ok(Some(id))
            }
            LayoutStep::AddBeamPath { x, y, angle } => {
                self.run_add_beam_path(*x, *y, *angle);
                Ok(None)
            }
            LayoutStep::PlaceAlongBeam {
                name,
                model,
                beam,
                branch,
                angle,
                constraint,
                options,
            } => {
                if beam.0 >= self.beams.len() {
                    return Err(LayoutError::BeamNotFound { id: *beam });
                }
                let id = self.spawn(name, model, options)?;
                self.beams[beam.0].add_request(
                    *branch,
                    PlacementRequest {
                        component: id,
                        angle: *angle,
                        constraint: *constraint,
                        fold_count: options.pre_folds,
                    },
                );
                Ok(Some(id))
            }
            LayoutStep::PlaceRelative {
                name,
                model,
                reference,
                angle,
                x_offset,
                y_offset,
                options,
            } => {
                let reference = self.lookup(reference)?;
                let reference_world = self.graph.component(reference)?.world;
                let id = self.spawn(name, model, options)?;
                let anchor = RelativeAnchor {
                    component: id,
                    reference,
                    x_offset: *x_offset,
                    y_offset: *y_offset,
                    angle: *angle,
                };
                self.graph.place_root(id, anchor.resolve(&reference_world))?;
                self.graph.add_anchor(anchor)?;
                Ok(Some(id))
            }
            LayoutStep::AttachChild {
                parent,
                name,
                model,
                relative,
                drill,
            } => {
                let parent = self.lookup(parent)?;
                self.check_unique(name)?;
                let id = self
                    .graph
                    .add_child(parent, name.clone(), model.clone(), *relative, *drill)?;
                Ok(Some(id))
            }
            LayoutStep::Delete { name } => {
                let id = self.lookup(name)?;
                self.run_delete(id)?;
                Ok(None)
            }
        }
    }

    fn run_create_baseplate(
        &mut self,
        name: &str,
        size: [f64; 3],
        options: &BaseplateOptions,
    ) -> Result<ComponentId, LayoutError> {
        self.check_unique(name)?;
        let [dx, dy, dz] = size;
        let mut spec = BaseplateSpec::new(dx, dy, dz)
            .with_optics_dz(options.optics_dz.unwrap_or(self.config.optics_dz))
            .with_stock_offset(options.stock_offset[0], options.stock_offset[1]);
        if let Some(label) = &options.label {
            spec = spec.with_label(label.clone());
        }
        if !options.drill {
            spec = spec.without_drill();
        }
        let id = self
            .graph
            .add_baseplate(name, spec, Placement::planar(options.x, options.y, 0.0));
        self.active_plate = Some(id);
        Ok(id)
    }

    fn run_add_beam_path(&mut self, x: f64, y: f64, angle: f64) -> BeamId {
        let path = BeamPath::new(x, y, angle).with_root_key(self.config.root_branch_key);
        self.beams.push(path);
        debug!(x, y, angle, "beam path added");
        BeamId(self.beams.len() - 1)
    }

    /// Create a root part on the requested (or active) baseplate.
    fn spawn(
        &mut self,
        name: &str,
        model: &PartModel,
        options: &PlacementOptions,
    ) -> Result<ComponentId, LayoutError> {
        self.check_unique(name)?;
        let plate = match &options.baseplate {
            Some(plate) => Some(self.lookup(plate)?),
            None => self.active_plate,
        };
        let id = self.graph.add_part(name, model.clone(), plate)?;
        if let Some(drill) = options.drill {
            self.graph.set_drill(id, drill)?;
        }
        Ok(id)
    }

    fn run_delete(&mut self, id: ComponentId) -> Result<Vec<ComponentId>, LayoutError> {
        let deleted = self.graph.delete(id)?;
        for beam in &mut self.beams {
            beam.remove_components(&deleted);
        }
        self.plate_solids.retain(|id, _| !deleted.contains(id));
        if self.active_plate.is_some_and(|p| deleted.contains(&p)) {
            self.active_plate = self.graph.baseplates().last().copied();
        }
        Ok(deleted)
    }

    fn lookup(&self, name: &str) -> Result<ComponentId, LayoutError> {
        self.graph
            .find_by_name(name)
            .ok_or_else(|| LayoutError::UnknownComponent {
                name: name.to_string(),
            })
    }

    fn check_unique(&self, name: &str) -> Result<(), LayoutError> {
        match self.graph.find_by_name(name) {
            Some(_) => Err(LayoutError::DuplicateName {
                name: name.to_string(),
            }),
            None => Ok(()),
        }
    }
}

impl Default for Layout {
    fn default() -> Self {
        Self::new(LayoutConfig::default())
    }
}
