use geometry_kernel::{GeometryKernel, SolidHandle};
use mount_catalog::PartModel;
use optic_types::{OpticalRole, Placement, DEFAULT_OPTICS_DZ};
use part_ops::{custom_box, BoxSpec, OpError};
use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

new_key_type! {
    pub struct ComponentId;
}

// ─── Errors ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, thiserror::Error)]
pub enum GraphError {
    #[error("attaching {child} under {anchor} would create a cycle")]
    Cycle { child: String, anchor: String },

    #[error("deleting {target} would leave {holder} referencing it")]
    DanglingReference { target: String, holder: String },

    #[error("component not found: {id:?}")]
    ComponentNotFound { id: ComponentId },

    #[error("a component named {name} already exists")]
    DuplicateName { name: String },

    #[error("{name} is not a baseplate")]
    NotABaseplate { name: String },

    #[error("{name} is attached to a parent; its world placement is derived")]
    ParentedPlacement { name: String },

    #[error("geometry failed for {component}: {source}")]
    Geometry { component: String, source: OpError },
}

// ─── Baseplate ──────────────────────────────────────────────────────────────

/// Stock and options of a baseplate.
///
/// The plate frame sits at beam height: the working surface is
/// `z = -optics_dz` and the stock hangs `size[2]` below it, with its
/// front-left corner at `stock_offset`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseplateSpec {
    pub size: [f64; 3],
    pub optics_dz: f64,
    pub stock_offset: [f64; 2],
    pub label: Option<String>,
    /// A plate with `drill = false` is emitted as bare stock.
    pub drill: bool,
}

impl BaseplateSpec {
    pub fn new(dx: f64, dy: f64, dz: f64) -> Self {
        Self {
            size: [dx, dy, dz],
            optics_dz: DEFAULT_OPTICS_DZ,
            stock_offset: [0.0, 0.0],
            label: None,
            drill: true,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_stock_offset(mut self, x: f64, y: f64) -> Self {
        self.stock_offset = [x, y];
        self
    }

    pub fn with_optics_dz(mut self, optics_dz: f64) -> Self {
        self.optics_dz = optics_dz;
        self
    }

    pub fn without_drill(mut self) -> Self {
        self.drill = false;
        self
    }

    pub fn surface_z(&self) -> f64 {
        -self.optics_dz
    }

    /// Minimum corner of the stock in the plate frame.
    pub fn stock_origin(&self) -> [f64; 3] {
        [
            self.stock_offset[0],
            self.stock_offset[1],
            self.surface_z() - self.size[2],
        ]
    }

    /// Stock box in the plate frame.
    pub fn build_stock(&self, kernel: &mut dyn GeometryKernel) -> Result<SolidHandle, OpError> {
        let [dx, dy, dz] = self.size;
        let [x, y, z] = self.stock_origin();
        custom_box(kernel, &BoxSpec::new(dx, dy, dz).at(x, y, z).anchored([1.0, 1.0, 1.0]))
    }
}

// ─── Components ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum ComponentKind {
    Baseplate(BaseplateSpec),
    Part(PartModel),
}

/// One physical part in the layout.
#[derive(Debug, Clone)]
pub struct Component {
    pub name: String,
    pub kind: ComponentKind,
    /// Offset from the parent; identity for roots.
    pub relative: Placement,
    /// Derived from the parent for children; set by placement for roots.
    pub world: Placement,
    pub parent: Option<ComponentId>,
    pub children: Vec<ComponentId>,
    /// Baseplate this component is built against and cut from.
    pub baseplate: Option<ComponentId>,
    pub drill_enabled: bool,
    pub role: OpticalRole,
    /// Body in world coordinates, from the last successful build.
    pub shape: Option<SolidHandle>,
    /// Drill footprint in the component's own frame.
    pub drill: Option<SolidHandle>,
    /// Set by edits, cleared by recompute.
    pub dirty: bool,
    /// Set when the last build or placement of this component failed.
    pub stale: bool,
}

impl Component {
    pub(crate) fn new(name: String, kind: ComponentKind) -> Self {
        let (role, drill_enabled) = match &kind {
            ComponentKind::Baseplate(spec) => (OpticalRole::inert(), spec.drill),
            ComponentKind::Part(model) => (model.optical_role(), model.default_drill()),
        };
        Self {
            name,
            kind,
            relative: Placement::identity(),
            world: Placement::identity(),
            parent: None,
            children: Vec::new(),
            baseplate: None,
            drill_enabled,
            role,
            shape: None,
            drill: None,
            dirty: true,
            stale: false,
        }
    }

    pub fn is_baseplate(&self) -> bool {
        matches!(self.kind, ComponentKind::Baseplate(_))
    }

    pub fn baseplate_spec(&self) -> Option<&BaseplateSpec> {
        match &self.kind {
            ComponentKind::Baseplate(spec) => Some(spec),
            ComponentKind::Part(_) => None,
        }
    }

    pub fn model(&self) -> Option<&PartModel> {
        match &self.kind {
            ComponentKind::Part(model) => Some(model),
            ComponentKind::Baseplate(_) => None,
        }
    }

    pub fn part_numbers(&self) -> Vec<String> {
        self.model().map(PartModel::part_numbers).unwrap_or_default()
    }
}

// ─── Relative anchors ───────────────────────────────────────────────────────

/// Ties a root component to another component's placement by a fixed
/// in-plane offset. `angle` is the component's absolute yaw in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RelativeAnchor {
    pub component: ComponentId,
    pub reference: ComponentId,
    pub x_offset: f64,
    pub y_offset: f64,
    pub angle: f64,
}

impl RelativeAnchor {
    pub fn resolve(&self, reference_world: &Placement) -> Placement {
        let p = reference_world.translation();
        Placement::from_euler_deg(
            [p.x + self.x_offset, p.y + self.y_offset, p.z],
            [0.0, 0.0, self.angle],
        )
    }
}
