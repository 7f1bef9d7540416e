use beam_path::{BeamError, BeamWarning};
use part_ops::OpError;
use scene_graph::{ComponentId, GraphError};
use serde::{Deserialize, Serialize};

/// Index of a beam path within its layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BeamId(pub usize);

/// Optional settings for `create_baseplate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaseplateOptions {
    /// Position of the plate frame in the layout.
    pub x: f64,
    pub y: f64,
    /// Corner of the stock in the plate frame.
    pub stock_offset: [f64; 2],
    /// Text engraved into the front face.
    pub label: Option<String>,
    pub drill: bool,
    /// Overrides the layout's beam height for this plate.
    pub optics_dz: Option<f64>,
}

impl Default for BaseplateOptions {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            stock_offset: [0.0, 0.0],
            label: None,
            drill: true,
            optics_dz: None,
        }
    }
}

impl BaseplateOptions {
    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn without_drill(mut self) -> Self {
        self.drill = false;
        self
    }
}

/// Optional settings shared by the placement calls.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementOptions {
    /// Baseplate to anchor to, by name; the active plate when unset.
    pub baseplate: Option<String>,
    /// Overrides the part's default drill flag.
    pub drill: Option<bool>,
    /// Internal reflections before the element's exit rule applies.
    pub pre_folds: u32,
}

impl PlacementOptions {
    pub fn on(mut self, baseplate: impl Into<String>) -> Self {
        self.baseplate = Some(baseplate.into());
        self
    }

    pub fn drill(mut self, drill: bool) -> Self {
        self.drill = Some(drill);
        self
    }

    pub fn pre_folds(mut self, folds: u32) -> Self {
        self.pre_folds = folds;
        self
    }
}

/// Synchronous rejection of a layout call. Nothing is mutated.
#[derive(Debug, Clone, thiserror::Error)]
pub enum LayoutError {
    #[error("no component named {name}")]
    UnknownComponent { name: String },

    #[error("a component named {name} already exists")]
    DuplicateName { name: String },

    #[error("beam path {} does not exist", .id.0)]
    BeamNotFound { id: BeamId },

    #[error("no baseplate has been computed for {name}")]
    NotAggregated { name: String },

    #[error(transparent)]
    Graph(#[from] GraphError),
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum AggregateError {
    #[error("drill aggregation failed at {component}: {source}")]
    Geometry { component: String, source: OpError },

    #[error("{name} is not a baseplate")]
    NotABaseplate { name: String },

    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// One failure collected during `redraw()`.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StageError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Beam(#[from] BeamError),

    #[error(transparent)]
    Aggregate(#[from] AggregateError),
}

/// What a redraw produced.
#[derive(Debug, Clone, Default)]
pub struct RedrawReport {
    /// Components placed by beam paths or relative anchors.
    pub placed: usize,
    /// Baseplates whose aggregated solid was rebuilt.
    pub plates: Vec<ComponentId>,
    pub warnings: Vec<BeamWarning>,
}

/// Errors collected across one redraw. Everything that could be built
/// was built; `report` describes it.
#[derive(Debug, Clone, thiserror::Error)]
#[error("redraw finished with {} error(s)", .errors.len())]
pub struct RedrawError {
    pub errors: Vec<StageError>,
    pub report: RedrawReport,
}
