//! Public layout API.
//!
//! A [`Layout`] owns one scene graph, the beam paths placed on it and the
//! recipe of calls that built it. Placement calls only record intent;
//! [`Layout::redraw`] runs the scene-graph recompute, beam resolution and
//! per-baseplate drill aggregation, in that order.

pub mod aggregate;
pub mod bom;
pub mod config;
pub mod layout;
pub mod recipe;
pub mod redraw;
pub mod types;

pub use aggregate::{aggregate, collect_cuts, cut_stock, Cut};
pub use config::LayoutConfig;
pub use layout::Layout;
pub use recipe::{LayoutStep, RecordedStep};
pub use types::*;

pub use beam_path::{BeamResolution, BeamWarning, ResolverConfig};
pub use scene_graph::{BaseplateSpec, ComponentId};
