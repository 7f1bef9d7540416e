//! Scene graph of physical components.
//!
//! Components form a forest: roots are placed directly (or by a beam
//! path), children follow their parent through a fixed relative
//! placement. Each component may also be anchored to a baseplate, which
//! decides the working surface it is built against and which stock its
//! drill footprint is cut from.

pub mod graph;
pub mod recompute;
pub mod types;

pub use graph::SceneGraph;
pub use types::*;
