//! Catalog of optical elements and the mechanical adapters that hold them.
//!
//! Every part is described by a [`PartModel`] value. A model knows its
//! optical role, its part numbers, the adapters it carries as children,
//! and how to build its body and drill footprint through a
//! [`geometry_kernel::GeometryKernel`].

pub mod adapters;
pub mod context;
pub mod elements;
pub mod model;

pub use adapters::*;
pub use context::{BuildContext, ChildPart, Hardware};
pub use elements::*;
pub use model::PartModel;
