//! Beam path resolution.
//!
//! A [`BeamPath`] holds placement requests keyed by branch. Resolving it
//! marches a beam from the path origin, places each requested component
//! where its constraint is met, and follows every split into two child
//! branches. Failures are collected per branch; independent branches
//! still resolve.

pub mod path;
pub mod resolve;
pub mod types;

pub use path::{BeamPath, BeamState};
pub use types::*;
