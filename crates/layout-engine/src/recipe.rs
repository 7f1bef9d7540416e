//! The recorded sequence of layout calls.
//!
//! Replaying the steps of a layout on an empty one rebuilds the same
//! scene. Components are referred to by name and beam paths by index, so
//! a recipe stays valid across sessions.

use mount_catalog::PartModel;
use optic_types::{BranchKey, Constraint, Placement};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{BaseplateOptions, BeamId, PlacementOptions};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op")]
pub enum LayoutStep {
    CreateBaseplate {
        name: String,
        size: [f64; 3],
        options: BaseplateOptions,
    },
    PlaceElement {
        name: String,
        model: PartModel,
        x: f64,
        y: f64,
        angle: f64,
        options: PlacementOptions,
    },
    AddBeamPath {
        x: f64,
        y: f64,
        angle: f64,
    },
    PlaceAlongBeam {
        name: String,
        model: PartModel,
        beam: BeamId,
        branch: BranchKey,
        angle: f64,
        constraint: Constraint,
        options: PlacementOptions,
    },
    PlaceRelative {
        name: String,
        model: PartModel,
        reference: String,
        angle: f64,
        x_offset: f64,
        y_offset: f64,
        options: PlacementOptions,
    },
    AttachChild {
        parent: String,
        name: String,
        model: PartModel,
        relative: Placement,
        drill: Option<bool>,
    },
    Delete {
        name: String,
    },
}

impl LayoutStep {
    /// Name of the component the step creates, if any.
    pub fn creates(&self) -> Option<&str> {
        match self {
            LayoutStep::CreateBaseplate { name, .. }
            | LayoutStep::PlaceElement { name, .. }
            | LayoutStep::PlaceAlongBeam { name, .. }
            | LayoutStep::PlaceRelative { name, .. }
            | LayoutStep::AttachChild { name, .. } => Some(name),
            LayoutStep::AddBeamPath { .. } | LayoutStep::Delete { .. } => None,
        }
    }
}

/// A step with the stable id it was recorded under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedStep {
    pub id: Uuid,
    pub step: LayoutStep,
}

impl RecordedStep {
    pub fn new(step: LayoutStep) -> Self {
        Self {
            id: Uuid::new_v4(),
            step,
        }
    }
}
