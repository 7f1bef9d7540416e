use std::fmt;

use optic_types::{BranchKey, Constraint, Placement};
use scene_graph::{ComponentId, GraphError};
use serde::{Deserialize, Serialize};

/// Tolerances used while resolving beam paths.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Slack on acceptance-angle checks, in degrees.
    pub angle_tolerance_deg: f64,
    /// Direction components and marching distances below this are zero.
    pub distance_epsilon: f64,
    /// Effective aperture half-widths below this raise a warning.
    pub min_beam_radius: f64,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            angle_tolerance_deg: 1e-6,
            distance_epsilon: 1e-9,
            min_beam_radius: 0.5,
        }
    }
}

/// One element to be placed on a branch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementRequest {
    pub component: ComponentId,
    /// Absolute yaw of the element, in degrees.
    pub angle: f64,
    pub constraint: Constraint,
    /// Internal reflections applied to the incoming heading before the
    /// element's exit rule.
    pub fold_count: u32,
}

/// A straight piece of beam on one branch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BeamSegment {
    pub branch: BranchKey,
    pub start: [f64; 2],
    pub end: [f64; 2],
}

impl BeamSegment {
    pub fn length(&self) -> f64 {
        let dx = self.end[0] - self.start[0];
        let dy = self.end[1] - self.start[1];
        dx.hypot(dy)
    }
}

/// Where a request ended up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedPlacement {
    pub component: ComponentId,
    pub branch: BranchKey,
    pub placement: Placement,
    /// Heading of the incoming beam at the element, in degrees.
    pub incoming: f64,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum BeamError {
    #[error("cannot satisfy {constraint} for {component} travelling at {heading}°")]
    UnsatisfiableConstraint {
        component: String,
        constraint: Constraint,
        heading: f64,
    },

    #[error("{component} splits branch {key} into a branch that already exists")]
    BranchKeyConflict { component: String, key: BranchKey },

    #[error("{component} is requested on branch {key} after the branch has ended")]
    BranchTerminated { component: String, key: BranchKey },

    #[error("{component} is requested on branch {key}, which no split produces")]
    UnreachableBranch { component: String, key: BranchKey },

    #[error("{component} splits branch {key} beyond the key width")]
    KeyOverflow { component: String, key: BranchKey },

    #[error("component not found: {id:?}")]
    ComponentNotFound { id: ComponentId },

    #[error("cannot place {component}: {source}")]
    Placement { component: String, source: GraphError },
}

impl BeamError {
    /// Name of the component the error is reported against.
    pub fn component(&self) -> Option<&str> {
        match self {
            BeamError::UnsatisfiableConstraint { component, .. }
            | BeamError::BranchKeyConflict { component, .. }
            | BeamError::BranchTerminated { component, .. }
            | BeamError::UnreachableBranch { component, .. }
            | BeamError::KeyOverflow { component, .. }
            | BeamError::Placement { component, .. } => Some(component),
            BeamError::ComponentNotFound { .. } => None,
        }
    }
}

/// Recoverable anomalies found while resolving.
#[derive(Debug, Clone, PartialEq)]
pub enum BeamWarning {
    AcceptanceExceeded {
        component: String,
        incidence: f64,
        max_acceptance: f64,
    },
    NarrowAperture {
        component: String,
        effective_half_width: f64,
        min_beam_radius: f64,
    },
}

impl fmt::Display for BeamWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BeamWarning::AcceptanceExceeded {
                component,
                incidence,
                max_acceptance,
            } => write!(
                f,
                "{component}: incidence {incidence:.3}° exceeds acceptance {max_acceptance:.3}°"
            ),
            BeamWarning::NarrowAperture {
                component,
                effective_half_width,
                min_beam_radius,
            } => write!(
                f,
                "{component}: effective aperture {effective_half_width:.3} mm is below beam radius {min_beam_radius:.3} mm"
            ),
        }
    }
}

/// Outcome of one `resolve()` pass.
#[derive(Debug, Clone, Default)]
pub struct BeamResolution {
    pub placements: Vec<ResolvedPlacement>,
    pub segments: Vec<BeamSegment>,
    pub errors: Vec<BeamError>,
    pub warnings: Vec<BeamWarning>,
}

impl BeamResolution {
    pub fn placement_of(&self, component: ComponentId) -> Option<&ResolvedPlacement> {
        self.placements.iter().find(|p| p.component == component)
    }

    pub fn segments_on(&self, branch: BranchKey) -> impl Iterator<Item = &BeamSegment> {
        self.segments.iter().filter(move |s| s.branch == branch)
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}
