use std::collections::BTreeMap;

use optic_types::{BranchKey, Placement};
use scene_graph::ComponentId;

use crate::types::{BeamResolution, PlacementRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BeamState {
    Empty,
    Populated,
    Resolved,
}

/// A beam origin plus the placement requests on each of its branches.
#[derive(Debug, Clone)]
pub struct BeamPath {
    origin: Placement,
    root_key: BranchKey,
    requests: BTreeMap<BranchKey, Vec<PlacementRequest>>,
    state: BeamState,
    last: Option<BeamResolution>,
}

impl BeamPath {
    /// Beam starting at (x, y) on the beam plane, heading `angle` degrees.
    pub fn new(x: f64, y: f64, angle: f64) -> Self {
        Self::from_origin(Placement::planar(x, y, angle))
    }

    pub fn from_origin(origin: Placement) -> Self {
        Self {
            origin,
            root_key: BranchKey::ROOT,
            requests: BTreeMap::new(),
            state: BeamState::Empty,
            last: None,
        }
    }

    pub fn with_root_key(mut self, root_key: BranchKey) -> Self {
        self.root_key = root_key;
        self
    }

    pub fn origin(&self) -> &Placement {
        &self.origin
    }

    pub fn root_key(&self) -> BranchKey {
        self.root_key
    }

    pub fn state(&self) -> BeamState {
        self.state
    }

    pub fn requests(&self) -> &BTreeMap<BranchKey, Vec<PlacementRequest>> {
        &self.requests
    }

    /// Result of the most recent `resolve()`.
    pub fn last_resolution(&self) -> Option<&BeamResolution> {
        self.last.as_ref()
    }

    pub(crate) fn set_resolved(&mut self, resolution: BeamResolution) {
        self.last = Some(resolution);
        self.state = BeamState::Resolved;
    }

    /// Queue a request after every earlier request on `key`.
    pub fn add_request(&mut self, key: BranchKey, request: PlacementRequest) {
        self.requests.entry(key).or_default().push(request);
        self.state = BeamState::Populated;
    }

    /// Whether any request places `component`.
    pub fn places(&self, component: ComponentId) -> bool {
        self.requests
            .values()
            .flatten()
            .any(|r| r.component == component)
    }

    /// Drop every request that places one of `components`.
    pub fn remove_components(&mut self, components: &[ComponentId]) {
        for list in self.requests.values_mut() {
            list.retain(|r| !components.contains(&r.component));
        }
        self.requests.retain(|_, list| !list.is_empty());
        self.state = if self.requests.is_empty() {
            BeamState::Empty
        } else {
            BeamState::Populated
        };
    }
}
