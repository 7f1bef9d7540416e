//! Branch-by-branch beam marching.
//!
//! Branches are resolved in ascending key order, so a parent branch is
//! always finished before its children. A failing request aborts only
//! its own branch: later requests on that branch stay where they were,
//! and the branches it would have spawned report their requests as
//! unreachable.

use std::collections::{BTreeMap, BTreeSet};

use optic_types::{heading_vector, normalize_deg, BranchKey, Constraint, OpticalRole, Placement};
use scene_graph::SceneGraph;
use tracing::{debug, info, instrument, warn};

use crate::path::BeamPath;
use crate::types::*;

/// Position and heading of the beam at some point along a branch.
#[derive(Debug, Clone, Copy)]
struct BeamFront {
    position: [f64; 2],
    heading: f64,
}

impl BeamFront {
    /// Distance along the heading to the point satisfying `constraint`.
    fn march_distance(&self, constraint: Constraint, eps: f64) -> Option<f64> {
        let (dx, dy) = heading_vector(self.heading);
        let t = match constraint {
            Constraint::Distance(d) => d,
            Constraint::AbsoluteX(x) => {
                if dx.abs() < eps {
                    return None;
                }
                (x - self.position[0]) / dx
            }
            Constraint::AbsoluteY(y) => {
                if dy.abs() < eps {
                    return None;
                }
                (y - self.position[1]) / dy
            }
        };
        if t.is_nan() || t < -eps {
            return None;
        }
        Some(t.max(0.0))
    }

    fn advanced(&self, t: f64) -> [f64; 2] {
        let (dx, dy) = heading_vector(self.heading);
        [self.position[0] + t * dx, self.position[1] + t * dy]
    }
}

/// How a branch ended.
enum BranchEnd {
    /// Every request was placed.
    Complete,
    /// No beam leaves past this request index.
    Stopped(usize),
    /// The request at this index failed; nothing after it was touched.
    Aborted(usize),
}

struct Resolver<'a> {
    graph: &'a mut SceneGraph,
    config: &'a ResolverConfig,
    plane_z: f64,
    pending: BTreeMap<BranchKey, BeamFront>,
    registered: BTreeSet<BranchKey>,
    out: BeamResolution,
}

impl BeamPath {
    /// Place every requested component and record the beam segments.
    ///
    /// Resolved components get a planar world placement on the beam plane
    /// at their requested yaw. Components whose request could not be met
    /// keep their previous placement and are flagged stale.
    #[instrument(skip_all)]
    pub fn resolve(&mut self, graph: &mut SceneGraph, config: &ResolverConfig) -> BeamResolution {
        let origin = *self.origin();
        let root = self.root_key();
        let mut resolver = Resolver {
            graph,
            config,
            plane_z: origin.translation().z,
            pending: BTreeMap::new(),
            registered: BTreeSet::from([root]),
            out: BeamResolution::default(),
        };
        resolver.pending.insert(
            root,
            BeamFront {
                position: [origin.translation().x, origin.translation().y],
                heading: normalize_deg(origin.yaw_deg()),
            },
        );

        let mut done = BTreeSet::new();
        while let Some((key, front)) = resolver.pending.pop_first() {
            done.insert(key);
            let requests = self.requests().get(&key).map(Vec::as_slice).unwrap_or_default();
            resolver.run_branch(key, front, requests);
        }

        for (key, requests) in self.requests() {
            if done.contains(key) {
                continue;
            }
            for request in requests {
                let component = resolver.name_of(request);
                resolver.graph.flag_stale(request.component);
                resolver.out.errors.push(BeamError::UnreachableBranch {
                    component,
                    key: *key,
                });
            }
        }

        let resolution = resolver.out;
        info!(
            placed = resolution.placements.len(),
            errors = resolution.errors.len(),
            warnings = resolution.warnings.len(),
            "beam path resolved"
        );
        self.set_resolved(resolution.clone());
        resolution
    }
}

impl Resolver<'_> {
    fn name_of(&self, request: &PlacementRequest) -> String {
        self.graph
            .get(request.component)
            .map(|c| c.name.clone())
            .unwrap_or_else(|| format!("{:?}", request.component))
    }

    fn run_branch(&mut self, key: BranchKey, mut front: BeamFront, requests: &[PlacementRequest]) {
        let end = self.march(key, &mut front, requests);
        let rest = match end {
            BranchEnd::Complete => return,
            BranchEnd::Stopped(i) => &requests[i + 1..],
            BranchEnd::Aborted(i) => {
                for r in &requests[i + 1..] {
                    self.graph.flag_stale(r.component);
                }
                return;
            }
        };
        for request in rest {
            let component = self.name_of(request);
            self.graph.flag_stale(request.component);
            self.out
                .errors
                .push(BeamError::BranchTerminated { component, key });
        }
    }

    fn march(
        &mut self,
        key: BranchKey,
        front: &mut BeamFront,
        requests: &[PlacementRequest],
    ) -> BranchEnd {
        let eps = self.config.distance_epsilon;
        for (i, request) in requests.iter().enumerate() {
            let Some(component) = self.graph.get(request.component) else {
                self.out.errors.push(BeamError::ComponentNotFound {
                    id: request.component,
                });
                return BranchEnd::Aborted(i);
            };
            let name = component.name.clone();
            let role = component.role.clone();

            let Some(t) = front.march_distance(request.constraint, eps) else {
                warn!(component = %name, constraint = %request.constraint, "constraint not satisfiable");
                self.graph.flag_stale(request.component);
                self.out.errors.push(BeamError::UnsatisfiableConstraint {
                    component: name,
                    constraint: request.constraint,
                    heading: front.heading,
                });
                return BranchEnd::Aborted(i);
            };

            let end = front.advanced(t);
            let yaw = normalize_deg(request.angle);
            let placement = Placement::from_euler_deg([end[0], end[1], self.plane_z], [0.0, 0.0, yaw]);
            if let Err(source) = self.graph.place_root(request.component, placement) {
                self.graph.flag_stale(request.component);
                self.out.errors.push(BeamError::Placement { component: name, source });
                return BranchEnd::Aborted(i);
            }
            self.out.segments.push(BeamSegment {
                branch: key,
                start: front.position,
                end,
            });
            self.out.placements.push(ResolvedPlacement {
                component: request.component,
                branch: key,
                placement,
                incoming: front.heading,
            });
            debug!(component = %name, x = end[0], y = end[1], yaw, branch = %key, "element placed");
            self.check_acceptance(&name, &role, yaw, front.heading);

            let exits = role.exit_headings(yaw, front.heading, request.fold_count);
            front.position = end;

            if role.is_split() {
                let (Some(straight), Some(split)) = (exits.transmitted, exits.reflected) else {
                    return BranchEnd::Stopped(i);
                };
                let (Some(t_key), Some(r_key)) = (key.transmitted(), key.reflected()) else {
                    self.out.errors.push(BeamError::KeyOverflow { component: name, key });
                    return BranchEnd::Stopped(i);
                };
                self.spawn(&name, r_key, BeamFront { position: end, heading: split });
                if key.continues_in_place() {
                    front.heading = straight;
                    continue;
                }
                self.spawn(&name, t_key, BeamFront { position: end, heading: straight });
                return BranchEnd::Stopped(i);
            }

            match exits.transmitted.or(exits.reflected) {
                Some(heading) => front.heading = heading,
                None => return BranchEnd::Stopped(i),
            }
        }
        BranchEnd::Complete
    }

    fn spawn(&mut self, component: &str, key: BranchKey, front: BeamFront) {
        if !self.registered.insert(key) {
            self.out.errors.push(BeamError::BranchKeyConflict {
                component: component.to_string(),
                key,
            });
            return;
        }
        self.pending.insert(key, front);
    }

    fn check_acceptance(&mut self, name: &str, role: &OpticalRole, yaw: f64, incoming: f64) {
        if role.aperture_half_width <= 0.0 {
            return;
        }
        let incidence = role.incidence(yaw, incoming);
        if incidence > role.max_acceptance + self.config.angle_tolerance_deg {
            warn!(component = %name, incidence, "beam outside acceptance angle");
            self.out.warnings.push(BeamWarning::AcceptanceExceeded {
                component: name.to_string(),
                incidence,
                max_acceptance: role.max_acceptance,
            });
        }
        let effective = role.effective_half_width(yaw, incoming);
        if effective + self.config.distance_epsilon < self.config.min_beam_radius {
            warn!(component = %name, effective, "aperture narrower than beam");
            self.out.warnings.push(BeamWarning::NarrowAperture {
                component: name.to_string(),
                effective_half_width: effective,
                min_beam_radius: self.config.min_beam_radius,
            });
        }
    }
}
