use geometry_kernel::KernelError;
use optic_types::BoltSpec;
use serde::{Deserialize, Serialize};

/// Errors from shape-building operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum OpError {
    #[error("kernel error: {0}")]
    Kernel(#[from] KernelError),

    #[error("invalid parameter: {reason}")]
    InvalidParameter { reason: String },
}

/// A box positioned relative to an anchor point.
///
/// Along each axis, `anchor` selects which part of the box sits on
/// `position`: `1` puts the minimum face there, `0` centers the box on it,
/// `-1` puts the maximum face there.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoxSpec {
    pub size: [f64; 3],
    pub position: [f64; 3],
    pub anchor: [f64; 3],
    pub fillet: f64,
    /// Edges parallel to this direction are filleted; defaults to |anchor|.
    pub fillet_axis: Option<[f64; 3]>,
}

impl BoxSpec {
    /// Box centered in x and y, rising from `position` in z.
    pub fn new(dx: f64, dy: f64, dz: f64) -> Self {
        Self {
            size: [dx, dy, dz],
            position: [0.0; 3],
            anchor: [0.0, 0.0, 1.0],
            fillet: 0.0,
            fillet_axis: None,
        }
    }

    pub fn at(mut self, x: f64, y: f64, z: f64) -> Self {
        self.position = [x, y, z];
        self
    }

    pub fn anchored(mut self, anchor: [f64; 3]) -> Self {
        self.anchor = anchor;
        self
    }

    /// Shorthand for a box hanging below `position`.
    pub fn hanging(self) -> Self {
        self.anchored([0.0, 0.0, -1.0])
    }

    pub fn fillet(mut self, radius: f64) -> Self {
        self.fillet = radius;
        self
    }

    pub fn fillet_along(mut self, axis: [f64; 3]) -> Self {
        self.fillet_axis = Some(axis);
        self
    }

    /// Minimum corner after anchoring.
    pub fn origin(&self) -> [f64; 3] {
        let mut o = [0.0; 3];
        for i in 0..3 {
            o[i] = self.position[i] - (1.0 - self.anchor[i]) * self.size[i] / 2.0;
        }
        o
    }
}

/// A cylindrical hole with an optional counterbore or countersink head.
///
/// The hole starts at `position` and runs `depth` along `direction`;
/// the head starts at the same point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HoleSpec {
    pub dia: f64,
    pub depth: f64,
    pub position: [f64; 3],
    pub head_dia: f64,
    pub head_dz: f64,
    pub direction: [f64; 3],
    pub countersink: bool,
}

impl HoleSpec {
    /// Plain hole pointing down.
    pub fn new(dia: f64, depth: f64) -> Self {
        Self {
            dia,
            depth,
            position: [0.0; 3],
            head_dia: 0.0,
            head_dz: 0.0,
            direction: [0.0, 0.0, -1.0],
            countersink: false,
        }
    }

    /// Hole sized for tapping threads of `bolt`.
    pub fn tapped(bolt: &BoltSpec, depth: f64) -> Self {
        Self::new(bolt.tap_dia, depth)
    }

    /// Clearance hole for `bolt`, without a head pocket.
    pub fn clearance(bolt: &BoltSpec, depth: f64) -> Self {
        Self::new(bolt.clear_dia, depth)
    }

    pub fn at(mut self, x: f64, y: f64, z: f64) -> Self {
        self.position = [x, y, z];
        self
    }

    pub fn direction(mut self, direction: [f64; 3]) -> Self {
        self.direction = direction;
        self
    }

    pub fn head(mut self, dia: f64, dz: f64) -> Self {
        self.head_dia = dia;
        self.head_dz = dz;
        self
    }

    /// Counterbore sized for the bolt head (or washer).
    pub fn bolt_head(self, bolt: &BoltSpec) -> Self {
        self.head(bolt.counterbore_dia(), bolt.head_dz)
    }

    pub fn countersunk(mut self) -> Self {
        self.countersink = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_box_origin_follows_anchor() {
        let spec = BoxSpec::new(10.0, 4.0, 2.0).at(1.0, 1.0, 0.0);
        assert_eq!(spec.origin(), [-4.0, -1.0, 0.0]);
        let hanging = spec.hanging();
        assert_eq!(hanging.origin(), [-4.0, -1.0, -2.0]);
        let cornered = spec.anchored([1.0, 1.0, 1.0]);
        assert_eq!(cornered.origin(), [1.0, 1.0, 0.0]);
    }
}
