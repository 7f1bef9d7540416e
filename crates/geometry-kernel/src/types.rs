use nalgebra::{Point3, UnitQuaternion, Vector3};
use optic_types::Placement;
use serde::{Deserialize, Serialize};

/// Opaque handle to a solid owned by a kernel. Solids are immutable:
/// every operation returns a new handle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SolidHandle(pub(crate) u64);

impl SolidHandle {
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Errors from geometry kernel operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum KernelError {
    #[error("boolean operation failed: {reason}")]
    BooleanFailed { reason: String },

    #[error("fillet failed: {reason}")]
    FilletFailed { reason: String },

    #[error("invalid parameter: {reason}")]
    InvalidParameter { reason: String },

    #[error("solid not found: {handle}")]
    SolidNotFound { handle: u64 },

    #[error("tessellation failed: {reason}")]
    TessellationFailed { reason: String },

    #[error("operation not supported: {operation}")]
    NotSupported { operation: String },
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: [f64; 3],
    pub max: [f64; 3],
}

impl BoundingBox {
    pub fn new(min: [f64; 3], max: [f64; 3]) -> Self {
        Self { min, max }
    }

    /// Box enclosing all points; `None` for an empty iterator.
    pub fn from_points<I: IntoIterator<Item = [f64; 3]>>(points: I) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bb = Self::new(first, first);
        for p in iter {
            for i in 0..3 {
                bb.min[i] = bb.min[i].min(p[i]);
                bb.max[i] = bb.max[i].max(p[i]);
            }
        }
        Some(bb)
    }

    pub fn size(&self) -> [f64; 3] {
        [
            self.max[0] - self.min[0],
            self.max[1] - self.min[1],
            self.max[2] - self.min[2],
        ]
    }

    pub fn volume(&self) -> f64 {
        let s = self.size();
        s[0] * s[1] * s[2]
    }

    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        let mut out = *self;
        for i in 0..3 {
            out.min[i] = out.min[i].min(other.min[i]);
            out.max[i] = out.max[i].max(other.max[i]);
        }
        out
    }

    pub fn contains(&self, p: &[f64; 3]) -> bool {
        (0..3).all(|i| p[i] >= self.min[i] && p[i] <= self.max[i])
    }

    pub fn corners(&self) -> [[f64; 3]; 8] {
        let (a, b) = (self.min, self.max);
        [
            [a[0], a[1], a[2]],
            [b[0], a[1], a[2]],
            [a[0], b[1], a[2]],
            [b[0], b[1], a[2]],
            [a[0], a[1], b[2]],
            [b[0], a[1], b[2]],
            [a[0], b[1], b[2]],
            [b[0], b[1], b[2]],
        ]
    }

    /// Axis-aligned box around this box after a rigid transform.
    pub fn transformed(&self, placement: &Placement) -> BoundingBox {
        let pts = self.corners().map(|c| {
            let p = placement.apply_point(&Point3::new(c[0], c[1], c[2]));
            [p.x, p.y, p.z]
        });
        // eight corners, never empty
        Self::from_points(pts).unwrap_or(*self)
    }
}

/// Triangle mesh for export.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RenderMesh {
    /// Flat vertex positions [x,y,z, x,y,z, ...].
    pub vertices: Vec<f32>,
    /// Flat vertex normals, parallel to `vertices`.
    pub normals: Vec<f32>,
    /// Triangle indices into the vertex array.
    pub indices: Vec<u32>,
}

impl RenderMesh {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn bounding_box(&self) -> Option<BoundingBox> {
        BoundingBox::from_points(
            self.vertices
                .chunks_exact(3)
                .map(|c| [f64::from(c[0]), f64::from(c[1]), f64::from(c[2])]),
        )
    }
}

/// Placement that maps local +z onto `axis`, with the origin at `base`.
pub fn axis_frame(base: [f64; 3], axis: [f64; 3]) -> Result<Placement, KernelError> {
    let dir = Vector3::new(axis[0], axis[1], axis[2]);
    let len = dir.norm();
    if len < 1e-12 {
        return Err(KernelError::InvalidParameter {
            reason: "axis has zero length".to_string(),
        });
    }
    let dir = dir / len;
    let z = Vector3::z();
    let rotation = UnitQuaternion::rotation_between(&z, &dir).unwrap_or_else(|| {
        // anti-parallel: half turn about x
        UnitQuaternion::from_axis_angle(&Vector3::x_axis(), std::f64::consts::PI)
    });
    Ok(Placement::new(Vector3::new(base[0], base[1], base[2]), rotation))
}

pub(crate) fn check_positive(name: &str, value: f64) -> Result<(), KernelError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(KernelError::InvalidParameter {
            reason: format!("{name} must be positive, got {value}"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_frame_maps_z_to_axis() {
        let frame = axis_frame([1.0, 2.0, 3.0], [0.0, 0.0, -2.0]).unwrap();
        let v = frame.apply_vector(&Vector3::z());
        assert!((v.z + 1.0).abs() < 1e-12);
        let p = frame.apply_point(&Point3::origin());
        assert!((p.x - 1.0).abs() < 1e-12 && (p.z - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_axis_frame_rejects_zero_axis() {
        assert!(matches!(
            axis_frame([0.0; 3], [0.0; 3]),
            Err(KernelError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_bounding_box_transformed_by_quarter_turn() {
        let bb = BoundingBox::new([0.0, 0.0, 0.0], [2.0, 1.0, 1.0]);
        let turned = bb.transformed(&Placement::planar(0.0, 0.0, 90.0));
        let s = turned.size();
        assert!((s[0] - 1.0).abs() < 1e-9);
        assert!((s[1] - 2.0).abs() < 1e-9);
    }
}
