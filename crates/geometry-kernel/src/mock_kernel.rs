//! Deterministic in-memory kernel for tests.
//!
//! Solids are CSG expression trees. Volumes are estimated by sampling
//! cell centers of a regular grid over the solid's bounds, so two trees
//! with the same point membership always report the same volume.

use std::collections::HashMap;

use nalgebra::Point3;
use optic_types::Placement;

use crate::csg::CsgNode;
use crate::traits::GeometryKernel;
use crate::types::*;

/// In-memory kernel storing each solid as a CSG tree.
pub struct MockKernel {
    next_handle: u64,
    solids: HashMap<u64, CsgNode>,
    sample_spacing: f64,
    fail_on: Option<&'static str>,
}

impl MockKernel {
    pub fn new() -> Self {
        Self {
            next_handle: 1,
            solids: HashMap::new(),
            sample_spacing: 1.0,
            fail_on: None,
        }
    }

    /// Grid spacing (mm) used when estimating volumes.
    pub fn with_sample_spacing(mut self, spacing: f64) -> Self {
        self.sample_spacing = spacing;
        self
    }

    /// Make every call of the named operation fail, for exercising error paths.
    pub fn failing(mut self, operation: &'static str) -> Self {
        self.fail_on = Some(operation);
        self
    }

    /// The CSG tree behind a handle.
    pub fn node(&self, handle: &SolidHandle) -> Option<&CsgNode> {
        self.solids.get(&handle.0)
    }

    pub fn solid_count(&self) -> usize {
        self.solids.len()
    }

    fn alloc_handle(&mut self) -> SolidHandle {
        let h = SolidHandle(self.next_handle);
        self.next_handle += 1;
        h
    }

    fn store(&mut self, node: CsgNode) -> SolidHandle {
        let handle = self.alloc_handle();
        self.solids.insert(handle.0, node);
        handle
    }

    fn get(&self, handle: &SolidHandle) -> Result<&CsgNode, KernelError> {
        self.solids
            .get(&handle.0)
            .ok_or(KernelError::SolidNotFound { handle: handle.0 })
    }

    fn check_enabled(&self, operation: &str) -> Result<(), KernelError> {
        match self.fail_on {
            Some(op) if op == operation => Err(KernelError::BooleanFailed {
                reason: format!("mock configured to fail {operation}"),
            }),
            _ => Ok(()),
        }
    }

    fn store_along_axis(
        &mut self,
        node: CsgNode,
        base: [f64; 3],
        axis: [f64; 3],
    ) -> Result<SolidHandle, KernelError> {
        let frame = axis_frame(base, axis)?;
        Ok(self.store(CsgNode::transformed(node, frame)))
    }
}

impl Default for MockKernel {
    fn default() -> Self {
        Self::new()
    }
}

impl GeometryKernel for MockKernel {
    fn make_box(&mut self, dx: f64, dy: f64, dz: f64) -> Result<SolidHandle, KernelError> {
        self.check_enabled("make_box")?;
        check_positive("box dx", dx)?;
        check_positive("box dy", dy)?;
        check_positive("box dz", dz)?;
        Ok(self.store(CsgNode::Box { size: [dx, dy, dz] }))
    }

    fn make_cylinder(
        &mut self,
        radius: f64,
        height: f64,
        base: [f64; 3],
        axis: [f64; 3],
    ) -> Result<SolidHandle, KernelError> {
        self.check_enabled("make_cylinder")?;
        check_positive("cylinder radius", radius)?;
        check_positive("cylinder height", height)?;
        self.store_along_axis(CsgNode::Cylinder { radius, height }, base, axis)
    }

    fn make_cone(
        &mut self,
        base_radius: f64,
        top_radius: f64,
        height: f64,
        base: [f64; 3],
        axis: [f64; 3],
    ) -> Result<SolidHandle, KernelError> {
        self.check_enabled("make_cone")?;
        check_positive("cone height", height)?;
        if base_radius < 0.0 || top_radius < 0.0 || base_radius.max(top_radius) <= 0.0 {
            return Err(KernelError::InvalidParameter {
                reason: format!("cone radii {base_radius}, {top_radius} are degenerate"),
            });
        }
        self.store_along_axis(
            CsgNode::Cone {
                base_radius,
                top_radius,
                height,
            },
            base,
            axis,
        )
    }

    fn make_text(&mut self, text: &str, size: f64, depth: f64) -> Result<SolidHandle, KernelError> {
        self.check_enabled("make_text")?;
        check_positive("text size", size)?;
        check_positive("text depth", depth)?;
        if text.trim().is_empty() {
            return Err(KernelError::InvalidParameter {
                reason: "text is empty".to_string(),
            });
        }
        Ok(self.store(CsgNode::Text {
            text: text.to_string(),
            size,
            depth,
        }))
    }

    fn transform(
        &mut self,
        solid: &SolidHandle,
        placement: &Placement,
    ) -> Result<SolidHandle, KernelError> {
        self.check_enabled("transform")?;
        let node = self.get(solid)?.clone();
        Ok(self.store(CsgNode::transformed(node, *placement)))
    }

    fn boolean_union(
        &mut self,
        a: &SolidHandle,
        b: &SolidHandle,
    ) -> Result<SolidHandle, KernelError> {
        self.check_enabled("boolean_union")?;
        let na = self.get(a)?.clone();
        let nb = self.get(b)?.clone();
        Ok(self.store(CsgNode::Union(Box::new(na), Box::new(nb))))
    }

    fn boolean_subtract(
        &mut self,
        a: &SolidHandle,
        b: &SolidHandle,
    ) -> Result<SolidHandle, KernelError> {
        self.check_enabled("boolean_subtract")?;
        let na = self.get(a)?.clone();
        let nb = self.get(b)?.clone();
        Ok(self.store(CsgNode::Difference(Box::new(na), Box::new(nb))))
    }

    fn fillet_edges_along(
        &mut self,
        solid: &SolidHandle,
        direction: [f64; 3],
        radius: f64,
    ) -> Result<SolidHandle, KernelError> {
        self.check_enabled("fillet_edges_along")?;
        check_positive("fillet radius", radius)?;
        let axis = direction
            .iter()
            .position(|c| c.abs() > 1e-9)
            .filter(|_| direction.iter().filter(|c| c.abs() > 1e-9).count() == 1)
            .ok_or_else(|| KernelError::FilletFailed {
                reason: format!("direction {direction:?} is not a coordinate axis"),
            })?;
        let size = match self.get(solid)? {
            CsgNode::Box { size } => *size,
            _ => {
                return Err(KernelError::FilletFailed {
                    reason: "mock kernel only fillets plain boxes".to_string(),
                })
            }
        };
        let (i, j) = ((axis + 1) % 3, (axis + 2) % 3);
        if 2.0 * radius > size[i] || 2.0 * radius > size[j] {
            return Err(KernelError::FilletFailed {
                reason: format!("radius {radius} too large for box {size:?}"),
            });
        }
        Ok(self.store(CsgNode::FilletedBox { size, axis, radius }))
    }

    fn bounding_box(&self, solid: &SolidHandle) -> Result<BoundingBox, KernelError> {
        Ok(self.get(solid)?.bounds())
    }

    fn volume(&self, solid: &SolidHandle) -> Result<f64, KernelError> {
        let node = self.get(solid)?;
        let bb = node.bounds();
        let h = self.sample_spacing;
        let size = bb.size();
        let counts = size.map(|s| (s / h).ceil().max(1.0) as usize);
        let mut inside = 0usize;
        for ix in 0..counts[0] {
            let x = bb.min[0] + (ix as f64 + 0.5) * h;
            for iy in 0..counts[1] {
                let y = bb.min[1] + (iy as f64 + 0.5) * h;
                for iz in 0..counts[2] {
                    let z = bb.min[2] + (iz as f64 + 0.5) * h;
                    if node.contains(&Point3::new(x, y, z)) {
                        inside += 1;
                    }
                }
            }
        }
        Ok(inside as f64 * h * h * h)
    }

    fn tessellate(&self, solid: &SolidHandle, _tolerance: f64) -> Result<RenderMesh, KernelError> {
        let bb = self.get(solid)?.bounds();
        Ok(tessellate_bounds(&bb))
    }
}

/// Twelve-triangle mesh of an axis-aligned box, outward winding.
fn tessellate_bounds(bb: &BoundingBox) -> RenderMesh {
    let c = bb.corners();
    // (corner indices, outward normal) per face
    let faces: [([usize; 4], [f32; 3]); 6] = [
        ([0, 2, 3, 1], [0.0, 0.0, -1.0]),
        ([4, 5, 7, 6], [0.0, 0.0, 1.0]),
        ([0, 1, 5, 4], [0.0, -1.0, 0.0]),
        ([2, 6, 7, 3], [0.0, 1.0, 0.0]),
        ([0, 4, 6, 2], [-1.0, 0.0, 0.0]),
        ([1, 3, 7, 5], [1.0, 0.0, 0.0]),
    ];
    let mut mesh = RenderMesh::default();
    for (quad, normal) in faces {
        let base = (mesh.vertices.len() / 3) as u32;
        for &ci in &quad {
            mesh.vertices.extend(c[ci].iter().map(|&v| v as f32));
            mesh.normals.extend_from_slice(&normal);
        }
        mesh.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
    mesh
}
