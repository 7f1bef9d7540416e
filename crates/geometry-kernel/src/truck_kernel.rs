//! Geometry kernel backed by the truck BREP library.

use std::collections::HashMap;

use optic_types::Placement;
use tracing::debug;

// Import truck types selectively to avoid shadowing std::result::Result
use truck_modeling::builder;
use truck_modeling::topology::Solid;
use truck_modeling::Matrix4;

use crate::primitives;
use crate::tessellation;
use crate::traits::GeometryKernel;
use crate::types::*;

/// Boolean tolerance handed to truck-shapeops.
const BOOLEAN_TOLERANCE: f64 = 0.05;

/// Tolerance used when a bounding box has to be measured from a mesh.
const BOUNDS_TOLERANCE: f64 = 0.05;

/// Real geometry kernel backed by truck.
pub struct TruckKernel {
    next_handle: u64,
    solids: HashMap<u64, Solid>,
}

impl TruckKernel {
    pub fn new() -> Self {
        Self {
            next_handle: 1,
            solids: HashMap::new(),
        }
    }

    fn alloc_handle(&mut self) -> SolidHandle {
        let h = SolidHandle(self.next_handle);
        self.next_handle += 1;
        h
    }

    pub(crate) fn store_solid(&mut self, solid: Solid) -> SolidHandle {
        let handle = self.alloc_handle();
        self.solids.insert(handle.id(), solid);
        handle
    }

    pub(crate) fn get_solid(&self, handle: &SolidHandle) -> Result<&Solid, KernelError> {
        self.solids
            .get(&handle.id())
            .ok_or(KernelError::SolidNotFound {
                handle: handle.id(),
            })
    }

    fn store_along_axis(
        &mut self,
        solid: Solid,
        base: [f64; 3],
        axis: [f64; 3],
    ) -> Result<SolidHandle, KernelError> {
        let frame = axis_frame(base, axis)?;
        let moved = builder::transformed(&solid, to_matrix(&frame));
        Ok(self.store_solid(moved))
    }
}

impl Default for TruckKernel {
    fn default() -> Self {
        Self::new()
    }
}

/// Homogeneous matrix of a placement in truck's column-major layout.
fn to_matrix(placement: &Placement) -> Matrix4 {
    let m = placement.isometry().to_homogeneous();
    Matrix4::new(
        m[(0, 0)],
        m[(1, 0)],
        m[(2, 0)],
        m[(3, 0)],
        m[(0, 1)],
        m[(1, 1)],
        m[(2, 1)],
        m[(3, 1)],
        m[(0, 2)],
        m[(1, 2)],
        m[(2, 2)],
        m[(3, 2)],
        m[(0, 3)],
        m[(1, 3)],
        m[(2, 3)],
        m[(3, 3)],
    )
}

impl GeometryKernel for TruckKernel {
    fn make_box(&mut self, dx: f64, dy: f64, dz: f64) -> Result<SolidHandle, KernelError> {
        check_positive("box dx", dx)?;
        check_positive("box dy", dy)?;
        check_positive("box dz", dz)?;
        Ok(self.store_solid(primitives::make_box(dx, dy, dz)))
    }

    fn make_cylinder(
        &mut self,
        radius: f64,
        height: f64,
        base: [f64; 3],
        axis: [f64; 3],
    ) -> Result<SolidHandle, KernelError> {
        check_positive("cylinder radius", radius)?;
        check_positive("cylinder height", height)?;
        let solid = primitives::make_cylinder(radius, height)?;
        self.store_along_axis(solid, base, axis)
    }

    fn make_cone(
        &mut self,
        base_radius: f64,
        top_radius: f64,
        height: f64,
        base: [f64; 3],
        axis: [f64; 3],
    ) -> Result<SolidHandle, KernelError> {
        check_positive("cone height", height)?;
        check_positive("cone base radius", base_radius)?;
        if top_radius < 0.0 {
            return Err(KernelError::InvalidParameter {
                reason: format!("cone top radius must not be negative, got {top_radius}"),
            });
        }
        let solid = primitives::make_cone(base_radius, top_radius, height)?;
        self.store_along_axis(solid, base, axis)
    }

    fn make_text(
        &mut self,
        _text: &str,
        _size: f64,
        _depth: f64,
    ) -> Result<SolidHandle, KernelError> {
        Err(KernelError::NotSupported {
            operation: "make_text (truck has no font support)".to_string(),
        })
    }

    fn transform(
        &mut self,
        solid: &SolidHandle,
        placement: &Placement,
    ) -> Result<SolidHandle, KernelError> {
        let moved = builder::transformed(self.get_solid(solid)?, to_matrix(placement));
        Ok(self.store_solid(moved))
    }

    fn boolean_union(
        &mut self,
        a: &SolidHandle,
        b: &SolidHandle,
    ) -> Result<SolidHandle, KernelError> {
        let solid_a = self.get_solid(a)?.clone();
        let solid_b = self.get_solid(b)?.clone();
        let result = truck_shapeops::or(&solid_a, &solid_b, BOOLEAN_TOLERANCE).ok_or_else(|| {
            KernelError::BooleanFailed {
                reason: "truck or() returned None".to_string(),
            }
        })?;
        debug!(a = a.id(), b = b.id(), "truck union");
        Ok(self.store_solid(result))
    }

    fn boolean_subtract(
        &mut self,
        a: &SolidHandle,
        b: &SolidHandle,
    ) -> Result<SolidHandle, KernelError> {
        let solid_a = self.get_solid(a)?.clone();
        let mut solid_b = self.get_solid(b)?.clone();

        // Subtraction = A ∩ ¬B. not() mutates in place.
        solid_b.not();
        let result =
            truck_shapeops::and(&solid_a, &solid_b, BOOLEAN_TOLERANCE).ok_or_else(|| {
                KernelError::BooleanFailed {
                    reason: "truck and() returned None for subtraction".to_string(),
                }
            })?;
        debug!(a = a.id(), b = b.id(), "truck subtract");
        Ok(self.store_solid(result))
    }

    fn fillet_edges_along(
        &mut self,
        _solid: &SolidHandle,
        _direction: [f64; 3],
        _radius: f64,
    ) -> Result<SolidHandle, KernelError> {
        Err(KernelError::NotSupported {
            operation: "fillet (truck has no fillet API)".to_string(),
        })
    }

    fn bounding_box(&self, solid: &SolidHandle) -> Result<BoundingBox, KernelError> {
        let mesh = tessellation::tessellate_solid(self.get_solid(solid)?, BOUNDS_TOLERANCE)?;
        mesh.bounding_box()
            .ok_or_else(|| KernelError::TessellationFailed {
                reason: "empty mesh".to_string(),
            })
    }

    fn volume(&self, _solid: &SolidHandle) -> Result<f64, KernelError> {
        Err(KernelError::NotSupported {
            operation: "volume".to_string(),
        })
    }

    fn tessellate(&self, solid: &SolidHandle, tolerance: f64) -> Result<RenderMesh, KernelError> {
        tessellation::tessellate_solid(self.get_solid(solid)?, tolerance)
    }
}
