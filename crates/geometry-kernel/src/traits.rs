use optic_types::Placement;

use crate::types::*;

/// Solid modeling operations consumed by the layout.
///
/// Implementations must be deterministic: the same sequence of calls on
/// the same inputs produces geometrically identical solids, and no call
/// observes state left behind by an earlier one beyond the handles it is
/// given.
pub trait GeometryKernel {
    /// Box with one corner at the origin, extending to (dx, dy, dz).
    fn make_box(&mut self, dx: f64, dy: f64, dz: f64) -> Result<SolidHandle, KernelError>;

    /// Cylinder whose base disc is centered at `base`, extruded `height` along `axis`.
    fn make_cylinder(
        &mut self,
        radius: f64,
        height: f64,
        base: [f64; 3],
        axis: [f64; 3],
    ) -> Result<SolidHandle, KernelError>;

    /// Truncated cone from `base_radius` at `base` to `top_radius` at `height` along `axis`.
    fn make_cone(
        &mut self,
        base_radius: f64,
        top_radius: f64,
        height: f64,
        base: [f64; 3],
        axis: [f64; 3],
    ) -> Result<SolidHandle, KernelError>;

    /// Slab of text lying in the XY plane, baseline on +x, extruded `depth` along +z.
    fn make_text(&mut self, text: &str, size: f64, depth: f64)
        -> Result<SolidHandle, KernelError>;

    /// Copy of `solid` moved by `placement`.
    fn transform(
        &mut self,
        solid: &SolidHandle,
        placement: &Placement,
    ) -> Result<SolidHandle, KernelError>;

    /// Boolean union: A ∪ B.
    fn boolean_union(
        &mut self,
        a: &SolidHandle,
        b: &SolidHandle,
    ) -> Result<SolidHandle, KernelError>;

    /// Boolean subtraction: A − B.
    fn boolean_subtract(
        &mut self,
        a: &SolidHandle,
        b: &SolidHandle,
    ) -> Result<SolidHandle, KernelError>;

    /// Round every edge of `solid` that runs parallel to `direction`.
    fn fillet_edges_along(
        &mut self,
        solid: &SolidHandle,
        direction: [f64; 3],
        radius: f64,
    ) -> Result<SolidHandle, KernelError>;

    fn bounding_box(&self, solid: &SolidHandle) -> Result<BoundingBox, KernelError>;

    fn volume(&self, solid: &SolidHandle) -> Result<f64, KernelError>;

    /// Triangulate a solid for export.
    fn tessellate(&self, solid: &SolidHandle, tolerance: f64) -> Result<RenderMesh, KernelError>;
}
