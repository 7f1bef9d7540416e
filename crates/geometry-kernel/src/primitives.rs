//! Primitive solids built from truck's sweep API.
//!
//! truck has no built-in box/cylinder/cone: everything is successive sweeps.

use std::f64::consts::PI;
use truck_modeling::builder;
use truck_modeling::topology::{Edge, Solid, Wire};
use truck_modeling::{EuclideanSpace, Point3, Rad, Vector3};

use crate::types::KernelError;

/// Box via three translational sweeps. Corner at the origin, extends to (w, h, d).
pub fn make_box(w: f64, h: f64, d: f64) -> Solid {
    let v = builder::vertex(Point3::new(0.0, 0.0, 0.0));
    let edge = builder::tsweep(&v, Vector3::new(w, 0.0, 0.0));
    let face = builder::tsweep(&edge, Vector3::new(0.0, h, 0.0));
    builder::tsweep(&face, Vector3::new(0.0, 0.0, d))
}

/// Cylinder along +z with its base disc centered at the origin.
pub fn make_cylinder(radius: f64, height: f64) -> Result<Solid, KernelError> {
    let v = builder::vertex(Point3::new(radius, 0.0, 0.0));
    let wire = builder::rsweep(&v, Point3::origin(), Vector3::unit_z(), Rad(2.0 * PI));
    let face = builder::try_attach_plane(&[wire]).map_err(|e| KernelError::InvalidParameter {
        reason: format!("circular face: {e}"),
    })?;
    Ok(builder::tsweep(&face, Vector3::new(0.0, 0.0, height)))
}

/// Truncated cone along +z: revolve the half-profile in the XZ plane.
pub fn make_cone(base_radius: f64, top_radius: f64, height: f64) -> Result<Solid, KernelError> {
    let mut points = vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(base_radius, 0.0, 0.0),
    ];
    if top_radius > 1e-9 {
        points.push(Point3::new(top_radius, 0.0, height));
    }
    points.push(Point3::new(0.0, 0.0, height));

    let vertices: Vec<_> = points.into_iter().map(builder::vertex).collect();
    let edges: Vec<Edge> = (0..vertices.len())
        .map(|i| builder::line(&vertices[i], &vertices[(i + 1) % vertices.len()]))
        .collect();
    let profile = Wire::from_iter(edges);
    let face =
        builder::try_attach_plane(&[profile]).map_err(|e| KernelError::InvalidParameter {
            reason: format!("cone profile: {e}"),
        })?;
    Ok(builder::rsweep(
        &face,
        Point3::origin(),
        Vector3::unit_z(),
        Rad(2.0 * PI),
    ))
}
