//! Rigid-body placement algebra.
//!
//! A [`Placement`] is a translation plus a rotation, stored as an
//! `Isometry3<f64>`. Composition follows the rigid-body convention:
//! `a.compose(&b)` applies `b` first, then `a`, so a child placed at
//! `relative` under a parent at `world` sits at `world.compose(&relative)`.

use std::ops::Mul;

use nalgebra::{Isometry3, Point3, Translation3, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

/// Position (mm) and orientation of a frame relative to another frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    iso: Isometry3<f64>,
}

impl Placement {
    pub fn identity() -> Self {
        Self {
            iso: Isometry3::identity(),
        }
    }

    pub fn new(translation: Vector3<f64>, rotation: UnitQuaternion<f64>) -> Self {
        Self {
            iso: Isometry3::from_parts(Translation3::from(translation), rotation),
        }
    }

    /// Pure translation.
    pub fn from_translation(x: f64, y: f64, z: f64) -> Self {
        Self::new(Vector3::new(x, y, z), UnitQuaternion::identity())
    }

    /// In-plane placement: position on the z = 0 plane, yaw about +z in degrees.
    pub fn planar(x: f64, y: f64, yaw_deg: f64) -> Self {
        Self::new(
            Vector3::new(x, y, 0.0),
            UnitQuaternion::from_axis_angle(&Vector3::z_axis(), yaw_deg.to_radians()),
        )
    }

    /// Translation plus rotation given as degrees about x, y and z.
    ///
    /// The rotations are applied x first, then y, then z.
    pub fn from_euler_deg(translation: [f64; 3], rotation_deg: [f64; 3]) -> Self {
        Self::new(
            Vector3::new(translation[0], translation[1], translation[2]),
            UnitQuaternion::from_euler_angles(
                rotation_deg[0].to_radians(),
                rotation_deg[1].to_radians(),
                rotation_deg[2].to_radians(),
            ),
        )
    }

    pub fn isometry(&self) -> &Isometry3<f64> {
        &self.iso
    }

    pub fn translation(&self) -> Vector3<f64> {
        self.iso.translation.vector
    }

    pub fn position(&self) -> Point3<f64> {
        Point3::from(self.iso.translation.vector)
    }

    pub fn rotation(&self) -> UnitQuaternion<f64> {
        self.iso.rotation
    }

    /// Rotation about +z in degrees, in (-180, 180].
    pub fn yaw_deg(&self) -> f64 {
        let (_, _, yaw) = self.iso.rotation.euler_angles();
        crate::direction::normalize_deg(yaw.to_degrees())
    }

    /// `self ∘ other`: apply `other`, then `self`.
    pub fn compose(&self, other: &Placement) -> Placement {
        Placement {
            iso: self.iso * other.iso,
        }
    }

    pub fn inverse(&self) -> Placement {
        Placement {
            iso: self.iso.inverse(),
        }
    }

    pub fn apply_point(&self, point: &Point3<f64>) -> Point3<f64> {
        self.iso.transform_point(point)
    }

    /// Rotate a direction; translation does not apply.
    pub fn apply_vector(&self, vector: &Vector3<f64>) -> Vector3<f64> {
        self.iso.transform_vector(vector)
    }

    /// Same placement with a different translation.
    pub fn with_translation(&self, translation: Vector3<f64>) -> Placement {
        Placement::new(translation, self.iso.rotation)
    }

    /// Compare translation distance and rotation angle (radians) against `tol`.
    pub fn approx_eq(&self, other: &Placement, tol: f64) -> bool {
        let dt = (self.translation() - other.translation()).norm();
        let dr = self.iso.rotation.angle_to(&other.iso.rotation);
        dt <= tol && dr <= tol
    }
}

impl Default for Placement {
    fn default() -> Self {
        Self::identity()
    }
}

impl Mul for Placement {
    type Output = Placement;

    fn mul(self, rhs: Placement) -> Placement {
        self.compose(&rhs)
    }
}

impl From<Isometry3<f64>> for Placement {
    fn from(iso: Isometry3<f64>) -> Self {
        Self { iso }
    }
}

/// Apply `b`, then `a`.
pub fn compose(a: &Placement, b: &Placement) -> Placement {
    a.compose(b)
}

pub fn invert(p: &Placement) -> Placement {
    p.inverse()
}

pub fn apply(p: &Placement, point: &Point3<f64>) -> Point3<f64> {
    p.apply_point(point)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_planar_yaw_round_trip() {
        let p = Placement::planar(20.0, 20.0, -45.0);
        assert_relative_eq!(p.yaw_deg(), -45.0, epsilon = 1e-9);
        assert_relative_eq!(p.translation().x, 20.0);
        assert_relative_eq!(p.translation().z, 0.0);
    }

    #[test]
    fn test_compose_applies_right_operand_first() {
        let parent = Placement::planar(10.0, 0.0, 90.0);
        let child = Placement::from_translation(5.0, 0.0, 0.0);
        let world = parent.compose(&child);
        // child offset along parent's +x, which points along world +y
        assert_relative_eq!(world.translation().x, 10.0, epsilon = 1e-9);
        assert_relative_eq!(world.translation().y, 5.0, epsilon = 1e-9);
        assert_relative_eq!(world.yaw_deg(), 90.0, epsilon = 1e-9);
    }

    #[test]
    fn test_apply_vector_ignores_translation() {
        let p = Placement::planar(100.0, -3.0, 180.0);
        let v = p.apply_vector(&Vector3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(v.x, -1.0, epsilon = 1e-12);
        assert_relative_eq!(v.y, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_euler_order_is_x_then_y_then_z() {
        // Rotating +y by 90 deg about x gives +z, then 90 deg about z leaves +z alone.
        let p = Placement::from_euler_deg([0.0; 3], [90.0, 0.0, 90.0]);
        let v = p.apply_vector(&Vector3::new(0.0, 1.0, 0.0));
        assert_relative_eq!(v.z, 1.0, epsilon = 1e-12);
        // +x: about x unchanged, about z becomes +y
        let u = p.apply_vector(&Vector3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(u.y, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_mul_matches_compose() {
        let a = Placement::planar(1.0, 2.0, 30.0);
        let b = Placement::from_euler_deg([3.0, 0.0, 1.0], [0.0, 45.0, 0.0]);
        assert!((a * b).approx_eq(&compose(&a, &b), 1e-12));
    }
}
