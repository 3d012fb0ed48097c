/*!
Core math aliases and transform types shared by the simulation modules.

This module intentionally contains no algorithms. It defines the data types
and small vector helpers exchanged between:
- collider (shape descriptors and rapier collider construction)
- trajectory (projectile prediction)
- launch (aim/power/spin shot math)
- the `game` crate (adapter, contact tracking, shot state machine)
*/

use nalgebra as na;

/// Common math aliases for clarity and consistency.
pub type Vec3 = na::Vector3<f32>;
pub type Quat = na::UnitQuaternion<f32>;
pub type Iso = na::Isometry3<f32>;

/// A rigid transform (isometry) in world space.
#[derive(Clone, Copy, Debug)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
}

impl Transform {
    #[inline]
    pub fn new(translation: Vec3, rotation: Quat) -> Self {
        Self {
            translation,
            rotation,
        }
    }

    /// Identity rotation at the given world position.
    #[inline]
    pub fn at(translation: Vec3) -> Self {
        Self {
            translation,
            rotation: Quat::identity(),
        }
    }

    /// Convert to nalgebra `Isometry3` for use with rapier body/collider poses.
    #[inline]
    pub fn iso(&self) -> Iso {
        Iso::from_parts(
            na::Translation3::new(self.translation.x, self.translation.y, self.translation.z),
            self.rotation,
        )
    }
}

/// World up axis (+Y).
#[inline]
pub fn up() -> Vec3 {
    Vec3::y()
}

/// Copy of `v` with the vertical component zeroed.
#[inline]
pub fn horizontal(v: &Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}

/// Planar (XZ) speed of a velocity vector (meters per second).
#[inline]
pub fn horizontal_speed(v: &Vec3) -> f32 {
    (v.x * v.x + v.z * v.z).sqrt()
}

/// Rotate `v` about the world up axis (+Y) by `radians`.
///
/// Positive angles rotate counter-clockwise when viewed from above
/// (right-handed, +Y up).
#[inline]
pub fn rotate_about_y(v: &Vec3, radians: f32) -> Vec3 {
    na::UnitQuaternion::from_axis_angle(&na::Vector3::y_axis(), radians) * v
}
