//! Conversions between the crate's plain array types and rapier/nalgebra types
use crate::physics::engine::Pose;
use rapier3d::na::{Translation3, UnitQuaternion};
use rapier3d::prelude::*;
use simsync_common::frame;
use simsync_common::{Vec3, XyzwQuat};

#[inline]
pub fn to_vector(v: Vec3) -> Vector<Real> {
    vector![v[0], v[1], v[2]]
}

#[inline]
pub fn to_point(v: Vec3) -> Point<Real> {
    point![v[0], v[1], v[2]]
}

#[inline]
pub fn from_vector(v: &Vector<Real>) -> Vec3 {
    [v.x, v.y, v.z]
}

#[inline]
pub fn from_point(p: &Point<Real>) -> Vec3 {
    [p.x, p.y, p.z]
}

#[inline]
pub fn to_rotation(q: XyzwQuat) -> UnitQuaternion<Real> {
    frame::to_unit(q)
}

#[inline]
pub fn from_rotation(q: &UnitQuaternion<Real>) -> XyzwQuat {
    frame::from_unit(q)
}

/// Rigid transform of a pose
pub fn to_isometry(pose: &Pose) -> Isometry<Real> {
    Isometry::from_parts(Translation3::from(to_vector(pose.position)), to_rotation(pose.orientation))
}

pub fn from_isometry(iso: &Isometry<Real>) -> Pose {
    Pose::new(from_vector(&iso.translation.vector), from_rotation(&iso.rotation))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn pose_survives_isometry_conversion() {
        let pose = Pose::new([1.0, -2.0, 0.5], frame::from_euler(0.1, 0.2, 0.3));
        let back = from_isometry(&to_isometry(&pose));
        for i in 0..3 {
            assert_abs_diff_eq!(back.position[i], pose.position[i], epsilon = 1e-6);
        }
        for i in 0..4 {
            assert_abs_diff_eq!(back.orientation.0[i], pose.orientation.0[i], epsilon = 1e-6);
        }
    }
}
