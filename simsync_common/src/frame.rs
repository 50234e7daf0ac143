//! Frame math: quaternion composition, minimal rotations between vectors and
//! world/body velocity transforms. Stateless; every function works on the
//! plain array types used across the crate.

use crate::types::{Vec3, XyzwQuat};
use rapier3d::na::{Quaternion, UnitQuaternion, Vector3};

/// Canonical arrow axis (arrow meshes point along +z)
pub const UP: Vec3 = [0.0, 0.0, 1.0];
/// Negated canonical arrow axis
pub const DOWN: Vec3 = [0.0, 0.0, -1.0];

const PARALLEL_EPS: f32 = 1.0e-6;

/// Convert an engine-order quaternion into a nalgebra unit quaternion
pub fn to_unit(q: XyzwQuat) -> UnitQuaternion<f32> {
    let [x, y, z, w] = q.0;
    UnitQuaternion::from_quaternion(Quaternion::new(w, x, y, z))
}

/// Convert a nalgebra unit quaternion into engine order
pub fn from_unit(q: &UnitQuaternion<f32>) -> XyzwQuat {
    XyzwQuat::new(q.i, q.j, q.k, q.w)
}

/// Hamilton product `a ⊗ b`: the rotation `b` followed by `a`.
pub fn quat_mul(a: XyzwQuat, b: XyzwQuat) -> XyzwQuat {
    let [ax, ay, az, aw] = a.0;
    let [bx, by, bz, bw] = b.0;
    XyzwQuat::new(
        aw * bx + ax * bw + ay * bz - az * by,
        aw * by - ax * bz + ay * bw + az * bx,
        aw * bz + ax * by - ay * bx + az * bw,
        aw * bw - ax * bx - ay * by - az * bz,
    )
}

/// Orientation of something expressed in a local frame, once that frame is
/// placed at `frame_in_world`.
pub fn compose_in_frame(local: XyzwQuat, frame_in_world: XyzwQuat) -> XyzwQuat {
    quat_mul(frame_in_world, local)
}

/// Shortest rotation taking the direction of `from` onto the direction of `to`.
///
/// Parallel inputs and zero-length inputs give the identity. Anti-parallel
/// inputs give a half turn about `from × e`, where `e` is the world basis vector
/// least aligned with `from` (ties resolved x, then y, then z).
pub fn rotation_between(from: Vec3, to: Vec3) -> XyzwQuat {
    let a = Vector3::from(from);
    let b = Vector3::from(to);
    let (na, nb) = (a.norm(), b.norm());
    if na < PARALLEL_EPS || nb < PARALLEL_EPS {
        return XyzwQuat::IDENTITY;
    }
    let a = a / na;
    let b = b / nb;
    let d = a.dot(&b);

    if d >= 1.0 - PARALLEL_EPS {
        return XyzwQuat::IDENTITY;
    }
    if d <= -1.0 + PARALLEL_EPS {
        let axis = a.cross(&least_aligned_basis(&a)).normalize();
        // half turn: w = cos(pi/2) = 0
        return XyzwQuat::new(axis.x, axis.y, axis.z, 0.0);
    }

    let c = a.cross(&b);
    let q = Quaternion::new(1.0 + d, c.x, c.y, c.z);
    from_unit(&UnitQuaternion::from_quaternion(q))
}

fn least_aligned_basis(v: &Vector3<f32>) -> Vector3<f32> {
    let (ax, ay, az) = (v.x.abs(), v.y.abs(), v.z.abs());
    if ax <= ay && ax <= az {
        Vector3::x()
    } else if ay <= az {
        Vector3::y()
    } else {
        Vector3::z()
    }
}

/// Express a world-frame vector in the body frame of `orientation`
/// (multiplication by the transposed rotation matrix).
pub fn world_to_body(orientation: XyzwQuat, v: Vec3) -> Vec3 {
    let r = to_unit(orientation).to_rotation_matrix();
    let out = r.matrix().transpose() * Vector3::from(v);
    [out.x, out.y, out.z]
}

/// Express a body-frame vector in the world frame.
pub fn body_to_world(orientation: XyzwQuat, v: Vec3) -> Vec3 {
    let r = to_unit(orientation).to_rotation_matrix();
    let out = r.matrix() * Vector3::from(v);
    [out.x, out.y, out.z]
}

/// Orientation from roll (x), pitch (y) and yaw (z) angles in radians
pub fn from_euler(roll: f32, pitch: f32, yaw: f32) -> XyzwQuat {
    from_unit(&UnitQuaternion::from_euler_angles(roll, pitch, yaw))
}

/// Roll, pitch and yaw of an orientation
pub fn to_euler(orientation: XyzwQuat) -> Vec3 {
    let (r, p, y) = to_unit(orientation).euler_angles();
    [r, p, y]
}

/// Euclidean norm of a plain vector
pub fn norm(v: Vec3) -> f32 {
    Vector3::from(v).norm()
}
