//! Value types and pure math shared by the simulation core and its front ends.

pub mod types;
pub mod frame;
pub mod color;
pub mod shape;
pub mod collision;
pub mod error;

pub use types::{BodyHandle, JointIndex, Rgb, Vec3, WxyzQuat, XyzwQuat, BASE_INDEX, BASE_JOINT_NAME};
pub use error::SimError;
