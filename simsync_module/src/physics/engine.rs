//! The physics-engine collaborator interface.
//!
//! Everything the core needs from a rigid-body engine goes through
//! [`PhysicsEngine`]; contact resolution, constraint solving and integration
//! stay behind it.

use crate::physics::description::BodyDescription;
use serde::{Deserialize, Serialize};
use simsync_common::{BodyHandle, JointIndex, Rgb, SimError, Vec3, XyzwQuat};

/// Position and orientation of a body's base in world coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vec3,
    pub orientation: XyzwQuat,
}

impl Pose {
    pub const fn new(position: Vec3, orientation: XyzwQuat) -> Self {
        Pose { position, orientation }
    }

    pub const fn at(position: Vec3) -> Self {
        Pose { position, orientation: XyzwQuat::IDENTITY }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum JointKind {
    /// Rotational with position limits in radians
    Revolute { lower: f32, upper: f32 },
    /// Rotational without limits
    Continuous,
    Prismatic,
    Fixed,
}

impl JointKind {
    pub fn is_rotational(&self) -> bool {
        matches!(self, JointKind::Revolute { .. } | JointKind::Continuous)
    }
}

/// One entry of an engine introspection pass
#[derive(Debug, Clone, PartialEq)]
pub struct JointInfo {
    pub index: JointIndex,
    pub name: String,
    /// Name of the link this joint moves
    pub child_link: String,
    pub kind: JointKind,
    /// Joint axis in the child link frame
    pub axis: Vec3,
}

/// Full joint/link topology of a loaded body
#[derive(Debug, Clone, PartialEq)]
pub struct BodyTopology {
    /// Name of the root link when the body has one without a parent joint
    pub root_link: Option<String>,
    pub joints: Vec<JointInfo>,
}

/// Generalized state of one joint as reported after the last step
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct JointState {
    pub position: f32,
    pub velocity: f32,
    /// Zero unless the joint's force/torque sensor is enabled
    pub reaction_force: Vec3,
    /// Zero unless the joint's force/torque sensor is enabled
    pub reaction_torque: Vec3,
    /// Actuation torque (or force, for prismatic joints) applied in the last step
    pub applied_torque: f32,
}

/// World-frame state of a link
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LinkState {
    /// Center of mass position
    pub com_position: Vec3,
    /// Origin of the link frame
    pub frame_position: Vec3,
    pub orientation: XyzwQuat,
}

/// Linear and angular velocity of a base, in world coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Velocity {
    pub linear: Vec3,
    pub angular: Vec3,
}

/// Actuation mode of a joint
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum JointControl {
    /// Drive towards a target velocity using at most `max_force`
    Velocity { target: f32, max_force: f32 },
    /// Drive towards a target position using at most `max_force`
    Position { target: f32, max_force: f32 },
    /// Apply exactly this torque (or force) every step
    Torque(f32),
}

/// Contact parameters; `None` stiffness/damping keep the engine default
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ContactParams {
    pub restitution: f32,
    pub stiffness: Option<f32>,
    pub damping: Option<f32>,
}

/// Partial update of per-link dynamics; `None` fields are left untouched
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DynamicsPatch {
    pub mass: Option<f32>,
    pub lateral_friction: Option<f32>,
    pub spinning_friction: Option<f32>,
    pub rolling_friction: Option<f32>,
    pub contact: Option<ContactParams>,
    pub linear_damping: Option<f32>,
    pub angular_damping: Option<f32>,
    pub joint_damping: Option<f32>,
}

/// Current dynamics of one link
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DynamicsInfo {
    pub mass: f32,
    pub lateral_friction: f32,
    pub restitution: f32,
    pub linear_damping: f32,
    pub angular_damping: f32,
    pub joint_damping: f32,
}

/// Frame in which an external load is expressed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoadFrame {
    World,
    /// The frame of the link the load is applied to
    Link,
}

/// Visual geometry attached to one link
#[derive(Debug, Clone, PartialEq)]
pub struct VisualShape {
    pub link: JointIndex,
    pub link_name: String,
    pub mesh: String,
    pub scale: Vec3,
    pub color: Rgb,
    pub opacity: f32,
}

/// Capability set consumed from the rigid-body engine.
///
/// Index arguments use [`simsync_common::BASE_INDEX`] for the root link.
/// Calls naming a body or index the engine does not know are no-ops (setters)
/// or return `None` (getters).
pub trait PhysicsEngine {
    /// Load a body description with its base at `pose`
    fn load_body(&mut self, desc: &BodyDescription, pose: Pose, fixed_base: bool) -> Result<BodyHandle, SimError>;
    fn topology(&self, body: BodyHandle) -> Option<BodyTopology>;
    fn visual_shapes(&self, body: BodyHandle) -> Vec<VisualShape>;

    fn joint_state(&self, body: BodyHandle, joint: JointIndex) -> Option<JointState>;
    fn reset_joint_state(&mut self, body: BodyHandle, joint: JointIndex, position: f32, velocity: f32);
    fn set_joint_control(&mut self, body: BodyHandle, joint: JointIndex, control: JointControl);
    fn enable_joint_sensor(&mut self, body: BodyHandle, joint: JointIndex, enabled: bool);

    fn change_dynamics(&mut self, body: BodyHandle, link: JointIndex, patch: &DynamicsPatch);
    fn dynamics_info(&self, body: BodyHandle, link: JointIndex) -> Option<DynamicsInfo>;

    fn base_pose(&self, body: BodyHandle) -> Option<Pose>;
    fn base_velocity(&self, body: BodyHandle) -> Option<Velocity>;
    fn link_state(&self, body: BodyHandle, link: JointIndex) -> Option<LinkState>;
    fn reset_base_pose(&mut self, body: BodyHandle, pose: Pose);
    fn reset_base_velocity(&mut self, body: BodyHandle, velocity: Velocity);
    fn set_fixed_base(&mut self, body: BodyHandle, fixed: bool);

    /// Apply `force` at `point` for the next step only
    fn apply_external_force(&mut self, body: BodyHandle, link: JointIndex, force: Vec3, point: Vec3, frame: LoadFrame);
    /// Apply `torque` for the next step only
    fn apply_external_torque(&mut self, body: BodyHandle, link: JointIndex, torque: Vec3, frame: LoadFrame);

    /// Advance by exactly one fixed step
    fn step(&mut self);
    fn set_time_step(&mut self, dt: f32);
    fn set_gravity(&mut self, gravity: Vec3);
    fn gravity(&self) -> Vec3;
}
