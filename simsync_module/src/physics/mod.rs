use crate::constants::{POSITION_MOTOR_DAMPING, POSITION_MOTOR_STIFFNESS, VELOCITY_MOTOR_GAIN};
use crate::physics::rapier_common::*;
use rapier3d::prelude::*;
use simsync_common::{BodyHandle, JointIndex, SimError, Vec3, BASE_INDEX};

pub mod description;
pub mod engine;
pub mod physics_tick;
pub mod rapier_common;
pub mod spawn;
#[cfg(test)]
pub mod tests;

pub use description::{BodyDescription, JointDescription, LinkDescription, VisualDescription};
pub use engine::*;

/// Rapier world state
pub struct PhysicsContext {
    pub pipeline: PhysicsPipeline,
    pub gravity: Vector<Real>,
    pub integration_parameters: IntegrationParameters,
    pub islands: IslandManager,
    pub broad_phase: BroadPhaseMultiSap,
    pub narrow_phase: NarrowPhase,
    pub bodies: RigidBodySet,
    pub colliders: ColliderSet,
    pub impulse_joints: ImpulseJointSet,
    pub multibody_joints: MultibodyJointSet,
    pub ccd_solver: CCDSolver,
}

impl PhysicsContext {
    pub fn new(gravity: Vector<Real>) -> Self {
        PhysicsContext {
            pipeline: PhysicsPipeline::new(),
            gravity,
            integration_parameters: IntegrationParameters::default(),
            islands: IslandManager::new(),
            broad_phase: BroadPhaseMultiSap::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
        }
    }
}

/// One link of a loaded articulation: a rigid body with a single collider
pub(crate) struct LinkSlot {
    pub name: String,
    pub body: RigidBodyHandle,
    pub collider: ColliderHandle,
    pub visual: Option<VisualDescription>,
}

pub(crate) struct JointSlot {
    pub name: String,
    pub kind: JointKind,
    /// Index of the parent link
    pub parent: JointIndex,
    pub child: LinkSlot,
    pub handle: ImpulseJointHandle,
    /// Unit axis in the joint (and child link) frame
    pub axis: Vector<Real>,
    /// Joint frame in the parent link frame
    pub origin: Isometry<Real>,
    pub control: JointControl,
    pub damping: Real,
    pub sensor: bool,
}

impl JointSlot {
    fn motor_axis(&self) -> JointAxis {
        match self.kind {
            JointKind::Prismatic => JointAxis::LinX,
            _ => JointAxis::AngX,
        }
    }

    fn motor_axis_index(&self) -> usize {
        match self.kind {
            JointKind::Prismatic => 0,
            _ => 3,
        }
    }
}

pub(crate) struct Articulation {
    pub name: String,
    pub base: LinkSlot,
    pub joints: Vec<JointSlot>,
}

impl Articulation {
    pub fn link(&self, index: JointIndex) -> Option<&LinkSlot> {
        if index == BASE_INDEX {
            Some(&self.base)
        } else {
            self.joint(index).map(|j| &j.child)
        }
    }

    pub fn joint(&self, index: JointIndex) -> Option<&JointSlot> {
        usize::try_from(index).ok().and_then(|i| self.joints.get(i))
    }

    pub fn joint_mut(&mut self, index: JointIndex) -> Option<&mut JointSlot> {
        usize::try_from(index).ok().and_then(move |i| self.joints.get_mut(i))
    }

    /// Rigid bodies of every link, base first
    pub fn link_bodies(&self) -> impl Iterator<Item = RigidBodyHandle> + '_ {
        std::iter::once(self.base.body).chain(self.joints.iter().map(|j| j.child.body))
    }

    /// Rigid bodies of the link moved by `joint` and of everything below it
    pub fn subtree_bodies(&self, joint: JointIndex) -> Vec<RigidBodyHandle> {
        let mut out = Vec::new();
        let mut frontier = vec![joint];
        while let Some(link) = frontier.pop() {
            if let Some(slot) = self.link(link) {
                out.push(slot.body);
            }
            frontier.extend(
                self.joints
                    .iter()
                    .enumerate()
                    .filter(|(_, j)| j.parent == link)
                    .map(|(i, _)| i as JointIndex),
            );
        }
        out
    }
}

/// A pending one-shot load, applied during the next step only
pub(crate) enum PendingLoad {
    Force { body: RigidBodyHandle, force: Vector<Real>, point: Point<Real> },
    Torque { body: RigidBodyHandle, torque: Vector<Real> },
}

/// [`PhysicsEngine`] backed by rapier3d impulse joints
pub struct RapierEngine {
    pub(crate) ctx: PhysicsContext,
    pub(crate) articulations: Vec<Articulation>,
    pub(crate) pending: Vec<PendingLoad>,
    pub(crate) dt: Real,
    pub(crate) sub_steps: usize,
}

impl RapierEngine {
    pub fn new(gravity: Vec3, dt: Real, sub_steps: usize) -> Self {
        RapierEngine {
            ctx: PhysicsContext::new(to_vector(gravity)),
            articulations: Vec::new(),
            pending: Vec::new(),
            dt,
            sub_steps: sub_steps.max(1),
        }
    }

    /// Direct access to the rapier world
    pub fn context(&self) -> &PhysicsContext {
        &self.ctx
    }

    /// Name the body was loaded under
    pub fn body_name(&self, body: BodyHandle) -> Option<&str> {
        self.articulation(body).map(|a| a.name.as_str())
    }

    pub(crate) fn articulation(&self, body: BodyHandle) -> Option<&Articulation> {
        self.articulations.get(body.0 as usize)
    }

    fn rigid_body(&self, body: BodyHandle, link: JointIndex) -> Option<&RigidBody> {
        let slot = self.articulation(body)?.link(link)?;
        self.ctx.bodies.get(slot.body)
    }

    /// Time span of one solver iteration. Joint impulses are stored per
    /// iteration, so forces are impulses over this, not over the fixed step.
    pub(crate) fn solver_dt(&self) -> Real {
        let iterations = self.ctx.integration_parameters.num_solver_iterations.get() as Real;
        self.dt / self.sub_steps as Real / iterations
    }

    /// Joint position and velocity from the relative motion of the joined links
    fn joint_coordinates(&self, art: &Articulation, joint: &JointSlot) -> Option<(Real, Real)> {
        let parent = self.ctx.bodies.get(art.link(joint.parent)?.body)?;
        let child = self.ctx.bodies.get(joint.child.body)?;
        let joint_frame = parent.position() * joint.origin;
        match joint.kind {
            JointKind::Revolute { .. } | JointKind::Continuous => {
                let rel = joint_frame.rotation.inverse() * child.rotation();
                let position = rel.scaled_axis().dot(&joint.axis);
                let axis_world = child.rotation() * joint.axis;
                let velocity = (child.angvel() - parent.angvel()).dot(&axis_world);
                Some((position, velocity))
            }
            JointKind::Prismatic => {
                let local = joint_frame.inverse_transform_point(&Point::from(*child.translation()));
                let position = local.coords.dot(&joint.axis);
                let axis_world = joint_frame.rotation * joint.axis;
                let velocity = (child.linvel() - parent.linvel()).dot(&axis_world);
                Some((position, velocity))
            }
            JointKind::Fixed => Some((0.0, 0.0)),
        }
    }

    /// Push a joint's control mode and damping into its rapier motor
    pub(crate) fn sync_motor(&mut self, body: BodyHandle, joint: JointIndex) {
        let Some(slot) = self.articulation(body).and_then(|a| a.joint(joint)) else {
            return;
        };
        if slot.kind == JointKind::Fixed {
            return;
        }
        let (axis, control, damping, handle) = (slot.motor_axis(), slot.control, slot.damping, slot.handle);
        let Some(rj) = self.ctx.impulse_joints.get_mut(handle, true) else {
            return;
        };
        match control {
            JointControl::Velocity { target, max_force } => {
                rj.data.set_motor_velocity(axis, target, VELOCITY_MOTOR_GAIN);
                rj.data.set_motor_max_force(axis, max_force);
            }
            JointControl::Position { target, max_force } => {
                rj.data.set_motor_position(axis, target, POSITION_MOTOR_STIFFNESS, POSITION_MOTOR_DAMPING);
                rj.data.set_motor_max_force(axis, max_force);
            }
            JointControl::Torque(_) if damping > 0.0 => {
                // viscous joint friction: a zero-velocity motor with the damping as gain
                rj.data.set_motor_velocity(axis, 0.0, damping);
                rj.data.set_motor_max_force(axis, Real::MAX);
            }
            JointControl::Torque(_) => {
                rj.data.set_motor_velocity(axis, 0.0, 0.0);
                rj.data.set_motor_max_force(axis, 0.0);
            }
        }
    }

    /// Move every body in `bodies` by the rigid transform `delta`
    fn transform_bodies(&mut self, bodies: &[RigidBodyHandle], delta: &Isometry<Real>) {
        for handle in bodies {
            if let Some(rb) = self.ctx.bodies.get_mut(*handle) {
                let moved = delta * rb.position();
                rb.set_position(moved, true);
            }
        }
    }

    /// Give every body in `bodies` the rigid-motion velocity of a frame at
    /// `origin` moving with `linear` and `angular`
    fn set_rigid_velocity(&mut self, bodies: &[RigidBodyHandle], origin: Point<Real>, linear: Vector<Real>, angular: Vector<Real>) {
        for handle in bodies {
            if let Some(rb) = self.ctx.bodies.get_mut(*handle) {
                let lever = *rb.center_of_mass() - origin;
                rb.set_linvel(linear + angular.cross(&lever), true);
                rb.set_angvel(angular, true);
            }
        }
    }
}

impl PhysicsEngine for RapierEngine {
    fn load_body(&mut self, desc: &BodyDescription, pose: Pose, fixed_base: bool) -> Result<BodyHandle, SimError> {
        self.spawn_articulation(desc, pose, fixed_base)
    }

    fn topology(&self, body: BodyHandle) -> Option<BodyTopology> {
        let art = self.articulation(body)?;
        let joints = art
            .joints
            .iter()
            .enumerate()
            .map(|(i, j)| JointInfo {
                index: i as JointIndex,
                name: j.name.clone(),
                child_link: j.child.name.clone(),
                kind: j.kind,
                axis: from_vector(&j.axis),
            })
            .collect();
        Some(BodyTopology { root_link: Some(art.base.name.clone()), joints })
    }

    fn visual_shapes(&self, body: BodyHandle) -> Vec<VisualShape> {
        let Some(art) = self.articulation(body) else {
            return Vec::new();
        };
        std::iter::once((BASE_INDEX, &art.base))
            .chain(art.joints.iter().enumerate().map(|(i, j)| (i as JointIndex, &j.child)))
            .filter_map(|(index, slot)| {
                slot.visual.as_ref().map(|v| VisualShape {
                    link: index,
                    link_name: slot.name.clone(),
                    mesh: v.mesh.clone(),
                    scale: v.scale,
                    color: v.color,
                    opacity: v.opacity,
                })
            })
            .collect()
    }

    fn joint_state(&self, body: BodyHandle, joint: JointIndex) -> Option<JointState> {
        let art = self.articulation(body)?;
        let slot = art.joint(joint)?;
        let (position, velocity) = self.joint_coordinates(art, slot)?;
        let rj = self.ctx.impulse_joints.get(slot.handle)?;
        let impulses = rj.impulses;
        let solver_dt = self.solver_dt();
        let to_force = |i: usize| impulses[i] / solver_dt;
        // locked axes write back to `impulses`, motors keep their own impulse
        let applied_torque = match slot.control {
            JointControl::Torque(t) => t,
            _ => rj.data.motors[slot.motor_axis_index()].impulse / solver_dt,
        };
        let (reaction_force, reaction_torque) = if slot.sensor {
            ([to_force(0), to_force(1), to_force(2)], [to_force(3), to_force(4), to_force(5)])
        } else {
            ([0.0; 3], [0.0; 3])
        };
        Some(JointState { position, velocity, reaction_force, reaction_torque, applied_torque })
    }

    fn reset_joint_state(&mut self, body: BodyHandle, joint: JointIndex, position: f32, velocity: f32) {
        let Some(art) = self.articulation(body) else { return };
        let Some(slot) = art.joint(joint) else { return };
        let Some(parent_slot) = art.link(slot.parent) else { return };
        let (Some(parent), Some(child)) = (self.ctx.bodies.get(parent_slot.body), self.ctx.bodies.get(slot.child.body)) else {
            return;
        };

        let kind = slot.kind;
        let motion = match kind {
            JointKind::Revolute { .. } | JointKind::Continuous => Isometry::new(Vector::zeros(), slot.axis * position),
            JointKind::Prismatic => Isometry::new(slot.axis * position, Vector::zeros()),
            JointKind::Fixed => Isometry::identity(),
        };
        let child_new = parent.position() * slot.origin * motion;
        let delta = child_new * child.position().inverse();
        let axis_world = child_new.rotation * slot.axis;
        let (parent_com, parent_lin, parent_ang) = (*parent.center_of_mass(), *parent.linvel(), *parent.angvel());
        let subtree = art.subtree_bodies(joint);

        self.transform_bodies(&subtree, &delta);
        let (linear, angular) = match kind {
            JointKind::Prismatic => (parent_lin + axis_world * velocity, parent_ang),
            JointKind::Fixed => (parent_lin, parent_ang),
            _ => (parent_lin, parent_ang + axis_world * velocity),
        };
        self.set_rigid_velocity(&subtree, parent_com, linear, angular);
    }

    fn set_joint_control(&mut self, body: BodyHandle, joint: JointIndex, control: JointControl) {
        let Some(slot) = self.articulations.get_mut(body.0 as usize).and_then(|a| a.joint_mut(joint)) else {
            return;
        };
        slot.control = control;
        self.sync_motor(body, joint);
    }

    fn enable_joint_sensor(&mut self, body: BodyHandle, joint: JointIndex, enabled: bool) {
        if let Some(slot) = self.articulations.get_mut(body.0 as usize).and_then(|a| a.joint_mut(joint)) {
            slot.sensor = enabled;
        }
    }

    fn change_dynamics(&mut self, body: BodyHandle, link: JointIndex, patch: &DynamicsPatch) {
        let Some(art) = self.articulations.get_mut(body.0 as usize) else { return };
        let Some(slot) = art.link(link) else { return };
        let (rb_handle, collider_handle) = (slot.body, slot.collider);

        if let Some(collider) = self.ctx.colliders.get_mut(collider_handle) {
            if let Some(mass) = patch.mass {
                collider.set_mass(mass);
            }
            if let Some(friction) = patch.lateral_friction {
                collider.set_friction(friction);
            }
            if let Some(contact) = patch.contact {
                collider.set_restitution(contact.restitution);
                if contact.stiffness.is_some() || contact.damping.is_some() {
                    log::trace!("contact stiffness/damping are solver-wide in rapier; keeping defaults");
                }
            }
        }
        if patch.spinning_friction.is_some_and(|f| f != 0.0) || patch.rolling_friction.is_some_and(|f| f != 0.0) {
            log::trace!("spinning/rolling friction are not modelled by rapier colliders");
        }
        if let Some(rb) = self.ctx.bodies.get_mut(rb_handle) {
            if let Some(d) = patch.linear_damping {
                rb.set_linear_damping(d);
            }
            if let Some(d) = patch.angular_damping {
                rb.set_angular_damping(d);
            }
        }
        if let Some(damping) = patch.joint_damping {
            let Some(joint) = art.joint_mut(link) else { return };
            joint.damping = damping;
            self.sync_motor(body, link);
        }
    }

    fn dynamics_info(&self, body: BodyHandle, link: JointIndex) -> Option<DynamicsInfo> {
        let art = self.articulation(body)?;
        let slot = art.link(link)?;
        let collider = self.ctx.colliders.get(slot.collider)?;
        let rb = self.ctx.bodies.get(slot.body)?;
        Some(DynamicsInfo {
            mass: collider.mass(),
            lateral_friction: collider.friction(),
            restitution: collider.restitution(),
            linear_damping: rb.linear_damping(),
            angular_damping: rb.angular_damping(),
            joint_damping: art.joint(link).map_or(0.0, |j| j.damping),
        })
    }

    fn base_pose(&self, body: BodyHandle) -> Option<Pose> {
        self.rigid_body(body, BASE_INDEX).map(|rb| from_isometry(rb.position()))
    }

    fn base_velocity(&self, body: BodyHandle) -> Option<Velocity> {
        self.rigid_body(body, BASE_INDEX).map(|rb| Velocity {
            linear: from_vector(rb.linvel()),
            angular: from_vector(rb.angvel()),
        })
    }

    fn link_state(&self, body: BodyHandle, link: JointIndex) -> Option<LinkState> {
        self.rigid_body(body, link).map(|rb| LinkState {
            com_position: from_point(rb.center_of_mass()),
            frame_position: from_vector(rb.translation()),
            orientation: from_rotation(rb.rotation()),
        })
    }

    fn reset_base_pose(&mut self, body: BodyHandle, pose: Pose) {
        let Some(art) = self.articulation(body) else { return };
        let Some(base) = self.ctx.bodies.get(art.base.body) else { return };
        let delta = to_isometry(&pose) * base.position().inverse();
        let bodies: Vec<_> = art.link_bodies().collect();
        self.transform_bodies(&bodies, &delta);
    }

    fn reset_base_velocity(&mut self, body: BodyHandle, velocity: Velocity) {
        let Some(art) = self.articulation(body) else { return };
        let Some(base) = self.ctx.bodies.get(art.base.body) else { return };
        let origin = *base.center_of_mass();
        let bodies: Vec<_> = art.link_bodies().collect();
        self.set_rigid_velocity(&bodies, origin, to_vector(velocity.linear), to_vector(velocity.angular));
    }

    fn set_fixed_base(&mut self, body: BodyHandle, fixed: bool) {
        let Some(base) = self.articulation(body).map(|a| a.base.body) else { return };
        let kind = if fixed { RigidBodyType::Fixed } else { RigidBodyType::Dynamic };
        if let Some(rb) = self.ctx.bodies.get_mut(base) {
            if rb.body_type() != kind {
                rb.set_body_type(kind, true);
            }
        }
    }

    fn apply_external_force(&mut self, body: BodyHandle, link: JointIndex, force: Vec3, point: Vec3, frame: LoadFrame) {
        let Some(rb_handle) = self.articulation(body).and_then(|a| a.link(link)).map(|s| s.body) else {
            return;
        };
        let Some(rb) = self.ctx.bodies.get(rb_handle) else { return };
        let (force, point) = match frame {
            LoadFrame::World => (to_vector(force), to_point(point)),
            LoadFrame::Link => (rb.rotation() * to_vector(force), rb.position() * to_point(point)),
        };
        self.pending.push(PendingLoad::Force { body: rb_handle, force, point });
    }

    fn apply_external_torque(&mut self, body: BodyHandle, link: JointIndex, torque: Vec3, frame: LoadFrame) {
        let Some(rb_handle) = self.articulation(body).and_then(|a| a.link(link)).map(|s| s.body) else {
            return;
        };
        let Some(rb) = self.ctx.bodies.get(rb_handle) else { return };
        let torque = match frame {
            LoadFrame::World => to_vector(torque),
            LoadFrame::Link => rb.rotation() * to_vector(torque),
        };
        self.pending.push(PendingLoad::Torque { body: rb_handle, torque });
    }

    fn step(&mut self) {
        self.tick();
    }

    fn set_time_step(&mut self, dt: f32) {
        self.dt = dt;
    }

    fn set_gravity(&mut self, gravity: Vec3) {
        self.ctx.gravity = to_vector(gravity);
    }

    fn gravity(&self) -> Vec3 {
        from_vector(&self.ctx.gravity)
    }
}
