use crate::annotations::{AnnotationKey, ArrowDirection, ArrowRequest};
use crate::constants::{DEFAULT_MAX_FORCE, TORQUE_ARROW_SCALE};
use crate::controller::Simulation;
use crate::physics::{ContactParams, DynamicsPatch, JointControl, JointState, PhysicsEngine};
use simsync_common::color::Palette;
use simsync_common::{frame, BodyHandle, JointIndex, Vec3, BASE_INDEX};

/// Drawing options of [`Simulation::set_joint_torque`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TorqueOptions {
    /// Show a torque arrow with this length per unit torque; `None` hides it
    pub arrow: Option<f32>,
    /// Arrow shift along the joint axis
    pub arrow_offset: f32,
    /// Color the child link by torque within `(min, max)`
    pub color: Option<(f32, f32)>,
}

impl Default for TorqueOptions {
    fn default() -> Self {
        TorqueOptions { arrow: None, arrow_offset: 0.0, color: None }
    }
}

impl TorqueOptions {
    pub fn with_arrow() -> Self {
        TorqueOptions { arrow: Some(TORQUE_ARROW_SCALE), ..Default::default() }
    }
}

impl<E: PhysicsEngine> Simulation<E> {
    /// Drive a joint to `position` under position control
    pub fn set_joint_position(&mut self, body: BodyHandle, joint: &str, position: f32) {
        let Some(index) = self.actuated_joint(body, joint) else { return };
        let control = JointControl::Position { target: position, max_force: DEFAULT_MAX_FORCE };
        self.engine.set_joint_control(body, index, control);
    }

    /// Drive a joint at `velocity` under velocity control
    pub fn set_joint_velocity(&mut self, body: BodyHandle, joint: &str, velocity: f32) {
        let Some(index) = self.actuated_joint(body, joint) else { return };
        let control = JointControl::Velocity { target: velocity, max_force: DEFAULT_MAX_FORCE };
        self.engine.set_joint_control(body, index, control);
    }

    /// Apply `torque` to a joint on every step until changed
    pub fn set_joint_torque(&mut self, body: BodyHandle, joint: &str, torque: f32, options: &TorqueOptions) {
        let Some(index) = self.actuated_joint(body, joint) else { return };
        self.engine.set_joint_control(body, index, JointControl::Torque(torque));
        self.update_torque_arrow(body, index, torque, options);
        if let Some((min, max)) = options.color {
            self.color_link(body, index, torque, min, max, Palette::Diverging);
        }
    }

    pub fn set_joint_force_sensor(&mut self, body: BodyHandle, joint: &str, enabled: bool) {
        let Some(index) = self.actuated_joint(body, joint) else { return };
        self.engine.enable_joint_sensor(body, index, enabled);
    }

    /// Linear and angular damping of the joint's child link
    pub fn set_joint_lin_ang_damp(&mut self, body: BodyHandle, joint: &str, linear: f32, angular: f32) {
        let patch = DynamicsPatch { linear_damping: Some(linear), angular_damping: Some(angular), ..Default::default() };
        self.patch_joint(body, joint, &patch);
    }

    pub fn set_joint_damping(&mut self, body: BodyHandle, joint: &str, damping: f32) {
        let patch = DynamicsPatch { joint_damping: Some(damping), ..Default::default() };
        self.patch_joint(body, joint, &patch);
    }

    pub fn set_joint_friction_params(&mut self, body: BodyHandle, joint: &str, lateral: f32, spinning: f32, rolling: f32) {
        let patch = DynamicsPatch {
            lateral_friction: Some(lateral),
            spinning_friction: Some(spinning),
            rolling_friction: Some(rolling),
            ..Default::default()
        };
        self.patch_joint(body, joint, &patch);
    }

    /// Contact parameters of the joint's child link; `None` keeps the engine
    /// default stiffness or damping
    pub fn set_joint_contact_params(
        &mut self,
        body: BodyHandle,
        joint: &str,
        restitution: f32,
        stiffness: Option<f32>,
        damping: Option<f32>,
    ) {
        let patch = DynamicsPatch {
            contact: Some(ContactParams { restitution, stiffness, damping }),
            ..Default::default()
        };
        self.patch_joint(body, joint, &patch);
    }

    pub fn get_joint_state(&self, body: BodyHandle, joint: &str) -> Option<JointState> {
        let index = self.joint_of(body, joint)?;
        self.engine.joint_state(body, index)
    }

    /// Joint axis in its child link frame
    pub fn get_joint_axis(&self, body: BodyHandle, joint: &str) -> Option<Vec3> {
        let index = self.joint_of(body, joint)?;
        self.body(body)?.joint_axis(index)
    }

    /// Non-base joint index, or `None` (logged) for unknown names and the base
    fn actuated_joint(&self, body: BodyHandle, joint: &str) -> Option<JointIndex> {
        let index = self.joint_of(body, joint)?;
        if index == BASE_INDEX {
            log::debug!("Refusing to actuate the base joint of body {}", body);
            return None;
        }
        Some(index)
    }

    fn patch_joint(&mut self, body: BodyHandle, joint: &str, patch: &DynamicsPatch) {
        let Some(index) = self.joint_of(body, joint) else { return };
        self.engine.change_dynamics(body, index, patch);
    }

    fn update_torque_arrow(&mut self, body: BodyHandle, joint: JointIndex, torque: f32, options: &TorqueOptions) {
        if self.renderer.is_none() {
            return;
        }
        let Some(b) = self.body(body) else { return };
        let (Some(link), Some(axis)) = (b.child_link_of(joint), b.joint_axis(joint)) else {
            return;
        };
        let key = AnnotationKey::link(link);
        let Some(state) = self.engine.link_state(body, joint) else { return };

        let axis_world = frame::body_to_world(state.orientation, axis);
        let anchor = [
            state.frame_position[0] + axis_world[0] * options.arrow_offset,
            state.frame_position[1] + axis_world[1] * options.arrow_offset,
            state.frame_position[2] + axis_world[2] * options.arrow_offset,
        ];
        let request = ArrowRequest {
            direction: ArrowDirection::Signed { axis, value: torque },
            anchor,
            frame: state.orientation,
            scale: options.arrow.unwrap_or(TORQUE_ARROW_SCALE),
        };
        self.torque_arrows
            .request(self.renderer.as_deref_mut(), key, options.arrow.is_some(), &request);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotations::AnnotationState;
    use crate::physics::DynamicsInfo;
    use crate::tests::*;
    use approx::assert_abs_diff_eq;

    fn fake_joint(h: &Harness, index: usize) -> &FakeJoint {
        &h.sim.engine().bodies[h.body.0 as usize].joints[index]
    }

    #[test]
    fn position_and_velocity_use_full_force() {
        let mut h = harness();
        h.sim.set_joint_position(h.body, "shoulder", 0.7);
        h.sim.set_joint_velocity(h.body, "elbow", -2.0);
        assert_eq!(fake_joint(&h, 0).control, JointControl::Position { target: 0.7, max_force: 1000.0 });
        assert_eq!(fake_joint(&h, 1).control, JointControl::Velocity { target: -2.0, max_force: 1000.0 });
    }

    #[test]
    fn base_is_never_actuated() {
        let mut h = harness();
        h.sim.set_joint_torque(h.body, "base", 5.0, &TorqueOptions::with_arrow());
        h.sim.set_joint_velocity(h.body, "base", 5.0);
        assert!(h.sim.torque_arrows().is_empty());
        assert!(h.sim.engine().bodies[0].joints.iter().all(|j| j.control != JointControl::Torque(5.0)));
    }

    #[test]
    fn unknown_joint_is_a_silent_no_op() {
        let mut h = harness();
        let before: Vec<_> = h.sim.engine().bodies[0].joints.iter().map(|j| j.control).collect();
        h.sim.set_joint_torque(h.body, "wrist", 1.0, &TorqueOptions::with_arrow());
        h.sim.set_joint_position(h.body, "wrist", 1.0);
        h.sim.set_joint_damping(h.body, "wrist", 1.0);
        h.sim.set_joint_force_sensor(BodyHandle(42), "shoulder", false);
        let after: Vec<_> = h.sim.engine().bodies[0].joints.iter().map(|j| j.control).collect();
        assert_eq!(before, after);
        assert!(h.sim.get_joint_state(h.body, "wrist").is_none());
        assert!(h.sim.get_joint_axis(h.body, "wrist").is_none());
    }

    #[test]
    fn torque_arrow_tracks_show_flag() {
        let mut h = harness();
        let key = AnnotationKey::link("upper");
        h.sim.set_joint_torque(h.body, "shoulder", 1.0, &TorqueOptions::default());
        assert_eq!(h.sim.torque_arrows().state(&key), AnnotationState::Absent);

        h.sim.set_joint_torque(h.body, "shoulder", 2.0, &TorqueOptions::with_arrow());
        assert_eq!(h.sim.torque_arrows().state(&key), AnnotationState::Visible);
        let scale = h.sim.torque_arrows().record(&key).unwrap().transform.scale;
        assert_abs_diff_eq!(scale[0], 0.2, epsilon = 1e-6);

        h.sim.set_joint_torque(h.body, "shoulder", 2.0, &TorqueOptions::default());
        assert_eq!(h.sim.torque_arrows().state(&key), AnnotationState::Hidden);
    }

    #[test]
    fn torque_coloring_recolors_child_link() {
        let mut h = harness();
        let options = TorqueOptions { color: Some((-1.0, 1.0)), ..Default::default() };
        h.sim.set_joint_torque(h.body, "elbow", 1.0, &options);
        let log = h.render.borrow();
        let (_, name, material) = log.materials.last().unwrap();
        assert_eq!(name, "lower");
        assert_eq!(material.color, simsync_common::color::color_for(1.0, -1.0, 1.0, Palette::Diverging));
    }

    #[test]
    fn dynamics_setters_reach_the_child_link() {
        let mut h = harness();
        h.sim.set_joint_lin_ang_damp(h.body, "elbow", 0.1, 0.2);
        h.sim.set_joint_damping(h.body, "elbow", 0.3);
        h.sim.set_joint_friction_params(h.body, "elbow", 0.4, 0.0, 0.0);
        h.sim.set_joint_contact_params(h.body, "elbow", 0.9, None, None);
        let info: DynamicsInfo = fake_joint(&h, 1).dynamics;
        assert_eq!(info.linear_damping, 0.1);
        assert_eq!(info.angular_damping, 0.2);
        assert_eq!(info.joint_damping, 0.3);
        assert_eq!(info.lateral_friction, 0.4);
        assert_eq!(info.restitution, 0.9);
    }

    #[test]
    fn sensor_can_be_switched_off() {
        let mut h = harness();
        assert_ne!(h.sim.get_joint_state(h.body, "shoulder").unwrap().reaction_force, [0.0; 3]);
        h.sim.set_joint_force_sensor(h.body, "shoulder", false);
        assert_eq!(h.sim.get_joint_state(h.body, "shoulder").unwrap().reaction_force, [0.0; 3]);
    }

    #[test]
    fn joint_axis_is_reported() {
        let h = harness();
        assert_eq!(h.sim.get_joint_axis(h.body, "elbow"), Some([0.0, 1.0, 0.0]));
    }
}
