#![cfg(test)]

use crate::physics::*;
use approx::assert_abs_diff_eq;
use simsync_common::{BodyHandle, BASE_INDEX};

const DT: f32 = 0.01;

/// Fixed stand with one arm hinged about +y, hanging along -z
fn pendulum() -> BodyDescription {
    BodyDescription::new("pendulum", LinkDescription::new("stand", 10.0, "Box(0.1,0.1,0.1)").unwrap()).with_joint(
        JointDescription {
            name: "hinge".into(),
            kind: JointKind::Continuous,
            parent: "stand".into(),
            origin: Pose::at([0.0, 0.0, 0.0]),
            axis: [0.0, 1.0, 0.0],
            child: LinkDescription::new("arm", 1.0, "Sphere(0.1)").unwrap(),
        },
    )
}

fn zero_gravity_engine() -> (RapierEngine, BodyHandle) {
    let mut engine = RapierEngine::new([0.0, 0.0, 0.0], DT, 4);
    let body = engine.load_body(&pendulum(), Pose::at([0.0, 0.0, 1.0]), true).unwrap();
    (engine, body)
}

#[test]
fn topology_lists_joints_in_declaration_order() {
    let (engine, body) = zero_gravity_engine();
    let topology = engine.topology(body).unwrap();
    assert_eq!(topology.root_link.as_deref(), Some("stand"));
    assert_eq!(topology.joints.len(), 1);
    assert_eq!(topology.joints[0].name, "hinge");
    assert_eq!(topology.joints[0].child_link, "arm");
    assert_eq!(engine.body_name(body), Some("pendulum"));
}

#[test]
fn invalid_description_is_rejected() {
    let mut engine = RapierEngine::new([0.0, 0.0, -9.81], DT, 4);
    let mut desc = pendulum();
    desc.joints[0].parent = "nowhere".into();
    assert!(engine.load_body(&desc, Pose::default(), false).is_err());
    assert!(engine.topology(BodyHandle(0)).is_none());
}

#[test]
fn constant_torque_spins_the_joint_its_way() {
    let (mut engine, body) = zero_gravity_engine();
    engine.set_joint_control(body, 0, JointControl::Torque(0.5));
    for _ in 0..100 {
        engine.step();
    }
    let state = engine.joint_state(body, 0).unwrap();
    assert!(state.velocity > 0.0, "velocity {} should follow the torque", state.velocity);
    assert_abs_diff_eq!(state.applied_torque, 0.5);

    engine.set_joint_control(body, 0, JointControl::Torque(-0.5));
    for _ in 0..300 {
        engine.step();
    }
    assert!(engine.joint_state(body, 0).unwrap().velocity < 0.0);
}

#[test]
fn locked_joint_holds_against_torque() {
    let (mut engine, body) = zero_gravity_engine();
    for _ in 0..50 {
        engine.step();
    }
    let state = engine.joint_state(body, 0).unwrap();
    assert_abs_diff_eq!(state.position, 0.0, epsilon = 1e-3);
    assert_abs_diff_eq!(state.velocity, 0.0, epsilon = 1e-3);
}

#[test]
fn reset_joint_state_moves_the_child_link() {
    let (mut engine, body) = zero_gravity_engine();
    engine.reset_joint_state(body, 0, 0.3, 0.0);
    let state = engine.joint_state(body, 0).unwrap();
    assert_abs_diff_eq!(state.position, 0.3, epsilon = 1e-4);
    assert_abs_diff_eq!(state.velocity, 0.0, epsilon = 1e-4);
}

#[test]
fn reset_base_pose_moves_the_whole_body() {
    let (mut engine, body) = zero_gravity_engine();
    engine.reset_base_pose(body, Pose::at([2.0, 0.0, 1.0]));
    let base = engine.base_pose(body).unwrap();
    assert_abs_diff_eq!(base.position[0], 2.0, epsilon = 1e-5);
    let arm = engine.link_state(body, 0).unwrap();
    assert_abs_diff_eq!(arm.frame_position[0], 2.0, epsilon = 1e-5);
    assert_abs_diff_eq!(arm.frame_position[2], 1.0, epsilon = 1e-5);
}

#[test]
fn fixed_base_does_not_fall() {
    let mut engine = RapierEngine::new([0.0, 0.0, -9.81], DT, 4);
    let body = engine.load_body(&pendulum(), Pose::at([0.0, 0.0, 1.0]), true).unwrap();
    for _ in 0..20 {
        engine.step();
    }
    assert_abs_diff_eq!(engine.base_pose(body).unwrap().position[2], 1.0, epsilon = 1e-5);

    engine.set_fixed_base(body, false);
    for _ in 0..20 {
        engine.step();
    }
    assert!(engine.base_pose(body).unwrap().position[2] < 1.0);
}

#[test]
fn external_force_is_one_shot() {
    let mut engine = RapierEngine::new([0.0, 0.0, 0.0], DT, 4);
    let body = engine.load_body(&pendulum(), Pose::default(), false).unwrap();
    engine.set_joint_control(body, 0, JointControl::Torque(0.0));
    engine.apply_external_force(body, BASE_INDEX, [11.0, 0.0, 0.0], [0.0, 0.0, 0.0], LoadFrame::World);
    engine.step();
    let after_push = engine.base_velocity(body).unwrap().linear[0];
    assert!(after_push > 0.0);
    engine.step();
    let coasting = engine.base_velocity(body).unwrap().linear[0];
    assert_abs_diff_eq!(coasting, after_push, epsilon = 0.05);
}

#[test]
fn change_dynamics_updates_mass_and_friction() {
    let (mut engine, body) = zero_gravity_engine();
    let patch = DynamicsPatch {
        mass: Some(3.0),
        lateral_friction: Some(1.0),
        joint_damping: Some(0.2),
        ..Default::default()
    };
    engine.change_dynamics(body, 0, &patch);
    let info = engine.dynamics_info(body, 0).unwrap();
    assert_abs_diff_eq!(info.mass, 3.0, epsilon = 1e-5);
    assert_abs_diff_eq!(info.lateral_friction, 1.0);
    assert_abs_diff_eq!(info.joint_damping, 0.2);
}

#[test]
fn sensor_gates_reaction_forces() {
    let mut engine = RapierEngine::new([0.0, 0.0, -9.81], DT, 4);
    let body = engine.load_body(&pendulum(), Pose::at([0.0, 0.0, 1.0]), true).unwrap();
    engine.step();
    assert_eq!(engine.joint_state(body, 0).unwrap().reaction_force, [0.0; 3]);
    engine.enable_joint_sensor(body, 0, true);
    engine.step();
    let force = engine.joint_state(body, 0).unwrap().reaction_force;
    assert!(force.iter().any(|f| *f != 0.0));
}

fn norm(v: [f32; 3]) -> f32 {
    (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
}

#[test]
fn hanging_link_reaction_force_is_its_weight() {
    for sub_steps in [1, 4] {
        let mut engine = RapierEngine::new([0.0, 0.0, -9.81], DT, sub_steps);
        let body = engine.load_body(&pendulum(), Pose::at([0.0, 0.0, 1.0]), true).unwrap();
        engine.enable_joint_sensor(body, 0, true);
        engine.set_joint_control(body, 0, JointControl::Torque(0.0));
        for _ in 0..50 {
            engine.step();
        }
        let state = engine.joint_state(body, 0).unwrap();
        assert_abs_diff_eq!(norm(state.reaction_force), 9.81, epsilon = 0.5);
    }
}

/// Stand with a hinge about +y carrying a 1 kg weight half a meter out along +x
fn horizontal_arm() -> BodyDescription {
    pendulum().with_joint(JointDescription {
        name: "mount".into(),
        kind: JointKind::Fixed,
        parent: "arm".into(),
        origin: Pose::at([0.5, 0.0, 0.0]),
        axis: [0.0; 3],
        child: LinkDescription::new("weight", 1.0, "Sphere(0.05)").unwrap(),
    })
}

#[test]
fn velocity_motor_torque_balances_gravity() {
    let mut engine = RapierEngine::new([0.0, 0.0, -9.81], DT, 4);
    let body = engine.load_body(&horizontal_arm(), Pose::at([0.0, 0.0, 1.0]), true).unwrap();
    for _ in 0..50 {
        engine.step();
    }
    let state = engine.joint_state(body, 0).unwrap();
    // a velocity motor holds with a slow sag, not a fixed angle
    assert!(state.position.abs() < 0.3, "arm sagged to {}", state.position);
    // 1 kg at 0.5 m: 4.905 N·m about the hinge
    assert_abs_diff_eq!(state.applied_torque.abs(), 4.905, epsilon = 0.5);
}

#[test]
fn unknown_indices_are_ignored() {
    let (mut engine, body) = zero_gravity_engine();
    engine.set_joint_control(body, 7, JointControl::Torque(1.0));
    engine.reset_joint_state(body, 7, 1.0, 1.0);
    assert!(engine.joint_state(body, 7).is_none());
    assert!(engine.link_state(BodyHandle(9), BASE_INDEX).is_none());
}
