//! Name registry for loaded bodies.
//!
//! A [`Body`] maps the joint and link names of one engine body onto engine
//! indices. The maps come from a single topology pass at registration and are
//! never touched again.

use crate::constants::{LINK_LATERAL_FRICTION, LINK_RESTITUTION};
use crate::physics::{ContactParams, DynamicsPatch, JointControl, PhysicsEngine, Pose};
use simsync_common::{BodyHandle, JointIndex, SimError, Vec3, BASE_INDEX, BASE_JOINT_NAME};
use std::collections::HashMap;

/// What `reset` restores for a body
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InitialConditions {
    pub pose: Pose,
    pub fixed_base: bool,
}

/// A link mesh pushed to the renderer on every visual sync
#[derive(Debug, Clone, PartialEq)]
pub struct VisualLink {
    pub index: JointIndex,
    pub name: String,
    pub mesh: String,
    pub scale: Vec3,
}

#[derive(Debug, Clone)]
pub struct Body {
    handle: BodyHandle,
    name: String,
    joint_index_by_name: HashMap<String, JointIndex>,
    link_index_by_name: HashMap<String, JointIndex>,
    /// Joint axes in the child link frame
    joint_axes: HashMap<JointIndex, Vec3>,
    visual_links: Vec<VisualLink>,
    track_visually: bool,
    initial: InitialConditions,
}

/// Overrides applied to every joint's link right after loading: metal-on-metal
/// friction, no spin or roll friction, bouncy contacts at engine stiffness, no
/// damping anywhere
const LOAD_DYNAMICS: DynamicsPatch = DynamicsPatch {
    mass: None,
    lateral_friction: Some(LINK_LATERAL_FRICTION),
    spinning_friction: Some(0.0),
    rolling_friction: Some(0.0),
    contact: Some(ContactParams { restitution: LINK_RESTITUTION, stiffness: None, damping: None }),
    linear_damping: Some(0.0),
    angular_damping: Some(0.0),
    joint_damping: Some(0.0),
};

impl Body {
    /// Introspect a freshly loaded body, build its name maps and apply the
    /// load-time joint defaults.
    pub fn register<E: PhysicsEngine + ?Sized>(
        engine: &mut E,
        handle: BodyHandle,
        name: impl Into<String>,
        initial: InitialConditions,
        track_visually: bool,
    ) -> Result<Body, SimError> {
        let topology = engine.topology(handle).ok_or(SimError::UnknownBody(handle))?;

        let mut joint_index_by_name = HashMap::with_capacity(topology.joints.len() + 1);
        let mut link_index_by_name = HashMap::with_capacity(topology.joints.len() + 1);
        let mut joint_axes = HashMap::with_capacity(topology.joints.len());
        if let Some(root) = topology.root_link {
            joint_index_by_name.insert(BASE_JOINT_NAME.to_string(), BASE_INDEX);
            link_index_by_name.insert(root, BASE_INDEX);
        }
        for joint in topology.joints {
            if joint.name == BASE_JOINT_NAME {
                log::warn!("Body {} has a joint named '{}'; it stays unreachable by name", handle, BASE_JOINT_NAME);
            } else {
                joint_index_by_name.insert(joint.name, joint.index);
            }
            link_index_by_name.insert(joint.child_link, joint.index);
            joint_axes.insert(joint.index, joint.axis);
        }

        for &index in joint_index_by_name.values() {
            engine.change_dynamics(handle, index, &LOAD_DYNAMICS);
            if index != BASE_INDEX {
                // free the joint until something actuates it
                engine.set_joint_control(handle, index, JointControl::Velocity { target: 0.0, max_force: 0.0 });
                engine.enable_joint_sensor(handle, index, true);
            }
        }

        let visual_links = engine
            .visual_shapes(handle)
            .into_iter()
            .map(|v| VisualLink { index: v.link, name: v.link_name, mesh: v.mesh, scale: v.scale })
            .collect();

        Ok(Body {
            handle,
            name: name.into(),
            joint_index_by_name,
            link_index_by_name,
            joint_axes,
            visual_links,
            track_visually,
            initial,
        })
    }

    pub fn handle(&self) -> BodyHandle {
        self.handle
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Renderer group holding this body's link meshes
    pub fn render_group(&self) -> String {
        format!("{}_{}", self.name, self.handle)
    }

    pub fn track_visually(&self) -> bool {
        self.track_visually
    }

    pub fn initial_conditions(&self) -> &InitialConditions {
        &self.initial
    }

    pub fn visual_links(&self) -> &[VisualLink] {
        &self.visual_links
    }

    pub fn joint_index(&self, name: &str) -> Option<JointIndex> {
        self.joint_index_by_name.get(name).copied()
    }

    pub fn link_index(&self, name: &str) -> Option<JointIndex> {
        self.link_index_by_name.get(name).copied()
    }

    /// Axis of a joint in its child link frame
    pub fn joint_axis(&self, index: JointIndex) -> Option<Vec3> {
        self.joint_axes.get(&index).copied()
    }

    /// Name of the link moved by `joint`
    pub fn child_link_of(&self, joint: JointIndex) -> Option<&str> {
        self.link_index_by_name
            .iter()
            .find(|(_, index)| **index == joint)
            .map(|(name, _)| name.as_str())
    }

    /// Indices of every non-base joint, ascending
    pub fn joint_indices(&self) -> Vec<JointIndex> {
        let mut indices: Vec<_> = self.joint_index_by_name.values().copied().filter(|i| *i != BASE_INDEX).collect();
        indices.sort_unstable();
        indices
    }

    /// Indices of every link, base included, ascending
    pub fn link_indices(&self) -> Vec<JointIndex> {
        let mut indices: Vec<_> = self.link_index_by_name.values().copied().collect();
        indices.sort_unstable();
        indices
    }

    pub fn joint_names(&self) -> impl Iterator<Item = &str> {
        self.joint_index_by_name.keys().map(String::as_str)
    }

    pub fn link_names(&self) -> impl Iterator<Item = &str> {
        self.link_index_by_name.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::{JointControl, PhysicsEngine, Pose};
    use crate::tests::{double_pendulum, FakeEngine};

    fn registered() -> (FakeEngine, Body) {
        let mut engine = FakeEngine::default();
        let handle = engine.load_body(&double_pendulum(), Pose::default(), true).unwrap();
        let initial = InitialConditions { pose: Pose::default(), fixed_base: true };
        let body = Body::register(&mut engine, handle, "double", initial, true).unwrap();
        (engine, body)
    }

    #[test]
    fn base_is_registered_under_reserved_index() {
        let (_, body) = registered();
        assert_eq!(body.joint_index("base"), Some(BASE_INDEX));
        assert_eq!(body.link_index("stand"), Some(BASE_INDEX));
    }

    #[test]
    fn joints_and_links_share_indices() {
        let (_, body) = registered();
        assert_eq!(body.joint_index("shoulder"), Some(0));
        assert_eq!(body.joint_index("elbow"), Some(1));
        assert_eq!(body.link_index("upper"), Some(0));
        assert_eq!(body.link_index("lower"), Some(1));
        assert_eq!(body.child_link_of(1), Some("lower"));
        assert_eq!(body.child_link_of(BASE_INDEX), Some("stand"));
        assert_eq!(body.joint_indices(), vec![0, 1]);
        assert_eq!(body.link_indices(), vec![BASE_INDEX, 0, 1]);
    }

    #[test]
    fn lookups_are_stable() {
        let (mut engine, body) = registered();
        let before: Vec<_> = ["base", "shoulder", "elbow"].iter().map(|n| body.joint_index(n)).collect();
        for _ in 0..10 {
            engine.step();
        }
        let after: Vec<_> = ["base", "shoulder", "elbow"].iter().map(|n| body.joint_index(n)).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn unknown_names_are_none() {
        let (_, body) = registered();
        assert_eq!(body.joint_index("wrist"), None);
        assert_eq!(body.link_index("hand"), None);
        assert_eq!(body.child_link_of(5), None);
    }

    #[test]
    fn load_defaults_free_joints_and_enable_sensors() {
        let (engine, body) = registered();
        let fake = &engine.bodies[body.handle().0 as usize];
        for joint in &fake.joints {
            assert_eq!(joint.control, JointControl::Velocity { target: 0.0, max_force: 0.0 });
            assert!(joint.sensor);
            assert_eq!(joint.dynamics.lateral_friction, LINK_LATERAL_FRICTION);
            assert_eq!(joint.dynamics.joint_damping, 0.0);
        }
        assert_eq!(fake.base_dynamics.restitution, LINK_RESTITUTION);
    }

    #[test]
    fn joint_named_base_does_not_shadow_the_base() {
        let mut engine = FakeEngine::default();
        let handle = engine.load_body(&double_pendulum(), Pose::default(), true).unwrap();
        engine.bodies[handle.0 as usize].joints[0].info.name = BASE_JOINT_NAME.into();
        let initial = InitialConditions { pose: Pose::default(), fixed_base: true };
        let body = Body::register(&mut engine, handle, "double", initial, true).unwrap();
        assert_eq!(body.joint_index(BASE_JOINT_NAME), Some(BASE_INDEX));
        assert_eq!(body.joint_index("elbow"), Some(1));
    }

    #[test]
    fn unknown_handle_fails_registration() {
        let mut engine = FakeEngine::default();
        let initial = InitialConditions { pose: Pose::default(), fixed_base: false };
        let err = Body::register(&mut engine, BodyHandle(3), "ghost", initial, false).unwrap_err();
        assert!(matches!(err, SimError::UnknownBody(BodyHandle(3))));
    }
}
