use crate::constants::DEFAULT_MAX_FORCE;
use crate::physics::description::{BodyDescription, LinkDescription};
use crate::physics::rapier_common::*;
use crate::physics::{Articulation, JointControl, JointKind, JointSlot, LinkSlot, Pose, RapierEngine};
use rapier3d::na::Translation3;
use rapier3d::prelude::*;
use simsync_common::{collision, frame, BodyHandle, JointIndex, SimError, BASE_INDEX};
use std::collections::HashMap;

impl RapierEngine {
    /// Build one articulation: a rigid body per link, an impulse joint per
    /// joint, all links sharing one collision group so they never collide
    /// with each other.
    pub(crate) fn spawn_articulation(
        &mut self,
        desc: &BodyDescription,
        pose: Pose,
        fixed_base: bool,
    ) -> Result<BodyHandle, SimError> {
        desc.validate()?;

        let handle = BodyHandle(self.articulations.len() as u32);
        let groups = collision::interaction_groups(handle);
        let base_iso = to_isometry(&pose);
        let base = self.spawn_link(&desc.base, base_iso, groups, fixed_base);

        // link name -> (link index, world frame at zero joint positions)
        let mut frames: HashMap<&str, (JointIndex, Isometry<Real>)> = HashMap::new();
        frames.insert(desc.base.name.as_str(), (BASE_INDEX, base_iso));
        let mut joints: Vec<JointSlot> = Vec::with_capacity(desc.joints.len());

        for (i, jd) in desc.joints.iter().enumerate() {
            let Some(&(parent, parent_iso)) = frames.get(jd.parent.as_str()) else {
                return Err(SimError::invalid_description(format!("joint '{}' has no parent link", jd.name)));
            };
            let origin = to_isometry(&jd.origin);
            let child_iso = parent_iso * origin;
            let child = self.spawn_link(&jd.child, child_iso, groups, false);

            let axis = if jd.kind == JointKind::Fixed && frame::norm(jd.axis) == 0.0 {
                Vector::x()
            } else {
                to_vector(jd.axis).normalize()
            };
            let parent_body = if parent == BASE_INDEX { base.body } else { joints[parent as usize].child.body };
            let joint = build_joint(jd.kind, origin, axis);
            let joint_handle = self.ctx.impulse_joints.insert(parent_body, child.body, joint, true);

            frames.insert(jd.child.name.as_str(), (i as JointIndex, child_iso));
            joints.push(JointSlot {
                name: jd.name.clone(),
                kind: jd.kind,
                parent,
                child,
                handle: joint_handle,
                axis,
                origin,
                // joints start locked by a zero-velocity motor
                control: JointControl::Velocity { target: 0.0, max_force: DEFAULT_MAX_FORCE },
                damping: 0.0,
                sensor: false,
            });
        }

        log::debug!(
            "Spawned articulation '{}' as body {} with {} joints (fixed base: {})",
            desc.name,
            handle,
            joints.len(),
            fixed_base
        );
        self.articulations.push(Articulation { name: desc.name.clone(), base, joints });
        for index in 0..desc.joints.len() {
            self.sync_motor(handle, index as JointIndex);
        }
        Ok(handle)
    }

    fn spawn_link(
        &mut self,
        link: &LinkDescription,
        position: Isometry<Real>,
        groups: InteractionGroups,
        fixed: bool,
    ) -> LinkSlot {
        let rb_builder = if fixed { RigidBodyBuilder::fixed() } else { RigidBodyBuilder::dynamic() }
            .position(position)
            .can_sleep(false);
        let body = self.ctx.bodies.insert(rb_builder.build());
        let collider = link.shape.to_rapier(groups).mass(link.mass).build();
        let collider = self.ctx.colliders.insert_with_parent(collider, body, &mut self.ctx.bodies);
        LinkSlot {
            name: link.name.clone(),
            body,
            collider,
            visual: link.visual.clone(),
        }
    }
}

/// Joint whose free axis (local X of both joint frames) is aligned with `axis`
fn build_joint(kind: JointKind, origin: Isometry<Real>, axis: Vector<Real>) -> GenericJoint {
    let align = frame::to_unit(frame::rotation_between([1.0, 0.0, 0.0], from_vector(&axis)));
    let align = Isometry::from_parts(Translation3::identity(), align);
    let locked = match kind {
        JointKind::Revolute { .. } | JointKind::Continuous => JointAxesMask::LOCKED_REVOLUTE_AXES,
        JointKind::Prismatic => JointAxesMask::LOCKED_PRISMATIC_AXES,
        JointKind::Fixed => JointAxesMask::LOCKED_FIXED_AXES,
    };
    let mut builder = GenericJointBuilder::new(locked)
        .local_frame1(origin * align)
        .local_frame2(align)
        .contacts_enabled(false);
    if let JointKind::Revolute { lower, upper } = kind {
        builder = builder.limits(JointAxis::AngX, [lower, upper]);
    }
    builder.build()
}
