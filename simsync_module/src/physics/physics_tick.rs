use crate::physics::{JointControl, PendingLoad, RapierEngine};
use rapier3d::prelude::*;

impl RapierEngine {
    /// Advance the world by one fixed step, split into `sub_steps` pipeline steps.
    ///
    /// Joint torques and queued one-shot loads are set once up front and stay
    /// applied through every sub-step; they are cleared at the start of the
    /// next tick.
    pub(crate) fn tick(&mut self) {
        for (_, rb) in self.ctx.bodies.iter_mut() {
            rb.reset_forces(false);
            rb.reset_torques(false);
        }
        self.apply_joint_torques();

        for load in std::mem::take(&mut self.pending) {
            match load {
                PendingLoad::Force { body, force, point } => {
                    if let Some(rb) = self.ctx.bodies.get_mut(body) {
                        rb.add_force_at_point(force, point, true);
                    }
                }
                PendingLoad::Torque { body, torque } => {
                    if let Some(rb) = self.ctx.bodies.get_mut(body) {
                        rb.add_torque(torque, true);
                    }
                }
            }
        }

        let world = &mut self.ctx;
        world.integration_parameters.dt = self.dt / self.sub_steps as Real;
        for _ in 0..self.sub_steps {
            world.pipeline.step(
                &world.gravity,
                &world.integration_parameters,
                &mut world.islands,
                &mut world.broad_phase,
                &mut world.narrow_phase,
                &mut world.bodies,
                &mut world.colliders,
                &mut world.impulse_joints,
                &mut world.multibody_joints,
                &mut world.ccd_solver,
                None,
                &(),
                &(),
            );
        }
    }

    /// Torque-mode joints push their child forward and their parent back about
    /// the joint axis; prismatic joints do the same with a force.
    fn apply_joint_torques(&mut self) {
        for art in &self.articulations {
            for joint in &art.joints {
                let JointControl::Torque(torque) = joint.control else {
                    continue;
                };
                if torque == 0.0 {
                    continue;
                }
                let Some(parent_body) = art.link(joint.parent).map(|l| l.body) else {
                    continue;
                };
                let Some(child) = self.ctx.bodies.get_mut(joint.child.body) else {
                    continue;
                };
                let load = (child.rotation() * joint.axis) * torque;
                if joint.kind.is_rotational() {
                    child.add_torque(load, true);
                } else {
                    child.add_force(load, true);
                }
                if let Some(parent) = self.ctx.bodies.get_mut(parent_body) {
                    if joint.kind.is_rotational() {
                        parent.add_torque(-load, true);
                    } else {
                        parent.add_force(-load, true);
                    }
                }
            }
        }
    }
}
