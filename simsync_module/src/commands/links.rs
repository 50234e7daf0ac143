use crate::controller::Simulation;
use crate::physics::{DynamicsPatch, LinkState, PhysicsEngine};
use simsync_common::color::Palette;
use simsync_common::{frame, BodyHandle, Vec3};

/// Pose and velocity of a body's base
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BaseState {
    pub position: Vec3,
    /// Roll, pitch, yaw in radians
    pub orientation: Vec3,
    pub linear_velocity: Vec3,
    pub angular_velocity: Vec3,
}

impl<E: PhysicsEngine> Simulation<E> {
    /// Set a link's mass, optionally recoloring it by mass within `(min, max)`
    pub fn set_link_mass(&mut self, body: BodyHandle, link: &str, mass: f32, color: Option<(f32, f32)>) {
        let Some(index) = self.link_of(body, link) else { return };
        let patch = DynamicsPatch { mass: Some(mass), ..Default::default() };
        self.engine.change_dynamics(body, index, &patch);
        if let Some((min, max)) = color {
            self.color_link(body, index, mass, min, max, Palette::Sequential);
        }
    }

    pub fn get_link_mass(&self, body: BodyHandle, link: &str) -> Option<f32> {
        let index = self.link_of(body, link)?;
        self.engine.dynamics_info(body, index).map(|info| info.mass)
    }

    /// World position and orientation of a link
    pub fn get_link_state(&self, body: BodyHandle, link: &str) -> Option<LinkState> {
        let index = self.link_of(body, link)?;
        self.engine.link_state(body, index)
    }

    /// Base pose and velocity. With `body_coords` the velocities are
    /// expressed in the base frame instead of the world frame.
    pub fn get_base_state(&self, body: BodyHandle, body_coords: bool) -> Option<BaseState> {
        let pose = self.engine.base_pose(body)?;
        let velocity = self.engine.base_velocity(body)?;
        let (linear_velocity, angular_velocity) = if body_coords {
            (
                frame::world_to_body(pose.orientation, velocity.linear),
                frame::world_to_body(pose.orientation, velocity.angular),
            )
        } else {
            (velocity.linear, velocity.angular)
        };
        Some(BaseState {
            position: pose.position,
            orientation: frame::to_euler(pose.orientation),
            linear_velocity,
            angular_velocity,
        })
    }

    /// Mass-weighted mean of the link centers of mass; the origin when the
    /// body is massless
    pub fn get_center_of_mass(&self, body: BodyHandle) -> Option<Vec3> {
        let b = self.body(body)?;
        let mut weighted = [0.0f32; 3];
        let mut total = 0.0f32;
        for index in b.link_indices() {
            let (Some(info), Some(state)) = (self.engine.dynamics_info(body, index), self.engine.link_state(body, index))
            else {
                continue;
            };
            for (acc, p) in weighted.iter_mut().zip(state.com_position) {
                *acc += info.mass * p;
            }
            total += info.mass;
        }
        if total <= 0.0 {
            return Some([0.0; 3]);
        }
        Some(weighted.map(|w| w / total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::LoadOptions;
    use crate::physics::Velocity;
    use crate::tests::*;
    use approx::assert_abs_diff_eq;
    use simsync_common::color::color_for;

    #[test]
    fn link_mass_round_trips_and_colors() {
        let mut h = harness();
        h.sim.set_link_mass(h.body, "lower", 0.25, Some((0.0, 1.0)));
        assert_eq!(h.sim.get_link_mass(h.body, "lower"), Some(0.25));
        let log = h.render.borrow();
        let (_, name, material) = log.materials.last().unwrap();
        assert_eq!(name, "lower");
        assert_eq!(material.color, color_for(0.25, 0.0, 1.0, Palette::Sequential));
    }

    #[test]
    fn unknown_link_is_ignored() {
        let mut h = harness();
        h.sim.set_link_mass(h.body, "tail", 9.0, None);
        assert!(h.sim.get_link_mass(h.body, "tail").is_none());
        assert!(h.sim.get_link_state(h.body, "tail").is_none());
    }

    #[test]
    fn base_link_is_addressable_by_name() {
        let h = harness();
        assert_eq!(h.sim.get_link_mass(h.body, "stand"), Some(2.0));
        let state = h.sim.get_link_state(h.body, "stand").unwrap();
        assert_eq!(state.frame_position, [0.0, 0.0, 1.0]);
    }

    #[test]
    fn base_velocity_in_body_coordinates() {
        let mut h = harness();
        // base yawed a quarter turn: world +x is body -y
        let yawed = crate::physics::Pose::new([0.0; 3], frame::from_euler(0.0, 0.0, std::f32::consts::FRAC_PI_2));
        h.sim.engine_mut().reset_base_pose(h.body, yawed);
        h.sim.engine_mut().reset_base_velocity(h.body, Velocity { linear: [1.0, 0.0, 0.0], angular: [0.0, 0.0, 2.0] });

        let world = h.sim.get_base_state(h.body, false).unwrap();
        assert_eq!(world.linear_velocity, [1.0, 0.0, 0.0]);
        assert_abs_diff_eq!(world.orientation[2], std::f32::consts::FRAC_PI_2, epsilon = 1e-5);

        let local = h.sim.get_base_state(h.body, true).unwrap();
        assert_abs_diff_eq!(local.linear_velocity[0], 0.0, epsilon = 1e-5);
        assert_abs_diff_eq!(local.linear_velocity[1], -1.0, epsilon = 1e-5);
        assert_abs_diff_eq!(local.angular_velocity[2], 2.0, epsilon = 1e-5);
    }

    #[test]
    fn center_of_mass_is_mass_weighted() {
        let h = harness();
        // stand (2 kg) at z=1, upper (1 kg) at z=1.5, lower (0.5 kg) at z=0.5
        let com = h.sim.get_center_of_mass(h.body).unwrap();
        assert_abs_diff_eq!(com[2], (2.0 * 1.0 + 1.5 + 0.5 * 0.5) / 3.5, epsilon = 1e-5);
        assert_abs_diff_eq!(com[0], 0.0);
    }

    #[test]
    fn massless_body_has_com_at_origin() {
        let mut h = harness();
        let massless = h.sim.load_body(&single_hinge(), LoadOptions::at([3.0, 3.0, 3.0])).unwrap();
        h.sim.set_link_mass(massless, "block", 0.0, None);
        h.sim.set_link_mass(massless, "wheel", 0.0, None);
        assert_eq!(h.sim.get_center_of_mass(massless), Some([0.0; 3]));
        assert!(h.sim.get_center_of_mass(BodyHandle(77)).is_none());
    }
}
