use crate::controller::Simulation;
use crate::physics::PhysicsEngine;
use crate::visual::SceneCommand;
use simsync_common::{Rgb, Vec3};

impl<E: PhysicsEngine> Simulation<E> {
    pub fn transform_camera(&mut self, position: Vec3, target: Vec3, up: Vec3) {
        self.scene(SceneCommand::Camera { position, target, up });
    }

    /// Vertical background gradient
    pub fn set_background(&mut self, top: Rgb, bottom: Rgb) {
        self.scene(SceneCommand::Background { top, bottom });
    }

    pub fn set_spotlight(&mut self, on: bool, intensity: f32, distance: f32) {
        self.scene(SceneCommand::Spotlight { on, intensity, distance });
    }

    pub fn set_posx_pt_light(&mut self, on: bool, intensity: f32, distance: f32) {
        self.scene(SceneCommand::PosXPointLight { on, intensity, distance });
    }

    pub fn set_negx_pt_light(&mut self, on: bool, intensity: f32, distance: f32) {
        self.scene(SceneCommand::NegXPointLight { on, intensity, distance });
    }

    pub fn set_ambient_light(&mut self, on: bool, intensity: f32) {
        self.scene(SceneCommand::AmbientLight { on, intensity });
    }

    pub fn set_fill_light(&mut self, on: bool, intensity: f32) {
        self.scene(SceneCommand::FillLight { on, intensity });
    }

    fn scene(&mut self, command: SceneCommand) {
        match self.renderer.as_mut() {
            Some(renderer) => renderer.scene(command),
            None => log::debug!("No renderer; dropping {:?}", command),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::*;

    #[test]
    fn scene_commands_are_forwarded_in_order() {
        let mut h = harness();
        h.sim.transform_camera([3.0, 0.0, 1.0], [0.0; 3], [0.0, 0.0, 1.0]);
        h.sim.set_background(Rgb::new(255, 255, 255), Rgb::BLACK);
        h.sim.set_spotlight(false, 0.5, 4.0);
        h.sim.set_posx_pt_light(true, 0.3, 2.0);
        h.sim.set_negx_pt_light(true, 0.3, 2.0);
        h.sim.set_ambient_light(true, 0.6);
        h.sim.set_fill_light(false, 0.0);
        let log = h.render.borrow();
        assert_eq!(log.scene.len(), 7);
        assert_eq!(log.scene[0], SceneCommand::Camera { position: [3.0, 0.0, 1.0], target: [0.0; 3], up: [0.0, 0.0, 1.0] });
        assert_eq!(log.scene[5], SceneCommand::AmbientLight { on: true, intensity: 0.6 });
    }
}
