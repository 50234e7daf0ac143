use crate::controller::Simulation;
use crate::physics::PhysicsEngine;
use crate::visual::Material;
use simsync_common::color::{color_for, Palette};
use simsync_common::{BodyHandle, JointIndex, Rgb};

impl<E: PhysicsEngine> Simulation<E> {
    pub fn set_link_color(&mut self, body: BodyHandle, link: &str, color: Rgb, transparent: bool, opacity: f32) {
        let Some(index) = self.link_of(body, link) else { return };
        self.paint_link(body, index, Material { color, transparent, opacity });
    }

    /// Color a joint's child link by the joint position within `[min, max]`
    pub fn set_color_from_pos(&mut self, body: BodyHandle, joint: &str, min: f32, max: f32) {
        let Some(index) = self.joint_of(body, joint) else { return };
        let Some(state) = self.engine.joint_state(body, index) else { return };
        self.color_link(body, index, state.position, min, max, Palette::Diverging);
    }

    /// Color a joint's child link by the joint velocity within `[min, max]`
    pub fn set_color_from_vel(&mut self, body: BodyHandle, joint: &str, min: f32, max: f32) {
        let Some(index) = self.joint_of(body, joint) else { return };
        let Some(state) = self.engine.joint_state(body, index) else { return };
        self.color_link(body, index, state.velocity, min, max, Palette::Diverging);
    }

    /// Color a joint's child link by the applied joint torque within `[min, max]`
    pub fn set_color_from_torque(&mut self, body: BodyHandle, joint: &str, min: f32, max: f32) {
        let Some(index) = self.joint_of(body, joint) else { return };
        let Some(state) = self.engine.joint_state(body, index) else { return };
        self.color_link(body, index, state.applied_torque, min, max, Palette::Diverging);
    }

    /// Color a link by its mass within `[min, max]`
    pub fn set_color_from_mass(&mut self, body: BodyHandle, link: &str, min: f32, max: f32) {
        let Some(index) = self.link_of(body, link) else { return };
        let Some(info) = self.engine.dynamics_info(body, index) else { return };
        self.color_link(body, index, info.mass, min, max, Palette::Sequential);
    }

    pub(crate) fn color_link(&mut self, body: BodyHandle, link: JointIndex, value: f32, min: f32, max: f32, palette: Palette) {
        let color = color_for(value, min, max, palette);
        self.paint_link(body, link, Material::opaque(color));
    }

    fn paint_link(&mut self, body: BodyHandle, link: JointIndex, material: Material) {
        let Some(renderer) = self.renderer.as_deref_mut() else {
            return;
        };
        let Some(b) = self.bodies.iter().find(|b| b.handle() == body) else {
            return;
        };
        let Some(name) = b.child_link_of(link) else { return };
        renderer.update_material(&b.render_group(), name, &material);
    }
}
