use crate::annotations::{AnnotationKey, ArrowDirection, ArrowRequest};
use crate::controller::Simulation;
use crate::physics::{LoadFrame, PhysicsEngine};
use simsync_common::{BodyHandle, Vec3, BASE_INDEX};

// External loads last for the next step only. `arrow` is the arrow length per
// unit of load; `None` hides the arrow under the same key.

impl<E: PhysicsEngine> Simulation<E> {
    /// Push a link at its frame origin with a force given in the link frame
    pub fn apply_force_to_link(&mut self, body: BodyHandle, link: &str, force: Vec3, arrow: Option<f32>) {
        let Some(index) = self.link_of(body, link) else { return };
        self.engine.apply_external_force(body, index, force, [0.0; 3], LoadFrame::Link);

        if self.renderer.is_none() {
            return;
        }
        let Some(state) = self.engine.link_state(body, index) else { return };
        let request = ArrowRequest {
            direction: ArrowDirection::Vector(force),
            anchor: state.frame_position,
            frame: state.orientation,
            scale: arrow.unwrap_or(self.force_arrows.kind().default_scale()),
        };
        self.force_arrows
            .request(self.renderer.as_deref_mut(), AnnotationKey::link(link), arrow.is_some(), &request);
    }

    /// Push a body at its center of mass with a world-frame force
    pub fn apply_force_to_com(&mut self, body: BodyHandle, force: Vec3, arrow: Option<f32>) {
        let Some(com) = self.get_center_of_mass(body) else {
            log::debug!("No body {}; ignoring force", body);
            return;
        };
        self.engine.apply_external_force(body, BASE_INDEX, force, com, LoadFrame::World);

        let scale = arrow.unwrap_or(self.force_arrows.kind().default_scale());
        let request = ArrowRequest::world(force, com, scale);
        self.force_arrows
            .request(self.renderer.as_deref_mut(), AnnotationKey::CenterOfMass, arrow.is_some(), &request);
    }

    /// Twist a body's base with a world-frame torque, drawn at the center of mass
    pub fn apply_external_torque(&mut self, body: BodyHandle, torque: Vec3, arrow: Option<f32>) {
        let Some(com) = self.get_center_of_mass(body) else {
            log::debug!("No body {}; ignoring torque", body);
            return;
        };
        self.engine.apply_external_torque(body, BASE_INDEX, torque, LoadFrame::World);

        let scale = arrow.unwrap_or(self.torque_arrows.kind().default_scale());
        let request = ArrowRequest::world(torque, com, scale);
        self.torque_arrows
            .request(self.renderer.as_deref_mut(), AnnotationKey::CenterOfMass, arrow.is_some(), &request);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotations::AnnotationState;
    use crate::constants::{FORCE_ARROW_SCALE, TORQUE_ARROW_SCALE};
    use crate::tests::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn link_force_is_queued_in_link_frame() {
        let mut h = harness();
        h.sim.apply_force_to_link(h.body, "upper", [1.0, 0.0, 0.0], None);
        let pending = &h.sim.engine().bodies[h.body.0 as usize].pending;
        assert_eq!(
            pending[0],
            FakeLoad::Force { link: 0, force: [1.0, 0.0, 0.0], point: [0.0; 3], frame: LoadFrame::Link }
        );
    }

    #[test]
    fn loads_last_one_step() {
        let mut h = harness();
        h.sim.apply_external_torque(h.body, [0.0, 0.0, 1.0], None);
        h.sim.step(false, false, false);
        assert_eq!(h.sim.engine().bodies[0].applied.len(), 1);
        h.sim.step(false, false, false);
        assert!(h.sim.engine().bodies[0].applied.is_empty());
    }

    #[test]
    fn com_force_is_applied_at_the_center_of_mass() {
        let mut h = harness();
        let com = h.sim.get_center_of_mass(h.body).unwrap();
        h.sim.apply_force_to_com(h.body, [0.0, 0.0, 5.0], Some(FORCE_ARROW_SCALE));
        let pending = &h.sim.engine().bodies[0].pending;
        assert_eq!(
            pending[0],
            FakeLoad::Force { link: BASE_INDEX, force: [0.0, 0.0, 5.0], point: com, frame: LoadFrame::World }
        );
        let record = h.sim.force_arrows().record(&AnnotationKey::CenterOfMass).unwrap();
        assert_eq!(record.transform.position, com);
        assert_abs_diff_eq!(record.transform.scale[2], 2.0, epsilon = 1e-6);
    }

    #[test]
    fn zero_force_arrow_is_still_shown() {
        let mut h = harness();
        h.sim.apply_force_to_com(h.body, [0.0; 3], Some(FORCE_ARROW_SCALE));
        assert_eq!(h.sim.force_arrows().state(&AnnotationKey::CenterOfMass), AnnotationState::Visible);
        let record = h.sim.force_arrows().record(&AnnotationKey::CenterOfMass).unwrap();
        assert_eq!(record.transform.scale, [0.0; 3]);
    }

    #[test]
    fn link_and_com_arrows_have_separate_keys() {
        let mut h = harness();
        h.sim.apply_force_to_link(h.body, "lower", [0.0, 1.0, 0.0], Some(FORCE_ARROW_SCALE));
        h.sim.apply_force_to_com(h.body, [0.0, 1.0, 0.0], Some(FORCE_ARROW_SCALE));
        h.sim.apply_external_torque(h.body, [0.0, 1.0, 0.0], Some(TORQUE_ARROW_SCALE));
        assert_eq!(h.sim.force_arrows().len(), 2);
        assert_eq!(h.sim.torque_arrows().len(), 1);
        assert_eq!(h.sim.force_arrows().record(&AnnotationKey::link("lower")).unwrap().sequence, 0);
        assert_eq!(h.sim.force_arrows().record(&AnnotationKey::CenterOfMass).unwrap().sequence, 1);
    }

    #[test]
    fn hiding_keeps_the_arrow() {
        let mut h = harness();
        h.sim.apply_force_to_link(h.body, "lower", [0.0, 1.0, 0.0], Some(FORCE_ARROW_SCALE));
        h.sim.apply_force_to_link(h.body, "lower", [0.0, 1.0, 0.0], None);
        assert_eq!(h.sim.force_arrows().state(&AnnotationKey::link("lower")), AnnotationState::Hidden);
        assert_eq!(h.render.borrow().adds.iter().filter(|(g, _)| g == "Force Arrows").count(), 1);
    }

    #[test]
    fn unknown_body_is_ignored() {
        let mut h = harness();
        h.sim.apply_force_to_com(BodyHandle(9), [1.0; 3], Some(1.0));
        h.sim.apply_force_to_link(h.body, "nope", [1.0; 3], Some(1.0));
        assert!(h.sim.force_arrows().is_empty());
        assert!(h.sim.engine().bodies[0].pending.is_empty());
    }
}
