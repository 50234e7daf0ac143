use phf::phf_map;
use simsync_common::{Rgb, SimError};
use simsync_module::physics::VisualDescription;
use simsync_module::{BodyDescription, JointDescription, JointKind, LinkDescription, Pose};

pub const BODY_NAME: &str = "arm";
pub const JOINT_NAME: &str = "hinge";

/// Joint torque (N·m) applied while a key is held; held keys add up
pub static KEY_TORQUES: phf::Map<&'static str, f32> = phf_map! {
    "a" => -2.0,
    "d" => 2.0,
    "shift+a" => -8.0,
    "shift+d" => 8.0,
};

/// Fixed stand with an arm on a continuous hinge at its top
pub fn hinged_arm() -> Result<BodyDescription, SimError> {
    let stand = LinkDescription::new("stand", 5.0, "Box(0.2,0.2,1)")?
        .with_visual(VisualDescription::mesh("stand.obj"));
    let arm = LinkDescription::new("rod", 0.5, "Capsule(1,0.05)")?.with_visual(VisualDescription {
        color: Rgb::new(213, 94, 0),
        ..VisualDescription::mesh("rod.obj")
    });
    Ok(BodyDescription::new(BODY_NAME, stand).with_joint(JointDescription {
        name: JOINT_NAME.into(),
        kind: JointKind::Continuous,
        parent: "stand".into(),
        origin: Pose::at([0.0, 0.0, 0.5]),
        axis: [0.0, 1.0, 0.0],
        child: arm,
    }))
}

/// Sum of the torques bound to the keys `pressed` reports as held
pub fn held_torque(mut pressed: impl FnMut(&str) -> bool) -> f32 {
    KEY_TORQUES
        .entries()
        .filter(|(key, _)| pressed(**key))
        .map(|(_, torque)| *torque)
        .sum()
}
