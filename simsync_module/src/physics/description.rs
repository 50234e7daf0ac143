//! Engine-agnostic description of an articulated body, the input of
//! [`PhysicsEngine::load_body`](super::PhysicsEngine::load_body).

use crate::physics::engine::{JointKind, Pose};
use serde::{Deserialize, Serialize};
use simsync_common::shape::LinkShape;
use simsync_common::{Rgb, SimError, Vec3, BASE_JOINT_NAME};
use std::collections::HashSet;

/// Mesh drawn for a link by the renderer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualDescription {
    pub mesh: String,
    pub scale: Vec3,
    pub color: Rgb,
    pub opacity: f32,
}

impl VisualDescription {
    pub fn mesh(path: impl Into<String>) -> Self {
        VisualDescription {
            mesh: path.into(),
            scale: [1.0, 1.0, 1.0],
            color: Rgb::STEEL_BLUE,
            opacity: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkDescription {
    pub name: String,
    pub mass: f32,
    pub shape: LinkShape,
    pub visual: Option<VisualDescription>,
}

impl LinkDescription {
    /// Link with a collision shape given in `Box(x,y,z)` / `Sphere(r)` /
    /// `Capsule(l,r)` / `Cylinder(l,r)` form
    pub fn new(name: impl Into<String>, mass: f32, shape: &str) -> Result<Self, SimError> {
        Ok(LinkDescription {
            name: name.into(),
            mass,
            shape: shape.parse()?,
            visual: None,
        })
    }

    pub fn with_visual(mut self, visual: VisualDescription) -> Self {
        self.visual = Some(visual);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JointDescription {
    pub name: String,
    pub kind: JointKind,
    /// Name of an already declared link
    pub parent: String,
    /// Joint frame relative to the parent link frame; the child link frame
    /// coincides with it at zero joint position
    pub origin: Pose,
    /// Axis in the joint frame
    pub axis: Vec3,
    pub child: LinkDescription,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyDescription {
    pub name: String,
    pub base: LinkDescription,
    /// Joints in declaration order; a joint's index is its position here
    pub joints: Vec<JointDescription>,
}

impl BodyDescription {
    pub fn new(name: impl Into<String>, base: LinkDescription) -> Self {
        BodyDescription { name: name.into(), base, joints: Vec::new() }
    }

    pub fn with_joint(mut self, joint: JointDescription) -> Self {
        self.joints.push(joint);
        self
    }

    /// Reject descriptions the engine could not build: duplicate names,
    /// parents declared after their children, degenerate axes and masses.
    pub fn validate(&self) -> Result<(), SimError> {
        let mut links: HashSet<&str> = HashSet::new();
        let mut joints: HashSet<&str> = HashSet::new();
        check_link(&self.base)?;
        links.insert(self.base.name.as_str());

        for joint in &self.joints {
            if joint.name == BASE_JOINT_NAME {
                return Err(SimError::invalid_description(format!(
                    "joint name '{}' is reserved for the base",
                    BASE_JOINT_NAME
                )));
            }
            if !joints.insert(joint.name.as_str()) {
                return Err(SimError::invalid_description(format!("duplicate joint name '{}'", joint.name)));
            }
            if !links.contains(joint.parent.as_str()) {
                return Err(SimError::invalid_description(format!(
                    "joint '{}' references undeclared parent link '{}'",
                    joint.name, joint.parent
                )));
            }
            check_link(&joint.child)?;
            if !links.insert(joint.child.name.as_str()) {
                return Err(SimError::invalid_description(format!("duplicate link name '{}'", joint.child.name)));
            }
            let [x, y, z] = joint.axis;
            if joint.kind != JointKind::Fixed && (x * x + y * y + z * z) < 1.0e-12 {
                return Err(SimError::invalid_description(format!("joint '{}' has a zero axis", joint.name)));
            }
        }
        Ok(())
    }
}

fn check_link(link: &LinkDescription) -> Result<(), SimError> {
    if !(link.mass >= 0.0 && link.mass.is_finite()) {
        return Err(SimError::invalid_description(format!("link '{}' has invalid mass {}", link.name, link.mass)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arm() -> BodyDescription {
        BodyDescription::new("arm", LinkDescription::new("stand", 1.0, "Box(0.2,0.2,1)").unwrap()).with_joint(
            JointDescription {
                name: "hinge".into(),
                kind: JointKind::Continuous,
                parent: "stand".into(),
                origin: Pose::at([0.0, 0.0, 0.5]),
                axis: [0.0, 1.0, 0.0],
                child: LinkDescription::new("rod", 0.5, "Capsule(1,0.05)").unwrap(),
            },
        )
    }

    #[test]
    fn valid_description_passes() {
        assert!(arm().validate().is_ok());
    }

    #[test]
    fn undeclared_parent_is_rejected() {
        let mut desc = arm();
        desc.joints[0].parent = "missing".into();
        assert!(matches!(desc.validate(), Err(SimError::InvalidDescription(_))));
    }

    #[test]
    fn duplicate_link_is_rejected() {
        let mut desc = arm();
        desc.joints[0].child.name = "stand".into();
        assert!(matches!(desc.validate(), Err(SimError::InvalidDescription(_))));
    }

    #[test]
    fn zero_axis_is_rejected_for_moving_joints() {
        let mut desc = arm();
        desc.joints[0].axis = [0.0; 3];
        assert!(desc.validate().is_err());
        desc.joints[0].kind = JointKind::Fixed;
        assert!(desc.validate().is_ok());
    }

    #[test]
    fn base_joint_name_is_reserved() {
        let mut desc = arm();
        desc.joints[0].name = BASE_JOINT_NAME.into();
        assert!(matches!(desc.validate(), Err(SimError::InvalidDescription(_))));
    }

    #[test]
    fn bad_shape_string_is_a_shape_error() {
        assert!(matches!(LinkDescription::new("x", 1.0, "Cone(1)"), Err(SimError::ShapeParse(_))));
    }
}
