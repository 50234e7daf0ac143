use rapier3d::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Supported link collision shapes. Dimensions are full extents, not halves.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum LinkShape {
    Sphere(f32),
    /// Full side lengths along x, y, z
    Cuboid(f32, f32, f32),
    /// Cylinder part length along z, then radius
    Capsule(f32, f32),
    /// Length along z, then radius
    Cylinder(f32, f32),
}

/// Errors during shape parsing
#[derive(Debug, Error, PartialEq)]
pub enum ShapeParseError {
    #[error("invalid shape format: {0}")] InvalidFormat(String),
    #[error("invalid float value")] ParseFloat(#[from] std::num::ParseFloatError),
    #[error("shape dimensions must be positive")] NonPositive,
}

fn parse_args<const N: usize>(inner: &str) -> Result<Option<[f32; N]>, ShapeParseError> {
    let parts: Vec<_> = inner.split(',').map(str::trim).collect();
    if parts.len() != N {
        return Ok(None);
    }
    let mut out = [0.0; N];
    for (slot, part) in out.iter_mut().zip(parts) {
        *slot = part.parse::<f32>()?;
    }
    if out.iter().any(|v| *v <= 0.0) {
        return Err(ShapeParseError::NonPositive);
    }
    Ok(Some(out))
}

impl FromStr for LinkShape {
    type Err = ShapeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || ShapeParseError::InvalidFormat(s.to_string());
        let (head, rest) = s.split_once('(').ok_or_else(invalid)?;
        let inner = rest.strip_suffix(')').ok_or_else(invalid)?;
        let shape = match head.trim() {
            "Sphere" => parse_args::<1>(inner)?.map(|[r]| LinkShape::Sphere(r)),
            "Box" => parse_args::<3>(inner)?.map(|[x, y, z]| LinkShape::Cuboid(x, y, z)),
            "Capsule" => parse_args::<2>(inner)?.map(|[l, r]| LinkShape::Capsule(l, r)),
            "Cylinder" => parse_args::<2>(inner)?.map(|[l, r]| LinkShape::Cylinder(l, r)),
            _ => None,
        };
        shape.ok_or_else(invalid)
    }
}

impl fmt::Display for LinkShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            LinkShape::Sphere(r) => write!(f, "Sphere({r})"),
            LinkShape::Cuboid(x, y, z) => write!(f, "Box({x},{y},{z})"),
            LinkShape::Capsule(l, r) => write!(f, "Capsule({l},{r})"),
            LinkShape::Cylinder(l, r) => write!(f, "Cylinder({l},{r})"),
        }
    }
}

impl LinkShape {
    /// Build a Rapier ColliderBuilder from this shape
    pub fn to_rapier(&self, groups: InteractionGroups) -> ColliderBuilder {
        let builder = match *self {
            LinkShape::Sphere(r) => ColliderBuilder::ball(r),
            LinkShape::Cuboid(x, y, z) => ColliderBuilder::cuboid(x / 2.0, y / 2.0, z / 2.0),
            LinkShape::Capsule(l, r) => ColliderBuilder::capsule_z(l / 2.0, r),
            LinkShape::Cylinder(l, r) => ColliderBuilder::cylinder(l / 2.0, r)
                // rapier cylinders are built along y
                .rotation(vector![std::f32::consts::FRAC_PI_2, 0.0, 0.0]),
        };
        builder.collision_groups(groups)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_shape() {
        assert_eq!("Sphere(0.5)".parse::<LinkShape>(), Ok(LinkShape::Sphere(0.5)));
        assert_eq!(" Box(1, 2, 3) ".parse::<LinkShape>(), Ok(LinkShape::Cuboid(1.0, 2.0, 3.0)));
        assert_eq!("Capsule(1,0.1)".parse::<LinkShape>(), Ok(LinkShape::Capsule(1.0, 0.1)));
        assert_eq!("Cylinder(2,0.25)".parse::<LinkShape>(), Ok(LinkShape::Cylinder(2.0, 0.25)));
    }

    #[test]
    fn display_parses_back() {
        let shape = LinkShape::Cuboid(0.5, 1.0, 2.0);
        assert_eq!(shape.to_string().parse::<LinkShape>(), Ok(shape));
    }

    #[test]
    fn rejects_bad_input() {
        assert!(matches!("Cone(1)".parse::<LinkShape>(), Err(ShapeParseError::InvalidFormat(_))));
        assert!(matches!("Box(1,2)".parse::<LinkShape>(), Err(ShapeParseError::InvalidFormat(_))));
        assert!(matches!("Sphere(x)".parse::<LinkShape>(), Err(ShapeParseError::ParseFloat(_))));
        assert_eq!("Sphere(-1)".parse::<LinkShape>(), Err(ShapeParseError::NonPositive));
        assert!(matches!("Sphere 1".parse::<LinkShape>(), Err(ShapeParseError::InvalidFormat(_))));
    }
}
