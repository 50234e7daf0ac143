use serde::{Deserialize, Serialize};
use std::fmt;

/// Plain 3-vector used on every public surface
pub type Vec3 = [f32; 3];

/// Joint (and child link) index inside one body. The root link has no parent
/// joint and lives at [`BASE_INDEX`].
pub type JointIndex = i32;

/// Reserved index of the base/root joint and link
pub const BASE_INDEX: JointIndex = -1;

/// Reserved joint name of the base/root joint
pub const BASE_JOINT_NAME: &str = "base";

/// Newtype wrapper for body identifiers issued by the physics engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BodyHandle(pub u32);

impl From<u32> for BodyHandle {
    fn from(id: u32) -> Self {
        BodyHandle(id)
    }
}
impl From<BodyHandle> for u32 {
    fn from(h: BodyHandle) -> Self {
        h.0
    }
}

impl fmt::Display for BodyHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Quaternion in the physics engine's component order: `[x, y, z, w]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct XyzwQuat(pub [f32; 4]);

/// Quaternion in the renderer's component order: `[w, x, y, z]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WxyzQuat(pub [f32; 4]);

impl XyzwQuat {
    pub const IDENTITY: XyzwQuat = XyzwQuat([0.0, 0.0, 0.0, 1.0]);

    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        XyzwQuat([x, y, z, w])
    }

    /// Reorder into the renderer convention
    pub const fn to_wxyz(self) -> WxyzQuat {
        let [x, y, z, w] = self.0;
        WxyzQuat([w, x, y, z])
    }
}

impl WxyzQuat {
    pub const IDENTITY: WxyzQuat = WxyzQuat([1.0, 0.0, 0.0, 0.0]);

    pub const fn new(w: f32, x: f32, y: f32, z: f32) -> Self {
        WxyzQuat([w, x, y, z])
    }

    /// Reorder into the physics engine convention
    pub const fn to_xyzw(self) -> XyzwQuat {
        let [w, x, y, z] = self.0;
        XyzwQuat([x, y, z, w])
    }
}

impl Default for XyzwQuat {
    fn default() -> Self {
        Self::IDENTITY
    }
}
impl Default for WxyzQuat {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl From<XyzwQuat> for WxyzQuat {
    fn from(q: XyzwQuat) -> Self {
        q.to_wxyz()
    }
}
impl From<WxyzQuat> for XyzwQuat {
    fn from(q: WxyzQuat) -> Self {
        q.to_xyzw()
    }
}

/// 8-bit RGB triple in the renderer's 0-255 range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    /// Default link color when a description carries none
    pub const STEEL_BLUE: Rgb = Rgb::new(91, 155, 213);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }

    /// Build from unit-range channels, clamping and rounding each one
    pub fn from_unit(r: f32, g: f32, b: f32) -> Self {
        let to_u8 = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        Rgb::new(to_u8(r), to_u8(g), to_u8(b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quaternion_orders_are_inverse() {
        let q = XyzwQuat::new(0.1, 0.2, 0.3, 0.9);
        assert_eq!(q.to_wxyz(), WxyzQuat::new(0.9, 0.1, 0.2, 0.3));
        assert_eq!(q.to_wxyz().to_xyzw(), q);
        assert_eq!(XyzwQuat::from(WxyzQuat::IDENTITY), XyzwQuat::IDENTITY);
    }

    #[test]
    fn rgb_from_unit_clamps() {
        assert_eq!(Rgb::from_unit(-1.0, 0.5, 2.0), Rgb::new(0, 128, 255));
    }
}
