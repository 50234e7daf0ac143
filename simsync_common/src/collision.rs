use crate::types::BodyHandle;
use rapier3d::geometry::{Group, InteractionGroups};

/// Number of distinct collision groups rapier offers
pub const GROUP_COUNT: u32 = 32;

/// Collision group bit of a body. Bodies beyond the 32nd share bits, which only
/// means those pairs stop colliding with each other.
#[inline]
pub fn body_group(body: BodyHandle) -> Group {
    Group::from_bits_truncate(1u32 << (body.0 % GROUP_COUNT))
}

/// Interaction groups for every link of `body`: links of the same body never
/// collide with each other, but collide with every other body.
#[inline]
pub fn interaction_groups(body: BodyHandle) -> InteractionGroups {
    let membership = body_group(body);
    InteractionGroups::new(membership, Group::ALL - membership)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_body_links_do_not_interact() {
        let a = interaction_groups(BodyHandle(3));
        assert!(!a.test(a));
    }

    #[test]
    fn distinct_bodies_interact() {
        let a = interaction_groups(BodyHandle(0));
        let b = interaction_groups(BodyHandle(1));
        assert!(a.test(b));
        assert!(b.test(a));
    }

    #[test]
    fn group_bits_wrap() {
        assert_eq!(body_group(BodyHandle(33)), body_group(BodyHandle(1)));
    }
}
