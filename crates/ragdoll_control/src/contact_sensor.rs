//! Ground contact sensing
//!
//! Sums the outward normals of every contact touching any of a
//! character's bodies. The result points from the character into whatever
//! it is standing on, so for flat ground it is `(0, -1)`.

use ragdoll_math::Vec2;
use ragdoll_physics::{BodyKey, PhysicsWorld};

use crate::character::CharacterControlState;

/// Normalized sum of contact normals
///
/// Returns `None` when there were no contacts at all, and `(0, 1)` when
/// the normals cancel out.
pub fn aggregate_normals(normals: impl IntoIterator<Item = Vec2>) -> Option<Vec2> {
    let (sum, count) = normals
        .into_iter()
        .fold((Vec2::ZERO, 0usize), |(sum, count), n| (sum + n, count + 1));
    if count == 0 {
        return None;
    }
    Some(sum.normalized_or(Vec2::Y))
}

/// Update the ground normal and jump permission from current contacts
///
/// With no contacts the previous normal is kept and `can_jump` is left
/// alone; clearing it is the jump's job.
pub fn sense_ground<W: PhysicsWorld>(world: &W, bodies: &[BodyKey], state: &mut CharacterControlState) {
    let normals = bodies
        .iter()
        .flat_map(|&body| world.touching_contacts(body))
        // Contacts between the character's own limbs are not ground
        .filter(|contact| !bodies.contains(&contact.other))
        .map(|contact| contact.outward_normal());

    if let Some(normal) = aggregate_normals(normals) {
        state.ground_normal = normal;
        state.can_jump = true;
        log::trace!("Ground normal ({:.2}, {:.2})", normal.x, normal.y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 0.0001;

    #[test]
    fn test_no_contacts() {
        assert_eq!(aggregate_normals(std::iter::empty()), None);
    }

    #[test]
    fn test_single_normal_passes_through() {
        let n = aggregate_normals([Vec2::new(0.0, -1.0)]).unwrap();
        assert_eq!(n, Vec2::new(0.0, -1.0));
    }

    #[test]
    fn test_average_is_unit_length() {
        let n = aggregate_normals([
            Vec2::new(0.0, -1.0),
            Vec2::new(0.0, -1.0),
            Vec2::new(1.0, 0.0),
        ])
        .unwrap();
        assert!((n.length() - 1.0).abs() < EPSILON);
        assert!(n.x > 0.0 && n.y < 0.0);
    }

    #[test]
    fn test_cancelling_normals_fall_back_to_up() {
        let n = aggregate_normals([Vec2::new(1.0, 0.0), Vec2::new(-1.0, 0.0)]).unwrap();
        assert_eq!(n, Vec2::Y);
    }
}
