//! Contact observations reported to controllers

use crate::body::BodyKey;
use crate::collision::Manifold;
use ragdoll_math::Vec2;

/// Which role the observed body held in a contact pair
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContactSide {
    A,
    B,
}

/// One touching contact as seen from a single body
///
/// `normal` is the engine's pair normal, pointing from body A toward
/// body B. Use [`ContactObservation::outward_normal`] for a direction that
/// does not depend on which side the observer held.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ContactObservation {
    /// The body on the other side of the contact
    pub other: BodyKey,
    /// Pair normal, A toward B
    pub normal: Vec2,
    /// The observer's side of the pair
    pub side: ContactSide,
}

impl ContactObservation {
    /// Normal pointing from the observer toward the other body
    pub fn outward_normal(&self) -> Vec2 {
        match self.side {
            ContactSide::A => self.normal,
            ContactSide::B => -self.normal,
        }
    }
}

/// A contact recorded during the last step
#[derive(Clone, Copy, Debug)]
pub(crate) struct ContactRecord {
    pub body_a: BodyKey,
    pub body_b: BodyKey,
    pub manifold: Manifold,
}

impl ContactRecord {
    /// View this contact from `body`, if it took part
    pub fn observe(&self, body: BodyKey) -> Option<ContactObservation> {
        if self.body_a == body {
            Some(ContactObservation {
                other: self.body_b,
                normal: self.manifold.normal,
                side: ContactSide::A,
            })
        } else if self.body_b == body {
            Some(ContactObservation {
                other: self.body_a,
                normal: self.manifold.normal,
                side: ContactSide::B,
            })
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    fn three_keys() -> (BodyKey, BodyKey, BodyKey) {
        let mut map: SlotMap<BodyKey, ()> = SlotMap::with_key();
        (map.insert(()), map.insert(()), map.insert(()))
    }

    #[test]
    fn test_outward_normal_flips_for_side_b() {
        let (a, b, _) = three_keys();
        let obs = ContactObservation {
            other: a,
            normal: Vec2::Y,
            side: ContactSide::B,
        };
        assert_eq!(obs.outward_normal(), -Vec2::Y);
        let obs = ContactObservation {
            other: b,
            side: ContactSide::A,
            ..obs
        };
        assert_eq!(obs.outward_normal(), Vec2::Y);
    }

    #[test]
    fn test_record_observe_sides() {
        let (a, b, c) = three_keys();
        let record = ContactRecord {
            body_a: a,
            body_b: b,
            manifold: Manifold {
                point: Vec2::ZERO,
                normal: Vec2::Y,
                penetration: 0.0,
            },
        };
        let from_a = record.observe(a).unwrap();
        assert_eq!(from_a.side, ContactSide::A);
        assert_eq!(from_a.other, b);
        let from_b = record.observe(b).unwrap();
        assert_eq!(from_b.side, ContactSide::B);
        assert_eq!(from_b.other, a);
        assert!(record.observe(c).is_none());
    }
}
