//! Jump controller
//!
//! A jump sets the torso velocity outright instead of adding an impulse,
//! so holding the key can never stack jumps. After a jump the character
//! must touch something again (the contact sensor re-arms `can_jump`) and
//! the cooldown must have run out.

use ragdoll_math::Vec2;
use serde::{Deserialize, Serialize};

use crate::character::CharacterControlState;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JumpConfig {
    /// Multiplies the ground normal, which points into the ground
    pub strength: f32,
    /// Added straight up on top of the normal component
    pub vertical_boost: f32,
    pub cooldown_frames: u32,
}

impl Default for JumpConfig {
    fn default() -> Self {
        Self {
            strength: -25.0,
            vertical_boost: 50.0,
            cooldown_frames: 5,
        }
    }
}

/// Advance the cooldown and decide whether to jump this tick
///
/// Returns the velocity to give the torso when a jump fires.
pub fn update_jump(state: &mut CharacterControlState, held: bool, config: &JumpConfig) -> Option<Vec2> {
    state.jump_cooldown = state.jump_cooldown.saturating_sub(1);

    if !(held && state.can_jump && state.jump_cooldown == 0) {
        return None;
    }

    state.jump_cooldown = config.cooldown_frames;
    state.can_jump = false;
    let velocity = state.ground_normal * config.strength + Vec2::new(0.0, config.vertical_boost);
    log::debug!("Jump with velocity ({:.1}, {:.1})", velocity.x, velocity.y);
    Some(velocity)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grounded() -> CharacterControlState {
        CharacterControlState {
            can_jump: true,
            ground_normal: Vec2::new(0.0, -1.0),
            ..CharacterControlState::default()
        }
    }

    #[test]
    fn test_jump_from_flat_ground() {
        let mut state = grounded();
        let velocity = update_jump(&mut state, true, &JumpConfig::default()).unwrap();
        assert_eq!(velocity, Vec2::new(0.0, 75.0));
        assert!(!state.can_jump);
        assert_eq!(state.jump_cooldown, 5);
    }

    #[test]
    fn test_no_jump_without_input() {
        let mut state = grounded();
        assert!(update_jump(&mut state, false, &JumpConfig::default()).is_none());
        assert!(state.can_jump);
    }

    #[test]
    fn test_no_jump_while_airborne() {
        let mut state = CharacterControlState {
            can_jump: false,
            ..grounded()
        };
        assert!(update_jump(&mut state, true, &JumpConfig::default()).is_none());
    }

    #[test]
    fn test_consecutive_ticks_cannot_double_jump() {
        let mut state = grounded();
        let config = JumpConfig::default();
        assert!(update_jump(&mut state, true, &config).is_some());
        assert!(update_jump(&mut state, true, &config).is_none());
    }

    #[test]
    fn test_cooldown_blocks_even_with_contact() {
        let mut state = grounded();
        let config = JumpConfig::default();
        update_jump(&mut state, true, &config);
        // Contact re-arms the jump right away, but the cooldown still runs
        for _ in 0..4 {
            state.can_jump = true;
            assert!(update_jump(&mut state, true, &config).is_none());
        }
        state.can_jump = true;
        assert!(update_jump(&mut state, true, &config).is_some());
    }

    #[test]
    fn test_cooldown_does_not_underflow() {
        let mut state = CharacterControlState {
            can_jump: false,
            ..grounded()
        };
        for _ in 0..10 {
            update_jump(&mut state, false, &JumpConfig::default());
        }
        assert_eq!(state.jump_cooldown, 0);
    }

    #[test]
    fn test_sloped_ground_tilts_jump() {
        let mut state = CharacterControlState {
            ground_normal: Vec2::new(0.6, -0.8),
            ..grounded()
        };
        let velocity = update_jump(&mut state, true, &JumpConfig::default()).unwrap();
        assert!((velocity.x + 15.0).abs() < 0.001);
        assert!((velocity.y - 70.0).abs() < 0.001);
    }
}
