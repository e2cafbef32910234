//! Upside-down vehicle recovery
//!
//! Once the vehicle has been inverted for long enough, a fixed burst of
//! angular impulse and lift is applied every tick until it is roughly
//! upright or the burst runs out. The burst is open loop: its strength
//! does not depend on how far the vehicle is from upright.

use std::f32::consts::{FRAC_PI_2, FRAC_PI_6, PI};

use ragdoll_math::{normalize_angle, Vec2};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecoveryConfig {
    /// Seconds spent inverted before the flip starts
    pub threshold: f32,
    /// Maximum ticks of a flip
    pub max_frames: u32,
    /// Angular impulse per tick, signed by the flip direction
    pub angular_impulse: f32,
    /// Upward force per tick
    pub lift_force: f32,
    /// Tilts within this of PI count as inverted
    pub inverted_window: f32,
    /// Tilts within this of zero end a flip
    pub upright_tolerance: f32,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            threshold: 1.5,
            max_frames: 40,
            angular_impulse: 10.0,
            lift_force: 10.0 * 4.0,
            inverted_window: FRAC_PI_2,
            upright_tolerance: FRAC_PI_6,
        }
    }
}

/// Per-vehicle recovery state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VehicleControlState {
    /// Seconds inverted while not flipping
    pub upside_down_time: f32,
    pub flipping: bool,
    pub flip_frame: u32,
    /// +1 or -1
    pub flip_direction: f32,
}

impl Default for VehicleControlState {
    fn default() -> Self {
        Self {
            upside_down_time: 0.0,
            flipping: false,
            flip_frame: 0,
            flip_direction: 1.0,
        }
    }
}

/// What to apply to the chassis this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecoveryCommand {
    pub angular_impulse: f32,
    pub force: Vec2,
}

/// Is a normalized tilt close enough to PI to count as upside down
pub fn is_inverted(tilt: f32, window: f32) -> bool {
    (tilt.abs() - PI).abs() < window
}

/// Advance the recovery state machine by one tick
///
/// `angle` is the raw chassis angle; `dt` is the tick length in seconds.
pub fn update_recovery(
    state: &mut VehicleControlState,
    angle: f32,
    dt: f32,
    config: &RecoveryConfig,
) -> Option<RecoveryCommand> {
    let tilt = normalize_angle(angle);

    if !state.flipping {
        if !is_inverted(tilt, config.inverted_window) {
            state.upside_down_time = 0.0;
            return None;
        }
        state.upside_down_time += dt;
        if state.upside_down_time <= config.threshold {
            return None;
        }
        // Turn the short way back to zero
        state.flipping = true;
        state.flip_frame = 0;
        state.upside_down_time = 0.0;
        state.flip_direction = if tilt > 0.0 { -1.0 } else { 1.0 };
        log::debug!("Vehicle inverted, flipping {:+}", state.flip_direction);
    }

    let command = RecoveryCommand {
        angular_impulse: config.angular_impulse * state.flip_direction,
        force: Vec2::new(0.0, config.lift_force),
    };
    state.flip_frame += 1;
    if state.flip_frame >= config.max_frames || tilt.abs() < config.upright_tolerance {
        state.flipping = false;
        state.upside_down_time = 0.0;
        log::debug!("Flip finished after {} frames", state.flip_frame);
    }
    Some(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    #[test]
    fn test_inverted_window() {
        assert!(is_inverted(PI, FRAC_PI_2));
        assert!(is_inverted(-PI + 0.3, FRAC_PI_2));
        assert!(!is_inverted(0.0, FRAC_PI_2));
        assert!(!is_inverted(FRAC_PI_2 - 0.1, FRAC_PI_2));
    }

    #[test]
    fn test_upright_resets_timer() {
        let config = RecoveryConfig::default();
        let mut state = VehicleControlState::default();
        for _ in 0..30 {
            update_recovery(&mut state, PI, DT, &config);
        }
        assert!(state.upside_down_time > 0.0);
        assert!(update_recovery(&mut state, 0.1, DT, &config).is_none());
        assert_eq!(state.upside_down_time, 0.0);
    }

    #[test]
    fn test_flip_starts_after_threshold() {
        let config = RecoveryConfig::default();
        let mut state = VehicleControlState::default();
        let mut started_at = None;
        for tick in 1..=120 {
            if update_recovery(&mut state, PI, DT, &config).is_some() {
                started_at = Some(tick);
                break;
            }
        }
        // 1.5 s at 60 Hz
        let started_at = started_at.unwrap();
        assert!((90..=92).contains(&started_at), "started at {}", started_at);
        assert!(state.flipping);
        assert_eq!(state.upside_down_time, 0.0);
    }

    #[test]
    fn test_direction_from_tilt_sign() {
        let config = RecoveryConfig {
            threshold: 0.0,
            ..RecoveryConfig::default()
        };
        let mut state = VehicleControlState::default();
        let command = update_recovery(&mut state, 3.0, DT, &config).unwrap();
        assert_eq!(state.flip_direction, -1.0);
        assert_eq!(command.angular_impulse, -10.0);
        assert_eq!(command.force, Vec2::new(0.0, 40.0));

        let mut state = VehicleControlState::default();
        update_recovery(&mut state, -3.0, DT, &config);
        assert_eq!(state.flip_direction, 1.0);
    }

    #[test]
    fn test_raw_angle_is_normalized() {
        let config = RecoveryConfig {
            threshold: 0.0,
            ..RecoveryConfig::default()
        };
        let mut state = VehicleControlState::default();
        // Three full turns plus a half: upside down
        assert!(update_recovery(&mut state, 7.0 * PI, DT, &config).is_some());
    }

    #[test]
    fn test_flip_ends_at_frame_cap() {
        let config = RecoveryConfig {
            threshold: 0.0,
            ..RecoveryConfig::default()
        };
        let mut state = VehicleControlState::default();
        let mut frames = 0;
        while update_recovery(&mut state, PI, DT, &config).is_some() && state.flipping {
            frames += 1;
            assert!(frames < 100);
        }
        assert!(!state.flipping);
        assert_eq!(state.flip_frame, 40);
    }

    #[test]
    fn test_flip_ends_when_upright() {
        let config = RecoveryConfig {
            threshold: 0.0,
            ..RecoveryConfig::default()
        };
        let mut state = VehicleControlState::default();
        update_recovery(&mut state, PI, DT, &config);
        assert!(state.flipping);
        // Still gets this tick's push, then stops
        assert!(update_recovery(&mut state, 0.2, DT, &config).is_some());
        assert!(!state.flipping);
        assert!(update_recovery(&mut state, 0.2, DT, &config).is_none());
    }
}
