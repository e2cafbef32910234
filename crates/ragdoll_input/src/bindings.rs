//! Per-controller key bindings
//!
//! Each controller owns a static table from keys to the actions it
//! understands. Tables are validated once, at construction; resolving a
//! snapshot afterwards cannot fail, and unbound keys are simply ignored.

use std::fmt;

use winit::keyboard::KeyCode;

use crate::action::{Action, ActionSet};
use crate::keyboard::KeySnapshot;

/// Default ragdoll controls
pub const STICKMAN_BINDINGS: &[(KeyCode, Action)] = &[
    (KeyCode::KeyA, Action::Left),
    (KeyCode::KeyD, Action::Right),
    (KeyCode::KeyW, Action::Jump),
    (KeyCode::ArrowUp, Action::Pick),
    (KeyCode::KeyS, Action::Slump),
    (KeyCode::KeyR, Action::Reset),
];

/// Default vehicle controls
pub const VEHICLE_BINDINGS: &[(KeyCode, Action)] = &[
    (KeyCode::ArrowLeft, Action::DriveLeft),
    (KeyCode::ArrowRight, Action::DriveRight),
    (KeyCode::ArrowDown, Action::Hop),
    (KeyCode::Backspace, Action::Reset),
];

/// Error type for invalid binding tables
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindingError {
    /// One key mapped to two different actions
    DuplicateKey {
        key: KeyCode,
        first: Action,
        second: Action,
    },
    /// An action the controller does not understand
    ActionNotAllowed { key: KeyCode, action: Action },
}

impl fmt::Display for BindingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindingError::DuplicateKey { key, first, second } => write!(
                f,
                "Binding error: {:?} is bound to both {:?} and {:?}",
                key, first, second
            ),
            BindingError::ActionNotAllowed { key, action } => write!(
                f,
                "Binding error: {:?} is bound to {:?}, which this controller does not handle",
                key, action
            ),
        }
    }
}

impl std::error::Error for BindingError {}

/// Validated key-to-action table for one controller
#[derive(Debug, Clone, PartialEq)]
pub struct BindingTable {
    bindings: Vec<(KeyCode, Action)>,
}

impl BindingTable {
    /// Build a table, rejecting keys bound twice and actions outside `allowed`
    ///
    /// Several keys may share one action.
    pub fn new(bindings: &[(KeyCode, Action)], allowed: ActionSet) -> Result<Self, BindingError> {
        let mut table: Vec<(KeyCode, Action)> = Vec::with_capacity(bindings.len());
        for &(key, action) in bindings {
            if !allowed.held(action) {
                return Err(BindingError::ActionNotAllowed { key, action });
            }
            match table.iter().find(|(k, _)| *k == key) {
                Some(&(_, first)) if first != action => {
                    return Err(BindingError::DuplicateKey {
                        key,
                        first,
                        second: action,
                    });
                }
                Some(_) => {}
                None => table.push((key, action)),
            }
        }
        Ok(Self { bindings: table })
    }

    /// The ragdoll preset
    pub fn stickman() -> Self {
        Self {
            bindings: STICKMAN_BINDINGS.to_vec(),
        }
    }

    /// The vehicle preset
    pub fn vehicle() -> Self {
        Self {
            bindings: VEHICLE_BINDINGS.to_vec(),
        }
    }

    /// Actions whose keys are held in the snapshot
    pub fn resolve(&self, snapshot: &KeySnapshot) -> ActionSet {
        self.bindings
            .iter()
            .filter(|(key, _)| snapshot.is_pressed(*key))
            .map(|(_, action)| *action)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_are_valid() {
        assert_eq!(
            BindingTable::new(STICKMAN_BINDINGS, ActionSet::CHARACTER),
            Ok(BindingTable::stickman())
        );
        assert_eq!(
            BindingTable::new(VEHICLE_BINDINGS, ActionSet::VEHICLE),
            Ok(BindingTable::vehicle())
        );
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let result = BindingTable::new(
            &[(KeyCode::KeyA, Action::Left), (KeyCode::KeyA, Action::Right)],
            ActionSet::CHARACTER,
        );
        assert_eq!(
            result,
            Err(BindingError::DuplicateKey {
                key: KeyCode::KeyA,
                first: Action::Left,
                second: Action::Right,
            })
        );
    }

    #[test]
    fn test_repeated_identical_binding_collapses() {
        let table = BindingTable::new(
            &[(KeyCode::KeyA, Action::Left), (KeyCode::KeyA, Action::Left)],
            ActionSet::CHARACTER,
        )
        .unwrap();
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_disallowed_action_rejected() {
        let result = BindingTable::new(&[(KeyCode::Space, Action::Hop)], ActionSet::CHARACTER);
        assert!(matches!(result, Err(BindingError::ActionNotAllowed { action: Action::Hop, .. })));
    }

    #[test]
    fn test_error_display() {
        let err = BindingError::ActionNotAllowed {
            key: KeyCode::Space,
            action: Action::Hop,
        };
        let msg = format!("{}", err);
        assert!(msg.contains("Binding error"));
        assert!(msg.contains("Hop"));
    }

    #[test]
    fn test_resolve_held_keys() {
        let table = BindingTable::stickman();
        let snapshot = KeySnapshot::with_keys([KeyCode::KeyA, KeyCode::KeyW, KeyCode::ArrowLeft]);
        let actions = table.resolve(&snapshot);
        assert_eq!(actions, ActionSet::LEFT | ActionSet::JUMP);
    }

    #[test]
    fn test_many_keys_one_action() {
        let table = BindingTable::new(
            &[(KeyCode::KeyA, Action::Left), (KeyCode::ArrowLeft, Action::Left)],
            ActionSet::CHARACTER,
        )
        .unwrap();
        assert!(table.resolve(&KeySnapshot::with_keys([KeyCode::ArrowLeft])).held(Action::Left));
        assert!(table.resolve(&KeySnapshot::with_keys([KeyCode::KeyA])).held(Action::Left));
        assert!(!table.resolve(&KeySnapshot::with_keys([KeyCode::KeyA])).held(Action::Jump));
    }
}
