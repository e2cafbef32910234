//! Logical actions controllers respond to

use bitflags::bitflags;

/// A logical action, independent of the key that triggers it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Walk left
    Left,
    /// Walk right
    Right,
    Jump,
    /// Grab the nearest grabbable body while held
    Pick,
    /// Go limp while held
    Slump,
    /// Tear down and rebuild the controlled entity
    Reset,
    DriveLeft,
    DriveRight,
    /// Upward impulse on the vehicle
    Hop,
}

bitflags! {
    /// A set of held actions
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ActionSet: u16 {
        const LEFT = 1 << 0;
        const RIGHT = 1 << 1;
        const JUMP = 1 << 2;
        const PICK = 1 << 3;
        const SLUMP = 1 << 4;
        const RESET = 1 << 5;
        const DRIVE_LEFT = 1 << 6;
        const DRIVE_RIGHT = 1 << 7;
        const HOP = 1 << 8;

        /// Everything a ragdoll character responds to
        const CHARACTER = Self::LEFT.bits()
            | Self::RIGHT.bits()
            | Self::JUMP.bits()
            | Self::PICK.bits()
            | Self::SLUMP.bits()
            | Self::RESET.bits();
        /// Everything a vehicle responds to
        const VEHICLE = Self::DRIVE_LEFT.bits()
            | Self::DRIVE_RIGHT.bits()
            | Self::HOP.bits()
            | Self::RESET.bits();
    }
}

impl Action {
    /// The flag for this action in an [`ActionSet`]
    pub const fn flag(self) -> ActionSet {
        match self {
            Action::Left => ActionSet::LEFT,
            Action::Right => ActionSet::RIGHT,
            Action::Jump => ActionSet::JUMP,
            Action::Pick => ActionSet::PICK,
            Action::Slump => ActionSet::SLUMP,
            Action::Reset => ActionSet::RESET,
            Action::DriveLeft => ActionSet::DRIVE_LEFT,
            Action::DriveRight => ActionSet::DRIVE_RIGHT,
            Action::Hop => ActionSet::HOP,
        }
    }
}

impl ActionSet {
    /// Is the action held
    pub fn held(&self, action: Action) -> bool {
        self.contains(action.flag())
    }
}

impl From<Action> for ActionSet {
    fn from(action: Action) -> Self {
        action.flag()
    }
}

impl FromIterator<Action> for ActionSet {
    fn from_iter<I: IntoIterator<Item = Action>>(iter: I) -> Self {
        iter.into_iter().fold(ActionSet::empty(), |set, a| set | a.flag())
    }
}
