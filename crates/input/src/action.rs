use simworld_common::Axis;
use std::fmt;

/// Something a hotkey can do in the sandbox.
///
/// The set is closed: every key binding resolves to one of these variants, and
/// the sandbox matches on them exhaustively.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Action {
    /// Drive the actor of interest forward while held.
    Forward,
    /// Drive the actor of interest backward while held.
    Reverse,
    TurnLeft,
    TurnRight,
    /// Toggle the display region of interest (picture-in-picture).
    TogglePip,
    /// Toggle the on-screen help.
    Help,
    Quit,
    SelectDisplayRegion(String),
    ToggleLight(String),
    ActivateCamera(String),
}

impl Action {
    /// The motion action behind this variant, if it drives the actor.
    pub fn as_motion(&self) -> Option<MotionAction> {
        match self {
            Self::Forward => Some(MotionAction::Forward),
            Self::Reverse => Some(MotionAction::Reverse),
            Self::TurnLeft => Some(MotionAction::TurnLeft),
            Self::TurnRight => Some(MotionAction::TurnRight),
            _ => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Forward => f.write_str("forward"),
            Self::Reverse => f.write_str("reverse"),
            Self::TurnLeft => f.write_str("turn left"),
            Self::TurnRight => f.write_str("turn right"),
            Self::TogglePip => f.write_str("toggle pip"),
            Self::Help => f.write_str("help"),
            Self::Quit => f.write_str("quit"),
            Self::SelectDisplayRegion(name)
            | Self::ToggleLight(name)
            | Self::ActivateCamera(name) => f.write_str(name),
        }
    }
}

/// The four actions that steer the actor of interest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MotionAction {
    Forward,
    Reverse,
    TurnLeft,
    TurnRight,
}

impl From<MotionAction> for Action {
    fn from(m: MotionAction) -> Self {
        match m {
            MotionAction::Forward => Self::Forward,
            MotionAction::Reverse => Self::Reverse,
            MotionAction::TurnLeft => Self::TurnLeft,
            MotionAction::TurnRight => Self::TurnRight,
        }
    }
}

/// Which of the actor's two direction flags a command writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MotionAxis {
    Move,
    Turn,
}

/// Write `value` into one direction flag of the actor of interest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MotionCommand {
    pub axis: MotionAxis,
    pub value: Axis,
}

impl MotionAction {
    pub fn axis(self) -> MotionAxis {
        match self {
            Self::Forward | Self::Reverse => MotionAxis::Move,
            Self::TurnLeft | Self::TurnRight => MotionAxis::Turn,
        }
    }

    /// Command issued when the bound key goes down.
    pub fn on_press(self) -> MotionCommand {
        let value = match self {
            Self::Forward | Self::TurnLeft => Axis::Positive,
            Self::Reverse | Self::TurnRight => Axis::Negative,
        };
        MotionCommand {
            axis: self.axis(),
            value,
        }
    }

    /// Command issued when the bound key comes up: the whole axis stops,
    /// even if the opposite key is still held.
    pub fn on_release(self) -> MotionCommand {
        MotionCommand {
            axis: self.axis(),
            value: Axis::Neutral,
        }
    }
}
