//! Input: physical keys, the closed set of sandbox actions, and the hotkey
//! map that turns key events into motion commands or triggered actions.
//!
//! # Invariants
//! - Each action has exactly one key, and each key drives at most one action.
//! - Motion axes are last-event-wins; no queuing of opposite presses.
//! - Unbound keys are ignored, never an error.

pub mod action;
pub mod key;
pub mod keymap;

pub use action::{Action, MotionAction, MotionAxis, MotionCommand};
pub use key::{Key, KeyCode, KeyEvent, KeyParseError, KeyState};
pub use keymap::{Dispatch, KeyMap};
