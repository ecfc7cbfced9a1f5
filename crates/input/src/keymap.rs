use crate::action::{Action, MotionAction, MotionCommand};
use crate::key::{Key, KeyCode, KeyEvent, KeyState};
use std::collections::BTreeMap;

/// What the sandbox should do in response to a key event.
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    /// Write a direction flag on the actor of interest.
    Motion(MotionCommand),
    /// Run a one-off action.
    Trigger(Action),
}

/// Bidirectional action ↔ key bindings.
#[derive(Debug, Clone, Default)]
pub struct KeyMap {
    by_action: BTreeMap<Action, Key>,
    by_key: BTreeMap<Key, Action>,
}

impl KeyMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// The stock bindings: arrows steer, `t` toggles the pip region, `f1`
    /// shows help, `escape` quits, and `control-\`` selects the default region.
    pub fn with_defaults() -> Self {
        let mut map = Self::new();
        map.bind(Action::Forward, Key::new(KeyCode::ArrowUp));
        map.bind(Action::Reverse, Key::new(KeyCode::ArrowDown));
        map.bind(Action::TurnLeft, Key::new(KeyCode::ArrowLeft));
        map.bind(Action::TurnRight, Key::new(KeyCode::ArrowRight));
        map.bind(Action::TogglePip, Key::char('t'));
        map.bind(Action::Help, Key::new(KeyCode::F(1)));
        map.bind(Action::Quit, Key::new(KeyCode::Escape));
        map.bind(
            Action::SelectDisplayRegion("default".into()),
            Key::control(KeyCode::Char('`')),
        );
        map
    }

    /// Bind `action` to `key`, replacing the action's previous key. If `key`
    /// already drove another action, that action loses its binding and is
    /// returned.
    pub fn bind(&mut self, action: Action, key: Key) -> Option<Action> {
        if let Some(old_key) = self.by_action.remove(&action) {
            self.by_key.remove(&old_key);
        }
        let displaced = self.by_key.insert(key, action.clone());
        if let Some(ref other) = displaced {
            self.by_action.remove(other);
            tracing::debug!(key = %key, from = %other, to = %action, "key rebound");
        }
        self.by_action.insert(action, key);
        displaced
    }

    pub fn key_of(&self, action: &Action) -> Option<Key> {
        self.by_action.get(action).copied()
    }

    pub fn action_of(&self, key: &Key) -> Option<&Action> {
        self.by_key.get(key)
    }

    pub fn len(&self) -> usize {
        self.by_action.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_action.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Action, &Key)> {
        self.by_action.iter()
    }

    /// Resolve a key event. A chord that is not bound falls back to the bare
    /// key, so holding control does not swallow the arrow keys.
    pub fn dispatch(&self, event: &KeyEvent) -> Option<Dispatch> {
        let action = self
            .by_key
            .get(&event.key)
            .or_else(|| self.by_key.get(&event.key.bare()));
        let Some(action) = action else {
            tracing::debug!(key = %event.key, "unbound key ignored");
            return None;
        };
        match (event.state, action.as_motion()) {
            (KeyState::Pressed, Some(motion)) => Some(Dispatch::Motion(motion.on_press())),
            (KeyState::Released, Some(motion)) => Some(Dispatch::Motion(motion.on_release())),
            (KeyState::Pressed, None) => Some(Dispatch::Trigger(action.clone())),
            (KeyState::Released, None) => None,
        }
    }

    /// Rebind one of the steering actions.
    pub fn bind_motion(&mut self, motion: MotionAction, key: Key) -> Option<Action> {
        self.bind(motion.into(), key)
    }

    /// One `Action     : Key` line per binding, title-cased.
    pub fn help_lines(&self) -> Vec<String> {
        self.by_action
            .iter()
            .map(|(action, key)| {
                format!(
                    "{:<10} : {}",
                    title_case(&action.to_string()),
                    title_case(&key.to_string())
                )
            })
            .collect()
    }
}

/// Upper-case the first letter of every alphabetic run, lower-case the rest.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use simworld_common::Axis;
    use crate::action::MotionAxis;

    fn up() -> Key {
        Key::new(KeyCode::ArrowUp)
    }

    #[test]
    fn defaults_cover_every_stock_action() {
        let map = KeyMap::with_defaults();
        assert_eq!(map.len(), 8);
        assert_eq!(map.key_of(&Action::Forward), Some(up()));
        assert_eq!(map.key_of(&Action::Quit), Some(Key::new(KeyCode::Escape)));
        assert_eq!(map.action_of(&Key::char('t')), Some(&Action::TogglePip));
    }

    #[test]
    fn press_and_release_forward() {
        let map = KeyMap::with_defaults();
        assert_eq!(
            map.dispatch(&KeyEvent::pressed(up())),
            Some(Dispatch::Motion(MotionCommand {
                axis: MotionAxis::Move,
                value: Axis::Positive
            }))
        );
        assert_eq!(
            map.dispatch(&KeyEvent::released(up())),
            Some(Dispatch::Motion(MotionCommand {
                axis: MotionAxis::Move,
                value: Axis::Neutral
            }))
        );
    }

    #[test]
    fn trigger_only_on_press() {
        let map = KeyMap::with_defaults();
        let f1 = Key::new(KeyCode::F(1));
        assert_eq!(
            map.dispatch(&KeyEvent::pressed(f1)),
            Some(Dispatch::Trigger(Action::Help))
        );
        assert_eq!(map.dispatch(&KeyEvent::released(f1)), None);
    }

    #[test]
    fn unbound_key_is_ignored() {
        let map = KeyMap::with_defaults();
        assert_eq!(map.dispatch(&KeyEvent::pressed(Key::char('z'))), None);
    }

    #[test]
    fn control_falls_back_to_bare_key() {
        let map = KeyMap::with_defaults();
        let event = KeyEvent::pressed(Key::control(KeyCode::ArrowUp));
        assert!(matches!(map.dispatch(&event), Some(Dispatch::Motion(_))));
        let chord = KeyEvent::pressed(Key::control(KeyCode::Char('`')));
        assert_eq!(
            map.dispatch(&chord),
            Some(Dispatch::Trigger(Action::SelectDisplayRegion("default".into())))
        );
    }

    #[test]
    fn rebinding_action_frees_old_key() {
        let mut map = KeyMap::with_defaults();
        map.bind_motion(MotionAction::Forward, Key::char('w'));
        assert_eq!(map.action_of(&up()), None);
        assert_eq!(map.action_of(&Key::char('w')), Some(&Action::Forward));
    }

    #[test]
    fn binding_used_key_displaces_other_action() {
        let mut map = KeyMap::with_defaults();
        let displaced = map.bind(Action::ToggleLight("l".into()), Key::char('t'));
        assert_eq!(displaced, Some(Action::TogglePip));
        assert_eq!(map.key_of(&Action::TogglePip), None);
        assert_eq!(map.len(), 8);
    }

    #[test]
    fn help_lines_are_title_cased_and_padded() {
        let map = KeyMap::with_defaults();
        let lines = map.help_lines();
        assert_eq!(lines.len(), map.len());
        assert!(lines.contains(&"Turn Left  : Arrow_Left".to_string()));
        assert!(lines.contains(&"Toggle Pip : T".to_string()));
        assert!(lines.contains(&"Default    : Control-`".to_string()));
    }

    #[test]
    fn title_case_words() {
        assert_eq!(title_case("turn right"), "Turn Right");
        assert_eq!(title_case("f1"), "F1");
        assert_eq!(title_case("arrow_up"), "Arrow_Up");
    }
}
