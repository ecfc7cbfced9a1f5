use simworld_kernel::ActorSnapshot;

use crate::providers::CollisionEvent;

/// Per-frame callbacks a scenario can plug into the sandbox.
///
/// Every method defaults to doing nothing.
pub trait SimHooks {
    /// Runs each frame after the actor's state has been recorded.
    fn actor_state_update(&mut self, _snapshot: &ActorSnapshot) {}

    /// Runs before each trace line is written. `message` persists between
    /// frames, so leaving it untouched repeats the last line's payload.
    fn trace_update(&mut self, _snapshot: &ActorSnapshot, _message: &mut String) {}

    fn on_actor_enter(&mut self, _event: &CollisionEvent) {}

    fn on_actor_exit(&mut self, _event: &CollisionEvent) {}
}

/// Hooks that do nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoHooks;

impl SimHooks for NoHooks {}
