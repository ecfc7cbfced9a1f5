/// The frame tasks the sandbox schedules.
///
/// The scheduler stores these by value; [`crate::Sandbox::frame`] matches on
/// them to run the work against its own state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimTask {
    /// Drain queued key events into the key map.
    InputDispatch,
    /// Integrate the actor of interest's motion.
    ActorControl,
    AiUpdate,
    CollisionTraverse,
    /// Record the actor's location and velocity and run the state hook.
    ActorStateUpdate,
    /// Append one line to the trace file.
    TraceUpdate,
    /// Hide the on-screen notice. One-shot.
    HideUserDialog,
}

impl SimTask {
    /// Scheduler name. Adding a task under a name already in use replaces it.
    pub const fn name(self) -> &'static str {
        match self {
            Self::InputDispatch => "inputDispatch",
            Self::ActorControl => "actorControl",
            Self::AiUpdate => "AIUpdate",
            Self::CollisionTraverse => "collisionTraverse",
            Self::ActorStateUpdate => "actorStateUpdate",
            Self::TraceUpdate => "traceUpdate",
            Self::HideUserDialog => "destroyMessage",
        }
    }

    pub const fn sort(self) -> i32 {
        match self {
            Self::InputDispatch | Self::HideUserDialog => 0,
            Self::ActorControl => 10,
            Self::AiUpdate => 20,
            Self::CollisionTraverse => 30,
            Self::ActorStateUpdate => 50,
            Self::TraceUpdate => 100,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeating_tasks_are_ordered_by_sort() {
        let order = [
            SimTask::InputDispatch,
            SimTask::ActorControl,
            SimTask::AiUpdate,
            SimTask::CollisionTraverse,
            SimTask::ActorStateUpdate,
            SimTask::TraceUpdate,
        ];
        assert!(order.windows(2).all(|w| w[0].sort() < w[1].sort()));
    }

    #[test]
    fn names_are_distinct() {
        let mut names: Vec<_> = [
            SimTask::InputDispatch,
            SimTask::ActorControl,
            SimTask::AiUpdate,
            SimTask::CollisionTraverse,
            SimTask::ActorStateUpdate,
            SimTask::TraceUpdate,
            SimTask::HideUserDialog,
        ]
        .iter()
        .map(|t| t.name())
        .collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 7);
    }
}
