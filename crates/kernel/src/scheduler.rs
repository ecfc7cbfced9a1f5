//! Named per-frame task list ordered by a numeric sort value.
//!
//! The scheduler stores task *descriptions* of type `T` (usually a closed
//! enum owned by the caller) rather than closures. Each frame the caller
//! asks for the due tasks and executes them against its own state, which
//! keeps the scheduler free of borrows into that state.

/// Errors from task registration.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TaskError {
    #[error("invalid delay {delay} for task '{name}'")]
    InvalidDelay { name: String, delay: f64 },
}

#[derive(Debug, Clone)]
struct TaskEntry<T> {
    name: String,
    sort: i32,
    seq: u64,
    task: T,
    /// Set for one-shot tasks: the frame time at which they fire.
    wake_at: Option<f64>,
}

/// A task handed out by [`Scheduler::due`].
#[derive(Debug, Clone, PartialEq)]
pub struct DueTask<T> {
    pub name: String,
    pub sort: i32,
    pub task: T,
    pub one_shot: bool,
    seq: u64,
}

/// Sorted collection of named frame tasks.
#[derive(Debug, Clone)]
pub struct Scheduler<T> {
    entries: Vec<TaskEntry<T>>,
    next_seq: u64,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            next_seq: 0,
        }
    }
}

impl<T: Clone> Scheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a task that runs every frame. A task already registered
    /// under `name` is replaced.
    pub fn add(&mut self, name: impl Into<String>, sort: i32, task: T) {
        self.insert(name.into(), sort, task, None);
    }

    /// Register a one-shot task that fires once the frame time reaches
    /// `now + delay`. Runs with sort 0.
    pub fn add_delayed(
        &mut self,
        name: impl Into<String>,
        delay: f64,
        now: f64,
        task: T,
    ) -> Result<(), TaskError> {
        let name = name.into();
        if !delay.is_finite() || delay < 0.0 {
            return Err(TaskError::InvalidDelay { name, delay });
        }
        self.insert(name, 0, task, Some(now + delay));
        Ok(())
    }

    fn insert(&mut self, name: String, sort: i32, task: T, wake_at: Option<f64>) {
        if self.remove(&name) {
            tracing::debug!(task = %name, "replacing task");
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.push(TaskEntry {
            name,
            sort,
            seq,
            task,
            wake_at,
        });
        self.entries.sort_by_key(|e| (e.sort, e.seq));
    }

    /// Remove the task named `name`. Returns false if none was registered.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.name != name);
        self.entries.len() != before
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.name == name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Task names in execution order.
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }

    /// Tasks that should run in a frame starting at `now`, in order.
    pub fn due(&self, now: f64) -> Vec<DueTask<T>> {
        self.entries
            .iter()
            .filter(|e| e.wake_at.is_none_or(|at| at <= now))
            .map(|e| DueTask {
                name: e.name.clone(),
                sort: e.sort,
                task: e.task.clone(),
                one_shot: e.wake_at.is_some(),
                seq: e.seq,
            })
            .collect()
    }

    /// True if `due` is still registered (it was not removed or replaced by
    /// an earlier task in the same frame).
    pub fn is_live(&self, due: &DueTask<T>) -> bool {
        self.entries.iter().any(|e| e.seq == due.seq)
    }

    /// Retire a one-shot task after it ran. Repeating tasks are untouched.
    pub fn finish(&mut self, due: &DueTask<T>) {
        if due.one_shot {
            self.entries.retain(|e| e.seq != due.seq);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(s: &Scheduler<&'static str>, now: f64) -> Vec<&'static str> {
        s.due(now).into_iter().map(|d| d.task).collect()
    }

    #[test]
    fn runs_in_sort_order() {
        let mut s = Scheduler::new();
        s.add("trace", 100, "trace");
        s.add("control", 10, "control");
        s.add("state", 50, "state");
        assert_eq!(order(&s, 0.0), vec!["control", "state", "trace"]);
    }

    #[test]
    fn equal_sort_keeps_insertion_order() {
        let mut s = Scheduler::new();
        s.add("a", 5, "a");
        s.add("b", 5, "b");
        s.add("c", 5, "c");
        assert_eq!(order(&s, 0.0), vec!["a", "b", "c"]);
    }

    #[test]
    fn add_replaces_same_name() {
        let mut s = Scheduler::new();
        s.add("control", 10, "old");
        s.add("control", 10, "new");
        assert_eq!(s.len(), 1);
        assert_eq!(order(&s, 0.0), vec!["new"]);
    }

    #[test]
    fn remove_absent_is_noop() {
        let mut s: Scheduler<&str> = Scheduler::new();
        assert!(!s.remove("traceUpdate"));
        s.add("traceUpdate", 100, "t");
        assert!(s.remove("traceUpdate"));
        assert!(!s.contains("traceUpdate"));
    }

    #[test]
    fn delayed_task_fires_once() {
        let mut s = Scheduler::new();
        s.add_delayed("hide", 2.0, 1.0, "hide").unwrap();
        assert!(order(&s, 2.5).is_empty());

        let due = s.due(3.0);
        assert_eq!(due.len(), 1);
        assert!(due[0].one_shot);
        s.finish(&due[0]);
        assert!(s.is_empty());
    }

    #[test]
    fn replaced_task_is_not_live() {
        let mut s = Scheduler::new();
        s.add_delayed("hide", 0.0, 0.0, "first").unwrap();
        let due = s.due(0.0);
        s.add_delayed("hide", 5.0, 0.0, "second").unwrap();
        assert!(!s.is_live(&due[0]));
        // Finishing the stale entry must not retire its replacement.
        s.finish(&due[0]);
        assert!(s.contains("hide"));
    }

    #[test]
    fn negative_delay_rejected() {
        let mut s = Scheduler::new();
        let err = s.add_delayed("x", -1.0, 0.0, "x").unwrap_err();
        assert!(matches!(err, TaskError::InvalidDelay { .. }));
    }

    #[test]
    fn names_follow_execution_order() {
        let mut s = Scheduler::new();
        s.add("late", 1, ());
        s.add("early", -1, ());
        assert_eq!(s.names(), vec!["early", "late"]);
    }
}
