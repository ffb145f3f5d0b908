//! Pure task lifecycle transformations.
//!
//! # Responsibility
//! - Turn `(collection, intent)` into the next collection.
//!
//! # Invariants
//! - Input slices are never mutated; every operation returns a new `Vec`.
//! - `completed` is the only field a toggle changes.
//! - Unknown ids are a no-op, not an error.
//! - New tasks are appended; display order is derived by bucketing.

use crate::model::task::{Instant, Task, TaskDraft, TaskId, TaskValidationError};
use uuid::Uuid;

/// User answer to a destructive-action prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed,
    Declined,
}

impl Confirmation {
    pub fn is_confirmed(self) -> bool {
        matches!(self, Self::Confirmed)
    }
}

impl From<bool> for Confirmation {
    fn from(value: bool) -> Self {
        if value {
            Self::Confirmed
        } else {
            Self::Declined
        }
    }
}

/// Validates `draft` and appends it as a new pending task.
///
/// Returns the next collection and the created task.
///
/// # Errors
/// - `TaskValidationError` for a blank title or a due instant `<= now`; the
///   input collection is untouched.
pub fn create_task(
    tasks: &[Task],
    draft: TaskDraft,
    now: Instant,
) -> Result<(Vec<Task>, Task), TaskValidationError> {
    draft.validate(now)?;

    let id = fresh_id(tasks);
    let task = draft.into_task(id);
    let mut next = Vec::with_capacity(tasks.len() + 1);
    next.extend_from_slice(tasks);
    next.push(task.clone());
    Ok((next, task))
}

/// Flips `completed` on the task with `id`, if present.
pub fn toggle_complete(tasks: &[Task], id: TaskId) -> Vec<Task> {
    tasks
        .iter()
        .map(|task| {
            if task.id == id {
                Task {
                    completed: !task.completed,
                    ..task.clone()
                }
            } else {
                task.clone()
            }
        })
        .collect()
}

/// Removes the task with `id`, if present.
pub fn delete_task(tasks: &[Task], id: TaskId) -> Vec<Task> {
    tasks.iter().filter(|task| task.id != id).cloned().collect()
}

/// Removes every completed task.
pub fn clear_completed(tasks: &[Task]) -> Vec<Task> {
    tasks.iter().filter(|task| !task.completed).cloned().collect()
}

fn fresh_id(tasks: &[Task]) -> TaskId {
    loop {
        let candidate = Uuid::new_v4();
        if !candidate.is_nil() && tasks.iter().all(|task| task.id != candidate) {
            return candidate;
        }
    }
}
