//! Task use-case service.
//!
//! # Responsibility
//! - Own the in-memory task collection and its backing store.
//! - Apply lifecycle operations, persist after every mutation, and schedule
//!   reminders for new tasks.
//!
//! # Invariants
//! - Only validation errors reach the caller; storage and notification
//!   failures are logged and reported through outcome flags.
//! - After a failed write, in-memory state may be ahead of the store until
//!   the next successful write.
//! - Reminders are never retracted on delete/complete.
//! - Log lines carry ids and counts only, never task titles.

use crate::model::task::{Instant, Task, TaskDraft, TaskId, TaskValidationError};
use crate::repo::kv_repo::KeyValueRepository;
use crate::repo::task_repo::TaskBlobRepository;
use crate::schedule::bucket::{bucket_tasks, group_by_date, DateGroup, TaskBuckets};
use crate::schedule::reminder::{schedule_reminder, NotificationSink, ReminderError, ReminderHandle};
use crate::service::lifecycle::{self, Confirmation};
use log::{debug, error, info, warn};

/// Result of a successful create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedTask {
    pub task: Task,
    /// Whether the new collection reached the store.
    pub persisted: bool,
    /// Handle of the scheduled reminder, `None` when declined or failed.
    pub reminder: Option<ReminderHandle>,
}

/// Result of toggle/delete/clear.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MutationOutcome {
    /// Whether the collection differs from before the call.
    pub changed: bool,
    /// Whether the store write succeeded; `false` when nothing was written.
    pub persisted: bool,
}

impl MutationOutcome {
    fn unchanged() -> Self {
        Self {
            changed: false,
            persisted: false,
        }
    }
}

/// Task list facade over a key-value store and a notification sink.
pub struct TaskService<R: KeyValueRepository, N: NotificationSink> {
    repo: TaskBlobRepository<R>,
    notifier: N,
    tasks: Vec<Task>,
}

impl<R: KeyValueRepository, N: NotificationSink> TaskService<R, N> {
    /// Creates a service and loads the current collection from `store`.
    pub fn open(store: R, notifier: N) -> Self {
        let repo = TaskBlobRepository::new(store);
        let tasks = repo.load();
        Self {
            repo,
            notifier,
            tasks,
        }
    }

    /// Re-reads the collection from the store, discarding in-memory state.
    pub fn reload(&mut self) -> &[Task] {
        self.tasks = self.repo.load();
        &self.tasks
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Validates and stores a new task, then schedules its reminder.
    ///
    /// # Errors
    /// - `TaskValidationError` on blank title or past instant; no state change.
    pub fn create_task(
        &mut self,
        draft: TaskDraft,
        now: Instant,
    ) -> Result<CreatedTask, TaskValidationError> {
        let (next, task) = match lifecycle::create_task(&self.tasks, draft, now) {
            Ok(created) => created,
            Err(err) => {
                info!(
                    "event=task_create module=service status=rejected error_code={}",
                    validation_code(&err)
                );
                return Err(err);
            }
        };

        self.tasks = next;
        let persisted = self.persist("task_create");

        let reminder = match schedule_reminder(&self.notifier, &task, now) {
            Ok(handle) => Some(handle),
            Err(ReminderError::Declined { .. }) => None,
            Err(err) => {
                warn!(
                    "event=task_create module=service status=degraded error_code=reminder_failed task_id={} error={}",
                    task.id, err
                );
                None
            }
        };

        info!(
            "event=task_create module=service status=ok task_id={} persisted={} reminder={}",
            task.id,
            persisted,
            reminder.is_some()
        );
        Ok(CreatedTask {
            task,
            persisted,
            reminder,
        })
    }

    /// Flips completion of `id`; unknown ids are a no-op.
    pub fn toggle_complete(&mut self, id: TaskId) -> MutationOutcome {
        let next = lifecycle::toggle_complete(&self.tasks, id);
        self.commit("task_toggle", next)
    }

    /// Deletes `id` once the user has confirmed.
    pub fn delete_task(&mut self, id: TaskId, confirmation: Confirmation) -> MutationOutcome {
        if !confirmation.is_confirmed() {
            debug!("event=task_delete module=service status=cancelled task_id={id}");
            return MutationOutcome::unchanged();
        }
        let next = lifecycle::delete_task(&self.tasks, id);
        self.commit("task_delete", next)
    }

    /// Removes all completed tasks once the user has confirmed.
    pub fn clear_completed(&mut self, confirmation: Confirmation) -> MutationOutcome {
        if !confirmation.is_confirmed() {
            debug!("event=tasks_clear_completed module=service status=cancelled");
            return MutationOutcome::unchanged();
        }
        let next = lifecycle::clear_completed(&self.tasks);
        self.commit("tasks_clear_completed", next)
    }

    /// Home view buckets relative to `now`.
    pub fn buckets(&self, now: Instant) -> TaskBuckets {
        bucket_tasks(&self.tasks, now)
    }

    /// By-date view over the whole collection.
    pub fn grouped_by_date(&self) -> Vec<DateGroup> {
        group_by_date(&self.tasks)
    }

    fn commit(&mut self, event: &str, next: Vec<Task>) -> MutationOutcome {
        if next == self.tasks {
            debug!("event={event} module=service status=noop");
            return MutationOutcome::unchanged();
        }

        let before = self.tasks.len();
        self.tasks = next;
        let persisted = self.persist(event);
        info!(
            "event={} module=service status=ok count_before={} count_after={} persisted={}",
            event,
            before,
            self.tasks.len(),
            persisted
        );
        MutationOutcome {
            changed: true,
            persisted,
        }
    }

    fn persist(&self, event: &str) -> bool {
        match self.repo.save(&self.tasks) {
            Ok(()) => true,
            Err(err) => {
                error!(
                    "event={} module=service status=error error_code=store_write_failed error={}",
                    event, err
                );
                false
            }
        }
    }
}

fn validation_code(err: &TaskValidationError) -> &'static str {
    match err {
        TaskValidationError::EmptyTitle => "empty_title",
        TaskValidationError::NotInFuture { .. } => "not_in_future",
    }
}
