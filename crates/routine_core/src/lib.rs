//! Core domain logic for the routine/task reminder app.
//! This crate is the single source of truth for task rules: validation,
//! display bucketing, reminder scheduling, and persistence of the task list.

pub mod clock;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod schedule;
pub mod service;

pub use clock::{format_clock, local_now};
pub use logging::{default_log_level, init_logging, init_logging_from_env, logging_status};
pub use model::task::{
    Instant, Task, TaskDate, TaskDraft, TaskFieldError, TaskId, TaskTime, TaskValidationError,
};
pub use repo::kv_repo::{
    KeyValueRepository, MemoryKeyValueRepository, RepoError, RepoResult, SqliteKeyValueRepository,
};
pub use repo::task_repo::{decode_tasks, encode_tasks, TaskBlobRepository, TASKS_KEY};
pub use schedule::bucket::{bucket_tasks, group_by_date, DateGroup, TaskBuckets};
pub use schedule::reminder::{
    schedule_reminder, NotificationError, NotificationSink, PermissionStatus,
    QueuedNotificationSink, QueuedReminder, ReminderError, ReminderHandle, ReminderRequest,
    REMINDER_TITLE,
};
pub use service::lifecycle::Confirmation;
pub use service::task_service::{CreatedTask, MutationOutcome, TaskService};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
