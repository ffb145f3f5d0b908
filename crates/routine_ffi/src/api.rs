//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose task list use-cases to Dart via FRB as plain envelopes.
//! - Hand accepted reminder requests to the host through a drainable queue.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Dates cross the boundary as `DD/MM/YYYY`, times as `hh:mm AM/PM`.
//! - Each call re-reads the task blob, so screens see writes made elsewhere.

use log::{info, warn};
use routine_core::db::open_db;
use routine_core::{
    core_version as core_version_inner, format_clock, init_logging as init_logging_inner,
    local_now, ping as ping_inner, Confirmation, DateGroup, Instant, MutationOutcome,
    NotificationSink, PermissionStatus, QueuedNotificationSink, QueuedReminder,
    SqliteKeyValueRepository, Task, TaskDate, TaskDraft, TaskService, TaskTime,
};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use uuid::Uuid;

const TASK_DB_FILE_NAME: &str = "routine_tasks.sqlite3";
const TASK_DB_PATH_ENV: &str = "ROUTINE_DB_PATH";
const REMINDER_TRIGGER_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

static TASK_DB_PATH: OnceLock<PathBuf> = OnceLock::new();
static REMINDER_QUEUE: OnceLock<QueuedNotificationSink> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Records the host's answer to the platform notification permission prompt.
///
/// The host prompts once at app start and passes the answer here. Returns
/// the recorded status label (`granted|denied`).
#[flutter_rust_bridge::frb(sync)]
pub fn notifications_set_permission(granted: bool) -> String {
    record_permission_in(reminder_queue(), granted).to_owned()
}

/// Reports the notification permission recorded for this process.
///
/// Returns `true` only after the host reported a granted prompt. The result
/// is logged but never blocks task creation; reminders are queued either way.
#[flutter_rust_bridge::frb(sync)]
pub fn notifications_init() -> bool {
    permission_status_in(reminder_queue()) == PermissionStatus::Granted
}

/// Task as rendered by list screens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskItem {
    pub id: String,
    pub title: String,
    /// `DD/MM/YYYY`.
    pub date: String,
    /// `hh:mm AM/PM`.
    pub time: String,
    pub completed: bool,
}

/// Home screen sections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskBucketsResponse {
    pub today: Vec<TaskItem>,
    pub tomorrow: Vec<TaskItem>,
    pub upcoming: Vec<TaskItem>,
    pub completed: Vec<TaskItem>,
    /// Empty on success, diagnostics otherwise.
    pub message: String,
}

/// One date section of the by-date screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateGroupItem {
    pub date: String,
    pub tasks: Vec<TaskItem>,
}

/// Action response envelope for create/toggle/delete/clear.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskActionResponse {
    /// `false` only for validation or input errors the user should see.
    pub ok: bool,
    pub task_id: Option<String>,
    /// Whether the change reached storage.
    pub persisted: bool,
    pub reminder_scheduled: bool,
    pub message: String,
}

impl TaskActionResponse {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            task_id: None,
            persisted: false,
            reminder_scheduled: false,
            message: message.into(),
        }
    }

    fn from_outcome(outcome: MutationOutcome, task_id: Option<String>, message: &str) -> Self {
        let message = if outcome.changed {
            message.to_string()
        } else {
            "Nothing to change.".to_string()
        };
        Self {
            ok: true,
            task_id,
            persisted: outcome.persisted,
            reminder_scheduled: false,
            message,
        }
    }
}

/// Reminder the host must hand to the platform notification API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderItem {
    pub handle: String,
    pub title: String,
    pub body: String,
    /// Local wall-clock trigger, `YYYY-MM-DDTHH:MM:SS` without offset.
    pub trigger_local: String,
}

/// Creates a task and queues its reminder.
#[flutter_rust_bridge::frb(sync)]
pub fn task_create(title: String, date: String, time: String) -> TaskActionResponse {
    create_task_in(&resolve_task_db_path(), reminder_queue(), &title, &date, &time, local_now())
}

/// Flips completion of one task; unknown ids are a successful no-op.
#[flutter_rust_bridge::frb(sync)]
pub fn task_toggle_complete(task_id: String) -> TaskActionResponse {
    toggle_task_in(&resolve_task_db_path(), &task_id)
}

/// Deletes one task after the host's confirmation prompt.
#[flutter_rust_bridge::frb(sync)]
pub fn task_delete(task_id: String, confirmed: bool) -> TaskActionResponse {
    delete_task_in(&resolve_task_db_path(), &task_id, Confirmation::from(confirmed))
}

/// Removes all completed tasks after the host's confirmation prompt.
#[flutter_rust_bridge::frb(sync)]
pub fn tasks_clear_completed(confirmed: bool) -> TaskActionResponse {
    clear_completed_in(&resolve_task_db_path(), Confirmation::from(confirmed))
}

/// Home screen buckets relative to the device clock.
#[flutter_rust_bridge::frb(sync)]
pub fn tasks_buckets() -> TaskBucketsResponse {
    buckets_in(&resolve_task_db_path(), local_now())
}

/// All tasks grouped by date, dates ascending.
#[flutter_rust_bridge::frb(sync)]
pub fn tasks_by_date() -> Vec<DateGroupItem> {
    grouped_in(&resolve_task_db_path())
}

/// Drains reminders accepted since the last call.
#[flutter_rust_bridge::frb(sync)]
pub fn reminders_drain() -> Vec<ReminderItem> {
    reminder_queue()
        .drain()
        .into_iter()
        .map(to_reminder_item)
        .collect()
}

/// Live clock text for the header widget.
#[flutter_rust_bridge::frb(sync)]
pub fn clock_text() -> String {
    format_clock(local_now())
}

fn create_task_in(
    db_path: &Path,
    queue: &QueuedNotificationSink,
    title: &str,
    date: &str,
    time: &str,
    now: Instant,
) -> TaskActionResponse {
    let date = match TaskDate::parse(date) {
        Ok(date) => date,
        Err(err) => return TaskActionResponse::failure(err.to_string()),
    };
    let time = match TaskTime::parse(time) {
        Ok(time) => time,
        Err(err) => return TaskActionResponse::failure(err.to_string()),
    };

    let result = with_task_service(db_path, queue, |service| {
        service.create_task(TaskDraft::new(title, date, time), now)
    });
    match result {
        Ok(Ok(created)) => TaskActionResponse {
            ok: true,
            task_id: Some(created.task.id.to_string()),
            persisted: created.persisted,
            reminder_scheduled: created.reminder.is_some(),
            message: "Task added successfully.".to_string(),
        },
        Ok(Err(err)) => TaskActionResponse::failure(err.to_string()),
        Err(err) => TaskActionResponse::failure(err),
    }
}

fn toggle_task_in(db_path: &Path, task_id: &str) -> TaskActionResponse {
    let id = match parse_task_id(task_id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    match with_task_service(db_path, reminder_queue(), |service| service.toggle_complete(id)) {
        Ok(outcome) => {
            TaskActionResponse::from_outcome(outcome, Some(id.to_string()), "Task updated.")
        }
        Err(err) => TaskActionResponse::failure(err),
    }
}

fn delete_task_in(db_path: &Path, task_id: &str, confirmation: Confirmation) -> TaskActionResponse {
    let id = match parse_task_id(task_id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    match with_task_service(db_path, reminder_queue(), |service| {
        service.delete_task(id, confirmation)
    }) {
        Ok(outcome) => {
            TaskActionResponse::from_outcome(outcome, Some(id.to_string()), "Task deleted.")
        }
        Err(err) => TaskActionResponse::failure(err),
    }
}

fn clear_completed_in(db_path: &Path, confirmation: Confirmation) -> TaskActionResponse {
    match with_task_service(db_path, reminder_queue(), |service| {
        service.clear_completed(confirmation)
    }) {
        Ok(outcome) => {
            TaskActionResponse::from_outcome(outcome, None, "Completed tasks cleared.")
        }
        Err(err) => TaskActionResponse::failure(err),
    }
}

fn buckets_in(db_path: &Path, now: Instant) -> TaskBucketsResponse {
    match with_task_service(db_path, reminder_queue(), |service| service.buckets(now)) {
        Ok(buckets) => TaskBucketsResponse {
            today: to_task_items(&buckets.today),
            tomorrow: to_task_items(&buckets.tomorrow),
            upcoming: to_task_items(&buckets.upcoming),
            completed: to_task_items(&buckets.completed),
            message: String::new(),
        },
        Err(err) => TaskBucketsResponse {
            today: Vec::new(),
            tomorrow: Vec::new(),
            upcoming: Vec::new(),
            completed: Vec::new(),
            message: err,
        },
    }
}

fn grouped_in(db_path: &Path) -> Vec<DateGroupItem> {
    match with_task_service(db_path, reminder_queue(), |service| service.grouped_by_date()) {
        Ok(groups) => groups.into_iter().map(to_date_group_item).collect(),
        Err(err) => {
            warn!("event=tasks_by_date module=ffi status=error error={err}");
            Vec::new()
        }
    }
}

fn with_task_service<T>(
    db_path: &Path,
    queue: &QueuedNotificationSink,
    f: impl FnOnce(&mut TaskService<SqliteKeyValueRepository<'_>, &QueuedNotificationSink>) -> T,
) -> Result<T, String> {
    let conn = open_db(db_path).map_err(|err| format!("task DB open failed: {err}"))?;
    let mut service = TaskService::open(SqliteKeyValueRepository::new(&conn), queue);
    Ok(f(&mut service))
}

fn parse_task_id(raw: &str) -> Result<Uuid, TaskActionResponse> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| TaskActionResponse::failure(format!("invalid task id `{raw}`")))
}

fn resolve_task_db_path() -> PathBuf {
    TASK_DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var(TASK_DB_PATH_ENV) {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(TASK_DB_FILE_NAME)
        })
        .clone()
}

fn reminder_queue() -> &'static QueuedNotificationSink {
    REMINDER_QUEUE.get_or_init(QueuedNotificationSink::new)
}

fn record_permission_in(queue: &QueuedNotificationSink, granted: bool) -> &'static str {
    let status = if granted {
        PermissionStatus::Granted
    } else {
        PermissionStatus::Denied
    };
    queue.set_permission(status);
    info!(
        "event=notifications_permission module=ffi status=ok permission={}",
        permission_label(status)
    );
    permission_label(status)
}

fn permission_status_in(queue: &QueuedNotificationSink) -> PermissionStatus {
    let status = queue.request_permission();
    info!(
        "event=notifications_init module=ffi status=ok permission={}",
        permission_label(status)
    );
    status
}

fn permission_label(status: PermissionStatus) -> &'static str {
    match status {
        PermissionStatus::Granted => "granted",
        PermissionStatus::Denied => "denied",
        PermissionStatus::Undetermined => "undetermined",
    }
}

fn to_task_items(tasks: &[Task]) -> Vec<TaskItem> {
    tasks.iter().map(to_task_item).collect()
}

fn to_task_item(task: &Task) -> TaskItem {
    TaskItem {
        id: task.id.to_string(),
        title: task.title.clone(),
        date: task.date.to_string(),
        time: task.time.to_string(),
        completed: task.completed,
    }
}

fn to_date_group_item(group: DateGroup) -> DateGroupItem {
    DateGroupItem {
        date: group.date.to_string(),
        tasks: to_task_items(&group.tasks),
    }
}

fn to_reminder_item(queued: QueuedReminder) -> ReminderItem {
    ReminderItem {
        handle: queued.handle.to_string(),
        title: queued.request.title,
        body: queued.request.body,
        trigger_local: queued
            .request
            .trigger_at
            .format(REMINDER_TRIGGER_FORMAT)
            .to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::{
        buckets_in, clear_completed_in, core_version, create_task_in, delete_task_in, grouped_in,
        init_logging, permission_status_in, ping, record_permission_in, to_reminder_item,
        toggle_task_in,
    };
    use routine_core::{Confirmation, Instant, PermissionStatus, QueuedNotificationSink, TaskDate};
    use std::path::PathBuf;

    fn now() -> Instant {
        TaskDate::from_ymd(2026, 3, 10)
            .unwrap()
            .as_naive()
            .and_hms_opt(14, 30, 0)
            .unwrap()
    }

    fn temp_db() -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.sqlite3");
        (dir, path)
    }

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_bad_input() {
        assert!(!init_logging("info".to_string(), String::new()).is_empty());
        assert!(!init_logging("verbose".to_string(), "tmp/logs".to_string()).is_empty());
    }

    #[test]
    fn create_then_buckets_and_reminder_roundtrip() {
        let (_dir, db) = temp_db();
        let queue = QueuedNotificationSink::new();

        let created = create_task_in(&db, &queue, "Gym", "10/03/2026", "06:00 PM", now());
        assert!(created.ok, "{}", created.message);
        assert!(created.persisted);
        assert!(created.reminder_scheduled);

        let buckets = buckets_in(&db, now());
        assert!(buckets.message.is_empty());
        assert_eq!(buckets.today.len(), 1);
        assert_eq!(buckets.today[0].time, "06:00 PM");
        assert_eq!(Some(buckets.today[0].id.clone()), created.task_id);

        let reminders = queue
            .drain()
            .into_iter()
            .map(to_reminder_item)
            .collect::<Vec<_>>();
        assert_eq!(reminders.len(), 1);
        assert_eq!(reminders[0].title, "Task Reminder");
        assert_eq!(reminders[0].body, "Gym");
        assert_eq!(reminders[0].trigger_local, "2026-03-10T18:00:00");
    }

    #[test]
    fn create_reports_validation_and_format_errors() {
        let (_dir, db) = temp_db();
        let queue = QueuedNotificationSink::new();

        let blank = create_task_in(&db, &queue, "  ", "11/03/2026", "09:00 AM", now());
        assert!(!blank.ok);
        assert!(blank.message.contains("empty"));

        let past = create_task_in(&db, &queue, "late", "09/03/2026", "09:00 AM", now());
        assert!(!past.ok);
        assert!(past.message.contains("future"));

        let bad_time = create_task_in(&db, &queue, "x", "11/03/2026", "21:00", now());
        assert!(!bad_time.ok);
        assert!(bad_time.message.contains("hh:mm AM/PM"));

        assert_eq!(queue.pending_len(), 0);
        assert!(grouped_in(&db).is_empty());
    }

    #[test]
    fn toggle_delete_clear_flow() {
        let (_dir, db) = temp_db();
        let queue = QueuedNotificationSink::new();
        let first = create_task_in(&db, &queue, "one", "12/03/2026", "09:00 AM", now())
            .task_id
            .unwrap();
        let second = create_task_in(&db, &queue, "two", "12/03/2026", "10:00 AM", now())
            .task_id
            .unwrap();

        let toggled = toggle_task_in(&db, &first);
        assert!(toggled.ok && toggled.persisted);
        assert_eq!(buckets_in(&db, now()).completed.len(), 1);

        assert!(!clear_completed_in(&db, Confirmation::Declined).persisted);
        assert!(clear_completed_in(&db, Confirmation::Confirmed).persisted);
        assert!(buckets_in(&db, now()).completed.is_empty());

        let cancelled = delete_task_in(&db, &second, Confirmation::Declined);
        assert!(cancelled.ok && !cancelled.persisted);
        assert_eq!(grouped_in(&db)[0].tasks.len(), 1);

        let deleted = delete_task_in(&db, &second, Confirmation::Confirmed);
        assert!(deleted.persisted);
        assert!(grouped_in(&db).is_empty());
    }

    #[test]
    fn permission_reflects_host_answer() {
        let queue = QueuedNotificationSink::new();
        assert_eq!(permission_status_in(&queue), PermissionStatus::Undetermined);

        assert_eq!(record_permission_in(&queue, false), "denied");
        assert_eq!(permission_status_in(&queue), PermissionStatus::Denied);

        assert_eq!(record_permission_in(&queue, true), "granted");
        assert_eq!(permission_status_in(&queue), PermissionStatus::Granted);
    }

    #[test]
    fn invalid_task_id_is_rejected() {
        let (_dir, db) = temp_db();
        let response = toggle_task_in(&db, "not-a-uuid");
        assert!(!response.ok);
        assert!(response.message.contains("invalid task id"));
    }

    #[test]
    fn grouped_dates_cross_boundary_in_wire_form() {
        let (_dir, db) = temp_db();
        let queue = QueuedNotificationSink::new();
        create_task_in(&db, &queue, "feb", "01/02/2027", "09:00 AM", now());
        create_task_in(&db, &queue, "jan", "31/01/2027", "09:00 AM", now());

        let groups = grouped_in(&db);
        let dates = groups.iter().map(|group| group.date.as_str()).collect::<Vec<_>>();
        assert_eq!(dates, ["31/01/2027", "01/02/2027"]);
    }
}
