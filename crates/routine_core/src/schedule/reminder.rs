//! One-shot task reminders.
//!
//! # Responsibility
//! - Compose a task's due instant and hand a one-shot request to the
//!   notification subsystem.
//! - Decline silently (no request submitted) when the instant has passed.
//!
//! # Invariants
//! - At most one request is submitted per `schedule_reminder` call.
//! - There is no cancellation path: deleting or completing a task does not
//!   retract a reminder that was already accepted, so it may still fire.
//!
//! # See also
//! - service::task_service for how failures are logged and ignored.

use crate::model::task::{Instant, Task};
use log::{debug, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Mutex;
use uuid::Uuid;

/// Fixed notification title for task reminders.
pub const REMINDER_TITLE: &str = "Task Reminder";

/// Opaque identifier returned by a notification sink for an accepted request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReminderHandle(Uuid);

impl ReminderHandle {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(self) -> Uuid {
        self.0
    }
}

impl Default for ReminderHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for ReminderHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One-shot reminder request submitted to the notification subsystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderRequest {
    pub title: String,
    pub body: String,
    pub trigger_at: Instant,
}

impl ReminderRequest {
    /// Builds the reminder for `task` at its composed due instant.
    pub fn for_task(task: &Task) -> Self {
        Self {
            title: REMINDER_TITLE.to_string(),
            body: task.title.clone(),
            trigger_at: task.due_at(),
        }
    }
}

/// Notification permission state reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
    /// The platform has not answered yet.
    Undetermined,
}

/// Failure reported by the notification subsystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationError {
    PermissionDenied,
    Rejected(String),
}

impl Display for NotificationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PermissionDenied => write!(f, "notification permission denied"),
            Self::Rejected(reason) => write!(f, "notification request rejected: {reason}"),
        }
    }
}

impl Error for NotificationError {}

/// Why no reminder was scheduled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReminderError {
    /// Trigger instant is not after `now`; nothing was submitted.
    Declined { trigger_at: Instant, now: Instant },
    /// The subsystem refused or failed the request.
    Delivery(NotificationError),
}

impl Display for ReminderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Declined { trigger_at, now } => {
                write!(f, "reminder declined: trigger {trigger_at} is not after {now}")
            }
            Self::Delivery(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ReminderError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Declined { .. } => None,
            Self::Delivery(err) => Some(err),
        }
    }
}

impl From<NotificationError> for ReminderError {
    fn from(value: NotificationError) -> Self {
        Self::Delivery(value)
    }
}

/// Platform notification subsystem contract.
pub trait NotificationSink {
    /// Asks the platform for permission to post notifications.
    fn request_permission(&self) -> PermissionStatus;

    /// Submits a fire-and-forget one-shot notification.
    fn schedule_one_shot(
        &self,
        request: &ReminderRequest,
    ) -> Result<ReminderHandle, NotificationError>;
}

impl<T: NotificationSink + ?Sized> NotificationSink for &T {
    fn request_permission(&self) -> PermissionStatus {
        (**self).request_permission()
    }

    fn schedule_one_shot(
        &self,
        request: &ReminderRequest,
    ) -> Result<ReminderHandle, NotificationError> {
        (**self).schedule_one_shot(request)
    }
}

/// Schedules a one-shot reminder for `task` if it is still in the future.
///
/// # Errors
/// - `Declined` when `task.due_at() <= now`; the sink is not called.
/// - `Delivery` when the sink refuses the request.
pub fn schedule_reminder<N: NotificationSink + ?Sized>(
    sink: &N,
    task: &Task,
    now: Instant,
) -> Result<ReminderHandle, ReminderError> {
    let request = ReminderRequest::for_task(task);
    if request.trigger_at <= now {
        debug!(
            "event=reminder_schedule module=schedule status=declined task_id={}",
            task.id
        );
        return Err(ReminderError::Declined {
            trigger_at: request.trigger_at,
            now,
        });
    }

    let handle = sink.schedule_one_shot(&request)?;
    info!(
        "event=reminder_schedule module=schedule status=ok task_id={} handle={} trigger_at={}",
        task.id, handle, request.trigger_at
    );
    Ok(handle)
}

/// Request accepted by `QueuedNotificationSink`, awaiting host delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedReminder {
    pub handle: ReminderHandle,
    pub request: ReminderRequest,
}

/// In-process sink that queues accepted requests for the host platform.
///
/// The mobile host drains the queue and forwards each entry to its local
/// notification API. The host also owns the permission prompt and reports
/// its answer through `set_permission`.
///
/// Requests are queued whatever the permission state; delivery is the
/// host's decision.
#[derive(Debug, Default)]
pub struct QueuedNotificationSink {
    pending: Mutex<Vec<QueuedReminder>>,
    permission: Mutex<Option<PermissionStatus>>,
}

impl QueuedNotificationSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes and returns every queued reminder in submission order.
    pub fn drain(&self) -> Vec<QueuedReminder> {
        match self.pending.lock() {
            Ok(mut pending) => std::mem::take(&mut *pending),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }

    /// Records the platform's answer to the permission prompt.
    pub fn set_permission(&self, status: PermissionStatus) {
        match self.permission.lock() {
            Ok(mut permission) => *permission = Some(status),
            Err(poisoned) => *poisoned.into_inner() = Some(status),
        }
    }

    pub fn pending_len(&self) -> usize {
        match self.pending.lock() {
            Ok(pending) => pending.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }
}

impl NotificationSink for QueuedNotificationSink {
    fn request_permission(&self) -> PermissionStatus {
        let recorded = match self.permission.lock() {
            Ok(permission) => *permission,
            Err(poisoned) => *poisoned.into_inner(),
        };
        recorded.unwrap_or(PermissionStatus::Undetermined)
    }

    fn schedule_one_shot(
        &self,
        request: &ReminderRequest,
    ) -> Result<ReminderHandle, NotificationError> {
        let handle = ReminderHandle::new();
        let mut pending = self.pending.lock().map_err(|_| {
            warn!("event=reminder_queue module=schedule status=error error_code=queue_poisoned");
            NotificationError::Rejected("reminder queue unavailable".to_string())
        })?;
        pending.push(QueuedReminder {
            handle,
            request: request.clone(),
        });
        Ok(handle)
    }
}
