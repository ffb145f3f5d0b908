use chrono::NaiveDateTime;
use routine_core::{
    schedule_reminder, NotificationError, NotificationSink, PermissionStatus,
    QueuedNotificationSink, ReminderError, ReminderHandle, ReminderRequest, Task, TaskDate,
    TaskTime, REMINDER_TITLE,
};
use std::cell::Cell;
use uuid::Uuid;

fn now() -> NaiveDateTime {
    TaskDate::from_ymd(2026, 3, 10)
        .unwrap()
        .as_naive()
        .and_hms_opt(14, 30, 0)
        .unwrap()
}

fn task(date: &str, time: &str) -> Task {
    Task {
        id: Uuid::new_v4(),
        title: "Pick up parcel".to_string(),
        date: TaskDate::parse(date).unwrap(),
        time: TaskTime::parse(time).unwrap(),
        completed: false,
    }
}

struct RefusingSink {
    calls: Cell<usize>,
}

impl NotificationSink for RefusingSink {
    fn request_permission(&self) -> PermissionStatus {
        PermissionStatus::Denied
    }

    fn schedule_one_shot(
        &self,
        _request: &ReminderRequest,
    ) -> Result<ReminderHandle, NotificationError> {
        self.calls.set(self.calls.get() + 1);
        Err(NotificationError::PermissionDenied)
    }
}

#[test]
fn future_task_submits_request_with_composed_trigger() {
    let sink = QueuedNotificationSink::new();
    let task = task("11/03/2026", "07:15 AM");

    let handle = schedule_reminder(&sink, &task, now()).unwrap();

    let queued = sink.drain();
    assert_eq!(queued.len(), 1);
    assert_eq!(queued[0].handle, handle);
    assert_eq!(queued[0].request.title, REMINDER_TITLE);
    assert_eq!(queued[0].request.body, "Pick up parcel");
    assert_eq!(queued[0].request.trigger_at, task.due_at());
    assert_eq!(
        queued[0].request.trigger_at.to_string(),
        "2026-03-11 07:15:00"
    );
    assert_eq!(sink.pending_len(), 0);
}

#[test]
fn past_or_current_instant_is_declined_without_submission() {
    let sink = QueuedNotificationSink::new();

    let past = schedule_reminder(&sink, &task("10/03/2026", "02:29 PM"), now()).unwrap_err();
    assert!(matches!(past, ReminderError::Declined { .. }));

    let exact = schedule_reminder(&sink, &task("10/03/2026", "02:30 PM"), now()).unwrap_err();
    assert_eq!(
        exact,
        ReminderError::Declined {
            trigger_at: now(),
            now: now(),
        }
    );
    assert_eq!(sink.pending_len(), 0);
}

#[test]
fn sink_failure_is_reported_as_delivery_error() {
    let sink = RefusingSink {
        calls: Cell::new(0),
    };
    let err = schedule_reminder(&sink, &task("12/03/2026", "09:00 AM"), now()).unwrap_err();
    assert_eq!(
        err,
        ReminderError::Delivery(NotificationError::PermissionDenied)
    );
    assert_eq!(sink.calls.get(), 1);
}

#[test]
fn queued_sink_reports_recorded_permission() {
    let sink = QueuedNotificationSink::new();
    assert_eq!(sink.request_permission(), PermissionStatus::Undetermined);

    sink.set_permission(PermissionStatus::Denied);
    assert_eq!(sink.request_permission(), PermissionStatus::Denied);

    sink.set_permission(PermissionStatus::Granted);
    assert_eq!(sink.request_permission(), PermissionStatus::Granted);
}

#[test]
fn queued_sink_queues_without_permission_and_issues_distinct_handles() {
    let sink = QueuedNotificationSink::new();
    sink.set_permission(PermissionStatus::Denied);

    let first = schedule_reminder(&sink, &task("12/03/2026", "09:00 AM"), now()).unwrap();
    let second = schedule_reminder(&sink, &task("12/03/2026", "09:00 AM"), now()).unwrap();
    assert_ne!(first, second);
    assert_eq!(sink.pending_len(), 2);
}
