use chrono::NaiveDateTime;
use routine_core::{
    encode_tasks, Confirmation, KeyValueRepository, MemoryKeyValueRepository, QueuedNotificationSink,
    RepoError, RepoResult, Task, TaskDate, TaskDraft, TaskService, TaskTime, TaskValidationError,
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

fn draft(title: &str, date: &str, time: &str) -> TaskDraft {
    TaskDraft::new(
        title,
        TaskDate::parse(date).unwrap(),
        TaskTime::parse(time).unwrap(),
    )
}

/// Store whose writes can be switched off to simulate storage failures.
#[derive(Default)]
struct FlakyStore {
    inner: MemoryKeyValueRepository,
    fail_writes: Cell<bool>,
}

impl KeyValueRepository for FlakyStore {
    fn get(&self, key: &str) -> RepoResult<Option<String>> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> RepoResult<()> {
        if self.fail_writes.get() {
            return Err(RepoError::Unavailable("write refused"));
        }
        self.inner.set(key, value)
    }
}

#[test]
fn create_persists_and_schedules_reminder() {
    let store = MemoryKeyValueRepository::new();
    let sink = QueuedNotificationSink::new();
    let mut service = TaskService::open(&store, &sink);

    let created = service
        .create_task(draft("Gym", "11/03/2026", "06:30 AM"), now())
        .unwrap();

    assert!(created.persisted);
    let handle = created.reminder.expect("future task should get a reminder");
    let queued = sink.drain();
    assert_eq!(queued.len(), 1);
    assert_eq!(queued[0].handle, handle);
    assert_eq!(queued[0].request.body, "Gym");

    let reopened = TaskService::open(&store, &sink);
    assert_eq!(reopened.tasks(), &[created.task]);
}

#[test]
fn validation_failure_changes_nothing_and_submits_nothing() {
    let store = MemoryKeyValueRepository::new();
    let sink = QueuedNotificationSink::new();
    let mut service = TaskService::open(&store, &sink);

    let err = service
        .create_task(draft("", "11/03/2026", "06:30 AM"), now())
        .unwrap_err();
    assert_eq!(err, TaskValidationError::EmptyTitle);
    assert!(service.tasks().is_empty());
    assert_eq!(store.get("tasks").unwrap(), None);
    assert_eq!(sink.pending_len(), 0);
}

#[test]
fn storage_failure_keeps_in_memory_state_ahead_of_store() {
    let store = FlakyStore::default();
    let sink = QueuedNotificationSink::new();
    let mut service = TaskService::open(&store, &sink);
    store.fail_writes.set(true);

    let created = service
        .create_task(draft("Unsaved", "12/03/2026", "10:00 AM"), now())
        .unwrap();

    assert!(!created.persisted);
    assert!(created.reminder.is_some());
    assert_eq!(service.tasks().len(), 1);
    assert!(service.reload().is_empty());
}

#[test]
fn toggle_delete_and_clear_persist_each_mutation() {
    let store = MemoryKeyValueRepository::new();
    let sink = QueuedNotificationSink::new();
    let mut service = TaskService::open(&store, &sink);
    let a = service
        .create_task(draft("a", "10/03/2026", "04:00 PM"), now())
        .unwrap()
        .task;
    let b = service
        .create_task(draft("b", "11/03/2026", "09:00 AM"), now())
        .unwrap()
        .task;

    let toggled = service.toggle_complete(a.id);
    assert!(toggled.changed && toggled.persisted);
    assert_eq!(service.buckets(now()).completed.len(), 1);

    let declined = service.clear_completed(Confirmation::Declined);
    assert!(!declined.changed);
    assert_eq!(service.tasks().len(), 2);

    let cleared = service.clear_completed(Confirmation::Confirmed);
    assert!(cleared.changed && cleared.persisted);
    assert_eq!(TaskService::open(&store, &sink).tasks(), &[b.clone()]);

    let not_confirmed = service.delete_task(b.id, Confirmation::Declined);
    assert!(!not_confirmed.changed);
    let deleted = service.delete_task(b.id, Confirmation::Confirmed);
    assert!(deleted.changed);
    assert!(TaskService::open(&store, &sink).tasks().is_empty());
}

#[test]
fn unknown_ids_are_noops_without_writes() {
    let store = MemoryKeyValueRepository::new();
    let sink = QueuedNotificationSink::new();
    let mut service = TaskService::open(&store, &sink);

    let toggled = service.toggle_complete(Uuid::new_v4());
    let deleted = service.delete_task(Uuid::new_v4(), Confirmation::Confirmed);
    assert!(!toggled.changed && !toggled.persisted);
    assert!(!deleted.changed);
    assert_eq!(store.get("tasks").unwrap(), None);
}

#[test]
fn deleting_a_task_leaves_its_reminder_queued() {
    let store = MemoryKeyValueRepository::new();
    let sink = QueuedNotificationSink::new();
    let mut service = TaskService::open(&store, &sink);
    let task = service
        .create_task(draft("dangling", "13/03/2026", "08:00 AM"), now())
        .unwrap()
        .task;

    service.delete_task(task.id, Confirmation::Confirmed);
    assert_eq!(sink.pending_len(), 1);
}

#[test]
fn reload_picks_up_external_writes() {
    let store = MemoryKeyValueRepository::new();
    let sink = QueuedNotificationSink::new();
    let mut viewer = TaskService::open(&store, &sink);
    let mut editor = TaskService::open(&store, &sink);

    editor
        .create_task(draft("from editor", "20/03/2026", "09:00 AM"), now())
        .unwrap();
    assert!(viewer.tasks().is_empty());
    assert_eq!(viewer.reload().len(), 1);
    assert_eq!(viewer.buckets(now()).upcoming.len(), 1);
    assert_eq!(viewer.grouped_by_date().len(), 1);
}

#[test]
fn create_keeps_valid_tasks_next_to_a_malformed_record() {
    let store = MemoryKeyValueRepository::new();
    let sink = QueuedNotificationSink::new();
    let kept = Task {
        id: Uuid::new_v4(),
        title: "keep me".to_string(),
        date: TaskDate::from_ymd(2026, 3, 15).unwrap(),
        time: TaskTime::from_hm(9, 0).unwrap(),
        completed: false,
    };
    let mut records: serde_json::Value =
        serde_json::from_str(&encode_tasks(std::slice::from_ref(&kept)).unwrap()).unwrap();
    records.as_array_mut().unwrap().push(serde_json::json!({
        "id": Uuid::new_v4().to_string(),
        "title": "broken",
        "date": "not a date",
        "time": "09:00 AM"
    }));
    store.set("tasks", &records.to_string()).unwrap();

    let mut service = TaskService::open(&store, &sink);
    assert_eq!(service.tasks(), std::slice::from_ref(&kept));

    let created = service
        .create_task(draft("new", "16/03/2026", "10:00 AM"), now())
        .unwrap();
    assert!(created.persisted);

    let reopened = TaskService::open(&store, &sink);
    assert_eq!(reopened.tasks(), &[kept, created.task]);
}
