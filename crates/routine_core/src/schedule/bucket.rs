//! Display bucketing for the home and by-date views.
//!
//! # Responsibility
//! - Partition a task collection into today/tomorrow/upcoming/completed.
//! - Group the whole collection by calendar date for the by-date view.
//!
//! # Invariants
//! - Pure: input is never mutated and storage order is never assumed.
//! - Only the calendar date of `now` takes part in classification.
//! - Pending tasks dated before today are in no bucket at all.
//! - `today`/`tomorrow` are time-ascending; `upcoming` is date-then-time.
//! - `completed` keeps input order.

use crate::model::task::{Instant, Task, TaskDate};
use std::collections::BTreeMap;

/// Home view grouping of a task collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskBuckets {
    pub today: Vec<Task>,
    pub tomorrow: Vec<Task>,
    pub upcoming: Vec<Task>,
    pub completed: Vec<Task>,
}

impl TaskBuckets {
    /// Number of pending tasks that are visible in some bucket.
    pub fn pending_count(&self) -> usize {
        self.today.len() + self.tomorrow.len() + self.upcoming.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending_count() == 0 && self.completed.is_empty()
    }
}

/// One calendar date and the tasks stored for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateGroup {
    pub date: TaskDate,
    /// Tasks in stored order, completed ones included.
    pub tasks: Vec<Task>,
}

/// Partitions `tasks` into display buckets relative to `now`'s calendar date.
pub fn bucket_tasks(tasks: &[Task], now: Instant) -> TaskBuckets {
    let today = TaskDate::from(now.date());
    let tomorrow = today.next_day();
    let mut buckets = TaskBuckets::default();

    for task in tasks {
        if task.completed {
            buckets.completed.push(task.clone());
        } else if task.date == today {
            buckets.today.push(task.clone());
        } else if Some(task.date) == tomorrow {
            buckets.tomorrow.push(task.clone());
        } else if task.date > today {
            buckets.upcoming.push(task.clone());
        }
        // Overdue pending tasks fall through and stay hidden.
    }

    buckets.today.sort_by_key(|task| task.time);
    buckets.tomorrow.sort_by_key(|task| task.time);
    buckets.upcoming.sort_by_key(|task| (task.date, task.time));
    buckets
}

/// Groups every task by date, dates ascending in calendar order.
pub fn group_by_date(tasks: &[Task]) -> Vec<DateGroup> {
    let mut grouped: BTreeMap<TaskDate, Vec<Task>> = BTreeMap::new();
    for task in tasks {
        grouped.entry(task.date).or_default().push(task.clone());
    }

    grouped
        .into_iter()
        .map(|(date, tasks)| DateGroup { date, tasks })
        .collect()
}
