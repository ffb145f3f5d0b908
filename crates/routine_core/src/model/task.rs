//! Task domain model.
//!
//! # Responsibility
//! - Define the canonical task record persisted in the task blob.
//! - Own the wire encodings for calendar dates (`DD/MM/YYYY`) and wall-clock
//!   times (`hh:mm AM/PM`).
//!
//! # Invariants
//! - `id` is stable and never reused for another task.
//! - `TaskDate` and `TaskTime` order chronologically, never by their text form.
//! - `TaskTime` always carries `second = 0`.
//! - `date + time` is strictly in the future at creation time only; a stored
//!   task may become overdue as the clock advances.
//!
//! # See also
//! - service::lifecycle for create-time validation.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

/// Stable identifier for a task.
pub type TaskId = Uuid;

/// Absolute local point in time (device clock, no timezone).
pub type Instant = NaiveDateTime;

const DATE_WIRE_FORMAT: &str = "%d/%m/%Y";
const TIME_WIRE_FORMAT: &str = "%I:%M %p";

/// Calendar date without a time component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskDate(NaiveDate);

impl TaskDate {
    /// Builds a date from calendar parts, returning `None` for impossible dates.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    /// Parses the `DD/MM/YYYY` wire form.
    pub fn parse(value: &str) -> Result<Self, TaskFieldError> {
        NaiveDate::parse_from_str(value.trim(), DATE_WIRE_FORMAT)
            .map(Self)
            .map_err(|_| TaskFieldError::InvalidDate(value.to_string()))
    }

    /// Calendar day following this one.
    ///
    /// Returns `None` only at the upper bound of the supported calendar.
    pub fn next_day(self) -> Option<Self> {
        self.0.succ_opt().map(Self)
    }

    pub fn as_naive(self) -> NaiveDate {
        self.0
    }
}

impl From<NaiveDate> for TaskDate {
    fn from(value: NaiveDate) -> Self {
        Self(value)
    }
}

impl Display for TaskDate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format(DATE_WIRE_FORMAT))
    }
}

impl FromStr for TaskDate {
    type Err = TaskFieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for TaskDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TaskDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(D::Error::custom)
    }
}

/// Wall-clock time of day with minute precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskTime(NaiveTime);

impl TaskTime {
    /// Builds a time from 24-hour parts, returning `None` when out of range.
    pub fn from_hm(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(Self)
    }

    /// Parses the `hh:mm AM/PM` wire form.
    pub fn parse(value: &str) -> Result<Self, TaskFieldError> {
        NaiveTime::parse_from_str(value.trim(), TIME_WIRE_FORMAT)
            .map(Self::truncate)
            .map_err(|_| TaskFieldError::InvalidTime(value.to_string()))
    }

    /// Linear position in the day, used for ordering.
    pub fn minutes_since_midnight(self) -> u32 {
        self.0.hour() * 60 + self.0.minute()
    }

    pub fn as_naive(self) -> NaiveTime {
        self.0
    }

    fn truncate(time: NaiveTime) -> Self {
        // hour/minute come from a valid NaiveTime, so this cannot fail.
        Self(NaiveTime::from_hms_opt(time.hour(), time.minute(), 0).unwrap_or(NaiveTime::MIN))
    }
}

impl From<NaiveTime> for TaskTime {
    fn from(value: NaiveTime) -> Self {
        Self::truncate(value)
    }
}

impl Display for TaskTime {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format(TIME_WIRE_FORMAT))
    }
}

impl FromStr for TaskTime {
    type Err = TaskFieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for TaskTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TaskTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(D::Error::custom)
    }
}

/// Canonical persisted task record.
///
/// Field names match the stored blob schema `{id, title, date, time, completed}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    /// Display title exactly as entered.
    pub title: String,
    pub date: TaskDate,
    pub time: TaskTime,
    /// Missing in older blobs; treated as pending.
    #[serde(default)]
    pub completed: bool,
}

impl Task {
    /// Composes `date + time` into the local instant the task is due.
    pub fn due_at(&self) -> Instant {
        self.date.as_naive().and_time(self.time.as_naive())
    }
}

/// User input for the create flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub date: TaskDate,
    pub time: TaskTime,
}

impl TaskDraft {
    pub fn new(title: impl Into<String>, date: TaskDate, time: TaskTime) -> Self {
        Self {
            title: title.into(),
            date,
            time,
        }
    }

    /// Local instant this draft would be due at.
    pub fn due_at(&self) -> Instant {
        self.date.as_naive().and_time(self.time.as_naive())
    }

    /// Checks create-time rules against `now`.
    ///
    /// # Errors
    /// - `EmptyTitle` when the title is blank after trimming.
    /// - `NotInFuture` when `date + time <= now`.
    pub fn validate(&self, now: Instant) -> Result<(), TaskValidationError> {
        if self.title.trim().is_empty() {
            return Err(TaskValidationError::EmptyTitle);
        }
        let due_at = self.due_at();
        if due_at <= now {
            return Err(TaskValidationError::NotInFuture { due_at, now });
        }
        Ok(())
    }

    /// Materializes the draft into a pending task with the given id.
    pub fn into_task(self, id: TaskId) -> Task {
        Task {
            id,
            title: self.title,
            date: self.date,
            time: self.time,
            completed: false,
        }
    }
}

/// Create-time validation failures surfaced to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskValidationError {
    EmptyTitle,
    NotInFuture { due_at: Instant, now: Instant },
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "task title cannot be empty"),
            Self::NotInFuture { due_at, now } => write!(
                f,
                "task must be scheduled in the future: due {due_at} is not after {now}"
            ),
        }
    }
}

impl Error for TaskValidationError {}

/// Wire-format parse failures for date/time fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskFieldError {
    InvalidDate(String),
    InvalidTime(String),
}

impl Display for TaskFieldError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidDate(value) => write!(f, "invalid date `{value}`; expected DD/MM/YYYY"),
            Self::InvalidTime(value) => write!(f, "invalid time `{value}`; expected hh:mm AM/PM"),
        }
    }
}

impl Error for TaskFieldError {}
