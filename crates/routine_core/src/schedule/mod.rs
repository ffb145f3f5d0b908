//! Time-driven task views and reminders.
//!
//! # Responsibility
//! - Derive display buckets from a task collection and the current instant.
//! - Turn a task's due instant into a one-shot reminder request.
//!
//! # Invariants
//! - Everything here is read-only over the task collection.

pub mod bucket;
pub mod reminder;
