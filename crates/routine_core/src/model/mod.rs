//! Domain model for the task list.
//!
//! # Responsibility
//! - Define the single persisted entity (`Task`) and its value types.
//!
//! # Invariants
//! - Every task is identified by a stable `TaskId`.
//! - Deletion is a hard removal from the collection; there are no tombstones.

pub mod task;
