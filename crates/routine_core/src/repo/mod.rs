//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the key-value store contract the app persists through.
//! - Isolate blob encoding and SQLite details from service orchestration.
//!
//! # Invariants
//! - The task collection is always read and written as one whole blob.

pub mod kv_repo;
pub mod task_repo;
