//! Core use-case services.
//!
//! # Responsibility
//! - Define pure lifecycle transformations over the task collection.
//! - Orchestrate those transformations with persistence and reminders.
//! - Keep UI/FFI layers decoupled from storage details.

pub mod lifecycle;
pub mod task_service;
