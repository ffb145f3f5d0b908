//! Task collection persistence over a key-value store.
//!
//! # Responsibility
//! - Encode/decode the whole task collection as one JSON blob.
//! - Read and write that blob under the fixed `tasks` key.
//!
//! # Invariants
//! - Reads fail closed: absent, unreadable, or non-array data is an empty
//!   collection, never an error to the caller.
//! - A malformed record is dropped on its own; valid siblings are kept.
//! - Decoded collections have unique ids; later duplicates are dropped.
//! - Writes always replace the full collection (last writer wins).

use crate::model::task::Task;
use crate::repo::kv_repo::{KeyValueRepository, RepoError, RepoResult};
use log::{debug, error, warn};
use std::collections::HashSet;

/// Storage key for the task collection blob.
pub const TASKS_KEY: &str = "tasks";

/// Encodes a task collection into the stored array-of-records blob.
pub fn encode_tasks(tasks: &[Task]) -> RepoResult<String> {
    serde_json::to_string(tasks).map_err(|err| RepoError::Encode(err.to_string()))
}

/// Decodes a stored blob, treating absent or malformed data as empty.
///
/// Records that fail to decode are skipped one by one; the rest survive.
pub fn decode_tasks(blob: Option<&str>) -> Vec<Task> {
    let Some(raw) = blob else {
        return Vec::new();
    };

    let records = match serde_json::from_str::<Vec<serde_json::Value>>(raw) {
        Ok(records) => records,
        Err(err) => {
            // serde_json errors carry position only, not payload text.
            warn!(
                "event=tasks_decode module=repo status=error error_code=malformed_blob error={}",
                err
            );
            return Vec::new();
        }
    };

    let decoded = records
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| match serde_json::from_value::<Task>(record) {
            Ok(task) => Some(task),
            Err(err) => {
                warn!(
                    "event=tasks_decode module=repo status=degraded error_code=malformed_record index={} error={}",
                    index, err
                );
                None
            }
        })
        .collect::<Vec<_>>();

    let mut seen = HashSet::with_capacity(decoded.len());
    let total = decoded.len();
    let unique = decoded
        .into_iter()
        .filter(|task| seen.insert(task.id))
        .collect::<Vec<_>>();
    if unique.len() != total {
        warn!(
            "event=tasks_decode module=repo status=degraded error_code=duplicate_ids dropped={}",
            total - unique.len()
        );
    }
    unique
}

/// Task collection adapter over any key-value repository.
pub struct TaskBlobRepository<R: KeyValueRepository> {
    store: R,
}

impl<R: KeyValueRepository> TaskBlobRepository<R> {
    pub fn new(store: R) -> Self {
        Self { store }
    }

    /// Loads the full collection; storage failures degrade to empty.
    pub fn load(&self) -> Vec<Task> {
        match self.store.get(TASKS_KEY) {
            Ok(blob) => {
                let tasks = decode_tasks(blob.as_deref());
                debug!(
                    "event=tasks_load module=repo status=ok count={}",
                    tasks.len()
                );
                tasks
            }
            Err(err) => {
                error!(
                    "event=tasks_load module=repo status=error error_code=store_read_failed error={}",
                    err
                );
                Vec::new()
            }
        }
    }

    /// Writes the full replacement collection.
    pub fn save(&self, tasks: &[Task]) -> RepoResult<()> {
        let blob = encode_tasks(tasks)?;
        self.store.set(TASKS_KEY, &blob)?;
        debug!(
            "event=tasks_save module=repo status=ok count={}",
            tasks.len()
        );
        Ok(())
    }

    pub fn store(&self) -> &R {
        &self.store
    }
}
