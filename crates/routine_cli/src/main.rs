//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `routine_core` linkage without the Flutter/FFI runtime.
//! - Print a bucket summary for the task database named by the first
//!   argument or `ROUTINE_DB_PATH`.

use log::info;
use routine_core::db::open_db;
use routine_core::{
    format_clock, init_logging_from_env, local_now, QueuedNotificationSink,
    SqliteKeyValueRepository, TaskService,
};
use std::process::ExitCode;

const TASK_DB_PATH_ENV: &str = "ROUTINE_DB_PATH";

fn main() -> ExitCode {
    if let Err(err) = init_logging_from_env() {
        eprintln!("logging disabled: {err}");
    }

    println!("routine_core ping={}", routine_core::ping());
    println!("routine_core version={}", routine_core::core_version());

    let Some(db_path) = std::env::args()
        .nth(1)
        .or_else(|| std::env::var(TASK_DB_PATH_ENV).ok())
        .filter(|path| !path.trim().is_empty())
    else {
        return ExitCode::SUCCESS;
    };

    let conn = match open_db(db_path.trim()) {
        Ok(conn) => conn,
        Err(err) => {
            eprintln!("failed to open task database `{db_path}`: {err}");
            return ExitCode::FAILURE;
        }
    };

    let notifier = QueuedNotificationSink::new();
    let service = TaskService::open(SqliteKeyValueRepository::new(&conn), &notifier);
    let now = local_now();
    let buckets = service.buckets(now);

    info!(
        "event=cli_summary module=cli status=ok total={} pending_visible={}",
        service.tasks().len(),
        buckets.pending_count()
    );
    println!("now={}", format_clock(now));
    println!("today={}", buckets.today.len());
    println!("tomorrow={}", buckets.tomorrow.len());
    println!("upcoming={}", buckets.upcoming.len());
    println!("completed={}", buckets.completed.len());
    for task in &buckets.today {
        println!("  {} {}", task.time, task.title);
    }

    ExitCode::SUCCESS
}
