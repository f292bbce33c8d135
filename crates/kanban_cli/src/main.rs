//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `kanban_core` linkage without the UI runtime.
//! - Print stats of the board stored at the configured database path.

use kanban_core::{BoardConfig, BoardRepository, SqliteKeyValueStore};
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("kanban_core ping={}", kanban_core::ping());
    println!("kanban_core version={}", kanban_core::core_version());

    let config = match BoardConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("config error: {err}");
            return ExitCode::FAILURE;
        }
    };
    println!("db_path={}", config.db_path.display());

    let log_dir = config.log_dir();
    match kanban_core::init_logging(config.log_level, &log_dir) {
        Ok(()) => println!("log_level={} log_dir={}", config.log_level, log_dir.display()),
        Err(err) => eprintln!("logging disabled: {err}"),
    }

    let storage = match SqliteKeyValueStore::open(&config.db_path) {
        Ok(storage) => storage,
        Err(err) => {
            eprintln!("storage error: {err}");
            return ExitCode::FAILURE;
        }
    };
    // Read-only probe: the repository is used directly so nothing is seeded.
    let repo = BoardRepository::with_key(storage, config.storage_key);
    match repo.storage_info() {
        Some(info) => println!(
            "stored version={} saved_at={} columns={} tasks={} bytes={}",
            info.version.as_deref().unwrap_or("none"),
            info.saved_at.as_deref().unwrap_or("unknown"),
            info.columns_count,
            info.tasks_count,
            info.size
        ),
        None => println!("stored board=none"),
    }
    ExitCode::SUCCESS
}
