use directories::ProjectDirs;
use std::collections::HashSet;
use std::fs;
use std::sync::Mutex;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, EnvFilter};

use crate::error::{Result, TagpathError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogOutput {
    Stderr,
    File,
}

static LOGGING_INITIALIZED: Mutex<Option<HashSet<LogOutput>>> = Mutex::new(None);

/// Install the global tracing subscriber. The filter comes from `RUST_LOG`, defaulting to `info`.
/// Repeated calls for an output that was set up successfully are no-ops, and an already installed
/// global subscriber is left in place. A failed setup is not recorded, so it can be retried.
pub fn initialize_logging(output: LogOutput) -> Result<()> {
    let lock_error = || TagpathError::Generic("Logging state lock poisoned".to_string());
    if LOGGING_INITIALIZED
        .lock()
        .map_err(|_| lock_error())?
        .as_ref()
        .is_some_and(|outputs| outputs.contains(&output))
    {
        return Ok(());
    }

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let installed = match output {
        LogOutput::Stderr => {
            let subscriber = fmt::Subscriber::builder()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_target(true)
                .finish();
            tracing::subscriber::set_global_default(subscriber)
        }
        LogOutput::File => {
            let log_dir = log_dir()?;
            fs::create_dir_all(&log_dir)?;
            let file_appender = RollingFileAppender::builder()
                .rotation(Rotation::NEVER)
                .max_log_files(10)
                .filename_prefix("tagpath")
                .filename_suffix("log")
                .build(&log_dir)
                .map_err(|e| TagpathError::Generic(format!("Failed to create log file in {}: {e}", log_dir.display())))?;

            let subscriber = fmt::Subscriber::builder()
                .with_env_filter(env_filter)
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true)
                .with_line_number(true)
                .with_file(true)
                .finish();
            tracing::subscriber::set_global_default(subscriber)
        }
    };

    if installed.is_err() {
        tracing::debug!("A global tracing subscriber is already installed; keeping it");
    }
    LOGGING_INITIALIZED
        .lock()
        .map_err(|_| lock_error())?
        .get_or_insert_with(HashSet::new)
        .insert(output);
    Ok(())
}

fn log_dir() -> Result<std::path::PathBuf> {
    let proj_dirs = ProjectDirs::from("", "", "tagpath")
        .ok_or_else(|| TagpathError::Generic("Failed to get project directories".to_string()))?;
    let dir = if cfg!(target_os = "macos") {
        proj_dirs.cache_dir()
    } else {
        proj_dirs.state_dir().unwrap_or(proj_dirs.cache_dir())
    };
    Ok(dir.to_path_buf())
}
