//! Logging initialization module
//!
//! Provides a single initialization point for the logging facility.

use std::path::{Path, PathBuf};
use std::sync::Once;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, util::SubscriberInitExt, EnvFilter};

use crate::errors::{ExError, ExErrorKind};

/// Logging profile configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// Human-readable output for development
    Development,
    /// JSON structured output for production
    Production,
    /// Test capture mode for deterministic testing
    Test,
}

impl Profile {
    fn default_filter(self) -> &'static str {
        match self {
            Profile::Development => "cadsync=debug",
            Profile::Production | Profile::Test => "cadsync=info",
        }
    }
}

static INIT_ONCE: Once = Once::new();

fn env_filter(profile: Profile) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(profile.default_filter()))
}

/// Initialize the logging facility
///
/// This function should be called once at application startup.
/// It sets up the tracing subscriber based on the selected profile.
///
/// # Profiles
///
/// - **Development**: Human-readable logs with debug level
/// - **Production**: JSON structured logs with info level
/// - **Test**: Capture mode for test assertions
///
/// # Example
///
/// ```
/// use cadsync_core::logging_facility::{init, Profile};
///
/// init(Profile::Development);
/// ```
pub fn init(profile: Profile) {
    INIT_ONCE.call_once(|| {
        match profile {
            Profile::Development => {
                tracing_subscriber::fmt()
                    .with_writer(std::io::stderr)
                    .with_env_filter(env_filter(profile))
                    .try_init()
                    .ok();
            }
            Profile::Production => {
                tracing_subscriber::fmt()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_env_filter(env_filter(profile))
                    .try_init()
                    .ok();
            }
            Profile::Test => {
                // Test capture is initialized separately via init_test_capture()
                tracing_subscriber::registry().try_init().ok();
            }
        }
    });
}

/// File name of the per-run log for a given start time
pub fn run_log_file_name(started_at: chrono::DateTime<chrono::Local>) -> String {
    format!("sync_{}.log", started_at.format("%Y%m%d_%H%M%S"))
}

/// Initialize logging to the console plus a per-run log file in `dir`.
///
/// The file receives every event that passes the profile filter, without
/// ANSI colors, as JSON in production. Returns the log file path so it can
/// be referenced from notifications.
///
/// If logging was already initialized the file is still created but
/// receives no events.
///
/// # Errors
///
/// `Io` when the directory or the log file cannot be created.
pub fn init_with_log_file(profile: Profile, dir: &Path) -> Result<PathBuf, ExError> {
    std::fs::create_dir_all(dir).map_err(|e| {
        ExError::new(ExErrorKind::Io)
            .with_op("init_logging")
            .with_entity_id(dir.display().to_string())
            .with_message(format!("failed to create log directory: {}", e))
    })?;

    let file_name = run_log_file_name(chrono::Local::now());
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name.trim_end_matches(".log"))
        .filename_suffix("log")
        .build(dir)
        .map_err(|e| {
            ExError::new(ExErrorKind::Io)
                .with_op("init_logging")
                .with_entity_id(dir.display().to_string())
                .with_message(format!("failed to create log file: {}", e))
        })?;
    let path = dir.join(&file_name);

    INIT_ONCE.call_once(|| {
        let registry = tracing_subscriber::registry().with(env_filter(profile));
        match profile {
            Profile::Production => {
                registry
                    .with(fmt::layer().json().with_writer(std::io::stderr))
                    .with(fmt::layer().json().with_ansi(false).with_writer(appender))
                    .try_init()
                    .ok();
            }
            Profile::Development | Profile::Test => {
                registry
                    .with(fmt::layer().with_writer(std::io::stderr))
                    .with(fmt::layer().with_ansi(false).with_writer(appender))
                    .try_init()
                    .ok();
            }
        }
    });

    Ok(path)
}
