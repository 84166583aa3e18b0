//! Error types for the engine binary.
//!
//! [`EngineError`] wraps every failure mode of startup and the training
//! run so that `main` can propagate with `?`.

use std::path::PathBuf;

/// Top-level error for the engine binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: freezetag_core::ConfigError,
    },

    /// The episode clock rejected its settings.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: freezetag_core::ClockError,
    },

    /// The training loop failed.
    #[error("runner error: {source}")]
    Runner {
        /// The underlying runner error.
        #[from]
        source: freezetag_core::RunnerError,
    },

    /// The lesson schedule could not be read.
    #[error("failed to read lesson schedule {}: {source}", path.display())]
    ScheduleIo {
        /// Schedule file path.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The lesson schedule is not valid YAML for a schedule.
    #[error("failed to parse lesson schedule {}: {source}", path.display())]
    ScheduleParse {
        /// Schedule file path.
        path: PathBuf,
        /// The underlying YAML error.
        source: serde_yml::Error,
    },

    /// The lesson schedule parsed but cannot be used.
    #[error("invalid lesson schedule: {reason}")]
    ScheduleInvalid {
        /// What is wrong with it.
        reason: String,
    },
}
