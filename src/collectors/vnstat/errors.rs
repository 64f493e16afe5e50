//! Error types for vnstat collection

use thiserror::Error;

/// Errors raised while locating, running or parsing vnstat
#[derive(Debug, Error)]
pub enum VnstatError {
    /// The vnstat executable could not be found
    #[error("not installed")]
    NotInstalled(String),

    /// The process could not be started
    #[error("Failed to run '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// vnstat exited with a non-zero status
    #[error("'{command}' failed ({status}): {stderr}")]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },

    /// vnstat printed nothing
    #[error("vnstat returned no data")]
    EmptyOutput,

    /// The report lacks traffic fields, usually because vnstat printed an error
    #[error("incomplete report (missing {missing}): {line}")]
    IncompleteReport { missing: String, line: String },
}
