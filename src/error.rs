use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error(transparent)]
    Channel(#[from] ChannelError),
    #[error("unexpected input: {field} should not contain the delimiter \"{delimiter}\"")]
    DelimiterCollision {
        field: &'static str,
        delimiter: String,
    },
    #[error("{tool} failed: {message}")]
    ExternalTool {
        tool: &'static str,
        message: String,
        stdout: String,
        stderr: String,
    },
    #[error("invalid glob pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl AppError {
    /// An external tool failure with nothing captured from its output streams.
    pub fn external(tool: &'static str, message: impl Into<String>) -> Self {
        AppError::ExternalTool {
            tool,
            message: message.into(),
            stdout: String::new(),
            stderr: String::new(),
        }
    }
}

/// Failures reaching one of the runner's file channels.
#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("unable to find environment variable for file command {0}")]
    Missing(String),
    #[error("missing file at path: {}", .0.display())]
    NotFound(PathBuf),
    #[error(
        "unable to access file: '{}'. Check if the file has correct read/write permissions.",
        path.display()
    )]
    Permission {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub type AppResult<T> = Result<T, AppError>;
