//! Error types for the sv-app layer.

use std::error::Error;
use std::path::PathBuf;

use sv_controls::ControlError;

/// Application error wrapping control failures and configuration file
/// problems.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Control(#[from] ControlError),

    #[error("Failed to read config file: {path}")]
    ConfigFileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write config file: {path}")]
    ConfigFileWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    #[error("Failed to open {what} file: {path}")]
    OpenFile {
        what: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for sv-app operations.
pub type AppResult<T> = Result<T, AppError>;

/// Render an error and all of its sources as `outer: inner: ...`.
pub fn error_chain(err: &(dyn Error + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn chain_includes_io_cause() {
        let err = AppError::from(ControlError::SensorUnavailable {
            sensor: "28-abc".to_string(),
            source: io::Error::new(io::ErrorKind::NotFound, "no such file"),
        });
        assert_eq!(error_chain(&err), "Sensor 28-abc unavailable: no such file");
    }
}
