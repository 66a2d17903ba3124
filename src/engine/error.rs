//! Runner error types

use std::path::PathBuf;

use crate::execution::ValidationError;
use crate::process::ProcessError;

/// Errors that stop an execution before the tests run.
///
/// Anything that goes wrong once the test process has been started is
/// recorded on the [`ExecutionResult`](super::ExecutionResult) instead.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("data directory {path} is not usable: {reason}")]
    DataDir { path: PathBuf, reason: String },

    #[error("workspace {0} does not exist, was the repository fetched?")]
    WorkspaceMissing(PathBuf),

    #[error("checking {path}: {source}")]
    ManifestCheck {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{step} error: {source}\n\n{output}")]
    Install {
        step: String,
        source: ProcessError,
        output: String,
    },
}

impl RunnerError {
    /// Whether the request asked for something this runner does not support yet
    pub fn is_not_implemented(&self) -> bool {
        matches!(
            self,
            RunnerError::Validation(ValidationError::InlineFileNotImplemented)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_install_error_carries_output() {
        let err = RunnerError::Install {
            step: "yarn install".to_string(),
            source: ProcessError::Failed {
                program: "yarn".to_string(),
                code: Some(1),
                output: Vec::new(),
            },
            output: "error Couldn't find package".to_string(),
        };
        let message = err.to_string();
        assert!(message.starts_with("yarn install error: "));
        assert!(message.ends_with("\n\nerror Couldn't find package"));
    }

    #[test]
    fn test_validation_error_is_unchanged() {
        let err = RunnerError::from(ValidationError::MissingRevision("repo".to_string()));
        assert_eq!(
            err.to_string(),
            ValidationError::MissingRevision("repo".to_string()).to_string()
        );
    }

    #[test]
    fn test_not_implemented() {
        assert!(RunnerError::from(ValidationError::InlineFileNotImplemented).is_not_implemented());
        assert!(!RunnerError::from(ValidationError::MissingContent("x".to_string()))
            .is_not_implemented());
        assert!(!RunnerError::WorkspaceMissing(PathBuf::from("/x")).is_not_implemented());
    }
}
