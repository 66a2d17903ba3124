//! Execution request validation
//!
//! The Playwright runner only handles repository-based projects, so a
//! request is accepted only when it points at a repository with either a
//! branch or a commit.

use super::request::{ExecutionRequest, TestContent};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("can't find any content to run in execution {0}")]
    MissingContent(String),

    #[error("passing playwright test as single file not implemented yet")]
    InlineFileNotImplemented,

    #[error("can't find branch or commit in repository {0:?}")]
    MissingRevision(String),
}

/// Check that an execution can be run by this adapter
pub fn validate(execution: &ExecutionRequest) -> Result<(), ValidationError> {
    let content = execution
        .content
        .as_ref()
        .ok_or_else(|| ValidationError::MissingContent(execution.id.clone()))?;

    let repository = match content {
        TestContent::Repository(repository) => repository,
        TestContent::InlineFile { .. } => return Err(ValidationError::InlineFileNotImplemented),
    };

    if repository.branch.is_empty() && repository.commit.is_empty() {
        return Err(ValidationError::MissingRevision(repository.uri.clone()));
    }

    Ok(())
}
