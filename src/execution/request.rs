//! Execution request types
//!
//! An [`ExecutionRequest`] is what the worker hands to the runner: an id,
//! where the test project lives, and the environment/arguments for the run.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One requested test run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecutionRequest {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub name: Option<String>,

    /// Where the test project comes from
    #[serde(default)]
    pub content: Option<TestContent>,

    /// Environment variables exported to the test process
    #[serde(default)]
    pub envs: HashMap<String, String>,

    /// Extra arguments appended to the test command, in order
    #[serde(default)]
    pub args: Vec<String>,

    /// Named variables, possibly secret
    #[serde(default)]
    pub variables: HashMap<String, Variable>,
}

impl ExecutionRequest {
    /// Create a repository-based request
    pub fn with_repository(id: impl Into<String>, repository: Repository) -> Self {
        Self {
            id: id.into(),
            content: Some(TestContent::Repository(repository)),
            ..Default::default()
        }
    }
}

/// Test content descriptor
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TestContent {
    /// A checked-out repository containing a Playwright project
    Repository(Repository),
    /// A single test file passed inline
    InlineFile { data: String },
}

impl TestContent {
    pub fn kind(&self) -> &'static str {
        match self {
            TestContent::Repository(_) => "repository",
            TestContent::InlineFile { .. } => "inline_file",
        }
    }
}

/// Repository reference
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Repository {
    #[serde(default)]
    pub uri: String,

    #[serde(default)]
    pub branch: String,

    #[serde(default)]
    pub commit: String,

    /// Path of the project inside the checkout
    #[serde(default)]
    pub path: String,

    /// Overrides `path` as the directory the tests run in
    #[serde(default)]
    pub working_dir: String,
}

/// Variable kind
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum VariableType {
    #[default]
    Basic,
    Secret,
}

/// A named variable passed along with the execution
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Variable {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub value: String,

    #[serde(default, rename = "type")]
    pub kind: VariableType,
}

impl Variable {
    pub fn basic(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            kind: VariableType::Basic,
        }
    }

    pub fn secret(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            kind: VariableType::Secret,
        }
    }

    pub fn is_secret(&self) -> bool {
        self.kind == VariableType::Secret
    }
}
