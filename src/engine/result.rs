//! Execution result types

use serde::{Deserialize, Serialize};

/// Terminal status shared by executions and their steps
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    #[default]
    Passed,
    Failed,
}

impl ExecutionStatus {
    pub fn is_passed(self) -> bool {
        self == ExecutionStatus::Passed
    }
}

impl std::fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecutionStatus::Passed => f.write_str("passed"),
            ExecutionStatus::Failed => f.write_str("failed"),
        }
    }
}

/// Result of a single reported test case
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StepResult {
    pub name: String,
    pub duration: String,
    pub status: ExecutionStatus,
}

/// Result of an execution
///
/// Once the test process has run the runner always returns one of these;
/// anything that went wrong afterwards is collected in `errors`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExecutionResult {
    pub status: ExecutionStatus,
    pub output: String,
    pub output_type: String,
    pub steps: Vec<StepResult>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl Default for ExecutionResult {
    fn default() -> Self {
        Self {
            status: ExecutionStatus::Passed,
            output: String::new(),
            output_type: "text/plain".to_string(),
            steps: Vec::new(),
            errors: Vec::new(),
        }
    }
}

impl ExecutionResult {
    /// Record a non-fatal error without touching the status
    pub fn with_error(mut self, error: impl std::fmt::Display) -> Self {
        self.errors.push(error.to_string());
        self
    }

    /// Record an error that fails the execution
    pub fn fail_with(mut self, error: impl std::fmt::Display) -> Self {
        self.status = ExecutionStatus::Failed;
        self.errors.push(error.to_string());
        self
    }

    pub fn is_passed(&self) -> bool {
        self.status.is_passed()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}
