//! Execution engine module
//!
//! This module contains:
//! - `runner` - The Playwright runner driving one execution end to end
//! - `error` - Runner error types
//! - `result` - Execution and step result types
//! - `mapper` - Report to result mapping

pub mod error;
pub mod mapper;
pub mod result;
pub mod runner;

pub use error::RunnerError;
pub use mapper::{map_junit_to_execution_result, map_status};
pub use result::{ExecutionResult, ExecutionStatus, StepResult};
pub use runner::{workspace_path, PlaywrightRunner};
