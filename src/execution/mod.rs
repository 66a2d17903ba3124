//! Execution request types and configuration
//!
//! This module contains:
//! - `request` - ExecutionRequest, TestContent, Repository and Variable
//! - `validate` - Request validation for the Playwright runner
//! - `runner_config` - Runner configuration loaded from YAML

pub mod request;
pub mod runner_config;
pub mod validate;

pub use request::{ExecutionRequest, Repository, TestContent, Variable, VariableType};
pub use runner_config::{ConfigError, RunnerConfig, ScraperConfig};
pub use validate::{validate, ValidationError};
