//! # Playwright Executor
//!
//! Worker-side adapter that runs a Playwright end-to-end project for one
//! execution request and reports a normalized result.
//!
//! ## Pipeline
//!
//! - **Validate** - the request must point at a repository with a branch or commit
//! - **Install** - `yarn install` (or `yarn init` + add Playwright), then browsers
//! - **Run** - `yarn run e2e --reporter junit` with the request's env and args
//! - **Ingest** - parse the JUnit report into suites and tests
//! - **Map** - one step per test, named `<suite> - <test>`
//! - **Scrape** - on failure, archive the report directory and store it
//!
//! A failing test run is data, not an error: once the tests have run the
//! runner always returns an [`ExecutionResult`], with any problems listed in
//! its `errors`.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use playwright_executor::{ExecutionRequest, PlaywrightRunner, Repository, RunnerConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = RunnerConfig::default().with_datadir("/data");
//!     let runner = PlaywrightRunner::from_config(config)?;
//!
//!     let execution = ExecutionRequest::with_repository(
//!         "exec-1",
//!         Repository {
//!             uri: "https://github.com/acme/e2e.git".to_string(),
//!             branch: "main".to_string(),
//!             path: "e2e".to_string(),
//!             ..Default::default()
//!         },
//!     );
//!
//!     let result = runner.run(&execution).await?;
//!     println!("Execution {}: {} steps", result.status, result.steps.len());
//!     Ok(())
//! }
//! ```

pub mod engine;
pub mod execution;
pub mod process;
pub mod report;
pub mod scraper;
pub mod secret;

// Re-export main types
pub use engine::{
    map_junit_to_execution_result, map_status, workspace_path, ExecutionResult, ExecutionStatus,
    PlaywrightRunner, RunnerError, StepResult,
};
pub use execution::{
    validate, ConfigError, ExecutionRequest, Repository, RunnerConfig, ScraperConfig, TestContent,
    ValidationError, Variable, VariableType,
};
pub use process::{CommandRunner, Invocation, ProcessError, ProcessRunner};
pub use report::{Report, ReportError, Suite, TestCase};
pub use scraper::{ArtifactScraper, FsScraper, HttpScraper, ScrapeError};
pub use secret::EnvManager;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::engine::{ExecutionResult, ExecutionStatus, PlaywrightRunner, RunnerError};
    pub use crate::execution::{ExecutionRequest, Repository, RunnerConfig, TestContent};
    pub use crate::process::{Invocation, ProcessRunner};
    pub use crate::scraper::ArtifactScraper;
}
