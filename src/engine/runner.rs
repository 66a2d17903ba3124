//! Playwright Runner - runs one execution end to end
//!
//! The runner:
//! 1. Validates the request and the data directory
//! 2. Installs the project dependencies and the Playwright browsers
//! 3. Runs the `e2e` script with the JUnit reporter
//! 4. Ingests the report and maps it to an ExecutionResult
//! 5. Scrapes the report directory when the run failed
//!
//! Up to and including the installs every error aborts the execution. From
//! the test run onwards errors are recorded on the result, so a failing test
//! run still yields its output, steps and artifacts.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::engine::error::RunnerError;
use crate::engine::mapper::map_junit_to_execution_result;
use crate::engine::result::ExecutionResult;
use crate::execution::{validate, ExecutionRequest, Repository, RunnerConfig, TestContent};
use crate::execution::ValidationError;
use crate::process::{CommandRunner, Invocation, ProcessRunner};
use crate::report::{junit, Report};
use crate::scraper::{self, archive_dir, ArtifactScraper, ScrapeError};
use crate::secret::EnvManager;

/// Environment variable Playwright's JUnit reporter writes its file to
pub const JUNIT_OUTPUT_ENV: &str = "PLAYWRIGHT_JUNIT_OUTPUT_NAME";

/// Project manifest checked for in the workspace
pub const MANIFEST_FILE: &str = "package.json";

/// Directory, relative to the workspace, handed to the scraper
pub const ARTIFACTS_DIR: &str = "test-results";

/// Name of the report archive inside the artifacts directory
pub const ARCHIVE_NAME: &str = "test-results.tar.gz";

/// Fixed part of the test command; request args are appended
pub const TEST_ARGS: [&str; 4] = ["run", "e2e", "--reporter", "junit"];

/// Workspace for a repository: `<datadir>/repo/<path>`, or
/// `<datadir>/repo/<working_dir>` when a working directory is set.
///
/// Only plain components of the relative part are joined, so a leading `/`
/// or a `..` never leaves `<datadir>/repo`.
pub fn workspace_path(datadir: &Path, repository: &Repository) -> PathBuf {
    let relative = if repository.working_dir.is_empty() {
        &repository.path
    } else {
        &repository.working_dir
    };

    let mut parts = Vec::new();
    for component in Path::new(relative).components() {
        match component {
            Component::Normal(part) => parts.push(part),
            Component::ParentDir => {
                parts.pop();
            }
            _ => {}
        }
    }

    let mut workspace = datadir.join("repo");
    workspace.extend(parts);
    workspace
}

pub struct PlaywrightRunner {
    config: RunnerConfig,
    process: Arc<dyn ProcessRunner>,
    scraper: Arc<dyn ArtifactScraper>,
}

impl PlaywrightRunner {
    pub fn new(
        config: RunnerConfig,
        process: Arc<dyn ProcessRunner>,
        scraper: Arc<dyn ArtifactScraper>,
    ) -> Self {
        Self {
            config,
            process,
            scraper,
        }
    }

    /// Runner with host processes and the configured scraper backend
    pub fn from_config(config: RunnerConfig) -> Result<Self, ScrapeError> {
        let scraper = scraper::from_config(&config.scraper)?;
        Ok(Self::new(config, Arc::new(CommandRunner::new()), scraper))
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Run an execution.
    ///
    /// Returns `Err` only when the execution could not get as far as running
    /// the tests. A failing test run is `Ok` with a failed status.
    #[instrument(skip(self, execution), fields(execution_id = %execution.id))]
    pub async fn run(&self, execution: &ExecutionRequest) -> Result<ExecutionResult, RunnerError> {
        validate(execution)?;
        self.check_datadir().await?;

        // Only repositories get past validate()
        let repository = match &execution.content {
            Some(TestContent::Repository(repository)) => repository,
            Some(TestContent::InlineFile { .. }) => {
                return Err(ValidationError::InlineFileNotImplemented.into())
            }
            None => return Err(ValidationError::MissingContent(execution.id.clone()).into()),
        };

        let run_path = workspace_path(&self.config.datadir, repository);
        if !tokio::fs::metadata(&run_path)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false)
        {
            return Err(RunnerError::WorkspaceMissing(run_path));
        }
        info!(workspace = %run_path.display(), "Preparing workspace");

        self.install_dependencies(&run_path).await?;
        self.install(
            "playwright binary install",
            &run_path,
            vec!["run".to_string(), "playwright".to_string(), "install".to_string()],
        )
        .await?;

        let env_manager = EnvManager::new(&execution.variables);
        let report_path = run_path.join(&self.config.report_path);
        remove_stale_report(&report_path).await;

        let invocation = Invocation::new(self.config.package_manager.as_str())
            .args(TEST_ARGS)
            .args(execution.args.iter().cloned())
            .current_dir(&run_path)
            .envs(run_env(execution, &env_manager, &report_path))
            .timeout(self.config.test_timeout());

        info!(command = %invocation.command_line(), "Running tests");
        let (output, run_error) = match self.process.run(&invocation).await {
            Ok(output) => (output, None),
            Err(e) => {
                warn!(error = %e, "Test run failed");
                (e.output().to_vec(), Some(e))
            }
        };
        let output = env_manager.obfuscate(&output);

        let (report, report_error) = match junit::ingest_file(&report_path).await {
            Ok(report) => (report, None),
            Err(e) => {
                warn!(error = %e, "Failed to ingest JUnit report");
                (Report::default(), Some(e))
            }
        };

        let mut result = map_junit_to_execution_result(&output, &report);
        if let Some(e) = &run_error {
            result = result.fail_with(e);
        }
        if let Some(e) = report_error {
            result = result.with_error(e);
        }

        if self.config.scraper_enabled && run_error.is_some() {
            for error in self
                .scrape_artifacts(&execution.id, &run_path, &report_path)
                .await
            {
                result = result.with_error(error);
            }
        }

        info!(
            status = %result.status,
            steps = result.steps.len(),
            errors = result.errors.len(),
            "Execution finished"
        );
        Ok(result)
    }

    async fn check_datadir(&self) -> Result<(), RunnerError> {
        let path = &self.config.datadir;
        match tokio::fs::metadata(path).await {
            Ok(meta) if meta.is_dir() => Ok(()),
            Ok(_) => Err(RunnerError::DataDir {
                path: path.clone(),
                reason: "not a directory".to_string(),
            }),
            Err(e) => Err(RunnerError::DataDir {
                path: path.clone(),
                reason: e.to_string(),
            }),
        }
    }

    /// Install declared dependencies, or bootstrap a manifest with the
    /// framework as a dev dependency when the project has none
    async fn install_dependencies(&self, run_path: &Path) -> Result<(), RunnerError> {
        let manifest = run_path.join(MANIFEST_FILE);
        match tokio::fs::metadata(&manifest).await {
            Ok(_) => {
                self.install("install", run_path, vec!["install".to_string()])
                    .await
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("No {} found, initializing project", MANIFEST_FILE);
                self.install(
                    "init",
                    run_path,
                    vec!["init".to_string(), "--yes".to_string()],
                )
                .await?;
                self.install(
                    "install playwright",
                    run_path,
                    vec![
                        "add".to_string(),
                        self.config.framework_package.clone(),
                        "--dev".to_string(),
                    ],
                )
                .await
            }
            Err(source) => Err(RunnerError::ManifestCheck {
                path: manifest,
                source,
            }),
        }
    }

    async fn install(
        &self,
        step: &str,
        run_path: &Path,
        args: Vec<String>,
    ) -> Result<(), RunnerError> {
        let invocation = Invocation::new(self.config.package_manager.as_str())
            .args(args)
            .current_dir(run_path)
            .timeout(self.config.install_timeout());

        info!(command = %invocation.command_line(), "Installing");
        match self.process.run(&invocation).await {
            Ok(output) => {
                debug!(output = %String::from_utf8_lossy(&output), "Install finished");
                Ok(())
            }
            Err(source) => {
                let output = String::from_utf8_lossy(source.output()).into_owned();
                Err(RunnerError::Install {
                    step: format!("{} {}", self.config.package_manager, step),
                    source,
                    output,
                })
            }
        }
    }

    /// Pack the report directory into the artifacts directory and hand it to
    /// the scraper. Returns the errors met on the way; none of them stop the
    /// scrape from being attempted.
    async fn scrape_artifacts(
        &self,
        execution_id: &str,
        run_path: &Path,
        report_path: &Path,
    ) -> Vec<String> {
        let mut errors = Vec::new();
        let artifacts_dir = run_path.join(ARTIFACTS_DIR);
        let staged = run_path.join(ARCHIVE_NAME);

        let packed = match report_path.parent() {
            Some(report_dir) => archive_dir(report_dir, &staged).await.map_err(|e| e.to_string()),
            None => Err(format!("report path {} has no directory", report_path.display())),
        };

        match tokio::fs::create_dir_all(&artifacts_dir).await {
            Ok(()) => {
                if let Err(e) = packed {
                    errors.push(format!("archive test results error: {}", e));
                } else if let Err(e) =
                    tokio::fs::rename(&staged, artifacts_dir.join(ARCHIVE_NAME)).await
                {
                    errors.push(format!("moving test results archive error: {}", e));
                }
            }
            Err(e) => errors.push(format!("creating artifacts directory error: {}", e)),
        }

        info!(directory = %artifacts_dir.display(), "Scraping artifacts");
        if let Err(e) = self.scraper.scrape(execution_id, &[artifacts_dir]).await {
            warn!(error = %e, "Scraping artifacts failed");
            errors.push(format!("scrape artifacts error: {}", e));
        }
        errors
    }
}

/// Environment for the test process: request envs, then resolved variables,
/// then the report location
fn run_env(
    execution: &ExecutionRequest,
    env_manager: &EnvManager,
    report_path: &Path,
) -> HashMap<String, String> {
    let mut env = execution.envs.clone();
    env.extend(
        env_manager
            .env()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone())),
    );
    env.insert(
        JUNIT_OUTPUT_ENV.to_string(),
        report_path.display().to_string(),
    );
    env
}

/// A report left by an earlier run in the same workspace must not be
/// mistaken for this run's.
async fn remove_stale_report(report_path: &Path) {
    match tokio::fs::remove_file(report_path).await {
        Ok(()) => debug!(path = %report_path.display(), "Removed stale report"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %report_path.display(), error = %e, "Cannot remove stale report"),
    }
}
