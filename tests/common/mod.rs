#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use playwright_executor::process::{Invocation, ProcessError, ProcessRunner};
use playwright_executor::engine::runner::JUNIT_OUTPUT_ENV;
use playwright_executor::scraper::{ArtifactScraper, ScrapeError};
use playwright_executor::{ExecutionRequest, PlaywrightRunner, Repository, RunnerConfig};
use tempfile::TempDir;

pub const PROJECT_PATH: &str = "e2e";

pub const LOGIN_REPORT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<testsuites tests="2" failures="1">
  <testsuite name="Login" tests="2" failures="1">
    <testcase name="succeeds" classname="login.spec.ts" time="1.5"/>
    <testcase name="rejects bad password" classname="login.spec.ts" time="0.25">
      <failure message="expected Welcome"/>
    </testcase>
  </testsuite>
</testsuites>"#;

/// A data directory with an empty checked-out project at `repo/e2e`
pub fn create_datadir() -> TempDir {
    let dir = tempfile::tempdir().expect("Failed to create temp directory");
    fs::create_dir_all(dir.path().join("repo").join(PROJECT_PATH))
        .expect("Failed to create workspace");
    dir
}

pub fn workspace(datadir: &Path) -> PathBuf {
    datadir.join("repo").join(PROJECT_PATH)
}

pub fn write_manifest(datadir: &Path) {
    fs::write(workspace(datadir).join("package.json"), r#"{"name": "e2e"}"#)
        .expect("Failed to write package.json");
}

pub fn execution(id: &str) -> ExecutionRequest {
    ExecutionRequest::with_repository(
        id,
        Repository {
            uri: "https://github.com/acme/e2e.git".to_string(),
            branch: "main".to_string(),
            path: PROJECT_PATH.to_string(),
            ..Default::default()
        },
    )
}

pub fn config(datadir: &Path) -> RunnerConfig {
    RunnerConfig::default().with_datadir(datadir)
}

pub fn runner(
    config: RunnerConfig,
    process: &Arc<FakeProcessRunner>,
    scraper: &Arc<RecordingScraper>,
) -> PlaywrightRunner {
    PlaywrightRunner::new(config, process.clone(), scraper.clone())
}

pub fn is_test_run(invocation: &Invocation) -> bool {
    invocation.args.len() >= 2 && invocation.args[0] == "run" && invocation.args[1] == "e2e"
}

/// Records every invocation. The test run writes `report` to the path in
/// `PLAYWRIGHT_JUNIT_OUTPUT_NAME` and exits with `test_exit_code`.
#[derive(Default)]
pub struct FakeProcessRunner {
    pub calls: Mutex<Vec<Invocation>>,
    pub report: Option<String>,
    pub test_output: Vec<u8>,
    pub test_exit_code: Option<i32>,
    /// Fail any invocation whose first argument matches
    pub fail_step: Option<String>,
}

impl FakeProcessRunner {
    pub fn passing(report: &str) -> Self {
        Self {
            report: Some(report.to_string()),
            test_output: b"Running 2 tests using 1 worker\n".to_vec(),
            ..Default::default()
        }
    }

    pub fn failing(report: Option<&str>) -> Self {
        Self {
            report: report.map(str::to_string),
            test_output: b"1 failed\n".to_vec(),
            test_exit_code: Some(1),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_args(&self) -> Vec<Vec<String>> {
        self.calls().into_iter().map(|c| c.args).collect()
    }

    pub fn test_invocation(&self) -> Option<Invocation> {
        self.calls().into_iter().find(is_test_run)
    }
}

#[async_trait]
impl ProcessRunner for FakeProcessRunner {
    async fn run(&self, invocation: &Invocation) -> Result<Vec<u8>, ProcessError> {
        self.calls.lock().unwrap().push(invocation.clone());

        if let Some(step) = &self.fail_step {
            if invocation.args.first() == Some(step) {
                return Err(ProcessError::Failed {
                    program: invocation.program.clone(),
                    code: Some(1),
                    output: format!("error {} failed", step).into_bytes(),
                });
            }
        }

        if !is_test_run(invocation) {
            return Ok(b"Done in 0.1s.\n".to_vec());
        }

        if let (Some(report), Some(path)) = (&self.report, invocation.env.get(JUNIT_OUTPUT_ENV)) {
            let path = Path::new(path);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, report).unwrap();
        }

        match self.test_exit_code {
            Some(code) => Err(ProcessError::Failed {
                program: invocation.program.clone(),
                code: Some(code),
                output: self.test_output.clone(),
            }),
            None => Ok(self.test_output.clone()),
        }
    }
}

/// Records scrape calls along with the files present at that moment
#[derive(Default)]
pub struct RecordingScraper {
    calls: Mutex<Vec<(String, Vec<PathBuf>, Vec<PathBuf>)>>,
    pub fail: bool,
}

impl RecordingScraper {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<(String, Vec<PathBuf>, Vec<PathBuf>)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ArtifactScraper for RecordingScraper {
    async fn scrape(&self, execution_id: &str, directories: &[PathBuf]) -> Result<(), ScrapeError> {
        let files = directories
            .iter()
            .filter_map(|d| fs::read_dir(d).ok())
            .flat_map(|entries| entries.filter_map(|e| e.ok()).map(|e| e.path()))
            .collect();
        self.calls
            .lock()
            .unwrap()
            .push((execution_id.to_string(), directories.to_vec(), files));

        if self.fail {
            return Err(ScrapeError::Upload {
                url: "http://artifacts.local/exec".to_string(),
                status: 503,
            });
        }
        Ok(())
    }
}
