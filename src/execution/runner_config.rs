//! Runner configuration
//!
//! Configuration for the Playwright runner, loaded from a YAML file:
//!
//! ```yaml
//! datadir: /data
//! scraper_enabled: true
//! scraper:
//!   type: http
//!   endpoint: "http://artifacts.local:9000"
//!   bucket: testkube-artifacts
//!   token: "..."
//! test_timeout_secs: 1800
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Where scraped artifacts end up
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ScraperConfig {
    Filesystem {
        #[serde(default = "default_artifacts_path")]
        path: PathBuf,
    },
    Http {
        endpoint: String,
        #[serde(default = "default_bucket")]
        bucket: String,
        #[serde(default)]
        token: Option<String>,
    },
}

impl Default for ScraperConfig {
    fn default() -> Self {
        ScraperConfig::Filesystem {
            path: default_artifacts_path(),
        }
    }
}

fn default_artifacts_path() -> PathBuf {
    PathBuf::from("artifacts")
}

fn default_bucket() -> String {
    "artifacts".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunnerConfig {
    /// Base directory holding the checked-out repositories under `repo/`
    #[serde(default = "default_datadir")]
    pub datadir: PathBuf,

    /// Upload the report directory when a test run fails
    #[serde(default)]
    pub scraper_enabled: bool,

    #[serde(default)]
    pub scraper: ScraperConfig,

    #[serde(default = "default_package_manager")]
    pub package_manager: String,

    /// Package added as a dev dependency when the project has no manifest
    #[serde(default = "default_framework_package")]
    pub framework_package: String,

    /// Report location relative to the workspace
    #[serde(default = "default_report_path")]
    pub report_path: PathBuf,

    #[serde(default = "default_install_timeout")]
    pub install_timeout_secs: u64,

    #[serde(default = "default_test_timeout")]
    pub test_timeout_secs: u64,
}

fn default_datadir() -> PathBuf {
    PathBuf::from("/data")
}

fn default_package_manager() -> String {
    "yarn".to_string()
}

fn default_framework_package() -> String {
    "@playwright/test".to_string()
}

fn default_report_path() -> PathBuf {
    PathBuf::from("src/test-results/junit.xml")
}

fn default_install_timeout() -> u64 {
    600
}

fn default_test_timeout() -> u64 {
    3600
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            datadir: default_datadir(),
            scraper_enabled: false,
            scraper: ScraperConfig::default(),
            package_manager: default_package_manager(),
            framework_package: default_framework_package(),
            report_path: default_report_path(),
            install_timeout_secs: default_install_timeout(),
            test_timeout_secs: default_test_timeout(),
        }
    }
}

impl RunnerConfig {
    pub fn with_datadir(mut self, datadir: impl Into<PathBuf>) -> Self {
        self.datadir = datadir.into();
        self
    }

    pub fn install_timeout(&self) -> Duration {
        Duration::from_secs(self.install_timeout_secs)
    }

    pub fn test_timeout(&self) -> Duration {
        Duration::from_secs(self.test_timeout_secs)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error in {file}: {error}")]
    Yaml {
        file: String,
        error: serde_yaml::Error,
    },
}

impl RunnerConfig {
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config: RunnerConfig = serde_yaml::from_str(&content).map_err(|e| ConfigError::Yaml {
            file: path.display().to_string(),
            error: e,
        })?;
        Ok(config)
    }
}
