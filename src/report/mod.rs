//! Test report types
//!
//! A [`Report`] is the parsed form of the machine-readable report written by
//! the test framework. It is built once per run, handed to the result mapper
//! and dropped.

use std::path::PathBuf;
use std::time::Duration;

pub mod junit;

pub use junit::{ingest, ingest_file};

/// Status token for a test that passed
pub const STATUS_PASSED: &str = "passed";
/// Status token for a test with a `<failure>` marker
pub const STATUS_FAILED: &str = "failed";
/// Status token for a test with an `<error>` marker
pub const STATUS_ERROR: &str = "error";
/// Status token for a test with a `<skipped>` marker
pub const STATUS_SKIPPED: &str = "skipped";

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("reading report {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("malformed report: {0}")]
    Malformed(String),

    #[error("invalid duration {value:?} for test {test:?}")]
    InvalidDuration { test: String, value: String },
}

/// Parsed test report
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Report {
    pub suites: Vec<Suite>,
}

impl Report {
    pub fn is_empty(&self) -> bool {
        self.suites.is_empty()
    }

    /// Number of tests in top-level suites
    pub fn test_count(&self) -> usize {
        self.suites.iter().map(|s| s.tests.len()).sum()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Suite {
    pub name: String,
    pub tests: Vec<TestCase>,
    /// Nested `<testsuite>` elements, kept as parsed
    pub suites: Vec<Suite>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TestCase {
    pub name: String,
    pub classname: String,
    pub duration: Duration,
    /// Upstream status token, one of the `STATUS_*` constants
    pub status: String,
    pub message: Option<String>,
}

impl TestCase {
    pub fn new(name: impl Into<String>, status: impl Into<String>, duration: Duration) -> Self {
        Self {
            name: name.into(),
            classname: String::new(),
            duration,
            status: status.into(),
            message: None,
        }
    }
}

impl Default for TestCase {
    fn default() -> Self {
        Self::new(String::new(), STATUS_PASSED, Duration::ZERO)
    }
}
