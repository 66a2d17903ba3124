//! JUnit XML ingestion
//!
//! Playwright's `junit` reporter writes a `<testsuites>` document with one
//! `<testsuite>` per spec file. A bare `<testsuite>` root is accepted too.
//! A test's status comes from its child markers:
//!
//! | child         | token     |
//! |---------------|-----------|
//! | (none)        | `passed`  |
//! | `<failure>`   | `failed`  |
//! | `<error>`     | `error`   |
//! | `<skipped>`   | `skipped` |

use std::path::Path;
use std::time::Duration;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use tracing::debug;

use super::{
    Report, ReportError, Suite, TestCase, STATUS_ERROR, STATUS_FAILED, STATUS_PASSED,
    STATUS_SKIPPED,
};

/// Read and parse a JUnit report file
pub async fn ingest_file(path: impl AsRef<Path>) -> Result<Report, ReportError> {
    let path = path.as_ref();
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ReportError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    let report = ingest(&content)?;
    debug!(
        path = %path.display(),
        suites = report.suites.len(),
        tests = report.test_count(),
        "Ingested JUnit report"
    );
    Ok(report)
}

/// Parse a JUnit XML document
pub fn ingest(content: &str) -> Result<Report, ReportError> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut parser = Parser::default();
    loop {
        match reader.read_event()? {
            Event::Start(e) => parser.open(&e)?,
            Event::Empty(e) => {
                parser.open(&e)?;
                parser.close(e.name().as_ref())?;
            }
            Event::End(e) => parser.close(e.name().as_ref())?,
            Event::Eof => break,
            _ => {}
        }
    }
    parser.finish()
}

#[derive(Default)]
struct Parser {
    report: Report,
    root_seen: bool,
    stack: Vec<Suite>,
    test: Option<TestCase>,
}

impl Parser {
    fn open(&mut self, e: &BytesStart<'_>) -> Result<(), ReportError> {
        let name = e.name();
        let name = name.as_ref();

        if !self.root_seen {
            self.root_seen = true;
            return match name {
                b"testsuites" => Ok(()),
                b"testsuite" => {
                    self.stack.push(suite_from(e)?);
                    Ok(())
                }
                other => Err(ReportError::Malformed(format!(
                    "unexpected root element <{}>",
                    String::from_utf8_lossy(other)
                ))),
            };
        }

        match name {
            b"testsuite" => self.stack.push(suite_from(e)?),
            b"testcase" => {
                if self.stack.is_empty() {
                    return Err(ReportError::Malformed(
                        "<testcase> outside of <testsuite>".to_string(),
                    ));
                }
                self.test = Some(test_from(e)?);
            }
            b"failure" => self.mark(STATUS_FAILED, e)?,
            b"error" => self.mark(STATUS_ERROR, e)?,
            b"skipped" => self.mark(STATUS_SKIPPED, e)?,
            _ => {}
        }
        Ok(())
    }

    fn close(&mut self, name: &[u8]) -> Result<(), ReportError> {
        match name {
            b"testcase" => {
                if let (Some(test), Some(suite)) = (self.test.take(), self.stack.last_mut()) {
                    suite.tests.push(test);
                }
            }
            b"testsuite" => {
                let suite = self.stack.pop().ok_or_else(|| {
                    ReportError::Malformed("unbalanced </testsuite>".to_string())
                })?;
                match self.stack.last_mut() {
                    Some(parent) => parent.suites.push(suite),
                    None => self.report.suites.push(suite),
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn mark(&mut self, status: &str, e: &BytesStart<'_>) -> Result<(), ReportError> {
        if let Some(test) = self.test.as_mut() {
            test.status = status.to_string();
            if let Some(message) = attribute(e, b"message")? {
                test.message = Some(message);
            }
        }
        Ok(())
    }

    fn finish(self) -> Result<Report, ReportError> {
        if !self.root_seen {
            return Err(ReportError::Malformed("document has no root element".to_string()));
        }
        if let Some(suite) = self.stack.last() {
            return Err(ReportError::Malformed(format!(
                "unexpected end of document inside <testsuite name={:?}>",
                suite.name
            )));
        }
        Ok(self.report)
    }
}

fn suite_from(e: &BytesStart<'_>) -> Result<Suite, ReportError> {
    Ok(Suite {
        name: attribute(e, b"name")?.unwrap_or_default(),
        ..Default::default()
    })
}

fn test_from(e: &BytesStart<'_>) -> Result<TestCase, ReportError> {
    let name = attribute(e, b"name")?.unwrap_or_default();
    let duration = match attribute(e, b"time")? {
        Some(value) => parse_seconds(&value).ok_or_else(|| ReportError::InvalidDuration {
            test: name.clone(),
            value,
        })?,
        None => Duration::ZERO,
    };

    Ok(TestCase {
        classname: attribute(e, b"classname")?.unwrap_or_default(),
        duration,
        status: STATUS_PASSED.to_string(),
        message: None,
        name,
    })
}

fn attribute(e: &BytesStart<'_>, key: &[u8]) -> Result<Option<String>, ReportError> {
    for attr in e.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        if attr.key.as_ref() == key {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

fn parse_seconds(value: &str) -> Option<Duration> {
    let seconds: f64 = value.trim().parse().ok()?;
    Duration::try_from_secs_f64(seconds).ok()
}
