//! Report to result mapping

use std::time::Duration;

use crate::engine::result::{ExecutionResult, ExecutionStatus, StepResult};
use crate::report::{Report, STATUS_PASSED};

/// Build an execution result from the raw test output and the parsed report.
///
/// The status stays `Passed` whatever the steps say; the runner fails the
/// execution from the test process exit status instead. Nested suites are
/// not flattened.
pub fn map_junit_to_execution_result(output: &[u8], report: &Report) -> ExecutionResult {
    let mut result = ExecutionResult {
        status: ExecutionStatus::Passed,
        output: String::from_utf8_lossy(output).into_owned(),
        ..Default::default()
    };

    for suite in &report.suites {
        for test in &suite.tests {
            result.steps.push(StepResult {
                name: format!("{} - {}", suite.name, test.name),
                duration: format_duration(test.duration),
                status: map_status(&test.status),
            });
        }
    }

    result
}

/// Map an upstream status token. Anything but `passed` is a failure.
pub fn map_status(token: &str) -> ExecutionStatus {
    match token {
        STATUS_PASSED => ExecutionStatus::Passed,
        _ => ExecutionStatus::Failed,
    }
}

/// Format as `0s`, `250ms`, `1.5s`, `1m30s` or `1h2m3.5s`. Below one second
/// the largest fitting unit is used; above it hours and minutes are split out.
pub fn format_duration(duration: Duration) -> String {
    let nanos = duration.as_nanos();
    if nanos == 0 {
        return "0s".to_string();
    }

    if nanos < 1_000_000_000 {
        let (unit, scale, digits) = if nanos < 1_000 {
            ("ns", 1, 0)
        } else if nanos < 1_000_000 {
            ("µs", 1_000, 3)
        } else {
            ("ms", 1_000_000, 6)
        };
        return format!("{}{}", decimal(nanos / scale, nanos % scale, digits), unit);
    }

    let secs = duration.as_secs();
    let (hours, minutes) = (secs / 3600, secs / 60 % 60);
    let seconds = decimal(u128::from(secs % 60), u128::from(duration.subsec_nanos()), 9);
    if hours > 0 {
        format!("{}h{}m{}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m{}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

fn decimal(whole: u128, fraction: u128, digits: usize) -> String {
    if fraction == 0 {
        return whole.to_string();
    }
    let fraction = format!("{:0width$}", fraction, width = digits);
    format!("{}.{}", whole, fraction.trim_end_matches('0'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{Suite, TestCase, STATUS_ERROR, STATUS_FAILED, STATUS_SKIPPED};

    fn report(suite: &str, tests: Vec<TestCase>) -> Report {
        Report {
            suites: vec![Suite {
                name: suite.to_string(),
                tests,
                suites: Vec::new(),
            }],
        }
    }

    #[test]
    fn test_empty_report() {
        let result = map_junit_to_execution_result(b"no tests found", &Report::default());
        assert_eq!(result.status, ExecutionStatus::Passed);
        assert!(result.steps.is_empty());
        assert_eq!(result.output, "no tests found");
        assert_eq!(result.output_type, "text/plain");
    }

    #[test]
    fn test_passed_step() {
        let report = report(
            "Login",
            vec![TestCase::new("succeeds", STATUS_PASSED, Duration::from_millis(1500))],
        );
        let result = map_junit_to_execution_result(b"", &report);
        assert_eq!(
            result.steps,
            vec![StepResult {
                name: "Login - succeeds".to_string(),
                duration: "1.5s".to_string(),
                status: ExecutionStatus::Passed,
            }]
        );
    }

    #[test]
    fn test_failed_step_keeps_passed_aggregate() {
        let report = report(
            "Login",
            vec![TestCase::new("succeeds", STATUS_FAILED, Duration::ZERO)],
        );
        let result = map_junit_to_execution_result(b"", &report);
        assert_eq!(result.steps[0].status, ExecutionStatus::Failed);
        assert_eq!(result.status, ExecutionStatus::Passed);
    }

    #[test]
    fn test_steps_follow_report_order() {
        let report = Report {
            suites: vec![
                Suite {
                    name: "b".to_string(),
                    tests: vec![
                        TestCase::new("2", STATUS_PASSED, Duration::ZERO),
                        TestCase::new("1", STATUS_PASSED, Duration::ZERO),
                    ],
                    suites: Vec::new(),
                },
                Suite {
                    name: "a".to_string(),
                    tests: vec![
                        TestCase::new("1", STATUS_PASSED, Duration::ZERO),
                        TestCase::new("1", STATUS_PASSED, Duration::ZERO),
                    ],
                    suites: Vec::new(),
                },
            ],
        };
        let names: Vec<_> = map_junit_to_execution_result(b"", &report)
            .steps
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["b - 2", "b - 1", "a - 1", "a - 1"]);
    }

    #[test]
    fn test_nested_suites_not_flattened() {
        let mut report = report("outer", vec![]);
        report.suites[0].suites.push(Suite {
            name: "inner".to_string(),
            tests: vec![TestCase::default()],
            suites: Vec::new(),
        });
        assert!(map_junit_to_execution_result(b"", &report).steps.is_empty());
    }

    #[test]
    fn test_map_status_fails_closed() {
        assert_eq!(map_status(STATUS_PASSED), ExecutionStatus::Passed);
        for token in [STATUS_FAILED, STATUS_ERROR, STATUS_SKIPPED, "", "PASSED", "Passed", "flaky"] {
            assert_eq!(map_status(token), ExecutionStatus::Failed, "token {:?}", token);
        }
    }

    #[test]
    fn test_mapping_is_deterministic() {
        let report = report(
            "Checkout",
            vec![
                TestCase::new("adds item", STATUS_PASSED, Duration::from_millis(250)),
                TestCase::new("pays", STATUS_ERROR, Duration::from_secs(2)),
            ],
        );
        let first = map_junit_to_execution_result(b"out", &report);
        let second = map_junit_to_execution_result(b"out", &report);
        assert_eq!(first, second);
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::ZERO), "0s");
        assert_eq!(format_duration(Duration::from_nanos(800)), "800ns");
        assert_eq!(format_duration(Duration::from_nanos(1_500)), "1.5µs");
        assert_eq!(format_duration(Duration::from_micros(2_250)), "2.25ms");
        assert_eq!(format_duration(Duration::from_millis(250)), "250ms");
        assert_eq!(format_duration(Duration::from_secs(2)), "2s");
        assert_eq!(format_duration(Duration::from_millis(1500)), "1.5s");
        assert_eq!(format_duration(Duration::from_secs(90)), "1m30s");
        assert_eq!(format_duration(Duration::from_secs(3600)), "1h0m0s");
        assert_eq!(format_duration(Duration::from_millis(3_723_500)), "1h2m3.5s");
    }

    #[test]
    fn test_lossy_output() {
        let result = map_junit_to_execution_result(&[b'o', b'k', 0xff], &Report::default());
        assert!(result.output.starts_with("ok"));
    }
}
