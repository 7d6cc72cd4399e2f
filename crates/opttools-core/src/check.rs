//! Example-output checking: pairing, comparison, and reporting.
//!
//! A check run pairs annotated source files with compiled example
//! executables one-to-one, runs each target to completion, and compares
//! its output against the file's `//$` expectations. Failures accumulate
//! per pair; a failing target never aborts the run.

use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{OptToolsError, Result};
use crate::expectation::{load_expectations, ExpectedLine};
use crate::runner::run_target;

/// Specification of one check run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CheckSpec {
    /// Annotated source files, in pairing order.
    pub files: Vec<PathBuf>,

    /// Target executables, paired with `files` by index.
    pub targets: Vec<PathBuf>,

    /// Per-target timeout in seconds (0 = unlimited).
    pub timeout_secs: u64,

    /// SHA-256 digest of the ordered expectation-file list.
    pub suite_digest: String,
}

impl CheckSpec {
    /// Create a check specification.
    ///
    /// Files and targets pair positionally, so the lists must agree in
    /// length; a mismatch is rejected up front instead of silently
    /// dropping trailing entries.
    pub fn new(files: Vec<PathBuf>, targets: Vec<PathBuf>, timeout_secs: u64) -> Result<Self> {
        if files.len() != targets.len() {
            return Err(OptToolsError::PairCountMismatch {
                files: files.len(),
                targets: targets.len(),
            });
        }

        let suite_digest = compute_suite_digest(&files);

        Ok(Self {
            files,
            targets,
            timeout_secs,
            suite_digest,
        })
    }

    /// Number of (file, target) pairs.
    pub fn pair_count(&self) -> usize {
        self.files.len()
    }
}

/// Compute a deterministic digest of the ordered expectation-file list.
fn compute_suite_digest(files: &[PathBuf]) -> String {
    let mut hasher = Sha256::new();
    for file in files {
        hasher.update(file.to_string_lossy().as_bytes());
        hasher.update(b"\0");
    }
    hex::encode(hasher.finalize())
}

/// A single check failure, carrying everything its diagnostic needs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Violation {
    /// The target could not be run to a clean exit (non-zero status,
    /// spawn failure, or timeout). Comparison is skipped for the pair.
    TargetFailure {
        target: PathBuf,
        exit_code: i32,
        stderr: String,
    },

    /// An observed line differed from its expectation.
    Mismatch {
        file: PathBuf,
        line: u32,
        expected: String,
        received: String,
    },

    /// More expectations than observed output lines.
    Abundance {
        file: PathBuf,
        count: usize,
        last_line: Option<u32>,
    },

    /// More observed output lines than expectations.
    Lack {
        file: PathBuf,
        count: usize,
        last_line: Option<u32>,
    },
}

/// Compare expectations against observed lines positionally.
///
/// Every mismatch up to the shorter length is collected; comparison
/// never stops at the first failure. The length difference is then
/// reconciled as an abundance (expectations left over) or a lack
/// (output left over), anchored at the final expectation's source line.
pub fn compare_lines(
    expected: &[ExpectedLine],
    observed: &[String],
    file: &Path,
) -> Vec<Violation> {
    let mut violations = Vec::new();

    for (entry, received) in expected.iter().zip(observed) {
        if !entry.expectation.matches(received) {
            violations.push(Violation::Mismatch {
                file: file.to_path_buf(),
                line: entry.line,
                expected: entry.expectation.text().to_string(),
                received: received.clone(),
            });
        }
    }

    let last_line = expected.last().map(|entry| entry.line);
    if expected.len() > observed.len() {
        violations.push(Violation::Abundance {
            file: file.to_path_buf(),
            count: expected.len() - observed.len(),
            last_line,
        });
    } else if observed.len() > expected.len() {
        violations.push(Violation::Lack {
            file: file.to_path_buf(),
            count: observed.len() - expected.len(),
            last_line,
        });
    }

    violations
}

/// Outcome of one (file, target) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairResult {
    /// Annotated source file.
    pub file: PathBuf,

    /// Target executable.
    pub target: PathBuf,

    /// Number of expectation entries in the file.
    pub expected_count: usize,

    /// Number of output lines the target emitted (0 when it failed to run).
    pub observed_count: usize,

    /// Violations recorded for this pair (empty = passed).
    pub violations: Vec<Violation>,

    /// Duration in milliseconds.
    pub duration_ms: u64,
}

impl PairResult {
    /// Whether this pair produced no violations.
    pub fn passed(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Result of a complete check run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckReport {
    /// Unique ID for this run.
    pub run_id: Uuid,

    /// Digest of the expectation-file list the run was built from.
    pub suite_digest: String,

    /// When the run started.
    pub started_at: DateTime<Utc>,

    /// Per-pair outcomes, in pairing order.
    pub pairs: Vec<PairResult>,

    /// Total duration in milliseconds.
    pub duration_ms: u64,

    /// Whether every pair passed.
    pub success: bool,
}

impl CheckReport {
    /// Number of pairs that passed.
    pub fn passed_count(&self) -> usize {
        self.pairs.iter().filter(|p| p.passed()).count()
    }

    /// Number of pairs that failed.
    pub fn failed_count(&self) -> usize {
        self.pairs.iter().filter(|p| !p.passed()).count()
    }

    /// Total violations across all pairs.
    pub fn violation_count(&self) -> usize {
        self.pairs.iter().map(|p| p.violations.len()).sum()
    }
}

/// Execute every (file, target) pair in order and collect the report.
///
/// Targets run sequentially, each to completion before the next starts.
/// A target that fails to run cleanly is recorded as a `TargetFailure`
/// for its pair and the run continues; only an unreadable expectation
/// file aborts the whole run.
pub async fn run_check(spec: &CheckSpec) -> Result<CheckReport> {
    let start = Instant::now();
    let started_at = Utc::now();
    let run_id = Uuid::new_v4();

    info!(run_id = %run_id, pairs = spec.pair_count(), "starting check run");

    let mut pairs = Vec::with_capacity(spec.pair_count());

    for (file, target) in spec.files.iter().zip(&spec.targets) {
        let pair_start = Instant::now();
        let expected = load_expectations(file)?;

        debug!(
            file = %file.display(),
            target = %target.display(),
            expectations = expected.len(),
            "running target"
        );

        let (violations, observed_count) = match run_target(target, spec.timeout_secs).await {
            Ok(run) if run.success => {
                let observed_count = run.stdout_lines.len();
                (compare_lines(&expected, &run.stdout_lines, file), observed_count)
            }
            Ok(run) => (
                vec![Violation::TargetFailure {
                    target: target.clone(),
                    exit_code: run.exit_code,
                    stderr: run.stderr,
                }],
                0,
            ),
            Err(e) => (
                vec![Violation::TargetFailure {
                    target: target.clone(),
                    exit_code: -1,
                    stderr: e.to_string(),
                }],
                0,
            ),
        };

        pairs.push(PairResult {
            file: file.clone(),
            target: target.clone(),
            expected_count: expected.len(),
            observed_count,
            violations,
            duration_ms: pair_start.elapsed().as_millis() as u64,
        });
    }

    let success = pairs.iter().all(PairResult::passed);
    let duration_ms = start.elapsed().as_millis() as u64;

    if success {
        info!(run_id = %run_id, "check run completed successfully");
    } else {
        info!(
            run_id = %run_id,
            failed = pairs.iter().filter(|p| !p.passed()).count(),
            "check run failed"
        );
    }

    Ok(CheckReport {
        run_id,
        suite_digest: spec.suite_digest.clone(),
        started_at,
        pairs,
        duration_ms,
        success,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expectation::parse_expectations;

    fn observed(lines: &[&str]) -> Vec<String> {
        lines.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_spec_rejects_mismatched_lists() {
        let err = CheckSpec::new(
            vec![PathBuf::from("a.cpp"), PathBuf::from("b.cpp")],
            vec![PathBuf::from("a")],
            0,
        )
        .unwrap_err();

        assert!(matches!(
            err,
            OptToolsError::PairCountMismatch {
                files: 2,
                targets: 1
            }
        ));
    }

    #[test]
    fn test_spec_accepts_empty_lists() {
        let spec = CheckSpec::new(vec![], vec![], 0).unwrap();
        assert_eq!(spec.pair_count(), 0);
    }

    #[test]
    fn test_suite_digest_deterministic() {
        let files = vec![PathBuf::from("a.cpp"), PathBuf::from("b.cpp")];
        assert_eq!(compute_suite_digest(&files), compute_suite_digest(&files));
    }

    #[test]
    fn test_suite_digest_order_sensitive() {
        let forward = vec![PathBuf::from("a.cpp"), PathBuf::from("b.cpp")];
        let backward = vec![PathBuf::from("b.cpp"), PathBuf::from("a.cpp")];
        assert_ne!(
            compute_suite_digest(&forward),
            compute_suite_digest(&backward)
        );
    }

    #[test]
    fn test_compare_all_matching() {
        let expected = parse_expectations("a //$ 1\nb //$ [number]\nc //$ [nullptr]\n");
        let violations = compare_lines(&expected, &observed(&["1", "42", "0"]), Path::new("x.cpp"));
        assert!(violations.is_empty());
    }

    #[test]
    fn test_compare_records_mismatch_with_location() {
        let expected = parse_expectations("a //$ 1\nb //$ [number]\nc //$ [nullptr]\n");
        let violations =
            compare_lines(&expected, &observed(&["1", "abc", "0"]), Path::new("x.cpp"));

        assert_eq!(violations.len(), 1);
        assert_eq!(
            violations[0],
            Violation::Mismatch {
                file: PathBuf::from("x.cpp"),
                line: 2,
                expected: "[number]".to_string(),
                received: "abc".to_string(),
            }
        );
    }

    #[test]
    fn test_compare_collects_every_mismatch() {
        let expected = parse_expectations("a //$ 1\nb //$ 2\nc //$ 3\n");
        let violations =
            compare_lines(&expected, &observed(&["9", "2", "8"]), Path::new("x.cpp"));
        assert_eq!(violations.len(), 2);
    }

    #[test]
    fn test_compare_reports_abundance() {
        let expected = parse_expectations("a //$ 1\nb //$ 2\nc //$ 3\n");
        let violations = compare_lines(&expected, &observed(&["1", "2"]), Path::new("x.cpp"));

        assert_eq!(violations.len(), 1);
        assert_eq!(
            violations[0],
            Violation::Abundance {
                file: PathBuf::from("x.cpp"),
                count: 1,
                last_line: Some(3),
            }
        );
    }

    #[test]
    fn test_compare_reports_lack() {
        let expected = parse_expectations("a //$ 1\nb //$ 2\n");
        let violations =
            compare_lines(&expected, &observed(&["1", "2", "3"]), Path::new("x.cpp"));

        assert_eq!(violations.len(), 1);
        assert_eq!(
            violations[0],
            Violation::Lack {
                file: PathBuf::from("x.cpp"),
                count: 1,
                last_line: Some(2),
            }
        );
    }

    #[test]
    fn test_compare_lack_with_no_expectations() {
        let violations = compare_lines(&[], &observed(&["stray"]), Path::new("x.cpp"));

        assert_eq!(violations.len(), 1);
        assert_eq!(
            violations[0],
            Violation::Lack {
                file: PathBuf::from("x.cpp"),
                count: 1,
                last_line: None,
            }
        );
    }

    #[test]
    fn test_compare_equal_lengths_no_length_violation() {
        let expected = parse_expectations("a //$ 1\n");
        let violations = compare_lines(&expected, &observed(&["2"]), Path::new("x.cpp"));
        assert_eq!(violations.len(), 1);
        assert!(matches!(violations[0], Violation::Mismatch { .. }));
    }

    #[test]
    fn test_report_counts() {
        let passing = PairResult {
            file: PathBuf::from("a.cpp"),
            target: PathBuf::from("a"),
            expected_count: 2,
            observed_count: 2,
            violations: vec![],
            duration_ms: 1,
        };
        let failing = PairResult {
            file: PathBuf::from("b.cpp"),
            target: PathBuf::from("b"),
            expected_count: 1,
            observed_count: 0,
            violations: vec![Violation::TargetFailure {
                target: PathBuf::from("b"),
                exit_code: 2,
                stderr: "assertion failed".to_string(),
            }],
            duration_ms: 1,
        };

        let report = CheckReport {
            run_id: Uuid::new_v4(),
            suite_digest: "digest".to_string(),
            started_at: Utc::now(),
            pairs: vec![passing, failing],
            duration_ms: 2,
            success: false,
        };

        assert_eq!(report.passed_count(), 1);
        assert_eq!(report.failed_count(), 1);
        assert_eq!(report.violation_count(), 1);
    }

    #[test]
    fn test_violation_serde_roundtrip() {
        let violations = vec![
            Violation::Mismatch {
                file: PathBuf::from("x.cpp"),
                line: 7,
                expected: "true".to_string(),
                received: "false".to_string(),
            },
            Violation::Abundance {
                file: PathBuf::from("x.cpp"),
                count: 2,
                last_line: Some(12),
            },
        ];

        let json = serde_json::to_string(&violations).expect("serialize");
        let deserialized: Vec<Violation> = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(violations, deserialized);
    }
}
