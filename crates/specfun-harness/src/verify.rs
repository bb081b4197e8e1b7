//! Case verdicts and their aggregation.

use serde::{Deserialize, Serialize};

use crate::functions::SpecialFunction;
use crate::value::ValueKind;

/// Verdict for one check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseStatus {
    Pass,
    Fail,
    /// Reference missing, too old, or the case was not selected.
    Skip,
    /// Failed, as the case expects.
    KnownFailure,
    /// Passed although the case expects a failure.
    UnexpectedPass,
    /// The check could not be carried out (reference crash, bad fixture).
    Error,
}

impl CaseStatus {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Pass => "PASS",
            Self::Fail => "FAIL",
            Self::Skip => "SKIP",
            Self::KnownFailure => "XFAIL",
            Self::UnexpectedPass => "XPASS",
            Self::Error => "ERROR",
        }
    }

    /// Whether this verdict breaks a run.
    #[must_use]
    pub fn is_failure(self) -> bool {
        matches!(self, Self::Fail | Self::Error)
    }
}

/// Result of verifying a single case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationResult {
    pub case_name: String,
    pub function: SpecialFunction,
    pub kind: ValueKind,
    pub status: CaseStatus,
    /// Reference version the dataset came from.
    #[serde(default)]
    pub reference_version: Option<String>,
    #[serde(default)]
    pub rows_checked: usize,
    #[serde(default)]
    pub max_rel_error: Option<f64>,
    /// SHA-256 of the dataset the library was checked against.
    #[serde(default)]
    pub dataset_sha256: Option<String>,
    /// Skip reason, error message, or the rendered comparator failure.
    #[serde(default)]
    pub detail: Option<String>,
}

impl VerificationResult {
    /// A verdict that never reached the comparator.
    #[must_use]
    pub fn without_check(
        case_name: impl Into<String>,
        function: SpecialFunction,
        kind: ValueKind,
        status: CaseStatus,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            case_name: case_name.into(),
            function,
            kind,
            status,
            reference_version: None,
            rows_checked: 0,
            max_rel_error: None,
            dataset_sha256: None,
            detail: Some(detail.into()),
        }
    }
}

/// Aggregate verification summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub known_failures: usize,
    pub unexpected_passes: usize,
    pub errors: usize,
    pub results: Vec<VerificationResult>,
}

impl VerificationSummary {
    /// Build a summary from a list of results.
    #[must_use]
    pub fn from_results(results: Vec<VerificationResult>) -> Self {
        let count = |status: CaseStatus| results.iter().filter(|r| r.status == status).count();
        Self {
            total: results.len(),
            passed: count(CaseStatus::Pass),
            failed: count(CaseStatus::Fail),
            skipped: count(CaseStatus::Skip),
            known_failures: count(CaseStatus::KnownFailure),
            unexpected_passes: count(CaseStatus::UnexpectedPass),
            errors: count(CaseStatus::Error),
            results,
        }
    }

    /// True when no case failed or errored. Skips and expected-failure
    /// outcomes do not count against the run.
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failed == 0 && self.errors == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(status: CaseStatus) -> VerificationResult {
        VerificationResult::without_check(
            "case",
            SpecialFunction::Hyp2f1,
            ValueKind::Real,
            status,
            "detail",
        )
    }

    #[test]
    fn summary_counts_each_status() {
        let summary = VerificationSummary::from_results(vec![
            result(CaseStatus::Pass),
            result(CaseStatus::Pass),
            result(CaseStatus::Skip),
            result(CaseStatus::KnownFailure),
            result(CaseStatus::UnexpectedPass),
        ]);
        assert_eq!(summary.total, 5);
        assert_eq!(summary.passed, 2);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.known_failures, 1);
        assert_eq!(summary.unexpected_passes, 1);
        assert!(summary.all_passed());
    }

    #[test]
    fn fail_and_error_break_the_run() {
        let failed = VerificationSummary::from_results(vec![result(CaseStatus::Fail)]);
        assert!(!failed.all_passed());
        let errored = VerificationSummary::from_results(vec![result(CaseStatus::Error)]);
        assert!(!errored.all_passed());
        assert!(VerificationSummary::from_results(Vec::new()).all_passed());
    }

    #[test]
    fn status_serializes_snake_case() {
        let json = serde_json::to_string(&CaseStatus::UnexpectedPass).unwrap();
        assert_eq!(json, "\"unexpected_pass\"");
        assert_eq!(CaseStatus::KnownFailure.label(), "XFAIL");
    }
}
