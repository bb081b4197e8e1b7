//! Test execution engine.
//!
//! A catalog case runs as: gate on the reference version, generate points,
//! evaluate the reference, drop rows it cannot evaluate, then compare the
//! library against what remains. Fixture sets skip the first three steps.

use crate::cases::{CasePoints, CheckCase};
use crate::compare::DataCheck;
use crate::dataset::Dataset;
use crate::error::HarnessError;
use crate::fixtures::{FixtureRows, FixtureSet, ReferenceInfo};
use crate::functions::SpecialFunction;
use crate::gate::{Availability, GateDecision, ReferenceGate};
use crate::reference::ReferenceOracle;
use crate::value::{DataValue, ValueKind};
use crate::verify::{CaseStatus, VerificationResult};

/// Comparator outcome before known-failure expectations are applied.
struct Evaluation {
    rows_checked: usize,
    digest: String,
    max_rel_error: f64,
    failure: Option<String>,
}

/// Compare the library against `dataset` with the given column selection.
fn evaluate<T: DataValue>(
    label: &str,
    function: SpecialFunction,
    dataset: &Dataset<T>,
    input_columns: &[usize],
    output_column: usize,
    rtol: f64,
) -> Result<Evaluation, HarnessError> {
    let library = T::library(function).ok_or_else(|| HarnessError::UnsupportedKind {
        function: function.to_string(),
        kind: T::KIND.to_string(),
    })?;
    if input_columns.len() != function.arity() {
        return Err(HarnessError::ArityMismatch {
            function: function.to_string(),
            expected: function.arity(),
            found: input_columns.len(),
        });
    }

    let check = DataCheck::new(library, dataset, input_columns, output_column)?
        .named(label)
        .rtol(rtol)?;
    let (max_rel_error, failure) = match check.check() {
        Ok(summary) => (summary.max_rel_error, None),
        Err(failure) => (failure.max_rel_error, Some(failure.to_string())),
    };
    Ok(Evaluation {
        rows_checked: dataset.len(),
        digest: dataset.digest(),
        max_rel_error,
        failure,
    })
}

/// Map a comparator outcome onto a verdict.
fn status_for(failed: bool, known_failure: Option<&str>) -> CaseStatus {
    match (failed, known_failure.is_some()) {
        (false, false) => CaseStatus::Pass,
        (true, false) => CaseStatus::Fail,
        (true, true) => CaseStatus::KnownFailure,
        (false, true) => CaseStatus::UnexpectedPass,
    }
}

/// Runs catalog cases and fixture sets, collecting verification results.
pub struct TestRunner {
    /// Name of the test campaign.
    pub campaign: String,
    /// Whether slow cases run.
    pub include_slow: bool,
}

impl TestRunner {
    /// Create a new test runner.
    #[must_use]
    pub fn new(campaign: impl Into<String>) -> Self {
        Self {
            campaign: campaign.into(),
            include_slow: false,
        }
    }

    #[must_use]
    pub fn with_slow(mut self, include_slow: bool) -> Self {
        self.include_slow = include_slow;
        self
    }

    /// Probe the reference and run one case.
    pub fn run_case(&self, oracle: &dyn ReferenceOracle, case: &CheckCase) -> VerificationResult {
        let gate = ReferenceGate::from_availability(oracle.probe());
        self.run_gated(&gate, oracle, case)
    }

    /// Probe the reference once and run every case in order.
    pub fn run_catalog(
        &self,
        oracle: &dyn ReferenceOracle,
        cases: &[&CheckCase],
    ) -> Vec<VerificationResult> {
        let gate = ReferenceGate::from_availability(oracle.probe());
        cases
            .iter()
            .map(|case| self.run_gated(&gate, oracle, case))
            .collect()
    }

    /// Run one case against an already probed reference.
    pub fn run_gated(
        &self,
        gate: &ReferenceGate,
        oracle: &dyn ReferenceOracle,
        case: &CheckCase,
    ) -> VerificationResult {
        let skip = |reason: String| {
            VerificationResult::without_check(
                case.name,
                case.function,
                case.kind,
                CaseStatus::Skip,
                reason,
            )
        };
        if case.slow && !self.include_slow {
            return skip(String::from("slow case; enable slow cases to run it"));
        }
        let version = match gate_for(gate, case) {
            Ok(GateDecision::Run { version }) => version,
            Ok(GateDecision::Skip { reason }) => return skip(reason),
            Err(err) => return self.errored(case, &err),
        };

        let outcome = match case.source.points(&version) {
            CasePoints::Real(points) => reference_evaluation(oracle, case, points),
            CasePoints::Complex(points) => reference_evaluation(oracle, case, points),
        };
        match outcome {
            Ok(Some(evaluation)) => {
                let mut result = finish(
                    case.name,
                    case.function,
                    case.kind,
                    case.known_failure,
                    evaluation,
                );
                result.reference_version = Some(version.to_string());
                result
            }
            Ok(None) => skip(String::from("reference produced no usable rows")),
            Err(err) => self.errored(case, &err),
        }
    }

    fn errored(&self, case: &CheckCase, err: &HarnessError) -> VerificationResult {
        VerificationResult::without_check(
            case.name,
            case.function,
            case.kind,
            CaseStatus::Error,
            format!("{}: {err}", self.campaign),
        )
    }

    /// Evaluate the reference for a case and package the rows as a fixture.
    /// Returns `Ok(None)` when the gate skips the case.
    pub fn capture_case(
        &self,
        gate: &ReferenceGate,
        oracle: &dyn ReferenceOracle,
        case: &CheckCase,
    ) -> Result<Option<FixtureSet>, HarnessError> {
        let GateDecision::Run { version } = gate_for(gate, case)? else {
            return Ok(None);
        };
        let name = match gate.availability() {
            Availability::Installed { name, .. } => name.clone(),
            Availability::Missing { .. } => oracle.name().to_string(),
        };
        let rows = match case.source.points(&version) {
            CasePoints::Real(points) => capture_rows(oracle, case, points)?,
            CasePoints::Complex(points) => capture_rows(oracle, case, points)?,
        };
        let reference = ReferenceInfo {
            name,
            version: version.to_string(),
        };
        Ok(Some(FixtureSet::capture(case, reference, rows)))
    }

    /// Verify the library against a captured fixture, no reference needed.
    pub fn run_fixture(&self, set: &FixtureSet) -> VerificationResult {
        let outcome = match &set.rows {
            FixtureRows::Real(rows) => fixture_evaluation(set, rows.clone()),
            FixtureRows::Complex(rows) => fixture_evaluation(set, rows.clone()),
        };
        match outcome {
            Ok(evaluation) => {
                let mut result = finish(
                    &set.case,
                    set.function,
                    set.kind,
                    set.known_failure.as_deref(),
                    evaluation,
                );
                result.reference_version = Some(set.reference.version.clone());
                result
            }
            Err(err) => VerificationResult::without_check(
                &set.case,
                set.function,
                set.kind,
                CaseStatus::Error,
                format!("{}: {err}", self.campaign),
            ),
        }
    }
}

fn gate_for(gate: &ReferenceGate, case: &CheckCase) -> Result<GateDecision, HarnessError> {
    Ok(gate.require(&case.min_reference()?))
}

fn reference_evaluation<T: DataValue>(
    oracle: &dyn ReferenceOracle,
    case: &CheckCase,
    points: Vec<Vec<T>>,
) -> Result<Option<Evaluation>, HarnessError> {
    let dataset = Dataset::build_from_reference(oracle, case.function, points)?;
    if dataset.is_empty() {
        return Ok(None);
    }
    evaluate(
        case.name,
        case.function,
        &dataset,
        &case.input_columns(),
        case.output_column(),
        case.rtol,
    )
    .map(Some)
}

fn capture_rows<T: DataValue>(
    oracle: &dyn ReferenceOracle,
    case: &CheckCase,
    points: Vec<Vec<T>>,
) -> Result<FixtureRows, HarnessError> {
    let dataset = Dataset::build_from_reference(oracle, case.function, points)?;
    if dataset.is_empty() {
        return Err(HarnessError::EmptyFixture(case.name.to_string()));
    }
    Ok(T::into_fixture_rows(dataset.into_rows()))
}

fn fixture_evaluation<T: DataValue>(
    set: &FixtureSet,
    rows: Vec<Vec<T>>,
) -> Result<Evaluation, HarnessError> {
    let dataset = Dataset::from_rows(rows)?;
    evaluate(
        &set.case,
        set.function,
        &dataset,
        &set.input_columns,
        set.output_column,
        set.rtol,
    )
}

fn finish(
    case_name: &str,
    function: SpecialFunction,
    kind: ValueKind,
    known_failure: Option<&str>,
    evaluation: Evaluation,
) -> VerificationResult {
    let failed = evaluation.failure.is_some();
    let status = status_for(failed, known_failure);
    let detail = match (evaluation.failure, known_failure) {
        (Some(failure), Some(reason)) => Some(format!("known failure: {reason}\n{failure}")),
        (Some(failure), None) => Some(failure),
        (None, Some(reason)) => Some(format!("passed despite known failure: {reason}")),
        (None, None) => None,
    };
    VerificationResult {
        case_name: case_name.to_string(),
        function,
        kind,
        status,
        reference_version: None,
        rows_checked: evaluation.rows_checked,
        max_rel_error: Some(evaluation.max_rel_error),
        dataset_sha256: Some(evaluation.digest),
        detail,
    }
}

#[cfg(test)]
mod tests {
    use num_complex::Complex64;

    use super::*;
    use crate::cases;

    /// Reference that answers with the library itself, optionally skewed.
    struct LibraryEcho {
        version: &'static str,
        skew: f64,
    }

    impl ReferenceOracle for LibraryEcho {
        fn name(&self) -> &str {
            "echo"
        }

        fn probe(&self) -> Availability {
            Availability::Installed {
                name: String::from("echo"),
                version: self.version.to_string(),
            }
        }

        fn evaluate_real(
            &self,
            function: SpecialFunction,
            points: &[Vec<f64>],
        ) -> Result<Vec<Option<f64>>, HarnessError> {
            let f = <f64 as DataValue>::library(function).unwrap();
            Ok(points
                .iter()
                .map(|p| Some(f(p) * (1.0 + self.skew)).filter(|v| v.is_finite()))
                .collect())
        }

        fn evaluate_complex(
            &self,
            function: SpecialFunction,
            points: &[Vec<Complex64>],
        ) -> Result<Vec<Option<Complex64>>, HarnessError> {
            let f = <Complex64 as DataValue>::library(function).unwrap();
            Ok(points
                .iter()
                .map(|p| Some(f(p) * (1.0 + self.skew)))
                .collect())
        }
    }

    struct Unavailable;

    impl ReferenceOracle for Unavailable {
        fn name(&self) -> &str {
            "unavailable"
        }

        fn probe(&self) -> Availability {
            Availability::Missing {
                reason: String::from("not installed"),
            }
        }

        fn evaluate_real(
            &self,
            _function: SpecialFunction,
            _points: &[Vec<f64>],
        ) -> Result<Vec<Option<f64>>, HarnessError> {
            panic!("gate must skip before evaluation")
        }

        fn evaluate_complex(
            &self,
            _function: SpecialFunction,
            _points: &[Vec<Complex64>],
        ) -> Result<Vec<Option<Complex64>>, HarnessError> {
            panic!("gate must skip before evaluation")
        }
    }

    fn echo(version: &'static str, skew: f64) -> LibraryEcho {
        LibraryEcho { version, skew }
    }

    #[test]
    fn exact_reference_passes() {
        let runner = TestRunner::new("unit");
        let result = runner.run_case(&echo("1.3.0", 0.0), cases::find("expi_complex").unwrap());
        assert_eq!(result.status, CaseStatus::Pass, "{:?}", result.detail);
        assert!(result.rows_checked > 250);
        assert_eq!(result.max_rel_error, Some(0.0));
        assert_eq!(result.reference_version.as_deref(), Some("1.3.0"));
        assert_eq!(result.dataset_sha256.as_ref().map(String::len), Some(64));
    }

    #[test]
    fn skewed_reference_fails_with_detail() {
        let runner = TestRunner::new("unit");
        let case = cases::find("hyp2f1_real_some_points").unwrap();
        let result = runner.run_case(&echo("1.3.0", 1e-6), case);
        assert_eq!(result.status, CaseStatus::Fail);
        let detail = result.detail.unwrap();
        assert!(detail.starts_with("hyp2f1_real_some_points:"), "{detail}");
    }

    #[test]
    fn known_failure_cases_invert_the_verdict() {
        let runner = TestRunner::new("unit");
        let case = cases::find("hyp2f1_strange_points").unwrap();
        let passing = runner.run_case(&echo("1.3.0", 0.0), case);
        assert_eq!(passing.status, CaseStatus::UnexpectedPass);
        let failing = runner.run_case(&echo("1.3.0", 1e-3), case);
        assert_eq!(failing.status, CaseStatus::KnownFailure);
    }

    #[test]
    fn old_or_missing_reference_skips() {
        let runner = TestRunner::new("unit");
        let case = cases::find("hyp2f1_real_some").unwrap();
        assert_eq!(
            runner.run_case(&echo("0.12", 0.0), case).status,
            CaseStatus::Skip
        );
        assert_eq!(runner.run_case(&Unavailable, case).status, CaseStatus::Skip);
    }

    #[test]
    fn slow_cases_need_opt_in() {
        let case = cases::find("hyp2f1_real_random").unwrap();
        let skipped = TestRunner::new("unit").run_case(&echo("1.3.0", 0.0), case);
        assert_eq!(skipped.status, CaseStatus::Skip);
        let ran = TestRunner::new("unit")
            .with_slow(true)
            .run_case(&echo("1.3.0", 0.0), case);
        assert_eq!(ran.status, CaseStatus::Pass, "{:?}", ran.detail);
    }

    #[test]
    fn capture_then_verify_offline() {
        let runner = TestRunner::new("unit");
        let oracle = echo("1.3.0", 0.0);
        let gate = ReferenceGate::from_availability(oracle.probe());
        let case = cases::find("hyp2f1_real_some_points").unwrap();
        let fixture = runner.capture_case(&gate, &oracle, case).unwrap().unwrap();
        assert_eq!(fixture.reference.version, "1.3.0");

        let result = runner.run_fixture(&fixture);
        assert_eq!(result.status, CaseStatus::Pass, "{:?}", result.detail);
        assert_eq!(result.rows_checked, fixture.rows.len());
    }

    #[test]
    fn capture_is_skipped_by_gate() {
        let runner = TestRunner::new("unit");
        let gate = ReferenceGate::from_availability(Unavailable.probe());
        let case = cases::find("expi_complex").unwrap();
        assert!(runner.capture_case(&gate, &Unavailable, case).unwrap().is_none());
    }

    #[test]
    fn fixture_without_library_binding_errors() {
        let fixture = FixtureSet::from_json(
            r#"{
                "version": "v1",
                "case": "complex_hyp2f1",
                "function": "hyp2f1",
                "captured_at": "2026-10-18T00:00:00.000Z",
                "reference": {"name": "mpmath", "version": "1.3.0"},
                "kind": "complex",
                "input_columns": [0, 1, 2, 3],
                "output_column": 4,
                "rtol": 1e-10,
                "rows": [[[1, 0], [1, 0], [2, 0], [0.5, 0], [1.3862943611198906, 0]]]
            }"#,
        )
        .expect("valid fixture json");
        let result = TestRunner::new("unit").run_fixture(&fixture);
        assert_eq!(result.status, CaseStatus::Error);
        assert!(result.detail.unwrap().contains("no complex implementation"));
    }
}
