//! Dataset comparator.
//!
//! A [`DataCheck`] evaluates a function under test on the input columns of
//! every row of a [`Dataset`] and compares the result with the row's output
//! column. A row is accepted when
//!
//! ```text
//! |actual - expected| <= atol + rtol * |expected|
//! ```
//!
//! where `|.|` is the complex modulus for complex datasets. Two NaNs match, two
//! equal infinities match, and every other non-finite pairing is a mismatch.
//!
//! The check is a single pure pass: it never retries and never mutates the
//! dataset, so running it twice on a pure function yields the same verdict.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::dataset::Dataset;
use crate::error::HarnessError;
use crate::value::DataValue;

/// Default relative tolerance.
pub const DEFAULT_RTOL: f64 = 1e-11;

/// Default absolute fallback, a few multiples of the smallest normal `f64`.
pub const DEFAULT_ATOL: f64 = 5.0 * f64::MIN_POSITIVE;

/// Mismatching rows kept in a [`CheckFailure`] beyond the count.
pub const MAX_REPORTED_MISMATCHES: usize = 10;

/// Acceptance bounds for one check.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tolerance {
    pub rtol: f64,
    pub atol: f64,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            rtol: DEFAULT_RTOL,
            atol: DEFAULT_ATOL,
        }
    }
}

impl Tolerance {
    /// Both bounds must be non-negative and not NaN.
    pub fn new(rtol: f64, atol: f64) -> Result<Self, HarnessError> {
        if rtol.is_nan() || atol.is_nan() || rtol < 0.0 || atol < 0.0 {
            return Err(HarnessError::InvalidTolerance { rtol, atol });
        }
        Ok(Self { rtol, atol })
    }

    /// Relative bound with the default absolute fallback.
    pub fn relative(rtol: f64) -> Result<Self, HarnessError> {
        Self::new(rtol, DEFAULT_ATOL)
    }

    /// Whether `actual` is close enough to `expected`.
    #[must_use]
    pub fn accepts<T: DataValue>(&self, expected: T, actual: T) -> bool {
        if !expected.is_finite() || !actual.is_finite() {
            return (expected.is_nan() && actual.is_nan()) || expected == actual;
        }
        expected.distance(actual) <= self.atol + self.rtol * expected.magnitude()
    }
}

/// Observed relative error; the raw distance when `expected` is zero.
fn relative_error<T: DataValue>(expected: T, actual: T) -> f64 {
    if !expected.is_finite() || !actual.is_finite() {
        let matched = (expected.is_nan() && actual.is_nan()) || expected == actual;
        return if matched { 0.0 } else { f64::INFINITY };
    }
    let distance = expected.distance(actual);
    let scale = expected.magnitude();
    if scale > 0.0 { distance / scale } else { distance }
}

/// One row that fell outside the tolerance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowMismatch<T> {
    pub row: usize,
    pub inputs: Vec<T>,
    pub expected: T,
    pub actual: T,
    pub rel_error: f64,
}

impl<T: DataValue> fmt::Display for RowMismatch<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {}: args=(", self.row)?;
        for (i, arg) in self.inputs.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{arg}")?;
        }
        write!(
            f,
            ") expected={} actual={} rel_err={:.3e}",
            self.expected, self.actual, self.rel_error
        )
    }
}

/// Successful verdict.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CheckSummary {
    pub rows_checked: usize,
    /// Largest relative error among rows with a finite reference value.
    pub max_rel_error: f64,
}

/// Failed verdict: the first mismatching row plus context for the rest.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckFailure<T> {
    pub label: String,
    pub tolerance: Tolerance,
    pub rows_checked: usize,
    pub failing_rows: usize,
    pub max_rel_error: f64,
    /// Up to [`MAX_REPORTED_MISMATCHES`] mismatches in row order, the first
    /// failing row included.
    pub mismatches: Vec<RowMismatch<T>>,
}

impl<T> CheckFailure<T> {
    /// The first failing row.
    #[must_use]
    pub fn first(&self) -> &RowMismatch<T> {
        &self.mismatches[0]
    }
}

impl<T: DataValue> fmt::Display for CheckFailure<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{}: {} of {} rows outside tolerance (rtol={:e}, atol={:e})",
            self.label,
            self.failing_rows,
            self.rows_checked,
            self.tolerance.rtol,
            self.tolerance.atol
        )?;
        for mismatch in &self.mismatches {
            writeln!(f, "  {mismatch}")?;
        }
        let hidden = self.failing_rows.saturating_sub(self.mismatches.len());
        if hidden > 0 {
            writeln!(f, "  ... {hidden} more")?;
        }
        Ok(())
    }
}

impl<T: DataValue> std::error::Error for CheckFailure<T> {}

/// A configured comparison of a function against a dataset.
pub struct DataCheck<'a, T, F> {
    label: String,
    function: F,
    dataset: &'a Dataset<T>,
    input_columns: Vec<usize>,
    output_column: usize,
    tolerance: Tolerance,
}

impl<'a, T, F> DataCheck<'a, T, F>
where
    T: DataValue,
    F: Fn(&[T]) -> T,
{
    /// Select input and output columns. Every index must be inside the
    /// dataset width; an empty dataset accepts any selection.
    pub fn new(
        function: F,
        dataset: &'a Dataset<T>,
        input_columns: impl Into<Vec<usize>>,
        output_column: usize,
    ) -> Result<Self, HarnessError> {
        let input_columns = input_columns.into();
        let width = dataset.width();
        if !dataset.is_empty()
            && let Some(&column) = input_columns
                .iter()
                .chain(std::iter::once(&output_column))
                .find(|&&c| c >= width)
        {
            return Err(HarnessError::ColumnOutOfRange { column, width });
        }
        Ok(Self {
            label: String::from("check"),
            function,
            dataset,
            input_columns,
            output_column,
            tolerance: Tolerance::default(),
        })
    }

    /// Name printed in failure reports.
    #[must_use]
    pub fn named(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    #[must_use]
    pub fn with_tolerance(mut self, tolerance: Tolerance) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn rtol(self, rtol: f64) -> Result<Self, HarnessError> {
        let atol = self.tolerance.atol;
        Ok(self.with_tolerance(Tolerance::new(rtol, atol)?))
    }

    pub fn atol(self, atol: f64) -> Result<Self, HarnessError> {
        let rtol = self.tolerance.rtol;
        Ok(self.with_tolerance(Tolerance::new(rtol, atol)?))
    }

    #[must_use]
    pub fn tolerance(&self) -> Tolerance {
        self.tolerance
    }

    /// Run the comparison over every row.
    pub fn check(&self) -> Result<CheckSummary, CheckFailure<T>> {
        let mut args = Vec::with_capacity(self.input_columns.len());
        let mut mismatches = Vec::new();
        let mut failing_rows = 0;
        let mut max_rel_error = 0.0_f64;

        for (index, row) in self.dataset.rows().iter().enumerate() {
            args.clear();
            args.extend(self.input_columns.iter().map(|&c| row[c]));
            let expected = row[self.output_column];
            let actual = (self.function)(&args);

            let rel_error = relative_error(expected, actual);
            if expected.is_finite() && actual.is_finite() {
                max_rel_error = max_rel_error.max(rel_error);
            }
            if self.tolerance.accepts(expected, actual) {
                continue;
            }

            failing_rows += 1;
            if mismatches.len() < MAX_REPORTED_MISMATCHES {
                mismatches.push(RowMismatch {
                    row: index,
                    inputs: args.clone(),
                    expected,
                    actual,
                    rel_error,
                });
            }
        }

        if failing_rows == 0 {
            Ok(CheckSummary {
                rows_checked: self.dataset.len(),
                max_rel_error,
            })
        } else {
            Err(CheckFailure {
                label: self.label.clone(),
                tolerance: self.tolerance,
                rows_checked: self.dataset.len(),
                failing_rows,
                max_rel_error,
                mismatches,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use num_complex::Complex64;

    use super::*;

    fn strange_row() -> Dataset<f64> {
        Dataset::from_rows(vec![vec![2.0, -1.0, -1.0, 3.0, 7.0]]).unwrap()
    }

    #[test]
    fn evaluates_selected_columns_and_passes_within_tolerance() {
        let ds = strange_row();
        let seen = RefCell::new(Vec::new());
        let f = |args: &[f64]| {
            seen.borrow_mut().push(args.to_vec());
            7.0 + 6e-10
        };
        let summary = DataCheck::new(f, &ds, [0, 1, 2, 3], 4)
            .unwrap()
            .rtol(1e-10)
            .unwrap()
            .check()
            .unwrap();
        assert_eq!(summary.rows_checked, 1);
        assert_eq!(seen.borrow().as_slice(), &[vec![2.0, -1.0, -1.0, 3.0]]);
    }

    #[test]
    fn deviation_beyond_rtol_is_reported() {
        let ds = strange_row();
        let failure = DataCheck::new(|_: &[f64]| 7.0 + 8e-10, &ds, [0, 1, 2, 3], 4)
            .unwrap()
            .named("hyp2f1_strange_points")
            .rtol(1e-10)
            .unwrap()
            .check()
            .unwrap_err();
        assert_eq!(failure.failing_rows, 1);
        let first = failure.first();
        assert_eq!(first.row, 0);
        assert_eq!(first.inputs, vec![2.0, -1.0, -1.0, 3.0]);
        assert_eq!(first.expected, 7.0);
        assert!(first.rel_error > 1e-10);

        let text = failure.to_string();
        assert!(text.starts_with("hyp2f1_strange_points: 1 of 1 rows"));
        assert!(text.contains("args=(2, -1, -1, 3)"));
    }

    #[test]
    fn complex_rows_use_modulus_of_difference() {
        let expected = Complex64::new(1.0, 2.0);
        let ds = Dataset::from_rows(vec![vec![Complex64::new(0.5, 0.0), expected]]).unwrap();

        let close = |_: &[Complex64]| expected + Complex64::new(1e-12, 0.0);
        assert!(
            DataCheck::new(close, &ds, [0], 1)
                .unwrap()
                .rtol(1e-6)
                .unwrap()
                .check()
                .is_ok()
        );

        let far = |_: &[Complex64]| Complex64::new(1.0, 3.0);
        let failure = DataCheck::new(far, &ds, [0], 1)
            .unwrap()
            .rtol(1e-6)
            .unwrap()
            .check()
            .unwrap_err();
        assert_eq!(failure.first().actual, Complex64::new(1.0, 3.0));
    }

    #[test]
    fn exact_match_passes_at_zero_tolerance() {
        let ds = Dataset::from_rows(vec![vec![1.5, 2.25], vec![-3.0, 0.0]]).unwrap();
        let f = |args: &[f64]| if args[0] > 0.0 { 2.25 } else { 0.0 };
        let check = DataCheck::new(f, &ds, [0], 1)
            .unwrap()
            .with_tolerance(Tolerance::new(0.0, 0.0).unwrap());
        assert_eq!(check.check().unwrap().max_rel_error, 0.0);
    }

    #[test]
    fn check_is_idempotent() {
        let ds = Dataset::from_rows(vec![vec![0.1, 0.2], vec![0.3, 0.0]]).unwrap();
        let check = DataCheck::new(|a: &[f64]| a[0] * 2.0, &ds, [0], 1).unwrap();
        let first = check.check().unwrap_err();
        let second = check.check().unwrap_err();
        assert_eq!(first, second);
        assert_eq!(first.failing_rows, 1);
        assert_eq!(first.first().row, 1);
    }

    #[test]
    fn non_finite_policy() {
        let tol = Tolerance::default();
        assert!(tol.accepts(f64::NAN, f64::NAN));
        assert!(tol.accepts(f64::INFINITY, f64::INFINITY));
        assert!(!tol.accepts(f64::INFINITY, f64::NEG_INFINITY));
        assert!(!tol.accepts(1.0, f64::NAN));
        assert!(!tol.accepts(f64::NAN, 1.0));
        assert!(!tol.accepts(f64::INFINITY, 1e308));
        let inf = Complex64::new(f64::INFINITY, 0.0);
        assert!(tol.accepts(inf, inf));
        assert!(!tol.accepts(inf, Complex64::new(f64::INFINITY, 1.0)));
    }

    #[test]
    fn absolute_fallback_covers_zero_expected() {
        let tol = Tolerance::default();
        assert!(tol.accepts(0.0, 1e-310));
        assert!(!tol.accepts(0.0, 1e-300));
    }

    #[test]
    fn out_of_range_columns_are_rejected_before_evaluation() {
        let ds = strange_row();
        let err = DataCheck::new(|_: &[f64]| unreachable!(), &ds, [0, 5], 4)
            .err()
            .unwrap();
        assert!(matches!(
            err,
            HarnessError::ColumnOutOfRange {
                column: 5,
                width: 5
            }
        ));
        let err = DataCheck::new(|_: &[f64]| unreachable!(), &ds, [0], 9)
            .err()
            .unwrap();
        assert!(matches!(err, HarnessError::ColumnOutOfRange { column: 9, .. }));
    }

    #[test]
    fn invalid_tolerances_are_rejected() {
        assert!(Tolerance::new(-1e-3, 0.0).is_err());
        assert!(Tolerance::new(1e-3, f64::NAN).is_err());
        let ds = strange_row();
        let check = DataCheck::new(|_: &[f64]| 7.0, &ds, [0, 1, 2, 3], 4).unwrap();
        assert!(matches!(
            check.atol(-1.0).err().unwrap(),
            HarnessError::InvalidTolerance { .. }
        ));
    }

    #[test]
    fn reported_mismatches_are_bounded() {
        let rows = (0..25).map(|i| vec![f64::from(i), 1.0]).collect();
        let ds = Dataset::from_rows(rows).unwrap();
        let failure = DataCheck::new(|_: &[f64]| 2.0, &ds, [0], 1)
            .unwrap()
            .check()
            .unwrap_err();
        assert_eq!(failure.failing_rows, 25);
        assert_eq!(failure.mismatches.len(), MAX_REPORTED_MISMATCHES);
        assert!(failure.to_string().contains("... 15 more"));
    }
}
