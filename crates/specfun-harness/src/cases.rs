//! Catalog of reference checks.

use num_complex::Complex64;
use serde::Serialize;

use crate::error::HarnessError;
use crate::functions::SpecialFunction;
use crate::grid;
use crate::value::ValueKind;
use crate::version::Version;

/// Where a check's input points come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PointSource {
    ExpiComplexGrid,
    Hyp2f1StrangePoints,
    Hyp2f1SomePoints,
    Hyp2f1SomePoints2,
    Hyp2f1RealGrid,
    Hyp2f1Random { seed: u64, points: usize },
}

/// Generated inputs, one value kind per set.
#[derive(Debug, Clone, PartialEq)]
pub enum CasePoints {
    Real(Vec<Vec<f64>>),
    Complex(Vec<Vec<Complex64>>),
}

impl CasePoints {
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Real(p) => p.len(),
            Self::Complex(p) => p.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PointSource {
    /// Inputs for this source. Only the random grid depends on the reference
    /// version.
    #[must_use]
    pub fn points(self, reference: &Version) -> CasePoints {
        match self {
            Self::ExpiComplexGrid => CasePoints::Complex(grid::expi_complex_grid()),
            Self::Hyp2f1StrangePoints => CasePoints::Real(grid::hyp2f1_strange_points()),
            Self::Hyp2f1SomePoints => CasePoints::Real(grid::hyp2f1_some_points()),
            Self::Hyp2f1SomePoints2 => CasePoints::Real(grid::hyp2f1_some_points_2()),
            Self::Hyp2f1RealGrid => CasePoints::Real(grid::hyp2f1_real_grid()),
            Self::Hyp2f1Random { seed, points } => {
                CasePoints::Real(grid::hyp2f1_random_points(seed, points, reference))
            }
        }
    }
}

/// One gated comparison of a library function against the reference.
#[derive(Debug, Clone, Serialize)]
pub struct CheckCase {
    pub name: &'static str,
    pub function: SpecialFunction,
    pub kind: ValueKind,
    /// Oldest reference version whose values are trusted for this case.
    pub min_reference: &'static str,
    pub rtol: f64,
    /// Why the library is expected to disagree, if it is.
    pub known_failure: Option<&'static str>,
    pub source: PointSource,
    pub slow: bool,
}

impl CheckCase {
    pub fn min_reference(&self) -> Result<Version, HarnessError> {
        Version::parse(self.min_reference)
    }

    /// Every function argument is an input column; the reference value is
    /// appended after them.
    #[must_use]
    pub fn input_columns(&self) -> Vec<usize> {
        (0..self.function.arity()).collect()
    }

    #[must_use]
    pub fn output_column(&self) -> usize {
        self.function.arity()
    }
}

pub const CATALOG: &[CheckCase] = &[
    CheckCase {
        name: "expi_complex",
        function: SpecialFunction::Expi,
        kind: ValueKind::Complex,
        min_reference: "0.10",
        rtol: crate::compare::DEFAULT_RTOL,
        known_failure: None,
        source: PointSource::ExpiComplexGrid,
        slow: false,
    },
    CheckCase {
        name: "hyp2f1_strange_points",
        function: SpecialFunction::Hyp2f1,
        kind: ValueKind::Real,
        min_reference: "0.12",
        rtol: 1e-10,
        known_failure: Some(
            "a = c or b = c negative integers follow a different convention than the reference",
        ),
        source: PointSource::Hyp2f1StrangePoints,
        slow: false,
    },
    CheckCase {
        name: "hyp2f1_real_some_points",
        function: SpecialFunction::Hyp2f1,
        kind: ValueKind::Real,
        min_reference: "0.13",
        rtol: 1e-10,
        known_failure: None,
        source: PointSource::Hyp2f1SomePoints,
        slow: false,
    },
    CheckCase {
        name: "hyp2f1_some_points_2",
        function: SpecialFunction::Hyp2f1,
        kind: ValueKind::Real,
        min_reference: "0.14",
        rtol: 1e-10,
        known_failure: None,
        source: PointSource::Hyp2f1SomePoints2,
        slow: false,
    },
    CheckCase {
        name: "hyp2f1_real_some",
        function: SpecialFunction::Hyp2f1,
        kind: ValueKind::Real,
        min_reference: "0.13",
        rtol: 1e-9,
        known_failure: None,
        source: PointSource::Hyp2f1RealGrid,
        slow: false,
    },
    CheckCase {
        name: "hyp2f1_real_random",
        function: SpecialFunction::Hyp2f1,
        kind: ValueKind::Real,
        min_reference: "0.12",
        rtol: 1e-9,
        known_failure: None,
        source: PointSource::Hyp2f1Random {
            seed: grid::RANDOM_SEED,
            points: grid::RANDOM_POINTS,
        },
        slow: true,
    },
];

/// Look up a catalog case by name.
#[must_use]
pub fn find(name: &str) -> Option<&'static CheckCase> {
    CATALOG.iter().find(|case| case.name == name.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_names_are_unique_and_findable() {
        for case in CATALOG {
            assert_eq!(find(case.name).map(|c| c.name), Some(case.name));
            assert_eq!(CATALOG.iter().filter(|c| c.name == case.name).count(), 1);
        }
        assert!(find("gamma_everything").is_none());
    }

    #[test]
    fn minimum_versions_parse() {
        for case in CATALOG {
            assert!(case.min_reference().is_ok(), "{}", case.name);
        }
        assert_eq!(find("hyp2f1_some_points_2").unwrap().min_reference, "0.14");
    }

    #[test]
    fn sources_match_declared_kind() {
        let version = Version::parse("1.3.0").unwrap();
        for case in CATALOG.iter().filter(|c| !c.slow) {
            let points = case.source.points(&version);
            let kind = match points {
                CasePoints::Real(_) => ValueKind::Real,
                CasePoints::Complex(_) => ValueKind::Complex,
            };
            assert_eq!(kind, case.kind, "{}", case.name);
            assert!(!points.is_empty());
        }
    }

    #[test]
    fn columns_follow_arity() {
        let case = find("hyp2f1_real_some").unwrap();
        assert_eq!(case.input_columns(), vec![0, 1, 2, 3]);
        assert_eq!(case.output_column(), 4);
        let case = find("expi_complex").unwrap();
        assert_eq!(case.input_columns(), vec![0]);
        assert_eq!(case.output_column(), 1);
    }

    #[test]
    fn only_strange_points_expect_disagreement() {
        let expected: Vec<_> = CATALOG
            .iter()
            .filter(|c| c.known_failure.is_some())
            .map(|c| c.name)
            .collect();
        assert_eq!(expected, vec!["hyp2f1_strange_points"]);
    }

    #[test]
    fn only_random_grid_is_slow() {
        let slow: Vec<_> = CATALOG.iter().filter(|c| c.slow).map(|c| c.name).collect();
        assert_eq!(slow, vec!["hyp2f1_real_random"]);
    }
}
