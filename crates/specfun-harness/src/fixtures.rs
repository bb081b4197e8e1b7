//! Fixture loading and management.
//!
//! A fixture is a dataset captured from the reference together with the
//! column selection and tolerance needed to verify the library against it
//! offline.

use std::path::{Path, PathBuf};

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::cases::CheckCase;
use crate::error::HarnessError;
use crate::functions::SpecialFunction;
use crate::value::ValueKind;

/// Current fixture schema version.
pub const FIXTURE_VERSION: &str = "v1";

/// Dataset rows; complex values are `[re, im]` pairs and real infinities are
/// the strings `"inf"` and `"-inf"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FixtureRows {
    Real(#[serde(with = "crate::value::real_rows")] Vec<Vec<f64>>),
    Complex(Vec<Vec<Complex64>>),
}

impl FixtureRows {
    #[must_use]
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Real(_) => ValueKind::Real,
            Self::Complex(_) => ValueKind::Complex,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Real(rows) => rows.len(),
            Self::Complex(rows) => rows.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Which reference produced the values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceInfo {
    pub name: String,
    pub version: String,
}

/// A captured dataset for one check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixtureSet {
    /// Schema version.
    pub version: String,
    /// Catalog case (or hand-written fixture) name.
    pub case: String,
    pub function: SpecialFunction,
    /// UTC timestamp of capture.
    pub captured_at: String,
    pub reference: ReferenceInfo,
    pub kind: ValueKind,
    pub input_columns: Vec<usize>,
    pub output_column: usize,
    pub rtol: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub known_failure: Option<String>,
    pub rows: FixtureRows,
}

impl FixtureSet {
    /// Package rows captured for a catalog case.
    #[must_use]
    pub fn capture(case: &CheckCase, reference: ReferenceInfo, rows: FixtureRows) -> Self {
        Self {
            version: FIXTURE_VERSION.to_string(),
            case: case.name.to_string(),
            function: case.function,
            captured_at: crate::structured_log::now_utc(),
            reference,
            kind: rows.kind(),
            input_columns: case.input_columns(),
            output_column: case.output_column(),
            rtol: case.rtol,
            known_failure: case.known_failure.map(str::to_string),
            rows,
        }
    }

    /// Load and validate a fixture set from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, HarnessError> {
        let set: Self = serde_json::from_str(json)?;
        set.validate()?;
        Ok(set)
    }

    /// Serialize fixture set to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load fixture set from a file path.
    pub fn from_file(path: &Path) -> Result<Self, HarnessError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Write the fixture as pretty JSON, creating parent directories.
    pub fn write_file(&self, path: &Path) -> Result<(), HarnessError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Load every `*.json` fixture in `dir`, sorted by file name.
    pub fn load_dir(dir: &Path) -> Result<Vec<(PathBuf, Self)>, HarnessError> {
        let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .collect();
        paths.sort();
        paths
            .into_iter()
            .map(|path| Self::from_file(&path).map(|set| (path, set)))
            .collect()
    }

    /// Rows must be present and agree with the declared kind. An empty
    /// complex fixture parses as real, so emptiness is checked first.
    fn validate(&self) -> Result<(), HarnessError> {
        if self.rows.is_empty() {
            return Err(HarnessError::EmptyFixture(self.case.clone()));
        }
        if self.rows.kind() != self.kind {
            return Err(HarnessError::KindMismatch {
                case: self.case.clone(),
                declared: self.kind.to_string(),
                found: self.rows.kind().to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REAL_FIXTURE: &str = r#"{
        "version": "v1",
        "case": "log_series",
        "function": "hyp2f1",
        "captured_at": "2026-10-18T00:00:00.000Z",
        "reference": {"name": "analytic", "version": "1.0"},
        "kind": "real",
        "input_columns": [0, 1, 2, 3],
        "output_column": 4,
        "rtol": 1e-12,
        "rows": [[1.0, 1.0, 2.0, 0.5, 1.3862943611198906]]
    }"#;

    #[test]
    fn real_fixture_parses() {
        let set = FixtureSet::from_json(REAL_FIXTURE).unwrap();
        assert_eq!(set.function, SpecialFunction::Hyp2f1);
        assert_eq!(set.kind, ValueKind::Real);
        assert!(set.known_failure.is_none());
        assert_eq!(set.rows.len(), 1);
    }

    #[test]
    fn complex_rows_are_pairs() {
        let json = REAL_FIXTURE
            .replace(r#""function": "hyp2f1""#, r#""function": "expi""#)
            .replace(r#""kind": "real""#, r#""kind": "complex""#)
            .replace(
                "[[1.0, 1.0, 2.0, 0.5, 1.3862943611198906]]",
                "[[[0.0, 1.0], [0.337403922900968, 2.5168793971620795]]]",
            );
        let set = FixtureSet::from_json(&json).unwrap();
        match &set.rows {
            FixtureRows::Complex(rows) => assert_eq!(rows[0][0], Complex64::new(0.0, 1.0)),
            FixtureRows::Real(_) => panic!("complex rows parsed as real"),
        }
    }

    #[test]
    fn infinite_reference_values_survive_json() {
        let json = REAL_FIXTURE.replace(
            "[[1.0, 1.0, 2.0, 0.5, 1.3862943611198906]]",
            r#"[[2.0, -3.0, -2.0, 3.0, "inf"], [1.0, 1.0, 2.0, 1.0, "-inf"]]"#,
        );
        let set = FixtureSet::from_json(&json).unwrap();
        let FixtureRows::Real(rows) = &set.rows else {
            panic!("real rows parsed as complex");
        };
        assert_eq!(rows[0][4], f64::INFINITY);
        assert_eq!(rows[1][4], f64::NEG_INFINITY);

        let written = set.to_json().unwrap();
        assert!(written.contains(r#""inf""#), "{written}");
        assert_eq!(FixtureSet::from_json(&written).unwrap(), set);

        let bad = json.replace(r#""-inf""#, r#""minus infinity""#);
        assert!(matches!(
            FixtureSet::from_json(&bad),
            Err(HarnessError::Json(_))
        ));
    }

    #[test]
    fn declared_kind_must_match_rows() {
        let json = REAL_FIXTURE.replace(r#""kind": "real""#, r#""kind": "complex""#);
        assert!(matches!(
            FixtureSet::from_json(&json),
            Err(HarnessError::KindMismatch { .. })
        ));
    }

    #[test]
    fn empty_rows_are_rejected() {
        let json = REAL_FIXTURE.replace("[[1.0, 1.0, 2.0, 0.5, 1.3862943611198906]]", "[]");
        assert!(matches!(
            FixtureSet::from_json(&json),
            Err(HarnessError::EmptyFixture(case)) if case == "log_series"
        ));
    }

    #[test]
    fn capture_copies_case_metadata() {
        let case = crate::cases::find("hyp2f1_strange_points").unwrap();
        let set = FixtureSet::capture(
            case,
            ReferenceInfo {
                name: String::from("mpmath"),
                version: String::from("1.3.0"),
            },
            FixtureRows::Real(vec![vec![2.0, -1.0, -1.0, 3.0, 7.0]]),
        );
        assert_eq!(set.version, FIXTURE_VERSION);
        assert_eq!(set.output_column, 4);
        assert_eq!(set.rtol, 1e-10);
        assert!(set.known_failure.is_some());

        let reparsed = FixtureSet::from_json(&set.to_json().unwrap()).unwrap();
        assert_eq!(reparsed, set);
    }
}
