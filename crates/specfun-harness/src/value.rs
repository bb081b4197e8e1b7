//! Numeric element types a dataset can hold.

use std::fmt;

use num_complex::Complex64;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::HarnessError;
use crate::fixtures::FixtureRows;
use crate::functions::SpecialFunction;
use crate::reference::ReferenceOracle;

/// Whether a dataset holds real or complex values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Real,
    Complex,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Real => f.write_str("real"),
            Self::Complex => f.write_str("complex"),
        }
    }
}

/// Library entry point for one function over one value kind.
pub type LibraryFn<T> = fn(&[T]) -> T;

/// A homogeneous dataset element: `f64` or `Complex64`.
pub trait DataValue:
    Copy + PartialEq + fmt::Debug + fmt::Display + Serialize + DeserializeOwned + 'static
{
    const KIND: ValueKind;

    /// `|self|` (complex modulus for complex values).
    fn magnitude(self) -> f64;

    /// `|self - other|`.
    fn distance(self, other: Self) -> f64;

    /// True when any component is NaN.
    fn is_nan(self) -> bool;

    /// True when every component is finite.
    fn is_finite(self) -> bool;

    /// The library implementation of `function` for this kind, if any.
    fn library(function: SpecialFunction) -> Option<LibraryFn<Self>>;

    /// Ask the reference for `function` at every point.
    fn evaluate_reference(
        oracle: &dyn ReferenceOracle,
        function: SpecialFunction,
        points: &[Vec<Self>],
    ) -> Result<Vec<Option<Self>>, HarnessError>;

    /// Wrap rows into the fixture representation.
    fn into_fixture_rows(rows: Vec<Vec<Self>>) -> FixtureRows;

    /// Decode one value from the reference's JSON output.
    fn from_json_value(value: serde_json::Value) -> Result<Self, HarnessError>;
}

/// JSON form of a real value. JSON has no infinities or NaN, so those are
/// written as the strings `"inf"`, `"-inf"` and `"nan"`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum JsonFloat {
    Number(f64),
    Text(String),
}

impl JsonFloat {
    fn encode(x: f64) -> Self {
        if x.is_finite() {
            return Self::Number(x);
        }
        let text = if x.is_nan() {
            "nan"
        } else if x > 0.0 {
            "inf"
        } else {
            "-inf"
        };
        Self::Text(text.to_string())
    }

    fn decode<E: serde::de::Error>(self) -> Result<f64, E> {
        match self {
            Self::Number(x) => Ok(x),
            Self::Text(text) => match text.as_str() {
                "inf" => Ok(f64::INFINITY),
                "-inf" => Ok(f64::NEG_INFINITY),
                "nan" => Ok(f64::NAN),
                other => Err(E::custom(format!("invalid float '{other}'"))),
            },
        }
    }
}

/// Serde adapter for real rows that may hold non-finite values.
pub(crate) mod real_rows {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::JsonFloat;

    pub fn serialize<S: Serializer>(rows: &[Vec<f64>], serializer: S) -> Result<S::Ok, S::Error> {
        let encoded: Vec<Vec<JsonFloat>> = rows
            .iter()
            .map(|row| row.iter().map(|&x| JsonFloat::encode(x)).collect())
            .collect();
        encoded.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<Vec<f64>>, D::Error> {
        Vec::<Vec<JsonFloat>>::deserialize(deserializer)?
            .into_iter()
            .map(|row| row.into_iter().map(JsonFloat::decode).collect())
            .collect()
    }
}

fn hyp2f1_real(args: &[f64]) -> f64 {
    specfun_core::hyp2f1(args[0], args[1], args[2], args[3])
}

fn expi_real(args: &[f64]) -> f64 {
    specfun_core::expi(args[0])
}

fn expi_complex(args: &[Complex64]) -> Complex64 {
    specfun_core::expi_complex(args[0])
}

impl DataValue for f64 {
    const KIND: ValueKind = ValueKind::Real;

    fn magnitude(self) -> f64 {
        self.abs()
    }

    fn distance(self, other: Self) -> f64 {
        (self - other).abs()
    }

    fn is_nan(self) -> bool {
        f64::is_nan(self)
    }

    fn is_finite(self) -> bool {
        f64::is_finite(self)
    }

    fn library(function: SpecialFunction) -> Option<LibraryFn<Self>> {
        match function {
            SpecialFunction::Hyp2f1 => Some(hyp2f1_real as LibraryFn<f64>),
            SpecialFunction::Expi => Some(expi_real as LibraryFn<f64>),
        }
    }

    fn evaluate_reference(
        oracle: &dyn ReferenceOracle,
        function: SpecialFunction,
        points: &[Vec<Self>],
    ) -> Result<Vec<Option<Self>>, HarnessError> {
        oracle.evaluate_real(function, points)
    }

    fn into_fixture_rows(rows: Vec<Vec<Self>>) -> FixtureRows {
        FixtureRows::Real(rows)
    }

    fn from_json_value(value: serde_json::Value) -> Result<Self, HarnessError> {
        Ok(serde_json::from_value::<JsonFloat>(value)?.decode::<serde_json::Error>()?)
    }
}

impl DataValue for Complex64 {
    const KIND: ValueKind = ValueKind::Complex;

    fn magnitude(self) -> f64 {
        self.norm()
    }

    fn distance(self, other: Self) -> f64 {
        (self - other).norm()
    }

    fn is_nan(self) -> bool {
        Complex64::is_nan(self)
    }

    fn is_finite(self) -> bool {
        Complex64::is_finite(self)
    }

    fn library(function: SpecialFunction) -> Option<LibraryFn<Self>> {
        match function {
            SpecialFunction::Hyp2f1 => None,
            SpecialFunction::Expi => Some(expi_complex as LibraryFn<Complex64>),
        }
    }

    fn evaluate_reference(
        oracle: &dyn ReferenceOracle,
        function: SpecialFunction,
        points: &[Vec<Self>],
    ) -> Result<Vec<Option<Self>>, HarnessError> {
        oracle.evaluate_complex(function, points)
    }

    fn into_fixture_rows(rows: Vec<Vec<Self>>) -> FixtureRows {
        FixtureRows::Complex(rows)
    }

    fn from_json_value(value: serde_json::Value) -> Result<Self, HarnessError> {
        Ok(serde_json::from_value(value)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complex_distance_is_modulus_of_difference() {
        let a = Complex64::new(1.0, 2.0);
        let b = Complex64::new(4.0, 6.0);
        assert_eq!(a.distance(b), 5.0);
        assert!((b.magnitude() - 52.0_f64.sqrt()).abs() < 1e-14);
    }

    #[test]
    fn nan_in_either_component_counts() {
        assert!(DataValue::is_nan(Complex64::new(f64::NAN, 0.0)));
        assert!(!DataValue::is_finite(Complex64::new(1.0, f64::INFINITY)));
        assert!(DataValue::is_nan(f64::NAN));
    }

    #[test]
    fn library_bindings_follow_kind() {
        assert!(<f64 as DataValue>::library(SpecialFunction::Hyp2f1).is_some());
        assert!(<Complex64 as DataValue>::library(SpecialFunction::Hyp2f1).is_none());
        let expi = <Complex64 as DataValue>::library(SpecialFunction::Expi).unwrap();
        let value = expi(&[Complex64::new(1.0, 0.0)]);
        assert!((value.re - 1.895_117_816_355_936_8).abs() < 1e-13);
    }
}
