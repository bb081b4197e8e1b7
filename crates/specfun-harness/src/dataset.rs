//! Immutable numeric datasets.

use serde::Serialize;

use crate::error::HarnessError;
use crate::functions::SpecialFunction;
use crate::reference::ReferenceOracle;
use crate::value::DataValue;

/// Ordered rows of equal width, holding one value kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset<T> {
    width: usize,
    rows: Vec<Vec<T>>,
}

impl<T: DataValue> Dataset<T> {
    /// Build a dataset, rejecting rows whose width differs from the first row.
    pub fn from_rows(rows: Vec<Vec<T>>) -> Result<Self, HarnessError> {
        let width = rows.first().map_or(0, Vec::len);
        if let Some((row, found)) = rows
            .iter()
            .enumerate()
            .map(|(i, r)| (i, r.len()))
            .find(|&(_, len)| len != width)
        {
            return Err(HarnessError::RaggedRow {
                row,
                expected: width,
                found,
            });
        }
        Ok(Self { width, rows })
    }

    /// Evaluate the reference at each point and append its value as the last
    /// column. Points the reference cannot evaluate, or evaluates to NaN, are
    /// dropped; infinite values are kept.
    pub fn build_from_reference(
        oracle: &dyn ReferenceOracle,
        function: SpecialFunction,
        points: Vec<Vec<T>>,
    ) -> Result<Self, HarnessError> {
        let values = T::evaluate_reference(oracle, function, &points)?;
        if values.len() != points.len() {
            return Err(HarnessError::Oracle(format!(
                "{} returned {} values for {} points",
                oracle.name(),
                values.len(),
                points.len()
            )));
        }

        let rows = points
            .into_iter()
            .zip(values)
            .filter_map(|(mut point, value)| {
                let value = value.filter(|v| !v.is_nan())?;
                point.push(value);
                Some(point)
            })
            .collect();
        Self::from_rows(rows)
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn rows(&self) -> &[Vec<T>] {
        &self.rows
    }

    #[must_use]
    pub fn into_rows(self) -> Vec<Vec<T>> {
        self.rows
    }

    /// SHA-256 of the canonical JSON rendering, lowercase hex.
    #[must_use]
    pub fn digest(&self) -> String {
        use sha2::Digest;
        let canonical = serde_json::to_vec(&self.rows).unwrap_or_default();
        hex_lower(&sha2::Sha256::digest(&canonical))
    }
}

pub(crate) fn hex_lower(bytes: &[u8]) -> String {
    use std::fmt::Write;
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(&mut out, "{b:02x}");
    }
    out
}
