//! Error type shared across the harness.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("row {row} has {found} columns, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("column {column} out of range for dataset width {width}")]
    ColumnOutOfRange { column: usize, width: usize },
    #[error("{function} takes {expected} arguments, {found} input columns selected")]
    ArityMismatch {
        function: String,
        expected: usize,
        found: usize,
    },
    #[error("invalid tolerance rtol={rtol} atol={atol}")]
    InvalidTolerance { rtol: f64, atol: f64 },
    #[error("invalid version string '{0}'")]
    InvalidVersion(String),
    #[error("unknown function '{0}'")]
    UnknownFunction(String),
    #[error("{function} has no {kind} implementation")]
    UnsupportedKind { function: String, kind: String },
    #[error("reference oracle: {0}")]
    Oracle(String),
    #[error("fixture '{0}' has no rows")]
    EmptyFixture(String),
    #[error("fixture '{case}' declares {declared} values but holds {found} rows")]
    KindMismatch {
        case: String,
        declared: String,
        found: String,
    },
}
