//! Reference-conformance harness for specfun.
//!
//! This crate provides:
//! - Dataset comparator: evaluate a function over dataset rows and check each
//!   result against the expected column within a relative tolerance
//! - Reference gate: skip checks when the arbitrary-precision reference is
//!   missing or older than a case requires
//! - Reference oracle: evaluate mpmath through a Python subprocess
//! - Check catalog: curated and random input grids for hyp2f1 and expi
//! - Fixtures, reports and structured JSONL logs for captured datasets

#![forbid(unsafe_code)]

pub mod cases;
pub mod compare;
pub mod dataset;
pub mod error;
pub mod fixtures;
pub mod functions;
pub mod gate;
pub mod grid;
pub mod reference;
pub mod report;
pub mod runner;
pub mod structured_log;
pub mod value;
pub mod verify;
pub mod version;

pub use compare::{CheckFailure, CheckSummary, DataCheck, Tolerance};
pub use dataset::Dataset;
pub use error::HarnessError;
pub use fixtures::FixtureSet;
pub use functions::SpecialFunction;
pub use gate::{Availability, GateDecision, ReferenceGate};
pub use reference::{MpmathOracle, ReferenceOracle};
pub use report::ConformanceReport;
pub use runner::TestRunner;
pub use verify::{CaseStatus, VerificationResult, VerificationSummary};
pub use version::Version;
