//! Special functions checked by the specfun conformance harness.
//!
//! Provides:
//! - [`hyp2f1`]: Gauss hypergeometric function for real arguments.
//! - [`expi`] / [`expi_complex`]: exponential integral `Ei`.
//! - [`tgamma`], [`lgamma`], [`rgamma`]: gamma helpers used by the connection formulas.

#![forbid(unsafe_code)]

pub mod expi;
pub mod gamma;
pub mod hyp2f1;

pub use expi::{expi, expi_complex};
pub use gamma::{gamma_ratio, lgamma, rgamma, tgamma};
pub use hyp2f1::hyp2f1;
pub use num_complex::Complex64;
