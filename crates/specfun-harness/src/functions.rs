//! Functions under test and their reference counterparts.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::HarnessError;

/// A special function known to both the library and the reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpecialFunction {
    /// Gauss hypergeometric `2F1(a, b; c; z)`.
    Hyp2f1,
    /// Exponential integral `Ei(z)`.
    Expi,
}

impl SpecialFunction {
    pub const ALL: [Self; 2] = [Self::Hyp2f1, Self::Expi];

    /// Library-side name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Hyp2f1 => "hyp2f1",
            Self::Expi => "expi",
        }
    }

    /// Name of the equivalent mpmath function.
    #[must_use]
    pub fn reference_name(self) -> &'static str {
        match self {
            Self::Hyp2f1 => "hyp2f1",
            Self::Expi => "ei",
        }
    }

    /// Number of positional arguments.
    #[must_use]
    pub fn arity(self) -> usize {
        match self {
            Self::Hyp2f1 => 4,
            Self::Expi => 1,
        }
    }

    /// Resolve a function by its library name.
    pub fn from_name(name: &str) -> Result<Self, HarnessError> {
        Self::ALL
            .into_iter()
            .find(|f| f.name().eq_ignore_ascii_case(name.trim()))
            .ok_or_else(|| HarnessError::UnknownFunction(name.to_string()))
    }
}

impl fmt::Display for SpecialFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
