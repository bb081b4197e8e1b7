//! Optional-reference gate.
//!
//! Checks that need the reference run only when it is installed at a recent
//! enough version. Anything else is a skip, never a failure.

use serde::{Deserialize, Serialize};

use crate::version::Version;

/// Result of probing for the reference implementation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum Availability {
    Missing { reason: String },
    Installed { name: String, version: String },
}

/// Whether a gated check may proceed.
#[derive(Debug, Clone, PartialEq)]
pub enum GateDecision {
    Run { version: Version },
    Skip { reason: String },
}

impl GateDecision {
    #[must_use]
    pub fn should_run(&self) -> bool {
        matches!(self, Self::Run { .. })
    }
}

/// Availability captured once and consulted per check.
#[derive(Debug, Clone)]
pub struct ReferenceGate {
    availability: Availability,
}

impl ReferenceGate {
    #[must_use]
    pub fn from_availability(availability: Availability) -> Self {
        Self { availability }
    }

    #[must_use]
    pub fn availability(&self) -> &Availability {
        &self.availability
    }

    /// The installed version, when it parses.
    #[must_use]
    pub fn installed_version(&self) -> Option<Version> {
        match &self.availability {
            Availability::Installed { version, .. } => Version::parse(version).ok(),
            Availability::Missing { .. } => None,
        }
    }

    /// Decide whether a check needing at least `minimum` can run.
    #[must_use]
    pub fn require(&self, minimum: &Version) -> GateDecision {
        match &self.availability {
            Availability::Missing { reason } => GateDecision::Skip {
                reason: format!("reference not available: {reason}"),
            },
            Availability::Installed { name, version } => match Version::parse(version) {
                Ok(installed) if installed.at_least(minimum) => {
                    GateDecision::Run { version: installed }
                }
                Ok(_) => GateDecision::Skip {
                    reason: format!("{name} {version} is older than required {minimum}"),
                },
                Err(_) => GateDecision::Skip {
                    reason: format!("{name} reports unparseable version '{version}'"),
                },
            },
        }
    }
}
