//! Dotted version strings and their ordering.
//!
//! Components are split on `.`, `-` and `+`. Numeric components compare as
//! integers and text components compare lexically. A numeric component
//! against a text component falls back to comparing their rendered strings,
//! so pre-release tags such as `1.4.0a1` get a consistent but not semantic
//! order. A version that is a strict prefix of another sorts first.

use std::cmp::Ordering;
use std::fmt;

use crate::error::HarnessError;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Component {
    Numeric(u64),
    Text(String),
}

impl Component {
    fn parse(raw: &str) -> Self {
        raw.parse::<u64>()
            .map_or_else(|_| Self::Text(raw.to_string()), Self::Numeric)
    }

    fn render(&self) -> String {
        match self {
            Self::Numeric(n) => n.to_string(),
            Self::Text(s) => s.clone(),
        }
    }

    fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Numeric(a), Self::Numeric(b)) => a.cmp(b),
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            _ => self.render().cmp(&other.render()),
        }
    }
}

/// A parsed version such as `0.13` or `1.3.0`.
#[derive(Debug, Clone)]
pub struct Version {
    raw: String,
    components: Vec<Component>,
}

impl Version {
    pub fn parse(s: &str) -> Result<Self, HarnessError> {
        let raw = s.trim();
        if raw.is_empty() {
            return Err(HarnessError::InvalidVersion(s.to_string()));
        }
        let components = raw
            .split(['.', '-', '+'])
            .map(|part| {
                if part.is_empty() {
                    Err(HarnessError::InvalidVersion(s.to_string()))
                } else {
                    Ok(Component::parse(part))
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            raw: raw.to_string(),
            components,
        })
    }

    /// Component-wise comparison; a strict prefix sorts first.
    #[must_use]
    pub fn compare(&self, other: &Self) -> Ordering {
        self.components
            .iter()
            .zip(&other.components)
            .map(|(a, b)| a.compare(b))
            .find(|ord| ord.is_ne())
            .unwrap_or_else(|| self.components.len().cmp(&other.components.len()))
    }

    #[must_use]
    pub fn at_least(&self, minimum: &Self) -> bool {
        self.compare(minimum).is_ge()
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.compare(other).is_eq()
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.compare(other))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl std::str::FromStr for Version {
    type Err = HarnessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
