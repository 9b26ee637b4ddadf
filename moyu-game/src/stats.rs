//! Stat identifiers and their clamp policies.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a stat is kept in range after an effect is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClampPolicy {
    /// Clamped into the configured `[stat_min, stat_max]` window.
    Bounded,
    /// Floors at zero, unbounded above.
    NonNegative,
}

/// Every numeric attribute an effect may target.
///
/// Effects naming anything outside this set fail to deserialize, so a catalog
/// cannot smuggle in writes to sets or calendar fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stat {
    Chill,
    Progress,
    Suspicion,
    Energy,
    Reputation,
    Salary,
}

impl Stat {
    pub const ALL: &'static [Self] = &[
        Self::Chill,
        Self::Progress,
        Self::Suspicion,
        Self::Energy,
        Self::Reputation,
        Self::Salary,
    ];

    pub const BOUNDED: &'static [Self] = &[
        Self::Chill,
        Self::Progress,
        Self::Suspicion,
        Self::Energy,
        Self::Reputation,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Chill => "chill",
            Self::Progress => "progress",
            Self::Suspicion => "suspicion",
            Self::Energy => "energy",
            Self::Reputation => "reputation",
            Self::Salary => "salary",
        }
    }

    #[must_use]
    pub const fn clamp_policy(self) -> ClampPolicy {
        match self {
            Self::Salary => ClampPolicy::NonNegative,
            Self::Chill | Self::Progress | Self::Suspicion | Self::Energy | Self::Reputation => {
                ClampPolicy::Bounded
            }
        }
    }

    #[must_use]
    pub const fn is_bounded(self) -> bool {
        matches!(self.clamp_policy(), ClampPolicy::Bounded)
    }
}

impl fmt::Display for Stat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|stat| stat.as_str() == s)
            .ok_or(())
    }
}

/// Corporate ladder rung, ordered from lowest to highest.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum PlayerLevel {
    #[default]
    Intern,
    Junior,
    Senior,
    Lead,
    Cto,
}

impl PlayerLevel {
    pub const ALL: &'static [Self] = &[
        Self::Intern,
        Self::Junior,
        Self::Senior,
        Self::Lead,
        Self::Cto,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Intern => "intern",
            Self::Junior => "junior",
            Self::Senior => "senior",
            Self::Lead => "lead",
            Self::Cto => "cto",
        }
    }

    /// Ordinal used by the backend wire format (0 = intern).
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::Intern => 0,
            Self::Junior => 1,
            Self::Senior => 2,
            Self::Lead => 3,
            Self::Cto => 4,
        }
    }

    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Intern => Some(Self::Junior),
            Self::Junior => Some(Self::Senior),
            Self::Senior => Some(Self::Lead),
            Self::Lead => Some(Self::Cto),
            Self::Cto => None,
        }
    }
}

impl fmt::Display for PlayerLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
