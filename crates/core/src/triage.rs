//! Triage levels and their priority ranks.

use crate::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Clinical urgency classification assigned by the triage nurse.
///
/// Priority is defined by [`TriageLevel::rank`], never by the enum's discriminant, so the
/// variants can be reordered or extended without silently changing queue order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TriageLevel {
    Critical,
    Emergency,
    Urgent,
    MinorUrgent,
    NonUrgent,
}

impl TriageLevel {
    pub const ALL: [TriageLevel; 5] = [
        TriageLevel::Critical,
        TriageLevel::Emergency,
        TriageLevel::Urgent,
        TriageLevel::MinorUrgent,
        TriageLevel::NonUrgent,
    ];

    /// Numeric priority rank. Lower rank is seen first.
    pub const fn rank(self) -> u8 {
        match self {
            TriageLevel::Critical => 0,
            TriageLevel::Emergency => 1,
            TriageLevel::Urgent => 2,
            TriageLevel::MinorUrgent => 3,
            TriageLevel::NonUrgent => 4,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            TriageLevel::Critical => "CRITICAL",
            TriageLevel::Emergency => "EMERGENCY",
            TriageLevel::Urgent => "URGENT",
            TriageLevel::MinorUrgent => "MINOR_URGENT",
            TriageLevel::NonUrgent => "NON_URGENT",
        }
    }

    pub fn from_rank(rank: u8) -> CoreResult<Self> {
        Self::ALL
            .into_iter()
            .find(|level| level.rank() == rank)
            .ok_or_else(|| CoreError::Validation(format!("unknown triage rank {rank}")))
    }
}

impl fmt::Display for TriageLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TriageLevel {
    type Err = CoreError;

    /// Accepts the upper-snake names case-insensitively, with `-` or `_` as separator.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalised = s.trim().to_ascii_uppercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|level| level.as_str() == normalised)
            .ok_or_else(|| CoreError::Validation(format!("unknown triage level '{}'", s.trim())))
    }
}
