//! Request and response records exchanged at the HTTP boundary.
//!
//! These types map directly to the JSON bodies of `POST /generate-plan` and
//! are (de)serialized via `serde`. Structural checks happen during
//! deserialization; [`PlanRequest::validate`] covers the rest.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::time::{ClockTime, FormatError};

// ---------------------------------------------------------------------------
// Energy level
// ---------------------------------------------------------------------------

/// Self-reported energy level for the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnergyLevel {
    High,
    Medium,
    Low,
}

impl EnergyLevel {
    /// Tip appended to plans built by the deterministic scheduler.
    pub fn fallback_tip(self) -> &'static str {
        match self {
            Self::High => "Use your high energy for deep, focused work",
            Self::Medium => "Maintain a steady and balanced workflow",
            Self::Low => "Keep tasks light and avoid burnout",
        }
    }

    /// Tip appended to plans produced by the model.
    pub fn coaching_tip(self) -> &'static str {
        match self {
            Self::High => "Use your high energy for deep, focused work",
            Self::Medium => "Maintain a steady and balanced workflow",
            Self::Low => "Keep tasks light and take regular breaks",
        }
    }
}

impl fmt::Display for EnergyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        };
        f.write_str(s)
    }
}

impl FromStr for EnergyLevel {
    type Err = EnergyLevelParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            other => Err(EnergyLevelParseError(other.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`EnergyLevel`] string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid energy level: {0:?} (expected high, medium, or low)")]
pub struct EnergyLevelParseError(pub String);

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// Inputs for one day's plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanRequest {
    /// Goal labels in priority order.
    pub goals: Vec<String>,
    /// Total hours to spread across all goals.
    pub available_hours: u32,
    /// Known distractions. Only the model prompt uses these.
    #[serde(default)]
    pub distractions: Vec<String>,
    /// Start of the first block, `HH:MM`.
    pub start_time: String,
    pub energy_level: EnergyLevel,
}

/// A contiguous interval assigned to one goal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeBlock {
    pub task: String,
    pub start_time: String,
    pub end_time: String,
}

/// A generated plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanResponse {
    pub priority_order: Vec<String>,
    pub schedule: Vec<TimeBlock>,
    pub tips: Vec<String>,
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Reasons a structurally valid request is still rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("goal at index {index} is empty")]
    EmptyGoal { index: usize },

    #[error("invalid start_time: {0}")]
    StartTime(#[from] FormatError),
}

impl PlanRequest {
    /// Check the fields serde cannot, returning the parsed start time.
    pub fn validate(&self) -> Result<ClockTime, RequestError> {
        if let Some(index) = self.goals.iter().position(|g| g.trim().is_empty()) {
            return Err(RequestError::EmptyGoal { index });
        }
        Ok(ClockTime::parse(&self.start_time)?)
    }
}
