//! Closed task enumerations: workflow status and priority.
//!
//! Both are stored as `TEXT` in the database using the wire spelling
//! returned by [`TaskStatus::as_str`] / [`TaskPriority::as_str`], guarded by
//! `CHECK` constraints in the `tasks` table migration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Workflow status of a task. Doubles as the Kanban lane identifier.
///
/// Transitions are unrestricted: any status may move to any other status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Done,
}

impl TaskStatus {
    /// All statuses in board order (left to right).
    pub const ALL: [TaskStatus; 3] = [Self::Todo, Self::InProgress, Self::Done];

    /// Wire and database spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "in-progress",
            Self::Done => "done",
        }
    }

    /// Column heading shown on the board.
    pub fn label(self) -> &'static str {
        match self {
            Self::Todo => "To-Do",
            Self::InProgress => "In Progress",
            Self::Done => "Done",
        }
    }

    /// Zero-based lane position on the board.
    pub fn lane_index(self) -> usize {
        match self {
            Self::Todo => 0,
            Self::InProgress => 1,
            Self::Done => 2,
        }
    }
}

impl Default for TaskStatus {
    fn default() -> Self {
        Self::Todo
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "todo" => Ok(Self::Todo),
            "in-progress" => Ok(Self::InProgress),
            "done" => Ok(Self::Done),
            other => Err(CoreError::Validation(format!(
                "Invalid task status '{other}'. Must be one of: todo, in-progress, done"
            ))),
        }
    }
}

impl TryFrom<String> for TaskStatus {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

// ---------------------------------------------------------------------------
// Priority
// ---------------------------------------------------------------------------

/// Task priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
}

impl TaskPriority {
    pub const ALL: [TaskPriority; 3] = [Self::Low, Self::Medium, Self::High];

    /// Wire and database spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl Default for TaskPriority {
    fn default() -> Self {
        Self::Medium
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskPriority {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(CoreError::Validation(format!(
                "Invalid task priority '{other}'. Must be one of: low, medium, high"
            ))),
        }
    }
}

impl TryFrom<String> for TaskPriority {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_wire_spelling() {
        for status in TaskStatus::ALL {
            assert_eq!(status.as_str().parse::<TaskStatus>().unwrap(), status);
        }
    }

    #[test]
    fn status_serializes_kebab_case() {
        let json = serde_json::to_string(&TaskStatus::InProgress).unwrap();
        assert_eq!(json, "\"in-progress\"");
    }

    #[test]
    fn unknown_status_is_rejected() {
        let err = "blocked".parse::<TaskStatus>().unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn priority_rejects_uppercase() {
        assert!("HIGH".parse::<TaskPriority>().is_err());
        assert_eq!("high".parse::<TaskPriority>().unwrap(), TaskPriority::High);
    }

    #[test]
    fn lane_indices_follow_board_order() {
        let indices: Vec<usize> = TaskStatus::ALL.iter().map(|s| s.lane_index()).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }
}
