use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Task status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Todo,
    InProgress,
    Done,
    Blocked,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Todo => "todo",
            Status::InProgress => "in_progress",
            Status::Done => "done",
            Status::Blocked => "blocked",
        }
    }

    pub fn marker(&self) -> &'static str {
        match self {
            Status::Todo => "⏳",
            Status::InProgress => "🔄",
            Status::Done => "✅",
            Status::Blocked => "🚫",
        }
    }

    /// Marker for raw status text; values outside the enum get a fallback.
    pub fn marker_for(s: &str) -> &'static str {
        Status::try_from(s).map(|st| st.marker()).unwrap_or("📌")
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<&str> for Status {
    type Error = String;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s {
            "todo" => Ok(Status::Todo),
            "in_progress" => Ok(Status::InProgress),
            "done" => Ok(Status::Done),
            "blocked" => Ok(Status::Blocked),
            _ => Err(format!("Invalid status: {s}")),
        }
    }
}

/// Task priority
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    Urgent,
    High,
    Normal,
    Low,
}

impl Priority {
    /// Rank for anything that is not one of the four known priorities.
    pub const UNKNOWN_RANK: u8 = 4;

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Urgent => "urgent",
            Priority::High => "high",
            Priority::Normal => "normal",
            Priority::Low => "low",
        }
    }

    pub fn marker(&self) -> &'static str {
        match self {
            Priority::Urgent => "🔴",
            Priority::High => "🟠",
            Priority::Normal => "🟢",
            Priority::Low => "🔵",
        }
    }

    /// Sort rank: urgent < high < normal < low < anything else.
    pub fn rank(&self) -> u8 {
        match self {
            Priority::Urgent => 0,
            Priority::High => 1,
            Priority::Normal => 2,
            Priority::Low => 3,
        }
    }

    /// Rank for raw priority text, with an explicit bucket for unknown values.
    pub fn rank_of(s: &str) -> u8 {
        Priority::try_from(s)
            .map(|p| p.rank())
            .unwrap_or(Self::UNKNOWN_RANK)
    }

    pub fn marker_for(s: &str) -> &'static str {
        Priority::try_from(s).map(|p| p.marker()).unwrap_or("⚪")
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<&str> for Priority {
    type Error = String;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s {
            "urgent" => Ok(Priority::Urgent),
            "high" => Ok(Priority::High),
            "normal" => Ok(Priority::Normal),
            "low" => Ok(Priority::Low),
            _ => Err(format!("Invalid priority: {s}")),
        }
    }
}

/// New task input
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub title: String,
    pub project: String,
    pub priority: Option<String>,
    pub due_date: Option<String>,
    pub description: Option<String>,
}

/// Optional AND-combined filters for listing tasks
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    pub project: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
}

/// Task projection returned by list-style queries. Description is omitted
/// here; search results carry it via `SearchMatch`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRow {
    pub id: String,
    pub title: String,
    pub project: String,
    pub status: String,
    pub priority: String,
    pub due_date: Option<String>,
}

/// Search result: the list projection plus the matched description.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchMatch {
    #[serde(flatten)]
    pub row: TaskRow,
    pub description: String,
}

/// Outcome of a mutating store operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Receipt {
    Created {
        task_id: String,
        title: String,
        project: String,
    },
    Updated {
        task_id: String,
    },
    Deleted {
        task_id: String,
    },
    NotFound {
        task_id: String,
    },
}

/// Per-project task counts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectStats {
    pub name: String,
    pub total_tasks: i64,
    pub completed: i64,
}

/// Project name -> status -> count. Only statuses actually present appear;
/// an absent status means zero.
pub type Summary = BTreeMap<String, BTreeMap<String, i64>>;
