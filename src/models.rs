// Data models for the task list

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

const MS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Opaque task identifier (UUID v7, time-ordered)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(Uuid);

impl TaskId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TaskId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

/// Task priority. Ordered High > Medium > Low.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    /// Numeric rank used for ordering
    pub fn weight(self) -> i64 {
        match self {
            Priority::High => 3,
            Priority::Medium => 2,
            Priority::Low => 1,
        }
    }

    pub fn from_weight(weight: i64) -> Option<Self> {
        match weight {
            3 => Some(Priority::High),
            2 => Some(Priority::Medium),
            1 => Some(Priority::Low),
            _ => None,
        }
    }

    /// Next priority in the fixed cycle Low -> Medium -> High -> Low
    pub fn cycle(self) -> Self {
        match self {
            Priority::Low => Priority::Medium,
            Priority::Medium => Priority::High,
            Priority::High => Priority::Low,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Priority::High => "High priority",
            Priority::Medium => "Medium priority",
            Priority::Low => "Low priority",
        }
    }

    pub fn short(self) -> &'static str {
        match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }

    /// Display colour as (r, g, b)
    pub fn rgb(self) -> (u8, u8, u8) {
        match self {
            Priority::High => (0x21, 0xAB, 0x3B),
            Priority::Medium => (0xF2, 0x99, 0x4A),
            Priority::Low => (0x21, 0x96, 0xF3),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Priority {
    type Err = eyre::Report;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "high" | "3" => Ok(Priority::High),
            "medium" | "2" => Ok(Priority::Medium),
            "low" | "1" => Ok(Priority::Low),
            other => Err(eyre::eyre!("Invalid priority: {} (expected high, medium or low)", other)),
        }
    }
}

// Accepts both the named form ("high") and the numeric weight (3)
impl<'de> Deserialize<'de> for Priority {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Name(String),
            Weight(i64),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Name(name) => name.parse().map_err(serde::de::Error::custom),
            Repr::Weight(w) => Priority::from_weight(w)
                .ok_or_else(|| serde::de::Error::custom(format!("Invalid priority weight: {}", w))),
        }
    }
}

/// A single to-do entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub priority: Priority,
    pub completed: bool,
    pub due_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Whole days until the due date, rounded up. Negative when overdue.
    pub fn days_remaining(&self, now: DateTime<Utc>) -> i64 {
        days_between(now, self.due_date)
    }

    pub fn status_label(&self) -> &'static str {
        if self.completed { "Completed" } else { "Pending" }
    }
}

/// `ceil((to - from) / 1 day)`
pub fn days_between(from: DateTime<Utc>, to: DateTime<Utc>) -> i64 {
    let ms = (to - from).num_milliseconds();
    let whole = ms.div_euclid(MS_PER_DAY);
    if ms.rem_euclid(MS_PER_DAY) == 0 { whole } else { whole + 1 }
}

/// Caller-supplied fields for a new task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTask {
    pub title: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub completed: bool,
    #[serde(default = "Utc::now")]
    pub due_date: DateTime<Utc>,
}

impl NewTask {
    pub fn new(title: impl Into<String>, priority: Priority) -> Self {
        Self {
            title: title.into(),
            priority,
            completed: false,
            due_date: Utc::now(),
        }
    }

    pub fn due(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = due_date;
        self
    }
}

/// Partial field set for an update. `None` leaves the field as it was.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskChanges {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
}

impl TaskChanges {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    pub fn priority(priority: Priority) -> Self {
        Self {
            priority: Some(priority),
            ..Default::default()
        }
    }

    pub fn completed(completed: bool) -> Self {
        Self {
            completed: Some(completed),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.priority.is_none() && self.completed.is_none() && self.due_date.is_none()
    }
}

/// Transient visibility state for a task's row. Not domain data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewFlags {
    pub is_edit: bool,
    pub show_date_picker: bool,
    pub show_priority_picker: bool,
}
