//! Core types for the task tree service.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Lowest accepted task priority.
pub const PRIORITY_MIN: i64 = 1;
/// Highest accepted task priority.
pub const PRIORITY_MAX: i64 = 5;

/// Task status. Tasks start as `todo` and move to `done` via the
/// completion endpoint (or a full update).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Todo,
    Done,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::Done => "done",
        }
    }

    /// Parse a status string. Returns `None` for anything outside the enum.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "todo" => Some(TaskStatus::Todo),
            "done" => Some(TaskStatus::Done),
            _ => None,
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user who owns tasks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub created_at: i64,
}

/// A persisted task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub user_id: String,
    pub status: TaskStatus,
    pub priority: i64,
    pub title: String,
    pub description: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// A closure-table edge: `descendant` sits exactly `depth` hops below
/// `ancestor`. Depth is always >= 1; self edges are not stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub ancestor: String,
    pub descendant: String,
    pub depth: i64,
}

/// Field payload for creating or fully updating a task.
/// Every field is required; partial updates are not supported.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskInput {
    pub status: Option<String>,
    pub priority: Option<i64>,
    pub title: Option<String>,
    pub description: Option<String>,
}

/// Nested input for creating a task together with its subtree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskTreeInput {
    #[serde(flatten)]
    pub fields: TaskInput,
    #[serde(default)]
    pub children: Vec<TaskTreeInput>,
}

/// A child node (and therefore its whole subtree) that was skipped during
/// bulk tree creation, together with the per-field reasons.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedChild {
    pub title: Option<String>,
    pub errors: BTreeMap<String, Vec<String>>,
}

/// Outcome of a tree creation: the root task, how many tasks were created
/// in total, and which children were skipped for failing validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTreeResult {
    pub task: Task,
    pub created: usize,
    pub skipped: Vec<SkippedChild>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parses_known_values_only() {
        assert_eq!(TaskStatus::parse("todo"), Some(TaskStatus::Todo));
        assert_eq!(TaskStatus::parse("done"), Some(TaskStatus::Done));
        assert_eq!(TaskStatus::parse("DONE"), None);
        assert_eq!(TaskStatus::parse("in_progress"), None);
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&TaskStatus::Todo).unwrap(), "\"todo\"");
        assert_eq!(serde_json::to_string(&TaskStatus::Done).unwrap(), "\"done\"");
    }

    #[test]
    fn tree_input_deserializes_nested_children() {
        let json = serde_json::json!({
            "status": "todo",
            "priority": 3,
            "title": "root",
            "description": "d",
            "children": [
                {"status": "todo", "priority": 1, "title": "child", "description": "d2"}
            ]
        });
        let input: TaskTreeInput = serde_json::from_value(json).unwrap();
        assert_eq!(input.fields.title.as_deref(), Some("root"));
        assert_eq!(input.children.len(), 1);
        assert!(input.children[0].children.is_empty());
    }
}
