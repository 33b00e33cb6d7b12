use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::answer::PageAnswers;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum TaskGateStatus {
    Locked,
    Current,
    Waiting,
    Completed,
}

/// Why a submission was dropped without effect.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum IgnoreReason {
    Disabled,
    UnknownTask,
    Locked,
    AlreadyAnswered,
    WaitInProgress,
}

impl IgnoreReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            IgnoreReason::Disabled => "disabled",
            IgnoreReason::UnknownTask => "unknown-task",
            IgnoreReason::Locked => "locked",
            IgnoreReason::AlreadyAnswered => "already-answered",
            IgnoreReason::WaitInProgress => "wait-in-progress",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum GatingEvent {
    TaskWaiting(TaskWaiting),
    TaskUnlocked(TaskUnlocked),
    PageCompleted(PageCompleted),
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TaskWaiting {
    pub page: u32,
    pub task_id: String,
    pub delay_ms: u64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TaskUnlocked {
    pub page: u32,
    pub task_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PageCompleted {
    pub page: u32,
    pub answers: PageAnswers,
    pub timestamp: DateTime<Utc>,
}

impl GatingEvent {
    pub fn to_sse_data(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn event_name(&self) -> &'static str {
        match self {
            GatingEvent::TaskWaiting(_) => "task-waiting",
            GatingEvent::TaskUnlocked(_) => "task-unlocked",
            GatingEvent::PageCompleted(_) => "page-completed",
        }
    }
}
