use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::gating::{IgnoreReason, TaskGateStatus};
use super::task::GameType;

/// Raw selection sent by a player. Replayed through the matching widget,
/// which decides correctness.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Submission {
    #[serde(rename_all = "camelCase")]
    ChoiceQuiz { selected_option: usize },
    RankingPuzzle { order: Vec<usize> },
    #[serde(rename_all = "camelCase")]
    ArithmeticQuiz { selected_option: usize },
    PairMatch { matches: BTreeMap<String, String> },
    /// Letter indices in click order.
    LetterAssembly { letters: Vec<usize> },
}

impl Submission {
    pub fn game_type(&self) -> GameType {
        match self {
            Submission::ChoiceQuiz { .. } => GameType::ChoiceQuiz,
            Submission::RankingPuzzle { .. } => GameType::RankingPuzzle,
            Submission::ArithmeticQuiz { .. } => GameType::ArithmeticQuiz,
            Submission::PairMatch { .. } => GameType::PairMatch,
            Submission::LetterAssembly { .. } => GameType::LetterAssembly,
        }
    }
}

/// Answer produced by a widget: the selection plus its own correctness verdict.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum TaskAnswer {
    #[serde(rename_all = "camelCase")]
    Choice {
        selected_option: usize,
        is_correct: bool,
    },
    #[serde(rename_all = "camelCase")]
    Ranking { order: Vec<usize>, is_correct: bool },
    #[serde(rename_all = "camelCase")]
    Matches {
        matches: BTreeMap<String, String>,
        is_correct: bool,
    },
    #[serde(rename_all = "camelCase")]
    Word { word: String, is_correct: bool },
}

impl TaskAnswer {
    pub fn is_correct(&self) -> bool {
        match self {
            TaskAnswer::Choice { is_correct, .. }
            | TaskAnswer::Ranking { is_correct, .. }
            | TaskAnswer::Matches { is_correct, .. }
            | TaskAnswer::Word { is_correct, .. } => *is_correct,
        }
    }
}

/// An answer recorded in the session history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GameAnswer {
    pub task_id: String,
    pub answer: TaskAnswer,
    pub page: u32,
    /// Epoch milliseconds.
    pub completed_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PageAnswer {
    pub task_id: String,
    pub answer: TaskAnswer,
}

/// Answers of one page in submission order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct PageAnswers(pub Vec<PageAnswer>);

impl PageAnswers {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, task_id: &str) -> Option<&TaskAnswer> {
        self.0
            .iter()
            .find(|entry| entry.task_id == task_id)
            .map(|entry| &entry.answer)
    }

    pub fn contains(&self, task_id: &str) -> bool {
        self.get(task_id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PageAnswer> {
        self.0.iter()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStatusView {
    pub task_id: String,
    pub status: TaskGateStatus,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAnswerResponse {
    pub accepted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignored_reason: Option<IgnoreReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<TaskAnswer>,
    pub tasks: Vec<TaskStatusView>,
}
