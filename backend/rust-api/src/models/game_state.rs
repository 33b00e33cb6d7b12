use serde::{Deserialize, Serialize};

use super::answer::GameAnswer;

/// Snapshot of one player's quiz run. `current_page == 0` means not started.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub current_page: u32,
    pub current_task_index: usize,
    pub answers: Vec<GameAnswer>,
    pub score: Option<String>,
    pub is_completed: bool,
    pub is_task_completed: bool,
    pub is_transitioning: bool,
    pub session_id: String,
    pub has_adblock: bool,
    /// Epoch milliseconds.
    pub start_time: i64,
}

impl GameState {
    pub fn initial(now_millis: i64) -> Self {
        Self {
            current_page: 0,
            current_task_index: 0,
            answers: Vec::new(),
            score: None,
            is_completed: false,
            is_task_completed: false,
            is_transitioning: false,
            session_id: String::new(),
            has_adblock: false,
            start_time: now_millis,
        }
    }

    pub fn is_started(&self) -> bool {
        self.current_page > 0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GameAction {
    StartGame { session_id: String, started_at: i64 },
    NextTask,
    NextPage,
    PreviousPage,
    SubmitAnswer(GameAnswer),
    CompleteTask,
    StartTransition,
    EndTransition,
    CompleteGame { score: String },
    ResetGame { now: i64 },
    SetAdblock(bool),
    LoadState(GameState),
}

impl GameAction {
    pub fn name(&self) -> &'static str {
        match self {
            GameAction::StartGame { .. } => "start_game",
            GameAction::NextTask => "next_task",
            GameAction::NextPage => "next_page",
            GameAction::PreviousPage => "previous_page",
            GameAction::SubmitAnswer(_) => "submit_answer",
            GameAction::CompleteTask => "complete_task",
            GameAction::StartTransition => "start_transition",
            GameAction::EndTransition => "end_transition",
            GameAction::CompleteGame { .. } => "complete_game",
            GameAction::ResetGame { .. } => "reset_game",
            GameAction::SetAdblock(_) => "set_adblock",
            GameAction::LoadState(_) => "load_state",
        }
    }
}
