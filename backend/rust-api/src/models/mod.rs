pub mod answer;
pub mod content;
pub mod game_state;
pub mod gating;
pub mod portfolio;
pub mod quiz;
pub mod task;

pub use answer::{
    GameAnswer, PageAnswer, PageAnswers, SubmitAnswerResponse, Submission, TaskAnswer,
    TaskStatusView,
};
pub use game_state::{GameAction, GameState};
pub use gating::{GatingEvent, IgnoreReason, TaskGateStatus};
pub use quiz::{NavigationNotice, NavigationOutcome, PageView, Route, ScoreView, TaskView};
pub use task::{GamePayload, GamePrompt, GameTask, GameType};
