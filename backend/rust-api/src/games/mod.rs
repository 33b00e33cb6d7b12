//! Mini-game widgets.
//!
//! Each widget owns the ephemeral selection state for one task and computes
//! the correctness of the finished selection against the answer key carried in
//! the task payload. Widgets never touch the game state; the quiz service
//! replays a client [`Submission`] through [`GameWidget::play`] and forwards
//! the resulting [`TaskAnswer`] to the gate.

mod arithmetic;
mod choice;
mod letters;
mod pair_match;
mod ranking;

pub use arithmetic::ArithmeticQuiz;
pub use choice::{ChoiceQuiz, OptionSelection};
pub use letters::LetterAssembly;
pub use pair_match::PairMatch;
pub use ranking::RankingPuzzle;

use thiserror::Error;

use crate::models::task::{GamePayload, GameTask, GameType};
use crate::models::{Submission, TaskAnswer};

/// A task payload that cannot be played.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PayloadError {
    #[error("no options to choose from")]
    NoOptions,
    #[error("answer index {index} is out of range for {len} options")]
    AnswerOutOfRange { index: usize, len: usize },
    #[error("no items to rank")]
    NoItems,
    #[error("correct order is not a permutation of the item indices")]
    OrderNotPermutation,
    #[error("no pairs to match")]
    NoPairs,
    #[error("duplicate term: {0}")]
    DuplicateTerm(String),
    #[error("duplicate definition: {0}")]
    DuplicateDefinition(String),
    #[error("target word is empty")]
    EmptyTarget,
    #[error("target {0} cannot be assembled from the given letters")]
    TargetNotAssemblable(String),
}

/// A selection that a widget refuses.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SubmissionError {
    #[error("widget is disabled")]
    Disabled,
    #[error("expected a {expected} submission, got {got}")]
    TypeMismatch { expected: &'static str, got: &'static str },
    #[error("option {index} is out of range for {len} options")]
    OptionOutOfRange { index: usize, len: usize },
    #[error("order must be a permutation of 0..{len}")]
    InvalidOrder { len: usize },
    #[error("unknown term: {0}")]
    UnknownTerm(String),
    #[error("unknown definition: {0}")]
    UnknownDefinition(String),
    #[error("term already matched: {0}")]
    TermAlreadyMatched(String),
    #[error("definition already used: {0}")]
    DefinitionReused(String),
    #[error("no term selected")]
    NoTermSelected,
    #[error("letter {index} is out of range for {len} letters")]
    LetterOutOfRange { index: usize, len: usize },
    #[error("letter {0} already used")]
    LetterReused(usize),
    #[error("selection is incomplete")]
    Incomplete,
}

/// Checks a payload is playable.
pub fn validate_payload(payload: &GamePayload) -> Result<(), PayloadError> {
    match payload {
        GamePayload::ChoiceQuiz(data) => choice::validate(&data.options, data.correct_answer),
        GamePayload::ArithmeticQuiz(data) => choice::validate(&data.options, data.correct_answer),
        GamePayload::RankingPuzzle(data) => ranking::validate(data),
        GamePayload::PairMatch(data) => pair_match::validate(data),
        GamePayload::LetterAssembly(data) => letters::validate(data),
    }
}

/// Widget for any task, chosen by its payload type.
#[derive(Debug, Clone)]
pub enum GameWidget {
    ChoiceQuiz(ChoiceQuiz),
    RankingPuzzle(RankingPuzzle),
    ArithmeticQuiz(ArithmeticQuiz),
    PairMatch(PairMatch),
    LetterAssembly(LetterAssembly),
}

impl GameWidget {
    pub fn for_task(task: &GameTask) -> Self {
        match &task.game {
            GamePayload::ChoiceQuiz(data) => GameWidget::ChoiceQuiz(ChoiceQuiz::new(data.clone())),
            GamePayload::RankingPuzzle(data) => {
                GameWidget::RankingPuzzle(RankingPuzzle::new(data.clone()))
            }
            GamePayload::ArithmeticQuiz(data) => {
                GameWidget::ArithmeticQuiz(ArithmeticQuiz::new(data.clone()))
            }
            GamePayload::PairMatch(data) => GameWidget::PairMatch(PairMatch::new(data.clone())),
            GamePayload::LetterAssembly(data) => {
                GameWidget::LetterAssembly(LetterAssembly::new(data.clone()))
            }
        }
    }

    pub fn game_type(&self) -> GameType {
        match self {
            GameWidget::ChoiceQuiz(_) => GameType::ChoiceQuiz,
            GameWidget::RankingPuzzle(_) => GameType::RankingPuzzle,
            GameWidget::ArithmeticQuiz(_) => GameType::ArithmeticQuiz,
            GameWidget::PairMatch(_) => GameType::PairMatch,
            GameWidget::LetterAssembly(_) => GameType::LetterAssembly,
        }
    }

    pub fn is_disabled(&self) -> bool {
        match self {
            GameWidget::ChoiceQuiz(widget) => widget.is_disabled(),
            GameWidget::RankingPuzzle(widget) => widget.is_disabled(),
            GameWidget::ArithmeticQuiz(widget) => widget.is_disabled(),
            GameWidget::PairMatch(widget) => widget.is_disabled(),
            GameWidget::LetterAssembly(widget) => widget.is_disabled(),
        }
    }

    pub fn set_disabled(&mut self, disabled: bool) {
        match self {
            GameWidget::ChoiceQuiz(widget) => widget.set_disabled(disabled),
            GameWidget::RankingPuzzle(widget) => widget.set_disabled(disabled),
            GameWidget::ArithmeticQuiz(widget) => widget.set_disabled(disabled),
            GameWidget::PairMatch(widget) => widget.set_disabled(disabled),
            GameWidget::LetterAssembly(widget) => widget.set_disabled(disabled),
        }
    }

    /// Replays a full client selection and submits it.
    pub fn play(&mut self, submission: Submission) -> Result<TaskAnswer, SubmissionError> {
        if self.is_disabled() {
            return Err(SubmissionError::Disabled);
        }

        let expected = self.game_type();
        let got = submission.game_type();

        match (self, submission) {
            (GameWidget::ChoiceQuiz(widget), Submission::ChoiceQuiz { selected_option }) => {
                widget.select(selected_option)?;
                widget.submit().ok_or(SubmissionError::Incomplete)
            }
            (GameWidget::ArithmeticQuiz(widget), Submission::ArithmeticQuiz { selected_option }) => {
                widget.select(selected_option)?;
                widget.submit().ok_or(SubmissionError::Incomplete)
            }
            (GameWidget::RankingPuzzle(widget), Submission::RankingPuzzle { order }) => {
                widget.arrange(order)?;
                widget.submit().ok_or(SubmissionError::Incomplete)
            }
            (GameWidget::PairMatch(widget), Submission::PairMatch { matches }) => {
                for (term, definition) in matches {
                    widget.select_term(&term)?;
                    widget.select_definition(&definition)?;
                }
                widget.submit().ok_or(SubmissionError::Incomplete)
            }
            (GameWidget::LetterAssembly(widget), Submission::LetterAssembly { letters }) => {
                widget.reset()?;
                for index in letters {
                    widget.click(index)?;
                }
                widget.submit().ok_or(SubmissionError::Incomplete)
            }
            _ => Err(SubmissionError::TypeMismatch {
                expected: expected.as_str(),
                got: got.as_str(),
            }),
        }
    }
}
