use crate::models::task::ArithmeticQuizData;
use crate::models::TaskAnswer;

use super::{OptionSelection, SubmissionError};

#[derive(Debug, Clone)]
pub struct ArithmeticQuiz {
    data: ArithmeticQuizData,
    selection: OptionSelection,
}

impl ArithmeticQuiz {
    pub fn new(data: ArithmeticQuizData) -> Self {
        Self {
            data,
            selection: OptionSelection::default(),
        }
    }

    pub fn select(&mut self, index: usize) -> Result<(), SubmissionError> {
        self.selection.select(index, self.data.options.len())
    }

    pub fn submit(&self) -> Option<TaskAnswer> {
        self.selection.answer(self.data.correct_answer)
    }

    pub fn is_disabled(&self) -> bool {
        self.selection.is_disabled()
    }

    pub fn set_disabled(&mut self, disabled: bool) {
        self.selection.set_disabled(disabled);
    }
}
