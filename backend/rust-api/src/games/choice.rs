use crate::models::task::ChoiceQuizData;
use crate::models::TaskAnswer;

use super::{PayloadError, SubmissionError};

pub(super) fn validate(options: &[String], correct_answer: usize) -> Result<(), PayloadError> {
    if options.is_empty() {
        return Err(PayloadError::NoOptions);
    }
    if correct_answer >= options.len() {
        return Err(PayloadError::AnswerOutOfRange {
            index: correct_answer,
            len: options.len(),
        });
    }
    Ok(())
}

/// Single-option pick shared by the choice and arithmetic quizzes.
#[derive(Debug, Clone, Default)]
pub struct OptionSelection {
    selected: Option<usize>,
    disabled: bool,
}

impl OptionSelection {
    pub fn select(&mut self, index: usize, option_count: usize) -> Result<(), SubmissionError> {
        if self.disabled {
            return Err(SubmissionError::Disabled);
        }
        if index >= option_count {
            return Err(SubmissionError::OptionOutOfRange {
                index,
                len: option_count,
            });
        }
        self.selected = Some(index);
        Ok(())
    }

    pub fn answer(&self, correct_answer: usize) -> Option<TaskAnswer> {
        if self.disabled {
            return None;
        }
        self.selected.map(|selected_option| TaskAnswer::Choice {
            selected_option,
            is_correct: selected_option == correct_answer,
        })
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }
}

#[derive(Debug, Clone)]
pub struct ChoiceQuiz {
    data: ChoiceQuizData,
    selection: OptionSelection,
}

impl ChoiceQuiz {
    pub fn new(data: ChoiceQuizData) -> Self {
        Self {
            data,
            selection: OptionSelection::default(),
        }
    }

    pub fn select(&mut self, index: usize) -> Result<(), SubmissionError> {
        self.selection.select(index, self.data.options.len())
    }

    /// `None` until an option is picked.
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

#[cfg(test)]
mod tests {
    use super::*;

    fn quiz() -> ChoiceQuiz {
        ChoiceQuiz::new(ChoiceQuizData {
            question: "What is a good credit score range?".into(),
            options: vec!["300-500".into(), "500-650".into(), "650-750".into(), "750-850".into()],
            correct_answer: 3,
        })
    }

    #[test]
    fn nothing_to_submit_without_selection() {
        assert!(quiz().submit().is_none());
    }

    #[test]
    fn last_selection_wins() {
        let mut quiz = quiz();
        quiz.select(0).unwrap();
        quiz.select(3).unwrap();
        assert_eq!(
            quiz.submit(),
            Some(TaskAnswer::Choice {
                selected_option: 3,
                is_correct: true
            })
        );
    }

    #[test]
    fn out_of_range_option_is_refused() {
        let mut quiz = quiz();
        assert_eq!(
            quiz.select(4),
            Err(SubmissionError::OptionOutOfRange { index: 4, len: 4 })
        );
        assert!(quiz.submit().is_none());
    }

    #[test]
    fn payload_validation() {
        assert_eq!(validate(&[], 0), Err(PayloadError::NoOptions));
        assert_eq!(
            validate(&["a".into()], 1),
            Err(PayloadError::AnswerOutOfRange { index: 1, len: 1 })
        );
        assert!(validate(&["a".into(), "b".into()], 1).is_ok());
    }
}
