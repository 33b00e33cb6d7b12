use crate::models::task::RankingPuzzleData;
use crate::models::TaskAnswer;

use super::{PayloadError, SubmissionError};

fn is_permutation(order: &[usize], len: usize) -> bool {
    if order.len() != len {
        return false;
    }
    let mut seen = vec![false; len];
    order.iter().all(|&index| {
        index < len && !std::mem::replace(&mut seen[index], true)
    })
}

pub(super) fn validate(data: &RankingPuzzleData) -> Result<(), PayloadError> {
    if data.items.is_empty() {
        return Err(PayloadError::NoItems);
    }
    if !is_permutation(&data.correct_order, data.items.len()) {
        return Err(PayloadError::OrderNotPermutation);
    }
    Ok(())
}

/// Ordering puzzle. Starts in item order; the player moves items around.
#[derive(Debug, Clone)]
pub struct RankingPuzzle {
    data: RankingPuzzleData,
    order: Vec<usize>,
    disabled: bool,
}

impl RankingPuzzle {
    pub fn new(data: RankingPuzzleData) -> Self {
        let order = (0..data.items.len()).collect();
        Self {
            data,
            order,
            disabled: false,
        }
    }

    /// Replaces the whole arrangement.
    pub fn arrange(&mut self, order: Vec<usize>) -> Result<(), SubmissionError> {
        if self.disabled {
            return Err(SubmissionError::Disabled);
        }
        if !is_permutation(&order, self.data.items.len()) {
            return Err(SubmissionError::InvalidOrder {
                len: self.data.items.len(),
            });
        }
        self.order = order;
        Ok(())
    }

    /// Always complete: an arrangement exists from the start.
    pub fn submit(&self) -> Option<TaskAnswer> {
        if self.disabled {
            return None;
        }
        Some(TaskAnswer::Ranking {
            order: self.order.clone(),
            is_correct: self.order == self.data.correct_order,
        })
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn budget() -> RankingPuzzle {
        RankingPuzzle::new(RankingPuzzleData {
            instruction: "Arrange by priority".into(),
            items: vec![
                "Emergency Fund".into(),
                "Basic Needs".into(),
                "Wants".into(),
                "Investments".into(),
            ],
            correct_order: vec![1, 0, 2, 3],
        })
    }

    #[test]
    fn arranging_reaches_correct_order() {
        let mut puzzle = budget();
        assert!(!puzzle.submit().unwrap().is_correct());

        puzzle.arrange(vec![1, 0, 2, 3]).unwrap();
        assert_eq!(
            puzzle.submit(),
            Some(TaskAnswer::Ranking {
                order: vec![1, 0, 2, 3],
                is_correct: true
            })
        );

        puzzle.set_disabled(true);
        assert_eq!(puzzle.arrange(vec![0, 1, 2, 3]), Err(SubmissionError::Disabled));
        assert_eq!(puzzle.submit(), None);
    }

    #[test]
    fn arrange_requires_permutation() {
        let mut puzzle = budget();
        assert_eq!(
            puzzle.arrange(vec![0, 0, 1, 2]),
            Err(SubmissionError::InvalidOrder { len: 4 })
        );
        assert_eq!(
            puzzle.arrange(vec![0, 1, 2]),
            Err(SubmissionError::InvalidOrder { len: 4 })
        );
        assert_eq!(
            puzzle.submit().map(|answer| answer.is_correct()),
            Some(false)
        );
    }

    #[test]
    fn payload_order_must_cover_items() {
        let data = RankingPuzzleData {
            instruction: String::new(),
            items: vec!["a".into(), "b".into()],
            correct_order: vec![1, 2],
        };
        assert_eq!(validate(&data), Err(PayloadError::OrderNotPermutation));
    }
}
