use std::collections::{BTreeMap, HashSet};

use crate::models::task::PairMatchData;
use crate::models::TaskAnswer;

use super::{PayloadError, SubmissionError};

pub(super) fn validate(data: &PairMatchData) -> Result<(), PayloadError> {
    if data.pairs.is_empty() {
        return Err(PayloadError::NoPairs);
    }
    let mut terms = HashSet::new();
    let mut definitions = HashSet::new();
    for pair in &data.pairs {
        if !terms.insert(pair.term.as_str()) {
            return Err(PayloadError::DuplicateTerm(pair.term.clone()));
        }
        if !definitions.insert(pair.definition.as_str()) {
            return Err(PayloadError::DuplicateDefinition(pair.definition.clone()));
        }
    }
    Ok(())
}

/// Term/definition matching: pick a term, then the definition it goes with.
#[derive(Debug, Clone)]
pub struct PairMatch {
    data: PairMatchData,
    matches: BTreeMap<String, String>,
    selected_term: Option<String>,
    disabled: bool,
}

impl PairMatch {
    pub fn new(data: PairMatchData) -> Self {
        Self {
            data,
            matches: BTreeMap::new(),
            selected_term: None,
            disabled: false,
        }
    }

    pub fn select_term(&mut self, term: &str) -> Result<(), SubmissionError> {
        if self.disabled {
            return Err(SubmissionError::Disabled);
        }
        if !self.data.pairs.iter().any(|pair| pair.term == term) {
            return Err(SubmissionError::UnknownTerm(term.to_string()));
        }
        if self.matches.contains_key(term) {
            return Err(SubmissionError::TermAlreadyMatched(term.to_string()));
        }
        self.selected_term = Some(term.to_string());
        Ok(())
    }

    pub fn select_definition(&mut self, definition: &str) -> Result<(), SubmissionError> {
        if self.disabled {
            return Err(SubmissionError::Disabled);
        }
        if !self.data.pairs.iter().any(|pair| pair.definition == definition) {
            return Err(SubmissionError::UnknownDefinition(definition.to_string()));
        }
        if self.matches.values().any(|used| used == definition) {
            return Err(SubmissionError::DefinitionReused(definition.to_string()));
        }
        let term = self
            .selected_term
            .take()
            .ok_or(SubmissionError::NoTermSelected)?;
        self.matches.insert(term, definition.to_string());
        Ok(())
    }

    pub fn all_matched(&self) -> bool {
        self.matches.len() == self.data.pairs.len()
    }

    /// `None` until every term has a definition.
    pub fn submit(&self) -> Option<TaskAnswer> {
        if self.disabled || !self.all_matched() {
            return None;
        }
        let is_correct = self
            .data
            .pairs
            .iter()
            .all(|pair| self.matches.get(&pair.term) == Some(&pair.definition));
        Some(TaskAnswer::Matches {
            matches: self.matches.clone(),
            is_correct,
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
    use crate::models::task::TermPair;

    fn game() -> PairMatch {
        PairMatch::new(PairMatchData {
            pairs: vec![
                TermPair {
                    term: "Stocks".into(),
                    definition: "High risk, high reward".into(),
                },
                TermPair {
                    term: "Bonds".into(),
                    definition: "Low risk, steady income".into(),
                },
            ],
        })
    }

    #[test]
    fn swapped_definitions_are_incorrect() {
        let mut game = game();
        game.select_term("Stocks").unwrap();
        game.select_definition("Low risk, steady income").unwrap();
        assert!(game.submit().is_none());

        game.select_term("Bonds").unwrap();
        game.select_definition("High risk, high reward").unwrap();
        assert!(!game.submit().unwrap().is_correct());
    }

    #[test]
    fn definition_needs_a_selected_term() {
        let mut game = game();
        assert_eq!(
            game.select_definition("High risk, high reward"),
            Err(SubmissionError::NoTermSelected)
        );
    }

    #[test]
    fn matched_term_and_used_definition_are_locked() {
        let mut game = game();
        game.select_term("Stocks").unwrap();
        game.select_definition("High risk, high reward").unwrap();

        assert_eq!(
            game.select_term("Stocks"),
            Err(SubmissionError::TermAlreadyMatched("Stocks".into()))
        );
        game.select_term("Bonds").unwrap();
        assert_eq!(
            game.select_definition("High risk, high reward"),
            Err(SubmissionError::DefinitionReused("High risk, high reward".into()))
        );
    }

    #[test]
    fn duplicate_terms_fail_validation() {
        let data = PairMatchData {
            pairs: vec![
                TermPair {
                    term: "APR".into(),
                    definition: "a".into(),
                },
                TermPair {
                    term: "APR".into(),
                    definition: "b".into(),
                },
            ],
        };
        assert_eq!(validate(&data), Err(PayloadError::DuplicateTerm("APR".into())));
    }
}
