use std::collections::HashMap;

use crate::models::task::LetterAssemblyData;
use crate::models::TaskAnswer;

use super::{PayloadError, SubmissionError};

pub(super) fn validate(data: &LetterAssemblyData) -> Result<(), PayloadError> {
    if data.target.is_empty() {
        return Err(PayloadError::EmptyTarget);
    }
    let mut available: HashMap<char, usize> = HashMap::new();
    for letter in &data.letters {
        *available.entry(*letter).or_default() += 1;
    }
    for letter in data.target.chars() {
        match available.get_mut(&letter) {
            Some(count) if *count > 0 => *count -= 1,
            _ => return Err(PayloadError::TargetNotAssemblable(data.target.clone())),
        }
    }
    Ok(())
}

/// Word built by clicking letter tiles; each tile is usable once.
#[derive(Debug, Clone)]
pub struct LetterAssembly {
    data: LetterAssemblyData,
    selected: Vec<usize>,
    disabled: bool,
}

impl LetterAssembly {
    pub fn new(data: LetterAssemblyData) -> Self {
        Self {
            data,
            selected: Vec::new(),
            disabled: false,
        }
    }

    pub fn click(&mut self, index: usize) -> Result<(), SubmissionError> {
        if self.disabled {
            return Err(SubmissionError::Disabled);
        }
        if index >= self.data.letters.len() {
            return Err(SubmissionError::LetterOutOfRange {
                index,
                len: self.data.letters.len(),
            });
        }
        if self.selected.contains(&index) {
            return Err(SubmissionError::LetterReused(index));
        }
        self.selected.push(index);
        Ok(())
    }

    pub fn reset(&mut self) -> Result<(), SubmissionError> {
        if self.disabled {
            return Err(SubmissionError::Disabled);
        }
        self.selected.clear();
        Ok(())
    }

    pub fn word(&self) -> String {
        self.selected
            .iter()
            .map(|&index| self.data.letters[index])
            .collect()
    }

    /// `None` while the word is empty.
    pub fn submit(&self) -> Option<TaskAnswer> {
        if self.disabled || self.selected.is_empty() {
            return None;
        }
        let word = self.word();
        let is_correct = word == self.data.target;
        Some(TaskAnswer::Word { word, is_correct })
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

    fn cat() -> LetterAssembly {
        LetterAssembly::new(LetterAssemblyData {
            letters: vec!['T', 'A', 'C'],
            target: "CAT".into(),
            hint: Some("Pet".into()),
        })
    }

    #[test]
    fn clicks_build_the_word() {
        let mut game = cat();
        assert!(game.submit().is_none());
        for index in [2, 1, 0] {
            game.click(index).unwrap();
        }
        assert_eq!(
            game.submit(),
            Some(TaskAnswer::Word {
                word: "CAT".into(),
                is_correct: true
            })
        );
    }

    #[test]
    fn tiles_cannot_be_reused_until_reset() {
        let mut game = cat();
        game.click(0).unwrap();
        assert_eq!(game.click(0), Err(SubmissionError::LetterReused(0)));
        game.reset().unwrap();
        assert_eq!(game.word(), "");
        game.click(0).unwrap();
        assert_eq!(game.word(), "T");
    }

    #[test]
    fn repeated_letters_count_toward_assembly() {
        let data = LetterAssemblyData {
            letters: "503020".chars().collect(),
            target: "503020".into(),
            hint: None,
        };
        assert!(validate(&data).is_ok());

        let data = LetterAssemblyData {
            letters: vec!['C', 'A'],
            target: "CAT".into(),
            hint: None,
        };
        assert_eq!(
            validate(&data),
            Err(PayloadError::TargetNotAssemblable("CAT".into()))
        );
    }
}
