use serde::{Deserialize, Serialize};

/// The five mini-game kinds a quiz task can be.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum GameType {
    ChoiceQuiz,
    RankingPuzzle,
    ArithmeticQuiz,
    PairMatch,
    LetterAssembly,
}

impl GameType {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameType::ChoiceQuiz => "choice-quiz",
            GameType::RankingPuzzle => "ranking-puzzle",
            GameType::ArithmeticQuiz => "arithmetic-quiz",
            GameType::PairMatch => "pair-match",
            GameType::LetterAssembly => "letter-assembly",
        }
    }
}

/// One mini-game instance belonging to a quiz page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GameTask {
    pub id: String,
    pub page: u32,
    pub title: String,
    pub description: String,
    pub game: GamePayload,
}

impl GameTask {
    pub fn game_type(&self) -> GameType {
        self.game.game_type()
    }
}

/// Type-specific task data, answer key included. Never sent to players as is;
/// see [`GamePrompt`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum GamePayload {
    ChoiceQuiz(ChoiceQuizData),
    RankingPuzzle(RankingPuzzleData),
    ArithmeticQuiz(ArithmeticQuizData),
    PairMatch(PairMatchData),
    LetterAssembly(LetterAssemblyData),
}

impl GamePayload {
    pub fn game_type(&self) -> GameType {
        match self {
            GamePayload::ChoiceQuiz(_) => GameType::ChoiceQuiz,
            GamePayload::RankingPuzzle(_) => GameType::RankingPuzzle,
            GamePayload::ArithmeticQuiz(_) => GameType::ArithmeticQuiz,
            GamePayload::PairMatch(_) => GameType::PairMatch,
            GamePayload::LetterAssembly(_) => GameType::LetterAssembly,
        }
    }

    /// Strips the answer key.
    pub fn prompt(&self) -> GamePrompt {
        match self {
            GamePayload::ChoiceQuiz(data) => GamePrompt::ChoiceQuiz {
                question: data.question.clone(),
                options: data.options.clone(),
            },
            GamePayload::RankingPuzzle(data) => GamePrompt::RankingPuzzle {
                instruction: data.instruction.clone(),
                items: data.items.clone(),
            },
            GamePayload::ArithmeticQuiz(data) => GamePrompt::ArithmeticQuiz {
                problem: data.problem.clone(),
                options: data.options.clone(),
                formula: data.formula.clone(),
            },
            GamePayload::PairMatch(data) => GamePrompt::PairMatch {
                terms: data.pairs.iter().map(|p| p.term.clone()).collect(),
                definitions: data.pairs.iter().map(|p| p.definition.clone()).collect(),
            },
            GamePayload::LetterAssembly(data) => GamePrompt::LetterAssembly {
                letters: data.letters.clone(),
                hint: data.hint.clone(),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceQuizData {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RankingPuzzleData {
    pub instruction: String,
    pub items: Vec<String>,
    /// Item indices in the expected order.
    pub correct_order: Vec<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ArithmeticQuizData {
    pub problem: String,
    pub options: Vec<String>,
    pub correct_answer: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formula: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TermPair {
    pub term: String,
    pub definition: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PairMatchData {
    pub pairs: Vec<TermPair>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LetterAssemblyData {
    pub letters: Vec<char>,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

/// What a player is shown for a task.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum GamePrompt {
    ChoiceQuiz {
        question: String,
        options: Vec<String>,
    },
    RankingPuzzle {
        instruction: String,
        items: Vec<String>,
    },
    ArithmeticQuiz {
        problem: String,
        options: Vec<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        formula: Option<String>,
    },
    PairMatch {
        terms: Vec<String>,
        definitions: Vec<String>,
    },
    LetterAssembly {
        letters: Vec<char>,
        #[serde(skip_serializing_if = "Option::is_none")]
        hint: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_is_tagged_by_game_type() {
        let payload = GamePayload::ChoiceQuiz(ChoiceQuizData {
            question: "Q?".into(),
            options: vec!["a".into(), "b".into()],
            correct_answer: 1,
        });
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["type"], "choice-quiz");
        assert_eq!(json["correctAnswer"], 1);
        assert_eq!(payload.game_type().as_str(), "choice-quiz");
    }

    #[test]
    fn prompt_hides_answer_key() {
        let payload = GamePayload::LetterAssembly(LetterAssemblyData {
            letters: vec!['C', 'A', 'T'],
            target: "CAT".into(),
            hint: None,
        });
        let json = serde_json::to_value(payload.prompt()).unwrap();
        assert_eq!(json["type"], "letter-assembly");
        assert!(json.get("target").is_none());
        assert_eq!(json["letters"][0], "C");
    }

    #[test]
    fn prompt_carries_instruction_and_hint() {
        let ranking = GamePayload::RankingPuzzle(RankingPuzzleData {
            instruction: "Arrange by priority".into(),
            items: vec!["Needs".into(), "Wants".into()],
            correct_order: vec![0, 1],
        });
        let json = serde_json::to_value(ranking.prompt()).unwrap();
        assert_eq!(json["instruction"], "Arrange by priority");
        assert!(json.get("correctOrder").is_none());

        let letters = GamePayload::LetterAssembly(LetterAssemblyData {
            letters: vec!['C', 'A', 'T'],
            target: "CAT".into(),
            hint: Some("Pet".into()),
        });
        assert_eq!(
            letters.prompt(),
            GamePrompt::LetterAssembly {
                letters: vec!['C', 'A', 'T'],
                hint: Some("Pet".into()),
            }
        );
    }
}
