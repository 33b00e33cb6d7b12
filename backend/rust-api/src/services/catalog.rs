use std::collections::HashSet;
use thiserror::Error;

use crate::games::{validate_payload, PayloadError};
use crate::models::task::{
    ArithmeticQuizData, ChoiceQuizData, GamePayload, GameTask, LetterAssemblyData, PairMatchData,
    RankingPuzzleData, TermPair,
};
use crate::models::GameState;

#[derive(Debug, Error, PartialEq)]
pub enum CatalogError {
    #[error("catalog has no tasks")]
    Empty,
    #[error("duplicate task id: {0}")]
    DuplicateId(String),
    #[error("task {0} has page 0; pages start at 1")]
    ZeroPage(String),
    #[error("page {0} has no tasks; pages must be contiguous from 1")]
    MissingPage(u32),
    #[error("task {id}: {source}")]
    InvalidPayload {
        id: String,
        #[source]
        source: PayloadError,
    },
}

/// Immutable, validated list of quiz tasks. Array order within a page is the
/// required completion order.
#[derive(Debug, Clone)]
pub struct TaskCatalog {
    tasks: Vec<GameTask>,
    total_pages: u32,
}

impl TaskCatalog {
    pub fn new(tasks: Vec<GameTask>) -> Result<Self, CatalogError> {
        if tasks.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut ids = HashSet::new();
        for task in &tasks {
            if !ids.insert(task.id.as_str()) {
                return Err(CatalogError::DuplicateId(task.id.clone()));
            }
            if task.page == 0 {
                return Err(CatalogError::ZeroPage(task.id.clone()));
            }
            validate_payload(&task.game).map_err(|source| CatalogError::InvalidPayload {
                id: task.id.clone(),
                source,
            })?;
        }

        let total_pages = tasks.iter().map(|task| task.page).max().unwrap_or(0);
        let pages: HashSet<u32> = tasks.iter().map(|task| task.page).collect();
        if let Some(missing) = (1..=total_pages).find(|page| !pages.contains(page)) {
            return Err(CatalogError::MissingPage(missing));
        }

        Ok(Self { tasks, total_pages })
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub fn tasks(&self) -> &[GameTask] {
        &self.tasks
    }

    pub fn page_tasks(&self, page: u32) -> Vec<&GameTask> {
        self.tasks.iter().filter(|task| task.page == page).collect()
    }

    pub fn task(&self, id: &str) -> Option<&GameTask> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn current_task(&self, state: &GameState) -> Option<&GameTask> {
        self.page_tasks(state.current_page)
            .get(state.current_task_index)
            .copied()
    }

    pub fn is_last_page(&self, page: u32) -> bool {
        page >= self.total_pages
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

fn pairs(values: &[(&str, &str)]) -> Vec<TermPair> {
    values
        .iter()
        .map(|(term, definition)| TermPair {
            term: term.to_string(),
            definition: definition.to_string(),
        })
        .collect()
}

fn task(id: &str, page: u32, title: &str, description: &str, game: GamePayload) -> GameTask {
    GameTask {
        id: id.to_string(),
        page,
        title: title.to_string(),
        description: description.to_string(),
        game,
    }
}

/// The built-in "Finance Games Challenge": three pages of four tasks.
pub fn finance_challenge() -> Vec<GameTask> {
    vec![
        task(
            "1-1",
            1,
            "Finance Knowledge",
            "Test your understanding of compound interest",
            GamePayload::ChoiceQuiz(ChoiceQuizData {
                question: "What is compound interest?".into(),
                options: strings(&[
                    "Interest calculated only on the principal amount",
                    "Interest calculated on principal and accumulated interest",
                    "A type of bank account",
                    "A loan payment method",
                ]),
                correct_answer: 1,
            }),
        ),
        task(
            "1-2",
            1,
            "Budget Puzzle",
            "Arrange the budget items in the correct order",
            GamePayload::RankingPuzzle(RankingPuzzleData {
                instruction: "Drag items to arrange them by financial priority".into(),
                items: strings(&["Emergency Fund", "Basic Needs", "Wants", "Investments"]),
                correct_order: vec![1, 0, 2, 3],
            }),
        ),
        task(
            "1-3",
            1,
            "Quick Math",
            "Calculate the compound interest",
            GamePayload::ArithmeticQuiz(ArithmeticQuizData {
                problem: "If you invest $1000 at 5% annual interest compounded yearly, what will \
                          it be worth after 2 years?"
                    .into(),
                options: strings(&["$1100", "$1102.50", "$1105", "$1050"]),
                correct_answer: 1,
                formula: Some("A = P(1 + r)^t".into()),
            }),
        ),
        task(
            "1-4",
            1,
            "Financial Terms Memory",
            "Match the financial terms with their definitions",
            GamePayload::PairMatch(PairMatchData {
                pairs: pairs(&[
                    ("APR", "Annual Percentage Rate"),
                    ("401k", "Retirement savings plan"),
                    ("ROI", "Return on Investment"),
                    ("ETF", "Exchange Traded Fund"),
                ]),
            }),
        ),
        task(
            "2-1",
            2,
            "Financial Word Game",
            "Find the financial term",
            GamePayload::LetterAssembly(LetterAssemblyData {
                letters: "DIVERSIFY".chars().collect(),
                target: "DIVERSIFY".into(),
                hint: Some("Spreading investments to reduce risk".into()),
            }),
        ),
        task(
            "2-2",
            2,
            "Credit Knowledge",
            "Understanding credit scores",
            GamePayload::ChoiceQuiz(ChoiceQuizData {
                question: "What is a good credit score range?".into(),
                options: strings(&["300-500", "500-650", "650-750", "750-850"]),
                correct_answer: 3,
            }),
        ),
        task(
            "2-3",
            2,
            "Investment Portfolio",
            "Build a balanced portfolio",
            // Target allocation 50/30/15/5, so the balanced order is by share.
            GamePayload::RankingPuzzle(RankingPuzzleData {
                instruction: "Allocate percentages to create a balanced portfolio".into(),
                items: strings(&["Stocks", "Bonds", "Real Estate", "Cash"]),
                correct_order: vec![0, 1, 2, 3],
            }),
        ),
        task(
            "2-4",
            2,
            "Savings Calculation",
            "Calculate monthly savings needed",
            GamePayload::ArithmeticQuiz(ArithmeticQuizData {
                problem: "To save $10,000 in 2 years with 3% annual interest, how much should \
                          you save monthly?"
                    .into(),
                options: strings(&["$400", "$410", "$420", "$430"]),
                correct_answer: 1,
                formula: None,
            }),
        ),
        task(
            "3-1",
            3,
            "Investment Types",
            "Match investments with their characteristics",
            GamePayload::PairMatch(PairMatchData {
                pairs: pairs(&[
                    ("Stocks", "High risk, high reward"),
                    ("Bonds", "Low risk, steady income"),
                    ("Mutual Funds", "Professionally managed"),
                    ("Index Funds", "Tracks market index"),
                ]),
            }),
        ),
        task(
            "3-2",
            3,
            "Budget Challenge",
            "Spell the budgeting rule",
            GamePayload::LetterAssembly(LetterAssemblyData {
                letters: "503020".chars().collect(),
                target: "503020".into(),
                hint: Some("Popular budgeting rule percentages".into()),
            }),
        ),
        task(
            "3-3",
            3,
            "Debt Payoff Strategy",
            "Order debts by payoff strategy",
            // Rates 18%, 22%, 6%, 4%: avalanche pays the highest rate first.
            GamePayload::RankingPuzzle(RankingPuzzleData {
                instruction: "Order debts by avalanche method (highest interest rate first)".into(),
                items: strings(&["Credit Card 1", "Credit Card 2", "Car Loan", "Student Loan"]),
                correct_order: vec![1, 0, 2, 3],
            }),
        ),
        task(
            "3-4",
            3,
            "Final Challenge",
            "Test your overall knowledge",
            GamePayload::ChoiceQuiz(ChoiceQuizData {
                question: "What is the most important factor in building wealth?".into(),
                options: strings(&[
                    "High income",
                    "Time and compound interest",
                    "Taking big risks",
                    "Avoiding all debt",
                ]),
                correct_answer: 1,
            }),
        ),
    ]
}
