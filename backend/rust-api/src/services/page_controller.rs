use std::cmp::Ordering;
use thiserror::Error;

use crate::models::{GameAction, GameState, NavigationNotice, NavigationOutcome, PageAnswers, Route, ScoreView};

use super::catalog::TaskCatalog;
use super::game_machine::generate_score;

pub const NOTICE_START_FIRST: &str = "Please start the game from the beginning";
pub const NOTICE_IN_ORDER: &str = "Please complete the game in order";
pub const NOTICE_FINISH_TASKS: &str = "Please complete all tasks before proceeding";
pub const NOTICE_FINISH_CHALLENGE: &str = "Please complete the challenge first";

#[derive(Debug, Error, Clone, PartialEq)]
pub enum NavigationError {
    #[error("Game page {0} not found")]
    PageNotFound(u32),
    #[error("{}", .0.message)]
    Redirect(NavigationNotice),
    #[error("Page {requested} is not the current page ({current})")]
    NotOnPage { requested: u32, current: u32 },
    #[error("{NOTICE_FINISH_TASKS}")]
    IncompletePage { page: u32 },
}

/// State transitions to apply plus where the player ends up.
#[derive(Debug, Clone, PartialEq)]
pub struct Navigation {
    pub actions: Vec<GameAction>,
    pub outcome: NavigationOutcome,
}

impl Navigation {
    fn to(route: Route, actions: Vec<GameAction>) -> Self {
        Self {
            actions,
            outcome: NavigationOutcome { route, score: None },
        }
    }
}

/// Moves the page pointer one step at a time towards `target`.
fn walk_to(state: &GameState, target: u32) -> Vec<GameAction> {
    let current = state.current_page;
    match target.cmp(&current) {
        Ordering::Greater => vec![GameAction::NextPage; (target - current) as usize],
        Ordering::Less => vec![GameAction::PreviousPage; (current - target) as usize],
        Ordering::Equal => Vec::new(),
    }
}

/// Checks a request for `/quiz/{target}`.
pub fn enter_page(
    state: &GameState,
    target: u32,
    catalog: &TaskCatalog,
) -> Result<Navigation, NavigationError> {
    if target == 0 || target > catalog.total_pages() {
        return Err(NavigationError::PageNotFound(target));
    }
    if !state.is_started() {
        return Err(NavigationError::Redirect(NavigationNotice::new(
            Route::Home,
            NOTICE_START_FIRST,
        )));
    }
    if target > state.current_page + 1 {
        return Err(NavigationError::Redirect(NavigationNotice::new(
            Route::Quiz(state.current_page),
            NOTICE_IN_ORDER,
        )));
    }
    Ok(Navigation::to(Route::Quiz(target), walk_to(state, target)))
}

/// "Next" on a page whose gate has reported every task complete.
pub fn complete_page(
    state: &GameState,
    page: u32,
    completed: &PageAnswers,
    catalog: &TaskCatalog,
) -> Result<Navigation, NavigationError> {
    if page != state.current_page {
        return Err(NavigationError::NotOnPage {
            requested: page,
            current: state.current_page,
        });
    }
    let tasks = catalog.page_tasks(page);
    if tasks.is_empty() {
        return Err(NavigationError::PageNotFound(page));
    }
    if !tasks.iter().all(|task| completed.contains(&task.id)) {
        return Err(NavigationError::IncompletePage { page });
    }

    if catalog.is_last_page(page) {
        let score = generate_score();
        Ok(Navigation {
            actions: vec![GameAction::CompleteGame {
                score: score.clone(),
            }],
            outcome: NavigationOutcome {
                route: Route::Score,
                score: Some(score),
            },
        })
    } else {
        Ok(Navigation::to(
            Route::Quiz(page + 1),
            vec![GameAction::NextPage],
        ))
    }
}

/// "Back" from `page`. Earlier pages are not re-validated.
pub fn go_back(state: &GameState, page: u32) -> Navigation {
    if page > 1 && state.is_started() {
        let target = page - 1;
        Navigation::to(Route::Quiz(target), walk_to(state, target))
    } else {
        Navigation::to(Route::Home, Vec::new())
    }
}

pub fn score_view(
    state: &GameState,
    now_millis: i64,
    site_origin: &str,
) -> Result<ScoreView, NavigationError> {
    let score = match (&state.score, state.is_completed) {
        (Some(score), true) => score.clone(),
        _ => {
            return Err(NavigationError::Redirect(NavigationNotice::new(
                Route::Home,
                NOTICE_FINISH_CHALLENGE,
            )))
        }
    };

    let minutes_taken = if state.start_time > 0 {
        (now_millis - state.start_time).max(0) / 60_000
    } else {
        0
    };

    Ok(ScoreView {
        share_text: format!(
            "I just scored {} on the Finance Challenge! Test your financial knowledge: {}",
            score, site_origin
        ),
        score,
        session_id: state.session_id.clone(),
        minutes_taken,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PageAnswer, TaskAnswer};
    use crate::services::catalog::finance_challenge;
    use crate::services::game_machine::{reduce, SCORE_POOL};

    fn catalog() -> TaskCatalog {
        TaskCatalog::new(finance_challenge()).unwrap()
    }

    fn on_page(page: u32) -> GameState {
        let mut state = reduce(
            &GameState::initial(0),
            GameAction::StartGame {
                session_id: "s".into(),
                started_at: 1_000,
            },
        );
        state.current_page = page;
        state
    }

    fn all_answered(page: u32) -> PageAnswers {
        PageAnswers(
            catalog()
                .page_tasks(page)
                .iter()
                .map(|task| PageAnswer {
                    task_id: task.id.clone(),
                    answer: TaskAnswer::Choice {
                        selected_option: 0,
                        is_correct: false,
                    },
                })
                .collect(),
        )
    }

    #[test]
    fn unstarted_game_redirects_home() {
        let state = GameState::initial(0);
        let err = enter_page(&state, 3, &catalog()).unwrap_err();
        assert_eq!(
            err,
            NavigationError::Redirect(NavigationNotice::new(Route::Home, NOTICE_START_FIRST))
        );
    }

    #[test]
    fn skipping_ahead_redirects_to_current_page() {
        let err = enter_page(&on_page(1), 3, &catalog()).unwrap_err();
        assert_eq!(
            err,
            NavigationError::Redirect(NavigationNotice::new(Route::Quiz(1), NOTICE_IN_ORDER))
        );
    }

    #[test]
    fn unknown_pages_are_not_found() {
        assert_eq!(
            enter_page(&on_page(1), 0, &catalog()).unwrap_err(),
            NavigationError::PageNotFound(0)
        );
        assert_eq!(
            enter_page(&on_page(3), 4, &catalog()).unwrap_err(),
            NavigationError::PageNotFound(4)
        );
    }

    #[test]
    fn entering_moves_the_pointer() {
        let nav = enter_page(&on_page(1), 2, &catalog()).unwrap();
        assert_eq!(nav.actions, vec![GameAction::NextPage]);
        assert_eq!(nav.outcome.route, Route::Quiz(2));

        let nav = enter_page(&on_page(3), 1, &catalog()).unwrap();
        assert_eq!(nav.actions, vec![GameAction::PreviousPage, GameAction::PreviousPage]);

        assert!(enter_page(&on_page(2), 2, &catalog()).unwrap().actions.is_empty());
    }

    #[test]
    fn completion_requires_every_task() {
        let mut partial = all_answered(1);
        partial.0.pop();
        assert_eq!(
            complete_page(&on_page(1), 1, &partial, &catalog()).unwrap_err(),
            NavigationError::IncompletePage { page: 1 }
        );

        let nav = complete_page(&on_page(1), 1, &all_answered(1), &catalog()).unwrap();
        assert_eq!(nav.actions, vec![GameAction::NextPage]);
        assert_eq!(nav.outcome.route, Route::Quiz(2));
    }

    #[test]
    fn last_page_issues_a_score() {
        let nav = complete_page(&on_page(3), 3, &all_answered(3), &catalog()).unwrap();
        assert_eq!(nav.outcome.route, Route::Score);
        let score = nav.outcome.score.unwrap();
        assert!(SCORE_POOL.contains(&score.as_str()));
        assert_eq!(nav.actions, vec![GameAction::CompleteGame { score }]);
    }

    #[test]
    fn completing_another_page_is_refused() {
        assert_eq!(
            complete_page(&on_page(2), 1, &all_answered(1), &catalog()).unwrap_err(),
            NavigationError::NotOnPage {
                requested: 1,
                current: 2
            }
        );
    }

    #[test]
    fn back_goes_to_previous_page_or_home() {
        let nav = go_back(&on_page(2), 2);
        assert_eq!(nav.outcome.route, Route::Quiz(1));
        assert_eq!(nav.actions, vec![GameAction::PreviousPage]);

        let nav = go_back(&on_page(1), 1);
        assert_eq!(nav.outcome.route, Route::Home);
        assert!(nav.actions.is_empty());
    }

    #[test]
    fn score_view_requires_completion() {
        let state = on_page(3);
        assert_eq!(
            score_view(&state, 0, "http://localhost").unwrap_err(),
            NavigationError::Redirect(NavigationNotice::new(Route::Home, NOTICE_FINISH_CHALLENGE))
        );

        let state = reduce(&state, GameAction::CompleteGame { score: "847293".into() });
        let view = score_view(&state, 1_000 + 5 * 60_000 + 59_999, "https://example.com").unwrap();
        assert_eq!(view.score, "847293");
        assert_eq!(view.minutes_taken, 5);
        assert!(view.share_text.contains("847293"));
        assert!(view.share_text.ends_with("https://example.com"));
    }
}
