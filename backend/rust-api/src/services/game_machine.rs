use rand::seq::IndexedRandom;
use rand::Rng;
use std::sync::Arc;

use crate::metrics::{QUIZ_STATE_LOAD_FAILURES_TOTAL, QUIZ_STATE_PERSIST_FAILURES_TOTAL};
use crate::models::{GameAction, GameState};

use super::blob_store::BlobStore;

/// Scores handed out on completion. Not derived from answer correctness.
pub const SCORE_POOL: [&str; 12] = [
    "847293", "692847", "731856", "594827", "682739", "873492", "756284", "629847", "814736",
    "537289", "746821", "695873",
];

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const SESSION_SUFFIX_LEN: usize = 11;

pub fn storage_key(client_id: &str) -> String {
    format!("gameState:{}", client_id)
}

pub fn generate_score() -> String {
    SCORE_POOL
        .choose(&mut rand::rng())
        .copied()
        .unwrap_or(SCORE_POOL[0])
        .to_string()
}

fn to_base36(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while value > 0 {
        digits.push(BASE36[(value % 36) as usize]);
        value /= 36;
    }
    digits.reverse();
    String::from_utf8_lossy(&digits).into_owned()
}

/// Millisecond timestamp in base 36 followed by a random base-36 suffix.
/// Unique enough for a single player; not a secret.
pub fn generate_session_id(now_millis: i64) -> String {
    let mut rng = rand::rng();
    let suffix: String = (0..SESSION_SUFFIX_LEN)
        .map(|_| BASE36[rng.random_range(0..BASE36.len())] as char)
        .collect();
    format!("{}{}", to_base36(now_millis.max(0) as u64), suffix)
}

/// Pure transition function. Never fails.
pub fn reduce(state: &GameState, action: GameAction) -> GameState {
    match action {
        GameAction::StartGame {
            session_id,
            started_at,
        } => GameState {
            current_page: 1,
            current_task_index: 0,
            session_id,
            has_adblock: state.has_adblock,
            ..GameState::initial(started_at)
        },
        GameAction::NextTask => GameState {
            current_task_index: state.current_task_index + 1,
            is_task_completed: false,
            is_transitioning: false,
            ..state.clone()
        },
        GameAction::NextPage => GameState {
            current_page: state.current_page + 1,
            current_task_index: 0,
            is_task_completed: false,
            is_transitioning: false,
            ..state.clone()
        },
        GameAction::PreviousPage => GameState {
            current_page: if state.current_page > 1 {
                state.current_page - 1
            } else {
                state.current_page
            },
            current_task_index: 0,
            is_task_completed: false,
            is_transitioning: false,
            ..state.clone()
        },
        GameAction::SubmitAnswer(answer) => {
            let mut next = state.clone();
            next.answers.push(answer);
            next
        }
        GameAction::CompleteTask => GameState {
            is_task_completed: true,
            ..state.clone()
        },
        GameAction::StartTransition => GameState {
            is_transitioning: true,
            ..state.clone()
        },
        GameAction::EndTransition => GameState {
            is_transitioning: false,
            ..state.clone()
        },
        GameAction::CompleteGame { score } => GameState {
            is_completed: true,
            score: Some(score),
            ..state.clone()
        },
        GameAction::ResetGame { now } => GameState {
            has_adblock: state.has_adblock,
            ..GameState::initial(now)
        },
        GameAction::SetAdblock(has_adblock) => GameState {
            has_adblock,
            ..state.clone()
        },
        GameAction::LoadState(loaded) => loaded,
    }
}

/// Owner of one player's game state, mirrored to a blob store after every
/// transition.
pub struct GameSession {
    key: String,
    state: GameState,
    store: Arc<dyn BlobStore>,
}

impl GameSession {
    /// Loads the persisted blob if there is one. Anything unreadable falls
    /// back to the default state.
    pub async fn hydrate(client_id: &str, store: Arc<dyn BlobStore>, now_millis: i64) -> Self {
        let mut session = Self {
            key: storage_key(client_id),
            state: GameState::initial(now_millis),
            store,
        };

        match session.store.get(&session.key).await {
            Ok(Some(raw)) => match serde_json::from_str::<GameState>(&raw) {
                Ok(loaded) => {
                    session.dispatch(GameAction::LoadState(loaded)).await;
                }
                Err(e) => {
                    QUIZ_STATE_LOAD_FAILURES_TOTAL
                        .with_label_values(&["parse"])
                        .inc();
                    tracing::warn!(key = %session.key, "Failed to load game state: {}", e);
                }
            },
            Ok(None) => {}
            Err(e) => {
                QUIZ_STATE_LOAD_FAILURES_TOTAL
                    .with_label_values(&["store"])
                    .inc();
                tracing::warn!(key = %session.key, "Failed to read game state: {:#}", e);
            }
        }

        session
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub async fn dispatch(&mut self, action: GameAction) -> &GameState {
        tracing::debug!(key = %self.key, action = action.name(), "Game transition");
        self.state = reduce(&self.state, action);
        self.persist().await;
        &self.state
    }

    async fn persist(&self) {
        let raw = match serde_json::to_string(&self.state) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::error!(key = %self.key, "Failed to serialize game state: {}", e);
                return;
            }
        };
        if let Err(e) = self.store.put(&self.key, &raw).await {
            QUIZ_STATE_PERSIST_FAILURES_TOTAL.inc();
            tracing::error!(key = %self.key, "Failed to persist game state: {:#}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GameAnswer, TaskAnswer};
    use crate::services::blob_store::MemoryBlobStore;

    fn answer(task_id: &str) -> GameAnswer {
        GameAnswer {
            task_id: task_id.to_string(),
            answer: TaskAnswer::Choice {
                selected_option: 1,
                is_correct: true,
            },
            page: 1,
            completed_at: 1_700_000_000_000,
        }
    }

    fn started() -> GameState {
        reduce(
            &GameState::initial(0),
            GameAction::StartGame {
                session_id: "abc".into(),
                started_at: 10,
            },
        )
    }

    #[test]
    fn reset_then_start_gives_fresh_first_page() {
        let mut state = started();
        state = reduce(&state, GameAction::SubmitAnswer(answer("1-1")));
        state = reduce(&state, GameAction::NextPage);
        state = reduce(&state, GameAction::ResetGame { now: 20 });
        assert_eq!(state.current_page, 0);

        let id = generate_session_id(20);
        state = reduce(
            &state,
            GameAction::StartGame {
                session_id: id.clone(),
                started_at: 20,
            },
        );
        assert_eq!(state.current_page, 1);
        assert_eq!(state.current_task_index, 0);
        assert!(state.answers.is_empty());
        assert!(!state.session_id.is_empty());
        assert_eq!(state.session_id, id);
        assert_eq!(state.start_time, 20);
    }

    #[test]
    fn task_and_page_advance_clear_flags() {
        let mut state = started();
        state = reduce(&state, GameAction::StartTransition);
        state = reduce(&state, GameAction::CompleteTask);
        assert!(state.is_transitioning && state.is_task_completed);

        state = reduce(&state, GameAction::NextTask);
        assert_eq!(state.current_task_index, 1);
        assert!(!state.is_transitioning && !state.is_task_completed);

        state = reduce(&state, GameAction::NextPage);
        assert_eq!((state.current_page, state.current_task_index), (2, 0));

        state = reduce(&state, GameAction::PreviousPage);
        assert_eq!(state.current_page, 1);
        state = reduce(&state, GameAction::PreviousPage);
        assert_eq!(state.current_page, 1);
    }

    #[test]
    fn complete_game_sets_score() {
        let score = generate_score();
        assert!(SCORE_POOL.contains(&score.as_str()));
        let state = reduce(&started(), GameAction::CompleteGame { score: score.clone() });
        assert!(state.is_completed);
        assert_eq!(state.score, Some(score));
    }

    #[test]
    fn adblock_flag_survives_restart() {
        let state = reduce(&GameState::initial(0), GameAction::SetAdblock(true));
        let state = reduce(
            &state,
            GameAction::StartGame {
                session_id: "x".into(),
                started_at: 1,
            },
        );
        assert!(state.has_adblock);
    }

    #[test]
    fn session_ids_are_base36() {
        let id = generate_session_id(1_700_000_000_000);
        assert!(id.starts_with(&to_base36(1_700_000_000_000)));
        assert_eq!(id.len(), to_base36(1_700_000_000_000).len() + SESSION_SUFFIX_LEN);
        assert!(id.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
    }

    #[test]
    fn serialized_state_round_trips() {
        let mut state = started();
        state = reduce(&state, GameAction::SubmitAnswer(answer("1-1")));
        state = reduce(&state, GameAction::CompleteGame { score: "847293".into() });

        let raw = serde_json::to_string(&state).unwrap();
        let loaded: GameState = serde_json::from_str(&raw).unwrap();
        assert_eq!(reduce(&GameState::initial(0), GameAction::LoadState(loaded)), state);
    }

    #[tokio::test]
    async fn session_persists_and_hydrates() {
        let store: Arc<dyn BlobStore> = Arc::new(MemoryBlobStore::new());
        let mut session = GameSession::hydrate("player", store.clone(), 0).await;
        session
            .dispatch(GameAction::StartGame {
                session_id: "sid".into(),
                started_at: 5,
            })
            .await;

        let restored = GameSession::hydrate("player", store, 99).await;
        assert_eq!(restored.state().current_page, 1);
        assert_eq!(restored.state().session_id, "sid");
    }

    #[tokio::test]
    async fn corrupt_blob_falls_back_to_defaults() {
        let store: Arc<dyn BlobStore> = Arc::new(MemoryBlobStore::new());
        store.put(&storage_key("player"), "{not json").await.unwrap();

        let session = GameSession::hydrate("player", store, 42).await;
        assert_eq!(session.state(), &GameState::initial(42));
    }
}
