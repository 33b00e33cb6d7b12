use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc, Mutex, OwnedMutexGuard, RwLock};
use tokio::time::Instant;

use crate::games::{GameWidget, SubmissionError};
use crate::metrics::{
    ANSWERS_SUBMITTED_TOTAL, NAVIGATION_REDIRECTS_TOTAL, QUIZ_GAMES_TOTAL, QUIZ_SESSIONS_ACTIVE,
    QUIZ_SESSIONS_EVICTED_TOTAL, SUBMISSIONS_IGNORED_TOTAL,
};
use crate::models::gating::{PageCompleted, TaskUnlocked, TaskWaiting};
use crate::models::quiz::{CatalogOverview, CatalogPage, CatalogTask};
use crate::models::{
    GameAction, GameAnswer, GameState, GatingEvent, IgnoreReason, NavigationOutcome, PageAnswers,
    PageView, ScoreView, SubmitAnswerResponse, Submission, TaskGateStatus, TaskView,
};

use super::blob_store::BlobStore;
use super::catalog::TaskCatalog;
use super::game_machine::{generate_session_id, GameSession};
use super::gating::{GateListener, SequentialGate, SubmitOutcome};
use super::page_controller::{self, Navigation, NavigationError};

const EVENT_CHANNEL_CAPACITY: usize = 64;
const MAX_CLIENT_ID_LEN: usize = 64;

#[derive(Debug, Error)]
pub enum QuizError {
    #[error("Client id must be 1-64 characters of [A-Za-z0-9_-]")]
    InvalidClientId,
    #[error(transparent)]
    Navigation(#[from] NavigationError),
    #[error("Task {task_id} is not on page {page}")]
    UnknownTask { page: u32, task_id: String },
    #[error("Invalid submission: {0}")]
    InvalidSubmission(#[from] SubmissionError),
}

fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

fn validate_client_id(client_id: &str) -> Result<(), QuizError> {
    let valid = !client_id.is_empty()
        && client_id.len() <= MAX_CLIENT_ID_LEN
        && client_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(QuizError::InvalidClientId)
    }
}

#[derive(Debug)]
enum GateSignal {
    Waiting,
    Unlocked,
    Completed { page: u32, answers: PageAnswers },
}

/// Forwards gate callbacks to SSE subscribers and to the session worker,
/// tagged with the generation of the gate that produced them.
struct SessionListener {
    generation: u64,
    signals: mpsc::UnboundedSender<(u64, GateSignal)>,
    events: broadcast::Sender<GatingEvent>,
}

impl SessionListener {
    fn forward(&self, event: GatingEvent, signal: GateSignal) {
        // No subscribers is fine.
        let _ = self.events.send(event);
        if self.signals.send((self.generation, signal)).is_err() {
            tracing::debug!("Session worker gone, dropping gate signal");
        }
    }
}

impl GateListener for SessionListener {
    fn task_waiting(&self, page: u32, task_id: &str, delay: Duration) {
        self.forward(
            GatingEvent::TaskWaiting(TaskWaiting {
                page,
                task_id: task_id.to_string(),
                delay_ms: delay.as_millis() as u64,
                timestamp: Utc::now(),
            }),
            GateSignal::Waiting,
        );
    }

    fn task_unlocked(&self, page: u32, task_id: &str) {
        self.forward(
            GatingEvent::TaskUnlocked(TaskUnlocked {
                page,
                task_id: task_id.to_string(),
                timestamp: Utc::now(),
            }),
            GateSignal::Unlocked,
        );
    }

    fn page_completed(&self, page: u32, answers: PageAnswers) {
        self.forward(
            GatingEvent::PageCompleted(PageCompleted {
                page,
                answers: answers.clone(),
                timestamp: Utc::now(),
            }),
            GateSignal::Completed { page, answers },
        );
    }
}

/// Per-page UI state: the gate plus one widget per task.
struct PageRuntime {
    page: u32,
    generation: u64,
    gate: SequentialGate,
    widgets: HashMap<String, GameWidget>,
    recorded: bool,
}

struct SessionRuntime {
    session: GameSession,
    page: Option<PageRuntime>,
    events: broadcast::Sender<GatingEvent>,
    signals: mpsc::UnboundedSender<(u64, GateSignal)>,
    generation: u64,
    last_access: Instant,
}

impl SessionRuntime {
    fn spawn(session: GameSession) -> Arc<Mutex<SessionRuntime>> {
        let (signals, receiver) = mpsc::unbounded_channel();
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let runtime = Arc::new(Mutex::new(SessionRuntime {
            session,
            page: None,
            events,
            signals,
            generation: 0,
            last_access: Instant::now(),
        }));
        tokio::spawn(apply_gate_signals(Arc::downgrade(&runtime), receiver));
        QUIZ_SESSIONS_ACTIVE.inc();
        runtime
    }

    fn state(&self) -> &GameState {
        self.session.state()
    }

    async fn apply(&mut self, actions: Vec<GameAction>) {
        for action in actions {
            self.session.dispatch(action).await;
        }
    }

    /// Keeps the current page runtime when it already serves `page`,
    /// otherwise replaces it with a fresh gate.
    fn ensure_page(&mut self, page: u32, catalog: &TaskCatalog, delay: Duration) {
        if self.page.as_ref().map(|current| current.page) == Some(page) {
            return;
        }

        self.generation += 1;
        let tasks = catalog.page_tasks(page);
        let listener = Arc::new(SessionListener {
            generation: self.generation,
            signals: self.signals.clone(),
            events: self.events.clone(),
        });
        let gate = SequentialGate::new(
            page,
            tasks.iter().map(|task| task.id.clone()).collect(),
            delay,
            listener,
        );
        let mut widgets: HashMap<String, GameWidget> = tasks
            .iter()
            .map(|task| (task.id.clone(), GameWidget::for_task(task)))
            .collect();

        let disabled = self.state().has_adblock;
        gate.set_disabled(disabled);
        for widget in widgets.values_mut() {
            widget.set_disabled(disabled);
        }

        self.page = Some(PageRuntime {
            page,
            generation: self.generation,
            gate,
            widgets,
            recorded: false,
        });
    }

    /// Nothing left for the worker to apply and nobody has asked for it
    /// within `max_idle`.
    fn is_idle(&self, max_idle: Duration) -> bool {
        let waiting = self
            .page
            .as_ref()
            .is_some_and(|current| current.gate.is_waiting());
        !waiting && self.last_access.elapsed() >= max_idle
    }

    fn clear_page(&mut self) {
        self.page = None;
    }

    fn set_disabled(&mut self, disabled: bool) {
        if let Some(current) = self.page.as_mut() {
            current.gate.set_disabled(disabled);
            for widget in current.widgets.values_mut() {
                widget.set_disabled(disabled);
            }
        }
    }

    async fn apply_signal(&mut self, generation: u64, signal: GateSignal) {
        if self.page.as_ref().map(|current| current.generation) != Some(generation) {
            tracing::debug!(generation, "Dropping signal from superseded gate");
            return;
        }

        match signal {
            GateSignal::Waiting => {
                self.apply(vec![GameAction::StartTransition, GameAction::CompleteTask])
                    .await;
            }
            GateSignal::Unlocked => {
                self.session.dispatch(GameAction::NextTask).await;
            }
            GateSignal::Completed { page, answers } => {
                self.record_page_answers(page, answers).await;
            }
        }
    }

    /// Appends the page's answers to the history once per gate.
    async fn record_page_answers(&mut self, page: u32, answers: PageAnswers) {
        let Some(current) = self.page.as_mut() else {
            return;
        };
        if current.recorded {
            return;
        }
        current.recorded = true;

        self.session.dispatch(GameAction::EndTransition).await;
        let completed_at = now_millis();
        for entry in answers.0 {
            self.session
                .dispatch(GameAction::SubmitAnswer(GameAnswer {
                    task_id: entry.task_id,
                    answer: entry.answer,
                    page,
                    completed_at,
                }))
                .await;
        }
        tracing::info!(page, "Page completed");
    }
}

impl Drop for SessionRuntime {
    fn drop(&mut self) {
        QUIZ_SESSIONS_ACTIVE.dec();
    }
}

async fn apply_gate_signals(
    runtime: Weak<Mutex<SessionRuntime>>,
    mut signals: mpsc::UnboundedReceiver<(u64, GateSignal)>,
) {
    while let Some((generation, signal)) = signals.recv().await {
        let Some(runtime) = runtime.upgrade() else {
            break;
        };
        let mut runtime = runtime.lock().await;
        runtime.apply_signal(generation, signal).await;
    }
}

/// Runs the finance challenge for many players at once. Each client id owns
/// a game session (mirrored to the blob store), the live gate of the page it
/// is on and a stream of gate events.
///
/// Runtimes untouched for `session_idle` are dropped whenever a new client
/// arrives; the next request for an evicted client rehydrates it from the
/// store on a fresh page gate.
pub struct QuizService {
    catalog: Arc<TaskCatalog>,
    store: Arc<dyn BlobStore>,
    gate_delay: Duration,
    session_idle: Duration,
    site_origin: String,
    sessions: RwLock<HashMap<String, Arc<Mutex<SessionRuntime>>>>,
}

impl QuizService {
    pub fn new(
        catalog: Arc<TaskCatalog>,
        store: Arc<dyn BlobStore>,
        gate_delay: Duration,
        session_idle: Duration,
        site_origin: String,
    ) -> Self {
        Self {
            catalog,
            store,
            gate_delay,
            session_idle,
            site_origin,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub fn catalog(&self) -> &TaskCatalog {
        &self.catalog
    }

    pub fn store_backend(&self) -> &'static str {
        self.store.backend()
    }

    pub async fn ping_store(&self) -> anyhow::Result<()> {
        self.store.ping().await
    }

    async fn runtime(&self, client_id: &str) -> Result<Arc<Mutex<SessionRuntime>>, QuizError> {
        validate_client_id(client_id)?;

        if let Some(runtime) = self.sessions.read().await.get(client_id) {
            return Ok(runtime.clone());
        }

        let session = GameSession::hydrate(client_id, self.store.clone(), now_millis()).await;
        let mut sessions = self.sessions.write().await;
        self.evict_idle(&mut sessions);
        Ok(sessions
            .entry(client_id.to_string())
            .or_insert_with(|| SessionRuntime::spawn(session))
            .clone())
    }

    /// Locks the client's runtime and marks it as used.
    async fn session(&self, client_id: &str) -> Result<OwnedMutexGuard<SessionRuntime>, QuizError> {
        let runtime = self.runtime(client_id).await?;
        let mut runtime = runtime.lock_owned().await;
        runtime.last_access = Instant::now();
        Ok(runtime)
    }

    /// Drops every idle runtime and returns how many went.
    pub async fn evict_idle_sessions(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        self.evict_idle(&mut sessions)
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    fn evict_idle(&self, sessions: &mut HashMap<String, Arc<Mutex<SessionRuntime>>>) -> usize {
        let before = sessions.len();
        sessions.retain(|client_id, runtime| {
            // Held by an in-flight request or the signal worker.
            if Arc::strong_count(runtime) > 1 {
                return true;
            }
            let keep = match runtime.try_lock() {
                Ok(runtime) => !runtime.is_idle(self.session_idle),
                Err(_) => true,
            };
            if !keep {
                tracing::debug!(client_id = %client_id, "Evicting idle quiz session");
            }
            keep
        });

        let evicted = before - sessions.len();
        if evicted > 0 {
            QUIZ_SESSIONS_EVICTED_TOTAL.inc_by(evicted as u64);
            tracing::info!(evicted, remaining = sessions.len(), "Idle quiz sessions evicted");
        }
        evicted
    }

    pub fn catalog_overview(&self) -> CatalogOverview {
        let pages = (1..=self.catalog.total_pages())
            .map(|page| CatalogPage {
                page,
                tasks: self
                    .catalog
                    .page_tasks(page)
                    .into_iter()
                    .map(|task| CatalogTask {
                        id: task.id.clone(),
                        title: task.title.clone(),
                        description: task.description.clone(),
                        game_type: task.game_type(),
                        prompt: task.game.prompt(),
                    })
                    .collect(),
            })
            .collect();

        CatalogOverview {
            total_pages: self.catalog.total_pages(),
            pages,
        }
    }

    pub async fn state(&self, client_id: &str) -> Result<GameState, QuizError> {
        let runtime = self.session(client_id).await?;
        Ok(runtime.state().clone())
    }

    pub async fn start(&self, client_id: &str) -> Result<GameState, QuizError> {
        let mut runtime = self.session(client_id).await?;

        runtime.clear_page();
        let now = now_millis();
        let session_id = generate_session_id(now);
        runtime
            .session
            .dispatch(GameAction::StartGame {
                session_id: session_id.clone(),
                started_at: now,
            })
            .await;

        QUIZ_GAMES_TOTAL.with_label_values(&["started"]).inc();
        tracing::info!(client_id, session_id = %session_id, "Game started");
        Ok(runtime.state().clone())
    }

    pub async fn reset(&self, client_id: &str) -> Result<GameState, QuizError> {
        let mut runtime = self.session(client_id).await?;

        runtime.clear_page();
        runtime
            .session
            .dispatch(GameAction::ResetGame { now: now_millis() })
            .await;

        QUIZ_GAMES_TOTAL.with_label_values(&["reset"]).inc();
        tracing::info!(client_id, "Game reset");
        Ok(runtime.state().clone())
    }

    pub async fn set_adblock(&self, client_id: &str, detected: bool) -> Result<GameState, QuizError> {
        let mut runtime = self.session(client_id).await?;

        runtime.session.dispatch(GameAction::SetAdblock(detected)).await;
        runtime.set_disabled(detected);
        if detected {
            tracing::warn!(client_id, "Ad blocker reported, quiz widgets disabled");
        }
        Ok(runtime.state().clone())
    }

    pub async fn enter_page(&self, client_id: &str, page: u32) -> Result<PageView, QuizError> {
        let mut runtime = self.session(client_id).await?;

        let navigation = page_controller::enter_page(runtime.state(), page, &self.catalog)
            .inspect_err(record_redirect)?;
        runtime.apply(navigation.actions).await;
        runtime.ensure_page(page, &self.catalog, self.gate_delay);

        Ok(self.page_view(&runtime, page))
    }

    pub async fn submit_answer(
        &self,
        client_id: &str,
        page: u32,
        task_id: &str,
        submission: Submission,
    ) -> Result<SubmitAnswerResponse, QuizError> {
        let mut runtime = self.session(client_id).await?;

        let current_page = runtime.state().current_page;
        if current_page != page || !runtime.state().is_started() {
            return Err(NavigationError::NotOnPage {
                requested: page,
                current: current_page,
            }
            .into());
        }
        let Some(task) = self.catalog.task(task_id).filter(|task| task.page == page) else {
            return Err(QuizError::UnknownTask {
                page,
                task_id: task_id.to_string(),
            });
        };
        let game_type = task.game_type();

        runtime.ensure_page(page, &self.catalog, self.gate_delay);
        let Some(current) = runtime.page.as_mut() else {
            return Err(NavigationError::PageNotFound(page).into());
        };

        // A task that cannot take an answer is never replayed, so a repeat
        // of an accepted answer is ignored rather than refused by its widget.
        if let Err(reason) = current.gate.admits(task_id) {
            return Ok(ignored(current, reason));
        }

        // Played on a copy so an ignored submission leaves the widget untouched.
        let mut widget = current
            .widgets
            .get(task_id)
            .cloned()
            .unwrap_or_else(|| GameWidget::for_task(task));
        let answer = match widget.play(submission) {
            Ok(answer) => answer,
            Err(SubmissionError::Disabled) => {
                return Ok(ignored(current, IgnoreReason::Disabled));
            }
            Err(e) => return Err(e.into()),
        };

        match current.gate.submit(task_id, answer.clone()) {
            SubmitOutcome::Accepted => {
                current.widgets.insert(task_id.to_string(), widget);
                ANSWERS_SUBMITTED_TOTAL
                    .with_label_values(&[game_type.as_str(), bool_label(answer.is_correct())])
                    .inc();
                tracing::info!(
                    client_id,
                    page,
                    task_id,
                    correct = answer.is_correct(),
                    "Answer accepted"
                );
                Ok(SubmitAnswerResponse {
                    accepted: true,
                    ignored_reason: None,
                    answer: Some(answer),
                    tasks: current.gate.statuses(),
                })
            }
            SubmitOutcome::Ignored(reason) => Ok(ignored(current, reason)),
        }
    }

    pub async fn next_page(
        &self,
        client_id: &str,
        page: u32,
    ) -> Result<NavigationOutcome, QuizError> {
        let mut runtime = self.session(client_id).await?;

        let completed = match runtime.page.as_ref() {
            Some(current) if current.page == page && current.gate.is_complete() => {
                Some(current.gate.answers())
            }
            _ => None,
        };
        // The worker may not have caught up with the completion signal yet.
        if let Some(answers) = &completed {
            runtime.record_page_answers(page, answers.clone()).await;
        }

        let Navigation { actions, outcome } = page_controller::complete_page(
            runtime.state(),
            page,
            &completed.unwrap_or_default(),
            &self.catalog,
        )?;
        runtime.apply(actions).await;
        runtime.clear_page();

        if let Some(score) = &outcome.score {
            QUIZ_GAMES_TOTAL.with_label_values(&["completed"]).inc();
            tracing::info!(client_id, score = %score, "Game completed");
        }
        Ok(outcome)
    }

    pub async fn previous_page(
        &self,
        client_id: &str,
        page: u32,
    ) -> Result<NavigationOutcome, QuizError> {
        let mut runtime = self.session(client_id).await?;

        let Navigation { actions, outcome } = page_controller::go_back(runtime.state(), page);
        if !actions.is_empty() {
            runtime.apply(actions).await;
            runtime.clear_page();
        }
        Ok(outcome)
    }

    pub async fn score(&self, client_id: &str) -> Result<ScoreView, QuizError> {
        let runtime = self.session(client_id).await?;
        page_controller::score_view(runtime.state(), now_millis(), &self.site_origin)
            .inspect_err(record_redirect)
            .map_err(QuizError::from)
    }

    pub async fn subscribe(
        &self,
        client_id: &str,
    ) -> Result<broadcast::Receiver<GatingEvent>, QuizError> {
        let runtime = self.session(client_id).await?;
        Ok(runtime.events.subscribe())
    }

    fn page_view(&self, runtime: &SessionRuntime, page: u32) -> PageView {
        let current = runtime.page.as_ref().filter(|current| current.page == page);
        let tasks: Vec<TaskView> = self
            .catalog
            .page_tasks(page)
            .into_iter()
            .map(|task| TaskView {
                id: task.id.clone(),
                title: task.title.clone(),
                description: task.description.clone(),
                game_type: task.game_type(),
                status: current
                    .and_then(|current| current.gate.status(&task.id))
                    .unwrap_or(TaskGateStatus::Locked),
                prompt: task.game.prompt(),
            })
            .collect();

        PageView {
            page,
            total_pages: self.catalog.total_pages(),
            tasks,
            completed_count: current.map(|current| current.gate.answers().len()).unwrap_or(0),
            all_completed: current.is_some_and(|current| current.gate.is_complete()),
            has_adblock: runtime.state().has_adblock,
        }
    }
}

fn ignored(current: &PageRuntime, reason: IgnoreReason) -> SubmitAnswerResponse {
    SUBMISSIONS_IGNORED_TOTAL
        .with_label_values(&[reason.as_str()])
        .inc();
    tracing::debug!(page = current.page, reason = reason.as_str(), "Submission ignored");
    SubmitAnswerResponse {
        accepted: false,
        ignored_reason: Some(reason),
        answer: None,
        tasks: current.gate.statuses(),
    }
}

fn record_redirect(error: &NavigationError) {
    if let NavigationError::Redirect(notice) = error {
        NAVIGATION_REDIRECTS_TOTAL
            .with_label_values(&[notice.redirect_to.path().as_str()])
            .inc();
    }
}

fn bool_label(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}
