use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::metrics::QUIZ_GATES_ACTIVE;
use crate::models::{IgnoreReason, PageAnswer, PageAnswers, TaskAnswer, TaskGateStatus, TaskStatusView};

pub const DEFAULT_GATE_DELAY: Duration = Duration::from_millis(3000);

/// Receives gate progress. Called with the gate locked, so implementations
/// must not call back into the gate.
pub trait GateListener: Send + Sync + 'static {
    fn task_waiting(&self, page: u32, task_id: &str, delay: Duration);
    fn task_unlocked(&self, page: u32, task_id: &str);
    fn page_completed(&self, page: u32, answers: PageAnswers);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Accepted,
    Ignored(IgnoreReason),
}

struct GateInner {
    page: u32,
    task_ids: Vec<String>,
    unlocked: Vec<bool>,
    answers: PageAnswers,
    waiting: Option<usize>,
    completed: bool,
    disabled: bool,
    torn_down: bool,
    pending: Option<JoinHandle<()>>,
}

impl GateInner {
    fn index_of(&self, task_id: &str) -> Option<usize> {
        self.task_ids.iter().position(|id| id == task_id)
    }

    fn admit(&self, task_id: &str) -> Result<usize, IgnoreReason> {
        if self.disabled || self.torn_down {
            return Err(IgnoreReason::Disabled);
        }
        let index = self.index_of(task_id).ok_or(IgnoreReason::UnknownTask)?;
        if self.answers.contains(task_id) {
            return Err(IgnoreReason::AlreadyAnswered);
        }
        if self.waiting.is_some() {
            return Err(IgnoreReason::WaitInProgress);
        }
        if !self.unlocked[index] {
            return Err(IgnoreReason::Locked);
        }
        Ok(index)
    }

    fn status_at(&self, index: usize) -> TaskGateStatus {
        if self.waiting == Some(index) {
            TaskGateStatus::Waiting
        } else if self.answers.contains(&self.task_ids[index]) {
            TaskGateStatus::Completed
        } else if self.unlocked[index] {
            TaskGateStatus::Current
        } else {
            TaskGateStatus::Locked
        }
    }
}

/// Page-scoped sequencer: one task playable at a time, each answer followed
/// by a fixed wait before the next task unlocks.
///
/// Dropping the gate (or calling [`SequentialGate::teardown`]) cancels a
/// pending wait; no listener call happens afterwards.
pub struct SequentialGate {
    inner: Arc<Mutex<GateInner>>,
    delay: Duration,
    listener: Arc<dyn GateListener>,
}

fn lock(inner: &Mutex<GateInner>) -> MutexGuard<'_, GateInner> {
    inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl SequentialGate {
    pub fn new(
        page: u32,
        task_ids: Vec<String>,
        delay: Duration,
        listener: Arc<dyn GateListener>,
    ) -> Self {
        let unlocked = (0..task_ids.len()).map(|index| index == 0).collect();
        QUIZ_GATES_ACTIVE.inc();
        Self {
            inner: Arc::new(Mutex::new(GateInner {
                page,
                task_ids,
                unlocked,
                answers: PageAnswers::default(),
                waiting: None,
                completed: false,
                disabled: false,
                torn_down: false,
                pending: None,
            })),
            delay,
            listener,
        }
    }

    pub fn page(&self) -> u32 {
        lock(&self.inner).page
    }

    pub fn set_disabled(&self, disabled: bool) {
        lock(&self.inner).disabled = disabled;
    }

    /// Whether an answer for `task_id` would be taken right now, without
    /// taking it.
    pub fn admits(&self, task_id: &str) -> Result<(), IgnoreReason> {
        lock(&self.inner).admit(task_id).map(|_| ())
    }

    pub fn submit(&self, task_id: &str, answer: TaskAnswer) -> SubmitOutcome {
        let mut inner = lock(&self.inner);

        let index = match inner.admit(task_id) {
            Ok(index) => index,
            Err(reason) => return SubmitOutcome::Ignored(reason),
        };

        inner.answers.0.push(PageAnswer {
            task_id: task_id.to_string(),
            answer,
        });
        inner.waiting = Some(index);
        self.listener.task_waiting(inner.page, task_id, self.delay);

        let shared = Arc::clone(&self.inner);
        let listener = Arc::clone(&self.listener);
        let delay = self.delay;
        inner.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            finish_wait(&shared, listener.as_ref(), index);
        }));

        SubmitOutcome::Accepted
    }

    pub fn status(&self, task_id: &str) -> Option<TaskGateStatus> {
        let inner = lock(&self.inner);
        inner.index_of(task_id).map(|index| inner.status_at(index))
    }

    pub fn statuses(&self) -> Vec<TaskStatusView> {
        let inner = lock(&self.inner);
        inner
            .task_ids
            .iter()
            .enumerate()
            .map(|(index, task_id)| TaskStatusView {
                task_id: task_id.clone(),
                status: inner.status_at(index),
            })
            .collect()
    }

    pub fn answers(&self) -> PageAnswers {
        lock(&self.inner).answers.clone()
    }

    pub fn is_waiting(&self) -> bool {
        lock(&self.inner).waiting.is_some()
    }

    /// True once the completion callback has fired.
    pub fn is_complete(&self) -> bool {
        lock(&self.inner).completed
    }

    pub fn teardown(&self) {
        let mut inner = lock(&self.inner);
        inner.torn_down = true;
        inner.waiting = None;
        if let Some(pending) = inner.pending.take() {
            pending.abort();
        }
    }
}

fn finish_wait(shared: &Mutex<GateInner>, listener: &dyn GateListener, index: usize) {
    let mut inner = lock(shared);
    if inner.torn_down || inner.waiting != Some(index) {
        return;
    }
    inner.waiting = None;
    inner.pending = None;

    let next = index + 1;
    if next < inner.task_ids.len() {
        inner.unlocked[next] = true;
        let page = inner.page;
        listener.task_unlocked(page, &inner.task_ids[next]);
    } else if !inner.completed {
        inner.completed = true;
        listener.page_completed(inner.page, inner.answers.clone());
    }
}

impl Drop for SequentialGate {
    fn drop(&mut self) {
        self.teardown();
        QUIZ_GATES_ACTIVE.dec();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    enum Seen {
        Waiting(String),
        Unlocked(String),
        Completed(PageAnswers),
    }

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<Seen>>,
    }

    impl Recorder {
        fn events(&self) -> Vec<Seen> {
            self.events.lock().unwrap().clone()
        }

        fn completions(&self) -> Vec<PageAnswers> {
            self.events()
                .into_iter()
                .filter_map(|event| match event {
                    Seen::Completed(answers) => Some(answers),
                    _ => None,
                })
                .collect()
        }
    }

    impl GateListener for Recorder {
        fn task_waiting(&self, _page: u32, task_id: &str, _delay: Duration) {
            self.events.lock().unwrap().push(Seen::Waiting(task_id.into()));
        }

        fn task_unlocked(&self, _page: u32, task_id: &str) {
            self.events.lock().unwrap().push(Seen::Unlocked(task_id.into()));
        }

        fn page_completed(&self, _page: u32, answers: PageAnswers) {
            self.events.lock().unwrap().push(Seen::Completed(answers));
        }
    }

    fn gate(ids: &[&str]) -> (SequentialGate, Arc<Recorder>) {
        let recorder = Arc::new(Recorder::default());
        let gate = SequentialGate::new(
            1,
            ids.iter().map(|id| id.to_string()).collect(),
            DEFAULT_GATE_DELAY,
            recorder.clone(),
        );
        (gate, recorder)
    }

    fn choice(selected_option: usize, is_correct: bool) -> TaskAnswer {
        TaskAnswer::Choice {
            selected_option,
            is_correct,
        }
    }

    async fn wait_ms(ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
        tokio::task::yield_now().await;
    }

    #[tokio::test(start_paused = true)]
    async fn first_task_starts_current() {
        let (gate, _) = gate(&["a", "b", "c"]);
        let statuses: Vec<_> = gate.statuses().into_iter().map(|s| s.status).collect();
        assert_eq!(
            statuses,
            vec![
                TaskGateStatus::Current,
                TaskGateStatus::Locked,
                TaskGateStatus::Locked
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn two_task_page_completes_after_both_waits() {
        let (gate, recorder) = gate(&["A", "B"]);
        let word = TaskAnswer::Word {
            word: "CAT".into(),
            is_correct: true,
        };

        assert_eq!(gate.submit("A", choice(1, true)), SubmitOutcome::Accepted);
        assert_eq!(gate.status("A"), Some(TaskGateStatus::Waiting));

        wait_ms(2999).await;
        assert_eq!(gate.status("B"), Some(TaskGateStatus::Locked));

        wait_ms(2).await;
        assert_eq!(gate.status("A"), Some(TaskGateStatus::Completed));
        assert_eq!(gate.status("B"), Some(TaskGateStatus::Current));

        assert_eq!(gate.submit("B", word.clone()), SubmitOutcome::Accepted);
        assert!(recorder.completions().is_empty());

        wait_ms(3001).await;
        let completions = recorder.completions();
        assert_eq!(completions.len(), 1);
        assert_eq!(completions[0].len(), 2);
        assert_eq!(completions[0].get("A"), Some(&choice(1, true)));
        assert_eq!(completions[0].get("B"), Some(&word));
        assert!(gate.is_complete());
    }

    #[tokio::test(start_paused = true)]
    async fn single_task_page_still_waits() {
        let (gate, recorder) = gate(&["only"]);
        gate.submit("only", choice(0, false));
        wait_ms(10).await;
        assert!(recorder.completions().is_empty());

        wait_ms(3000).await;
        assert_eq!(recorder.completions().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn out_of_turn_submissions_are_ignored() {
        let (gate, recorder) = gate(&["a", "b"]);

        assert_eq!(
            gate.submit("b", choice(0, true)),
            SubmitOutcome::Ignored(IgnoreReason::Locked)
        );
        assert_eq!(
            gate.submit("zzz", choice(0, true)),
            SubmitOutcome::Ignored(IgnoreReason::UnknownTask)
        );
        assert!(gate.answers().is_empty());

        gate.submit("a", choice(0, true));
        assert_eq!(
            gate.submit("a", choice(1, true)),
            SubmitOutcome::Ignored(IgnoreReason::AlreadyAnswered)
        );
        assert_eq!(
            gate.submit("b", choice(0, true)),
            SubmitOutcome::Ignored(IgnoreReason::WaitInProgress)
        );
        assert_eq!(gate.answers().len(), 1);
        assert_eq!(recorder.events(), vec![Seen::Waiting("a".into())]);
    }

    #[tokio::test(start_paused = true)]
    async fn admits_matches_submit_without_taking_the_answer() {
        let (gate, recorder) = gate(&["a", "b"]);

        assert_eq!(gate.admits("a"), Ok(()));
        assert_eq!(gate.admits("b"), Err(IgnoreReason::Locked));
        assert_eq!(gate.admits("zzz"), Err(IgnoreReason::UnknownTask));
        assert!(gate.answers().is_empty());
        assert!(recorder.events().is_empty());

        gate.submit("a", choice(0, true));
        assert_eq!(gate.admits("a"), Err(IgnoreReason::AlreadyAnswered));
        assert_eq!(gate.admits("b"), Err(IgnoreReason::WaitInProgress));

        wait_ms(3001).await;
        assert_eq!(gate.admits("a"), Err(IgnoreReason::AlreadyAnswered));
        assert_eq!(gate.admits("b"), Ok(()));

        gate.set_disabled(true);
        assert_eq!(gate.admits("b"), Err(IgnoreReason::Disabled));
    }

    #[tokio::test(start_paused = true)]
    async fn at_most_one_task_waits() {
        let (gate, _) = gate(&["a", "b", "c"]);
        for id in ["a", "b", "c"] {
            gate.submit(id, choice(0, true));
            let waiting = gate
                .statuses()
                .iter()
                .filter(|s| s.status == TaskGateStatus::Waiting)
                .count();
            assert!(waiting <= 1);
            wait_ms(3001).await;
        }
        assert!(gate.is_complete());
    }

    #[tokio::test(start_paused = true)]
    async fn disabled_gate_ignores_everything() {
        let (gate, _) = gate(&["a"]);
        gate.set_disabled(true);
        assert_eq!(
            gate.submit("a", choice(0, true)),
            SubmitOutcome::Ignored(IgnoreReason::Disabled)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn teardown_cancels_pending_wait() {
        let (gate, recorder) = gate(&["a"]);
        gate.submit("a", choice(0, true));
        gate.teardown();
        wait_ms(5000).await;
        assert!(recorder.completions().is_empty());

        let (gate, recorder) = self::gate(&["a"]);
        gate.submit("a", choice(0, true));
        drop(gate);
        wait_ms(5000).await;
        assert!(recorder.completions().is_empty());
    }
}
