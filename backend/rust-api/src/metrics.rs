use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter, register_int_counter_vec, register_int_gauge,
    Encoder, HistogramVec, IntCounter, IntCounterVec, IntGauge, TextEncoder,
};

lazy_static! {
    // HTTP Metrics
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "http_requests_total",
        "Total number of HTTP requests",
        &["method", "path", "status"]
    )
    .unwrap();

    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "http_request_duration_seconds",
        "HTTP request duration in seconds",
        &["method", "path"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
    )
    .unwrap();

    // Storage adapters (Redis, MongoDB)
    pub static ref STORE_OPERATIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "store_operations_total",
        "Storage adapter calls by backend, operation and target collection or key space",
        &["backend", "operation", "target", "status"]
    )
    .unwrap();

    pub static ref STORE_OPERATION_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "store_operation_duration_seconds",
        "Storage adapter call latency in seconds",
        &["backend", "operation"],
        vec![0.0005, 0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0]
    )
    .unwrap();

    pub static ref GAME_STATE_LOOKUPS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "game_state_lookups_total",
        "Saved game state reads by result (hit, miss)",
        &["result"]
    )
    .unwrap();

    // Quiz Metrics
    pub static ref QUIZ_GAMES_TOTAL: IntCounterVec = register_int_counter_vec!(
        "quiz_games_total",
        "Quiz runs by lifecycle event",
        &["event"]
    )
    .unwrap();

    pub static ref QUIZ_SESSIONS_ACTIVE: IntGauge = register_int_gauge!(
        "quiz_sessions_active",
        "Number of player runtimes held in memory"
    )
    .unwrap();

    pub static ref QUIZ_SESSIONS_EVICTED_TOTAL: IntCounter = register_int_counter!(
        "quiz_sessions_evicted_total",
        "Player runtimes dropped after sitting idle"
    )
    .unwrap();

    pub static ref QUIZ_GATES_ACTIVE: IntGauge = register_int_gauge!(
        "quiz_gates_active",
        "Number of live page gates"
    )
    .unwrap();

    pub static ref ANSWERS_SUBMITTED_TOTAL: IntCounterVec = register_int_counter_vec!(
        "answers_submitted_total",
        "Total number of answers submitted",
        &["game_type", "correct"]
    )
    .unwrap();

    pub static ref SUBMISSIONS_IGNORED_TOTAL: IntCounterVec = register_int_counter_vec!(
        "submissions_ignored_total",
        "Submissions dropped by the page gate",
        &["reason"]
    )
    .unwrap();

    pub static ref NAVIGATION_REDIRECTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "navigation_redirects_total",
        "Quiz page requests answered with a redirect",
        &["target"]
    )
    .unwrap();

    pub static ref QUIZ_STATE_LOAD_FAILURES_TOTAL: IntCounterVec = register_int_counter_vec!(
        "quiz_state_load_failures_total",
        "Persisted game states that could not be restored",
        &["reason"]
    )
    .unwrap();

    pub static ref QUIZ_STATE_PERSIST_FAILURES_TOTAL: IntCounter = register_int_counter!(
        "quiz_state_persist_failures_total",
        "Game state writes that failed"
    )
    .unwrap();

    pub static ref SSE_CONNECTIONS_ACTIVE: IntGauge = register_int_gauge!(
        "sse_connections_active",
        "Number of active SSE connections"
    )
    .unwrap();

    // Content Metrics
    pub static ref CONTENT_UPDATES_TOTAL: IntCounterVec = register_int_counter_vec!(
        "content_updates_total",
        "Admin writes to content sections and portfolio tables",
        &["target", "operation"]
    )
    .unwrap();

    pub static ref CONTACT_SUBMISSIONS_TOTAL: IntCounter = register_int_counter!(
        "contact_submissions_total",
        "Contact form submissions received"
    )
    .unwrap();
}

/// Renders all metrics in Prometheus text format
pub fn render_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer)
        .map_err(|e| prometheus::Error::Msg(format!("Failed to convert metrics to UTF-8: {}", e)))
}

/// Times one storage adapter call and counts it by outcome.
pub async fn track_store_operation<F, T>(
    backend: &str,
    operation: &str,
    target: &str,
    future: F,
) -> Result<T, anyhow::Error>
where
    F: std::future::Future<Output = Result<T, anyhow::Error>>,
{
    let start = std::time::Instant::now();
    let result = future.await;

    let status = if result.is_ok() { "success" } else { "error" };
    STORE_OPERATIONS_TOTAL
        .with_label_values(&[backend, operation, target, status])
        .inc();
    STORE_OPERATION_DURATION_SECONDS
        .with_label_values(&[backend, operation])
        .observe(start.elapsed().as_secs_f64());

    result
}

pub fn record_game_state_lookup(found: bool) {
    let result = if found { "hit" } else { "miss" };
    GAME_STATE_LOOKUPS_TOTAL.with_label_values(&[result]).inc();
}
