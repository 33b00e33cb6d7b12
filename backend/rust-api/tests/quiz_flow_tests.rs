use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

mod common;

use common::{get, post, settle};

fn page_submissions(page: u32) -> Vec<(&'static str, Value)> {
    match page {
        1 => vec![
            ("1-1", json!({ "type": "choice-quiz", "selectedOption": 1 })),
            ("1-2", json!({ "type": "ranking-puzzle", "order": [1, 0, 2, 3] })),
            ("1-3", json!({ "type": "arithmetic-quiz", "selectedOption": 1 })),
            (
                "1-4",
                json!({
                    "type": "pair-match",
                    "matches": {
                        "APR": "Annual Percentage Rate",
                        "401k": "Retirement savings plan",
                        "ROI": "Return on Investment",
                        "ETF": "Exchange Traded Fund"
                    }
                }),
            ),
        ],
        2 => vec![
            ("2-1", json!({ "type": "letter-assembly", "letters": [0, 1, 2, 3, 4, 5, 6, 7, 8] })),
            ("2-2", json!({ "type": "choice-quiz", "selectedOption": 3 })),
            ("2-3", json!({ "type": "ranking-puzzle", "order": [0, 1, 2, 3] })),
            ("2-4", json!({ "type": "arithmetic-quiz", "selectedOption": 1 })),
        ],
        _ => vec![
            (
                "3-1",
                json!({
                    "type": "pair-match",
                    "matches": {
                        "Stocks": "High risk, high reward",
                        "Bonds": "Low risk, steady income",
                        "Mutual Funds": "Professionally managed",
                        "Index Funds": "Tracks market index"
                    }
                }),
            ),
            ("3-2", json!({ "type": "letter-assembly", "letters": [0, 1, 2, 3, 4, 5] })),
            ("3-3", json!({ "type": "ranking-puzzle", "order": [1, 0, 2, 3] })),
            ("3-4", json!({ "type": "choice-quiz", "selectedOption": 1 })),
        ],
    }
}

async fn play_page(app: &Router, client: &str, page: u32) {
    let view = get(app, &format!("/api/v1/quiz/{}/pages/{}", client, page)).await;
    assert_eq!(view.status, StatusCode::OK, "enter page {}: {}", page, view.body);
    assert_eq!(view.body["tasks"][0]["status"], "current");

    for (task_id, submission) in page_submissions(page) {
        let response = post(
            app,
            &format!("/api/v1/quiz/{}/pages/{}/tasks/{}/answers", client, page, task_id),
            Some(submission),
        )
        .await;
        assert_eq!(response.status, StatusCode::OK, "{}: {}", task_id, response.body);
        assert_eq!(response.body["accepted"], true, "{}: {}", task_id, response.body);
        settle().await;
    }
}

#[tokio::test]
async fn test_catalog_lists_three_pages_without_answer_keys() {
    let app = common::create_test_app().await;

    let response = get(&app, "/api/v1/quiz/catalog").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["totalPages"], 3);

    let pages = response.body["pages"].as_array().unwrap();
    assert_eq!(pages.len(), 3);
    for page in pages {
        assert_eq!(page["tasks"].as_array().unwrap().len(), 4);
    }
    let text = response.body.to_string();
    assert!(!text.contains("correctAnswer"));
    assert!(!text.contains("correct_answer"));
}

#[tokio::test]
async fn test_new_client_starts_idle() {
    let app = common::create_test_app().await;

    let response = get(&app, "/api/v1/quiz/fresh/state").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["currentPage"], 0);
    assert_eq!(response.body["isCompleted"], false);
    assert_eq!(response.body["answers"], json!([]));
}

#[tokio::test]
async fn test_start_assigns_session_id() {
    let app = common::create_test_app().await;

    let response = post(&app, "/api/v1/quiz/starter/start", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["currentPage"], 1);
    let session_id = response.body["sessionId"].as_str().unwrap();
    assert!(session_id.len() > 9, "{}", session_id);
    assert!(session_id
        .chars()
        .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
}

#[tokio::test]
async fn test_invalid_client_id_is_rejected() {
    let app = common::create_test_app().await;

    let response = post(&app, "/api/v1/quiz/bad.id/start", None).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["status"], 400);
}

#[tokio::test(start_paused = true)]
async fn test_full_game_reaches_score() {
    let app = common::create_test_app().await;
    let client = "full-run";

    post(&app, &format!("/api/v1/quiz/{}/start", client), None).await;

    for page in 1..=2 {
        play_page(&app, client, page).await;
        let next = post(&app, &format!("/api/v1/quiz/{}/pages/{}/next", client, page), None).await;
        assert_eq!(next.status, StatusCode::OK, "{}", next.body);
        assert_eq!(next.body["route"], format!("/quiz/{}", page + 1));
    }

    play_page(&app, client, 3).await;
    let finish = post(&app, &format!("/api/v1/quiz/{}/pages/3/next", client), None).await;
    assert_eq!(finish.status, StatusCode::OK, "{}", finish.body);
    assert_eq!(finish.body["route"], "/score");
    let score = finish.body["score"].as_str().unwrap().to_string();

    let state = get(&app, &format!("/api/v1/quiz/{}/state", client)).await;
    assert_eq!(state.body["isCompleted"], true);
    assert_eq!(state.body["score"], score.as_str());
    assert_eq!(state.body["answers"].as_array().unwrap().len(), 12);
    assert_eq!(state.body["answers"][4]["taskId"], "2-1");
    assert_eq!(state.body["answers"][4]["answer"]["word"], "DIVERSIFY");

    let view = get(&app, &format!("/api/v1/quiz/{}/score", client)).await;
    assert_eq!(view.status, StatusCode::OK);
    assert_eq!(view.body["score"], score.as_str());
    assert!(view.body["shareText"]
        .as_str()
        .unwrap()
        .starts_with(&format!("I just scored {} on the Finance Challenge!", score)));
}

#[tokio::test(start_paused = true)]
async fn test_submissions_are_gated_in_order() {
    let app = common::create_test_app().await;
    post(&app, "/api/v1/quiz/gated/start", None).await;
    get(&app, "/api/v1/quiz/gated/pages/1").await;

    let locked = post(
        &app,
        "/api/v1/quiz/gated/pages/1/tasks/1-2/answers",
        Some(json!({ "type": "ranking-puzzle", "order": [1, 0, 2, 3] })),
    )
    .await;
    assert_eq!(locked.status, StatusCode::OK);
    assert_eq!(locked.body["accepted"], false);
    assert_eq!(locked.body["ignoredReason"], "locked");

    let first = post(
        &app,
        "/api/v1/quiz/gated/pages/1/tasks/1-1/answers",
        Some(json!({ "type": "choice-quiz", "selectedOption": 0 })),
    )
    .await;
    assert_eq!(first.body["accepted"], true);
    assert_eq!(first.body["answer"]["isCorrect"], false);
    assert_eq!(first.body["tasks"][0]["status"], "waiting");

    let repeat = post(
        &app,
        "/api/v1/quiz/gated/pages/1/tasks/1-1/answers",
        Some(json!({ "type": "choice-quiz", "selectedOption": 1 })),
    )
    .await;
    assert_eq!(repeat.body["accepted"], false);
    assert_eq!(repeat.body["ignoredReason"], "already-answered");

    settle().await;
    let view = get(&app, "/api/v1/quiz/gated/pages/1").await;
    assert_eq!(view.body["tasks"][0]["status"], "completed");
    assert_eq!(view.body["tasks"][1]["status"], "current");
    assert_eq!(view.body["completedCount"], 1);
}

#[tokio::test(start_paused = true)]
async fn test_wrong_submission_shape_is_bad_request() {
    let app = common::create_test_app().await;
    post(&app, "/api/v1/quiz/shape/start", None).await;
    get(&app, "/api/v1/quiz/shape/pages/1").await;

    let response = post(
        &app,
        "/api/v1/quiz/shape/pages/1/tasks/1-1/answers",
        Some(json!({ "type": "letter-assembly", "letters": [0] })),
    )
    .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let malformed = post(
        &app,
        "/api/v1/quiz/shape/pages/1/tasks/1-1/answers",
        Some(json!({ "type": "telepathy" })),
    )
    .await;
    assert_eq!(malformed.status, StatusCode::BAD_REQUEST);
}

#[tokio::test(start_paused = true)]
async fn test_resubmitted_match_is_ignored_not_rejected() {
    let app = common::create_test_app().await;
    post(&app, "/api/v1/quiz/again/start", None).await;
    play_page(&app, "again", 1).await;

    let (task_id, submission) = page_submissions(1).remove(3);
    let response = post(
        &app,
        &format!("/api/v1/quiz/again/pages/1/tasks/{}/answers", task_id),
        Some(submission),
    )
    .await;
    assert_eq!(response.status, StatusCode::OK, "{}", response.body);
    assert_eq!(response.body["accepted"], false);
    assert_eq!(response.body["ignoredReason"], "already-answered");
    assert_eq!(response.body["tasks"][3]["status"], "completed");
}

#[tokio::test(start_paused = true)]
async fn test_adblock_report_disables_answers() {
    let app = common::create_test_app().await;
    post(&app, "/api/v1/quiz/blocked/start", None).await;

    let report = post(
        &app,
        "/api/v1/quiz/blocked/adblock",
        Some(json!({ "detected": true })),
    )
    .await;
    assert_eq!(report.status, StatusCode::OK);
    assert_eq!(report.body["hasAdblock"], true);

    let view = get(&app, "/api/v1/quiz/blocked/pages/1").await;
    assert_eq!(view.body["hasAdblock"], true);

    let response = post(
        &app,
        "/api/v1/quiz/blocked/pages/1/tasks/1-1/answers",
        Some(json!({ "type": "choice-quiz", "selectedOption": 1 })),
    )
    .await;
    assert_eq!(response.body["accepted"], false);
    assert_eq!(response.body["ignoredReason"], "disabled");
}

#[tokio::test(start_paused = true)]
async fn test_stream_reports_task_waiting() {
    let app = common::create_test_app().await;
    post(&app, "/api/v1/quiz/watcher/start", None).await;
    get(&app, "/api/v1/quiz/watcher/pages/1").await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/v1/quiz/watcher/stream")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"].to_str().unwrap(),
        "text/event-stream"
    );

    post(
        &app,
        "/api/v1/quiz/watcher/pages/1/tasks/1-1/answers",
        Some(json!({ "type": "choice-quiz", "selectedOption": 1 })),
    )
    .await;

    let mut body = response.into_body();
    let frame = body.frame().await.unwrap().unwrap();
    let text = String::from_utf8(frame.into_data().unwrap().to_vec()).unwrap();
    assert!(text.contains("event: task-waiting"), "{}", text);
    assert!(text.contains("1-1"), "{}", text);
}
