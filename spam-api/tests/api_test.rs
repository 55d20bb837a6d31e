//! Route tests for the classification service

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use spam_api::{router, AppState};
use spam_rs::spam::{
    FilterSettings, Label, NaiveBayesConfig, RawRecord, Sensitivity, SpamFilter, VectorizerConfig,
};
use spam_rs::ArtifactStore;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

fn trained_filter() -> SpamFilter {
    let records = [
        ("Congratulations you won a free lottery prize", Label::Spam),
        ("Claim your free cash prize now", Label::Spam),
        ("Free money waiting, click here", Label::Spam),
        ("Meeting tomorrow about the project schedule", Label::Ham),
        ("Please review the attached project documents", Label::Ham),
        ("Lunch meeting moved to Friday", Label::Ham),
    ]
    .into_iter()
    .map(|(text, label)| RawRecord {
        text: Some(text.to_string()),
        label,
    })
    .collect::<Vec<_>>();

    SpamFilter::fit(&records, VectorizerConfig::default(), NaiveBayesConfig::default()).unwrap()
}

fn app() -> Router {
    app_with(FilterSettings::default())
}

fn app_with(settings: FilterSettings) -> Router {
    router(Arc::new(AppState::new(trained_filter(), settings)))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn classify_request(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/spam/classify")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_classify_spam() {
    let app = app();
    let (status, body) = send(
        &app,
        classify_request(json!({
            "subject": "FREE PRIZE!!!",
            "text": "Claim your free lottery cash now",
            "sender": "winner@lottery.example"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["isSpam"], true);
    assert_eq!(body["label"], 1);
    assert!(body["confidence"].as_f64().unwrap() > 0.5);
}

#[tokio::test]
async fn test_classify_action_follows_filter_settings() {
    let message = json!({
        "subject": "FREE PRIZE!!!",
        "text": "Claim your free lottery cash now"
    });

    let (_, body) = send(&app(), classify_request(message.clone())).await;
    assert_eq!(body["isSpam"], true);
    assert_eq!(body["action"], "Quarantine");

    let strict = FilterSettings {
        sensitivity: Sensitivity::High,
        auto_delete: true,
        ..FilterSettings::default()
    };
    let (status, body) = send(&app_with(strict), classify_request(message.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["action"], "Delete");

    let lenient = FilterSettings {
        sensitivity: Sensitivity::Low,
        auto_delete: true,
        ..FilterSettings::default()
    };
    let (_, body) = send(&app_with(lenient), classify_request(message)).await;
    assert_eq!(body["isSpam"], true);
    assert_eq!(body["action"], "Deliver");
}

#[tokio::test]
async fn test_classify_ham() {
    let app = app();
    let (status, body) = send(
        &app,
        classify_request(json!({
            "subject": "Project meeting",
            "text": "Can we review the project documents before the meeting?"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["isSpam"], false);
    assert_eq!(body["action"], "Deliver");
}

#[tokio::test]
async fn test_classify_requires_text_or_subject() {
    let app = app();
    let (status, body) = send(&app, classify_request(json!({ "sender": "a@b.example" }))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Text or subject is required");
}

#[tokio::test]
async fn test_status_and_stats() {
    let app = app();

    let (status, body) = send(
        &app,
        Request::builder().uri("/api/spam/classify").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
    assert_eq!(body["modelLoaded"], true);
    assert!(body["vocabularySize"].as_u64().unwrap() > 0);

    send(&app, classify_request(json!({ "text": "free cash prize" }))).await;
    send(&app, classify_request(json!({ "text": "project meeting friday" }))).await;

    let (status, body) = send(
        &app,
        Request::builder().uri("/api/spam/stats").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalClassified"], 2);
    assert_eq!(body["spamDetected"], 1);
    assert_eq!(body["hamDetected"], 1);
}

#[tokio::test]
async fn test_serves_reloaded_artifacts() {
    let dir = TempDir::new().unwrap();
    let store = ArtifactStore::new(dir.path());
    let filter = trained_filter();
    filter.save(&store).unwrap();

    let reloaded = SpamFilter::load(&store).unwrap();
    let app = router(Arc::new(AppState::new(reloaded, FilterSettings::default())));

    let (status, body) = send(&app, classify_request(json!({ "text": "free lottery prize" }))).await;
    assert_eq!(status, StatusCode::OK);

    let expected = filter.predict(Some(" free lottery prize"));
    assert_eq!(body["confidence"].as_f64().unwrap(), expected.score);
}
