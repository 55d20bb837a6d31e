//! spam-api - HTTP classification service
//!
//! Serves predictions from a trained spam-rs vectorizer/classifier pair.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use spam_rs::spam::{FilterSettings, SpamAction, SpamFilter};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::debug;

/// Shared, read-only model plus request counters
pub struct AppState {
    filter: SpamFilter,
    settings: FilterSettings,
    stats: ClassifyStats,
}

#[derive(Default)]
struct ClassifyStats {
    total: AtomicU64,
    spam: AtomicU64,
}

impl AppState {
    pub fn new(filter: SpamFilter, settings: FilterSettings) -> Self {
        Self {
            filter,
            settings,
            stats: ClassifyStats::default(),
        }
    }
}

/// Classify request
#[derive(Debug, Deserialize)]
pub struct ClassifyRequest {
    pub text: Option<String>,
    pub subject: Option<String>,
    pub sender: Option<String>,
}

/// Classify response
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifyResponse {
    pub is_spam: bool,
    /// Posterior probability of spam
    pub confidence: f64,
    pub label: u8,
    pub reason: String,
    pub action: SpamAction,
}

/// Model status response
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub status: String,
    pub model_loaded: bool,
    pub classifier_type: String,
    pub vocabulary_size: usize,
}

/// Counters since startup
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub total_classified: u64,
    pub spam_detected: u64,
    pub ham_detected: u64,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

/// API error type
pub enum ApiError {
    BadRequest(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(error) => {
                (StatusCode::BAD_REQUEST, Json(ErrorResponse { error })).into_response()
            }
        }
    }
}

/// Build the application router
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/spam/classify", get(status).post(classify))
        .route("/api/spam/stats", get(stats))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "OK"
}

/// Classify subject and body together
async fn classify(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ClassifyRequest>,
) -> Result<Json<ClassifyResponse>, ApiError> {
    let subject = req.subject.as_deref().unwrap_or("");
    let text = req.text.as_deref().unwrap_or("");
    if subject.trim().is_empty() && text.trim().is_empty() {
        return Err(ApiError::BadRequest("Text or subject is required".to_string()));
    }

    let prediction = state.filter.predict(Some(&format!("{} {}", subject, text)));
    let action = state.settings.decide(&prediction);

    state.stats.total.fetch_add(1, Ordering::Relaxed);
    if prediction.label.is_spam() {
        state.stats.spam.fetch_add(1, Ordering::Relaxed);
    }

    debug!(
        sender = req.sender.as_deref().unwrap_or("unknown"),
        label = %prediction.label,
        score = prediction.score,
        "Classified request"
    );

    let reason = if prediction.label.is_spam() {
        format!("Naive Bayes spam probability {:.2}", prediction.score)
    } else {
        "No spam indicators found".to_string()
    };

    Ok(Json(ClassifyResponse {
        is_spam: prediction.label.is_spam(),
        confidence: prediction.score,
        label: prediction.label.as_u8(),
        reason,
        action,
    }))
}

async fn status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "ready".to_string(),
        model_loaded: true,
        classifier_type: "multinomial_nb".to_string(),
        vocabulary_size: state.filter.vectorizer().vocabulary_size(),
    })
}

async fn stats(State(state): State<Arc<AppState>>) -> Json<StatsResponse> {
    let total = state.stats.total.load(Ordering::Relaxed);
    let spam = state.stats.spam.load(Ordering::Relaxed);
    Json(StatsResponse {
        total_classified: total,
        spam_detected: spam,
        ham_detected: total.saturating_sub(spam),
    })
}
