use crate::cancel::CancelToken;
use crate::harvest::LogHarvester;
use crate::rules::{RuleError, RuleStore};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Shared state for the query API
#[derive(Clone)]
pub struct AppState {
    pub harvester: Arc<LogHarvester>,
    pub rules: Arc<RuleStore>,
    pub request_timeout: Duration,
    pub hostname: String,
}

impl AppState {
    pub fn new(harvester: Arc<LogHarvester>, rules: Arc<RuleStore>, request_timeout: Duration) -> Self {
        let hostname = hostname::get()
            .ok()
            .and_then(|h| h.into_string().ok())
            .unwrap_or_else(|| "unknown".to_string());

        Self {
            harvester,
            rules,
            request_timeout,
            hostname,
        }
    }
}

// API response types
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub hostname: String,
    pub timestamp: String,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LogsResponse {
    pub logs: Vec<String>,
    pub count: usize,
    pub timestamp: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RulesResponse {
    pub rules: String,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
    pub message: String,
}

impl StatusResponse {
    fn success(message: &str) -> Json<Self> {
        Json(Self {
            status: "success".to_string(),
            message: message.to_string(),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct RemoveRuleQuery {
    #[serde(default)]
    pub id: Option<String>,
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        hostname: state.hostname.clone(),
        timestamp: Utc::now().to_rfc3339(),
        message: "wafagent is watching the firewall".to_string(),
    })
}

/// GET /logs
pub async fn list_logs(State(state): State<AppState>) -> Result<Json<LogsResponse>, ApiError> {
    let harvester = Arc::clone(&state.harvester);
    let logs = run_blocking(state.request_timeout, move |token| {
        harvester.collect_cancellable(&token)
    })
    .await?;

    tracing::info!(count = logs.len(), "Harvested new log lines");

    Ok(Json(LogsResponse {
        count: logs.len(),
        logs,
        timestamp: Utc::now().to_rfc3339(),
    }))
}

/// GET /rules
pub async fn get_rules(State(state): State<AppState>) -> Result<Json<RulesResponse>, ApiError> {
    let rules = Arc::clone(&state.rules);
    let content = run_blocking(state.request_timeout, move |_| rules.list()).await??;

    Ok(Json(RulesResponse {
        rules: content,
        message: "Custom rules retrieved".to_string(),
    }))
}

/// POST /rules with the raw rule text as the body
pub async fn add_rule(
    State(state): State<AppState>,
    body: String,
) -> Result<Json<StatusResponse>, ApiError> {
    if body.trim().is_empty() {
        return Err(ApiError::BadRequest("rule content is required".to_string()));
    }

    tracing::info!(bytes = body.len(), "Adding rule");
    let rules = Arc::clone(&state.rules);
    run_blocking(state.request_timeout, move |token| {
        token.commit().then(|| rules.append(&body))
    })
    .await?
    .ok_or(ApiError::Timeout)??;

    Ok(StatusResponse::success("Rule added"))
}

/// DELETE /rules?id=<id>
pub async fn remove_rule(
    State(state): State<AppState>,
    Query(query): Query<RemoveRuleQuery>,
) -> Result<Json<StatusResponse>, ApiError> {
    let id = match query.id {
        Some(id) if !id.trim().is_empty() => id,
        _ => return Err(ApiError::BadRequest("rule id is required".to_string())),
    };

    tracing::info!(rule_id = %id, "Removing rule");
    let rules = Arc::clone(&state.rules);
    run_blocking(state.request_timeout, move |token| {
        token.commit().then(|| rules.remove(&id))
    })
    .await?
    .ok_or(ApiError::Timeout)??;

    Ok(StatusResponse::success("Rule removed"))
}

/// DELETE /rules/all
pub async fn clear_rules(State(state): State<AppState>) -> Result<Json<StatusResponse>, ApiError> {
    tracing::info!("Clearing all custom rules");
    let rules = Arc::clone(&state.rules);
    run_blocking(state.request_timeout, move |token| {
        token.commit().then(|| rules.clear())
    })
    .await?
    .ok_or(ApiError::Timeout)??;

    Ok(StatusResponse::success("Custom rules cleared"))
}

pub async fn not_found() -> ApiError {
    ApiError::NotFound("endpoint not found".to_string())
}

/// Run filesystem work off the async executor, bounded by `timeout`.
///
/// `work` receives a [`CancelToken`] and must commit it before persisting
/// anything. On expiry the token is cancelled and the caller gets
/// [`ApiError::Timeout`]; if the work already committed, cancelling fails and
/// the result is awaited instead, so a change that was made is never reported
/// as a timeout.
async fn run_blocking<T, F>(timeout: Duration, work: F) -> Result<T, ApiError>
where
    F: FnOnce(CancelToken) -> T + Send + 'static,
    T: Send + 'static,
{
    let token = CancelToken::new();
    let worker_token = token.clone();
    let mut handle = tokio::task::spawn_blocking(move || work(worker_token));

    let joined = match tokio::time::timeout(timeout, &mut handle).await {
        Ok(joined) => joined,
        Err(_) if token.cancel() => return Err(ApiError::Timeout),
        Err(_) => {
            tracing::warn!("Deadline passed after work committed, waiting for it to finish");
            handle.await
        }
    };

    joined.map_err(|e| ApiError::InternalError(format!("worker task failed: {}", e)))
}

// Error handling
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    /// The firewall's rules directory could not be located.
    Unavailable(String),
    Timeout,
    InternalError(String),
}

impl From<RuleError> for ApiError {
    fn from(err: RuleError) -> Self {
        match err {
            RuleError::DirectoryNotFound { .. } => ApiError::Unavailable(err.to_string()),
            RuleError::NoRulesFile { .. } => ApiError::NotFound(err.to_string()),
            RuleError::Io { .. } => ApiError::InternalError(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
            ApiError::Timeout => (
                StatusCode::GATEWAY_TIMEOUT,
                "operation timed out".to_string(),
            ),
            ApiError::InternalError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        if status.is_server_error() {
            tracing::error!(status = %status, error = %message, "Request failed");
        }

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}
