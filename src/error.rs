use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Which upstream a failure came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upstream {
    Catalog,
    Generation,
}

impl std::fmt::Display for Upstream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Upstream::Catalog => write!(f, "Deezer"),
            Upstream::Generation => write!(f, "Gemini"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("{upstream} unavailable: {detail}")]
    UpstreamUnavailable { upstream: Upstream, detail: String },

    #[error("{0} rate limit reached")]
    RateLimited(Upstream),

    /// The server's own per-minute budget for an upstream ran out; no call
    /// was made.
    #[error("Local {0} quota exhausted")]
    QuotaExceeded(Upstream),

    #[error("Generation stopped early: {0}")]
    ExtractionIncomplete(String),

    #[error("Could not parse generated reply: {0}")]
    ExtractionUnparseable(String),

    #[error("AI features are not configured")]
    AiUnavailable,

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn upstream(upstream: Upstream, detail: impl Into<String>) -> Self {
        AppError::UpstreamUnavailable {
            upstream,
            detail: detail.into(),
        }
    }

    /// Maps a non-2xx upstream status onto the error taxonomy.
    pub fn from_status(upstream: Upstream, status: reqwest::StatusCode, body: &str) -> Self {
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return AppError::RateLimited(upstream);
        }

        AppError::upstream(
            upstream,
            format!("API returned status: {} - {}", status, truncate(body, 200)),
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::InvalidQuery(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::UpstreamUnavailable { upstream, ref detail } => {
                tracing::error!("{} upstream error: {}", upstream, detail);
                (
                    StatusCode::BAD_GATEWAY,
                    format!("Failed to reach {}. Please try again.", upstream),
                )
            }
            AppError::RateLimited(upstream) => {
                tracing::warn!("{} rate limit reached", upstream);
                (
                    StatusCode::TOO_MANY_REQUESTS,
                    "Rate limit reached. Please wait 30 seconds and try again.".to_string(),
                )
            }
            AppError::QuotaExceeded(upstream) => {
                tracing::warn!("Local {} quota exhausted, call refused", upstream);
                (
                    StatusCode::TOO_MANY_REQUESTS,
                    "Too many AI requests right now. Please wait a minute and try again."
                        .to_string(),
                )
            }
            AppError::ExtractionIncomplete(ref reason) => {
                tracing::warn!("Generation stopped early: {}", reason);
                (
                    StatusCode::BAD_GATEWAY,
                    "Response incomplete. Try again.".to_string(),
                )
            }
            AppError::ExtractionUnparseable(ref raw) => {
                tracing::warn!("Unparseable generation reply: {}", raw);
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "Could not identify a song from that input. Try something more specific."
                        .to_string(),
                )
            }
            AppError::AiUnavailable => (StatusCode::SERVICE_UNAVAILABLE, self.to_string()),
            AppError::Internal(ref e) => {
                tracing::error!("Internal error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

pub(crate) fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
