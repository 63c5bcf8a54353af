use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Failures of the emotion math itself, separate from provider failures so
/// callers can tell "bad input" apart from "vendor is down".
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EmotionError {
    /// All raw scores were zero; there is nothing to normalize against.
    #[error("emotion scores sum to zero, no usable signal")]
    ZeroSignal,

    /// Group aggregation over zero participants.
    #[error("cannot aggregate an empty group of emotion vectors")]
    EmptyGroup,
}

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("No face detected in the image")]
    NoFaceDetected,

    #[error("Emotion input error: {0}")]
    Emotion(#[from] EmotionError),

    #[error("{provider} unavailable: {reason}")]
    ProviderUnavailable { provider: &'static str, reason: String },

    #[error("Malformed recommendation response: {0}")]
    MalformedResponse(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn provider_unavailable(provider: &'static str, reason: impl Into<String>) -> Self {
        Self::ProviderUnavailable {
            provider,
            reason: reason.into(),
        }
    }

    pub fn malformed_response(reason: impl Into<String>) -> Self {
        Self::MalformedResponse(reason.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NoFaceDetected => (StatusCode::UNPROCESSABLE_ENTITY, self.to_string()),
            AppError::Emotion(_) | AppError::InvalidInput(_) => {
                (StatusCode::BAD_REQUEST, self.to_string())
            }
            AppError::ProviderUnavailable { .. }
            | AppError::MalformedResponse(_)
            | AppError::HttpClient(_) => (StatusCode::BAD_GATEWAY, self.to_string()),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
        };

        // Client contract: every failure carries a success flag and a
        // human-readable message.
        let body = Json(json!({
            "success": false,
            "error": message
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
