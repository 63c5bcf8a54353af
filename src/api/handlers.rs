use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::{
    error::{AppError, AppResult},
    models::{EmotionVector, MovieRecommendation, RecommendationRequest},
    services::emotion,
};

use super::AppState;

// Request/Response types

/// Body of `POST /api/recommendations`. Exactly one of `image`,
/// `emotions`, or `groupEmotions` selects the pipeline; the browser owns
/// all session continuity and passes it back in on every call.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendRequest {
    /// Base64-encoded selfie, sent to the face provider.
    pub image: Option<String>,
    /// A previously returned vector, passed back to regenerate without a
    /// new photo.
    pub emotions: Option<EmotionVector>,
    /// One vector per participant in group mode.
    pub group_emotions: Option<Vec<EmotionVector>>,
    #[serde(default)]
    pub platforms: Vec<String>,
    #[serde(default)]
    pub previous_movies: Vec<String>,
    /// When set, stop after emotion analysis (mid-group-capture step).
    #[serde(default)]
    pub analyze_only: bool,
}

#[derive(Debug, Serialize)]
pub struct RecommendResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub movies: Option<Vec<MovieRecommendation>>,
    pub emotions: EmotionVector,
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// The one orchestrating endpoint: resolve an emotion vector from the
/// request, then either return it (analyzeOnly) or turn it into three
/// recommendations.
pub async fn recommend(
    State(state): State<AppState>,
    Json(request): Json<RecommendRequest>,
) -> AppResult<Json<RecommendResponse>> {
    let emotions = resolve_emotions(&state, &request).await?;

    if request.analyze_only {
        return Ok(Json(RecommendResponse {
            success: true,
            movies: None,
            emotions,
        }));
    }

    let pipeline_request = RecommendationRequest {
        emotions: emotions.clone(),
        excluded_titles: request.previous_movies,
        platforms: request.platforms,
    };

    let movies = state.recommender.recommend(&pipeline_request).await?;

    Ok(Json(RecommendResponse {
        success: true,
        movies: Some(movies),
        emotions,
    }))
}

/// Input precedence: groupEmotions, then emotions, then image. A supplied
/// but empty group still goes through the aggregator so it fails with the
/// structured empty-group error rather than being silently reinterpreted.
async fn resolve_emotions(
    state: &AppState,
    request: &RecommendRequest,
) -> AppResult<EmotionVector> {
    if let Some(group) = &request.group_emotions {
        return Ok(emotion::aggregate(group)?);
    }

    if let Some(vector) = &request.emotions {
        // Re-normalizing a normalized vector is a no-op; a zero vector
        // becomes a structured failure instead of a nonsense prompt.
        return Ok(emotion::normalize(vector)?);
    }

    if let Some(image) = &request.image {
        let raw = state.face.detect_emotions(image).await?;
        return Ok(emotion::normalize(&raw)?);
    }

    Err(AppError::InvalidInput(
        "request must supply image, emotions, or groupEmotions".to_string(),
    ))
}
