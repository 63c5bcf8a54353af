use std::sync::Arc;

use async_trait::async_trait;
use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::json;

use moodflix_api::api::{create_router, AppState};
use moodflix_api::error::{AppError, AppResult};
use moodflix_api::models::EmotionVector;
use moodflix_api::services::providers::{
    CompletionProvider, FaceAnalysisProvider, PosterProvider,
};
use moodflix_api::services::recommendation::PLACEHOLDER_POSTER;

// Stub providers

/// Face provider returning fixed raw scores, or NoFaceDetected when none.
struct StubFace {
    emotions: Option<EmotionVector>,
}

#[async_trait]
impl FaceAnalysisProvider for StubFace {
    async fn detect_emotions(&self, _image_base64: &str) -> AppResult<EmotionVector> {
        self.emotions.clone().ok_or(AppError::NoFaceDetected)
    }
}

/// Completion provider replaying a canned model response.
struct StubCompletion {
    body: String,
}

#[async_trait]
impl CompletionProvider for StubCompletion {
    async fn complete(&self, _prompt: &str) -> AppResult<String> {
        Ok(self.body.clone())
    }
}

/// Completion provider that is always down.
struct UnavailableCompletion;

#[async_trait]
impl CompletionProvider for UnavailableCompletion {
    async fn complete(&self, _prompt: &str) -> AppResult<String> {
        Err(AppError::provider_unavailable(
            "recommendation API",
            "status 503",
        ))
    }
}

/// Poster provider that resolves every title except an optional failing one.
struct StubPosters {
    fail_title: Option<String>,
}

#[async_trait]
impl PosterProvider for StubPosters {
    async fn poster_url(&self, title: &str) -> AppResult<Option<String>> {
        if self.fail_title.as_deref() == Some(title) {
            return Err(AppError::provider_unavailable("poster API", "status 500"));
        }
        Ok(Some(format!("https://posters.test/{}.jpg", title)))
    }
}

fn suggestion_json() -> String {
    r#"[
        {"title": "Amelie (2001)", "description": "A shy waitress changes lives",
         "matchReason": "Whimsical and warm", "streamingPlatforms": ["Netflix"]},
        {"title": "Up (2009)", "description": "A house flies to South America",
         "matchReason": "Joyful adventure", "streamingPlatforms": ["Disney+"]},
        {"title": "Paddington 2 (2017)", "description": "A bear spreads kindness",
         "matchReason": "Pure comfort", "streamingPlatforms": ["Netflix", "Hulu"]}
    ]"#
    .to_string()
}

fn happy_face() -> EmotionVector {
    EmotionVector {
        happiness: 80.0,
        neutral: 20.0,
        ..Default::default()
    }
}

fn create_test_server(
    face: StubFace,
    completion: impl CompletionProvider + 'static,
    posters: StubPosters,
) -> TestServer {
    let state = AppState::new(Arc::new(face), Arc::new(completion), Arc::new(posters));
    let app = create_router(state);
    TestServer::new(app).unwrap()
}

fn default_server() -> TestServer {
    create_test_server(
        StubFace {
            emotions: Some(happy_face()),
        },
        StubCompletion {
            body: suggestion_json(),
        },
        StubPosters { fail_title: None },
    )
}

#[tokio::test]
async fn test_health_check() {
    let server = default_server();
    let response = server.get("/health").await;
    response.assert_status_ok();
}

#[tokio::test]
async fn test_solo_flow_returns_three_movies_and_normalized_emotions() {
    let server = default_server();

    let response = server
        .post("/api/recommendations")
        .json(&json!({
            "image": "bW9vZGZsaXg=",
            "platforms": [],
            "previousMovies": []
        }))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], true);

    let movies = body["movies"].as_array().unwrap();
    assert_eq!(movies.len(), 3);
    assert_eq!(movies[0]["title"], "Amelie (2001)");
    assert_eq!(movies[0]["posterUrl"], "https://posters.test/Amelie.jpg");
    assert!(movies[0]["matchReason"].as_str().unwrap().len() > 0);

    // 80/20 raw scores come back normalized
    assert!((body["emotions"]["happiness"].as_f64().unwrap() - 0.8).abs() < 1e-9);
    assert!((body["emotions"]["neutral"].as_f64().unwrap() - 0.2).abs() < 1e-9);
}

#[tokio::test]
async fn test_group_flow_averages_participants() {
    let server = default_server();

    let response = server
        .post("/api/recommendations")
        .json(&json!({
            "groupEmotions": [
                {"happiness": 1.0},
                {"sadness": 1.0}
            ],
            "platforms": [],
            "previousMovies": []
        }))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], true);
    assert!((body["emotions"]["happiness"].as_f64().unwrap() - 0.5).abs() < 1e-9);
    assert!((body["emotions"]["sadness"].as_f64().unwrap() - 0.5).abs() < 1e-9);
    assert_eq!(body["emotions"]["anger"].as_f64().unwrap(), 0.0);
}

#[tokio::test]
async fn test_analyze_only_returns_emotions_without_movies() {
    let server = default_server();

    let response = server
        .post("/api/recommendations")
        .json(&json!({
            "image": "bW9vZGZsaXg=",
            "platforms": [],
            "previousMovies": [],
            "analyzeOnly": true
        }))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], true);
    assert!(body.get("movies").is_none());
    assert!((body["emotions"]["happiness"].as_f64().unwrap() - 0.8).abs() < 1e-9);
}

#[tokio::test]
async fn test_regenerate_with_prior_emotions_skips_face_provider() {
    // No face result available; the explicit vector must be used instead.
    let server = create_test_server(
        StubFace { emotions: None },
        StubCompletion {
            body: suggestion_json(),
        },
        StubPosters { fail_title: None },
    );

    let response = server
        .post("/api/recommendations")
        .json(&json!({
            "emotions": {"happiness": 0.6, "sadness": 0.4},
            "platforms": ["Netflix"],
            "previousMovies": ["Amelie (2001)"]
        }))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["movies"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_single_poster_failure_substitutes_placeholder_only_there() {
    let server = create_test_server(
        StubFace {
            emotions: Some(happy_face()),
        },
        StubCompletion {
            body: suggestion_json(),
        },
        StubPosters {
            fail_title: Some("Up".to_string()),
        },
    );

    let response = server
        .post("/api/recommendations")
        .json(&json!({
            "image": "bW9vZGZsaXg=",
            "platforms": [],
            "previousMovies": []
        }))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    let movies = body["movies"].as_array().unwrap();
    assert_eq!(movies.len(), 3);
    assert_eq!(movies[0]["posterUrl"], "https://posters.test/Amelie.jpg");
    assert_eq!(movies[1]["posterUrl"], PLACEHOLDER_POSTER);
    assert_eq!(
        movies[2]["posterUrl"],
        "https://posters.test/Paddington 2.jpg"
    );
}

#[tokio::test]
async fn test_fenced_model_output_parses_like_plain_output() {
    let fenced_server = create_test_server(
        StubFace {
            emotions: Some(happy_face()),
        },
        StubCompletion {
            body: format!("```json\n{}\n```", suggestion_json()),
        },
        StubPosters { fail_title: None },
    );

    let request = json!({
        "image": "bW9vZGZsaXg=",
        "platforms": [],
        "previousMovies": []
    });

    let fenced: serde_json::Value = fenced_server
        .post("/api/recommendations")
        .json(&request)
        .await
        .json();
    let plain: serde_json::Value = default_server()
        .post("/api/recommendations")
        .json(&request)
        .await
        .json();

    assert_eq!(fenced["movies"], plain["movies"]);
}

#[tokio::test]
async fn test_malformed_model_output_fails_with_bad_gateway() {
    let server = create_test_server(
        StubFace {
            emotions: Some(happy_face()),
        },
        StubCompletion {
            body: "Sorry, I cannot help with that.".to_string(),
        },
        StubPosters { fail_title: None },
    );

    let response = server
        .post("/api/recommendations")
        .json(&json!({
            "image": "bW9vZGZsaXg=",
            "platforms": [],
            "previousMovies": []
        }))
        .await;

    response.assert_status(StatusCode::BAD_GATEWAY);
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().len() > 0);
}

#[tokio::test]
async fn test_unavailable_completion_provider_propagates() {
    let server = create_test_server(
        StubFace {
            emotions: Some(happy_face()),
        },
        UnavailableCompletion,
        StubPosters { fail_title: None },
    );

    let response = server
        .post("/api/recommendations")
        .json(&json!({
            "image": "bW9vZGZsaXg=",
            "platforms": [],
            "previousMovies": []
        }))
        .await;

    response.assert_status(StatusCode::BAD_GATEWAY);
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_no_face_detected_is_unprocessable() {
    let server = create_test_server(
        StubFace { emotions: None },
        StubCompletion {
            body: suggestion_json(),
        },
        StubPosters { fail_title: None },
    );

    let response = server
        .post("/api/recommendations")
        .json(&json!({
            "image": "bW9vZGZsaXg=",
            "platforms": [],
            "previousMovies": []
        }))
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("face"));
}

#[tokio::test]
async fn test_missing_input_is_bad_request() {
    let server = default_server();

    let response = server
        .post("/api/recommendations")
        .json(&json!({
            "platforms": [],
            "previousMovies": []
        }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_empty_group_is_bad_request() {
    let server = default_server();

    let response = server
        .post("/api/recommendations")
        .json(&json!({
            "groupEmotions": [],
            "platforms": [],
            "previousMovies": []
        }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], false);
}
