use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::services::providers::{
    CompletionProvider, FaceAnalysisProvider, FacePlusPlusProvider, GeminiProvider, PosterProvider,
    TmdbProvider,
};
use crate::services::Recommender;

/// Shared application state
///
/// Holds only immutable provider handles; all per-request state lives in
/// the request itself and all session continuity lives in the browser.
#[derive(Clone)]
pub struct AppState {
    pub face: Arc<dyn FaceAnalysisProvider>,
    pub recommender: Arc<Recommender>,
}

impl AppState {
    /// Assembles state from explicit provider handles. Tests use this to
    /// inject stubs.
    pub fn new(
        face: Arc<dyn FaceAnalysisProvider>,
        completion: Arc<dyn CompletionProvider>,
        posters: Arc<dyn PosterProvider>,
    ) -> Self {
        Self {
            face,
            recommender: Arc::new(Recommender::new(completion, posters)),
        }
    }

    /// Builds the real vendor clients from configuration. All three share
    /// one HTTP client with the configured outbound timeout, so a hung
    /// vendor surfaces as that call's normal failure mode.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()?;

        let face = FacePlusPlusProvider::new(
            http_client.clone(),
            config.face_api_key.clone(),
            config.face_api_secret.clone(),
            config.face_api_url.clone(),
        );

        let completion = GeminiProvider::new(
            http_client.clone(),
            config.gemini_api_key.clone(),
            config.gemini_api_url.clone(),
            config.gemini_model.clone(),
        );

        let posters = TmdbProvider::new(
            http_client,
            config.tmdb_api_key.clone(),
            config.tmdb_api_url.clone(),
            config.tmdb_image_url.clone(),
        );

        Ok(Self::new(
            Arc::new(face),
            Arc::new(completion),
            Arc::new(posters),
        ))
    }
}
