/// Face++ detect API provider
///
/// Sends a form-encoded POST with credentials and a base64 image, asking
/// only for the `emotion` attribute. The scores come back as raw 0-100
/// confidences; normalization happens downstream.
use crate::{
    error::{AppError, AppResult},
    models::{EmotionVector, FaceDetectResponse},
    services::providers::FaceAnalysisProvider,
};
use reqwest::Client as HttpClient;

const PROVIDER_NAME: &str = "face analysis API";

#[derive(Clone)]
pub struct FacePlusPlusProvider {
    http_client: HttpClient,
    api_key: String,
    api_secret: String,
    api_url: String,
}

impl FacePlusPlusProvider {
    pub fn new(
        http_client: HttpClient,
        api_key: String,
        api_secret: String,
        api_url: String,
    ) -> Self {
        Self {
            http_client,
            api_key,
            api_secret,
            api_url,
        }
    }

    /// Pulls the first face's raw emotion scores out of a detect response.
    /// Zero faces is its own failure so the client can prompt a retake
    /// instead of blaming the vendor.
    fn extract_emotions(response: FaceDetectResponse) -> AppResult<EmotionVector> {
        response
            .into_primary_emotions()
            .ok_or(AppError::NoFaceDetected)
    }
}

#[async_trait::async_trait]
impl FaceAnalysisProvider for FacePlusPlusProvider {
    async fn detect_emotions(&self, image_base64: &str) -> AppResult<EmotionVector> {
        let response = self
            .http_client
            .post(&self.api_url)
            .form(&[
                ("api_key", self.api_key.as_str()),
                ("api_secret", self.api_secret.as_str()),
                ("image_base64", image_base64),
                ("return_attributes", "emotion"),
            ])
            .send()
            .await
            .map_err(|e| AppError::provider_unavailable(PROVIDER_NAME, e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::provider_unavailable(
                PROVIDER_NAME,
                format!("status {}: {}", status, body),
            ));
        }

        let detect: FaceDetectResponse = response
            .json()
            .await
            .map_err(|e| AppError::provider_unavailable(PROVIDER_NAME, e.to_string()))?;

        let emotions = Self::extract_emotions(detect)?;

        tracing::info!(provider = "face_plus_plus", "Face emotions detected");

        Ok(emotions)
    }
}
