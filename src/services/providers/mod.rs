/// External vendor abstraction
///
/// One trait per vendor concern so handlers and the recommendation service
/// depend on behavior, not on a concrete HTTP client. Integration tests
/// swap in stubs; unit tests use the generated mocks.
use crate::{error::AppResult, models::EmotionVector};

pub mod face_plus_plus;
pub mod gemini;
pub mod tmdb;

pub use face_plus_plus::FacePlusPlusProvider;
pub use gemini::GeminiProvider;
pub use tmdb::TmdbProvider;

/// Face-analysis vendor: base64 selfie in, raw per-category emotion
/// scores out.
///
/// Implementations must distinguish "no face in the image" (the user can
/// retake the photo) from "vendor unreachable" (they cannot).
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait FaceAnalysisProvider: Send + Sync {
    async fn detect_emotions(&self, image_base64: &str) -> AppResult<EmotionVector>;
}

/// Text-generation vendor: prompt in, raw completion text out.
///
/// The returned text is not guaranteed to be clean JSON; callers own
/// sanitization and validation.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, prompt: &str) -> AppResult<String>;
}

/// Movie-database vendor: bare title in, poster URL out.
///
/// `Ok(None)` means the title had no poster; an `Err` means the lookup
/// itself failed. Callers treat both as non-fatal.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait PosterProvider: Send + Sync {
    async fn poster_url(&self, title: &str) -> AppResult<Option<String>>;
}
