/// TMDB poster lookup provider
///
/// Searches `/search/movie` by bare title and joins the first result's
/// `poster_path` onto the configured image base URL. Returns `Ok(None)` on
/// no hit; the caller decides what a missing poster degrades to.
use crate::{
    error::{AppError, AppResult},
    services::providers::PosterProvider,
};
use reqwest::Client as HttpClient;
use serde::Deserialize;

const PROVIDER_NAME: &str = "poster API";

#[derive(Debug, Deserialize)]
struct TmdbSearchResponse {
    #[serde(default)]
    results: Vec<TmdbMovie>,
}

#[derive(Debug, Deserialize)]
struct TmdbMovie {
    #[serde(default)]
    poster_path: Option<String>,
}

#[derive(Clone)]
pub struct TmdbProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    image_url: String,
}

impl TmdbProvider {
    pub fn new(
        http_client: HttpClient,
        api_key: String,
        api_url: String,
        image_url: String,
    ) -> Self {
        Self {
            http_client,
            api_key,
            api_url,
            image_url,
        }
    }

    /// First result with a poster path, joined to the image base URL.
    fn poster_from_response(&self, response: TmdbSearchResponse) -> Option<String> {
        response
            .results
            .into_iter()
            .find_map(|movie| movie.poster_path)
            .map(|path| format!("{}{}", self.image_url, path))
    }
}

#[async_trait::async_trait]
impl PosterProvider for TmdbProvider {
    async fn poster_url(&self, title: &str) -> AppResult<Option<String>> {
        let url = format!("{}/search/movie", self.api_url);

        let response = self
            .http_client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str()), ("query", title)])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(AppError::provider_unavailable(
                PROVIDER_NAME,
                format!("status {}", status),
            ));
        }

        let search: TmdbSearchResponse = response.json().await?;
        let poster = self.poster_from_response(search);

        tracing::debug!(
            title = %title,
            found = poster.is_some(),
            provider = "tmdb",
            "Poster lookup completed"
        );

        Ok(poster)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_provider() -> TmdbProvider {
        TmdbProvider::new(
            reqwest::Client::new(),
            "test_key".to_string(),
            "http://test.local".to_string(),
            "https://image.tmdb.org/t/p/w500".to_string(),
        )
    }

    #[test]
    fn test_poster_from_response_joins_image_url() {
        let provider = create_test_provider();
        let search: TmdbSearchResponse = serde_json::from_str(
            r#"{"results": [{"poster_path": "/abc123.jpg"}, {"poster_path": "/other.jpg"}]}"#,
        )
        .unwrap();

        let poster = provider.poster_from_response(search);
        assert_eq!(
            poster,
            Some("https://image.tmdb.org/t/p/w500/abc123.jpg".to_string())
        );
    }

    #[test]
    fn test_poster_from_response_skips_null_paths() {
        let provider = create_test_provider();
        let search: TmdbSearchResponse = serde_json::from_str(
            r#"{"results": [{"poster_path": null}, {"poster_path": "/second.jpg"}]}"#,
        )
        .unwrap();

        let poster = provider.poster_from_response(search);
        assert_eq!(
            poster,
            Some("https://image.tmdb.org/t/p/w500/second.jpg".to_string())
        );
    }

    #[test]
    fn test_poster_from_response_empty_results() {
        let provider = create_test_provider();
        let search: TmdbSearchResponse = serde_json::from_str(r#"{"results": []}"#).unwrap();
        assert_eq!(provider.poster_from_response(search), None);
    }
}
