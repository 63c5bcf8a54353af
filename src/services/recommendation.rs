use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::{EmotionVector, MovieRecommendation, RecommendationRequest, SuggestedMovie},
    services::providers::{CompletionProvider, PosterProvider},
};

/// How many suggestions the model is asked for and the client receives.
pub const SUGGESTION_COUNT: usize = 3;

/// An emotion must hold strictly more than this share of the vector to be
/// named in the prompt.
pub const DOMINANT_EMOTION_THRESHOLD: f64 = 0.20;

/// Served to the client whenever poster lookup fails or finds nothing.
pub const PLACEHOLDER_POSTER: &str = "/placeholder-poster.png";

/// Turns an emotion vector into three poster-annotated movie
/// recommendations via the text-generation vendor.
pub struct Recommender {
    completion: Arc<dyn CompletionProvider>,
    posters: Arc<dyn PosterProvider>,
}

impl Recommender {
    pub fn new(completion: Arc<dyn CompletionProvider>, posters: Arc<dyn PosterProvider>) -> Self {
        Self {
            completion,
            posters,
        }
    }

    /// Runs the full pipeline: prompt, completion, validation, poster
    /// fan-out. Model failures are fatal; poster failures degrade to the
    /// placeholder per title.
    pub async fn recommend(
        &self,
        request: &RecommendationRequest,
    ) -> AppResult<Vec<MovieRecommendation>> {
        let prompt = build_prompt(request);
        let raw = self.completion.complete(&prompt).await?;
        let suggestions = parse_suggestions(&raw)?;

        tracing::info!(
            suggestions = suggestions.len(),
            excluded = request.excluded_titles.len(),
            "Movie suggestions parsed"
        );

        self.resolve_posters(suggestions).await
    }

    /// Looks up posters for all suggestions in parallel. Results are joined
    /// in suggestion order, so completion order never reorders the output.
    async fn resolve_posters(
        &self,
        suggestions: Vec<SuggestedMovie>,
    ) -> AppResult<Vec<MovieRecommendation>> {
        let mut tasks = Vec::with_capacity(suggestions.len());

        for suggestion in &suggestions {
            let posters = Arc::clone(&self.posters);
            let title = bare_title(&suggestion.title).to_string();
            tasks.push(tokio::spawn(
                async move { posters.poster_url(&title).await },
            ));
        }

        let mut movies = Vec::with_capacity(suggestions.len());
        for (suggestion, task) in suggestions.into_iter().zip(tasks) {
            let poster_url = match task.await {
                Ok(Ok(Some(url))) => url,
                Ok(Ok(None)) => {
                    tracing::debug!(title = %suggestion.title, "No poster found");
                    PLACEHOLDER_POSTER.to_string()
                }
                Ok(Err(e)) => {
                    tracing::warn!(title = %suggestion.title, error = %e, "Poster lookup failed");
                    PLACEHOLDER_POSTER.to_string()
                }
                Err(e) => {
                    tracing::warn!(title = %suggestion.title, error = %e, "Poster task failed");
                    PLACEHOLDER_POSTER.to_string()
                }
            };

            movies.push(MovieRecommendation {
                title: suggestion.title,
                description: suggestion.description,
                match_reason: suggestion.match_reason,
                poster_url,
                streaming_platforms: suggestion.streaming_platforms,
            });
        }

        Ok(movies)
    }
}

/// Formats the categories holding more than `DOMINANT_EMOTION_THRESHOLD`
/// of the vector, strongest first, as `"happiness: 62.5%, surprise: 21.0%"`.
/// Empty when nothing clears the threshold; the prompt then proceeds
/// without an emotion line and the model falls back to generic picks.
pub fn dominant_emotions(emotions: &EmotionVector) -> String {
    let mut dominant: Vec<_> = emotions
        .entries()
        .into_iter()
        .filter(|(_, value)| *value > DOMINANT_EMOTION_THRESHOLD)
        .collect();

    dominant.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    dominant
        .iter()
        .map(|(category, value)| format!("{}: {:.1}%", category, value * 100.0))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Builds the instruction sent to the text-generation vendor. The model is
/// told to emit a bare JSON array; anything else fails validation later.
fn build_prompt(request: &RecommendationRequest) -> String {
    let mood = dominant_emotions(&request.emotions);

    let mood_line = if mood.is_empty() {
        String::new()
    } else {
        format!("The viewer's detected emotional state is: {}.\n", mood)
    };

    let exclusions = if request.excluded_titles.is_empty() {
        String::new()
    } else {
        format!(
            "Do not suggest any of these movies, they were already shown: {}.\n",
            request.excluded_titles.join(", ")
        )
    };

    let platforms = if request.platforms.is_empty() {
        String::new()
    } else {
        format!(
            "Only recommend movies currently available on these streaming services: {}. \
             The streamingPlatforms field must only contain services from that list.\n",
            request.platforms.join(", ")
        )
    };

    format!(
        r#"You are a movie recommendation assistant. Suggest exactly {count} movies that fit the viewer's current mood.
{mood_line}{exclusions}{platforms}
Return ONLY a JSON array with no surrounding prose, markdown, or code fences. Each element must have exactly these fields:
[
  {{
    "title": "Movie Title (YYYY)",
    "description": "One or two sentence synopsis",
    "matchReason": "Why this movie fits the viewer's emotional state",
    "streamingPlatforms": ["Service name"]
  }}
]
The title field must include the release year in parentheses."#,
        count = SUGGESTION_COUNT,
        mood_line = mood_line,
        exclusions = exclusions,
        platforms = platforms,
    )
}

/// Strips the wrapping a text-generation model may add around its JSON
/// payload: markdown code fences and prose outside the outermost array.
/// Deliberately a named step of its own; it is the most brittle part of
/// the pipeline and the first thing to adjust when vendor output drifts.
pub fn sanitize_model_json(raw: &str) -> &str {
    let mut text = raw.trim();

    if let Some(stripped) = text.strip_prefix("```json") {
        text = stripped;
    } else if let Some(stripped) = text.strip_prefix("```") {
        text = stripped;
    }
    if let Some(stripped) = text.strip_suffix("```") {
        text = stripped;
    }
    let text = text.trim();

    match (text.find('['), text.rfind(']')) {
        (Some(start), Some(end)) if start < end => &text[start..=end],
        _ => text,
    }
}

/// Sanitizes and validates the model's output into at most
/// `SUGGESTION_COUNT` suggestions. A non-array, an empty array, or any
/// element missing a required field fails the whole response; there is no
/// partial acceptance and no retry.
fn parse_suggestions(raw: &str) -> AppResult<Vec<SuggestedMovie>> {
    let cleaned = sanitize_model_json(raw);

    let mut suggestions: Vec<SuggestedMovie> = serde_json::from_str(cleaned).map_err(|e| {
        AppError::malformed_response(format!("model output is not a valid suggestion array: {}", e))
    })?;

    if suggestions.is_empty() {
        return Err(AppError::malformed_response(
            "model returned an empty suggestion array",
        ));
    }

    suggestions.truncate(SUGGESTION_COUNT);
    Ok(suggestions)
}

/// Strips a trailing `" (YYYY)"` release-year suffix for poster lookups.
pub fn bare_title(title: &str) -> &str {
    let trimmed = title.trim();
    if let Some(open) = trimmed.rfind(" (") {
        let suffix = &trimmed[open + 2..];
        if let Some(year) = suffix.strip_suffix(')') {
            if year.len() == 4 && year.chars().all(|c| c.is_ascii_digit()) {
                return trimmed[..open].trim_end();
            }
        }
    }
    trimmed
}
