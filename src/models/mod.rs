use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// The closed set of emotion categories reported by the face-analysis
/// provider. The recommendation pipeline only ever sees these seven.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmotionCategory {
    Anger,
    Disgust,
    Fear,
    Happiness,
    Neutral,
    Sadness,
    Surprise,
}

impl EmotionCategory {
    pub const ALL: [EmotionCategory; 7] = [
        EmotionCategory::Anger,
        EmotionCategory::Disgust,
        EmotionCategory::Fear,
        EmotionCategory::Happiness,
        EmotionCategory::Neutral,
        EmotionCategory::Sadness,
        EmotionCategory::Surprise,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EmotionCategory::Anger => "anger",
            EmotionCategory::Disgust => "disgust",
            EmotionCategory::Fear => "fear",
            EmotionCategory::Happiness => "happiness",
            EmotionCategory::Neutral => "neutral",
            EmotionCategory::Sadness => "sadness",
            EmotionCategory::Surprise => "surprise",
        }
    }
}

impl Display for EmotionCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-category emotion scores.
///
/// The same shape carries both raw provider confidences (0-100 magnitudes
/// from the face API) and normalized probabilities summing to 1. The JSON
/// representation matches the face provider's `emotion` attribute and the
/// client contract: `{"anger": 0.1, ..., "surprise": 0.0}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmotionVector {
    #[serde(default)]
    pub anger: f64,
    #[serde(default)]
    pub disgust: f64,
    #[serde(default)]
    pub fear: f64,
    #[serde(default)]
    pub happiness: f64,
    #[serde(default)]
    pub neutral: f64,
    #[serde(default)]
    pub sadness: f64,
    #[serde(default)]
    pub surprise: f64,
}

impl EmotionVector {
    pub fn get(&self, category: EmotionCategory) -> f64 {
        match category {
            EmotionCategory::Anger => self.anger,
            EmotionCategory::Disgust => self.disgust,
            EmotionCategory::Fear => self.fear,
            EmotionCategory::Happiness => self.happiness,
            EmotionCategory::Neutral => self.neutral,
            EmotionCategory::Sadness => self.sadness,
            EmotionCategory::Surprise => self.surprise,
        }
    }

    pub fn set(&mut self, category: EmotionCategory, value: f64) {
        match category {
            EmotionCategory::Anger => self.anger = value,
            EmotionCategory::Disgust => self.disgust = value,
            EmotionCategory::Fear => self.fear = value,
            EmotionCategory::Happiness => self.happiness = value,
            EmotionCategory::Neutral => self.neutral = value,
            EmotionCategory::Sadness => self.sadness = value,
            EmotionCategory::Surprise => self.surprise = value,
        }
    }

    /// Sum across all seven categories.
    pub fn total(&self) -> f64 {
        EmotionCategory::ALL.iter().map(|c| self.get(*c)).sum()
    }

    /// Category/value pairs in the fixed category order.
    pub fn entries(&self) -> [(EmotionCategory, f64); 7] {
        EmotionCategory::ALL.map(|c| (c, self.get(c)))
    }
}

/// A single recommendation returned to the client.
///
/// Constructed fresh per request and never mutated afterwards; the browser
/// session layer owns whatever history it wants to keep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieRecommendation {
    /// Title with the release year in a parenthetical suffix, e.g.
    /// "Amelie (2001)".
    pub title: String,
    pub description: String,
    /// Why this film matches the detected emotional state.
    pub match_reason: String,
    pub poster_url: String,
    pub streaming_platforms: Vec<String>,
}

/// Raw suggestion shape parsed out of the language model's JSON array,
/// before poster resolution. Every field is required: a suggestion missing
/// one is a schema violation and fails the whole response.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestedMovie {
    pub title: String,
    pub description: String,
    pub match_reason: String,
    pub streaming_platforms: Vec<String>,
}

/// Input to the recommendation pipeline, assembled by the handler from
/// request fields. The emotion vector is expected to be normalized.
#[derive(Debug, Clone)]
pub struct RecommendationRequest {
    pub emotions: EmotionVector,
    /// Titles already shown this session, to be excluded from the prompt.
    pub excluded_titles: Vec<String>,
    /// Allowed streaming platforms; empty means no filter.
    pub platforms: Vec<String>,
}

// ============================================================================
// Face API Types
// ============================================================================

/// Response body of the face provider's detect endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct FaceDetectResponse {
    #[serde(default)]
    pub faces: Vec<DetectedFace>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DetectedFace {
    pub attributes: FaceAttributes,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FaceAttributes {
    /// Raw confidence per category, 0-100. Not normalized.
    pub emotion: EmotionVector,
}

impl FaceDetectResponse {
    /// Raw emotion scores of the first detected face, if any.
    pub fn into_primary_emotions(self) -> Option<EmotionVector> {
        self.faces
            .into_iter()
            .next()
            .map(|face| face.attributes.emotion)
    }
}
