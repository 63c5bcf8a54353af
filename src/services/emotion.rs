use crate::{
    error::EmotionError,
    models::{EmotionCategory, EmotionVector},
};

/// Scales raw per-category scores into a probability-like vector summing
/// to 1.
///
/// The face provider reports confidences on a 0-100 scale; downstream
/// prompt construction works on shares of the whole, so every value is
/// divided by the total. An all-zero input means the provider returned no
/// usable signal and is surfaced as an error rather than defaulted.
pub fn normalize(raw: &EmotionVector) -> Result<EmotionVector, EmotionError> {
    let total = raw.total();
    if total <= 0.0 {
        return Err(EmotionError::ZeroSignal);
    }

    let mut normalized = EmotionVector::default();
    for (category, value) in raw.entries() {
        normalized.set(category, value / total);
    }
    Ok(normalized)
}

/// Averages a group of emotion vectors into one, category by category.
///
/// The mean is re-normalized before returning, so participants may be
/// supplied either as normalized vectors or as raw provider scores. Order
/// of participants does not affect the result.
pub fn aggregate(vectors: &[EmotionVector]) -> Result<EmotionVector, EmotionError> {
    if vectors.is_empty() {
        return Err(EmotionError::EmptyGroup);
    }

    let count = vectors.len() as f64;
    let mut mean = EmotionVector::default();
    for category in EmotionCategory::ALL {
        let sum: f64 = vectors.iter().map(|v| v.get(category)).sum();
        mean.set(category, sum / count);
    }

    normalize(&mean)
}
