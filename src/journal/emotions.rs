use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// The GoEmotions label set, in canonical model output order. The index of a
/// label here is its tie-break rank in `top_k`.
pub const EMOTION_LABELS: [&str; 28] = [
    "admiration",
    "amusement",
    "anger",
    "annoyance",
    "approval",
    "caring",
    "confusion",
    "curiosity",
    "desire",
    "disappointment",
    "disapproval",
    "disgust",
    "embarrassment",
    "excitement",
    "fear",
    "gratitude",
    "grief",
    "joy",
    "love",
    "nervousness",
    "optimism",
    "pride",
    "realization",
    "relief",
    "remorse",
    "sadness",
    "surprise",
    "neutral",
];

/// Canonical enumeration index of a label, or None for labels outside the set.
pub fn label_index(label: &str) -> Option<usize> {
    EMOTION_LABELS.iter().position(|l| *l == label)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionScore {
    pub label: String,
    pub score: f32,
}

/// The k highest-scoring emotions, descending by score. Ties are broken by
/// the label's canonical enumeration index (lower index wins), so identical
/// inputs always produce identical output.
pub fn top_k(scores: &[EmotionScore], k: usize) -> Vec<EmotionScore> {
    let mut ranked: Vec<&EmotionScore> = scores.iter().collect();
    ranked.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| {
                let ia = label_index(&a.label).unwrap_or(usize::MAX);
                let ib = label_index(&b.label).unwrap_or(usize::MAX);
                ia.cmp(&ib)
            })
    });
    ranked.into_iter().take(k).cloned().collect()
}
