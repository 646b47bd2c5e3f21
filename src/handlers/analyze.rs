use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::middleware::AuthUser;
use crate::error::{AppError, AppResult};
use crate::journal::emotions::{top_k, EmotionScore};
use crate::models::entry::MoodInput;
use crate::AppState;

const TOP_EMOTIONS: usize = 5;

/// Scores above this on more than two labels mean the text expresses
/// mixed feelings.
const COMPLEX_FEELINGS_THRESHOLD: f32 = 0.2;

#[derive(Debug, Deserialize, Validate)]
pub struct AnalyzeRequest {
    #[validate(length(min = 1, message = "Journal text must not be empty"))]
    pub text: String,
    pub mood: Option<MoodInput>,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    /// One score per label, canonical enumeration order.
    pub scores: Vec<EmotionScore>,
    pub top_emotions: Vec<EmotionScore>,
    pub dominant_emotion: String,
    pub complex_feelings: bool,
    pub response: String,
    pub source: String, // "gemini" or "fallback"
}

pub async fn analyze_entry(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<AnalyzeRequest>,
) -> AppResult<Json<AnalyzeResponse>> {
    body.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    if body.text.trim().is_empty() {
        return Err(AppError::Validation("Journal text must not be empty".into()));
    }

    let scores = state
        .emotions
        .classify(&body.text)
        .await
        .map_err(|e| AppError::Upstream(format!("Emotion analysis failed: {}", e)))?;

    let top_emotions = top_k(&scores, TOP_EMOTIONS);
    let dominant_emotion = top_emotions
        .first()
        .map(|s| s.label.clone())
        .unwrap_or_else(|| "neutral".into());
    let complex_feelings = scores
        .iter()
        .filter(|s| s.score > COMPLEX_FEELINGS_THRESHOLD)
        .count()
        > 2;

    let prompt = build_response_prompt(&body.text, &dominant_emotion, body.mood.as_ref());

    let (response, source) = match state.completions.complete(&prompt).await {
        Ok(text) => (text, "gemini".to_string()),
        Err(e) => {
            tracing::warn!(user_id = %auth_user.id, error = %e, "Completion API unavailable, using fallback response");
            (fallback_response(&dominant_emotion), "fallback".to_string())
        }
    };

    Ok(Json(AnalyzeResponse {
        scores,
        top_emotions,
        dominant_emotion,
        complex_feelings,
        response,
        source,
    }))
}

/// Tone instruction for the empathetic response, keyed on the mood the user
/// picked before journaling.
fn mood_tone(mood: &str) -> &'static str {
    match mood.to_ascii_lowercase().as_str() {
        "joyful" => "respond with matching enthusiasm and joy",
        "excited" => "respond with high energy and excitement",
        "peaceful" => "respond with calm and serene energy",
        "grateful" => "respond with warmth and appreciation",
        "inspired" => "respond with motivational and uplifting energy",
        "neutral" => "respond in a balanced and thoughtful way",
        "confused" => "respond with clarity and gentle guidance",
        "sad" => "respond with extra empathy and support",
        "frustrated" => "respond with understanding and constructive energy",
        "anxious" => "respond with calming and reassuring energy",
        _ => "respond supportively",
    }
}

fn build_response_prompt(text: &str, dominant_emotion: &str, mood: Option<&MoodInput>) -> String {
    let (mood_line, tone) = match mood {
        Some(m) => (
            format!(
                "- User's current mood: {} (intensity: {}/10)\n- Context: {}",
                m.mood,
                m.intensity,
                m.context.as_deref().unwrap_or("Not provided")
            ),
            mood_tone(&m.mood),
        ),
        None => ("- User's current mood: not stated".to_string(), "respond supportively"),
    };

    format!(
        "Given:\n{}\n- Journal entry: '{}'\n- Detected emotions: primarily {}\n\n\
         Provide a personalized, empathetic response that:\n\
         1. Acknowledges their current mood state\n\
         2. {}\n\
         3. Bridges between their mood and what they wrote\n\n\
         Keep it to 2-3 sentences and make it conversational.",
        mood_line, text, dominant_emotion, tone
    )
}

fn fallback_response(dominant_emotion: &str) -> String {
    format!(
        "Thank you for sharing this. Your words carry a strong sense of {} — \
         taking the time to write it down is already a meaningful step. \
         Be gentle with yourself today.",
        dominant_emotion
    )
}
