use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::journal::emotions::EmotionScore;

/// One immutable unit of journal text plus its derived emotion scores.
/// Entries are append-only; there are no update or delete endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JournalEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub text: String,
    pub mood: Option<String>,
    pub mood_intensity: Option<i32>,
    pub mood_context: Option<String>,
    pub emotions: Json<Vec<EmotionScore>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateEntryRequest {
    #[validate(length(min = 1, message = "Journal text must not be empty"))]
    pub text: String,
    pub mood: Option<MoodInput>,
    /// Emotion scores from the most recent analysis, if the client ran one.
    #[serde(default)]
    pub emotions: Vec<EmotionScore>,
}

/// The mood the user picked before journaling, attached to the saved entry.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct MoodInput {
    pub mood: String,
    #[validate(range(min = 1, max = 10, message = "Intensity must be between 1 and 10"))]
    pub intensity: i32,
    pub context: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EntryQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}
