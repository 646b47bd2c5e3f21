use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::handlers::prompts::strip_code_fences;
use crate::AppState;

/// Words per chunk when splitting the journal text for the prompt.
const CHUNK_SIZE: usize = 100;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationRequest {
    pub user_name: String,
    pub date_of_birth: String,
    #[validate(length(min = 1, message = "journalEntry must not be empty"))]
    pub journal_entry: String,
}

/// The six fixed recommendation categories. Unparseable model output yields
/// all-empty arrays rather than an error.
#[derive(Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Recommendations {
    #[serde(default)]
    pub journal_insights: Vec<String>,
    #[serde(default)]
    pub mental_wellbeing_insights: Vec<String>,
    #[serde(default)]
    pub nutritional_recommendations: Vec<String>,
    #[serde(default)]
    pub personal_insights: Vec<String>,
    #[serde(default)]
    pub personalized_exercises: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

pub async fn get_recommendations(
    State(state): State<AppState>,
    Json(body): Json<RecommendationRequest>,
) -> AppResult<Json<Recommendations>> {
    body.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let prompt = build_recommendation_prompt(&body.user_name, &body.date_of_birth, &body.journal_entry);

    let text = state
        .completions
        .complete(&prompt)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Recommendation generation failed");
            AppError::Upstream("Failed to get recommendations".into())
        })?;

    let recommendations = parse_recommendations(&text).unwrap_or_else(|| {
        tracing::warn!("Recommendation response was not valid JSON, returning empty lists");
        Recommendations::default()
    });

    Ok(Json(recommendations))
}

/// Split `text` into chunks of at most `chunk_size` words.
pub fn chunk_text(text: &str, chunk_size: usize) -> Vec<String> {
    let words: Vec<&str> = text.split_whitespace().collect();
    words
        .chunks(chunk_size.max(1))
        .map(|chunk| chunk.join(" "))
        .collect()
}

fn build_recommendation_prompt(user_name: &str, date_of_birth: &str, journal_entry: &str) -> String {
    let mut input = format!(
        "User Name: {}\nDate of Birth: {}\nJournal Entry Chunks:\n",
        user_name, date_of_birth
    );

    for (idx, chunk) in chunk_text(journal_entry, CHUNK_SIZE).iter().enumerate() {
        input.push_str(&format!("Chunk {}: {}\n", idx + 1, chunk));
    }

    input.push_str(
        "\nBased on the above information, provide personalized recommendations directly to the user. \
         Include nutritional advice, mindfulness exercises, and yoga recommendations. \
         Act as a virtual psychologist to help the user reflect on their day and suggest ways to improve their mood and well-being. \
         Return the recommendations in the following structured format:\n\
         {\n\
             \"journal_insights\": [],\n\
             \"mental_wellbeing_insights\": [],\n\
             \"nutritional_recommendations\": [],\n\
             \"personal_insights\": [],\n\
             \"personalized_exercises\": [],\n\
             \"recommendations\": []\n\
         }\n",
    );

    input
}

/// Strictly parse the completion output. Missing fields default to empty;
/// anything that is not a JSON object yields None.
pub fn parse_recommendations(text: &str) -> Option<Recommendations> {
    serde_json::from_str(strip_code_fences(text)).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_text_splits_on_word_count() {
        let text = (0..250).map(|i| i.to_string()).collect::<Vec<_>>().join(" ");
        let chunks = chunk_text(&text, 100);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].split_whitespace().count(), 100);
        assert_eq!(chunks[2].split_whitespace().count(), 50);
    }

    #[test]
    fn test_chunk_text_short_input() {
        assert_eq!(chunk_text("just a few words", 100).len(), 1);
        assert!(chunk_text("", 100).is_empty());
    }

    #[test]
    fn test_parse_full_response() {
        let text = r#"{
            "journal_insights": ["You wrote about gratitude."],
            "mental_wellbeing_insights": ["Consider a short walk."],
            "nutritional_recommendations": [],
            "personal_insights": [],
            "personalized_exercises": ["Sun salutation"],
            "recommendations": ["Keep journaling daily."]
        }"#;
        let recs = parse_recommendations(text).unwrap();
        assert_eq!(recs.journal_insights.len(), 1);
        assert_eq!(recs.personalized_exercises, vec!["Sun salutation"]);
        assert!(recs.nutritional_recommendations.is_empty());
    }

    #[test]
    fn test_parse_missing_fields_default_empty() {
        let recs = parse_recommendations(r#"{"recommendations": ["rest well"]}"#).unwrap();
        assert_eq!(recs.recommendations, vec!["rest well"]);
        assert!(recs.journal_insights.is_empty());
    }

    #[test]
    fn test_parse_fenced_json() {
        let text = "```json\n{\"recommendations\": [\"hydrate\"]}\n```";
        let recs = parse_recommendations(text).unwrap();
        assert_eq!(recs.recommendations, vec!["hydrate"]);
    }

    #[test]
    fn test_parse_non_json_is_none() {
        assert!(parse_recommendations("Here are some thoughts for you...").is_none());
    }

    #[test]
    fn test_prompt_numbers_chunks_from_one() {
        let entry = (0..150).map(|_| "word").collect::<Vec<_>>().join(" ");
        let prompt = build_recommendation_prompt("Ada", "1990-01-01", &entry);
        assert!(prompt.contains("User Name: Ada"));
        assert!(prompt.contains("Chunk 1:"));
        assert!(prompt.contains("Chunk 2:"));
        assert!(!prompt.contains("Chunk 3:"));
        assert!(prompt.contains("\"personalized_exercises\": []"));
    }
}
