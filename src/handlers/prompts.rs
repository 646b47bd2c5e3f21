use axum::{extract::State, Json};
use rand::seq::SliceRandom;
use serde::Serialize;

use crate::error::AppResult;
use crate::AppState;

/// Last-resort prompts when both the primary and the fallback completion
/// calls fail or return nothing parseable.
const DEFAULT_PROMPTS: [&str; 4] = [
    "What made you smile today?",
    "Describe a challenge you overcame recently?",
    "What are you grateful for right now?",
    "How are your emotions evolving today?",
];

const PROMPT_REQUEST: &str = "Generate a thought-provoking and introspective journaling prompt. \
    Make it personal, emotional, and engaging. Keep it to one sentence. \
    Examples: 'What made you smile today?' or 'Describe a moment that challenged your perspective recently.'";

const FALLBACK_LIST_REQUEST: &str = "Generate 4 short journaling prompts that are:\n\
    - Personal and reflective\n\
    - One sentence each\n\
    - End with question marks\n\
    Return them as a JSON array of strings, with no other text.";

#[derive(Debug, Serialize)]
pub struct PromptResponse {
    pub prompt: String,
    pub source: String, // "gemini", "gemini-fallback" or "default"
}

pub async fn random_prompt(State(state): State<AppState>) -> AppResult<Json<PromptResponse>> {
    match state.completions.complete(PROMPT_REQUEST).await {
        Ok(prompt) if !prompt.is_empty() => {
            return Ok(Json(PromptResponse {
                prompt,
                source: "gemini".into(),
            }));
        }
        Ok(_) => tracing::warn!("Completion API returned an empty prompt"),
        Err(e) => tracing::warn!(error = %e, "Prompt generation failed, trying fallback list"),
    }

    // Second chance: ask for a small list and parse it strictly. The response
    // is untrusted text; it is never evaluated, only parsed.
    let pool: Vec<String> = match state.completions.complete(FALLBACK_LIST_REQUEST).await {
        Ok(text) => parse_prompt_list(&text)
            .unwrap_or_else(|| DEFAULT_PROMPTS.iter().map(|p| (*p).to_string()).collect()),
        Err(e) => {
            tracing::warn!(error = %e, "Fallback prompt list failed, using defaults");
            DEFAULT_PROMPTS.iter().map(|p| (*p).to_string()).collect()
        }
    };

    let source = if pool.len() == DEFAULT_PROMPTS.len()
        && pool.iter().zip(DEFAULT_PROMPTS.iter()).all(|(a, b)| a == b)
    {
        "default"
    } else {
        "gemini-fallback"
    };

    let prompt = pool
        .choose(&mut rand::thread_rng())
        .cloned()
        .unwrap_or_else(|| DEFAULT_PROMPTS[0].to_string());

    Ok(Json(PromptResponse {
        prompt,
        source: source.into(),
    }))
}

/// Strictly parse a model response into a list of prompts. Accepts a JSON
/// string array (optionally fenced) or plain lines ending in a question mark.
/// Returns None when nothing usable is found.
pub fn parse_prompt_list(text: &str) -> Option<Vec<String>> {
    let cleaned = strip_code_fences(text);

    if let Ok(list) = serde_json::from_str::<Vec<String>>(cleaned) {
        let list: Vec<String> = list
            .into_iter()
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect();
        if !list.is_empty() {
            return Some(list);
        }
    }

    let lines: Vec<String> = cleaned
        .lines()
        .map(|l| l.trim_start_matches(['-', '*', ' ']).trim().to_string())
        .filter(|l| l.ends_with('?'))
        .collect();

    if lines.is_empty() {
        None
    } else {
        Some(lines)
    }
}

/// Strip a surrounding markdown code fence (``` or ```json) if present.
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_json_array() {
        let text = r#"["What made you smile today?", "What challenged you?"]"#;
        let list = parse_prompt_list(text).unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0], "What made you smile today?");
    }

    #[test]
    fn test_parse_fenced_json_array() {
        let text = "```json\n[\"What are you grateful for?\"]\n```";
        let list = parse_prompt_list(text).unwrap();
        assert_eq!(list, vec!["What are you grateful for?"]);
    }

    #[test]
    fn test_parse_bulleted_lines() {
        let text = "- What made you smile today?\n- Not a question\n- What scared you?";
        let list = parse_prompt_list(text).unwrap();
        assert_eq!(
            list,
            vec!["What made you smile today?", "What scared you?"]
        );
    }

    #[test]
    fn test_parse_garbage_returns_none() {
        assert!(parse_prompt_list("I cannot help with that.").is_none());
        assert!(parse_prompt_list("").is_none());
    }

    #[test]
    fn test_parse_never_executes_content() {
        // Code-shaped content is treated as plain text, not evaluated.
        let text = "['a', 'b'] + __import__('os').system('rm -rf /')";
        assert!(parse_prompt_list(text).is_none());
    }

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("```json\n[1]\n```"), "[1]");
        assert_eq!(strip_code_fences("```\n[1]\n```"), "[1]");
        assert_eq!(strip_code_fences("plain"), "plain");
    }
}
