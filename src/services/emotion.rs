use serde::Deserialize;

use crate::journal::emotions::{label_index, EmotionScore, EMOTION_LABELS};

/// Client for the hosted GoEmotions classifier (HF inference API shape).
/// The model is a black box: text in, a score per label out.
#[derive(Clone)]
pub struct EmotionClassifier {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct RawScore {
    label: String,
    score: f32,
}

impl EmotionClassifier {
    pub fn new(http: reqwest::Client, api_url: String, api_key: String) -> Self {
        Self {
            http,
            api_url,
            api_key,
        }
    }

    /// Classify `text`, returning one score per label in canonical
    /// enumeration order. Labels missing from the response score 0.
    pub async fn classify(&self, text: &str) -> Result<Vec<EmotionScore>, anyhow::Error> {
        let response = self
            .http
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({ "inputs": text }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Emotion API error {}: {}", status, body);
        }

        // The inference API wraps results one level deep per input:
        // [[{"label": "joy", "score": 0.9}, ...]]
        let raw: Vec<Vec<RawScore>> = response.json().await?;
        let scores = raw
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("Emotion API returned no results"))?;

        Ok(into_canonical_order(scores))
    }
}

fn into_canonical_order(raw: Vec<RawScore>) -> Vec<EmotionScore> {
    let mut ordered: Vec<EmotionScore> = EMOTION_LABELS
        .iter()
        .map(|label| EmotionScore {
            label: (*label).to_string(),
            score: 0.0,
        })
        .collect();

    for item in raw {
        match label_index(&item.label) {
            Some(idx) => ordered[idx].score = item.score,
            None => tracing::warn!(label = %item.label, "Unknown emotion label in response"),
        }
    }

    ordered
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_classify_maps_scores_onto_canonical_order() {
        let mut server = mockito::Server::new_async().await;
        let body = serde_json::json!([[
            {"label": "sadness", "score": 0.8},
            {"label": "joy", "score": 0.1},
            {"label": "neutral", "score": 0.05}
        ]]);
        let mock = server
            .mock("POST", "/")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .create_async()
            .await;

        let classifier =
            EmotionClassifier::new(reqwest::Client::new(), server.url(), String::new());
        let scores = classifier.classify("a rough day").await.unwrap();

        assert_eq!(scores.len(), 28);
        assert_eq!(scores[25].label, "sadness");
        assert!((scores[25].score - 0.8).abs() < f32::EPSILON);
        assert_eq!(scores[17].label, "joy");
        // Labels the model did not report score zero.
        assert_eq!(scores[2].label, "anger");
        assert_eq!(scores[2].score, 0.0);

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_classify_propagates_upstream_errors() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/")
            .with_status(503)
            .with_body("model loading")
            .create_async()
            .await;

        let classifier =
            EmotionClassifier::new(reqwest::Client::new(), server.url(), String::new());
        assert!(classifier.classify("anything").await.is_err());
    }

    #[test]
    fn test_unknown_labels_are_dropped() {
        let raw = vec![
            RawScore {
                label: "joy".into(),
                score: 0.5,
            },
            RawScore {
                label: "bogus".into(),
                score: 0.9,
            },
        ];
        let ordered = into_canonical_order(raw);
        assert_eq!(ordered.len(), 28);
        assert!((ordered[17].score - 0.5).abs() < f32::EPSILON);
        assert!(ordered.iter().all(|s| s.label != "bogus"));
    }
}
