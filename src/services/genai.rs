/// Client for the Gemini `generateContent` REST API. Treated as a black-box
/// `prompt -> text` function; callers decide how to parse the text and what
/// to fall back to when the call or the parse fails. No retries.
#[derive(Clone)]
pub struct CompletionClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl CompletionClient {
    pub fn new(http: reqwest::Client, base_url: String, api_key: String, model: String) -> Self {
        Self {
            http,
            base_url,
            api_key,
            model,
        }
    }

    pub async fn complete(&self, prompt: &str) -> Result<String, anyhow::Error> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );

        let response = self
            .http
            .post(&url)
            .header("content-type", "application/json")
            .json(&serde_json::json!({
                "contents": [{
                    "parts": [{ "text": prompt }]
                }],
                "generationConfig": {
                    "temperature": 1.0,
                    "topP": 0.95,
                    "topK": 40,
                    "maxOutputTokens": 8192
                }
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Gemini API error {}: {}", status, body);
        }

        let payload: serde_json::Value = response.json().await?;
        let text = payload["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .ok_or_else(|| anyhow::anyhow!("Gemini response missing candidate text"))?;

        Ok(text.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(server: &mockito::Server) -> CompletionClient {
        CompletionClient::new(
            reqwest::Client::new(),
            server.url(),
            "test-key".into(),
            "gemini-1.5-flash-8b".into(),
        )
    }

    #[tokio::test]
    async fn test_complete_extracts_candidate_text() {
        let mut server = mockito::Server::new_async().await;
        let body = serde_json::json!({
            "candidates": [{
                "content": { "parts": [{ "text": "  What made you smile today?\n" }] }
            }]
        });
        let mock = server
            .mock(
                "POST",
                "/v1beta/models/gemini-1.5-flash-8b:generateContent?key=test-key",
            )
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .create_async()
            .await;

        let text = client(&server).complete("give me a prompt").await.unwrap();
        assert_eq!(text, "What made you smile today?");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_complete_errors_on_missing_candidates() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock(
                "POST",
                "/v1beta/models/gemini-1.5-flash-8b:generateContent?key=test-key",
            )
            .with_status(200)
            .with_body(r#"{"candidates": []}"#)
            .create_async()
            .await;

        assert!(client(&server).complete("anything").await.is_err());
    }

    #[tokio::test]
    async fn test_complete_errors_on_http_failure() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock(
                "POST",
                "/v1beta/models/gemini-1.5-flash-8b:generateContent?key=test-key",
            )
            .with_status(429)
            .with_body("quota exceeded")
            .create_async()
            .await;

        assert!(client(&server).complete("anything").await.is_err());
    }
}
