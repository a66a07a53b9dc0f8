use crate::errors::AppError;
use crate::models::ChatTurn;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

/// Completion settings for the site assistant.
const MAX_TOKENS: u32 = 500;
const TEMPERATURE: f32 = 0.7;

/// Client for an OpenAI-compatible chat-completion and embedding API.
#[derive(Clone)]
pub struct ChatModelClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    embedding_model: String,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

impl ChatModelClient {
    /// Creates a new `ChatModelClient`.
    ///
    /// # Arguments
    ///
    /// * `base_url` - API root, e.g. `https://api.openai.com/v1`.
    /// * `api_key` - Bearer key.
    /// * `model` - Chat-completion model.
    /// * `embedding_model` - Embedding model used for knowledge retrieval.
    pub fn new(
        base_url: String,
        api_key: String,
        model: String,
        embedding_model: String,
    ) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                AppError::ExternalApiError(format!("Failed to create chat model client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model,
            embedding_model,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Generates the assistant's reply.
    ///
    /// # Arguments
    ///
    /// * `system_prompt` - Instructions and retrieved context.
    /// * `history` - Prior turns, oldest first.
    /// * `message` - The visitor's new message.
    pub async fn complete(
        &self,
        system_prompt: &str,
        history: &[ChatTurn],
        message: &str,
    ) -> Result<String, AppError> {
        let url = format!("{}/chat/completions", self.base_url);

        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(json!({ "role": "system", "content": system_prompt }));
        for turn in history {
            messages.push(json!({ "role": turn.role, "content": turn.content }));
        }
        messages.push(json!({ "role": "user", "content": message }));

        let body = json!({
            "model": self.model,
            "messages": messages,
            "max_tokens": MAX_TOKENS,
            "temperature": TEMPERATURE,
        });

        tracing::debug!(
            "Requesting chat completion ({} history turns) from {}",
            history.len(),
            self.model
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::ExternalApiError(format!("Chat model request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::ExternalApiError(format!(
                "Chat model returned {}: {}",
                status, error_text
            )));
        }

        let completion: CompletionResponse = response.json().await.map_err(|e| {
            AppError::ExternalApiError(format!("Failed to parse chat model response: {}", e))
        })?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| AppError::ExternalApiError("Chat model returned no content".to_string()))
    }

    /// Embeds text for the knowledge-base similarity search.
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>, AppError> {
        let url = format!("{}/embeddings", self.base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&json!({
                "model": self.embedding_model,
                "input": text,
            }))
            .send()
            .await
            .map_err(|e| AppError::ExternalApiError(format!("Embedding request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::ExternalApiError(format!(
                "Embedding API returned {}: {}",
                status, error_text
            )));
        }

        let parsed: EmbeddingResponse = response.json().await.map_err(|e| {
            AppError::ExternalApiError(format!("Failed to parse embedding response: {}", e))
        })?;

        parsed
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| AppError::ExternalApiError("Embedding API returned no data".to_string()))
    }
}
