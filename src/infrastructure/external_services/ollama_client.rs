use async_trait::async_trait;
use reqwest::{Client, Error as ReqwestError};
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

use crate::application::ports::language_model::{GatewayError, LanguageModel};

#[derive(Debug, Clone)]
pub struct OllamaClientConfig {
    pub base_url: String,
    pub chat_model: String,
    pub embed_model: String,
    pub timeout_secs: u64,
}

impl Default for OllamaClientConfig {
    fn default() -> Self {
        Self {
            base_url: env::var("OLLAMA_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:11434".to_string()),
            chat_model: env::var("OLLAMA_CHAT_MODEL").unwrap_or_else(|_| "mistral".to_string()),
            embed_model: env::var("OLLAMA_EMBED_MODEL")
                .unwrap_or_else(|_| "nomic-embed-text".to_string()),
            timeout_secs: env::var("OLLAMA_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(120),
        }
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    system: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

#[derive(Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingsResponse {
    embedding: Vec<f32>,
}

/// Ollama-compatible backend for both generation and embeddings. No retry
/// loop here: every caller has a safe-default fallback and decides its own
/// policy.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    client: Client,
    config: OllamaClientConfig,
}

impl OllamaClient {
    pub fn new(config: OllamaClientConfig) -> Result<Self, ReqwestError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    pub fn from_env() -> Result<Self, ReqwestError> {
        Self::new(OllamaClientConfig::default())
    }

    async fn post_json<B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<reqwest::Response, GatewayError> {
        let url = format!("{}{}", self.config.base_url, path);

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| GatewayError::NetworkError(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::BackendError {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl LanguageModel for OllamaClient {
    async fn generate(&self, system: &str, user: &str) -> Result<String, GatewayError> {
        let request = GenerateRequest {
            model: &self.config.chat_model,
            prompt: user,
            system,
            stream: false,
        };

        let response = self.post_json("/api/generate", &request).await?;

        let data = response
            .json::<GenerateResponse>()
            .await
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;

        Ok(data.response)
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, GatewayError> {
        let request = EmbeddingsRequest {
            model: &self.config.embed_model,
            prompt: text,
        };

        let response = self.post_json("/api/embeddings", &request).await?;

        let data = response
            .json::<EmbeddingsResponse>()
            .await
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;

        Ok(data.embedding)
    }
}
