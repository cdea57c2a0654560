use crate::{
    CompletionRequest, CompletionResponse, EmbedResponse, EmbeddingProvider, LlmProvider,
    ProviderError,
};
use bytes::Bytes;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

const BACKOFF_BASE_MS: u64 = 500;
const MAX_BACKOFF_SHIFT: u32 = 6;

#[derive(Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub base_url: String,
    pub embedding_model: String,
    pub embedding_dimension: usize,
    pub embedding_max_chars: usize,
    pub chat_model: String,
    pub max_retries: u32,
    pub request_timeout_secs: u64,
}

#[derive(Clone)]
pub struct OpenAiProvider {
    client: Client,
    cfg: Arc<OpenAiConfig>,
}

impl OpenAiProvider {
    pub fn new(cfg: OpenAiConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(cfg.request_timeout_secs))
            .build()
            .map_err(|e| ProviderError::RequestFailed(e.to_string()))?;
        Ok(Self {
            client,
            cfg: Arc::new(cfg),
        })
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ProviderError>
    where
        B: serde::Serialize + Sync,
        T: serde::de::DeserializeOwned,
    {
        let mut attempt = 0u32;
        loop {
            match self.post_once(path, body).await {
                Ok(parsed) => return Ok(parsed),
                Err(err) if err.is_retryable() && attempt < self.cfg.max_retries => {
                    let delay = backoff_delay(attempt);
                    warn!(
                        "{} attempt {} failed: {}; retrying in {:?}",
                        path,
                        attempt + 1,
                        err,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn post_once<B, T>(&self, path: &str, body: &B) -> Result<T, ProviderError>
    where
        B: serde::Serialize + Sync,
        T: serde::de::DeserializeOwned,
    {
        let resp = self
            .client
            .post(format!("{}{}", self.cfg.base_url.trim_end_matches('/'), path))
            .bearer_auth(&self.cfg.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.bytes().await.unwrap_or(Bytes::from_static(b""));
            return Err(status_error(status, &body));
        }

        resp.json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))
    }

    fn transport_error(&self, err: reqwest::Error) -> ProviderError {
        if err.is_timeout() {
            ProviderError::Timeout(self.cfg.request_timeout_secs)
        } else {
            ProviderError::RequestFailed(err.to_string())
        }
    }
}

/// Doubles from the base per attempt, flat after `MAX_BACKOFF_SHIFT`.
fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_millis(BACKOFF_BASE_MS << attempt.min(MAX_BACKOFF_SHIFT))
}

/// Map a non-success HTTP status onto the provider error kinds.
pub fn status_error(status: StatusCode, body: &[u8]) -> ProviderError {
    let text = String::from_utf8_lossy(body).into_owned();
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ProviderError::InvalidCredentials(
            format!("status {} body {}", status, text),
        ),
        StatusCode::TOO_MANY_REQUESTS => {
            let lowered = text.to_lowercase();
            if lowered.contains("insufficient_quota") || lowered.contains("quota") {
                ProviderError::QuotaExceeded(text)
            } else {
                ProviderError::RateLimited(text)
            }
        }
        _ => ProviderError::RequestFailed(format!("status {} body {}", status, text)),
    }
}

#[derive(Deserialize)]
struct EmbeddingApiResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[async_trait::async_trait]
impl EmbeddingProvider for OpenAiProvider {
    async fn embed(&self, texts: &[String]) -> Result<EmbedResponse, ProviderError> {
        #[derive(serde::Serialize)]
        struct EmbedRequest<'a> {
            model: &'a str,
            input: &'a [String],
            dimensions: usize,
        }

        let body = EmbedRequest {
            model: &self.cfg.embedding_model,
            input: texts,
            dimensions: self.cfg.embedding_dimension,
        };

        let parsed: EmbeddingApiResponse = self.post_json("/v1/embeddings", &body).await?;
        if parsed.data.len() != texts.len() {
            return Err(ProviderError::InvalidResponse(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                parsed.data.len()
            )));
        }
        debug!("embedded {} texts with {}", texts.len(), self.cfg.embedding_model);

        Ok(EmbedResponse {
            vectors: parsed.data.into_iter().map(|d| d.embedding).collect(),
        })
    }

    fn dimension(&self) -> usize {
        self.cfg.embedding_dimension
    }

    fn max_input_chars(&self) -> usize {
        self.cfg.embedding_max_chars
    }

    fn name(&self) -> &str {
        "openai"
    }
}

#[async_trait::async_trait]
impl LlmProvider for OpenAiProvider {
    async fn complete(&self, req: &CompletionRequest) -> Result<CompletionResponse, ProviderError> {
        #[derive(serde::Serialize)]
        struct ChatMessage<'a> {
            role: &'static str,
            content: &'a str,
        }
        #[derive(serde::Serialize)]
        struct ResponseFormat {
            #[serde(rename = "type")]
            kind: &'static str,
        }
        #[derive(serde::Serialize)]
        struct ChatRequest<'a> {
            model: &'a str,
            messages: Vec<ChatMessage<'a>>,
            temperature: f32,
            #[serde(skip_serializing_if = "Option::is_none")]
            response_format: Option<ResponseFormat>,
        }
        #[derive(Deserialize)]
        struct Choice {
            message: ChatMessageResp,
        }
        #[derive(Deserialize)]
        struct ChatMessageResp {
            content: Option<String>,
        }
        #[derive(Deserialize)]
        struct ChatApiResponse {
            model: Option<String>,
            choices: Vec<Choice>,
        }

        let body = ChatRequest {
            model: &self.cfg.chat_model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &req.system,
                },
                ChatMessage {
                    role: "user",
                    content: &req.prompt,
                },
            ],
            temperature: 0.3,
            response_format: req.json_mode.then_some(ResponseFormat {
                kind: "json_object",
            }),
        };

        let parsed: ChatApiResponse = self.post_json("/v1/chat/completions", &body).await?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| ProviderError::InvalidResponse("no choices returned".into()))?;

        Ok(CompletionResponse {
            content,
            model: parsed.model,
        })
    }

    fn name(&self) -> &str {
        "openai"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_then_levels_off() {
        assert_eq!(backoff_delay(0), Duration::from_millis(500));
        assert_eq!(backoff_delay(1), Duration::from_millis(1000));
        assert_eq!(backoff_delay(6), Duration::from_millis(32_000));
        assert_eq!(backoff_delay(64), backoff_delay(6));
        assert_eq!(backoff_delay(u32::MAX), backoff_delay(6));
    }

    #[test]
    fn unauthorized_maps_to_invalid_credentials() {
        let err = status_error(StatusCode::UNAUTHORIZED, b"{\"error\":\"bad key\"}");
        assert!(matches!(err, ProviderError::InvalidCredentials(_)));
        let err = status_error(StatusCode::FORBIDDEN, b"");
        assert!(matches!(err, ProviderError::InvalidCredentials(_)));
    }

    #[test]
    fn too_many_requests_distinguishes_quota() {
        let quota = status_error(
            StatusCode::TOO_MANY_REQUESTS,
            b"{\"error\":{\"code\":\"insufficient_quota\"}}",
        );
        assert!(matches!(quota, ProviderError::QuotaExceeded(_)));
        let limited = status_error(StatusCode::TOO_MANY_REQUESTS, b"slow down");
        assert!(matches!(limited, ProviderError::RateLimited(_)));
    }

    #[test]
    fn server_errors_are_retryable_failures() {
        let err = status_error(StatusCode::BAD_GATEWAY, b"upstream");
        assert!(matches!(err, ProviderError::RequestFailed(_)));
        assert!(err.is_retryable());
    }
}
