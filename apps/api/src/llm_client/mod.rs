/// LLM Client — the single point of entry for all Ollama calls in Fair Hire.
///
/// ARCHITECTURAL RULE: No other module may talk to the Ollama HTTP API directly.
/// Text generation and embeddings both go through this module; the capability
/// traits (`Generator`, `Embedder`) wrap it so the pipeline can run against fakes.
///
/// Calls are never retried here. A generation call is bounded by the configured
/// timeout and fails with `LlmError::Timeout` instead of hanging.
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub mod prompts;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("cannot connect to Ollama at {host}")]
    Unreachable { host: String },

    #[error("Ollama did not respond within {seconds}s")]
    Timeout { seconds: u64 },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("LLM returned empty content")]
    EmptyContent,
}

/// Sampling options forwarded to the model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GenerationOptions {
    pub temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerationOptions,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
    #[serde(default)]
    prompt_eval_count: Option<u32>,
    #[serde(default)]
    eval_count: Option<u32>,
}

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

#[derive(Debug, Deserialize)]
struct OllamaError {
    error: String,
}

/// The single Ollama client shared by the generator and the embedder.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    host: String,
    timeout: Duration,
}

impl LlmClient {
    pub fn new(host: impl Into<String>, timeout: Duration) -> Result<Self, LlmError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            host: host.into().trim_end_matches('/').to_string(),
            timeout,
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Sends one non-streaming completion request and returns the raw text.
    pub async fn generate(
        &self,
        model: &str,
        prompt: &str,
        options: GenerationOptions,
    ) -> Result<String, LlmError> {
        let body = GenerateRequest {
            model,
            prompt,
            stream: false,
            options,
        };

        let response = self
            .client
            .post(format!("{}/api/generate", self.host))
            .json(&body)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let response = check_status(response).await?;
        let parsed: GenerateResponse = response.json().await.map_err(|e| self.classify(e))?;

        debug!(
            "Ollama generate succeeded: model={model}, prompt_tokens={:?}, output_tokens={:?}",
            parsed.prompt_eval_count, parsed.eval_count
        );

        if parsed.response.trim().is_empty() {
            return Err(LlmError::EmptyContent);
        }
        Ok(parsed.response)
    }

    /// Embeds a batch of texts, one vector per input, in input order.
    pub async fn embed(&self, model: &str, inputs: &[String]) -> Result<Vec<Vec<f32>>, LlmError> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }

        let response = self
            .client
            .post(format!("{}/api/embed", self.host))
            .json(&EmbedRequest {
                model,
                input: inputs,
            })
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let response = check_status(response).await?;
        let parsed: EmbedResponse = response.json().await.map_err(|e| self.classify(e))?;

        if parsed.embeddings.len() != inputs.len() {
            return Err(LlmError::Api {
                status: 200,
                message: format!(
                    "Ollama returned {} embeddings for {} inputs",
                    parsed.embeddings.len(),
                    inputs.len()
                ),
            });
        }
        Ok(parsed.embeddings)
    }

    /// Connection failures and timeouts get their own variants; the rest stay HTTP errors.
    fn classify(&self, err: reqwest::Error) -> LlmError {
        if err.is_connect() {
            LlmError::Unreachable {
                host: self.host.clone(),
            }
        } else if err.is_timeout() {
            LlmError::Timeout {
                seconds: self.timeout.as_secs(),
            }
        } else {
            LlmError::Http(err)
        }
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, LlmError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<OllamaError>(&body)
        .map(|e| e.error)
        .unwrap_or(body);
    Err(LlmError::Api {
        status: status.as_u16(),
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_request_omits_missing_top_p() {
        let body = GenerateRequest {
            model: "mistral",
            prompt: "Bonjour",
            stream: false,
            options: GenerationOptions {
                temperature: 0.1,
                top_p: None,
            },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["stream"], false);
        assert!(json["options"].get("top_p").is_none());
    }

    #[test]
    fn test_generate_request_includes_top_p_when_set() {
        let body = GenerateRequest {
            model: "mistral",
            prompt: "Bonjour",
            stream: false,
            options: GenerationOptions {
                temperature: 0.1,
                top_p: Some(0.9),
            },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert!(json["options"]["top_p"].is_number());
    }

    #[test]
    fn test_host_trailing_slash_is_trimmed() {
        let client = LlmClient::new("http://localhost:11434/", Duration::from_secs(5)).unwrap();
        assert_eq!(client.host(), "http://localhost:11434");
    }

    #[tokio::test]
    async fn test_generate_against_closed_port_is_unreachable() {
        let client = LlmClient::new("http://127.0.0.1:1", Duration::from_secs(5)).unwrap();
        let err = client
            .generate(
                "mistral",
                "test",
                GenerationOptions {
                    temperature: 0.1,
                    top_p: None,
                },
            )
            .await
            .unwrap_err();
        assert!(
            matches!(err, LlmError::Unreachable { .. }),
            "unexpected error: {err:?}"
        );
    }

    #[tokio::test]
    async fn test_embed_empty_batch_skips_network() {
        let client = LlmClient::new("http://127.0.0.1:1", Duration::from_secs(5)).unwrap();
        let vectors = client.embed("all-minilm", &[]).await.unwrap();
        assert!(vectors.is_empty());
    }
}
