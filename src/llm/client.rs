//! Async LLM client for command compilation
//!
//! Model-agnostic HTTP client for calling the inference service.
//! Supports Anthropic, OpenAI-compatible (DeepSeek etc.) and local
//! Ollama generate APIs; the wire format is detected from the URL.
//! The client returns raw response text - tolerating sloppy JSON
//! framing is the extractor's job, not the transport's.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::core::error::{LabError, Result};

/// API format type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiFormat {
    Anthropic,
    OpenAI,
    Ollama,
}

/// Async LLM client for making API calls
pub struct LlmClient {
    client: Client,
    api_key: String,
    api_url: String,
    model: String,
    api_format: ApiFormat,
}

impl LlmClient {
    /// Create a new client with explicit configuration.
    ///
    /// `timeout` bounds each request end-to-end; a compilation-time
    /// timeout aborts the operator command.
    pub fn new(api_key: String, api_url: String, model: String, timeout: Duration) -> Result<Self> {
        let api_format = Self::detect_api_format(&api_url);
        if api_key.is_empty() && api_format != ApiFormat::Ollama {
            return Err(LabError::Llm(format!(
                "API key required for {:?} endpoint {}",
                api_format, api_url
            )));
        }
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LabError::Llm(e.to_string()))?;
        Ok(Self {
            client,
            api_key,
            api_url,
            model,
            api_format,
        })
    }

    /// Detect API format from URL
    fn detect_api_format(url: &str) -> ApiFormat {
        if url.contains("anthropic.com") {
            ApiFormat::Anthropic
        } else if url.contains("/api/generate") {
            ApiFormat::Ollama
        } else {
            // DeepSeek, OpenAI, and other compatible APIs use OpenAI format
            ApiFormat::OpenAI
        }
    }

    /// Create a client from environment variables
    ///
    /// Optional: LLM_API_URL (defaults to a local Ollama endpoint)
    /// Optional: LLM_MODEL (defaults to llama3.2)
    /// Optional: LLM_API_KEY (required only for hosted APIs)
    pub fn from_env(timeout: Duration) -> Result<Self> {
        let api_url = std::env::var("LLM_API_URL")
            .unwrap_or_else(|_| "http://localhost:11434/api/generate".into());
        let model = std::env::var("LLM_MODEL").unwrap_or_else(|_| "llama3.2".into());
        let api_key = std::env::var("LLM_API_KEY").unwrap_or_default();
        Self::new(api_key, api_url, model, timeout)
    }

    /// Send a completion request to the LLM
    ///
    /// # Arguments
    /// * `system` - System prompt with rules and the allowed tool set
    /// * `user` - Few-shot examples plus the operator's text
    ///
    /// # Returns
    /// The LLM's raw text response
    pub async fn complete(&self, system: &str, user: &str) -> Result<String> {
        match self.api_format {
            ApiFormat::Anthropic => self.complete_anthropic(system, user).await,
            ApiFormat::OpenAI => self.complete_openai(system, user).await,
            ApiFormat::Ollama => self.complete_ollama(system, user).await,
        }
    }

    async fn complete_anthropic(&self, system: &str, user: &str) -> Result<String> {
        let request = AnthropicRequest {
            model: self.model.clone(),
            max_tokens: 8192,
            system: system.into(),
            messages: vec![Message {
                role: "user".into(),
                content: user.into(),
            }],
        };

        let response = self
            .client
            .post(&self.api_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| LabError::Llm(e.to_string()))?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(LabError::Llm(format!("API error: {}", error_text)));
        }

        let completion: AnthropicResponse = response
            .json()
            .await
            .map_err(|e| LabError::Llm(e.to_string()))?;

        completion
            .content
            .first()
            .map(|c| c.text.clone())
            .ok_or_else(|| LabError::Llm("Empty response".into()))
    }

    async fn complete_openai(&self, system: &str, user: &str) -> Result<String> {
        let request = OpenAIRequest {
            model: self.model.clone(),
            max_tokens: 8192,
            messages: vec![
                Message {
                    role: "system".into(),
                    content: system.into(),
                },
                Message {
                    role: "user".into(),
                    content: user.into(),
                },
            ],
        };

        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| LabError::Llm(e.to_string()))?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(LabError::Llm(format!("API error: {}", error_text)));
        }

        let completion: OpenAIResponse = response
            .json()
            .await
            .map_err(|e| LabError::Llm(e.to_string()))?;

        completion
            .choices
            .first()
            .map(|c| c.message.content.clone())
            .ok_or_else(|| LabError::Llm("Empty response".into()))
    }

    async fn complete_ollama(&self, system: &str, user: &str) -> Result<String> {
        // Ollama has no separate system slot on the generate endpoint;
        // the prompt carries both parts.
        let request = OllamaRequest {
            model: self.model.clone(),
            prompt: format!("System: {}\n{}", system, user),
            stream: false,
            options: OllamaOptions {
                temperature: 0.0,
                num_ctx: 4096,
                format: "json".into(),
            },
        };

        let response = self
            .client
            .post(&self.api_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| LabError::Llm(e.to_string()))?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(LabError::Llm(format!("API error: {}", error_text)));
        }

        let completion: OllamaResponse = response
            .json()
            .await
            .map_err(|e| LabError::Llm(e.to_string()))?;

        Ok(completion.response.trim().to_string())
    }
}

// Anthropic API format
#[derive(Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    system: String,
    messages: Vec<Message>,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    text: String,
}

// OpenAI-compatible API format (DeepSeek, OpenAI, etc.)
#[derive(Serialize)]
struct OpenAIRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<Message>,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: String,
}

// Ollama generate API format
#[derive(Serialize)]
struct OllamaRequest {
    model: String,
    prompt: String,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Serialize)]
struct OllamaOptions {
    temperature: f32,
    num_ctx: u32,
    format: String,
}

#[derive(Deserialize)]
struct OllamaResponse {
    response: String,
}

// Shared
#[derive(Serialize)]
struct Message {
    role: String,
    content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_detection() {
        assert_eq!(
            LlmClient::detect_api_format("https://api.anthropic.com/v1/messages"),
            ApiFormat::Anthropic
        );
        assert_eq!(
            LlmClient::detect_api_format("http://localhost:11434/api/generate"),
            ApiFormat::Ollama
        );
        assert_eq!(
            LlmClient::detect_api_format("https://api.deepseek.com/chat/completions"),
            ApiFormat::OpenAI
        );
    }

    #[test]
    fn test_ollama_needs_no_key() {
        let client = LlmClient::new(
            String::new(),
            "http://localhost:11434/api/generate".into(),
            "llama3.2".into(),
            Duration::from_secs(60),
        );
        assert!(client.is_ok());
    }

    #[test]
    fn test_hosted_api_requires_key() {
        let client = LlmClient::new(
            String::new(),
            "https://api.anthropic.com/v1/messages".into(),
            "claude-3-haiku-20240307".into(),
            Duration::from_secs(60),
        );
        assert!(client.is_err());
    }
}
