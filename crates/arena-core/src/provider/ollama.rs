//! Adapter for an Ollama-style `POST /api/generate` endpoint.
//!
//! The generate API has no native tool calling, so the prompt instructs
//! the model to answer with a single `<tool_call>` block (see
//! [`super::wire`]). A completion that doesn't honor the contract is
//! still a successful call: it comes back as a [`ToolCall`] with no name,
//! and the engine applies its own taxonomy.

use std::future::Future;
use std::pin::Pin;
use std::time::Instant;

use anyhow::Context;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::engine::tools::ToolDescriptor;
use crate::models::{CallMetrics, GameState, ModelConfig, ToolCall};

use super::prompt::build_turn_prompt;
use super::wire::parse_tool_call;
use super::{LanguageModel, ProviderError};

const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:11434/api/generate";

#[derive(Debug, Clone)]
pub struct OllamaConfig {
    /// Full endpoint URL, e.g. `http://127.0.0.1:11434/api/generate`.
    pub endpoint: String,
    pub model: String,
}

#[derive(Serialize)]
struct OllamaRequest {
    model: String,
    prompt: String,
    stream: bool,
}

#[derive(Deserialize)]
struct OllamaResponse {
    response: String,
}

#[derive(Debug)]
pub struct OllamaModel {
    cfg: OllamaConfig,
    client: Client,
}

impl OllamaModel {
    pub fn new(model_config: &ModelConfig) -> anyhow::Result<Self> {
        let endpoint = model_config
            .settings
            .get("endpoint")
            .and_then(|v| v.as_str())
            .unwrap_or(DEFAULT_ENDPOINT)
            .to_string();
        Ok(Self {
            cfg: OllamaConfig {
                endpoint,
                model: model_config.model_name.clone(),
            },
            client: Client::new(),
        })
    }

    async fn complete(&self, prompt: String) -> anyhow::Result<String> {
        let request = OllamaRequest {
            model: self.cfg.model.clone(),
            prompt,
            stream: false,
        };

        let response = self
            .client
            .post(&self.cfg.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    anyhow::Error::from(ProviderError::Timeout).context(err)
                } else {
                    anyhow::Error::from(err)
                }
            })
            .context("ollama request failed")?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(anyhow::Error::from(ProviderError::RateLimited)
                .context("ollama returned 429"));
        }
        if !status.is_success() {
            return Err(anyhow::Error::from(ProviderError::Api {
                status: status.as_u16(),
            })
            .context(format!("ollama non-2xx response: {status}")));
        }

        let body = response
            .json::<OllamaResponse>()
            .await
            .context("ollama response decode failed")?;
        Ok(body.response)
    }
}

impl LanguageModel for OllamaModel {
    fn generate_response<'a>(
        &'a self,
        tools: &'a [ToolDescriptor],
        state: &'a GameState,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<ToolCall>> + Send + 'a>> {
        Box::pin(async move {
            let prompt = build_turn_prompt(state, tools);
            let started = Instant::now();
            let raw = self.complete(prompt).await?;
            let metrics = CallMetrics::from_latency(started.elapsed().as_secs_f64() * 1000.0);

            match parse_tool_call(&raw) {
                Ok((name, arguments)) => Ok(ToolCall {
                    raw_text: Some(raw),
                    name: Some(name),
                    arguments: Some(arguments),
                    metrics: Some(metrics),
                }),
                Err(err) => {
                    tracing::debug!(error = %err, "completion did not contain a usable tool call");
                    Ok(ToolCall {
                        raw_text: Some(raw),
                        name: None,
                        arguments: None,
                        metrics: Some(metrics),
                    })
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::JsonMap;

    fn model_config(settings: JsonMap) -> ModelConfig {
        ModelConfig {
            provider: "ollama".to_string(),
            model_name: "llama3".to_string(),
            settings,
            input_cost_per_1m_tokens: None,
            output_cost_per_1m_tokens: None,
        }
    }

    #[test]
    fn endpoint_defaults_when_unset() {
        let model = OllamaModel::new(&model_config(JsonMap::new())).expect("model");
        assert_eq!(model.cfg.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(model.cfg.model, "llama3");
    }

    #[test]
    fn endpoint_read_from_settings() {
        let mut settings = JsonMap::new();
        settings.insert(
            "endpoint".into(),
            "http://10.0.0.2:11434/api/generate".into(),
        );
        let model = OllamaModel::new(&model_config(settings)).expect("model");
        assert_eq!(model.cfg.endpoint, "http://10.0.0.2:11434/api/generate");
    }
}
