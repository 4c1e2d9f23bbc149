//! xAI Grok completion client.
//!
//! Implements the `CompletionBackend` trait against the xAI completions
//! endpoint. Handles request construction with a fixed seed, status
//! checking, and sanitization of the returned text.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::CompletionBackend;
use crate::config::LlmConfig;
use crate::error::BoxsightError;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Marker the model sometimes appends before trailing chatter. Everything
/// from the marker onward is dropped.
const SEPARATOR_TOKEN: &str = "<|separator|>";

/// Fixed seed so repeated samples of the same prompt stay comparable.
const COMPLETION_SEED: u64 = 42;

// ---------------------------------------------------------------------------
// API types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct CompletionRequest {
    model: String,
    prompt: String,
    temperature: f64,
    max_tokens: u32,
    seed: u64,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    #[serde(default)]
    text: String,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

pub struct XaiClient {
    http: Client,
    api_url: String,
    model: String,
    api_key: SecretString,
}

impl XaiClient {
    pub fn new(cfg: &LlmConfig, api_key: SecretString) -> Result<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(cfg.request_timeout_secs))
            .build()
            .context("Failed to build completion HTTP client")?;

        Ok(Self {
            http,
            api_url: cfg.api_url.clone(),
            model: cfg.model.clone(),
            api_key,
        })
    }

    /// Strip the separator marker and any trailing content after it,
    /// then trim surrounding whitespace.
    fn clean_response(raw: &str) -> String {
        raw.split(SEPARATOR_TOKEN)
            .next()
            .unwrap_or_default()
            .trim()
            .to_string()
    }
}

#[async_trait]
impl CompletionBackend for XaiClient {
    async fn complete(
        &self,
        prompt: &str,
        max_tokens: u32,
        temperature: f64,
    ) -> Result<String, BoxsightError> {
        let request = CompletionRequest {
            model: self.model.clone(),
            prompt: prompt.to_string(),
            temperature,
            max_tokens,
            seed: COMPLETION_SEED,
        };

        let response = self
            .http
            .post(&self.api_url)
            .bearer_auth(self.api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|e| BoxsightError::Transport(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(BoxsightError::Transport(format!("HTTP {status}: {detail}")));
        }

        let body: CompletionResponse = response
            .json()
            .await
            .map_err(|e| BoxsightError::Transport(format!("malformed response body: {e}")))?;

        let raw = body
            .choices
            .first()
            .map(|c| c.text.as_str())
            .unwrap_or_default();

        let cleaned = Self::clean_response(raw);
        if cleaned.is_empty() {
            return Err(BoxsightError::EmptyResponse);
        }

        debug!(model = %self.model, text = %cleaned, "Completion response");
        Ok(cleaned)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
