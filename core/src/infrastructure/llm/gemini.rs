// Copyright (c) 2026 Greenlight Contributors
// SPDX-License-Identifier: AGPL-3.0

// Gemini LLM Transport Adapter
//
// Anti-Corruption Layer for the Google Gemini generateContent REST API.
// The oracle implementations in `oracles.rs` sit on top of this client.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::oracle::OracleError;

pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";
const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// A non-responsive oracle must not stall a run indefinitely; timeouts
/// surface as transport errors.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    #[serde(rename = "responseMimeType")]
    response_mime_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Deserialize)]
struct GenerateResponse {
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Content,
}

impl GeminiClient {
    pub fn new(api_key: String) -> Self {
        Self::with_model(api_key, DEFAULT_MODEL.to_string())
    }

    pub fn with_model(api_key: String, model: String) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_default(),
            api_key,
            model,
            base_url: API_BASE.to_string(),
        }
    }

    /// Point the adapter at a different endpoint (used by tests against
    /// a mock server).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Ask the model for a JSON-mode completion and return the raw text
    /// of the first candidate. Each call is attempted exactly once.
    pub async fn generate_json(
        &self,
        prompt: &str,
        temperature: Option<f32>,
    ) -> Result<String, OracleError> {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                temperature,
            },
        };

        let url = format!("{}/{}:generateContent", self.base_url, self.model);
        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| OracleError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(OracleError::Transport(format!("HTTP {}: {}", status, body)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| OracleError::Transport(e.to_string()))?;

        let parsed: GenerateResponse =
            serde_json::from_str(&body).map_err(|_| OracleError::Protocol { raw: body.clone() })?;

        parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or(OracleError::Protocol { raw: body })
    }
}
