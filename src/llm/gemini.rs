use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{debug, info, warn};

use crate::analysis::parse::parse_analysis_text;
use crate::analysis::prompt::build_analysis_prompt;
use crate::analysis::{RawAnalysis, StyleAnalyzer};
use crate::config::Config;
use crate::llm::media::{fetch_image, truncate_for_log, FetchedImage};
use crate::utils::http::get_http_client;
use crate::utils::timing::log_llm_timing;

#[derive(Debug, Clone)]
pub struct GeminiSettings {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_output_tokens: i32,
    pub safety_settings: String,
    pub request_timeout: Option<Duration>,
}

impl GeminiSettings {
    pub fn from_config(config: &Config) -> Self {
        GeminiSettings {
            api_key: config.gemini_api_key.clone(),
            base_url: config.gemini_base_url.clone(),
            model: config.gemini_analysis_model.clone(),
            temperature: config.gemini_temperature,
            max_output_tokens: config.gemini_max_output_tokens,
            safety_settings: config.gemini_safety_settings.clone(),
            request_timeout: config.analysis_timeout(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiContent {
    parts: Option<Vec<GeminiPart>>,
}

#[derive(Debug, Deserialize)]
struct GeminiPart {
    text: Option<String>,
}

fn build_safety_settings(profile: &str) -> Vec<Value> {
    let threshold = match profile {
        "standard" => "BLOCK_MEDIUM_AND_ABOVE",
        "permissive" => "OFF",
        _ => {
            warn!(
                "Unknown GEMINI_SAFETY_SETTINGS value '{}', using permissive defaults.",
                profile
            );
            "OFF"
        }
    };

    vec![
        json!({ "category": "HARM_CATEGORY_HARASSMENT", "threshold": threshold }),
        json!({ "category": "HARM_CATEGORY_HATE_SPEECH", "threshold": threshold }),
        json!({ "category": "HARM_CATEGORY_SEXUALLY_EXPLICIT", "threshold": threshold }),
        json!({ "category": "HARM_CATEGORY_DANGEROUS_CONTENT", "threshold": threshold }),
    ]
}

fn summarize_gemini_parts(parts: &[Value]) -> Vec<Value> {
    parts
        .iter()
        .map(|part| {
            if let Some(text) = part.get("text").and_then(|value| value.as_str()) {
                json!({ "text": truncate_for_log(text, 200) })
            } else if let Some(inline_data) = part.get("inlineData") {
                let mime_type = inline_data
                    .get("mimeType")
                    .and_then(|value| value.as_str())
                    .unwrap_or("unknown");
                let data_len = inline_data
                    .get("data")
                    .and_then(|value| value.as_str())
                    .map(|value| value.len())
                    .unwrap_or(0);
                json!({ "inlineData": { "mimeType": mime_type, "dataLen": data_len } })
            } else {
                json!({ "unknownPart": true })
            }
        })
        .collect()
}

fn summarize_gemini_payload(payload: &Value) -> Value {
    let mut summary = Map::new();

    if let Some(contents) = payload.get("contents").and_then(|value| value.as_array()) {
        let summarized_contents = contents
            .iter()
            .map(|content| {
                let role = content
                    .get("role")
                    .and_then(|value| value.as_str())
                    .unwrap_or("user");
                let parts = content
                    .get("parts")
                    .and_then(|value| value.as_array())
                    .map(|parts| summarize_gemini_parts(parts))
                    .unwrap_or_default();
                json!({ "role": role, "parts": parts })
            })
            .collect();
        summary.insert("contents".to_string(), Value::Array(summarized_contents));
    }

    if let Some(config) = payload.get("generationConfig") {
        summary.insert("generationConfig".to_string(), config.clone());
    }

    if let Some(safety) = payload
        .get("safetySettings")
        .and_then(|value| value.as_array())
    {
        summary.insert("safetySettingsCount".to_string(), json!(safety.len()));
    }

    Value::Object(summary)
}

fn summarize_error_body(body: &str) -> (Option<String>, String) {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return (None, "empty response body".to_string());
    }

    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        let message = value
            .pointer("/error/message")
            .and_then(|v| v.as_str())
            .map(|v| v.to_string())
            .or_else(|| {
                value
                    .get("message")
                    .and_then(|v| v.as_str())
                    .map(|v| v.to_string())
            });
        return (message, truncate_for_log(&value.to_string(), 2000));
    }

    (None, truncate_for_log(trimmed, 2000))
}

fn extract_text_from_response(response: GeminiResponse) -> String {
    let mut text_parts = Vec::new();
    for candidate in response.candidates.unwrap_or_default() {
        let parts = candidate
            .content
            .and_then(|content| content.parts)
            .unwrap_or_default();
        for part in parts {
            if let Some(text) = part.text {
                if !text.trim().is_empty() {
                    text_parts.push(text);
                }
            }
        }
    }
    text_parts.join("\n")
}

pub struct GeminiStyleAnalyzer {
    settings: GeminiSettings,
}

impl GeminiStyleAnalyzer {
    pub fn new(settings: GeminiSettings) -> Self {
        GeminiStyleAnalyzer { settings }
    }

    fn redact_api_key(&self, text: &str) -> String {
        let key = self.settings.api_key.trim();
        if key.is_empty() {
            return text.to_string();
        }
        text.replace(key, "[redacted]")
    }

    fn build_payload(&self, prompt: &str, image: &FetchedImage) -> Value {
        let encoded = general_purpose::STANDARD.encode(&image.bytes);
        json!({
            "contents": [{
                "role": "user",
                "parts": [
                    { "text": prompt },
                    { "inlineData": { "mimeType": image.mime_type, "data": encoded } }
                ]
            }],
            "generationConfig": {
                "temperature": self.settings.temperature,
                "maxOutputTokens": self.settings.max_output_tokens,
            },
            "safetySettings": build_safety_settings(&self.settings.safety_settings),
        })
    }

    async fn call_gemini_api(&self, payload: Value) -> Result<GeminiResponse> {
        let model = &self.settings.model;
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.settings.base_url, model, self.settings.api_key
        );

        if tracing::enabled!(tracing::Level::DEBUG) {
            let payload_summary = summarize_gemini_payload(&payload);
            debug!(target: "llm.gemini", model = model.as_str(), payload = %payload_summary);
        }

        let mut request = get_http_client().post(&url).json(&payload);
        if let Some(timeout) = self.settings.request_timeout {
            request = request.timeout(timeout);
        }

        let response = request
            .send()
            .await
            .map_err(|err| {
                let err_text = self.redact_api_key(&err.to_string());
                warn!(
                    "Gemini request failed to send: {} (timeout={}, connect={})",
                    err_text,
                    err.is_timeout(),
                    err.is_connect()
                );
                anyhow!("Gemini request failed: {}", err_text)
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let (message, body_summary) = summarize_error_body(&body);
            warn!("Gemini API error: status={}, body={}", status, body_summary);
            let detail = message.unwrap_or(body_summary);
            return Err(anyhow!(
                "Gemini request failed with status {}: {}",
                status,
                detail
            ));
        }

        let value = response
            .json::<GeminiResponse>()
            .await
            .map_err(|err| anyhow!("Gemini response was not valid JSON: {}", err))?;
        Ok(value)
    }

    async fn request_analysis(&self, image_url: &str) -> Result<RawAnalysis> {
        let image = fetch_image(image_url).await?;
        let payload = self.build_payload(&build_analysis_prompt(), &image);
        let metadata = json!({ "mimeType": image.mime_type, "bytes": image.bytes.len() });

        let raw_output = log_llm_timing(
            "gemini",
            &self.settings.model,
            "analyze_reference",
            Some(metadata),
            || async {
                let response = self.call_gemini_api(payload).await?;
                Ok(extract_text_from_response(response))
            },
        )
        .await?;

        debug!(target: "llm.gemini", raw_output = %truncate_for_log(&raw_output, 1000));

        let fields = parse_analysis_text(&raw_output).ok_or_else(|| {
            anyhow!(
                "Model output is not a JSON object: {}",
                truncate_for_log(&raw_output, 300)
            )
        })?;

        Ok(RawAnalysis { fields, raw_output })
    }
}

#[async_trait]
impl StyleAnalyzer for GeminiStyleAnalyzer {
    async fn analyze(&self, image_url: &str) -> Option<RawAnalysis> {
        info!("Starting reference analysis for {}", image_url);
        match self.request_analysis(image_url).await {
            Ok(analysis) => Some(analysis),
            Err(err) => {
                warn!(
                    "Reference analysis unavailable for {}: {}",
                    image_url,
                    self.redact_api_key(&err.to_string())
                );
                None
            }
        }
    }
}
