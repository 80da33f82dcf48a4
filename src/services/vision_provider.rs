// src/services/vision_provider.rs
use crate::config::ProviderConfig;
use crate::errors::AnalysisError;
use crate::models::EncodedImagePayload;
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde_json::{Value, json};

/// Instruction sent with every image. Downstream parsing depends on the JSON
/// shape it asks for, so treat edits to it as a breaking change.
pub const COLOR_ANALYSIS_PROMPT: &str = r##"Analyze this clothing image and identify the primary color and any secondary, tertiary, and quaternary colors if they exist. Also provide the approximate percentage of each color in the image. Return the result in JSON format with the following structure: { "primary": "#HEXCODE", "secondary": "#HEXCODE or null", "tertiary": "#HEXCODE or null", "quaternary": "#HEXCODE or null", "percentages": { "#HEXCODE": number }, "description": "brief description" }"##;

/// A remote model that can look at an image and answer the colour prompt.
///
/// Implementations return the completion text untouched; schema checks live
/// in [`crate::analysis`].
#[async_trait]
pub trait VisionProvider: Send + Sync {
    async fn complete(&self, image: &EncodedImagePayload) -> Result<String, AnalysisError>;
    fn name(&self) -> &str;
}

pub struct OpenAiVisionProvider {
    api_key: String,
    base_url: String,
    model: String,
    max_tokens: u32,
    client: Client,
}

impl OpenAiVisionProvider {
    /// Returns `None` when no API key is configured.
    pub fn from_config(config: &ProviderConfig) -> Result<Option<Self>, AnalysisError> {
        let Some(api_key) = config.api_key.clone() else {
            return Ok(None);
        };
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                AnalysisError::UpstreamUnavailable(format!("Failed to build HTTP client: {}", e))
            })?;
        Ok(Some(Self {
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            client,
        }))
    }

    fn request_body(&self, image: &EncodedImagePayload) -> Value {
        json!({
            "model": self.model,
            "messages": [{
                "role": "user",
                "content": [
                    {
                        "type": "text",
                        "text": COLOR_ANALYSIS_PROMPT
                    },
                    {
                        "type": "image_url",
                        "image_url": {
                            "url": image.data_url()
                        }
                    }
                ]
            }],
            "max_tokens": self.max_tokens,
            "response_format": { "type": "json_object" }
        })
    }

    fn redact(&self, message: String) -> String {
        if self.api_key.is_empty() {
            return message;
        }
        message.replace(&self.api_key, "[redacted]")
    }
}

#[async_trait]
impl VisionProvider for OpenAiVisionProvider {
    async fn complete(&self, image: &EncodedImagePayload) -> Result<String, AnalysisError> {
        let url = format!("{}/chat/completions", self.base_url);
        debug!("Sending {} byte image to {}", image.data.len(), url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&self.request_body(image))
            .send()
            .await
            .map_err(|e| {
                let reason = if e.is_timeout() {
                    "request timed out".to_string()
                } else {
                    e.to_string()
                };
                AnalysisError::UpstreamUnavailable(
                    self.redact(format!("OpenAI request failed: {}", reason)),
                )
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let message = provider_error_message(&error_text)
                .unwrap_or_else(|| format!("OpenAI returned status {}", status));
            return Err(AnalysisError::UpstreamUnavailable(self.redact(message)));
        }

        let result: Value = response.json().await.map_err(|e| {
            AnalysisError::UpstreamParseError(format!("Failed to parse OpenAI response: {}", e))
        })?;

        let content = result["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| {
                AnalysisError::UpstreamParseError("No content in OpenAI response".to_string())
            })?;

        Ok(content.to_string())
    }

    fn name(&self) -> &str {
        "openai"
    }
}

/// Pulls `error.message` out of an OpenAI error body, falling back to the
/// body text itself.
fn provider_error_message(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }
    match serde_json::from_str::<Value>(body) {
        Ok(value) => value["error"]["message"]
            .as_str()
            .or_else(|| value["message"].as_str())
            .map(str::to_string)
            .or_else(|| Some(body.to_string())),
        Err(_) => Some(body.to_string()),
    }
}
