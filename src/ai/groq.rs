//! Groq chat-completions client for asset photo analysis

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{AssetMetadata, VisionConfig};
use crate::error::VisionError;

const GROQ_API_BASE: &str = "https://api.groq.com/openai/v1";

const ANALYSIS_PROMPT: &str = r#"
You are an expert industrial asset analyzer for inventory management.
Analyze this image carefully and extract detailed asset information.

Return ONLY valid JSON with these exact fields:
{
  "AssetName": "descriptive name of the asset",
  "Manufacturer": "brand or manufacturer name (if visible)",
  "ModelNumber": "model number or identifier (if visible)",
  "Condition": "excellent/good/fair/poor based on visual inspection",
  "Category": "type of asset (e.g., Ladder, Pump, Valve, Motor, Tools, Safety Equipment, etc.)",
  "VisualDescription": "detailed physical description including color, size, material, distinctive features",
  "DetailedDescription": "comprehensive description covering purpose, specifications, condition, and usage"
}
"#;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    response_format: ResponseFormat,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: Vec<ContentPart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    #[serde(default)]
    content: String,
}

/// Groq vision client
#[derive(Debug, Clone)]
pub struct GroqClient {
    config: VisionConfig,
    http: Client,
}

impl GroqClient {
    pub fn new(config: VisionConfig) -> Result<Self, VisionError> {
        if config.api_key.is_empty() {
            return Err(VisionError::MissingApiKey);
        }
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;
        Ok(Self { config, http })
    }

    /// Client from the environment, `None` when no key is configured
    pub fn from_env() -> Option<Self> {
        VisionConfig::from_env().and_then(|config| Self::new(config).ok())
    }

    /// Analyze a photographed asset. Malformed model output degrades to
    /// placeholder metadata instead of failing the upload.
    pub async fn analyze_asset(
        &self,
        image_base64: &str,
        mime_type: &str,
    ) -> Result<AssetMetadata, VisionError> {
        let data_url = format!("data:{mime_type};base64,{image_base64}");
        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![Message {
                role: "user",
                content: vec![
                    ContentPart::Text {
                        text: ANALYSIS_PROMPT,
                    },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl { url: data_url },
                    },
                ],
            }],
            response_format: ResponseFormat {
                format_type: "json_object",
            },
            temperature: 0.3,
            max_tokens: 2000,
        };

        let response = self
            .http
            .post(format!("{GROQ_API_BASE}/chat/completions"))
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(VisionError::Api {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }

        let chat: ChatResponse = response.json().await?;
        let content = chat
            .choices
            .first()
            .map(|c| c.message.content.as_str())
            .unwrap_or_default();

        match serde_json::from_str::<AssetMetadata>(content) {
            Ok(metadata) => Ok(metadata),
            Err(err) => {
                warn!(error = %err, "vision response was not valid metadata JSON");
                Ok(AssetMetadata::placeholder(
                    "Failed to analyze",
                    "Unable to generate description.",
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_parts_serialize_to_openai_shape() {
        let parts = vec![
            ContentPart::Text { text: "describe" },
            ContentPart::ImageUrl {
                image_url: ImageUrl {
                    url: "data:image/jpeg;base64,QUJD".to_string(),
                },
            },
        ];
        let json = serde_json::to_value(&parts).unwrap();
        assert_eq!(json[0]["type"], "text");
        assert_eq!(json[1]["type"], "image_url");
        assert_eq!(json[1]["image_url"]["url"], "data:image/jpeg;base64,QUJD");
    }
}
