use super::common::{id_from_string_or_number, timestamp_from_millis_or_rfc3339};
use super::options::GenerationOptions;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    OpenAi,
    Anthropic,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::OpenAi => "openai",
            Provider::Anthropic => "anthropic",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Provider::OpenAi => "OpenAI (DALL·E)",
            Provider::Anthropic => "Anthropic (Claude)",
        }
    }
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "openai" => Ok(Provider::OpenAi),
            "anthropic" => Ok(Provider::Anthropic),
            other => Err(format!(
                "unknown provider '{}', expected openai or anthropic",
                other
            )),
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body POSTed to the generation worker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationRequest {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<Provider>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<GenerationOptions>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SingleProviderResponse {
    #[serde(rename = "imageUrl")]
    pub image_url: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DualProviderResponse {
    #[serde(default)]
    pub openai_image_url: Option<String>,
    #[serde(default)]
    pub anthropic_image_url: Option<String>,
    #[serde(deserialize_with = "id_from_string_or_number")]
    pub id: String,
    #[serde(deserialize_with = "timestamp_from_millis_or_rfc3339")]
    pub timestamp: DateTime<Utc>,
}

/// Decoded worker response, tagged by the API variant that produced it.
#[derive(Debug, Clone)]
pub enum GenerationResponse {
    Single {
        provider: Provider,
        body: SingleProviderResponse,
    },
    Dual(DualProviderResponse),
}

impl GenerationResponse {
    pub fn images(&self) -> GeneratedImages {
        match self {
            GenerationResponse::Single { provider, body } => {
                let url = Some(body.image_url.clone());
                match provider {
                    Provider::OpenAi => GeneratedImages {
                        openai_image_url: url,
                        anthropic_image_url: None,
                    },
                    Provider::Anthropic => GeneratedImages {
                        openai_image_url: None,
                        anthropic_image_url: url,
                    },
                }
            }
            GenerationResponse::Dual(body) => GeneratedImages {
                openai_image_url: body.openai_image_url.clone(),
                anthropic_image_url: body.anthropic_image_url.clone(),
            },
        }
    }

    /// Converts the response into the history entry for `prompt`.
    ///
    /// Dual-provider workers supply their own id and timestamp; for
    /// single-provider responses a fresh id and the current time are used.
    pub fn into_result(self, prompt: &str) -> GenerationResult {
        let images = self.images();
        let (id, timestamp) = match self {
            GenerationResponse::Single { .. } => (Uuid::new_v4().to_string(), Utc::now()),
            GenerationResponse::Dual(body) => (body.id, body.timestamp),
        };

        GenerationResult {
            id,
            timestamp,
            prompt: prompt.to_string(),
            openai_image_url: images.openai_image_url,
            anthropic_image_url: images.anthropic_image_url,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GeneratedImages {
    pub openai_image_url: Option<String>,
    pub anthropic_image_url: Option<String>,
}

impl GeneratedImages {
    /// First available URL, OpenAI first.
    pub fn primary(&self) -> Option<&str> {
        self.openai_image_url
            .as_deref()
            .or(self.anthropic_image_url.as_deref())
    }

    pub fn urls(&self) -> Vec<(Provider, &str)> {
        let mut urls = Vec::new();
        if let Some(url) = self.openai_image_url.as_deref() {
            urls.push((Provider::OpenAi, url));
        }
        if let Some(url) = self.anthropic_image_url.as_deref() {
            urls.push((Provider::Anthropic, url));
        }
        urls
    }

    pub fn is_empty(&self) -> bool {
        self.openai_image_url.is_none() && self.anthropic_image_url.is_none()
    }
}

/// One past generation as kept in the history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
    #[serde(deserialize_with = "id_from_string_or_number")]
    pub id: String,
    #[serde(deserialize_with = "timestamp_from_millis_or_rfc3339")]
    pub timestamp: DateTime<Utc>,
    pub prompt: String,
    #[serde(default)]
    pub openai_image_url: Option<String>,
    #[serde(default)]
    pub anthropic_image_url: Option<String>,
}

impl GenerationResult {
    pub fn images(&self) -> GeneratedImages {
        GeneratedImages {
            openai_image_url: self.openai_image_url.clone(),
            anthropic_image_url: self.anthropic_image_url.clone(),
        }
    }
}
