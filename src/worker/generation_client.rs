use crate::{
    config::{ApiVariant, Config},
    error::{ImageinatorError, Result},
    models::{
        DualProviderResponse, GenerationRequest, GenerationResponse, Provider,
        SingleProviderResponse,
    },
    worker::GenerationBackend,
};
use async_trait::async_trait;
use reqwest::Client;

/// Talks to the generation worker over HTTP.
#[derive(Clone)]
pub struct GenerationClient {
    client: Client,
    endpoint: String,
    variant: ApiVariant,
}

impl GenerationClient {
    pub fn new(client: Client, endpoint: impl Into<String>, variant: ApiVariant) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            variant,
        }
    }

    pub fn from_config(client: Client, config: &Config) -> Result<Self> {
        let endpoint = config.validate()?;
        Ok(Self::new(client, endpoint, config.api_variant))
    }

    fn decode(&self, request: &GenerationRequest, body: &str) -> Result<GenerationResponse> {
        let parse_err = |e: serde_json::Error| ImageinatorError::ParseError(e.to_string());

        match self.variant {
            ApiVariant::SingleProvider => {
                let body: SingleProviderResponse = serde_json::from_str(body).map_err(parse_err)?;
                Ok(GenerationResponse::Single {
                    provider: request.provider.unwrap_or(Provider::OpenAi),
                    body,
                })
            }
            ApiVariant::DualProvider => {
                let body: DualProviderResponse = serde_json::from_str(body).map_err(parse_err)?;
                Ok(GenerationResponse::Dual(body))
            }
        }
    }
}

#[async_trait]
impl GenerationBackend for GenerationClient {
    fn variant(&self) -> ApiVariant {
        self.variant
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse> {
        log::info!("Requesting image generation from {}", self.endpoint);
        log::debug!(
            "Generation request payload: {}",
            serde_json::to_string(request)?
        );

        let response = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| ImageinatorError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            log::warn!("Worker answered with status {}", status);
            return Err(ImageinatorError::HttpStatusError {
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| ImageinatorError::NetworkError(e.to_string()))?;

        self.decode(request, &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(variant: ApiVariant) -> GenerationClient {
        GenerationClient::new(Client::new(), "http://worker.test", variant)
    }

    fn request(provider: Option<Provider>) -> GenerationRequest {
        GenerationRequest {
            text: "sunset".to_string(),
            provider,
            options: None,
        }
    }

    #[test]
    fn test_decode_single_provider() {
        let response = client(ApiVariant::SingleProvider)
            .decode(&request(Some(Provider::OpenAi)), r#"{"imageUrl":"http://x/1.png"}"#)
            .unwrap();
        assert_eq!(response.images().primary(), Some("http://x/1.png"));
    }

    #[test]
    fn test_decode_rejects_wrong_shape() {
        let err = client(ApiVariant::DualProvider)
            .decode(&request(None), r#"{"imageUrl":"http://x/1.png"}"#)
            .unwrap_err();
        assert!(matches!(err, ImageinatorError::ParseError(_)));
    }

    #[test]
    fn test_from_config_requires_endpoint() {
        assert!(GenerationClient::from_config(Client::new(), &Config::new()).is_err());
    }
}
