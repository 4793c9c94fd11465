pub mod export_client;
pub mod generation_client;

use crate::{
    config::ApiVariant,
    error::Result,
    models::{GenerationOptions, GenerationRequest, GenerationResponse, Provider},
};
use async_trait::async_trait;

pub use export_client::ImageExporter;
pub use generation_client::GenerationClient;

/// Anything that can turn a generation request into a decoded worker response.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    fn variant(&self) -> ApiVariant;

    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse>;

    /// Request body for this backend's API variant.
    fn build_request(
        &self,
        prompt: &str,
        provider: Provider,
        options: GenerationOptions,
    ) -> GenerationRequest {
        match self.variant() {
            ApiVariant::SingleProvider => GenerationRequest {
                text: prompt.to_string(),
                provider: Some(provider),
                options: None,
            },
            ApiVariant::DualProvider => GenerationRequest {
                text: prompt.to_string(),
                provider: None,
                options: Some(options),
            },
        }
    }
}
