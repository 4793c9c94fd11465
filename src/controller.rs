use crate::{
    error::ImageinatorError,
    history::HistoryStore,
    logger,
    models::{GenerationOptions, GenerationResult, Provider, RequestState},
    worker::GenerationBackend,
};
use std::sync::Arc;
use tokio::sync::watch;

pub const GENERIC_FAILURE_MESSAGE: &str = "Failed to generate image.";

/// Drives one generation at a time and publishes every state transition.
pub struct GenerationController {
    backend: Arc<dyn GenerationBackend>,
    history: Arc<HistoryStore>,
    provider: Provider,
    state: watch::Sender<RequestState>,
}

impl GenerationController {
    pub fn new(backend: Arc<dyn GenerationBackend>, history: Arc<HistoryStore>) -> Self {
        let (state, _) = watch::channel(RequestState::Idle);
        Self {
            backend,
            history,
            provider: Provider::default(),
            state,
        }
    }

    /// Provider sent to single-provider workers.
    pub fn with_provider(mut self, provider: Provider) -> Self {
        self.provider = provider;
        self
    }

    pub fn state(&self) -> RequestState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<RequestState> {
        self.state.subscribe()
    }

    pub async fn history(&self) -> Vec<GenerationResult> {
        self.history.entries().await
    }

    /// Runs one generation and returns the state it ended in.
    ///
    /// A call made while another generation is loading does nothing and
    /// returns `Loading`.
    pub async fn submit(&self, prompt: &str, options: GenerationOptions) -> RequestState {
        let started = self.state.send_if_modified(|state| {
            if state.is_loading() {
                false
            } else {
                *state = RequestState::Loading;
                true
            }
        });
        if !started {
            log::warn!("Generation already in flight, ignoring new submission");
            return RequestState::Loading;
        }

        let _timer = logger::timer("image generation");
        let request = self.backend.build_request(prompt, self.provider, options);

        let next = match self.backend.generate(&request).await {
            Ok(response) => {
                let images = response.images();
                if images.is_empty() {
                    log::warn!("Worker returned no image URLs");
                }
                if let Err(e) = self.history.record(response.into_result(prompt)).await {
                    log::error!("Failed to persist history: {}", e);
                }
                RequestState::Success(images)
            }
            Err(ImageinatorError::HttpStatusError { status }) => {
                log::error!("Image generation failed with HTTP {}", status);
                RequestState::Failure(GENERIC_FAILURE_MESSAGE.to_string())
            }
            Err(e) => {
                log::error!("Image generation failed: {}", e);
                RequestState::Failure(e.to_string())
            }
        };

        self.state.send_replace(next.clone());
        next
    }
}
