use crate::{
    config::Config,
    controller::GenerationController,
    error::{ImageinatorError, Result},
    history::HistoryStore,
    models::{GenerationOptions, GenerationResult, RequestState},
    storage::{self, KeyValueStore},
    worker::{GenerationClient, ImageExporter},
};
use std::path::PathBuf;
use std::sync::Arc;

/// Wires the worker client, history store and exporter together from one `Config`.
pub struct Imageinator {
    controller: Option<GenerationController>,
    history: Arc<HistoryStore>,
    exporter: ImageExporter,
    export_dir: PathBuf,
}

impl Imageinator {
    pub async fn new(config: Config) -> Result<Self> {
        let storage = storage::open(&config);
        Self::with_storage(config, storage).await
    }

    pub async fn with_storage(config: Config, storage: Arc<dyn KeyValueStore>) -> Result<Self> {
        let http = reqwest::Client::new();

        let history = Arc::new(HistoryStore::with_capacity(
            storage,
            config.history_capacity,
        ));
        history.initialize().await;

        // History and export work without a worker URL.
        let controller = match GenerationClient::from_config(http.clone(), &config) {
            Ok(backend) => Some(
                GenerationController::new(Arc::new(backend), Arc::clone(&history))
                    .with_provider(config.provider),
            ),
            Err(e) => {
                log::debug!("Generation disabled: {}", e);
                None
            }
        };

        Ok(Self {
            controller,
            history,
            exporter: ImageExporter::new(http),
            export_dir: config.export_dir,
        })
    }

    pub fn controller(&self) -> Result<&GenerationController> {
        self.controller.as_ref().ok_or_else(|| {
            ImageinatorError::ConfigError("IMAGEINATOR_WORKER_URL is not set or invalid".into())
        })
    }

    pub async fn submit(&self, prompt: &str, options: GenerationOptions) -> Result<RequestState> {
        Ok(self.controller()?.submit(prompt, options).await)
    }

    pub async fn history(&self) -> Vec<GenerationResult> {
        self.history.entries().await
    }

    /// Saves `url` into the configured export directory.
    pub async fn export(&self, url: &str, title: &str) -> Result<PathBuf> {
        self.exporter.export(url, title, &self.export_dir).await
    }
}
