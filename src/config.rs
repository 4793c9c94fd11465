use crate::{
    error::{ImageinatorError, Result},
    models::Provider,
};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_HISTORY_CAPACITY: usize = 20;
pub const DEFAULT_HISTORY_DIR: &str = ".imageinator";
pub const HISTORY_STORAGE_KEY: &str = "imageHistory";

/// Which request/response contract the worker speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApiVariant {
    /// `{text, provider}` in, `{imageUrl}` out.
    #[default]
    SingleProvider,
    /// `{text, options}` in, `{openaiImageUrl, anthropicImageUrl, id, timestamp}` out.
    DualProvider,
}

impl FromStr for ApiVariant {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "single" => Ok(ApiVariant::SingleProvider),
            "dual" => Ok(ApiVariant::DualProvider),
            other => Err(format!("unknown API variant '{}', expected single or dual", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub endpoint: Option<String>,
    pub api_variant: ApiVariant,
    pub provider: Provider,
    pub history_dir: PathBuf,
    pub history_capacity: usize,
    pub export_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            endpoint: None,
            api_variant: ApiVariant::default(),
            provider: Provider::default(),
            history_dir: PathBuf::from(DEFAULT_HISTORY_DIR),
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            export_dir: PathBuf::from("."),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads `IMAGEINATOR_*` variables. Unparsable values fall back to defaults with a warning.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let endpoint = env::var("IMAGEINATOR_WORKER_URL")
            .or_else(|_| env::var("REACT_APP_WORKER_URL"))
            .ok();
        let api_variant = parse_env("IMAGEINATOR_API_VARIANT").unwrap_or(defaults.api_variant);
        let provider = parse_env("IMAGEINATOR_PROVIDER").unwrap_or(defaults.provider);
        let history_dir = env::var("IMAGEINATOR_HISTORY_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.history_dir);
        let export_dir = env::var("IMAGEINATOR_EXPORT_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.export_dir);

        Config {
            endpoint,
            api_variant,
            provider,
            history_dir,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            export_dir,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn with_api_variant(mut self, api_variant: ApiVariant) -> Self {
        self.api_variant = api_variant;
        self
    }

    pub fn with_provider(mut self, provider: Provider) -> Self {
        self.provider = provider;
        self
    }

    pub fn with_history_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.history_dir = dir.into();
        self
    }

    pub fn with_export_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.export_dir = dir.into();
        self
    }

    pub fn validate(&self) -> Result<&str> {
        let endpoint = self.endpoint.as_deref().ok_or_else(|| {
            ImageinatorError::ConfigError("IMAGEINATOR_WORKER_URL is not set".into())
        })?;

        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(ImageinatorError::ConfigError(format!(
                "worker URL must be http(s): {}",
                endpoint
            )));
        }

        Ok(endpoint)
    }
}

fn parse_env<T: FromStr<Err = String>>(key: &str) -> Option<T> {
    let raw = env::var(key).ok()?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("Ignoring {}: {}", key, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::new();
        assert_eq!(config.history_capacity, 20);
        assert_eq!(config.api_variant, ApiVariant::SingleProvider);
        assert_eq!(config.provider, Provider::OpenAi);
    }

    #[test]
    fn test_validate_requires_http_endpoint() {
        assert!(matches!(
            Config::new().validate(),
            Err(ImageinatorError::ConfigError(_))
        ));
        assert!(Config::new().with_endpoint("ftp://worker").validate().is_err());
        assert_eq!(
            Config::new()
                .with_endpoint("https://worker.example/generate")
                .validate()
                .unwrap(),
            "https://worker.example/generate"
        );
    }

    #[test]
    fn test_api_variant_parse() {
        assert_eq!("dual".parse::<ApiVariant>(), Ok(ApiVariant::DualProvider));
        assert!("triple".parse::<ApiVariant>().is_err());
    }
}
