use crate::error::{ImageinatorError, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::Utc;
use reqwest::Client;
use std::path::{Path, PathBuf};

const MAX_TITLE_LEN: usize = 60;

/// Saves generated images to disk as `<title>-<timestamp>.png`.
#[derive(Clone)]
pub struct ImageExporter {
    client: Client,
}

impl ImageExporter {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub async fn export(&self, url: &str, title: &str, dir: &Path) -> Result<PathBuf> {
        let bytes = self.fetch(url).await?;

        tokio::fs::create_dir_all(dir).await.map_err(|e| {
            ImageinatorError::ExportError(format!("Failed to create {}: {}", dir.display(), e))
        })?;

        let path = dir.join(file_name(title, Utc::now().timestamp_millis()));
        tokio::fs::write(&path, &bytes).await.map_err(|e| {
            ImageinatorError::ExportError(format!("Failed to save {}: {}", path.display(), e))
        })?;

        log::info!("Saved {} bytes to {}", bytes.len(), path.display());
        Ok(path)
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        if let Some(data) = url.strip_prefix("data:") {
            return decode_data_url(data);
        }

        log::debug!("Downloading image from {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ImageinatorError::NetworkError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ImageinatorError::HttpStatusError {
                status: response.status().as_u16(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ImageinatorError::NetworkError(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

fn decode_data_url(data: &str) -> Result<Vec<u8>> {
    let (meta, payload) = data
        .split_once(',')
        .ok_or_else(|| ImageinatorError::ExportError("malformed data URL".into()))?;

    if !meta.ends_with(";base64") {
        return Err(ImageinatorError::ExportError(
            "only base64 data URLs are supported".into(),
        ));
    }

    STANDARD
        .decode(payload)
        .map_err(|e| ImageinatorError::ExportError(format!("Invalid base64 image: {}", e)))
}

pub fn file_name(title: &str, timestamp_millis: i64) -> String {
    format!("{}-{}.png", slugify(title), timestamp_millis)
}

fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    for c in title.chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }

    let slug: String = slug.trim_matches('-').chars().take(MAX_TITLE_LEN).collect();
    let slug = slug.trim_end_matches('-');
    if slug.is_empty() {
        "image".to_string()
    } else {
        slug.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_name_shape() {
        assert_eq!(
            file_name("Sunset over the bay!", 1700000000000),
            "sunset-over-the-bay-1700000000000.png"
        );
        assert_eq!(file_name("../../etc", 1), "etc-1.png");
        assert_eq!(file_name("   ", 5), "image-5.png");
    }

    #[tokio::test]
    async fn test_export_data_url() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = ImageExporter::new(Client::new());
        let url = format!("data:image/png;base64,{}", STANDARD.encode(b"\x89PNG"));

        let path = exporter.export(&url, "openai", dir.path()).await.unwrap();

        assert!(path.file_name().unwrap().to_string_lossy().starts_with("openai-"));
        assert_eq!(std::fs::read(path).unwrap(), b"\x89PNG");
    }

    #[test]
    fn test_rejects_non_base64_data_url() {
        assert!(decode_data_url("text/plain,hello").is_err());
    }
}
