use crate::{
    error::{ImageinatorError, Result},
    storage::traits::KeyValueStore,
};
use async_trait::async_trait;
use std::path::PathBuf;

/// One JSON file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty()
            || !key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(ImageinatorError::StorageError(format!(
                "invalid storage key: {:?}",
                key
            )));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ImageinatorError::StorageError(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            ))),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        tokio::fs::create_dir_all(&self.dir).await?;

        // Readers never observe a half-written file.
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, value).await.map_err(|e| {
            ImageinatorError::StorageError(format!("Failed to write {}: {}", tmp.display(), e))
        })?;
        tokio::fs::rename(&tmp, &path).await.map_err(|e| {
            ImageinatorError::StorageError(format!("Failed to replace {}: {}", path.display(), e))
        })?;

        log::debug!("Persisted key '{}' to {}", key, path.display());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "file"
    }
}
