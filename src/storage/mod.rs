pub mod file;
pub mod memory;
pub mod traits;

use crate::config::Config;
use std::sync::Arc;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use traits::KeyValueStore;

/// The durable store configured for this process.
pub fn open(config: &Config) -> Arc<dyn KeyValueStore> {
    log::debug!("Using history directory {}", config.history_dir.display());
    Arc::new(FileStore::new(config.history_dir.clone()))
}
