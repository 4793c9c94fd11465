use crate::error::Result;
use async_trait::async_trait;

/// Durable key-value storage holding serialized values under string keys.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Backend name for logs.
    fn name(&self) -> &'static str;
}
