use async_trait::async_trait;
use redis::AsyncCommands;

use crate::errors::AppError;
use crate::watermark::WatermarkStore;

pub const WATERMARK_KEY: &str = "ghostwriter:last_processed_time";

/// Keeps the watermark under a single Redis string key, for deployments
/// without a persistent local disk.
#[derive(Clone)]
pub struct RedisWatermarkStore {
    client: redis::Client,
    key: String,
}

impl RedisWatermarkStore {
    pub fn new(client: redis::Client) -> Self {
        Self {
            client,
            key: WATERMARK_KEY.to_string(),
        }
    }
}

#[async_trait]
impl WatermarkStore for RedisWatermarkStore {
    async fn load(&self) -> Result<Option<String>, AppError> {
        let mut con = self.client.get_multiplexed_async_connection().await?;
        let value: Option<String> = con.get(&self.key).await?;
        Ok(value)
    }

    async fn persist(&self, value: &str) -> Result<(), AppError> {
        let mut con = self.client.get_multiplexed_async_connection().await?;
        con.set::<_, _, ()>(&self.key, value).await?;
        Ok(())
    }
}
