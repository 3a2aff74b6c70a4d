//! Watermark Store: the single durable "last processed" timestamp.
//!
//! Backends only implement `load`/`persist`, which may fail. The provided
//! `read`/`write` never fail: an unreadable or missing watermark degrades to
//! the default epoch (reprocess everything), and a failed write only risks
//! reprocessing the last request.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use tracing::{debug, error, warn};

use crate::errors::AppError;

pub mod file;
pub mod redis_store;

pub use self::file::FileWatermarkStore;
pub use self::redis_store::RedisWatermarkStore;

/// Watermark used when nothing has been recorded yet.
pub const DEFAULT_WATERMARK: &str = "2024-11-05T00:00:00.000Z";
const DEFAULT_WATERMARK_UNIX: i64 = 1_730_764_800;

pub fn default_watermark() -> DateTime<Utc> {
    DateTime::from_timestamp(DEFAULT_WATERMARK_UNIX, 0).unwrap_or_default()
}

/// Serializes as ISO-8601 UTC at microsecond precision, the resolution of
/// `created_at`, e.g. `2024-11-05T00:00:00.000000Z`. Anything coarser would
/// checkpoint below the request and refetch it.
pub fn format_watermark(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn parse_watermark(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .ok()
        .map(|ts| ts.with_timezone(&Utc))
}

#[async_trait]
pub trait WatermarkStore: Send + Sync {
    /// Raw stored value, `None` when nothing has been written yet.
    async fn load(&self) -> Result<Option<String>, AppError>;

    async fn persist(&self, value: &str) -> Result<(), AppError>;

    async fn read(&self) -> DateTime<Utc> {
        match self.load().await {
            Ok(Some(raw)) if raw.trim().is_empty() => default_watermark(),
            Ok(Some(raw)) => parse_watermark(&raw).unwrap_or_else(|| {
                warn!("Stored watermark {raw:?} is not a valid timestamp; using default");
                default_watermark()
            }),
            Ok(None) => default_watermark(),
            Err(e) => {
                error!("Failed to read watermark, falling back to {DEFAULT_WATERMARK}: {e}");
                default_watermark()
            }
        }
    }

    async fn write(&self, ts: DateTime<Utc>) {
        let value = format_watermark(ts);
        match self.persist(&value).await {
            Ok(()) => debug!("Watermark advanced to {value}"),
            Err(e) => error!("Failed to persist watermark {value}: {e}"),
        }
    }
}
