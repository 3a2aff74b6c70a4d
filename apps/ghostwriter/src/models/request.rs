use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Raw row from `generation_requests`. Converted into [`GenerationRequest`]
/// before it reaches the engine so defaults are applied in one place.
#[derive(Debug, Clone, FromRow)]
pub struct GenerationRequestRow {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub user_id: Option<Uuid>,
    pub content_format: Option<String>,
    pub amount_to_generate: Option<i32>,
    pub source_ids: Option<Vec<Uuid>>,
    pub template_tags: Option<Vec<String>>,
    pub category: Option<String>,
}

/// A queued request for `desired_count` approved pieces of content.
/// Immutable once fetched; the queue owns it.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub user_id: Option<Uuid>,
    pub content_format: Option<String>,
    /// Always at least 1.
    pub desired_count: u32,
    pub source_ids: Vec<Uuid>,
    pub template_tags: Vec<String>,
    pub category: Option<String>,
}

impl From<GenerationRequestRow> for GenerationRequest {
    fn from(row: GenerationRequestRow) -> Self {
        let desired_count = row
            .amount_to_generate
            .and_then(|n| u32::try_from(n).ok())
            .filter(|&n| n > 0)
            .unwrap_or(1);

        GenerationRequest {
            id: row.id,
            created_at: row.created_at,
            user_id: row.user_id,
            content_format: row.content_format.filter(|f| !f.trim().is_empty()),
            desired_count,
            source_ids: row.source_ids.unwrap_or_default(),
            template_tags: row.template_tags.unwrap_or_default(),
            category: row.category.filter(|c| !c.trim().is_empty()),
        }
    }
}
