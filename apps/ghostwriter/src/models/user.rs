use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Account whose voice the content is written in.
/// `sample_content` doubles as the screening rubric.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub brand_voice: String,
    pub sample_content: String,
}
