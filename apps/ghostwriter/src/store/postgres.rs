//! PostgreSQL backend for [`RecordStore`]. Schema: `migrations/0001_schema.sql`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::content::{AttemptResult, QaPair, Template};
use crate::models::request::{GenerationRequest, GenerationRequestRow};
use crate::models::user::User;
use crate::store::{RecordStore, TemplateFilter};

/// Creates and returns a PostgreSQL connection pool.
pub async fn create_pool(database_url: &str) -> anyhow::Result<PgPool> {
    info!("Connecting to PostgreSQL...");

    // The poller is strictly sequential; a handful of connections is plenty.
    let pool = PgPoolOptions::new()
        .max_connections(4)
        .connect(database_url)
        .await?;

    info!("PostgreSQL connection pool established");
    Ok(pool)
}

#[derive(Clone)]
pub struct PgRecordStore {
    pool: PgPool,
}

impl PgRecordStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn fetch_requests_after(
        &self,
        watermark: DateTime<Utc>,
    ) -> Result<Vec<GenerationRequest>, AppError> {
        // Exclusive boundary: a request stamped exactly at the watermark was
        // the last one checkpointed.
        let rows = sqlx::query_as::<_, GenerationRequestRow>(
            r#"
            SELECT id, created_at, user_id, content_format, amount_to_generate,
                   source_ids, template_tags, category
            FROM generation_requests
            WHERE created_at > $1
            "#,
        )
        .bind(watermark)
        .fetch_all(&self.pool)
        .await?;

        debug!("Fetched {} generation requests after {}", rows.len(), watermark);
        Ok(rows.into_iter().map(GenerationRequest::from).collect())
    }

    async fn fetch_user(&self, user_id: Uuid) -> Result<Option<User>, AppError> {
        Ok(sqlx::query_as::<_, User>(
            r#"
            SELECT id,
                   COALESCE(brand_voice, '') AS brand_voice,
                   COALESCE(sample_content, '') AS sample_content
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn fetch_templates(
        &self,
        filter: TemplateFilter<'_>,
    ) -> Result<Vec<Template>, AppError> {
        Ok(sqlx::query_as::<_, Template>(
            r#"
            SELECT id, body, tags, category, content_format
            FROM templates
            WHERE ($1::text IS NULL OR content_format = $1)
              AND ($2::text IS NULL OR category = $2)
              AND (cardinality($3::text[]) = 0 OR tags && $3)
            "#,
        )
        .bind(filter.content_format)
        .bind(filter.category)
        .bind(filter.tags)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn fetch_qa_pairs(&self, source_ids: &[Uuid]) -> Result<Vec<QaPair>, AppError> {
        Ok(sqlx::query_as::<_, QaPair>(
            r#"
            SELECT id, question, answer, source_id
            FROM qa_pairs
            WHERE cardinality($1::uuid[]) = 0 OR source_id = ANY($1)
            "#,
        )
        .bind(source_ids)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn append_attempt_result(&self, result: &AttemptResult) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO generated_content (id, request_id, draft, status, screening_result)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(result.request_id)
        .bind(&result.draft)
        .bind(result.status.as_str())
        .bind(&result.verdict)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
