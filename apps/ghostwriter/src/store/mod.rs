//! Record store boundary: the external datastore holding requests, users,
//! templates, QA pairs, and generated content.
//!
//! The engine only ever sees `Arc<dyn RecordStore>`; `PgRecordStore` is the
//! production backend.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::content::{AttemptResult, QaPair, Template};
use crate::models::request::GenerationRequest;
use crate::models::user::User;

pub mod postgres;

pub use postgres::PgRecordStore;

/// Template selection filters. Absent or empty filters match everything.
#[derive(Debug, Clone, Copy)]
pub struct TemplateFilter<'a> {
    pub content_format: Option<&'a str>,
    /// A template matches when it carries any of these tags.
    pub tags: &'a [String],
    pub category: Option<&'a str>,
}

impl<'a> TemplateFilter<'a> {
    pub fn for_request(request: &'a GenerationRequest) -> Self {
        TemplateFilter {
            content_format: request.content_format.as_deref(),
            tags: &request.template_tags,
            category: request.category.as_deref(),
        }
    }

    /// In-memory equivalent of the SQL predicate used by `PgRecordStore`.
    #[cfg(test)]
    pub fn matches(&self, template: &Template) -> bool {
        let format_ok = self
            .content_format
            .map_or(true, |f| template.content_format.as_deref() == Some(f));
        let category_ok = self
            .category
            .map_or(true, |c| template.category.as_deref() == Some(c));
        let tags_ok = self.tags.is_empty() || self.tags.iter().any(|t| template.tags.contains(t));
        format_ok && category_ok && tags_ok
    }
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Requests created strictly after `watermark`, in no particular order.
    async fn fetch_requests_after(
        &self,
        watermark: DateTime<Utc>,
    ) -> Result<Vec<GenerationRequest>, AppError>;

    async fn fetch_user(&self, user_id: Uuid) -> Result<Option<User>, AppError>;

    async fn fetch_templates(
        &self,
        filter: TemplateFilter<'_>,
    ) -> Result<Vec<Template>, AppError>;

    /// QA pairs drawn from any of `source_ids`; every pair when the list is empty.
    async fn fetch_qa_pairs(&self, source_ids: &[Uuid]) -> Result<Vec<QaPair>, AppError>;

    async fn append_attempt_result(&self, result: &AttemptResult) -> Result<(), AppError>;
}
