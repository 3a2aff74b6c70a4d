//! Content service boundary: the four text-in/text-out AI calls an attempt makes.
//!
//! Default: `LlmContentService` (Anthropic for draft/edit/screen, OpenAI for trim).
//! The engine holds an `Arc<dyn ContentService>` so tests swap in scripted doubles.

use async_trait::async_trait;

use crate::errors::AppError;
use crate::generation::prompts::{
    edit_request, screening_request, screening_system, source_material, trim_instructions,
};
use crate::llm_client::openai::OpenAiClient;
use crate::llm_client::{LlmClient, Message};

const GENERATION_TEMPERATURE: f32 = 1.0;
const TRIM_TEMPERATURE: f32 = 0.5;
const SCREENING_TEMPERATURE: f32 = 0.2;

#[async_trait]
pub trait ContentService: Send + Sync {
    /// First draft from a QA pair poured into a template.
    async fn generate(
        &self,
        instructions: &str,
        question: &str,
        answer: &str,
        template: &str,
    ) -> Result<String, AppError>;

    /// Second pass over `conversation` (source material + first draft) that
    /// tunes the draft to the brand brief.
    async fn edit(
        &self,
        instructions: &str,
        conversation: &[Message],
        brand_brief: &str,
    ) -> Result<String, AppError>;

    /// Compresses `text` to fewer than `limit` characters.
    async fn trim(&self, text: &str, limit: usize) -> Result<String, AppError>;

    /// Free-text verdict on `text`, judged against the brand's sample content.
    async fn screen(&self, text: &str, rubric: &str) -> Result<String, AppError>;
}

#[derive(Clone)]
pub struct LlmContentService {
    anthropic: LlmClient,
    openai: OpenAiClient,
}

impl LlmContentService {
    pub fn new(anthropic: LlmClient, openai: OpenAiClient) -> Self {
        Self { anthropic, openai }
    }
}

#[async_trait]
impl ContentService for LlmContentService {
    async fn generate(
        &self,
        instructions: &str,
        question: &str,
        answer: &str,
        template: &str,
    ) -> Result<String, AppError> {
        let messages = [Message::user(source_material(question, answer, template))];
        self.anthropic
            .call_text(instructions, &messages, GENERATION_TEMPERATURE)
            .await
            .map_err(|e| AppError::Llm(format!("Draft generation failed: {e}")))
    }

    async fn edit(
        &self,
        instructions: &str,
        conversation: &[Message],
        brand_brief: &str,
    ) -> Result<String, AppError> {
        let mut messages = conversation.to_vec();
        messages.push(Message::user(edit_request(brand_brief)));
        self.anthropic
            .call_text(instructions, &messages, GENERATION_TEMPERATURE)
            .await
            .map_err(|e| AppError::Llm(format!("Brand edit failed: {e}")))
    }

    async fn trim(&self, text: &str, limit: usize) -> Result<String, AppError> {
        self.openai
            .complete(&trim_instructions(limit), text, TRIM_TEMPERATURE)
            .await
            .map_err(|e| AppError::Llm(format!("Trim to {limit} characters failed: {e}")))
    }

    async fn screen(&self, text: &str, rubric: &str) -> Result<String, AppError> {
        let messages = [Message::user(screening_request(text))];
        self.anthropic
            .call_text(&screening_system(rubric), &messages, SCREENING_TEMPERATURE)
            .await
            .map_err(|e| AppError::Llm(format!("Screening failed: {e}")))
    }
}
