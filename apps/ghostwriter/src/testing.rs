//! In-memory doubles for the engine's collaborators.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::errors::AppError;
use crate::generation::service::ContentService;
use crate::llm_client::Message;
use crate::models::content::{AttemptResult, QaPair, Template};
use crate::models::request::GenerationRequest;
use crate::models::user::User;
use crate::state::ServiceContext;
use crate::store::{RecordStore, TemplateFilter};
use crate::watermark::{format_watermark, parse_watermark, WatermarkStore};

// ────────────────────────────────────────────────────────────────────────────
// Record store
// ────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct MemoryStore {
    requests: Mutex<Vec<GenerationRequest>>,
    users: Mutex<HashMap<Uuid, User>>,
    templates: Mutex<Vec<Template>>,
    qa_pairs: Mutex<Vec<QaPair>>,
    results: Mutex<Vec<AttemptResult>>,
    fetch_log: Mutex<Vec<Vec<Uuid>>>,
    fail_appends: AtomicBool,
    fail_request_fetch: AtomicBool,
    ignore_watermark: AtomicBool,
}

impl MemoryStore {
    /// Requests are returned in insertion order, not creation order.
    pub fn add_request(&self, request: GenerationRequest) {
        self.requests.lock().unwrap().push(request);
    }

    pub fn add_user(&self, user: User) {
        self.users.lock().unwrap().insert(user.id, user);
    }

    pub fn add_template(&self, template: Template) {
        self.templates.lock().unwrap().push(template);
    }

    pub fn add_qa_pair(&self, qa: QaPair) {
        self.qa_pairs.lock().unwrap().push(qa);
    }

    pub fn clear_qa_pairs(&self) {
        self.qa_pairs.lock().unwrap().clear();
    }

    pub fn results(&self) -> Vec<AttemptResult> {
        self.results.lock().unwrap().clone()
    }

    /// Ids returned by each `fetch_requests_after` call, in call order.
    pub fn fetch_log(&self) -> Vec<Vec<Uuid>> {
        self.fetch_log.lock().unwrap().clone()
    }

    pub fn fail_appends(&self) {
        self.fail_appends.store(true, Ordering::SeqCst);
    }

    pub fn fail_request_fetches(&self, fail: bool) {
        self.fail_request_fetch.store(fail, Ordering::SeqCst);
    }

    /// Makes `fetch_requests_after` return every request, as a datastore
    /// with sloppy boundary semantics might.
    pub fn ignore_watermark(&self) {
        self.ignore_watermark.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn fetch_requests_after(
        &self,
        watermark: DateTime<Utc>,
    ) -> Result<Vec<GenerationRequest>, AppError> {
        if self.fail_request_fetch.load(Ordering::SeqCst) {
            return Err(AppError::Internal(anyhow::anyhow!("connection reset")));
        }
        let ignore = self.ignore_watermark.load(Ordering::SeqCst);
        let fetched: Vec<GenerationRequest> = self
            .requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| ignore || r.created_at > watermark)
            .cloned()
            .collect();
        self.fetch_log
            .lock()
            .unwrap()
            .push(fetched.iter().map(|r| r.id).collect());
        Ok(fetched)
    }

    async fn fetch_user(&self, user_id: Uuid) -> Result<Option<User>, AppError> {
        Ok(self.users.lock().unwrap().get(&user_id).cloned())
    }

    async fn fetch_templates(
        &self,
        filter: TemplateFilter<'_>,
    ) -> Result<Vec<Template>, AppError> {
        Ok(self
            .templates
            .lock()
            .unwrap()
            .iter()
            .filter(|t| filter.matches(t))
            .cloned()
            .collect())
    }

    async fn fetch_qa_pairs(&self, source_ids: &[Uuid]) -> Result<Vec<QaPair>, AppError> {
        Ok(self
            .qa_pairs
            .lock()
            .unwrap()
            .iter()
            .filter(|qa| {
                source_ids.is_empty()
                    || qa.source_id.map_or(false, |s| source_ids.contains(&s))
            })
            .cloned()
            .collect())
    }

    async fn append_attempt_result(&self, result: &AttemptResult) -> Result<(), AppError> {
        if self.fail_appends.load(Ordering::SeqCst) {
            return Err(AppError::Internal(anyhow::anyhow!("insert rejected")));
        }
        self.results.lock().unwrap().push(result.clone());
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Content service
// ────────────────────────────────────────────────────────────────────────────

pub enum Verdicts {
    AlwaysYes,
    AlwaysNo,
    /// Played in order; "No" once exhausted.
    Sequence(Vec<&'static str>),
}

#[derive(Debug, Clone)]
pub struct EditCall {
    pub instructions: String,
    pub conversation: Vec<Message>,
    pub brand_brief: String,
}

pub struct ScriptedContent {
    verdicts: Verdicts,
    calls: Mutex<HashMap<&'static str, usize>>,
    fail_generate_first: usize,
    fail_screen: bool,
    fail_trim: bool,
    edited_length: Option<usize>,
    panic_on_question: Option<String>,
    last_edit: Mutex<Option<EditCall>>,
}

impl ScriptedContent {
    pub const FIRST_DRAFT: &'static str = "Automation frees people.\n\nLet it.";
    pub const EDITED_DRAFT: &'static str = "Automation frees your team.\n\nLet it work.";

    pub fn new(verdicts: Verdicts) -> Self {
        Self {
            verdicts,
            calls: Mutex::new(HashMap::new()),
            fail_generate_first: 0,
            fail_screen: false,
            fail_trim: false,
            edited_length: None,
            panic_on_question: None,
            last_edit: Mutex::new(None),
        }
    }

    pub fn failing_generate_first(mut self, n: usize) -> Self {
        self.fail_generate_first = n;
        self
    }

    pub fn failing_screen(mut self) -> Self {
        self.fail_screen = true;
        self
    }

    pub fn failing_trim(mut self) -> Self {
        self.fail_trim = true;
        self
    }

    /// Edited drafts come back exactly `chars` characters long.
    pub fn with_edited_length(mut self, chars: usize) -> Self {
        self.edited_length = Some(chars);
        self
    }

    pub fn panicking_on_question(mut self, question: &str) -> Self {
        self.panic_on_question = Some(question.to_string());
        self
    }

    pub fn calls(&self, operation: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .get(operation)
            .copied()
            .unwrap_or(0)
    }

    pub fn last_edit(&self) -> Option<EditCall> {
        self.last_edit.lock().unwrap().clone()
    }

    /// Returns the 1-based call number for `operation`.
    fn record(&self, operation: &'static str) -> usize {
        let mut calls = self.calls.lock().unwrap();
        let count = calls.entry(operation).or_insert(0);
        *count += 1;
        *count
    }
}

fn scripted_failure(operation: &str) -> AppError {
    AppError::Llm(format!("{operation}: upstream returned 529 overloaded"))
}

#[async_trait]
impl ContentService for ScriptedContent {
    async fn generate(
        &self,
        _instructions: &str,
        question: &str,
        _answer: &str,
        _template: &str,
    ) -> Result<String, AppError> {
        let call = self.record("generate");
        if self.panic_on_question.as_deref() == Some(question) {
            panic!("scripted panic while drafting {question:?}");
        }
        if call <= self.fail_generate_first {
            return Err(scripted_failure("generate"));
        }
        Ok(Self::FIRST_DRAFT.to_string())
    }

    async fn edit(
        &self,
        instructions: &str,
        conversation: &[Message],
        brand_brief: &str,
    ) -> Result<String, AppError> {
        self.record("edit");
        *self.last_edit.lock().unwrap() = Some(EditCall {
            instructions: instructions.to_string(),
            conversation: conversation.to_vec(),
            brand_brief: brand_brief.to_string(),
        });
        Ok(match self.edited_length {
            Some(chars) => "a".repeat(chars),
            None => Self::EDITED_DRAFT.to_string(),
        })
    }

    async fn trim(&self, text: &str, limit: usize) -> Result<String, AppError> {
        self.record("trim");
        if self.fail_trim {
            return Err(scripted_failure("trim"));
        }
        Ok(text.chars().take(limit).collect())
    }

    async fn screen(&self, _text: &str, _rubric: &str) -> Result<String, AppError> {
        let call = self.record("screen");
        if self.fail_screen {
            return Err(scripted_failure("screen"));
        }
        Ok(match &self.verdicts {
            Verdicts::AlwaysYes => "Yes\n• on voice".to_string(),
            Verdicts::AlwaysNo => "No\n• too generic".to_string(),
            Verdicts::Sequence(script) => script.get(call - 1).copied().unwrap_or("No").to_string(),
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Watermark
// ────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct MemoryWatermark {
    value: Mutex<Option<String>>,
    writes: Mutex<Vec<String>>,
}

impl MemoryWatermark {
    pub fn starting_at(ts: DateTime<Utc>) -> Self {
        Self {
            value: Mutex::new(Some(format_watermark(ts))),
            writes: Mutex::new(Vec::new()),
        }
    }

    pub fn writes(&self) -> Vec<DateTime<Utc>> {
        self.writes
            .lock()
            .unwrap()
            .iter()
            .filter_map(|raw| parse_watermark(raw))
            .collect()
    }
}

#[async_trait]
impl WatermarkStore for MemoryWatermark {
    async fn load(&self) -> Result<Option<String>, AppError> {
        Ok(self.value.lock().unwrap().clone())
    }

    async fn persist(&self, value: &str) -> Result<(), AppError> {
        *self.value.lock().unwrap() = Some(value.to_string());
        self.writes.lock().unwrap().push(value.to_string());
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Harness
// ────────────────────────────────────────────────────────────────────────────

pub struct TestHarness {
    pub store: Arc<MemoryStore>,
    pub content: Arc<ScriptedContent>,
    pub watermark: Arc<MemoryWatermark>,
    pub user_id: Uuid,
}

impl TestHarness {
    pub const BRAND_VOICE: &'static str =
        "Informative, analytical and ambitious. Concise statements, often lists.";
    pub const FORMAT: &'static str = "Short Form Social Post";

    /// A store holding one user, three QA pairs and two templates.
    pub fn stocked(content: ScriptedContent) -> Self {
        let store = MemoryStore::default();
        let user_id = Uuid::new_v4();
        store.add_user(User {
            id: user_id,
            brand_voice: Self::BRAND_VOICE.to_string(),
            sample_content: "Systems beat goals.\n\nShip small, ship often.".to_string(),
        });
        for (question, answer) in [
            ("Why automate?", "So people can do the work only people can do."),
            ("What is leverage?", "Output that does not scale with hours."),
            ("How do you pick partners?", "Fair exchange, shared upside."),
        ] {
            store.add_qa_pair(QaPair {
                id: Uuid::new_v4(),
                question: question.to_string(),
                answer: answer.to_string(),
                source_id: None,
            });
        }
        for (body, tag) in [("Hook.\n\nLesson.", "hook"), ("1.\n2.\n3.", "list")] {
            store.add_template(Template {
                id: Uuid::new_v4(),
                body: body.to_string(),
                tags: vec![tag.to_string()],
                category: Some("Lesson".to_string()),
                content_format: Some(Self::FORMAT.to_string()),
            });
        }

        Self {
            store: Arc::new(store),
            content: Arc::new(content),
            watermark: Arc::new(MemoryWatermark::default()),
            user_id,
        }
    }

    pub fn with_watermark(mut self, watermark: MemoryWatermark) -> Self {
        self.watermark = Arc::new(watermark);
        self
    }

    pub fn ctx(&self) -> ServiceContext {
        ServiceContext {
            store: self.store.clone(),
            content: self.content.clone(),
            watermark: self.watermark.clone(),
        }
    }

    pub fn request(&self, desired: u32) -> GenerationRequest {
        self.request_at(desired, Utc::now())
    }

    pub fn request_at(&self, desired: u32, created_at: DateTime<Utc>) -> GenerationRequest {
        GenerationRequest {
            id: Uuid::new_v4(),
            created_at,
            user_id: Some(self.user_id),
            content_format: Some(Self::FORMAT.to_string()),
            desired_count: desired,
            source_ids: Vec::new(),
            template_tags: Vec::new(),
            category: None,
        }
    }
}

/// `base + minutes`, for laying out request timelines.
pub fn at(base: DateTime<Utc>, minutes: i64) -> DateTime<Utc> {
    base + Duration::minutes(minutes)
}
