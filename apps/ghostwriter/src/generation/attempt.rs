//! Generation Attempt Loop: drives one request to its desired approved count.
//!
//! Per attempt: draw a QA pair → draw a template → draft → brand edit →
//! trim if too long → screen → parse verdict → persist → pause.
//!
//! Failures are scoped: a failed external call aborts the attempt, an empty
//! QA-pair or template pool ends the request, and nothing is escalated.
//! Every attempt counts against the budget, so the loop always terminates.

use std::time::Duration;

use rand::Rng;
use tracing::{info, warn};
use uuid::Uuid;

use crate::external::{guarded, Boundary, ExternalFailure};
use crate::generation::approval::parse_verdict;
use crate::generation::prompts::{generation_instructions, source_material};
use crate::llm_client::Message;
use crate::models::content::{ApprovalStatus, AttemptResult};
use crate::models::request::GenerationRequest;
use crate::models::user::User;
use crate::state::ServiceContext;
use crate::store::TemplateFilter;

/// `max_attempts = desired_count × ATTEMPT_MULTIPLIER`.
pub const ATTEMPT_MULTIPLIER: u32 = 5;
/// Drafts longer than this many characters go through the trim pass.
pub const LENGTH_CEILING: usize = 280;
/// Pause between attempts, regardless of outcome, to go easy on the AI services.
pub const ATTEMPT_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Starvation {
    QaPairs,
    Templates,
}

/// How a request's processing ended. Every variant counts as completed for
/// watermark purposes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// Desired approved count reached.
    Fulfilled,
    /// Attempt budget spent first.
    Exhausted,
    /// No matching QA pair or template; ended early.
    Starved(Starvation),
    /// Never started: no usable user.
    Skipped(String),
    /// The loop panicked; contained by the poller.
    Crashed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestOutcome {
    pub request_id: Uuid,
    pub approved: u32,
    pub attempts: u32,
    pub completion: Completion,
}

impl RequestOutcome {
    fn not_started(request: &GenerationRequest, completion: Completion) -> Self {
        RequestOutcome {
            request_id: request.id,
            approved: 0,
            attempts: 0,
            completion,
        }
    }

    pub fn crashed(request: &GenerationRequest) -> Self {
        Self::not_started(request, Completion::Crashed)
    }
}

enum AttemptOutcome {
    Persisted(ApprovalStatus),
    Starved(Starvation),
}

/// Uniform choice over a freshly fetched snapshot. Consumes the pool.
pub fn choose_one<T>(mut pool: Vec<T>) -> Option<T> {
    if pool.is_empty() {
        return None;
    }
    let index = rand::thread_rng().gen_range(0..pool.len());
    Some(pool.swap_remove(index))
}

/// Resolves the request's user, then runs the attempt loop.
/// A request without a usable user is skipped, not retried.
pub async fn process_request(ctx: &ServiceContext, request: &GenerationRequest) -> RequestOutcome {
    let Some(user_id) = request.user_id else {
        warn!("Generation request {} has no user reference; skipping", request.id);
        return RequestOutcome::not_started(
            request,
            Completion::Skipped("no user reference".to_string()),
        );
    };

    let user = match guarded(Boundary::Request, "fetch_user", ctx.store.fetch_user(user_id)).await
    {
        Ok(Some(user)) => user,
        Ok(None) => {
            warn!("User {} for request {} not found; skipping", user_id, request.id);
            return RequestOutcome::not_started(
                request,
                Completion::Skipped(format!("user {user_id} not found")),
            );
        }
        Err(failure) => {
            return RequestOutcome::not_started(request, Completion::Skipped(failure.to_string()))
        }
    };

    run_attempts(ctx, request, &user).await
}

/// The bounded generate/screen loop for one request and its resolved user.
pub async fn run_attempts(
    ctx: &ServiceContext,
    request: &GenerationRequest,
    user: &User,
) -> RequestOutcome {
    let desired = request.desired_count;
    let max_attempts = desired.saturating_mul(ATTEMPT_MULTIPLIER);
    let instructions = generation_instructions(&user.brand_voice);

    let mut approved = 0;
    let mut attempts = 0;

    while approved < desired && attempts < max_attempts {
        attempts += 1;
        info!(
            "Generating content {}/{} for request {} (attempt {}/{})",
            approved + 1,
            desired,
            request.id,
            attempts,
            max_attempts
        );

        match attempt_once(ctx, request, user, &instructions).await {
            Ok(AttemptOutcome::Persisted(status)) => {
                info!("Request {}: attempt {} {}", request.id, attempts, status);
                if status.is_approved() {
                    approved += 1;
                }
            }
            Ok(AttemptOutcome::Starved(starvation)) => {
                warn!(
                    "Request {} starved of {:?} after {} attempts ({} approved)",
                    request.id, starvation, attempts, approved
                );
                return RequestOutcome {
                    request_id: request.id,
                    approved,
                    attempts,
                    completion: Completion::Starved(starvation),
                };
            }
            // Already logged by `guarded`; the attempt still counts.
            Err(_) => {}
        }

        tokio::time::sleep(ATTEMPT_DELAY).await;
    }

    let completion = if approved >= desired {
        info!(
            "Request {} fulfilled: {}/{} approved in {} attempts",
            request.id, approved, desired, attempts
        );
        Completion::Fulfilled
    } else {
        warn!(
            "Request {} exhausted its {} attempts with {}/{} approved",
            request.id, max_attempts, approved, desired
        );
        Completion::Exhausted
    };

    RequestOutcome {
        request_id: request.id,
        approved,
        attempts,
        completion,
    }
}

async fn attempt_once(
    ctx: &ServiceContext,
    request: &GenerationRequest,
    user: &User,
    instructions: &str,
) -> Result<AttemptOutcome, ExternalFailure> {
    let qa_pool = guarded(
        Boundary::Attempt,
        "fetch_qa_pairs",
        ctx.store.fetch_qa_pairs(&request.source_ids),
    )
    .await?;
    let Some(qa) = choose_one(qa_pool) else {
        return Ok(AttemptOutcome::Starved(Starvation::QaPairs));
    };

    let templates = guarded(
        Boundary::Attempt,
        "fetch_templates",
        ctx.store.fetch_templates(TemplateFilter::for_request(request)),
    )
    .await?;
    let Some(template) = choose_one(templates) else {
        return Ok(AttemptOutcome::Starved(Starvation::Templates));
    };

    let first_draft = guarded(
        Boundary::Attempt,
        "generate",
        ctx.content
            .generate(instructions, &qa.question, &qa.answer, &template.body),
    )
    .await?;

    let conversation = [
        Message::user(source_material(&qa.question, &qa.answer, &template.body)),
        Message::assistant(first_draft),
    ];
    let mut draft = guarded(
        Boundary::Attempt,
        "edit",
        ctx.content
            .edit(instructions, &conversation, &user.brand_voice),
    )
    .await?;

    if draft.chars().count() > LENGTH_CEILING {
        draft = guarded(
            Boundary::Attempt,
            "trim",
            ctx.content.trim(&draft, LENGTH_CEILING),
        )
        .await?;
        let length = draft.chars().count();
        if length > LENGTH_CEILING {
            warn!(
                "Trimmed draft for request {} is still {} characters",
                request.id, length
            );
        }
    }

    info!("Generated content for request {}: {}", request.id, draft);

    let verdict = guarded(
        Boundary::Attempt,
        "screen",
        ctx.content.screen(&draft, &user.sample_content),
    )
    .await?;
    info!("Screening result for request {}: {}", request.id, verdict);

    let status = parse_verdict(&verdict);
    let result = AttemptResult {
        request_id: request.id,
        draft,
        status,
        verdict,
    };
    guarded(
        Boundary::Attempt,
        "append_attempt_result",
        ctx.store.append_attempt_result(&result),
    )
    .await?;

    Ok(AttemptOutcome::Persisted(status))
}
