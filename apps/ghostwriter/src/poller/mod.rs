//! Request Poller: one `tick()` per scheduler firing.
//!
//! Fetches requests newer than the watermark, processes them one at a time
//! in creation order, and checkpoints the watermark after each request.
//! A crash mid-batch therefore only reprocesses the request that was in
//! flight.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{error, info};

use crate::external::{guarded, Boundary};
use crate::generation::attempt::{process_request, RequestOutcome};
use crate::state::ServiceContext;
use crate::watermark::format_watermark;

pub mod scheduler;

/// How often the scheduler fires `tick()`.
pub const POLL_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Default)]
pub struct TickSummary {
    /// Outcomes in processing order.
    pub outcomes: Vec<RequestOutcome>,
    /// Watermark after the tick, `None` if the fetch failed.
    pub watermark: Option<DateTime<Utc>>,
}

#[derive(Clone)]
pub struct Poller {
    ctx: ServiceContext,
}

impl Poller {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    /// Never fails: fetch errors end the tick early, request-level errors
    /// and panics are contained per request.
    pub async fn tick(&self) -> TickSummary {
        let mut watermark = self.ctx.watermark.read().await;
        info!(
            "Checking for generation requests created after {}",
            format_watermark(watermark)
        );

        let mut requests = match guarded(
            Boundary::Tick,
            "fetch_requests_after",
            self.ctx.store.fetch_requests_after(watermark),
        )
        .await
        {
            Ok(requests) => requests,
            Err(_) => return TickSummary::default(),
        };

        if requests.is_empty() {
            info!("No new generation requests found");
            return TickSummary {
                outcomes: Vec::new(),
                watermark: Some(watermark),
            };
        }

        // Creation order, not fetch order.
        requests.sort_by_key(|r| r.created_at);
        info!("Found {} new generation requests", requests.len());

        let mut outcomes = Vec::with_capacity(requests.len());
        for request in requests {
            info!("Processing generation request {}", request.id);

            let ctx = self.ctx.clone();
            let task_request = request.clone();
            let outcome = tokio::spawn(async move { process_request(&ctx, &task_request).await })
                .await
                .unwrap_or_else(|e| {
                    error!("Generation request {} crashed: {e}", request.id);
                    RequestOutcome::crashed(&request)
                });

            info!(
                "Request {} completed: {:?} ({} approved, {} attempts)",
                request.id, outcome.completion, outcome.approved, outcome.attempts
            );

            if request.created_at > watermark {
                watermark = request.created_at;
                self.ctx.watermark.write(watermark).await;
            }
            outcomes.push(outcome);
        }

        TickSummary {
            outcomes,
            watermark: Some(watermark),
        }
    }
}
