//! Fallible external call wrapper.
//!
//! Every datastore and content-service call the engine makes goes through
//! [`guarded`], which names the operation and the unit of work a failure
//! aborts. The failure is logged once here; callers only decide what to skip.

use std::fmt;
use std::future::Future;

use thiserror::Error;
use tracing::warn;

/// Unit of work abandoned when a guarded call fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    /// Skip to the next attempt of the same request.
    Attempt,
    /// Stop the current request; the poller still checkpoints past it.
    Request,
    /// Stop the current tick; the next scheduled tick starts over.
    Tick,
}

impl fmt::Display for Boundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Boundary::Attempt => "attempt",
            Boundary::Request => "request",
            Boundary::Tick => "tick",
        })
    }
}

#[derive(Debug, Clone, Error)]
#[error("{operation} failed, {boundary} aborted: {message}")]
pub struct ExternalFailure {
    pub operation: &'static str,
    pub boundary: Boundary,
    pub message: String,
}

pub async fn guarded<T, E, F>(
    boundary: Boundary,
    operation: &'static str,
    call: F,
) -> Result<T, ExternalFailure>
where
    F: Future<Output = Result<T, E>>,
    E: fmt::Display,
{
    call.await.map_err(|e| {
        let failure = ExternalFailure {
            operation,
            boundary,
            message: e.to_string(),
        };
        warn!("{failure}");
        failure
    })
}
