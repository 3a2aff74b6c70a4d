// Generation engine: the per-request attempt loop and everything it calls.
// All model calls go through `service::ContentService`; no direct API calls here.

pub mod approval;
pub mod attempt;
pub mod prompts;
pub mod service;
