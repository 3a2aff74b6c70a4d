// Shared prompt fragments. Each service that needs LLM calls defines its
// own prompts.rs alongside it; only cross-cutting rules live here.

/// Formatting rule appended to every prompt that produces publishable copy.
pub const PLAIN_COPY_RULES: &str = "\
    Output only the post itself: no preamble, no commentary, no quotation marks around it. \
    Never use hashtags (#) or emojis.";
