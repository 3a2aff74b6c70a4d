/// Body of `GET /`. Processing is timer-driven, so this is the whole HTTP surface.
pub const LIVENESS_MESSAGE: &str = "Ghostwriter Automation Web App is running.";

/// GET /
pub async fn liveness_handler() -> &'static str {
    LIVENESS_MESSAGE
}
