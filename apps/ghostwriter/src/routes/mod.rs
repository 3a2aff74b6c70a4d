pub mod liveness;

use axum::{http::Uri, routing::get, Router};

use crate::errors::AppError;

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("No route for {}", uri.path()))
}

pub fn build_router() -> Router {
    Router::new()
        .route("/", get(liveness::liveness_handler))
        .fallback(not_found)
}
