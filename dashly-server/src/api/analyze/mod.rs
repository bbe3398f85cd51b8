//! Analyze API module (sales table analysis)

mod handler;

use axum::{Router, routing::post};

use crate::core::ServerState;

pub use handler::AnalyzeResponse;

pub fn router() -> Router<ServerState> {
    Router::new().route("/analyze", post(handler::analyze))
}
