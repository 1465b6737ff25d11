//! HTTP surface for deck generation and the chat assistant.

pub mod chat;
pub mod config;
pub mod error;
pub mod generate;
pub mod state;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

pub use config::ServerConfig;
pub use error::{ApiError, ApiResult};
pub use state::AppState;

/// Largest accepted request body (outline uploads).
pub const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

/// All routes, bound to `state`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(generate::index))
        .route("/generate", post(generate::generate))
        .route("/status/:job_id", get(generate::status))
        .route("/download/:filename", get(generate::download))
        .route("/api/example-outline", get(generate::example_outline))
        .route("/api/tools", get(chat::tools))
        .route("/api/chat/new", post(chat::new_conversation))
        .route("/api/chat/:conversation_id/message", post(chat::send_message))
        .route("/api/chat/:conversation_id/tool", post(chat::execute_tool))
        .route("/api/chat/:conversation_id/slides", get(chat::slides))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}
