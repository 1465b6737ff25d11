//! Chat assistant endpoints.

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::Json;
use deck_core::assistant::GREETING;
use deck_core::tools::tool_catalog;
use deck_core::{ids, AssistantReply, Conversation, Orchestrator, SlideRecord, ToolOutcome};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Serialize)]
pub struct NewConversationResponse {
    pub conversation_id: String,
    pub message: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct MessageRequest {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub conversation_id: String,
    pub response: AssistantReply,
}

#[derive(Debug, Deserialize)]
pub struct ToolRequest {
    #[serde(default)]
    pub tool: String,
    #[serde(default)]
    pub parameters: Value,
}

#[derive(Debug, Serialize)]
pub struct SlidesResponse {
    pub slides: Vec<SlideRecord>,
}

fn conversation_not_found() -> ApiError {
    ApiError::not_found("Conversation not found")
}

pub async fn new_conversation(State(state): State<AppState>) -> Json<NewConversationResponse> {
    let conversation_id = ids::long_id();
    state
        .conversations
        .insert(conversation_id.clone(), Conversation::new(conversation_id.clone()));
    log::debug!("Started conversation {}", conversation_id);

    Json(NewConversationResponse {
        conversation_id,
        message: GREETING,
    })
}

/// Run `f` on a copy of the conversation on the blocking pool, then merge
/// what it added back into the store. The store is not locked while `f`
/// runs.
async fn with_conversation<R, F>(state: &AppState, conversation_id: &str, f: F) -> ApiResult<R>
where
    R: Send + 'static,
    F: FnOnce(&Orchestrator, &mut Conversation) -> R + Send + 'static,
{
    let mut working = state
        .conversations
        .get(conversation_id)
        .ok_or_else(conversation_not_found)?;
    let mark = working.mark();
    let orchestrator = state.orchestrator.clone();

    let (working, result) = tokio::task::spawn_blocking(move || {
        let result = f(orchestrator.as_ref(), &mut working);
        (working, result)
    })
    .await
    .map_err(|e| ApiError::internal(format!("Conversation task failed: {}", e)))?;

    let merged = state
        .conversations
        .with_mut(conversation_id, |conversation| conversation.merge_from(working, mark));
    if merged.is_none() {
        log::debug!("Conversation {} expired while busy", conversation_id);
    }
    Ok(result)
}

pub async fn send_message(
    State(state): State<AppState>,
    Path(conversation_id): Path<String>,
    Json(request): Json<MessageRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let response = with_conversation(&state, &conversation_id, move |orchestrator, conversation| {
        orchestrator.process_message(conversation, &request.message)
    })
    .await?;

    Ok(Json(MessageResponse {
        conversation_id,
        response,
    }))
}

pub async fn execute_tool(
    State(state): State<AppState>,
    Path(conversation_id): Path<String>,
    Json(request): Json<ToolRequest>,
) -> ApiResult<Json<ToolOutcome>> {
    let outcome = with_conversation(&state, &conversation_id, move |orchestrator, conversation| {
        orchestrator.execute_tool(conversation, &request.tool, request.parameters)
    })
    .await?;

    Ok(Json(outcome))
}

pub async fn tools() -> Json<Value> {
    Json(json!({ "tools": tool_catalog() }))
}

pub async fn slides(
    State(state): State<AppState>,
    Path(conversation_id): Path<String>,
) -> ApiResult<Json<SlidesResponse>> {
    let slides = state
        .conversations
        .with(&conversation_id, |conversation| conversation.slides.clone())
        .ok_or_else(conversation_not_found)?;

    Ok(Json(SlidesResponse { slides }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{get, send, test_app};
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use deck_core::{BrandConfig, ConversationStore, DeckRenderer};
    use parking_lot::Mutex;
    use std::sync::{mpsc, Arc};
    use std::time::Duration;

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn post_empty(uri: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_chat_flow() {
        let (app, dir) = test_app();

        let (status, body) = send(app.clone(), post_empty("/api/chat/new")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], GREETING);
        let id = body["conversation_id"].as_str().unwrap().to_string();

        let (_, body) = send(
            app.clone(),
            post_json(
                &format!("/api/chat/{}/message", id),
                json!({ "message": "Create a presentation about our Q3 results" }),
            ),
        )
        .await;
        assert_eq!(body["conversation_id"], id.as_str());
        assert_eq!(body["response"]["type"], "tool_call");
        assert_eq!(body["response"]["tool"], "analyze_content");

        let (_, body) = send(
            app.clone(),
            post_json(
                &format!("/api/chat/{}/tool", id),
                json!({
                    "tool": "create_slide",
                    "parameters": { "type": "title", "title": "Q3 Results" }
                }),
            ),
        )
        .await;
        assert_eq!(body["type"], "tool_result");
        assert_eq!(body["slide"]["gradient"], "ultraviolet");

        let (_, body) = get(app.clone(), &format!("/api/chat/{}/slides", id)).await;
        assert_eq!(body["slides"].as_array().unwrap().len(), 1);

        let (_, body) = send(
            app.clone(),
            post_json(
                &format!("/api/chat/{}/tool", id),
                json!({ "tool": "render_presentation", "parameters": {} }),
            ),
        )
        .await;
        assert_eq!(body["type"], "tool_result");
        let url = body["download_url"].as_str().unwrap();
        assert_eq!(url, format!("/download/deck_chat_{}.pptx", id));
        assert!(dir.path().join(format!("deck_chat_{}.pptx", id)).exists());

        let (status, _) = get(app, url).await;
        assert_eq!(status, StatusCode::OK);
    }

    /// Checks from another thread that the conversation store can be locked
    /// while a deck is being rendered.
    struct StoreCheckingRenderer {
        conversations: Arc<ConversationStore>,
        store_free: Mutex<Vec<bool>>,
    }

    impl DeckRenderer for StoreCheckingRenderer {
        fn render_to_path(&self, _slides: &[SlideRecord], _path: &std::path::Path) -> deck_core::Result<()> {
            let conversations = self.conversations.clone();
            let (tx, rx) = mpsc::channel();
            std::thread::spawn(move || {
                let _ = tx.send(conversations.len());
            });
            let free = rx.recv_timeout(Duration::from_secs(2)).is_ok();
            self.store_free.lock().push(free);
            Ok(())
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_render_leaves_store_unlocked() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = AppState::new(BrandConfig::default(), dir.path());
        let renderer = Arc::new(StoreCheckingRenderer {
            conversations: state.conversations.clone(),
            store_free: Mutex::new(Vec::new()),
        });
        state.orchestrator = Arc::new(Orchestrator::new(renderer.clone(), dir.path()));
        let app = crate::router(state);

        let (_, body) = send(app.clone(), post_empty("/api/chat/new")).await;
        let id = body["conversation_id"].as_str().unwrap().to_string();
        let tool_uri = format!("/api/chat/{}/tool", id);
        send(
            app.clone(),
            post_json(&tool_uri, json!({ "tool": "create_slide", "parameters": { "type": "title", "title": "T" } })),
        )
        .await;

        let (_, body) = send(
            app.clone(),
            post_json(&tool_uri, json!({ "tool": "render_presentation", "parameters": {} })),
        )
        .await;
        assert_eq!(body["type"], "tool_result");
        assert_eq!(*renderer.store_free.lock(), vec![true]);

        // The slide created before the render is still stored
        let (_, body) = get(app, &format!("/api/chat/{}/slides", id)).await;
        assert_eq!(body["slides"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_tool_is_an_error_outcome() {
        let (app, _dir) = test_app();
        let (_, body) = send(app.clone(), post_empty("/api/chat/new")).await;
        let id = body["conversation_id"].as_str().unwrap().to_string();

        let (status, body) = send(
            app,
            post_json(&format!("/api/chat/{}/tool", id), json!({ "tool": "make_coffee" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["type"], "error");
        assert_eq!(body["message"], "Unknown tool: make_coffee");
    }

    #[tokio::test]
    async fn test_unknown_conversation() {
        let (app, _dir) = test_app();

        let (status, body) = get(app.clone(), "/api/chat/missing/slides").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "error": "Conversation not found" }));

        let (status, _) = send(
            app,
            post_json("/api/chat/missing/message", json!({ "message": "hi" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_tool_catalog() {
        let (app, _dir) = test_app();
        let (status, body) = get(app, "/api/tools").await;

        assert_eq!(status, StatusCode::OK);
        for tool in ["create_slide", "generate_chart", "analyze_content", "render_presentation"] {
            assert!(body["tools"][tool]["description"].is_string(), "missing {}", tool);
        }
    }
}
