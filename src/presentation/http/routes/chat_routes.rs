use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use crate::presentation::http::handlers::ChatHandler;

pub fn chat_routes(chat_handler: Arc<ChatHandler>) -> Router {
    Router::new()
        .route("/chats", post(ChatHandler::create_chat))
        .route("/patients/{id}/chats", get(ChatHandler::list_patient_chats))
        .route(
            "/chats/{id}/messages",
            get(ChatHandler::list_messages).post(ChatHandler::post_message),
        )
        .with_state(chat_handler)
}
