use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use crate::presentation::http::handlers::DocumentHandler;

pub fn document_routes(document_handler: Arc<DocumentHandler>) -> Router {
    Router::new()
        .route("/documents/ingest", post(DocumentHandler::ingest))
        .route("/documents/seed", post(DocumentHandler::seed))
        .route("/documents/reembed", post(DocumentHandler::reembed))
        .route("/documents/{id}", get(DocumentHandler::get_document))
        .route("/search", get(DocumentHandler::search))
        .with_state(document_handler)
}
