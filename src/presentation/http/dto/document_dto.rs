use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::application::use_cases::ingest_documents::{ChunkingParams, IngestRecord};
use crate::domain::entities::{Document, RetrievedDoc};

#[derive(Debug, Deserialize)]
pub struct IngestRequestDto {
    pub records: Vec<IngestRecord>,
    pub chunking: Option<ChunkingParams>,
}

#[derive(Debug, Deserialize)]
pub struct SearchRequestDto {
    pub query: String,
    #[serde(default = "default_k")]
    pub k: i64,
}

fn default_k() -> i64 {
    5
}

#[derive(Debug, Serialize)]
pub struct SearchResponseDto {
    pub query: String,
    pub docs: Vec<RetrievedDocDto>,
}

#[derive(Debug, Serialize)]
pub struct RetrievedDocDto {
    pub id: String,
    pub source: String,
    pub title: Option<String>,
    pub text: String,
    pub score: f64,
}

impl From<RetrievedDoc> for RetrievedDocDto {
    fn from(doc: RetrievedDoc) -> Self {
        Self {
            id: doc.id,
            source: doc.source,
            title: doc.title,
            text: doc.text,
            score: doc.score,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DocumentDto {
    pub id: String,
    pub source: String,
    pub title: Option<String>,
    pub text: String,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl From<Document> for DocumentDto {
    fn from(doc: Document) -> Self {
        Self {
            id: doc.id().to_string(),
            source: doc.source().to_string(),
            title: doc.title().map(|t| t.to_string()),
            text: doc.text().to_string(),
            metadata: doc.metadata().clone(),
            created_at: doc.created_at(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ReembedAcceptedDto {
    pub message: String,
}
