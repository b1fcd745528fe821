use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A reference document in the retrieval corpus. The `id` is stable and
/// deterministic per source+chunk so ingestion re-runs are replay safe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    id: String,
    source: String,
    title: Option<String>,
    text: String,
    metadata: serde_json::Value,
    created_at: DateTime<Utc>,
}

impl Document {
    pub fn new(
        id: String,
        source: String,
        title: Option<String>,
        text: String,
        metadata: serde_json::Value,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            source,
            title,
            text,
            metadata,
            created_at,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn metadata(&self) -> &serde_json::Value {
        &self.metadata
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn embedding_input(&self) -> String {
        format!("{}\n\n{}", self.title.as_deref().unwrap_or(""), self.text)
    }
}

/// Insert payload for the document store. Upserts are insert-or-skip on the
/// primary key, never overwrite.
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub id: String,
    pub source: String,
    pub title: Option<String>,
    pub text: String,
    pub metadata: serde_json::Value,
}

/// A nearest-neighbor hit. `score` is the cosine distance, lower is closer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedDoc {
    pub id: String,
    pub source: String,
    pub title: Option<String>,
    pub text: String,
    pub score: f64,
}
