use async_trait::async_trait;

use crate::domain::entities::{Document, NewDocument, RetrievedDoc};

#[derive(Debug)]
pub enum DocumentRepositoryError {
    DatabaseError(String),
}

impl std::fmt::Display for DocumentRepositoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentRepositoryError::DatabaseError(msg) => write!(f, "Database error: {}", msg),
        }
    }
}

impl std::error::Error for DocumentRepositoryError {}

/// Vector store port. Nearest-neighbor search operates only over rows with a
/// non-null embedding; upserts are insert-or-skip so re-ingestion is safe to
/// replay.
#[async_trait]
pub trait DocumentRepository: Send + Sync {
    /// Returns up to `k` documents ordered by ascending cosine distance.
    /// `probes` bounds the ivfflat accuracy/speed tradeoff.
    async fn find_nearest(
        &self,
        query_embedding: &[f32],
        k: i64,
        probes: u32,
    ) -> Result<Vec<RetrievedDoc>, DocumentRepositoryError>;

    /// Insert-or-skip on primary key. Returns true when a row was inserted.
    async fn upsert_document(&self, doc: &NewDocument) -> Result<bool, DocumentRepositoryError>;

    async fn set_embedding(
        &self,
        document_id: &str,
        embedding: &[f32],
    ) -> Result<(), DocumentRepositoryError>;

    /// Rows awaiting the embedding backfill, oldest first.
    async fn find_unembedded(&self, limit: i64)
    -> Result<Vec<Document>, DocumentRepositoryError>;

    async fn find_by_id(&self, document_id: &str)
    -> Result<Option<Document>, DocumentRepositoryError>;
}
