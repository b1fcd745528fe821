use std::sync::Arc;

use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::application::services::chunker::{
    ChunkError, DEFAULT_CHUNK_SIZE, DEFAULT_CHUNK_THRESHOLD, DEFAULT_OVERLAP, chunk_text,
    normalize_whitespace,
};
use crate::domain::entities::NewDocument;
use crate::domain::repositories::DocumentRepository;

#[derive(Debug)]
pub enum IngestError {
    InvalidChunking(ChunkError),
    RepositoryError(String),
}

impl std::fmt::Display for IngestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IngestError::InvalidChunking(e) => write!(f, "Invalid chunking parameters: {}", e),
            IngestError::RepositoryError(msg) => write!(f, "Repository error: {}", msg),
        }
    }
}

impl std::error::Error for IngestError {}

/// One raw record from a dataset loader. The id is optional; a stable one is
/// derived from the content when absent so re-runs are replay safe.
#[derive(Debug, Clone, Deserialize)]
pub struct IngestRecord {
    pub id: Option<String>,
    pub source: String,
    pub title: Option<String>,
    pub text: String,
    pub metadata: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChunkingParams {
    pub chunk_size: Option<usize>,
    pub overlap: Option<usize>,
    pub threshold: Option<usize>,
}

#[derive(Debug, Default, PartialEq, serde::Serialize)]
pub struct IngestReport {
    pub inserted: usize,
    pub skipped: usize,
}

/// Batch ingestion: normalize, chunk long texts into overlapping windows,
/// and upsert insert-or-skip. Embeddings are left null for the backfill
/// pass; ingestion never touches the live retrieval path.
pub struct IngestDocumentsUseCase {
    document_repository: Arc<dyn DocumentRepository>,
}

impl IngestDocumentsUseCase {
    pub fn new(document_repository: Arc<dyn DocumentRepository>) -> Self {
        Self { document_repository }
    }

    pub async fn execute(
        &self,
        records: Vec<IngestRecord>,
        params: Option<ChunkingParams>,
    ) -> Result<IngestReport, IngestError> {
        let chunk_size = params
            .as_ref()
            .and_then(|p| p.chunk_size)
            .unwrap_or(DEFAULT_CHUNK_SIZE);
        let overlap = params
            .as_ref()
            .and_then(|p| p.overlap)
            .unwrap_or(DEFAULT_OVERLAP);
        let threshold = params
            .as_ref()
            .and_then(|p| p.threshold)
            .unwrap_or(DEFAULT_CHUNK_THRESHOLD);

        let mut report = IngestReport::default();

        for record in records {
            let text = normalize_whitespace(&record.text);
            if text.is_empty() {
                report.skipped += 1;
                continue;
            }

            let title = record
                .title
                .as_deref()
                .map(normalize_whitespace)
                .filter(|t| !t.is_empty());
            let base_id = record
                .id
                .clone()
                .filter(|id| !id.trim().is_empty())
                .unwrap_or_else(|| derive_id(&record.source, title.as_deref(), &text));

            let chunks =
                chunk_text(&text, chunk_size, overlap, threshold).map_err(IngestError::InvalidChunking)?;
            let chunk_total = chunks.len();

            for (index, chunk) in chunks.into_iter().enumerate() {
                let doc = NewDocument {
                    id: chunk_id(&base_id, index, chunk_total),
                    source: record.source.clone(),
                    title: chunk_title(title.as_deref(), index, chunk_total),
                    text: chunk,
                    metadata: chunk_metadata(
                        record.metadata.clone(),
                        &record.source,
                        &base_id,
                        index,
                        chunk_total,
                    ),
                };

                let inserted = self
                    .document_repository
                    .upsert_document(&doc)
                    .await
                    .map_err(|e| IngestError::RepositoryError(e.to_string()))?;

                if inserted {
                    report.inserted += 1;
                } else {
                    report.skipped += 1;
                }
            }
        }

        Ok(report)
    }
}

fn derive_id(source: &str, title: Option<&str>, text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(source.as_bytes());
    hasher.update(b"\x1f");
    hasher.update(title.unwrap_or("").as_bytes());
    hasher.update(b"\x1f");
    hasher.update(text.as_bytes());
    let digest = format!("{:x}", hasher.finalize());

    let slug: String = source
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect();

    format!("{}_{}", slug, &digest[..16])
}

fn chunk_id(base_id: &str, index: usize, total: usize) -> String {
    if total == 1 {
        base_id.to_string()
    } else {
        format!("{}_c{}", base_id, index)
    }
}

fn chunk_title(title: Option<&str>, index: usize, total: usize) -> Option<String> {
    match (title, total) {
        (Some(t), 1) => Some(t.to_string()),
        (Some(t), _) => Some(format!("{} (chunk {}/{})", t, index + 1, total)),
        (None, _) => None,
    }
}

fn chunk_metadata(
    base: Option<serde_json::Value>,
    source: &str,
    parent_id: &str,
    index: usize,
    total: usize,
) -> serde_json::Value {
    let mut metadata = match base {
        Some(serde_json::Value::Object(map)) => map,
        _ => serde_json::Map::new(),
    };

    metadata.insert("dataset".to_string(), source.into());
    metadata.insert("chunked".to_string(), (total > 1).into());
    if total > 1 {
        metadata.insert("chunk_index".to_string(), index.into());
        metadata.insert("chunk_total".to_string(), total.into());
        metadata.insert("parent_id".to_string(), parent_id.into());
    }

    serde_json::Value::Object(metadata)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{Document, RetrievedDoc};
    use crate::domain::repositories::document_repository::DocumentRepositoryError;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingStore {
        upserted: Mutex<Vec<NewDocument>>,
        existing: Mutex<HashSet<String>>,
    }

    #[async_trait]
    impl DocumentRepository for RecordingStore {
        async fn find_nearest(
            &self,
            _query_embedding: &[f32],
            _k: i64,
            _probes: u32,
        ) -> Result<Vec<RetrievedDoc>, DocumentRepositoryError> {
            Ok(Vec::new())
        }

        async fn upsert_document(
            &self,
            doc: &NewDocument,
        ) -> Result<bool, DocumentRepositoryError> {
            let inserted = self.existing.lock().unwrap().insert(doc.id.clone());
            if inserted {
                self.upserted.lock().unwrap().push(doc.clone());
            }
            Ok(inserted)
        }

        async fn set_embedding(
            &self,
            _document_id: &str,
            _embedding: &[f32],
        ) -> Result<(), DocumentRepositoryError> {
            Ok(())
        }

        async fn find_unembedded(
            &self,
            _limit: i64,
        ) -> Result<Vec<Document>, DocumentRepositoryError> {
            Ok(Vec::new())
        }

        async fn find_by_id(
            &self,
            _document_id: &str,
        ) -> Result<Option<Document>, DocumentRepositoryError> {
            Ok(None)
        }
    }

    fn record(text: &str) -> IngestRecord {
        IngestRecord {
            id: None,
            source: "MedQuAD".to_string(),
            title: Some("Sample entry".to_string()),
            text: text.to_string(),
            metadata: None,
        }
    }

    #[tokio::test]
    async fn test_short_record_stays_whole() {
        let store = Arc::new(RecordingStore::default());
        let use_case = IngestDocumentsUseCase::new(store.clone());

        let report = use_case
            .execute(vec![record("Question: a?\n\nAnswer: b.")], None)
            .await
            .unwrap();

        assert_eq!(report, IngestReport { inserted: 1, skipped: 0 });
        let stored = store.upserted.lock().unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].source, "MedQuAD");
        assert_eq!(stored[0].metadata["dataset"], "MedQuAD");
        assert_eq!(stored[0].metadata["chunked"], false);
        assert!(stored[0].id.starts_with("medquad_"));
    }

    #[tokio::test]
    async fn test_long_record_is_chunked_with_lineage() {
        let store = Arc::new(RecordingStore::default());
        let use_case = IngestDocumentsUseCase::new(store.clone());

        let long_text: String = "evidence ".repeat(400);
        let params = ChunkingParams {
            chunk_size: Some(600),
            overlap: Some(60),
            threshold: Some(800),
        };

        let report = use_case
            .execute(vec![record(&long_text)], Some(params))
            .await
            .unwrap();

        assert!(report.inserted > 1);
        let stored = store.upserted.lock().unwrap();
        let total = stored.len();

        for (i, doc) in stored.iter().enumerate() {
            assert!(doc.id.ends_with(&format!("_c{}", i)));
            assert_eq!(doc.metadata["chunk_index"], i);
            assert_eq!(doc.metadata["chunk_total"], total);
            assert_eq!(doc.metadata["parent_id"], stored[0].id.trim_end_matches("_c0"));
            assert!(
                doc.title
                    .as_deref()
                    .unwrap()
                    .contains(&format!("(chunk {}/{})", i + 1, total))
            );
        }
    }

    #[tokio::test]
    async fn test_reingestion_is_replay_safe() {
        let store = Arc::new(RecordingStore::default());
        let use_case = IngestDocumentsUseCase::new(store.clone());

        let batch = vec![record("Question: a?\n\nAnswer: b.")];
        let first = use_case.execute(batch.clone(), None).await.unwrap();
        let second = use_case.execute(batch, None).await.unwrap();

        assert_eq!(first, IngestReport { inserted: 1, skipped: 0 });
        assert_eq!(second, IngestReport { inserted: 0, skipped: 1 });
    }

    #[tokio::test]
    async fn test_blank_text_is_skipped() {
        let store = Arc::new(RecordingStore::default());
        let use_case = IngestDocumentsUseCase::new(store);

        let report = use_case.execute(vec![record("   \u{00a0} ")], None).await.unwrap();
        assert_eq!(report, IngestReport { inserted: 0, skipped: 1 });
    }

    #[tokio::test]
    async fn test_invalid_overlap_is_rejected() {
        let store = Arc::new(RecordingStore::default());
        let use_case = IngestDocumentsUseCase::new(store);

        let params = ChunkingParams {
            chunk_size: Some(100),
            overlap: Some(200),
            threshold: Some(10),
        };
        let err = use_case
            .execute(vec![record(&"x ".repeat(200))], Some(params))
            .await
            .unwrap_err();

        assert!(matches!(err, IngestError::InvalidChunking(_)));
    }
}
