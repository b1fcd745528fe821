use std::sync::Arc;

use crate::application::ports::LanguageModel;
use crate::domain::entities::RetrievedDoc;
use crate::domain::repositories::DocumentRepository;

/// ivfflat recall tuning for a corpus around 18k documents.
pub const DEFAULT_PROBES: u32 = 50;

/// Embeds the query and runs nearest-neighbor search over the document
/// store. Degrades to an empty result set on any backend failure; "no
/// context" is a valid state for the answer pass, not an error.
pub struct RetrievalService {
    language_model: Arc<dyn LanguageModel>,
    document_repository: Arc<dyn DocumentRepository>,
    probes: u32,
}

impl RetrievalService {
    pub fn new(
        language_model: Arc<dyn LanguageModel>,
        document_repository: Arc<dyn DocumentRepository>,
    ) -> Self {
        Self {
            language_model,
            document_repository,
            probes: DEFAULT_PROBES,
        }
    }

    pub fn with_probes(mut self, probes: u32) -> Self {
        self.probes = probes;
        self
    }

    pub async fn retrieve(&self, query: &str, k: i64) -> Vec<RetrievedDoc> {
        // The same model embeds documents and queries; the prefix marks
        // this as the query side.
        let query_embedding = match self
            .language_model
            .embed(&format!("query: {}", query))
            .await
        {
            Ok(embedding) => embedding,
            Err(e) => {
                tracing::warn!("query embedding failed, retrieval degraded to empty: {}", e);
                return Vec::new();
            }
        };

        match self
            .document_repository
            .find_nearest(&query_embedding, k, self.probes)
            .await
        {
            Ok(docs) => docs,
            Err(e) => {
                tracing::warn!("vector search failed, retrieval degraded to empty: {}", e);
                Vec::new()
            }
        }
    }
}
