use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use futures::StreamExt;
use futures::stream;

use crate::application::ports::LanguageModel;
use crate::domain::repositories::DocumentRepository;
use crate::domain::repositories::document_repository::DocumentRepositoryError;

pub const BACKFILL_BATCH: i64 = 100;
pub const BACKFILL_CONCURRENCY: usize = 2;
pub const EMBED_MAX_CHARS: usize = 6000;

#[derive(Debug, Default, PartialEq, serde::Serialize)]
pub struct BackfillReport {
    pub updated: usize,
    pub failed: usize,
}

/// Batch job populating null embeddings, decoupled from chat traffic so
/// ingestion backlogs never block retrieval latency. Pages through
/// unembedded rows oldest first with a small bounded-concurrency pool and
/// stops early when a page produced failures, leaving those rows for the
/// next run.
pub struct BackfillEmbeddingsUseCase {
    document_repository: Arc<dyn DocumentRepository>,
    language_model: Arc<dyn LanguageModel>,
}

impl BackfillEmbeddingsUseCase {
    pub fn new(
        document_repository: Arc<dyn DocumentRepository>,
        language_model: Arc<dyn LanguageModel>,
    ) -> Self {
        Self {
            document_repository,
            language_model,
        }
    }

    pub async fn execute(&self) -> Result<BackfillReport, DocumentRepositoryError> {
        let updated = AtomicUsize::new(0);
        let failed = AtomicUsize::new(0);

        loop {
            let page = self
                .document_repository
                .find_unembedded(BACKFILL_BATCH)
                .await?;
            if page.is_empty() {
                break;
            }

            tracing::info!(
                "embedding backfill page of {} (updated so far: {})",
                page.len(),
                updated.load(Ordering::SeqCst)
            );

            let failed_before = failed.load(Ordering::SeqCst);

            stream::iter(page)
                .for_each_concurrent(BACKFILL_CONCURRENCY, |doc| {
                    let updated = &updated;
                    let failed = &failed;
                    async move {
                        let input = truncate_for_embedding(&doc.embedding_input());

                        let vector = match self.language_model.embed(&input).await {
                            Ok(vector) => vector,
                            Err(e) => {
                                tracing::warn!("embedding failed for {}: {}", doc.id(), e);
                                failed.fetch_add(1, Ordering::SeqCst);
                                return;
                            }
                        };

                        match self.document_repository.set_embedding(doc.id(), &vector).await {
                            Ok(()) => {
                                updated.fetch_add(1, Ordering::SeqCst);
                            }
                            Err(e) => {
                                tracing::warn!("embedding persist failed for {}: {}", doc.id(), e);
                                failed.fetch_add(1, Ordering::SeqCst);
                            }
                        }
                    }
                })
                .await;

            // Failed rows are still unembedded and would be re-selected
            // immediately; stop instead of spinning on a broken backend.
            if failed.load(Ordering::SeqCst) > failed_before {
                break;
            }
        }

        Ok(BackfillReport {
            updated: updated.into_inner(),
            failed: failed.into_inner(),
        })
    }
}

fn truncate_for_embedding(text: &str) -> String {
    if text.chars().count() <= EMBED_MAX_CHARS {
        return text.to_string();
    }
    text.chars().take(EMBED_MAX_CHARS).collect()
}
