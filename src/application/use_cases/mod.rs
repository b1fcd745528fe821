pub mod backfill_embeddings;
pub mod ingest_documents;
pub mod post_chat_message;

pub use backfill_embeddings::BackfillEmbeddingsUseCase;
pub use ingest_documents::IngestDocumentsUseCase;
pub use post_chat_message::PostChatMessageUseCase;
