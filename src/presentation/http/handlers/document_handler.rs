use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use std::sync::Arc;

use crate::application::services::RetrievalService;
use crate::application::use_cases::ingest_documents::IngestRecord;
use crate::application::use_cases::{BackfillEmbeddingsUseCase, IngestDocumentsUseCase};
use crate::domain::repositories::DocumentRepository;
use crate::presentation::http::dto::{
    ApiResponse, DocumentDto, IngestRequestDto, ReembedAcceptedDto, RetrievedDocDto,
    SearchRequestDto, SearchResponseDto,
};

pub struct DocumentHandler {
    ingest_use_case: Arc<IngestDocumentsUseCase>,
    backfill_use_case: Arc<BackfillEmbeddingsUseCase>,
    retrieval_service: Arc<RetrievalService>,
    document_repository: Arc<dyn DocumentRepository>,
}

impl DocumentHandler {
    pub fn new(
        ingest_use_case: Arc<IngestDocumentsUseCase>,
        backfill_use_case: Arc<BackfillEmbeddingsUseCase>,
        retrieval_service: Arc<RetrievalService>,
        document_repository: Arc<dyn DocumentRepository>,
    ) -> Self {
        Self {
            ingest_use_case,
            backfill_use_case,
            retrieval_service,
            document_repository,
        }
    }

    pub async fn ingest(
        State(handler): State<Arc<DocumentHandler>>,
        Json(body): Json<IngestRequestDto>,
    ) -> Result<impl IntoResponse, StatusCode> {
        if body.records.is_empty() {
            return Ok((
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::error(
                    "EMPTY_BATCH",
                    "Ingestion batch cannot be empty".to_string(),
                )),
            ));
        }

        match handler
            .ingest_use_case
            .execute(body.records, body.chunking)
            .await
        {
            Ok(report) => Ok((StatusCode::CREATED, Json(ApiResponse::success(report)))),
            Err(e) => Ok((
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::error("INGEST_FAILED", e.to_string())),
            )),
        }
    }

    /// Development seed mirroring the smallest useful corpus; real datasets
    /// arrive through `ingest`.
    pub async fn seed(
        State(handler): State<Arc<DocumentHandler>>,
    ) -> Result<impl IntoResponse, StatusCode> {
        let records = vec![IngestRecord {
            id: Some("seed_1".to_string()),
            source: "MedQuAD".to_string(),
            title: Some("Skin cancer warning signs (ABCDE)".to_string()),
            text: "If a mole changes in Asymmetry, Border, Color, Diameter, or Evolving, \
                   consider medical evaluation. Seek a dermatologist for assessment."
                .to_string(),
            metadata: Some(serde_json::json!({ "seeded": true })),
        }];

        match handler.ingest_use_case.execute(records, None).await {
            Ok(report) => Ok((StatusCode::CREATED, Json(ApiResponse::success(report)))),
            Err(e) => Ok((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("SEED_FAILED", e.to_string())),
            )),
        }
    }

    /// Kicks off the embedding backfill in the background and returns
    /// immediately; progress lands in the logs.
    pub async fn reembed(
        State(handler): State<Arc<DocumentHandler>>,
    ) -> Result<impl IntoResponse, StatusCode> {
        let backfill = handler.backfill_use_case.clone();
        tokio::spawn(async move {
            match backfill.execute().await {
                Ok(report) => {
                    tracing::info!(
                        "embedding backfill finished: {} updated, {} failed",
                        report.updated,
                        report.failed
                    );
                }
                Err(e) => {
                    tracing::error!("embedding backfill aborted: {}", e);
                }
            }
        });

        Ok((
            StatusCode::ACCEPTED,
            Json(ApiResponse::success(ReembedAcceptedDto {
                message: "Embedding backfill started".to_string(),
            })),
        ))
    }

    pub async fn search(
        State(handler): State<Arc<DocumentHandler>>,
        Query(params): Query<SearchRequestDto>,
    ) -> Result<impl IntoResponse, StatusCode> {
        if params.query.trim().is_empty() {
            return Ok((
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::error(
                    "EMPTY_QUERY",
                    "Query cannot be empty".to_string(),
                )),
            ));
        }

        let docs = handler
            .retrieval_service
            .retrieve(&params.query, params.k)
            .await;

        let response = SearchResponseDto {
            query: params.query,
            docs: docs.into_iter().map(RetrievedDocDto::from).collect(),
        };

        Ok((StatusCode::OK, Json(ApiResponse::success(response))))
    }

    pub async fn get_document(
        State(handler): State<Arc<DocumentHandler>>,
        Path(document_id): Path<String>,
    ) -> Result<impl IntoResponse, StatusCode> {
        match handler.document_repository.find_by_id(&document_id).await {
            Ok(Some(doc)) => Ok((
                StatusCode::OK,
                Json(ApiResponse::success(DocumentDto::from(doc))),
            )),
            Ok(None) => Ok((
                StatusCode::NOT_FOUND,
                Json(ApiResponse::error(
                    "DOCUMENT_NOT_FOUND",
                    format!("Document not found: {}", document_id),
                )),
            )),
            Err(e) => Ok((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("DOCUMENT_FETCH_FAILED", e.to_string())),
            )),
        }
    }
}
