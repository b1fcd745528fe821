use std::sync::Arc;

use crate::{
    application::{
        ports::LanguageModel,
        services::{
            ContinuityService, RecommendationService, RetrievalService, SummaryService,
            TriageService,
        },
        use_cases::{BackfillEmbeddingsUseCase, IngestDocumentsUseCase, PostChatMessageUseCase},
    },
    domain::repositories::{ChatRepository, DoctorDirectory, DocumentRepository},
    infrastructure::{
        database::{
            create_connection_pool, get_connection_from_pool,
            repositories::{
                PostgresChatRepository, PostgresDoctorDirectory, PostgresDocumentRepository,
            },
            run_migrations,
        },
        external_services::OllamaClient,
    },
    presentation::http::handlers::{ChatHandler, DocumentHandler},
};

pub struct AppContainer {
    // Repositories
    pub chat_repository: Arc<dyn ChatRepository>,
    pub document_repository: Arc<dyn DocumentRepository>,
    pub doctor_directory: Arc<dyn DoctorDirectory>,

    // External services
    pub language_model: Arc<dyn LanguageModel>,

    // Application services
    pub retrieval_service: Arc<RetrievalService>,
    pub triage_service: Arc<TriageService>,
    pub continuity_service: Arc<ContinuityService>,
    pub summary_service: Arc<SummaryService>,
    pub recommendation_service: Arc<RecommendationService>,

    // Use cases
    pub post_message_use_case: Arc<PostChatMessageUseCase>,
    pub ingest_use_case: Arc<IngestDocumentsUseCase>,
    pub backfill_use_case: Arc<BackfillEmbeddingsUseCase>,

    // HTTP handlers
    pub chat_handler: Arc<ChatHandler>,
    pub document_handler: Arc<DocumentHandler>,
}

impl AppContainer {
    pub async fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let db_pool = create_connection_pool()?;
        {
            let mut conn = get_connection_from_pool(&db_pool)?;
            run_migrations(&mut conn)?;
        }

        // Repositories
        let chat_repository: Arc<dyn ChatRepository> =
            Arc::new(PostgresChatRepository::new(db_pool.clone()));
        let document_repository: Arc<dyn DocumentRepository> =
            Arc::new(PostgresDocumentRepository::new(db_pool.clone()));
        let doctor_directory: Arc<dyn DoctorDirectory> =
            Arc::new(PostgresDoctorDirectory::new(db_pool));

        // External services
        let language_model: Arc<dyn LanguageModel> = Arc::new(OllamaClient::from_env()?);

        // Application services
        let mut retrieval_service =
            RetrievalService::new(language_model.clone(), document_repository.clone());
        if let Some(probes) = std::env::var("IVFFLAT_PROBES")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            retrieval_service = retrieval_service.with_probes(probes);
        }
        let retrieval_service = Arc::new(retrieval_service);
        let triage_service = Arc::new(TriageService::new(language_model.clone()));
        let continuity_service = Arc::new(ContinuityService::new(
            language_model.clone(),
            chat_repository.clone(),
        ));
        let summary_service = Arc::new(SummaryService::new(
            language_model.clone(),
            chat_repository.clone(),
        ));
        let recommendation_service =
            Arc::new(RecommendationService::new(doctor_directory.clone()));

        // Use cases
        let post_message_use_case = Arc::new(PostChatMessageUseCase::new(
            chat_repository.clone(),
            continuity_service.clone(),
            triage_service.clone(),
            retrieval_service.clone(),
            recommendation_service.clone(),
            summary_service.clone(),
        ));
        let ingest_use_case = Arc::new(IngestDocumentsUseCase::new(document_repository.clone()));
        let backfill_use_case = Arc::new(BackfillEmbeddingsUseCase::new(
            document_repository.clone(),
            language_model.clone(),
        ));

        // HTTP handlers
        let chat_handler = Arc::new(ChatHandler::new(
            chat_repository.clone(),
            post_message_use_case.clone(),
        ));
        let document_handler = Arc::new(DocumentHandler::new(
            ingest_use_case.clone(),
            backfill_use_case.clone(),
            retrieval_service.clone(),
            document_repository.clone(),
        ));

        Ok(Self {
            chat_repository,
            document_repository,
            doctor_directory,
            language_model,
            retrieval_service,
            triage_service,
            continuity_service,
            summary_service,
            recommendation_service,
            post_message_use_case,
            ingest_use_case,
            backfill_use_case,
            chat_handler,
            document_handler,
        })
    }
}
