pub mod chunker;
pub mod continuity_service;
pub mod guardrails;
pub mod llm_json;
pub mod recommendation_service;
pub mod retrieval_service;
pub mod summary_service;
pub mod triage_service;

pub use continuity_service::ContinuityService;
pub use guardrails::GuardrailSet;
pub use recommendation_service::RecommendationService;
pub use retrieval_service::RetrievalService;
pub use summary_service::SummaryService;
pub use triage_service::TriageService;
