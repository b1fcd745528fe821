use std::sync::Arc;

use uuid::Uuid;

use crate::application::services::triage_service::{EMERGENCY_ACTIONS, EMERGENCY_MESSAGE};
use crate::application::services::{
    ContinuityService, GuardrailSet, RecommendationService, RetrievalService, SummaryService,
    TriageService,
};
use crate::domain::entities::{
    Message, MessageRole, MessageSources, SourceDoc, SourcesMeta, SourcesUi,
};
use crate::domain::repositories::ChatRepository;

const RETRIEVAL_TOP_K: i64 = 5;

const NEW_ISSUE_NOTE: &str = "This message looks like a different medical issue. \
For better tracking, start a new chat.";

/// Turn progression. Retrieval is skipped for the highest urgency tier; the
/// terminal state is always `Persisted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    Received,
    ContinuityChecked,
    Triaged,
    Guardrailed,
    Retrieved,
    Answered,
    Persisted,
}

impl TurnState {
    pub fn as_str(&self) -> &'static str {
        match self {
            TurnState::Received => "RECEIVED",
            TurnState::ContinuityChecked => "CONTINUITY_CHECKED",
            TurnState::Triaged => "TRIAGED",
            TurnState::Guardrailed => "GUARDRAILED",
            TurnState::Retrieved => "RETRIEVED",
            TurnState::Answered => "ANSWERED",
            TurnState::Persisted => "PERSISTED",
        }
    }
}

#[derive(Debug)]
pub enum PostMessageError {
    ChatNotFound(Uuid),
    PersistenceError(String),
}

impl std::fmt::Display for PostMessageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PostMessageError::ChatNotFound(id) => write!(f, "Chat not found: {}", id),
            PostMessageError::PersistenceError(msg) => write!(f, "Persistence error: {}", msg),
        }
    }
}

impl std::error::Error for PostMessageError {}

#[derive(Debug)]
pub struct TurnOutcome {
    pub user_message: Message,
    pub assistant_message: Message,
}

/// Orchestrates one chat turn as a sequential pipeline. LLM failures inside
/// any stage degrade to safe defaults; the only errors that fail the turn
/// are a missing chat and message persistence.
pub struct PostChatMessageUseCase {
    chat_repository: Arc<dyn ChatRepository>,
    continuity_service: Arc<ContinuityService>,
    triage_service: Arc<TriageService>,
    retrieval_service: Arc<RetrievalService>,
    recommendation_service: Arc<RecommendationService>,
    summary_service: Arc<SummaryService>,
    guardrails: GuardrailSet,
}

impl PostChatMessageUseCase {
    pub fn new(
        chat_repository: Arc<dyn ChatRepository>,
        continuity_service: Arc<ContinuityService>,
        triage_service: Arc<TriageService>,
        retrieval_service: Arc<RetrievalService>,
        recommendation_service: Arc<RecommendationService>,
        summary_service: Arc<SummaryService>,
    ) -> Self {
        Self {
            chat_repository,
            continuity_service,
            triage_service,
            retrieval_service,
            recommendation_service,
            summary_service,
            guardrails: GuardrailSet::default(),
        }
    }

    pub async fn execute(
        &self,
        chat_id: Uuid,
        content: &str,
    ) -> Result<TurnOutcome, PostMessageError> {
        let mut state = TurnState::Received;

        let chat = self
            .chat_repository
            .find_chat(chat_id)
            .await
            .map_err(|e| PostMessageError::PersistenceError(e.to_string()))?;
        if chat.is_none() {
            return Err(PostMessageError::ChatNotFound(chat_id));
        }

        // Continuity looks at history *before* this message is appended,
        // so run it against the store first, then persist.
        let new_issue = self.continuity_service.detect_new_issue(chat_id, content).await;
        advance(&mut state, TurnState::ContinuityChecked);

        let user_message = self
            .chat_repository
            .append_message(chat_id, MessageRole::User, content, None)
            .await
            .map_err(|e| PostMessageError::PersistenceError(e.to_string()))?;

        let mut triage = self.triage_service.classify(content).await;
        advance(&mut state, TurnState::Triaged);

        if let Some(rule) = self.guardrails.apply(content, &mut triage) {
            tracing::info!("guardrail {} fired for chat {}", rule, chat_id);
        }
        advance(&mut state, TurnState::Guardrailed);

        let emergency = triage.is_emergency();

        let (docs, answer) = if emergency {
            // The fixed directive is used verbatim; the model never gets a
            // chance to soften an emergency.
            (Vec::new(), EMERGENCY_MESSAGE.to_string())
        } else {
            let docs = self.retrieval_service.retrieve(content, RETRIEVAL_TOP_K).await;
            advance(&mut state, TurnState::Retrieved);
            let answer = self.triage_service.grounded_answer(content, &docs).await;
            (docs, answer)
        };
        advance(&mut state, TurnState::Answered);

        let recommendation = self.recommendation_service.assemble(&triage).await;

        let sources = MessageSources {
            docs: docs
                .iter()
                .map(|d| SourceDoc {
                    id: d.id.clone(),
                    source: d.source.clone(),
                    title: d.title.clone(),
                    score: d.score,
                })
                .collect(),
            triage: triage.clone(),
            recommendation,
            meta: SourcesMeta {
                new_issue_detected: new_issue,
            },
            ui: SourcesUi {
                emergency,
                issue_note: new_issue.then(|| NEW_ISSUE_NOTE.to_string()),
                emergency_actions: emergency
                    .then(|| EMERGENCY_ACTIONS.iter().map(|a| a.to_string()).collect()),
            },
        };
        let sources_json = serde_json::to_value(&sources)
            .map_err(|e| PostMessageError::PersistenceError(e.to_string()))?;

        let assistant_message = self
            .chat_repository
            .append_message(chat_id, MessageRole::Assistant, &answer, Some(sources_json))
            .await
            .map_err(|e| PostMessageError::PersistenceError(e.to_string()))?;
        advance(&mut state, TurnState::Persisted);

        // Best-effort by contract; never fails the turn.
        self.summary_service
            .update_summary(chat_id, &triage.short_summary)
            .await;

        Ok(TurnOutcome {
            user_message,
            assistant_message,
        })
    }
}

fn advance(state: &mut TurnState, next: TurnState) {
    tracing::debug!("turn {} -> {}", state.as_str(), next.as_str());
    *state = next;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{GatewayError, LanguageModel};
    use crate::domain::entities::triage::EMERGENCY_SPECIALTY;
    use crate::domain::entities::{Chat, Doctor, Document, NewDocument, RetrievedDoc, Slot};
    use crate::domain::repositories::chat_repository::ChatRepositoryError;
    use crate::domain::repositories::doctor_directory::DoctorDirectoryError;
    use crate::domain::repositories::document_repository::DocumentRepositoryError;
    use crate::domain::repositories::{DoctorDirectory, DocumentRepository};
    use async_trait::async_trait;
    use chrono::{Duration, NaiveDate, Utc};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Routes each call by its system prompt, standing in for the real
    /// backend across all four call sites.
    struct ScriptedBackend {
        triage_reply: &'static str,
        answer_reply: &'static str,
        answer_calls: AtomicUsize,
    }

    #[async_trait]
    impl LanguageModel for ScriptedBackend {
        async fn generate(&self, system: &str, _user: &str) -> Result<String, GatewayError> {
            if system.contains("triage assistant") {
                return Ok(self.triage_reply.to_string());
            }
            if system.contains("virtual assistant") {
                self.answer_calls.fetch_add(1, Ordering::SeqCst);
                return Ok(self.answer_reply.to_string());
            }
            if system.contains("SAME medical issue") {
                return Ok(r#"{"same_issue": true}"#.to_string());
            }
            // Summary call site.
            Ok("Patient seen for current complaint, low urgency.".to_string())
        }

        async fn embed(&self, _text: &str) -> Result<Vec<f32>, GatewayError> {
            Ok(vec![0.1; 8])
        }
    }

    #[derive(Default)]
    struct InMemoryChats {
        chats: Mutex<Vec<Chat>>,
        messages: Mutex<Vec<Message>>,
        summary: Mutex<Option<String>>,
    }

    impl InMemoryChats {
        fn with_chat(chat_id: Uuid) -> Self {
            let store = Self::default();
            store
                .chats
                .lock()
                .unwrap()
                .push(Chat::new(chat_id, Uuid::new_v4(), None, Utc::now()));
            store
        }
    }

    #[async_trait]
    impl ChatRepository for InMemoryChats {
        async fn create_chat(&self, patient_id: Uuid) -> Result<Chat, ChatRepositoryError> {
            let chat = Chat::new(Uuid::new_v4(), patient_id, None, Utc::now());
            self.chats.lock().unwrap().push(chat.clone());
            Ok(chat)
        }

        async fn find_chat(&self, chat_id: Uuid) -> Result<Option<Chat>, ChatRepositoryError> {
            Ok(self
                .chats
                .lock()
                .unwrap()
                .iter()
                .find(|c| c.id() == chat_id)
                .cloned())
        }

        async fn list_chats_for_patient(
            &self,
            _patient_id: Uuid,
        ) -> Result<Vec<Chat>, ChatRepositoryError> {
            Ok(self.chats.lock().unwrap().clone())
        }

        async fn list_messages(
            &self,
            chat_id: Uuid,
        ) -> Result<Vec<Message>, ChatRepositoryError> {
            Ok(self
                .messages
                .lock()
                .unwrap()
                .iter()
                .filter(|m| m.chat_id() == chat_id)
                .cloned()
                .collect())
        }

        async fn recent_messages(
            &self,
            chat_id: Uuid,
            limit: i64,
        ) -> Result<Vec<Message>, ChatRepositoryError> {
            let all = self.list_messages(chat_id).await?;
            let skip = all.len().saturating_sub(limit as usize);
            Ok(all.into_iter().skip(skip).collect())
        }

        async fn last_user_messages(
            &self,
            chat_id: Uuid,
            limit: i64,
        ) -> Result<Vec<Message>, ChatRepositoryError> {
            let users: Vec<Message> = self
                .list_messages(chat_id)
                .await?
                .into_iter()
                .filter(|m| m.is_user())
                .collect();
            let skip = users.len().saturating_sub(limit as usize);
            Ok(users.into_iter().skip(skip).collect())
        }

        async fn append_message(
            &self,
            chat_id: Uuid,
            role: MessageRole,
            content: &str,
            sources: Option<serde_json::Value>,
        ) -> Result<Message, ChatRepositoryError> {
            let message = Message::new(
                Uuid::new_v4(),
                chat_id,
                role,
                content.to_string(),
                sources,
                Utc::now(),
            );
            self.messages.lock().unwrap().push(message.clone());
            Ok(message)
        }

        async fn update_summary(
            &self,
            _chat_id: Uuid,
            summary: &str,
        ) -> Result<(), ChatRepositoryError> {
            *self.summary.lock().unwrap() = Some(summary.to_string());
            Ok(())
        }
    }

    struct SingleDocStore;

    #[async_trait]
    impl DocumentRepository for SingleDocStore {
        async fn find_nearest(
            &self,
            _query_embedding: &[f32],
            _k: i64,
            _probes: u32,
        ) -> Result<Vec<RetrievedDoc>, DocumentRepositoryError> {
            Ok(vec![RetrievedDoc {
                id: "seed_1".to_string(),
                source: "MedQuAD".to_string(),
                title: Some("Stomach aches".to_string()),
                text: "Mild stomach pain after meals is usually benign.".to_string(),
                score: 0.12,
            }])
        }

        async fn upsert_document(
            &self,
            _doc: &NewDocument,
        ) -> Result<bool, DocumentRepositoryError> {
            Ok(true)
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

    struct CountingDirectory {
        doctors: Vec<Doctor>,
        slot_calls: AtomicUsize,
    }

    #[async_trait]
    impl DoctorDirectory for CountingDirectory {
        async fn find_doctors_by_specialty(
            &self,
            specialty: &str,
        ) -> Result<Vec<Doctor>, DoctorDirectoryError> {
            Ok(self
                .doctors
                .iter()
                .filter(|d| d.specialty() == specialty)
                .cloned()
                .collect())
        }

        async fn open_slots(
            &self,
            _doctor_id: Uuid,
            from: NaiveDate,
            _to: NaiveDate,
        ) -> Result<Vec<Slot>, DoctorDirectoryError> {
            self.slot_calls.fetch_add(1, Ordering::SeqCst);
            let start = from.and_hms_opt(9, 0, 0).unwrap().and_utc();
            Ok(vec![Slot {
                start_ts: start,
                end_ts: start + Duration::minutes(30),
                local_date: from,
                local_start: "09:00".to_string(),
                local_end: "09:30".to_string(),
                time_zone: "UTC".to_string(),
            }])
        }
    }

    struct Harness {
        use_case: PostChatMessageUseCase,
        chats: Arc<InMemoryChats>,
        directory: Arc<CountingDirectory>,
        backend: Arc<ScriptedBackend>,
        chat_id: Uuid,
    }

    fn harness(triage_reply: &'static str, answer_reply: &'static str) -> Harness {
        let chat_id = Uuid::new_v4();
        let chats = Arc::new(InMemoryChats::with_chat(chat_id));
        let backend = Arc::new(ScriptedBackend {
            triage_reply,
            answer_reply,
            answer_calls: AtomicUsize::new(0),
        });
        let directory = Arc::new(CountingDirectory {
            doctors: vec![
                Doctor::new(
                    Uuid::new_v4(),
                    "Dr. Adams".to_string(),
                    "General Practice".to_string(),
                    None,
                    Utc::now(),
                ),
                Doctor::new(
                    Uuid::new_v4(),
                    "Dr. Ba".to_string(),
                    "Cardiology".to_string(),
                    None,
                    Utc::now(),
                ),
            ],
            slot_calls: AtomicUsize::new(0),
        });

        let lm: Arc<dyn LanguageModel> = backend.clone();
        let chat_repo: Arc<dyn ChatRepository> = chats.clone();
        let doc_repo: Arc<dyn DocumentRepository> = Arc::new(SingleDocStore);
        let dir: Arc<dyn DoctorDirectory> = directory.clone();

        let use_case = PostChatMessageUseCase::new(
            chat_repo.clone(),
            Arc::new(ContinuityService::new(lm.clone(), chat_repo.clone())),
            Arc::new(TriageService::new(lm.clone())),
            Arc::new(RetrievalService::new(lm.clone(), doc_repo)),
            Arc::new(RecommendationService::new(dir)),
            Arc::new(SummaryService::new(lm, chat_repo)),
        );

        Harness {
            use_case,
            chats,
            directory,
            backend,
            chat_id,
        }
    }

    #[tokio::test]
    async fn test_emergency_turn_uses_fixed_directive() {
        // The stub model undercalls on purpose; guardrails must win.
        let h = harness(
            r#"{"triage_level": "LOW", "recommended_specialty": "Dermatology"}"#,
            r#"{"answer": "must never appear"}"#,
        );

        let outcome = h
            .use_case
            .execute(h.chat_id, "I have severe chest pain and shortness of breath")
            .await
            .unwrap();

        assert_eq!(outcome.assistant_message.content(), EMERGENCY_MESSAGE);

        let sources = outcome.assistant_message.sources().unwrap();
        assert_eq!(sources["triage"]["triage_level"], "HIGH");
        assert_eq!(
            sources["triage"]["recommended_specialty"],
            EMERGENCY_SPECIALTY
        );
        assert!(sources["recommendation"].is_null());
        assert_eq!(sources["ui"]["emergency"], true);
        assert!(sources["ui"]["emergencyActions"].is_array());
        assert!(sources["docs"].as_array().unwrap().is_empty());

        // No booking lookup and no answer-pass call happened.
        assert_eq!(h.directory.slot_calls.load(Ordering::SeqCst), 0);
        assert_eq!(h.backend.answer_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_mild_digestive_turn_books_general_practice() {
        let h = harness(
            r#"{"triage_level": "MEDIUM", "recommended_specialty": "Gastroenterology",
                "short_summary": "Mild stomach pain after eating."}"#,
            r#"{"answer": "This can be associated with indigestion; a routine check is sensible."}"#,
        );

        let outcome = h
            .use_case
            .execute(h.chat_id, "mild stomach pain after lunch, no other symptoms")
            .await
            .unwrap();

        let sources = outcome.assistant_message.sources().unwrap();
        assert_eq!(sources["triage"]["triage_level"], "LOW");
        assert_eq!(sources["triage"]["recommended_specialty"], "General Practice");
        assert_eq!(sources["ui"]["emergency"], false);

        let doctors = sources["recommendation"]["doctors"].as_array().unwrap();
        assert_eq!(doctors.len(), 1);
        assert_eq!(doctors[0]["specialty"], "General Practice");
        assert!(!doctors[0]["slots"].as_array().unwrap().is_empty());

        // Retrieval provenance rode along.
        assert_eq!(sources["docs"][0]["id"], "seed_1");

        // Both halves of the turn were persisted in order.
        let stored = h.chats.list_messages(h.chat_id).await.unwrap();
        assert_eq!(stored.len(), 2);
        assert!(stored[0].is_user());
        assert_eq!(stored[1].role(), MessageRole::Assistant);

        // The summarizer overwrote the chat summary.
        let summary = h.chats.summary.lock().unwrap().clone().unwrap();
        assert!(!summary.is_empty());
        assert!(summary.chars().count() <= 180);
    }

    #[tokio::test]
    async fn test_unknown_chat_fails_the_turn() {
        let h = harness("{}", "{}");
        let err = h.use_case.execute(Uuid::new_v4(), "hello").await.unwrap_err();
        assert!(matches!(err, PostMessageError::ChatNotFound(_)));
    }

    #[test]
    fn test_turn_states_render_for_logs() {
        assert_eq!(TurnState::Received.as_str(), "RECEIVED");
        assert_eq!(TurnState::Persisted.as_str(), "PERSISTED");
    }
}
