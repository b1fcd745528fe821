use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::{Chat, Message, MessageRole};

#[derive(Debug)]
pub enum ChatRepositoryError {
    DatabaseError(String),
}

impl std::fmt::Display for ChatRepositoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChatRepositoryError::DatabaseError(msg) => write!(f, "Database error: {}", msg),
        }
    }
}

impl std::error::Error for ChatRepositoryError {}

#[async_trait]
pub trait ChatRepository: Send + Sync {
    async fn create_chat(&self, patient_id: Uuid) -> Result<Chat, ChatRepositoryError>;

    async fn find_chat(&self, chat_id: Uuid) -> Result<Option<Chat>, ChatRepositoryError>;

    /// Chats for one patient, newest first.
    async fn list_chats_for_patient(
        &self,
        patient_id: Uuid,
    ) -> Result<Vec<Chat>, ChatRepositoryError>;

    /// All messages in a chat, `created_at` ascending.
    async fn list_messages(&self, chat_id: Uuid) -> Result<Vec<Message>, ChatRepositoryError>;

    /// The most recent `limit` messages, returned oldest first.
    async fn recent_messages(
        &self,
        chat_id: Uuid,
        limit: i64,
    ) -> Result<Vec<Message>, ChatRepositoryError>;

    /// The most recent `limit` user messages, returned oldest first.
    async fn last_user_messages(
        &self,
        chat_id: Uuid,
        limit: i64,
    ) -> Result<Vec<Message>, ChatRepositoryError>;

    async fn append_message(
        &self,
        chat_id: Uuid,
        role: MessageRole,
        content: &str,
        sources: Option<serde_json::Value>,
    ) -> Result<Message, ChatRepositoryError>;

    /// Overwrites the chat's clinician summary.
    async fn update_summary(
        &self,
        chat_id: Uuid,
        summary: &str,
    ) -> Result<(), ChatRepositoryError>;
}
