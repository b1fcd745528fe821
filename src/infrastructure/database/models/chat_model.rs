use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::entities::chat::{Chat, Message, MessageRole};
use crate::infrastructure::database::schema::{chats, messages};

#[derive(Debug, Queryable, Selectable, Identifiable)]
#[diesel(table_name = chats)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ChatModel {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub summary: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = chats)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewChatModel {
    pub patient_id: Uuid,
}

impl From<ChatModel> for Chat {
    fn from(model: ChatModel) -> Self {
        Chat::new(model.id, model.patient_id, model.summary, model.created_at)
    }
}

#[derive(Debug, Queryable, Selectable, Identifiable)]
#[diesel(table_name = messages)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct MessageModel {
    pub id: Uuid,
    pub chat_id: Uuid,
    pub role: String,
    pub content: String,
    pub sources: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = messages)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewMessageModel {
    pub chat_id: Uuid,
    pub role: String,
    pub content: String,
    pub sources: Option<serde_json::Value>,
}

impl TryFrom<MessageModel> for Message {
    type Error = String;

    fn try_from(model: MessageModel) -> Result<Self, Self::Error> {
        let role = MessageRole::parse(&model.role)
            .ok_or_else(|| format!("Unknown message role: {}", model.role))?;

        Ok(Message::new(
            model.id,
            model.chat_id,
            role,
            model.content,
            model.sources,
            model.created_at,
        ))
    }
}
