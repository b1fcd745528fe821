use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::use_cases::post_chat_message::TurnOutcome;
use crate::domain::entities::{Chat, Message};

#[derive(Debug, Deserialize)]
pub struct CreateChatRequestDto {
    pub patient_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct PostMessageRequestDto {
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct ChatDto {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub summary: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Chat> for ChatDto {
    fn from(chat: Chat) -> Self {
        Self {
            id: chat.id(),
            patient_id: chat.patient_id(),
            summary: chat.summary().map(|s| s.to_string()),
            created_at: chat.created_at(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageDto {
    pub id: Uuid,
    pub chat_id: Uuid,
    pub role: String,
    pub content: String,
    pub sources: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

impl From<Message> for MessageDto {
    fn from(message: Message) -> Self {
        Self {
            id: message.id(),
            chat_id: message.chat_id(),
            role: message.role().as_str().to_string(),
            content: message.content().to_string(),
            sources: message.sources().cloned(),
            created_at: message.created_at(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TurnResponseDto {
    pub user_message: MessageDto,
    pub assistant_message: MessageDto,
}

impl From<TurnOutcome> for TurnResponseDto {
    fn from(outcome: TurnOutcome) -> Self {
        Self {
            user_message: MessageDto::from(outcome.user_message),
            assistant_message: MessageDto::from(outcome.assistant_message),
        }
    }
}
