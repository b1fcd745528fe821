use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A patient conversation. `summary` is the clinician-facing one-sentence
/// note, overwritten after every assistant turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chat {
    id: Uuid,
    patient_id: Uuid,
    summary: Option<String>,
    created_at: DateTime<Utc>,
}

impl Chat {
    pub fn new(
        id: Uuid,
        patient_id: Uuid,
        summary: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            patient_id,
            summary,
            created_at,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn patient_id(&self) -> Uuid {
        self.patient_id
    }

    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "user" => Some(MessageRole::User),
            "assistant" => Some(MessageRole::Assistant),
            _ => None,
        }
    }
}

/// One turn half. For assistant messages `content` holds the grounded answer
/// text only; the structured report travels in `sources`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    id: Uuid,
    chat_id: Uuid,
    role: MessageRole,
    content: String,
    sources: Option<serde_json::Value>,
    created_at: DateTime<Utc>,
}

impl Message {
    pub fn new(
        id: Uuid,
        chat_id: Uuid,
        role: MessageRole,
        content: String,
        sources: Option<serde_json::Value>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            chat_id,
            role,
            content,
            sources,
            created_at,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn chat_id(&self) -> Uuid {
        self.chat_id
    }

    pub fn role(&self) -> MessageRole {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn sources(&self) -> Option<&serde_json::Value> {
        self.sources.as_ref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn is_user(&self) -> bool {
        self.role == MessageRole::User
    }
}
