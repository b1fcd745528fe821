use async_trait::async_trait;
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::entities::{Chat, Message, MessageRole};
use crate::domain::repositories::ChatRepository;
use crate::domain::repositories::chat_repository::ChatRepositoryError;
use crate::infrastructure::database::models::{
    ChatModel, MessageModel, NewChatModel, NewMessageModel,
};
use crate::infrastructure::database::{DbPool, get_connection_from_pool};

pub struct PostgresChatRepository {
    pool: DbPool,
}

impl PostgresChatRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn connection(
        &self,
    ) -> Result<crate::infrastructure::database::DbConnection, ChatRepositoryError> {
        get_connection_from_pool(&self.pool)
            .map_err(|e| ChatRepositoryError::DatabaseError(e.to_string()))
    }
}

fn to_messages(models: Vec<MessageModel>) -> Result<Vec<Message>, ChatRepositoryError> {
    models
        .into_iter()
        .map(|m| Message::try_from(m).map_err(ChatRepositoryError::DatabaseError))
        .collect()
}

#[async_trait]
impl ChatRepository for PostgresChatRepository {
    async fn create_chat(&self, owner: Uuid) -> Result<Chat, ChatRepositoryError> {
        use crate::infrastructure::database::schema::chats::dsl::*;
        let mut conn = self.connection()?;

        let model = diesel::insert_into(chats)
            .values(&NewChatModel { patient_id: owner })
            .get_result::<ChatModel>(&mut conn)
            .map_err(|e| ChatRepositoryError::DatabaseError(e.to_string()))?;

        Ok(Chat::from(model))
    }

    async fn find_chat(&self, chat_id: Uuid) -> Result<Option<Chat>, ChatRepositoryError> {
        use crate::infrastructure::database::schema::chats::dsl::*;
        let mut conn = self.connection()?;

        let model = chats
            .find(chat_id)
            .select(ChatModel::as_select())
            .first::<ChatModel>(&mut conn)
            .optional()
            .map_err(|e| ChatRepositoryError::DatabaseError(e.to_string()))?;

        Ok(model.map(Chat::from))
    }

    async fn list_chats_for_patient(&self, owner: Uuid) -> Result<Vec<Chat>, ChatRepositoryError> {
        use crate::infrastructure::database::schema::chats::dsl::*;
        let mut conn = self.connection()?;

        let models = chats
            .filter(patient_id.eq(owner))
            .order(created_at.desc())
            .select(ChatModel::as_select())
            .load::<ChatModel>(&mut conn)
            .map_err(|e| ChatRepositoryError::DatabaseError(e.to_string()))?;

        Ok(models.into_iter().map(Chat::from).collect())
    }

    async fn list_messages(&self, chat: Uuid) -> Result<Vec<Message>, ChatRepositoryError> {
        use crate::infrastructure::database::schema::messages::dsl::*;
        let mut conn = self.connection()?;

        let models = messages
            .filter(chat_id.eq(chat))
            .order(created_at.asc())
            .select(MessageModel::as_select())
            .load::<MessageModel>(&mut conn)
            .map_err(|e| ChatRepositoryError::DatabaseError(e.to_string()))?;

        to_messages(models)
    }

    async fn recent_messages(
        &self,
        chat: Uuid,
        limit: i64,
    ) -> Result<Vec<Message>, ChatRepositoryError> {
        use crate::infrastructure::database::schema::messages::dsl::*;
        let mut conn = self.connection()?;

        let mut models = messages
            .filter(chat_id.eq(chat))
            .order(created_at.desc())
            .limit(limit)
            .select(MessageModel::as_select())
            .load::<MessageModel>(&mut conn)
            .map_err(|e| ChatRepositoryError::DatabaseError(e.to_string()))?;

        models.reverse();
        to_messages(models)
    }

    async fn last_user_messages(
        &self,
        chat: Uuid,
        limit: i64,
    ) -> Result<Vec<Message>, ChatRepositoryError> {
        use crate::infrastructure::database::schema::messages::dsl::*;
        let mut conn = self.connection()?;

        let mut models = messages
            .filter(chat_id.eq(chat))
            .filter(role.eq(MessageRole::User.as_str()))
            .order(created_at.desc())
            .limit(limit)
            .select(MessageModel::as_select())
            .load::<MessageModel>(&mut conn)
            .map_err(|e| ChatRepositoryError::DatabaseError(e.to_string()))?;

        models.reverse();
        to_messages(models)
    }

    async fn append_message(
        &self,
        chat: Uuid,
        message_role: MessageRole,
        message_content: &str,
        message_sources: Option<serde_json::Value>,
    ) -> Result<Message, ChatRepositoryError> {
        use crate::infrastructure::database::schema::messages::dsl::*;
        let mut conn = self.connection()?;

        let model = diesel::insert_into(messages)
            .values(&NewMessageModel {
                chat_id: chat,
                role: message_role.as_str().to_string(),
                content: message_content.to_string(),
                sources: message_sources,
            })
            .get_result::<MessageModel>(&mut conn)
            .map_err(|e| ChatRepositoryError::DatabaseError(e.to_string()))?;

        Message::try_from(model).map_err(ChatRepositoryError::DatabaseError)
    }

    async fn update_summary(
        &self,
        chat: Uuid,
        note: &str,
    ) -> Result<(), ChatRepositoryError> {
        use crate::infrastructure::database::schema::chats::dsl::*;
        let mut conn = self.connection()?;

        diesel::update(chats.find(chat))
            .set(summary.eq(Some(note.to_string())))
            .execute(&mut conn)
            .map_err(|e| ChatRepositoryError::DatabaseError(e.to_string()))?;

        Ok(())
    }
}
