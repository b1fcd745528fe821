use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::application::use_cases::PostChatMessageUseCase;
use crate::application::use_cases::post_chat_message::PostMessageError;
use crate::domain::repositories::ChatRepository;
use crate::presentation::http::dto::{
    ApiResponse, ChatDto, CreateChatRequestDto, MessageDto, PostMessageRequestDto, TurnResponseDto,
};

pub struct ChatHandler {
    chat_repository: Arc<dyn ChatRepository>,
    post_message_use_case: Arc<PostChatMessageUseCase>,
}

impl ChatHandler {
    pub fn new(
        chat_repository: Arc<dyn ChatRepository>,
        post_message_use_case: Arc<PostChatMessageUseCase>,
    ) -> Self {
        Self {
            chat_repository,
            post_message_use_case,
        }
    }

    pub async fn create_chat(
        State(handler): State<Arc<ChatHandler>>,
        Json(body): Json<CreateChatRequestDto>,
    ) -> Result<impl IntoResponse, StatusCode> {
        match handler.chat_repository.create_chat(body.patient_id).await {
            Ok(chat) => Ok((
                StatusCode::CREATED,
                Json(ApiResponse::success(ChatDto::from(chat))),
            )),
            Err(e) => Ok((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("CHAT_CREATE_FAILED", e.to_string())),
            )),
        }
    }

    pub async fn list_patient_chats(
        State(handler): State<Arc<ChatHandler>>,
        Path(patient_id): Path<Uuid>,
    ) -> Result<impl IntoResponse, StatusCode> {
        match handler.chat_repository.list_chats_for_patient(patient_id).await {
            Ok(chats) => {
                let dtos: Vec<ChatDto> = chats.into_iter().map(ChatDto::from).collect();
                Ok((StatusCode::OK, Json(ApiResponse::success(dtos))))
            }
            Err(e) => Ok((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("CHAT_LIST_FAILED", e.to_string())),
            )),
        }
    }

    pub async fn list_messages(
        State(handler): State<Arc<ChatHandler>>,
        Path(chat_id): Path<Uuid>,
    ) -> Result<impl IntoResponse, StatusCode> {
        match handler.chat_repository.find_chat(chat_id).await {
            Ok(Some(_)) => {}
            Ok(None) => {
                return Ok((
                    StatusCode::NOT_FOUND,
                    Json(ApiResponse::error(
                        "CHAT_NOT_FOUND",
                        format!("Chat not found: {}", chat_id),
                    )),
                ));
            }
            Err(e) => {
                return Ok((
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ApiResponse::error("MESSAGE_LIST_FAILED", e.to_string())),
                ));
            }
        }

        match handler.chat_repository.list_messages(chat_id).await {
            Ok(messages) => {
                let dtos: Vec<MessageDto> = messages.into_iter().map(MessageDto::from).collect();
                Ok((StatusCode::OK, Json(ApiResponse::success(dtos))))
            }
            Err(e) => Ok((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("MESSAGE_LIST_FAILED", e.to_string())),
            )),
        }
    }

    /// Runs the whole triage turn; the only failures surfaced here are a
    /// missing chat and message persistence.
    pub async fn post_message(
        State(handler): State<Arc<ChatHandler>>,
        Path(chat_id): Path<Uuid>,
        Json(body): Json<PostMessageRequestDto>,
    ) -> Result<impl IntoResponse, StatusCode> {
        if body.content.trim().is_empty() {
            return Ok((
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::error(
                    "EMPTY_MESSAGE",
                    "Message content cannot be empty".to_string(),
                )),
            ));
        }

        match handler
            .post_message_use_case
            .execute(chat_id, body.content.trim())
            .await
        {
            Ok(outcome) => Ok((
                StatusCode::CREATED,
                Json(ApiResponse::success(TurnResponseDto::from(outcome))),
            )),
            Err(PostMessageError::ChatNotFound(id)) => Ok((
                StatusCode::NOT_FOUND,
                Json(ApiResponse::error(
                    "CHAT_NOT_FOUND",
                    format!("Chat not found: {}", id),
                )),
            )),
            Err(e) => Ok((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("TURN_FAILED", e.to_string())),
            )),
        }
    }
}
