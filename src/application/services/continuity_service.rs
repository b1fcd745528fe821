use std::sync::Arc;

use serde::Deserialize;
use uuid::Uuid;

use crate::application::ports::LanguageModel;
use crate::application::services::llm_json::parse_first_object;
use crate::domain::repositories::ChatRepository;

const CONTINUITY_SYSTEM_PROMPT: &str = "\
You compare a new patient message against their previous messages in the same chat.
Decide whether the new message concerns the SAME medical issue as the previous ones.
Return ONLY a valid JSON object with a single key: same_issue (boolean). No other text.";

#[derive(Debug, Deserialize)]
struct RawContinuity {
    same_issue: bool,
}

/// Decides whether a new message opens a different medical concern than the
/// recent history. Every failure path assumes continuity, the conservative
/// choice that avoids spuriously prompting the user to fork the chat.
pub struct ContinuityService {
    language_model: Arc<dyn LanguageModel>,
    chat_repository: Arc<dyn ChatRepository>,
}

impl ContinuityService {
    pub fn new(
        language_model: Arc<dyn LanguageModel>,
        chat_repository: Arc<dyn ChatRepository>,
    ) -> Self {
        Self {
            language_model,
            chat_repository,
        }
    }

    /// Returns true only when the model parseably asserts the message is a
    /// different issue. No prior user messages means nothing to differ from.
    pub async fn detect_new_issue(&self, chat_id: Uuid, new_message: &str) -> bool {
        let prior = match self.chat_repository.last_user_messages(chat_id, 3).await {
            Ok(messages) => messages,
            Err(e) => {
                tracing::warn!("continuity history lookup failed, assuming same issue: {}", e);
                return false;
            }
        };

        if prior.is_empty() {
            return false;
        }

        let history = prior
            .iter()
            .map(|m| format!("- {}", m.content()))
            .collect::<Vec<_>>()
            .join("\n");
        let user = format!(
            "PREVIOUS MESSAGES:\n{}\n\nNEW MESSAGE:\n{}\n\nReturn the JSON now.",
            history, new_message
        );

        let raw = match self
            .language_model
            .generate(CONTINUITY_SYSTEM_PROMPT, &user)
            .await
        {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!("continuity gateway failure, assuming same issue: {}", e);
                return false;
            }
        };

        match parse_first_object::<RawContinuity>(&raw) {
            Some(parsed) => !parsed.same_issue,
            None => false,
        }
    }
}
