use std::sync::Arc;

use regex::{Regex, RegexBuilder};
use uuid::Uuid;

use crate::application::ports::LanguageModel;
use crate::application::services::chunker::normalize_whitespace;
use crate::domain::entities::MessageRole;
use crate::domain::repositories::ChatRepository;

const SUMMARY_MAX_CHARS: usize = 180;
const TRANSCRIPT_WINDOW: i64 = 12;

const SUMMARY_SYSTEM_PROMPT: &str = "\
You write a one-line handover note about a patient chat for a clinician.
Rules:
- Output exactly ONE plain-text sentence, at most 160 characters. No lists, no JSON, no quotes.
- Write in third person about the patient.
- No advisory language: never use words like should, please, or recommend.
- Never name rare or speculative diagnoses.
- Focus on the most recent complaint, its urgency, and the suggested care path.
- If an unrelated earlier concern in the chat was urgent, mention it briefly.";

/// Lead-ins and hedges stripped from model output, longest first so shorter
/// needles cannot break up a longer match.
const STRIP_PHRASES: [&str; 14] = [
    "the patient reports that",
    "the patient states that",
    "the patient reports",
    "the patient states",
    "patient reports",
    "in this conversation",
    "it appears that",
    "it seems that",
    "in summary",
    "summary:",
    "recommend",
    "possibly",
    "should",
    "please",
];

/// Maintains the chat-level clinician summary. Runs after every turn and is
/// best-effort throughout: failures are logged and never fail the turn.
pub struct SummaryService {
    language_model: Arc<dyn LanguageModel>,
    chat_repository: Arc<dyn ChatRepository>,
}

impl SummaryService {
    pub fn new(
        language_model: Arc<dyn LanguageModel>,
        chat_repository: Arc<dyn ChatRepository>,
    ) -> Self {
        Self {
            language_model,
            chat_repository,
        }
    }

    /// `triage_note` is the current turn's transient short summary, passed
    /// through as a hint so the note tracks the latest assessment.
    pub async fn update_summary(&self, chat_id: Uuid, triage_note: &str) {
        let messages = match self
            .chat_repository
            .recent_messages(chat_id, TRANSCRIPT_WINDOW)
            .await
        {
            Ok(messages) => messages,
            Err(e) => {
                tracing::warn!("summary transcript lookup failed, keeping old summary: {}", e);
                return;
            }
        };

        if messages.is_empty() {
            return;
        }

        let transcript = messages
            .iter()
            .map(|m| {
                let speaker = match m.role() {
                    MessageRole::User => "PATIENT",
                    MessageRole::Assistant => "ASSISTANT",
                };
                format!("{}: {}", speaker, m.content())
            })
            .collect::<Vec<_>>()
            .join("\n");

        let mut user = format!("TRANSCRIPT (oldest first):\n{}\n", transcript);
        if !triage_note.trim().is_empty() {
            user.push_str(&format!("\nLATEST TRIAGE NOTE: {}\n", triage_note.trim()));
        }
        user.push_str("\nWrite the one-sentence note now.");

        let raw = match self.language_model.generate(SUMMARY_SYSTEM_PROMPT, &user).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!("summary gateway failure, keeping old summary: {}", e);
                return;
            }
        };

        let summary = condense_summary(&raw);
        if summary.is_empty() {
            return;
        }

        if let Err(e) = self.chat_repository.update_summary(chat_id, &summary).await {
            tracing::warn!("summary persist failed, keeping old summary: {}", e);
        }
    }
}

/// Deterministic post-processing: first sentence only, narration/hedge
/// phrases removed, whitespace collapsed, hard-truncated at a word boundary
/// with no ellipsis.
pub fn condense_summary(raw: &str) -> String {
    let mut text = first_sentence(raw.trim());

    for phrase in STRIP_PHRASES {
        text = remove_all_case_insensitive(&text, phrase);
    }

    let text = normalize_whitespace(&text);
    truncate_at_word_boundary(&text, SUMMARY_MAX_CHARS)
}

fn first_sentence(text: &str) -> String {
    // A terminator only ends the sentence when followed by whitespace or
    // the end of the text, so "3.5" stays intact.
    let terminator = Regex::new(r"[.!?](\s|$)").unwrap();
    match terminator.find(text) {
        Some(m) => text[..m.start() + 1].to_string(),
        None => text.to_string(),
    }
}

fn remove_all_case_insensitive(haystack: &str, needle: &str) -> String {
    match RegexBuilder::new(&regex::escape(needle))
        .case_insensitive(true)
        .build()
    {
        Ok(re) => re.replace_all(haystack, "").into_owned(),
        Err(_) => haystack.to_string(),
    }
}

fn truncate_at_word_boundary(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let cut: String = text.chars().take(max_chars).collect();
    match cut.rfind(' ') {
        Some(space) => cut[..space].trim_end().to_string(),
        None => cut,
    }
}
