pub mod chat;
pub mod doctor;
pub mod document;
pub mod sources;
pub mod triage;

pub use chat::{Chat, Message, MessageRole};
pub use doctor::{Doctor, Slot};
pub use document::{Document, NewDocument, RetrievedDoc};
pub use sources::{MessageSources, Recommendation, RecommendedDoctor, SourceDoc, SourcesMeta, SourcesUi};
pub use triage::{TriageLevel, TriageResult};
