use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::doctor::{Doctor, Slot};
use super::triage::TriageResult;

/// Structured side-channel persisted on every assistant message. This is the
/// contract the UI renders against; every field degrades gracefully when
/// absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageSources {
    pub docs: Vec<SourceDoc>,
    pub triage: TriageResult,
    pub recommendation: Option<Recommendation>,
    pub meta: SourcesMeta,
    pub ui: SourcesUi,
}

/// Retrieval provenance: which documents grounded the answer and how close
/// they were. `score` is the cosine distance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceDoc {
    pub id: String,
    pub source: String,
    pub title: Option<String>,
    pub score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub doctors: Vec<RecommendedDoctor>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendedDoctor {
    pub id: Uuid,
    pub name: String,
    pub specialty: String,
    pub bio: Option<String>,
    pub slots: Vec<Slot>,
}

impl RecommendedDoctor {
    pub fn from_doctor(doctor: &Doctor, slots: Vec<Slot>) -> Self {
        Self {
            id: doctor.id(),
            name: doctor.name().to_string(),
            specialty: doctor.specialty().to_string(),
            bio: doctor.bio().map(|b| b.to_string()),
            slots,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourcesMeta {
    pub new_issue_detected: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourcesUi {
    pub emergency: bool,
    pub issue_note: Option<String>,
    pub emergency_actions: Option<Vec<String>>,
}
