use serde::{Deserialize, Serialize};

/// Sentinel specialty for messages that must bypass booking entirely.
pub const EMERGENCY_SPECIALTY: &str = "EMERGENCY";

pub const GENERAL_PRACTICE: &str = "General Practice";

/// The three fallback follow-up questions used whenever the model output is
/// missing or unusable.
pub const DEFAULT_FOLLOW_UPS: [&str; 3] = [
    "How long have you had these symptoms?",
    "Do you have any severe symptoms (fever, chest pain, difficulty breathing, bleeding)?",
    "Have you already tried any treatment or had any tests for this?",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TriageLevel {
    Low,
    Medium,
    High,
}

impl TriageLevel {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_uppercase().as_str() {
            "LOW" => Some(TriageLevel::Low),
            "MEDIUM" => Some(TriageLevel::Medium),
            "HIGH" => Some(TriageLevel::High),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TriageLevel::Low => "LOW",
            TriageLevel::Medium => "MEDIUM",
            TriageLevel::High => "HIGH",
        }
    }
}

/// Per-turn classification of urgency and care path. Embedded verbatim in the
/// assistant message side-channel; never persisted on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriageResult {
    pub triage_level: TriageLevel,
    pub recommended_specialty: String,
    pub red_flags: Vec<String>,
    /// Exactly three entries; merges truncate or fall back to defaults.
    pub follow_up_questions: Vec<String>,
    pub short_summary: String,
}

impl Default for TriageResult {
    fn default() -> Self {
        Self {
            triage_level: TriageLevel::Medium,
            recommended_specialty: GENERAL_PRACTICE.to_string(),
            red_flags: Vec::new(),
            follow_up_questions: DEFAULT_FOLLOW_UPS.iter().map(|q| q.to_string()).collect(),
            short_summary: String::new(),
        }
    }
}

impl TriageResult {
    pub fn is_emergency(&self) -> bool {
        self.triage_level == TriageLevel::High
            || self.recommended_specialty == EMERGENCY_SPECIALTY
    }
}

/// Closed specialty vocabulary used for doctor matching. Matching is a
/// case-insensitive substring check; "emergency" anywhere wins; unmatched
/// strings pass through unchanged so doctor lookup keeps working for
/// specialties the vocabulary has not special-cased.
const SPECIALTY_KEYWORDS: [(&str, &str); 6] = [
    ("general", GENERAL_PRACTICE),
    ("dermat", "Dermatology"),
    ("cardio", "Cardiology"),
    ("gastro", "Gastroenterology"),
    ("neuro", "Neurology"),
    ("orthop", "Orthopedics"),
];

pub fn normalize_specialty(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return GENERAL_PRACTICE.to_string();
    }

    let lowered = trimmed.to_lowercase();
    if lowered.contains("emergency") {
        return EMERGENCY_SPECIALTY.to_string();
    }

    for (keyword, canonical) in SPECIALTY_KEYWORDS {
        if lowered.contains(keyword) {
            return canonical.to_string();
        }
    }

    trimmed.to_string()
}
