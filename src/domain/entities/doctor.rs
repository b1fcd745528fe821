use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Doctor {
    id: Uuid,
    name: String,
    specialty: String,
    bio: Option<String>,
    created_at: DateTime<Utc>,
}

impl Doctor {
    pub fn new(
        id: Uuid,
        name: String,
        specialty: String,
        bio: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            specialty,
            bio,
            created_at,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn specialty(&self) -> &str {
        &self.specialty
    }

    pub fn bio(&self) -> Option<&str> {
        self.bio.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// An open, bookable interval as returned by the availability collaborator.
/// The local fields are display hints derived from `time_zone`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slot {
    pub start_ts: DateTime<Utc>,
    pub end_ts: DateTime<Utc>,
    pub local_date: NaiveDate,
    pub local_start: String,
    pub local_end: String,
    pub time_zone: String,
}
