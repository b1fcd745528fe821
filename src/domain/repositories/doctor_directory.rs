use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::domain::entities::{Doctor, Slot};

#[derive(Debug)]
pub enum DoctorDirectoryError {
    DatabaseError(String),
}

impl std::fmt::Display for DoctorDirectoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DoctorDirectoryError::DatabaseError(msg) => write!(f, "Database error: {}", msg),
        }
    }
}

impl std::error::Error for DoctorDirectoryError {}

/// Doctor/availability collaborator. The triage core only reads slot lists
/// to present choices; booking itself is a separate user action.
#[async_trait]
pub trait DoctorDirectory: Send + Sync {
    /// Doctors with an exact specialty match, oldest registration first.
    async fn find_doctors_by_specialty(
        &self,
        specialty: &str,
    ) -> Result<Vec<Doctor>, DoctorDirectoryError>;

    /// Open slots within `[from, to]`, already-booked intervals excluded,
    /// ordered by start time.
    async fn open_slots(
        &self,
        doctor_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Slot>, DoctorDirectoryError>;
}
