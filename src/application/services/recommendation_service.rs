use std::sync::Arc;

use chrono::{Duration, Utc};

use crate::domain::entities::{Recommendation, RecommendedDoctor, TriageResult};
use crate::domain::repositories::DoctorDirectory;

const WINDOW_DAYS: i64 = 7;
const SLOTS_PER_DOCTOR: usize = 5;

/// Maps a guardrailed triage to bookable doctors and their next open slots.
/// Emergencies never reach the directory: booking must not be offered
/// alongside an emergency directive.
pub struct RecommendationService {
    doctor_directory: Arc<dyn DoctorDirectory>,
}

impl RecommendationService {
    pub fn new(doctor_directory: Arc<dyn DoctorDirectory>) -> Self {
        Self { doctor_directory }
    }

    /// The window is computed on server-clock UTC dates; slot generation
    /// uses its own zone (see DESIGN.md).
    pub async fn assemble(&self, triage: &TriageResult) -> Option<Recommendation> {
        if triage.is_emergency() {
            return None;
        }

        let from = Utc::now().date_naive();
        let to = from + Duration::days(WINDOW_DAYS);

        let doctors = match self
            .doctor_directory
            .find_doctors_by_specialty(&triage.recommended_specialty)
            .await
        {
            Ok(doctors) => doctors,
            Err(e) => {
                tracing::warn!("doctor lookup failed, skipping recommendation: {}", e);
                return None;
            }
        };

        let mut recommended = Vec::with_capacity(doctors.len());
        for doctor in &doctors {
            let slots = match self.doctor_directory.open_slots(doctor.id(), from, to).await {
                Ok(slots) => slots.into_iter().take(SLOTS_PER_DOCTOR).collect(),
                Err(e) => {
                    tracing::warn!(
                        "slot lookup failed for doctor {}, listing without slots: {}",
                        doctor.id(),
                        e
                    );
                    Vec::new()
                }
            };
            recommended.push(RecommendedDoctor::from_doctor(doctor, slots));
        }

        Some(Recommendation {
            doctors: recommended,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::triage::EMERGENCY_SPECIALTY;
    use crate::domain::entities::{Doctor, Slot, TriageLevel};
    use crate::domain::repositories::doctor_directory::DoctorDirectoryError;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use uuid::Uuid;

    struct CountingDirectory {
        doctors: Vec<Doctor>,
        slot_calls: AtomicUsize,
    }

    #[async_trait]
    impl DoctorDirectory for CountingDirectory {
        async fn find_doctors_by_specialty(
            &self,
            specialty: &str,
        ) -> Result<Vec<Doctor>, DoctorDirectoryError> {
            Ok(self
                .doctors
                .iter()
                .filter(|d| d.specialty() == specialty)
                .cloned()
                .collect())
        }

        async fn open_slots(
            &self,
            _doctor_id: Uuid,
            from: NaiveDate,
            _to: NaiveDate,
        ) -> Result<Vec<Slot>, DoctorDirectoryError> {
            self.slot_calls.fetch_add(1, Ordering::SeqCst);
            let start = from.and_hms_opt(9, 0, 0).unwrap().and_utc();
            Ok((0..8)
                .map(|i| {
                    let s = start + Duration::minutes(30 * i);
                    Slot {
                        start_ts: s,
                        end_ts: s + Duration::minutes(30),
                        local_date: s.date_naive(),
                        local_start: s.format("%H:%M").to_string(),
                        local_end: (s + Duration::minutes(30)).format("%H:%M").to_string(),
                        time_zone: "UTC".to_string(),
                    }
                })
                .collect())
        }
    }

    fn doctor(specialty: &str) -> Doctor {
        Doctor::new(
            Uuid::new_v4(),
            "Dr. Example".to_string(),
            specialty.to_string(),
            None,
            Utc::now(),
        )
    }

    fn triage(level: TriageLevel, specialty: &str) -> TriageResult {
        TriageResult {
            triage_level: level,
            recommended_specialty: specialty.to_string(),
            ..TriageResult::default()
        }
    }

    #[tokio::test]
    async fn test_emergency_skips_booking_entirely() {
        let directory = Arc::new(CountingDirectory {
            doctors: vec![doctor("General Practice")],
            slot_calls: AtomicUsize::new(0),
        });
        let service = RecommendationService::new(directory.clone());

        let high = triage(TriageLevel::High, EMERGENCY_SPECIALTY);
        assert!(service.assemble(&high).await.is_none());

        // HIGH alone is enough even if the specialty survived pass 1.
        let high_specialist = triage(TriageLevel::High, "Cardiology");
        assert!(service.assemble(&high_specialist).await.is_none());

        assert_eq!(directory.slot_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_matching_doctors_get_at_most_five_slots() {
        let directory = Arc::new(CountingDirectory {
            doctors: vec![doctor("General Practice"), doctor("Cardiology")],
            slot_calls: AtomicUsize::new(0),
        });
        let service = RecommendationService::new(directory.clone());

        let recommendation = service
            .assemble(&triage(TriageLevel::Low, "General Practice"))
            .await
            .unwrap();

        assert_eq!(recommendation.doctors.len(), 1);
        assert_eq!(recommendation.doctors[0].specialty, "General Practice");
        assert_eq!(recommendation.doctors[0].slots.len(), 5);
        assert_eq!(directory.slot_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_no_matching_doctors_yields_empty_list() {
        let directory = Arc::new(CountingDirectory {
            doctors: vec![],
            slot_calls: AtomicUsize::new(0),
        });
        let service = RecommendationService::new(directory);

        let recommendation = service
            .assemble(&triage(TriageLevel::Medium, "Orthopedics"))
            .await
            .unwrap();

        assert!(recommendation.doctors.is_empty());
    }
}
