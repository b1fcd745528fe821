use chrono::{DateTime, NaiveTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::entities::Doctor;
use crate::infrastructure::database::schema::{appointments, doctor_availability, doctors};

#[derive(Debug, Queryable, Selectable, Identifiable)]
#[diesel(table_name = doctors)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct DoctorModel {
    pub id: Uuid,
    pub name: String,
    pub specialty: String,
    pub bio: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<DoctorModel> for Doctor {
    fn from(model: DoctorModel) -> Self {
        Doctor::new(
            model.id,
            model.name,
            model.specialty,
            model.bio,
            model.created_at,
        )
    }
}

/// Weekly recurring availability template; weekday follows chrono's
/// `num_days_from_monday` (0 = Monday).
#[derive(Debug, Queryable, Selectable, Identifiable)]
#[diesel(table_name = doctor_availability)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct AvailabilityModel {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub weekday: i32,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub slot_minutes: i32,
}

#[derive(Debug, Queryable, Selectable, Identifiable)]
#[diesel(table_name = appointments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct AppointmentModel {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub start_ts: DateTime<Utc>,
    pub end_ts: DateTime<Utc>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}
