use async_trait::async_trait;
use chrono::{Datelike, Duration, NaiveDate, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::entities::{Doctor, Slot};
use crate::domain::repositories::DoctorDirectory;
use crate::domain::repositories::doctor_directory::DoctorDirectoryError;
use crate::infrastructure::database::models::{AppointmentModel, AvailabilityModel, DoctorModel};
use crate::infrastructure::database::{DbPool, get_connection_from_pool};

const CANCELLED_STATUS: &str = "CANCELLED";

/// Calendar side of the availability collaborator: weekly templates expanded
/// over the requested window minus booked appointments. Slot instants are
/// kept in UTC end to end (see DESIGN.md on the window timezone).
pub struct PostgresDoctorDirectory {
    pool: DbPool,
}

impl PostgresDoctorDirectory {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DoctorDirectory for PostgresDoctorDirectory {
    async fn find_doctors_by_specialty(
        &self,
        wanted: &str,
    ) -> Result<Vec<Doctor>, DoctorDirectoryError> {
        use crate::infrastructure::database::schema::doctors::dsl::*;

        let mut conn = get_connection_from_pool(&self.pool)
            .map_err(|e| DoctorDirectoryError::DatabaseError(e.to_string()))?;

        let models = doctors
            .filter(specialty.eq(wanted))
            .order(created_at.asc())
            .select(DoctorModel::as_select())
            .load::<DoctorModel>(&mut conn)
            .map_err(|e| DoctorDirectoryError::DatabaseError(e.to_string()))?;

        Ok(models.into_iter().map(Doctor::from).collect())
    }

    async fn open_slots(
        &self,
        doctor: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Slot>, DoctorDirectoryError> {
        let mut conn = get_connection_from_pool(&self.pool)
            .map_err(|e| DoctorDirectoryError::DatabaseError(e.to_string()))?;

        let templates = {
            use crate::infrastructure::database::schema::doctor_availability::dsl::*;
            doctor_availability
                .filter(doctor_id.eq(doctor))
                .select(AvailabilityModel::as_select())
                .load::<AvailabilityModel>(&mut conn)
                .map_err(|e| DoctorDirectoryError::DatabaseError(e.to_string()))?
        };

        let window_start = from.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc();
        let window_end = (to + Duration::days(1))
            .and_hms_opt(0, 0, 0)
            .unwrap_or_default()
            .and_utc();

        let booked = {
            use crate::infrastructure::database::schema::appointments::dsl::*;
            appointments
                .filter(doctor_id.eq(doctor))
                .filter(status.ne(CANCELLED_STATUS))
                .filter(start_ts.lt(window_end))
                .filter(end_ts.gt(window_start))
                .select(AppointmentModel::as_select())
                .load::<AppointmentModel>(&mut conn)
                .map_err(|e| DoctorDirectoryError::DatabaseError(e.to_string()))?
        };

        Ok(expand_slots(&templates, &booked, from, to))
    }
}

fn expand_slots(
    templates: &[AvailabilityModel],
    booked: &[AppointmentModel],
    from: NaiveDate,
    to: NaiveDate,
) -> Vec<Slot> {
    let now = Utc::now();
    let mut slots = Vec::new();

    let mut date = from;
    while date <= to {
        let weekday = date.weekday().num_days_from_monday() as i32;

        for template in templates.iter().filter(|t| t.weekday == weekday) {
            let step = Duration::minutes(template.slot_minutes.max(1) as i64);
            let window_end = date.and_time(template.end_time).and_utc();
            let mut cursor = date.and_time(template.start_time).and_utc();

            while cursor + step <= window_end {
                let slot_end = cursor + step;
                let in_the_past = cursor < now;
                let taken = booked
                    .iter()
                    .any(|a| a.start_ts < slot_end && a.end_ts > cursor);

                if !in_the_past && !taken {
                    slots.push(Slot {
                        start_ts: cursor,
                        end_ts: slot_end,
                        local_date: cursor.date_naive(),
                        local_start: cursor.format("%H:%M").to_string(),
                        local_end: slot_end.format("%H:%M").to_string(),
                        time_zone: "UTC".to_string(),
                    });
                }

                cursor = slot_end;
            }
        }

        date += Duration::days(1);
    }

    slots.sort_by_key(|s| s.start_ts);
    slots
}
