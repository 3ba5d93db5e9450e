use chrono::{NaiveDate, Utc};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::dates::days_between;
use crate::db;
use crate::models::Pregnancy;
use crate::pregnancy::{self, PregnancyStatus, WeeklyInfo, MAX_WEEK};
use crate::reference::{DangerSign, ReferenceData};

use super::{check_measurement, ServiceError, ValidationError};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewPregnancy {
    pub due_date: NaiveDate,
    pub last_weight_kg: Option<f64>,
    pub last_checkup: Option<NaiveDate>,
    pub complications: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PregnancyOverview {
    pub pregnancy: Pregnancy,
    pub status: PregnancyStatus,
    pub weekly_info: WeeklyInfo,
    pub danger_signs: Vec<DangerSign>,
}

/// Record a new active pregnancy. Any earlier active pregnancy is closed.
pub fn register_pregnancy(
    conn: &Connection,
    new: NewPregnancy,
    today: NaiveDate,
) -> Result<Pregnancy, ServiceError> {
    let days_to_due = days_between(today, new.due_date);
    let limit = i64::from(MAX_WEEK) * 7;
    if days_to_due > limit {
        return Err(ValidationError::DueDateTooFar {
            due_date: new.due_date,
        }
        .into());
    }
    if days_to_due < -limit {
        return Err(ValidationError::DueDateTooOld {
            due_date: new.due_date,
        }
        .into());
    }
    check_measurement("last_weight_kg", new.last_weight_kg)?;

    let pregnancy = Pregnancy {
        id: Uuid::new_v4(),
        due_date: new.due_date,
        current_week: pregnancy::pregnancy_week(new.due_date, today),
        is_active: true,
        last_weight_kg: new.last_weight_kg,
        last_checkup: new.last_checkup,
        complications: new.complications,
        notes: new.notes,
        created_at: Utc::now().naive_utc(),
    };

    let tx = conn.unchecked_transaction().map_err(db::DatabaseError::from)?;
    let closed = db::deactivate_pregnancies(&tx)?;
    db::insert_pregnancy(&tx, &pregnancy)?;
    tx.commit().map_err(db::DatabaseError::from)?;

    tracing::info!(
        pregnancy_id = %pregnancy.id,
        week = pregnancy.current_week,
        closed,
        "Pregnancy registered"
    );
    Ok(pregnancy)
}

/// Status, guidance and danger signs for the active pregnancy, as of `today`.
/// The stored week is brought up to date when it has drifted.
pub fn pregnancy_overview(
    conn: &Connection,
    reference: &ReferenceData,
    today: NaiveDate,
) -> Result<Option<PregnancyOverview>, ServiceError> {
    let Some(mut pregnancy) = db::get_active_pregnancy(conn)? else {
        return Ok(None);
    };

    let status = pregnancy::pregnancy_status(pregnancy.due_date, today);
    if status.current_week != pregnancy.current_week {
        db::update_pregnancy_week(conn, &pregnancy.id, status.current_week)?;
        tracing::debug!(
            pregnancy_id = %pregnancy.id,
            from = pregnancy.current_week,
            to = status.current_week,
            "Pregnancy week advanced"
        );
        pregnancy.current_week = status.current_week;
    }

    Ok(Some(PregnancyOverview {
        weekly_info: pregnancy::weekly_info(&reference.pregnancy_guide, status.current_week),
        danger_signs: pregnancy::danger_signs(reference).to_vec(),
        status,
        pregnancy,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dates::add_days;
    use crate::services::test_support::*;

    fn new_pregnancy(due_date: NaiveDate) -> NewPregnancy {
        NewPregnancy {
            due_date,
            last_weight_kg: Some(62.0),
            ..Default::default()
        }
    }

    #[test]
    fn register_stores_current_week() {
        let (conn, _) = setup();
        let today = date(2024, 3, 1);
        // 140 days before the due date: 20 weeks in.
        let p = register_pregnancy(&conn, new_pregnancy(add_days(today, 140)), today).unwrap();
        assert_eq!(p.current_week, 20);
        assert!(p.is_active);
        assert_eq!(db::get_active_pregnancy(&conn).unwrap().unwrap().id, p.id);
    }

    #[test]
    fn second_registration_closes_first() {
        let (conn, _) = setup();
        let today = date(2024, 3, 1);
        let first = register_pregnancy(&conn, new_pregnancy(add_days(today, 100)), today).unwrap();
        let second = register_pregnancy(&conn, new_pregnancy(add_days(today, 200)), today).unwrap();

        assert!(!db::get_pregnancy(&conn, &first.id).unwrap().unwrap().is_active);
        assert_eq!(db::get_active_pregnancy(&conn).unwrap().unwrap().id, second.id);
    }

    #[test]
    fn due_date_too_far_rejected() {
        let (conn, _) = setup();
        let today = date(2024, 3, 1);
        assert!(register_pregnancy(&conn, new_pregnancy(add_days(today, 294)), today).is_ok());
        assert!(matches!(
            register_pregnancy(&conn, new_pregnancy(add_days(today, 295)), today),
            Err(ServiceError::Validation(ValidationError::DueDateTooFar { .. }))
        ));
    }

    #[test]
    fn past_due_date_is_accepted_and_clamped() {
        let (conn, _) = setup();
        let today = date(2024, 3, 1);
        let p = register_pregnancy(&conn, new_pregnancy(add_days(today, -60)), today).unwrap();
        assert_eq!(p.current_week, 42);
    }

    #[test]
    fn due_date_too_old_rejected() {
        let (conn, _) = setup();
        let today = date(2024, 3, 1);
        assert!(register_pregnancy(&conn, new_pregnancy(add_days(today, -294)), today).is_ok());
        assert!(matches!(
            register_pregnancy(&conn, new_pregnancy(add_days(today, -295)), today),
            Err(ServiceError::Validation(ValidationError::DueDateTooOld { .. }))
        ));
        assert!(matches!(
            register_pregnancy(&conn, new_pregnancy(NaiveDate::MIN), today),
            Err(ServiceError::Validation(ValidationError::DueDateTooOld { .. }))
        ));
        assert!(matches!(
            register_pregnancy(&conn, new_pregnancy(NaiveDate::MAX), today),
            Err(ServiceError::Validation(ValidationError::DueDateTooFar { .. }))
        ));
    }

    #[test]
    fn overview_without_pregnancy() {
        let (conn, reference) = setup();
        assert!(pregnancy_overview(&conn, &reference, date(2024, 1, 1))
            .unwrap()
            .is_none());
    }

    #[test]
    fn overview_advances_stored_week() {
        let (conn, reference) = setup();
        let registered_on = date(2024, 3, 1);
        let due = add_days(registered_on, 140);
        let p = register_pregnancy(&conn, new_pregnancy(due), registered_on).unwrap();

        let later = add_days(registered_on, 56);
        let overview = pregnancy_overview(&conn, &reference, later).unwrap().unwrap();
        assert_eq!(overview.status.current_week, 28);
        assert_eq!(overview.status.trimester, 3);
        assert_eq!(overview.status.weeks_remaining, 12);
        assert_eq!(overview.pregnancy.current_week, 28);
        assert_eq!(overview.weekly_info.week, 28);
        assert!(overview
            .weekly_info
            .recommended_appointments
            .contains(&"Glucose screening test".to_string()));
        assert_eq!(overview.danger_signs.len(), 6);

        let stored = db::get_pregnancy(&conn, &p.id).unwrap().unwrap();
        assert_eq!(stored.current_week, 28);
    }
}
