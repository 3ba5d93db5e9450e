use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::dates::age_in_months;
use crate::db;
use crate::growth::{self, GrowthAlert};
use crate::models::enums::{Gender, VaccinationStatus};
use crate::models::{Child, GrowthRecord, Vaccination};
use crate::reference::ReferenceData;
use crate::vaccination::{self, VaccinationSummary};

use super::{check_measurement, ServiceError, ValidationError};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewChild {
    pub name: String,
    pub birth_date: NaiveDate,
    pub gender: Option<Gender>,
    pub birth_weight_kg: Option<f64>,
    pub birth_length_cm: Option<f64>,
    pub birth_complications: Option<String>,
}

/// Details recorded when a dose is given.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdministeredDose {
    pub administered_date: NaiveDate,
    pub batch_number: Option<String>,
    pub healthcare_provider: Option<String>,
    pub notes: Option<String>,
}

/// A dose added by hand, outside the generated schedule.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewDose {
    pub vaccine_name: String,
    pub vaccine_code: String,
    pub scheduled_date: NaiveDate,
    pub administered_date: Option<NaiveDate>,
    pub batch_number: Option<String>,
    pub healthcare_provider: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewMeasurement {
    pub recorded_date: NaiveDate,
    pub weight_kg: Option<f64>,
    pub height_cm: Option<f64>,
    pub head_circumference_cm: Option<f64>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisteredChild {
    pub child: Child,
    pub vaccinations: Vec<Vaccination>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrowthEntry {
    pub record: GrowthRecord,
    pub alerts: Vec<GrowthAlert>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChildOverview {
    pub child: Child,
    pub age_months: i64,
    pub vaccinations: VaccinationSummary,
    pub latest_growth: Option<GrowthRecord>,
    pub growth_alerts: Vec<GrowthAlert>,
}

fn load_child(conn: &Connection, child_id: &Uuid) -> Result<Child, ServiceError> {
    db::get_child(conn, child_id)?.ok_or_else(|| ServiceError::not_found("Child", child_id))
}

fn load_vaccination(conn: &Connection, id: &Uuid) -> Result<Vaccination, ServiceError> {
    db::get_vaccination(conn, id)?.ok_or_else(|| ServiceError::not_found("Vaccination", id))
}

/// Store a child and instantiate its immunization schedule, classified as of `today`.
pub fn register_child(
    conn: &Connection,
    reference: &ReferenceData,
    new: NewChild,
    today: NaiveDate,
) -> Result<RegisteredChild, ServiceError> {
    let name = new.name.trim();
    if name.is_empty() {
        return Err(ValidationError::EmptyName.into());
    }
    if new.birth_date > today {
        return Err(ValidationError::BirthDateInFuture {
            birth_date: new.birth_date,
        }
        .into());
    }
    check_measurement("birth_weight_kg", new.birth_weight_kg)?;
    check_measurement("birth_length_cm", new.birth_length_cm)?;

    let child = Child {
        id: Uuid::new_v4(),
        name: name.to_string(),
        birth_date: new.birth_date,
        gender: new.gender,
        birth_weight_kg: new.birth_weight_kg,
        birth_length_cm: new.birth_length_cm,
        birth_complications: new.birth_complications,
        is_active: true,
        created_at: Utc::now().naive_utc(),
    };

    let mut doses = vaccination::generate_schedule(&reference.immunization_schedule, child.birth_date);
    vaccination::refresh_schedule(&mut doses, today);
    let vaccinations: Vec<Vaccination> = doses
        .into_iter()
        .map(|dose| Vaccination {
            id: Uuid::new_v4(),
            child_id: child.id,
            vaccine_name: dose.vaccine_name,
            vaccine_code: dose.vaccine_code,
            scheduled_date: dose.scheduled_date,
            administered_date: None,
            status: dose.status,
            batch_number: None,
            healthcare_provider: None,
            notes: None,
        })
        .collect();

    let tx = conn.unchecked_transaction().map_err(db::DatabaseError::from)?;
    db::insert_child(&tx, &child)?;
    db::insert_vaccinations(&tx, &vaccinations)?;
    tx.commit().map_err(db::DatabaseError::from)?;

    tracing::info!(
        child_id = %child.id,
        doses = vaccinations.len(),
        "Child registered"
    );
    Ok(RegisteredChild {
        child,
        vaccinations,
    })
}

/// A child's doses reclassified as of `today`, in scheduled-date order.
/// Status changes are written back.
pub fn child_vaccinations(
    conn: &Connection,
    child_id: &Uuid,
    today: NaiveDate,
) -> Result<Vec<Vaccination>, ServiceError> {
    load_child(conn, child_id)?;
    let mut doses = db::get_vaccinations_for_child(conn, child_id)?;
    let before: HashMap<Uuid, VaccinationStatus> = doses.iter().map(|d| (d.id, d.status)).collect();

    let changed = vaccination::refresh_schedule(&mut doses, today);
    if changed > 0 {
        let tx = conn.unchecked_transaction().map_err(db::DatabaseError::from)?;
        for dose in doses.iter().filter(|d| before.get(&d.id) != Some(&d.status)) {
            db::update_vaccination_status(&tx, &dose.id, dose.status)?;
        }
        tx.commit().map_err(db::DatabaseError::from)?;
    }

    tracing::debug!(child_id = %child_id, changed, "Vaccination statuses refreshed");
    Ok(doses)
}

/// Soft-delete a child. Its records stay in the store.
pub fn remove_child(conn: &Connection, child_id: &Uuid) -> Result<(), ServiceError> {
    if !db::deactivate_child(conn, child_id)? {
        return Err(ServiceError::not_found("Child", child_id));
    }
    tracing::info!(child_id = %child_id, "Child removed");
    Ok(())
}

fn check_given_date(child: &Child, given: NaiveDate, today: NaiveDate) -> Result<(), ValidationError> {
    if given > today {
        return Err(ValidationError::DateInFuture(given));
    }
    if given < child.birth_date {
        return Err(ValidationError::BeforeBirth {
            date: given,
            birth_date: child.birth_date,
        });
    }
    Ok(())
}

/// Add a dose outside the generated schedule, classified as of `today`.
pub fn add_vaccination(
    conn: &Connection,
    child_id: &Uuid,
    new: NewDose,
    today: NaiveDate,
) -> Result<Vaccination, ServiceError> {
    let child = load_child(conn, child_id)?;
    let vaccine_name = new.vaccine_name.trim();
    let vaccine_code = new.vaccine_code.trim();
    if vaccine_name.is_empty() || vaccine_code.is_empty() {
        return Err(ValidationError::EmptyName.into());
    }
    if let Some(given) = new.administered_date {
        check_given_date(&child, given, today)?;
    }
    let existing = db::get_vaccinations_for_child(conn, child_id)?;
    if existing.iter().any(|d| d.vaccine_code == vaccine_code) {
        return Err(ValidationError::DuplicateVaccine(vaccine_code.to_string()).into());
    }

    let dose = Vaccination {
        id: Uuid::new_v4(),
        child_id: child.id,
        vaccine_name: vaccine_name.to_string(),
        vaccine_code: vaccine_code.to_string(),
        scheduled_date: new.scheduled_date,
        administered_date: new.administered_date,
        status: vaccination::classify_status(new.scheduled_date, new.administered_date, today),
        batch_number: new.batch_number,
        healthcare_provider: new.healthcare_provider,
        notes: new.notes,
    };
    db::insert_vaccination(conn, &dose)?;

    tracing::info!(
        vaccination_id = %dose.id,
        vaccine_code = %dose.vaccine_code,
        status = %dose.status,
        "Vaccination added"
    );
    Ok(dose)
}

pub fn record_vaccination_given(
    conn: &Connection,
    vaccination_id: &Uuid,
    given: AdministeredDose,
    today: NaiveDate,
) -> Result<Vaccination, ServiceError> {
    let mut dose = load_vaccination(conn, vaccination_id)?;
    let child = load_child(conn, &dose.child_id)?;
    check_given_date(&child, given.administered_date, today)?;

    dose.administered_date = Some(given.administered_date);
    dose.status = vaccination::classify_status(dose.scheduled_date, dose.administered_date, today);
    dose.batch_number = given.batch_number.or(dose.batch_number);
    dose.healthcare_provider = given.healthcare_provider.or(dose.healthcare_provider);
    dose.notes = given.notes.or(dose.notes);
    db::update_vaccination(conn, &dose)?;

    tracing::info!(
        vaccination_id = %dose.id,
        vaccine_code = %dose.vaccine_code,
        "Vaccination recorded"
    );
    Ok(dose)
}

/// Mark a dose skipped. Skipped doses stay skipped until given.
pub fn skip_vaccination(
    conn: &Connection,
    vaccination_id: &Uuid,
    reason: Option<String>,
) -> Result<Vaccination, ServiceError> {
    let mut dose = load_vaccination(conn, vaccination_id)?;
    if dose.administered_date.is_some() {
        return Err(ValidationError::AlreadyAdministered(dose.id).into());
    }

    dose.status = VaccinationStatus::Skipped;
    if reason.is_some() {
        dose.notes = reason;
    }
    db::update_vaccination(conn, &dose)?;

    tracing::info!(vaccination_id = %dose.id, "Vaccination skipped");
    Ok(dose)
}

pub fn record_growth(
    conn: &Connection,
    child_id: &Uuid,
    measurement: NewMeasurement,
) -> Result<GrowthEntry, ServiceError> {
    let child = load_child(conn, child_id)?;
    if measurement.recorded_date < child.birth_date {
        return Err(ValidationError::BeforeBirth {
            date: measurement.recorded_date,
            birth_date: child.birth_date,
        }
        .into());
    }
    check_measurement("weight_kg", measurement.weight_kg)?;
    check_measurement("height_cm", measurement.height_cm)?;
    check_measurement("head_circumference_cm", measurement.head_circumference_cm)?;

    let age_months = age_in_months(child.birth_date, measurement.recorded_date);
    let estimate = growth::estimate(
        age_months,
        measurement.weight_kg,
        measurement.height_cm,
        child.gender,
    );
    let alerts = growth::growth_alerts(estimate.weight_percentile, estimate.height_percentile);

    let record = GrowthRecord {
        id: Uuid::new_v4(),
        child_id: child.id,
        recorded_date: measurement.recorded_date,
        age_months,
        weight_kg: measurement.weight_kg,
        height_cm: measurement.height_cm,
        head_circumference_cm: measurement.head_circumference_cm,
        weight_percentile: estimate.weight_percentile,
        height_percentile: estimate.height_percentile,
        bmi: estimate.bmi,
        notes: measurement.notes,
    };
    db::insert_growth_record(conn, &record)?;

    if !alerts.is_empty() {
        tracing::warn!(child_id = %child.id, alerts = alerts.len(), "Growth outside expected range");
    }
    Ok(GrowthEntry { record, alerts })
}

/// Every stored measurement for a child, oldest first, with its alerts.
pub fn child_growth_history(
    conn: &Connection,
    child_id: &Uuid,
) -> Result<Vec<GrowthEntry>, ServiceError> {
    load_child(conn, child_id)?;
    let entries = db::get_growth_records_for_child(conn, child_id)?
        .into_iter()
        .map(|record| GrowthEntry {
            alerts: growth::growth_alerts(record.weight_percentile, record.height_percentile),
            record,
        })
        .collect();
    Ok(entries)
}

pub fn child_overview(
    conn: &Connection,
    child_id: &Uuid,
    today: NaiveDate,
) -> Result<ChildOverview, ServiceError> {
    let child = load_child(conn, child_id)?;
    let doses = child_vaccinations(conn, child_id, today)?;
    let latest_growth = db::get_latest_growth_record(conn, child_id)?;
    let growth_alerts = latest_growth
        .as_ref()
        .map(|r| growth::growth_alerts(r.weight_percentile, r.height_percentile))
        .unwrap_or_default();

    Ok(ChildOverview {
        age_months: age_in_months(child.birth_date, today),
        vaccinations: vaccination::summarize(&doses),
        latest_growth,
        growth_alerts,
        child,
    })
}
