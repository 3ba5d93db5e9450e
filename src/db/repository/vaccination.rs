use std::str::FromStr;

use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::enums::VaccinationStatus;
use crate::models::Vaccination;

use super::{date_to_sql, parse_date, parse_optional_date, parse_uuid};

const VACCINATION_COLUMNS: &str = "id, child_id, vaccine_name, vaccine_code, scheduled_date,
     administered_date, status, batch_number, healthcare_provider, notes";

pub fn insert_vaccination(conn: &Connection, vax: &Vaccination) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO vaccinations (id, child_id, vaccine_name, vaccine_code, scheduled_date,
         administered_date, status, batch_number, healthcare_provider, notes)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            vax.id.to_string(),
            vax.child_id.to_string(),
            vax.vaccine_name,
            vax.vaccine_code,
            date_to_sql(vax.scheduled_date),
            vax.administered_date.map(date_to_sql),
            vax.status.as_str(),
            vax.batch_number,
            vax.healthcare_provider,
            vax.notes,
        ],
    )?;
    Ok(())
}

/// Insert a child's schedule. Callers own the surrounding transaction.
pub fn insert_vaccinations(conn: &Connection, rows: &[Vaccination]) -> Result<(), DatabaseError> {
    for vax in rows {
        insert_vaccination(conn, vax)?;
    }
    Ok(())
}

pub fn get_vaccination(conn: &Connection, id: &Uuid) -> Result<Option<Vaccination>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {VACCINATION_COLUMNS} FROM vaccinations WHERE id = ?1"
    ))?;

    match stmt.query_row(params![id.to_string()], read_vaccination_row) {
        Ok(row) => Ok(Some(vaccination_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// All doses for a child in scheduled-date order.
pub fn get_vaccinations_for_child(
    conn: &Connection,
    child_id: &Uuid,
) -> Result<Vec<Vaccination>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {VACCINATION_COLUMNS} FROM vaccinations WHERE child_id = ?1
         ORDER BY scheduled_date ASC, rowid ASC"
    ))?;

    let rows = stmt.query_map(params![child_id.to_string()], read_vaccination_row)?;
    let mut doses = Vec::new();
    for row in rows {
        doses.push(vaccination_from_row(row?)?);
    }
    Ok(doses)
}

pub fn update_vaccination_status(
    conn: &Connection,
    id: &Uuid,
    status: VaccinationStatus,
) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE vaccinations SET status = ?1 WHERE id = ?2",
        params![status.as_str(), id.to_string()],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Vaccination".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

/// Write back every mutable field of a dose.
pub fn update_vaccination(conn: &Connection, vax: &Vaccination) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE vaccinations SET administered_date = ?1, status = ?2, batch_number = ?3,
         healthcare_provider = ?4, notes = ?5
         WHERE id = ?6",
        params![
            vax.administered_date.map(date_to_sql),
            vax.status.as_str(),
            vax.batch_number,
            vax.healthcare_provider,
            vax.notes,
            vax.id.to_string(),
        ],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Vaccination".into(),
            id: vax.id.to_string(),
        });
    }
    Ok(())
}

struct VaccinationRow {
    id: String,
    child_id: String,
    vaccine_name: String,
    vaccine_code: String,
    scheduled_date: String,
    administered_date: Option<String>,
    status: String,
    batch_number: Option<String>,
    healthcare_provider: Option<String>,
    notes: Option<String>,
}

fn read_vaccination_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<VaccinationRow> {
    Ok(VaccinationRow {
        id: row.get(0)?,
        child_id: row.get(1)?,
        vaccine_name: row.get(2)?,
        vaccine_code: row.get(3)?,
        scheduled_date: row.get(4)?,
        administered_date: row.get(5)?,
        status: row.get(6)?,
        batch_number: row.get(7)?,
        healthcare_provider: row.get(8)?,
        notes: row.get(9)?,
    })
}

fn vaccination_from_row(row: VaccinationRow) -> Result<Vaccination, DatabaseError> {
    Ok(Vaccination {
        id: parse_uuid(&row.id)?,
        child_id: parse_uuid(&row.child_id)?,
        vaccine_name: row.vaccine_name,
        vaccine_code: row.vaccine_code,
        scheduled_date: parse_date(&row.scheduled_date)?,
        administered_date: parse_optional_date(row.administered_date)?,
        status: VaccinationStatus::from_str(&row.status)?,
        batch_number: row.batch_number,
        healthcare_provider: row.healthcare_provider,
        notes: row.notes,
    })
}
