use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::Pregnancy;

use super::{
    date_to_sql, datetime_to_sql, parse_date, parse_datetime, parse_optional_date, parse_uuid,
};

const PREGNANCY_COLUMNS: &str = "id, due_date, current_week, is_active, last_weight_kg,
     last_checkup, complications, notes, created_at";

pub fn insert_pregnancy(conn: &Connection, pregnancy: &Pregnancy) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO pregnancies (id, due_date, current_week, is_active, last_weight_kg,
         last_checkup, complications, notes, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            pregnancy.id.to_string(),
            date_to_sql(pregnancy.due_date),
            pregnancy.current_week,
            pregnancy.is_active as i32,
            pregnancy.last_weight_kg,
            pregnancy.last_checkup.map(date_to_sql),
            pregnancy.complications,
            pregnancy.notes,
            datetime_to_sql(pregnancy.created_at),
        ],
    )?;
    Ok(())
}

pub fn get_pregnancy(conn: &Connection, id: &Uuid) -> Result<Option<Pregnancy>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PREGNANCY_COLUMNS} FROM pregnancies WHERE id = ?1"
    ))?;

    match stmt.query_row(params![id.to_string()], read_pregnancy_row) {
        Ok(row) => Ok(Some(pregnancy_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// The most recently created active pregnancy, if any.
pub fn get_active_pregnancy(conn: &Connection) -> Result<Option<Pregnancy>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PREGNANCY_COLUMNS} FROM pregnancies WHERE is_active = 1
         ORDER BY created_at DESC, rowid DESC LIMIT 1"
    ))?;

    match stmt.query_row([], read_pregnancy_row) {
        Ok(row) => Ok(Some(pregnancy_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Mark every active pregnancy inactive. Returns how many were closed.
pub fn deactivate_pregnancies(conn: &Connection) -> Result<usize, DatabaseError> {
    let changed = conn.execute("UPDATE pregnancies SET is_active = 0 WHERE is_active = 1", [])?;
    Ok(changed)
}

pub fn update_pregnancy_week(conn: &Connection, id: &Uuid, week: u32) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE pregnancies SET current_week = ?1 WHERE id = ?2",
        params![week, id.to_string()],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Pregnancy".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

struct PregnancyRow {
    id: String,
    due_date: String,
    current_week: u32,
    is_active: i32,
    last_weight_kg: Option<f64>,
    last_checkup: Option<String>,
    complications: Option<String>,
    notes: Option<String>,
    created_at: String,
}

fn read_pregnancy_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<PregnancyRow> {
    Ok(PregnancyRow {
        id: row.get(0)?,
        due_date: row.get(1)?,
        current_week: row.get(2)?,
        is_active: row.get(3)?,
        last_weight_kg: row.get(4)?,
        last_checkup: row.get(5)?,
        complications: row.get(6)?,
        notes: row.get(7)?,
        created_at: row.get(8)?,
    })
}

fn pregnancy_from_row(row: PregnancyRow) -> Result<Pregnancy, DatabaseError> {
    Ok(Pregnancy {
        id: parse_uuid(&row.id)?,
        due_date: parse_date(&row.due_date)?,
        current_week: row.current_week,
        is_active: row.is_active != 0,
        last_weight_kg: row.last_weight_kg,
        last_checkup: parse_optional_date(row.last_checkup)?,
        complications: row.complications,
        notes: row.notes,
        created_at: parse_datetime(&row.created_at)?,
    })
}
