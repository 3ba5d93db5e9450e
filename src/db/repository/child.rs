use std::str::FromStr;

use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::enums::Gender;
use crate::models::Child;

use super::{date_to_sql, datetime_to_sql, parse_date, parse_datetime, parse_uuid};

const CHILD_COLUMNS: &str = "id, name, birth_date, gender, birth_weight_kg, birth_length_cm,
     birth_complications, is_active, created_at";

pub fn insert_child(conn: &Connection, child: &Child) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO children (id, name, birth_date, gender, birth_weight_kg, birth_length_cm,
         birth_complications, is_active, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            child.id.to_string(),
            child.name,
            date_to_sql(child.birth_date),
            child.gender.map(|g| g.as_str()),
            child.birth_weight_kg,
            child.birth_length_cm,
            child.birth_complications,
            child.is_active as i32,
            datetime_to_sql(child.created_at),
        ],
    )?;
    Ok(())
}

pub fn get_child(conn: &Connection, id: &Uuid) -> Result<Option<Child>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {CHILD_COLUMNS} FROM children WHERE id = ?1"
    ))?;

    let result = stmt.query_row(params![id.to_string()], read_child_row);

    match result {
        Ok(row) => Ok(Some(child_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Active children, oldest first.
pub fn get_active_children(conn: &Connection) -> Result<Vec<Child>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {CHILD_COLUMNS} FROM children WHERE is_active = 1 ORDER BY birth_date ASC"
    ))?;

    let rows = stmt.query_map([], read_child_row)?;
    let mut children = Vec::new();
    for row in rows {
        children.push(child_from_row(row?)?);
    }
    Ok(children)
}

/// Soft-delete. Returns false when no such child exists.
pub fn deactivate_child(conn: &Connection, id: &Uuid) -> Result<bool, DatabaseError> {
    let changed = conn.execute(
        "UPDATE children SET is_active = 0 WHERE id = ?1",
        params![id.to_string()],
    )?;
    Ok(changed > 0)
}

struct ChildRow {
    id: String,
    name: String,
    birth_date: String,
    gender: Option<String>,
    birth_weight_kg: Option<f64>,
    birth_length_cm: Option<f64>,
    birth_complications: Option<String>,
    is_active: i32,
    created_at: String,
}

fn read_child_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ChildRow> {
    Ok(ChildRow {
        id: row.get(0)?,
        name: row.get(1)?,
        birth_date: row.get(2)?,
        gender: row.get(3)?,
        birth_weight_kg: row.get(4)?,
        birth_length_cm: row.get(5)?,
        birth_complications: row.get(6)?,
        is_active: row.get(7)?,
        created_at: row.get(8)?,
    })
}

fn child_from_row(row: ChildRow) -> Result<Child, DatabaseError> {
    Ok(Child {
        id: parse_uuid(&row.id)?,
        name: row.name,
        birth_date: parse_date(&row.birth_date)?,
        gender: row.gender.as_deref().map(Gender::from_str).transpose()?,
        birth_weight_kg: row.birth_weight_kg,
        birth_length_cm: row.birth_length_cm,
        birth_complications: row.birth_complications,
        is_active: row.is_active != 0,
        created_at: parse_datetime(&row.created_at)?,
    })
}
