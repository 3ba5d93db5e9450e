use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::GrowthRecord;

use super::{date_to_sql, parse_date, parse_uuid};

const GROWTH_COLUMNS: &str = "id, child_id, recorded_date, age_months, weight_kg, height_cm,
     head_circumference_cm, weight_percentile, height_percentile, bmi, notes";

pub fn insert_growth_record(conn: &Connection, record: &GrowthRecord) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO growth_records (id, child_id, recorded_date, age_months, weight_kg, height_cm,
         head_circumference_cm, weight_percentile, height_percentile, bmi, notes)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            record.id.to_string(),
            record.child_id.to_string(),
            date_to_sql(record.recorded_date),
            record.age_months,
            record.weight_kg,
            record.height_cm,
            record.head_circumference_cm,
            record.weight_percentile,
            record.height_percentile,
            record.bmi,
            record.notes,
        ],
    )?;
    Ok(())
}

/// Growth history for a child, oldest measurement first.
pub fn get_growth_records_for_child(
    conn: &Connection,
    child_id: &Uuid,
) -> Result<Vec<GrowthRecord>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {GROWTH_COLUMNS} FROM growth_records WHERE child_id = ?1
         ORDER BY recorded_date ASC, rowid ASC"
    ))?;

    let rows = stmt.query_map(params![child_id.to_string()], read_growth_row)?;
    let mut records = Vec::new();
    for row in rows {
        records.push(growth_from_row(row?)?);
    }
    Ok(records)
}

pub fn get_latest_growth_record(
    conn: &Connection,
    child_id: &Uuid,
) -> Result<Option<GrowthRecord>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {GROWTH_COLUMNS} FROM growth_records WHERE child_id = ?1
         ORDER BY recorded_date DESC, rowid DESC LIMIT 1"
    ))?;

    match stmt.query_row(params![child_id.to_string()], read_growth_row) {
        Ok(row) => Ok(Some(growth_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

struct GrowthRow {
    id: String,
    child_id: String,
    recorded_date: String,
    age_months: i64,
    weight_kg: Option<f64>,
    height_cm: Option<f64>,
    head_circumference_cm: Option<f64>,
    weight_percentile: Option<f64>,
    height_percentile: Option<f64>,
    bmi: Option<f64>,
    notes: Option<String>,
}

fn read_growth_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<GrowthRow> {
    Ok(GrowthRow {
        id: row.get(0)?,
        child_id: row.get(1)?,
        recorded_date: row.get(2)?,
        age_months: row.get(3)?,
        weight_kg: row.get(4)?,
        height_cm: row.get(5)?,
        head_circumference_cm: row.get(6)?,
        weight_percentile: row.get(7)?,
        height_percentile: row.get(8)?,
        bmi: row.get(9)?,
        notes: row.get(10)?,
    })
}

fn growth_from_row(row: GrowthRow) -> Result<GrowthRecord, DatabaseError> {
    Ok(GrowthRecord {
        id: parse_uuid(&row.id)?,
        child_id: parse_uuid(&row.child_id)?,
        recorded_date: parse_date(&row.recorded_date)?,
        age_months: row.age_months,
        weight_kg: row.weight_kg,
        height_cm: row.height_cm,
        head_circumference_cm: row.head_circumference_cm,
        weight_percentile: row.weight_percentile,
        height_percentile: row.height_percentile,
        bmi: row.bmi,
        notes: row.notes,
    })
}
