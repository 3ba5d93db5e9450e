use std::str::FromStr;

use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::enums::{AssessmentType, RiskLevel};
use crate::models::{AssessmentResponses, MentalHealthAssessment};

use super::{date_to_sql, parse_date, parse_uuid};

const ASSESSMENT_COLUMNS: &str = "id, assessment_type, score, risk_level, responses,
     recommendation, crisis_indicated, assessment_date";

/// Responses are stored as a JSON object of item id to sub-score.
pub fn insert_assessment(
    conn: &Connection,
    assessment: &MentalHealthAssessment,
) -> Result<(), DatabaseError> {
    let responses = serde_json::to_string(&assessment.responses)?;
    conn.execute(
        "INSERT INTO mental_health_assessments (id, assessment_type, score, risk_level, responses,
         recommendation, crisis_indicated, assessment_date)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            assessment.id.to_string(),
            assessment.assessment_type.as_str(),
            assessment.score,
            assessment.risk_level.as_str(),
            responses,
            assessment.recommendation,
            assessment.crisis_indicated as i32,
            date_to_sql(assessment.assessment_date),
        ],
    )?;
    Ok(())
}

pub fn get_assessment(
    conn: &Connection,
    id: &Uuid,
) -> Result<Option<MentalHealthAssessment>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {ASSESSMENT_COLUMNS} FROM mental_health_assessments WHERE id = ?1"
    ))?;

    match stmt.query_row(params![id.to_string()], read_assessment_row) {
        Ok(row) => Ok(Some(assessment_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Newest first. `limit` of `None` returns everything.
pub fn get_recent_assessments(
    conn: &Connection,
    limit: Option<u32>,
) -> Result<Vec<MentalHealthAssessment>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {ASSESSMENT_COLUMNS} FROM mental_health_assessments
         ORDER BY assessment_date DESC, rowid DESC LIMIT ?1"
    ))?;

    let limit = limit.map(i64::from).unwrap_or(-1);
    let rows = stmt.query_map(params![limit], read_assessment_row)?;
    let mut assessments = Vec::new();
    for row in rows {
        assessments.push(assessment_from_row(row?)?);
    }
    Ok(assessments)
}

struct AssessmentRow {
    id: String,
    assessment_type: String,
    score: u32,
    risk_level: String,
    responses: String,
    recommendation: String,
    crisis_indicated: i32,
    assessment_date: String,
}

fn read_assessment_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<AssessmentRow> {
    Ok(AssessmentRow {
        id: row.get(0)?,
        assessment_type: row.get(1)?,
        score: row.get(2)?,
        risk_level: row.get(3)?,
        responses: row.get(4)?,
        recommendation: row.get(5)?,
        crisis_indicated: row.get(6)?,
        assessment_date: row.get(7)?,
    })
}

fn assessment_from_row(row: AssessmentRow) -> Result<MentalHealthAssessment, DatabaseError> {
    let responses: AssessmentResponses = serde_json::from_str(&row.responses)?;
    Ok(MentalHealthAssessment {
        id: parse_uuid(&row.id)?,
        assessment_type: AssessmentType::from_str(&row.assessment_type)?,
        score: row.score,
        risk_level: RiskLevel::from_str(&row.risk_level)?,
        responses,
        recommendation: row.recommendation,
        crisis_indicated: row.crisis_indicated != 0,
        assessment_date: parse_date(&row.assessment_date)?,
    })
}
