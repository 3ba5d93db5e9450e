use std::str::FromStr;

use chrono::NaiveDate;
use rusqlite::Connection;
use uuid::Uuid;

use crate::db;
use crate::mental_health;
use crate::models::enums::AssessmentType;
use crate::models::{AssessmentResponses, MentalHealthAssessment};

use super::{ServiceError, ValidationError};

/// Score, classify and store a questionnaire. Unknown types are rejected;
/// `mental_health::assess` is the lenient path.
pub fn submit_assessment(
    conn: &Connection,
    assessment_type: &str,
    responses: AssessmentResponses,
    today: NaiveDate,
) -> Result<MentalHealthAssessment, ServiceError> {
    let kind = AssessmentType::from_str(assessment_type.trim())
        .map_err(|_| ValidationError::UnknownAssessmentType(assessment_type.to_string()))?;
    if let Some((item, value)) = responses.iter().find(|(_, v)| **v < 0) {
        return Err(ValidationError::NegativeResponse {
            item: item.clone(),
            value: *value,
        }
        .into());
    }

    let outcome = mental_health::evaluate(kind, &responses);
    let assessment = MentalHealthAssessment {
        id: Uuid::new_v4(),
        assessment_type: kind,
        score: outcome.score,
        risk_level: outcome.risk_level,
        responses,
        recommendation: outcome.recommendation,
        crisis_indicated: outcome.crisis_indicated,
        assessment_date: today,
    };
    db::insert_assessment(conn, &assessment)?;

    tracing::info!(
        assessment_id = %assessment.id,
        assessment_type = %kind,
        risk_level = %assessment.risk_level,
        "Assessment recorded"
    );
    if assessment.crisis_indicated {
        tracing::warn!(assessment_id = %assessment.id, "Self-harm item answered positively");
    }
    Ok(assessment)
}

/// Stored assessments, newest first.
pub fn assessment_history(
    conn: &Connection,
    limit: Option<u32>,
) -> Result<Vec<MentalHealthAssessment>, ServiceError> {
    Ok(db::get_recent_assessments(conn, limit)?)
}
