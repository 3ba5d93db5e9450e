use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{AssessmentType, RiskLevel};

/// Item id (e.g. `"q1"`) to sub-score.
pub type AssessmentResponses = BTreeMap<String, i64>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MentalHealthAssessment {
    pub id: Uuid,
    pub assessment_type: AssessmentType,
    pub score: u32,
    pub risk_level: RiskLevel,
    pub responses: AssessmentResponses,
    pub recommendation: String,
    pub crisis_indicated: bool,
    pub assessment_date: NaiveDate,
}
