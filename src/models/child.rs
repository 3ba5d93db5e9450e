use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{Gender, VaccinationStatus};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Child {
    pub id: Uuid,
    pub name: String,
    pub birth_date: NaiveDate,
    pub gender: Option<Gender>,
    pub birth_weight_kg: Option<f64>,
    pub birth_length_cm: Option<f64>,
    pub birth_complications: Option<String>,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
}

/// One concrete dose row, instantiated from the immunization schedule at child creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vaccination {
    pub id: Uuid,
    pub child_id: Uuid,
    pub vaccine_name: String,
    pub vaccine_code: String,
    pub scheduled_date: NaiveDate,
    pub administered_date: Option<NaiveDate>,
    pub status: VaccinationStatus,
    pub batch_number: Option<String>,
    pub healthcare_provider: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrowthRecord {
    pub id: Uuid,
    pub child_id: Uuid,
    pub recorded_date: NaiveDate,
    pub age_months: i64,
    pub weight_kg: Option<f64>,
    pub height_cm: Option<f64>,
    pub head_circumference_cm: Option<f64>,
    pub weight_percentile: Option<f64>,
    pub height_percentile: Option<f64>,
    pub bmi: Option<f64>,
    pub notes: Option<String>,
}
