use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pregnancy {
    pub id: Uuid,
    pub due_date: NaiveDate,
    /// Week as of the last write; read paths recompute from `due_date`.
    pub current_week: u32,
    pub is_active: bool,
    pub last_weight_kg: Option<f64>,
    pub last_checkup: Option<NaiveDate>,
    pub complications: Option<String>,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
}
