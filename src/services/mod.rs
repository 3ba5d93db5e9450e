//! Request handlers over storage and the calculation engine.
//!
//! Each operation takes a `&Connection`, the loaded [`ReferenceData`] where it
//! needs it, and an explicit `today`. Handlers copy primitive fields out of
//! stored records, call the engine, and write results back.

pub mod assistant;
pub mod child;
pub mod mental_health;
pub mod pregnancy;

use std::fs;

use chrono::NaiveDate;
use rusqlite::Connection;
use thiserror::Error;
use uuid::Uuid;

use crate::config::Settings;
use crate::db::{self, DatabaseError};
use crate::reference::{ReferenceData, ReferenceError};

/// Caller-side input that cannot be processed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Name must not be empty")]
    EmptyName,

    #[error("Unknown assessment type: {0}")]
    UnknownAssessmentType(String),

    #[error("Birth date {birth_date} is in the future")]
    BirthDateInFuture { birth_date: NaiveDate },

    #[error("Date {date} is before the child's birth on {birth_date}")]
    BeforeBirth { date: NaiveDate, birth_date: NaiveDate },

    #[error("Date {0} is in the future")]
    DateInFuture(NaiveDate),

    #[error("Due date {due_date} is more than 42 weeks away")]
    DueDateTooFar { due_date: NaiveDate },

    #[error("Due date {due_date} is more than 42 weeks in the past")]
    DueDateTooOld { due_date: NaiveDate },

    #[error("Child already has a {0} dose")]
    DuplicateVaccine(String),

    #[error("Invalid {field}: {value}")]
    InvalidMeasurement { field: &'static str, value: f64 },

    #[error("Response {item} has negative value {value}")]
    NegativeResponse { item: String, value: i64 },

    #[error("Vaccination {0} was already administered")]
    AlreadyAdministered(Uuid),
}

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    Reference(#[from] ReferenceError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ServiceError {
    pub(crate) fn not_found(entity_type: &str, id: &Uuid) -> Self {
        Self::Database(DatabaseError::NotFound {
            entity_type: entity_type.into(),
            id: id.to_string(),
        })
    }
}

/// Optional measurement must be finite and non-negative when given.
pub(crate) fn check_measurement(field: &'static str, value: Option<f64>) -> Result<(), ValidationError> {
    match value {
        Some(v) if !v.is_finite() || v < 0.0 => Err(ValidationError::InvalidMeasurement { field, value: v }),
        _ => Ok(()),
    }
}

/// Open the database under the configured data directory and load reference
/// tables, creating the directory on first run.
pub fn open_store(settings: &Settings) -> Result<(Connection, ReferenceData), ServiceError> {
    fs::create_dir_all(&settings.data_dir)?;
    let conn = db::open_database(&settings.database_path())?;
    let reference = ReferenceData::load_or_bundled(settings.reference_dir.as_deref())?;

    tracing::info!(
        data_dir = %settings.data_dir.display(),
        custom_reference = settings.reference_dir.is_some(),
        "Store opened"
    );
    Ok((conn, reference))
}
