//! Repository layer: entity-scoped database operations.
//!
//! Free functions over `&Connection`. Records are stored and returned as plain
//! values; nothing here calls into the calculation engine.

mod assessment;
mod child;
mod growth;
mod pregnancy;
mod vaccination;

use chrono::{NaiveDate, NaiveDateTime};
use uuid::Uuid;

use super::DatabaseError;

pub use assessment::*;
pub use child::*;
pub use growth::*;
pub use pregnancy::*;
pub use vaccination::*;

pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";
pub(crate) const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub(crate) fn date_to_sql(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub(crate) fn datetime_to_sql(at: NaiveDateTime) -> String {
    at.format(DATETIME_FORMAT).to_string()
}

pub(crate) fn parse_uuid(value: &str) -> Result<Uuid, DatabaseError> {
    Uuid::parse_str(value).map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))
}

pub(crate) fn parse_date(value: &str) -> Result<NaiveDate, DatabaseError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|e| DatabaseError::ConstraintViolation(format!("bad date {value:?}: {e}")))
}

pub(crate) fn parse_optional_date(value: Option<String>) -> Result<Option<NaiveDate>, DatabaseError> {
    value.as_deref().map(parse_date).transpose()
}

pub(crate) fn parse_datetime(value: &str) -> Result<NaiveDateTime, DatabaseError> {
    NaiveDateTime::parse_from_str(value, DATETIME_FORMAT)
        .map_err(|e| DatabaseError::ConstraintViolation(format!("bad timestamp {value:?}: {e}")))
}
