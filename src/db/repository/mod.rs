//! Repository layer: entity-scoped database operations.
//!
//! Free functions over a borrowed `Connection`, one sub-module per table.

mod dose_log;
mod family;
mod medication;
mod patient;
mod vital_sign;

use chrono::NaiveDateTime;
use uuid::Uuid;

use super::DatabaseError;

pub use dose_log::*;
pub use family::*;
pub use medication::*;
pub use patient::*;
pub use vital_sign::*;

/// Storage format for every timestamp column.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub(crate) fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

pub(crate) fn parse_timestamp(field: &str, value: &str) -> Result<NaiveDateTime, DatabaseError> {
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT).map_err(|_| {
        DatabaseError::ConstraintViolation(format!("invalid timestamp in {field}: {value}"))
    })
}

pub(crate) fn parse_uuid(field: &str, value: &str) -> Result<Uuid, DatabaseError> {
    Uuid::parse_str(value)
        .map_err(|_| DatabaseError::ConstraintViolation(format!("invalid id in {field}: {value}")))
}

pub(crate) fn not_found(entity_type: &str, id: &Uuid) -> DatabaseError {
    DatabaseError::NotFound {
        entity_type: entity_type.into(),
        id: id.to_string(),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use rusqlite::Connection;

    use crate::db::sqlite::open_memory_database;
    use crate::models::Patient;

    use super::insert_patient;

    pub fn test_db() -> Connection {
        open_memory_database().unwrap()
    }

    pub fn make_patient(conn: &Connection, name: &str) -> Patient {
        let patient = Patient::new(name);
        insert_patient(conn, &patient).unwrap();
        patient
    }
}
