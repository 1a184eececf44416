use std::str::FromStr;

use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::{VitalKind, VitalReading, VitalsSnapshot};

use super::{format_timestamp, parse_timestamp, parse_uuid};

/// Insert a vital reading. Implausible values (negative, non-finite or
/// beyond the kind's range) are rejected before touching the database.
pub fn insert_vital_reading(conn: &Connection, reading: &VitalReading) -> Result<(), DatabaseError> {
    if !reading.kind.is_plausible(reading.value) {
        return Err(DatabaseError::ConstraintViolation(format!(
            "implausible {} value: {}",
            reading.kind, reading.value
        )));
    }
    conn.execute(
        "INSERT INTO vitals (id, patient_id, kind, value, recorded_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            reading.id.to_string(),
            reading.patient_id.to_string(),
            reading.kind.as_str(),
            reading.value,
            format_timestamp(&reading.recorded_at),
        ],
    )?;
    Ok(())
}

/// Insert several readings in one transaction.
pub fn insert_vital_readings(
    conn: &Connection,
    readings: &[VitalReading],
) -> Result<(), DatabaseError> {
    let tx = conn.unchecked_transaction()?;
    for reading in readings {
        insert_vital_reading(&tx, reading)?;
    }
    tx.commit()?;
    Ok(())
}

/// Readings for a patient, newest first. Readings sharing a timestamp are
/// ordered by insertion, latest insert first.
pub fn list_vital_readings(
    conn: &Connection,
    patient_id: &Uuid,
    kind: Option<VitalKind>,
) -> Result<Vec<VitalReading>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, patient_id, kind, value, recorded_at
         FROM vitals
         WHERE patient_id = ?1 AND (?2 IS NULL OR kind = ?2)
         ORDER BY recorded_at DESC, rowid DESC",
    )?;
    let rows = stmt.query_map(
        params![patient_id.to_string(), kind.map(|k| k.as_str())],
        |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, f64>(3)?,
                row.get::<_, String>(4)?,
            ))
        },
    )?;

    let mut readings = Vec::new();
    for row in rows {
        let (id, patient_id, kind, value, recorded_at) = row?;
        readings.push(VitalReading {
            id: parse_uuid("vitals.id", &id)?,
            patient_id: parse_uuid("vitals.patient_id", &patient_id)?,
            kind: VitalKind::from_str(&kind)?,
            value,
            recorded_at: parse_timestamp("vitals.recorded_at", &recorded_at)?,
        });
    }
    Ok(readings)
}

/// The most recent value per vital kind. Kinds never recorded are absent.
pub fn latest_vitals_snapshot(
    conn: &Connection,
    patient_id: &Uuid,
) -> Result<VitalsSnapshot, DatabaseError> {
    let readings = list_vital_readings(conn, patient_id, None)?;
    Ok(VitalsSnapshot::from_readings(&readings))
}
