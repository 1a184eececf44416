use std::str::FromStr;

use chrono::NaiveDateTime;
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::{AdherenceTally, DoseLog, DoseLogView, DoseStatus};

use super::{format_timestamp, parse_timestamp};

pub fn insert_dose_log(conn: &Connection, log: &DoseLog) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO dose_logs (id, patient_id, medication_id, status, note, logged_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            log.id.to_string(),
            log.patient_id.to_string(),
            log.medication_id.to_string(),
            log.status.as_str(),
            log.note,
            format_timestamp(&log.logged_at),
        ],
    )?;
    tracing::debug!(
        patient_id = %log.patient_id,
        medication_id = %log.medication_id,
        status = log.status.as_str(),
        "Dose logged"
    );
    Ok(())
}

/// Most recent dose events for a patient, newest first. The medication
/// name is None when the medication has since been deleted.
pub fn list_recent_dose_logs(
    conn: &Connection,
    patient_id: &Uuid,
    limit: u32,
) -> Result<Vec<DoseLogView>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT l.logged_at, m.name, l.status, l.note
         FROM dose_logs l
         LEFT JOIN medications m ON m.id = l.medication_id
         WHERE l.patient_id = ?1
         ORDER BY l.logged_at DESC, l.rowid DESC
         LIMIT ?2",
    )?;
    let rows = stmt.query_map(params![patient_id.to_string(), limit], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, Option<String>>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, Option<String>>(3)?,
        ))
    })?;

    let mut logs = Vec::new();
    for row in rows {
        let (logged_at, medication_name, status, note) = row?;
        logs.push(DoseLogView {
            logged_at: parse_timestamp("dose_logs.logged_at", &logged_at)?,
            medication_name,
            status: DoseStatus::from_str(&status)?,
            note,
        });
    }
    Ok(logs)
}

/// Missed doses per medication name, optionally counting only events at or
/// after `since`. Medications without misses are absent from the tally.
pub fn missed_dose_tally(
    conn: &Connection,
    patient_id: &Uuid,
    since: Option<&NaiveDateTime>,
) -> Result<AdherenceTally, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT m.name, COUNT(*)
         FROM dose_logs l
         JOIN medications m ON m.id = l.medication_id
         WHERE l.patient_id = ?1
           AND l.status = 'missed'
           AND (?2 IS NULL OR l.logged_at >= ?2)
         GROUP BY m.name",
    )?;
    let rows = stmt.query_map(
        params![patient_id.to_string(), since.map(format_timestamp)],
        |row| Ok((row.get::<_, String>(0)?, row.get::<_, u32>(1)?)),
    )?;
    rows.collect::<Result<AdherenceTally, _>>()
        .map_err(DatabaseError::from)
}

/// Total missed doses recorded against one medication.
pub fn missed_count_for_medication(
    conn: &Connection,
    medication_id: &Uuid,
) -> Result<u32, DatabaseError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM dose_logs WHERE medication_id = ?1 AND status = 'missed'",
        params![medication_id.to_string()],
        |row| row.get::<_, u32>(0),
    )?;
    Ok(count)
}
