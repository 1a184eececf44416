use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::Patient;

use super::{format_timestamp, not_found, parse_timestamp, parse_uuid};

const PATIENT_COLUMNS: &str =
    "id, name, age, diabetes_type, height_cm, weight_kg, contact, created_at";

pub fn insert_patient(conn: &Connection, patient: &Patient) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO patients (id, name, age, diabetes_type, height_cm, weight_kg, contact, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            patient.id.to_string(),
            patient.name,
            patient.age,
            patient.diabetes_type,
            patient.height_cm,
            patient.weight_kg,
            patient.contact,
            format_timestamp(&patient.created_at),
        ],
    )?;
    tracing::info!(patient_id = %patient.id, "Patient created");
    Ok(())
}

pub fn get_patient(conn: &Connection, id: &Uuid) -> Result<Option<Patient>, DatabaseError> {
    let row = conn
        .query_row(
            &format!("SELECT {PATIENT_COLUMNS} FROM patients WHERE id = ?1"),
            params![id.to_string()],
            patient_row,
        )
        .optional()?;
    row.map(patient_from_row).transpose()
}

/// All patients, oldest first.
pub fn list_patients(conn: &Connection) -> Result<Vec<Patient>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PATIENT_COLUMNS} FROM patients ORDER BY created_at ASC, name ASC"
    ))?;
    let rows = stmt.query_map([], patient_row)?;
    rows.map(|row| patient_from_row(row?)).collect()
}

/// Replace the editable profile fields.
pub fn update_patient(conn: &Connection, patient: &Patient) -> Result<(), DatabaseError> {
    let affected = conn.execute(
        "UPDATE patients SET name = ?2, age = ?3, diabetes_type = ?4, height_cm = ?5,
         weight_kg = ?6, contact = ?7
         WHERE id = ?1",
        params![
            patient.id.to_string(),
            patient.name,
            patient.age,
            patient.diabetes_type,
            patient.height_cm,
            patient.weight_kg,
            patient.contact,
        ],
    )?;
    if affected == 0 {
        return Err(not_found("patient", &patient.id));
    }
    Ok(())
}

/// Delete a patient and, by cascade, their contacts, medications, logs and vitals.
pub fn delete_patient(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    let affected = conn.execute("DELETE FROM patients WHERE id = ?1", params![id.to_string()])?;
    if affected == 0 {
        return Err(not_found("patient", id));
    }
    tracing::info!(patient_id = %id, "Patient deleted");
    Ok(())
}

struct PatientRow {
    id: String,
    name: String,
    age: Option<u32>,
    diabetes_type: Option<String>,
    height_cm: Option<f64>,
    weight_kg: Option<f64>,
    contact: Option<String>,
    created_at: String,
}

fn patient_row(row: &rusqlite::Row) -> rusqlite::Result<PatientRow> {
    Ok(PatientRow {
        id: row.get(0)?,
        name: row.get(1)?,
        age: row.get(2)?,
        diabetes_type: row.get(3)?,
        height_cm: row.get(4)?,
        weight_kg: row.get(5)?,
        contact: row.get(6)?,
        created_at: row.get(7)?,
    })
}

fn patient_from_row(row: PatientRow) -> Result<Patient, DatabaseError> {
    Ok(Patient {
        id: parse_uuid("patients.id", &row.id)?,
        name: row.name,
        age: row.age,
        diabetes_type: row.diabetes_type,
        height_cm: row.height_cm,
        weight_kg: row.weight_kg,
        contact: row.contact,
        created_at: parse_timestamp("patients.created_at", &row.created_at)?,
    })
}
