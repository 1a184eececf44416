use std::str::FromStr;

use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::{DosageForm, Frequency, MedicationEntry, StoredMedication};

use super::{format_timestamp, not_found, parse_timestamp, parse_uuid};

const MEDICATION_COLUMNS: &str =
    "id, patient_id, form, name, strength, frequency, created_at";

pub fn insert_medication(conn: &Connection, med: &StoredMedication) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO medications (id, patient_id, form, name, strength, frequency, reminder_times, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            med.id.to_string(),
            med.patient_id.to_string(),
            med.entry.form.as_str(),
            med.entry.name,
            med.entry.strength,
            med.entry.frequency.as_str(),
            med.entry.times_csv(),
            format_timestamp(&med.created_at),
        ],
    )?;
    Ok(())
}

/// Store a batch of parsed entries for one patient, all or nothing.
pub fn insert_medications(
    conn: &Connection,
    patient_id: &Uuid,
    entries: &[MedicationEntry],
) -> Result<Vec<StoredMedication>, DatabaseError> {
    let tx = conn.unchecked_transaction()?;
    let mut stored = Vec::with_capacity(entries.len());
    for entry in entries {
        let med = StoredMedication::new(*patient_id, entry.clone());
        insert_medication(&tx, &med)?;
        stored.push(med);
    }
    tx.commit()?;
    tracing::info!(patient_id = %patient_id, count = stored.len(), "Medications stored");
    Ok(stored)
}

pub fn get_medication(
    conn: &Connection,
    id: &Uuid,
) -> Result<Option<StoredMedication>, DatabaseError> {
    let row = conn
        .query_row(
            &format!("SELECT {MEDICATION_COLUMNS} FROM medications WHERE id = ?1"),
            params![id.to_string()],
            medication_row,
        )
        .optional()?;
    row.map(medication_from_row).transpose()
}

/// A patient's medications, by name.
pub fn list_medications(
    conn: &Connection,
    patient_id: &Uuid,
) -> Result<Vec<StoredMedication>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {MEDICATION_COLUMNS} FROM medications
         WHERE patient_id = ?1
         ORDER BY name COLLATE NOCASE ASC, created_at ASC"
    ))?;
    let rows = stmt.query_map(params![patient_id.to_string()], medication_row)?;
    rows.map(|row| medication_from_row(row?)).collect()
}

/// Replace a medication's details. Reminder times follow the new frequency.
pub fn update_medication(
    conn: &Connection,
    id: &Uuid,
    entry: &MedicationEntry,
) -> Result<(), DatabaseError> {
    let affected = conn.execute(
        "UPDATE medications SET form = ?2, name = ?3, strength = ?4, frequency = ?5, reminder_times = ?6
         WHERE id = ?1",
        params![
            id.to_string(),
            entry.form.as_str(),
            entry.name,
            entry.strength,
            entry.frequency.as_str(),
            entry.times_csv(),
        ],
    )?;
    if affected == 0 {
        return Err(not_found("medication", id));
    }
    tracing::info!(medication_id = %id, "Medication updated");
    Ok(())
}

/// Delete a medication. Its dose history is kept.
pub fn delete_medication(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    let affected = conn.execute(
        "DELETE FROM medications WHERE id = ?1",
        params![id.to_string()],
    )?;
    if affected == 0 {
        return Err(not_found("medication", id));
    }
    Ok(())
}

struct MedicationRow {
    id: String,
    patient_id: String,
    form: String,
    name: String,
    strength: String,
    frequency: String,
    created_at: String,
}

fn medication_row(row: &rusqlite::Row) -> rusqlite::Result<MedicationRow> {
    Ok(MedicationRow {
        id: row.get(0)?,
        patient_id: row.get(1)?,
        form: row.get(2)?,
        name: row.get(3)?,
        strength: row.get(4)?,
        frequency: row.get(5)?,
        created_at: row.get(6)?,
    })
}

/// The reminder_times column mirrors the frequency for external readers;
/// loaded entries re-derive their times from the frequency.
fn medication_from_row(row: MedicationRow) -> Result<StoredMedication, DatabaseError> {
    let entry = MedicationEntry::new(
        DosageForm::from_str(&row.form)?,
        row.name,
        row.strength,
        Frequency::from_str(&row.frequency)?,
    );
    Ok(StoredMedication {
        id: parse_uuid("medications.id", &row.id)?,
        patient_id: parse_uuid("medications.patient_id", &row.patient_id)?,
        entry,
        created_at: parse_timestamp("medications.created_at", &row.created_at)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::test_support::{make_patient, test_db};
    use crate::pipeline::parse_prescription_text;

    fn metformin() -> MedicationEntry {
        MedicationEntry::new(DosageForm::Tablet, "Metformin", "500 mg", Frequency::TwiceDaily)
    }

    #[test]
    fn insert_and_get() {
        let conn = test_db();
        let patient = make_patient(&conn, "Asha");
        let med = StoredMedication::new(patient.id, metformin());
        insert_medication(&conn, &med).unwrap();

        let loaded = get_medication(&conn, &med.id).unwrap().unwrap();
        assert_eq!(loaded.entry, metformin());
        assert_eq!(loaded.patient_id, patient.id);

        let csv: String = conn
            .query_row(
                "SELECT reminder_times FROM medications WHERE id = ?1",
                params![med.id.to_string()],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(csv, "08:00,20:00");
    }

    #[test]
    fn parsed_prescription_is_stored_in_one_batch() {
        let conn = test_db();
        let patient = make_patient(&conn, "Asha");
        let entries = parse_prescription_text(
            "Tab. Telmisartan 40 mg once daily\nTab. Metformin 500 mg twice daily",
        );
        let stored = insert_medications(&conn, &patient.id, &entries).unwrap();
        assert_eq!(stored.len(), 2);

        let names: Vec<String> = list_medications(&conn, &patient.id)
            .unwrap()
            .into_iter()
            .map(|m| m.entry.name)
            .collect();
        assert_eq!(names, vec!["Metformin", "Telmisartan"]);
    }

    #[test]
    fn batch_is_rolled_back_on_failure() {
        let conn = test_db();
        let ghost = Uuid::new_v4();
        assert!(insert_medications(&conn, &ghost, &[metformin()]).is_err());
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM medications", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn update_rederives_reminder_times() {
        let conn = test_db();
        let patient = make_patient(&conn, "Asha");
        let med = StoredMedication::new(patient.id, metformin());
        insert_medication(&conn, &med).unwrap();

        let changed =
            MedicationEntry::new(DosageForm::Tablet, "Metformin", "1000 mg", Frequency::ThriceDaily);
        update_medication(&conn, &med.id, &changed).unwrap();

        let loaded = get_medication(&conn, &med.id).unwrap().unwrap();
        assert_eq!(loaded.entry.strength, "1000 mg");
        assert_eq!(loaded.entry.times_csv(), "08:00,14:00,20:00");
    }

    #[test]
    fn update_and_delete_unknown_fail() {
        let conn = test_db();
        let id = Uuid::new_v4();
        assert!(matches!(
            update_medication(&conn, &id, &metformin()),
            Err(DatabaseError::NotFound { .. })
        ));
        assert!(matches!(
            delete_medication(&conn, &id),
            Err(DatabaseError::NotFound { .. })
        ));
    }

    #[test]
    fn unknown_stored_form_is_an_error() {
        let conn = test_db();
        let patient = make_patient(&conn, "Asha");
        let med = StoredMedication::new(patient.id, metformin());
        insert_medication(&conn, &med).unwrap();
        conn.execute_batch("PRAGMA ignore_check_constraints = ON;").unwrap();
        conn.execute(
            "UPDATE medications SET form = 'patch' WHERE id = ?1",
            params![med.id.to_string()],
        )
        .unwrap();
        assert!(matches!(
            get_medication(&conn, &med.id),
            Err(DatabaseError::InvalidEnum { .. })
        ));
    }
}
