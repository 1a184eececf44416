use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::FamilyContact;

use super::{not_found, parse_uuid};

pub fn insert_family_contact(
    conn: &Connection,
    contact: &FamilyContact,
) -> Result<(), DatabaseError> {
    if contact.phone.is_empty() {
        return Err(DatabaseError::ConstraintViolation(
            "family contact requires a phone number".into(),
        ));
    }
    conn.execute(
        "INSERT INTO family_contacts (id, patient_id, name, relation, phone)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            contact.id.to_string(),
            contact.patient_id.to_string(),
            contact.name,
            contact.relation,
            contact.phone,
        ],
    )?;
    tracing::info!(patient_id = %contact.patient_id, "Family contact added");
    Ok(())
}

/// Contacts for a patient, in the order they were added.
pub fn list_family_contacts(
    conn: &Connection,
    patient_id: &Uuid,
) -> Result<Vec<FamilyContact>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, patient_id, name, relation, phone
         FROM family_contacts
         WHERE patient_id = ?1
         ORDER BY rowid ASC",
    )?;
    let rows = stmt.query_map(params![patient_id.to_string()], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, String>(4)?,
        ))
    })?;

    let mut contacts = Vec::new();
    for row in rows {
        let (id, patient_id, name, relation, phone) = row?;
        contacts.push(FamilyContact {
            id: parse_uuid("family_contacts.id", &id)?,
            patient_id: parse_uuid("family_contacts.patient_id", &patient_id)?,
            name,
            relation,
            phone,
        });
    }
    Ok(contacts)
}

/// Notification destinations for a patient's family.
pub fn family_phones(conn: &Connection, patient_id: &Uuid) -> Result<Vec<String>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT phone FROM family_contacts
         WHERE patient_id = ?1 AND phone <> ''
         ORDER BY rowid ASC",
    )?;
    let rows = stmt.query_map(params![patient_id.to_string()], |row| row.get(0))?;
    rows.collect::<Result<Vec<String>, _>>()
        .map_err(DatabaseError::from)
}

pub fn delete_family_contact(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    let affected = conn.execute(
        "DELETE FROM family_contacts WHERE id = ?1",
        params![id.to_string()],
    )?;
    if affected == 0 {
        return Err(not_found("family_contact", id));
    }
    Ok(())
}
