use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A patient profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    pub id: Uuid,
    pub name: String,
    pub age: Option<u32>,
    /// Free text as entered, e.g. "Type 2".
    pub diabetes_type: Option<String>,
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    pub contact: Option<String>,
    pub created_at: NaiveDateTime,
}

impl Patient {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into().trim().to_string(),
            age: None,
            diabetes_type: None,
            height_cm: None,
            weight_kg: None,
            contact: None,
            created_at: chrono::Local::now().naive_local(),
        }
    }
}

/// A family member who receives alerts for a patient.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FamilyContact {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub name: String,
    pub relation: String,
    /// Destination address for the notification sink (phone number).
    pub phone: String,
}

impl FamilyContact {
    pub fn new(
        patient_id: Uuid,
        name: impl Into<String>,
        relation: impl Into<String>,
        phone: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            patient_id,
            name: name.into(),
            relation: relation.into(),
            phone: phone.into().trim().to_string(),
        }
    }
}
