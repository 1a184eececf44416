use chrono::{NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{DosageForm, Frequency};

/// A medication parsed from prescription text or entered by hand.
///
/// Reminder times are derived from `frequency` on construction and on
/// deserialization; any serialized times are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "MedicationEntryFields")]
pub struct MedicationEntry {
    pub form: DosageForm,
    pub name: String,
    /// e.g. "500 mg"; empty when no strength was recognized.
    pub strength: String,
    pub frequency: Frequency,
    #[serde(serialize_with = "serialize_clock_times")]
    reminder_times: Vec<NaiveTime>,
}

/// Deserialized shape of [`MedicationEntry`], without the derived times.
#[derive(Deserialize)]
struct MedicationEntryFields {
    form: DosageForm,
    name: String,
    #[serde(default)]
    strength: String,
    frequency: Frequency,
}

impl From<MedicationEntryFields> for MedicationEntry {
    fn from(raw: MedicationEntryFields) -> Self {
        Self::new(raw.form, raw.name, raw.strength, raw.frequency)
    }
}

impl MedicationEntry {
    pub fn new(
        form: DosageForm,
        name: impl Into<String>,
        strength: impl Into<String>,
        frequency: Frequency,
    ) -> Self {
        Self {
            form,
            name: name.into().trim().to_string(),
            strength: strength.into().trim().to_string(),
            frequency,
            reminder_times: frequency.reminder_times(),
        }
    }

    pub fn reminder_times(&self) -> &[NaiveTime] {
        &self.reminder_times
    }

    /// Reminder times as "08:00,20:00", the storage representation.
    pub fn times_csv(&self) -> String {
        self.reminder_times
            .iter()
            .map(|t| t.format("%H:%M").to_string())
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// A medication row owned by a patient.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredMedication {
    pub id: Uuid,
    pub patient_id: Uuid,
    #[serde(flatten)]
    pub entry: MedicationEntry,
    pub created_at: NaiveDateTime,
}

impl StoredMedication {
    pub fn new(patient_id: Uuid, entry: MedicationEntry) -> Self {
        Self {
            id: Uuid::new_v4(),
            patient_id,
            entry,
            created_at: chrono::Local::now().naive_local(),
        }
    }
}

fn serialize_clock_times<S: serde::Serializer>(
    times: &[NaiveTime],
    s: S,
) -> Result<S::Ok, S::Error> {
    s.collect_seq(times.iter().map(|t| t.format("%H:%M").to_string()))
}
