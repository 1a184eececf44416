//! Daily reminder schedule derived from stored medications.
//!
//! Every medication contributes one dose per reminder time of its frequency
//! bucket. The schedule is the same every day.

use chrono::NaiveTime;
use serde::Serialize;
use uuid::Uuid;

use crate::models::StoredMedication;

/// One dose slot in the daily schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduledDose {
    pub medication_id: Uuid,
    pub name: String,
    pub strength: String,
    #[serde(serialize_with = "serialize_clock")]
    pub at: NaiveTime,
    /// Text shown to the patient when the slot comes due.
    pub message: String,
}

fn serialize_clock<S: serde::Serializer>(t: &NaiveTime, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&t.format("%H:%M").to_string())
}

/// All dose slots of the day, ordered by time, then medication name.
pub fn daily_schedule(meds: &[StoredMedication]) -> Vec<ScheduledDose> {
    let mut doses: Vec<ScheduledDose> = meds
        .iter()
        .flat_map(|med| {
            med.entry.reminder_times().iter().map(move |&at| ScheduledDose {
                medication_id: med.id,
                name: med.entry.name.clone(),
                strength: med.entry.strength.clone(),
                at,
                message: reminder_message(&med.entry.name, &med.entry.strength, at),
            })
        })
        .collect();
    doses.sort_by(|a, b| a.at.cmp(&b.at).then_with(|| a.name.cmp(&b.name)));
    doses
}

/// Remaining slots today: those at or after `now`.
pub fn upcoming_doses(meds: &[StoredMedication], now: NaiveTime) -> Vec<ScheduledDose> {
    daily_schedule(meds)
        .into_iter()
        .filter(|dose| dose.at >= now)
        .collect()
}

/// "Reminder: Take Metformin (500 mg) at 08:00". The strength is omitted when unknown.
pub fn reminder_message(name: &str, strength: &str, at: NaiveTime) -> String {
    let clock = at.format("%H:%M");
    if strength.is_empty() {
        format!("Reminder: Take {name} at {clock}")
    } else {
        format!("Reminder: Take {name} ({strength}) at {clock}")
    }
}
