use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The reminder most recently fired in a session, awaiting a taken/missed answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FiredReminder {
    pub medication_id: Uuid,
    pub medication_name: String,
    pub strength: String,
    pub fired_at: NaiveDateTime,
}

/// Per-session state owned by the caller and passed into each operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionContext {
    pub patient_id: Option<Uuid>,
    pub patient_name: Option<String>,
    pub last_reminder: Option<FiredReminder>,
    pub last_alert_check: Option<NaiveDateTime>,
}

impl SessionContext {
    pub fn for_patient(patient_id: Uuid, patient_name: impl Into<String>) -> Self {
        Self {
            patient_id: Some(patient_id),
            patient_name: Some(patient_name.into()),
            ..Self::default()
        }
    }

    /// Display name used in family messages.
    pub fn display_name(&self) -> &str {
        self.patient_name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or("Patient")
    }

    /// True when no check has run yet or `interval` has elapsed since the last one.
    /// Marks `now` as the last check when returning true.
    pub fn take_alert_check(&mut self, now: NaiveDateTime, interval: Duration) -> bool {
        let due = match self.last_alert_check {
            Some(last) => now - last >= interval,
            None => true,
        };
        if due {
            self.last_alert_check = Some(now);
        }
        due
    }
}
