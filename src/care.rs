//! Care service: orchestration around the pure parser and classifier.
//!
//! Owns one SQLite connection, the runtime config and a notification sink.
//! Every operation is synchronous and scoped to one patient id. Session state
//! (last fired reminder, last alert check) is passed in by the caller.

use std::sync::Arc;

use chrono::{Duration, NaiveDateTime};
use rusqlite::Connection;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::config::CareConfig;
use crate::db::{self, DatabaseError};
use crate::intelligence::{bmi_status, AlertClassifier, Classification, MessageTemplates};
use crate::models::{
    DoseLog, DoseStatus, FiredReminder, Patient, SessionContext, StoredMedication, VitalKind,
    VitalReading, VitalsSnapshot,
};
use crate::notify::{dispatch, DeliveryReport, LogSink, NotificationSink, NotifyError, TwilioWhatsAppSink};
use crate::pipeline::{correct_ocr_terms, parse_prescription_text};
use crate::reminders::{daily_schedule, ScheduledDose};

/// Minimum spacing between automatic alert checks in one session.
pub const ALERT_CHECK_INTERVAL_SECS: i64 = 20;

#[derive(Error, Debug)]
pub enum CareError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Implausible {kind} reading: {value}")]
    InvalidVital { kind: VitalKind, value: f64 },

    #[error("Notification setup failed: {0}")]
    Notify(#[from] NotifyError),

    #[error("No reminder is awaiting an answer")]
    NoPendingReminder,
}

/// Result of an alert check for one patient.
#[derive(Debug, Clone, Serialize)]
pub struct AlertOutcome {
    pub classification: Classification,
    /// Message sent to the family, when notification was warranted.
    pub message: Option<String>,
    /// Per-destination delivery, when notification was warranted.
    pub delivery: Option<DeliveryReport>,
}

impl AlertOutcome {
    pub fn notified(&self) -> bool {
        self.delivery.is_some()
    }
}

/// A patient's current state: profile, BMI band, latest vitals, alerts and
/// the daily reminder schedule.
#[derive(Debug, Clone, Serialize)]
pub struct PatientOverview {
    pub patient: Patient,
    /// e.g. "Normal (BMI 22.8)"; None without height and weight.
    pub bmi: Option<String>,
    pub vitals: VitalsSnapshot,
    pub classification: Classification,
    pub schedule: Vec<ScheduledDose>,
}

/// Result of answering a fired reminder.
#[derive(Debug, Clone, Serialize)]
pub struct ReminderAnswer {
    pub medication_name: String,
    pub status: DoseStatus,
    /// Total missed doses for the medication, when the answer was "missed".
    pub missed_count: Option<u32>,
    /// Check-in alert sent to the family when the missed count reached the threshold.
    pub family_alert: Option<DeliveryReport>,
}

pub struct CareService {
    conn: Connection,
    config: CareConfig,
    classifier: AlertClassifier,
    sink: Arc<dyn NotificationSink>,
}

impl CareService {
    pub fn new(conn: Connection, config: CareConfig, sink: Arc<dyn NotificationSink>) -> Self {
        let classifier = AlertClassifier::new(config.missed_dose_threshold);
        Self {
            conn,
            config,
            classifier,
            sink,
        }
    }

    /// Twilio WhatsApp when configured, otherwise notifications are only logged.
    pub fn with_configured_sink(conn: Connection, config: CareConfig) -> Result<Self, CareError> {
        let sink: Arc<dyn NotificationSink> = match &config.twilio {
            Some(twilio) => Arc::new(TwilioWhatsAppSink::new(twilio.clone())?),
            None => {
                tracing::info!("No messaging provider configured, family alerts will be logged");
                Arc::new(LogSink)
            }
        };
        Ok(Self::new(conn, config, sink))
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn config(&self) -> &CareConfig {
        &self.config
    }

    // -----------------------------------------------------------------------
    // Medications and vitals
    // -----------------------------------------------------------------------

    /// Parse prescription text and store every recognized medication for the patient.
    /// Optionally repairs OCR misspellings of drug names first.
    pub fn import_prescription(
        &self,
        patient_id: &Uuid,
        text: &str,
        correct_ocr: bool,
    ) -> Result<Vec<StoredMedication>, CareError> {
        let entries = if correct_ocr {
            parse_prescription_text(&correct_ocr_terms(text))
        } else {
            parse_prescription_text(text)
        };
        if entries.is_empty() {
            tracing::info!(patient_id = %patient_id, "No medications recognized in prescription text");
            return Ok(Vec::new());
        }
        Ok(db::insert_medications(&self.conn, patient_id, &entries)?)
    }

    /// Store every value in `vitals` as a reading at `recorded_at`.
    /// Nothing is stored if any value is implausible.
    pub fn record_vitals(
        &self,
        patient_id: &Uuid,
        vitals: &VitalsSnapshot,
        recorded_at: NaiveDateTime,
    ) -> Result<Vec<VitalReading>, CareError> {
        if let Some((kind, value)) = vitals.iter().find(|(k, v)| !k.is_plausible(*v)) {
            return Err(CareError::InvalidVital { kind, value });
        }
        let readings: Vec<VitalReading> = vitals
            .iter()
            .map(|(kind, value)| VitalReading::new(*patient_id, kind, value, recorded_at))
            .collect();
        db::insert_vital_readings(&self.conn, &readings)?;
        tracing::info!(patient_id = %patient_id, count = readings.len(), "Vitals recorded");
        Ok(readings)
    }

    /// Record a dose event. Returns the medication's total missed count when
    /// the status is `Missed`.
    pub fn log_dose(
        &self,
        medication_id: &Uuid,
        status: DoseStatus,
        note: Option<String>,
        at: NaiveDateTime,
    ) -> Result<Option<u32>, CareError> {
        let med = self.medication(medication_id)?;
        db::insert_dose_log(
            &self.conn,
            &DoseLog::new(med.patient_id, med.id, status, note, at),
        )?;
        match status {
            DoseStatus::Missed => Ok(Some(db::missed_count_for_medication(
                &self.conn,
                medication_id,
            )?)),
            DoseStatus::Reminder | DoseStatus::Taken => Ok(None),
        }
    }

    fn medication(&self, id: &Uuid) -> Result<StoredMedication, CareError> {
        db::get_medication(&self.conn, id)?.ok_or_else(|| {
            CareError::Database(DatabaseError::NotFound {
                entity_type: "medication".into(),
                id: id.to_string(),
            })
        })
    }

    fn patient(&self, patient_id: &Uuid) -> Result<Patient, CareError> {
        db::get_patient(&self.conn, patient_id)?.ok_or_else(|| {
            CareError::Database(DatabaseError::NotFound {
                entity_type: "patient".into(),
                id: patient_id.to_string(),
            })
        })
    }

    pub fn overview(&self, patient_id: &Uuid) -> Result<PatientOverview, CareError> {
        let patient = self.patient(patient_id)?;
        let vitals = db::latest_vitals_snapshot(&self.conn, patient_id)?;
        let missed = db::missed_dose_tally(&self.conn, patient_id, None)?;
        let classification = self.classifier.classify(&vitals, &missed);
        let meds = db::list_medications(&self.conn, patient_id)?;
        Ok(PatientOverview {
            bmi: bmi_status(patient.height_cm, patient.weight_kg),
            patient,
            vitals,
            classification,
            schedule: daily_schedule(&meds),
        })
    }

    // -----------------------------------------------------------------------
    // Alerts
    // -----------------------------------------------------------------------

    /// Classify the patient's latest vitals and full missed-dose history.
    pub fn evaluate(&self, patient_id: &Uuid) -> Result<Classification, CareError> {
        let vitals = db::latest_vitals_snapshot(&self.conn, patient_id)?;
        let missed = db::missed_dose_tally(&self.conn, patient_id, None)?;
        Ok(self.classifier.classify(&vitals, &missed))
    }

    /// Evaluate and, when any warning is present, send the warnings to every
    /// family phone on file.
    pub fn alert_family(&self, patient_id: &Uuid) -> Result<AlertOutcome, CareError> {
        let classification = self.evaluate(patient_id)?;
        let Some(payload) = classification.family_payload() else {
            return Ok(AlertOutcome {
                classification,
                message: None,
                delivery: None,
            });
        };

        let patient = self.patient(patient_id)?;
        let message = MessageTemplates::family_alert(&patient.name, &payload);
        let phones = db::family_phones(&self.conn, patient_id)?;
        let delivery = dispatch(self.sink.as_ref(), &phones, &message);
        if delivery.attempted() == 0 {
            tracing::warn!(patient_id = %patient_id, "Alert warranted but no family contacts on file");
        }

        Ok(AlertOutcome {
            classification,
            message: Some(message),
            delivery: Some(delivery),
        })
    }

    /// Run `alert_family` for the session's patient at most once per
    /// `ALERT_CHECK_INTERVAL_SECS`. None when throttled or no patient is active.
    pub fn periodic_alert_check(
        &self,
        session: &mut SessionContext,
        now: NaiveDateTime,
    ) -> Result<Option<AlertOutcome>, CareError> {
        let Some(patient_id) = session.patient_id else {
            return Ok(None);
        };
        if !session.take_alert_check(now, Duration::seconds(ALERT_CHECK_INTERVAL_SECS)) {
            return Ok(None);
        }
        self.alert_family(&patient_id).map(Some)
    }

    // -----------------------------------------------------------------------
    // Reminders
    // -----------------------------------------------------------------------

    /// Log a reminder for the medication and remember it in the session as
    /// awaiting an answer. Returns the prompt shown to the patient.
    pub fn fire_reminder(
        &self,
        session: &mut SessionContext,
        medication_id: &Uuid,
        at: NaiveDateTime,
    ) -> Result<String, CareError> {
        let med = self.medication(medication_id)?;
        let prompt = if med.entry.strength.is_empty() {
            format!("Please take {} now", med.entry.name)
        } else {
            format!("Please take {} {} now", med.entry.name, med.entry.strength)
        };
        db::insert_dose_log(
            &self.conn,
            &DoseLog::new(med.patient_id, med.id, DoseStatus::Reminder, Some(prompt.clone()), at),
        )?;
        session.last_reminder = Some(FiredReminder {
            medication_id: med.id,
            medication_name: med.entry.name,
            strength: med.entry.strength,
            fired_at: at,
        });
        Ok(prompt)
    }

    /// Answer the pending reminder. A missed dose that brings the medication
    /// to the threshold sends a check-in alert to the family.
    pub fn respond_to_reminder(
        &self,
        session: &mut SessionContext,
        taken: bool,
        at: NaiveDateTime,
    ) -> Result<ReminderAnswer, CareError> {
        let reminder = session
            .last_reminder
            .clone()
            .ok_or(CareError::NoPendingReminder)?;
        let status = if taken {
            DoseStatus::Taken
        } else {
            DoseStatus::Missed
        };
        let missed_count = self.log_dose(&reminder.medication_id, status, None, at)?;
        session.last_reminder = None;

        let threshold = self.config.missed_dose_threshold;
        let family_alert = match missed_count {
            Some(count) if count >= threshold => {
                let med = self.medication(&reminder.medication_id)?;
                let message = MessageTemplates::missed_dose_check_in(
                    session.display_name(),
                    &reminder.medication_name,
                    threshold,
                );
                let phones = db::family_phones(&self.conn, &med.patient_id)?;
                Some(dispatch(self.sink.as_ref(), &phones, &message))
            }
            _ => None,
        };

        Ok(ReminderAnswer {
            medication_name: reminder.medication_name,
            status,
            missed_count,
            family_alert,
        })
    }
}
