use crate::models::{AdherenceTally, VitalsSnapshot};

use super::detection::{
    detect_acute_risk, detect_blood_pressure, detect_blood_sugar, detect_hba1c,
    detect_missed_doses,
};
use super::types::{Alert, Classification, DEFAULT_MISSED_DOSE_THRESHOLD};

/// Rule-based classifier for vitals and medication adherence.
/// Stateless apart from the adherence threshold; every call is independent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertClassifier {
    missed_dose_threshold: u32,
}

impl Default for AlertClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_MISSED_DOSE_THRESHOLD)
    }
}

impl AlertClassifier {
    pub fn new(missed_dose_threshold: u32) -> Self {
        Self {
            missed_dose_threshold,
        }
    }

    pub fn missed_dose_threshold(&self) -> u32 {
        self.missed_dose_threshold
    }

    /// Run every vital rule, in fixed order: blood sugar, HbA1c, blood
    /// pressure, heart rate with SpO2. Absent vitals are skipped.
    pub fn classify_vitals(&self, vitals: &VitalsSnapshot) -> Vec<Alert> {
        [
            detect_blood_sugar(vitals),
            detect_hba1c(vitals),
            detect_blood_pressure(vitals),
            detect_acute_risk(vitals),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    pub fn classify_adherence(&self, missed: &AdherenceTally) -> Vec<Alert> {
        detect_missed_doses(missed, self.missed_dose_threshold)
    }

    /// Vital alerts first, then adherence warnings.
    pub fn classify(&self, vitals: &VitalsSnapshot, missed: &AdherenceTally) -> Classification {
        let mut alerts = self.classify_vitals(vitals);
        alerts.extend(self.classify_adherence(missed));

        let result = Classification::from_alerts(alerts);
        let counts = result.counts();
        tracing::debug!(
            vitals = vitals.len(),
            normal = counts.normal,
            warning = counts.warning,
            notify_family = result.notify_family,
            "Vitals and adherence classified"
        );
        result
    }
}

/// Classify a vitals snapshot and missed-dose tally in one pass.
pub fn classify_vitals_and_adherence(
    vitals: &VitalsSnapshot,
    missed: &AdherenceTally,
    threshold: u32,
) -> Classification {
    AlertClassifier::new(threshold).classify(vitals, missed)
}
