use serde::{Deserialize, Serialize};

use crate::models::Severity;

/// Missed doses per medication at which an adherence warning fires.
pub const DEFAULT_MISSED_DOSE_THRESHOLD: u32 = 3;

// ---------------------------------------------------------------------------
// AlertSource
// ---------------------------------------------------------------------------

/// Which vital rule or adherence condition produced an alert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AlertSource {
    BloodSugar,
    HbA1c,
    /// Systolic and diastolic evaluated together.
    BloodPressure,
    /// Heart rate and SpO2 evaluated together.
    HeartRateSpO2,
    Adherence { medication: String },
}

// ---------------------------------------------------------------------------
// Alert
// ---------------------------------------------------------------------------

/// A classification result. Computed on demand, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub severity: Severity,
    pub message: String,
    pub source: AlertSource,
}

impl Alert {
    pub fn normal(source: AlertSource, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Normal,
            message: message.into(),
            source,
        }
    }

    pub fn warning(source: AlertSource, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
            source,
        }
    }

    pub fn is_warning(&self) -> bool {
        self.severity == Severity::Warning
    }
}

impl std::fmt::Display for Alert {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// One evaluation batch: the ordered alerts plus the family-notification decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub alerts: Vec<Alert>,
    pub notify_family: bool,
}

impl Classification {
    /// Build from an alert batch. Family is notified iff any alert is a warning.
    pub fn from_alerts(alerts: Vec<Alert>) -> Self {
        let notify_family = alerts.iter().any(Alert::is_warning);
        Self {
            alerts,
            notify_family,
        }
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Alert> {
        self.alerts.iter().filter(|a| a.is_warning())
    }

    pub fn messages(&self) -> Vec<&str> {
        self.alerts.iter().map(|a| a.message.as_str()).collect()
    }

    /// Concatenated warning messages for the notification sink, or None
    /// when nothing warrants notifying the family.
    pub fn family_payload(&self) -> Option<String> {
        if !self.notify_family {
            return None;
        }
        let warnings: Vec<&str> = self.warnings().map(|a| a.message.as_str()).collect();
        Some(warnings.join(", "))
    }

    pub fn counts(&self) -> AlertCounts {
        let warnings = self.warnings().count();
        AlertCounts {
            normal: self.alerts.len() - warnings,
            warning: warnings,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertCounts {
    pub normal: usize,
    pub warning: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normal_alerts_never_notify() {
        let result = Classification::from_alerts(vec![
            Alert::normal(AlertSource::BloodSugar, "Blood sugar normal"),
            Alert::normal(AlertSource::HbA1c, "HbA1c controlled"),
        ]);
        assert!(!result.notify_family);
        assert_eq!(result.family_payload(), None);
    }

    #[test]
    fn payload_joins_only_warnings() {
        let result = Classification::from_alerts(vec![
            Alert::warning(AlertSource::BloodSugar, "Blood sugar HIGH"),
            Alert::normal(AlertSource::HbA1c, "HbA1c controlled"),
            Alert::warning(AlertSource::BloodPressure, "Hypertension"),
        ]);
        assert!(result.notify_family);
        assert_eq!(
            result.family_payload().as_deref(),
            Some("Blood sugar HIGH, Hypertension")
        );
        let counts = result.counts();
        assert_eq!(counts.warning, 2);
        assert_eq!(counts.normal, 1);
    }

    #[test]
    fn empty_batch_is_quiet() {
        let result = Classification::from_alerts(Vec::new());
        assert!(!result.notify_family);
        assert!(result.alerts.is_empty());
    }

    #[test]
    fn adherence_source_serializes_with_medication() {
        let source = AlertSource::Adherence {
            medication: "Metformin".into(),
        };
        let json = serde_json::to_value(&source).unwrap();
        assert_eq!(json["kind"], "adherence");
        assert_eq!(json["medication"], "Metformin");
    }
}
