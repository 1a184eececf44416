use crate::models::{AdherenceTally, VitalKind, VitalsSnapshot};

use super::messages::MessageTemplates;
use super::types::{Alert, AlertSource};

const BLOOD_SUGAR_HIGH_ABOVE: f64 = 130.0;
const BLOOD_SUGAR_LOW_BELOW: f64 = 80.0;

const HBA1C_PREDIABETES_FROM: f64 = 5.7;
const HBA1C_POOR_CONTROL_FROM: f64 = 6.4;

const SYSTOLIC_HIGH_ABOVE: f64 = 140.0;
const DIASTOLIC_HIGH_ABOVE: f64 = 90.0;
const SYSTOLIC_LOW_BELOW: f64 = 90.0;
const DIASTOLIC_LOW_BELOW: f64 = 60.0;

const HEART_RATE_HIGH_ABOVE: f64 = 120.0;
const SPO2_LOW_BELOW: f64 = 90.0;

/// A present, finite value. Anything else is treated as not supplied.
fn reading(vitals: &VitalsSnapshot, kind: VitalKind) -> Option<f64> {
    vitals.get(kind).filter(|v| v.is_finite())
}

/// Both values of a two-vital rule, each present and finite.
fn paired(vitals: &VitalsSnapshot, a: VitalKind, b: VitalKind) -> Option<(f64, f64)> {
    vitals
        .pair(a, b)
        .filter(|(x, y)| x.is_finite() && y.is_finite())
}

// ---------------------------------------------------------------------------
// Single-vital rules: one value suffices
// ---------------------------------------------------------------------------

/// Random blood sugar (mg/dL): > 130 high, < 80 low, otherwise normal.
pub fn detect_blood_sugar(vitals: &VitalsSnapshot) -> Option<Alert> {
    let rbs = reading(vitals, VitalKind::RandomBloodSugar)?;
    let alert = if rbs > BLOOD_SUGAR_HIGH_ABOVE {
        Alert::warning(AlertSource::BloodSugar, MessageTemplates::BLOOD_SUGAR_HIGH)
    } else if rbs < BLOOD_SUGAR_LOW_BELOW {
        Alert::warning(AlertSource::BloodSugar, MessageTemplates::BLOOD_SUGAR_LOW)
    } else {
        Alert::normal(AlertSource::BloodSugar, MessageTemplates::BLOOD_SUGAR_NORMAL)
    };
    Some(alert)
}

/// HbA1c (%): < 5.7 controlled, [5.7, 6.4) prediabetes, >= 6.4 poor control.
pub fn detect_hba1c(vitals: &VitalsSnapshot) -> Option<Alert> {
    let hba1c = reading(vitals, VitalKind::HbA1c)?;
    let alert = if hba1c < HBA1C_PREDIABETES_FROM {
        Alert::normal(AlertSource::HbA1c, MessageTemplates::HBA1C_CONTROLLED)
    } else if hba1c < HBA1C_POOR_CONTROL_FROM {
        Alert::warning(AlertSource::HbA1c, MessageTemplates::HBA1C_PREDIABETES)
    } else {
        Alert::warning(AlertSource::HbA1c, MessageTemplates::HBA1C_POOR_CONTROL)
    };
    Some(alert)
}

// ---------------------------------------------------------------------------
// Paired rules: both values must be present, a lone value yields nothing
// ---------------------------------------------------------------------------

/// Blood pressure (mmHg). High is checked before low.
pub fn detect_blood_pressure(vitals: &VitalsSnapshot) -> Option<Alert> {
    let (sys, dia) = paired(vitals, VitalKind::SystolicBP, VitalKind::DiastolicBP)?;
    let alert = if sys > SYSTOLIC_HIGH_ABOVE || dia > DIASTOLIC_HIGH_ABOVE {
        Alert::warning(AlertSource::BloodPressure, MessageTemplates::BP_HYPERTENSION)
    } else if sys < SYSTOLIC_LOW_BELOW || dia < DIASTOLIC_LOW_BELOW {
        Alert::warning(AlertSource::BloodPressure, MessageTemplates::BP_LOW)
    } else {
        Alert::normal(AlertSource::BloodPressure, MessageTemplates::BP_NORMAL)
    };
    Some(alert)
}

/// Heart rate (bpm) with SpO2 (%).
pub fn detect_acute_risk(vitals: &VitalsSnapshot) -> Option<Alert> {
    let (hr, spo2) = paired(vitals, VitalKind::HeartRate, VitalKind::SpO2)?;
    let alert = if hr > HEART_RATE_HIGH_ABOVE || spo2 < SPO2_LOW_BELOW {
        Alert::warning(AlertSource::HeartRateSpO2, MessageTemplates::ACUTE_RISK)
    } else {
        Alert::normal(AlertSource::HeartRateSpO2, MessageTemplates::HR_SPO2_OK)
    };
    Some(alert)
}

// ---------------------------------------------------------------------------
// Adherence
// ---------------------------------------------------------------------------

/// One warning per medication whose missed count reached `threshold`, in name order.
pub fn detect_missed_doses(tally: &AdherenceTally, threshold: u32) -> Vec<Alert> {
    tally
        .iter()
        .filter(|(_, missed)| *missed >= threshold)
        .map(|(medication, missed)| {
            Alert::warning(
                AlertSource::Adherence {
                    medication: medication.to_string(),
                },
                MessageTemplates::missed_doses(medication, missed),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Severity;

    fn sugar(v: f64) -> VitalsSnapshot {
        VitalsSnapshot::new().with(VitalKind::RandomBloodSugar, v)
    }

    fn hba1c(v: f64) -> VitalsSnapshot {
        VitalsSnapshot::new().with(VitalKind::HbA1c, v)
    }

    fn bp(sys: f64, dia: f64) -> VitalsSnapshot {
        VitalsSnapshot::new()
            .with(VitalKind::SystolicBP, sys)
            .with(VitalKind::DiastolicBP, dia)
    }

    fn hr_spo2(hr: f64, spo2: f64) -> VitalsSnapshot {
        VitalsSnapshot::new()
            .with(VitalKind::HeartRate, hr)
            .with(VitalKind::SpO2, spo2)
    }

    fn message(alert: Option<Alert>) -> String {
        alert.map(|a| a.message).unwrap_or_default()
    }

    #[test]
    fn blood_sugar_boundaries() {
        assert_eq!(message(detect_blood_sugar(&sugar(130.1))), "Blood sugar HIGH");
        assert_eq!(message(detect_blood_sugar(&sugar(130.0))), "Blood sugar normal");
        assert_eq!(message(detect_blood_sugar(&sugar(80.0))), "Blood sugar normal");
        assert_eq!(message(detect_blood_sugar(&sugar(79.9))), "Blood sugar LOW");
    }

    #[test]
    fn blood_sugar_severity() {
        assert_eq!(
            detect_blood_sugar(&sugar(145.0)).unwrap().severity,
            Severity::Warning
        );
        assert_eq!(
            detect_blood_sugar(&sugar(100.0)).unwrap().severity,
            Severity::Normal
        );
    }

    #[test]
    fn hba1c_boundaries() {
        assert_eq!(message(detect_hba1c(&hba1c(5.69))), "HbA1c controlled");
        assert_eq!(message(detect_hba1c(&hba1c(5.7))), "Prediabetes range");
        assert_eq!(message(detect_hba1c(&hba1c(6.39))), "Prediabetes range");
        assert_eq!(message(detect_hba1c(&hba1c(6.4))), "Poor long-term control");
    }

    #[test]
    fn blood_pressure_rules() {
        assert_eq!(message(detect_blood_pressure(&bp(150.0, 80.0))), "Hypertension");
        assert_eq!(message(detect_blood_pressure(&bp(120.0, 95.0))), "Hypertension");
        assert_eq!(message(detect_blood_pressure(&bp(85.0, 70.0))), "Low BP");
        assert_eq!(message(detect_blood_pressure(&bp(110.0, 55.0))), "Low BP");
        assert_eq!(message(detect_blood_pressure(&bp(140.0, 90.0))), "BP normal");
        assert_eq!(message(detect_blood_pressure(&bp(90.0, 60.0))), "BP normal");
    }

    #[test]
    fn hypertension_takes_precedence_over_low() {
        // High systolic with low diastolic still reads as hypertension.
        assert_eq!(message(detect_blood_pressure(&bp(160.0, 50.0))), "Hypertension");
    }

    #[test]
    fn blood_pressure_requires_both_values() {
        let only_sys = VitalsSnapshot::new().with(VitalKind::SystolicBP, 200.0);
        assert!(detect_blood_pressure(&only_sys).is_none());
        let only_dia = VitalsSnapshot::new().with(VitalKind::DiastolicBP, 40.0);
        assert!(detect_blood_pressure(&only_dia).is_none());
    }

    #[test]
    fn acute_risk_rules() {
        assert_eq!(
            message(detect_acute_risk(&hr_spo2(121.0, 98.0))),
            "Acute risk: HR>120 or SpO2<90"
        );
        assert_eq!(
            message(detect_acute_risk(&hr_spo2(80.0, 89.0))),
            "Acute risk: HR>120 or SpO2<90"
        );
        assert_eq!(message(detect_acute_risk(&hr_spo2(120.0, 90.0))), "HR/SpO2 ok");
    }

    #[test]
    fn acute_risk_requires_both_values() {
        let only_hr = VitalsSnapshot::new().with(VitalKind::HeartRate, 160.0);
        assert!(detect_acute_risk(&only_hr).is_none());
    }

    #[test]
    fn non_finite_values_are_treated_as_absent() {
        assert!(detect_blood_sugar(&sugar(f64::NAN)).is_none());
        assert!(detect_blood_pressure(&bp(f64::INFINITY, 80.0)).is_none());
    }

    #[test]
    fn missed_dose_threshold_boundary() {
        let tally = AdherenceTally::new().with("Metformin", 2);
        assert!(detect_missed_doses(&tally, 3).is_empty());

        let tally = AdherenceTally::new().with("Metformin", 3);
        let alerts = detect_missed_doses(&tally, 3);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].message, "Metformin missed 3 times");
        assert_eq!(alerts[0].severity, Severity::Warning);
    }

    #[test]
    fn missed_doses_ordered_by_name() {
        let tally = AdherenceTally::new()
            .with("Telmisartan", 5)
            .with("Glimepiride", 4)
            .with("Metformin", 1);
        let alerts = detect_missed_doses(&tally, 3);
        let messages: Vec<&str> = alerts.iter().map(|a| a.message.as_str()).collect();
        assert_eq!(
            messages,
            vec!["Glimepiride missed 4 times", "Telmisartan missed 5 times"]
        );
    }

    #[test]
    fn threshold_is_configurable() {
        let tally = AdherenceTally::new().with("Metformin", 1);
        assert_eq!(detect_missed_doses(&tally, 1).len(), 1);
        assert!(detect_missed_doses(&tally, 5).is_empty());
    }
}
