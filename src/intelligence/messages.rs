/// Message templates for alerts and family notifications.
/// Alert texts are fixed strings; downstream display and tests match on them.
pub struct MessageTemplates;

impl MessageTemplates {
    pub const BLOOD_SUGAR_HIGH: &'static str = "Blood sugar HIGH";
    pub const BLOOD_SUGAR_LOW: &'static str = "Blood sugar LOW";
    pub const BLOOD_SUGAR_NORMAL: &'static str = "Blood sugar normal";

    pub const HBA1C_CONTROLLED: &'static str = "HbA1c controlled";
    pub const HBA1C_PREDIABETES: &'static str = "Prediabetes range";
    pub const HBA1C_POOR_CONTROL: &'static str = "Poor long-term control";

    pub const BP_HYPERTENSION: &'static str = "Hypertension";
    pub const BP_LOW: &'static str = "Low BP";
    pub const BP_NORMAL: &'static str = "BP normal";

    pub const ACUTE_RISK: &'static str = "Acute risk: HR>120 or SpO2<90";
    pub const HR_SPO2_OK: &'static str = "HR/SpO2 ok";

    /// Adherence warning.
    pub fn missed_doses(medication: &str, count: u32) -> String {
        format!("{medication} missed {count} times")
    }

    /// Family message for an abnormal evaluation batch.
    pub fn family_alert(patient: &str, payload: &str) -> String {
        format!("ALERT: Abnormal readings for {patient}: {payload}")
    }

    /// Family message sent when a reminder answer pushes a medication over the threshold.
    pub fn missed_dose_check_in(patient: &str, medication: &str, threshold: u32) -> String {
        format!("ALERT: {patient} has missed {medication} dose {threshold}+ times. Please check in.")
    }
}
