use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::DoseStatus;

/// One adherence event: a fired reminder, a taken dose or a missed dose.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoseLog {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub medication_id: Uuid,
    pub status: DoseStatus,
    pub note: Option<String>,
    pub logged_at: NaiveDateTime,
}

impl DoseLog {
    pub fn new(
        patient_id: Uuid,
        medication_id: Uuid,
        status: DoseStatus,
        note: Option<String>,
        logged_at: NaiveDateTime,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            patient_id,
            medication_id,
            status,
            note,
            logged_at,
        }
    }
}

/// A dose log joined with its medication name, for history views.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoseLogView {
    pub logged_at: NaiveDateTime,
    pub medication_name: Option<String>,
    pub status: DoseStatus,
    pub note: Option<String>,
}

/// Missed-dose counts per medication name for one patient.
///
/// Keys are ordered so that adherence alerts come out in a stable order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AdherenceTally {
    missed: BTreeMap<String, u32>,
}

impl AdherenceTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style set of a medication's missed count.
    pub fn with(mut self, medication: impl Into<String>, missed: u32) -> Self {
        self.missed.insert(medication.into(), missed);
        self
    }

    pub fn missed(&self, medication: &str) -> u32 {
        self.missed.get(medication).copied().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> + '_ {
        self.missed.iter().map(|(name, count)| (name.as_str(), *count))
    }

    pub fn is_empty(&self) -> bool {
        self.missed.is_empty()
    }
}

impl FromIterator<(String, u32)> for AdherenceTally {
    fn from_iter<I: IntoIterator<Item = (String, u32)>>(iter: I) -> Self {
        let mut tally = Self::new();
        for (name, count) in iter {
            *tally.missed.entry(name).or_insert(0) += count;
        }
        tally
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_iter_merges_duplicate_names() {
        let tally: AdherenceTally = vec![("Metformin".to_string(), 2), ("Metformin".to_string(), 1)]
            .into_iter()
            .collect();
        assert_eq!(tally.missed("Metformin"), 3);
        assert_eq!(tally.missed("Insulin Lispro"), 0);
    }

    #[test]
    fn iterates_in_name_order() {
        let tally = AdherenceTally::new().with("Telmisartan", 1).with("Glimepiride", 4);
        let names: Vec<&str> = tally.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["Glimepiride", "Telmisartan"]);
    }
}
