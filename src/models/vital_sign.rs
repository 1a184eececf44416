use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::VitalKind;

/// A single recorded vital. Immutable once stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VitalReading {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub kind: VitalKind,
    pub value: f64,
    pub recorded_at: NaiveDateTime,
}

impl VitalReading {
    pub fn new(patient_id: Uuid, kind: VitalKind, value: f64, recorded_at: NaiveDateTime) -> Self {
        Self {
            id: Uuid::new_v4(),
            patient_id,
            kind,
            value,
            recorded_at,
        }
    }
}

/// The current value per vital kind for one patient.
///
/// Presence is explicit: a kind is either in the snapshot or it is not.
/// A recorded zero is a value, not an absence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VitalsSnapshot {
    values: BTreeMap<VitalKind, f64>,
}

impl VitalsSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, kind: VitalKind, value: f64) -> Self {
        self.values.insert(kind, value);
        self
    }

    pub fn insert(&mut self, kind: VitalKind, value: f64) {
        self.values.insert(kind, value);
    }

    pub fn get(&self, kind: VitalKind) -> Option<f64> {
        self.values.get(&kind).copied()
    }

    /// Both values of a paired reading, or None if either is missing.
    pub fn pair(&self, a: VitalKind, b: VitalKind) -> Option<(f64, f64)> {
        Some((self.get(a)?, self.get(b)?))
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (VitalKind, f64)> + '_ {
        self.values.iter().map(|(k, v)| (*k, *v))
    }

    /// Keep the most recent reading per kind. On equal timestamps the
    /// earlier entry in the slice wins, so pass readings newest first.
    pub fn from_readings(readings: &[VitalReading]) -> Self {
        let mut latest: BTreeMap<VitalKind, &VitalReading> = BTreeMap::new();
        for reading in readings {
            match latest.get(&reading.kind) {
                Some(current) if current.recorded_at >= reading.recorded_at => {}
                _ => {
                    latest.insert(reading.kind, reading);
                }
            }
        }
        Self {
            values: latest.into_iter().map(|(k, r)| (k, r.value)).collect(),
        }
    }
}

impl FromIterator<(VitalKind, f64)> for VitalsSnapshot {
    fn from_iter<I: IntoIterator<Item = (VitalKind, f64)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}
