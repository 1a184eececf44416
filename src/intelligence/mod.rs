//! Vitals and adherence classification.
//!
//! Deterministic threshold rules over the latest vitals snapshot and the
//! per-medication missed-dose tally. Produces an ordered alert batch and the
//! family-notification decision. No I/O; delivery lives in `notify`.

pub mod detection;
pub mod engine;
pub mod helpers;
pub mod messages;
pub mod types;

pub use engine::{classify_vitals_and_adherence, AlertClassifier};
pub use helpers::{bmi, bmi_status};
pub use messages::MessageTemplates;
pub use types::{Alert, AlertCounts, AlertSource, Classification, DEFAULT_MISSED_DOSE_THRESHOLD};
