pub mod care; // Orchestration: import, vitals, doses, family alerts
pub mod config;
pub mod db;
pub mod intelligence; // Vitals & adherence classification
pub mod models;
pub mod notify; // Family notification sinks
pub mod pipeline; // Prescription text parsing
pub mod reminders;

use tracing_subscriber::EnvFilter;

pub use care::{AlertOutcome, CareError, CareService, PatientOverview, ReminderAnswer};
pub use intelligence::{classify_vitals_and_adherence, Alert, Classification};
pub use pipeline::parse_prescription_text;

/// Install the global tracing subscriber. RUST_LOG overrides the default filter.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .with_writer(std::io::stderr)
        .try_init();

    tracing::debug!("{} v{} logging initialized", config::APP_NAME, config::APP_VERSION);
}
