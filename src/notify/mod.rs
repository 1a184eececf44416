//! Family notification delivery.
//!
//! A `NotificationSink` sends one text message to one destination. `dispatch`
//! fans a message out to every destination; a failure for one destination is
//! logged and reported, never propagated, and never retried.

pub mod log_sink;
pub mod twilio;

use serde::Serialize;
use thiserror::Error;

pub use log_sink::LogSink;
pub use twilio::TwilioWhatsAppSink;

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Provider rejected message ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("Invalid destination: {0}")]
    InvalidDestination(String),

    #[error("Notification channel not configured: {0}")]
    NotConfigured(String),
}

/// Outbound text channel to family members.
pub trait NotificationSink: Send + Sync {
    /// Short channel name for logs.
    fn name(&self) -> &'static str;

    fn send(&self, destination: &str, message: &str) -> Result<(), NotifyError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeliveryFailure {
    pub destination: String,
    pub error: String,
}

/// Per-destination outcome of one dispatch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeliveryReport {
    pub delivered: Vec<String>,
    pub failed: Vec<DeliveryFailure>,
}

impl DeliveryReport {
    pub fn attempted(&self) -> usize {
        self.delivered.len() + self.failed.len()
    }
}

/// Send `message` to each destination independently.
pub fn dispatch<S>(sink: &S, destinations: &[String], message: &str) -> DeliveryReport
where
    S: NotificationSink + ?Sized,
{
    let mut report = DeliveryReport::default();
    for destination in destinations {
        match sink.send(destination, message) {
            Ok(()) => report.delivered.push(destination.clone()),
            Err(e) => {
                tracing::warn!(
                    sink = sink.name(),
                    destination = %destination,
                    error = %e,
                    "Family notification failed"
                );
                report.failed.push(DeliveryFailure {
                    destination: destination.clone(),
                    error: e.to_string(),
                });
            }
        }
    }
    tracing::info!(
        sink = sink.name(),
        delivered = report.delivered.len(),
        failed = report.failed.len(),
        "Family notification dispatched"
    );
    report
}
