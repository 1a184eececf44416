use super::{NotificationSink, NotifyError};

/// Writes notifications to the log instead of sending them.
/// Used when no messaging provider is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl NotificationSink for LogSink {
    fn name(&self) -> &'static str {
        "log"
    }

    fn send(&self, destination: &str, message: &str) -> Result<(), NotifyError> {
        tracing::info!(destination, text = message, "Family notification (not sent, log only)");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn always_succeeds() {
        assert!(LogSink.send("+919800000000", "ALERT").is_ok());
        assert!(LogSink.send("", "").is_ok());
    }
}
