//! Stall alert channel.
//!
//! The delivery transport (email, chat, whatever the operators wire up) is
//! an external collaborator; this module only defines the seam and a
//! log-based default so an unconfigured run still surfaces stalls.

use crate::types::GeotagResult;

/// Synchronous alert collaborator invoked once per stall episode.
///
/// Implementations may fail; callers log the failure and keep going.
pub trait Notifier {
    fn notify(&self, machine_id: &str) -> GeotagResult<()>;
}

/// Default notifier: writes the alert to the log, addressed to the
/// configured recipients.
pub struct LogNotifier {
    recipients: Vec<String>,
}

impl LogNotifier {
    pub fn new(recipients: Vec<String>) -> Self {
        Self { recipients }
    }
}

impl Notifier for LogNotifier {
    fn notify(&self, machine_id: &str) -> GeotagResult<()> {
        let stamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
        if self.recipients.is_empty() {
            log::warn!(
                "{} Process is stopped, please check machine {}",
                stamp,
                machine_id
            );
            return Ok(());
        }
        for recipient in &self.recipients {
            log::warn!(
                "{} Alert for {}: process is stopped, please check machine {}",
                stamp,
                recipient,
                machine_id
            );
        }
        Ok(())
    }
}
