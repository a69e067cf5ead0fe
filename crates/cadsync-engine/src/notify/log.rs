//! Notifier that only logs.

use super::{Notification, Notifier};
use crate::config::Environment;
use crate::errors::Result;

/// Logs each notification instead of delivering it.
///
/// Default notifier, and the only one used in production until real
/// delivery settings exist.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier {
    pub environment: Environment,
}

impl LogNotifier {
    pub fn new(environment: Environment) -> Self {
        Self { environment }
    }
}

impl Notifier for LogNotifier {
    fn notify(&self, notification: &Notification) -> Result<()> {
        if self.environment == Environment::Production {
            tracing::warn!("production environment: notification not delivered (placeholder settings)");
        }
        tracing::info!(
            subject = %notification.subject,
            recipients = %notification.recipients.join(", "),
            body_len = notification.body.len(),
            "notification composed"
        );
        Ok(())
    }
}
