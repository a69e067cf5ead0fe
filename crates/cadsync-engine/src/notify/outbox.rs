//! Notifier writing messages to an outbox directory for an external relay.

use std::path::{Path, PathBuf};

use super::{Notification, Notifier};
use crate::errors::{notification_error, Result};
use crate::export::atomic_write;

/// Writes one `.eml` file per notification into `dir`.
#[derive(Debug, Clone)]
pub struct OutboxNotifier {
    dir: PathBuf,
    sender: String,
}

impl OutboxNotifier {
    pub fn new(dir: impl Into<PathBuf>, sender: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            sender: sender.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl Notifier for OutboxNotifier {
    fn notify(&self, notification: &Notification) -> Result<()> {
        if notification.recipients.is_empty() {
            return Err(notification_error("notification has no recipients"));
        }

        let now = chrono::Local::now();
        let file_name = format!(
            "{}_{}.eml",
            now.format("%Y%m%d_%H%M%S"),
            uuid::Uuid::now_v7().simple()
        );
        let path = self.dir.join(file_name);
        atomic_write(&path, notification.to_eml(&self.sender, now).as_bytes()).map_err(|e| {
            notification_error(format!("failed to queue notification in outbox: {}", e.message()))
                .with_entity_id(path.display().to_string())
                .with_source(e)
        })?;

        tracing::info!(path = %path.display(), subject = %notification.subject, "notification queued");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn notification() -> Notification {
        Notification {
            subject: "Update in mahoz - changes detected".to_string(),
            body: "body".to_string(),
            recipients: vec!["gis@example.com".to_string()],
        }
    }

    #[test]
    fn test_writes_one_eml_per_notification() {
        let dir = TempDir::new().unwrap();
        let outbox = OutboxNotifier::new(dir.path().join("outbox"), "cadsync@example.com");

        outbox.notify(&notification()).unwrap();
        outbox.notify(&notification()).unwrap();

        let files: Vec<_> = std::fs::read_dir(outbox.dir())
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .collect();
        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|p| p.extension().and_then(|e| e.to_str()) == Some("eml")));
        let content = std::fs::read_to_string(&files[0]).unwrap();
        assert!(content.contains("To: gis@example.com"));
    }

    #[test]
    fn test_rejects_notification_without_recipients() {
        let dir = TempDir::new().unwrap();
        let outbox = OutboxNotifier::new(dir.path(), "cadsync@example.com");
        let mut empty = notification();
        empty.recipients.clear();

        let err = outbox.notify(&empty).unwrap_err();
        assert_eq!(err.code(), "ERR_NOTIFICATION");
    }
}
