//! Change notifications.
//!
//! Composition is separate from delivery: [`compose_notification`] builds the
//! message, a [`Notifier`] hands it on. Delivery failures never abort a run;
//! the sync pipeline logs them and continues.

pub mod log;
pub mod message;
pub mod outbox;

pub use self::log::LogNotifier;
pub use message::{
    compose_creation_notification, compose_notification, compose_replacement_notification,
    Notification,
};
pub use outbox::OutboxNotifier;

use crate::errors::Result;

/// Delivers composed notifications.
pub trait Notifier {
    /// # Errors
    ///
    /// `Notification` when the message cannot be handed on.
    fn notify(&self, notification: &Notification) -> Result<()>;
}
