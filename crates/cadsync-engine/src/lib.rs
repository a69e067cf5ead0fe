//! cadsync engine - orchestration layer
//!
//! Coordinates a sync run around the core change detection: reads snapshot
//! documents, exports the current extract, composes and hands on
//! notifications.

pub mod config;
pub mod errors;
pub mod export;
pub mod notify;
pub mod source;
pub mod sync;

pub use config::{Environment, SyncConfig};
pub use export::{ExportReceipt, Exporter, SnapshotFileExporter};
pub use notify::{LogNotifier, Notification, Notifier, OutboxNotifier};
pub use source::JsonSnapshotSource;
pub use sync::{run_sync, PreviousExport, SyncOptions, SyncOutcome};
