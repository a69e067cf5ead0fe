//! Export of the current snapshot.
//!
//! The exported file doubles as the previous snapshot of the next run, so an
//! export must never be left half-written: content goes to a temp file in the
//! target directory and is renamed into place.

use cadsync_core::model::RecordSet;
use sha2::{Digest as _, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::{export_error, io_error, Result};
use crate::source::SnapshotDocument;

/// What an export wrote
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReceipt {
    pub path: PathBuf,
    pub record_count: usize,
    /// SHA-256 of the written bytes
    pub digest: String,
}

/// Writes a record set to its export location.
pub trait Exporter {
    /// # Errors
    ///
    /// Implementations report write failures as `Export`, with the
    /// underlying `Io` or `Serialization` error as source.
    fn export(&self, set: &RecordSet, target: &Path) -> Result<ExportReceipt>;
}

/// Exports record sets as JSON snapshot documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct SnapshotFileExporter;

impl Exporter for SnapshotFileExporter {
    fn export(&self, set: &RecordSet, target: &Path) -> Result<ExportReceipt> {
        let bytes = SnapshotDocument::from_record_set(set)
            .to_json_bytes()
            .map_err(|e| export_error(target, e))?;
        atomic_write(target, &bytes).map_err(|e| export_error(target, e))?;

        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        let receipt = ExportReceipt {
            path: target.to_path_buf(),
            record_count: set.len(),
            digest: hex::encode(hasher.finalize()),
        };
        tracing::debug!(
            path = %target.display(),
            record_count = receipt.record_count,
            "snapshot exported"
        );
        Ok(receipt)
    }
}

/// Atomically write bytes to a file
///
/// Uses temp file + rename to ensure atomic write
///
/// # Errors
///
/// `Io` when the parent directory, the temp file or the rename fails.
pub fn atomic_write(target_path: &Path, content: &[u8]) -> Result<()> {
    // Create parent directory if it doesn't exist
    if let Some(parent) = target_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| io_error("create_export_dir", parent, e))?;
        }
    }

    let temp_path = target_path.with_extension("tmp");

    fs::write(&temp_path, content).map_err(|e| io_error("write_export_temp", &temp_path, e))?;

    fs::rename(&temp_path, target_path).map_err(|e| {
        fs::remove_file(&temp_path).ok();
        io_error("rename_export_temp", target_path, e)
    })?;

    Ok(())
}
