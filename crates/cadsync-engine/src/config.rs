//! Run configuration.
//!
//! `SyncConfig` is plain serde data; layering (file, environment) is done by
//! the CLI. Every setting has a default except `table` and `key_column`.

use cadsync_core::config::CompareOptions;
use cadsync_core::diff::VertexDistance;
use cadsync_core::snapshot::{DerivedColumn, LoadOptions};
use serde::Deserialize;
use std::path::PathBuf;

use crate::errors::{invalid_config, Result};

/// Deployment environment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    #[default]
    Test,
    /// Delivery settings are placeholders; notifications are only logged
    Production,
}

fn default_target_dir() -> PathBuf {
    PathBuf::from("exports")
}

fn default_export_file_name() -> String {
    "snapshot.json".to_string()
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("exports/logs")
}

/// File-system locations of one run
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "default_target_dir")]
    pub target_dir: PathBuf,
    #[serde(default = "default_export_file_name")]
    pub export_file_name: String,
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
    /// Directory for composed notification messages; logging only when unset
    #[serde(default)]
    pub outbox_dir: Option<PathBuf>,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            target_dir: default_target_dir(),
            export_file_name: default_export_file_name(),
            log_dir: default_log_dir(),
            outbox_dir: None,
        }
    }
}

impl PathsConfig {
    /// Location of the exported snapshot, which is also the previous
    /// snapshot of the next run.
    pub fn export_path(&self) -> PathBuf {
        self.target_dir.join(&self.export_file_name)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    pub recipients: Vec<String>,
    pub sender: String,
    /// Also notify when the first export is created
    pub notify_on_create: bool,
}

fn default_summary_detail_limit() -> usize {
    50
}

/// Complete configuration of a sync run
#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
    /// Name of the table being tracked
    pub table: String,
    /// Column holding the stable record identifier
    pub key_column: String,
    #[serde(default)]
    pub environment: Environment,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub compare: CompareOptions,
    /// Columns computed on the current extract before export
    #[serde(default)]
    pub derived_columns: Vec<DerivedColumn>,
    #[serde(default)]
    pub notification: NotificationConfig,
    #[serde(default = "default_summary_detail_limit")]
    pub summary_detail_limit: usize,
}

impl SyncConfig {
    pub fn new(table: impl Into<String>, key_column: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            key_column: key_column.into(),
            environment: Environment::default(),
            paths: PathsConfig::default(),
            compare: CompareOptions::default(),
            derived_columns: Vec::new(),
            notification: NotificationConfig::default(),
            summary_detail_limit: default_summary_detail_limit(),
        }
    }

    /// Check the settings a run cannot proceed without.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` for an empty table or key column, a negative or NaN
    /// epsilon or tolerance, or a derived column that writes or reads the key.
    pub fn validate(&self) -> Result<()> {
        if self.table.trim().is_empty() {
            return Err(invalid_config("table must not be empty"));
        }
        if self.key_column.trim().is_empty() {
            return Err(invalid_config("key_column must not be empty"));
        }
        if let Some(setting) = self.compare.invalid_settings().first() {
            return Err(invalid_config(format!(
                "compare.{} must be a non-negative number",
                setting
            )));
        }
        if let Some(derived) = self
            .derived_columns
            .iter()
            .find(|d| d.name == self.key_column)
        {
            return Err(invalid_config(format!(
                "derived column '{}' would overwrite the key column",
                derived.name
            )));
        }
        if let Some(derived) = self
            .derived_columns
            .iter()
            .find(|d| d.source == self.key_column)
        {
            return Err(invalid_config(format!(
                "derived column '{}' reads the key column '{}'",
                derived.name, self.key_column
            )));
        }
        if self.paths.export_file_name.trim().is_empty() {
            return Err(invalid_config("paths.export_file_name must not be empty"));
        }
        Ok(())
    }

    /// Load options for the current extract (derived columns applied)
    pub fn current_load_options(&self) -> LoadOptions {
        LoadOptions {
            key_column: self.key_column.clone(),
            derived_columns: self.derived_columns.clone(),
        }
    }

    /// Load options for the previous export, which already carries derived columns
    pub fn previous_load_options(&self) -> LoadOptions {
        LoadOptions::new(self.key_column.clone())
    }

    pub fn geometry_comparator(&self) -> VertexDistance {
        VertexDistance::new(self.compare.use_z)
    }
}
