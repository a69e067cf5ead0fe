//! Layered settings: config file, then `CADSYNC__*` environment variables.
//!
//! `CADSYNC__COMPARE__TOLERANCE=0.01` overrides `compare.tolerance`; list
//! settings take comma-separated values. A `.env` file is read by `main`.

use anyhow::Context;
use cadsync_core::config::CompareOptions;
use cadsync_engine::SyncConfig;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::Path;

/// Read when `--config` is not given; optional
pub const DEFAULT_CONFIG_FILE: &str = "cadsync.toml";

const ENV_PREFIX: &str = "CADSYNC";

const LIST_KEYS: [&str; 2] = ["compare.column_filter", "notification.recipients"];

fn load<T: DeserializeOwned>(path: Option<&Path>) -> anyhow::Result<T> {
    let file = match path {
        Some(path) => config::File::from(path).required(true),
        None => config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
    };

    let mut environment = config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
        .list_separator(",");
    for key in LIST_KEYS {
        environment = environment.with_list_parse_key(key);
    }

    let settings = config::Config::builder()
        .add_source(file)
        .add_source(environment)
        .build()
        .with_context(|| match path {
            Some(path) => format!("failed to read configuration from {}", path.display()),
            None => "failed to read configuration".to_string(),
        })?;

    settings
        .try_deserialize()
        .context("invalid configuration")
}

/// Full configuration for `sync`
pub fn load_sync_config(path: Option<&Path>) -> anyhow::Result<SyncConfig> {
    load(path)
}

/// The subset of configuration `compare` reads; every field is optional.
#[derive(Debug, Default, Deserialize)]
pub struct CompareSettings {
    #[serde(default)]
    pub key_column: Option<String>,
    #[serde(default)]
    pub compare: CompareOptions,
}

pub fn load_compare_settings(path: Option<&Path>) -> anyhow::Result<CompareSettings> {
    load(path)
}
