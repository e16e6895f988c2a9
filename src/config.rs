// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::{env as keys, watch::DEFAULT_SYNC_TIMEOUT_SECS, OPERATOR_NAME};
use crate::error::OperatorError;
use crate::manifests::split_documents;
use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Operator configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Namespace label that triggers the apply when set to "true"
    pub label: String,
    /// Directory holding `*.yaml` manifests, appended after the literal ones
    pub manifest_dir: Option<PathBuf>,
    /// Manifests provided inline, applied first and in order. `MANIFESTS` is
    /// split into documents like a manifest file.
    pub manifests: Vec<String>,
    /// Field manager recorded on every server-side apply
    pub field_manager: String,
    /// Take ownership of fields managed by someone else on conflict
    pub force_conflicts: bool,
    pub sync_timeout: Duration,
    pub debug: bool,
    pub log_json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            label: String::new(),
            manifest_dir: None,
            manifests: Vec::new(),
            field_manager: OPERATOR_NAME.to_string(),
            force_conflicts: false,
            sync_timeout: Duration::from_secs(DEFAULT_SYNC_TIMEOUT_SECS),
            debug: false,
            log_json: false,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from `lookup`, which maps a variable name to its raw value
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        // Trimmed, empty counts as unset
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let flag = |key: &str| var(key).is_some_and(|v| v == "true");

        let label = var(keys::TRIGGER_LABEL)
            .context("TRIGGER_LABEL environment variable not set")?;

        let sync_timeout = match var(keys::SYNC_TIMEOUT_SECS) {
            Some(v) => Duration::from_secs(
                v.parse()
                    .with_context(|| format!("SYNC_TIMEOUT_SECS is not a number: {}", v))?,
            ),
            None => Duration::from_secs(DEFAULT_SYNC_TIMEOUT_SECS),
        };

        let config = Config {
            label,
            manifest_dir: var(keys::CONFIG_DIR).map(PathBuf::from),
            manifests: var(keys::MANIFESTS)
                .map(|m| split_documents(&m))
                .unwrap_or_default(),
            field_manager: var(keys::FIELD_MANAGER).unwrap_or_else(|| OPERATOR_NAME.to_string()),
            force_conflicts: flag(keys::FORCE_CONFLICTS),
            sync_timeout,
            debug: flag(keys::DEBUG),
            log_json: flag(keys::LOG_TO_JSON),
        };

        config.validate()?;
        Ok(config)
    }

    /// Check the settings the watch cannot start without
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.label.trim().is_empty() {
            return Err(OperatorError::ConfigError("trigger label required".to_string()));
        }
        if self.manifest_dir.is_none() && self.manifests.is_empty() {
            return Err(OperatorError::ConfigError(
                "either a manifest directory or at least one manifest is required".to_string(),
            ));
        }
        if self.field_manager.is_empty() {
            return Err(OperatorError::ConfigError("field manager must not be empty".to_string()));
        }
        Ok(())
    }
}
