// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// The operator name, used as the default field manager for server-side apply
pub const OPERATOR_NAME: &str = "ns-label-operator";

/// Label value that fires the manifest apply
pub const TRIGGER_VALUE: &str = "true";

/// Manifest file discovery
pub mod manifests {
    /// Only files whose name ends with this suffix are loaded from the manifest directory
    pub const FILE_SUFFIX: &str = ".yaml";
    /// A line holding only this marker separates documents within one file
    pub const DOCUMENT_SEPARATOR: &str = "---";
}

/// Environment variable names read by `Config::from_env`
pub mod env {
    pub const TRIGGER_LABEL: &str = "TRIGGER_LABEL";
    pub const CONFIG_DIR: &str = "CONFIG_DIR";
    pub const MANIFESTS: &str = "MANIFESTS";
    pub const FIELD_MANAGER: &str = "FIELD_MANAGER";
    pub const FORCE_CONFLICTS: &str = "FORCE_CONFLICTS";
    pub const SYNC_TIMEOUT_SECS: &str = "SYNC_TIMEOUT_SECS";
    pub const DEBUG: &str = "DEBUG";
    pub const LOG_TO_JSON: &str = "LOG_TO_JSON";
}

/// Watch loop tuning
pub mod watch {
    /// Seconds to wait for the initial namespace list before giving up
    pub const DEFAULT_SYNC_TIMEOUT_SECS: u64 = 60;
    /// Capacity of the channel between the change stream and the controller
    pub const EVENT_CHANNEL_CAPACITY: usize = 256;
}
