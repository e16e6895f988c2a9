// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors that stop the operator from starting or keep the watch from running
#[derive(Error, Debug)]
pub enum OperatorError {
    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Failed to load manifests from {path}: {source}")]
    LoadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Timed out after {0:?} waiting for the namespace watch to sync")]
    SyncTimeout(Duration),

    #[error("Namespace change stream closed unexpectedly")]
    StreamClosed,

    #[error("Invalid apply target: {0}")]
    InvalidTarget(String),
}

pub type Result<T> = std::result::Result<T, OperatorError>;

/// Errors scoped to a single manifest document. These are logged and the
/// remaining documents are still applied.
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("empty manifest document")]
    Empty,

    #[error("failed to decode YAML: {0}")]
    Decode(#[from] serde_yaml::Error),

    #[error("manifest document is not a mapping")]
    NotAnObject,

    #[error("manifest document is missing {0}")]
    MissingField(&'static str),

    #[error("no API resource found for {api_version}/{kind}: {source}")]
    Resolution {
        api_version: String,
        kind: String,
        #[source]
        source: kube::Error,
    },

    #[error("failed to apply {kind} {name}: {source}")]
    Apply {
        kind: String,
        name: String,
        #[source]
        source: kube::Error,
    },
}
