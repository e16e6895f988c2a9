// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Single manifest documents and their schema-agnostic decoding

use crate::error::ManifestError;
use kube::core::GroupVersionKind;
use serde_json::Value;
use std::fmt;

/// One raw YAML document, kept verbatim until it is applied
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ManifestDocument {
    raw: String,
    origin: String,
}

impl ManifestDocument {
    pub fn new(raw: impl Into<String>, origin: impl Into<String>) -> Self {
        Self {
            raw: raw.into(),
            origin: origin.into(),
        }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Where the document came from, e.g. `literal[0]` or `/etc/manifests/role.yaml#1`
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Decode the document into a generic object tree
    pub fn decode(&self) -> Result<DecodedManifest, ManifestError> {
        if is_blank(&self.raw) {
            return Err(ManifestError::Empty);
        }

        let body: Value = serde_yaml::from_str(&self.raw)?;
        if body.is_null() {
            return Err(ManifestError::Empty);
        }
        if !body.is_object() {
            return Err(ManifestError::NotAnObject);
        }

        let api_version = string_at(&body, "/apiVersion").ok_or(ManifestError::MissingField("apiVersion"))?;
        let kind = string_at(&body, "/kind").ok_or(ManifestError::MissingField("kind"))?;
        let name = string_at(&body, "/metadata/name").ok_or(ManifestError::MissingField("metadata.name"))?;

        let (group, version) = api_version.split_once('/').unwrap_or(("", api_version));
        let gvk = GroupVersionKind::gvk(group, version, kind);
        let name = name.to_string();

        Ok(DecodedManifest { gvk, name, body })
    }
}

impl fmt::Display for ManifestDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.origin)
    }
}

/// Whitespace and comment lines only
fn is_blank(raw: &str) -> bool {
    raw.lines().all(|line| {
        let line = line.trim();
        line.is_empty() || line.starts_with('#')
    })
}

fn string_at<'a>(body: &'a Value, pointer: &str) -> Option<&'a str> {
    body.pointer(pointer)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

/// A decoded manifest: its type, its name and the full object
#[derive(Clone, Debug, PartialEq)]
pub struct DecodedManifest {
    pub gvk: GroupVersionKind,
    pub name: String,
    pub body: Value,
}

impl DecodedManifest {
    pub fn api_version(&self) -> String {
        self.gvk.api_version()
    }

    pub fn namespace(&self) -> Option<&str> {
        self.body.pointer("/metadata/namespace").and_then(Value::as_str)
    }

    /// Bind the object to `namespace`, replacing any namespace it declares
    pub fn set_namespace(&mut self, namespace: &str) {
        if let Some(metadata) = self.body.get_mut("metadata").and_then(Value::as_object_mut) {
            metadata.insert("namespace".to_string(), Value::String(namespace.to_string()));
        }
    }
}
