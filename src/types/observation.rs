// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use k8s_openapi::api::core::v1::Namespace;
use kube::ResourceExt;
use std::collections::BTreeMap;

/// Lifecycle phase of a watched namespace
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Active,
    Terminating,
    Other,
}

impl Phase {
    fn from_status(phase: Option<&str>) -> Self {
        match phase {
            Some("Active") => Phase::Active,
            Some("Terminating") => Phase::Terminating,
            _ => Phase::Other,
        }
    }
}

/// Snapshot of a namespace's name, labels and phase at one point in time
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResourceObservation {
    pub name: String,
    pub labels: BTreeMap<String, String>,
    pub phase: Phase,
}

impl ResourceObservation {
    pub fn new(name: impl Into<String>, labels: BTreeMap<String, String>, phase: Phase) -> Self {
        Self {
            name: name.into(),
            labels,
            phase,
        }
    }

    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels.get(key).map(String::as_str)
    }

    pub fn has_label(&self, key: &str) -> bool {
        self.labels.contains_key(key)
    }
}

impl From<&Namespace> for ResourceObservation {
    fn from(ns: &Namespace) -> Self {
        let phase = ns.status.as_ref().and_then(|s| s.phase.as_deref());
        Self {
            name: ns.name_any(),
            labels: ns.labels().clone(),
            phase: Phase::from_status(phase),
        }
    }
}
