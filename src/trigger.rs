// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Rising-edge detection on the trigger label.

use crate::constants::TRIGGER_VALUE;
use crate::error::{OperatorError, Result};
use crate::types::{Phase, ResourceObservation};
use std::fmt;

/// The label key and value that fire the manifest apply
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TriggerRule {
    label_key: String,
    trigger_value: String,
}

/// Why an update did not fire
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SkipReason {
    MissingObject,
    Terminating,
    LabelAbsent,
    AlreadyLabeled,
    ValueMismatch { got: String },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingObject => write!(f, "no new object in update"),
            SkipReason::Terminating => write!(f, "namespace is terminating"),
            SkipReason::LabelAbsent => write!(f, "trigger label not present"),
            SkipReason::AlreadyLabeled => write!(f, "trigger label was already present"),
            SkipReason::ValueMismatch { got } => write!(f, "trigger label has value {:?}", got),
        }
    }
}

/// Outcome of evaluating one (old, new) update
#[derive(Debug, PartialEq, Eq)]
pub enum Decision<'a> {
    Fire(&'a ResourceObservation),
    Skip(SkipReason),
}

impl TriggerRule {
    /// Rule firing on `label_key` = "true"
    pub fn new(label_key: impl Into<String>) -> Result<Self> {
        Self::with_value(label_key, TRIGGER_VALUE)
    }

    pub fn with_value(label_key: impl Into<String>, trigger_value: impl Into<String>) -> Result<Self> {
        let label_key = label_key.into();
        if label_key.trim().is_empty() {
            return Err(OperatorError::ConfigError("trigger label required".to_string()));
        }
        Ok(Self {
            label_key,
            trigger_value: trigger_value.into(),
        })
    }

    pub fn label_key(&self) -> &str {
        &self.label_key
    }

    pub fn trigger_value(&self) -> &str {
        &self.trigger_value
    }

    /// Decide whether an update is the rising edge of `label_key == trigger_value`.
    ///
    /// A missing `old` counts as a namespace without labels. Once the key is
    /// present in `old` the update never fires, whatever the values are, so
    /// re-triggering requires removing and re-adding the label.
    pub fn decide<'a>(
        &self,
        old: Option<&ResourceObservation>,
        new: Option<&'a ResourceObservation>,
    ) -> Decision<'a> {
        let Some(new) = new else {
            return Decision::Skip(SkipReason::MissingObject);
        };

        if new.phase == Phase::Terminating {
            return Decision::Skip(SkipReason::Terminating);
        }

        let Some(value) = new.label(&self.label_key) else {
            return Decision::Skip(SkipReason::LabelAbsent);
        };

        if old.is_some_and(|o| o.has_label(&self.label_key)) {
            return Decision::Skip(SkipReason::AlreadyLabeled);
        }

        if value != self.trigger_value {
            return Decision::Skip(SkipReason::ValueMismatch {
                got: value.to_string(),
            });
        }

        Decision::Fire(new)
    }

    /// Returns the namespace to apply to, if the update should fire
    pub fn should_run<'a>(
        &self,
        old: Option<&ResourceObservation>,
        new: Option<&'a ResourceObservation>,
    ) -> Option<&'a ResourceObservation> {
        match self.decide(old, new) {
            Decision::Fire(ns) => Some(ns),
            Decision::Skip(_) => None,
        }
    }
}
