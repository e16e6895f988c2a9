// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Resolving and applying manifests to a triggering namespace.

pub mod applier;
pub mod target;

pub use applier::{AppliedObject, ApplyReport, DocumentOutcome, ManifestApplier};
pub use target::{ApplyEndpoint, ApplyTarget, ResolvedResource, ResourceResolver};
