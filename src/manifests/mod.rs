// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Manifest documents and the set applied on every trigger.

pub mod document;
pub mod set;

pub use document::{DecodedManifest, ManifestDocument};
pub use set::{split_documents, ManifestSet};
