// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes backed resource discovery, server-side apply, and namespace watching.

pub mod discovery;
pub mod endpoint;
pub mod namespaces;

pub use discovery::DiscoveryResolver;
pub use endpoint::KubeEndpoint;
pub use namespaces::{NamespaceStream, ObservationCache};
