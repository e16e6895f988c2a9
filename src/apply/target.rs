// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Where a manifest goes, and the cluster capabilities used to get it there

use kube::core::GroupVersionKind;
use kube::discovery::{ApiResource, Scope};
use serde_json::Value;
use std::future::Future;

/// An API resource as found in cluster discovery
#[derive(Clone, Debug)]
pub struct ResolvedResource {
    pub resource: ApiResource,
    pub scope: Scope,
}

impl ResolvedResource {
    pub fn is_namespaced(&self) -> bool {
        matches!(self.scope, Scope::Namespaced)
    }
}

/// Resolved destination of one manifest. `namespace` is only set for
/// namespaced resources.
#[derive(Clone, Debug)]
pub struct ApplyTarget {
    resource: ApiResource,
    scope: Scope,
    namespace: Option<String>,
}

impl ApplyTarget {
    /// Bind a resolved resource to the triggering namespace. Cluster scoped
    /// resources ignore it.
    pub fn new(resolved: ResolvedResource, namespace: &str) -> Self {
        let namespace = resolved.is_namespaced().then(|| namespace.to_string());
        Self {
            resource: resolved.resource,
            scope: resolved.scope,
            namespace,
        }
    }

    pub fn resource(&self) -> &ApiResource {
        &self.resource
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }
}

/// Maps a manifest's group, version and kind to an API endpoint and scope
pub trait ResourceResolver: Send + Sync {
    fn resolve(
        &self,
        gvk: &GroupVersionKind,
    ) -> impl Future<Output = Result<ResolvedResource, kube::Error>> + Send;
}

/// Idempotent create-or-update of a single object
pub trait ApplyEndpoint: Send + Sync {
    fn upsert(
        &self,
        target: &ApplyTarget,
        name: &str,
        document: &Value,
        field_manager: &str,
    ) -> impl Future<Output = Result<(), kube::Error>> + Send;
}
