// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! API discovery backed resource resolution

use crate::apply::{ResolvedResource, ResourceResolver};
use kube::core::GroupVersionKind;
use kube::discovery::oneshot::pinned_kind;
use kube::Client;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

/// Resolves kinds through the cluster's discovery API.
///
/// Successful lookups are cached for the lifetime of the process. Failed
/// lookups are not, so the next trigger queries discovery again.
pub struct DiscoveryResolver {
    client: Client,
    cache: RwLock<HashMap<GroupVersionKind, ResolvedResource>>,
}

impl DiscoveryResolver {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            cache: RwLock::new(HashMap::new()),
        }
    }
}

impl ResourceResolver for DiscoveryResolver {
    #[instrument(skip(self, gvk), fields(api_version = %gvk.api_version(), kind = %gvk.kind))]
    async fn resolve(&self, gvk: &GroupVersionKind) -> Result<ResolvedResource, kube::Error> {
        if let Some(resolved) = self.cache.read().await.get(gvk) {
            return Ok(resolved.clone());
        }

        let (resource, capabilities) = pinned_kind(&self.client, gvk).await?;
        debug!("Discovered {} ({:?})", resource.plural, capabilities.scope);

        let resolved = ResolvedResource {
            resource,
            scope: capabilities.scope,
        };
        self.cache.write().await.insert(gvk.clone(), resolved.clone());

        Ok(resolved)
    }
}
