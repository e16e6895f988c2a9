// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Server-side apply of dynamic objects

use crate::apply::{ApplyEndpoint, ApplyTarget};
use kube::{
    api::{DynamicObject, Patch, PatchParams},
    Api, Client,
};
use serde_json::Value;
use tracing::{debug, instrument};

/// Applies objects with server-side apply, which makes repeated applies of
/// the same document a no-op.
pub struct KubeEndpoint {
    client: Client,
    force_conflicts: bool,
}

impl KubeEndpoint {
    pub fn new(client: Client, force_conflicts: bool) -> Self {
        Self {
            client,
            force_conflicts,
        }
    }

    fn api(&self, target: &ApplyTarget) -> Api<DynamicObject> {
        match target.namespace() {
            Some(ns) => Api::namespaced_with(self.client.clone(), ns, target.resource()),
            None => Api::all_with(self.client.clone(), target.resource()),
        }
    }
}

impl ApplyEndpoint for KubeEndpoint {
    #[instrument(skip(self, target, document), fields(kind = %target.resource().kind, namespace = ?target.namespace()))]
    async fn upsert(
        &self,
        target: &ApplyTarget,
        name: &str,
        document: &Value,
        field_manager: &str,
    ) -> Result<(), kube::Error> {
        let mut pp = PatchParams::apply(field_manager);
        if self.force_conflicts {
            pp = pp.force();
        }

        let applied = self.api(target).patch(name, &pp, &Patch::Apply(document)).await?;
        debug!(
            "Applied {} at resourceVersion {}",
            name,
            applied.metadata.resource_version.unwrap_or_default()
        );

        Ok(())
    }
}
