// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Applies the manifest set to a namespace, one document at a time

use crate::apply::target::{ApplyEndpoint, ApplyTarget, ResourceResolver};
use crate::error::{ManifestError, OperatorError, Result};
use crate::manifests::{ManifestDocument, ManifestSet};
use std::sync::Arc;
use tracing::{debug, error, info, instrument};

/// An object that was applied successfully
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppliedObject {
    pub kind: String,
    pub name: String,
    pub namespace: Option<String>,
}

/// Result of applying one document
#[derive(Debug)]
pub struct DocumentOutcome {
    pub index: usize,
    pub origin: String,
    pub result: std::result::Result<AppliedObject, ManifestError>,
}

/// Per-document outcomes of one apply call, in manifest order
#[derive(Debug, Default)]
pub struct ApplyReport {
    pub namespace: String,
    pub outcomes: Vec<DocumentOutcome>,
}

impl ApplyReport {
    pub fn applied(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.applied()
    }

    pub fn is_complete(&self) -> bool {
        self.failed() == 0
    }
}

pub struct ManifestApplier<R, E> {
    manifests: Arc<ManifestSet>,
    resolver: R,
    endpoint: E,
    field_manager: String,
}

impl<R: ResourceResolver, E: ApplyEndpoint> ManifestApplier<R, E> {
    pub fn new(
        manifests: Arc<ManifestSet>,
        resolver: R,
        endpoint: E,
        field_manager: impl Into<String>,
    ) -> Self {
        Self {
            manifests,
            resolver,
            endpoint,
            field_manager: field_manager.into(),
        }
    }

    pub fn manifests(&self) -> &ManifestSet {
        &self.manifests
    }

    pub fn field_manager(&self) -> &str {
        &self.field_manager
    }

    /// Apply every manifest to `namespace`.
    ///
    /// A failing document is logged and recorded in the report; the remaining
    /// documents are still applied. Only an empty namespace name or an empty
    /// manifest set fail the call.
    #[instrument(skip(self), fields(documents = self.manifests.len()))]
    pub async fn apply(&self, namespace: &str) -> Result<ApplyReport> {
        if namespace.is_empty() {
            return Err(OperatorError::InvalidTarget("empty namespace name".to_string()));
        }
        if self.manifests.is_empty() {
            return Err(OperatorError::ConfigError("no manifests to apply".to_string()));
        }

        debug!("Applying {} manifests to namespace {}", self.manifests.len(), namespace);

        let mut outcomes = Vec::with_capacity(self.manifests.len());
        for (index, document) in self.manifests.iter().enumerate() {
            let result = self.apply_document(namespace, document).await;
            match &result {
                Ok(object) => info!("Manifest {} applied as {} {}", document, object.kind, object.name),
                Err(e) => error!("Failed to apply manifest {} to namespace {}: {}", document, namespace, e),
            }
            outcomes.push(DocumentOutcome {
                index,
                origin: document.origin().to_string(),
                result,
            });
        }

        Ok(ApplyReport {
            namespace: namespace.to_string(),
            outcomes,
        })
    }

    async fn apply_document(
        &self,
        namespace: &str,
        document: &ManifestDocument,
    ) -> std::result::Result<AppliedObject, ManifestError> {
        let mut manifest = document.decode()?;

        let resolved = self
            .resolver
            .resolve(&manifest.gvk)
            .await
            .map_err(|source| ManifestError::Resolution {
                api_version: manifest.api_version(),
                kind: manifest.gvk.kind.clone(),
                source,
            })?;

        let target = ApplyTarget::new(resolved, namespace);
        if let Some(ns) = target.namespace() {
            manifest.set_namespace(ns);
        }

        debug!(
            "Applying {} {} (namespace: {})",
            manifest.gvk.kind,
            manifest.name,
            target.namespace().unwrap_or("<cluster>")
        );

        self.endpoint
            .upsert(&target, &manifest.name, &manifest.body, &self.field_manager)
            .await
            .map_err(|source| ManifestError::Apply {
                kind: manifest.gvk.kind.clone(),
                name: manifest.name.clone(),
                source,
            })?;

        Ok(AppliedObject {
            kind: manifest.gvk.kind,
            name: manifest.name,
            namespace: target.namespace().map(str::to_string),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apply::target::ResolvedResource;
    use k8s_openapi::api::core::v1::ConfigMap;
    use k8s_openapi::api::rbac::v1::{ClusterRole, Role};
    use kube::core::{ErrorResponse, GroupVersionKind};
    use kube::discovery::{ApiResource, Scope};
    use serde_json::Value;
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    const CONFIG_MAP: &str = "apiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: app-config\n  namespace: elsewhere\ndata:\n  k: v\n";
    const ROLE: &str = "apiVersion: rbac.authorization.k8s.io/v1\nkind: Role\nmetadata:\n  name: reader\nrules: []\n";
    const CLUSTER_ROLE: &str = "apiVersion: rbac.authorization.k8s.io/v1\nkind: ClusterRole\nmetadata:\n  name: global-reader\nrules: []\n";
    const WIDGET: &str = "apiVersion: example.com/v1\nkind: Widget\nmetadata:\n  name: w\n";

    fn not_found(message: &str) -> kube::Error {
        kube::Error::Api(ErrorResponse {
            status: "Failure".to_string(),
            message: message.to_string(),
            reason: "NotFound".to_string(),
            code: 404,
        })
    }

    struct FakeResolver;

    impl ResourceResolver for FakeResolver {
        async fn resolve(&self, gvk: &GroupVersionKind) -> std::result::Result<ResolvedResource, kube::Error> {
            let (resource, scope) = match gvk.kind.as_str() {
                "ConfigMap" => (ApiResource::erase::<ConfigMap>(&()), Scope::Namespaced),
                "Role" => (ApiResource::erase::<Role>(&()), Scope::Namespaced),
                "ClusterRole" => (ApiResource::erase::<ClusterRole>(&()), Scope::Cluster),
                other => return Err(not_found(&format!("unknown kind {}", other))),
            };
            Ok(ResolvedResource { resource, scope })
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Upsert {
        kind: String,
        namespace: Option<String>,
        name: String,
        body: Value,
        field_manager: String,
    }

    /// Records calls and keeps the resulting objects keyed like the API server would
    #[derive(Default)]
    struct FakeEndpoint {
        calls: Mutex<Vec<Upsert>>,
        objects: Mutex<BTreeMap<(String, Option<String>, String), Value>>,
        reject: Option<String>,
    }

    impl FakeEndpoint {
        fn rejecting(name: &str) -> Self {
            Self {
                reject: Some(name.to_string()),
                ..Default::default()
            }
        }

        fn calls(&self) -> Vec<Upsert> {
            self.calls.lock().unwrap().clone()
        }

        fn object_count(&self) -> usize {
            self.objects.lock().unwrap().len()
        }
    }

    impl ApplyEndpoint for FakeEndpoint {
        async fn upsert(
            &self,
            target: &ApplyTarget,
            name: &str,
            document: &Value,
            field_manager: &str,
        ) -> std::result::Result<(), kube::Error> {
            if self.reject.as_deref() == Some(name) {
                return Err(not_found("rejected"));
            }
            let namespace = target.namespace().map(str::to_string);
            self.calls.lock().unwrap().push(Upsert {
                kind: target.resource().kind.clone(),
                namespace: namespace.clone(),
                name: name.to_string(),
                body: document.clone(),
                field_manager: field_manager.to_string(),
            });
            self.objects
                .lock()
                .unwrap()
                .insert((target.resource().kind.clone(), namespace, name.to_string()), document.clone());
            Ok(())
        }
    }

    fn make_applier(docs: &[&str], endpoint: FakeEndpoint) -> ManifestApplier<FakeResolver, FakeEndpoint> {
        let set = ManifestSet::new(
            docs.iter()
                .enumerate()
                .map(|(i, raw)| ManifestDocument::new(*raw, format!("literal[{}]", i)))
                .collect(),
        );
        ManifestApplier::new(Arc::new(set), FakeResolver, endpoint, "ns-label-operator")
    }

    #[tokio::test]
    async fn test_apply_binds_namespaced_documents_to_target() {
        let applier = make_applier(&[CONFIG_MAP, ROLE], FakeEndpoint::default());

        let report = applier.apply("team-a").await.unwrap();

        assert!(report.is_complete());
        let calls = applier.endpoint.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].kind, "ConfigMap");
        assert_eq!(calls[0].namespace.as_deref(), Some("team-a"));
        assert_eq!(calls[0].body["metadata"]["namespace"], "team-a");
        assert_eq!(calls[1].kind, "Role");
        assert_eq!(calls[1].body["metadata"]["namespace"], "team-a");
        assert!(calls.iter().all(|c| c.field_manager == "ns-label-operator"));
    }

    #[tokio::test]
    async fn test_apply_cluster_scoped_without_namespace() {
        let applier = make_applier(&[CLUSTER_ROLE], FakeEndpoint::default());

        let report = applier.apply("team-a").await.unwrap();

        assert_eq!(report.applied(), 1);
        let calls = applier.endpoint.calls();
        assert_eq!(calls[0].namespace, None);
        assert!(calls[0].body["metadata"].get("namespace").is_none());
        let applied = report.outcomes[0].result.as_ref().unwrap();
        assert_eq!(applied.namespace, None);
    }

    #[tokio::test]
    async fn test_malformed_document_does_not_block_valid_one() {
        let applier = make_applier(&["kind: [unclosed", CONFIG_MAP], FakeEndpoint::default());

        let report = applier.apply("team-a").await.unwrap();

        assert_eq!(report.applied(), 1);
        assert_eq!(report.failed(), 1);
        assert!(matches!(report.outcomes[0].result, Err(ManifestError::Decode(_))));
        assert_eq!(applier.endpoint.calls()[0].name, "app-config");
    }

    #[tokio::test]
    async fn test_blank_fragment_is_reported_not_fatal() {
        let applier = make_applier(&["", ROLE], FakeEndpoint::default());

        let report = applier.apply("team-a").await.unwrap();

        assert!(matches!(report.outcomes[0].result, Err(ManifestError::Empty)));
        assert_eq!(report.applied(), 1);
    }

    #[tokio::test]
    async fn test_unknown_kind_is_resolution_error() {
        let applier = make_applier(&[WIDGET, ROLE], FakeEndpoint::default());

        let report = applier.apply("team-a").await.unwrap();

        match &report.outcomes[0].result {
            Err(ManifestError::Resolution { api_version, kind, .. }) => {
                assert_eq!(api_version, "example.com/v1");
                assert_eq!(kind, "Widget");
            }
            other => panic!("expected resolution error, got {:?}", other),
        }
        assert!(report.outcomes[1].result.is_ok());
    }

    #[tokio::test]
    async fn test_rejected_apply_continues_with_next_document() {
        let applier = make_applier(&[CONFIG_MAP, ROLE], FakeEndpoint::rejecting("app-config"));

        let report = applier.apply("team-a").await.unwrap();

        assert!(matches!(report.outcomes[0].result, Err(ManifestError::Apply { .. })));
        assert!(report.outcomes[1].result.is_ok());
        assert_eq!(applier.endpoint.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_apply_twice_is_idempotent() {
        let applier = make_applier(&[CONFIG_MAP, ROLE, CLUSTER_ROLE], FakeEndpoint::default());

        let first = applier.apply("team-a").await.unwrap();
        let objects_after_first = applier.endpoint.object_count();
        let second = applier.apply("team-a").await.unwrap();

        assert!(first.is_complete());
        assert!(second.is_complete());
        assert_eq!(applier.endpoint.object_count(), objects_after_first);
        assert_eq!(objects_after_first, 3);
    }

    #[tokio::test]
    async fn test_apply_preserves_manifest_order() {
        let applier = make_applier(&[ROLE, CLUSTER_ROLE, CONFIG_MAP], FakeEndpoint::default());

        let report = applier.apply("team-a").await.unwrap();

        let kinds: Vec<_> = applier.endpoint.calls().into_iter().map(|c| c.kind).collect();
        assert_eq!(kinds, vec!["Role", "ClusterRole", "ConfigMap"]);
        let indexes: Vec<_> = report.outcomes.iter().map(|o| o.index).collect();
        assert_eq!(indexes, vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn test_apply_rejects_empty_namespace() {
        let applier = make_applier(&[CONFIG_MAP], FakeEndpoint::default());
        assert!(matches!(
            applier.apply("").await,
            Err(OperatorError::InvalidTarget(_))
        ));
        assert!(applier.endpoint.calls().is_empty());
    }

    #[tokio::test]
    async fn test_apply_rejects_empty_manifest_set() {
        let applier = make_applier(&[], FakeEndpoint::default());
        assert!(matches!(
            applier.apply("team-a").await,
            Err(OperatorError::ConfigError(_))
        ));
    }
}
