// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Test utilities for mocking Kubernetes API responses.

use bytes::Bytes;
use http::{Request, Response};
use http_body_util::BodyExt;
use kube::client::Body;
use kube::Client;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tower::Service;

/// A request received by the mock API server
#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: String,
    pub body: Bytes,
}

impl RecordedRequest {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).unwrap()
    }
}

/// A mock HTTP service that returns predefined responses based on request paths.
#[derive(Clone)]
pub struct MockService {
    responses: Arc<Mutex<HashMap<(String, String), (u16, String)>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockService {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(HashMap::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Add a response for GET requests matching the exact path
    pub fn on_get(self, path: &str, status: u16, body: &str) -> Self {
        self.on("GET", path, status, body)
    }

    /// Add a response for PATCH requests matching the exact path
    pub fn on_patch(self, path: &str, status: u16, body: &str) -> Self {
        self.on("PATCH", path, status, body)
    }

    fn on(self, method: &str, path: &str, status: u16, body: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert((method.to_string(), path.to_string()), (status, body.to_string()));
        self
    }

    /// Requests received so far, in arrival order
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Build a kube Client from this mock service. The service stays usable
    /// for inspecting recorded requests.
    pub fn client(&self) -> Client {
        Client::new(self.clone(), "default")
    }

    fn find_response(&self, method: &str, path: &str) -> Option<(u16, String)> {
        let responses = self.responses.lock().unwrap();

        if let Some(resp) = responses.get(&(method.to_string(), path.to_string())) {
            return Some(resp.clone());
        }

        for ((m, p), resp) in responses.iter() {
            if m == method && path.starts_with(p) {
                return Some(resp.clone());
            }
        }

        None
    }
}

impl Default for MockService {
    fn default() -> Self {
        Self::new()
    }
}

impl Service<Request<Body>> for MockService {
    type Response = Response<Body>;
    type Error = tower::BoxError;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let method = req.method().to_string();
        let path = req.uri().path().to_string();
        let query = req.uri().query().unwrap_or_default().to_string();

        let response = self.find_response(&method, &path);
        let requests = self.requests.clone();

        Box::pin(async move {
            let body = req
                .into_body()
                .collect()
                .await
                .map_err(Into::<tower::BoxError>::into)?
                .to_bytes();
            requests.lock().unwrap().push(RecordedRequest {
                method,
                path,
                query,
                body,
            });

            let (status, body) = response.unwrap_or_else(|| (404, not_found_json("resource", "unknown")));
            Ok::<_, tower::BoxError>(
                Response::builder()
                    .status(status)
                    .header("content-type", "application/json")
                    .body(Body::from(body.into_bytes()))
                    .unwrap(),
            )
        })
    }
}

/// APIResourceList for a group version with a single resource
pub fn api_resource_list_json(group_version: &str, plural: &str, kind: &str, namespaced: bool) -> String {
    serde_json::json!({
        "kind": "APIResourceList",
        "apiVersion": "v1",
        "groupVersion": group_version,
        "resources": [{
            "name": plural,
            "singularName": "",
            "namespaced": namespaced,
            "kind": kind,
            "verbs": ["create", "delete", "get", "list", "patch", "update", "watch"]
        }]
    })
    .to_string()
}

/// An object as echoed back by the API server after an apply
pub fn object_json(api_version: &str, kind: &str, name: &str, namespace: Option<&str>) -> String {
    let mut metadata = serde_json::json!({ "name": name, "uid": "test-uid" });
    if let Some(ns) = namespace {
        metadata["namespace"] = serde_json::Value::String(ns.to_string());
    }
    serde_json::json!({
        "apiVersion": api_version,
        "kind": kind,
        "metadata": metadata
    })
    .to_string()
}

/// Create a 404 not found response
pub fn not_found_json(resource: &str, name: &str) -> String {
    serde_json::json!({
        "kind": "Status",
        "apiVersion": "v1",
        "status": "Failure",
        "message": format!("{} \"{}\" not found", resource, name),
        "reason": "NotFound",
        "code": 404
    })
    .to_string()
}
