// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Namespace change stream backed by a kube watcher

use crate::types::ResourceObservation;
use crate::watch::{ChangeStream, StreamHandle, WatchMessage};
use futures::StreamExt;
use k8s_openapi::api::core::v1::Namespace;
use kube::{
    runtime::{watcher::Event, WatchStreamExt},
    Api, Client, ResourceExt,
};
use kube_runtime::watcher::{self, Config as WatcherConfig};
use std::collections::HashMap;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Last observed state of every namespace, used to pair updates with the
/// state they replace.
#[derive(Debug, Default)]
pub struct ObservationCache {
    known: HashMap<String, ResourceObservation>,
    relist: Option<HashMap<String, ResourceObservation>>,
    synced: bool,
}

impl ObservationCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_synced(&self) -> bool {
        self.synced
    }

    pub fn get(&self, name: &str) -> Option<&ResourceObservation> {
        self.known.get(name)
    }

    pub fn len(&self) -> usize {
        self.known.len()
    }

    pub fn is_empty(&self) -> bool {
        self.known.is_empty()
    }

    /// Fold a watcher event into the cache, returning the message to forward
    /// to the watch controller, if any.
    ///
    /// Objects from the first list are recorded without an update. Objects
    /// from later re-lists are compared against the previous state.
    pub fn handle(&mut self, event: Event<Namespace>) -> Option<WatchMessage> {
        match event {
            Event::Init => {
                self.relist = Some(HashMap::new());
                None
            }
            Event::InitApply(ns) => {
                let new = ResourceObservation::from(&ns);
                let old = self.known.get(&new.name).cloned();
                self.relist
                    .get_or_insert_with(HashMap::new)
                    .insert(new.name.clone(), new.clone());
                if self.synced {
                    Some(WatchMessage::Updated { old, new })
                } else {
                    None
                }
            }
            Event::InitDone => {
                if let Some(relist) = self.relist.take() {
                    self.known = relist;
                }
                if self.synced {
                    None
                } else {
                    self.synced = true;
                    Some(WatchMessage::Synced)
                }
            }
            Event::Apply(ns) => {
                let new = ResourceObservation::from(&ns);
                let old = self.known.insert(new.name.clone(), new.clone());
                Some(WatchMessage::Updated { old, new })
            }
            Event::Delete(ns) => {
                let name = ns.name_any();
                debug!("Namespace {} deleted", name);
                self.known.remove(&name);
                None
            }
        }
    }
}

/// Watches every namespace in the cluster
pub struct NamespaceStream {
    client: Client,
    config: WatcherConfig,
}

impl NamespaceStream {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            config: WatcherConfig::default(),
        }
    }
}

impl ChangeStream for NamespaceStream {
    fn subscribe(self, events: mpsc::Sender<WatchMessage>) -> StreamHandle {
        let namespaces: Api<Namespace> = Api::all(self.client);
        let stream = watcher::watcher(namespaces, self.config).default_backoff();

        StreamHandle::new(tokio::spawn(async move {
            info!("Watching namespaces");
            let mut cache = ObservationCache::new();
            let mut stream = std::pin::pin!(stream);

            while let Some(event) = stream.next().await {
                let event = match event {
                    Ok(event) => event,
                    Err(e) => {
                        warn!("Namespace watch error: {}", e);
                        continue;
                    }
                };

                if let Some(message) = cache.handle(event) {
                    if events.send(message).await.is_err() {
                        debug!("Namespace watch receiver dropped");
                        return;
                    }
                }
            }
            warn!("Namespace watch stream ended");
        }))
    }
}
