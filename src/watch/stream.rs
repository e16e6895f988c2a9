// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Messages from a change stream to the watch controller

use crate::types::ResourceObservation;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Events that a change stream sends to the NamespaceWatch
#[derive(Debug, Clone, PartialEq)]
pub enum WatchMessage {
    /// The initial list of namespaces has been received
    Synced,
    /// A namespace was created or updated. `old` is absent for new namespaces.
    Updated {
        old: Option<ResourceObservation>,
        new: ResourceObservation,
    },
}

/// Source of namespace updates. Dropping the sender ends the watch.
pub trait ChangeStream {
    fn subscribe(self, events: mpsc::Sender<WatchMessage>) -> StreamHandle;
}

/// Handle to the task feeding a subscription
pub struct StreamHandle {
    task: JoinHandle<()>,
}

impl StreamHandle {
    pub fn new(task: JoinHandle<()>) -> Self {
        Self { task }
    }

    pub fn stop(self) {
        self.task.abort();
    }
}
