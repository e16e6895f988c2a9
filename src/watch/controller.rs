// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Namespace watch - applies the manifest set when the trigger label appears.

use crate::apply::{ApplyEndpoint, ManifestApplier, ResourceResolver};
use crate::constants::{watch::EVENT_CHANNEL_CAPACITY, OPERATOR_NAME};
use crate::error::{OperatorError, Result};
use crate::trigger::{Decision, TriggerRule};
use crate::types::ResourceObservation;
use crate::watch::stream::{ChangeStream, WatchMessage};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, instrument, warn};

/// Handle to stop a running NamespaceWatch
#[derive(Clone)]
pub struct StopHandle {
    stop_tx: Arc<watch::Sender<bool>>,
}

impl StopHandle {
    /// Stop the watch after the event being processed, if any, completes
    pub fn stop(&self) {
        info!("Stopping {}", OPERATOR_NAME);
        self.stop_tx.send_replace(true);
    }
}

pub struct NamespaceWatch<R, E> {
    rule: TriggerRule,
    applier: ManifestApplier<R, E>,
    sync_timeout: Duration,
    stop_tx: Arc<watch::Sender<bool>>,
}

impl<R: ResourceResolver, E: ApplyEndpoint> NamespaceWatch<R, E> {
    pub fn new(rule: TriggerRule, applier: ManifestApplier<R, E>, sync_timeout: Duration) -> Result<Self> {
        if applier.manifests().is_empty() {
            return Err(OperatorError::ConfigError("at least one manifest document required".to_string()));
        }

        let (stop_tx, _) = watch::channel(false);
        Ok(Self {
            rule,
            applier,
            sync_timeout,
            stop_tx: Arc::new(stop_tx),
        })
    }

    /// The label this watch is monitoring
    pub fn label(&self) -> &str {
        self.rule.label_key()
    }

    /// Field manager that owns every object applied by this watch
    pub fn field_manager(&self) -> &str {
        self.applier.field_manager()
    }

    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            stop_tx: self.stop_tx.clone(),
        }
    }

    /// Subscribe to `stream` and process updates until stopped.
    ///
    /// Fails if the stream does not sync within the configured timeout or
    /// closes while the watch is running.
    pub async fn start<S: ChangeStream>(&self, stream: S) -> Result<()> {
        info!("Starting {} for label {}", OPERATOR_NAME, self.label());

        let (event_tx, mut event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let mut stop_rx = self.stop_tx.subscribe();
        let handle = stream.subscribe(event_tx);

        let result = self.run(&mut event_rx, &mut stop_rx).await;
        handle.stop();

        match &result {
            Ok(()) => info!("Namespace watch stopped"),
            Err(e) => error!("Namespace watch failed: {}", e),
        }
        result
    }

    async fn run(
        &self,
        event_rx: &mut mpsc::Receiver<WatchMessage>,
        stop_rx: &mut watch::Receiver<bool>,
    ) -> Result<()> {
        if *stop_rx.borrow_and_update() {
            return Ok(());
        }

        if !self.wait_for_sync(event_rx, stop_rx).await? {
            return Ok(());
        }
        info!("Namespace watch synced, listening for label changes...");

        loop {
            tokio::select! {
                changed = stop_rx.changed() => {
                    if changed.is_err() || *stop_rx.borrow() {
                        return Ok(());
                    }
                }
                message = event_rx.recv() => match message {
                    Some(message) => self.handle_message(message).await,
                    None => return Err(OperatorError::StreamClosed),
                },
            }
        }
    }

    /// Returns false when stopped before the stream synced
    async fn wait_for_sync(
        &self,
        event_rx: &mut mpsc::Receiver<WatchMessage>,
        stop_rx: &mut watch::Receiver<bool>,
    ) -> Result<bool> {
        let deadline = tokio::time::sleep(self.sync_timeout);
        tokio::pin!(deadline);

        loop {
            tokio::select! {
                _ = &mut deadline => {
                    return Err(OperatorError::SyncTimeout(self.sync_timeout));
                }
                changed = stop_rx.changed() => {
                    if changed.is_err() || *stop_rx.borrow() {
                        return Ok(false);
                    }
                }
                message = event_rx.recv() => match message {
                    Some(WatchMessage::Synced) => return Ok(true),
                    Some(message) => self.handle_message(message).await,
                    None => return Err(OperatorError::StreamClosed),
                },
            }
        }
    }

    async fn handle_message(&self, message: WatchMessage) {
        match message {
            WatchMessage::Synced => debug!("Change stream re-synced"),
            WatchMessage::Updated { old, new } => self.handle_update(old.as_ref(), &new).await,
        }
    }

    #[instrument(skip(self, old, new), fields(namespace = %new.name))]
    async fn handle_update(&self, old: Option<&ResourceObservation>, new: &ResourceObservation) {
        debug!("Processing namespace");

        let namespace = match self.rule.decide(old, Some(new)) {
            Decision::Fire(ns) => ns,
            Decision::Skip(reason) => {
                debug!("Skipping namespace: {}", reason);
                return;
            }
        };

        info!("Trigger {} set, applying manifests", self.label());
        match self.applier.apply(&namespace.name).await {
            Ok(report) if report.is_complete() => {
                info!("Trigger {} applied {} manifests", self.label(), report.applied());
            }
            Ok(report) => {
                warn!(
                    "Trigger {} applied {} of {} manifests, {} failed",
                    self.label(),
                    report.applied(),
                    report.outcomes.len(),
                    report.failed()
                );
            }
            Err(e) => error!("Error running trigger {}: {}", self.label(), e),
        }
    }
}
