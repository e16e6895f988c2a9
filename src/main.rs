// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::{Context, Result};
use kube::Client;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use ns_label_operator::apply::ManifestApplier;
use ns_label_operator::config::Config;
use ns_label_operator::constants::OPERATOR_NAME;
use ns_label_operator::kubernetes::{DiscoveryResolver, KubeEndpoint, NamespaceStream};
use ns_label_operator::manifests::ManifestSet;
use ns_label_operator::trigger::TriggerRule;
use ns_label_operator::watch::NamespaceWatch;

fn init_tracing(config: &Config) {
    let default_level = if config.debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    if config.log_json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = Config::from_env()?;
    init_tracing(&config);

    info!("Starting {}", OPERATOR_NAME);
    info!(
        "Configuration loaded: label={}, config_dir={:?}, field_manager={}",
        config.label, config.manifest_dir, config.field_manager
    );

    let manifests = ManifestSet::load(config.manifest_dir.as_deref(), &config.manifests)
        .context("Failed to load manifests")?;

    // Create Kubernetes client
    let client = Client::try_default().await?;
    info!("Connected to Kubernetes cluster");

    let applier = ManifestApplier::new(
        Arc::new(manifests),
        DiscoveryResolver::new(client.clone()),
        KubeEndpoint::new(client.clone(), config.force_conflicts),
        config.field_manager.clone(),
    );
    let watch = NamespaceWatch::new(TriggerRule::new(config.label.clone())?, applier, config.sync_timeout)?;

    let stop = watch.stop_handle();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => stop.stop(),
            Err(e) => error!("Failed to listen for shutdown signal: {}", e),
        }
    });

    watch.start(NamespaceStream::new(client)).await?;

    info!("{} stopped", OPERATOR_NAME);
    Ok(())
}
