//! Kruise gateway binary.
//!
//! Serves CloneSets and SidecarSets from a local watch cache and forwards
//! writes to the Kubernetes API server.

use kube::Client;
use kruise_gateway::backend::KubeBackend;
use kruise_gateway::cache::WatchCaches;
use kruise_gateway::config::GatewayConfig;
use kruise_gateway::operator::Operator;
use kruise_gateway::resource::{ResourceRegistry, cloneset_accessor, sidecarset_accessor};
use kruise_gateway::server::Gateway;
use std::sync::Arc;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("kruise_gateway=info".parse()?)
                .add_directive("kube=info".parse()?),
        )
        .init();

    let config = GatewayConfig::from_env()?;
    tracing::info!(
        addr = %config.listen_addr(),
        owner_header = %config.owner_header,
        owner_label = %config.owner_label,
        "Starting Kruise gateway"
    );

    let client = Client::try_default().await?;
    tracing::info!("Connected to Kubernetes cluster");

    let caches = WatchCaches::start(client.clone());
    let registry = ResourceRegistry::builder()
        .register(cloneset_accessor(caches.clonesets.clone()))?
        .register(sidecarset_accessor(caches.sidecarsets.clone()))?
        .build();
    let operator = Operator::new(
        Arc::new(registry),
        Arc::new(KubeBackend::new(client)),
        Arc::new(caches.pods.clone()),
    );

    let listener = TcpListener::bind(config.listen_addr()).await?;
    let gateway = Gateway::new(operator, config);
    let server = tokio::spawn(gateway.clone().serve(listener, shutdown_signal()));

    caches.wait_until_ready().await?;
    gateway.mark_ready();

    server.await??;
    tracing::info!("Gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
