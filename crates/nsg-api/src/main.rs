//! nsg-apid — materialize a declarative slice model and serve the control
//! plane.
//!
//! ```text
//! nsg-apid <model.json> [addr]
//! ```
//!
//! The model file is the declarative bundle (`networks` + `topology`)
//! produced by the orchestrator's export; the default listen address is
//! 0.0.0.0:5555.

use std::net::SocketAddr;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use nsg_orchestrator::{spawn_control, ModelFile, SliceOrchestrator};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let path = std::env::args()
        .nth(1)
        .context("usage: nsg-apid <model.json> [addr]")?;
    let addr: SocketAddr = std::env::args()
        .nth(2)
        .unwrap_or_else(|| "0.0.0.0:5555".to_string())
        .parse()
        .context("listen address")?;

    let raw = std::fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;
    let model: ModelFile = serde_json::from_str(&raw).with_context(|| format!("parsing {path}"))?;

    let (orchestrator, deployment) = SliceOrchestrator::from_model(model)?;
    info!(
        networks = deployment.networks.len(),
        links = deployment.links.values().map(Vec::len).sum::<usize>(),
        "model materialized"
    );

    let (handle, join) = spawn_control(orchestrator);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "control plane listening");

    nsg_api::serve(listener, handle.clone()).await?;

    // Undeploy: stop the owner thread and discard the in-memory state.
    handle.shutdown();
    let _ = join.join();
    info!("undeployed");
    Ok(())
}
