//! Creates a backend with one server against a live OPNsense, reads both
//! back, then removes them again.
//!
//! OPNSENSE_URI, OPNSENSE_API_KEY and OPNSENSE_API_SECRET must be set.

use opnsense::haproxy::backend::BackendModel;
use opnsense::haproxy::server::ServerModel;
use opnsense::haproxy::{decode, Backend, DecodeMode, HaproxyKind, ListEncoding, Server};
use std::collections::BTreeSet;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_target(false)
        .init();

    let uri = std::env::var("OPNSENSE_URI")?;
    let api_key = std::env::var("OPNSENSE_API_KEY")?;
    let api_secret = std::env::var("OPNSENSE_API_SECRET")?;
    let insecure = std::env::var("OPNSENSE_ALLOW_UNVERIFIED_TLS")
        .map(|v| v == "1" || v == "true")
        .unwrap_or(false);

    let client = opnsense::api::Client::new(&uri, &api_key, &api_secret, insecure)?;
    let haproxy = client.haproxy();

    let server = ServerModel {
        name: "demo_web1".to_string(),
        address: "10.0.0.11".to_string(),
        port: 8080,
        ..ServerModel::default()
    };
    let server_id = haproxy
        .add(&Server::to_remote(&server, ListEncoding::CommaJoined))
        .await?;
    info!("Created server {}", server_id);

    let backend = BackendModel {
        name: "demo_pool".to_string(),
        linked_servers: BTreeSet::from([server_id.clone()]),
        ..BackendModel::default()
    };
    let backend_id = haproxy
        .add(&Backend::to_remote(&backend, ListEncoding::CommaJoined))
        .await?;
    info!("Created backend {}", backend_id);
    haproxy.reconfigure().await?;

    let remote = haproxy.get::<<Backend as HaproxyKind>::Remote>(&backend_id).await?;
    let decoded = decode::<Backend>(&remote, DecodeMode::Lenient)?;
    for warning in &decoded.warnings {
        warn!("{}", warning);
    }
    if decoded.value == backend {
        info!("Backend {} reads back unchanged", backend_id);
    } else {
        warn!("Backend {} drifted: {:#?}", backend_id, decoded.value);
    }

    haproxy
        .delete::<<Backend as HaproxyKind>::Remote>(&backend_id)
        .await?;
    haproxy
        .delete::<<Server as HaproxyKind>::Remote>(&server_id)
        .await?;
    haproxy.reconfigure().await?;
    info!("Removed demo objects");

    Ok(())
}
