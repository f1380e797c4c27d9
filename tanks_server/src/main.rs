//! Standalone relay binary.
//!
//! Usage:
//!   cargo run -p tanks_server -- [--addr 127.0.0.1:9000]
//!
//! Accepts client connections, greets each with `initial`, and logs every
//! frame it receives.

use std::env;
use std::net::SocketAddr;

use anyhow::Context;
use tanks_server::Relay;
use tracing::info;

fn parse_args() -> String {
    let mut addr = "127.0.0.1:9000".to_string();
    let args: Vec<String> = env::args().collect();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--addr" if i + 1 < args.len() => {
                addr = args[i + 1].clone();
                i += 2;
            }
            _ => i += 1,
        }
    }
    addr
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    let addr: SocketAddr = parse_args().parse().context("parse addr")?;
    let relay = Relay::bind(addr).await.context("bind relay")?;
    info!(local = %relay.local_addr()?, "Relay listening");

    relay.run().await
}
