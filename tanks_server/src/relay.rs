//! Relay implementation.
//!
//! The relay is deliberately thin: it accepts connections, greets each one
//! with an `initial` message (which resolves the client's connect
//! handshake), and logs whatever arrives. It is the wire contract the
//! client core depends on, not a simulation. Tests drive the accepted
//! [`RelayClient`] directly to push `tank`/`world` frames.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use anyhow::Context;
use serde_json::json;
use tanks_shared::net::{FramedConn, Listener, Msg};
use tracing::{debug, info, warn};

/// One accepted connection, already greeted.
pub struct RelayClient {
    conn: FramedConn,
    /// Display name from the `join` message, once received.
    pub name: Option<String>,
}

impl RelayClient {
    pub async fn send(&mut self, msg: &Msg) -> anyhow::Result<()> {
        self.conn.send(msg).await
    }

    pub async fn recv(&mut self) -> anyhow::Result<Msg> {
        let msg = self.conn.recv().await?;
        if let Msg::Join { name } = &msg {
            info!(name = %name, "Player joined");
            self.name = Some(name.clone());
        }
        Ok(msg)
    }

    pub fn peer_addr(&self) -> anyhow::Result<SocketAddr> {
        self.conn.peer_addr()
    }
}

pub struct Relay {
    listener: Listener,
}

impl Relay {
    pub async fn bind(addr: SocketAddr) -> anyhow::Result<Self> {
        let listener = Listener::bind(addr).await?;
        Ok(Self { listener })
    }

    pub fn local_addr(&self) -> anyhow::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accepts one connection and sends the `initial` greeting.
    pub async fn accept(&self) -> anyhow::Result<RelayClient> {
        let (mut conn, peer) = self.listener.accept().await?;
        info!(%peer, "New connection");

        conn.send(&Msg::Initial(json!({ "you": "hello" })))
            .await
            .context("send initial")?;

        Ok(RelayClient { conn, name: None })
    }

    /// Accept loop for the standalone binary: every connection gets its
    /// own task that logs inbound frames until the socket closes.
    pub async fn run(&self) -> anyhow::Result<()> {
        loop {
            let client = self.accept().await?;
            tokio::spawn(async move {
                log_frames(client).await;
            });
        }
    }
}

async fn log_frames(mut client: RelayClient) {
    loop {
        match client.recv().await {
            Ok(Msg::Join { .. }) => {} // already logged by recv
            Ok(msg) => {
                debug!(?msg, "Message");
            }
            Err(e) => {
                warn!(error = %e, "Connection closed");
                break;
            }
        }
    }
}

/// Helper for tests: bind to an ephemeral localhost port.
pub async fn bind_ephemeral() -> anyhow::Result<(Relay, SocketAddr)> {
    let bind = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 0);
    let relay = Relay::bind(bind).await?;
    let addr = relay.local_addr()?;
    Ok((relay, addr))
}
