//! Client-side connection handling.
//!
//! Wraps a [`FramedConn`] with the join-time handshake: the relay greets
//! every new connection with an `initial` message, and `connect` does not
//! resolve until that greeting arrives. Transport failures before the
//! greeting abort the connect; failures after it are the caller's to log.
//! There is no reconnection logic.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Context;
use tanks_shared::net::{FramedConn, Msg};
use tracing::{debug, info};

pub struct Connection {
    conn: FramedConn,
}

impl Connection {
    /// Opens the transport and waits for the server's `initial` greeting.
    pub async fn connect(addr: &str) -> anyhow::Result<Self> {
        let addr: SocketAddr = addr.parse().context("parse server addr")?;
        let mut conn = FramedConn::connect(addr).await?;

        // Frames other than `initial` must not be dropped while waiting;
        // the relay sends the greeting first, so the first frame is it.
        let greeting = conn.recv().await.context("await initial")?;
        match greeting {
            Msg::Initial(data) => {
                debug!(?data, "Received initial greeting");
            }
            other => anyhow::bail!("expected initial, got {other:?}"),
        }

        info!(server = %addr, "Socket opened");
        Ok(Self { conn })
    }

    pub async fn send(&mut self, msg: &Msg) -> anyhow::Result<()> {
        self.conn.send(msg).await
    }

    /// Polls for one inbound message without blocking the loop.
    pub async fn poll(&mut self, timeout: Duration) -> anyhow::Result<Option<Msg>> {
        self.conn.recv_timeout(timeout).await
    }

    pub fn peer_addr(&self) -> anyhow::Result<SocketAddr> {
        self.conn.peer_addr()
    }
}
