//! Wire protocol and framed connections.
//!
//! Every message is one JSON object `{"type": ..., "data": ...}` carried in
//! a length-prefixed frame over TCP. The `type`/`data` envelope is realized
//! as an adjacently tagged serde enum so the wire shape stays exact while
//! the code works with typed variants.
//!
//! Unknown message types decode into [`Msg::Unknown`]; callers log and drop
//! them, they are never a protocol error.

use anyhow::Context;
use bytes::{BufMut, BytesMut};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
    time,
};

use crate::math::Vec2;

/// Server-assigned entity identifier. Opaque to the client; never minted or
/// reused locally.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub String);

impl EntityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

/// One tank's authoritative state inside a world snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TankState {
    pub id: EntityId,
    pub pos: Vec2,
    /// Hull heading, radians.
    pub dir: f32,
    /// Turret heading, radians.
    #[serde(rename = "turDir")]
    pub tur_dir: f32,
}

/// Authoritative world state pushed by the server. Each snapshot fully
/// replaces the previous one; there is no interpolation or extrapolation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct WorldSnapshot {
    pub tanks: Vec<TankState>,
}

/// Protocol message envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum Msg {
    /// Client -> server: announce player name after connect.
    Join { name: String },
    /// Client -> server: periodic input intent sample.
    Input {
        direction: i32,
        acceleration: i32,
        #[serde(rename = "viewDirection")]
        view_direction: f32,
    },
    /// Server -> client: authoritative snapshot, replaces the prior one.
    World(WorldSnapshot),
    /// Server -> client: which entity id is the locally controlled one.
    Tank { id: EntityId },
    /// Server -> client: greeting sent immediately on connect; resolves the
    /// client's connect handshake.
    Initial(serde_json::Value),
    /// Any message type this build does not know about.
    #[serde(other)]
    Unknown,
}

/// Serializes a message to its wire bytes.
pub fn encode(msg: &Msg) -> anyhow::Result<Vec<u8>> {
    serde_json::to_vec(msg).context("serialize msg")
}

/// Deserializes a message from wire bytes.
pub fn decode(bytes: &[u8]) -> anyhow::Result<Msg> {
    serde_json::from_slice(bytes).context("deserialize msg")
}

/// Persistent duplex connection carrying length-prefixed JSON frames.
#[derive(Debug)]
pub struct FramedConn {
    stream: TcpStream,
}

impl FramedConn {
    pub fn new(stream: TcpStream) -> Self {
        Self { stream }
    }

    pub async fn connect(addr: SocketAddr) -> anyhow::Result<Self> {
        let stream = TcpStream::connect(addr).await.context("tcp connect")?;
        Ok(Self::new(stream))
    }

    pub async fn send(&mut self, msg: &Msg) -> anyhow::Result<()> {
        let payload = encode(msg)?;
        let mut buf = BytesMut::with_capacity(4 + payload.len());
        buf.put_u32(payload.len() as u32);
        buf.extend_from_slice(&payload);
        self.stream.write_all(&buf).await.context("tcp write")?;
        Ok(())
    }

    pub async fn recv(&mut self) -> anyhow::Result<Msg> {
        let mut len_buf = [0u8; 4];
        self.stream
            .read_exact(&mut len_buf)
            .await
            .context("tcp read len")?;
        let len = u32::from_be_bytes(len_buf) as usize;
        let mut payload = vec![0u8; len];
        self.stream
            .read_exact(&mut payload)
            .await
            .context("tcp read payload")?;
        decode(&payload)
    }

    /// Receives one message within the given timeout, or `None` on timeout.
    pub async fn recv_timeout(
        &mut self,
        timeout: std::time::Duration,
    ) -> anyhow::Result<Option<Msg>> {
        match time::timeout(timeout, self.recv()).await {
            Ok(Ok(msg)) => Ok(Some(msg)),
            Ok(Err(e)) => Err(e),
            Err(_) => Ok(None),
        }
    }

    pub fn peer_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(self.stream.peer_addr()?)
    }
}

/// TCP listener for the relay side.
pub struct Listener {
    listener: TcpListener,
}

impl Listener {
    pub async fn bind(addr: SocketAddr) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(addr).await.context("tcp bind")?;
        Ok(Self { listener })
    }

    pub async fn accept(&self) -> anyhow::Result<(FramedConn, SocketAddr)> {
        let (stream, addr) = self.listener.accept().await.context("tcp accept")?;
        Ok((FramedConn::new(stream), addr))
    }

    pub fn local_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }
}
