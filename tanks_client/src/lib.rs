//! `tanks_client`
//!
//! Client-side systems:
//! - Connection handling (join handshake over the framed socket)
//! - Input sampling with capture gating
//! - Local vehicle integration
//! - Camera (observer free-fly / vehicle follow) and turret slaving
//! - Remote entity registry reconciling world snapshots
//! - Session controller tying it all together

pub mod camera;
pub mod connection;
pub mod input;
pub mod registry;
pub mod session;
pub mod vehicle;

pub use session::GameSession;
