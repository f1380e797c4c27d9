//! `tanks_server`
//!
//! The relay stub:
//! - Accepts framed connections
//! - Greets each with an `initial` message
//! - Logs inbound frames
//!
//! The actual world simulation lives behind this wire contract and is
//! out of scope here.

pub mod relay;

pub use relay::Relay;
