//! `tanks_shared`
//!
//! Shared libraries used by both client and relay server.
//!
//! Design goals:
//! - Deterministic and modular where practical.
//! - Clear separation of concerns (net, math, assets, scene, config).
//! - Traits for abstraction and dependency injection.
//! - No `unsafe`.

pub mod assets;
pub mod config;
pub mod math;
pub mod net;
pub mod render;
pub mod scene;

pub mod prelude {
    //! Commonly used exports.

    pub use crate::config::*;
    pub use crate::math::*;
    pub use crate::net::*;
    pub use crate::scene::*;
}
