//! webview-bridge host runtime.
//!
//! This crate wires the transport adapter, the native method registry, the
//! call-correlation plumbing and the handshake-built web method proxy into a
//! per-connection [`Bridge`]. It is consumed by the demo binary (`main.rs`) and
//! by integration tests.

pub mod bridge;
pub mod config;
pub mod dispatch;
pub mod events;
pub mod integrations;
pub mod transport;
pub mod web_method;

pub use bridge::{Bridge, BridgeBuilder, FallbackFn};
