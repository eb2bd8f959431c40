//! webview-bridge core: transport-agnostic wire contracts and error types.
//!
//! This crate defines the envelope format exchanged between the native host and
//! the embedded web content, the correlation key scheme used to pair a call with
//! its response, and the error surface shared by the host runtime. It carries no
//! runtime or transport dependencies so the same contracts can be reused by any
//! host embedding.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! Everything coming off the channel is untrusted; malformed input surfaces as
//! `BridgeError::MalformedEnvelope` instead of crashing the receiver.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod protocol;

/// Shared result type.
pub use error::{BridgeError, Result};
