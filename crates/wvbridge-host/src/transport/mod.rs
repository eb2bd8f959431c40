//! Transport layer.
//!
//! The embedded surface gives us one string channel in each direction. This
//! module defines the outbound half as a trait, the per-connection slot holding
//! it, and the decode-once codec applied to inbound strings.

pub mod channel;
pub mod codec;

use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;

use wvbridge_core::error::{BridgeError, Result};
use wvbridge_core::protocol::{encode, Envelope};

pub use channel::ChannelTransport;

/// Outbound half of the channel into the web context.
///
/// Implementations move opaque strings (an encoded envelope or a script to
/// evaluate) and must not interpret them. No ordering or delivery guarantee is
/// assumed by the bridge.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    async fn send(&self, payload: String) -> Result<()>;
}

/// Per-connection holder for the transport handle.
/// Empty until the embedded surface is mounted.
#[derive(Clone, Default)]
pub struct TransportSlot {
    inner: Arc<RwLock<Option<Arc<dyn Transport>>>>,
}

impl TransportSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&self, transport: Arc<dyn Transport>) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = Some(transport);
    }

    pub fn detach(&self) -> Option<Arc<dyn Transport>> {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    pub fn is_attached(&self) -> bool {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Current transport, or `NotReady` when nothing is attached.
    pub fn get(&self) -> Result<Arc<dyn Transport>> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or_else(|| BridgeError::NotReady("transport not attached".into()))
    }

    pub async fn send_envelope(&self, env: &Envelope) -> Result<()> {
        let raw = encode(env)?;
        let transport = self.get()?;
        transport.send(raw).await
    }
}
