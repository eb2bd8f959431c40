//! In-process transport backed by a tokio mpsc channel.
//!
//! Whatever the bridge sends shows up on the paired receiver, which makes it
//! the transport of choice for tests and for hosts that pump the webview
//! channel from their own event loop.

use async_trait::async_trait;
use tokio::sync::mpsc;

use wvbridge_core::error::{BridgeError, Result};

use super::Transport;

pub struct ChannelTransport {
    tx: mpsc::UnboundedSender<String>,
}

impl ChannelTransport {
    /// Create a transport and the receiver observing everything it sends.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn from_sender(tx: mpsc::UnboundedSender<String>) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl Transport for ChannelTransport {
    async fn send(&self, payload: String) -> Result<()> {
        self.tx
            .send(payload)
            .map_err(|_| BridgeError::Transport("channel closed".into()))
    }
}
