//! Envelope <-> string codec.
//!
//! The channel only carries strings, so envelopes travel as compact JSON.
//! `serde_json` handles quoting and nested values, which keeps the encoding
//! lossless for every JSON-representable payload.

use crate::error::{BridgeError, Result};
use crate::protocol::envelope::Envelope;

/// Serialize an envelope into a single channel-safe string.
pub fn encode(env: &Envelope) -> Result<String> {
    serde_json::to_string(env)
        .map_err(|e| BridgeError::Internal(format!("envelope encode failed: {e}")))
}

/// Parse a raw channel string back into an envelope.
pub fn decode(raw: &str) -> Result<Envelope> {
    serde_json::from_str(raw)
        .map_err(|e| BridgeError::MalformedEnvelope(format!("invalid envelope json: {e}")))
}
