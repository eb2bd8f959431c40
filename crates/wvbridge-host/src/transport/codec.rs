//! Decode-once codec for inbound channel strings.
//!
//! - Valid JSON envelope => `Inbound`
//! - Anything else => `BridgeError::MalformedEnvelope` (callers log and drop)

use wvbridge_core::{
    error::Result,
    protocol::{self, Envelope},
};

#[derive(Debug)]
pub struct Inbound {
    pub env: Envelope,
    pub bytes_len: usize,
}

pub fn decode(raw: &str) -> Result<Inbound> {
    let bytes_len = raw.len();
    let env = protocol::decode(raw)?;
    Ok(Inbound { env, bytes_len })
}
