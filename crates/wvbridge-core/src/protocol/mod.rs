//! Protocol modules.
//!
//! - `envelope`: the tagged `{type, body}` unit exchanged over the channel.
//! - `codec`: string encode/decode for envelopes (panic-free).
//! - `correlation`: event id minting and the `method-eventId` correlation key.
//!
//! All parsers report malformed input as `BridgeError` instead of panicking,
//! keeping the receive path resilient to whatever the web content posts.

pub mod codec;
pub mod correlation;
pub mod envelope;

pub use codec::{decode, encode};
pub use correlation::{correlation_key, new_event_id};
pub use envelope::{
    BridgeCall, Envelope, FallbackBody, LogBody, RegisterWebMethod, WebMethodError,
    WebMethodResponse,
};
