//! Call identifiers and correlation keys.
//!
//! A call is paired with its response through the topic `method-eventId`.
//! Event ids are random v4 UUIDs, so two in-flight calls to the same method
//! never share a key.

use uuid::Uuid;

/// Mint a fresh call identifier.
pub fn new_event_id() -> String {
    Uuid::new_v4().to_string()
}

/// Emitter topic pairing one call with its one response.
pub fn correlation_key(method: &str, event_id: &str) -> String {
    format!("{method}-{event_id}")
}
