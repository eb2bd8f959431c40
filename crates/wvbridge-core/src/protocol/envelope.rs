//! Wire envelope (JSON).
//!
//! Every message on the channel is `{"type": <kind>, "body": <kind-specific>}`.
//! Bodies tolerate unknown extra fields so that newer web bundles can add data
//! without breaking older hosts; an unknown `type` is malformed.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One message on the channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "body", rename_all = "camelCase")]
pub enum Envelope {
    /// Console call forwarded from the web context.
    Log(LogBody),
    /// Invocation of a method exposed by the receiving side.
    Bridge(BridgeCall),
    /// Handshake: the web side declares the methods it implements.
    RegisterWebMethod(RegisterWebMethod),
    /// Successful result of a `bridge` invocation.
    WebMethodResponse(WebMethodResponse),
    /// Failed `bridge` invocation (no detail crosses the boundary).
    WebMethodError(WebMethodError),
    /// The other side tried to call a method this side never declared.
    Fallback(FallbackBody),
}

impl Envelope {
    /// Wire name of the envelope kind (value of the `type` field).
    pub fn kind(&self) -> &'static str {
        match self {
            Envelope::Log(_) => "log",
            Envelope::Bridge(_) => "bridge",
            Envelope::RegisterWebMethod(_) => "registerWebMethod",
            Envelope::WebMethodResponse(_) => "webMethodResponse",
            Envelope::WebMethodError(_) => "webMethodError",
            Envelope::Fallback(_) => "fallback",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogBody {
    /// Console method name (`log`, `warn`, `error`, ...).
    pub method: String,
    #[serde(default)]
    pub args: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeCall {
    pub method: String,
    /// Ordered positional arguments.
    #[serde(default)]
    pub args: Vec<Value>,
    pub event_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterWebMethod {
    pub bridge_names: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebMethodResponse {
    pub event_id: String,
    pub func_name: String,
    /// Missing on the wire when the method returned nothing.
    #[serde(default)]
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebMethodError {
    pub event_id: String,
    pub func_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FallbackBody {
    pub method: String,
}
