//! Shared error type across webview-bridge crates.

use thiserror::Error;

/// Stable error codes (safe to log, assert on, or surface to callers).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// The channel delivered something that is not an envelope.
    MalformedEnvelope,
    /// The target method is not declared on the receiving side.
    MethodNotFound,
    /// No response arrived within the configured window.
    RemoteCallTimeout,
    /// Handshake or transport not established yet.
    NotReady,
    /// The remote side signalled a failure and the caller opted to reject.
    RemoteMethodFailed,
    /// The transport refused or lost the payload.
    Transport,
    /// Invalid input (config, payload validation).
    BadRequest,
    /// The bridge was torn down while the call was in flight.
    Closed,
    /// Internal error.
    Internal,
}

impl ErrorCode {
    /// String representation used in logs and test vectors.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MalformedEnvelope => "MALFORMED_ENVELOPE",
            ErrorCode::MethodNotFound => "METHOD_NOT_FOUND",
            ErrorCode::RemoteCallTimeout => "REMOTE_CALL_TIMEOUT",
            ErrorCode::NotReady => "NOT_READY",
            ErrorCode::RemoteMethodFailed => "REMOTE_METHOD_FAILED",
            ErrorCode::Transport => "TRANSPORT",
            ErrorCode::BadRequest => "BAD_REQUEST",
            ErrorCode::Closed => "CLOSED",
            ErrorCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Unified error type used by core and host.
#[derive(Debug, Clone, Error)]
pub enum BridgeError {
    #[error("malformed envelope: {0}")]
    MalformedEnvelope(String),
    #[error("method not found: {0}")]
    MethodNotFound(String),
    #[error("remote call timed out: {method} after {timeout_ms}ms")]
    RemoteCallTimeout { method: String, timeout_ms: u64 },
    #[error("not ready: {0}")]
    NotReady(String),
    #[error("remote method failed: {0}")]
    RemoteMethodFailed(String),
    #[error("transport: {0}")]
    Transport(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("bridge closed")]
    Closed,
    #[error("internal: {0}")]
    Internal(String),
}

impl BridgeError {
    /// Map to a stable code.
    pub fn code(&self) -> ErrorCode {
        match self {
            BridgeError::MalformedEnvelope(_) => ErrorCode::MalformedEnvelope,
            BridgeError::MethodNotFound(_) => ErrorCode::MethodNotFound,
            BridgeError::RemoteCallTimeout { .. } => ErrorCode::RemoteCallTimeout,
            BridgeError::NotReady(_) => ErrorCode::NotReady,
            BridgeError::RemoteMethodFailed(_) => ErrorCode::RemoteMethodFailed,
            BridgeError::Transport(_) => ErrorCode::Transport,
            BridgeError::BadRequest(_) => ErrorCode::BadRequest,
            BridgeError::Closed => ErrorCode::Closed,
            BridgeError::Internal(_) => ErrorCode::Internal,
        }
    }
}
