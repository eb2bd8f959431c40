use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use serde_json::Value;

use wvbridge_core::error::{BridgeError, Result};
use wvbridge_core::protocol::{encode, new_event_id, BridgeCall, Envelope};

use crate::events::{resolve, CallSignal, Emitter, ResolveOptions};
use crate::transport::TransportSlot;

/// Shared plumbing every stub needs to place a call.
#[derive(Clone)]
pub(crate) struct CallLink {
    pub emitter: Emitter<CallSignal>,
    pub transport: TransportSlot,
    pub timeout: Duration,
    pub reject_on_error: bool,
}

/// Readiness of the web surface.
pub enum ProxyState {
    /// No handshake yet: every call fails with `NotReady`.
    NotReady,
    /// Handshake done: declared name -> stub.
    Ready(BTreeMap<String, WebMethod>),
}

/// Callable stub for one method the web side declared.
#[derive(Clone)]
pub struct WebMethod {
    name: Arc<str>,
    link: CallLink,
}

impl WebMethod {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Invoke the web method and wait for its response.
    ///
    /// `Ok(None)` means the web side signalled an error and the bridge is
    /// configured to degrade silently.
    pub async fn call(&self, args: Vec<Value>) -> Result<Option<Value>> {
        let transport = self.link.transport.get()?;
        let event_id = new_event_id();
        let raw = encode(&Envelope::Bridge(BridgeCall {
            method: self.name.to_string(),
            args,
            event_id: event_id.clone(),
        }))?;

        let opts = if self.link.reject_on_error {
            let method = self.name.clone();
            let id = event_id.clone();
            ResolveOptions::reject_with(BridgeError::RemoteMethodFailed(self.name.to_string()), move || {
                tracing::warn!(method = %method, event_id = %id, "web method failed");
            })
        } else {
            ResolveOptions::default()
        };

        let call = resolve(
            &self.link.emitter,
            &self.name,
            &event_id,
            async move { transport.send(raw).await },
            opts,
        );

        match tokio::time::timeout(self.link.timeout, call).await {
            Ok(res) => res,
            Err(_elapsed) => {
                let timeout_ms = self.link.timeout.as_millis() as u64;
                tracing::warn!(method = %self.name, event_id = %event_id, timeout_ms, "web method timed out");
                Err(BridgeError::RemoteCallTimeout {
                    method: self.name.to_string(),
                    timeout_ms,
                })
            }
        }
    }
}

/// Methods exposed by the web side, learned from the `registerWebMethod`
/// handshake.
pub struct WebMethodProxy {
    state: RwLock<ProxyState>,
    link: CallLink,
}

impl WebMethodProxy {
    pub(crate) fn new(link: CallLink) -> Self {
        Self {
            state: RwLock::new(ProxyState::NotReady),
            link,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(
            *self.state.read().unwrap_or_else(PoisonError::into_inner),
            ProxyState::Ready(_)
        )
    }

    /// Declared names (empty before the handshake).
    pub fn names(&self) -> Vec<String> {
        match &*self.state.read().unwrap_or_else(PoisonError::into_inner) {
            ProxyState::NotReady => Vec::new(),
            ProxyState::Ready(stubs) => stubs.keys().cloned().collect(),
        }
    }

    /// Apply a handshake. A repeated handshake (page reload) merges its names
    /// into the existing set. Returns the number of known methods.
    pub(crate) fn register(&self, bridge_names: Vec<String>) -> usize {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if let ProxyState::NotReady = *state {
            *state = ProxyState::Ready(BTreeMap::new());
        }
        let ProxyState::Ready(stubs) = &mut *state else {
            return 0;
        };
        for name in bridge_names {
            stubs.entry(name.clone()).or_insert_with(|| WebMethod {
                name: Arc::from(name),
                link: self.link.clone(),
            });
        }
        stubs.len()
    }

    /// Back to `NotReady` (connection teardown).
    pub(crate) fn reset(&self) {
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = ProxyState::NotReady;
    }

    pub fn get(&self, name: &str) -> Result<WebMethod> {
        match &*self.state.read().unwrap_or_else(PoisonError::into_inner) {
            ProxyState::NotReady => Err(BridgeError::NotReady(format!(
                "web methods not registered yet (calling {name})"
            ))),
            ProxyState::Ready(stubs) => stubs
                .get(name)
                .cloned()
                .ok_or_else(|| BridgeError::MethodNotFound(name.to_string())),
        }
    }

    pub async fn call(&self, name: &str, args: Vec<Value>) -> Result<Option<Value>> {
        let method = self.get(name)?;
        method.call(args).await
    }
}
