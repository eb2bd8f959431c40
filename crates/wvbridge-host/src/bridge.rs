//! Per-connection bridge context.
//!
//! One `Bridge` owns everything a single embedded surface needs: the native
//! registry, the pending-call table (emitter), the handshake-built web method
//! proxy, the transport slot and the config. Nothing is global; `close`
//! tears it all down.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::mpsc;

use wvbridge_core::error::{BridgeError, Result};
use wvbridge_core::protocol::{correlation_key, new_event_id, BridgeCall, Envelope, FallbackBody, LogBody};

use crate::config::BridgeConfig;
use crate::dispatch::NativeRegistry;
use crate::events::{CallSignal, Emitter};
use crate::integrations::{post_message_script, BootstrapScript, LogSink, PayloadValidator, TracingLogSink};
use crate::transport::{codec, Transport, TransportSlot};
use crate::web_method::{CallLink, WebMethodProxy};

/// Called with the method name when the web side invokes something the
/// native side never declared.
pub type FallbackFn = Arc<dyn Fn(&str) + Send + Sync>;

pub struct BridgeBuilder {
    cfg: BridgeConfig,
    registry: NativeRegistry,
    fallback: Option<FallbackFn>,
    log_sink: Arc<dyn LogSink>,
    validators: HashMap<String, Arc<dyn PayloadValidator>>,
}

impl BridgeBuilder {
    pub fn new(registry: NativeRegistry) -> Self {
        Self {
            cfg: BridgeConfig::default(),
            registry,
            fallback: None,
            log_sink: Arc::new(TracingLogSink),
            validators: HashMap::new(),
        }
    }

    pub fn config(mut self, cfg: BridgeConfig) -> Self {
        self.cfg = cfg;
        self
    }

    pub fn fallback(mut self, f: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.fallback = Some(Arc::new(f));
        self
    }

    pub fn log_sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.log_sink = sink;
        self
    }

    pub fn validate_post_message(
        mut self,
        event_name: impl Into<String>,
        validator: Arc<dyn PayloadValidator>,
    ) -> Self {
        self.validators.insert(event_name.into(), validator);
        self
    }

    /// Validate the config and build the bridge.
    pub fn build(self) -> Result<Bridge> {
        self.cfg.validate()?;

        let emitter = Emitter::new();
        let transport = TransportSlot::new();
        let web_methods = WebMethodProxy::new(CallLink {
            emitter: emitter.clone(),
            transport: transport.clone(),
            timeout: Duration::from_millis(self.cfg.bridge.response_timeout_ms),
            reject_on_error: self.cfg.bridge.reject_on_web_error,
        });

        tracing::debug!(
            native_methods = self.registry.len(),
            debug = self.cfg.bridge.debug,
            response_timeout_ms = self.cfg.bridge.response_timeout_ms,
            "bridge built"
        );

        Ok(Bridge {
            inner: Arc::new(BridgeInner {
                cfg: self.cfg,
                registry: self.registry,
                emitter,
                transport,
                web_methods,
                fallback: self.fallback,
                log_sink: self.log_sink,
                validators: self.validators,
            }),
        })
    }
}

#[derive(Clone)]
pub struct Bridge {
    inner: Arc<BridgeInner>,
}

struct BridgeInner {
    cfg: BridgeConfig,
    registry: NativeRegistry,
    emitter: Emitter<CallSignal>,
    transport: TransportSlot,
    web_methods: WebMethodProxy,
    fallback: Option<FallbackFn>,
    log_sink: Arc<dyn LogSink>,
    validators: HashMap<String, Arc<dyn PayloadValidator>>,
}

impl Bridge {
    pub fn builder(registry: NativeRegistry) -> BridgeBuilder {
        BridgeBuilder::new(registry)
    }

    pub fn cfg(&self) -> &BridgeConfig {
        &self.inner.cfg
    }

    pub fn registry(&self) -> &NativeRegistry {
        &self.inner.registry
    }

    /// Native method names, sorted (what the web side is bootstrapped with).
    pub fn bridge_names(&self) -> Vec<String> {
        self.inner.registry.names()
    }

    pub fn bootstrap_script(&self, generator: &dyn BootstrapScript) -> String {
        generator.render(&self.bridge_names())
    }

    /// Attach the channel into the web context (the surface was mounted).
    pub fn connect(&self, transport: Arc<dyn Transport>) {
        self.inner.transport.attach(transport);
        tracing::debug!("transport attached");
    }

    pub fn is_connected(&self) -> bool {
        self.inner.transport.is_attached()
    }

    /// Methods the web side declared through the handshake.
    pub fn web_methods(&self) -> &WebMethodProxy {
        &self.inner.web_methods
    }

    /// Number of calls still waiting for a response.
    pub fn pending_calls(&self) -> usize {
        self.inner.emitter.topic_count()
    }

    /// Tear the connection down: fail every pending call with `Closed`,
    /// forget the handshake and detach the transport.
    pub fn close(&self) {
        let pending = self.pending_calls();
        self.inner.emitter.clear();
        self.inner.web_methods.reset();
        self.inner.transport.detach();
        tracing::debug!(pending, "bridge closed");
    }

    /// Handle one inbound channel string inline.
    ///
    /// Never fails: malformed input and dispatch misses are logged and dropped.
    pub async fn handle_message(&self, raw: &str) {
        let Some(env) = self.accept(raw) else { return };
        self.route(env).await;
    }

    /// Pump inbound strings until the sender side is dropped.
    ///
    /// Native invocations run on their own task so a slow method never holds
    /// up responses or the handshake; every other kind is handled in arrival
    /// order.
    pub async fn serve(&self, mut inbound: mpsc::UnboundedReceiver<String>) {
        while let Some(raw) = inbound.recv().await {
            let Some(env) = self.accept(&raw) else { continue };
            match env {
                Envelope::Bridge(call) => {
                    let this = self.clone();
                    tokio::spawn(async move { this.invoke_native(call).await });
                }
                other => self.route(other).await,
            }
        }
        tracing::debug!("inbound channel closed");
    }

    /// Push `data` into the web page's event bus under `event_name`.
    /// No response is expected.
    pub async fn post_message<T: Serialize + ?Sized>(&self, event_name: &str, data: &T) -> Result<()> {
        let transport = self
            .inner
            .transport
            .get()
            .map_err(|_| BridgeError::NotReady("postMessage is not ready".into()))?;

        let data = serde_json::to_value(data)
            .map_err(|e| BridgeError::BadRequest(format!("postMessage payload: {e}")))?;

        if let Some(validator) = self.inner.validators.get(event_name) {
            validator.validate(&data).map_err(|msg| {
                BridgeError::BadRequest(format!("postMessage '{event_name}' rejected: {msg}"))
            })?;
        }

        let event_id = new_event_id();
        tracing::trace!(event = %event_name, event_id = %event_id, "postMessage");
        transport.send(post_message_script(event_name, &event_id, &data)).await
    }

    fn accept(&self, raw: &str) -> Option<Envelope> {
        if !self.inner.transport.is_attached() {
            tracing::debug!(bytes_len = raw.len(), "no transport attached; dropping inbound message");
            return None;
        }
        match codec::decode(raw) {
            Ok(inbound) => {
                tracing::trace!(kind = inbound.env.kind(), bytes_len = inbound.bytes_len, "inbound");
                Some(inbound.env)
            }
            Err(e) => {
                tracing::warn!(error = %e, bytes_len = raw.len(), "dropping malformed inbound message");
                None
            }
        }
    }

    async fn route(&self, env: Envelope) {
        match env {
            Envelope::Log(LogBody { method, args }) => {
                if self.inner.cfg.bridge.debug {
                    self.inner.log_sink.log(&method, &args);
                }
            }
            Envelope::Bridge(call) => self.invoke_native(call).await,
            Envelope::RegisterWebMethod(reg) => {
                let known = self.inner.web_methods.register(reg.bridge_names);
                tracing::info!(web_methods = known, "web methods registered");
            }
            Envelope::WebMethodResponse(resp) => {
                let key = correlation_key(&resp.func_name, &resp.event_id);
                if self.inner.emitter.emit(&key, &CallSignal::Value(resp.value)) == 0 {
                    tracing::debug!(%key, "response without a pending call (late or duplicate)");
                }
            }
            Envelope::WebMethodError(err) => {
                let key = correlation_key(&err.func_name, &err.event_id);
                if self.inner.emitter.emit(&key, &CallSignal::Failed) == 0 {
                    tracing::debug!(%key, "error without a pending call (late or duplicate)");
                }
            }
            Envelope::Fallback(FallbackBody { method }) => match &self.inner.fallback {
                Some(fallback) => fallback(&method),
                None => tracing::warn!(%method, "web side called an undeclared native method"),
            },
        }
    }

    async fn invoke_native(&self, call: BridgeCall) {
        let Some(reply) = self.inner.registry.dispatch(call).await else {
            return;
        };
        if let Err(e) = self.inner.transport.send_envelope(&reply).await {
            tracing::warn!(error = %e, kind = reply.kind(), "failed to send native method reply");
        }
    }
}
