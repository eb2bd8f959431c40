//! Shared helpers for bridge integration tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]
#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::{json, Value};
use tokio::sync::mpsc;

use wvbridge_core::protocol::{decode, encode, Envelope, RegisterWebMethod, WebMethodError, WebMethodResponse};
use wvbridge_host::config::BridgeConfig;
use wvbridge_host::dispatch::{MethodError, NativeRegistry};
use wvbridge_host::integrations::LogSink;
use wvbridge_host::transport::ChannelTransport;
use wvbridge_host::{Bridge, BridgeBuilder};

pub fn sample_registry() -> NativeRegistry {
    NativeRegistry::builder()
        .method("getMessage", |_args| async { Ok::<_, MethodError>(json!("I'm from native")) })
        .method("sum", |args| async move {
            let total: i64 = args.iter().filter_map(Value::as_i64).sum();
            Ok::<_, MethodError>(json!(total))
        })
        .method("explode", |_args| async {
            Err::<Value, MethodError>("native failure".into())
        })
        .build()
}

pub fn config_with(timeout_ms: u64, debug: bool, reject_on_web_error: bool) -> BridgeConfig {
    let mut cfg = BridgeConfig::default();
    cfg.bridge.response_timeout_ms = timeout_ms;
    cfg.bridge.debug = debug;
    cfg.bridge.reject_on_web_error = reject_on_web_error;
    cfg
}

/// Build and connect; returns the bridge and what it sends to the page.
pub fn connect(builder: BridgeBuilder) -> (Bridge, mpsc::UnboundedReceiver<String>) {
    let bridge = builder.build().expect("bridge must build");
    let (transport, rx) = ChannelTransport::new();
    bridge.connect(Arc::new(transport));
    (bridge, rx)
}

pub fn connected_bridge(cfg: BridgeConfig) -> (Bridge, mpsc::UnboundedReceiver<String>) {
    connect(Bridge::builder(sample_registry()).config(cfg))
}

pub async fn next_raw(rx: &mut mpsc::UnboundedReceiver<String>) -> String {
    tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("timed out waiting for outbound message")
        .expect("outbound channel closed")
}

pub async fn next_envelope(rx: &mut mpsc::UnboundedReceiver<String>) -> Envelope {
    let raw = next_raw(rx).await;
    decode(&raw).unwrap_or_else(|e| panic!("outbound message is not an envelope ({e}): {raw}"))
}

/// Nothing else was sent (after letting spawned tasks run).
pub async fn assert_silent(rx: &mut mpsc::UnboundedReceiver<String>) {
    tokio::time::sleep(Duration::from_millis(20)).await;
    if let Ok(raw) = rx.try_recv() {
        panic!("unexpected outbound message: {raw}");
    }
}

pub fn raw(env: Envelope) -> String {
    encode(&env).unwrap()
}

pub fn handshake(names: &[&str]) -> String {
    raw(Envelope::RegisterWebMethod(RegisterWebMethod {
        bridge_names: names.iter().map(|n| n.to_string()).collect(),
    }))
}

pub fn response(func_name: &str, event_id: &str, value: Value) -> String {
    raw(Envelope::WebMethodResponse(WebMethodResponse {
        event_id: event_id.into(),
        func_name: func_name.into(),
        value,
    }))
}

pub fn failure(func_name: &str, event_id: &str) -> String {
    raw(Envelope::WebMethodError(WebMethodError {
        event_id: event_id.into(),
        func_name: func_name.into(),
    }))
}

/// Log sink recording `(method, rendered args)`.
#[derive(Default)]
pub struct RecordingSink {
    pub lines: Mutex<Vec<(String, Vec<Value>)>>,
}

impl LogSink for RecordingSink {
    fn log(&self, method: &str, args: &[Value]) {
        self.lines.lock().unwrap().push((method.to_string(), args.to_vec()));
    }
}
