//! Inbound handling: native invocations, console forwarding, fallback,
//! malformed input.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

mod common;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::{json, Value};
use tokio::sync::{mpsc, Notify};

use wvbridge_core::protocol::{BridgeCall, Envelope, FallbackBody, LogBody, WebMethodError, WebMethodResponse};
use wvbridge_host::config::BridgeConfig;
use wvbridge_host::dispatch::{MethodError, NativeRegistry};
use wvbridge_host::Bridge;

use common::*;

fn bridge_call(method: &str, args: Vec<Value>, event_id: &str) -> String {
    raw(Envelope::Bridge(BridgeCall {
        method: method.into(),
        args,
        event_id: event_id.into(),
    }))
}

#[tokio::test]
async fn get_message_yields_one_response() {
    let (bridge, mut out) = connected_bridge(BridgeConfig::default());

    bridge
        .handle_message(r#"{"type":"bridge","body":{"method":"getMessage","args":[],"eventId":"abc"}}"#)
        .await;

    assert_eq!(
        next_envelope(&mut out).await,
        Envelope::WebMethodResponse(WebMethodResponse {
            event_id: "abc".into(),
            func_name: "getMessage".into(),
            value: json!("I'm from native"),
        })
    );
    assert_silent(&mut out).await;
}

#[tokio::test]
async fn positional_args_reach_the_method() {
    let (bridge, mut out) = connected_bridge(BridgeConfig::default());
    bridge
        .handle_message(&bridge_call("sum", vec![json!(2), json!(3), json!(4)], "s1"))
        .await;

    let Envelope::WebMethodResponse(resp) = next_envelope(&mut out).await else {
        panic!("expected webMethodResponse");
    };
    assert_eq!(resp.value, json!(9));
    assert_eq!(resp.event_id, "s1");
}

#[tokio::test]
async fn unknown_method_sends_nothing() {
    let (bridge, mut out) = connected_bridge(BridgeConfig::default());
    bridge.handle_message(&bridge_call("doesNotExist", vec![], "x1")).await;
    assert_silent(&mut out).await;
}

#[tokio::test]
async fn failing_method_signals_error_without_detail() {
    let (bridge, mut out) = connected_bridge(BridgeConfig::default());
    bridge.handle_message(&bridge_call("explode", vec![], "boom")).await;

    let raw = next_raw(&mut out).await;
    assert!(!raw.contains("native failure"));
    assert_eq!(
        wvbridge_core::protocol::decode(&raw).unwrap(),
        Envelope::WebMethodError(WebMethodError {
            event_id: "boom".into(),
            func_name: "explode".into(),
        })
    );
    assert_silent(&mut out).await;
}

#[tokio::test]
async fn panicking_method_signals_error() {
    let registry = NativeRegistry::builder()
        .method("crash", |_args| async {
            if true {
                panic!("native panic");
            }
            Ok::<_, MethodError>(Value::Null)
        })
        .build();
    let (bridge, mut out) = connect(Bridge::builder(registry));

    bridge.handle_message(&bridge_call("crash", vec![], "p1")).await;
    assert_eq!(
        next_envelope(&mut out).await,
        Envelope::WebMethodError(WebMethodError {
            event_id: "p1".into(),
            func_name: "crash".into(),
        })
    );
}

#[tokio::test]
async fn malformed_input_is_dropped() {
    let (bridge, mut out) = connected_bridge(BridgeConfig::default());
    for junk in [
        "",
        "not json at all",
        "{\"type\":\"bridge\"}",
        "{\"type\":\"teleport\",\"body\":{}}",
        "[1,2,3]",
    ] {
        bridge.handle_message(junk).await;
    }
    assert_silent(&mut out).await;

    // Still healthy afterwards.
    bridge.handle_message(&bridge_call("getMessage", vec![], "after")).await;
    assert!(matches!(next_envelope(&mut out).await, Envelope::WebMethodResponse(_)));
}

#[tokio::test]
async fn inbound_ignored_before_connect() {
    let hits = Arc::new(Mutex::new(0u32));
    let counter = Arc::clone(&hits);
    let bridge = Bridge::builder(sample_registry())
        .fallback(move |_| *counter.lock().unwrap() += 1)
        .build()
        .unwrap();

    bridge
        .handle_message(&raw(Envelope::Fallback(FallbackBody { method: "x".into() })))
        .await;
    bridge.handle_message(&handshake(&["setWebMessage"])).await;

    assert_eq!(*hits.lock().unwrap(), 0);
    assert!(!bridge.web_methods().is_ready());
}

#[tokio::test]
async fn console_forwarded_only_in_debug() {
    let log_line = raw(Envelope::Log(LogBody {
        method: "warn".into(),
        args: vec![json!("careful"), json!({ "n": 1 })],
    }));

    let quiet_sink = Arc::new(RecordingSink::default());
    let (quiet, _out) = connect(
        Bridge::builder(sample_registry())
            .config(config_with(2000, false, false))
            .log_sink(quiet_sink.clone()),
    );
    quiet.handle_message(&log_line).await;
    assert!(quiet_sink.lines.lock().unwrap().is_empty());

    let loud_sink = Arc::new(RecordingSink::default());
    let (loud, _out) = connect(
        Bridge::builder(sample_registry())
            .config(config_with(2000, true, false))
            .log_sink(loud_sink.clone()),
    );
    loud.handle_message(&log_line).await;
    assert_eq!(
        *loud_sink.lines.lock().unwrap(),
        vec![("warn".to_string(), vec![json!("careful"), json!({ "n": 1 })])]
    );
}

#[tokio::test]
async fn fallback_receives_method_name() {
    let seen = Arc::new(Mutex::new(Vec::<String>::new()));
    let sink = Arc::clone(&seen);
    let (bridge, mut out) = connect(
        Bridge::builder(sample_registry()).fallback(move |m| sink.lock().unwrap().push(m.to_string())),
    );

    bridge
        .handle_message(&raw(Envelope::Fallback(FallbackBody {
            method: "openCamera".into(),
        })))
        .await;

    assert_eq!(*seen.lock().unwrap(), vec!["openCamera".to_string()]);
    assert_silent(&mut out).await;
}

#[tokio::test]
async fn serve_does_not_block_on_slow_native_methods() {
    let gate = Arc::new(Notify::new());
    let release = Arc::clone(&gate);
    let registry = NativeRegistry::builder()
        .method("slow", move |_args| {
            let gate = Arc::clone(&release);
            async move {
                gate.notified().await;
                Ok::<_, MethodError>(json!("slow done"))
            }
        })
        .method("fast", |_args| async { Ok::<_, MethodError>(json!("fast done")) })
        .build();
    let (bridge, mut out) = connect(Bridge::builder(registry));

    let (tx, rx) = mpsc::unbounded_channel();
    let server = bridge.clone();
    let serving = tokio::spawn(async move { server.serve(rx).await });

    tx.send(bridge_call("slow", vec![], "s")).unwrap();
    tx.send(bridge_call("fast", vec![], "f")).unwrap();

    let Envelope::WebMethodResponse(first) = next_envelope(&mut out).await else {
        panic!("expected response");
    };
    assert_eq!(first.func_name, "fast");

    gate.notify_one();
    let Envelope::WebMethodResponse(second) = next_envelope(&mut out).await else {
        panic!("expected response");
    };
    assert_eq!(second.func_name, "slow");

    drop(tx);
    tokio::time::timeout(Duration::from_secs(1), serving)
        .await
        .expect("serve must stop when inbound closes")
        .unwrap();
}

#[test]
fn bridge_names_are_sorted() {
    let bridge = Bridge::builder(sample_registry()).build().unwrap();
    assert_eq!(bridge.bridge_names(), vec!["explode", "getMessage", "sum"]);

    let script = bridge.bootstrap_script(&|names: &[String]| format!("window.__bridgeNames = {names:?};"));
    assert_eq!(script, r#"window.__bridgeNames = ["explode", "getMessage", "sum"];"#);
}
