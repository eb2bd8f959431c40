//! webview-bridge demo host.
//!
//! Runs a bridge against an in-process stand-in for the web page:
//! - the page performs the `registerWebMethod` handshake and calls `getMessage`
//! - the host calls the page's `setWebMessage` and pushes a postMessage event
//!
//! Config is read from `$WVBRIDGE_CONFIG` when set, defaults otherwise.
//! Use `RUST_LOG=debug` to see the envelope traffic.

use std::sync::Arc;

use serde_json::{json, Value};
use tokio::sync::mpsc;
use tokio::time::{sleep, Duration};
use tracing_subscriber::{fmt, EnvFilter};

use wvbridge_core::error::{BridgeError, Result};
use wvbridge_core::protocol::{decode, encode, new_event_id, BridgeCall, Envelope, RegisterWebMethod, WebMethodResponse};
use wvbridge_host::config::{self, BridgeConfig};
use wvbridge_host::dispatch::{MethodError, NativeRegistry};
use wvbridge_host::transport::ChannelTransport;
use wvbridge_host::Bridge;

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let cfg = match std::env::var("WVBRIDGE_CONFIG") {
        Ok(path) => config::load_from_file(&path)?,
        Err(_) => BridgeConfig::default(),
    };

    let registry = NativeRegistry::builder()
        .method("getMessage", |_args| async { Ok::<_, MethodError>(json!("I'm from native")) })
        .method("openInAppBrowser", |args| async move {
            let url = args.first().and_then(Value::as_str).unwrap_or_default().to_string();
            tracing::info!(%url, "openInAppBrowser");
            Ok::<_, MethodError>(Value::Null)
        })
        .build();

    let bridge = Bridge::builder(registry)
        .config(cfg)
        .fallback(|method| tracing::warn!("Method '{method}' not found in native"))
        .build()?;

    // host -> page
    let (transport, to_page) = ChannelTransport::new();
    bridge.connect(Arc::new(transport));
    // page -> host
    let (page_tx, from_page) = mpsc::unbounded_channel::<String>();

    let server = bridge.clone();
    tokio::spawn(async move { server.serve(from_page).await });
    tokio::spawn(fake_page(to_page, page_tx));

    for _ in 0..50 {
        if bridge.web_methods().is_ready() {
            break;
        }
        sleep(Duration::from_millis(10)).await;
    }

    let reply = bridge
        .web_methods()
        .call("setWebMessage", vec![json!("hello from native")])
        .await?;
    tracing::info!(?reply, "setWebMessage returned");

    bridge.post_message("setWebMessage_zod", "zod !").await?;

    sleep(Duration::from_millis(50)).await;
    bridge.close();
    Ok(())
}

/// Minimal web page: declares `setWebMessage`, calls native `getMessage`,
/// answers host calls and prints whatever else arrives.
async fn fake_page(mut from_host: mpsc::UnboundedReceiver<String>, to_host: mpsc::UnboundedSender<String>) {
    let send = |env: Envelope| -> Result<()> {
        let raw = encode(&env)?;
        to_host
            .send(raw)
            .map_err(|_| BridgeError::Transport("host gone".into()))
    };

    let hello = send(Envelope::RegisterWebMethod(RegisterWebMethod {
        bridge_names: vec!["setWebMessage".into()],
    }))
    .and_then(|_| {
        send(Envelope::Bridge(BridgeCall {
            method: "getMessage".into(),
            args: vec![],
            event_id: new_event_id(),
        }))
    });
    if let Err(e) = hello {
        tracing::error!(error = %e, "page could not reach host");
        return;
    }

    while let Some(raw) = from_host.recv().await {
        match decode(&raw) {
            Ok(Envelope::Bridge(call)) => {
                tracing::info!(method = %call.method, args = ?call.args, "page: host called web method");
                let reply = Envelope::WebMethodResponse(WebMethodResponse {
                    event_id: call.event_id,
                    func_name: call.method,
                    value: json!("ok"),
                });
                if send(reply).is_err() {
                    break;
                }
            }
            Ok(Envelope::WebMethodResponse(resp)) => {
                tracing::info!(method = %resp.func_name, value = %resp.value, "page: native method answered");
            }
            Ok(other) => tracing::info!(kind = other.kind(), "page: envelope"),
            Err(_) => tracing::info!(script = %raw.trim(), "page: script injected"),
        }
    }
}
