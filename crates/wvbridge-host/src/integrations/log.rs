//! Web console forwarding.

use serde_json::Value;

/// Receives console calls forwarded from the web context (debug mode only).
pub trait LogSink: Send + Sync {
    fn log(&self, method: &str, args: &[Value]);
}

/// Default sink: re-emits console calls as `tracing` events under the
/// `wvbridge::web_console` target, mapping the console method to a level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogSink;

impl LogSink for TracingLogSink {
    fn log(&self, method: &str, args: &[Value]) {
        let line = render_args(args);
        match method {
            "error" => tracing::error!(target: "wvbridge::web_console", "{line}"),
            "warn" => tracing::warn!(target: "wvbridge::web_console", "{line}"),
            "debug" => tracing::debug!(target: "wvbridge::web_console", "{line}"),
            _ => tracing::info!(target: "wvbridge::web_console", method, "{line}"),
        }
    }
}

/// Join console args the way a browser console prints them: strings bare,
/// everything else as JSON.
pub fn render_args(args: &[Value]) -> String {
    args.iter()
        .map(|a| match a {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}
