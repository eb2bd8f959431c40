//! One-shot native -> web pushes into the page's own event bus.

use serde_json::Value;

/// Checks a post-message payload before it is sent. Register one per event
/// name; events without a validator are sent as-is.
pub trait PayloadValidator: Send + Sync {
    fn validate(&self, data: &Value) -> Result<(), String>;
}

impl<F> PayloadValidator for F
where
    F: Fn(&Value) -> Result<(), String> + Send + Sync,
{
    fn validate(&self, data: &Value) -> Result<(), String> {
        self(data)
    }
}

/// Script evaluated in the web context for one push.
/// Every interpolated value is a JSON literal, so quotes in names or data
/// cannot break out of the call.
pub fn post_message_script(event_name: &str, event_id: &str, data: &Value) -> String {
    let name = Value::from(event_name);
    let id = Value::from(event_id);
    format!("\nwindow.webEmitter.emit({name}, {id}, {data});\n\ntrue;\n")
}
