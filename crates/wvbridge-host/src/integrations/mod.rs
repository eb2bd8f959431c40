//! Narrow interfaces to the collaborators around the bridge: where forwarded
//! console output goes, how post-message payloads are validated and rendered,
//! and who turns the native method names into the bootstrap script.

pub mod bootstrap;
pub mod log;
pub mod post_message;

pub use bootstrap::BootstrapScript;
pub use log::{LogSink, TracingLogSink};
pub use post_message::{post_message_script, PayloadValidator};
