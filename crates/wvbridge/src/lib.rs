//! Top-level facade crate for webview-bridge.
//!
//! Re-exports the wire contracts and the host runtime so users can depend on a
//! single crate.

pub mod core {
    pub use wvbridge_core::*;
}

pub mod host {
    pub use wvbridge_host::*;
}
