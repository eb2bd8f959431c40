//! Remote (web-side) methods, built from the runtime handshake.

mod proxy;

pub(crate) use proxy::CallLink;
pub use proxy::{ProxyState, WebMethod, WebMethodProxy};
