//! Event plumbing for call correlation.
//!
//! The emitter is the outstanding-call table: every in-flight remote call owns
//! exactly one subscription on its `method-eventId` topic until it settles.

mod emitter;
mod resolver;

pub use emitter::{Emitter, Subscription};
pub use resolver::{resolve, CallSignal, ResolveOptions};
