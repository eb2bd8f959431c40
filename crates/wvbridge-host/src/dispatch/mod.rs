//! Native method registry exports.
//!
//! Re-exports the registry and method traits so downstream consumers can
//! depend on this module directly.

pub mod registry;

pub use registry::{FnMethod, MethodError, NativeMethod, NativeRegistry, NativeRegistryBuilder};
