use std::collections::HashMap;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::FutureExt;
use serde_json::Value;

use wvbridge_core::protocol::{BridgeCall, Envelope, WebMethodError, WebMethodResponse};

/// Error type native methods may return. The detail stays on the native side.
pub type MethodError = Box<dyn std::error::Error + Send + Sync>;

/// An async method exposed to the web side.
#[async_trait]
pub trait NativeMethod: Send + Sync {
    async fn call(&self, args: Vec<Value>) -> Result<Value, MethodError>;
}

/// Adapter turning an async closure into a [`NativeMethod`].
pub struct FnMethod<F>(pub F);

#[async_trait]
impl<F, Fut> NativeMethod for FnMethod<F>
where
    F: Fn(Vec<Value>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value, MethodError>> + Send + 'static,
{
    async fn call(&self, args: Vec<Value>) -> Result<Value, MethodError> {
        (self.0)(args).await
    }
}

/// Builder for [`NativeRegistry`]. Registering a name twice keeps the last one.
#[derive(Default)]
pub struct NativeRegistryBuilder {
    methods: HashMap<String, Arc<dyn NativeMethod>>,
}

impl NativeRegistryBuilder {
    pub fn register(mut self, name: impl Into<String>, method: Arc<dyn NativeMethod>) -> Self {
        let name = name.into();
        if self.methods.insert(name.clone(), method).is_some() {
            tracing::warn!(method = %name, "native method registered twice; keeping the last one");
        }
        self
    }

    pub fn method<F, Fut>(self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(Vec<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, MethodError>> + Send + 'static,
    {
        self.register(name, Arc::new(FnMethod(f)))
    }

    pub fn build(self) -> NativeRegistry {
        NativeRegistry {
            methods: Arc::new(self.methods),
        }
    }
}

/// Immutable name -> method table for the native side.
#[derive(Clone, Default)]
pub struct NativeRegistry {
    methods: Arc<HashMap<String, Arc<dyn NativeMethod>>>,
}

impl NativeRegistry {
    pub fn builder() -> NativeRegistryBuilder {
        NativeRegistryBuilder::default()
    }

    /// Declared names, sorted (fed to the bootstrap script).
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.methods.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn contains(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    /// Run a `bridge` invocation and build the reply envelope.
    ///
    /// Returns `None` for an unknown method: nothing is sent back. An error or
    /// panic inside the method becomes a bare `webMethodError`.
    pub async fn dispatch(&self, call: BridgeCall) -> Option<Envelope> {
        let BridgeCall {
            method: name,
            args,
            event_id,
        } = call;

        let Some(method) = self.methods.get(&name).cloned() else {
            tracing::warn!(method = %name, event_id = %event_id, "bridge call for unregistered native method");
            return None;
        };

        let outcome = AssertUnwindSafe(method.call(args)).catch_unwind().await;
        let reply = match outcome {
            Ok(Ok(value)) => Envelope::WebMethodResponse(WebMethodResponse {
                event_id,
                func_name: name,
                value,
            }),
            Ok(Err(e)) => {
                tracing::debug!(method = %name, event_id = %event_id, error = %e, "native method failed");
                Envelope::WebMethodError(WebMethodError {
                    event_id,
                    func_name: name,
                })
            }
            Err(_) => {
                tracing::error!(method = %name, event_id = %event_id, "native method panicked");
                Envelope::WebMethodError(WebMethodError {
                    event_id,
                    func_name: name,
                })
            }
        };
        Some(reply)
    }
}
