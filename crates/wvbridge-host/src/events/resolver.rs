use std::future::Future;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use serde_json::Value;
use tokio::sync::oneshot;

use wvbridge_core::error::{BridgeError, Result};
use wvbridge_core::protocol::correlation_key;

use super::emitter::{Emitter, Subscription};

/// What arrives on a correlation key.
#[derive(Debug, Clone, PartialEq)]
pub enum CallSignal {
    /// `webMethodResponse` carrying the returned value.
    Value(Value),
    /// `webMethodError`; no detail crosses the boundary.
    Failed,
}

/// Failure policy for one call.
///
/// Without a `fail_handler` a failure signal resolves to `Ok(None)`.
#[derive(Default)]
pub struct ResolveOptions {
    pub fail_handler: Option<BridgeError>,
    pub on_fallback: Option<Box<dyn FnOnce() + Send>>,
}

impl ResolveOptions {
    /// Reject failure signals with `err`, running `on_fallback` first.
    pub fn reject_with(err: BridgeError, on_fallback: impl FnOnce() + Send + 'static) -> Self {
        Self {
            fail_handler: Some(err),
            on_fallback: Some(Box::new(on_fallback)),
        }
    }
}

/// Releases the correlation key when the call finishes or is abandoned.
struct PendingGuard(Subscription);

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.0.unsubscribe();
    }
}

/// Pair one outbound call with its inbound response.
///
/// Subscribes to `method-event_id` before `evaluate` runs, so a response that
/// arrives while `evaluate` is still sending is not lost. The first signal on
/// the key settles the call and releases the subscription; later signals for
/// the same key find no listener. Dropping the returned future (for example
/// when it loses a timeout race) also releases the subscription.
pub async fn resolve<F>(
    emitter: &Emitter<CallSignal>,
    method: &str,
    event_id: &str,
    evaluate: F,
    opts: ResolveOptions,
) -> Result<Option<Value>>
where
    F: Future<Output = Result<()>>,
{
    let key = correlation_key(method, event_id);
    let (tx, rx) = oneshot::channel::<CallSignal>();
    let tx = Mutex::new(Some(tx));
    let slot: Arc<OnceLock<Subscription>> = Arc::new(OnceLock::new());

    let own = Arc::clone(&slot);
    let sub = emitter.on(key, move |signal: &CallSignal| {
        if let Some(sub) = own.get() {
            sub.unsubscribe();
        }
        let sender = tx.lock().unwrap_or_else(PoisonError::into_inner).take();
        if let Some(sender) = sender {
            let _ = sender.send(signal.clone());
        }
    });
    let _ = slot.set(sub.clone());
    let _guard = PendingGuard(sub);

    evaluate.await?;

    // Sender dropped without a signal: the emitter was cleared under us.
    let signal = rx.await.map_err(|_| BridgeError::Closed)?;

    match signal {
        CallSignal::Value(v) => Ok(Some(v)),
        CallSignal::Failed => match opts.fail_handler {
            Some(err) => {
                if let Some(on_fallback) = opts.on_fallback {
                    on_fallback();
                }
                Err(err)
            }
            None => Ok(None),
        },
    }
}
