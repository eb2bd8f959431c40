use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use dashmap::DashMap;

type Listener<E> = Arc<dyn Fn(&E) + Send + Sync>;

/// Topic table: topic -> listeners in registration order.
struct Registry<E> {
    topics: DashMap<String, Vec<(u64, Listener<E>)>>,
    seq: AtomicU64,
}

trait Detach: Send + Sync {
    fn detach(&self, topic: &str, id: u64);
}

impl<E> Detach for Registry<E> {
    fn detach(&self, topic: &str, id: u64) {
        let now_empty = match self.topics.get_mut(topic) {
            Some(mut list) => {
                list.retain(|(lid, _)| *lid != id);
                list.is_empty()
            }
            None => return,
        };
        if now_empty {
            self.topics.remove_if(topic, |_, list| list.is_empty());
        }
    }
}

/// Synchronous pub/sub keyed by string topic.
///
/// Listeners of one topic run in registration order. Each listener is isolated:
/// a panic is caught and logged, and the remaining listeners still run.
/// Listeners are invoked without any table lock held, so they may subscribe or
/// unsubscribe (including themselves) from inside the callback.
pub struct Emitter<E> {
    inner: Arc<Registry<E>>,
}

impl<E> Clone for Emitter<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<E: 'static> Default for Emitter<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: 'static> Emitter<E> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Registry {
                topics: DashMap::new(),
                seq: AtomicU64::new(1),
            }),
        }
    }

    /// Register `cb` on `topic`. The returned handle removes exactly this
    /// registration, even if the same callback was registered twice.
    pub fn on<F>(&self, topic: impl Into<String>, cb: F) -> Subscription
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        let topic = topic.into();
        let id = self.inner.seq.fetch_add(1, Ordering::Relaxed);
        self.inner
            .topics
            .entry(topic.clone())
            .or_default()
            .push((id, Arc::new(cb)));

        let registry: Weak<dyn Detach> = Arc::downgrade(&self.inner) as Weak<dyn Detach>;
        Subscription {
            inner: Arc::new(SubscriptionInner {
                topic,
                id,
                active: AtomicBool::new(true),
                registry,
            }),
        }
    }

    /// Deliver `event` to every listener of `topic`.
    /// Returns the number of listeners that were invoked (0 is not an error).
    pub fn emit(&self, topic: &str, event: &E) -> usize {
        let listeners: Vec<Listener<E>> = match self.inner.topics.get(topic) {
            Some(list) => list.iter().map(|(_, l)| Arc::clone(l)).collect(),
            None => {
                tracing::trace!(topic, "emit without listeners");
                return 0;
            }
        };

        for listener in &listeners {
            if catch_unwind(AssertUnwindSafe(|| listener(event))).is_err() {
                tracing::error!(topic, "listener panicked; continuing with remaining listeners");
            }
        }
        listeners.len()
    }

    pub fn listener_count(&self, topic: &str) -> usize {
        self.inner.topics.get(topic).map(|l| l.len()).unwrap_or(0)
    }

    /// Number of topics with at least one listener.
    pub fn topic_count(&self) -> usize {
        self.inner.topics.len()
    }

    /// Drop every listener (connection teardown).
    pub fn clear(&self) {
        self.inner.topics.clear();
    }
}

/// Handle returned by [`Emitter::on`].
///
/// Cloning shares the same registration; `unsubscribe` is idempotent across
/// all clones.
#[derive(Clone)]
pub struct Subscription {
    inner: Arc<SubscriptionInner>,
}

struct SubscriptionInner {
    topic: String,
    id: u64,
    active: AtomicBool,
    registry: Weak<dyn Detach>,
}

impl Subscription {
    pub fn topic(&self) -> &str {
        &self.inner.topic
    }

    /// `false` once `unsubscribe` has been called on any clone.
    pub fn is_active(&self) -> bool {
        self.inner.active.load(Ordering::Acquire)
    }

    pub fn unsubscribe(&self) {
        if !self.inner.active.swap(false, Ordering::AcqRel) {
            return;
        }
        if let Some(registry) = self.inner.registry.upgrade() {
            registry.detach(&self.inner.topic, self.inner.id);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("topic", &self.inner.topic)
            .field("id", &self.inner.id)
            .field("active", &self.is_active())
            .finish()
    }
}
