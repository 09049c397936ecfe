//! Change-notification registry.
//!
//! # Responsibility
//! - Deliver identifier-keyed change signals to registered observers.
//! - Flip cursor stale flags without handing observers storage access.
//!
//! # Invariants
//! - Delivery is fire-and-forget and best-effort; there is no
//!   acknowledgment and no redelivery.
//! - The registry holds weak references only; dropped observers are
//!   pruned, never delivered to.
//! - Observer callbacks run outside the registry lock.

use crate::router::ResourceUri;
use log::debug;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};

/// Callback interface for data-change signals.
///
/// Implementations receive the identifier whose data changed; they are
/// never handed direct storage access.
pub trait ChangeObserver: Send + Sync {
    fn on_change(&self, uri: &ResourceUri);
}

struct Entry {
    watched: ResourceUri,
    observer: Weak<dyn ChangeObserver>,
}

/// Registry of observers keyed by the identifier they watch.
///
/// Constructed by the embedding application and shared with the access
/// facade; live query views register here to hear about writes.
#[derive(Default)]
pub struct ObserverRegistry {
    entries: Mutex<Vec<Entry>>,
}

impl ObserverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `observer` for changes behind `watched`.
    ///
    /// The registry keeps a weak reference; the registration lives for as
    /// long as the caller keeps the `Arc` alive.
    pub fn register<O: ChangeObserver + 'static>(&self, watched: ResourceUri, observer: &Arc<O>) {
        let observer: Arc<dyn ChangeObserver> = observer.clone();
        let weak: Weak<dyn ChangeObserver> = Arc::downgrade(&observer);
        let mut entries = self.lock_entries();
        entries.retain(|entry| entry.observer.strong_count() > 0);
        entries.push(Entry {
            watched,
            observer: weak,
        });
    }

    /// Signals that the data behind `uri` changed.
    ///
    /// An observer hears the signal when it watches `uri` itself, an
    /// ancestor of it (a collection watcher hears row changes), or a
    /// descendant of it (a row watcher hears collection-wide deletes).
    pub fn notify_change(&self, uri: &ResourceUri) {
        let recipients: Vec<Arc<dyn ChangeObserver>> = {
            let mut entries = self.lock_entries();
            entries.retain(|entry| entry.observer.strong_count() > 0);
            entries
                .iter()
                .filter(|entry| {
                    entry.watched == *uri
                        || entry.watched.is_ancestor_of(uri)
                        || uri.is_ancestor_of(&entry.watched)
                })
                .filter_map(|entry| entry.observer.upgrade())
                .collect()
        };

        debug!(
            "event=notify_change module=observer status=ok uri={uri} recipients={}",
            recipients.len()
        );
        for observer in recipients {
            observer.on_change(uri);
        }
    }

    /// Number of live registrations, mostly useful to tests.
    pub fn watcher_count(&self) -> usize {
        let mut entries = self.lock_entries();
        entries.retain(|entry| entry.observer.strong_count() > 0);
        entries.len()
    }

    fn lock_entries(&self) -> std::sync::MutexGuard<'_, Vec<Entry>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Invalidation flag a cursor shares with the registry.
#[derive(Default)]
pub(crate) struct StaleFlag {
    stale: AtomicBool,
}

impl StaleFlag {
    pub(crate) fn is_set(&self) -> bool {
        self.stale.load(Ordering::SeqCst)
    }

    pub(crate) fn clear(&self) {
        self.stale.store(false, Ordering::SeqCst);
    }
}

impl ChangeObserver for StaleFlag {
    fn on_change(&self, _uri: &ResourceUri) {
        self.stale.store(true, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::{ChangeObserver, ObserverRegistry};
    use crate::router::ResourceUri;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Default)]
    struct CountingObserver {
        hits: AtomicUsize,
    }

    impl ChangeObserver for CountingObserver {
        fn on_change(&self, _uri: &ResourceUri) {
            self.hits.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn collection_watcher_hears_item_changes() {
        let registry = ObserverRegistry::new();
        let observer = Arc::new(CountingObserver::default());
        registry.register(ResourceUri::collection(), &observer);

        registry.notify_change(&ResourceUri::item(4));
        assert_eq!(observer.hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn unrelated_identifiers_are_not_delivered() {
        let registry = ObserverRegistry::new();
        let observer = Arc::new(CountingObserver::default());
        registry.register(ResourceUri::item(1), &observer);

        registry.notify_change(&ResourceUri::item(2));
        assert_eq!(observer.hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn dropped_observers_are_pruned() {
        let registry = ObserverRegistry::new();
        let observer = Arc::new(CountingObserver::default());
        registry.register(ResourceUri::collection(), &observer);
        assert_eq!(registry.watcher_count(), 1);

        drop(observer);
        registry.notify_change(&ResourceUri::collection());
        assert_eq!(registry.watcher_count(), 0);
    }
}
