// ── Generation-tagged reactive state slot ──
//
// Refreshes are not cancelled when a new one starts, so responses can
// resolve out of order. Each refresh carries a monotonically increasing
// generation; a slot only accepts a value whose generation is at least
// the one it already holds, discarding stale late arrivals instead of
// letting last-resolved-wins clobber newer data.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::debug;

/// A value plus the refresh generation that produced it.
#[derive(Debug, Clone)]
pub struct Versioned<T> {
    pub generation: u64,
    pub value: Arc<T>,
}

/// One reactive state slot with push-based change notification.
pub(crate) struct Slot<T> {
    inner: watch::Sender<Versioned<T>>,
}

impl<T: Send + Sync + 'static> Slot<T> {
    pub(crate) fn new(initial: T) -> Self {
        let (inner, _) = watch::channel(Versioned {
            generation: 0,
            value: Arc::new(initial),
        });
        Self { inner }
    }

    /// Apply a value produced by refresh `generation`.
    ///
    /// Returns `false` (and leaves the slot untouched) when a newer
    /// generation has already been applied. Equal generations apply, so
    /// the several slots one refresh feeds all accept its results.
    pub(crate) fn apply(&self, generation: u64, value: T) -> bool {
        let applied = self.inner.send_if_modified(|current| {
            if generation < current.generation {
                return false;
            }
            current.generation = generation;
            current.value = Arc::new(value);
            true
        });
        if !applied {
            debug!(generation, "discarding stale refresh result");
        }
        applied
    }

    /// Current value (cheap `Arc` clone).
    pub(crate) fn get(&self) -> Arc<T> {
        self.inner.borrow().value.clone()
    }

    /// Subscribe to changes via a `watch::Receiver`.
    pub(crate) fn subscribe(&self) -> watch::Receiver<Versioned<T>> {
        self.inner.subscribe()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn newer_generation_applies() {
        let slot = Slot::new(0u32);
        assert!(slot.apply(1, 10));
        assert!(slot.apply(2, 20));
        assert_eq!(*slot.get(), 20);
    }

    #[test]
    fn stale_generation_is_discarded() {
        let slot = Slot::new(0u32);
        assert!(slot.apply(5, 50));
        assert!(!slot.apply(3, 30));
        assert_eq!(*slot.get(), 50);
    }

    #[test]
    fn equal_generation_applies() {
        let slot = Slot::new(0u32);
        assert!(slot.apply(1, 10));
        assert!(slot.apply(1, 11));
        assert_eq!(*slot.get(), 11);
    }

    #[tokio::test]
    async fn subscribers_see_applied_values() {
        let slot = Slot::new(0u32);
        let mut rx = slot.subscribe();

        slot.apply(1, 42);
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow().value, 42);
        assert_eq!(rx.borrow().generation, 1);
    }
}
