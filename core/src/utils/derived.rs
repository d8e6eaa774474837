//! Lazily derived state
//!
//! Schema objects compute their column lists and key maps on first use.
//! [`Derived`] makes that first use safe when several threads race for it
//! and allows the state to be dropped again so a schema can be redefined.

use std::sync::{Arc, PoisonError, RwLock};

/// A value computed at most once until it is reset
#[derive(Debug)]
pub struct Derived<T> {
    slot: RwLock<Option<Arc<T>>>,
}

impl<T> Default for Derived<T> {
    fn default() -> Self {
        Derived {
            slot: RwLock::new(None),
        }
    }
}

impl<T> Derived<T> {
    /// Create an empty cell
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the current value, computing it with `init` when empty
    ///
    /// `init` runs under the write lock, so concurrent callers wait for one
    /// computation instead of racing. A failed `init` leaves the cell empty.
    pub fn get_or_try_init<E, F>(&self, init: F) -> Result<Arc<T>, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        if let Some(value) = self.get() {
            return Ok(value);
        }

        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(value) = slot.as_ref() {
            return Ok(Arc::clone(value));
        }

        let value = Arc::new(init()?);
        *slot = Some(Arc::clone(&value));
        Ok(value)
    }

    /// Return the current value without computing it
    pub fn get(&self) -> Option<Arc<T>> {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(Arc::clone)
    }

    /// Drop the current value
    pub fn reset(&self) {
        *self.slot.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Whether a value is present
    pub fn is_set(&self) -> bool {
        self.get().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    #[test]
    fn test_init_once() {
        let cell: Derived<u32> = Derived::new();
        let calls = AtomicUsize::new(0);

        let a = cell
            .get_or_try_init(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, ()>(7)
            })
            .unwrap();
        let b = cell
            .get_or_try_init(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, ()>(8)
            })
            .unwrap();

        assert_eq!((*a, *b), (7, 7));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_failed_init_leaves_empty() {
        let cell: Derived<u32> = Derived::new();
        assert_eq!(cell.get_or_try_init(|| Err("bad")), Err("bad"));
        assert!(!cell.is_set());
    }

    #[test]
    fn test_reset() {
        let cell: Derived<u32> = Derived::new();
        cell.get_or_try_init(|| Ok::<_, ()>(1)).unwrap();
        cell.reset();
        assert!(cell.get().is_none());
        assert_eq!(*cell.get_or_try_init(|| Ok::<_, ()>(2)).unwrap(), 2);
    }

    #[test]
    fn test_concurrent_first_use() {
        let cell: Arc<Derived<usize>> = Arc::new(Derived::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cell = Arc::clone(&cell);
                let calls = Arc::clone(&calls);
                thread::spawn(move || {
                    *cell
                        .get_or_try_init(|| {
                            calls.fetch_add(1, Ordering::SeqCst);
                            Ok::<_, ()>(42)
                        })
                        .unwrap()
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), 42);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
