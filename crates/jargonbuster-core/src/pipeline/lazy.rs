use std::future::Future;
use tokio::sync::OnceCell;

/// A value computed on first read and cached for the cell's lifetime.
///
/// Concurrent first reads wait on a single computation. A failed computation
/// leaves the cell empty so a later read can try again.
#[derive(Debug)]
pub struct LazyCell<T> {
    cell: OnceCell<T>,
}

impl<T> LazyCell<T> {
    pub fn new() -> Self {
        Self {
            cell: OnceCell::new(),
        }
    }

    /// A cell that already holds its value.
    pub fn ready(value: T) -> Self {
        Self {
            cell: OnceCell::new_with(Some(value)),
        }
    }

    pub fn get(&self) -> Option<&T> {
        self.cell.get()
    }

    pub fn is_computed(&self) -> bool {
        self.cell.initialized()
    }

    pub async fn get_or_try_compute<F, Fut, E>(&self, compute: F) -> Result<&T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.cell.get_or_try_init(compute).await
    }
}

impl<T> Default for LazyCell<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_computes_once() {
        let calls = AtomicUsize::new(0);
        let cell = LazyCell::new();

        for _ in 0..3 {
            let value = cell
                .get_or_try_compute(|| async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, ()>(42)
                })
                .await
                .unwrap();
            assert_eq!(*value, 42);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(cell.is_computed());
    }

    #[tokio::test]
    async fn test_failure_is_not_cached() {
        let cell: LazyCell<u32> = LazyCell::new();

        let failed = cell.get_or_try_compute(|| async { Err("nope") }).await;
        assert!(failed.is_err());
        assert!(!cell.is_computed());

        let value = cell.get_or_try_compute(|| async { Ok::<_, &str>(7) }).await;
        assert_eq!(value, Ok(&7));
    }

    #[test]
    fn test_ready_cell() {
        let cell = LazyCell::ready("done");
        assert_eq!(cell.get(), Some(&"done"));
    }
}
