//! Production implementation of LibraryRuntime using Tokio.

use crate::{EnvError, LibraryRuntime};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Runtime backed by Tokio's blocking thread pool.
///
/// Must be used from within a Tokio runtime.
pub struct TokioRuntime {
    /// Start time for monotonic duration calculations
    start: Instant,
}

impl TokioRuntime {
    /// Creates a new TokioRuntime.
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Creates an Arc-wrapped runtime for sharing across services.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }
}

impl Default for TokioRuntime {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LibraryRuntime for TokioRuntime {
    async fn spawn_compute<F, T>(&self, job: F) -> Result<T, EnvError>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        tokio::task::spawn_blocking(job)
            .await
            .map_err(EnvError::task)
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }

    fn now(&self) -> Duration {
        self.start.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_spawn_compute() {
        let rt = TokioRuntime::new();
        let value = rt.spawn_compute(|| 6 * 7).await.unwrap();
        assert_eq!(value, 42);
    }

    #[tokio::test]
    async fn test_spawn_compute_panic() {
        let rt = TokioRuntime::new();
        let result: Result<(), _> = rt.spawn_compute(|| panic!("boom")).await;
        assert!(matches!(result, Err(EnvError::Task(_))));
    }

    #[tokio::test]
    async fn test_tokio_runtime_time() {
        let rt = TokioRuntime::new();
        let t1 = rt.now();
        rt.sleep(Duration::from_millis(10)).await;
        let t2 = rt.now();

        assert!(t2 - t1 >= Duration::from_millis(10));
    }
}
