//! Runtime abstraction for serving library requests.

use crate::EnvError;
use async_trait::async_trait;
use std::time::Duration;

/// Where CPU-bound library work runs and how the caller waits for it.
///
/// # Implementations
///
/// - **Production**: `TokioRuntime` - `spawn_blocking` on the Tokio blocking pool
/// - **Tests**: gated runtimes that hold work until released, making
///   cancellation races deterministic
#[async_trait]
pub trait LibraryRuntime: Send + Sync + 'static {
    /// Runs `job` away from the async executor and awaits its result.
    ///
    /// A job that panics surfaces as [`EnvError::Task`].
    async fn spawn_compute<F, T>(&self, job: F) -> Result<T, EnvError>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static;

    /// Suspends the caller; used to bound request latency.
    async fn sleep(&self, duration: Duration);

    /// Monotonic time since the runtime was created.
    fn now(&self) -> Duration;
}
