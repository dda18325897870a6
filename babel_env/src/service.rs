//! Page service: off-path page generation with supersede-on-request semantics.

use crate::{CancelToken, EnvError, LibraryRuntime};
use babel_core::{Coordinates, Library, PageRef};
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tracing::{debug, trace};

/// Serves pages and searches from a shared [`Library`].
///
/// At most one page request is live at a time: starting a new one cancels
/// the previous batch, which stops before its next line. Searches are
/// independent of page requests.
pub struct PageService<R: LibraryRuntime> {
    library: Arc<Library>,
    runtime: Arc<R>,
    current: Mutex<Option<CancelToken>>,
    timeout: Option<Duration>,
}

impl<R: LibraryRuntime> PageService<R> {
    /// Creates a service without a timeout.
    pub fn new(library: Arc<Library>, runtime: Arc<R>) -> Self {
        Self {
            library,
            runtime,
            current: Mutex::new(None),
            timeout: None,
        }
    }

    /// Bounds every request; on expiry the batch is cancelled.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn library(&self) -> &Arc<Library> {
        &self.library
    }

    /// Cancels the in-flight page request, if any.
    pub fn cancel_current(&self) {
        let current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(token) = current.as_ref() {
            token.cancel();
        }
    }

    /// Generates every line of `page`, superseding any earlier request.
    pub async fn fetch_page(&self, page: PageRef) -> Result<Vec<String>, EnvError> {
        page.validate(self.library.layout())?;

        let token = self.supersede();
        let library = Arc::clone(&self.library);
        let job_token = token.clone();
        let started = self.runtime.now();

        let job = self
            .runtime
            .spawn_compute(move || render_page(&library, &page, &job_token));
        let lines = self.bounded(job, &token).await??;

        debug!(
            "Page served in {:?}",
            self.runtime.now().saturating_sub(started)
        );
        Ok(lines)
    }

    /// Locates `text` off the caller's path.
    pub async fn search(&self, text: impl Into<String>) -> Result<Coordinates, EnvError> {
        let text = text.into();
        let library = Arc::clone(&self.library);
        let job = self.runtime.spawn_compute(move || library.search(&text));
        self.bounded(job, &CancelToken::new()).await
    }

    /// Installs a fresh token, cancelling the previous one.
    fn supersede(&self) -> CancelToken {
        let token = CancelToken::new();
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = current.replace(token.clone()) {
            trace!("Superseding in-flight page request");
            previous.cancel();
        }
        token
    }

    /// Awaits `job`, racing it against the configured timeout.
    async fn bounded<T, Fut>(&self, job: Fut, token: &CancelToken) -> Result<T, EnvError>
    where
        Fut: Future<Output = Result<T, EnvError>>,
    {
        let Some(timeout) = self.timeout else {
            return job.await;
        };

        tokio::select! {
            result = job => result,
            _ = self.runtime.sleep(timeout) => {
                token.cancel();
                Err(EnvError::Timeout(timeout.as_millis() as u64))
            }
        }
    }
}

/// Renders a page line by line, stopping as soon as `token` is cancelled.
pub(crate) fn render_page(
    library: &Library,
    page: &PageRef,
    token: &CancelToken,
) -> Result<Vec<String>, EnvError> {
    let lines = library.layout().lines;
    let mut out = Vec::with_capacity(lines as usize);
    for line in 0..lines {
        if token.is_cancelled() {
            trace!("Page batch cancelled after {} lines", line);
            return Err(EnvError::Cancelled);
        }
        out.push(library.line(&page.line(line))?);
    }
    Ok(out)
}
