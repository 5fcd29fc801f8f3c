//! Issuing page requests.

use super::FetchOrchestrator;
use super::fetch_task::{FetchTaskContext, SettlementGuard, run_fetch};
use crate::error::{Error, Result};
use crate::subscription::CancellableHandle;
use crate::types::{FetchEvent, HandleId, Page, PageRequest};
use std::sync::Arc;
use tokio::sync::oneshot;

impl<T> FetchOrchestrator<T>
where
    T: Send + 'static,
{
    /// Request one page and deliver the outcome to `on_result`
    ///
    /// The request is validated synchronously; the fetch itself runs on the
    /// orchestrator's runtime and this method returns immediately with the
    /// handle id of the new fetch.
    ///
    /// `on_result` is invoked exactly once, on a runtime worker thread, with
    /// either the page or [`Error::FetchFailed`], unless the fetch is
    /// cancelled first, in which case it is dropped without being called.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArgument`] if `page_number` is negative; the
    ///   repository is not contacted and no handle is registered.
    /// - [`Error::ShuttingDown`] once [`shutdown`](Self::shutdown) started.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use moviehub_fetch::{Config, FetchOrchestrator, InMemoryRepository, Movie, NoOpIdleSignal};
    /// # use std::sync::Arc;
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// # let orchestrator = FetchOrchestrator::<Movie>::new(
    /// #     Arc::new(InMemoryRepository::<Movie>::new()),
    /// #     Arc::new(NoOpIdleSignal),
    /// #     Config::default(),
    /// # )?;
    /// orchestrator.request_page(1, |result| match result {
    ///     Ok(page) => println!("{} movies, more: {}", page.items.len(), page.has_more),
    ///     Err(e) => eprintln!("could not load page: {e}"),
    /// })?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn request_page<F>(&self, page_number: i64, on_result: F) -> Result<HandleId>
    where
        F: FnOnce(Result<Page<T>>) + Send + 'static,
    {
        let request = PageRequest::new(page_number)?;
        self.issue(request, on_result)
    }

    /// Register and spawn an already validated request
    fn issue<F>(&self, request: PageRequest, on_result: F) -> Result<HandleId>
    where
        F: FnOnce(Result<Page<T>>) + Send + 'static,
    {
        // Held until the task is tracked so shutdown cannot slip in between
        let accepting = self.accepting_new.read();
        if !*accepting {
            tracing::debug!(page = request.page_number(), "Rejecting request during shutdown");
            return Err(Error::ShuttingDown);
        }

        let handle = CancellableHandle::new(self.next_handle_id());
        let id = handle.id();

        // Register before the fetch can possibly settle
        let inserted = self.subscriptions.insert(handle.clone());
        debug_assert!(inserted, "handle ids are never reused");

        self.idle_signal.mark_busy();
        let guard = SettlementGuard::new(
            id,
            self.subscriptions.clone(),
            Arc::clone(&self.idle_signal),
        );
        self.emit(FetchEvent::Issued {
            id,
            page: request.page_number(),
        });
        tracing::debug!(handle_id = id.0, page = request.page_number(), "Page fetch issued");

        let ctx = FetchTaskContext {
            handle,
            request,
            repository: Arc::clone(&self.repository),
            subscriptions: self.subscriptions.clone(),
            event_tx: self.event_tx.clone(),
            guard,
        };
        self.runtime
            .spawn(self.tasks.track_future(run_fetch(ctx, on_result)));
        drop(accepting);

        Ok(id)
    }

    /// Request one page and receive the outcome through a channel
    ///
    /// Lets the caller pick up the result on its own task instead of a
    /// runtime worker. If the fetch is cancelled the receiver resolves with
    /// [`oneshot::error::RecvError`].
    ///
    /// # Errors
    ///
    /// Same as [`request_page`](Self::request_page).
    pub fn request_page_channel(
        &self,
        page_number: i64,
    ) -> Result<(HandleId, oneshot::Receiver<Result<Page<T>>>)> {
        let request = PageRequest::new(page_number)?;
        self.issue_channel(request)
    }

    fn issue_channel(
        &self,
        request: PageRequest,
    ) -> Result<(HandleId, oneshot::Receiver<Result<Page<T>>>)> {
        let (tx, rx) = oneshot::channel();
        let id = self.issue(request, move |result| {
            // The caller may have stopped listening
            let _ = tx.send(result);
        })?;
        Ok((id, rx))
    }

    /// Request one page and wait for it
    ///
    /// Dropping the returned future does not cancel the fetch; use
    /// [`cancel_all`](Self::cancel_all) or [`cancel`](Self::cancel) for that.
    ///
    /// # Errors
    ///
    /// - Everything [`request_page`](Self::request_page) returns synchronously
    /// - [`Error::FetchFailed`] if the repository failed
    /// - [`Error::Cancelled`] if the fetch was cancelled before it settled
    pub async fn fetch_page(&self, page_number: i64) -> Result<Page<T>> {
        let request = PageRequest::new(page_number)?;
        let (_, rx) = self.issue_channel(request)?;
        rx.await.unwrap_or(Err(Error::Cancelled {
            page: request.page_number(),
        }))
    }
}
