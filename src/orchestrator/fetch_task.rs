//! Fetch task: drives one issued fetch to `Settled` or `Cancelled`.

use crate::error::{Error, RepositoryError, Result};
use crate::idle::IdleSignal;
use crate::repository::PageRepository;
use crate::subscription::{CancellableHandle, SubscriptionGroup};
use crate::types::{FetchEvent, HandleId, Page, PageRequest};
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Everything a spawned fetch needs, detached from the orchestrator
pub(super) struct FetchTaskContext<T> {
    pub(super) handle: CancellableHandle,
    pub(super) request: PageRequest,
    pub(super) repository: Arc<dyn PageRepository<T>>,
    pub(super) subscriptions: SubscriptionGroup,
    pub(super) event_tx: broadcast::Sender<FetchEvent>,
    pub(super) guard: SettlementGuard,
}

/// Marks the idle signal when the task ends, however it ends.
///
/// Created together with the handle, so it also fires for a task that is
/// dropped before its first poll. If the task is dropped or unwinds before
/// it resolved group membership (runtime shutdown, panicking callback), the
/// handle is pulled out of the group here so it cannot leak.
pub(super) struct SettlementGuard {
    id: HandleId,
    subscriptions: SubscriptionGroup,
    idle_signal: Arc<dyn IdleSignal>,
    membership_resolved: bool,
}

impl SettlementGuard {
    /// Pair with a `mark_busy()` that was just issued for `id`
    pub(super) fn new(
        id: HandleId,
        subscriptions: SubscriptionGroup,
        idle_signal: Arc<dyn IdleSignal>,
    ) -> Self {
        Self {
            id,
            subscriptions,
            idle_signal,
            membership_resolved: false,
        }
    }
}

impl Drop for SettlementGuard {
    fn drop(&mut self) {
        if !self.membership_resolved {
            self.subscriptions.remove(self.id);
        }
        self.idle_signal.mark_idle();
    }
}

/// Run one fetch until it settles or its handle is cancelled.
///
/// On settlement the handle is removed from the group and `on_result` is
/// invoked exactly once. If the handle was cancelled first (or is removed by
/// `cancel_all` between the repository answering and this task claiming the
/// handle), `on_result` is dropped without being called. The idle signal is
/// marked after the callback returns.
pub(super) async fn run_fetch<T, F>(ctx: FetchTaskContext<T>, on_result: F)
where
    T: Send + 'static,
    F: FnOnce(Result<Page<T>>) + Send + 'static,
{
    let FetchTaskContext {
        handle,
        request,
        repository,
        subscriptions,
        event_tx,
        mut guard,
    } = ctx;
    let id = handle.id();
    let page = request.page_number();

    let fetch = AssertUnwindSafe(repository.fetch_page(page)).catch_unwind();
    let outcome = tokio::select! {
        biased;
        _ = handle.cancelled() => None,
        result = fetch => Some(result.unwrap_or_else(|panic| {
            Err(RepositoryError::Panicked(panic_message(panic.as_ref())))
        })),
    };

    // Whoever removes the handle owns the terminal transition
    let settled = match outcome {
        Some(result) if subscriptions.remove(id).is_some() => Some(result),
        _ => None,
    };
    guard.membership_resolved = true;

    match settled {
        Some(Ok(page_data)) => {
            tracing::debug!(
                handle_id = id.0,
                page,
                item_count = page_data.items.len(),
                has_more = page_data.has_more,
                "Page fetch settled"
            );
            event_tx
                .send(FetchEvent::Completed {
                    id,
                    page,
                    item_count: page_data.items.len(),
                    has_more: page_data.has_more,
                })
                .ok();
            on_result(Ok(page_data));
        }
        Some(Err(source)) => {
            tracing::warn!(
                handle_id = id.0,
                page,
                repository = repository.name(),
                error = %source,
                "Page fetch failed"
            );
            event_tx
                .send(FetchEvent::Failed {
                    id,
                    page,
                    code: source.error_code().to_string(),
                    error: source.to_string(),
                })
                .ok();
            on_result(Err(Error::FetchFailed { page, source }));
        }
        None => {
            tracing::debug!(handle_id = id.0, page, "Page fetch cancelled");
            event_tx.send(FetchEvent::Cancelled { id, page }).ok();
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
