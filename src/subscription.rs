//! Cancellable handles and the group that tracks them.
//!
//! Every in-flight fetch owns one [`CancellableHandle`]. The orchestrator keeps
//! the handle in a [`SubscriptionGroup`] from the moment the fetch is issued
//! until it either settles or is cancelled. Removal from the group is the
//! single point of arbitration between those two outcomes: whichever side
//! removes the handle first owns the terminal transition.

use crate::types::HandleId;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// A reference to one in-flight fetch
///
/// Cloning yields another reference to the same fetch; cancelling any clone
/// cancels them all.
#[derive(Clone, Debug)]
pub struct CancellableHandle {
    id: HandleId,
    token: CancellationToken,
}

impl CancellableHandle {
    /// Create an uncancelled handle
    pub fn new(id: HandleId) -> Self {
        Self {
            id,
            token: CancellationToken::new(),
        }
    }

    /// Identity of the fetch
    pub fn id(&self) -> HandleId {
        self.id
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Whether cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once cancellation is requested
    pub async fn cancelled(&self) {
        self.token.cancelled().await
    }
}

/// Thread-safe set of in-flight handles, keyed by [`HandleId`]
///
/// Cheap to clone; all clones share the same membership.
#[derive(Clone, Debug, Default)]
pub struct SubscriptionGroup {
    handles: Arc<Mutex<HashMap<HandleId, CancellableHandle>>>,
}

impl SubscriptionGroup {
    /// Create an empty group
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a handle to the group
    ///
    /// Returns `false` and leaves the group untouched if a handle with the same
    /// id is already a member.
    pub fn insert(&self, handle: CancellableHandle) -> bool {
        let mut handles = self.handles.lock();
        if handles.contains_key(&handle.id) {
            return false;
        }
        handles.insert(handle.id, handle);
        true
    }

    /// Remove a handle without cancelling it
    ///
    /// Returns the handle if it was still a member. At most one caller ever
    /// receives `Some` for a given id.
    pub fn remove(&self, id: HandleId) -> Option<CancellableHandle> {
        self.handles.lock().remove(&id)
    }

    /// Cancel and remove a single handle
    ///
    /// Returns `false` if the handle had already left the group.
    pub fn cancel(&self, id: HandleId) -> bool {
        match self.remove(id) {
            Some(handle) => {
                handle.cancel();
                true
            }
            None => false,
        }
    }

    /// Cancel every member and empty the group
    ///
    /// Returns the number of handles that were cancelled. Calling this on an
    /// empty group is a no-op.
    pub fn cancel_all(&self) -> usize {
        // Drain under the lock, cancel outside it
        let drained: Vec<CancellableHandle> = {
            let mut handles = self.handles.lock();
            handles.drain().map(|(_, handle)| handle).collect()
        };
        for handle in &drained {
            handle.cancel();
        }
        drained.len()
    }

    /// Whether a handle is currently a member
    pub fn contains(&self, id: HandleId) -> bool {
        self.handles.lock().contains_key(&id)
    }

    /// Number of members
    pub fn len(&self) -> usize {
        self.handles.lock().len()
    }

    /// Whether the group has no members
    pub fn is_empty(&self) -> bool {
        self.handles.lock().is_empty()
    }

    /// Ids of all members, in no particular order
    pub fn ids(&self) -> Vec<HandleId> {
        self.handles.lock().keys().copied().collect()
    }
}
