//! Queued node updates shared across threads
//!
//! Writers that cannot borrow the tree (a physics thread, a network callback)
//! register nodes here. The frame driver drains the queue through
//! [`NodeTree::process_queued_updates`](super::NodeTree::process_queued_updates)
//! before cascading.
//!
//! Draining and every root cascade run as the owner of a gate. While another
//! thread owns it, `queue_need_update` blocks, so no registration lands
//! mid-flush. The owning thread passes through, which lets update listeners
//! queue nodes for the next frame.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, ThreadId};

use log::debug;

use super::NodeId;
use crate::foundation::collections::OrderedSet;

/// Identity of a tree registered with a scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TreeId(u32);

/// Pending-update set and the gate serialising root cascades
#[derive(Debug, Default)]
pub struct UpdateScheduler {
    pending: Mutex<OrderedSet<(TreeId, NodeId)>>,
    cascade_owner: Mutex<Option<ThreadId>>,
    cascade_finished: Condvar,
    next_tree: AtomicU32,
}

impl UpdateScheduler {
    /// Create an empty scheduler
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty scheduler ready to be shared
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    pub(crate) fn register_tree(&self) -> TreeId {
        TreeId(self.next_tree.fetch_add(1, Ordering::Relaxed))
    }

    /// Queue `node` of `tree` for a forced update; idempotent
    ///
    /// Blocks while another thread is cascading or draining.
    pub fn queue_need_update(&self, tree: TreeId, node: NodeId) -> bool {
        let _gate = self.wait_for_gate();
        let inserted = self.pending().insert((tree, node));
        if inserted {
            debug!("Queued {:?} of {:?} for update", node, tree);
        }
        inserted
    }

    /// Drop a queued entry, returning whether it was queued
    pub fn dequeue(&self, tree: TreeId, node: NodeId) -> bool {
        self.pending().remove(&(tree, node))
    }

    /// Whether `node` of `tree` is waiting in the queue
    pub fn is_queued(&self, tree: TreeId, node: NodeId) -> bool {
        self.pending().contains(&(tree, node))
    }

    /// Number of queued entries across all trees
    pub fn pending_count(&self) -> usize {
        self.pending().len()
    }

    /// Whether some thread currently owns the cascade gate
    pub fn is_cascading(&self) -> bool {
        self.owner().is_some()
    }

    /// Take the cascade gate for the current thread until the guard drops
    ///
    /// Re-entering from the owning thread yields a guard that leaves the gate
    /// held.
    pub(crate) fn begin_cascade(&self) -> CascadeGuard<'_> {
        let mut owner = self.wait_for_gate();
        let nested = owner.is_some();
        *owner = Some(thread::current().id());
        CascadeGuard { scheduler: self, nested }
    }

    /// Pending set
    ///
    /// A poisoned lock is recovered: the set holds plain ids and stays
    /// consistent even if a holder panicked.
    pub(crate) fn pending(&self) -> MutexGuard<'_, OrderedSet<(TreeId, NodeId)>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn owner(&self) -> MutexGuard<'_, Option<ThreadId>> {
        self.cascade_owner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Lock the gate once no other thread owns it
    fn wait_for_gate(&self) -> MutexGuard<'_, Option<ThreadId>> {
        let me = thread::current().id();
        self.cascade_finished
            .wait_while(self.owner(), |owner| matches!(*owner, Some(id) if id != me))
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Ownership of the cascade gate, released on drop
pub(crate) struct CascadeGuard<'a> {
    scheduler: &'a UpdateScheduler,
    nested: bool,
}

impl Drop for CascadeGuard<'_> {
    fn drop(&mut self) {
        if !self.nested {
            *self.scheduler.owner() = None;
            self.scheduler.cascade_finished.notify_all();
        }
    }
}

/// Cloneable, thread-safe handle for queueing updates on one tree
#[derive(Debug, Clone)]
pub struct UpdateQueue {
    scheduler: Arc<UpdateScheduler>,
    tree: TreeId,
}

impl UpdateQueue {
    pub(crate) fn new(scheduler: Arc<UpdateScheduler>, tree: TreeId) -> Self {
        Self { scheduler, tree }
    }

    /// Queue `node` for a forced update at the next drain
    pub fn queue_need_update(&self, node: NodeId) -> bool {
        self.scheduler.queue_need_update(self.tree, node)
    }

    /// Whether `node` is waiting in the queue
    pub fn is_queued(&self, node: NodeId) -> bool {
        self.scheduler.is_queued(self.tree, node)
    }

    /// Tree this handle queues for
    pub fn tree(&self) -> TreeId {
        self.tree
    }
}
