//! Dirty-flag propagation and the update cascade
//!
//! A mutated node marks itself and its whole subtree stale, then registers
//! itself with its parent. The parent records it in its selective update set
//! and registers itself in turn, building a single dirty path to the root
//! without touching siblings. A later cascade from the root follows that path
//! (or the whole subtree where a node asked for it) and recomputes only what
//! changed.

use std::sync::Arc;

use log::{debug, trace, warn};

use super::node::{NodeFlags, NodeId};
use super::NodeTree;

impl NodeTree {
    /// Mark a node stale, schedule its whole subtree and tell the parent
    ///
    /// With `force_parent_update` the parent is told even if it was told
    /// already.
    pub fn need_update(&mut self, id: NodeId, force_parent_update: bool) {
        let node = &mut self.nodes[id];
        node.flags.insert(
            NodeFlags::NEED_PARENT_UPDATE
                | NodeFlags::NEED_CHILD_UPDATE
                | NodeFlags::NEED_TRANSFORM_UPDATE
                | NodeFlags::NEED_RELATIVE_TRANSFORM_UPDATE,
        );
        node.children_to_update.clear();

        if let Some(parent) = node.parent {
            if force_parent_update || !node.flags.contains(NodeFlags::PARENT_NOTIFIED) {
                node.flags.insert(NodeFlags::PARENT_NOTIFIED);
                self.request_update(parent, id);
            }
        }
    }

    /// Register `child` in `parent`'s selective update set
    pub fn request_update(&mut self, parent: NodeId, child: NodeId) {
        let node = &mut self.nodes[parent];
        if node.flags.contains(NodeFlags::NEED_CHILD_UPDATE) {
            return;
        }

        node.children_to_update.insert(child);

        if let Some(grandparent) = node.parent {
            if !node.flags.contains(NodeFlags::PARENT_NOTIFIED) {
                node.flags.insert(NodeFlags::PARENT_NOTIFIED);
                self.request_update(grandparent, parent);
            }
        }
    }

    /// Withdraw `child` from `parent`'s selective update set
    ///
    /// When the set empties the withdrawal climbs to the grandparent, unless
    /// the parent still needs a full subtree update.
    pub fn cancel_update(&mut self, parent: NodeId, child: NodeId) {
        let node = &mut self.nodes[parent];
        node.children_to_update.remove(&child);

        if node.children_to_update.is_empty() && !node.flags.contains(NodeFlags::NEED_CHILD_UPDATE) {
            if let Some(grandparent) = node.parent {
                node.flags.remove(NodeFlags::PARENT_NOTIFIED);
                self.cancel_update(grandparent, parent);
            }
        }
    }

    /// Flush pending changes from `id` downwards
    ///
    /// For a root node the cascade runs as owner of the scheduler gate, so
    /// other threads cannot queue until it is done.
    /// `update_children` forces a visit of the node's pending children even
    /// when it is clean itself; `has_parent_changed` forces recomputation of
    /// the node and its entire subtree.
    pub fn update(&mut self, id: NodeId, update_children: bool, has_parent_changed: bool) {
        if self.nodes[id].parent.is_none() {
            let scheduler = Arc::clone(&self.scheduler);
            let _cascade = scheduler.begin_cascade();
            self.cascade(id, update_children, has_parent_changed, false);
        } else {
            self.cascade(id, update_children, has_parent_changed, false);
        }
    }

    /// One step of the cascade
    ///
    /// Below the entry node `parent_settled` holds: the parent was visited
    /// just before, so its derived transform is read directly. The entry node
    /// refreshes its ancestor chain once.
    fn cascade(&mut self, id: NodeId, update_children: bool, has_parent_changed: bool, parent_settled: bool) {
        let parent = self.nodes[id].parent;
        if let (false, Some(parent)) = (parent_settled, parent) {
            self.derived_transform(parent);
        }
        let parent_moved =
            parent.is_some_and(|parent| self.nodes[id].parent_generation != self.nodes[parent].generation);
        let has_parent_changed = has_parent_changed || parent_moved;

        let node = &mut self.nodes[id];
        node.flags.remove(NodeFlags::PARENT_NOTIFIED);
        node.stats.visits += 1;

        let need_parent = node.flags.contains(NodeFlags::NEED_PARENT_UPDATE);
        let need_child = node.flags.contains(NodeFlags::NEED_CHILD_UPDATE);
        if !update_children && !need_parent && !need_child && !has_parent_changed {
            return;
        }

        if need_parent || has_parent_changed {
            self.recompute(id);
        }

        if need_child || has_parent_changed {
            for index in 0..self.nodes[id].children.len() {
                let child = self.nodes[id].children[index];
                self.cascade(child, true, true, true);
            }
        } else {
            let selected = self.nodes[id].children_to_update.take();
            for child in selected {
                self.cascade(child, true, false, true);
            }
        }

        let node = &mut self.nodes[id];
        node.children_to_update.clear();
        node.flags.remove(NodeFlags::NEED_CHILD_UPDATE);
    }

    /// Recompute the derived transform from the parent's
    ///
    /// Refreshes the parent first if it is stale, then recomputes this node:
    /// bumps its generation, invalidates both matrix caches and fires update
    /// listeners.
    pub fn update_from_parent(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id].parent {
            self.derived_transform(parent);
        }
        self.recompute(id);
    }

    /// Compose against the parent's cached derived transform as it stands
    pub(super) fn recompute(&mut self, id: NodeId) {
        let parent_state = self.nodes[id].parent.map(|parent| {
            let parent = &self.nodes[parent];
            (parent.derived, parent.generation)
        });

        let node = &mut self.nodes[id];
        node.derived = match parent_state {
            Some((parent, generation)) => {
                node.parent_generation = generation;
                parent.compose(&node.local, node.inherit_orientation, node.inherit_scale)
            }
            None => node.local,
        };
        node.generation += 1;
        node.flags.remove(NodeFlags::NEED_PARENT_UPDATE);
        node.flags.insert(NodeFlags::NEED_TRANSFORM_UPDATE | NodeFlags::NEED_RELATIVE_TRANSFORM_UPDATE);
        node.stats.recomputes += 1;
        trace!("Recomputed '{}': {:?}", node.name, node.derived.position);

        if !node.suppress_update_events {
            let snapshot = node.derived;
            for listener in &mut node.listeners {
                listener(id, &snapshot);
            }
        }
    }

    /// Drain this tree's queued updates, forcing each node to re-notify
    ///
    /// Runs as owner of the scheduler gate. Call once per frame before
    /// cascading the roots. Ids of nodes destroyed
    /// since they were queued are dropped with a warning. Returns the number of
    /// nodes marked.
    pub fn process_queued_updates(&mut self) -> usize {
        let scheduler = Arc::clone(&self.scheduler);
        let drain = scheduler.begin_cascade();
        let tree = self.tree_id;
        let queued = scheduler.pending().take_where(|&(owner, _)| owner == tree);

        let mut marked = 0;
        for (_, id) in queued {
            if self.nodes.contains_key(id) {
                self.need_update(id, true);
                marked += 1;
            } else {
                warn!("Skipping queued update for destroyed node {:?}", id);
            }
        }
        drop(drain);

        if marked > 0 {
            debug!("Processed {} queued node updates", marked);
        }
        marked
    }
}
