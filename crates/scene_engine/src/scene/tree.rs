//! Node arena and hierarchy editing

use std::sync::Arc;

use log::debug;
use slotmap::SlotMap;

use super::node::{BoneHandle, Node, NodeFlags, NodeId, NodeKind};
use super::scheduler::{TreeId, UpdateQueue, UpdateScheduler};
use super::transform::normalized;
use super::SceneError;
use crate::config::SceneConfig;
use crate::foundation::math::{Quat, Vec3};

/// Arena owning every node of one scene hierarchy
///
/// Ownership runs through the arena; the parent link of a node is a plain
/// [`NodeId`]. Several roots may coexist. All mutation needs `&mut NodeTree`,
/// the only cross-thread entry point is the shared [`UpdateScheduler`].
#[derive(Debug)]
pub struct NodeTree {
    pub(crate) nodes: SlotMap<NodeId, Node>,
    pub(crate) scheduler: Arc<UpdateScheduler>,
    pub(crate) tree_id: TreeId,
    config: SceneConfig,
    unnamed_count: u64,
    next_bone_handle: u32,
}

impl Default for NodeTree {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeTree {
    /// Create a tree with its own scheduler and default configuration
    pub fn new() -> Self {
        Self::with_scheduler(UpdateScheduler::shared())
    }

    /// Create a tree queueing through the given scheduler
    pub fn with_scheduler(scheduler: Arc<UpdateScheduler>) -> Self {
        Self::build(SceneConfig::default(), scheduler)
    }

    /// Create a tree with a validated configuration
    pub fn with_config(config: SceneConfig, scheduler: Arc<UpdateScheduler>) -> Result<Self, SceneError> {
        config.validate()?;
        Ok(Self::build(config, scheduler))
    }

    fn build(config: SceneConfig, scheduler: Arc<UpdateScheduler>) -> Self {
        let tree_id = scheduler.register_tree();
        Self {
            nodes: SlotMap::with_key(),
            scheduler,
            tree_id,
            config,
            unnamed_count: 0,
            next_bone_handle: 0,
        }
    }

    /// Configuration applied to new nodes
    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// Scheduler shared with writer threads
    pub fn scheduler(&self) -> &Arc<UpdateScheduler> {
        &self.scheduler
    }

    /// Identity of this tree within its scheduler
    pub fn tree_id(&self) -> TreeId {
        self.tree_id
    }

    /// Thread-safe handle for queueing updates on this tree
    pub fn update_queue(&self) -> UpdateQueue {
        UpdateQueue::new(Arc::clone(&self.scheduler), self.tree_id)
    }

    /// Queue a node for a forced update at the next drain
    pub fn queue_need_update(&self, id: NodeId) -> bool {
        self.scheduler.queue_need_update(self.tree_id, id)
    }

    // ---- creation ----

    /// Create a detached scene node
    pub fn create_node(&mut self, name: Option<&str>) -> NodeId {
        self.insert_node(name, NodeKind::Scene)
    }

    /// Create a detached bone with a fresh handle
    pub fn create_bone(&mut self, name: Option<&str>) -> Result<NodeId, SceneError> {
        let kind = NodeKind::Bone(self.allocate_bone_handle()?);
        Ok(self.insert_node(name, kind))
    }

    /// Create a node attached to `parent`; bones beget bones
    pub fn create_child(&mut self, parent: NodeId, name: Option<&str>) -> Result<NodeId, SceneError> {
        self.create_child_with_transform(parent, name, Vec3::zeros(), Quat::identity())
    }

    /// Create an attached node with an initial local position and orientation
    pub fn create_child_with_transform(
        &mut self,
        parent: NodeId,
        name: Option<&str>,
        position: Vec3,
        orientation: Quat,
    ) -> Result<NodeId, SceneError> {
        let kind = match self.nodes[parent].kind {
            NodeKind::Scene => NodeKind::Scene,
            NodeKind::Bone(_) => NodeKind::Bone(self.allocate_bone_handle()?),
        };
        let child = self.insert_node(name, kind);
        {
            let node = &mut self.nodes[child];
            node.local.position = position;
            node.local.orientation = normalized(orientation);
        }

        if let Err(err) = self.add_child(parent, child) {
            self.nodes.remove(child);
            return Err(err);
        }
        Ok(child)
    }

    fn insert_node(&mut self, name: Option<&str>, kind: NodeKind) -> NodeId {
        let name = match name {
            Some(name) => name.to_string(),
            None => {
                self.unnamed_count += 1;
                format!("{}{}", self.config.unnamed_node_prefix, self.unnamed_count)
            }
        };

        let mut node = Node::new(name, kind);
        node.inherit_orientation = self.config.default_inherit_orientation;
        node.inherit_scale = self.config.default_inherit_scale;
        node.suppress_update_events = self.config.suppress_update_events;

        let id = self.nodes.insert(node);
        debug!("Created {:?} node '{}' ({:?})", kind, self.nodes[id].name, id);
        id
    }

    fn allocate_bone_handle(&mut self) -> Result<BoneHandle, SceneError> {
        let handle = u16::try_from(self.next_bone_handle)
            .map_err(|_| SceneError::BoneLimitReached(usize::from(u16::MAX) + 1))?;
        self.next_bone_handle += 1;
        Ok(BoneHandle(handle))
    }

    // ---- lookup ----

    /// Node by id
    ///
    /// # Panics
    /// If the node has been destroyed.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    /// Node by id, `None` if destroyed
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Whether the id refers to a live node
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Number of live nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree has no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All live node ids
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys()
    }

    /// Nodes without a parent
    pub fn roots(&self) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|(_, node)| node.parent.is_none())
            .map(|(id, _)| id)
            .collect()
    }

    /// Node name
    pub fn name(&self, id: NodeId) -> &str {
        &self.nodes[id].name
    }

    /// Parent of a node
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id].parent
    }

    /// Children of a node in attach order
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id].children
    }

    /// Number of children
    pub fn child_count(&self, id: NodeId) -> usize {
        self.nodes[id].children.len()
    }

    /// Child with the given name
    pub fn child_by_name(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        self.nodes[parent]
            .children
            .iter()
            .copied()
            .find(|&child| self.nodes[child].name == name)
    }

    /// Whether `child` is attached directly below `parent`
    pub fn has_child(&self, parent: NodeId, child: NodeId) -> bool {
        self.nodes[child].parent == Some(parent)
    }

    /// Whether `ancestor` is on the parent chain of `id`
    pub fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = self.nodes[id].parent;
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.nodes[node].parent;
        }
        false
    }

    // ---- attach / detach ----

    /// Attach `child` below `parent`, detaching it from any previous parent
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), SceneError> {
        if parent == child {
            return Err(SceneError::SelfParenting(self.nodes[child].name.clone()));
        }
        if self.is_ancestor(child, parent) {
            return Err(SceneError::CyclicHierarchy {
                parent: self.nodes[parent].name.clone(),
                child: self.nodes[child].name.clone(),
            });
        }
        if self.child_by_name(parent, &self.nodes[child].name).is_some() {
            return Err(SceneError::DuplicateChildName {
                parent: self.nodes[parent].name.clone(),
                child: self.nodes[child].name.clone(),
            });
        }

        if let Some(old_parent) = self.nodes[child].parent {
            self.detach(old_parent, child);
        }

        self.nodes[parent].children.push(child);
        self.notify_of_new_parent(child, Some(parent));
        debug!("Attached '{}' to '{}'", self.nodes[child].name, self.nodes[parent].name);
        Ok(())
    }

    /// Re-parent a node, or detach it with `None`
    pub fn set_parent(&mut self, child: NodeId, parent: Option<NodeId>) -> Result<(), SceneError> {
        if self.nodes[child].parent == parent {
            return Ok(());
        }
        match parent {
            Some(parent) => self.add_child(parent, child),
            None => {
                self.remove_from_parent(child);
                Ok(())
            }
        }
    }

    /// Detach `child` from `parent`
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<NodeId, SceneError> {
        if !self.has_child(parent, child) {
            return Err(SceneError::NotAChild {
                parent: self.nodes[parent].name.clone(),
                child: self.nodes[child].name.clone(),
            });
        }
        self.detach(parent, child);
        Ok(child)
    }

    /// Detach the child with the given name from `parent`
    pub fn remove_child_by_name(&mut self, parent: NodeId, name: &str) -> Result<NodeId, SceneError> {
        let child = self.child_by_name(parent, name).ok_or_else(|| SceneError::ChildNotFound {
            parent: self.nodes[parent].name.clone(),
            child: name.to_string(),
        })?;
        self.detach(parent, child);
        Ok(child)
    }

    /// Detach a node from its parent, returning the former parent
    pub fn remove_from_parent(&mut self, id: NodeId) -> Option<NodeId> {
        let parent = self.nodes[id].parent?;
        self.detach(parent, id);
        Some(parent)
    }

    /// Detach every child of `parent`; the children become roots
    ///
    /// Each child's parent link is cleared and the child is re-dirtied, so
    /// its next read or cascade recomputes it as a root.
    pub fn remove_all_children(&mut self, parent: NodeId) -> Vec<NodeId> {
        let children = std::mem::take(&mut self.nodes[parent].children);
        for &child in &children {
            self.notify_of_new_parent(child, None);
        }
        self.nodes[parent].children_to_update.clear();
        debug!("Detached {} children from '{}'", children.len(), self.nodes[parent].name);
        children
    }

    /// Remove a node from the arena; its children become roots
    pub fn destroy_node(&mut self, id: NodeId) -> Node {
        self.remove_from_parent(id);
        self.remove_all_children(id);
        self.scheduler.dequeue(self.tree_id, id);
        let node = self.nodes.remove(id).unwrap_or_else(|| unreachable!("node {id:?} removed twice"));
        debug!("Destroyed node '{}'", node.name);
        node
    }

    /// Remove a node and every descendant from the arena
    pub fn destroy_subtree(&mut self, id: NodeId) -> usize {
        self.remove_from_parent(id);

        let mut stack = vec![id];
        let mut removed = 0;
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.remove(current) {
                self.scheduler.dequeue(self.tree_id, current);
                stack.extend(node.children);
                removed += 1;
            }
        }
        debug!("Destroyed subtree of {} nodes", removed);
        removed
    }

    fn detach(&mut self, parent: NodeId, child: NodeId) {
        self.cancel_update(parent, child);
        self.notify_of_new_parent(child, None);
        self.nodes[parent].children.retain(|&c| c != child);
    }

    fn notify_of_new_parent(&mut self, child: NodeId, parent: Option<NodeId>) {
        let node = &mut self.nodes[child];
        node.parent = parent;
        node.flags.remove(NodeFlags::PARENT_NOTIFIED);
        self.need_update(child, false);
    }

    // ---- inheritance ----

    /// Toggle whether the parent's orientation carries into this node
    pub fn set_inherit_orientation(&mut self, id: NodeId, inherit: bool) {
        self.nodes[id].inherit_orientation = inherit;
        self.need_update(id, false);
    }

    /// Toggle whether the parent's scale carries into this node
    pub fn set_inherit_scale(&mut self, id: NodeId, inherit: bool) {
        self.nodes[id].inherit_scale = inherit;
        self.need_update(id, false);
    }

    // ---- diagnostics ----

    /// Zero the work counters of every node
    pub fn reset_stats(&mut self) {
        for node in self.nodes.values_mut() {
            node.stats = Default::default();
        }
    }
}
