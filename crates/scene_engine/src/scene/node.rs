//! Scene graph node storage

use std::fmt;

use bitflags::bitflags;
use slotmap::new_key_type;

use crate::foundation::collections::OrderedSet;
use crate::foundation::math::{Mat4, Quat, Transform, Vec3};

new_key_type! {
    /// Handle to a node inside a [`NodeTree`](super::NodeTree)
    pub struct NodeId;
}

/// Index of a bone within its skeleton
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BoneHandle(pub u16);

impl BoneHandle {
    /// Position in the skeleton's bone list
    pub fn index(self) -> usize {
        usize::from(self.0)
    }
}

/// What a node represents
///
/// The kind of a child created through
/// [`NodeTree::create_child`](super::NodeTree::create_child) follows its
/// parent: children of bones are bones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Plain scene node carrying attached objects
    Scene,
    /// Skeleton bone
    Bone(BoneHandle),
}

impl NodeKind {
    /// Bone handle if this is a bone
    pub fn bone_handle(self) -> Option<BoneHandle> {
        match self {
            NodeKind::Bone(handle) => Some(handle),
            NodeKind::Scene => None,
        }
    }
}

bitflags! {
    /// Dirty state of a node
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct NodeFlags: u8 {
        /// Derived transform is stale
        const NEED_PARENT_UPDATE = 1 << 0;
        /// Every descendant must be recomputed on the next cascade
        const NEED_CHILD_UPDATE = 1 << 1;
        /// The parent has been told about this node and has not visited it yet
        const PARENT_NOTIFIED = 1 << 2;
        /// World matrix cache is stale
        const NEED_TRANSFORM_UPDATE = 1 << 3;
        /// Local matrix cache is stale
        const NEED_RELATIVE_TRANSFORM_UPDATE = 1 << 4;
    }
}

impl NodeFlags {
    /// State of a freshly created node: everything stale, parent not yet told
    pub const fn initial() -> Self {
        Self::NEED_PARENT_UPDATE
            .union(Self::NEED_CHILD_UPDATE)
            .union(Self::NEED_TRANSFORM_UPDATE)
            .union(Self::NEED_RELATIVE_TRANSFORM_UPDATE)
    }
}

/// Coordinate space for relative transform operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransformSpace {
    /// Relative to the node's own axes
    #[default]
    Local,
    /// Relative to the parent's axes
    Parent,
    /// Relative to world axes
    World,
}

/// Per-node work counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NodeStats {
    /// Times the update cascade entered this node
    pub visits: u64,
    /// Times the derived transform was recomputed from the parent
    pub recomputes: u64,
    /// Times the world matrix was rebuilt
    pub transform_rebuilds: u64,
    /// Times the local matrix was rebuilt
    pub relative_transform_rebuilds: u64,
    /// Times a lazy derived read checked this node
    pub derived_reads: u64,
}

/// Callback fired with the new derived transform after each recomputation
pub type UpdateListener = Box<dyn FnMut(NodeId, &Transform) + Send>;

/// One element of the scene hierarchy
///
/// Nodes live in a [`NodeTree`](super::NodeTree) arena and are edited through
/// it; the accessors here expose cached state without triggering updates.
pub struct Node {
    pub(crate) name: String,
    pub(crate) kind: NodeKind,

    pub(crate) local: Transform,
    pub(crate) derived: Transform,
    pub(crate) generation: u64,
    pub(crate) parent_generation: u64,
    pub(crate) cached_transform: Mat4,
    pub(crate) cached_relative_transform: Mat4,
    pub(crate) flags: NodeFlags,

    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) children_to_update: OrderedSet<NodeId>,

    pub(crate) inherit_orientation: bool,
    pub(crate) inherit_scale: bool,

    pub(crate) initial: Transform,
    pub(crate) accum_anim_weight: f32,
    pub(crate) translation_from_initial: Vec3,
    pub(crate) rotation_from_initial: Quat,
    pub(crate) scale_from_initial: Vec3,

    pub(crate) suppress_update_events: bool,
    pub(crate) listeners: Vec<UpdateListener>,
    pub(crate) stats: NodeStats,
}

impl Node {
    pub(crate) fn new(name: String, kind: NodeKind) -> Self {
        Self {
            name,
            kind,
            local: Transform::identity(),
            derived: Transform::identity(),
            generation: 0,
            parent_generation: 0,
            cached_transform: Mat4::identity(),
            cached_relative_transform: Mat4::identity(),
            flags: NodeFlags::initial(),
            parent: None,
            children: Vec::new(),
            children_to_update: OrderedSet::new(),
            inherit_orientation: true,
            inherit_scale: true,
            initial: Transform::identity(),
            accum_anim_weight: 0.0,
            translation_from_initial: Vec3::zeros(),
            rotation_from_initial: Quat::identity(),
            scale_from_initial: Vec3::new(1.0, 1.0, 1.0),
            suppress_update_events: false,
            listeners: Vec::new(),
            stats: NodeStats::default(),
        }
    }

    /// Number of times the derived transform has been recomputed
    ///
    /// Children remember the value they composed against; a mismatch marks
    /// their own derived transform stale.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Node name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Node kind
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Local position
    pub fn position(&self) -> Vec3 {
        self.local.position
    }

    /// Local orientation
    pub fn orientation(&self) -> Quat {
        self.local.orientation
    }

    /// Local scale
    pub fn scale(&self) -> Vec3 {
        self.local.scale
    }

    /// Local transform
    pub fn local_transform(&self) -> &Transform {
        &self.local
    }

    /// Last computed derived transform, possibly stale
    pub fn cached_derived_transform(&self) -> &Transform {
        &self.derived
    }

    /// Current dirty flags
    pub fn flags(&self) -> NodeFlags {
        self.flags
    }

    /// Whether the derived transform is stale
    pub fn needs_parent_update(&self) -> bool {
        self.flags.contains(NodeFlags::NEED_PARENT_UPDATE)
    }

    /// Whether every descendant is pending recomputation
    pub fn needs_child_update(&self) -> bool {
        self.flags.contains(NodeFlags::NEED_CHILD_UPDATE)
    }

    /// Whether the parent has been notified of this node's pending update
    pub fn is_parent_notified(&self) -> bool {
        self.flags.contains(NodeFlags::PARENT_NOTIFIED)
    }

    /// Parent link
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children in attach order
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Children registered for a selective update
    pub fn children_to_update(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.children_to_update.iter().copied()
    }

    /// Number of children registered for a selective update
    pub fn pending_child_count(&self) -> usize {
        self.children_to_update.len()
    }

    /// Whether the parent's orientation carries into this node
    pub fn inherit_orientation(&self) -> bool {
        self.inherit_orientation
    }

    /// Whether the parent's scale carries into this node
    pub fn inherit_scale(&self) -> bool {
        self.inherit_scale
    }

    /// Snapshot used as the base of weighted transforms
    pub fn initial_state(&self) -> &Transform {
        &self.initial
    }

    /// Whether update listeners are currently muted
    pub fn update_events_suppressed(&self) -> bool {
        self.suppress_update_events
    }

    /// Number of registered update listeners
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Work counters
    pub fn stats(&self) -> NodeStats {
        self.stats
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("local", &self.local)
            .field("derived", &self.derived)
            .field("flags", &self.flags)
            .field("parent", &self.parent)
            .field("children", &self.children)
            .field("children_to_update", &self.children_to_update)
            .field("listeners", &self.listeners.len())
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}
