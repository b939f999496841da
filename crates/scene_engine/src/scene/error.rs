//! Scene graph errors

use crate::config::ConfigError;

/// Errors raised by hierarchy editing and renderable lookups
///
/// These are contract violations at the call site. The steady-state transform
/// path never returns them.
#[derive(thiserror::Error, Debug)]
pub enum SceneError {
    /// A node was asked to adopt itself
    #[error("Node '{0}' cannot be a child of itself")]
    SelfParenting(String),

    /// The parent already has a child of the same name
    #[error("Node '{parent}' already has a child named '{child}'")]
    DuplicateChildName {
        /// Parent node name
        parent: String,
        /// Conflicting child name
        child: String,
    },

    /// Attaching would make a node its own ancestor
    #[error("Attaching '{child}' below '{parent}' would create a cycle")]
    CyclicHierarchy {
        /// Requested parent name
        parent: String,
        /// Requested child name
        child: String,
    },

    /// No child with the given name exists
    #[error("Node '{parent}' has no child named '{child}'")]
    ChildNotFound {
        /// Parent node name
        parent: String,
        /// Missing child name
        child: String,
    },

    /// The node exists but is not attached to the given parent
    #[error("Node '{child}' is not a child of '{parent}'")]
    NotAChild {
        /// Parent node name
        parent: String,
        /// Child node name
        child: String,
    },

    /// Skeleton has no bone with the given name
    #[error("Bone '{0}' not found")]
    BoneNotFound(String),

    /// Every bone handle of the tree is taken
    #[error("Bone limit of {0} reached")]
    BoneLimitReached(usize),

    /// Skeleton already has a bone with the given name
    #[error("Bone '{0}' already exists")]
    DuplicateBoneName(String),

    /// Entity has no animation state with the given name
    #[error("Animation state '{0}' not found")]
    AnimationStateNotFound(String),

    /// Entity already has an animation state with the given name
    #[error("Animation state '{0}' already exists")]
    DuplicateAnimationState(String),

    /// Billboard pool is full and not allowed to grow
    #[error("Billboard pool exhausted ({0} billboards) and auto-extend is disabled")]
    BillboardPoolExhausted(usize),

    /// Scene manager has no object of this kind and name
    #[error("{kind} '{name}' not found")]
    ObjectNotFound {
        /// Object kind (camera, entity, billboard set)
        kind: &'static str,
        /// Missing name
        name: String,
    },

    /// Scene manager already has an object of this kind and name
    #[error("{kind} '{name}' already exists")]
    DuplicateObjectName {
        /// Object kind (camera, entity, billboard set)
        kind: &'static str,
        /// Conflicting name
        name: String,
    },

    /// Configuration failed to load or validate
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}
