//! Scene graph with lazily propagated transforms
//!
//! Nodes live in a [`NodeTree`] arena and hold a local position, orientation
//! and scale. World ("derived") transforms are computed on demand and cached;
//! mutation marks the smallest set of nodes stale and a per-frame cascade
//! from each root recomputes only that set.
//!
//! ## Architecture
//!
//! ```text
//! Other threads ──queue──▶ UpdateScheduler
//!                               │ drained each frame
//!                               ▼
//! SceneManager ──update──▶ NodeTree (nodes, dirty flags, caches)
//!      │                        ▲
//!      └──prepare──▶ Camera / Entity / BillboardSet (read transforms)
//! ```
//!
//! The dirty protocol, in short:
//! - a changed node flags itself and its subtree stale and registers with its
//!   parent once, building a path of selective update sets to the root
//! - a node that must recompute every descendant stops tracking individual
//!   children
//! - reading a derived value of a stale node pulls its ancestors first, so
//!   reads are correct between frames

mod error;
mod node;
mod scene_manager;
mod scheduler;
mod transform;
mod tree;
mod update;

pub use error::SceneError;
pub use node::{BoneHandle, Node, NodeFlags, NodeId, NodeKind, NodeStats, TransformSpace, UpdateListener};
pub use scene_manager::SceneManager;
pub use scheduler::{TreeId, UpdateQueue, UpdateScheduler};
pub use tree::NodeTree;

#[cfg(test)]
mod tests;
