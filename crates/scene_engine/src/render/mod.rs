//! # Transform-Driven Renderables
//!
//! Objects that attach to scene nodes and read their transforms when a frame
//! is prepared:
//!
//! - **Camera**: view and projection from a parent node, with reflection and
//!   auto-tracking
//! - **Entity**: mesh instance whose skeleton is posed by animation states and
//!   cached once per frame
//! - **Skeleton**: bone hierarchy built on the same node machinery as the scene
//! - **Billboards**: camera-facing quads rebuilt per camera
//!
//! None of these own a node. They hold a [`NodeId`](crate::scene::NodeId) and
//! borrow the [`NodeTree`](crate::scene::NodeTree) when they need a transform.

pub mod animation;
pub mod billboard;
pub mod camera;
pub mod entity;
pub mod skeleton;

pub use animation::{Animation, AnimationState, AnimationStateSet, BonePose, PoseAnimation};
pub use billboard::{Billboard, BillboardOrigin, BillboardRotationType, BillboardSet, BillboardType, BillboardVertex};
pub use camera::{AutoTrack, Camera};
pub use entity::Entity;
pub use skeleton::Skeleton;
