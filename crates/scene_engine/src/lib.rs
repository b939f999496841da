//! # Scene Engine
//!
//! A scene graph whose nodes cache their world transforms and recompute them
//! lazily, plus the renderable objects that read those transforms.
//!
//! ## Features
//!
//! - **Lazy transforms**: derived position, orientation, scale and matrices
//!   are recomputed only when read or flushed after a change
//! - **Minimal flushes**: a change marks one path to the root; the per-frame
//!   cascade skips untouched branches
//! - **Queued updates**: other threads register nodes through a shared
//!   scheduler drained at the start of each frame
//! - **Renderables**: cameras, skinned entities and billboard sets attached to
//!   nodes by handle
//!
//! ## Quick Start
//!
//! ```rust
//! use scene_engine::prelude::*;
//!
//! fn main() -> Result<(), SceneError> {
//!     let mut scene = SceneManager::new();
//!     let root = scene.root_node();
//!     let ship = scene.create_child_scene_node(root, Some("ship"))?;
//!     scene.tree_mut().set_position(ship, Vec3::new(10.0, 0.0, 0.0));
//!
//!     let camera = scene.create_camera("main")?;
//!     camera.set_position(Vec3::new(0.0, 5.0, 20.0));
//!
//!     scene.render_frame("main")?;
//!     assert_eq!(scene.tree_mut().derived_position(ship), Vec3::new(10.0, 0.0, 0.0));
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod foundation;
pub mod render;
pub mod scene;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError, SceneConfig},
        foundation::{
            math::{Mat4, Plane, Quat, Transform, Vec3},
            time::FrameTimer,
        },
        render::{AnimationState, Billboard, BillboardSet, BillboardType, Camera, Entity, Skeleton},
        scene::{NodeId, NodeTree, SceneError, SceneManager, TransformSpace, UpdateQueue, UpdateScheduler},
    };
}
