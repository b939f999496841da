//! Scene Manager - owns the node tree and drives it once per frame
//!
//! The frame loop is split in two:
//! 1. [`SceneManager::update_scene_graph`] drains queued updates, cascades
//!    the scene root and lets auto-tracking cameras turn to their targets
//! 2. [`SceneManager::prepare_frame`] has renderables read the settled
//!    transforms for one camera: skinned entities cache bone matrices and
//!    billboard sets rebuild their vertices
//!
//! Cameras, entities and billboard sets are kept by name per kind.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, trace};

use crate::config::{Config, SceneConfig};
use crate::foundation::time::{FrameTimer, Stopwatch};
use crate::render::{BillboardSet, Camera, Entity, Skeleton};
use crate::scene::{NodeId, NodeTree, SceneError, UpdateQueue, UpdateScheduler};

const CAMERA: &str = "Camera";
const ENTITY: &str = "Entity";
const BILLBOARD_SET: &str = "BillboardSet";

/// Scene Manager - coordinates the node tree and the objects attached to it
#[derive(Debug)]
pub struct SceneManager {
    config: SceneConfig,
    tree: NodeTree,
    root: NodeId,
    timer: FrameTimer,
    last_update: Duration,

    cameras: HashMap<String, Camera>,
    entities: HashMap<String, Entity>,
    billboard_sets: HashMap<String, BillboardSet>,
}

impl SceneManager {
    /// Create a scene manager with default configuration
    pub fn new() -> Self {
        let config = SceneConfig::default();
        let tree = NodeTree::new();
        Self::assemble(config, tree)
    }

    /// Create a scene manager with custom configuration
    pub fn with_config(config: SceneConfig) -> Result<Self, SceneError> {
        Self::with_scheduler(config, UpdateScheduler::shared())
    }

    /// Create a scene manager whose tree queues through a shared scheduler
    pub fn with_scheduler(config: SceneConfig, scheduler: Arc<UpdateScheduler>) -> Result<Self, SceneError> {
        let tree = NodeTree::with_config(config.clone(), scheduler)?;
        Ok(Self::assemble(config, tree))
    }

    /// Load configuration from a `.toml` or `.ron` file
    pub fn from_config_file(path: impl AsRef<Path>) -> Result<Self, SceneError> {
        let config = SceneConfig::load_from_file(path)?;
        Self::with_config(config)
    }

    fn assemble(config: SceneConfig, mut tree: NodeTree) -> Self {
        let root = tree.create_node(Some("SceneRoot"));
        let timer = FrameTimer::new(config.frame_smoothing());
        info!("Scene manager created (tree {:?})", tree.tree_id());
        Self {
            config,
            tree,
            root,
            timer,
            last_update: Duration::ZERO,
            cameras: HashMap::new(),
            entities: HashMap::new(),
            billboard_sets: HashMap::new(),
        }
    }

    /// Active configuration
    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    // ---- nodes ----

    /// Root of the scene hierarchy
    pub fn root_node(&self) -> NodeId {
        self.root
    }

    /// Node tree
    pub fn tree(&self) -> &NodeTree {
        &self.tree
    }

    /// Mutable node tree
    pub fn tree_mut(&mut self) -> &mut NodeTree {
        &mut self.tree
    }

    /// Handle for queueing updates from other threads
    pub fn update_queue(&self) -> UpdateQueue {
        self.tree.update_queue()
    }

    /// Create a detached scene node
    pub fn create_scene_node(&mut self, name: Option<&str>) -> NodeId {
        self.tree.create_node(name)
    }

    /// Create a node below `parent`
    pub fn create_child_scene_node(&mut self, parent: NodeId, name: Option<&str>) -> Result<NodeId, SceneError> {
        self.tree.create_child(parent, name)
    }

    /// Destroy a node, detaching every object attached to it
    ///
    /// The root node cannot be destroyed; asking to is ignored.
    pub fn destroy_scene_node(&mut self, id: NodeId) {
        if id == self.root {
            return;
        }
        self.tree.destroy_node(id);

        for camera in self.cameras.values_mut().filter(|c| c.parent() == Some(id)) {
            camera.set_parent(None);
        }
        for entity in self.entities.values_mut().filter(|e| e.parent() == Some(id)) {
            entity.set_parent(None);
        }
        for set in self.billboard_sets.values_mut().filter(|s| s.parent() == Some(id)) {
            set.set_parent(None);
        }
    }

    // ---- cameras ----

    /// Create a camera
    pub fn create_camera(&mut self, name: &str) -> Result<&mut Camera, SceneError> {
        insert_unique(&mut self.cameras, CAMERA, name, Camera::new(name))
    }

    /// Camera by name
    pub fn camera(&self, name: &str) -> Result<&Camera, SceneError> {
        self.cameras.get(name).ok_or_else(|| not_found(CAMERA, name))
    }

    /// Mutable camera by name
    pub fn camera_mut(&mut self, name: &str) -> Result<&mut Camera, SceneError> {
        self.cameras.get_mut(name).ok_or_else(|| not_found(CAMERA, name))
    }

    /// Camera and the tree it reads from, for calls that need both
    pub fn camera_and_tree(&mut self, name: &str) -> Result<(&mut Camera, &mut NodeTree), SceneError> {
        let camera = self.cameras.get_mut(name).ok_or_else(|| not_found(CAMERA, name))?;
        Ok((camera, &mut self.tree))
    }

    /// Remove a camera
    pub fn destroy_camera(&mut self, name: &str) -> Result<Camera, SceneError> {
        self.cameras.remove(name).ok_or_else(|| not_found(CAMERA, name))
    }

    // ---- entities ----

    /// Create an entity, skinned if a skeleton is given
    pub fn create_entity(&mut self, name: &str, skeleton: Option<Skeleton>) -> Result<&mut Entity, SceneError> {
        let entity = match skeleton {
            Some(skeleton) => Entity::with_skeleton(name, skeleton),
            None => Entity::new(name),
        };
        insert_unique(&mut self.entities, ENTITY, name, entity)
    }

    /// Entity by name
    pub fn entity(&self, name: &str) -> Result<&Entity, SceneError> {
        self.entities.get(name).ok_or_else(|| not_found(ENTITY, name))
    }

    /// Mutable entity by name
    pub fn entity_mut(&mut self, name: &str) -> Result<&mut Entity, SceneError> {
        self.entities.get_mut(name).ok_or_else(|| not_found(ENTITY, name))
    }

    /// Remove an entity
    pub fn destroy_entity(&mut self, name: &str) -> Result<Entity, SceneError> {
        self.entities.remove(name).ok_or_else(|| not_found(ENTITY, name))
    }

    // ---- billboard sets ----

    /// Create a billboard set sized from the configuration
    pub fn create_billboard_set(&mut self, name: &str) -> Result<&mut BillboardSet, SceneError> {
        let mut set = BillboardSet::new(name, self.config.billboard_pool_size);
        set.set_auto_extend(self.config.billboard_auto_extend);
        insert_unique(&mut self.billboard_sets, BILLBOARD_SET, name, set)
    }

    /// Billboard set by name
    pub fn billboard_set(&self, name: &str) -> Result<&BillboardSet, SceneError> {
        self.billboard_sets.get(name).ok_or_else(|| not_found(BILLBOARD_SET, name))
    }

    /// Mutable billboard set by name
    pub fn billboard_set_mut(&mut self, name: &str) -> Result<&mut BillboardSet, SceneError> {
        self.billboard_sets.get_mut(name).ok_or_else(|| not_found(BILLBOARD_SET, name))
    }

    /// Remove a billboard set
    pub fn destroy_billboard_set(&mut self, name: &str) -> Result<BillboardSet, SceneError> {
        self.billboard_sets.remove(name).ok_or_else(|| not_found(BILLBOARD_SET, name))
    }

    // ---- frame loop ----

    /// Settle every transform for this frame
    ///
    /// Returns the smoothed frame time in seconds.
    pub fn update_scene_graph(&mut self) -> f32 {
        let frame_time = self.timer.frame_started();
        let stopwatch = Stopwatch::start_new();

        let queued = self.tree.process_queued_updates();
        self.tree.update(self.root, true, false);
        for camera in self.cameras.values_mut() {
            camera.auto_track(&mut self.tree);
        }

        self.last_update = stopwatch.elapsed();
        trace!(
            "Frame {} updated in {:.3} ms ({} queued nodes)",
            self.timer.frame_count(),
            stopwatch.elapsed_millis(),
            queued
        );
        frame_time
    }

    /// Recompute every node below the scene root regardless of dirty state
    pub fn force_full_update(&mut self) {
        self.tree.process_queued_updates();
        self.tree.update(self.root, true, true);
        debug!("Forced full update of {} nodes", self.tree.len());
    }

    /// Have renderables read their transforms for the named camera
    pub fn prepare_frame(&mut self, camera: &str) -> Result<(), SceneError> {
        let frame = self.timer.frame_count();
        let camera = self.cameras.get_mut(camera).ok_or_else(|| not_found(CAMERA, camera))?;

        for entity in self.entities.values_mut() {
            entity.cache_bone_matrices(&mut self.tree, frame)?;
        }
        for set in self.billboard_sets.values_mut() {
            set.update_render_data(&mut self.tree, camera);
        }
        Ok(())
    }

    /// Update the scene graph, then prepare renderables for `camera`
    pub fn render_frame(&mut self, camera: &str) -> Result<f32, SceneError> {
        let frame_time = self.update_scene_graph();
        self.prepare_frame(camera)?;
        Ok(frame_time)
    }

    /// Frames started so far
    pub fn frame_count(&self) -> u64 {
        self.timer.frame_count()
    }

    /// Wall time spent in the last [`SceneManager::update_scene_graph`]
    pub fn last_update_duration(&self) -> Duration {
        self.last_update
    }

    /// Frame timer
    pub fn timer(&self) -> &FrameTimer {
        &self.timer
    }

    /// Change the frame time smoothing window in seconds
    pub fn set_frame_smoothing_period(&mut self, seconds: f32) -> Result<(), SceneError> {
        let mut config = self.config.clone();
        config.frame_smoothing_period = seconds;
        config.validate()?;
        self.timer.set_smoothing_period(config.frame_smoothing());
        self.config = config;
        Ok(())
    }
}

impl Default for SceneManager {
    fn default() -> Self {
        Self::new()
    }
}

fn insert_unique<'a, T>(
    objects: &'a mut HashMap<String, T>,
    kind: &'static str,
    name: &str,
    object: T,
) -> Result<&'a mut T, SceneError> {
    use std::collections::hash_map::Entry;

    match objects.entry(name.to_string()) {
        Entry::Occupied(_) => Err(SceneError::DuplicateObjectName { kind, name: name.to_string() }),
        Entry::Vacant(slot) => {
            debug!("Created {} '{}'", kind, name);
            Ok(slot.insert(object))
        }
    }
}

fn not_found(kind: &'static str, name: &str) -> SceneError {
    SceneError::ObjectNotFound { kind, name: name.to_string() }
}
