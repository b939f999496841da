//! Bone hierarchy driving a skinned entity
//!
//! A skeleton owns a private [`NodeTree`] of bone nodes. Bones use the same
//! propagation machinery as scene nodes; a bone's matrix for skinning is its
//! full transform times the inverse of its transform in the binding pose.

use std::collections::HashMap;
use std::fmt;

use log::{debug, warn};

use crate::foundation::math::{Mat4, Quat, Vec3};
use crate::render::animation::{Animation, AnimationStateSet};
use crate::scene::{BoneHandle, NodeId, NodeTree, SceneError};

/// Named bone hierarchy with a binding pose and attached animations
pub struct Skeleton {
    name: String,
    tree: NodeTree,
    bones: Vec<NodeId>,
    names: HashMap<String, BoneHandle>,
    binding_inverse: Vec<Mat4>,
    manually_controlled: Vec<bool>,
    animations: Vec<(String, Box<dyn Animation>)>,
}

impl fmt::Debug for Skeleton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Skeleton")
            .field("name", &self.name)
            .field("bones", &self.bones.len())
            .field("animations", &self.animations.iter().map(|(name, _)| name).collect::<Vec<_>>())
            .finish()
    }
}

impl Skeleton {
    /// Create an empty skeleton
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tree: NodeTree::new(),
            bones: Vec::new(),
            names: HashMap::new(),
            binding_inverse: Vec::new(),
            manually_controlled: Vec::new(),
            animations: Vec::new(),
        }
    }

    /// Skeleton name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Bone tree
    pub fn tree(&self) -> &NodeTree {
        &self.tree
    }

    /// Mutable bone tree, for posing bones directly
    pub fn tree_mut(&mut self) -> &mut NodeTree {
        &mut self.tree
    }

    // ---- bones ----

    /// Create a root bone
    pub fn create_bone(&mut self, name: &str) -> Result<BoneHandle, SceneError> {
        self.check_unique(name)?;
        let id = self.tree.create_bone(Some(name))?;
        Ok(self.register(name, id))
    }

    /// Create a bone below `parent`
    pub fn create_child_bone(&mut self, parent: BoneHandle, name: &str) -> Result<BoneHandle, SceneError> {
        self.check_unique(name)?;
        let id = self.tree.create_child(self.bone_node(parent), Some(name))?;
        Ok(self.register(name, id))
    }

    fn check_unique(&self, name: &str) -> Result<(), SceneError> {
        if self.names.contains_key(name) {
            return Err(SceneError::DuplicateBoneName(name.to_string()));
        }
        Ok(())
    }

    fn register(&mut self, name: &str, id: NodeId) -> BoneHandle {
        let handle = self
            .tree
            .node(id)
            .kind()
            .bone_handle()
            .unwrap_or_else(|| unreachable!("bone tree holds only bones"));
        debug_assert_eq!(handle.index(), self.bones.len());

        self.bones.push(id);
        self.names.insert(name.to_string(), handle);
        self.binding_inverse.push(Mat4::identity());
        self.manually_controlled.push(false);
        handle
    }

    /// Handle of the bone called `name`
    pub fn bone(&self, name: &str) -> Result<BoneHandle, SceneError> {
        self.names
            .get(name)
            .copied()
            .ok_or_else(|| SceneError::BoneNotFound(name.to_string()))
    }

    /// Tree node of a bone
    ///
    /// # Panics
    /// If the handle does not belong to this skeleton.
    pub fn bone_node(&self, handle: BoneHandle) -> NodeId {
        self.bones[handle.index()]
    }

    /// Number of bones
    pub fn bone_count(&self) -> usize {
        self.bones.len()
    }

    /// Bones without a parent
    pub fn root_bones(&self) -> Vec<BoneHandle> {
        self.bones
            .iter()
            .filter(|&&id| self.tree.parent(id).is_none())
            .filter_map(|&id| self.tree.node(id).kind().bone_handle())
            .collect()
    }

    /// Exclude a bone from [`Skeleton::reset`] unless forced
    pub fn set_manually_controlled(&mut self, handle: BoneHandle, manual: bool) {
        self.manually_controlled[handle.index()] = manual;
    }

    /// Whether a bone is manually controlled
    pub fn is_manually_controlled(&self, handle: BoneHandle) -> bool {
        self.manually_controlled[handle.index()]
    }

    // ---- pose ----

    /// Flush pending bone changes from every root bone
    pub fn update_transforms(&mut self) {
        for handle in self.root_bones() {
            self.tree.update(self.bone_node(handle), true, false);
        }
    }

    /// Take the current pose as the binding pose
    ///
    /// Records each bone's local transform as its initial state and stores the
    /// inverse of its world transform.
    pub fn set_binding_pose(&mut self) {
        self.update_transforms();
        for (i, &id) in self.bones.iter().enumerate() {
            self.tree.set_initial_state(id);
            let derived = self.tree.derived_transform(id);
            self.binding_inverse[i] = derived.to_inverse_matrix();
        }
        debug!("Skeleton '{}' binding pose set for {} bones", self.name, self.bones.len());
    }

    /// Return bones to the binding pose
    ///
    /// Manually controlled bones are left alone unless `reset_manual`.
    pub fn reset(&mut self, reset_manual: bool) {
        for (i, &id) in self.bones.iter().enumerate() {
            if reset_manual || !self.manually_controlled[i] {
                self.tree.reset_to_initial_state(id);
            }
        }
    }

    /// Blend a weighted offset into the named bone
    pub fn apply_bone_pose(
        &mut self,
        bone: &str,
        weight: f32,
        translate: Vec3,
        rotate: Quat,
        scale: Vec3,
    ) -> Result<(), SceneError> {
        let id = self.bone_node(self.bone(bone)?);
        self.tree.weighted_transform(id, weight, translate, rotate, scale);
        Ok(())
    }

    /// Skinning matrices, one per bone, in handle order
    ///
    /// `out` is resized to the bone count.
    pub fn bone_matrices(&mut self, out: &mut Vec<Mat4>) {
        self.update_transforms();
        out.clear();
        for (i, &id) in self.bones.iter().enumerate() {
            out.push(self.tree.full_transform(id) * self.binding_inverse[i]);
        }
    }

    // ---- animations ----

    /// Attach an animation under `name`, replacing any previous one
    pub fn add_animation(&mut self, name: impl Into<String>, animation: Box<dyn Animation>) {
        let name = name.into();
        self.animations.retain(|(existing, _)| *existing != name);
        self.animations.push((name, animation));
    }

    /// Whether an animation called `name` is attached
    pub fn has_animation(&self, name: &str) -> bool {
        self.animations.iter().any(|(existing, _)| existing == name)
    }

    /// Create a state for each attached animation the set lacks
    pub fn init_animation_states(&self, states: &mut AnimationStateSet) {
        for (name, animation) in &self.animations {
            if !states.contains(name) {
                // contains() was checked, so creation cannot collide
                let _ = states.create(name, animation.length());
            }
        }
    }

    /// Reset the pose and apply every enabled state
    pub fn set_animation_state(&mut self, states: &AnimationStateSet) -> Result<(), SceneError> {
        self.reset(false);

        let animations = std::mem::take(&mut self.animations);
        let mut result = Ok(());
        for state in states.enabled() {
            match animations.iter().find(|(name, _)| name == state.name()) {
                Some((_, animation)) => {
                    result = animation.apply(self, state.time_position(), state.weight());
                    if result.is_err() {
                        break;
                    }
                }
                None => warn!("Skeleton '{}' has no animation '{}'", self.name, state.name()),
            }
        }
        self.animations = animations;
        result
    }
}
