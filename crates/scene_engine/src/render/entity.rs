//! Renderable mesh instance attached to a scene node

use log::{trace, warn};

use crate::foundation::math::Mat4;
use crate::render::animation::{AnimationState, AnimationStateSet};
use crate::render::skeleton::Skeleton;
use crate::scene::{NodeId, NodeTree, SceneError};

/// Mesh instance with an optional skeleton
///
/// World-space bone matrices are cached once per frame number, so several
/// cameras rendering the same frame share one skinning pass.
#[derive(Debug)]
pub struct Entity {
    name: String,
    parent: Option<NodeId>,
    skeleton: Option<Skeleton>,
    animation_states: AnimationStateSet,
    bone_matrices: Vec<Mat4>,
    frame_bones_last_updated: Option<u64>,
    bone_cache_rebuilds: u64,
}

impl Entity {
    /// Create an entity without a skeleton
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            skeleton: None,
            animation_states: AnimationStateSet::new(),
            bone_matrices: Vec::new(),
            frame_bones_last_updated: None,
            bone_cache_rebuilds: 0,
        }
    }

    /// Create a skinned entity with a state per skeleton animation
    pub fn with_skeleton(name: impl Into<String>, skeleton: Skeleton) -> Self {
        let mut entity = Self::new(name);
        skeleton.init_animation_states(&mut entity.animation_states);
        entity.skeleton = Some(skeleton);
        entity
    }

    /// Entity name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Node the entity is attached to
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Attach to a node, or detach with `None`
    pub fn set_parent(&mut self, parent: Option<NodeId>) {
        self.parent = parent;
        self.frame_bones_last_updated = None;
    }

    /// Whether the entity is skinned
    pub fn has_skeleton(&self) -> bool {
        self.skeleton.is_some()
    }

    /// Skeleton, if skinned
    pub fn skeleton(&self) -> Option<&Skeleton> {
        self.skeleton.as_ref()
    }

    /// Mutable skeleton, if skinned
    pub fn skeleton_mut(&mut self) -> Option<&mut Skeleton> {
        self.skeleton.as_mut()
    }

    /// State of the named animation
    pub fn animation_state(&self, name: &str) -> Result<&AnimationState, SceneError> {
        self.animation_states.get(name)
    }

    /// Mutable state of the named animation
    pub fn animation_state_mut(&mut self, name: &str) -> Result<&mut AnimationState, SceneError> {
        self.animation_states.get_mut(name)
    }

    /// Every animation state
    pub fn animation_states(&self) -> &AnimationStateSet {
        &self.animation_states
    }

    /// Mutable animation states
    pub fn animation_states_mut(&mut self) -> &mut AnimationStateSet {
        &mut self.animation_states
    }

    /// Recompute world-space bone matrices unless done for `frame` already
    ///
    /// Applies the enabled animation states to the skeleton, then prefixes
    /// each bone matrix with the parent node's full transform.
    pub fn cache_bone_matrices(&mut self, tree: &mut NodeTree, frame: u64) -> Result<(), SceneError> {
        if let Some(parent) = self.parent.filter(|&parent| !tree.contains(parent)) {
            warn!("Entity '{}' detached from destroyed node {:?}", self.name, parent);
            self.set_parent(None);
        }
        if self.frame_bones_last_updated == Some(frame) {
            return Ok(());
        }
        let Some(skeleton) = self.skeleton.as_mut() else {
            return Ok(());
        };

        skeleton.set_animation_state(&self.animation_states)?;
        skeleton.bone_matrices(&mut self.bone_matrices);
        self.frame_bones_last_updated = Some(frame);

        let world = match self.parent {
            Some(parent) => tree.full_transform(parent),
            None => Mat4::identity(),
        };
        for matrix in &mut self.bone_matrices {
            *matrix = world * *matrix;
        }

        self.bone_cache_rebuilds += 1;
        trace!("Entity '{}' cached {} bone matrices for frame {}", self.name, self.bone_matrices.len(), frame);
        Ok(())
    }

    /// World-space bone matrices from the last cache pass
    pub fn bone_matrices(&self) -> &[Mat4] {
        &self.bone_matrices
    }

    /// Frame of the last cache pass
    pub fn frame_bones_last_updated(&self) -> Option<u64> {
        self.frame_bones_last_updated
    }

    /// Number of cache passes that did work
    pub fn bone_cache_rebuilds(&self) -> u64 {
        self.bone_cache_rebuilds
    }

    /// World transform of the parent node, or identity when detached
    pub fn world_transform(&self, tree: &mut NodeTree) -> Mat4 {
        self.parent
            .filter(|&parent| tree.contains(parent))
            .map_or_else(Mat4::identity, |parent| tree.full_transform(parent))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec3;
    use crate::render::animation::{BonePose, PoseAnimation};
    use approx::assert_relative_eq;
    use nalgebra::Vector4;

    const EPSILON: f32 = 1e-4;

    fn skinned() -> Entity {
        let mut skeleton = Skeleton::new("rig");
        skeleton.create_bone("root").unwrap();
        skeleton.set_binding_pose();
        let raise = BonePose { translate: Vec3::new(0.0, 1.0, 0.0), ..Default::default() };
        skeleton.add_animation("raise", Box::new(PoseAnimation::new(1.0).with_bone("root", raise)));
        Entity::with_skeleton("hero", skeleton)
    }

    #[test]
    fn test_bone_matrices_cached_per_frame() {
        let mut tree = NodeTree::new();
        let node = tree.create_node(Some("hero"));
        tree.set_position(node, Vec3::new(5.0, 0.0, 0.0));

        let mut entity = skinned();
        entity.set_parent(Some(node));
        entity.cache_bone_matrices(&mut tree, 1).unwrap();
        entity.cache_bone_matrices(&mut tree, 1).unwrap();
        assert_eq!(entity.bone_cache_rebuilds(), 1);

        let origin = entity.bone_matrices()[0] * Vector4::new(0.0, 0.0, 0.0, 1.0);
        assert_relative_eq!(origin, Vector4::new(5.0, 0.0, 0.0, 1.0), epsilon = EPSILON);

        entity.animation_state_mut("raise").unwrap().set_enabled(true);
        entity.cache_bone_matrices(&mut tree, 2).unwrap();
        assert_eq!(entity.bone_cache_rebuilds(), 2);
        assert_eq!(entity.frame_bones_last_updated(), Some(2));

        let origin = entity.bone_matrices()[0] * Vector4::new(0.0, 0.0, 0.0, 1.0);
        assert_relative_eq!(origin, Vector4::new(5.0, 1.0, 0.0, 1.0), epsilon = EPSILON);
    }

    #[test]
    fn test_unskinned_entity_has_no_bones() {
        let mut tree = NodeTree::new();
        let mut entity = Entity::new("crate");
        entity.cache_bone_matrices(&mut tree, 1).unwrap();
        assert!(entity.bone_matrices().is_empty());
        assert!(matches!(entity.animation_state("walk"), Err(SceneError::AnimationStateNotFound(_))));
    }
}
