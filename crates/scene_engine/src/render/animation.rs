//! Animation playback state and the skeletal animation seam
//!
//! An [`AnimationState`] tracks where playback of one named animation is and
//! how strongly it contributes. Keyframe data lives behind the [`Animation`]
//! trait; [`PoseAnimation`] is a static pose useful for blending and tests.

use std::collections::HashMap;

use crate::foundation::math::{Quat, Vec3};
use crate::render::skeleton::Skeleton;
use crate::scene::SceneError;

/// Source of bone poses for a skeleton
pub trait Animation: Send {
    /// Duration in seconds
    fn length(&self) -> f32;

    /// Blend the pose at `time` into the skeleton's bones with `weight`
    fn apply(&self, skeleton: &mut Skeleton, time: f32, weight: f32) -> Result<(), SceneError>;
}

/// Offset applied to one bone relative to its initial state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BonePose {
    /// Translation added to the initial position
    pub translate: Vec3,
    /// Rotation applied after the initial orientation
    pub rotate: Quat,
    /// Scale factor on the initial scale
    pub scale: Vec3,
}

impl Default for BonePose {
    fn default() -> Self {
        Self {
            translate: Vec3::zeros(),
            rotate: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

/// Time-invariant pose over a fixed length
#[derive(Debug, Clone, Default)]
pub struct PoseAnimation {
    length: f32,
    poses: Vec<(String, BonePose)>,
}

impl PoseAnimation {
    /// Create an empty pose lasting `length` seconds
    pub fn new(length: f32) -> Self {
        Self { length, poses: Vec::new() }
    }

    /// Add a bone offset
    pub fn with_bone(mut self, bone: impl Into<String>, pose: BonePose) -> Self {
        self.poses.push((bone.into(), pose));
        self
    }
}

impl Animation for PoseAnimation {
    fn length(&self) -> f32 {
        self.length
    }

    fn apply(&self, skeleton: &mut Skeleton, _time: f32, weight: f32) -> Result<(), SceneError> {
        for (bone, pose) in &self.poses {
            skeleton.apply_bone_pose(bone, weight, pose.translate, pose.rotate, pose.scale)?;
        }
        Ok(())
    }
}

/// Playback state of one animation on one entity
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationState {
    name: String,
    time_position: f32,
    length: f32,
    weight: f32,
    enabled: bool,
    looped: bool,
}

impl AnimationState {
    /// Create a disabled, looping state at time zero with full weight
    pub fn new(name: impl Into<String>, length: f32) -> Self {
        Self {
            name: name.into(),
            time_position: 0.0,
            length,
            weight: 1.0,
            enabled: false,
            looped: true,
        }
    }

    /// Animation name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Playback position in seconds
    pub fn time_position(&self) -> f32 {
        self.time_position
    }

    /// Seek; wraps when looping, clamps otherwise
    pub fn set_time_position(&mut self, time: f32) {
        self.time_position = if self.length <= 0.0 {
            0.0
        } else if self.looped {
            time.rem_euclid(self.length)
        } else {
            time.clamp(0.0, self.length)
        };
    }

    /// Advance playback by `offset` seconds
    pub fn add_time(&mut self, offset: f32) {
        self.set_time_position(self.time_position + offset);
    }

    /// Duration in seconds
    pub fn length(&self) -> f32 {
        self.length
    }

    /// Blend weight
    pub fn weight(&self) -> f32 {
        self.weight
    }

    /// Set the blend weight
    pub fn set_weight(&mut self, weight: f32) {
        self.weight = weight;
    }

    /// Whether this state contributes to the pose
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Enable or disable this state
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Whether playback wraps at the end
    pub fn is_looped(&self) -> bool {
        self.looped
    }

    /// Toggle wrapping
    pub fn set_looped(&mut self, looped: bool) {
        self.looped = looped;
    }

    /// Non-looping playback has reached the end
    pub fn has_ended(&self) -> bool {
        !self.looped && self.time_position >= self.length
    }
}

/// Named animation states in creation order
#[derive(Debug, Clone, Default)]
pub struct AnimationStateSet {
    states: Vec<AnimationState>,
    index: HashMap<String, usize>,
}

impl AnimationStateSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a state for `name`
    pub fn create(&mut self, name: &str, length: f32) -> Result<&mut AnimationState, SceneError> {
        if self.index.contains_key(name) {
            return Err(SceneError::DuplicateAnimationState(name.to_string()));
        }
        self.index.insert(name.to_string(), self.states.len());
        self.states.push(AnimationState::new(name, length));
        let last = self.states.len() - 1;
        Ok(&mut self.states[last])
    }

    /// State by name
    pub fn get(&self, name: &str) -> Result<&AnimationState, SceneError> {
        self.index
            .get(name)
            .map(|&i| &self.states[i])
            .ok_or_else(|| SceneError::AnimationStateNotFound(name.to_string()))
    }

    /// Mutable state by name
    pub fn get_mut(&mut self, name: &str) -> Result<&mut AnimationState, SceneError> {
        match self.index.get(name) {
            Some(&i) => Ok(&mut self.states[i]),
            None => Err(SceneError::AnimationStateNotFound(name.to_string())),
        }
    }

    /// Whether a state exists for `name`
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Remove and return a state
    pub fn remove(&mut self, name: &str) -> Result<AnimationState, SceneError> {
        let i = self
            .index
            .remove(name)
            .ok_or_else(|| SceneError::AnimationStateNotFound(name.to_string()))?;
        let state = self.states.remove(i);
        for slot in self.index.values_mut() {
            if *slot > i {
                *slot -= 1;
            }
        }
        Ok(state)
    }

    /// All states in creation order
    pub fn iter(&self) -> impl Iterator<Item = &AnimationState> {
        self.states.iter()
    }

    /// Enabled states in creation order
    pub fn enabled(&self) -> impl Iterator<Item = &AnimationState> {
        self.states.iter().filter(|state| state.enabled)
    }

    /// Advance every enabled state
    pub fn add_time(&mut self, offset: f32) {
        for state in self.states.iter_mut().filter(|state| state.enabled) {
            state.add_time(offset);
        }
    }

    /// Number of states
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}
