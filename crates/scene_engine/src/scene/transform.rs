//! Local transform editing and lazily derived world transforms
//!
//! Local setters only store and invalidate. Every derived accessor pulls a
//! fresh value on demand, walking up the parent chain if needed, so a reader
//! never observes a stale cache.

use crate::foundation::math::{make_transform, Mat3, Mat4, Quat, Transform, Unit, Vec3};

use super::node::{NodeFlags, NodeId, TransformSpace, UpdateListener};
use super::NodeTree;

pub(super) fn normalized(q: Quat) -> Quat {
    Quat::new_normalize(q.into_inner())
}

impl NodeTree {
    // ---- local state ----

    /// Local position
    pub fn position(&self, id: NodeId) -> Vec3 {
        self.nodes[id].local.position
    }

    /// Set the local position
    pub fn set_position(&mut self, id: NodeId, position: Vec3) {
        self.nodes[id].local.position = position;
        self.need_update(id, false);
    }

    /// Local orientation
    pub fn orientation(&self, id: NodeId) -> Quat {
        self.nodes[id].local.orientation
    }

    /// Set the local orientation (renormalized)
    pub fn set_orientation(&mut self, id: NodeId, orientation: Quat) {
        self.nodes[id].local.orientation = normalized(orientation);
        self.need_update(id, false);
    }

    /// Local scale
    pub fn scale(&self, id: NodeId) -> Vec3 {
        self.nodes[id].local.scale
    }

    /// Set the local scale
    pub fn set_scale(&mut self, id: NodeId, scale: Vec3) {
        self.nodes[id].local.scale = scale;
        self.need_update(id, false);
    }

    /// Local transform
    pub fn local_transform(&self, id: NodeId) -> Transform {
        self.nodes[id].local
    }

    /// Replace the whole local transform
    pub fn set_local_transform(&mut self, id: NodeId, transform: Transform) {
        self.nodes[id].local = Transform {
            orientation: normalized(transform.orientation),
            ..transform
        };
        self.need_update(id, false);
    }

    // ---- relative operations ----

    /// Move the node by `offset` expressed in `space`
    pub fn translate(&mut self, id: NodeId, offset: Vec3, space: TransformSpace) {
        let delta = match space {
            TransformSpace::Local => self.nodes[id].local.orientation * offset,
            TransformSpace::Parent => offset,
            TransformSpace::World => match self.nodes[id].parent {
                Some(parent) => {
                    let parent_derived = self.derived_transform(parent);
                    (parent_derived.orientation.inverse() * offset).component_div(&parent_derived.scale)
                }
                None => offset,
            },
        };
        self.nodes[id].local.position += delta;
        self.need_update(id, false);
    }

    /// Move along arbitrary axes: `offset` is expressed in the columns of `axes`
    pub fn translate_along_axes(&mut self, id: NodeId, axes: &Mat3, offset: Vec3, space: TransformSpace) {
        self.translate(id, axes * offset, space);
    }

    /// Rotate the node by `rotation` expressed in `space`
    pub fn rotate(&mut self, id: NodeId, rotation: Quat, space: TransformSpace) {
        let rotation = normalized(rotation);
        let current = self.nodes[id].local.orientation;
        let orientation = match space {
            TransformSpace::Local => current * rotation,
            TransformSpace::Parent => rotation * current,
            TransformSpace::World => {
                let derived = self.derived_orientation(id);
                current * derived.inverse() * rotation * derived
            }
        };
        self.nodes[id].local.orientation = normalized(orientation);
        self.need_update(id, false);
    }

    /// Rotate by `angle` radians around `axis`
    pub fn rotate_axis_angle(&mut self, id: NodeId, axis: Vec3, angle: f32, space: TransformSpace) {
        let rotation = Quat::from_axis_angle(&Unit::new_normalize(axis), angle);
        self.rotate(id, rotation, space);
    }

    /// Rotate around the Y axis
    pub fn yaw(&mut self, id: NodeId, angle: f32, space: TransformSpace) {
        self.rotate_axis_angle(id, Vec3::y(), angle, space);
    }

    /// Rotate around the X axis
    pub fn pitch(&mut self, id: NodeId, angle: f32, space: TransformSpace) {
        self.rotate_axis_angle(id, Vec3::x(), angle, space);
    }

    /// Rotate around the Z axis
    pub fn roll(&mut self, id: NodeId, angle: f32, space: TransformSpace) {
        self.rotate_axis_angle(id, Vec3::z(), angle, space);
    }

    /// Multiply the local scale componentwise
    pub fn scale_by(&mut self, id: NodeId, factor: Vec3) {
        let scale = self.nodes[id].local.scale.component_mul(&factor);
        self.nodes[id].local.scale = scale;
        self.need_update(id, false);
    }

    /// Reset the local orientation to identity
    pub fn reset_orientation(&mut self, id: NodeId) {
        self.nodes[id].local.orientation = Quat::identity();
        self.need_update(id, false);
    }

    /// Local axes as the columns of a rotation matrix
    pub fn local_axes(&self, id: NodeId) -> Mat3 {
        self.nodes[id].local.orientation.to_rotation_matrix().into_inner()
    }

    // ---- derived state ----

    /// World transform, recomputed first if stale
    ///
    /// Ancestors are refreshed first. A node is stale when flagged, or when
    /// its parent was recomputed since this node last composed against it.
    pub fn derived_transform(&mut self, id: NodeId) -> Transform {
        self.nodes[id].stats.derived_reads += 1;
        let parent_moved = match self.nodes[id].parent {
            Some(parent) => {
                self.derived_transform(parent);
                self.nodes[id].parent_generation != self.nodes[parent].generation
            }
            None => false,
        };
        if parent_moved || self.nodes[id].flags.contains(NodeFlags::NEED_PARENT_UPDATE) {
            self.recompute(id);
        }
        self.nodes[id].derived
    }

    /// World position
    pub fn derived_position(&mut self, id: NodeId) -> Vec3 {
        self.derived_transform(id).position
    }

    /// World orientation
    pub fn derived_orientation(&mut self, id: NodeId) -> Quat {
        self.derived_transform(id).orientation
    }

    /// World scale
    pub fn derived_scale(&mut self, id: NodeId) -> Vec3 {
        self.derived_transform(id).scale
    }

    /// Move the node so that its world position becomes `position`
    ///
    /// Solves for the local position against the parent's current derived
    /// transform.
    pub fn set_derived_position(&mut self, id: NodeId, position: Vec3) {
        let local = match self.nodes[id].parent {
            Some(parent) => {
                let parent_derived = self.derived_transform(parent);
                (parent_derived.orientation.inverse() * (position - parent_derived.position))
                    .component_div(&parent_derived.scale)
            }
            None => position,
        };
        self.set_position(id, local);
    }

    /// Rotate the node so that its world orientation becomes `orientation`
    pub fn set_derived_orientation(&mut self, id: NodeId, orientation: Quat) {
        let local = match self.nodes[id].parent {
            Some(parent) if self.nodes[id].inherit_orientation => {
                self.derived_orientation(parent).inverse() * orientation
            }
            _ => orientation,
        };
        self.set_orientation(id, local);
    }

    /// Scale the node so that its world scale becomes `scale`
    pub fn set_derived_scale(&mut self, id: NodeId, scale: Vec3) {
        let local = match self.nodes[id].parent {
            Some(parent) if self.nodes[id].inherit_scale => scale.component_div(&self.derived_scale(parent)),
            _ => scale,
        };
        self.set_scale(id, local);
    }

    /// World matrix, rebuilt only when invalidated
    pub fn full_transform(&mut self, id: NodeId) -> Mat4 {
        let derived = self.derived_transform(id);
        if self.nodes[id].flags.contains(NodeFlags::NEED_TRANSFORM_UPDATE) {
            let node = &mut self.nodes[id];
            node.cached_transform = derived.to_matrix();
            node.flags.remove(NodeFlags::NEED_TRANSFORM_UPDATE);
            node.stats.transform_rebuilds += 1;
        }
        self.nodes[id].cached_transform
    }

    /// Local matrix, rebuilt only when invalidated
    pub fn relative_transform(&mut self, id: NodeId) -> Mat4 {
        let node = &mut self.nodes[id];
        if node.flags.contains(NodeFlags::NEED_RELATIVE_TRANSFORM_UPDATE) {
            node.cached_relative_transform =
                make_transform(node.local.position, node.local.scale, node.local.orientation);
            node.flags.remove(NodeFlags::NEED_RELATIVE_TRANSFORM_UPDATE);
            node.stats.relative_transform_rebuilds += 1;
        }
        node.cached_relative_transform
    }

    /// Squared distance from the node's world position to a viewpoint
    pub fn squared_view_depth(&mut self, id: NodeId, camera_position: Vec3) -> f32 {
        (self.derived_position(id) - camera_position).norm_squared()
    }

    // ---- animation support ----

    /// Record the current local transform as the base for weighted transforms
    pub fn set_initial_state(&mut self, id: NodeId) {
        let node = &mut self.nodes[id];
        node.initial = node.local;
    }

    /// Restore the initial state and clear animation accumulators
    pub fn reset_to_initial_state(&mut self, id: NodeId) {
        let node = &mut self.nodes[id];
        node.local = node.initial;
        node.accum_anim_weight = 0.0;
        node.translation_from_initial = Vec3::zeros();
        node.rotation_from_initial = Quat::identity();
        node.scale_from_initial = Vec3::new(1.0, 1.0, 1.0);
        self.need_update(id, false);
    }

    /// Blend a weighted offset from the initial state into the local transform
    ///
    /// The first contribution since the last reset applies directly; each
    /// further one blends in proportion to its share of the total weight.
    pub fn weighted_transform(&mut self, id: NodeId, weight: f32, translate: Vec3, rotate: Quat, scale: Vec3) {
        let node = &mut self.nodes[id];
        if node.accum_anim_weight == 0.0 {
            node.translation_from_initial = translate;
            node.rotation_from_initial = rotate;
            node.scale_from_initial = scale;
            node.accum_anim_weight = weight;
        } else {
            let factor = weight / (node.accum_anim_weight + weight);
            let unit = Vec3::new(1.0, 1.0, 1.0);

            node.translation_from_initial += (translate - node.translation_from_initial) * factor;
            node.rotation_from_initial = node.rotation_from_initial.slerp(&rotate, factor);
            node.scale_from_initial = node
                .scale_from_initial
                .component_mul(&((scale - unit) * factor + unit));
            node.accum_anim_weight += weight;
        }

        node.local = Transform {
            position: node.initial.position + node.translation_from_initial,
            orientation: normalized(node.initial.orientation * node.rotation_from_initial),
            scale: node.initial.scale.component_mul(&node.scale_from_initial),
        };
        self.need_update(id, false);
    }

    // ---- listeners ----

    /// Register a callback fired after every recomputation of this node
    pub fn add_update_listener<F>(&mut self, id: NodeId, listener: F)
    where
        F: FnMut(NodeId, &Transform) + Send + 'static,
    {
        self.nodes[id].listeners.push(Box::new(listener) as UpdateListener);
    }

    /// Drop every listener of this node
    pub fn clear_update_listeners(&mut self, id: NodeId) {
        self.nodes[id].listeners.clear();
    }

    /// Mute or unmute this node's listeners
    pub fn set_suppress_update_events(&mut self, id: NodeId, suppress: bool) {
        self.nodes[id].suppress_update_events = suppress;
    }
}
