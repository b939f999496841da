//! # Scene Camera
//!
//! A camera positioned relative to an optional parent node. Unlike a node it
//! keeps no dirty flags for its parent: it remembers the parent's derived
//! orientation and position from the last refresh and compares them with the
//! parent's current values whenever a derived value is read.
//!
//! ## Coordinate System
//! Right-handed, Y up. The camera looks down its local -Z axis.
//!
//! ## Reflection
//! When reflected, the camera keeps its real (unreflected) world transform for
//! the view matrix and exposes the mirrored transform through the derived
//! accessors. A reflection plane may be linked to a node, in which case the
//! plane follows that node's derived transform.

use log::{trace, warn};
use nalgebra::Point3;

use crate::foundation::math::{
    perpendicular, quat_from_axes, reflect, rotation_to, Mat4, Plane, Quat, Unit, Vec3,
};
use crate::scene::{NodeId, NodeTree};

/// Node followed by an auto-tracking camera
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AutoTrack {
    /// Node to look at
    pub target: NodeId,
    /// World-space offset added to the target's derived position
    pub offset: Vec3,
}

#[derive(Debug, Clone, Copy)]
struct LinkedPlane {
    node: NodeId,
    local_plane: Plane,
    last_derived: Option<Plane>,
}

#[derive(Debug, Clone, Copy)]
struct Reflection {
    plane: Plane,
    matrix: Mat4,
    linked: Option<LinkedPlane>,
}

impl Reflection {
    fn new(plane: Plane, linked: Option<LinkedPlane>) -> Self {
        Self { plane, matrix: plane.reflection_matrix(), linked }
    }
}

/// Perspective camera attached to the scene graph
#[derive(Debug, Clone)]
pub struct Camera {
    name: String,
    parent: Option<NodeId>,

    position: Vec3,
    orientation: Quat,
    fixed_yaw_axis: Option<Vec3>,

    last_parent_orientation: Option<Quat>,
    last_parent_position: Option<Vec3>,
    real_orientation: Quat,
    real_position: Vec3,
    derived_orientation: Quat,
    derived_position: Vec3,

    reflection: Option<Reflection>,
    auto_track: Option<AutoTrack>,

    fov_y: f32,
    aspect: f32,
    near: f32,
    far: f32,

    recalculate_view: bool,
    view_matrix: Mat4,
    view_rebuilds: u64,
}

impl Camera {
    /// Create a camera at the origin looking down -Z with a fixed Y yaw axis
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            position: Vec3::zeros(),
            orientation: Quat::identity(),
            fixed_yaw_axis: Some(Vec3::y()),
            last_parent_orientation: None,
            last_parent_position: None,
            real_orientation: Quat::identity(),
            real_position: Vec3::zeros(),
            derived_orientation: Quat::identity(),
            derived_position: Vec3::zeros(),
            reflection: None,
            auto_track: None,
            fov_y: std::f32::consts::FRAC_PI_4,
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 1000.0,
            recalculate_view: true,
            view_matrix: Mat4::identity(),
            view_rebuilds: 0,
        }
    }

    /// Camera name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Node the camera is attached to
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Attach to a node, or detach with `None`
    pub fn set_parent(&mut self, parent: Option<NodeId>) {
        self.parent = parent;
        self.last_parent_orientation = None;
        self.last_parent_position = None;
        self.invalidate_view();
    }

    // ---- local transform ----

    /// Position relative to the parent
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Set the position relative to the parent
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.invalidate_view();
    }

    /// Orientation relative to the parent
    pub fn orientation(&self) -> Quat {
        self.orientation
    }

    /// Set the orientation relative to the parent
    pub fn set_orientation(&mut self, orientation: Quat) {
        self.orientation = Quat::new_normalize(orientation.into_inner());
        self.invalidate_view();
    }

    /// Local viewing direction
    pub fn direction(&self) -> Vec3 {
        self.orientation * -Vec3::z()
    }

    /// Axis used by [`Camera::yaw`] and [`Camera::set_direction`], if fixed
    pub fn fixed_yaw_axis(&self) -> Option<Vec3> {
        self.fixed_yaw_axis
    }

    /// Fix the yaw axis, or free it with `None`
    pub fn set_fixed_yaw_axis(&mut self, axis: Option<Vec3>) {
        self.fixed_yaw_axis = axis.map(|axis| axis.normalize());
    }

    /// Point the camera along a world-space direction
    ///
    /// With a fixed yaw axis the camera is rebuilt upright around that axis;
    /// otherwise it turns along the shortest arc from its current direction.
    /// A zero vector is ignored.
    pub fn set_direction(&mut self, tree: &mut NodeTree, direction: Vec3) {
        if direction.norm_squared() < f32::EPSILON {
            return;
        }
        self.update_view(tree);

        // the camera looks down -Z, so local Z points away from the target
        let z_adjust = -direction.normalize();

        let world = match self.fixed_yaw_axis {
            Some(yaw_axis) => {
                // looking along the yaw axis keeps the current right axis
                let x_axis = yaw_axis
                    .cross(&z_adjust)
                    .try_normalize(f32::EPSILON)
                    .unwrap_or_else(|| {
                        let right = self.real_orientation * Vec3::x();
                        (right - z_adjust * right.dot(&z_adjust))
                            .try_normalize(f32::EPSILON)
                            .unwrap_or_else(|| perpendicular(z_adjust))
                    });
                let y_axis = z_adjust.cross(&x_axis).normalize();
                quat_from_axes(x_axis, y_axis, z_adjust)
            }
            None => {
                let z_axis = self.real_orientation * Vec3::z();
                let y_axis = self.real_orientation * Vec3::y();
                rotation_to(z_axis, z_adjust, Some(y_axis)) * self.real_orientation
            }
        };

        self.orientation = match self.parent {
            Some(parent) => tree.derived_orientation(parent).inverse() * world,
            None => world,
        };
        self.invalidate_view();
    }

    /// Turn to face a world-space point
    pub fn look_at(&mut self, tree: &mut NodeTree, target: Vec3) {
        self.update_view(tree);
        let direction = target - self.real_position;
        self.set_direction(tree, direction);
    }

    /// Move along world axes
    pub fn move_world(&mut self, offset: Vec3) {
        self.position += offset;
        self.invalidate_view();
    }

    /// Move along the camera's own axes
    pub fn move_relative(&mut self, offset: Vec3) {
        self.position += self.orientation * offset;
        self.invalidate_view();
    }

    /// Rotate around the fixed yaw axis, or the local Y axis if none
    pub fn yaw(&mut self, angle: f32) {
        let axis = self.fixed_yaw_axis.unwrap_or_else(|| self.orientation * Vec3::y());
        self.rotate_axis_angle(axis, angle);
    }

    /// Rotate around the local X axis
    pub fn pitch(&mut self, angle: f32) {
        let axis = self.orientation * Vec3::x();
        self.rotate_axis_angle(axis, angle);
    }

    /// Rotate around the local Z axis
    pub fn roll(&mut self, angle: f32) {
        let axis = self.orientation * Vec3::z();
        self.rotate_axis_angle(axis, angle);
    }

    /// Rotate around an arbitrary axis
    pub fn rotate_axis_angle(&mut self, axis: Vec3, angle: f32) {
        self.rotate(Quat::from_axis_angle(&Unit::new_normalize(axis), angle));
    }

    /// Pre-multiply the orientation by `rotation`
    pub fn rotate(&mut self, rotation: Quat) {
        self.orientation = Quat::new_normalize((rotation * self.orientation).into_inner());
        self.invalidate_view();
    }

    // ---- auto tracking ----

    /// Current auto-tracking target
    pub fn auto_tracking(&self) -> Option<AutoTrack> {
        self.auto_track
    }

    /// Follow a node every frame, or stop with `None`
    pub fn set_auto_tracking(&mut self, track: Option<AutoTrack>) {
        self.auto_track = track;
    }

    /// Turn towards the tracked node; call after the scene graph update
    pub fn auto_track(&mut self, tree: &mut NodeTree) {
        if let Some(track) = self.auto_track {
            if !tree.contains(track.target) {
                warn!("Camera '{}' lost its auto-tracking target", self.name);
                self.auto_track = None;
                return;
            }
            let target = tree.derived_position(track.target) + track.offset;
            self.look_at(tree, target);
        }
    }

    // ---- reflection ----

    /// Mirror the camera through a fixed world-space plane
    pub fn enable_reflection(&mut self, plane: Plane) {
        self.reflection = Some(Reflection::new(plane, None));
        self.invalidate_view();
    }

    /// Mirror the camera through a plane that moves with `node`
    ///
    /// `plane` is expressed in the node's local space.
    pub fn enable_linked_reflection(&mut self, tree: &mut NodeTree, node: NodeId, plane: Plane) {
        let derived = plane.transformed(tree.derived_orientation(node), tree.derived_position(node));
        let linked = LinkedPlane { node, local_plane: plane, last_derived: Some(derived) };
        self.reflection = Some(Reflection::new(derived, Some(linked)));
        self.invalidate_view();
    }

    /// Stop mirroring
    pub fn disable_reflection(&mut self) {
        self.reflection = None;
        self.invalidate_view();
    }

    /// Whether a reflection plane is active
    pub fn is_reflected(&self) -> bool {
        self.reflection.is_some()
    }

    /// Active reflection plane in world space
    pub fn reflection_plane(&self) -> Option<Plane> {
        self.reflection.map(|reflection| reflection.plane)
    }

    // ---- projection ----

    /// Vertical field of view in radians
    pub fn fov_y(&self) -> f32 {
        self.fov_y
    }

    /// Set the vertical field of view in radians
    pub fn set_fov_y(&mut self, fov_y: f32) {
        self.fov_y = fov_y;
    }

    /// Viewport aspect ratio (width / height)
    pub fn aspect_ratio(&self) -> f32 {
        self.aspect
    }

    /// Set the viewport aspect ratio
    pub fn set_aspect_ratio(&mut self, aspect: f32) {
        self.aspect = aspect;
    }

    /// Near and far clip distances
    pub fn clip_distances(&self) -> (f32, f32) {
        (self.near, self.far)
    }

    /// Set near and far clip distances
    pub fn set_clip_distances(&mut self, near: f32, far: f32) {
        self.near = near;
        self.far = far;
    }

    /// Right-handed perspective projection with OpenGL clip depth
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::new_perspective(self.aspect, self.fov_y, self.near, self.far)
    }

    // ---- derived state ----

    /// World orientation after reflection
    pub fn derived_orientation(&mut self, tree: &mut NodeTree) -> Quat {
        self.update_view(tree);
        self.derived_orientation
    }

    /// World position after reflection
    pub fn derived_position(&mut self, tree: &mut NodeTree) -> Vec3 {
        self.update_view(tree);
        self.derived_position
    }

    /// World viewing direction after reflection
    pub fn derived_direction(&mut self, tree: &mut NodeTree) -> Vec3 {
        self.derived_orientation(tree) * -Vec3::z()
    }

    /// World up vector after reflection
    pub fn derived_up(&mut self, tree: &mut NodeTree) -> Vec3 {
        self.derived_orientation(tree) * Vec3::y()
    }

    /// World right vector after reflection
    pub fn derived_right(&mut self, tree: &mut NodeTree) -> Vec3 {
        self.derived_orientation(tree) * Vec3::x()
    }

    /// World orientation ignoring reflection
    pub fn real_orientation(&mut self, tree: &mut NodeTree) -> Quat {
        self.update_view(tree);
        self.real_orientation
    }

    /// World position ignoring reflection
    pub fn real_position(&mut self, tree: &mut NodeTree) -> Vec3 {
        self.update_view(tree);
        self.real_position
    }

    /// World viewing direction ignoring reflection
    pub fn real_direction(&mut self, tree: &mut NodeTree) -> Vec3 {
        self.real_orientation(tree) * -Vec3::z()
    }

    /// World up vector ignoring reflection
    pub fn real_up(&mut self, tree: &mut NodeTree) -> Vec3 {
        self.real_orientation(tree) * Vec3::y()
    }

    /// World right vector ignoring reflection
    pub fn real_right(&mut self, tree: &mut NodeTree) -> Vec3 {
        self.real_orientation(tree) * Vec3::x()
    }

    /// World-to-view matrix
    pub fn view_matrix(&mut self, tree: &mut NodeTree) -> Mat4 {
        self.update_view(tree);
        self.view_matrix
    }

    /// Combined projection and view matrix
    pub fn view_projection_matrix(&mut self, tree: &mut NodeTree) -> Mat4 {
        self.projection_matrix() * self.view_matrix(tree)
    }

    /// Times the view was rederived
    pub fn view_rebuilds(&self) -> u64 {
        self.view_rebuilds
    }

    fn invalidate_view(&mut self) {
        self.recalculate_view = true;
    }

    /// Refresh real and derived values if anything they depend on moved
    ///
    /// Returns whether the view was rederived.
    fn update_view(&mut self, tree: &mut NodeTree) -> bool {
        if let Some(parent) = self.parent.filter(|&parent| !tree.contains(parent)) {
            warn!("Camera '{}' detached from destroyed node {:?}", self.name, parent);
            self.set_parent(None);
        }

        match self.parent {
            Some(parent) => {
                let parent_orientation = tree.derived_orientation(parent);
                let parent_position = tree.derived_position(parent);
                if self.recalculate_view
                    || self.last_parent_orientation != Some(parent_orientation)
                    || self.last_parent_position != Some(parent_position)
                {
                    self.last_parent_orientation = Some(parent_orientation);
                    self.last_parent_position = Some(parent_position);
                    self.real_orientation = parent_orientation * self.orientation;
                    self.real_position = parent_orientation * self.position + parent_position;
                    self.recalculate_view = true;
                }
            }
            None => {
                self.real_orientation = self.orientation;
                self.real_position = self.position;
            }
        }

        if let Some(reflection) = &mut self.reflection {
            if let Some(linked) = reflection.linked.filter(|linked| !tree.contains(linked.node)) {
                warn!("Camera '{}' keeps the last plane of destroyed node {:?}", self.name, linked.node);
                reflection.linked = None;
            }
            if let Some(mut linked) = reflection.linked {
                let plane = linked
                    .local_plane
                    .transformed(tree.derived_orientation(linked.node), tree.derived_position(linked.node));
                if linked.last_derived != Some(plane) {
                    linked.last_derived = Some(plane);
                    *reflection = Reflection::new(plane, Some(linked));
                    self.recalculate_view = true;
                }
            }
        }

        if !self.recalculate_view {
            return false;
        }

        match &self.reflection {
            Some(reflection) => {
                let direction = self.real_orientation * -Vec3::z();
                let reflected = reflect(direction, reflection.plane.normal);
                let up = self.real_orientation * Vec3::y();
                self.derived_orientation = rotation_to(direction, reflected, Some(up)) * self.real_orientation;
                self.derived_position = reflection
                    .matrix
                    .transform_point(&Point3::from(self.real_position))
                    .coords;
            }
            None => {
                self.derived_orientation = self.real_orientation;
                self.derived_position = self.real_position;
            }
        }

        self.view_matrix = make_view_matrix(
            self.real_position,
            self.real_orientation,
            self.reflection.as_ref().map(|reflection| &reflection.matrix),
        );
        self.recalculate_view = false;
        self.view_rebuilds += 1;
        trace!("Camera '{}' view rederived at {:?}", self.name, self.derived_position);
        true
    }
}

/// Build a view matrix `[Rᵀ | -Rᵀp]`, optionally pre-reflected
pub fn make_view_matrix(position: Vec3, orientation: Quat, reflection: Option<&Mat4>) -> Mat4 {
    let rot_t = orientation.to_rotation_matrix().into_inner().transpose();
    let translation = -(rot_t * position);

    let mut view = rot_t.to_homogeneous();
    view.fixed_view_mut::<3, 1>(0, 3).copy_from(&translation);

    match reflection {
        Some(matrix) => view * matrix,
        None => view,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Vector4;
    use std::f32::consts::FRAC_PI_2;

    const EPSILON: f32 = 1e-4;

    #[test]
    fn test_parent_movement_is_detected_without_flags() {
        let mut tree = NodeTree::new();
        let node = tree.create_node(Some("rig"));
        let mut camera = Camera::new("main");
        camera.set_parent(Some(node));
        camera.set_position(Vec3::new(0.0, 0.0, 5.0));

        assert_relative_eq!(camera.derived_position(&mut tree), Vec3::new(0.0, 0.0, 5.0), epsilon = EPSILON);
        let rebuilds = camera.view_rebuilds();
        camera.derived_position(&mut tree);
        assert_eq!(camera.view_rebuilds(), rebuilds);

        tree.set_position(node, Vec3::new(10.0, 0.0, 0.0));
        tree.set_orientation(node, Quat::from_axis_angle(&Vec3::y_axis(), FRAC_PI_2));
        assert_relative_eq!(camera.derived_position(&mut tree), Vec3::new(15.0, 0.0, 0.0), epsilon = EPSILON);
        assert_eq!(camera.view_rebuilds(), rebuilds + 1);
    }

    #[test]
    fn test_view_matrix_maps_camera_to_origin() {
        let mut tree = NodeTree::new();
        let mut camera = Camera::new("main");
        camera.set_position(Vec3::new(1.0, 2.0, 3.0));
        camera.set_orientation(Quat::from_euler_angles(0.1, 0.7, -0.2));

        let view = camera.view_matrix(&mut tree);
        let eye = view * Vector4::new(1.0, 2.0, 3.0, 1.0);
        assert_relative_eq!(eye, Vector4::new(0.0, 0.0, 0.0, 1.0), epsilon = EPSILON);

        let ahead = camera.derived_position(&mut tree) + camera.derived_direction(&mut tree);
        let ahead = view * Vector4::new(ahead.x, ahead.y, ahead.z, 1.0);
        assert_relative_eq!(ahead, Vector4::new(0.0, 0.0, -1.0, 1.0), epsilon = EPSILON);
    }

    #[test]
    fn test_set_direction_keeps_fixed_yaw_axis_upright() {
        let mut tree = NodeTree::new();
        let mut camera = Camera::new("main");
        camera.set_direction(&mut tree, Vec3::new(1.0, 0.0, 0.0));

        assert_relative_eq!(camera.derived_direction(&mut tree), Vec3::x(), epsilon = EPSILON);
        assert_relative_eq!(camera.derived_up(&mut tree), Vec3::y(), epsilon = EPSILON);
    }

    #[test]
    fn test_set_direction_along_yaw_axis_stays_finite() {
        let mut tree = NodeTree::new();
        let mut camera = Camera::new("top");
        camera.set_position(Vec3::new(0.0, 50.0, 0.0));
        camera.set_direction(&mut tree, -Vec3::y());

        assert_relative_eq!(camera.derived_direction(&mut tree), -Vec3::y(), epsilon = EPSILON);
        // right axis is kept from before the turn
        assert_relative_eq!(camera.derived_right(&mut tree), Vec3::x(), epsilon = EPSILON);
        let view = camera.view_matrix(&mut tree);
        assert!(view.iter().all(|value| value.is_finite()));

        camera.set_direction(&mut tree, Vec3::y());
        assert_relative_eq!(camera.derived_direction(&mut tree), Vec3::y(), epsilon = EPSILON);
    }

    #[test]
    fn test_destroyed_parent_detaches_camera() {
        let mut tree = NodeTree::new();
        let rig = tree.create_node(Some("rig"));
        tree.set_position(rig, Vec3::new(0.0, 0.0, 8.0));
        let mut camera = Camera::new("main");
        camera.set_parent(Some(rig));
        assert_relative_eq!(camera.derived_position(&mut tree), Vec3::new(0.0, 0.0, 8.0), epsilon = EPSILON);

        tree.destroy_node(rig);
        assert_relative_eq!(camera.derived_position(&mut tree), Vec3::zeros(), epsilon = EPSILON);
        assert!(camera.parent().is_none());
    }

    #[test]
    fn test_set_direction_free_yaw_turns_half_circle() {
        let mut tree = NodeTree::new();
        let mut camera = Camera::new("main");
        camera.set_fixed_yaw_axis(None);
        camera.set_direction(&mut tree, Vec3::z());

        assert_relative_eq!(camera.derived_direction(&mut tree), Vec3::z(), epsilon = EPSILON);
        assert_relative_eq!(camera.derived_up(&mut tree), Vec3::y(), epsilon = EPSILON);
    }

    #[test]
    fn test_look_at_through_rotated_parent() {
        let mut tree = NodeTree::new();
        let node = tree.create_node(Some("rig"));
        tree.set_orientation(node, Quat::from_axis_angle(&Vec3::y_axis(), 0.6));
        tree.set_position(node, Vec3::new(0.0, 1.0, 0.0));

        let mut camera = Camera::new("main");
        camera.set_parent(Some(node));
        camera.look_at(&mut tree, Vec3::new(0.0, 1.0, -10.0));

        assert_relative_eq!(camera.derived_direction(&mut tree), -Vec3::z(), epsilon = EPSILON);
    }

    #[test]
    fn test_yaw_pitch_roll() {
        let mut camera = Camera::new("main");
        camera.yaw(FRAC_PI_2);
        assert_relative_eq!(camera.direction(), -Vec3::x(), epsilon = EPSILON);

        let mut camera = Camera::new("main");
        camera.pitch(FRAC_PI_2);
        assert_relative_eq!(camera.direction(), Vec3::y(), epsilon = EPSILON);

        let mut camera = Camera::new("main");
        camera.roll(FRAC_PI_2);
        assert_relative_eq!(camera.orientation() * Vec3::y(), -Vec3::x(), epsilon = EPSILON);
    }

    #[test]
    fn test_move_relative_follows_orientation() {
        let mut camera = Camera::new("main");
        camera.yaw(FRAC_PI_2);
        camera.move_relative(Vec3::new(0.0, 0.0, -2.0));
        assert_relative_eq!(camera.position(), Vec3::new(-2.0, 0.0, 0.0), epsilon = EPSILON);
        camera.move_world(Vec3::y());
        assert_relative_eq!(camera.position(), Vec3::new(-2.0, 1.0, 0.0), epsilon = EPSILON);
    }

    #[test]
    fn test_reflection_mirrors_derived_but_not_real() {
        let mut tree = NodeTree::new();
        let mut camera = Camera::new("main");
        camera.set_position(Vec3::new(0.0, 5.0, 0.0));
        camera.set_direction(&mut tree, Vec3::new(0.0, -1.0, -1.0));
        camera.enable_reflection(Plane::new(Vec3::y(), 0.0));

        assert_relative_eq!(camera.derived_position(&mut tree), Vec3::new(0.0, -5.0, 0.0), epsilon = EPSILON);
        assert_relative_eq!(camera.real_position(&mut tree), Vec3::new(0.0, 5.0, 0.0), epsilon = EPSILON);
        assert_relative_eq!(
            camera.derived_direction(&mut tree),
            Vec3::new(0.0, 1.0, -1.0).normalize(),
            epsilon = EPSILON
        );

        camera.disable_reflection();
        assert_relative_eq!(camera.derived_position(&mut tree), Vec3::new(0.0, 5.0, 0.0), epsilon = EPSILON);
    }

    #[test]
    fn test_linked_reflection_follows_node() {
        let mut tree = NodeTree::new();
        let water = tree.create_node(Some("water"));
        let mut camera = Camera::new("main");
        camera.set_position(Vec3::new(0.0, 5.0, 0.0));
        camera.enable_linked_reflection(&mut tree, water, Plane::new(Vec3::y(), 0.0));
        assert_relative_eq!(camera.derived_position(&mut tree).y, -5.0, epsilon = EPSILON);

        tree.set_position(water, Vec3::new(0.0, 1.0, 0.0));
        assert_relative_eq!(camera.derived_position(&mut tree).y, -3.0, epsilon = EPSILON);
    }

    #[test]
    fn test_auto_track_faces_target() {
        let mut tree = NodeTree::new();
        let target = tree.create_node(Some("target"));
        tree.set_position(target, Vec3::new(10.0, 0.0, 0.0));

        let mut camera = Camera::new("main");
        camera.set_auto_tracking(Some(AutoTrack { target, offset: Vec3::new(0.0, 0.0, 0.0) }));
        camera.auto_track(&mut tree);
        assert_relative_eq!(camera.derived_direction(&mut tree), Vec3::x(), epsilon = EPSILON);

        tree.destroy_node(target);
        camera.auto_track(&mut tree);
        assert!(camera.auto_tracking().is_none());
    }
}
