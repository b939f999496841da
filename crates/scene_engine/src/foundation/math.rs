//! Math utilities and types
//!
//! Provides the transform primitives used by the scene graph: nalgebra type
//! aliases, a position/orientation/scale `Transform`, and the matrix builders
//! that turn one into a 4x4 world or inverse-world matrix.

pub use nalgebra::{
    Vector3, Vector4,
    Matrix3, Matrix4,
    Quaternion,
    Unit,
};

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 3x3 matrix type
pub type Mat3 = Matrix3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// Quaternion type for rotations (always unit length)
pub type Quat = Unit<Quaternion<f32>>;

/// Position, orientation and scale of a node
///
/// Used both for a node's local transform and as the value snapshot of its
/// derived (world-space) transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Position in 3D space
    pub position: Vec3,

    /// Orientation quaternion
    pub orientation: Quat,

    /// Scale factors
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            orientation: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    /// Create a new identity transform
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create a transform from all three components
    pub fn new(position: Vec3, orientation: Quat, scale: Vec3) -> Self {
        Self { position, orientation, scale }
    }

    /// Create a transform with only position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Compose a child's local transform onto this (parent, world-space) transform
    ///
    /// The child's position is always scaled and rotated in parent space before
    /// being offset by the parent's position. The inheritance switches only
    /// decide whether the parent's orientation / scale carry into the child's
    /// own orientation / scale.
    pub fn compose(&self, local: &Transform, inherit_orientation: bool, inherit_scale: bool) -> Transform {
        let orientation = if inherit_orientation {
            self.orientation * local.orientation
        } else {
            local.orientation
        };

        let scale = if inherit_scale {
            self.scale.component_mul(&local.scale)
        } else {
            local.scale
        };

        let position = self.orientation * self.scale.component_mul(&local.position) + self.position;

        Transform { position, orientation, scale }
    }

    /// Build the 4x4 matrix for this transform (scale, then rotate, then translate)
    pub fn to_matrix(&self) -> Mat4 {
        make_transform(self.position, self.scale, self.orientation)
    }

    /// Build the inverse of [`Transform::to_matrix`]
    pub fn to_inverse_matrix(&self) -> Mat4 {
        make_inverse_transform(self.position, self.scale, self.orientation)
    }
}

/// Build a matrix from orientation / scale / position
///
/// Ordering is scale, rotate, translate: the upper 3x3 block is `R * S` and the
/// translation sits in the last column, so rotation and scaling are centred on
/// the origin and scale does not affect the size of the translation.
pub fn make_transform(position: Vec3, scale: Vec3, orientation: Quat) -> Mat4 {
    let rot_scale: Mat3 = orientation.to_rotation_matrix().into_inner() * Mat3::from_diagonal(&scale);

    let mut matrix = rot_scale.to_homogeneous();
    matrix.fixed_view_mut::<3, 1>(0, 3).copy_from(&position);
    matrix
}

/// Build the inverse matrix of [`make_transform`] from the same data
///
/// Performs -translation, inverse rotation and 1/scale in that order.
pub fn make_inverse_transform(position: Vec3, scale: Vec3, orientation: Quat) -> Mat4 {
    let inv_scale = Vec3::new(1.0 / scale.x, 1.0 / scale.y, 1.0 / scale.z);
    let inv_rotation = orientation.inverse();

    let inv_translate = inv_scale.component_mul(&(inv_rotation * -position));

    let scale_rot: Mat3 = Mat3::from_diagonal(&inv_scale) * inv_rotation.to_rotation_matrix().into_inner();

    let mut matrix = scale_rot.to_homogeneous();
    matrix.fixed_view_mut::<3, 1>(0, 3).copy_from(&inv_translate);
    matrix
}

/// Build a unit quaternion from three orthonormal axis columns
pub fn quat_from_axes(x_axis: Vec3, y_axis: Vec3, z_axis: Vec3) -> Quat {
    let basis = Mat3::from_columns(&[x_axis, y_axis, z_axis]);
    Quat::from_rotation_matrix(&nalgebra::Rotation3::from_matrix_unchecked(basis))
}

/// Shortest-arc rotation taking `from` onto `to`
///
/// When the vectors point in opposite directions there are infinitely many
/// arcs; the rotation is then a half turn around `fallback_axis` if given,
/// otherwise around any axis perpendicular to `from`.
pub fn rotation_to(from: Vec3, to: Vec3, fallback_axis: Option<Vec3>) -> Quat {
    let from_n = from.normalize();
    let to_n = to.normalize();
    let d = from_n.dot(&to_n);

    if d >= 1.0 - 1e-6 {
        return Quat::identity();
    }

    if d < 1e-6 - 1.0 {
        let axis = fallback_axis.unwrap_or_else(|| perpendicular(from_n));
        return Quat::from_axis_angle(&Unit::new_normalize(axis), std::f32::consts::PI);
    }

    Quat::rotation_between(&from_n, &to_n).unwrap_or_else(Quat::identity)
}

/// Some unit vector perpendicular to `v`
pub fn perpendicular(v: Vec3) -> Vec3 {
    Vec3::x()
        .cross(&v)
        .try_normalize(1e-6)
        .unwrap_or_else(|| Vec3::y().cross(&v).normalize())
}

/// Plane defined by normal and distance from origin
///
/// Points satisfy `normal · p + distance = 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    /// Normal vector (normalized)
    pub normal: Vec3,
    /// Distance from origin along the normal
    pub distance: f32,
}

impl Plane {
    /// Create a new plane from normal and distance
    pub fn new(normal: Vec3, distance: f32) -> Self {
        Self { normal: normal.normalize(), distance }
    }

    /// Create a plane through `point` with the given normal
    pub fn from_normal_point(normal: Vec3, point: Vec3) -> Self {
        let normal = normal.normalize();
        Self { normal, distance: -normal.dot(&point) }
    }

    /// Calculate signed distance from plane to point
    pub fn distance_to_point(&self, point: Vec3) -> f32 {
        self.normal.dot(&point) + self.distance
    }

    /// This plane moved by a rigid orientation / position (scale ignored)
    pub fn transformed(&self, orientation: Quat, position: Vec3) -> Plane {
        let normal = orientation * self.normal;
        let point = orientation * (self.normal * -self.distance) + position;
        Plane::from_normal_point(normal, point)
    }

    /// Affine matrix mirroring points through this plane
    pub fn reflection_matrix(&self) -> Mat4 {
        let n = self.normal;
        let d = self.distance;
        Mat4::new(
            -2.0 * n.x * n.x + 1.0, -2.0 * n.x * n.y, -2.0 * n.x * n.z, -2.0 * n.x * d,
            -2.0 * n.y * n.x, -2.0 * n.y * n.y + 1.0, -2.0 * n.y * n.z, -2.0 * n.y * d,
            -2.0 * n.z * n.x, -2.0 * n.z * n.y, -2.0 * n.z * n.z + 1.0, -2.0 * n.z * d,
            0.0, 0.0, 0.0, 1.0,
        )
    }
}

/// Mirror a direction vector about a plane normal
pub fn reflect(vector: Vec3, normal: Vec3) -> Vec3 {
    vector - normal * (2.0 * vector.dot(&normal))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::FRAC_PI_2;

    const EPSILON: f32 = 1e-5;

    #[test]
    fn test_make_transform_orders_scale_rotate_translate() {
        let orientation = Quat::from_axis_angle(&Vec3::z_axis(), FRAC_PI_2);
        let matrix = make_transform(Vec3::new(1.0, 2.0, 3.0), Vec3::new(2.0, 2.0, 2.0), orientation);

        // X is scaled by two, rotated onto +Y, then offset
        let p = matrix.transform_point(&nalgebra::Point3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(p.coords, Vec3::new(1.0, 4.0, 3.0), epsilon = EPSILON);
    }

    #[test]
    fn test_inverse_transform_undoes_transform() {
        let orientation = Quat::from_euler_angles(0.3, -0.7, 1.1);
        let position = Vec3::new(-4.0, 2.5, 9.0);
        let scale = Vec3::new(0.5, 3.0, 1.5);

        let forward = make_transform(position, scale, orientation);
        let inverse = make_inverse_transform(position, scale, orientation);

        assert_relative_eq!(inverse * forward, Mat4::identity(), epsilon = 1e-4);
    }

    #[test]
    fn test_compose_with_and_without_inheritance() {
        let parent = Transform::new(
            Vec3::new(10.0, 0.0, 0.0),
            Quat::from_axis_angle(&Vec3::y_axis(), FRAC_PI_2),
            Vec3::new(2.0, 2.0, 2.0),
        );
        let child = Transform::from_position(Vec3::new(1.0, 0.0, 0.0));

        let inherited = parent.compose(&child, true, true);
        assert_relative_eq!(inherited.position, Vec3::new(10.0, 0.0, -2.0), epsilon = EPSILON);
        assert_relative_eq!(inherited.scale, Vec3::new(2.0, 2.0, 2.0), epsilon = EPSILON);
        assert_relative_eq!(inherited.orientation, parent.orientation, epsilon = EPSILON);

        let isolated = parent.compose(&child, false, false);
        assert_relative_eq!(isolated.orientation, Quat::identity(), epsilon = EPSILON);
        assert_relative_eq!(isolated.scale, Vec3::new(1.0, 1.0, 1.0), epsilon = EPSILON);
        // position still lives in parent space
        assert_relative_eq!(isolated.position, inherited.position, epsilon = EPSILON);
    }

    #[test]
    fn test_rotation_to_opposite_uses_fallback_axis() {
        let q = rotation_to(Vec3::z(), -Vec3::z(), Some(Vec3::y()));
        assert_relative_eq!(q * Vec3::z(), -Vec3::z(), epsilon = EPSILON);
        assert_relative_eq!(q * Vec3::y(), Vec3::y(), epsilon = EPSILON);
    }

    #[test]
    fn test_perpendicular_of_axis_vectors() {
        for v in [Vec3::x(), -Vec3::y(), Vec3::new(0.0, 0.0, 3.0)] {
            let p = perpendicular(v);
            assert_relative_eq!(p.norm(), 1.0, epsilon = EPSILON);
            assert_relative_eq!(p.dot(&v), 0.0, epsilon = EPSILON);
        }
    }

    #[test]
    fn test_reflection_matrix_mirrors_points() {
        let plane = Plane::new(Vec3::y(), 0.0);
        let mirrored = plane.reflection_matrix().transform_point(&nalgebra::Point3::new(1.0, 3.0, -2.0));
        assert_relative_eq!(mirrored.coords, Vec3::new(1.0, -3.0, -2.0), epsilon = EPSILON);
        assert_relative_eq!(reflect(Vec3::new(0.0, -1.0, 1.0), Vec3::y()), Vec3::new(0.0, 1.0, 1.0));
    }

    #[test]
    fn test_plane_transformed_follows_rigid_motion() {
        let plane = Plane::new(Vec3::y(), 0.0);
        let moved = plane.transformed(Quat::identity(), Vec3::new(0.0, 5.0, 0.0));
        assert_relative_eq!(moved.distance_to_point(Vec3::new(3.0, 5.0, 1.0)), 0.0, epsilon = EPSILON);
    }
}
