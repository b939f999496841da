//! Billboard axis and corner calculations
//!
//! All inputs are in the billboard set's space: the camera frame has already
//! been brought into it by the set.

use crate::foundation::math::{Quat, Unit, Vec3};

use super::types::{Billboard, BillboardOrigin, BillboardType, TexRect};

/// Camera orientation, position and view direction in set space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraFrame {
    /// Camera orientation
    pub orientation: Quat,
    /// Camera position
    pub position: Vec3,
    /// Viewing direction
    pub direction: Vec3,
}

impl Default for CameraFrame {
    fn default() -> Self {
        Self::new(Quat::identity(), Vec3::zeros())
    }
}

impl CameraFrame {
    /// Frame looking down the orientation's -Z axis
    pub fn new(orientation: Quat, position: Vec3) -> Self {
        Self { orientation, position, direction: orientation * -Vec3::z() }
    }
}

/// Set-wide parameters shared by every billboard's axes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FacingParams {
    /// Orientation rule
    pub billboard_type: BillboardType,
    /// Face the camera position rather than its view plane
    pub accurate_facing: bool,
    /// Common direction for `*Common` types
    pub common_direction: Vec3,
    /// Common up vector for `Perpendicular*` types
    pub common_up: Vec3,
}

/// Calculate the quad's X and Y axes for one billboard
///
/// For types whose axes do not depend on the billboard any billboard may be
/// passed; see [`BillboardType::axes_per_billboard`].
pub fn billboard_axes(params: &FacingParams, camera: &CameraFrame, billboard: &Billboard) -> (Vec3, Vec3) {
    let camera_direction = match params.billboard_type {
        BillboardType::Point | BillboardType::OrientedCommon | BillboardType::OrientedSelf
            if params.accurate_facing =>
        {
            (billboard.position - camera.position)
                .try_normalize(f32::EPSILON)
                .unwrap_or(camera.direction)
        }
        _ => camera.direction,
    };

    match params.billboard_type {
        BillboardType::Point => {
            if params.accurate_facing {
                let y = camera.orientation * Vec3::y();
                let x = camera_direction.cross(&y).normalize();
                let y = x.cross(&camera_direction);
                (x, y)
            } else {
                (camera.orientation * Vec3::x(), camera.orientation * Vec3::y())
            }
        }
        BillboardType::OrientedCommon => {
            let y = params.common_direction;
            (camera_direction.cross(&y).normalize(), y)
        }
        BillboardType::OrientedSelf => {
            let y = billboard.direction;
            (camera_direction.cross(&y).normalize(), y)
        }
        BillboardType::PerpendicularCommon => {
            let x = params.common_up.cross(&params.common_direction);
            let y = params.common_direction.cross(&x);
            (x, y)
        }
        BillboardType::PerpendicularSelf => {
            let x = params.common_up.cross(&billboard.direction).normalize();
            let y = billboard.direction.cross(&x);
            (x, y)
        }
    }
}

/// Fractions of width and height from the origin to each edge
///
/// Returned as `(left, right, top, bottom)`.
pub fn parametric_offsets(origin: BillboardOrigin) -> (f32, f32, f32, f32) {
    match origin {
        BillboardOrigin::TopLeft => (0.0, 1.0, 0.0, -1.0),
        BillboardOrigin::TopCenter => (-0.5, 0.5, 0.0, -1.0),
        BillboardOrigin::TopRight => (-1.0, 0.0, 0.0, -1.0),
        BillboardOrigin::CenterLeft => (0.0, 1.0, 0.5, -0.5),
        BillboardOrigin::Center => (-0.5, 0.5, 0.5, -0.5),
        BillboardOrigin::CenterRight => (-1.0, 0.0, 0.5, -0.5),
        BillboardOrigin::BottomLeft => (0.0, 1.0, 1.0, 0.0),
        BillboardOrigin::BottomCenter => (-0.5, 0.5, 1.0, 0.0),
        BillboardOrigin::BottomRight => (-1.0, 0.0, 1.0, 0.0),
    }
}

/// Corner offsets `[top-left, top-right, bottom-left, bottom-right]`
pub fn vertex_offsets(origin: BillboardOrigin, width: f32, height: f32, x: Vec3, y: Vec3) -> [Vec3; 4] {
    let (left, right, top, bottom) = parametric_offsets(origin);
    let left = x * (left * width);
    let right = x * (right * width);
    let top = y * (top * height);
    let bottom = y * (bottom * height);

    [left + top, right + top, left + bottom, right + bottom]
}

/// Turn corner offsets by `angle` around the quad's facing axis
pub fn rotate_offsets(offsets: &mut [Vec3; 4], angle: f32) {
    let axis = (offsets[3] - offsets[0]).cross(&(offsets[2] - offsets[1]));
    let Some(axis) = Unit::try_new(axis, f32::EPSILON) else {
        return;
    };
    let rotation = Quat::from_axis_angle(&axis, angle);
    for offset in offsets.iter_mut() {
        *offset = rotation * *offset;
    }
}

/// Texture coordinates for the corners, rotated about the rectangle center
pub fn corner_tex_coords(rect: &TexRect, rotation: f32) -> [[f32; 2]; 4] {
    if rotation == 0.0 {
        return [
            [rect.left, rect.top],
            [rect.right, rect.top],
            [rect.left, rect.bottom],
            [rect.right, rect.bottom],
        ];
    }

    let (sin, cos) = rotation.sin_cos();
    let half_width = (rect.right - rect.left) / 2.0;
    let half_height = (rect.bottom - rect.top) / 2.0;
    let mid_u = rect.left + half_width;
    let mid_v = rect.top + half_height;

    let cos_w = cos * half_width;
    let cos_h = cos * half_height;
    let sin_w = sin * half_width;
    let sin_h = sin * half_height;

    [
        [mid_u - cos_w + sin_h, mid_v - sin_w - cos_h],
        [mid_u + cos_w + sin_h, mid_v + sin_w - cos_h],
        [mid_u - cos_w - sin_h, mid_v - sin_w + cos_h],
        [mid_u + cos_w - sin_h, mid_v + sin_w + cos_h],
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::FRAC_PI_2;

    const EPSILON: f32 = 1e-5;

    fn params(billboard_type: BillboardType, accurate_facing: bool) -> FacingParams {
        FacingParams {
            billboard_type,
            accurate_facing,
            common_direction: Vec3::z(),
            common_up: Vec3::y(),
        }
    }

    #[test]
    fn test_point_axes_match_camera() {
        let camera = CameraFrame::new(Quat::from_axis_angle(&Vec3::y_axis(), FRAC_PI_2), Vec3::zeros());
        let billboard = Billboard::new(Vec3::new(-5.0, 0.0, 0.0));
        let (x, y) = billboard_axes(&params(BillboardType::Point, false), &camera, &billboard);

        assert_relative_eq!(x, -Vec3::z(), epsilon = EPSILON);
        assert_relative_eq!(y, Vec3::y(), epsilon = EPSILON);
    }

    #[test]
    fn test_accurate_facing_turns_toward_camera_position() {
        let camera = CameraFrame::new(Quat::identity(), Vec3::new(0.0, 0.0, 0.0));
        let billboard = Billboard::new(Vec3::new(5.0, 0.0, -5.0));
        let (x, y) = billboard_axes(&params(BillboardType::Point, true), &camera, &billboard);

        let to_billboard = billboard.position.normalize();
        assert_relative_eq!(x.dot(&to_billboard), 0.0, epsilon = EPSILON);
        assert_relative_eq!(y, Vec3::y(), epsilon = EPSILON);
    }

    #[test]
    fn test_oriented_common_keeps_common_up() {
        let camera = CameraFrame::new(Quat::identity(), Vec3::zeros());
        let billboard = Billboard::new(Vec3::new(0.0, 0.0, -5.0));
        let mut p = params(BillboardType::OrientedCommon, false);
        p.common_direction = Vec3::y();
        let (x, y) = billboard_axes(&p, &camera, &billboard);

        assert_relative_eq!(x, Vec3::x(), epsilon = EPSILON);
        assert_relative_eq!(y, Vec3::y(), epsilon = EPSILON);
    }

    #[test]
    fn test_perpendicular_self_faces_own_direction() {
        let camera = CameraFrame::default();
        let billboard = Billboard::new(Vec3::zeros()).with_direction(Vec3::x());
        let (x, y) = billboard_axes(&params(BillboardType::PerpendicularSelf, false), &camera, &billboard);

        assert_relative_eq!(x, -Vec3::z(), epsilon = EPSILON);
        assert_relative_eq!(y, Vec3::y(), epsilon = EPSILON);
        assert_relative_eq!(x.cross(&y), Vec3::x(), epsilon = EPSILON);
    }

    #[test]
    fn test_origin_offsets() {
        let [tl, tr, bl, br] = vertex_offsets(BillboardOrigin::Center, 2.0, 4.0, Vec3::x(), Vec3::y());
        assert_relative_eq!(tl, Vec3::new(-1.0, 2.0, 0.0));
        assert_relative_eq!(tr, Vec3::new(1.0, 2.0, 0.0));
        assert_relative_eq!(bl, Vec3::new(-1.0, -2.0, 0.0));
        assert_relative_eq!(br, Vec3::new(1.0, -2.0, 0.0));

        let [tl, _, _, br] = vertex_offsets(BillboardOrigin::TopLeft, 2.0, 4.0, Vec3::x(), Vec3::y());
        assert_relative_eq!(tl, Vec3::zeros());
        assert_relative_eq!(br, Vec3::new(2.0, -4.0, 0.0));

        let [tl, tr, _, _] = vertex_offsets(BillboardOrigin::TopCenter, 2.0, 4.0, Vec3::x(), Vec3::y());
        assert_relative_eq!(tl, Vec3::new(-1.0, 0.0, 0.0));
        assert_relative_eq!(tr, Vec3::new(1.0, 0.0, 0.0));

        let [_, _, bl, br] = vertex_offsets(BillboardOrigin::BottomRight, 2.0, 4.0, Vec3::x(), Vec3::y());
        assert_relative_eq!(br, Vec3::zeros());
        assert_relative_eq!(bl, Vec3::new(-2.0, 0.0, 0.0));
    }

    #[test]
    fn test_vertex_rotation_moves_every_corner() {
        let mut offsets = vertex_offsets(BillboardOrigin::Center, 2.0, 2.0, Vec3::x(), Vec3::y());
        rotate_offsets(&mut offsets, FRAC_PI_2);

        // the facing axis points away from the viewer, so positive angles turn clockwise on screen
        assert_relative_eq!(offsets[0], Vec3::new(1.0, 1.0, 0.0), epsilon = EPSILON);
        assert_relative_eq!(offsets[1], Vec3::new(1.0, -1.0, 0.0), epsilon = EPSILON);
        assert_relative_eq!(offsets[2], Vec3::new(-1.0, 1.0, 0.0), epsilon = EPSILON);
        assert_relative_eq!(offsets[3], Vec3::new(-1.0, -1.0, 0.0), epsilon = EPSILON);
    }

    #[test]
    fn test_tex_coord_rotation() {
        let rect = TexRect::default();
        let plain = corner_tex_coords(&rect, 0.0);
        assert_eq!(plain, [[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [1.0, 1.0]]);

        let turned = corner_tex_coords(&rect, FRAC_PI_2);
        assert_relative_eq!(turned[0][0], 1.0, epsilon = EPSILON);
        assert_relative_eq!(turned[0][1], 0.0, epsilon = EPSILON);
        assert_relative_eq!(turned[3][0], 0.0, epsilon = EPSILON);
        assert_relative_eq!(turned[3][1], 1.0, epsilon = EPSILON);
    }
}
