//! Billboard data structures and types

use bytemuck::{Pod, Zeroable};

use crate::foundation::math::{Vec3, Vec4};

/// How billboards in a set orient themselves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BillboardType {
    /// Face the camera fully
    #[default]
    Point,

    /// Up axis locked to the set's common direction, turn about it to face the camera
    OrientedCommon,

    /// Up axis locked to each billboard's own direction
    OrientedSelf,

    /// Face the set's common direction, up from the common up vector
    PerpendicularCommon,

    /// Face each billboard's own direction, up from the common up vector
    PerpendicularSelf,
}

impl BillboardType {
    /// Whether axes depend on the individual billboard
    pub fn axes_per_billboard(self, accurate_facing: bool) -> bool {
        match self {
            BillboardType::OrientedSelf | BillboardType::PerpendicularSelf => true,
            BillboardType::Point | BillboardType::OrientedCommon => accurate_facing,
            BillboardType::PerpendicularCommon => false,
        }
    }
}

/// Point of the quad that sits on the billboard position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BillboardOrigin {
    /// Top left corner
    TopLeft,
    /// Middle of the top edge
    TopCenter,
    /// Top right corner
    TopRight,
    /// Middle of the left edge
    CenterLeft,
    /// Quad center
    #[default]
    Center,
    /// Middle of the right edge
    CenterRight,
    /// Bottom left corner
    BottomLeft,
    /// Middle of the bottom edge
    BottomCenter,
    /// Bottom right corner
    BottomRight,
}

/// What a billboard's rotation turns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BillboardRotationType {
    /// Rotate the quad corners around the facing axis
    Vertex,
    /// Rotate the texture coordinates inside a fixed quad
    #[default]
    TexCoord,
}

/// Texture rectangle in UV space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TexRect {
    /// Left U
    pub left: f32,
    /// Top V
    pub top: f32,
    /// Right U
    pub right: f32,
    /// Bottom V
    pub bottom: f32,
}

impl Default for TexRect {
    fn default() -> Self {
        Self { left: 0.0, top: 0.0, right: 1.0, bottom: 1.0 }
    }
}

/// Individual billboard quad data
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Billboard {
    /// Position in the set's space
    pub position: Vec3,

    /// Own axis for `OrientedSelf` and `PerpendicularSelf` sets
    pub direction: Vec3,

    /// RGBA color tint
    pub color: Vec4,

    /// Rotation in radians around the facing axis
    pub rotation: f32,

    /// Width and height overriding the set defaults
    pub dimensions: Option<(f32, f32)>,
}

impl Billboard {
    /// Create a white, unrotated billboard using the set's dimensions
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            direction: Vec3::z(),
            color: Vec4::new(1.0, 1.0, 1.0, 1.0),
            rotation: 0.0,
            dimensions: None,
        }
    }

    /// Set billboard color
    pub fn with_color(mut self, color: Vec4) -> Self {
        self.color = color;
        self
    }

    /// Set own direction
    pub fn with_direction(mut self, direction: Vec3) -> Self {
        self.direction = direction;
        self
    }

    /// Set own size
    pub fn with_dimensions(mut self, width: f32, height: f32) -> Self {
        self.dimensions = Some((width, height));
        self
    }

    /// Set rotation in radians
    pub fn with_rotation(mut self, rotation: f32) -> Self {
        self.rotation = rotation;
        self
    }
}

/// Vertex written for each billboard corner, or once per billboard in point mode
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct BillboardVertex {
    /// Position in the set's space
    pub position: [f32; 3],

    /// RGBA color
    pub color: [f32; 4],

    /// Texture coordinate
    pub tex_coord: [f32; 2],
}
