//! Pooled collection of billboards sharing one orientation rule
//!
//! Each frame the set is told which camera renders it, brings that camera
//! into its own space, and rebuilds its vertex data between
//! [`BillboardSet::begin_billboards`] and [`BillboardSet::end_billboards`].
//! Vertices are in the set's space; [`BillboardSet::world_transform`] places
//! them in the world.

use log::{debug, trace, warn};

use crate::foundation::math::{Mat4, Vec3};
use crate::render::camera::Camera;
use crate::scene::{NodeId, NodeTree, SceneError};

use super::orientation::{
    billboard_axes, corner_tex_coords, rotate_offsets, vertex_offsets, CameraFrame, FacingParams,
};
use super::types::{Billboard, BillboardOrigin, BillboardRotationType, BillboardType, BillboardVertex, TexRect};

/// Billboards drawn together with shared size, orientation and texture
#[derive(Debug, Clone)]
pub struct BillboardSet {
    name: String,
    parent: Option<NodeId>,

    billboard_type: BillboardType,
    origin: BillboardOrigin,
    rotation_type: BillboardRotationType,
    default_width: f32,
    default_height: f32,
    common_direction: Vec3,
    common_up: Vec3,
    tex_rect: TexRect,
    accurate_facing: bool,
    world_space: bool,
    point_rendering: bool,

    billboards: Vec<Billboard>,
    pool_size: usize,
    auto_extend: bool,

    camera: CameraFrame,
    common_axes: Option<(Vec3, Vec3)>,
    vertices: Vec<BillboardVertex>,
    building: bool,
}

impl BillboardSet {
    /// Create an empty set with room for `pool_size` billboards
    pub fn new(name: impl Into<String>, pool_size: usize) -> Self {
        Self {
            name: name.into(),
            parent: None,
            billboard_type: BillboardType::default(),
            origin: BillboardOrigin::default(),
            rotation_type: BillboardRotationType::default(),
            default_width: 100.0,
            default_height: 100.0,
            common_direction: Vec3::z(),
            common_up: Vec3::y(),
            tex_rect: TexRect::default(),
            accurate_facing: false,
            world_space: false,
            point_rendering: false,
            billboards: Vec::with_capacity(pool_size),
            pool_size,
            auto_extend: true,
            camera: CameraFrame::default(),
            common_axes: None,
            vertices: Vec::new(),
            building: false,
        }
    }

    /// Set name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Node the set is attached to
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Attach to a node, or detach with `None`
    pub fn set_parent(&mut self, parent: Option<NodeId>) {
        self.parent = parent;
    }

    // ---- configuration ----

    /// Orientation rule
    pub fn billboard_type(&self) -> BillboardType {
        self.billboard_type
    }

    /// Change the orientation rule
    pub fn set_billboard_type(&mut self, billboard_type: BillboardType) {
        self.billboard_type = billboard_type;
    }

    /// Quad origin
    pub fn origin(&self) -> BillboardOrigin {
        self.origin
    }

    /// Change the quad origin
    pub fn set_origin(&mut self, origin: BillboardOrigin) {
        self.origin = origin;
    }

    /// What billboard rotation turns
    pub fn rotation_type(&self) -> BillboardRotationType {
        self.rotation_type
    }

    /// Change what billboard rotation turns
    pub fn set_rotation_type(&mut self, rotation_type: BillboardRotationType) {
        self.rotation_type = rotation_type;
    }

    /// Size used by billboards without their own
    pub fn default_dimensions(&self) -> (f32, f32) {
        (self.default_width, self.default_height)
    }

    /// Change the default size
    pub fn set_default_dimensions(&mut self, width: f32, height: f32) {
        self.default_width = width;
        self.default_height = height;
    }

    /// Shared direction for `*Common` types
    pub fn common_direction(&self) -> Vec3 {
        self.common_direction
    }

    /// Change the shared direction
    pub fn set_common_direction(&mut self, direction: Vec3) {
        self.common_direction = direction.normalize();
    }

    /// Shared up vector for `Perpendicular*` types
    pub fn common_up_vector(&self) -> Vec3 {
        self.common_up
    }

    /// Change the shared up vector
    pub fn set_common_up_vector(&mut self, up: Vec3) {
        self.common_up = up.normalize();
    }

    /// Texture rectangle mapped onto each quad
    pub fn tex_rect(&self) -> TexRect {
        self.tex_rect
    }

    /// Change the texture rectangle
    pub fn set_tex_rect(&mut self, rect: TexRect) {
        self.tex_rect = rect;
    }

    /// Whether billboards face the camera position instead of its view plane
    pub fn accurate_facing(&self) -> bool {
        self.accurate_facing
    }

    /// Toggle accurate facing
    pub fn set_accurate_facing(&mut self, accurate: bool) {
        self.accurate_facing = accurate;
    }

    /// Whether billboard positions are already in world space
    pub fn is_world_space(&self) -> bool {
        self.world_space
    }

    /// Treat positions as world space, ignoring the parent node
    pub fn set_world_space(&mut self, world_space: bool) {
        self.world_space = world_space;
    }

    /// Whether one vertex is emitted per billboard
    pub fn point_rendering(&self) -> bool {
        self.point_rendering
    }

    /// Toggle point rendering
    pub fn set_point_rendering(&mut self, enabled: bool) {
        self.point_rendering = enabled;
    }

    // ---- pool ----

    /// Capacity before the pool has to grow
    pub fn pool_size(&self) -> usize {
        self.pool_size
    }

    /// Grow the pool; shrinking is ignored
    pub fn set_pool_size(&mut self, size: usize) {
        if size > self.pool_size {
            self.billboards.reserve(size - self.billboards.len());
            self.pool_size = size;
        }
    }

    /// Whether a full pool doubles instead of refusing billboards
    pub fn auto_extend(&self) -> bool {
        self.auto_extend
    }

    /// Toggle pool growth
    pub fn set_auto_extend(&mut self, auto_extend: bool) {
        self.auto_extend = auto_extend;
    }

    /// Add a billboard, returning its index
    pub fn create_billboard(&mut self, billboard: Billboard) -> Result<usize, SceneError> {
        if self.billboards.len() >= self.pool_size {
            if !self.auto_extend {
                return Err(SceneError::BillboardPoolExhausted(self.pool_size));
            }
            let grown = (self.pool_size * 2).max(1);
            debug!("Billboard set '{}' pool grown from {} to {}", self.name, self.pool_size, grown);
            self.set_pool_size(grown);
        }
        self.billboards.push(billboard);
        Ok(self.billboards.len() - 1)
    }

    /// Remove a billboard; later indices shift down
    pub fn remove_billboard(&mut self, index: usize) -> Option<Billboard> {
        (index < self.billboards.len()).then(|| self.billboards.remove(index))
    }

    /// Remove every billboard
    pub fn clear(&mut self) {
        self.billboards.clear();
    }

    /// Billboard by index
    pub fn billboard(&self, index: usize) -> Option<&Billboard> {
        self.billboards.get(index)
    }

    /// Mutable billboard by index
    pub fn billboard_mut(&mut self, index: usize) -> Option<&mut Billboard> {
        self.billboards.get_mut(index)
    }

    /// Active billboards
    pub fn billboards(&self) -> &[Billboard] {
        &self.billboards
    }

    /// Number of active billboards
    pub fn len(&self) -> usize {
        self.billboards.len()
    }

    /// Whether no billboard is active
    pub fn is_empty(&self) -> bool {
        self.billboards.is_empty()
    }

    // ---- rendering ----

    /// Bring the rendering camera into the set's space
    ///
    /// Sets in world space, or without a parent, use the camera as is.
    pub fn notify_current_camera(&mut self, tree: &mut NodeTree, camera: &mut Camera) {
        if let Some(parent) = self.parent.filter(|&parent| !tree.contains(parent)) {
            warn!("Billboard set '{}' detached from destroyed node {:?}", self.name, parent);
            self.parent = None;
        }

        let mut orientation = camera.derived_orientation(tree);
        let mut position = camera.derived_position(tree);

        if let (false, Some(parent)) = (self.world_space, self.parent) {
            let inverse = tree.derived_orientation(parent).inverse();
            orientation = inverse * orientation;
            position = (inverse * (position - tree.derived_position(parent))).component_div(&tree.derived_scale(parent));
        }

        self.camera = CameraFrame::new(orientation, position);
    }

    /// Camera frame from the last notification
    pub fn camera_frame(&self) -> CameraFrame {
        self.camera
    }

    /// Start rebuilding vertex data
    ///
    /// # Panics
    /// If a rebuild is already in progress.
    pub fn begin_billboards(&mut self) {
        assert!(!self.building, "begin_billboards called twice on '{}'", self.name);
        self.building = true;
        self.vertices.clear();

        self.common_axes = if self.billboard_type.axes_per_billboard(self.accurate_facing) {
            None
        } else {
            // axes ignore the billboard for these types
            Some(billboard_axes(&self.facing_params(), &self.camera, &Billboard::new(Vec3::zeros())))
        };
    }

    /// Append vertices for one billboard
    ///
    /// # Panics
    /// Outside a `begin_billboards` / `end_billboards` pair.
    pub fn inject_billboard(&mut self, billboard: &Billboard) {
        assert!(self.building, "inject_billboard called outside begin/end on '{}'", self.name);
        let color: [f32; 4] = billboard.color.into();

        if self.point_rendering {
            self.vertices.push(BillboardVertex {
                position: billboard.position.into(),
                color,
                tex_coord: [0.0, 0.0],
            });
            return;
        }

        let (x, y) = match self.common_axes {
            Some(axes) => axes,
            None => billboard_axes(&self.facing_params(), &self.camera, billboard),
        };
        let (width, height) = billboard.dimensions.unwrap_or((self.default_width, self.default_height));
        let mut offsets = vertex_offsets(self.origin, width, height, x, y);

        let tex_coords = match self.rotation_type {
            BillboardRotationType::Vertex => {
                if billboard.rotation != 0.0 {
                    rotate_offsets(&mut offsets, billboard.rotation);
                }
                corner_tex_coords(&self.tex_rect, 0.0)
            }
            BillboardRotationType::TexCoord => corner_tex_coords(&self.tex_rect, billboard.rotation),
        };

        for (offset, tex_coord) in offsets.iter().zip(tex_coords) {
            self.vertices.push(BillboardVertex {
                position: (billboard.position + offset).into(),
                color,
                tex_coord,
            });
        }
    }

    /// Finish rebuilding vertex data
    ///
    /// # Panics
    /// Without a matching `begin_billboards`.
    pub fn end_billboards(&mut self) {
        assert!(self.building, "end_billboards called without begin on '{}'", self.name);
        self.building = false;
        trace!("Billboard set '{}' built {} vertices", self.name, self.vertices.len());
    }

    /// Notify the camera and rebuild vertices for every active billboard
    pub fn update_render_data(&mut self, tree: &mut NodeTree, camera: &mut Camera) {
        self.notify_current_camera(tree, camera);
        self.begin_billboards();
        for index in 0..self.billboards.len() {
            let billboard = self.billboards[index];
            self.inject_billboard(&billboard);
        }
        self.end_billboards();
    }

    /// Vertices from the last rebuild
    pub fn vertices(&self) -> &[BillboardVertex] {
        &self.vertices
    }

    /// Vertices from the last rebuild as raw bytes for upload
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Matrix placing the set's vertices in the world
    pub fn world_transform(&self, tree: &mut NodeTree) -> Mat4 {
        match (self.world_space, self.parent) {
            (false, Some(parent)) if tree.contains(parent) => tree.full_transform(parent),
            _ => Mat4::identity(),
        }
    }

    fn facing_params(&self) -> FacingParams {
        FacingParams {
            billboard_type: self.billboard_type,
            accurate_facing: self.accurate_facing,
            common_direction: self.common_direction,
            common_up: self.common_up,
        }
    }
}
