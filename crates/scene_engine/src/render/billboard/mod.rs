//! Billboard rendering system
//!
//! Camera-facing quads for particles, foliage and effects. A
//! [`BillboardSet`] pools billboards that share an orientation rule and
//! rebuilds their vertices for whichever camera renders it.

pub mod types;
pub mod orientation;
pub mod set;

pub use types::{Billboard, BillboardOrigin, BillboardRotationType, BillboardType, BillboardVertex, TexRect};
pub use orientation::{
    billboard_axes,
    corner_tex_coords,
    parametric_offsets,
    rotate_offsets,
    vertex_offsets,
    CameraFrame,
    FacingParams,
};
pub use set::BillboardSet;
