/// Painter's-algorithm face ordering
use nalgebra::{Point2, Point3};

use crate::texture::Texture;

/// One face, ready to be warped and composited this frame
#[derive(Debug, Clone, Copy)]
pub struct RenderItem<'a> {
    /// Projected screen-space corners, in face winding order
    pub quad: [Point2<f32>; 4],
    pub texture: &'a Texture,
    /// Largest camera-space z among the face's vertices
    pub depth: f32,
}

/// Depth key of a face: its farthest vertex in camera space.
pub fn depth_key(vertices: &[Point3<f32>; 4]) -> f32 {
    vertices.iter().map(|v| v.z).fold(f32::NEG_INFINITY, f32::max)
}

/// Order items farthest first so nearer faces are composited on top.
/// Ties are left in arbitrary order.
pub fn sort_back_to_front(items: &mut [RenderItem<'_>]) {
    items.sort_unstable_by(|a, b| b.depth.total_cmp(&a.depth));
}
