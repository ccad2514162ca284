/// Camera, weak perspective projection and the per-frame render pass
use nalgebra::{Point2, Point3, Vector3};

use crate::depth::{depth_key, sort_back_to_front, RenderItem};
use crate::geometry::{Face, Object};
use crate::surface::Surface;
use crate::transform::{rotate, RotationState};
use crate::warp::warp;

pub const DEFAULT_FOCAL_LENGTH: f32 = 60.0;

/// Projection center matching a 600x600 target.
pub const DEFAULT_CENTER: (f32, f32) = (300.0, 300.0);

/// Smallest `|focal_length + z|` a vertex may have and still be projected
const MIN_PROJECTION_DIVISOR: f32 = 1e-3;

/// Camera lens settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraConfig {
    pub focal_length: f32,
    /// Screen position of the optical axis
    pub center: Point2<f32>,
}

impl CameraConfig {
    /// Center the projection on a `width` x `height` target
    pub fn centered(width: u32, height: u32) -> Self {
        Self {
            center: Point2::new(width as f32 / 2.0, height as f32 / 2.0),
            ..Self::default()
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            focal_length: DEFAULT_FOCAL_LENGTH,
            center: Point2::new(DEFAULT_CENTER.0, DEFAULT_CENTER.1),
        }
    }
}

/// Renders a set of quad objects with weak perspective projection.
///
/// Objects are borrowed immutably for the whole of [`Camera::render`], so they
/// can only be moved between frames.
#[derive(Debug, Clone)]
pub struct Camera {
    pub objects: Vec<Object>,
    pub scroll: Vector3<f32>,
    pub rotation: RotationState,
    pub focal_length: f32,
    pub center: Point2<f32>,
}

impl Camera {
    pub fn new(objects: Vec<Object>) -> Self {
        Self::with_config(objects, CameraConfig::default())
    }

    pub fn with_config(objects: Vec<Object>, config: CameraConfig) -> Self {
        Self {
            objects,
            scroll: Vector3::zeros(),
            rotation: RotationState::zero(),
            focal_length: config.focal_length,
            center: config.center,
        }
    }

    /// Place an object-local vertex in the world
    pub fn object_to_world(object: &Object, vertex: &Point3<f32>) -> Point3<f32> {
        rotate(vertex, &object.rotation) + object.position
    }

    /// World to camera space: rotate, subtract the scroll, rotate again.
    pub fn world_to_camera(&self, world: &Point3<f32>) -> Point3<f32> {
        let scrolled = rotate(world, &self.rotation) - self.scroll;
        rotate(&scrolled, &self.rotation)
    }

    /// Project a camera-space point to screen coordinates.
    ///
    /// Returns `None` when the point sits on the projection singularity
    /// (`focal_length + z == 0`).
    pub fn project(&self, camera_space: &Point3<f32>) -> Option<Point2<f32>> {
        let divisor = self.focal_length + camera_space.z;
        if !divisor.is_finite() || divisor.abs() < MIN_PROJECTION_DIVISOR {
            return None;
        }
        let scale = self.focal_length / divisor;
        Some(Point2::new(
            camera_space.x * scale + self.center.x,
            camera_space.y * scale + self.center.y,
        ))
    }

    /// Transform and project one face. `None` if any vertex cannot be projected.
    pub fn face_item<'a>(&self, object: &Object, face: &'a Face) -> Option<RenderItem<'a>> {
        let camera_space = face
            .vertices
            .map(|v| self.world_to_camera(&Self::object_to_world(object, &v)));

        let mut quad = [Point2::origin(); 4];
        for (slot, vertex) in quad.iter_mut().zip(&camera_space) {
            *slot = self.project(vertex)?;
        }

        Some(RenderItem {
            quad,
            texture: &face.texture,
            depth: depth_key(&camera_space),
        })
    }

    /// Every projectable face of every object, farthest first
    pub fn render_items(&self) -> Vec<RenderItem<'_>> {
        let mut items = Vec::with_capacity(self.objects.iter().map(|o| o.mesh.face_count()).sum());
        let mut skipped = 0usize;

        for object in &self.objects {
            for face in &object.mesh.faces {
                match self.face_item(object, face) {
                    Some(item) => items.push(item),
                    None => skipped += 1,
                }
            }
        }
        if skipped > 0 {
            tracing::debug!(skipped, "faces dropped at the projection singularity");
        }

        sort_back_to_front(&mut items);
        items
    }

    /// Draw one frame onto `surface`, back to front.
    pub fn render<S: Surface + ?Sized>(&self, surface: &mut S) {
        let _span = tracing::trace_span!("render_frame", objects = self.objects.len()).entered();

        let items = self.render_items();
        let mut drawn = 0usize;
        for item in &items {
            match warp(item.texture, &item.quad) {
                Ok((image, rect)) => {
                    surface.blit(&image, rect);
                    drawn += 1;
                }
                Err(e) => tracing::warn!(depth = item.depth, "skipping face: {e}"),
            }
        }

        tracing::trace!(faces = items.len(), drawn, "frame rendered");
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}
