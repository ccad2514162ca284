/// quadcam core library - software camera for textured quad meshes
///
/// Objects are rotated and placed, viewed through a scrollable, rotatable
/// camera with weak perspective projection, ordered back to front and
/// texture-mapped onto any `Surface` with perspective warping.

pub mod depth;
pub mod geometry;
pub mod obj;
pub mod projection;
pub mod surface;
pub mod texture;
pub mod transform;
pub mod warp;

// Re-export commonly used types
pub use depth::RenderItem;
pub use geometry::{Face, Mesh, Object};
pub use projection::{Camera, CameraConfig};
pub use surface::{Canvas, Rect, Surface};
pub use texture::{Texture, TextureError, Transparency};
pub use transform::{rotate, RotationState};
pub use warp::{warp, WarpError, WarpedImage};
