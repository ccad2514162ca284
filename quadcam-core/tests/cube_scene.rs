//! End-to-end frame tests on a textured cube
//!
//! The cube is centered on the camera with no rotation, so its -z face is
//! the only one in front of every other face.

use image::{Rgb, Rgba};
use quadcam_core::{Camera, Canvas, Mesh, Object, Rect, Surface, Texture, WarpedImage};

const FACE_COLORS: [Rgb<u8>; 6] = [
    Rgb([200, 30, 30]),  // -z
    Rgb([30, 200, 30]),  // +x
    Rgb([30, 30, 200]),  // +z
    Rgb([200, 200, 30]), // -x
    Rgb([30, 200, 200]), // -y
    Rgb([200, 30, 200]), // +y
];

const BACKGROUND: Rgba<u8> = Rgba([12, 12, 12, 255]);

fn cube_camera() -> Camera {
    let textures = FACE_COLORS.map(|c| Texture::solid(32, 32, c));
    let cube = Object::new(Mesh::cube_with_textures(60.0, textures));
    Camera::new(vec![cube])
}

/// Records the color of each composited face, in draw order
#[derive(Default)]
struct DrawLog {
    colors: Vec<Rgb<u8>>,
    rects: Vec<Rect>,
}

impl Surface for DrawLog {
    fn blit(&mut self, image: &WarpedImage, dest: Rect) {
        let color = image
            .pixels
            .pixels()
            .find(|p| p[3] == 255)
            .map(|p| Rgb([p[0], p[1], p[2]]))
            .expect("warped face has opaque pixels");
        self.colors.push(color);
        self.rects.push(dest);
    }

    fn fill(&mut self, _color: Rgba<u8>) {
        self.colors.clear();
        self.rects.clear();
    }
}

#[test]
fn test_cube_composites_six_faces_per_frame() {
    let camera = cube_camera();
    let mut log = DrawLog::default();

    camera.render(&mut log);
    assert_eq!(log.colors.len(), 6);

    // A second frame starts from scratch
    log.fill(BACKGROUND);
    camera.render(&mut log);
    assert_eq!(log.colors.len(), 6);
}

#[test]
fn test_nearest_face_is_drawn_last() {
    let camera = cube_camera();
    let mut log = DrawLog::default();
    camera.render(&mut log);

    let near = FACE_COLORS[0];
    let far = FACE_COLORS[2];
    assert_eq!(log.colors.last(), Some(&near));

    let far_pos = log.colors.iter().position(|c| *c == far).unwrap();
    assert!(far_pos < 5);

    let items = camera.render_items();
    assert_eq!(items.last().map(|i| i.depth), Some(-30.0));
    assert!(items[..5].iter().all(|i| i.depth == 30.0));
}

#[test]
fn test_front_face_covers_the_frame_center() {
    let camera = cube_camera();
    let mut canvas = Canvas::new(600, 600);
    canvas.fill(BACKGROUND);
    camera.render(&mut canvas);

    let Rgb([r, g, b]) = FACE_COLORS[0];
    let front = Rgba([r, g, b, 255]);
    // Front face spans 240..360 on both axes
    assert_eq!(canvas.pixel(300, 300), front);
    assert_eq!(canvas.pixel(245, 245), front);
    assert_eq!(canvas.pixel(355, 300), front);
    assert_eq!(canvas.pixel(200, 200), BACKGROUND);
    assert_eq!(canvas.pixel(300, 380), BACKGROUND);
}

#[test]
fn test_scrolling_moves_the_image() {
    let mut camera = cube_camera();
    camera.scroll.x = 20.0;

    let mut canvas = Canvas::new(600, 600);
    canvas.fill(BACKGROUND);
    camera.render(&mut canvas);

    // Front face now spans 200..320 horizontally
    let Rgb([r, g, b]) = FACE_COLORS[0];
    assert_eq!(canvas.pixel(205, 300), Rgba([r, g, b, 255]));
    assert_eq!(canvas.pixel(340, 300), BACKGROUND);
}
