/// Example: two overlapping cubes, the nearer one occluding the farther
///
/// Usage: cargo run --example two_cubes [-- --snapshot out.png]

use image::Rgb;
use quadcam_core::{Canvas, Mesh, Object, RotationState, Texture};
use quadcam_terminal::{render_frame, AppConfig, TerminalApp};
use std::env;
use std::io;

fn main() -> io::Result<()> {
    let near = Object::new(Mesh::cube(
        40.0,
        &Texture::checker(32, 32, 8, Rgb([230, 90, 40]), Rgb([250, 230, 200])),
    ))
    .with_position(-15.0, 0.0, 10.0)
    .with_rotation(RotationState::new(0.3, 0.4, 0.0));

    let far = Object::new(Mesh::cube(
        60.0,
        &Texture::checker(32, 32, 4, Rgb([40, 90, 230]), Rgb([200, 220, 250])),
    ))
    .with_position(25.0, -10.0, 80.0);

    let config = AppConfig::default();
    let objects = vec![near, far];

    let args: Vec<String> = env::args().collect();
    if let [_, flag, path] = args.as_slice() {
        if flag == "--snapshot" {
            let camera = config.camera(objects);
            let mut canvas = Canvas::new(config.canvas_width, config.canvas_height);
            render_frame(&camera, &mut canvas, config.background);
            canvas
                .save(path)
                .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
            println!("Wrote {}", path);
            return Ok(());
        }
    }

    let mut app = TerminalApp::new(objects, config)?;
    app.run()
}
