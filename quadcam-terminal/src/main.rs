/// quadcam terminal demo - textured cube (or OBJ mesh) in the terminal
///
/// Controls:
///   - WASD / R F: Move the camera
///   - Arrow Keys, E / Z: Turn the camera
///   - + / -: Change focal length
///   - Q/ESC: Quit
use anyhow::{Context, Result};
use clap::Parser;
use image::{Rgb, Rgba};
use quadcam_core::{obj, Canvas, Mesh, Object, Texture};
use quadcam_terminal::{parse_focal_length, parse_hex_color, render_frame, AppConfig, TerminalApp};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "quadcam-terminal", about = "Render textured quad meshes in the terminal")]
struct Cli {
    /// OBJ file with quad faces to render instead of the cube
    #[arg(long)]
    obj: Option<PathBuf>,

    /// Image used to texture every face
    #[arg(long)]
    texture: Option<PathBuf>,

    /// Cube edge length, or the scale applied to OBJ vertices
    #[arg(long, default_value_t = 60.0)]
    size: f32,

    #[arg(
        long,
        default_value_t = quadcam_core::projection::DEFAULT_FOCAL_LENGTH,
        value_parser = parse_focal_length
    )]
    focal_length: f32,

    /// Offscreen canvas width in pixels
    #[arg(long, default_value_t = 240)]
    width: u32,

    /// Offscreen canvas height in pixels
    #[arg(long, default_value_t = 240)]
    height: u32,

    #[arg(long, default_value = "101010", value_parser = parse_hex_color)]
    background: Rgba<u8>,

    #[arg(long, default_value_t = 30)]
    fps: u32,

    /// Keep the scene still
    #[arg(long)]
    no_spin: bool,

    /// Render a single frame to this PNG and exit
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Enable debug logging (written to stderr)
    #[arg(short, long)]
    verbose: bool,
}

/// One checkerboard per cube face, each built fresh
fn face_textures() -> [Texture; 6] {
    const TINTS: [Rgb<u8>; 6] = [
        Rgb([220, 60, 60]),
        Rgb([60, 200, 90]),
        Rgb([70, 110, 230]),
        Rgb([230, 200, 60]),
        Rgb([60, 200, 210]),
        Rgb([200, 80, 210]),
    ];
    TINTS.map(|tint| Texture::checker(64, 64, 16, tint, Rgb([235, 235, 235])))
}

fn build_scene(cli: &Cli) -> Result<Vec<Object>> {
    let texture = match &cli.texture {
        Some(path) => Some(
            Texture::open(path).with_context(|| format!("loading texture {}", path.display()))?,
        ),
        None => None,
    };

    let mesh = match (&cli.obj, texture) {
        (Some(path), texture) => obj::load_obj(path, cli.size, &texture.unwrap_or_default())
            .with_context(|| format!("loading mesh {}", path.display()))?,
        (None, Some(texture)) => Mesh::cube(cli.size, &texture),
        (None, None) => Mesh::cube_with_textures(cli.size, face_textures()),
    };
    tracing::info!(faces = mesh.face_count(), "scene built");

    Ok(vec![Object::new(mesh)])
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_writer(std::io::stderr)
        .init();

    let objects = build_scene(&cli)?;
    let config = AppConfig {
        canvas_width: cli.width.max(1),
        canvas_height: cli.height.max(1),
        focal_length: cli.focal_length,
        background: cli.background,
        target_fps: cli.fps,
        spin: !cli.no_spin,
    };

    if let Some(path) = &cli.snapshot {
        let camera = config.camera(objects);
        let mut canvas = Canvas::new(config.canvas_width, config.canvas_height);
        render_frame(&camera, &mut canvas, config.background);
        canvas
            .save(path)
            .with_context(|| format!("writing snapshot {}", path.display()))?;
        tracing::info!("snapshot written to {}", path.display());
        return Ok(());
    }

    let mut app = TerminalApp::new(objects, config)?;
    app.run()?;

    Ok(())
}
