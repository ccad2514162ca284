/// Terminal front end: frame loop, input and presentation for a quadcam scene
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self},
};
use image::Rgba;
use nalgebra::Vector3;
use quadcam_core::{Camera, Canvas, CameraConfig, Object, Surface};
use std::io::{self, stdout, Write};
use std::time::{Duration, Instant};

pub mod renderer;

pub use renderer::AsciiRenderer;

/// Scroll distance per key press, in world units
const MOVE_STEP: f32 = 5.0;
/// Camera rotation per key press, in radians
const TURN_STEP: f32 = 0.05;
/// Focal length change per key press
const ZOOM_STEP: f32 = 5.0;
const MIN_FOCAL_LENGTH: f32 = 5.0;

/// Front-end settings
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub focal_length: f32,
    pub background: Rgba<u8>,
    pub target_fps: u32,
    /// Spin the first object every frame
    pub spin: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            canvas_width: 240,
            canvas_height: 240,
            focal_length: quadcam_core::projection::DEFAULT_FOCAL_LENGTH,
            background: Rgba([16, 16, 16, 255]),
            target_fps: 30,
            spin: true,
        }
    }
}

impl AppConfig {
    pub fn camera(&self, objects: Vec<Object>) -> Camera {
        let lens = CameraConfig {
            focal_length: self.focal_length,
            ..CameraConfig::centered(self.canvas_width, self.canvas_height)
        };
        Camera::with_config(objects, lens)
    }
}

/// What a key press asks the app to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

/// Apply one key press to the camera.
pub fn apply_key(camera: &mut Camera, code: KeyCode) -> Control {
    match code {
        KeyCode::Char('q') | KeyCode::Esc => return Control::Quit,
        KeyCode::Char('w') => camera.scroll += Vector3::new(0.0, 0.0, MOVE_STEP),
        KeyCode::Char('s') => camera.scroll -= Vector3::new(0.0, 0.0, MOVE_STEP),
        KeyCode::Char('a') => camera.scroll -= Vector3::new(MOVE_STEP, 0.0, 0.0),
        KeyCode::Char('d') => camera.scroll += Vector3::new(MOVE_STEP, 0.0, 0.0),
        KeyCode::Char('r') => camera.scroll -= Vector3::new(0.0, MOVE_STEP, 0.0),
        KeyCode::Char('f') => camera.scroll += Vector3::new(0.0, MOVE_STEP, 0.0),
        KeyCode::Up => camera.rotation.rotate(TURN_STEP, 0.0, 0.0),
        KeyCode::Down => camera.rotation.rotate(-TURN_STEP, 0.0, 0.0),
        KeyCode::Left => camera.rotation.rotate(0.0, -TURN_STEP, 0.0),
        KeyCode::Right => camera.rotation.rotate(0.0, TURN_STEP, 0.0),
        KeyCode::Char('e') => camera.rotation.rotate(0.0, 0.0, TURN_STEP),
        KeyCode::Char('z') => camera.rotation.rotate(0.0, 0.0, -TURN_STEP),
        KeyCode::Char('+') | KeyCode::Char('=') => camera.focal_length += ZOOM_STEP,
        KeyCode::Char('-') => {
            camera.focal_length = (camera.focal_length - ZOOM_STEP).max(MIN_FOCAL_LENGTH)
        }
        _ => {}
    }
    Control::Continue
}

/// Fill the background and draw one camera frame.
pub fn render_frame(camera: &Camera, canvas: &mut Canvas, background: Rgba<u8>) {
    canvas.fill(background);
    camera.render(canvas);
}

/// Main application struct for terminal rendering
pub struct TerminalApp {
    camera: Camera,
    canvas: Canvas,
    config: AppConfig,
    renderer: AsciiRenderer,
    running: bool,
    last_frame: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    pub fn new(objects: Vec<Object>, config: AppConfig) -> io::Result<Self> {
        let (width, height) = terminal::size()?;

        Ok(Self {
            camera: config.camera(objects),
            canvas: Canvas::new(config.canvas_width, config.canvas_height),
            renderer: AsciiRenderer::new(width as usize, height.saturating_sub(1) as usize),
            config,
            running: true,
            last_frame: Instant::now(),
            frame_count: 0,
            fps: 0.0,
        })
    }

    pub fn run(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, cursor::Hide)?;

        let result = self.main_loop();

        // Cleanup
        terminal::disable_raw_mode()?;
        execute!(stdout(), terminal::LeaveAlternateScreen, cursor::Show)?;

        result
    }

    fn main_loop(&mut self) -> io::Result<()> {
        let target_frame_time = Duration::from_millis(1000 / self.config.target_fps.max(1) as u64);
        tracing::info!(objects = self.camera.objects.len(), "entering frame loop");

        while self.running {
            let frame_start = Instant::now();

            while event::poll(Duration::from_millis(0))? {
                self.handle_event(event::read()?);
            }

            self.update();
            self.render()?;

            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < target_frame_time {
                std::thread::sleep(target_frame_time - elapsed);
            }

            let now = Instant::now();
            if (now - self.last_frame).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_frame).as_secs_f32();
                self.frame_count = 0;
                self.last_frame = now;
            }
        }

        Ok(())
    }

    fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(KeyEvent { code, kind, .. }) if kind != KeyEventKind::Release => {
                if apply_key(&mut self.camera, code) == Control::Quit {
                    self.running = false;
                }
            }
            Event::Resize(width, height) => {
                self.renderer
                    .resize(width as usize, height.saturating_sub(1) as usize);
            }
            _ => {}
        }
    }

    fn update(&mut self) {
        if !self.config.spin {
            return;
        }
        if let Some(object) = self.camera.objects.first_mut() {
            object.rotation.rotate(0.01, 0.015, 0.0);
        }
    }

    fn render(&mut self) -> io::Result<()> {
        render_frame(&self.camera, &mut self.canvas, self.config.background);
        self.renderer.rasterize(&self.canvas);

        let mut stdout = stdout();
        queue!(stdout, cursor::MoveTo(0, 1))?;
        self.renderer.draw(&mut stdout)?;

        let s = self.camera.scroll;
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            terminal::Clear(terminal::ClearType::CurrentLine),
            SetForegroundColor(Color::Yellow),
            Print(format!(
                "quadcam | FPS: {:.1} | scroll ({:.0}, {:.0}, {:.0}) f={:.0} | WASD/RF=Move Arrows/EZ=Turn +/-=Zoom Q=Quit",
                self.fps, s.x, s.y, s.z, self.camera.focal_length
            )),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }
}

/// Parse a focal length, rejecting anything below the zoom-out limit
pub fn parse_focal_length(s: &str) -> Result<f32, String> {
    let value: f32 = s.parse().map_err(|e| format!("invalid focal length {s:?}: {e}"))?;
    if !value.is_finite() || value < MIN_FOCAL_LENGTH {
        return Err(format!("focal length must be at least {MIN_FOCAL_LENGTH}, got {s}"));
    }
    Ok(value)
}

/// Parse `rrggbb` (optionally `#`-prefixed) into an opaque color
pub fn parse_hex_color(s: &str) -> Result<Rgba<u8>, String> {
    let hex = s.trim_start_matches('#');
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(format!("expected a color like 1a2b3c, got {s:?}"));
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|e| e.to_string());
    Ok(Rgba([channel(0)?, channel(2)?, channel(4)?, 255]))
}
