//! Composites a fake remote surface offscreen and writes the result to a PNG.
//!
//! The toy engine answers every resize with a full-frame repaint and, on each
//! pump, scrolls its plasma pattern upward while repainting the exposed
//! bottom edge, the same traffic a real browser engine produces.
//!
//! Run with: cargo run --example offscreen

use std::collections::VecDeque;
use std::fs::File;
use std::io::BufWriter;
use std::sync::{Arc, Mutex};

use webcanvas::geometry::{LogicalSize, PixelRect, PixelSize};
use webcanvas::paint::{DirtyPatch, PaintEvent, PixelBuffer};
use webcanvas::remote::{RemoteEngine, RemoteSurface};
use webcanvas::texture::{CpuBackend, BYTES_PER_PIXEL};
use webcanvas::{system, Modifiers, WebView};

const SCROLL_STEP: i32 = 4;

fn plasma_pixel(x: u32, y: u32, phase: u32) -> [u8; 4] {
    let v = ((x * 3 + phase * 7) ^ (y * 5)) as u8;
    [v, v.wrapping_mul(2), 255 - v, 255]
}

fn plasma_rows(width: u32, y0: u32, rows: u32, phase: u32) -> Vec<u8> {
    let mut bytes = Vec::with_capacity((width * rows) as usize * BYTES_PER_PIXEL);
    for y in y0..y0 + rows {
        for x in 0..width {
            bytes.extend_from_slice(&plasma_pixel(x, y, phase));
        }
    }
    bytes
}

/// Per-window engine state, shared between the engine (which animates it on
/// pump) and the surface handed to the widget (which drains it).
struct ToyWindow {
    size: PixelSize,
    phase: u32,
    queue: VecDeque<PaintEvent>,
}

impl ToyWindow {
    fn new() -> Self {
        Self {
            size: PixelSize::new(0, 0),
            phase: 0,
            queue: VecDeque::new(),
        }
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.size = PixelSize::new(width, height);
        self.phase = 0;

        if width > 1 && height > 1 {
            let frame = PixelBuffer::new(
                PixelRect::of_size(self.size),
                plasma_rows(width, 0, height, 0),
            );
            self.queue.push_back(PaintEvent::FullFrame { frame });
        }
    }

    fn animate(&mut self) {
        if self.size.width <= 1 || self.size.height as i32 <= SCROLL_STEP {
            return;
        }

        self.phase += 1;
        let exposed_top = self.size.height as i32 - SCROLL_STEP;
        let edge = DirtyPatch::exact(
            PixelRect::new(0, exposed_top, self.size.width as i32, SCROLL_STEP),
            plasma_rows(
                self.size.width,
                exposed_top as u32,
                SCROLL_STEP as u32,
                self.phase,
            ),
        );

        self.queue.push_back(PaintEvent::Scroll {
            dx: 0,
            dy: -SCROLL_STEP,
            rect: PixelRect::of_size(self.size),
            exposed: vec![edge],
        });
    }
}

struct ToySurface {
    window: Arc<Mutex<ToyWindow>>,
}

impl RemoteSurface for ToySurface {
    fn resize(&mut self, width: u32, height: u32) {
        self.window.lock().unwrap().resize(width, height);
    }

    fn navigate_to(&mut self, url: &url::Url) {
        log::info!("toy surface asked to display {url}");
    }

    fn focus(&mut self) {}
    fn unfocus(&mut self) {}
    fn set_transparent(&mut self, _enabled: bool) {}
    fn mouse_moved(&mut self, _x: f32, _y: f32) {}
    fn mouse_button(&mut self, _button: u8, _down: bool) {}
    fn key_event(&mut self, _down: bool, _key: &str, _modifiers: Modifiers) {}
    fn text_input(&mut self, _character: char) {}

    fn drain_paints(&mut self) -> Vec<PaintEvent> {
        self.window.lock().unwrap().queue.drain(..).collect()
    }
}

#[derive(Default)]
struct ToyEngine {
    windows: Vec<Arc<Mutex<ToyWindow>>>,
}

impl RemoteEngine for ToyEngine {
    fn name(&self) -> &str {
        "ToyEngine"
    }

    fn create_surface(&mut self) -> anyhow::Result<Box<dyn RemoteSurface>> {
        let window = Arc::new(Mutex::new(ToyWindow::new()));
        self.windows.push(window.clone());
        Ok(Box::new(ToySurface { window }))
    }

    fn pump(&mut self) {
        for window in &self.windows {
            window.lock().unwrap().animate();
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    system::init(Box::new(ToyEngine::default()), Arc::new(CpuBackend::new()))?;

    let mut view = WebView::new("offscreen")?;
    view.on_sized(LogicalSize::new(320.0, 240.0))?;

    for frame in 0..30 {
        system::pump()?;
        let result = view.update(1.0 / 60.0);

        if let Some(quad) = view.prepare_draw()? {
            log::debug!(
                "frame {frame}: applied {} paints, uv extent {:.3}x{:.3}",
                result.paints_applied,
                quad.uv_right,
                quad.uv_bottom
            );
        }
    }

    let texture = view.texture().expect("canvas was never allocated");
    let size = texture.size();
    let mut pixels = vec![0u8; size.area() as usize * BYTES_PER_PIXEL];
    texture.blit_to_memory(&mut pixels);

    let file = File::create("offscreen.png")?;
    let mut encoder = png::Encoder::new(BufWriter::new(file), size.width, size.height);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.write_header()?.write_image_data(&pixels)?;

    println!(
        "wrote offscreen.png ({}x{}, ready: {})",
        size.width,
        size.height,
        view.is_ready()
    );

    drop(view);
    system::shutdown()?;

    Ok(())
}
