//! The embedding widget.
//!
//! A [`WebView`] owns one remote surface and the canvas it is composited
//! into. The host drives it with three calls per frame: pump the engine
//! ([`crate::system::pump`]), [`WebView::update`] to service timers and apply
//! queued paint notifications, and [`WebView::prepare_draw`] to get the
//! textured-quad parameters for drawing. Resizes are folded in lazily: the
//! canvas follows the widget size on the next draw, optionally delayed.

use crate::canvas::Canvas;
use crate::config::{TintRect, WidgetConfig};
use crate::content::ContentLoader;
use crate::errors::CanvasError;
use crate::geometry::LogicalSize;
use crate::input::{InputForwarder, InteractionMode, KeyInput, MouseButton};
use crate::remote::RemoteSurface;
use crate::resource::ResourceLoader;
use crate::system;
use crate::texture::{Texture, TextureBackend};
use crate::tick::UpdateResult;
use std::sync::Arc;
use url::Url;
use uuid::Uuid;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WidgetId(Uuid);

impl WidgetId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Everything the host needs to draw the widget as a textured quad.
#[derive(Debug, Clone, Copy)]
pub struct DrawQuad {
    /// Quad size in widget space.
    pub size: LogicalSize,
    /// Right texture coordinate; the canvas may be larger than the displayed
    /// area, so this is usually below 1.0.
    pub uv_right: f32,
    /// Bottom texture coordinate.
    pub uv_bottom: f32,
    /// Per-corner tint, alpha already modulated.
    pub tint: TintRect,
}

pub struct WebView {
    pub id: WidgetId,
    name: String,
    config: WidgetConfig,

    logical_size: LogicalSize,
    /// Screen-space position of the widget's content area, subtracted from
    /// pointer coordinates before forwarding.
    screen_origin: (f32, f32),
    alpha: f32,

    canvas: Canvas,
    remote: Box<dyn RemoteSurface>,
    backend: Arc<dyn TextureBackend>,

    /// Counts up towards `resize_delay`; negative while idle.
    resize_timer: f32,
    /// The canvas follows the widget size on the next draw.
    resize_needed: bool,
}

impl WebView {
    /// Creates a widget on the active engine context. Fails with an
    /// invalid-request error when [`crate::system::init`] has not run.
    pub fn new(name: &str) -> Result<Self, CanvasError> {
        let remote = system::create_surface()?;
        let backend = system::texture_backend()?;
        Ok(Self::with_backends(name, remote, backend))
    }

    /// Creates a widget around explicitly supplied collaborators, bypassing
    /// the global context.
    pub fn with_backends(
        name: &str,
        mut remote: Box<dyn RemoteSurface>,
        backend: Arc<dyn TextureBackend>,
    ) -> Self {
        // engines won't ever paint unless resized once up front, and it has
        // to happen before the first navigation
        remote.resize(1, 1);

        Self {
            id: WidgetId::new(),
            name: name.to_string(),
            config: WidgetConfig::default(),
            logical_size: LogicalSize::default(),
            screen_origin: (0.0, 0.0),
            alpha: 1.0,
            canvas: Canvas::new(format!("{name}/Canvas")),
            remote,
            backend,
            resize_timer: -1.0,
            resize_needed: true,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    // --- configuration surface ---------------------------------------------

    pub fn set_interaction_mode(&mut self, mode: InteractionMode) {
        self.config.interaction_mode = mode;
    }

    pub fn interaction_mode(&self) -> InteractionMode {
        self.config.interaction_mode
    }

    /// Sets the detail ratio and resizes the canvas right away.
    pub fn set_detail_ratio(&mut self, ratio: f32) -> Result<(), CanvasError> {
        self.config.tuning.detail_ratio = ratio;
        self.resize_canvas()?;
        Ok(())
    }

    pub fn detail_ratio(&self) -> f32 {
        self.config.tuning.detail_ratio
    }

    pub fn set_resize_delay(&mut self, seconds: f32) {
        self.config.resize_delay = seconds;
    }

    pub fn resize_delay(&self) -> f32 {
        self.config.resize_delay
    }

    pub fn set_canvas_reserve(&mut self, ratio: f32) {
        self.config.tuning.reserve_ratio = ratio;
        // picked up on the next draw
        self.resize_needed = true;
    }

    pub fn canvas_reserve(&self) -> f32 {
        self.config.tuning.reserve_ratio
    }

    pub fn set_canvas_max_overhead(&mut self, ratio: f32) {
        self.config.tuning.max_overhead = ratio;
        self.resize_needed = true;
    }

    pub fn canvas_max_overhead(&self) -> f32 {
        self.config.tuning.max_overhead
    }

    pub fn set_tint(&mut self, tint: TintRect) {
        self.config.tint = tint;
    }

    pub fn tint(&self) -> TintRect {
        self.config.tint
    }

    pub fn set_alpha(&mut self, alpha: f32) {
        self.alpha = alpha;
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn set_transparent(&mut self, enabled: bool) {
        self.remote.set_transparent(enabled);
    }

    // --- content -----------------------------------------------------------

    pub fn navigate_to(&mut self, url: &Url) {
        self.remote.navigate_to(url);
    }

    /// Packages `bytes` with the given loader and navigates to the result.
    pub fn load_content(
        &mut self,
        loader: &dyn ContentLoader,
        bytes: &[u8],
        mime_hint: Option<&str>,
    ) -> Result<(), CanvasError> {
        let uri = loader.encode_as_displayable_uri(bytes, mime_hint)?;
        self.remote.navigate_to(&uri);
        Ok(())
    }

    /// Loads a file through the host's resource loader and displays it. With
    /// no `mime_hint` the loader guesses from the filename; an extension it
    /// does not recognise is an invalid request.
    pub fn load_content_from_file(
        &mut self,
        loader: &dyn ContentLoader,
        resources: &dyn ResourceLoader,
        filename: &str,
        group: &str,
        mime_hint: Option<&str>,
    ) -> Result<(), CanvasError> {
        let hint = match mime_hint {
            Some(hint) => Some(hint.to_string()),
            None => loader.guess_mime_hint(filename)?,
        };
        let bytes = resources.load(filename, group)?;
        self.load_content(loader, &bytes, hint.as_deref())
    }

    // --- host events -------------------------------------------------------

    /// The widget was resized by the host layout.
    pub fn on_sized(&mut self, size: LogicalSize) -> Result<(), CanvasError> {
        self.logical_size = size;

        if self.config.resize_delay > 0.0 {
            self.resize_timer = 0.0;
        } else if self.config.resize_delay == 0.0 {
            self.resize_canvas()?;
        }
        // negative delay: canvas sizing doesn't follow widget resizes

        Ok(())
    }

    pub fn set_screen_origin(&mut self, x: f32, y: f32) {
        self.screen_origin = (x, y);
    }

    /// The host gave or took input focus.
    pub fn set_focused(&mut self, focused: bool) {
        if focused {
            self.remote.focus();
        } else {
            self.remote.unfocus();
        }
    }

    pub fn on_mouse_move(&mut self, x: f32, y: f32) {
        let forwarder = self.forwarder();
        forwarder.mouse_moved(self.remote.as_mut(), x, y);
    }

    pub fn on_mouse_button(&mut self, button: MouseButton, down: bool) {
        let forwarder = self.forwarder();
        forwarder.mouse_button(self.remote.as_mut(), button, down);
    }

    pub fn on_key_event(&mut self, input: &KeyInput) {
        let forwarder = self.forwarder();
        forwarder.key_event(self.remote.as_mut(), input);
    }

    pub fn on_text_input(&mut self, character: char) {
        let forwarder = self.forwarder();
        forwarder.text_input(self.remote.as_mut(), character);
    }

    fn forwarder(&self) -> InputForwarder {
        InputForwarder {
            mode: self.config.interaction_mode,
            detail_ratio: self.config.tuning.detail_ratio,
            origin: self.screen_origin,
        }
    }

    // --- frame loop --------------------------------------------------------

    /// Services the resize timer and applies the paint notifications queued
    /// on the surface, in delivery order. Call after the engine pump.
    pub fn update(&mut self, elapsed: f32) -> UpdateResult {
        let mut result = UpdateResult::default();

        if self.config.resize_delay > 0.0 && self.resize_timer >= 0.0 {
            self.resize_timer += elapsed;

            if self.resize_timer >= self.config.resize_delay {
                self.resize_timer = -1.0;
                self.resize_needed = true;
            }
        }

        let expected =
            Canvas::expected_pixel_size(self.logical_size, &self.config.tuning);

        for event in self.remote.drain_paints() {
            if !self.canvas.has_texture() {
                // first paint can beat the first draw; size the canvas now
                match self.resize_canvas() {
                    Ok(resized) => result.resized |= resized,
                    Err(e) => {
                        log::error!("widget {}: canvas allocation failed: {e}", self.name);
                        break;
                    }
                }
            }

            if self.canvas.apply_paint(&event, expected) {
                result.paints_applied += 1;
                result.needs_redraw = true;
            }
        }

        result
    }

    /// Gets the quad parameters for this frame, sizing the canvas first when
    /// a resize is pending. Returns `None` when the widget has no area.
    pub fn prepare_draw(&mut self) -> Result<Option<DrawQuad>, CanvasError> {
        if self.resize_needed || !self.canvas.has_texture() {
            self.resize_canvas()?;
        }

        let altered = self
            .logical_size
            .scaled(self.config.tuning.detail_ratio);
        if altered.width * altered.height == 0.0 {
            return Ok(None);
        }

        let Some(texture) = self.canvas.texture() else {
            return Ok(None);
        };
        let texture_size = texture.size();

        Ok(Some(DrawQuad {
            size: self.logical_size,
            uv_right: altered.width / texture_size.width as f32,
            uv_bottom: altered.height / texture_size.height as f32,
            tint: self.config.tint.modulate_alpha(self.alpha),
        }))
    }

    /// Immediately sizes the canvas to the widget and notifies the remote
    /// surface.
    fn resize_canvas(&mut self) -> Result<bool, CanvasError> {
        let resized = self.canvas.ensure(
            self.backend.as_ref(),
            self.remote.as_mut(),
            self.logical_size,
            &self.config.tuning,
        )?;

        self.resize_timer = -1.0;
        self.resize_needed = false;

        Ok(resized)
    }

    /// The backing texture, for hosts that bind it directly.
    pub fn texture(&self) -> Option<&dyn Texture> {
        self.canvas.texture()
    }

    /// Whether the canvas has received its first exactly-sized full frame and
    /// partial updates are being applied.
    pub fn is_ready(&self) -> bool {
        self.canvas.is_ready()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{HtmlContent, ImageContent};
    use crate::geometry::{PixelRect, PixelSize};
    use crate::paint::{DirtyPatch, PaintEvent, PixelBuffer};
    use crate::remote::mock::{MockSurface, SurfaceCall};
    use crate::resource::FsResourceLoader;
    use crate::texture::{CpuBackend, BYTES_PER_PIXEL};
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    type Calls = Rc<RefCell<Vec<SurfaceCall>>>;
    type Queue = Rc<RefCell<VecDeque<PaintEvent>>>;

    fn widget(name: &str) -> (WebView, Calls, Queue, Arc<CpuBackend>) {
        let surface = MockSurface::new();
        let (calls, queue) = surface.handles();
        let backend = Arc::new(CpuBackend::new());
        let view = WebView::with_backends(name, Box::new(surface), backend.clone());
        (view, calls, queue, backend)
    }

    fn coordinate_frame(size: PixelSize) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(size.area() as usize * BYTES_PER_PIXEL);
        for y in 0..size.height {
            for x in 0..size.width {
                bytes.extend_from_slice(&[x as u8, y as u8, 0, 255]);
            }
        }
        bytes
    }

    fn full_frame(size: PixelSize) -> PaintEvent {
        PaintEvent::FullFrame {
            frame: PixelBuffer::new(PixelRect::of_size(size), coordinate_frame(size)),
        }
    }

    fn texture_bytes(view: &WebView) -> Vec<u8> {
        let texture = view.texture().unwrap();
        let size = texture.size();
        let mut out = vec![0; size.area() as usize * BYTES_PER_PIXEL];
        texture.blit_to_memory(&mut out);
        out
    }

    #[test]
    fn canvas_is_sized_lazily_on_first_draw() {
        let (mut view, calls, _, backend) = widget("w");
        view.on_sized(LogicalSize::new(100.0, 80.0)).unwrap();
        assert_eq!(backend.created(), 0);

        let quad = view.prepare_draw().unwrap().unwrap();
        assert_eq!(backend.created(), 1);
        assert_eq!(view.texture().unwrap().size(), PixelSize::new(100, 80));
        assert_eq!(quad.uv_right, 1.0);
        assert_eq!(quad.uv_bottom, 1.0);

        // construction pokes the surface awake, sizing renegotiates
        assert_eq!(
            &calls.borrow()[..],
            &[
                SurfaceCall::Resize(1, 1),
                SurfaceCall::Resize(1, 1),
                SurfaceCall::Resize(100, 80)
            ]
        );
    }

    #[test]
    fn zero_area_widget_draws_nothing() {
        let (mut view, _, _, backend) = widget("w");
        view.on_sized(LogicalSize::new(0.0, 50.0)).unwrap();

        assert!(view.prepare_draw().unwrap().is_none());
        assert_eq!(backend.created(), 0);
    }

    #[test]
    fn reserve_shows_up_in_quad_uvs() {
        let (mut view, _, _, _) = widget("w");
        view.set_canvas_reserve(0.5);
        view.set_canvas_max_overhead(0.6);
        view.on_sized(LogicalSize::new(100.0, 100.0)).unwrap();

        let quad = view.prepare_draw().unwrap().unwrap();
        assert_eq!(view.texture().unwrap().size(), PixelSize::new(150, 150));
        assert!((quad.uv_right - 100.0 / 150.0).abs() < 1e-6);
        assert!((quad.uv_bottom - 100.0 / 150.0).abs() < 1e-6);
    }

    #[test]
    fn resize_delay_defers_canvas_sizing() {
        let (mut view, _, _, _) = widget("w");
        view.on_sized(LogicalSize::new(100.0, 100.0)).unwrap();
        view.prepare_draw().unwrap();
        assert_eq!(view.texture().unwrap().size(), PixelSize::new(100, 100));

        view.set_resize_delay(0.5);
        view.on_sized(LogicalSize::new(150.0, 100.0)).unwrap();

        view.update(0.3);
        view.prepare_draw().unwrap();
        assert_eq!(view.texture().unwrap().size(), PixelSize::new(100, 100));

        view.update(0.3);
        view.prepare_draw().unwrap();
        assert_eq!(view.texture().unwrap().size(), PixelSize::new(150, 100));
    }

    #[test]
    fn zero_delay_resizes_immediately() {
        let (mut view, _, _, backend) = widget("w");
        view.set_resize_delay(0.0);
        view.on_sized(LogicalSize::new(64.0, 64.0)).unwrap();

        assert_eq!(backend.created(), 1);
        assert_eq!(view.texture().unwrap().size(), PixelSize::new(64, 64));
    }

    #[test]
    fn negative_delay_never_follows_widget_resizes() {
        let (mut view, _, _, backend) = widget("w");
        view.on_sized(LogicalSize::new(100.0, 100.0)).unwrap();
        view.prepare_draw().unwrap();

        view.on_sized(LogicalSize::new(300.0, 300.0)).unwrap();
        view.update(10.0);
        view.prepare_draw().unwrap();

        assert_eq!(view.texture().unwrap().size(), PixelSize::new(100, 100));
        assert_eq!(backend.created(), 1);
    }

    #[test]
    fn paint_before_first_draw_sizes_the_canvas() {
        let (mut view, _, queue, backend) = widget("w");
        view.on_sized(LogicalSize::new(10.0, 10.0)).unwrap();

        queue
            .borrow_mut()
            .push_back(full_frame(PixelSize::new(10, 10)));
        let result = view.update(0.016);

        assert_eq!(backend.created(), 1);
        assert!(result.resized);
        assert_eq!(result.paints_applied, 1);
        assert!(view.is_ready());
    }

    #[test]
    fn update_applies_notifications_in_delivery_order() {
        let (mut view, _, queue, _) = widget("w");
        view.on_sized(LogicalSize::new(10.0, 10.0)).unwrap();
        view.prepare_draw().unwrap();

        let size = PixelSize::new(10, 10);
        queue.borrow_mut().push_back(full_frame(size));
        queue.borrow_mut().push_back(PaintEvent::Dirty {
            patches: vec![DirtyPatch::exact(
                PixelRect::new(2, 2, 3, 3),
                vec![0xEE; 3 * 3 * BYTES_PER_PIXEL],
            )],
        });

        let result = view.update(0.016);
        assert_eq!(result.paints_applied, 2);
        assert!(result.needs_redraw);

        let out = texture_bytes(&view);
        let patched = ((2 * 10) + 2) * BYTES_PER_PIXEL;
        assert_eq!(out[patched], 0xEE);
        assert_eq!(&out[..4], &[0, 0, 0, 255]);
    }

    #[test]
    fn undersized_frames_are_dropped_until_the_exact_one_arrives() {
        let (mut view, _, queue, _) = widget("w");
        view.on_sized(LogicalSize::new(100.0, 100.0)).unwrap();
        view.prepare_draw().unwrap();

        queue
            .borrow_mut()
            .push_back(full_frame(PixelSize::new(50, 50)));
        let result = view.update(0.016);
        assert_eq!(result.paints_applied, 0);
        assert!(!result.needs_redraw);
        assert!(!view.is_ready());

        queue
            .borrow_mut()
            .push_back(full_frame(PixelSize::new(100, 100)));
        let result = view.update(0.016);
        assert_eq!(result.paints_applied, 1);
        assert!(view.is_ready());
    }

    #[test]
    fn scroll_with_edge_repaint_composites_correctly() {
        let (mut view, _, queue, _) = widget("w");
        view.on_sized(LogicalSize::new(100.0, 100.0)).unwrap();
        view.prepare_draw().unwrap();

        let size = PixelSize::new(100, 100);
        queue.borrow_mut().push_back(full_frame(size));

        // content slides left by 5, the right edge scrolls into view
        let mut edge = Vec::new();
        for y in 0..100u32 {
            for x in 95..100u32 {
                edge.extend_from_slice(&[0xC0 + (x - 95) as u8, y as u8, 1, 255]);
            }
        }
        queue.borrow_mut().push_back(PaintEvent::Scroll {
            dx: -5,
            dy: 0,
            rect: PixelRect::of_size(size),
            exposed: vec![DirtyPatch::exact(PixelRect::new(95, 0, 5, 100), edge)],
        });

        let result = view.update(0.016);
        assert_eq!(result.paints_applied, 2);

        let out = texture_bytes(&view);
        let at = |x: u32, y: u32| ((y * 100 + x) as usize) * BYTES_PER_PIXEL;

        // shifted old content
        for y in (0..100).step_by(13) {
            for x in (0..95).step_by(7) {
                assert_eq!(
                    &out[at(x, y)..at(x, y) + 4],
                    &[(x + 5) as u8, y as u8, 0, 255],
                    "at ({x}, {y})"
                );
            }
        }
        // fresh edge pixels
        for y in (0..100).step_by(13) {
            assert_eq!(&out[at(97, y)..at(97, y) + 4], &[0xC2, y as u8, 1, 255]);
        }
    }

    #[test]
    fn growing_the_widget_renegotiates_readiness() {
        let (mut view, calls, queue, _) = widget("w");
        view.on_sized(LogicalSize::new(50.0, 50.0)).unwrap();
        view.prepare_draw().unwrap();

        queue
            .borrow_mut()
            .push_back(full_frame(PixelSize::new(50, 50)));
        view.update(0.016);
        assert!(view.is_ready());

        view.set_resize_delay(0.0);
        view.on_sized(LogicalSize::new(80.0, 50.0)).unwrap();
        assert!(!view.is_ready());

        // the surface was walked through the 1x1 invalidation again
        let calls = calls.borrow();
        let tail = &calls[calls.len() - 2..];
        assert_eq!(
            tail,
            &[SurfaceCall::Resize(1, 1), SurfaceCall::Resize(80, 50)]
        );
    }

    #[test]
    fn pointer_events_are_rescaled_and_gated() {
        let (mut view, calls, _, _) = widget("w");
        view.set_screen_origin(10.0, 20.0);
        view.on_sized(LogicalSize::new(100.0, 100.0)).unwrap();

        // visual-only: nothing forwarded
        view.on_mouse_move(15.0, 30.0);
        assert!(!calls
            .borrow()
            .iter()
            .any(|c| matches!(c, SurfaceCall::MouseMoved(..))));

        view.set_interaction_mode(InteractionMode::Full);
        view.set_detail_ratio(2.0).unwrap();
        view.on_mouse_move(15.0, 30.0);
        view.on_mouse_button(MouseButton::Left, true);

        let calls = calls.borrow();
        assert!(calls.contains(&SurfaceCall::MouseMoved(10.0, 20.0)));
        assert!(calls.contains(&SurfaceCall::MouseButton(0, true)));
    }

    #[test]
    fn focus_and_transparency_are_forwarded() {
        let (mut view, calls, _, _) = widget("w");
        view.set_focused(true);
        view.set_focused(false);
        view.set_transparent(true);

        let calls = calls.borrow();
        assert!(calls.contains(&SurfaceCall::Focus));
        assert!(calls.contains(&SurfaceCall::Unfocus));
        assert!(calls.contains(&SurfaceCall::Transparent(true)));
    }

    #[test]
    fn html_content_navigates_to_a_data_uri() {
        let (mut view, calls, _, _) = widget("w");
        view.load_content(&HtmlContent, b"<p>x</p>", None).unwrap();

        let calls = calls.borrow();
        let Some(SurfaceCall::Navigate(uri)) = calls.last() else {
            panic!("expected a navigation, got {:?}", calls.last());
        };
        assert!(uri.starts_with("data:text/html;charset=utf8;base64,"));
    }

    #[test]
    fn image_file_loading_guesses_the_subtype() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("pixel.png"), [1, 2, 3, 4]).unwrap();
        let resources = FsResourceLoader::new(dir.path());

        let (mut view, calls, _, _) = widget("w");
        view.load_content_from_file(&ImageContent, &resources, "pixel.png", "", None)
            .unwrap();

        let calls = calls.borrow();
        let Some(SurfaceCall::Navigate(uri)) = calls.last() else {
            panic!("expected a navigation");
        };
        assert!(uri.starts_with("data:image/png;base64,"));

        // unknown extension without an explicit hint is refused
        drop(calls);
        std::fs::write(dir.path().join("what.xyz"), [0]).unwrap();
        assert!(matches!(
            view.load_content_from_file(&ImageContent, &resources, "what.xyz", "", None),
            Err(CanvasError::InvalidRequest(_))
        ));
    }
}
