//! Backing-texture lifecycle and the sizing policy driving it.
//!
//! A [`Canvas`] owns the texture the remote surface is composited into, the
//! scratch buffer the compositor stages through, and the ready flag guarding
//! partial updates. The sizing policy trades reallocation cost against memory:
//! a texture is kept while it still fits the widget and is not too far past it,
//! reallocated (with reserve) otherwise.

use crate::compositor::PaintCompositor;
use crate::config::CanvasTuning;
use crate::errors::CanvasError;
use crate::geometry::{LogicalSize, PixelRect, PixelSize};
use crate::paint::PaintEvent;
use crate::remote::RemoteSurface;
use crate::texture::{Texture, TextureBackend, BYTES_PER_PIXEL};

pub struct Canvas {
    texture: Option<Box<dyn Texture>>,
    /// Staging buffer for the compositor, always
    /// `texture_width * (texture_height + 1) * 4` bytes. The spare row is the
    /// slack the scroll copy needs to avoid aliasing itself.
    scratch: Vec<u8>,
    /// False until the first exactly-sized full frame lands. While false,
    /// partial updates are dropped: the remote surface may still be painting
    /// at a stale size.
    ready: bool,
    texture_name: String,
}

impl Canvas {
    pub fn new(texture_name: impl Into<String>) -> Self {
        Self {
            texture: None,
            scratch: vec![0; 2 * BYTES_PER_PIXEL],
            ready: false,
            texture_name: texture_name.into(),
        }
    }

    pub fn texture(&self) -> Option<&dyn Texture> {
        self.texture.as_deref()
    }

    pub fn has_texture(&self) -> bool {
        self.texture.is_some()
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// The pixel size the remote surface is expected to render at for the
    /// given widget size.
    pub fn expected_pixel_size(logical: LogicalSize, tuning: &CanvasTuning) -> PixelSize {
        logical.scaled(tuning.detail_ratio).to_pixel_floor()
    }

    /// Makes the canvas fit `logical` and tells the remote surface its new
    /// pixel size. Returns whether the texture was reallocated.
    ///
    /// A zero-area target short-circuits: there is no geometry to draw, so
    /// neither the texture machinery nor the remote surface is touched.
    pub fn ensure(
        &mut self,
        backend: &dyn TextureBackend,
        remote: &mut dyn RemoteSurface,
        logical: LogicalSize,
        tuning: &CanvasTuning,
    ) -> Result<bool, CanvasError> {
        let needed = Self::expected_pixel_size(logical, tuning);
        if needed.area() == 0 {
            return Ok(false);
        }

        if let Some(texture) = &self.texture {
            let size = texture.size();

            if size.width < needed.width || size.height < needed.height {
                // the canvas won't fit anymore
                log::debug!(
                    "canvas {}: {}x{} too small for {}x{}, reallocating",
                    self.texture_name,
                    size.width,
                    size.height,
                    needed.width,
                    needed.height
                );
                self.texture = None;
            } else if size.width as f32 > needed.width as f32 * (1.0 + tuning.max_overhead)
                || size.height as f32 > needed.height as f32 * (1.0 + tuning.max_overhead)
            {
                // too big, the allowed overhead has been surpassed
                log::debug!(
                    "canvas {}: {}x{} exceeds overhead for {}x{}, shrinking",
                    self.texture_name,
                    size.width,
                    size.height,
                    needed.width,
                    needed.height
                );
                self.texture = None;
            }
        }

        let mut reallocated = false;
        if self.texture.is_none() {
            let alloc = PixelSize::new(
                (needed.width as f32 * (1.0 + tuning.reserve_ratio)).floor() as u32,
                (needed.height as f32 * (1.0 + tuning.reserve_ratio)).floor() as u32,
            );

            let texture = backend.create_texture(&self.texture_name, alloc)?;
            self.texture = Some(texture);

            // scratch follows the texture; old contents are garbage now and
            // are never read before being overwritten
            self.scratch =
                vec![0; alloc.width as usize * (alloc.height as usize + 1) * BYTES_PER_PIXEL];

            // the old pixels are gone with the old texture, so partial
            // updates are meaningless until a fresh full frame arrives
            self.ready = false;
            reallocated = true;
        }

        // 1x1 first: engines skip the repaint entirely when asked for a size
        // they have already painted once, and we need a full frame
        remote.resize(1, 1);
        remote.resize(needed.width, needed.height);

        Ok(reallocated)
    }

    /// Applies one paint notification. Returns whether the texture changed.
    ///
    /// While the canvas is not ready only a full frame matching `expected`
    /// exactly is let through (and flips the canvas to ready); everything else
    /// is dropped without touching any pixels. That is the expected traffic
    /// during size negotiation, not an error.
    pub fn apply_paint(&mut self, event: &PaintEvent, expected: PixelSize) -> bool {
        let Some(texture) = self.texture.as_deref_mut() else {
            return false;
        };

        if !self.ready {
            return match event {
                PaintEvent::FullFrame { frame }
                    if frame.rect == PixelRect::of_size(expected) =>
                {
                    PaintCompositor::new(texture, &mut self.scratch).full_frame(frame);
                    self.ready = true;
                    true
                }
                _ => {
                    log::debug!(
                        "canvas {}: dropping paint notification, waiting for a {}x{} full frame",
                        self.texture_name,
                        expected.width,
                        expected.height
                    );
                    false
                }
            };
        }

        let mut compositor = PaintCompositor::new(texture, &mut self.scratch);
        match event {
            PaintEvent::FullFrame { frame } => {
                compositor.full_frame(frame);
            }
            PaintEvent::Scroll { dx, dy, rect, exposed } => {
                compositor.scroll(*dx, *dy, *rect);
                for patch in exposed {
                    compositor.dirty_patch(patch);
                }
            }
            PaintEvent::Dirty { patches } => {
                for patch in patches {
                    compositor.dirty_patch(patch);
                }
            }
        }

        true
    }
}
