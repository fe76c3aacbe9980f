//! Paint notifications produced by a remote surface.
//!
//! A remote rendering engine reports pixel changes in three shapes: a full
//! frame, a scrolled region (old pixels that moved plus freshly exposed
//! patches), and a batch of independent dirty patches. All rectangles are in
//! the remote surface's pixel coordinate space, which matches the backing
//! texture's pixel grid.

use crate::geometry::PixelRect;
use crate::texture::BYTES_PER_PIXEL;

/// Raw pixels covering a rectangle, packed rows with stride `rect.width`.
#[derive(Clone)]
pub struct PixelBuffer {
    pub rect: PixelRect,
    pub bytes: Vec<u8>,
}

impl PixelBuffer {
    pub fn new(rect: PixelRect, bytes: Vec<u8>) -> Self {
        assert!(
            bytes.len() >= (rect.width.max(0) as usize) * (rect.height.max(0) as usize) * BYTES_PER_PIXEL,
            "pixel buffer too small for its rectangle"
        );
        Self { rect, bytes }
    }
}

impl std::fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("rect", &self.rect)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// A repaint of one rectangle.
///
/// `rect` is where the pixels go. `src` is the buffer they come from; its
/// origin may be offset from `rect` and its stride is `src.rect.width`, so the
/// patch must be row-copied out of it rather than blitted directly.
#[derive(Clone, Debug)]
pub struct DirtyPatch {
    pub rect: PixelRect,
    pub src: PixelBuffer,
}

impl DirtyPatch {
    /// A patch whose source buffer covers exactly `rect`.
    pub fn exact(rect: PixelRect, bytes: Vec<u8>) -> Self {
        Self {
            rect,
            src: PixelBuffer::new(rect, bytes),
        }
    }
}

/// One paint notification, applied in delivery order.
#[derive(Clone, Debug)]
pub enum PaintEvent {
    /// The whole surface (or, once the canvas is ready, any sub-rectangle
    /// the engine chose to repaint wholesale).
    FullFrame { frame: PixelBuffer },

    /// Pixels inside `rect` moved by `(dx, dy)`; `exposed` repaints the edge
    /// that scrolled into view.
    Scroll {
        dx: i32,
        dy: i32,
        rect: PixelRect,
        exposed: Vec<DirtyPatch>,
    },

    /// Independent repaints. The producer guarantees the patches do not
    /// overlap; order between them carries no meaning.
    Dirty { patches: Vec<DirtyPatch> },
}
