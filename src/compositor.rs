//! Paint application onto the backing texture.
//!
//! A [`PaintCompositor`] borrows the texture and the canvas scratch buffer for
//! the duration of one notification. Full frames blit straight through; dirty
//! patches are row-copied out of their source buffer first (the source origin
//! and stride rarely match the patch); scrolled regions are the interesting
//! case, see [`PaintCompositor::scroll`].
//!
//! Nothing here allocates. The scratch buffer is sized by the canvas to
//! `texture_width * (texture_height + 1) * 4`: one spare row beyond the
//! texture snapshot, which is what the scroll copy relies on.

use crate::geometry::PixelRect;
use crate::paint::{DirtyPatch, PixelBuffer};
use crate::texture::{Texture, BYTES_PER_PIXEL};

pub struct PaintCompositor<'a> {
    texture: &'a mut dyn Texture,
    scratch: &'a mut [u8],
}

impl<'a> PaintCompositor<'a> {
    pub fn new(texture: &'a mut dyn Texture, scratch: &'a mut [u8]) -> Self {
        Self { texture, scratch }
    }

    /// Uploads a frame buffer to its own rectangle. The buffer is already
    /// packed to the rectangle, no staging needed.
    pub fn full_frame(&mut self, frame: &PixelBuffer) {
        self.texture.blit_from_memory(&frame.bytes, frame.rect);
    }

    /// Shifts the still-valid part of `rect` by `(dx, dy)` within the texture.
    ///
    /// The salvageable region is `rect ∩ translate(rect, -dx, -dy)`. Source
    /// and destination can overlap inside the texture, so the move is staged
    /// through the scratch buffer: snapshot the texture, gather the region
    /// into packed rows, blit the packed rows back at the shifted position.
    ///
    /// The snapshot and the packed rows share the scratch buffer with one row
    /// of slack. For `dy > 0` the packed region is placed at the tail end and
    /// filled bottom-up; otherwise the snapshot sits one row in and the packed
    /// region grows from the front. Either way a row is consumed before the
    /// gather overwrites it. The row order matters: a later row's source can
    /// sit under an earlier row's destination.
    pub fn scroll(&mut self, dx: i32, dy: i32, rect: PixelRect) {
        if dx == 0 && dy == 0 {
            return;
        }

        let moved_from = rect.translate(-dx, -dy);
        let shared = rect.intersect(&moved_from);
        if shared.is_empty() {
            // nothing salvageable, the exposed-edge patches repaint it all
            return;
        }

        let tex_size = self.texture.size();
        let tex_w = tex_size.width as usize;
        let snapshot_len = tex_w * tex_size.height as usize * BYTES_PER_PIXEL;

        let wid = shared.width as usize;
        let hig = shared.height as usize;
        let top = shared.top as usize;
        let left = shared.left as usize;

        let (snapshot_at, packed_at) = if dy > 0 {
            // snapshot at the front, packed rows pushed to the spare row at
            // the end, filled in reverse
            (0, ((top + hig + 1) * tex_w - hig * wid) * BYTES_PER_PIXEL)
        } else {
            // snapshot one row in, packed rows gathered at the front
            (tex_w * BYTES_PER_PIXEL, 0)
        };

        self.texture
            .blit_to_memory(&mut self.scratch[snapshot_at..snapshot_at + snapshot_len]);

        let mut gather_row = |jj: usize| {
            let src = snapshot_at + ((top + jj) * tex_w + left) * BYTES_PER_PIXEL;
            let dst = packed_at + jj * wid * BYTES_PER_PIXEL;
            self.scratch.copy_within(src..src + wid * BYTES_PER_PIXEL, dst);
        };

        if dy > 0 {
            for jj in (0..hig).rev() {
                gather_row(jj);
            }
        } else {
            for jj in 0..hig {
                gather_row(jj);
            }
        }

        let dest = shared.translate(dx, dy);
        self.texture.blit_from_memory(
            &self.scratch[packed_at..packed_at + hig * wid * BYTES_PER_PIXEL],
            dest,
        );
    }

    /// Repaints one patch rectangle from its source buffer.
    ///
    /// The source buffer's origin may be offset from the patch rectangle and
    /// its stride is the source rectangle's width, so rows are gathered into
    /// the scratch buffer before the blit.
    pub fn dirty_patch(&mut self, patch: &DirtyPatch) {
        let rect = patch.rect;
        if rect.is_empty() {
            return;
        }

        let wid = rect.width as usize;
        let hig = rect.height as usize;
        let top = (rect.top - patch.src.rect.top) as usize;
        let left = (rect.left - patch.src.rect.left) as usize;
        let src_stride = patch.src.rect.width as usize;

        for jj in 0..hig {
            let src = (left + (jj + top) * src_stride) * BYTES_PER_PIXEL;
            let dst = jj * wid * BYTES_PER_PIXEL;
            self.scratch[dst..dst + wid * BYTES_PER_PIXEL]
                .copy_from_slice(&patch.src.bytes[src..src + wid * BYTES_PER_PIXEL]);
        }

        self.texture
            .blit_from_memory(&self.scratch[..hig * wid * BYTES_PER_PIXEL], rect);
    }
}
