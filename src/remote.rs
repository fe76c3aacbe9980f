//! Remote rendering engine seam.
//!
//! The actual engine (a browser engine or any other out-of-process renderer)
//! lives behind two traits: [`RemoteEngine`] is the process-wide context that
//! the host pumps once per frame, [`RemoteSurface`] is one engine window bound
//! to one widget. Surfaces queue [`PaintEvent`]s while the engine is pumped;
//! the owning widget drains them, in delivery order, during its update pass.

use crate::input::Modifiers;
use crate::paint::PaintEvent;
use url::Url;

/// One remote engine window, exclusively owned by a widget.
///
/// All calls are fire-and-forget; the engine answers asynchronously through
/// paint notifications.
pub trait RemoteSurface {
    /// Tells the engine the pixel size it should render at.
    fn resize(&mut self, width: u32, height: u32);

    fn navigate_to(&mut self, url: &Url);

    fn focus(&mut self);

    fn unfocus(&mut self);

    /// Enables/disables a transparent background for the rendered content.
    fn set_transparent(&mut self, enabled: bool);

    /// Pointer position in remote-surface pixels.
    fn mouse_moved(&mut self, x: f32, y: f32);

    /// `button` uses the engine convention: 0 = left, 1 = middle, 2 = right.
    fn mouse_button(&mut self, button: u8, down: bool);

    fn key_event(&mut self, down: bool, key: &str, modifiers: Modifiers);

    fn text_input(&mut self, character: char);

    /// Takes the paint notifications queued since the last call, oldest first.
    fn drain_paints(&mut self) -> Vec<PaintEvent>;
}

/// Process-wide engine context, owned by the [`system`](crate::system) module.
pub trait RemoteEngine: Send {
    fn name(&self) -> &str;

    /// Opens a new engine window.
    fn create_surface(&mut self) -> anyhow::Result<Box<dyn RemoteSurface>>;

    /// Services the engine's internal queues. Surfaces pick up their pending
    /// paint notifications during this call.
    fn pump(&mut self);
}
