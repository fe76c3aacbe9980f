//! Input forwarding to the remote surface.
//!
//! Pointer coordinates arrive in host screen space; before forwarding, the
//! displayed region's origin is subtracted and both axes are multiplied by the
//! detail ratio so the remote surface sees coordinates on the same pixel grid
//! as the backing texture. Forwarding is fire-and-forget.

use crate::remote::RemoteSurface;
use bitflags::bitflags;
use std::fmt::Display;

/// Which event classes reach the remote surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionMode {
    /// Purely visual, nothing is forwarded.
    None,
    /// Mouse only, no keyboard events are passed on.
    MouseOnly,
    /// Keyboard only. The widget still has to be focused by the host.
    KeyboardOnly,
    /// Mouse and keyboard combined.
    Full,
}

impl InteractionMode {
    pub fn mouse_enabled(&self) -> bool {
        matches!(self, InteractionMode::MouseOnly | InteractionMode::Full)
    }

    pub fn keyboard_enabled(&self) -> bool {
        matches!(self, InteractionMode::KeyboardOnly | InteractionMode::Full)
    }

    /// Parses a mode name as used in host property systems. Unknown names fall
    /// back to [`InteractionMode::None`].
    pub fn from_name(name: &str) -> InteractionMode {
        match name {
            "MouseOnlyInteraction" => InteractionMode::MouseOnly,
            "KeyboardOnlyInteraction" => InteractionMode::KeyboardOnly,
            "FullInteraction" => InteractionMode::Full,
            _ => InteractionMode::None,
        }
    }
}

impl Display for InteractionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InteractionMode::None => write!(f, "NoInteraction"),
            InteractionMode::MouseOnly => write!(f, "MouseOnlyInteraction"),
            InteractionMode::KeyboardOnly => write!(f, "KeyboardOnlyInteraction"),
            InteractionMode::Full => write!(f, "FullInteraction"),
        }
    }
}

/// Represents a mouse button that can be pressed or released
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}

impl MouseButton {
    /// Remote-surface button index (0 = left, 1 = middle, 2 = right).
    pub fn index(&self) -> u8 {
        match self {
            MouseButton::Left => 0,
            MouseButton::Middle => 1,
            MouseButton::Right => 2,
        }
    }
}

impl Display for MouseButton {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MouseButton::Left => write!(f, "Left"),
            MouseButton::Middle => write!(f, "Middle"),
            MouseButton::Right => write!(f, "Right"),
        }
    }
}

bitflags! {
    pub struct Modifiers: u8 {
        const SHIFT   = 0b0001;
        const CONTROL = 0b0010;
        const ALT     = 0b0100;
        const META    = 0b1000;
    }
}

impl Display for Modifiers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut parts = Vec::new();

        if self.contains(Modifiers::SHIFT) {
            parts.push("Shift");
        }
        if self.contains(Modifiers::CONTROL) {
            parts.push("Control");
        }
        if self.contains(Modifiers::ALT) {
            parts.push("Alt");
        }
        if self.contains(Modifiers::META) {
            parts.push("Meta");
        }

        if parts.is_empty() {
            write!(f, "None")
        } else {
            write!(f, "{}", parts.join("+"))
        }
    }
}

/// A raw key press or release as the host reports it.
#[derive(Debug, Clone)]
pub struct KeyInput {
    pub key: String,
    pub down: bool,
    pub modifiers: Modifiers,
}

/// Snapshot of the state needed to forward one input event.
#[derive(Clone, Copy, Debug)]
pub struct InputForwarder {
    pub mode: InteractionMode,
    pub detail_ratio: f32,
    /// Screen-space origin of the displayed region.
    pub origin: (f32, f32),
}

impl InputForwarder {
    /// Forwards a pointer move, rescaled into remote-surface pixels.
    pub fn mouse_moved(&self, remote: &mut dyn RemoteSurface, x: f32, y: f32) {
        if !self.mode.mouse_enabled() {
            return;
        }

        // relative position inside the widget, then onto the texture pixel grid
        let rx = (x - self.origin.0) * self.detail_ratio;
        let ry = (y - self.origin.1) * self.detail_ratio;
        remote.mouse_moved(rx, ry);
    }

    pub fn mouse_button(&self, remote: &mut dyn RemoteSurface, button: MouseButton, down: bool) {
        if !self.mode.mouse_enabled() {
            return;
        }

        remote.mouse_button(button.index(), down);
    }

    pub fn key_event(&self, remote: &mut dyn RemoteSurface, input: &KeyInput) {
        if !self.mode.keyboard_enabled() {
            return;
        }

        remote.key_event(input.down, &input.key, input.modifiers);
    }

    pub fn text_input(&self, remote: &mut dyn RemoteSurface, character: char) {
        if !self.mode.keyboard_enabled() {
            return;
        }

        remote.text_input(character);
    }
}
