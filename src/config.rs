use crate::input::InteractionMode;

/// Canvas allocation tuning.
///
/// `reserve_ratio` must stay strictly below `max_overhead`: the reserve is part
/// of the allocated size, so a reserve at or above the shrink threshold makes
/// every freshly allocated texture immediately "too big" and the canvas will
/// reallocate on every check. The policy does not defend against this, the
/// caller has to keep the two in balance.
#[derive(Debug, Clone, Copy)]
pub struct CanvasTuning {
    /// How big the rendering canvas is relative to the widget's pixel size.
    /// 0.5 halves both sides (4x smaller area), which can speed things up
    /// considerably; 2.0 doubles them.
    pub detail_ratio: f32,
    /// Extra allocation margin added at texture creation. Leave at 0.0 for
    /// widgets that never resize; a reserve pays off for widgets that resize
    /// often.
    pub reserve_ratio: f32,
    /// Tolerated excess before an over-sized texture is recreated smaller.
    /// 0.2 means a texture more than 20% bigger than needed (on either axis)
    /// gets shrunk.
    pub max_overhead: f32,
}

impl Default for CanvasTuning {
    fn default() -> Self {
        Self {
            detail_ratio: 1.0,
            reserve_ratio: 0.0,
            max_overhead: 0.2,
        }
    }
}

/// Straight-alpha RGBA colour, channels in `0.0 ..= 1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn white() -> Self {
        Self::new(1.0, 1.0, 1.0, 1.0)
    }
}

/// Per-corner tint applied to the drawn quad.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TintRect {
    pub top_left: Rgba,
    pub top_right: Rgba,
    pub bottom_left: Rgba,
    pub bottom_right: Rgba,
}

impl TintRect {
    pub fn uniform(colour: Rgba) -> Self {
        Self {
            top_left: colour,
            top_right: colour,
            bottom_left: colour,
            bottom_right: colour,
        }
    }

    /// Returns the tint with every corner's alpha multiplied by `alpha`.
    pub fn modulate_alpha(&self, alpha: f32) -> TintRect {
        let scale = |c: Rgba| Rgba { a: c.a * alpha, ..c };
        TintRect {
            top_left: scale(self.top_left),
            top_right: scale(self.top_right),
            bottom_left: scale(self.bottom_left),
            bottom_right: scale(self.bottom_right),
        }
    }
}

impl Default for TintRect {
    fn default() -> Self {
        Self::uniform(Rgba::white())
    }
}

/// Per-widget configuration, all reachable through widget getters/setters.
#[derive(Debug, Clone, Copy)]
pub struct WidgetConfig {
    pub interaction_mode: InteractionMode,
    pub tuning: CanvasTuning,
    /// Seconds between a widget resize and the canvas following it. 0 resizes
    /// immediately, negative sizes the canvas once on first draw and never
    /// follows widget resizes after that.
    pub resize_delay: f32,
    pub tint: TintRect,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            interaction_mode: InteractionMode::None,
            tuning: CanvasTuning::default(),
            resize_delay: -1.0, // size once on first draw
            tint: TintRect::default(),
        }
    }
}
