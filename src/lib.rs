pub mod canvas;
pub mod compositor;
pub mod config;
pub mod content;
pub mod errors;
pub mod geometry;
pub mod input;
pub mod paint;
pub mod remote;
pub mod resource;
pub mod system;
pub mod texture;
pub mod tick;
pub mod widget;

pub use canvas::Canvas;
pub use config::{CanvasTuning, Rgba, TintRect, WidgetConfig};
pub use errors::CanvasError;
pub use geometry::{LogicalSize, PixelRect, PixelSize};
pub use input::{InteractionMode, KeyInput, Modifiers, MouseButton};
pub use paint::{DirtyPatch, PaintEvent, PixelBuffer};
pub use remote::{RemoteEngine, RemoteSurface};
pub use texture::{CpuBackend, CpuTexture, Texture, TextureBackend};
pub use tick::UpdateResult;
pub use widget::{DrawQuad, WebView, WidgetId};
