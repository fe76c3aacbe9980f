//! Process-wide remote engine context.
//!
//! The remote engine is shared process state with an explicit lifecycle: an
//! owner calls [`init`] before constructing any widget and [`shutdown`] after
//! destroying all of them. Constructing a widget, pumping, or creating a
//! surface without an active context fails with an invalid-request error.
//!
//! The host must call [`pump`] once per frame, before drawing: that is when
//! the engine services its internal queues and surfaces collect their pending
//! paint notifications.

use crate::errors::CanvasError;
use crate::remote::{RemoteEngine, RemoteSurface};
use crate::texture::TextureBackend;
use lazy_static::lazy_static;
use std::sync::{Arc, Mutex};

struct SystemState {
    engine: Box<dyn RemoteEngine>,
    backend: Arc<dyn TextureBackend>,
}

lazy_static! {
    static ref SYSTEM: Mutex<Option<SystemState>> = Mutex::new(None);
}

fn not_initialised() -> CanvasError {
    CanvasError::InvalidRequest(
        "system is not initialised, initialise it with system::init() first".to_string(),
    )
}

/// Hands the engine and texture backend to the context. Fails when the
/// context is already active.
pub fn init(
    engine: Box<dyn RemoteEngine>,
    backend: Arc<dyn TextureBackend>,
) -> Result<(), CanvasError> {
    let mut state = SYSTEM.lock().unwrap();
    if state.is_some() {
        return Err(CanvasError::InvalidRequest(
            "system was already initialised".to_string(),
        ));
    }

    log::info!("remote engine context up: {}", engine.name());
    *state = Some(SystemState { engine, backend });
    Ok(())
}

/// Tears the context down. All widgets must be gone by now; their surfaces
/// dangle otherwise.
pub fn shutdown() -> Result<(), CanvasError> {
    let mut state = SYSTEM.lock().unwrap();
    if state.is_none() {
        return Err(CanvasError::InvalidRequest(
            "system isn't currently initialised".to_string(),
        ));
    }

    log::info!("remote engine context down");
    *state = None;
    Ok(())
}

pub fn is_initialised() -> bool {
    SYSTEM.lock().unwrap().is_some()
}

/// Services the engine's internal queues; surfaces pick up their queued paint
/// notifications here. Call once per frame before drawing.
pub fn pump() -> Result<(), CanvasError> {
    let mut state = SYSTEM.lock().unwrap();
    let state = state.as_mut().ok_or_else(not_initialised)?;
    state.engine.pump();
    Ok(())
}

/// Opens a new engine window for a widget.
pub fn create_surface() -> Result<Box<dyn RemoteSurface>, CanvasError> {
    let mut state = SYSTEM.lock().unwrap();
    let state = state.as_mut().ok_or_else(not_initialised)?;
    Ok(state.engine.create_surface()?)
}

/// The texture backend widgets allocate their canvases from.
pub fn texture_backend() -> Result<Arc<dyn TextureBackend>, CanvasError> {
    let state = SYSTEM.lock().unwrap();
    let state = state.as_ref().ok_or_else(not_initialised)?;
    Ok(state.backend.clone())
}
