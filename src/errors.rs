#[derive(Debug, thiserror::Error)]
pub enum CanvasError {
    /// Lifecycle misuse (operating before init, double init) or a request the
    /// callee cannot satisfy without more information (unguessable mime type).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Backend error: {0}")]
    Backend(#[from] anyhow::Error),

    #[error("Resource error: {0}")]
    Resource(#[from] std::io::Error),

    #[error("Content encoding error: {0}")]
    Content(String),
}
