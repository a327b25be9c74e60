use crate::core::data::size::Size;

/// Errors surfaced to the code that requests a redraw.
///
/// Draw-time failures never show up here; they are folded into the
/// `finished` flag handed to the post-draw callback.
#[derive(Debug, thiserror::Error)]
pub enum DisplayError {
    #[error("delegate panicked while building the display task for generation {generation}")]
    DelegatePanicked { generation: u64 },
    #[error("failed to start display workers: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

/// Failures reported by a rendering backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    #[error("cannot allocate a {}x{} drawing context: {reason}", .size.width, .size.height)]
    Allocation { size: Size, reason: String },
    #[error("failed to present contents: {0}")]
    Present(String),
}
