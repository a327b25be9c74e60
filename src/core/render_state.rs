use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Per-surface render generation state.
///
/// `generation` only ever moves forward through [`RenderState::request_redraw`]
/// and may be read concurrently by any number of in-flight draws. The async
/// flag is read once per request at dispatch time.
#[derive(Debug)]
pub struct RenderState {
    generation: AtomicU64,
    async_enabled: AtomicBool,
}

impl RenderState {
    #[must_use]
    pub fn new(async_enabled: bool) -> Self {
        Self {
            generation: AtomicU64::new(0),
            async_enabled: AtomicBool::new(async_enabled),
        }
    }

    /// Increments the generation and returns the new value.
    pub fn request_redraw(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::AcqRel) + 1
    }

    #[must_use]
    pub fn current_generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn async_enabled(&self) -> bool {
        self.async_enabled.load(Ordering::Relaxed)
    }

    pub fn set_async_enabled(&self, enabled: bool) {
        self.async_enabled.store(enabled, Ordering::Relaxed);
    }
}

impl Default for RenderState {
    fn default() -> Self {
        Self::new(true)
    }
}
