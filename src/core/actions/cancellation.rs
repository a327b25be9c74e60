use crate::core::render_state::RenderState;
use std::sync::{Arc, Weak};

/// How many pixels a cancel-aware loop may process between token polls.
pub const CANCEL_CHECK_INTERVAL_PIXELS: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("operation cancelled")]
pub struct Cancelled;

/// Answers "has this draw been superseded?".
///
/// Draw routines poll the token at safe points and return early once it
/// reports `true`. Nothing ever preempts a draw that does not poll.
pub trait CancelToken: Send + Sync {
    fn is_cancelled(&self) -> bool;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NeverCancel;

impl CancelToken for NeverCancel {
    #[inline]
    fn is_cancelled(&self) -> bool {
        false
    }
}

impl<F> CancelToken for F
where
    F: Fn() -> bool + Send + Sync,
{
    #[inline]
    fn is_cancelled(&self) -> bool {
        self()
    }
}

/// A token bound to the generation that was current when a draw was dispatched.
///
/// Holds a non-owning back-pointer to the surface's [`RenderState`]. Once the
/// state is gone (the surface was torn down) the token reports cancelled.
#[derive(Debug, Clone)]
pub struct GenerationToken {
    state: Weak<RenderState>,
    generation: u64,
}

impl GenerationToken {
    #[must_use]
    pub fn bind(state: &Arc<RenderState>, generation: u64) -> Self {
        Self {
            state: Arc::downgrade(state),
            generation,
        }
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl CancelToken for GenerationToken {
    #[inline]
    fn is_cancelled(&self) -> bool {
        match self.state.upgrade() {
            Some(state) => state.current_generation() != self.generation,
            None => true,
        }
    }
}
