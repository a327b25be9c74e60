use crate::controllers::display::data::display_phase::DisplayTicket;
use crate::controllers::display::data::display_stats::{DisplayCounters, DisplayStats};
use crate::controllers::display::dispatcher::{DisplayTarget, Dispatcher};
use crate::controllers::display::errors::DisplayError;
use crate::controllers::display::ports::backend::RenderBackend;
use crate::controllers::display::ports::delegate::SurfaceDelegate;
use crate::core::data::size::Size;
use crate::core::render_state::RenderState;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tracing::debug;

static NEXT_SURFACE_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceId(u64);

impl SurfaceId {
    fn next() -> Self {
        Self(NEXT_SURFACE_ID.fetch_add(1, Ordering::Relaxed))
    }

    #[must_use]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "surface#{}", self.0)
    }
}

/// Identifies the surface a callback belongs to.
///
/// The handle never keeps the surface alive. After teardown it still
/// identifies the surface but [`SurfaceHandle::is_alive`] returns `false`.
#[derive(Debug, Clone)]
pub struct SurfaceHandle {
    id: SurfaceId,
    state: Weak<RenderState>,
}

impl SurfaceHandle {
    /// A handle that refers to no surface.
    #[must_use]
    pub fn detached() -> Self {
        Self {
            id: SurfaceId(0),
            state: Weak::new(),
        }
    }

    #[must_use]
    pub fn id(&self) -> SurfaceId {
        self.id
    }

    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.state.strong_count() > 0
    }
}

/// A surface whose contents are redrawn through a [`Dispatcher`].
///
/// Owns the surface's [`RenderState`]. Every [`AsyncSurface::set_needs_display`]
/// bumps the generation before asking the delegate for a task, so any older
/// draw still running sees itself superseded on its next poll.
pub struct AsyncSurface<B: RenderBackend> {
    dispatcher: Rc<Dispatcher<B>>,
    delegate: Box<dyn SurfaceDelegate<B::Context>>,
    target: DisplayTarget,
    size: Size,
}

impl<B: RenderBackend> AsyncSurface<B> {
    pub fn new(
        dispatcher: &Rc<Dispatcher<B>>,
        delegate: impl SurfaceDelegate<B::Context> + 'static,
        size: Size,
    ) -> Self {
        let state = Arc::new(RenderState::new(
            dispatcher.config().displays_asynchronously,
        ));
        let handle = SurfaceHandle {
            id: SurfaceId::next(),
            state: Arc::downgrade(&state),
        };

        Self {
            dispatcher: Rc::clone(dispatcher),
            delegate: Box::new(delegate),
            target: DisplayTarget {
                state,
                handle,
                counters: Arc::new(DisplayCounters::default()),
            },
            size,
        }
    }

    #[must_use]
    pub fn id(&self) -> SurfaceId {
        self.target.handle.id()
    }

    #[must_use]
    pub fn handle(&self) -> SurfaceHandle {
        self.target.handle.clone()
    }

    #[must_use]
    pub fn render_state(&self) -> &Arc<RenderState> {
        &self.target.state
    }

    #[must_use]
    pub fn size(&self) -> Size {
        self.size
    }

    /// Takes effect on the next redraw request.
    pub fn set_size(&mut self, size: Size) {
        self.size = size;
    }

    #[must_use]
    pub fn displays_asynchronously(&self) -> bool {
        self.target.state.async_enabled()
    }

    /// In-flight draws keep the mode they were dispatched with.
    pub fn set_displays_asynchronously(&self, enabled: bool) {
        self.target.state.set_async_enabled(enabled);
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.target.state.current_generation()
    }

    #[must_use]
    pub fn stats(&self) -> DisplayStats {
        self.target.counters.snapshot()
    }

    /// Marks the contents stale and starts a new redraw.
    ///
    /// In sync mode every callback has run by the time this returns. In async
    /// mode `did_display` arrives later through the dispatcher's main queue.
    pub fn set_needs_display(&self) -> Result<DisplayTicket, DisplayError> {
        let generation = self.target.state.request_redraw();
        self.target.counters.record_requested();

        let task = self
            .dispatcher
            .request_task(self.delegate.as_ref(), &self.target, generation)?;

        Ok(self
            .dispatcher
            .display(&self.target, self.size, generation, task))
    }

    /// Supersedes every in-flight draw without requesting a new one.
    pub fn cancel_pending(&self) -> u64 {
        let generation = self.target.state.request_redraw();
        debug!(generation, surface = %self.id(), "pending draws cancelled");
        generation
    }
}

impl<B: RenderBackend> Drop for AsyncSurface<B> {
    fn drop(&mut self) {
        let generation = self.target.state.request_redraw();
        self.dispatcher.backend().release(&self.target.handle);
        debug!(generation, surface = %self.id(), "surface torn down");
    }
}

impl<B: RenderBackend> fmt::Debug for AsyncSurface<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncSurface")
            .field("id", &self.id())
            .field("size", &self.size)
            .field("generation", &self.generation())
            .field("asynchronous", &self.displays_asynchronously())
            .finish()
    }
}
