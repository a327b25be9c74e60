use crate::controllers::display::config::DisplayConfig;
use crate::controllers::display::data::display_phase::{DisplayMode, DisplayPhase, DisplayTicket};
use crate::controllers::display::data::display_stats::DisplayCounters;
use crate::controllers::display::data::draw_task::{DidDisplayFn, DrawFn, DrawTask};
use crate::controllers::display::errors::{BackendError, DisplayError};
use crate::controllers::display::main_queue::MainQueue;
use crate::controllers::display::ports::backend::RenderBackend;
use crate::controllers::display::ports::delegate::SurfaceDelegate;
use crate::controllers::display::surface::{SurfaceHandle, SurfaceId};
use crate::controllers::display::worker_pool::DisplayWorkerPool;
use crate::core::actions::cancellation::{CancelToken, GenerationToken, NeverCancel};
use crate::core::data::colour::Colour;
use crate::core::data::size::Size;
use crate::core::render_state::RenderState;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;
use tracing::{debug, trace, warn};

/// What a surface hands the dispatcher for each request.
pub(crate) struct DisplayTarget {
    pub state: Arc<RenderState>,
    pub handle: SurfaceHandle,
    pub counters: Arc<DisplayCounters>,
}

/// Places the three callbacks of a [`DrawTask`] on the right threads.
///
/// `will_display` and `did_display` always run on the thread that owns the
/// dispatcher's [`MainQueue`]. `draw` runs inline when the surface's async
/// flag is off, otherwise on the worker pool with a [`GenerationToken`] bound
/// to the request's generation. Worker results come back through the queue,
/// so the owning thread must keep calling [`MainQueue::run_pending`].
///
/// Dropping the dispatcher pumps the queue for up to
/// [`DisplayConfig::drain_timeout`] so background draws still deliver their
/// `did_display`. Draws that outlive that window are logged and their
/// `did_display` is never called.
pub struct Dispatcher<B: RenderBackend> {
    config: DisplayConfig,
    backend: Arc<B>,
    workers: DisplayWorkerPool,
    queue: MainQueue,
    in_flight: Arc<AtomicUsize>,
}

enum DrawOutcome<G> {
    Drawn(G),
    Superseded,
    Skipped,
    BackendFailed(BackendError),
    Panicked,
}

#[derive(Debug, Clone, Copy)]
struct DisplayJob {
    generation: u64,
    surface: SurfaceId,
    phase: DisplayPhase,
}

impl DisplayJob {
    fn new(generation: u64, surface: SurfaceId) -> Self {
        Self {
            generation,
            surface,
            phase: DisplayPhase::Idle,
        }
    }

    fn enter(&mut self, phase: DisplayPhase) {
        trace!(
            generation = self.generation,
            surface = %self.surface,
            from = %self.phase,
            to = %phase,
            "display phase"
        );
        self.phase = phase;
    }
}

/// Counts a background draw until its commit has run or been discarded.
struct InFlight(Arc<AtomicUsize>);

impl InFlight {
    fn track(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::AcqRel);
        Self(Arc::clone(counter))
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

impl<B: RenderBackend> Dispatcher<B> {
    /// Creates a dispatcher owned by the calling thread.
    pub fn new(config: DisplayConfig, backend: Arc<B>) -> Result<Self, DisplayError> {
        Self::with_queue(config, backend, MainQueue::new())
    }

    pub fn with_queue(
        config: DisplayConfig,
        backend: Arc<B>,
        queue: MainQueue,
    ) -> Result<Self, DisplayError> {
        let workers = DisplayWorkerPool::new(&config)?;

        debug!(
            workers = workers.threads(),
            asynchronous = config.displays_asynchronously,
            "display dispatcher ready"
        );

        Ok(Self {
            config,
            backend,
            workers,
            queue,
            in_flight: Arc::new(AtomicUsize::new(0)),
        })
    }

    #[must_use]
    pub fn config(&self) -> &DisplayConfig {
        &self.config
    }

    #[must_use]
    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    #[must_use]
    pub fn main_queue(&self) -> &MainQueue {
        &self.queue
    }

    #[must_use]
    pub fn workers(&self) -> &DisplayWorkerPool {
        &self.workers
    }

    /// Background draws whose commit has not run yet.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Asks the delegate for a task, abandoning the request if it panics.
    pub(crate) fn request_task(
        &self,
        delegate: &dyn SurfaceDelegate<B::Context>,
        target: &DisplayTarget,
        generation: u64,
    ) -> Result<DrawTask<B::Context>, DisplayError> {
        let start = Instant::now();
        let task = catch_unwind(AssertUnwindSafe(|| delegate.new_display_task()));
        let elapsed = start.elapsed();

        if elapsed > self.config.slow_task_threshold {
            warn!(
                generation,
                surface = %target.handle.id(),
                elapsed_ms = elapsed.as_millis() as u64,
                "delegate was slow to produce a display task"
            );
        }

        task.map_err(|_| {
            target.counters.record_abandoned();
            warn!(
                generation,
                surface = %target.handle.id(),
                "delegate panicked in new_display_task; request abandoned"
            );
            DisplayError::DelegatePanicked { generation }
        })
    }

    /// Runs `task` for `generation`. Must be called on the owning thread, which
    /// the dispatcher not being `Send` guarantees.
    pub(crate) fn display(
        &self,
        target: &DisplayTarget,
        size: Size,
        generation: u64,
        task: DrawTask<B::Context>,
    ) -> DisplayTicket {
        let parts = task.into_parts();
        let mut job = DisplayJob::new(generation, target.handle.id());
        let mode = if target.state.async_enabled() {
            DisplayMode::Background
        } else {
            DisplayMode::Inline
        };
        let ticket = DisplayTicket { generation, mode };

        job.enter(DisplayPhase::PreDisplay);

        if let Some(will_display) = parts.will_display {
            if catch_unwind(AssertUnwindSafe(|| will_display(&target.handle))).is_err() {
                warn!(
                    generation,
                    surface = %target.handle.id(),
                    "will_display panicked; skipping draw"
                );
                job.enter(DisplayPhase::Committing);
                commit(
                    self.backend.as_ref(),
                    &target.handle,
                    &target.counters,
                    job,
                    DrawOutcome::Panicked,
                    &NeverCancel,
                    parts.did_display,
                );
                return ticket;
            }
        }

        job.enter(DisplayPhase::Drawing);

        let Some(draw) = parts.draw else {
            let token = GenerationToken::bind(&target.state, generation);
            job.enter(DisplayPhase::Committing);
            commit(
                self.backend.as_ref(),
                &target.handle,
                &target.counters,
                job,
                DrawOutcome::Skipped,
                &token,
                parts.did_display,
            );
            return ticket;
        };

        match mode {
            DisplayMode::Inline => {
                let outcome = run_draw(
                    self.backend.as_ref(),
                    size,
                    self.config.background,
                    draw,
                    &NeverCancel,
                );
                job.enter(DisplayPhase::Committing);
                commit(
                    self.backend.as_ref(),
                    &target.handle,
                    &target.counters,
                    job,
                    outcome,
                    &NeverCancel,
                    parts.did_display,
                );
            }
            DisplayMode::Background => {
                let token = GenerationToken::bind(&target.state, generation);
                let backend = Arc::clone(&self.backend);
                let queue = self.queue.handle();
                let handle = target.handle.clone();
                let counters = Arc::clone(&target.counters);
                let background = self.config.background;
                let did_display = parts.did_display;
                let in_flight = InFlight::track(&self.in_flight);

                self.workers.spawn(move || {
                    let outcome = run_draw(backend.as_ref(), size, background, draw, &token);
                    job.enter(DisplayPhase::Committing);

                    let posted = queue.post(move || {
                        let _in_flight = in_flight;
                        commit(
                            backend.as_ref(),
                            &handle,
                            &counters,
                            job,
                            outcome,
                            &token,
                            did_display,
                        );
                    });

                    if !posted {
                        debug!(
                            generation = job.generation,
                            surface = %job.surface,
                            "owning thread queue is gone; dropping commit"
                        );
                    }
                });
            }
        }

        ticket
    }
}

impl<B: RenderBackend> Drop for Dispatcher<B> {
    fn drop(&mut self) {
        if self.in_flight() == 0 {
            return;
        }

        let in_flight = Arc::clone(&self.in_flight);
        let drained = self.queue.run_until(
            || in_flight.load(Ordering::Acquire) == 0,
            self.config.drain_timeout,
        );

        if !drained {
            warn!(
                remaining = self.in_flight(),
                "dispatcher dropped with draws still running; their did_display will not run"
            );
        }
    }
}

impl<B: RenderBackend> std::fmt::Debug for Dispatcher<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("config", &self.config)
            .field("workers", &self.workers)
            .field("queue", &self.queue)
            .field("in_flight", &self.in_flight())
            .finish()
    }
}

/// Allocates a context and runs `draw` into it. Runs inline or on a worker.
fn run_draw<B: RenderBackend>(
    backend: &B,
    size: Size,
    background: Option<Colour>,
    draw: DrawFn<B::Context>,
    token: &dyn CancelToken,
) -> DrawOutcome<B::Context> {
    let mut context = match catch_unwind(AssertUnwindSafe(|| backend.new_context(size))) {
        Ok(Ok(context)) => context,
        Ok(Err(err)) => return DrawOutcome::BackendFailed(err),
        Err(_) => {
            return DrawOutcome::BackendFailed(BackendError::Allocation {
                size,
                reason: "backend panicked while allocating".to_owned(),
            });
        }
    };

    if let Some(background) = background {
        if catch_unwind(AssertUnwindSafe(|| backend.clear(&mut context, background))).is_err() {
            return DrawOutcome::Panicked;
        }
    }

    if catch_unwind(AssertUnwindSafe(|| draw(&mut context, size, token))).is_err() {
        return DrawOutcome::Panicked;
    }

    if token.is_cancelled() {
        return DrawOutcome::Superseded;
    }

    DrawOutcome::Drawn(context)
}

/// Presents a finished draw and reports the result. Owning thread only.
///
/// The token is evaluated again here, so a draw that was superseded after it
/// returned on the worker is discarded rather than presented over newer work.
fn commit<B: RenderBackend>(
    backend: &B,
    handle: &SurfaceHandle,
    counters: &DisplayCounters,
    mut job: DisplayJob,
    outcome: DrawOutcome<B::Context>,
    token: &dyn CancelToken,
    did_display: Option<DidDisplayFn>,
) {
    debug_assert_eq!(job.phase, DisplayPhase::Committing);
    let generation = job.generation;
    let surface = job.surface;

    let finished = match outcome {
        DrawOutcome::Drawn(context) if !token.is_cancelled() => {
            match catch_unwind(AssertUnwindSafe(|| backend.present(handle, context))) {
                Ok(Ok(())) => true,
                Ok(Err(err)) => {
                    warn!(generation, %surface, %err, "presenting contents failed");
                    false
                }
                Err(_) => {
                    warn!(generation, %surface, "backend panicked while presenting");
                    false
                }
            }
        }
        DrawOutcome::Drawn(_) | DrawOutcome::Superseded => {
            debug!(generation, %surface, "draw superseded");
            false
        }
        DrawOutcome::Skipped => !token.is_cancelled(),
        DrawOutcome::BackendFailed(err) => {
            warn!(generation, %surface, %err, "could not allocate a drawing context");
            false
        }
        DrawOutcome::Panicked => {
            warn!(generation, %surface, "draw callback panicked");
            false
        }
    };

    counters.record_settled(generation, finished);

    if let Some(did_display) = did_display {
        if catch_unwind(AssertUnwindSafe(|| did_display(handle, finished))).is_err() {
            warn!(generation, %surface, "did_display panicked");
        }
    }

    job.enter(DisplayPhase::Idle);
    debug!(generation, %surface, finished, "display settled");
}
