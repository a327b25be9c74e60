use crate::controllers::display::config::DisplayConfig;
use crate::controllers::display::data::draw_task::DrawTask;
use crate::controllers::display::dispatcher::Dispatcher;
use crate::controllers::display::ports::delegate::SurfaceDelegate;
use crate::controllers::display::surface::{AsyncSurface, SurfaceId};
use crate::core::actions::cancellation::CancelToken;
use crate::core::data::colour::Colour;
use crate::core::data::pixel_buffer::PixelBuffer;
use crate::core::data::size::Size;
use crate::presenters::bitmap::backend::BitmapBackend;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, ThreadId};
use std::time::{Duration, Instant};

pub const SETTLE_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    WillDisplay {
        request: u64,
        surface: SurfaceId,
        thread: ThreadId,
    },
    Draw {
        request: u64,
        size: Size,
        thread: ThreadId,
    },
    DidDisplay {
        request: u64,
        surface: SurfaceId,
        thread: ThreadId,
        finished: bool,
        alive: bool,
    },
}

#[derive(Debug, Default)]
pub struct Recorder {
    events: Mutex<Vec<Event>>,
}

impl Recorder {
    pub fn push(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    /// `(request, finished)` for every `did_display`, sorted by request.
    pub fn did_displays(&self) -> Vec<(u64, bool)> {
        let mut settled: Vec<_> = self
            .events()
            .into_iter()
            .filter_map(|event| match event {
                Event::DidDisplay {
                    request, finished, ..
                } => Some((request, finished)),
                _ => None,
            })
            .collect();
        settled.sort_unstable();
        settled
    }

    pub fn draws(&self) -> Vec<(u64, ThreadId)> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                Event::Draw {
                    request, thread, ..
                } => Some((request, thread)),
                _ => None,
            })
            .collect()
    }
}

pub type DrawBehaviour = Arc<dyn Fn(u64, &mut PixelBuffer, &dyn CancelToken) + Send + Sync>;
pub type WillDisplayHook = Rc<dyn Fn(u64)>;

/// Hands out tasks that record every callback, numbering requests from 1.
pub struct RecordingDelegate {
    recorder: Arc<Recorder>,
    requests: AtomicU64,
    behaviour: DrawBehaviour,
    will_display: Option<WillDisplayHook>,
}

impl RecordingDelegate {
    pub fn new(
        recorder: &Arc<Recorder>,
        behaviour: impl Fn(u64, &mut PixelBuffer, &dyn CancelToken) + Send + Sync + 'static,
    ) -> Self {
        Self {
            recorder: Arc::clone(recorder),
            requests: AtomicU64::new(0),
            behaviour: Arc::new(behaviour),
            will_display: None,
        }
    }

    /// Runs `hook` on the owning thread after each `will_display` is recorded.
    pub fn with_will_display(mut self, hook: impl Fn(u64) + 'static) -> Self {
        self.will_display = Some(Rc::new(hook));
        self
    }
}

impl SurfaceDelegate<PixelBuffer> for RecordingDelegate {
    fn new_display_task(&self) -> DrawTask<PixelBuffer> {
        let request = self.requests.fetch_add(1, Ordering::SeqCst) + 1;
        let will_recorder = Arc::clone(&self.recorder);
        let draw_recorder = Arc::clone(&self.recorder);
        let did_recorder = Arc::clone(&self.recorder);
        let behaviour = Arc::clone(&self.behaviour);
        let hook = self.will_display.clone();

        DrawTask::empty()
            .on_will_display(move |surface| {
                will_recorder.push(Event::WillDisplay {
                    request,
                    surface: surface.id(),
                    thread: thread::current().id(),
                });
                if let Some(hook) = hook {
                    hook(request);
                }
            })
            .on_draw(move |context, size, token| {
                draw_recorder.push(Event::Draw {
                    request,
                    size,
                    thread: thread::current().id(),
                });
                behaviour(request, context, token);
            })
            .on_did_display(move |surface, finished| {
                did_recorder.push(Event::DidDisplay {
                    request,
                    surface: surface.id(),
                    thread: thread::current().id(),
                    finished,
                    alive: surface.is_alive(),
                });
            })
    }
}

pub fn marker(request: u64) -> Colour {
    Colour::new(request as u8, 0, 0)
}

pub fn fill_with_marker(request: u64, context: &mut PixelBuffer, _: &dyn CancelToken) {
    context.fill(marker(request));
}

/// Polls the token like a long draw would, giving up after `timeout`.
pub fn spin_until_cancelled(token: &dyn CancelToken, timeout: Duration) {
    let start = Instant::now();
    while !token.is_cancelled() && start.elapsed() < timeout {
        thread::sleep(Duration::from_millis(1));
    }
}

pub fn dispatcher(config: DisplayConfig) -> (Rc<Dispatcher<BitmapBackend>>, Arc<BitmapBackend>) {
    dispatcher_with_backend(config, BitmapBackend::new())
}

pub fn dispatcher_with_backend(
    config: DisplayConfig,
    backend: BitmapBackend,
) -> (Rc<Dispatcher<BitmapBackend>>, Arc<BitmapBackend>) {
    let backend = Arc::new(backend);
    let dispatcher = Dispatcher::new(config, Arc::clone(&backend)).expect("worker pool starts");
    (Rc::new(dispatcher), backend)
}

/// Pumps the main queue until every request on `surface` has settled.
pub fn settle(dispatcher: &Dispatcher<BitmapBackend>, surface: &AsyncSurface<BitmapBackend>) -> bool {
    dispatcher.main_queue().run_until(
        || {
            let stats = surface.stats();
            stats.settled() == stats.requested
        },
        SETTLE_TIMEOUT,
    )
}
