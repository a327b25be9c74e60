use crate::core::data::colour::Colour;
use std::num::NonZeroUsize;
use std::thread;
use std::time::Duration;

const MAX_DEFAULT_WORKER_THREADS: usize = 16;
const DEFAULT_THREAD_NAME_PREFIX: &str = "async-surface-display";
const DEFAULT_SLOW_TASK_THRESHOLD: Duration = Duration::from_millis(16);
const DEFAULT_DRAIN_TIMEOUT: Duration = Duration::from_secs(1);

fn default_worker_threads() -> usize {
    thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
        .min(MAX_DEFAULT_WORKER_THREADS)
}

#[derive(Debug, Clone, PartialEq)]
pub struct DisplayConfig {
    /// Initial value of each new surface's async flag.
    pub displays_asynchronously: bool,
    /// Size of the worker pool that runs draw callbacks.
    pub worker_threads: usize,
    pub thread_name_prefix: String,
    /// `new_display_task` calls slower than this are logged as contract warnings.
    pub slow_task_threshold: Duration,
    /// When set, every fresh context is cleared to this colour before drawing.
    pub background: Option<Colour>,
    /// How long a dropped dispatcher keeps pumping its queue for in-flight draws.
    pub drain_timeout: Duration,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            displays_asynchronously: true,
            worker_threads: default_worker_threads(),
            thread_name_prefix: DEFAULT_THREAD_NAME_PREFIX.to_owned(),
            slow_task_threshold: DEFAULT_SLOW_TASK_THRESHOLD,
            background: None,
            drain_timeout: DEFAULT_DRAIN_TIMEOUT,
        }
    }
}

impl DisplayConfig {
    #[must_use]
    pub fn with_displays_asynchronously(mut self, enabled: bool) -> Self {
        self.displays_asynchronously = enabled;
        self
    }

    #[must_use]
    pub fn with_worker_threads(mut self, threads: usize) -> Self {
        self.worker_threads = threads.max(1);
        self
    }

    #[must_use]
    pub fn with_thread_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.thread_name_prefix = prefix.into();
        self
    }

    #[must_use]
    pub fn with_slow_task_threshold(mut self, threshold: Duration) -> Self {
        self.slow_task_threshold = threshold;
        self
    }

    #[must_use]
    pub fn with_background(mut self, background: Colour) -> Self {
        self.background = Some(background);
        self
    }

    #[must_use]
    pub fn with_drain_timeout(mut self, timeout: Duration) -> Self {
        self.drain_timeout = timeout;
        self
    }
}
