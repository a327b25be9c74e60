use crate::controllers::display::config::DisplayConfig;
use crate::controllers::display::errors::DisplayError;
use rayon::{ThreadPool, ThreadPoolBuilder};

/// Named worker threads that run draw callbacks off the owning thread.
pub struct DisplayWorkerPool {
    pool: ThreadPool,
}

impl DisplayWorkerPool {
    pub fn new(config: &DisplayConfig) -> Result<Self, DisplayError> {
        let prefix = config.thread_name_prefix.clone();

        let pool = ThreadPoolBuilder::new()
            .num_threads(config.worker_threads.max(1))
            .thread_name(move |index| format!("{prefix}-{index}"))
            .panic_handler(|_| {
                tracing::error!("display worker job panicked outside a draw callback");
            })
            .build()?;

        Ok(Self { pool })
    }

    #[must_use]
    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Fire-and-forget; the caller never waits for `job`.
    pub fn spawn(&self, job: impl FnOnce() + Send + 'static) {
        self.pool.spawn(job);
    }
}

impl std::fmt::Debug for DisplayWorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DisplayWorkerPool")
            .field("threads", &self.threads())
            .finish()
    }
}
