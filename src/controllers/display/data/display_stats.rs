use std::sync::atomic::{AtomicU64, Ordering};

/// A point-in-time copy of a surface's display counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DisplayStats {
    pub requested: u64,
    pub committed: u64,
    pub cancelled: u64,
    pub abandoned: u64,
    pub last_committed_generation: u64,
}

impl DisplayStats {
    /// Requests that have reached `did_display` or were abandoned.
    #[must_use]
    pub fn settled(&self) -> u64 {
        self.committed + self.cancelled + self.abandoned
    }
}

#[derive(Debug, Default)]
pub(crate) struct DisplayCounters {
    requested: AtomicU64,
    committed: AtomicU64,
    cancelled: AtomicU64,
    abandoned: AtomicU64,
    last_committed_generation: AtomicU64,
}

impl DisplayCounters {
    pub fn record_requested(&self) {
        self.requested.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_abandoned(&self) {
        self.abandoned.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_settled(&self, generation: u64, finished: bool) {
        if finished {
            self.committed.fetch_add(1, Ordering::Relaxed);
            self.last_committed_generation
                .fetch_max(generation, Ordering::AcqRel);
        } else {
            self.cancelled.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn snapshot(&self) -> DisplayStats {
        DisplayStats {
            requested: self.requested.load(Ordering::Relaxed),
            committed: self.committed.load(Ordering::Relaxed),
            cancelled: self.cancelled.load(Ordering::Relaxed),
            abandoned: self.abandoned.load(Ordering::Relaxed),
            last_committed_generation: self.last_committed_generation.load(Ordering::Acquire),
        }
    }
}
