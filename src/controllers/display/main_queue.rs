use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryRecvError, unbounded};
use std::marker::PhantomData;
use std::sync::Arc;
use std::thread::{self, ThreadId};
use std::time::{Duration, Instant};

type Job = Box<dyn FnOnce() + Send>;
type Waker = Arc<dyn Fn() + Send + Sync>;

/// A task queue bound to the thread that created it.
///
/// Workers post jobs through a [`MainQueueHandle`]; the owning thread runs them
/// from its event loop with [`MainQueue::run_pending`]. The queue itself cannot
/// leave the owning thread, so jobs never run anywhere else.
pub struct MainQueue {
    owner: ThreadId,
    sender: Sender<Job>,
    receiver: Receiver<Job>,
    waker: Option<Waker>,
    // Keeps the queue on the thread that created it.
    _not_send: PhantomData<*const ()>,
}

/// Sending side of a [`MainQueue`]; cheap to clone and safe to move to workers.
#[derive(Clone)]
pub struct MainQueueHandle {
    sender: Sender<Job>,
    waker: Option<Waker>,
}

impl MainQueueHandle {
    /// Posts a job without blocking. Returns `false` if the queue is gone.
    pub fn post(&self, job: impl FnOnce() + Send + 'static) -> bool {
        if self.sender.send(Box::new(job)).is_err() {
            return false;
        }

        if let Some(waker) = &self.waker {
            waker();
        }

        true
    }
}

impl std::fmt::Debug for MainQueueHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MainQueueHandle")
            .field("pending", &self.sender.len())
            .finish()
    }
}

impl MainQueue {
    /// Creates a queue owned by the calling thread.
    #[must_use]
    pub fn new() -> Self {
        let (sender, receiver) = unbounded();

        Self {
            owner: thread::current().id(),
            sender,
            receiver,
            waker: None,
            _not_send: PhantomData,
        }
    }

    /// Like [`MainQueue::new`], calling `waker` after every post so an event
    /// loop can schedule a call to [`MainQueue::run_pending`].
    #[must_use]
    pub fn with_waker(waker: impl Fn() + Send + Sync + 'static) -> Self {
        Self {
            waker: Some(Arc::new(waker)),
            ..Self::new()
        }
    }

    #[must_use]
    pub fn handle(&self) -> MainQueueHandle {
        MainQueueHandle {
            sender: self.sender.clone(),
            waker: self.waker.clone(),
        }
    }

    #[must_use]
    pub fn owner(&self) -> ThreadId {
        self.owner
    }

    #[must_use]
    pub fn is_owning_thread(&self) -> bool {
        thread::current().id() == self.owner
    }

    #[must_use]
    pub fn pending(&self) -> usize {
        self.receiver.len()
    }

    /// Runs every job that is queued right now and returns how many ran.
    ///
    /// Jobs posted by the jobs themselves are left for the next call.
    pub fn run_pending(&self) -> usize {
        let mut budget = self.receiver.len();
        let mut ran = 0;

        while budget > 0 {
            match self.receiver.try_recv() {
                Ok(job) => {
                    job();
                    ran += 1;
                    budget -= 1;
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }

        ran
    }

    /// Runs jobs as they arrive until `done` returns true or `timeout` elapses.
    ///
    /// Returns whether `done` was satisfied.
    pub fn run_until(&self, mut done: impl FnMut() -> bool, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;

        loop {
            self.run_pending();

            if done() {
                return true;
            }

            let Some(remaining) = deadline.checked_duration_since(Instant::now()) else {
                return false;
            };

            match self.receiver.recv_timeout(remaining) {
                Ok(job) => job(),
                Err(RecvTimeoutError::Timeout) => return done(),
                Err(RecvTimeoutError::Disconnected) => return done(),
            }
        }
    }
}

impl Default for MainQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MainQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MainQueue")
            .field("owner", &self.owner)
            .field("pending", &self.receiver.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn jobs_posted_from_workers_run_on_the_owning_thread() {
        let queue = MainQueue::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let handle = queue.handle();
                let seen = Arc::clone(&seen);
                thread::spawn(move || {
                    handle.post(move || seen.lock().unwrap().push(thread::current().id()));
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(queue.run_pending(), 4);
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 4);
        assert!(seen.iter().all(|id| *id == queue.owner()));
    }

    #[test]
    fn run_pending_preserves_post_order() {
        let queue = MainQueue::new();
        let order = Arc::new(Mutex::new(Vec::new()));
        let handle = queue.handle();

        for i in 0..5 {
            let order = Arc::clone(&order);
            handle.post(move || order.lock().unwrap().push(i));
        }

        queue.run_pending();

        assert_eq!(*order.lock().unwrap(), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn jobs_posted_by_jobs_wait_for_the_next_drain() {
        let queue = MainQueue::new();
        let handle = queue.handle();
        let inner = queue.handle();
        let count = Arc::new(AtomicUsize::new(0));
        let inner_count = Arc::clone(&count);

        handle.post(move || {
            inner.post(move || {
                inner_count.fetch_add(1, Ordering::SeqCst);
            });
        });

        assert_eq!(queue.run_pending(), 1);
        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert_eq!(queue.pending(), 1);

        assert_eq!(queue.run_pending(), 1);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn waker_fires_on_every_post() {
        let wakes = Arc::new(AtomicUsize::new(0));
        let waker_wakes = Arc::clone(&wakes);
        let queue = MainQueue::with_waker(move || {
            waker_wakes.fetch_add(1, Ordering::SeqCst);
        });
        let handle = queue.handle();

        handle.post(|| {});
        handle.post(|| {});

        assert_eq!(wakes.load(Ordering::SeqCst), 2);
        assert_eq!(queue.run_pending(), 2);
    }

    #[test]
    fn post_reports_a_dropped_queue() {
        let queue = MainQueue::new();
        let handle = queue.handle();

        drop(queue);

        assert!(!handle.post(|| {}));
    }

    #[test]
    fn run_until_waits_for_worker_posts() {
        let queue = MainQueue::new();
        let handle = queue.handle();
        let done = Arc::new(AtomicUsize::new(0));
        let worker_done = Arc::clone(&done);

        let worker = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            handle.post(move || {
                worker_done.store(1, Ordering::SeqCst);
            });
        });

        let satisfied = queue.run_until(
            || done.load(Ordering::SeqCst) == 1,
            Duration::from_secs(5),
        );

        worker.join().unwrap();
        assert!(satisfied);
    }

    #[test]
    fn run_until_times_out() {
        let queue = MainQueue::new();

        let satisfied = queue.run_until(|| false, Duration::from_millis(20));

        assert!(!satisfied);
    }
}
