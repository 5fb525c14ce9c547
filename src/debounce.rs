//! Latest-wins debouncing for interactive re-cropping.
//!
//! A slider being dragged produces a burst of crop requests. Only the last one
//! in a burst is worth computing. [`Debouncer`] keeps a single pending slot:
//! each [`submit`](Debouncer::submit) overwrites it and restarts the quiet
//! window, and a worker thread runs the handler once the window elapses with
//! no newer request.
//!
//! The mutex guards only the slot. The handler itself runs unlocked, so
//! submissions never wait on a crop in progress; a request that arrives while
//! the handler runs simply becomes the next pending one.
//!
//! A panicking handler is caught and logged; the worker keeps serving later
//! requests and [`flush`](Debouncer::flush) still returns.

use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

struct Slot<T> {
    pending: Option<(T, Instant)>,
    running: bool,
    shutdown: bool,
}

struct Shared<T> {
    slot: Mutex<Slot<T>>,
    signal: Condvar,
    window: Duration,
}

impl<T> Shared<T> {
    fn lock(&self) -> MutexGuard<'_, Slot<T>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn wait<'a>(&self, guard: MutexGuard<'a, Slot<T>>) -> MutexGuard<'a, Slot<T>> {
        self.signal
            .wait(guard)
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Runs `handler` on the most recent request after a quiet period.
pub struct Debouncer<T: Send + 'static> {
    shared: Arc<Shared<T>>,
    worker: Option<JoinHandle<()>>,
}

impl<T: Send + 'static> Debouncer<T> {
    pub fn new<F>(window: Duration, handler: F) -> Self
    where
        F: FnMut(T) + Send + 'static,
    {
        let shared = Arc::new(Shared {
            slot: Mutex::new(Slot {
                pending: None,
                running: false,
                shutdown: false,
            }),
            signal: Condvar::new(),
            window,
        });

        let worker_shared = Arc::clone(&shared);
        let worker = std::thread::spawn(move || run_worker(&worker_shared, handler));

        Self {
            shared,
            worker: Some(worker),
        }
    }

    /// Replace any pending request with `request` and restart the window.
    pub fn submit(&self, request: T) {
        let mut slot = self.shared.lock();
        if slot.shutdown {
            log::warn!("debounce worker has stopped, request dropped");
            return;
        }
        if slot.pending.is_some() {
            log::debug!("debounce: superseding pending request");
        }
        slot.pending = Some((request, Instant::now() + self.shared.window));
        drop(slot);
        self.shared.signal.notify_all();
    }

    /// Block until no request is pending and the handler is idle.
    pub fn flush(&self) {
        let mut slot = self.shared.lock();
        while (slot.pending.is_some() || slot.running) && !slot.shutdown {
            slot = self.shared.wait(slot);
        }
    }
}

impl<T: Send + 'static> Drop for Debouncer<T> {
    fn drop(&mut self) {
        self.shared.lock().shutdown = true;
        self.shared.signal.notify_all();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::error!("debounce worker panicked");
            }
        }
    }
}

/// Marks the debouncer shut down when the worker exits for any reason, so
/// [`Debouncer::flush`] never waits on a thread that is gone.
struct WorkerExit<'a, T>(&'a Shared<T>);

impl<T> Drop for WorkerExit<'_, T> {
    fn drop(&mut self) {
        let mut slot = self.0.lock();
        slot.shutdown = true;
        slot.running = false;
        drop(slot);
        self.0.signal.notify_all();
    }
}

fn run_worker<T, F>(shared: &Shared<T>, mut handler: F)
where
    F: FnMut(T),
{
    let _exit = WorkerExit(shared);
    let mut slot = shared.lock();
    loop {
        if slot.shutdown {
            return;
        }

        let Some(deadline) = slot.pending.as_ref().map(|(_, deadline)| *deadline) else {
            slot = shared.wait(slot);
            continue;
        };

        let now = Instant::now();
        if now < deadline {
            slot = shared
                .signal
                .wait_timeout(slot, deadline - now)
                .map(|(guard, _)| guard)
                .unwrap_or_else(|e| e.into_inner().0);
            continue;
        }

        let Some((request, _)) = slot.pending.take() else {
            continue;
        };
        slot.running = true;
        drop(slot);

        if panic::catch_unwind(AssertUnwindSafe(|| handler(request))).is_err() {
            log::error!("debounce handler panicked, request dropped");
        }

        slot = shared.lock();
        slot.running = false;
        shared.signal.notify_all();
    }
}
