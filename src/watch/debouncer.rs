//! Event debouncing for watch mode.
//!
//! Change notifications arrive in bursts (editors write, rename, and
//! chmod in quick succession). Paths are coalesced under one mutex-guarded
//! pending set with a restartable deadline: every new event pushes the
//! deadline out, and only a full quiet period flushes the set, atomically,
//! into a single handler call.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::{Arc, Condvar, Mutex};
use std::thread;
use std::time::{Duration, Instant};

struct State {
    pending: HashSet<PathBuf>,
    deadline: Option<Instant>,
    shutdown: bool,
}

struct Inner {
    delay: Duration,
    state: Mutex<State>,
    wakeup: Condvar,
}

/// Coalesces added paths and invokes the handler after a quiet period.
pub struct Debouncer {
    inner: Arc<Inner>,
    worker: Option<thread::JoinHandle<()>>,
}

/// Cloneable handle for feeding paths into a [`Debouncer`].
pub struct DebouncePump {
    inner: Arc<Inner>,
}

impl Debouncer {
    /// Spawn the flush worker. Handler errors are logged; they never stop
    /// the debouncer.
    pub fn new<F>(delay: Duration, mut handler: F) -> Self
    where
        F: FnMut(Vec<PathBuf>) -> anyhow::Result<()> + Send + 'static,
    {
        let inner = Arc::new(Inner {
            delay,
            state: Mutex::new(State {
                pending: HashSet::new(),
                deadline: None,
                shutdown: false,
            }),
            wakeup: Condvar::new(),
        });

        let worker_inner = Arc::clone(&inner);
        let worker = thread::spawn(move || {
            let mut guard = worker_inner.state.lock().unwrap();
            loop {
                if guard.shutdown {
                    return;
                }
                match guard.deadline {
                    None => {
                        guard = worker_inner.wakeup.wait(guard).unwrap();
                    }
                    Some(deadline) => {
                        let now = Instant::now();
                        if now < deadline {
                            let (next, _) = worker_inner
                                .wakeup
                                .wait_timeout(guard, deadline - now)
                                .unwrap();
                            guard = next;
                        } else {
                            let mut batch: Vec<PathBuf> = guard.pending.drain().collect();
                            guard.deadline = None;
                            drop(guard);

                            if !batch.is_empty() {
                                batch.sort();
                                if let Err(err) = handler(batch) {
                                    eprintln!("watch handler error: {}", err);
                                }
                            }

                            guard = worker_inner.state.lock().unwrap();
                        }
                    }
                }
            }
        });

        Self {
            inner,
            worker: Some(worker),
        }
    }

    pub fn pump(&self) -> DebouncePump {
        DebouncePump {
            inner: Arc::clone(&self.inner),
        }
    }

    /// Cancel any pending flush and stop the worker. Pending paths are
    /// dropped, not flushed.
    pub fn stop(&mut self) {
        {
            let mut state = self.inner.state.lock().unwrap();
            state.shutdown = true;
            state.deadline = None;
            state.pending.clear();
        }
        self.inner.wakeup.notify_all();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.stop();
    }
}

impl DebouncePump {
    /// Add a path and restart the quiet-period timer.
    pub fn add(&self, path: PathBuf) {
        let mut state = self.inner.state.lock().unwrap();
        if state.shutdown {
            return;
        }
        state.pending.insert(path);
        state.deadline = Some(Instant::now() + self.inner.delay);
        drop(state);
        self.inner.wakeup.notify_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collecting_debouncer(delay: Duration) -> (Debouncer, Arc<Mutex<Vec<Vec<PathBuf>>>>) {
        let flushes: Arc<Mutex<Vec<Vec<PathBuf>>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&flushes);
        let debouncer = Debouncer::new(delay, move |paths| {
            sink.lock().unwrap().push(paths);
            Ok(())
        });
        (debouncer, flushes)
    }

    #[test]
    fn test_burst_coalesces_into_one_flush() {
        let (debouncer, flushes) = collecting_debouncer(Duration::from_millis(100));
        let pump = debouncer.pump();

        pump.add(PathBuf::from("a.go"));
        pump.add(PathBuf::from("b.go"));
        pump.add(PathBuf::from("a.go"));

        thread::sleep(Duration::from_millis(500));

        let flushes = flushes.lock().unwrap();
        assert_eq!(flushes.len(), 1);
        assert_eq!(flushes[0].len(), 2);
    }

    #[test]
    fn test_new_event_restarts_timer() {
        let (debouncer, flushes) = collecting_debouncer(Duration::from_millis(200));
        let pump = debouncer.pump();

        pump.add(PathBuf::from("a.go"));
        thread::sleep(Duration::from_millis(100));
        // Still inside the quiet period: this must reschedule, not flush.
        pump.add(PathBuf::from("b.go"));
        thread::sleep(Duration::from_millis(100));
        assert!(flushes.lock().unwrap().is_empty());

        thread::sleep(Duration::from_millis(400));
        let flushes = flushes.lock().unwrap();
        assert_eq!(flushes.len(), 1);
        assert_eq!(flushes[0].len(), 2);
    }

    #[test]
    fn test_stop_cancels_pending_flush() {
        let (mut debouncer, flushes) = collecting_debouncer(Duration::from_millis(200));
        let pump = debouncer.pump();

        pump.add(PathBuf::from("a.go"));
        debouncer.stop();
        thread::sleep(Duration::from_millis(400));

        assert!(flushes.lock().unwrap().is_empty());
    }

    #[test]
    fn test_handler_error_does_not_stop_worker() {
        let flushes: Arc<Mutex<Vec<usize>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&flushes);
        let debouncer = Debouncer::new(Duration::from_millis(50), move |paths| {
            sink.lock().unwrap().push(paths.len());
            anyhow::bail!("handler failed")
        });
        let pump = debouncer.pump();

        pump.add(PathBuf::from("a.go"));
        thread::sleep(Duration::from_millis(300));
        pump.add(PathBuf::from("b.go"));
        thread::sleep(Duration::from_millis(300));

        // Both flushes happened despite the errors.
        assert_eq!(flushes.lock().unwrap().len(), 2);
    }
}
