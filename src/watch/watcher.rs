//! File-system watching for watch mode.
//!
//! A notify recommended watcher pushes raw events into a channel; a
//! forwarder thread filters them down to relevant Go files and feeds the
//! debouncer. Closing releases the watches, drains the forwarder, and
//! cancels any pending flush, in that order.

use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use super::debouncer::Debouncer;

/// Quiet period before accumulated changes trigger a re-analysis.
pub const DEBOUNCE_DELAY: Duration = Duration::from_millis(500);

pub struct FileWatcher {
    watcher: RecommendedWatcher,
    forwarder: Option<thread::JoinHandle<()>>,
    debouncer: Debouncer,
    watched: Vec<PathBuf>,
}

impl FileWatcher {
    /// Watch the given roots recursively and hand debounced batches of
    /// changed Go files to `handler`.
    pub fn watch<F>(paths: &[PathBuf], include_tests: bool, handler: F) -> anyhow::Result<Self>
    where
        F: FnMut(Vec<PathBuf>) -> anyhow::Result<()> + Send + 'static,
    {
        let debouncer = Debouncer::new(DEBOUNCE_DELAY, handler);
        let pump = debouncer.pump();

        let (tx, rx) = crossbeam_channel::unbounded::<notify::Event>();
        let mut watcher = RecommendedWatcher::new(
            move |res: Result<notify::Event, notify::Error>| match res {
                Ok(event) => {
                    let _ = tx.send(event);
                }
                Err(err) => eprintln!("file watcher error: {}", err),
            },
            notify::Config::default(),
        )?;

        for path in paths {
            watcher.watch(path, RecursiveMode::Recursive)?;
        }

        // The forwarder drains when the watcher (and so the sender) drops.
        let forwarder = thread::spawn(move || {
            for event in rx {
                if !matches!(
                    event.kind,
                    EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
                ) {
                    continue;
                }
                for path in event.paths {
                    if is_watchable(&path, include_tests) {
                        pump.add(path);
                    }
                }
            }
        });

        Ok(Self {
            watcher,
            forwarder: Some(forwarder),
            debouncer,
            watched: paths.to_vec(),
        })
    }

    pub fn watched_paths(&self) -> &[PathBuf] {
        &self.watched
    }

    /// Release the watches and stop all workers. Every exit path of watch
    /// mode must come through here so no timer or thread outlives the run.
    pub fn close(self) {
        let FileWatcher {
            mut watcher,
            forwarder,
            mut debouncer,
            watched,
        } = self;

        for path in &watched {
            let _ = watcher.unwatch(path);
        }
        drop(watcher);
        if let Some(forwarder) = forwarder {
            let _ = forwarder.join();
        }
        debouncer.stop();
    }
}

/// Files worth re-analyzing: Go sources, minus editor droppings and
/// hidden files, with test files included only on request.
fn is_watchable(path: &Path, include_tests: bool) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    if name.starts_with('.') {
        return false;
    }
    if name.ends_with(".tmp") || name.ends_with("~") || name.ends_with(".swp") || name.ends_with(".swo") {
        return false;
    }
    if !name.ends_with(".go") {
        return false;
    }
    if name.ends_with("_test.go") {
        return include_tests;
    }
    true
}
