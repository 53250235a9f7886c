//! Debounced file watching for watch mode.

mod debouncer;
mod watcher;

pub use debouncer::{DebouncePump, Debouncer};
pub use watcher::{FileWatcher, DEBOUNCE_DELAY};
