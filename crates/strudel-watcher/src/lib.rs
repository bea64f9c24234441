//! Strudel Watcher - keeps strudel.json up to date
//!
//! This crate handles the live side of things:
//! - Watching the sample root and its direct children
//! - Debouncing bursts of filesystem events
//! - Regenerating the manifest once things settle
//!
//! Changes to `strudel.json` itself are ignored so a regeneration
//! never triggers another one.

mod debounce;
mod session;
mod watcher;

pub use debounce::{Debouncer, DEBOUNCE_DELAY};
pub use session::{run_loop, watch, WatchError, WatchSummary};
pub use watcher::{classify, EventSource, FileWatcher, WatchEvent};
