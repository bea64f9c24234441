//! The watch loop.
//!
//! Generates once, then regenerates the manifest whenever the
//! debounce timer fires after a burst of filesystem events.

use crate::debounce::Debouncer;
use crate::watcher::{EventSource, FileWatcher};
use std::future::Future;
use std::path::Path;
use strudel_core::{check_root, generate, GenerateError, GenerateSummary, UrlOptions};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that stop watch mode from starting.
#[derive(Error, Debug)]
pub enum WatchError {
    #[error(transparent)]
    Generate(#[from] GenerateError),

    #[error("failed to watch directory: {0}")]
    Notify(#[from] notify::Error),
}

/// Counters for a finished watch session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WatchSummary {
    /// Relevant filesystem events received.
    pub events: usize,

    /// Regenerations attempted, including the initial one.
    pub regenerations: usize,

    /// Regenerations that returned an error.
    pub failures: usize,
}

/// Watches `root` and keeps its manifest up to date until `shutdown`
/// resolves.
///
/// The root and URL options are validated up front. A failing initial
/// generation past that point is reported but does not prevent
/// watching.
pub async fn watch<S>(
    root: &Path,
    url: &UrlOptions,
    shutdown: S,
) -> Result<WatchSummary, WatchError>
where
    S: Future<Output = ()>,
{
    check_root(root).await?;
    url.resolve()?;

    let mut summary = WatchSummary::default();
    record(&mut summary, generate(root, url).await);

    let watcher = FileWatcher::new(root)?;

    let looped = run_loop(watcher, Debouncer::default(), shutdown, || generate(root, url)).await;

    info!("Stopped watching {}", root.display());

    Ok(WatchSummary {
        events: looped.events,
        regenerations: summary.regenerations + looped.regenerations,
        failures: summary.failures + looped.failures,
    })
}

/// Drives the debounce loop over an event source.
///
/// Each event re-arms the timer; `regenerate` runs when it fires.
/// Events arriving during a regeneration queue up and schedule a
/// follow-up. Returns when `shutdown` resolves or the source closes.
/// Dropping `events` on return closes the subscription.
pub async fn run_loop<E, S, F, Fut>(
    mut events: E,
    mut debouncer: Debouncer,
    shutdown: S,
    mut regenerate: F,
) -> WatchSummary
where
    E: EventSource,
    S: Future<Output = ()>,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<GenerateSummary, GenerateError>>,
{
    let mut summary = WatchSummary::default();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            biased;

            _ = &mut shutdown => {
                if debouncer.cancel() {
                    debug!("Dropping pending regeneration");
                }
                break;
            }

            event = events.next_event() => match event {
                Some(event) => {
                    info!("{}", event);
                    summary.events += 1;
                    debouncer.schedule();
                }
                None => {
                    debug!("Event source closed");
                    break;
                }
            },

            _ = debouncer.fired() => {
                info!("Regenerating strudel.json...");
                record(&mut summary, regenerate().await);
            }
        }
    }

    summary
}

fn record(summary: &mut WatchSummary, result: Result<GenerateSummary, GenerateError>) {
    summary.regenerations += 1;
    if let Err(e) = result {
        warn!("Regeneration failed: {}", e);
        summary.failures += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::watcher::WatchEvent;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::{mpsc, oneshot};
    use tokio::task::JoinHandle;
    use tokio::time::sleep;

    const WINDOW: Duration = crate::debounce::DEBOUNCE_DELAY;

    fn fake_summary() -> GenerateSummary {
        GenerateSummary {
            output_path: PathBuf::from("/samples/strudel.json"),
            base_url: "https://example.com/".into(),
            folders: 0,
            files: 0,
            skipped: Vec::new(),
            duration_ms: 0,
        }
    }

    fn added(name: &str) -> WatchEvent {
        WatchEvent::FileAdded(PathBuf::from("/samples").join(name))
    }

    struct Harness {
        events: mpsc::UnboundedSender<WatchEvent>,
        stop: oneshot::Sender<()>,
        runs: Arc<AtomicUsize>,
        task: JoinHandle<WatchSummary>,
    }

    /// Spawns the loop with a regeneration that counts calls and fails
    /// when `fail` is set.
    fn spawn_loop(fail: bool) -> Harness {
        let (tx, rx) = mpsc::unbounded_channel();
        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        let runs = Arc::new(AtomicUsize::new(0));

        let counter = runs.clone();
        let task = tokio::spawn(async move {
            let shutdown = async {
                let _ = stop_rx.await;
            };
            run_loop(rx, Debouncer::default(), shutdown, move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    if fail {
                        Err(GenerateError::PathNotFound(PathBuf::from("/samples")))
                    } else {
                        Ok(fake_summary())
                    }
                }
            })
            .await
        });

        Harness {
            events: tx,
            stop: stop_tx,
            runs,
            task,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_coalesces_into_one_regeneration() {
        let h = spawn_loop(false);

        for i in 0..5 {
            h.events.send(added(&format!("{}.wav", i))).unwrap();
        }
        sleep(WINDOW + Duration::from_millis(500)).await;

        assert_eq!(h.runs.load(Ordering::SeqCst), 1);

        h.stop.send(()).unwrap();
        let summary = h.task.await.unwrap();
        assert_eq!(summary.events, 5);
        assert_eq!(summary.regenerations, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_spaced_events_regenerate_each_time() {
        let h = spawn_loop(false);

        for i in 0..3 {
            h.events.send(added(&format!("{}.wav", i))).unwrap();
            sleep(WINDOW + Duration::from_millis(500)).await;
        }

        assert_eq!(h.runs.load(Ordering::SeqCst), 3);
        h.stop.send(()).unwrap();
        assert_eq!(h.task.await.unwrap().regenerations, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_event_restarts_the_window() {
        let h = spawn_loop(false);
        let step = Duration::from_millis(600);

        h.events.send(added("a.wav")).unwrap();
        sleep(step).await;
        h.events.send(added("b.wav")).unwrap();
        sleep(step).await;

        // 1200ms after the first event, but only 600ms after the second
        assert_eq!(h.runs.load(Ordering::SeqCst), 0);

        sleep(step).await;
        assert_eq!(h.runs.load(Ordering::SeqCst), 1);

        h.stop.send(()).unwrap();
        h.task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_regeneration_keeps_loop_alive() {
        let h = spawn_loop(true);

        h.events.send(added("a.wav")).unwrap();
        sleep(WINDOW * 2).await;
        h.events.send(added("b.wav")).unwrap();
        sleep(WINDOW * 2).await;

        assert_eq!(h.runs.load(Ordering::SeqCst), 2);

        h.stop.send(()).unwrap();
        let summary = h.task.await.unwrap();
        assert_eq!(summary.regenerations, 2);
        assert_eq!(summary.failures, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_drops_pending_regeneration() {
        let h = spawn_loop(false);

        h.events.send(added("a.wav")).unwrap();
        sleep(Duration::from_millis(100)).await;
        h.stop.send(()).unwrap();

        let summary = h.task.await.unwrap();
        assert_eq!(summary.events, 1);
        assert_eq!(summary.regenerations, 0);
        assert_eq!(h.runs.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_closed_source_ends_loop() {
        let h = spawn_loop(false);
        drop(h.events);

        let summary = h.task.await.unwrap();
        assert_eq!(summary, WatchSummary::default());
    }

    #[tokio::test]
    async fn test_watch_rejects_missing_url_source() {
        let dir = tempfile::tempdir().unwrap();
        let result = watch(dir.path(), &UrlOptions::default(), async {}).await;
        assert!(matches!(
            result,
            Err(WatchError::Generate(GenerateError::MissingUrlSource))
        ));
        assert!(!dir.path().join(strudel_core::MANIFEST_FILE_NAME).exists());
    }

    #[tokio::test]
    async fn test_watch_rejects_file_root() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("notes.txt");
        std::fs::write(&file, b"").unwrap();

        let url = UrlOptions::with_base_url("https://example.com");
        let result = tokio::time::timeout(
            Duration::from_secs(5),
            watch(&file, &url, std::future::pending::<()>()),
        )
        .await
        .expect("watch returns instead of idling");

        assert!(matches!(
            result,
            Err(WatchError::Generate(GenerateError::PathNotDirectory(_)))
        ));
    }

    #[tokio::test]
    async fn test_watch_rejects_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        let url = UrlOptions::with_base_url("https://example.com");

        let result = watch(&dir.path().join("missing"), &url, std::future::pending::<()>()).await;
        assert!(matches!(
            result,
            Err(WatchError::Generate(GenerateError::PathNotFound(_)))
        ));
    }

    #[tokio::test]
    async fn test_watch_regenerates_after_a_change_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().to_path_buf();
        let manifest = root.join(strudel_core::MANIFEST_FILE_NAME);
        let url = UrlOptions::with_base_url("https://example.com");

        // Runs once the watcher is installed: add a sample, then give the
        // debounce window time to pass before stopping.
        let changes = async {
            sleep(Duration::from_millis(300)).await;
            std::fs::create_dir(root.join("bd")).unwrap();
            std::fs::write(root.join("bd/kick.wav"), b"").unwrap();
            sleep(WINDOW * 3).await;
        };

        let summary = watch(&root, &url, changes).await.unwrap();

        assert!(summary.events >= 1);
        assert!(summary.regenerations >= 2);
        assert_eq!(summary.failures, 0);
        let raw = std::fs::read_to_string(&manifest).unwrap();
        assert!(raw.contains("\"bd\": \"bd/kick.wav\""));
    }

    #[tokio::test]
    async fn test_watch_generates_before_watching() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("bd")).unwrap();
        std::fs::write(dir.path().join("bd/kick.wav"), b"").unwrap();

        let url = UrlOptions::with_base_url("https://example.com");
        let summary = watch(dir.path(), &url, async {}).await.unwrap();

        assert_eq!(summary.regenerations, 1);
        assert_eq!(summary.failures, 0);
        let raw = std::fs::read_to_string(dir.path().join(strudel_core::MANIFEST_FILE_NAME)).unwrap();
        assert!(raw.contains("\"bd\": \"bd/kick.wav\""));
    }
}
