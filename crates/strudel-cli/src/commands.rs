//! CLI command implementations.

use colored::Colorize;
use std::future::Future;
use std::path::Path;
use strudel_core::{GenerateSummary, UrlOptions, MANIFEST_FILE_NAME};
use tokio::signal;
use tokio::sync::oneshot;

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Generate strudel.json once.
pub async fn generate(root: &Path, url: &UrlOptions) -> Result<()> {
    let summary = strudel_core::generate(root, url).await?;
    report(root, &summary);
    Ok(())
}

/// Generate, then keep regenerating on changes until interrupted.
pub async fn watch(root: &Path, url: &UrlOptions) -> Result<()> {
    println!(
        "{} Watch mode enabled. Monitoring '{}' for changes...",
        "🔍".cyan(),
        root.display()
    );
    println!("  Press {} to stop\n", "Ctrl+C".cyan());

    let shutdown = listen_for_shutdown(shutdown_signal());
    let summary = strudel_watcher::watch(root, url, shutdown).await?;

    println!("\n{} Stopping watch mode...", "👋".cyan());
    println!(
        "  {} regenerations ({} failed), {} file events",
        summary.regenerations, summary.failures, summary.events
    );

    Ok(())
}

fn report(root: &Path, summary: &GenerateSummary) {
    println!(
        "{} Successfully generated '{}' inside '{}' ({} folders, {} files) in {}ms",
        "✓".green(),
        MANIFEST_FILE_NAME,
        root.display(),
        summary.folders.to_string().cyan(),
        summary.files.to_string().cyan(),
        summary.duration_ms
    );

    if summary.folders == 0 {
        eprintln!(
            "{} No audio files found in the subdirectories of the specified path.",
            "⚠ Warning:".yellow()
        );
        eprintln!(
            "  - Samples must sit one level down, e.g. {}",
            "samples/bd/kick.wav".cyan()
        );
        eprintln!(
            "  - Recognized extensions: {}",
            strudel_core::AUDIO_EXTENSIONS
                .iter()
                .map(|e| format!(".{}", e))
                .collect::<Vec<_>>()
                .join(", ")
        );
    }

    if !summary.skipped.is_empty() {
        println!("\n{} folders could not be scanned:", "⚠".yellow());
        for folder in &summary.skipped {
            println!("  {} - {}", folder.path.display().to_string().red(), folder.error);
        }
    }
}

/// Starts waiting on `signal` right away in a background task.
///
/// The signal handlers are installed before the initial generation, so
/// an interrupt during the first scan still ends watch mode cleanly.
fn listen_for_shutdown<F>(signal: F) -> impl Future<Output = ()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
        signal.await;
        let _ = tx.send(());
    });
    async move {
        let _ = rx.await;
    }
}

/// Resolves on Ctrl+C, or SIGTERM on unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
