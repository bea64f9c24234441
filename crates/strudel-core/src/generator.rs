//! Manifest generation.
//!
//! Scans the immediate subfolders of a root directory for audio files
//! and writes `strudel.json` next to them. Scanning is exactly two
//! levels deep: the root and its direct children.

use crate::audio::is_audio_file;
use crate::error::{GenerateError, Result};
use crate::manifest::{Manifest, SampleEntry, BASE_KEY, MANIFEST_FILE_NAME};
use crate::url::UrlOptions;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::fs;
use tracing::{debug, info, warn};

/// A subfolder that could not be scanned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFolder {
    pub path: PathBuf,
    pub error: String,
}

/// Result of a successful generation.
#[derive(Debug, Clone)]
pub struct GenerateSummary {
    /// Where the manifest was written.
    pub output_path: PathBuf,

    /// The `_base` value written.
    pub base_url: String,

    /// Number of folders listed in the manifest.
    pub folders: usize,

    /// Number of audio files listed in the manifest.
    pub files: usize,

    /// Subfolders skipped because they could not be read.
    pub skipped: Vec<SkippedFolder>,

    /// Time taken in milliseconds.
    pub duration_ms: u64,
}

/// Generates `strudel.json` inside `root`.
///
/// The root is checked before the URL options, and both are checked
/// before anything is written. Any previous manifest is overwritten.
///
/// # Example
///
/// ```no_run
/// use strudel_core::{generate, UrlOptions};
/// use std::path::Path;
///
/// # async fn run() -> strudel_core::Result<()> {
/// let options = UrlOptions::with_github("alice", "kit", None);
/// let summary = generate(Path::new("./samples"), &options).await?;
/// println!("{} folders, {} files", summary.folders, summary.files);
/// # Ok(())
/// # }
/// ```
pub async fn generate(root: &Path, url: &UrlOptions) -> Result<GenerateSummary> {
    let start = Instant::now();

    check_root(root).await?;
    let base_url = url.resolve()?.base_url();

    let (manifest, skipped) = scan(root, base_url).await?;

    if manifest.folder_count() == 0 {
        warn!("No audio files found in the subdirectories of {}", root.display());
    }

    let output_path = write_manifest(root, &manifest).await?;
    let duration = start.elapsed();

    info!(
        "Wrote {} ({} folders, {} files) in {:?}",
        output_path.display(),
        manifest.folder_count(),
        manifest.file_count(),
        duration
    );

    Ok(GenerateSummary {
        output_path,
        base_url: manifest.base().to_string(),
        folders: manifest.folder_count(),
        files: manifest.file_count(),
        skipped,
        duration_ms: duration.as_millis() as u64,
    })
}

/// Makes sure `root` exists and is a directory.
pub async fn check_root(root: &Path) -> Result<()> {
    match fs::metadata(root).await {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(GenerateError::PathNotDirectory(root.to_path_buf())),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            Err(GenerateError::PathNotFound(root.to_path_buf()))
        }
        Err(e) => Err(GenerateError::io(root, e)),
    }
}

/// Builds the manifest for `root` without writing it.
///
/// Folders that fail to scan are logged, skipped, and returned
/// alongside the manifest.
pub async fn scan(root: &Path, base_url: String) -> Result<(Manifest, Vec<SkippedFolder>)> {
    let mut manifest = Manifest::new(base_url);
    let mut skipped = Vec::new();

    let folders = list_folders(root)
        .await
        .map_err(|source| GenerateError::RootScan {
            path: root.to_path_buf(),
            source,
        })?;

    for (name, path) in folders {
        if name == BASE_KEY {
            warn!("Skipping folder '{}': name is reserved", path.display());
            continue;
        }

        match list_audio_files(&name, &path).await {
            Ok(paths) => {
                debug!("Found {} audio files in {}", paths.len(), path.display());
                if let Some(entry) = SampleEntry::from_paths(paths) {
                    manifest.insert(name, entry);
                }
            }
            Err(e) => {
                warn!("Error scanning directory {}: {}", path.display(), e);
                skipped.push(SkippedFolder {
                    path,
                    error: e.to_string(),
                });
            }
        }
    }

    Ok((manifest, skipped))
}

/// Writes the manifest into `root`, replacing any existing file.
pub async fn write_manifest(root: &Path, manifest: &Manifest) -> Result<PathBuf> {
    let output_path = root.join(MANIFEST_FILE_NAME);

    let json = manifest.to_json().map_err(|e| GenerateError::Write {
        path: output_path.clone(),
        source: e.into(),
    })?;

    fs::write(&output_path, json)
        .await
        .map_err(|source| GenerateError::Write {
            path: output_path.clone(),
            source,
        })?;

    Ok(output_path)
}

/// Lists the subfolders of `root`, ordered by name.
async fn list_folders(root: &Path) -> std::io::Result<Vec<(String, PathBuf)>> {
    let mut folders = Vec::new();
    let mut entries = fs::read_dir(root).await?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();

        // Symlinks are not followed: a linked folder is not a folder
        let is_dir = entry
            .file_type()
            .await
            .map(|t| t.is_dir())
            .unwrap_or(false);
        if !is_dir {
            continue;
        }

        match entry.file_name().into_string() {
            Ok(name) => folders.push((name, path)),
            Err(_) => warn!("Skipping folder with non UTF-8 name: {}", path.display()),
        }
    }

    folders.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(folders)
}

/// Lists the audio files directly inside `dir` as `{folder}/{file}`.
async fn list_audio_files(folder: &str, dir: &Path) -> std::io::Result<Vec<String>> {
    let mut paths = Vec::new();
    let mut entries = fs::read_dir(dir).await?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();

        let is_file = entry
            .file_type()
            .await
            .map(|t| t.is_file())
            .unwrap_or(false);
        if !is_file || !is_audio_file(&path) {
            continue;
        }

        match entry.file_name().to_str() {
            Some(file) => paths.push(format!("{}/{}", folder, file)),
            None => warn!("Skipping file with non UTF-8 name: {}", path.display()),
        }
    }

    Ok(paths)
}
