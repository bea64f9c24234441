//! Recognized audio formats.
//!
//! The set is closed: only these extensions end up in a manifest,
//! compared without regard to case.

use std::path::Path;

/// File extensions (without the dot) treated as audio samples.
pub const AUDIO_EXTENSIONS: &[&str] = &["wav", "mp3", "flac", "aiff"];

/// Checks if a file extension is a recognized audio format.
pub fn is_audio_extension(extension: &str) -> bool {
    let lower = extension.to_lowercase();
    AUDIO_EXTENSIONS.contains(&lower.as_str())
}

/// Checks if a path ends in a recognized audio extension.
pub fn is_audio_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(is_audio_extension)
        .unwrap_or(false)
}
