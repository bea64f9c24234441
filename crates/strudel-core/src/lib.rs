//! Strudel Core - sample folder scanning and manifest generation
//!
//! This crate turns a directory of sample folders into a `strudel.json`
//! manifest. Each immediate subfolder holding audio files becomes a key;
//! its value is the relative path of the single file, or a sorted list
//! of paths when there are several. The `_base` key carries the URL the
//! paths are resolved against.
//!
//! # Example
//!
//! ```no_run
//! use strudel_core::{generate, UrlOptions};
//! use std::path::Path;
//!
//! # async fn run() -> strudel_core::Result<()> {
//! let options = UrlOptions::with_base_url("https://example.com/samples");
//! let summary = generate(Path::new("./samples"), &options).await?;
//! println!("Wrote {}", summary.output_path.display());
//! # Ok(())
//! # }
//! ```

pub mod audio;
pub mod error;
pub mod generator;
pub mod manifest;
pub mod url;

pub use audio::{is_audio_extension, is_audio_file, AUDIO_EXTENSIONS};
pub use error::{GenerateError, Result};
pub use generator::{check_root, generate, scan, write_manifest, GenerateSummary, SkippedFolder};
pub use manifest::{Manifest, SampleEntry, BASE_KEY, MANIFEST_FILE_NAME};
pub use url::{UrlOptions, UrlSource, DEFAULT_BRANCH, GITHUB_RAW_HOST};
