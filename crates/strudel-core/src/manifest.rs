//! Manifest representation.
//!
//! A manifest maps folder names to the audio files inside them, plus
//! the reserved `_base` key. Folder order is kept as inserted, so the
//! JSON output is stable for an unchanged directory tree.

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

/// Name of the manifest file written at the root.
pub const MANIFEST_FILE_NAME: &str = "strudel.json";

/// Reserved key holding the base URL.
pub const BASE_KEY: &str = "_base";

/// The audio files of one folder.
///
/// Serializes as a bare string for a single file and as an array
/// otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SampleEntry {
    Single(String),
    Multiple(Vec<String>),
}

impl SampleEntry {
    /// Builds an entry from the relative paths found in a folder.
    ///
    /// Returns None for an empty folder. Multiple paths are sorted.
    pub fn from_paths(mut paths: Vec<String>) -> Option<Self> {
        match paths.len() {
            0 => None,
            1 => paths.pop().map(Self::Single),
            _ => {
                paths.sort();
                Some(Self::Multiple(paths))
            }
        }
    }

    /// Number of files in this entry.
    pub fn len(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Multiple(paths) => paths.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates over the relative paths.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        let slice: &[String] = match self {
            Self::Single(path) => std::slice::from_ref(path),
            Self::Multiple(paths) => paths,
        };
        slice.iter().map(String::as_str)
    }
}

impl Serialize for SampleEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Single(path) => serializer.serialize_str(path),
            Self::Multiple(paths) => paths.serialize(serializer),
        }
    }
}

/// A complete `strudel.json` document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    base: String,
    folders: Vec<(String, SampleEntry)>,
}

impl Manifest {
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            folders: Vec::new(),
        }
    }

    /// The base URL stored under `_base`.
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Appends a folder. Later folders serialize after earlier ones.
    pub fn insert(&mut self, folder: impl Into<String>, entry: SampleEntry) {
        self.folders.push((folder.into(), entry));
    }

    /// Looks up a folder's entry by name.
    pub fn get(&self, folder: &str) -> Option<&SampleEntry> {
        self.folders
            .iter()
            .find(|(name, _)| name == folder)
            .map(|(_, entry)| entry)
    }

    /// Folders in insertion order.
    pub fn folders(&self) -> impl Iterator<Item = (&str, &SampleEntry)> {
        self.folders.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    pub fn folder_count(&self) -> usize {
        self.folders.len()
    }

    /// Total number of audio files across all folders.
    pub fn file_count(&self) -> usize {
        self.folders.iter().map(|(_, entry)| entry.len()).sum()
    }

    /// Renders the manifest the way it is written to disk: 4-space
    /// indentation and a trailing newline.
    pub fn to_json(&self) -> serde_json::Result<String> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut ser)?;
        buf.push(b'\n');
        // serde_json only ever emits UTF-8
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

impl Serialize for Manifest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.folders.len() + 1))?;
        map.serialize_entry(BASE_KEY, &self.base)?;
        for (name, entry) in &self.folders {
            map.serialize_entry(name, entry)?;
        }
        map.end()
    }
}
