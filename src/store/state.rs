//! Durable state file persistence
//!
//! The state file is a single JSON object mapping fingerprint to result.
//! Loading is lenient (anything unreadable becomes an empty cache), saving
//! replaces the whole file.

use crate::error::{MemoError, MemoResult};
use crate::fingerprint::Fingerprint;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Fingerprint → result mapping as stored on disk
pub type Entries = BTreeMap<String, Value>;

/// Default state file name, relative to the working directory
pub const DEFAULT_STATE_FILE: &str = "state.json";

/// Default indentation width of the state file
pub const DEFAULT_INDENT: usize = 4;

/// Location and layout of a state file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateFile {
    path: PathBuf,
    indent: usize,
}

impl StateFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            indent: DEFAULT_INDENT,
        }
    }

    /// Set the indentation width used when saving
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn indent(&self) -> usize {
        self.indent
    }

    /// Read entries, treating a missing or corrupt file as empty
    pub fn load_or_empty(&self) -> Entries {
        if !self.path.exists() {
            debug!("No state file at {}, starting empty", self.path.display());
            return Entries::new();
        }

        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) => {
                warn!(
                    "Cannot read state file {}, starting empty: {}",
                    self.path.display(),
                    e
                );
                return Entries::new();
            }
        };

        match serde_json::from_str::<Entries>(&content) {
            Ok(entries) => {
                debug!(
                    "Loaded {} entries from {}",
                    entries.len(),
                    self.path.display()
                );
                entries
            }
            Err(e) => {
                warn!(
                    "Ignoring corrupt state file {}: {}",
                    self.path.display(),
                    e
                );
                Entries::new()
            }
        }
    }

    /// Read entries strictly, failing on anything but a well-formed file
    ///
    /// Every key must be a valid fingerprint.
    pub fn load_strict(&self) -> MemoResult<Entries> {
        let content = fs::read_to_string(&self.path).map_err(|e| {
            MemoError::io(format!("reading state file {}", self.path.display()), e)
        })?;

        let value: Value = serde_json::from_str(&content)
            .map_err(|e| MemoError::state_invalid(&self.path, e.to_string()))?;

        let Value::Object(map) = value else {
            return Err(MemoError::state_invalid(
                &self.path,
                "top-level value is not an object",
            ));
        };

        for key in map.keys() {
            key.parse::<Fingerprint>().map_err(|_| {
                MemoError::state_invalid(&self.path, format!("key is not a fingerprint: {}", key))
            })?;
        }

        Ok(map.into_iter().collect())
    }

    /// Overwrite the state file with `entries`
    ///
    /// Writes a sibling temp file first and renames it over the target, so
    /// a failed save leaves the previous state intact.
    pub fn save(&self, entries: &Entries) -> MemoResult<()> {
        self.write(entries).map_err(|source| MemoError::Save {
            path: self.path.clone(),
            source,
        })
    }

    fn write(&self, entries: &Entries) -> io::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let indent = " ".repeat(self.indent);
        let mut buf = Vec::new();
        let formatter = PrettyFormatter::with_indent(indent.as_bytes());
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        entries
            .serialize(&mut ser)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        let tmp = self.temp_path();
        let mut file = fs::File::create(&tmp)?;
        file.write_all(&buf)?;
        file.sync_all()?;
        drop(file);

        fs::rename(&tmp, &self.path)
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| DEFAULT_STATE_FILE.into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl Default for StateFile {
    fn default() -> Self {
        Self::new(DEFAULT_STATE_FILE)
    }
}
