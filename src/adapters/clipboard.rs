//! Clipboard sinks for the exported document.
//!
//! A headless shell has no system clipboard, so "copy" means handing the text
//! to one of these. The editor never looks at the outcome beyond logging it.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::domain::{ClipboardError, ClipboardSink};

/// Writes the text to standard output.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutSink;

impl ClipboardSink for StdoutSink {
    fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(text.as_bytes())?;
        stdout.write_all(b"\n")?;
        stdout.flush()?;
        Ok(())
    }
}

/// Overwrites a file with the text on every copy.
#[derive(Debug, Clone)]
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ClipboardSink for FileSink {
    fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        std::fs::write(&self.path, text)?;
        Ok(())
    }
}

/// Drops everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct DiscardSink;

impl ClipboardSink for DiscardSink {
    fn write_text(&self, _text: &str) -> Result<(), ClipboardError> {
        Ok(())
    }
}

/// Keeps every copied text in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    entries: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recently copied text
    pub fn last(&self) -> Option<String> {
        self.entries.lock().ok()?.last().cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ClipboardSink for MemorySink {
    fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| ClipboardError::Unavailable("memory sink lock poisoned".to_string()))?;
        entries.push(text.to_string());
        Ok(())
    }
}
