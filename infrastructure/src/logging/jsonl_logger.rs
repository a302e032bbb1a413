//! JSONL transcript writer.
//!
//! Each [`TranscriptRecord`] becomes one JSON line carrying its `type` and
//! a `timestamp`, appended through a buffered writer.

use roundtable_application::{TranscriptLogger, TranscriptRecord};
use serde_json::{Map, Value};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

/// Append-only JSONL transcript.
///
/// Thread-safe via `Mutex<BufWriter<File>>`. Flushes after every record and
/// on `Drop`.
pub struct JsonlTranscriptLogger {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl JsonlTranscriptLogger {
    /// Open (or create) `path` for appending.
    ///
    /// Returns `None` if the file cannot be opened; transcripts are optional.
    pub fn new(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            warn!(
                "Could not create transcript directory {}: {}",
                parent.display(),
                e
            );
            return None;
        }

        let file = match OpenOptions::new().create(true).append(true).open(path) {
            Ok(f) => f,
            Err(e) => {
                warn!("Could not open transcript file {}: {}", path.display(), e);
                return None;
            }
        };

        Some(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path: path.to_path_buf(),
        })
    }

    /// `<directory>/transcript-<YYYY-mm-dd>.jsonl`
    pub fn in_directory(directory: impl AsRef<Path>) -> Option<Self> {
        let name = format!("transcript-{}.jsonl", chrono::Local::now().format("%Y-%m-%d"));
        Self::new(directory.as_ref().join(name))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Merge `type` and `timestamp` into an object payload, or wrap anything else.
fn to_line(record: TranscriptRecord) -> Option<String> {
    let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);
    let value = match record.payload {
        Value::Object(mut map) => {
            map.insert("type".to_string(), Value::from(record.event_type));
            map.insert("timestamp".to_string(), Value::from(timestamp));
            Value::Object(map)
        }
        other => {
            let mut map = Map::new();
            map.insert("type".to_string(), Value::from(record.event_type));
            map.insert("timestamp".to_string(), Value::from(timestamp));
            map.insert("data".to_string(), other);
            Value::Object(map)
        }
    };
    serde_json::to_string(&value).ok()
}

impl TranscriptLogger for JsonlTranscriptLogger {
    fn log(&self, record: TranscriptRecord) {
        let Some(line) = to_line(record) else {
            return;
        };
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", line);
            let _ = writer.flush();
        }
    }
}

impl Drop for JsonlTranscriptLogger {
    fn drop(&mut self) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writer.flush();
        }
    }
}
