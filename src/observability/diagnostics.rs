//! Append-only diagnostic event log.
//!
//! # Responsibilities
//! - Record timestamped events with an optional structured payload
//! - Append each event to the log file in a single write
//! - Mirror every event to tracing
//!
//! # Record Format
//! ```text
//! [2025-08-09 12:00:00] <message>
//! data: <pretty-printed JSON payload>     (only when a payload is present)
//! -------------------------
//! ```
//!
//! # Design Decisions
//! - The file is opened with append semantics and writes are serialized
//!   behind a mutex, so concurrent requests never interleave records
//! - Write failures are reported through tracing and never fail a request
//! - Appends are blocking `std::fs` writes made in place on the async
//!   worker, one small `write_all` per record. Move them behind
//!   `spawn_blocking` if the log ever lives on slow storage

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{Local, NaiveDateTime};
use serde::Serialize;
use serde_json::Value;

use crate::config::DiagnosticsConfig;

/// Timestamp layout of a record header.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Line closing every record.
pub const RECORD_DELIMITER: &str = "-------------------------";

/// Source of event timestamps.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// Wall clock in the local timezone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// One entry of the diagnostic log.
#[derive(Debug, Clone, PartialEq)]
pub struct DiagnosticEvent {
    pub timestamp: NaiveDateTime,
    pub message: String,
    pub payload: Option<Value>,
}

impl DiagnosticEvent {
    /// Render the event as a complete log record, delimiter included.
    pub fn render(&self) -> String {
        let mut record = format!(
            "[{}] {}\n",
            self.timestamp.format(TIMESTAMP_FORMAT),
            self.message
        );
        if let Some(payload) = &self.payload {
            let data =
                serde_json::to_string_pretty(payload).unwrap_or_else(|_| payload.to_string());
            record.push_str("data: ");
            record.push_str(&data);
            record.push('\n');
        }
        record.push_str(RECORD_DELIMITER);
        record.push('\n');
        record
    }
}

enum Sink {
    File(File),
    Memory(Vec<DiagnosticEvent>),
    Discard,
}

/// Append-only recorder shared by every request.
pub struct DiagnosticLogger {
    clock: Arc<dyn Clock>,
    sink: Mutex<Sink>,
}

impl DiagnosticLogger {
    /// Open (or create) the log file at `path` for appending.
    pub fn open(path: impl AsRef<Path>, clock: Arc<dyn Clock>) -> io::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path.as_ref())?;
        Ok(Self {
            clock,
            sink: Mutex::new(Sink::File(file)),
        })
    }

    /// Keep events in memory; readable through [`DiagnosticLogger::events`].
    pub fn in_memory(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            sink: Mutex::new(Sink::Memory(Vec::new())),
        }
    }

    /// Only mirror events to tracing.
    pub fn disabled() -> Self {
        Self {
            clock: Arc::new(SystemClock),
            sink: Mutex::new(Sink::Discard),
        }
    }

    /// Build the logger described by the diagnostics configuration.
    pub fn from_config(config: &DiagnosticsConfig) -> io::Result<Self> {
        if config.enabled {
            Self::open(&config.log_path, Arc::new(SystemClock))
        } else {
            Ok(Self::disabled())
        }
    }

    /// Record an event without payload.
    pub fn log(&self, message: &str) {
        self.append(message, None);
    }

    /// Record an event with a structured payload.
    pub fn log_data<T: Serialize + ?Sized>(&self, message: &str, data: &T) {
        let payload = serde_json::to_value(data)
            .unwrap_or_else(|e| Value::String(format!("<unserializable payload: {}>", e)));
        self.append(message, Some(payload));
    }

    /// Events recorded so far. Empty unless the logger keeps events in memory.
    pub fn events(&self) -> Vec<DiagnosticEvent> {
        match &*self.lock() {
            Sink::Memory(events) => events.clone(),
            _ => Vec::new(),
        }
    }

    fn append(&self, message: &str, payload: Option<Value>) {
        match &payload {
            Some(p) => tracing::debug!(target: "steam_relay::diagnostics", payload = %p, "{}", message),
            None => tracing::debug!(target: "steam_relay::diagnostics", "{}", message),
        }

        let mut sink = self.lock();
        // Timestamp taken under the lock: write order matches timestamp order.
        let event = DiagnosticEvent {
            timestamp: self.clock.now(),
            message: message.to_string(),
            payload,
        };

        match &mut *sink {
            Sink::File(file) => {
                if let Err(e) = file.write_all(event.render().as_bytes()) {
                    tracing::warn!(error = %e, "Failed to append diagnostic event");
                }
            }
            Sink::Memory(events) => events.push(event),
            Sink::Discard => {}
        }
    }

    fn lock(&self) -> MutexGuard<'_, Sink> {
        // A panic mid-append leaves nothing half-mutated worth discarding.
        self.sink.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl std::fmt::Debug for DiagnosticLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sink = match &*self.lock() {
            Sink::File(_) => "file",
            Sink::Memory(_) => "memory",
            Sink::Discard => "discard",
        };
        f.debug_struct("DiagnosticLogger").field("sink", &sink).finish()
    }
}
