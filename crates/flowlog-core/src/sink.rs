//! Output channels and level dispatch.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

/// Level requested by the caller of an entry point.
///
/// Level names come from flow configuration, so an unrecognised name is a
/// value rather than a parse error; it is degraded at dispatch time.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum LogLevel {
    /// Debug
    Debug,
    /// Info (default)
    #[default]
    Info,
    /// Warn
    Warn,
    /// Error
    Error,
    /// Fatal
    Fatal,
    /// Any level name the sinks do not know
    Other(String),
}

impl LogLevel {
    /// Textual name, upper case for known levels
    pub fn as_str(&self) -> &str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
            LogLevel::Fatal => "FATAL",
            LogLevel::Other(name) => name,
        }
    }

    /// Sink severity for this level, `None` if unmapped
    pub fn severity(&self) -> Option<Severity> {
        match self {
            LogLevel::Debug => Some(Severity::Debug),
            LogLevel::Info => Some(Severity::Info),
            LogLevel::Warn => Some(Severity::Warn),
            LogLevel::Error => Some(Severity::Error),
            LogLevel::Fatal => Some(Severity::Fatal),
            LogLevel::Other(_) => None,
        }
    }
}

impl FromStr for LogLevel {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_uppercase().as_str() {
            "DEBUG" => LogLevel::Debug,
            "INFO" => LogLevel::Info,
            "WARN" | "WARNING" => LogLevel::Warn,
            "ERROR" => LogLevel::Error,
            "FATAL" => LogLevel::Fatal,
            _ => LogLevel::Other(s.to_string()),
        })
    }
}

impl From<&str> for LogLevel {
    fn from(s: &str) -> Self {
        match s.parse() {
            Ok(level) => level,
            Err(never) => match never {},
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity understood by every sink
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Severity {
    /// Debug
    Debug,
    /// Info
    Info,
    /// Warn
    Warn,
    /// Error
    Error,
    /// Fatal
    Fatal,
}

/// Logical output channel
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Default channel
    #[default]
    Simple,
    /// High-volume channel, typically routed to its own appender
    Batch,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Simple => f.write_str("SIMPLE"),
            Channel::Batch => f.write_str("BATCH"),
        }
    }
}

/// Destination for serialized records.
///
/// Shared by every message in flight, so implementations must accept
/// concurrent calls and write each message as one unit.
pub trait LogSink: Send + Sync {
    /// Write one message at the given severity
    fn emit(&self, severity: Severity, message: &str);
}

/// Tracing target of the simple channel
pub const SIMPLE_TARGET: &str = "flowlog";

/// Tracing target of the batch channel
pub const BATCH_TARGET: &str = "flowlog::batch";

macro_rules! emit_at {
    ($target:expr, $severity:expr, $message:expr) => {
        match $severity {
            Severity::Debug => tracing::debug!(target: $target, "{}", $message),
            Severity::Info => tracing::info!(target: $target, "{}", $message),
            Severity::Warn => tracing::warn!(target: $target, "{}", $message),
            Severity::Error => tracing::error!(target: $target, "{}", $message),
            Severity::Fatal => tracing::error!(target: $target, fatal = true, "{}", $message),
        }
    };
}

/// Sink that forwards records to `tracing` under a per-channel target.
///
/// Tracing has no fatal level; fatal records go out as errors with
/// `fatal = true`.
#[derive(Clone, Copy, Debug)]
pub struct TracingSink {
    channel: Channel,
}

impl TracingSink {
    /// Sink for the given channel's target
    pub fn new(channel: Channel) -> Self {
        Self { channel }
    }

    /// Sink writing under [`SIMPLE_TARGET`]
    pub fn simple() -> Self {
        Self::new(Channel::Simple)
    }

    /// Sink writing under [`BATCH_TARGET`]
    pub fn batch() -> Self {
        Self::new(Channel::Batch)
    }
}

impl LogSink for TracingSink {
    fn emit(&self, severity: Severity, message: &str) {
        match self.channel {
            Channel::Simple => emit_at!(SIMPLE_TARGET, severity, message),
            Channel::Batch => emit_at!(BATCH_TARGET, severity, message),
        }
    }
}

/// One message captured by a [`MemorySink`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmittedLine {
    /// Severity it was written at
    pub severity: Severity,
    /// Message text
    pub message: String,
}

/// Sink that keeps everything in memory (for development/testing).
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<EmittedLine>>,
}

impl MemorySink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything emitted so far, in order
    pub fn lines(&self) -> Vec<EmittedLine> {
        self.lines
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Emitted messages that parse as JSON, in order
    pub fn records(&self) -> Vec<serde_json::Value> {
        self.lines()
            .iter()
            .filter_map(|line| serde_json::from_str(&line.message).ok())
            .collect()
    }

    /// Number of emitted messages
    pub fn len(&self) -> usize {
        self.lines
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    /// Whether nothing has been emitted
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forget everything emitted so far
    pub fn clear(&self) {
        self.lines
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clear();
    }
}

impl LogSink for MemorySink {
    fn emit(&self, severity: Severity, message: &str) {
        self.lines
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(EmittedLine {
                severity,
                message: message.to_string(),
            });
    }
}

/// Routes messages to the sink of the requested channel.
#[derive(Clone)]
pub struct SinkDispatcher {
    simple: Arc<dyn LogSink>,
    batch: Arc<dyn LogSink>,
}

impl SinkDispatcher {
    /// Create a dispatcher over the two channel sinks
    pub fn new(simple: Arc<dyn LogSink>, batch: Arc<dyn LogSink>) -> Self {
        Self { simple, batch }
    }

    /// Sink behind a channel
    pub fn sink(&self, channel: Channel) -> &dyn LogSink {
        match channel {
            Channel::Simple => self.simple.as_ref(),
            Channel::Batch => self.batch.as_ref(),
        }
    }

    /// Write `message` to `channel` at `level`.
    ///
    /// An unmapped level is never dropped: a warning naming the level is
    /// written first, then the message at info.
    pub fn dispatch(&self, level: &LogLevel, channel: Channel, message: &str) {
        let sink = self.sink(channel);
        match level.severity() {
            Some(severity) => sink.emit(severity, message),
            None => {
                sink.emit(Severity::Warn, &format!("Unknown level: {}", level));
                sink.emit(Severity::Info, message);
            }
        }
    }
}

impl Default for SinkDispatcher {
    fn default() -> Self {
        Self::new(Arc::new(TracingSink::simple()), Arc::new(TracingSink::batch()))
    }
}

impl fmt::Debug for SinkDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SinkDispatcher").finish_non_exhaustive()
    }
}
