//! Structured log records.
//!
//! Every record shares one envelope (application, environment, timestamp,
//! correlation and message ids, flow and service names, `Type`) and adds
//! the fields of its type on top.

use crate::clock::format_timestamp;
use crate::config::LoggerConfig;
use crate::error::{LogError, Result};
use crate::event::FlowEvent;
use crate::fields::FieldNames;
use crate::sink::LogLevel;
use crate::timing::MetricType;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt;

/// Envelope keys that do not depend on configuration
pub mod keys {
    /// Application id
    pub const APPLICATION: &str = "Application";
    /// Environment name
    pub const ENVIRONMENT: &str = "Env";
    /// Record creation time
    pub const TIMESTAMP: &str = "Timestamp";
    /// Flow name
    pub const FLOW_NAME: &str = "FlowName";
    /// Service name, falling back to the flow name
    pub const SERVICE: &str = "Service";
    /// Record type discriminator
    pub const TYPE: &str = "Type";
    /// Payload direction
    pub const DIRECTION: &str = "Direction";
    /// Payload or custom message
    pub const MESSAGE: &str = "Message";
    /// Metric type
    pub const METRIC_TYPE: &str = "MetricType";
    /// Metric duration
    pub const EXECUTION_TIME_MS: &str = "ExecutionTimeMs";
    /// Error message
    pub const ERROR: &str = "Error";
    /// Caller content attached to an error
    pub const ADDITIONAL: &str = "Additional";
    /// Level of a custom record
    pub const LEVEL: &str = "Level";
}

/// Direction of a request record
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestDirection {
    /// Request arriving at this service
    RequestIn,
    /// Request leaving for a downstream system
    RequestOut,
}

/// Direction of a response record
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResponseDirection {
    /// Response coming back from a downstream system
    ResponseIn,
    /// Response this service returns to its caller
    ResponseOut,
}

impl ResponseDirection {
    /// Metric emitted alongside a response of this direction
    pub fn metric(&self) -> MetricType {
        match self {
            ResponseDirection::ResponseIn => MetricType::DownstreamTime,
            ResponseDirection::ResponseOut => MetricType::ServiceTime,
        }
    }
}

/// Direction written into a payload record
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    /// See [`RequestDirection::RequestIn`]
    RequestIn,
    /// See [`RequestDirection::RequestOut`]
    RequestOut,
    /// See [`ResponseDirection::ResponseIn`]
    ResponseIn,
    /// See [`ResponseDirection::ResponseOut`]
    ResponseOut,
}

impl Direction {
    /// Wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::RequestIn => "REQUEST_IN",
            Direction::RequestOut => "REQUEST_OUT",
            Direction::ResponseIn => "RESPONSE_IN",
            Direction::ResponseOut => "RESPONSE_OUT",
        }
    }
}

impl From<RequestDirection> for Direction {
    fn from(direction: RequestDirection) -> Self {
        match direction {
            RequestDirection::RequestIn => Direction::RequestIn,
            RequestDirection::RequestOut => Direction::RequestOut,
        }
    }
}

impl From<ResponseDirection> for Direction {
    fn from(direction: ResponseDirection) -> Self {
        match direction {
            ResponseDirection::ResponseIn => Direction::ResponseIn,
            ResponseDirection::ResponseOut => Direction::ResponseOut,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Record type discriminator
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum RecordType {
    /// Message body at a boundary
    Payload,
    /// Business event
    Event,
    /// Health status
    Health,
    /// Elapsed-time metric
    Metric,
    /// Error report
    Error,
    /// Free-form message
    Custom,
}

impl RecordType {
    /// Value of the `Type` field
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::Payload => "Payload",
            RecordType::Event => "Event",
            RecordType::Health => "Health",
            RecordType::Metric => "Metric",
            RecordType::Error => "Error",
            RecordType::Custom => "Custom",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Envelope values of one entry-point call, with every absent value
/// normalized to an empty string.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EnvelopeFields {
    /// Application id
    pub application: String,
    /// Environment name
    pub environment: String,
    /// Correlation id from the message context
    pub correlation_id: String,
    /// Message id from the message context
    pub message_id: String,
    /// Flow name
    pub flow_name: String,
}

impl EnvelopeFields {
    /// Snapshot the envelope values of `event`.
    ///
    /// The host's application id wins over the configured fallback. The
    /// environment source is read on every call.
    pub fn capture<E: FlowEvent + ?Sized>(event: &E, config: &LoggerConfig) -> Self {
        let context = event.context();
        Self {
            application: event
                .application_id()
                .or(config.application.as_deref())
                .unwrap_or_default()
                .to_string(),
            environment: config.environment.resolve(),
            correlation_id: context
                .and_then(|c| c.correlation_id.clone())
                .unwrap_or_default(),
            message_id: context.and_then(|c| c.message_id.clone()).unwrap_or_default(),
            flow_name: event.flow_name().unwrap_or_default().to_string(),
        }
    }

    /// `service` if non-blank, otherwise the flow name
    pub fn service_name<'a>(&'a self, service: Option<&'a str>) -> &'a str {
        match service {
            Some(name) if !name.trim().is_empty() => name,
            _ => &self.flow_name,
        }
    }
}

/// A finished record, ready to be serialized.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(transparent)]
pub struct LogRecord {
    fields: Map<String, Value>,
}

impl LogRecord {
    /// Value of a field
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Value of the `Type` field
    pub fn record_type(&self) -> Option<&str> {
        self.get(keys::TYPE).and_then(Value::as_str)
    }

    /// All fields
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Convert into a JSON object value
    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }

    /// Compact JSON text of the record
    pub fn to_json_string(&self) -> String {
        // Serializing a map of JSON values cannot fail.
        serde_json::to_string(&self.fields).unwrap_or_default()
    }
}

impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_json_string())
    }
}

/// Builds records that share one envelope.
#[derive(Debug)]
pub struct RecordBuilder {
    base: Map<String, Value>,
    envelope: EnvelopeFields,
}

impl RecordBuilder {
    /// Create a builder for records stamped at `at`
    pub fn new(envelope: EnvelopeFields, names: &FieldNames, at: DateTime<Utc>) -> Self {
        let mut base = Map::new();
        base.insert(keys::APPLICATION.into(), envelope.application.clone().into());
        base.insert(keys::ENVIRONMENT.into(), envelope.environment.clone().into());
        base.insert(keys::TIMESTAMP.into(), format_timestamp(at).into());
        base.insert(
            names.correlation_id.clone(),
            envelope.correlation_id.clone().into(),
        );
        base.insert(names.message_id.clone(), envelope.message_id.clone().into());
        base.insert(keys::FLOW_NAME.into(), envelope.flow_name.clone().into());
        Self { base, envelope }
    }

    /// Envelope values this builder stamps
    pub fn envelope(&self) -> &EnvelopeFields {
        &self.envelope
    }

    fn start(&self, service: Option<&str>) -> Map<String, Value> {
        let mut fields = self.base.clone();
        fields.insert(
            keys::SERVICE.into(),
            self.envelope.service_name(service).into(),
        );
        fields
    }

    fn finish(mut fields: Map<String, Value>, record_type: RecordType) -> LogRecord {
        fields.insert(keys::TYPE.into(), record_type.as_str().into());
        LogRecord { fields }
    }

    /// Payload record
    pub fn payload(
        &self,
        direction: Direction,
        service: Option<&str>,
        message: impl Into<String>,
    ) -> LogRecord {
        let mut fields = self.start(service);
        fields.insert(keys::DIRECTION.into(), direction.as_str().into());
        fields.insert(keys::MESSAGE.into(), message.into().into());
        Self::finish(fields, RecordType::Payload)
    }

    /// Event record from caller-supplied JSON object text
    pub fn event(&self, content: &str) -> Result<LogRecord> {
        self.merged(content, RecordType::Event)
    }

    /// Health record from caller-supplied JSON object text
    pub fn health(&self, content: &str) -> Result<LogRecord> {
        self.merged(content, RecordType::Health)
    }

    fn merged(&self, content: &str, record_type: RecordType) -> Result<LogRecord> {
        let object = match serde_json::from_str::<Value>(content)? {
            Value::Object(object) => object,
            other => return Err(LogError::ContentNotObject(json_kind(&other))),
        };

        let mut fields = self.start(None);
        fields.extend(object);
        Ok(Self::finish(fields, record_type))
    }

    /// Metric record
    pub fn metric(&self, metric: MetricType, service: Option<&str>, elapsed_ms: u64) -> LogRecord {
        let mut fields = self.start(service);
        fields.insert(keys::METRIC_TYPE.into(), metric.as_str().into());
        fields.insert(keys::EXECUTION_TIME_MS.into(), elapsed_ms.into());
        Self::finish(fields, RecordType::Metric)
    }

    /// Error record for the error the flow is handling
    pub fn error(&self, error: Option<&(dyn Error + 'static)>, content: &str) -> LogRecord {
        let mut fields = self.start(None);
        fields.insert(keys::ERROR.into(), error_message(error, content).into());
        fields.insert(keys::ADDITIONAL.into(), content.into());
        Self::finish(fields, RecordType::Error)
    }

    /// Custom record
    pub fn custom(&self, message: &str, level: &LogLevel) -> LogRecord {
        let mut fields = self.start(None);
        fields.insert(keys::MESSAGE.into(), message.into());
        fields.insert(keys::LEVEL.into(), level.as_str().into());
        Self::finish(fields, RecordType::Custom)
    }
}

/// Message reported for `error`: the root cause if it says anything, else
/// the error itself, else `fallback`.
pub fn error_message(error: Option<&(dyn Error + 'static)>, fallback: &str) -> String {
    let Some(error) = error else {
        return fallback.to_string();
    };

    let mut root = error;
    while let Some(source) = root.source() {
        root = source;
    }

    [root.to_string(), error.to_string()]
        .into_iter()
        .find(|message| !message.is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
