//! Per-call options of the [`FlowLogger`](crate::FlowLogger) entry points.
//!
//! Every option set defaults to the simple channel, and all but
//! [`ErrorLog`] default to level `INFO`.

use crate::record::{RequestDirection, ResponseDirection};
use crate::sink::{Channel, LogLevel};
use crate::timing::MetricType;

macro_rules! level_and_channel {
    ($name:ident) => {
        impl $name {
            /// Set the level
            pub fn level(mut self, level: impl Into<LogLevel>) -> Self {
                self.level = level.into();
                self
            }

            /// Set the output channel
            pub fn channel(mut self, channel: Channel) -> Self {
                self.channel = channel;
                self
            }
        }
    };
}

/// Options of [`FlowLogger::request_log`](crate::FlowLogger::request_log)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestLog {
    /// Request direction
    pub direction: RequestDirection,
    /// Service name, defaults to the flow name
    pub service: Option<String>,
    /// Explicit payload, defaults to the message body
    pub payload: Option<String>,
    /// Level
    pub level: LogLevel,
    /// Whether to write the payload record at all
    pub log_payload: bool,
    /// Output channel
    pub channel: Channel,
}

impl RequestLog {
    /// Options for a request in the given direction
    pub fn new(direction: RequestDirection) -> Self {
        Self {
            direction,
            service: None,
            payload: None,
            level: LogLevel::default(),
            log_payload: true,
            channel: Channel::default(),
        }
    }

    /// Shorthand for an inbound request
    pub fn inbound() -> Self {
        Self::new(RequestDirection::RequestIn)
    }

    /// Shorthand for an outbound request
    pub fn outbound() -> Self {
        Self::new(RequestDirection::RequestOut)
    }

    /// Set the service name
    pub fn service(mut self, service: impl Into<String>) -> Self {
        self.service = Some(service.into());
        self
    }

    /// Set an explicit payload
    pub fn payload(mut self, payload: impl Into<String>) -> Self {
        self.payload = Some(payload.into());
        self
    }

    /// Set whether the payload record is written
    pub fn log_payload(mut self, log_payload: bool) -> Self {
        self.log_payload = log_payload;
        self
    }
}

level_and_channel!(RequestLog);

/// Options of [`FlowLogger::response_log`](crate::FlowLogger::response_log)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResponseLog {
    /// Response direction
    pub direction: ResponseDirection,
    /// Service name, defaults to the flow name
    pub service: Option<String>,
    /// Explicit payload, defaults to the message body
    pub payload: Option<String>,
    /// Level
    pub level: LogLevel,
    /// Output channel
    pub channel: Channel,
}

impl ResponseLog {
    /// Options for a response in the given direction
    pub fn new(direction: ResponseDirection) -> Self {
        Self {
            direction,
            service: None,
            payload: None,
            level: LogLevel::default(),
            channel: Channel::default(),
        }
    }

    /// Shorthand for a response from a downstream system
    pub fn inbound() -> Self {
        Self::new(ResponseDirection::ResponseIn)
    }

    /// Shorthand for the response this service returns
    pub fn outbound() -> Self {
        Self::new(ResponseDirection::ResponseOut)
    }

    /// Set the service name
    pub fn service(mut self, service: impl Into<String>) -> Self {
        self.service = Some(service.into());
        self
    }

    /// Set an explicit payload
    pub fn payload(mut self, payload: impl Into<String>) -> Self {
        self.payload = Some(payload.into());
        self
    }
}

level_and_channel!(ResponseLog);

/// Options of [`FlowLogger::event_log`](crate::FlowLogger::event_log)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventLog {
    /// JSON object text merged into the record
    pub content: String,
    /// Level
    pub level: LogLevel,
    /// Whether to hand the record to the event publisher
    pub emit: bool,
    /// Output channel
    pub channel: Channel,
}

impl EventLog {
    /// Options for an event with the given JSON object content
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            level: LogLevel::default(),
            emit: false,
            channel: Channel::default(),
        }
    }

    /// Set whether the record goes to the event publisher
    pub fn emit(mut self, emit: bool) -> Self {
        self.emit = emit;
        self
    }
}

level_and_channel!(EventLog);

/// Options of [`FlowLogger::health_log`](crate::FlowLogger::health_log)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HealthLog {
    /// JSON object text merged into the record
    pub content: String,
    /// Level
    pub level: LogLevel,
    /// Output channel
    pub channel: Channel,
}

impl HealthLog {
    /// Options for a health record with the given JSON object content
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            level: LogLevel::default(),
            channel: Channel::default(),
        }
    }
}

level_and_channel!(HealthLog);

/// Options of [`FlowLogger::metric_log`](crate::FlowLogger::metric_log)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MetricLog {
    /// Metric to compute
    pub metric: MetricType,
    /// Service name, defaults to the flow name
    pub service: Option<String>,
    /// Level
    pub level: LogLevel,
    /// Output channel
    pub channel: Channel,
}

impl MetricLog {
    /// Options for the given metric
    pub fn new(metric: MetricType) -> Self {
        Self {
            metric,
            service: None,
            level: LogLevel::default(),
            channel: Channel::default(),
        }
    }

    /// Set the service name
    pub fn service(mut self, service: impl Into<String>) -> Self {
        self.service = Some(service.into());
        self
    }
}

level_and_channel!(MetricLog);

/// Options of [`FlowLogger::error_log`](crate::FlowLogger::error_log)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ErrorLog {
    /// Caller context for the error
    pub content: String,
    /// Level
    pub level: LogLevel,
    /// Output channel
    pub channel: Channel,
}

impl ErrorLog {
    /// Options for an error record with the given context and level.
    ///
    /// Unlike the other option sets there is no default level.
    pub fn new(content: impl Into<String>, level: impl Into<LogLevel>) -> Self {
        Self {
            content: content.into(),
            level: level.into(),
            channel: Channel::default(),
        }
    }
}

level_and_channel!(ErrorLog);

/// Options of [`FlowLogger::custom_log`](crate::FlowLogger::custom_log)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CustomLog {
    /// Message text
    pub content: String,
    /// Level
    pub level: LogLevel,
    /// Output channel
    pub channel: Channel,
}

impl CustomLog {
    /// Options for a custom message
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            level: LogLevel::default(),
            channel: Channel::default(),
        }
    }
}

level_and_channel!(CustomLog);
