//! Correlation propagation and structured JSON logging for integration flows
//!
//! Every logging call on [`FlowLogger`] first makes sure the message carries
//! a message id, a correlation id and its timing anchors, adopting whatever
//! an upstream hop supplied through flat headers or a nested properties bag.
//! It then writes one JSON record per call through a [`LogSink`].
//!
//! Most applications use the `flowlog` facade crate instead.

#![warn(missing_docs)]

pub mod carrier;
pub mod clock;
pub mod config;
pub mod context;
pub mod error;
pub mod event;
pub mod fields;
pub mod injector;
pub mod logger;
pub mod options;
pub mod publish;
pub mod record;
pub mod sink;
pub mod telemetry;
pub mod timing;

pub use carrier::{CarrierShape, CarrierView, EmptyCarrier, InboundCarrier};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{EnvironmentSource, LoggerConfig, LoggerConfigBuilder};
pub use context::MessageContext;
pub use error::{LogError, PayloadError, Result};
pub use event::{Exchange, FlowEvent};
pub use fields::FieldNames;
pub use injector::CorrelationInjector;
pub use logger::{FlowLogger, FlowLoggerBuilder};
pub use options::{CustomLog, ErrorLog, EventLog, HealthLog, MetricLog, RequestLog, ResponseLog};
pub use publish::EventPublisher;
pub use record::{
    Direction, EnvelopeFields, LogRecord, RecordBuilder, RecordType, RequestDirection,
    ResponseDirection,
};
pub use sink::{Channel, LogLevel, LogSink, MemorySink, Severity, SinkDispatcher, TracingSink};
pub use timing::{MetricType, TimingEngine};
