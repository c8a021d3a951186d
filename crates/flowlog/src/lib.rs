//! # flowlog
//!
//! Correlated structured logging for integration flows.
//!
//! Each logging call stamps the message with a message id, a correlation
//! id and timing anchors (adopting those an upstream hop supplied), then
//! writes a JSON record tagged with them.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use flowlog::prelude::*;
//!
//! flowlog::telemetry::init_default_tracing();
//!
//! let logger = FlowLogger::builder()
//!     .config(LoggerConfig::builder().application("orders-api").build())
//!     .build();
//!
//! let mut exchange = Exchange::new()
//!     .with_flow_name("create-order")
//!     .with_inbound_field("X-Correlation-ID", "c-42")
//!     .with_body(r#"{"sku":"A1"}"#);
//!
//! logger.request_log(&mut exchange, RequestLog::inbound());
//! logger.event_log(&mut exchange, EventLog::new(r#"{"orderId":7}"#));
//! logger.response_log(&mut exchange, ResponseLog::outbound().payload("created"));
//! ```
//!
//! ## Features
//!
//! - `config` (default) - `LoggerConfig::from_env()` and `.env` loading

// Re-export core functionality
pub use flowlog_core::*;

// Re-exports for user convenience
pub use serde_json;
pub use tracing;

/// Prelude module - import everything you need with `use flowlog::prelude::*`
pub mod prelude {
    pub use flowlog_core::{
        // Logger
        Channel,
        CustomLog,
        ErrorLog,
        EventLog,
        FlowLogger,
        HealthLog,
        LogLevel,
        MetricLog,
        MetricType,
        RequestLog,
        ResponseLog,
        // Host boundary
        Exchange,
        FlowEvent,
        InboundCarrier,
        MessageContext,
        // Configuration
        EnvironmentSource,
        FieldNames,
        LoggerConfig,
        // Output
        EventPublisher,
        LogRecord,
        LogSink,
        MemorySink,
        Severity,
        SinkDispatcher,
        TracingSink,
        // Errors
        LogError,
        PayloadError,
    };

    #[cfg(feature = "config")]
    pub use flowlog_core::config::{load_dotenv, load_dotenv_from};
}
