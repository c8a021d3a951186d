//! Logging entry points.

use crate::clock::{Clock, SystemClock};
use crate::config::LoggerConfig;
use crate::error::Result;
use crate::event::FlowEvent;
use crate::injector::CorrelationInjector;
use crate::options::{
    CustomLog, ErrorLog, EventLog, HealthLog, MetricLog, RequestLog, ResponseLog,
};
use crate::publish::EventPublisher;
use crate::record::{EnvelopeFields, LogRecord, RecordBuilder, RequestDirection};
use crate::sink::{Channel, LogLevel, LogSink, SinkDispatcher};
use crate::timing::{MetricType, TimingEngine};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Correlating structured logger.
///
/// Every entry point first injects correlation state into the event's
/// context, then writes one or more JSON records. The infallible entry
/// points never fail the flow: problems are reported through `tracing`.
///
/// ```ignore
/// let logger = FlowLogger::new();
/// let mut exchange = Exchange::new().with_flow_name("orders");
///
/// logger.request_log(&mut exchange, RequestLog::inbound());
/// logger.response_log(&mut exchange, ResponseLog::outbound());
/// ```
pub struct FlowLogger {
    config: LoggerConfig,
    injector: CorrelationInjector,
    timing: TimingEngine,
    sinks: SinkDispatcher,
    clock: Arc<dyn Clock>,
    publisher: Option<Arc<dyn EventPublisher>>,
}

impl FlowLogger {
    /// Logger with default configuration writing through `tracing`
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Create a new builder for FlowLogger
    pub fn builder() -> FlowLoggerBuilder {
        FlowLoggerBuilder::default()
    }

    /// Active configuration
    pub fn config(&self) -> &LoggerConfig {
        &self.config
    }

    /// Log a request payload.
    ///
    /// An outbound request anchors the downstream call time. An inbound
    /// request re-anchors the service start time unless
    /// `reset_service_start_on_request_in` is off.
    pub fn request_log<E: FlowEvent + ?Sized>(&self, event: &mut E, options: RequestLog) {
        self.inject(event);

        if let Some(context) = event.context_mut() {
            match options.direction {
                RequestDirection::RequestOut => {
                    self.timing.mark_downstream_call(context, &*self.clock)
                }
                RequestDirection::RequestIn => {
                    if self.config.reset_service_start_on_request_in {
                        self.timing.mark_service_start(context, &*self.clock)
                    }
                }
            }
        }

        if !options.log_payload {
            return;
        }

        let message = payload_message(&*event, options.payload.as_deref());
        let record = self.records(&*event).payload(
            options.direction.into(),
            options.service.as_deref(),
            message,
        );
        self.write(&record, &options.level, options.channel);
    }

    /// Log a response payload followed by its timing metric.
    ///
    /// An inbound response reports the downstream call time, an outbound
    /// one the service time.
    pub fn response_log<E: FlowEvent + ?Sized>(&self, event: &mut E, options: ResponseLog) {
        self.inject(event);

        let builder = self.records(&*event);
        let service = options.service.as_deref();
        let message = payload_message(&*event, options.payload.as_deref());

        let payload = builder.payload(options.direction.into(), service, message);
        self.write(&payload, &options.level, options.channel);

        let metric_type = options.direction.metric();
        let metric = builder.metric(metric_type, service, self.elapsed(&*event, metric_type));
        self.write(&metric, &options.level, options.channel);
    }

    /// Log a business event, reporting invalid content through `tracing`
    pub fn event_log<E: FlowEvent + ?Sized>(&self, event: &mut E, options: EventLog) {
        if let Err(error) = self.try_event_log(event, options) {
            tracing::warn!(error = %error, "Event record dropped");
        }
    }

    /// Log a business event.
    ///
    /// With `emit` set, the record is also handed to the configured
    /// [`EventPublisher`].
    ///
    /// # Errors
    ///
    /// Returns an error if the content is not a JSON object; nothing is
    /// written in that case.
    pub fn try_event_log<E: FlowEvent + ?Sized>(
        &self,
        event: &mut E,
        options: EventLog,
    ) -> Result<LogRecord> {
        self.inject(event);

        let record = self.records(&*event).event(&options.content)?;
        self.write(&record, &options.level, options.channel);

        if options.emit {
            match &self.publisher {
                Some(publisher) => publisher.publish(&record),
                None => tracing::debug!(
                    message_id = ?event.context().and_then(|c| c.message_id.as_deref()),
                    "No event publisher configured; event not emitted"
                ),
            }
        }

        Ok(record)
    }

    /// Log a health status, reporting invalid content through `tracing`
    pub fn health_log<E: FlowEvent + ?Sized>(&self, event: &mut E, options: HealthLog) {
        if let Err(error) = self.try_health_log(event, options) {
            tracing::warn!(error = %error, "Health record dropped");
        }
    }

    /// Log a health status.
    ///
    /// # Errors
    ///
    /// Returns an error if the content is not a JSON object; nothing is
    /// written in that case.
    pub fn try_health_log<E: FlowEvent + ?Sized>(
        &self,
        event: &mut E,
        options: HealthLog,
    ) -> Result<LogRecord> {
        self.inject(event);

        let record = self.records(&*event).health(&options.content)?;
        self.write(&record, &options.level, options.channel);
        Ok(record)
    }

    /// Log an elapsed-time metric
    pub fn metric_log<E: FlowEvent + ?Sized>(&self, event: &mut E, options: MetricLog) {
        self.inject(event);

        let elapsed = self.elapsed(&*event, options.metric);
        let record = self
            .records(&*event)
            .metric(options.metric, options.service.as_deref(), elapsed);
        self.write(&record, &options.level, options.channel);
    }

    /// Log the error the flow is handling
    pub fn error_log<E: FlowEvent + ?Sized>(&self, event: &mut E, options: ErrorLog) {
        self.inject(event);

        let record = self.records(&*event).error(event.error(), &options.content);
        self.write(&record, &options.level, options.channel);
    }

    /// Log a free-form message
    pub fn custom_log<E: FlowEvent + ?Sized>(&self, event: &mut E, options: CustomLog) {
        self.inject(event);

        let record = self.records(&*event).custom(&options.content, &options.level);
        self.write(&record, &options.level, options.channel);
    }

    /// Copy the correlation id onto the outbound carrier for the next hop.
    ///
    /// Does nothing when the event has no context or no correlation id yet.
    pub fn cross_boundary_propagate<E: FlowEvent + ?Sized>(&self, event: &mut E) {
        let correlation_id = event.context().and_then(|c| c.correlation_id.clone());
        if let Some(correlation_id) = correlation_id {
            event.set_outbound_field(
                &self.config.fields.correlation_id,
                Value::String(correlation_id),
            );
        }
    }

    fn inject<E: FlowEvent + ?Sized>(&self, event: &mut E) {
        let host_id = event.host_id().to_string();
        match event.scope_mut() {
            Some((context, carrier)) => {
                self.injector.inject(context, carrier, &host_id, &*self.clock)
            }
            None => tracing::debug!(host_id = %host_id, "Message has no context; skipping injection"),
        }
    }

    fn records<E: FlowEvent + ?Sized>(&self, event: &E) -> RecordBuilder {
        RecordBuilder::new(
            EnvelopeFields::capture(event, &self.config),
            &self.config.fields,
            self.clock.now(),
        )
    }

    fn elapsed<E: FlowEvent + ?Sized>(&self, event: &E, metric: MetricType) -> u64 {
        event
            .context()
            .map(|context| self.timing.elapsed_ms(metric, context, &*self.clock))
            .unwrap_or(0)
    }

    fn write(&self, record: &LogRecord, level: &LogLevel, channel: Channel) {
        self.sinks.dispatch(level, channel, &record.to_json_string());
    }
}

impl Default for FlowLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FlowLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlowLogger")
            .field("config", &self.config)
            .field("sinks", &self.sinks)
            .field("publisher", &self.publisher.is_some())
            .finish_non_exhaustive()
    }
}

/// Explicit payload if non-blank, else the body, else a diagnostic
fn payload_message<E: FlowEvent + ?Sized>(event: &E, explicit: Option<&str>) -> String {
    match explicit {
        Some(payload) if !payload.trim().is_empty() => payload.to_string(),
        _ => event
            .payload_as_string()
            .unwrap_or_else(|error| error.diagnostic()),
    }
}

/// Builder for FlowLogger
pub struct FlowLoggerBuilder {
    config: LoggerConfig,
    sinks: SinkDispatcher,
    clock: Arc<dyn Clock>,
    publisher: Option<Arc<dyn EventPublisher>>,
}

impl Default for FlowLoggerBuilder {
    fn default() -> Self {
        Self {
            config: LoggerConfig::default(),
            sinks: SinkDispatcher::default(),
            clock: Arc::new(SystemClock),
            publisher: None,
        }
    }
}

impl FlowLoggerBuilder {
    /// Set the configuration
    pub fn config(mut self, config: LoggerConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace both channel sinks
    pub fn sinks(mut self, sinks: SinkDispatcher) -> Self {
        self.sinks = sinks;
        self
    }

    /// Write every channel to one sink
    pub fn sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.sinks = SinkDispatcher::new(sink.clone(), sink);
        self
    }

    /// Set the time source
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Set the publisher for emitted events
    pub fn publisher(mut self, publisher: Arc<dyn EventPublisher>) -> Self {
        self.publisher = Some(publisher);
        self
    }

    /// Build the logger
    pub fn build(self) -> FlowLogger {
        FlowLogger {
            injector: CorrelationInjector::new(self.config.fields.clone()),
            timing: TimingEngine::new(),
            config: self.config,
            sinks: self.sinks,
            clock: self.clock,
            publisher: self.publisher,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::context::MessageContext;
    use crate::carrier::{EmptyCarrier, InboundCarrier};
    use crate::error::PayloadError;
    use crate::event::Exchange;
    use crate::record::ResponseDirection;
    use crate::sink::{MemorySink, Severity};
    use serde_json::json;
    use std::sync::Mutex;

    struct Fixture {
        logger: FlowLogger,
        simple: Arc<MemorySink>,
        batch: Arc<MemorySink>,
        clock: Arc<ManualClock>,
    }

    fn fixture_with(config: LoggerConfig) -> Fixture {
        let simple = Arc::new(MemorySink::new());
        let batch = Arc::new(MemorySink::new());
        let clock = Arc::new(ManualClock::new(1_000));
        let logger = FlowLogger::builder()
            .config(config)
            .sinks(SinkDispatcher::new(simple.clone(), batch.clone()))
            .clock(clock.clone())
            .build();
        Fixture { logger, simple, batch, clock }
    }

    fn fixture() -> Fixture {
        fixture_with(
            LoggerConfig::builder()
                .application("orders-api")
                .environment("test")
                .build(),
        )
    }

    fn exchange() -> Exchange {
        Exchange::with_id("host-1").with_flow_name("orders-flow")
    }

    #[test]
    fn test_request_in_response_out_reports_service_time() {
        let f = fixture();
        let mut exchange = exchange().with_body("<order/>");

        f.logger.request_log(&mut exchange, RequestLog::inbound());
        f.clock.advance(250);
        f.logger.response_log(&mut exchange, ResponseLog::outbound().payload("done"));

        let records = f.simple.records();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0]["Type"], "Payload");
        assert_eq!(records[0]["Direction"], "REQUEST_IN");
        assert_eq!(records[0]["Message"], "<order/>");
        assert_eq!(records[1]["Direction"], "RESPONSE_OUT");
        assert_eq!(records[1]["Message"], "done");
        assert_eq!(records[2]["Type"], "Metric");
        assert_eq!(records[2]["MetricType"], "SERVICE_TIME");
        assert_eq!(records[2]["ExecutionTimeMs"], 250);

        for record in &records {
            assert_eq!(record["Application"], "orders-api");
            assert_eq!(record["Env"], "test");
            assert_eq!(record["X-Message-ID"], "host-1");
            assert_eq!(record["X-Correlation-ID"], "host-1");
            assert_eq!(record["FlowName"], "orders-flow");
            assert_eq!(record["Service"], "orders-flow");
        }
        assert!(f.batch.is_empty());
    }

    #[test]
    fn test_request_out_response_in_reports_downstream_time() {
        let f = fixture();
        let mut exchange = exchange();

        f.logger.request_log(
            &mut exchange,
            RequestLog::outbound().service("inventory").log_payload(false),
        );
        assert!(f.simple.is_empty());

        f.clock.advance(40);
        f.logger
            .response_log(&mut exchange, ResponseLog::inbound().service("inventory"));

        let records = f.simple.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1]["MetricType"], "DOWNSTREAM_TIME");
        assert_eq!(records[1]["ExecutionTimeMs"], 40);
        assert_eq!(records[1]["Service"], "inventory");
    }

    #[test]
    fn test_request_in_keeps_upstream_start_when_reset_disabled() {
        let f = fixture_with(
            LoggerConfig::builder()
                .reset_service_start_on_request_in(false)
                .build(),
        );
        let mut exchange = exchange().with_inbound_field("X-Start-Time", 600);

        f.logger.request_log(&mut exchange, RequestLog::inbound());
        assert_eq!(
            exchange.message_context().unwrap().service_start_time,
            Some(600)
        );
    }

    #[test]
    fn test_request_in_reanchors_service_start() {
        let f = fixture();
        let mut exchange = exchange().with_inbound_field("X-Start-Time", 600);

        f.logger.request_log(&mut exchange, RequestLog::inbound());
        assert_eq!(
            exchange.message_context().unwrap().service_start_time,
            Some(1_000)
        );
    }

    #[test]
    fn test_request_in_never_touches_message_id() {
        let f = fixture();
        let mut exchange = exchange().with_inbound_field("X-Message-ID", "m-up");

        f.logger.request_log(&mut exchange, RequestLog::inbound());
        f.logger.request_log(&mut exchange, RequestLog::inbound());

        assert_eq!(
            exchange.message_context().unwrap().message_id.as_deref(),
            Some("m-up")
        );
    }

    #[test]
    fn test_unreadable_body_becomes_diagnostic() {
        let f = fixture();
        let mut exchange = exchange().with_unreadable_body("stream closed");

        f.logger.request_log(&mut exchange, RequestLog::inbound().payload("   "));

        assert_eq!(
            f.simple.records()[0]["Message"],
            "Unable to get payload: Unavailable stream closed"
        );
    }

    #[test]
    fn test_event_log_merges_content() {
        let f = fixture();
        let mut exchange = exchange();

        f.logger
            .event_log(&mut exchange, EventLog::new(r#"{"a":1,"b":"x"}"#));

        let record = &f.simple.records()[0];
        assert_eq!(record["Type"], "Event");
        assert_eq!(record["a"], 1);
        assert_eq!(record["b"], "x");
        assert!(record.get("Timestamp").is_some());
    }

    #[test]
    fn test_invalid_event_is_swallowed() {
        let f = fixture();
        let mut exchange = exchange();

        f.logger.event_log(&mut exchange, EventLog::new("not json"));
        f.logger.health_log(&mut exchange, HealthLog::new("42"));
        assert!(f.simple.is_empty());

        assert!(f
            .logger
            .try_event_log(&mut exchange, EventLog::new("not json"))
            .is_err());
        assert!(f
            .logger
            .try_health_log(&mut exchange, HealthLog::new("42"))
            .is_err());
    }

    #[test]
    fn test_emitted_event_reaches_publisher() {
        let published = Arc::new(Mutex::new(Vec::new()));
        let sink = published.clone();
        let logger = FlowLogger::builder()
            .sink(Arc::new(MemorySink::new()))
            .publisher(Arc::new(move |record: &LogRecord| {
                sink.lock().unwrap().push(record.clone());
            }))
            .build();
        let mut exchange = exchange();

        logger.event_log(&mut exchange, EventLog::new(r#"{"order":7}"#));
        logger.event_log(&mut exchange, EventLog::new(r#"{"order":8}"#).emit(true));

        let published = published.lock().unwrap();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].get("order"), Some(&json!(8)));
    }

    #[test]
    fn test_emit_without_publisher_still_logs() {
        let f = fixture();
        let mut exchange = exchange();

        let record = f
            .logger
            .try_event_log(&mut exchange, EventLog::new("{}").emit(true))
            .unwrap();

        assert_eq!(record.record_type(), Some("Event"));
        assert_eq!(f.simple.len(), 1);
    }

    #[test]
    fn test_health_log_on_batch_channel() {
        let f = fixture();
        let mut exchange = exchange();

        f.logger.health_log(
            &mut exchange,
            HealthLog::new(r#"{"status":"UP"}"#).channel(Channel::Batch),
        );

        assert!(f.simple.is_empty());
        assert_eq!(f.batch.records()[0]["Type"], "Health");
        assert_eq!(f.batch.records()[0]["status"], "UP");
    }

    #[test]
    fn test_metric_without_anchor_is_zero() {
        let f = fixture();
        let mut exchange = exchange();

        f.logger
            .metric_log(&mut exchange, MetricLog::new(MetricType::DownstreamTime));

        assert_eq!(f.simple.records()[0]["ExecutionTimeMs"], 0);
    }

    #[test]
    fn test_metric_uses_inherited_service_start() {
        let f = fixture();
        let mut exchange = exchange().with_context(MessageContext {
            service_start_time: Some(750),
            ..Default::default()
        });

        f.logger.metric_log(
            &mut exchange,
            MetricLog::new(MetricType::ServiceTime).level(LogLevel::Debug),
        );

        let lines = f.simple.lines();
        assert_eq!(lines[0].severity, Severity::Debug);
        assert_eq!(f.simple.records()[0]["ExecutionTimeMs"], 250);
    }

    #[test]
    fn test_missing_context_defaults_to_empty_fields() {
        let f = fixture();
        let mut exchange = Exchange::with_id("h").without_context();

        f.logger
            .metric_log(&mut exchange, MetricLog::new(MetricType::ServiceTime));
        f.logger.cross_boundary_propagate(&mut exchange);

        let record = &f.simple.records()[0];
        assert_eq!(record["X-Correlation-ID"], "");
        assert_eq!(record["X-Message-ID"], "");
        assert_eq!(record["FlowName"], "");
        assert_eq!(record["ExecutionTimeMs"], 0);
        assert!(exchange.outbound().is_empty());
    }

    #[test]
    fn test_error_log_uses_root_cause() {
        let f = fixture();
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        let mut exchange = exchange().with_error(io);

        f.logger.error_log(
            &mut exchange,
            ErrorLog::new("writing invoice", LogLevel::Error),
        );

        let record = &f.simple.records()[0];
        assert_eq!(record["Type"], "Error");
        assert_eq!(record["Error"], "disk full");
        assert_eq!(record["Additional"], "writing invoice");
        assert_eq!(f.simple.lines()[0].severity, Severity::Error);
    }

    #[test]
    fn test_custom_log_with_unknown_level() {
        let f = fixture();
        let mut exchange = exchange();

        f.logger
            .custom_log(&mut exchange, CustomLog::new("hello").level("TRACE"));

        let lines = f.simple.lines();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].severity, Severity::Warn);
        assert_eq!(lines[0].message, "Unknown level: TRACE");
        assert_eq!(lines[1].severity, Severity::Info);

        let record: Value = serde_json::from_str(&lines[1].message).unwrap();
        assert_eq!(record["Message"], "hello");
        assert_eq!(record["Level"], "TRACE");
    }

    #[test]
    fn test_cross_boundary_propagate() {
        let f = fixture();
        let mut exchange = exchange().with_inbound_field("X-Transaction-ID", "T1");

        f.logger.custom_log(&mut exchange, CustomLog::new("start"));
        f.logger.cross_boundary_propagate(&mut exchange);

        assert_eq!(exchange.outbound().get("X-Correlation-ID"), Some(&json!("T1")));
    }

    #[test]
    fn test_response_direction_metrics() {
        assert_eq!(ResponseDirection::ResponseIn.metric(), MetricType::DownstreamTime);
        assert_eq!(ResponseDirection::ResponseOut.metric(), MetricType::ServiceTime);
    }

    /// Host with a context but no inbound metadata of its own
    struct BareHost {
        context: MessageContext,
        outbound: Vec<(String, Value)>,
    }

    impl FlowEvent for BareHost {
        fn host_id(&self) -> &str {
            "bare-1"
        }

        fn context(&self) -> Option<&MessageContext> {
            Some(&self.context)
        }

        fn scope_mut(&mut self) -> Option<(&mut MessageContext, &dyn InboundCarrier)> {
            let carrier: &dyn InboundCarrier = &EmptyCarrier;
            Some((&mut self.context, carrier))
        }

        fn set_outbound_field(&mut self, key: &str, value: Value) {
            self.outbound.push((key.to_string(), value));
        }

        fn payload_as_string(&self) -> std::result::Result<String, PayloadError> {
            Ok("bare body".to_string())
        }
    }

    #[test]
    fn test_host_without_inbound_metadata() {
        let f = fixture();
        let mut host = BareHost {
            context: MessageContext::new(),
            outbound: Vec::new(),
        };

        f.logger.request_log(&mut host, RequestLog::inbound());
        f.logger.cross_boundary_propagate(&mut host);

        let record = &f.simple.records()[0];
        assert_eq!(record["X-Message-ID"], "bare-1");
        assert_eq!(record["X-Correlation-ID"], "bare-1");
        assert_eq!(record["Message"], "bare body");
        assert_eq!(record["Service"], "");
        assert_eq!(
            host.outbound,
            vec![("X-Correlation-ID".to_string(), json!("bare-1"))]
        );
    }

    #[test]
    fn test_dyn_event() {
        let f = fixture();
        let mut exchange = exchange();
        let event: &mut dyn FlowEvent = &mut exchange;

        f.logger.custom_log(event, CustomLog::new("via trait object"));

        assert_eq!(f.simple.len(), 1);
    }
}
