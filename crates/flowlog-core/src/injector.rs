//! Correlation injection.
//!
//! Runs at the start of every logging entry point and decides which message
//! id, correlation id and start anchors the message carries from here on.

use crate::carrier::{CarrierView, InboundCarrier};
use crate::clock::Clock;
use crate::context::{parse_millis, MessageContext};
use crate::fields::FieldNames;
use std::sync::atomic::{AtomicBool, Ordering};

/// Establishes and propagates correlation identifiers and start anchors.
#[derive(Debug)]
pub struct CorrelationInjector {
    names: FieldNames,
    malformed_start_reported: AtomicBool,
}

impl CorrelationInjector {
    /// Create an injector using the given field names
    pub fn new(names: FieldNames) -> Self {
        Self {
            names,
            malformed_start_reported: AtomicBool::new(false),
        }
    }

    /// Field names this injector reads
    pub fn names(&self) -> &FieldNames {
        &self.names
    }

    /// Inject correlation state into `context`.
    ///
    /// `host_message_id` is the host's own unique id for the message, used
    /// when no message id has been established or supplied upstream.
    ///
    /// `message_id` and `service_start_time` are set only when absent;
    /// `flow_start_time` is always refreshed.
    pub fn inject(
        &self,
        context: &mut MessageContext,
        carrier: &dyn InboundCarrier,
        host_message_id: &str,
        clock: &dyn Clock,
    ) {
        let view = CarrierView::resolve(carrier, &self.names);

        if context.message_id.is_none() {
            context.message_id = Some(
                view.text(&self.names.message_id)
                    .unwrap_or_else(|| host_message_id.to_string()),
            );
        }

        if context.service_start_time.is_none() {
            context.service_start_time = match view.get(&self.names.start_time) {
                Some(raw) => {
                    let parsed = parse_millis(raw);
                    if parsed.is_none() {
                        self.report_malformed_start(raw);
                    }
                    parsed
                }
                None => Some(clock.now_millis()),
            };
        }

        context.flow_start_time = Some(clock.now_millis());

        context.correlation_id = self.resolve_correlation_id(&view, context);
    }

    /// Correlation id precedence: carrier transaction id, carrier
    /// correlation id, existing context value, then the message id.
    fn resolve_correlation_id(
        &self,
        view: &CarrierView<'_>,
        context: &MessageContext,
    ) -> Option<String> {
        view.text(&self.names.transaction_id)
            .or_else(|| view.text(&self.names.correlation_id))
            .or_else(|| context.correlation_id.clone())
            .or_else(|| context.message_id.clone())
    }

    fn report_malformed_start(&self, raw: &serde_json::Value) {
        if !self.malformed_start_reported.swap(true, Ordering::Relaxed) {
            tracing::warn!(
                field = %self.names.start_time,
                value = %raw,
                "Inbound start time is not numeric; service time will report 0"
            );
        }
    }
}

impl Default for CorrelationInjector {
    fn default() -> Self {
        Self::new(FieldNames::default())
    }
}
