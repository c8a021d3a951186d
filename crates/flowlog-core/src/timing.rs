//! Timing anchors and elapsed-time metrics.

use crate::clock::Clock;
use crate::context::MessageContext;
use serde::Serialize;
use std::fmt;

/// Which anchor a metric measures from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MetricType {
    /// Time this service has spent on the message
    ServiceTime,
    /// Round trip of the most recent downstream call
    DownstreamTime,
}

impl MetricType {
    /// Wire name of the metric type
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricType::ServiceTime => "SERVICE_TIME",
            MetricType::DownstreamTime => "DOWNSTREAM_TIME",
        }
    }

    /// The anchor this metric is measured from, if set
    pub fn anchor(&self, context: &MessageContext) -> Option<i64> {
        match self {
            MetricType::ServiceTime => context.service_start_time,
            MetricType::DownstreamTime => context.downstream_start_time,
        }
    }
}

impl fmt::Display for MetricType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Captures anchors and turns them into durations.
#[derive(Clone, Copy, Debug, Default)]
pub struct TimingEngine;

impl TimingEngine {
    /// Create a timing engine
    pub fn new() -> Self {
        Self
    }

    /// Anchor the downstream call that is about to be made.
    ///
    /// Always overwrites: the value may have been inherited from an upstream
    /// hop and must measure this hop's call.
    pub fn mark_downstream_call(&self, context: &mut MessageContext, clock: &dyn Clock) {
        context.downstream_start_time = Some(clock.now_millis());
    }

    /// Re-anchor this service's processing time at the current instant.
    pub fn mark_service_start(&self, context: &mut MessageContext, clock: &dyn Clock) {
        context.service_start_time = Some(clock.now_millis());
    }

    /// Milliseconds elapsed since the metric's anchor.
    ///
    /// 0 when the anchor is absent, and never negative when the anchor lies
    /// in the future (clock skew between hosts).
    pub fn elapsed_ms(&self, metric: MetricType, context: &MessageContext, clock: &dyn Clock) -> u64 {
        match metric.anchor(context) {
            Some(start) => u64::try_from(clock.now_millis().saturating_sub(start)).unwrap_or(0),
            None => 0,
        }
    }
}
