//! Per-message correlation and timing state.

use crate::carrier::value_as_text;
use crate::error::{LogError, Result};
use crate::fields::FieldNames;
use serde_json::{Map, Value};

/// Mutable state carried by one in-flight message through a flow.
///
/// Owned exclusively by the hop currently processing the message, so it is a
/// plain value with no interior locking. Timing anchors are epoch
/// milliseconds.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MessageContext {
    /// Stable identifier for the message, set once per flow
    pub message_id: Option<String>,
    /// Identifier shared by every service in one transaction
    pub correlation_id: Option<String>,
    /// When the current hop began processing; refreshed by every injection
    pub flow_start_time: Option<i64>,
    /// Anchor for this service's own processing time
    pub service_start_time: Option<i64>,
    /// Anchor set just before an outbound call
    pub downstream_start_time: Option<i64>,
}

impl MessageContext {
    /// Create an empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a field by its reserved name
    pub fn field(&self, names: &FieldNames, key: &str) -> Option<Value> {
        if key == names.message_id {
            self.message_id.clone().map(Value::String)
        } else if key == names.correlation_id {
            self.correlation_id.clone().map(Value::String)
        } else if key == names.flow_start_time {
            self.flow_start_time.map(Value::from)
        } else if key == names.start_time {
            self.service_start_time.map(Value::from)
        } else if key == names.downstream_start_time {
            self.downstream_start_time.map(Value::from)
        } else {
            None
        }
    }

    /// Write a field by its reserved name.
    ///
    /// Identifiers accept any scalar; anchors accept integers or decimal
    /// text. `null` clears the field. Unknown keys are ignored.
    pub fn set_field(&mut self, names: &FieldNames, key: &str, value: &Value) -> Result<()> {
        if key == names.message_id {
            self.message_id = identifier(key, value)?;
        } else if key == names.correlation_id {
            self.correlation_id = identifier(key, value)?;
        } else if key == names.flow_start_time {
            self.flow_start_time = anchor(key, value)?;
        } else if key == names.start_time {
            self.service_start_time = anchor(key, value)?;
        } else if key == names.downstream_start_time {
            self.downstream_start_time = anchor(key, value)?;
        }
        Ok(())
    }

    /// Load a context from a host property map. Malformed values load as
    /// absent rather than failing.
    pub fn from_properties(names: &FieldNames, properties: &Map<String, Value>) -> Self {
        let text = |key: &str| properties.get(key).and_then(value_as_text);
        let millis = |key: &str| properties.get(key).and_then(parse_millis);

        Self {
            message_id: text(&names.message_id),
            correlation_id: text(&names.correlation_id),
            flow_start_time: millis(&names.flow_start_time),
            service_start_time: millis(&names.start_time),
            downstream_start_time: millis(&names.downstream_start_time),
        }
    }

    /// Store the set fields into a property map under their reserved names
    pub fn to_properties(&self, names: &FieldNames) -> Map<String, Value> {
        let mut properties = Map::new();
        for key in [
            &names.message_id,
            &names.correlation_id,
            &names.flow_start_time,
            &names.start_time,
            &names.downstream_start_time,
        ] {
            if let Some(value) = self.field(names, key) {
                properties.insert(key.clone(), value);
            }
        }
        properties
    }
}

/// Interpret a carrier or property value as epoch milliseconds.
///
/// Accepts integers, integral floats and decimal text. Everything else is
/// `None`.
pub fn parse_millis(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn identifier(key: &str, value: &Value) -> Result<Option<String>> {
    if value.is_null() {
        return Ok(None);
    }
    value_as_text(value)
        .map(Some)
        .ok_or_else(|| LogError::invalid_field(key, "expected a scalar identifier"))
}

fn anchor(key: &str, value: &Value) -> Result<Option<i64>> {
    if value.is_null() {
        return Ok(None);
    }
    parse_millis(value)
        .map(Some)
        .ok_or_else(|| LogError::invalid_field(key, "expected epoch milliseconds"))
}
