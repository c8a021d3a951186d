//! Reserved correlation and timing field names.
//!
//! Every hop in a landscape must agree on these names, otherwise an
//! identifier set upstream is invisible downstream. The defaults below are
//! used unless a deployment overrides them to match existing headers.

use serde::Deserialize;

/// Default correlation-id header name
pub const CORRELATION_ID: &str = "X-Correlation-ID";

/// Default message-id header name
pub const MESSAGE_ID: &str = "X-Message-ID";

/// Default service start-time header name
pub const START_TIME: &str = "X-Start-Time";

/// Default downstream start-time header name
pub const DOWNSTREAM_START_TIME: &str = "X-Downstream-Start-Time";

/// Default flow start-time header name
pub const FLOW_START_TIME: &str = "X-Flow-Start-Time";

/// Default externally supplied transaction-id header name
pub const TRANSACTION_ID: &str = "X-Transaction-ID";

/// Default key under which a queueing protocol nests its properties
pub const NESTED_BAG: &str = "properties";

/// Field names used on carriers, in the message context and in records.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FieldNames {
    /// Correlation-id field
    pub correlation_id: String,
    /// Message-id field
    pub message_id: String,
    /// Service start-time field
    pub start_time: String,
    /// Downstream start-time field
    pub downstream_start_time: String,
    /// Flow start-time field
    pub flow_start_time: String,
    /// Transaction-id field supplied by an external caller
    pub transaction_id: String,
    /// Key of the nested property bag
    pub nested_bag: String,
}

impl Default for FieldNames {
    fn default() -> Self {
        Self {
            correlation_id: CORRELATION_ID.to_string(),
            message_id: MESSAGE_ID.to_string(),
            start_time: START_TIME.to_string(),
            downstream_start_time: DOWNSTREAM_START_TIME.to_string(),
            flow_start_time: FLOW_START_TIME.to_string(),
            transaction_id: TRANSACTION_ID.to_string(),
            nested_bag: NESTED_BAG.to_string(),
        }
    }
}

impl FieldNames {
    /// Set the correlation-id field name
    pub fn with_correlation_id(mut self, name: impl Into<String>) -> Self {
        self.correlation_id = name.into();
        self
    }

    /// Set the message-id field name
    pub fn with_message_id(mut self, name: impl Into<String>) -> Self {
        self.message_id = name.into();
        self
    }

    /// Set the service start-time field name
    pub fn with_start_time(mut self, name: impl Into<String>) -> Self {
        self.start_time = name.into();
        self
    }

    /// Set the downstream start-time field name
    pub fn with_downstream_start_time(mut self, name: impl Into<String>) -> Self {
        self.downstream_start_time = name.into();
        self
    }

    /// Set the flow start-time field name
    pub fn with_flow_start_time(mut self, name: impl Into<String>) -> Self {
        self.flow_start_time = name.into();
        self
    }

    /// Set the transaction-id field name
    pub fn with_transaction_id(mut self, name: impl Into<String>) -> Self {
        self.transaction_id = name.into();
        self
    }

    /// Set the nested bag key
    pub fn with_nested_bag(mut self, name: impl Into<String>) -> Self {
        self.nested_bag = name.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_names() {
        let names = FieldNames::default();
        assert_eq!(names.correlation_id, "X-Correlation-ID");
        assert_eq!(names.message_id, "X-Message-ID");
        assert_eq!(names.nested_bag, "properties");
    }

    #[test]
    fn test_override_keeps_other_names() {
        let names = FieldNames::default()
            .with_correlation_id("X-Legacy-CID")
            .with_transaction_id("btxnid");

        assert_eq!(names.correlation_id, "X-Legacy-CID");
        assert_eq!(names.transaction_id, "btxnid");
        assert_eq!(names.start_time, START_TIME);
    }

    #[test]
    fn test_partial_deserialize_uses_defaults() {
        let names: FieldNames =
            serde_json::from_str(r#"{"transaction_id":"btxnid"}"#).unwrap();
        assert_eq!(names.transaction_id, "btxnid");
        assert_eq!(names.correlation_id, CORRELATION_ID);
    }
}
