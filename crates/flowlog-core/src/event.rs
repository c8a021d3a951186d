//! Host message boundary.
//!
//! The host runtime owns the message; flowlog only sees it through
//! [`FlowEvent`]. [`Exchange`] is an in-memory implementation for hosts
//! without their own model and for tests.

use crate::carrier::InboundCarrier;
use crate::context::MessageContext;
use crate::error::PayloadError;
use serde_json::{Map, Value};
use std::error::Error;

/// A message in flight, as seen by the logging entry points.
pub trait FlowEvent {
    /// The host's own unique id for this message
    fn host_id(&self) -> &str;

    /// Per-message context, `None` when the host has no message scope
    fn context(&self) -> Option<&MessageContext>;

    /// Mutable context together with the inbound carrier.
    ///
    /// Both are needed at once during injection, so implementations split
    /// the borrow here. Hosts without inbound metadata return
    /// [`EmptyCarrier`](crate::carrier::EmptyCarrier).
    fn scope_mut(&mut self) -> Option<(&mut MessageContext, &dyn InboundCarrier)>;

    /// Mutable context alone
    fn context_mut(&mut self) -> Option<&mut MessageContext> {
        self.scope_mut().map(|(context, _)| context)
    }

    /// Stamp a field onto the outgoing transport metadata
    fn set_outbound_field(&mut self, key: &str, value: Value);

    /// Message body as text
    fn payload_as_string(&self) -> Result<String, PayloadError>;

    /// Error the flow is currently handling, if any
    fn error(&self) -> Option<&(dyn Error + 'static)> {
        None
    }

    /// Name of the flow processing the message
    fn flow_name(&self) -> Option<&str> {
        None
    }

    /// Id of the application hosting the flow
    fn application_id(&self) -> Option<&str> {
        None
    }
}

#[derive(Debug, Default)]
enum Body {
    #[default]
    Empty,
    Bytes(Vec<u8>),
    Unreadable(String),
}

/// In-memory [`FlowEvent`].
#[derive(Debug)]
pub struct Exchange {
    id: String,
    inbound: Map<String, Value>,
    context: Option<MessageContext>,
    outbound: Map<String, Value>,
    body: Body,
    error: Option<Box<dyn Error + Send + Sync>>,
    flow_name: Option<String>,
    application: Option<String>,
}

impl Exchange {
    /// Create an exchange with a fresh UUID and an empty context
    pub fn new() -> Self {
        Self::with_id(uuid::Uuid::new_v4().to_string())
    }

    /// Create an exchange with a fixed host id
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            inbound: Map::new(),
            context: Some(MessageContext::new()),
            outbound: Map::new(),
            body: Body::Empty,
            error: None,
            flow_name: None,
            application: None,
        }
    }

    /// Set one inbound header
    pub fn with_inbound_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.inbound.insert(key.into(), value.into());
        self
    }

    /// Replace all inbound headers
    pub fn with_inbound_fields(mut self, fields: Map<String, Value>) -> Self {
        self.inbound = fields;
        self
    }

    /// Set the message body
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Body::Bytes(body.into());
        self
    }

    /// Make the body unreadable, as a consumed stream would be
    pub fn with_unreadable_body(mut self, reason: impl Into<String>) -> Self {
        self.body = Body::Unreadable(reason.into());
        self
    }

    /// Attach the error the flow is handling
    pub fn with_error(mut self, error: impl Into<Box<dyn Error + Send + Sync>>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// Set the flow name
    pub fn with_flow_name(mut self, name: impl Into<String>) -> Self {
        self.flow_name = Some(name.into());
        self
    }

    /// Set the application id
    pub fn with_application(mut self, id: impl Into<String>) -> Self {
        self.application = Some(id.into());
        self
    }

    /// Start from an existing context
    pub fn with_context(mut self, context: MessageContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Drop the message scope entirely
    pub fn without_context(mut self) -> Self {
        self.context = None;
        self
    }

    /// Current context
    pub fn message_context(&self) -> Option<&MessageContext> {
        self.context.as_ref()
    }

    /// Headers stamped for the next hop
    pub fn outbound(&self) -> &Map<String, Value> {
        &self.outbound
    }
}

impl Default for Exchange {
    fn default() -> Self {
        Self::new()
    }
}

impl FlowEvent for Exchange {
    fn host_id(&self) -> &str {
        &self.id
    }

    fn context(&self) -> Option<&MessageContext> {
        self.context.as_ref()
    }

    fn scope_mut(&mut self) -> Option<(&mut MessageContext, &dyn InboundCarrier)> {
        let inbound: &dyn InboundCarrier = &self.inbound;
        self.context.as_mut().map(|context| (context, inbound))
    }

    fn set_outbound_field(&mut self, key: &str, value: Value) {
        self.outbound.insert(key.to_string(), value);
    }

    fn payload_as_string(&self) -> Result<String, PayloadError> {
        match &self.body {
            Body::Empty => Ok(String::new()),
            Body::Bytes(bytes) => Ok(String::from_utf8(bytes.clone())?),
            Body::Unreadable(reason) => Err(PayloadError::Unavailable(reason.clone())),
        }
    }

    fn error(&self) -> Option<&(dyn Error + 'static)> {
        self.error.as_deref().map(|e| e as &(dyn Error + 'static))
    }

    fn flow_name(&self) -> Option<&str> {
        self.flow_name.as_deref()
    }

    fn application_id(&self) -> Option<&str> {
        self.application.as_deref()
    }
}
