//! Uniform view over inbound message metadata.
//!
//! A message arrives with either flat headers (one key per field) or, after
//! a queueing-protocol connector, a single header holding a nested property
//! bag. [`CarrierView`] hides the difference so the injector applies the same
//! precedence rules to both.

use crate::fields::FieldNames;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::hash::BuildHasher;

/// Read-only access to the metadata attached to an inbound message.
pub trait InboundCarrier {
    /// Look up a single inbound field
    fn inbound_field(&self, key: &str) -> Option<&Value>;

    /// Look up a nested property bag stored under `key`
    fn nested_bag(&self, key: &str) -> Option<&Map<String, Value>> {
        self.inbound_field(key).and_then(Value::as_object)
    }
}

impl InboundCarrier for Map<String, Value> {
    fn inbound_field(&self, key: &str) -> Option<&Value> {
        self.get(key)
    }
}

impl<S: BuildHasher> InboundCarrier for HashMap<String, Value, S> {
    fn inbound_field(&self, key: &str) -> Option<&Value> {
        self.get(key)
    }
}

/// Carrier with no fields, used when the host supplies none.
#[derive(Clone, Copy, Debug, Default)]
pub struct EmptyCarrier;

impl InboundCarrier for EmptyCarrier {
    fn inbound_field(&self, _key: &str) -> Option<&Value> {
        None
    }
}

/// Which lookup mechanics a message uses
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CarrierShape {
    /// Each field is an independent inbound key
    Flat,
    /// All fields are packed into one nested bag
    Nested,
}

/// Correlation lookups bound to one carrier shape for the duration of a call.
#[derive(Clone, Copy)]
pub enum CarrierView<'a> {
    /// Direct lookups on the inbound carrier
    Flat(&'a dyn InboundCarrier),
    /// Lookups redirected into the nested bag
    Nested(&'a Map<String, Value>),
}

impl<'a> CarrierView<'a> {
    /// Pick the shape for this carrier: nested when the bag key holds an
    /// object, flat otherwise.
    pub fn resolve(carrier: &'a dyn InboundCarrier, names: &FieldNames) -> Self {
        match carrier.nested_bag(&names.nested_bag) {
            Some(bag) => CarrierView::Nested(bag),
            None => CarrierView::Flat(carrier),
        }
    }

    /// The shape this view was resolved to
    pub fn shape(&self) -> CarrierShape {
        match self {
            CarrierView::Flat(_) => CarrierShape::Flat,
            CarrierView::Nested(_) => CarrierShape::Nested,
        }
    }

    /// Raw value of a field. JSON `null` counts as absent.
    pub fn get(&self, key: &str) -> Option<&'a Value> {
        let value = match *self {
            CarrierView::Flat(carrier) => carrier.inbound_field(key),
            CarrierView::Nested(bag) => bag.get(key),
        };
        value.filter(|v| !v.is_null())
    }

    /// Field rendered as identifier text. Strings are taken as-is, numbers
    /// and booleans are printed; objects and arrays are not identifiers.
    pub fn text(&self, key: &str) -> Option<String> {
        self.get(key).and_then(value_as_text)
    }
}

pub(crate) fn value_as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}
