//! # Values
//!
//! The in-memory value graph handled by the codec.
//!
//! [`Value`] is a superset of the JSON data model: besides the JSON-native variants it can hold
//! positional tuples, raw bytes, HTML markup, UUIDs, UTC timestamps and application-defined
//! [`Extension`] values. Objects keep their insertion order ([`Map`] is an `IndexMap`) through an
//! encode/decode cycle, although map equality itself does not depend on order.
mod markup;

pub use markup::{Markup, RenderHtml};

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde_json::Number;
use std::{any::Any, fmt::Debug, sync::Arc};
use uuid::Uuid;

/// An insertion-ordered string-keyed map of values.
pub type Map = IndexMap<String, Value>;

/// A node of the value graph.
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    /// A resizable sequence. Encodes to a plain JSON array.
    Array(Vec<Value>),
    /// A fixed-length sequence with positional semantics. Encodes to a tagged array.
    Tuple(Vec<Value>),
    Object(Map),
    Bytes(Vec<u8>),
    Markup(Markup),
    Uuid(Uuid),
    DateTime(DateTime<Utc>),
    /// A value of an application-defined type, handled by an application-registered tag.
    Extension(Arc<dyn Extension>),
}

/// Object-safe equality, implemented for every `PartialEq + 'static` type.
pub trait DynEq {
    fn as_any(&self) -> &dyn Any;
    fn dyn_eq(&self, other: &dyn Any) -> bool;
}

impl<T: PartialEq + Any> DynEq for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn dyn_eq(&self, other: &dyn Any) -> bool {
        other.downcast_ref::<T>().is_some_and(|other| self == other)
    }
}

/// An application-defined value type that can live inside a [`Value`] graph.
///
/// The codec knows nothing about extension values: a tag registered by the application is
/// responsible for recognising them (usually with [`Value::downcast_extension`]) and converting
/// them to and from JSON.
///
/// ```rust
/// use tagjson_core::value::{Extension, Value};
///
/// #[derive(Debug, PartialEq)]
/// struct Point(i64, i64);
///
/// impl Extension for Point {
///     fn type_name(&self) -> &'static str {
///         "point"
///     }
/// }
///
/// let value = Value::extension(Point(1, 2));
/// assert_eq!(value.downcast_extension::<Point>(), Some(&Point(1, 2)));
/// assert_eq!(value.type_name(), "point");
/// ```
pub trait Extension: DynEq + Debug + Send + Sync {
    /// A short name used in diagnostics.
    fn type_name(&self) -> &'static str;

    /// Exposes the HTML-rendering capability, if the type has one.
    ///
    /// Values returning `Some` are encoded by the built-in markup tag unless an earlier tag
    /// claims them first.
    fn as_html(&self) -> Option<&dyn RenderHtml> {
        None
    }
}

impl Value {
    /// Builds a [`Value::Tuple`] from any sequence of convertible items.
    pub fn tuple<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        Value::Tuple(items.into_iter().map(Into::into).collect())
    }

    /// Builds a [`Value::Array`] from any sequence of convertible items.
    pub fn array<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        Value::Array(items.into_iter().map(Into::into).collect())
    }

    /// Builds a [`Value::Object`] from key/value pairs, keeping their order.
    pub fn object<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Value::Object(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub fn bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Value::Bytes(bytes.into())
    }

    pub fn extension<T: Extension + 'static>(ext: T) -> Self {
        Value::Extension(Arc::new(ext))
    }

    /// Lifts plain JSON into a value without interpreting any tags.
    ///
    /// Use [`crate::serializer::TaggedJsonSerializer::loads`] to decode a tagged payload.
    pub fn from_json(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from_json).collect())
            }
            serde_json::Value::Object(map) => Value::Object(
                map.into_iter()
                    .map(|(k, v)| (k, Value::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// Returns a short name of the value's type, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Tuple(_) => "tuple",
            Value::Object(_) => "object",
            Value::Bytes(_) => "bytes",
            Value::Markup(_) => "markup",
            Value::Uuid(_) => "uuid",
            Value::DateTime(_) => "datetime",
            Value::Extension(ext) => ext.type_name(),
        }
    }

    /// Returns the HTML-rendering capability of the value, if it has one.
    pub fn as_html(&self) -> Option<&dyn RenderHtml> {
        match self {
            Value::Markup(markup) => Some(markup),
            Value::Extension(ext) => ext.as_html(),
            _ => None,
        }
    }

    /// Returns the extension value as a `T`, if it is one.
    pub fn downcast_extension<T: Extension + 'static>(&self) -> Option<&T> {
        match self {
            Value::Extension(ext) => ext.as_ref().as_any().downcast_ref::<T>(),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Map> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Tuple(a), Value::Tuple(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a == b,
            (Value::Bytes(a), Value::Bytes(b)) => a == b,
            (Value::Markup(a), Value::Markup(b)) => a == b,
            (Value::Uuid(a), Value::Uuid(b)) => a == b,
            (Value::DateTime(a), Value::DateTime(b)) => a == b,
            (Value::Extension(a), Value::Extension(b)) => a.as_ref().dyn_eq(b.as_ref().as_any()),
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n.into())
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n.into())
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Value::Number(n.into())
    }
}

/// Non-finite floats have no JSON representation and become [`Value::Null`].
impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Number::from_f64(n).map_or(Value::Null, Value::Number)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<Map> for Value {
    fn from(map: Map) -> Self {
        Value::Object(map)
    }
}

impl From<Markup> for Value {
    fn from(markup: Markup) -> Self {
        Value::Markup(markup)
    }
}

impl From<Uuid> for Value {
    fn from(uuid: Uuid) -> Self {
        Value::Uuid(uuid)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(dt: DateTime<Utc>) -> Self {
        Value::DateTime(dt)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::Null, Into::into)
    }
}
