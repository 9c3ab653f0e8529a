//! # Tags
//!
//! A tag is a rule that teaches a [`TaggedJsonSerializer`] how to represent one kind of value in
//! JSON and how to get it back.
//!
//! Every tag pairs a predicate ([`JsonTag::check`]) with two conversions:
//!
//! * [`JsonTag::to_json`] turns a matching value into JSON, delegating nested values back to the
//!   serializer so that every registered tag is honoured at any depth.
//! * [`JsonTag::to_value`] reverses it. The serializer calls it on the unwrapped body, whose nested
//!   values have already been decoded.
//!
//! A tag with a [`key`](JsonTag::key) wraps its output as `{"<key>": <body>}`. A tag without one is
//! *transparent*: it only recurses into a container and emits no wrapper.
//!
//! The tags registered by default live in [`builtin`].
pub mod builtin;

use crate::{BoxError, serializer::TaggedJsonSerializer, value::Value};
use serde_json::Value as Json;

#[derive(Debug, thiserror::Error)]
pub enum TagError {
    #[error("Tag '{tag}' cannot convert a {found} value")]
    Unconvertible { tag: String, found: &'static str },

    #[error("No registered tag can represent a {0} value as JSON")]
    Unrepresentable(&'static str),

    #[error("Invalid base64 body: '{0}'")]
    Base64(#[from] base64::DecodeError),

    #[error("Invalid UUID body: '{0}'")]
    Uuid(#[from] uuid::Error),

    #[error("Invalid HTTP date: '{0}'")]
    Date(String),

    #[error("Year {0} cannot be written as an HTTP date")]
    YearOutOfRange(i32),

    #[error(transparent)]
    Custom(#[from] BoxError),
}

impl TagError {
    /// The error returned when a tag is asked to convert a value outside of its precondition.
    pub fn unconvertible(tag: &str, found: &Value) -> Self {
        TagError::Unconvertible {
            tag: tag.to_string(),
            found: found.type_name(),
        }
    }
}

/// A rule for converting one kind of [`Value`] to and from JSON.
///
/// Tags receive the serializer that owns them on every call, so that nested values go through the
/// same registry (and therefore through application-registered tags too).
///
/// # Example
///
/// A tag storing an ordered list of key/value pairs as `[[key, value], ...]`. It is registered at
/// index 0 so it runs before anything else can claim the value.
///
/// ```rust
/// use tagjson_core::{
///     serializer::{RegisterOptions, TaggedJsonSerializer},
///     tag::{JsonTag, TagError},
///     value::{Extension, Value},
/// };
///
/// #[derive(Debug, PartialEq)]
/// struct Pairs(Vec<(String, Value)>);
///
/// impl Extension for Pairs {
///     fn type_name(&self) -> &'static str {
///         "pairs"
///     }
/// }
///
/// struct TagPairs;
///
/// impl JsonTag for TagPairs {
///     fn key(&self) -> Option<&str> {
///         Some(" od")
///     }
///
///     fn check(&self, value: &Value, _: &TaggedJsonSerializer) -> bool {
///         value.downcast_extension::<Pairs>().is_some()
///     }
///
///     fn to_json(
///         &self,
///         value: &Value,
///         serializer: &TaggedJsonSerializer,
///     ) -> Result<serde_json::Value, TagError> {
///         let Some(Pairs(pairs)) = value.downcast_extension::<Pairs>() else {
///             return Err(TagError::unconvertible(" od", value));
///         };
///         pairs
///             .iter()
///             .map(|(k, v)| Ok::<_, TagError>(serde_json::json!([k, serializer.tag(v)?])))
///             .collect()
///     }
///
///     fn to_value(&self, body: Value) -> Result<Value, TagError> {
///         let items = match body {
///             Value::Array(items) => items,
///             other => return Err(TagError::unconvertible(" od", &other)),
///         };
///         let mut pairs = Vec::with_capacity(items.len());
///         for item in items {
///             match item {
///                 Value::Array(mut kv) if kv.len() == 2 => {
///                     let v = kv.pop().unwrap_or_default();
///                     let Some(Value::String(k)) = kv.pop() else {
///                         return Err(TagError::unconvertible(" od", &Value::Array(kv)));
///                     };
///                     pairs.push((k, v));
///                 }
///                 other => return Err(TagError::unconvertible(" od", &other)),
///             }
///         }
///         Ok(Value::extension(Pairs(pairs)))
///     }
/// }
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut serializer = TaggedJsonSerializer::new();
/// serializer.register_with(TagPairs, RegisterOptions::at(0))?;
///
/// let value = Value::extension(Pairs(vec![("b".into(), 1.into()), ("a".into(), Value::bytes(*b"!"))]));
/// let text = serializer.dumps(&value)?;
/// assert_eq!(text, r#"{" od":[["b",1],["a",{" b":"IQ=="}]]}"#);
/// assert_eq!(serializer.loads(&text)?, value);
/// # Ok(())
/// # }
/// ```
pub trait JsonTag: Send + Sync {
    /// The discriminator marking values encoded by this tag, or `None` for a transparent tag.
    fn key(&self) -> Option<&str> {
        None
    }

    /// Whether this tag should encode `value`. Must be total and side-effect free.
    fn check(&self, value: &Value, serializer: &TaggedJsonSerializer) -> bool;

    /// Converts a value accepted by [`check`](Self::check) into JSON. The key is added later by
    /// [`tag`](Self::tag).
    fn to_json(&self, value: &Value, serializer: &TaggedJsonSerializer) -> Result<Json, TagError>;

    /// Converts the JSON body of a tagged value back into the original value. The key has already
    /// been removed.
    ///
    /// Transparent tags are never asked to decode anything.
    fn to_value(&self, body: Value) -> Result<Value, TagError> {
        Err(TagError::unconvertible(
            self.key().unwrap_or("<transparent>"),
            &body,
        ))
    }

    /// Converts the value into JSON and adds the wrapper around it, if this tag has a key.
    fn tag(&self, value: &Value, serializer: &TaggedJsonSerializer) -> Result<Json, TagError> {
        let body = self.to_json(value, serializer)?;

        Ok(match self.key() {
            Some(key) => {
                let mut wrapper = serde_json::Map::with_capacity(1);
                wrapper.insert(key.to_string(), body);
                Json::Object(wrapper)
            }
            None => body,
        })
    }
}
