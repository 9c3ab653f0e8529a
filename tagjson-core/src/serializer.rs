//! # Tagged JSON Serializer
//!
//! [`TaggedJsonSerializer`] owns an ordered list of [`JsonTag`]s and a table of the ones that have
//! a key. It is the registry every tag recurses through.
//!
//! ## Encoding
//!
//! [`TaggedJsonSerializer::tag`] walks the tags in order and lets the **first** one whose
//! [`check`](JsonTag::check) accepts the value encode it. Order, not specificity, decides: a tag
//! for a special case of an existing tag must be registered in front of it (see
//! [`RegisterOptions::at`]). JSON-native scalars that no tag claims are emitted as they are.
//!
//! ## Decoding
//!
//! [`TaggedJsonSerializer::loads`] parses the text and then visits every object, innermost first.
//! An object with exactly one entry whose key is registered is replaced by that tag's
//! [`to_value`](JsonTag::to_value) of the entry's value; any other object is kept unchanged.
//!
//! ## Sharing
//!
//! Registration takes `&mut self`, everything else takes `&self`. Once all tags are registered,
//! the serializer is read-only and can be shared between threads (e.g. in an `Arc`) without
//! locking.
//!
//! ```rust
//! use tagjson_core::{serializer::TaggedJsonSerializer, value::Value};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let serializer = TaggedJsonSerializer::new();
//!
//! let value = Value::object([("x", Value::tuple([1, 2]))]);
//! let text = serializer.dumps(&value)?;
//! assert_eq!(text, r#"{"x":{" t":[1,2]}}"#);
//!
//! assert_eq!(serializer.loads(&text)?, value);
//! # Ok(())
//! # }
//! ```
use crate::{
    tag::{JsonTag, TagError, builtin},
    value::{Map, Value},
};
use serde_json::Value as Json;
use std::{collections::HashMap, fmt, sync::Arc};

#[derive(Debug, thiserror::Error)]
pub enum RegisterError {
    #[error("Tag '{0}' is already registered")]
    DuplicateKey(String),
}

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Tag(#[from] TagError),
}

/// Options for [`TaggedJsonSerializer::register_with`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegisterOptions {
    /// Replace the tag currently registered under the same key instead of failing.
    pub force: bool,
    /// Position in the tag order. `None` appends; indices past the end are clamped.
    pub index: Option<usize>,
}

impl RegisterOptions {
    /// Inserts the tag at `index` in the tag order.
    pub fn at(index: usize) -> Self {
        Self {
            index: Some(index),
            ..Self::default()
        }
    }

    /// Overwrites an existing tag with the same key.
    pub fn force(self) -> Self {
        Self {
            force: true,
            ..self
        }
    }
}

/// A registry of tags that encodes [`Value`]s to compact tagged JSON and back.
pub struct TaggedJsonSerializer {
    tags: HashMap<String, Arc<dyn JsonTag>>,
    order: Vec<Arc<dyn JsonTag>>,
}

impl TaggedJsonSerializer {
    /// Creates a serializer with the [built-in tags](builtin::default_tags).
    pub fn new() -> Self {
        let mut serializer = Self::empty();
        for tag in builtin::default_tags() {
            // The built-in keys are distinct, so appending to an empty registry cannot conflict.
            serializer.insert(tag, RegisterOptions::default());
        }
        serializer
    }

    /// Creates a serializer without any tags.
    pub fn empty() -> Self {
        Self {
            tags: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Appends a tag to the tag order.
    ///
    /// # Returns
    ///
    /// * `Err(RegisterError::DuplicateKey)` - If a tag with the same key is already registered.
    pub fn register<T: JsonTag + 'static>(&mut self, tag: T) -> Result<(), RegisterError> {
        self.register_with(tag, RegisterOptions::default())
    }

    /// Registers a tag with explicit [`RegisterOptions`].
    ///
    /// With `force`, the key table points at the new tag afterwards, but the replaced tag keeps its
    /// place in the tag order and can still encode the values it accepts.
    ///
    /// # Returns
    ///
    /// * `Err(RegisterError::DuplicateKey)` - If the key is taken and `force` is not set. The
    ///   serializer is left unchanged.
    pub fn register_with<T: JsonTag + 'static>(
        &mut self,
        tag: T,
        options: RegisterOptions,
    ) -> Result<(), RegisterError> {
        self.register_arc(Arc::new(tag), options)
    }

    /// Registers a tag that is already shared, e.g. one of [`builtin::default_tags`].
    pub fn register_arc(
        &mut self,
        tag: Arc<dyn JsonTag>,
        options: RegisterOptions,
    ) -> Result<(), RegisterError> {
        if let Some(key) = tag.key()
            && !options.force
            && self.tags.contains_key(key)
        {
            return Err(RegisterError::DuplicateKey(key.to_string()));
        }

        self.insert(tag, options);
        Ok(())
    }

    fn insert(&mut self, tag: Arc<dyn JsonTag>, options: RegisterOptions) {
        let index = options
            .index
            .map_or(self.order.len(), |i| i.min(self.order.len()));

        if let Some(key) = tag.key() {
            let replaced = self.tags.insert(key.to_string(), Arc::clone(&tag)).is_some();
            tracing::debug!(key, index, replaced, "registered tag");
        } else {
            tracing::debug!(index, "registered transparent tag");
        }

        self.order.insert(index, tag);
    }

    /// Whether `key` belongs to a registered tag.
    pub fn is_registered(&self, key: &str) -> bool {
        self.tags.contains_key(key)
    }

    /// Returns the tag registered under `key`.
    pub fn get(&self, key: &str) -> Option<&dyn JsonTag> {
        self.tags.get(key).map(|tag| tag.as_ref())
    }

    /// Iterates over all tags in the order they are tried when encoding.
    pub fn order(&self) -> impl Iterator<Item = &dyn JsonTag> {
        self.order.iter().map(|tag| tag.as_ref())
    }

    /// Converts a value to its tagged JSON representation.
    ///
    /// The first tag that accepts the value encodes it. Values no tag accepts must already be
    /// representable in JSON: scalars are emitted as-is, arrays and objects are emitted without
    /// tagging their contents. Anything else is [`TagError::Unrepresentable`].
    pub fn tag(&self, value: &Value) -> Result<Json, TagError> {
        match self.order.iter().find(|tag| tag.check(value, self)) {
            Some(tag) => tag.tag(value, self),
            None => untagged_json(value),
        }
    }

    /// Converts a single tagged object back to the original value.
    ///
    /// Only a one-entry [`Value::Object`] whose key is registered is converted; every other value
    /// is returned unchanged. Nested values are not visited, since [`loads`](Self::loads) has
    /// already decoded them by the time their parent is untagged.
    pub fn untag(&self, value: Value) -> Result<Value, TagError> {
        let Value::Object(mut map) = value else {
            return Ok(value);
        };

        if map.len() == 1
            && let Some(tag) = map.first().and_then(|(key, _)| self.tags.get(key)).cloned()
            && let Some((key, body)) = map.pop()
        {
            tracing::trace!(key = %key, "untagging value");
            return tag.to_value(body);
        }

        Ok(Value::Object(map))
    }

    /// Tags the value and writes it as compact JSON, without any whitespace.
    pub fn dumps(&self, value: &Value) -> Result<String, TagError> {
        Ok(self.tag(value)?.to_string())
    }

    /// Parses JSON text and decodes every tagged object in it.
    ///
    /// # Returns
    ///
    /// * `Err(LoadError::Json)` - If the text is not valid JSON.
    /// * `Err(LoadError::Tag)` - If a tagged object's body cannot be decoded by its tag.
    pub fn loads(&self, text: &str) -> Result<Value, LoadError> {
        let json: Json = serde_json::from_str(text)?;
        Ok(self.decode(json)?)
    }

    /// Decodes already parsed JSON, innermost objects first.
    pub fn decode(&self, json: Json) -> Result<Value, TagError> {
        match json {
            Json::Array(items) => items
                .into_iter()
                .map(|item| self.decode(item))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            Json::Object(entries) => {
                let map = entries
                    .into_iter()
                    .map(|(k, v)| Ok((k, self.decode(v)?)))
                    .collect::<Result<Map, TagError>>()?;
                self.untag(Value::Object(map))
            }
            scalar => Ok(Value::from_json(scalar)),
        }
    }
}

/// JSON for values that no tag claimed.
fn untagged_json(value: &Value) -> Result<Json, TagError> {
    Ok(match value {
        Value::Null => Json::Null,
        Value::Bool(b) => Json::Bool(*b),
        Value::Number(n) => Json::Number(n.clone()),
        Value::String(s) => Json::String(s.clone()),
        Value::Array(items) => Json::Array(
            items
                .iter()
                .map(untagged_json)
                .collect::<Result<_, _>>()?,
        ),
        Value::Object(map) => Json::Object(
            map.iter()
                .map(|(k, v)| Ok((k.clone(), untagged_json(v)?)))
                .collect::<Result<_, TagError>>()?,
        ),
        other => return Err(TagError::Unrepresentable(other.type_name())),
    })
}

impl Default for TaggedJsonSerializer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TaggedJsonSerializer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaggedJsonSerializer")
            .field(
                "order",
                &self
                    .order
                    .iter()
                    .map(|tag| tag.key().unwrap_or("<transparent>"))
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}
