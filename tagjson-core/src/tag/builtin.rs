//! # Built-in Tags
//!
//! The tags registered by [`TaggedJsonSerializer::new`], in order:
//!
//! | Tag            | Key     | Handles                                              |
//! |----------------|---------|------------------------------------------------------|
//! | [`TagDict`]    | `" di"` | single-entry objects whose key is a registered key   |
//! | [`PassDict`]   |         | any other object                                     |
//! | [`TagTuple`]   | `" t"`  | [`Value::Tuple`]                                     |
//! | [`PassList`]   |         | [`Value::Array`]                                     |
//! | [`TagBytes`]   | `" b"`  | [`Value::Bytes`], as padded standard base64          |
//! | [`TagMarkup`]  | `" m"`  | anything with the [`RenderHtml`] capability          |
//! | [`TagUuid`]    | `" u"`  | [`Value::Uuid`], as 32 lowercase hex digits          |
//! | [`TagDateTime`]| `" d"`  | [`Value::DateTime`], as an HTTP date                 |
//!
//! [`RenderHtml`]: crate::value::RenderHtml
use super::{JsonTag, TagError};
use crate::{
    serializer::TaggedJsonSerializer,
    value::{Map, Markup, Value},
};
use base64::{Engine, engine::general_purpose::STANDARD};
use chrono::{DateTime, Datelike, NaiveDateTime, Utc};
use serde_json::Value as Json;
use std::{ops::RangeInclusive, sync::Arc};
use uuid::Uuid;

pub const DICT_KEY: &str = " di";
pub const TUPLE_KEY: &str = " t";
pub const BYTES_KEY: &str = " b";
pub const MARKUP_KEY: &str = " m";
pub const UUID_KEY: &str = " u";
pub const DATETIME_KEY: &str = " d";

/// Appended to the key of a guarded single-entry object on the wire.
const GUARD_SUFFIX: &str = "__";

/// RFC 7231 `IMF-fixdate`, e.g. `Mon, 01 Jan 2024 00:00:00 GMT`.
const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";
/// Years an HTTP date can carry.
const HTTP_DATE_YEARS: RangeInclusive<i32> = 1..=9999;
/// Obsolete RFC 850 format, e.g. `Monday, 01-Jan-24 00:00:00 GMT`.
const RFC850_FORMAT: &str = "%A, %d-%b-%y %H:%M:%S GMT";
/// ANSI C `asctime()` format, e.g. `Mon Jan  1 00:00:00 2024`.
const ASCTIME_FORMAT: &str = "%a %b %e %H:%M:%S %Y";

/// The built-in tags, in the order the default serializer registers them.
pub fn default_tags() -> Vec<Arc<dyn JsonTag>> {
    vec![
        Arc::new(TagDict),
        Arc::new(PassDict),
        Arc::new(TagTuple),
        Arc::new(PassList),
        Arc::new(TagBytes),
        Arc::new(TagMarkup),
        Arc::new(TagUuid),
        Arc::new(TagDateTime),
    ]
}

/// Guards single-entry objects whose only key is itself a registered tag key.
///
/// Without it, `{" t": [1, 2]}` would decode as a tuple. The key is suffixed with `__` on the wire,
/// and the suffix is removed again when decoding. Must run before [`PassDict`].
///
/// Decoding a body whose key does not end in `__` is an error rather than a blind truncation.
#[derive(Debug, Clone, Copy, Default)]
pub struct TagDict;

impl JsonTag for TagDict {
    fn key(&self) -> Option<&str> {
        Some(DICT_KEY)
    }

    fn check(&self, value: &Value, serializer: &TaggedJsonSerializer) -> bool {
        match value {
            Value::Object(map) if map.len() == 1 => map
                .keys()
                .next()
                .is_some_and(|key| serializer.is_registered(key)),
            _ => false,
        }
    }

    fn to_json(&self, value: &Value, serializer: &TaggedJsonSerializer) -> Result<Json, TagError> {
        let Some((key, inner)) = value.as_object().and_then(|map| map.first()) else {
            return Err(TagError::unconvertible(DICT_KEY, value));
        };

        let mut guarded = serde_json::Map::with_capacity(1);
        guarded.insert(format!("{key}{GUARD_SUFFIX}"), serializer.tag(inner)?);
        Ok(Json::Object(guarded))
    }

    fn to_value(&self, body: Value) -> Result<Value, TagError> {
        match body {
            Value::Object(mut map) if map.len() == 1 => {
                let guarded = map.pop().and_then(|(key, inner)| {
                    let key = key.strip_suffix(GUARD_SUFFIX)?.to_string();
                    Some((key, inner))
                });

                match guarded {
                    Some((key, inner)) => Ok(Value::Object(Map::from([(key, inner)]))),
                    None => Err(TagError::Unconvertible {
                        tag: DICT_KEY.to_string(),
                        found: "object without a guarded key",
                    }),
                }
            }
            other => Err(TagError::unconvertible(DICT_KEY, &other)),
        }
    }
}

/// Recurses into objects. JSON keys are always strings, so only values are tagged.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassDict;

impl JsonTag for PassDict {
    fn check(&self, value: &Value, _: &TaggedJsonSerializer) -> bool {
        matches!(value, Value::Object(_))
    }

    fn to_json(&self, value: &Value, serializer: &TaggedJsonSerializer) -> Result<Json, TagError> {
        let Value::Object(map) = value else {
            return Err(TagError::unconvertible("<object>", value));
        };

        map.iter()
            .map(|(k, v)| Ok((k.clone(), serializer.tag(v)?)))
            .collect::<Result<serde_json::Map<_, _>, TagError>>()
            .map(Json::Object)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TagTuple;

impl JsonTag for TagTuple {
    fn key(&self) -> Option<&str> {
        Some(TUPLE_KEY)
    }

    fn check(&self, value: &Value, _: &TaggedJsonSerializer) -> bool {
        matches!(value, Value::Tuple(_))
    }

    fn to_json(&self, value: &Value, serializer: &TaggedJsonSerializer) -> Result<Json, TagError> {
        let Value::Tuple(items) = value else {
            return Err(TagError::unconvertible(TUPLE_KEY, value));
        };

        tag_items(items, serializer)
    }

    fn to_value(&self, body: Value) -> Result<Value, TagError> {
        match body {
            Value::Array(items) => Ok(Value::Tuple(items)),
            other => Err(TagError::unconvertible(TUPLE_KEY, &other)),
        }
    }
}

/// Recurses into arrays.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassList;

impl JsonTag for PassList {
    fn check(&self, value: &Value, _: &TaggedJsonSerializer) -> bool {
        matches!(value, Value::Array(_))
    }

    fn to_json(&self, value: &Value, serializer: &TaggedJsonSerializer) -> Result<Json, TagError> {
        let Value::Array(items) = value else {
            return Err(TagError::unconvertible("<array>", value));
        };

        tag_items(items, serializer)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TagBytes;

impl JsonTag for TagBytes {
    fn key(&self) -> Option<&str> {
        Some(BYTES_KEY)
    }

    fn check(&self, value: &Value, _: &TaggedJsonSerializer) -> bool {
        matches!(value, Value::Bytes(_))
    }

    fn to_json(&self, value: &Value, _: &TaggedJsonSerializer) -> Result<Json, TagError> {
        match value {
            Value::Bytes(bytes) => Ok(Json::String(STANDARD.encode(bytes))),
            other => Err(TagError::unconvertible(BYTES_KEY, other)),
        }
    }

    fn to_value(&self, body: Value) -> Result<Value, TagError> {
        match body {
            Value::String(text) => Ok(Value::Bytes(STANDARD.decode(text)?)),
            other => Err(TagError::unconvertible(BYTES_KEY, &other)),
        }
    }
}

/// Serializes anything that can render itself as HTML. Always decodes to [`Markup`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TagMarkup;

impl JsonTag for TagMarkup {
    fn key(&self) -> Option<&str> {
        Some(MARKUP_KEY)
    }

    fn check(&self, value: &Value, _: &TaggedJsonSerializer) -> bool {
        value.as_html().is_some()
    }

    fn to_json(&self, value: &Value, _: &TaggedJsonSerializer) -> Result<Json, TagError> {
        match value.as_html() {
            Some(html) => Ok(Json::String(html.render_html())),
            None => Err(TagError::unconvertible(MARKUP_KEY, value)),
        }
    }

    fn to_value(&self, body: Value) -> Result<Value, TagError> {
        match body {
            Value::String(html) => Ok(Value::Markup(Markup::new(html))),
            other => Err(TagError::unconvertible(MARKUP_KEY, &other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TagUuid;

impl JsonTag for TagUuid {
    fn key(&self) -> Option<&str> {
        Some(UUID_KEY)
    }

    fn check(&self, value: &Value, _: &TaggedJsonSerializer) -> bool {
        matches!(value, Value::Uuid(_))
    }

    fn to_json(&self, value: &Value, _: &TaggedJsonSerializer) -> Result<Json, TagError> {
        match value {
            Value::Uuid(uuid) => Ok(Json::String(uuid.simple().to_string())),
            other => Err(TagError::unconvertible(UUID_KEY, other)),
        }
    }

    fn to_value(&self, body: Value) -> Result<Value, TagError> {
        match body {
            Value::String(hex) => Ok(Value::Uuid(Uuid::parse_str(&hex)?)),
            other => Err(TagError::unconvertible(UUID_KEY, &other)),
        }
    }
}

/// Serializes timestamps as HTTP dates, which have a resolution of one second.
///
/// Only years 1 through 9999 fit the four digit year of an HTTP date. Anything else fails to
/// encode with [`TagError::YearOutOfRange`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TagDateTime;

impl JsonTag for TagDateTime {
    fn key(&self) -> Option<&str> {
        Some(DATETIME_KEY)
    }

    fn check(&self, value: &Value, _: &TaggedJsonSerializer) -> bool {
        matches!(value, Value::DateTime(_))
    }

    fn to_json(&self, value: &Value, _: &TaggedJsonSerializer) -> Result<Json, TagError> {
        match value {
            Value::DateTime(dt) if HTTP_DATE_YEARS.contains(&dt.year()) => {
                Ok(Json::String(http_date(dt)))
            }
            Value::DateTime(dt) => Err(TagError::YearOutOfRange(dt.year())),
            other => Err(TagError::unconvertible(DATETIME_KEY, other)),
        }
    }

    fn to_value(&self, body: Value) -> Result<Value, TagError> {
        match body {
            Value::String(date) => parse_http_date(&date).map(Value::DateTime),
            other => Err(TagError::unconvertible(DATETIME_KEY, &other)),
        }
    }
}

fn tag_items(items: &[Value], serializer: &TaggedJsonSerializer) -> Result<Json, TagError> {
    items
        .iter()
        .map(|item| serializer.tag(item))
        .collect::<Result<Vec<_>, _>>()
        .map(Json::Array)
}

/// Formats a timestamp as an RFC 7231 HTTP date. Sub-second precision is dropped.
pub fn http_date(dt: &DateTime<Utc>) -> String {
    dt.format(HTTP_DATE_FORMAT).to_string()
}

/// Parses an HTTP date into UTC.
///
/// Accepts RFC 1123 dates with any zone or offset (which are normalized to UTC), as well as the
/// obsolete RFC 850 and `asctime()` formats.
pub fn parse_http_date(date: &str) -> Result<DateTime<Utc>, TagError> {
    let date = date.trim();

    if let Ok(dt) = DateTime::parse_from_rfc2822(date) {
        return Ok(dt.with_timezone(&Utc));
    }

    [RFC850_FORMAT, ASCTIME_FORMAT]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(date, format).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| TagError::Date(date.to_string()))
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_http_date_format() {
        let dt = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(http_date(&dt), "Mon, 01 Jan 2024 00:00:00 GMT");
    }

    #[test]
    fn test_datetime_rejects_years_outside_http_dates() {
        let serializer = TaggedJsonSerializer::empty();

        for year in [0, -1, 10000] {
            let dt = Utc.with_ymd_and_hms(year, 3, 4, 5, 6, 7).unwrap();
            let err = TagDateTime
                .to_json(&Value::DateTime(dt), &serializer)
                .unwrap_err();
            assert!(matches!(err, TagError::YearOutOfRange(y) if y == year));
        }
    }

    #[test]
    fn test_parse_http_date_formats() {
        let expected = Utc.with_ymd_and_hms(1994, 11, 6, 8, 49, 37).unwrap();

        for date in [
            "Sun, 06 Nov 1994 08:49:37 GMT",
            "Sunday, 06-Nov-94 08:49:37 GMT",
            "Sun Nov  6 08:49:37 1994",
            "Sun, 06 Nov 1994 09:49:37 +0100",
        ] {
            assert_eq!(parse_http_date(date).unwrap(), expected, "parsing {date:?}");
        }
    }

    #[test]
    fn test_parse_http_date_rejects_garbage() {
        let err = parse_http_date("yesterday").unwrap_err();
        assert!(matches!(err, TagError::Date(d) if d == "yesterday"));
    }

    #[test]
    fn test_dict_decode_requires_suffix() {
        let body = Value::object([(" t", Value::Null)]);
        let err = TagDict.to_value(body).unwrap_err();
        assert!(matches!(err, TagError::Unconvertible { .. }));
    }

    #[test]
    fn test_transparent_tags_do_not_decode() {
        assert!(PassDict.to_value(Value::Null).is_err());
        assert!(PassList.to_value(Value::Null).is_err());
    }
}
