use base64::{Engine, engine::general_purpose::STANDARD};
use colored::*;
use std::fmt::{Display, Write};
use tagjson_core::{LoadError, TagError, Value};

/// A wrapper struct for a formatted, colored string.
///
/// Implements `Display` so it can be printed directly.
pub struct FormattedString(pub String);

/// A decoded value shown as plain JSON, losing the distinction between tagged and native types.
pub struct PlainJson(pub Value);

pub struct GenericError<T: Display>(pub &'static str, pub T);

impl std::fmt::Display for FormattedString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.0)
    }
}

impl From<serde_json::Value> for FormattedString {
    fn from(value: serde_json::Value) -> Self {
        FormattedString(serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string()))
    }
}

impl From<PlainJson> for FormattedString {
    fn from(PlainJson(value): PlainJson) -> Self {
        FormattedString::from(plain_json(value))
    }
}

/// The typed view of a decoded value.
impl From<Value> for FormattedString {
    fn from(value: Value) -> Self {
        let mut out = String::new();
        write_value(&mut out, &value, 0);
        FormattedString(out)
    }
}

impl From<LoadError> for FormattedString {
    fn from(err: LoadError) -> Self {
        let heading = match err {
            LoadError::Json(_) => "Invalid JSON:",
            LoadError::Tag(_) => "Failed to decode tagged value:",
        };
        FormattedString(format!("{}\n\n'{}'", heading.red().bold(), err))
    }
}

impl From<TagError> for FormattedString {
    fn from(err: TagError) -> Self {
        FormattedString(format!(
            "{}\n\n'{}'",
            "Failed to encode value:".red().bold(),
            err
        ))
    }
}

impl From<anyhow::Error> for FormattedString {
    fn from(err: anyhow::Error) -> Self {
        FormattedString(format!(
            "{}\n\n'{:#}'",
            "Failed to read payload:".red().bold(),
            err
        ))
    }
}

impl<T: Display> From<GenericError<T>> for FormattedString {
    fn from(GenericError(msg, err): GenericError<T>) -> Self {
        FormattedString(format!("{}:\n\n'{}'", msg.red().bold(), err))
    }
}

fn write_value(out: &mut String, value: &Value, depth: usize) {
    match value {
        Value::Null => out.push_str(&"null".dimmed().to_string()),
        Value::Bool(b) => out.push_str(&b.to_string().purple().to_string()),
        Value::Number(n) => out.push_str(&n.to_string().yellow().to_string()),
        Value::String(s) => out.push_str(&quoted(s).green().to_string()),
        Value::Array(items) => write_items(out, "[", "]", items, depth),
        Value::Tuple(items) => {
            out.push_str(&"tuple".cyan().to_string());
            write_items(out, "(", ")", items, depth);
        }
        Value::Object(map) => {
            if map.is_empty() {
                out.push_str("{}");
                return;
            }
            out.push_str("{\n");
            for (key, value) in map {
                indent(out, depth + 1);
                let _ = write!(out, "{}: ", quoted(key));
                write_value(out, value, depth + 1);
                out.push_str(",\n");
            }
            indent(out, depth);
            out.push('}');
        }
        Value::Bytes(bytes) => {
            let hex: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
            let _ = write!(out, "{}({})", "bytes".cyan(), hex.yellow());
        }
        Value::Markup(markup) => {
            let _ = write!(
                out,
                "{}({})",
                "markup".cyan(),
                quoted(markup.as_str()).green()
            );
        }
        Value::Uuid(uuid) => {
            let _ = write!(out, "{}({})", "uuid".cyan(), uuid.to_string().yellow());
        }
        Value::DateTime(dt) => {
            let _ = write!(out, "{}({})", "datetime".cyan(), dt.to_rfc3339().yellow());
        }
        Value::Extension(ext) => {
            let _ = write!(out, "{}({:?})", ext.type_name().cyan(), ext);
        }
    }
}

fn write_items(out: &mut String, open: &str, close: &str, items: &[Value], depth: usize) {
    if items.is_empty() {
        out.push_str(open);
        out.push_str(close);
        return;
    }

    out.push_str(open);
    out.push('\n');
    for item in items {
        indent(out, depth + 1);
        write_value(out, item, depth + 1);
        out.push_str(",\n");
    }
    indent(out, depth);
    out.push_str(close);
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str("  ");
    }
}

fn quoted(s: &str) -> String {
    serde_json::Value::String(s.to_string()).to_string()
}

/// Lowers a decoded value to plain JSON.
fn plain_json(value: Value) -> serde_json::Value {
    use serde_json::Value as Json;

    match value {
        Value::Null => Json::Null,
        Value::Bool(b) => Json::Bool(b),
        Value::Number(n) => Json::Number(n),
        Value::String(s) => Json::String(s),
        Value::Array(items) | Value::Tuple(items) => {
            Json::Array(items.into_iter().map(plain_json).collect())
        }
        Value::Object(map) => {
            Json::Object(map.into_iter().map(|(k, v)| (k, plain_json(v))).collect())
        }
        Value::Bytes(bytes) => Json::String(STANDARD.encode(bytes)),
        Value::Markup(markup) => Json::String(markup.into_string()),
        Value::Uuid(uuid) => Json::String(uuid.to_string()),
        Value::DateTime(dt) => Json::String(dt.to_rfc3339()),
        Value::Extension(ext) => Json::String(format!("{ext:?}")),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use tagjson_core::TaggedJsonSerializer;

    fn decode(text: &str) -> Value {
        TaggedJsonSerializer::new().loads(text).unwrap()
    }

    #[test]
    fn test_plain_json() {
        let value = decode(
            r#"{"t":{" t":[1,{" b":"AAE="}]},"u":{" u":"12345678123412341234123456789012"},"d":{" d":"Mon, 01 Jan 2024 00:00:00 GMT"}}"#,
        );

        assert_eq!(
            plain_json(value),
            serde_json::json!({
                "t": [1, "AAE="],
                "u": "12345678-1234-1234-1234-123456789012",
                "d": "2024-01-01T00:00:00+00:00",
            })
        );
    }

    #[test]
    fn test_typed_view() {
        colored::control::set_override(false);

        let value = decode(
            r#"{"x":{" t":[1,"a"]},"raw":{" b":"AAE="},"empty":[],"m":{" m":"<b>"}}"#,
        );
        let FormattedString(out) = FormattedString::from(value);

        assert_eq!(
            out,
            concat!(
                "{\n",
                "  \"x\": tuple(\n",
                "    1,\n",
                "    \"a\",\n",
                "  ),\n",
                "  \"raw\": bytes(0001),\n",
                "  \"empty\": [],\n",
                "  \"m\": markup(\"<b>\"),\n",
                "}",
            )
        );
    }

    #[test]
    fn test_load_error_heading() {
        colored::control::set_override(false);

        let err = TaggedJsonSerializer::new().loads("{").unwrap_err();
        let FormattedString(out) = FormattedString::from(err);

        assert!(out.starts_with("Invalid JSON:\n\n'"), "{out}");
    }
}
