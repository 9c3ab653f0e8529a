use serde_json::{Value as Json, json};
use tagjson_core::{
    JsonTag, RegisterOptions, TagError, TaggedJsonSerializer,
    value::{Extension, Value},
};

#[derive(Debug, PartialEq)]
struct Money {
    cents: i64,
    currency: String,
}

impl Extension for Money {
    fn type_name(&self) -> &'static str {
        "money"
    }
}

/// Stores money as `"<currency> <cents>"`.
struct TagMoney;

#[derive(Debug, thiserror::Error)]
#[error("Malformed money amount '{0}'")]
struct MalformedMoney(String);

impl JsonTag for TagMoney {
    fn key(&self) -> Option<&str> {
        Some(" $")
    }

    fn check(&self, value: &Value, _: &TaggedJsonSerializer) -> bool {
        value.downcast_extension::<Money>().is_some()
    }

    fn to_json(&self, value: &Value, _: &TaggedJsonSerializer) -> Result<Json, TagError> {
        match value.downcast_extension::<Money>() {
            Some(money) => Ok(Json::String(format!("{} {}", money.currency, money.cents))),
            None => Err(TagError::unconvertible(" $", value)),
        }
    }

    fn to_value(&self, body: Value) -> Result<Value, TagError> {
        let text = body
            .as_str()
            .ok_or_else(|| TagError::unconvertible(" $", &body))?;

        let (currency, cents) = text
            .split_once(' ')
            .and_then(|(currency, cents)| Some((currency, cents.parse::<i64>().ok()?)))
            .ok_or_else(|| TagError::Custom(Box::new(MalformedMoney(text.to_string()))))?;

        Ok(Value::extension(Money {
            cents,
            currency: currency.to_string(),
        }))
    }
}

/// Sorted sets of strings, stored as a tagged array.
#[derive(Debug, PartialEq)]
struct StringSet(Vec<String>);

impl Extension for StringSet {
    fn type_name(&self) -> &'static str {
        "set"
    }
}

struct TagStringSet;

impl JsonTag for TagStringSet {
    fn key(&self) -> Option<&str> {
        Some(" s")
    }

    fn check(&self, value: &Value, _: &TaggedJsonSerializer) -> bool {
        value.downcast_extension::<StringSet>().is_some()
    }

    fn to_json(&self, value: &Value, _: &TaggedJsonSerializer) -> Result<Json, TagError> {
        match value.downcast_extension::<StringSet>() {
            Some(StringSet(items)) => Ok(json!(items)),
            None => Err(TagError::unconvertible(" s", value)),
        }
    }

    fn to_value(&self, body: Value) -> Result<Value, TagError> {
        let items = match body {
            Value::Array(items) => items,
            other => return Err(TagError::unconvertible(" s", &other)),
        };

        let mut strings = items
            .into_iter()
            .map(|item| match item {
                Value::String(s) => Ok(s),
                other => Err(TagError::unconvertible(" s", &other)),
            })
            .collect::<Result<Vec<_>, _>>()?;
        strings.sort();

        Ok(Value::extension(StringSet(strings)))
    }
}

fn money(cents: i64, currency: &str) -> Value {
    Value::extension(Money {
        cents,
        currency: currency.to_string(),
    })
}

fn serializer() -> TaggedJsonSerializer {
    let mut serializer = TaggedJsonSerializer::new();
    serializer.register(TagMoney).unwrap();
    serializer.register(TagStringSet).unwrap();
    serializer
}

#[test]
fn test_extension_round_trip() {
    let serializer = serializer();
    let value = money(1999, "EUR");

    let text = serializer.dumps(&value).unwrap();

    assert_eq!(text, r#"{" $":"EUR 1999"}"#);
    assert_eq!(serializer.loads(&text).unwrap(), value);
}

#[test]
fn test_extension_nested_in_builtin_containers() {
    let serializer = serializer();
    let value = Value::object([
        ("cart", Value::tuple([money(500, "USD"), money(-20, "USD")])),
        (
            "tags",
            Value::extension(StringSet(vec!["a".into(), "b".into()])),
        ),
    ]);

    let text = serializer.dumps(&value).unwrap();

    assert_eq!(
        text,
        r#"{"cart":{" t":[{" $":"USD 500"},{" $":"USD -20"}]},"tags":{" s":["a","b"]}}"#
    );
    assert_eq!(serializer.loads(&text).unwrap(), value);
}

#[test]
fn test_application_keys_are_guarded() {
    let serializer = serializer();
    let value = Value::object([(" $", Value::from("not money"))]);

    let text = serializer.dumps(&value).unwrap();

    assert_eq!(text, r#"{" di":{" $__":"not money"}}"#);
    assert_eq!(serializer.loads(&text).unwrap(), value);
}

#[test]
fn test_application_error_surfaces_unchanged() {
    let serializer = serializer();

    let err = serializer.loads(r#"{" $":"EUR lots"}"#).unwrap_err();

    let tagjson_core::LoadError::Tag(TagError::Custom(source)) = err else {
        panic!("expected a custom tag error");
    };
    assert_eq!(source.to_string(), "Malformed money amount 'EUR lots'");
    assert!(source.downcast_ref::<MalformedMoney>().is_some());
}

#[test]
fn test_unregistered_extension_cannot_be_encoded() {
    let serializer = TaggedJsonSerializer::new();

    let err = serializer.dumps(&money(1, "EUR")).unwrap_err();

    assert!(matches!(err, TagError::Unrepresentable("money")));
    assert_eq!(
        err.to_string(),
        "No registered tag can represent a money value as JSON"
    );
}

#[test]
fn test_specific_tag_ahead_of_markup() {
    #[derive(Debug, PartialEq)]
    struct Icon(&'static str);

    impl tagjson_core::value::RenderHtml for Icon {
        fn render_html(&self) -> String {
            format!("<i class=\"{}\"></i>", self.0)
        }
    }

    impl Extension for Icon {
        fn type_name(&self) -> &'static str {
            "icon"
        }

        fn as_html(&self) -> Option<&dyn tagjson_core::value::RenderHtml> {
            Some(self)
        }
    }

    struct TagIcon;

    impl JsonTag for TagIcon {
        fn key(&self) -> Option<&str> {
            Some(" i")
        }

        fn check(&self, value: &Value, _: &TaggedJsonSerializer) -> bool {
            value.downcast_extension::<Icon>().is_some()
        }

        fn to_json(&self, value: &Value, _: &TaggedJsonSerializer) -> Result<Json, TagError> {
            match value.downcast_extension::<Icon>() {
                Some(Icon(name)) => Ok(json!(name)),
                None => Err(TagError::unconvertible(" i", value)),
            }
        }
    }

    let mut serializer = TaggedJsonSerializer::new();
    let icon = Value::extension(Icon("star"));

    assert_eq!(
        serializer.dumps(&icon).unwrap(),
        r#"{" m":"<i class=\"star\"></i>"}"#
    );

    serializer
        .register_with(TagIcon, RegisterOptions::at(0))
        .unwrap();

    assert_eq!(serializer.dumps(&icon).unwrap(), r#"{" i":"star"}"#);
}
