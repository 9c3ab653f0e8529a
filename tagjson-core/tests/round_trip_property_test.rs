use chrono::{DateTime, Utc};
use proptest::prelude::*;
use tagjson_core::{
    TaggedJsonSerializer,
    value::{Markup, Value},
};
use uuid::Uuid;

// Includes registered keys so that the collision guard gets exercised.
const KEYS: &[&str] = &["a", "key", "", " t", " di", " b", " u", " t__", "__"];

fn leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        any::<u64>().prop_map(Value::from),
        ".*".prop_map(Value::from),
        prop::sample::select(KEYS).prop_map(Value::from),
        any::<f64>()
            .prop_filter("finite", |f| f.is_finite())
            .prop_map(Value::from),
        prop::collection::vec(any::<u8>(), 0..32).prop_map(Value::Bytes),
        ".*".prop_map(|s| Value::Markup(Markup::new(s))),
        any::<u128>().prop_map(|n| Value::Uuid(Uuid::from_u128(n))),
        // Whole seconds between 0001-01-01 and 9999-12-31.
        (-62_135_596_800i64..=253_402_300_799i64).prop_filter_map("timestamp", |secs| {
            DateTime::<Utc>::from_timestamp(secs, 0).map(Value::DateTime)
        }),
    ]
}

fn value() -> impl Strategy<Value = Value> {
    leaf().prop_recursive(4, 64, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Tuple),
            prop::collection::vec((prop::sample::select(KEYS), inner), 0..4)
                .prop_map(Value::object),
        ]
    })
}

proptest! {
    #[test]
    fn test_loads_inverts_dumps(value in value()) {
        let serializer = TaggedJsonSerializer::new();

        let text = serializer.dumps(&value).unwrap();
        let decoded = serializer.loads(&text).unwrap();

        prop_assert_eq!(decoded, value);
    }

    #[test]
    fn test_dumps_is_compact_json(value in value()) {
        let serializer = TaggedJsonSerializer::new();

        let text = serializer.dumps(&value).unwrap();
        let reparsed: serde_json::Value = serde_json::from_str(&text).unwrap();

        prop_assert_eq!(reparsed.to_string(), text);
    }
}
