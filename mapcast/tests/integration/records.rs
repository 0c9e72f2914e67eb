//! Decoding flat and nested records.

use std::sync::Arc;

use mapcast::{
    ConvertError, ConverterRegistry, Decode, DecodeError, Decoder, FIELD_NAMES, Map,
    MetadataCache, Target, Value, map,
};
use mapcast_testhelpers::test;

#[derive(Debug, Clone, Default, PartialEq, Decode)]
struct Person {
    pub name: String,
    pub age: u32,
    pub email: String,
}

#[test]
fn decode_simple_record() {
    let person: Person = Decoder::default()
        .from_map(&map! {
            "name" => "Alice",
            "age" => 30,
            "email" => "alice@example.com",
        })
        .unwrap();

    assert_eq!(
        person,
        Person {
            name: "Alice".into(),
            age: 30,
            email: "alice@example.com".into(),
        }
    );
}

#[test]
fn empty_map_leaves_zero_values() {
    let person: Person = Decoder::default().from_map(&Map::new()).unwrap();
    assert_eq!(person, Person::default());
}

#[test]
fn absent_keys_leave_existing_values() {
    let mut person = Person {
        name: "Bob".into(),
        age: 41,
        email: "bob@example.com".into(),
    };
    Decoder::default()
        .decode(&map! { "age" => "42" }, &mut person)
        .unwrap();
    assert_eq!(person.name, "Bob");
    assert_eq!(person.age, 42);
}

#[test]
fn unknown_keys_are_ignored() {
    let person: Person = Decoder::default()
        .from_map(&map! { "name" => "Carol", "nickname" => "C" })
        .unwrap();
    assert_eq!(person.name, "Carol");
}

#[test]
fn decoding_twice_gives_the_same_result() {
    let decoder = Decoder::default();
    let source = map! { "name" => "Dan", "age" => "7", "email" => 12 };

    let mut person = Person::default();
    decoder.decode(&source, &mut person).unwrap();
    let first = person.clone();
    decoder.decode(&source, &mut person).unwrap();
    assert_eq!(person, first);
    assert_eq!(person.email, "12");
}

#[derive(Debug, Clone, Default, Decode)]
struct Tagged {
    #[mapcast(schema = "user_name")]
    pub name: String,
    #[mapcast(schema = "user_age,omitempty")]
    pub age: i64,
    #[mapcast(schema = "-")]
    pub internal: String,
    #[mapcast(schema = "-,omitempty")]
    pub also_internal: Vec<i32>,
    pub untagged: bool,
}

#[test]
fn key_annotations_rename_and_skip() {
    let tagged: Tagged = Decoder::default()
        .from_map(&map! {
            "user_name" => "eve",
            "user_age" => "33",
            "internal" => "secret",
            "also_internal" => "not a list",
            "untagged" => "TRUE",
            "name" => "ignored",
        })
        .unwrap();

    assert_eq!(tagged.name, "eve");
    assert_eq!(tagged.age, 33);
    assert_eq!(tagged.internal, "");
    assert!(tagged.also_internal.is_empty());
    assert!(tagged.untagged);
}

#[derive(Debug, Clone, Default, Decode)]
struct WithDefaults {
    #[mapcast(default = "8080")]
    pub port: u16,
    #[mapcast(default = "localhost")]
    pub host: String,
    #[mapcast(default = "true")]
    pub enabled: bool,
    #[mapcast(default = "1.5")]
    pub ratio: f64,
    #[mapcast(schema = "max_conn", default = "-3")]
    pub max_connections: Option<i32>,
    pub plain: i32,
}

#[test]
fn defaults_apply_to_absent_keys() {
    let config: WithDefaults = Decoder::default().from_map(&Map::new()).unwrap();
    assert_eq!(config.port, 8080);
    assert_eq!(config.host, "localhost");
    assert!(config.enabled);
    assert_eq!(config.ratio, 1.5);
    assert_eq!(config.max_connections, Some(-3));
    assert_eq!(config.plain, 0);
}

#[test]
fn present_keys_never_consult_defaults() {
    let config: WithDefaults = Decoder::default()
        .from_map(&map! {
            "port" => 0,
            "host" => "",
            "enabled" => false,
            "max_conn" => Value::Null,
        })
        .unwrap();
    assert_eq!(config.port, 0);
    assert_eq!(config.host, "");
    assert!(!config.enabled);
    assert_eq!(config.max_connections, None);
    assert_eq!(config.ratio, 1.5);
}

#[derive(Debug, Clone, Default, Decode)]
#[allow(dead_code)]
struct Private {
    pub visible: i32,
    hidden: i32,
    pub(crate) crate_visible: i32,
}

#[test]
fn only_bare_pub_fields_are_written() {
    let private: Private = Decoder::default()
        .from_map(&map! { "visible" => 1, "hidden" => 2, "crate_visible" => 3 })
        .unwrap();
    assert_eq!(private.visible, 1);
    assert_eq!(private.hidden, 0);
    assert_eq!(private.crate_visible, 0);
}

#[derive(Debug, Clone, Default, PartialEq, Decode)]
struct Inner {
    pub value: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Decode)]
struct Outer {
    pub name: String,
    pub inner: Inner,
}

#[test]
fn nested_records() {
    let outer: Outer = Decoder::default()
        .from_map(&map! {
            "name" => "outer",
            "inner" => map! { "value" => "42" },
        })
        .unwrap();
    assert_eq!(outer.inner.value, 42);
}

#[test]
fn native_records_are_assigned_directly() {
    let outer: Outer = Decoder::default()
        .from_map(&map! { "inner" => Value::native(Inner { value: 5 }) })
        .unwrap();
    assert_eq!(outer.inner, Inner { value: 5 });
}

#[derive(Debug, Clone, Default, Decode)]
struct Dynamic {
    pub extra: Value,
    pub meta: Map,
}

#[test]
fn dynamic_fields_take_values_as_is() {
    let dynamic: Dynamic = Decoder::default()
        .from_map(&map! {
            "extra" => vec![Value::from(1), Value::from("two")],
            "meta" => map! { "k" => true },
        })
        .unwrap();
    assert_eq!(
        dynamic.extra,
        Value::Array(vec![Value::I32(1), Value::from("two")])
    );
    assert_eq!(dynamic.meta["k"], Value::Bool(true));

}

#[test]
fn null_into_a_dynamic_field_fails() {
    let mut dynamic = Dynamic {
        extra: Value::from(5),
        ..Dynamic::default()
    };
    let err = Decoder::default()
        .decode(&map! { "extra" => Value::Null }, &mut dynamic)
        .unwrap_err();
    assert!(matches!(
        err.as_conversion().unwrap().cause,
        Some(ConvertError::NoConverter)
    ));
    insta::assert_snapshot!(
        err.to_string(),
        @"extra: cannot convert null to Value: no converter registered"
    );
    assert_eq!(dynamic.extra, Value::I32(5));

    // behind an Option, null still clears
    let mut holder = Option::<Value>::Some(Value::from(1));
    Decoder::default()
        .decode_value(&Value::Null, &mut holder)
        .unwrap();
    assert!(holder.is_none());
}

#[derive(Debug, Clone, Default, Decode)]
struct JsonTagged {
    #[mapcast(json = "identifier", fallback = "9")]
    pub id: i32,
    #[mapcast(schema = "ignored_here")]
    pub label: String,
}

#[test]
fn custom_annotation_names() {
    let decoder = Decoder::new(
        Arc::new(MetadataCache::new("json", "fallback")),
        Arc::new(ConverterRegistry::default()),
    );

    let decoded: JsonTagged = decoder
        .from_map(&map! { "label" => "plain name" })
        .unwrap();
    assert_eq!(decoded.id, 9);
    assert_eq!(decoded.label, "plain name");

    let decoded: JsonTagged = decoder
        .from_map(&map! { "identifier" => 3 })
        .unwrap();
    assert_eq!(decoded.id, 3);
}

#[test]
fn declared_names_mode() {
    let decoder = Decoder::new(
        Arc::new(MetadataCache::new(FIELD_NAMES, "")),
        Arc::new(ConverterRegistry::default()),
    );
    let tagged: Tagged = decoder
        .from_map(&map! { "name" => "frank", "internal" => "visible now" })
        .unwrap();
    assert_eq!(tagged.name, "frank");
    assert_eq!(tagged.internal, "visible now");
}

#[test]
fn nil_destination_is_rejected() {
    let err = Decoder::default()
        .decode_dyn(&map! { "name" => "x" }, None)
        .unwrap_err();
    assert!(matches!(&err, DecodeError::Validation(v) if v.message == "result pointer is nil"));
    assert_eq!(err.to_string(), "result pointer is nil");
}

#[test]
fn erased_destinations() {
    let mut person = Person::default();
    let target: &mut dyn Target = &mut person;
    Decoder::default()
        .decode_dyn(&map! { "name" => "Gina" }, Some(target))
        .unwrap();
    assert_eq!(person.name, "Gina");

    let mut numbers: Vec<u16> = Vec::new();
    Decoder::default()
        .decode_value(&Value::Array(vec![1.into(), "2".into()]), &mut numbers)
        .unwrap();
    assert_eq!(numbers, [1, 2]);
}

#[test]
fn shapes_describe_records() {
    let fields = Outer::SHAPE.fields();
    assert_eq!(Outer::SHAPE.to_string(), "Outer");
    assert_eq!(fields.len(), 2);
    assert_eq!(fields[1].name, "inner");
    assert!(fields[1].shape().is_type::<Inner>());
    assert_eq!(
        WithDefaults::SHAPE.fields()[4].tag("default"),
        Some("-3")
    );
}
