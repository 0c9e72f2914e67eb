//! Error values, their paths and their messages.

use mapcast::{ConvertError, Decode, DecodeError, Decoder, PathSegment, Value, map};
use mapcast_testhelpers::test;

#[derive(Debug, Clone, Default, Decode)]
struct Inner {
    pub value: i32,
    pub small: u8,
}

#[derive(Debug, Clone, Default, Decode)]
struct Outer {
    pub inner: Inner,
    pub rows: Vec<Inner>,
}

#[test]
fn nested_failures_report_dotted_paths() {
    let err = Decoder::default()
        .from_map::<Outer>(&map! { "inner" => map! { "value" => "invalid" } })
        .unwrap_err();

    let path = err.path().unwrap();
    assert_eq!(
        path.segments(),
        [
            PathSegment::Field("inner".into()),
            PathSegment::Field("value".into())
        ]
    );
    insta::assert_snapshot!(
        err.to_string(),
        @"inner.value: cannot convert String to i32: invalid integer syntax: invalid digit found in string"
    );
}

#[test]
fn range_limits_are_enforced() {
    let decoder = Decoder::default();

    let ok: Outer = decoder
        .from_map(&map! { "inner" => map! { "small" => "255" } })
        .unwrap();
    assert_eq!(ok.inner.small, 255);

    let err = decoder
        .from_map::<Outer>(&map! { "inner" => map! { "small" => "256" } })
        .unwrap_err();
    insta::assert_snapshot!(
        err.to_string(),
        @"inner.small: cannot convert String to u8: value 256 overflows u8"
    );

    let err = decoder
        .from_map::<Outer>(&map! { "inner" => map! { "small" => -1 } })
        .unwrap_err();
    assert!(matches!(
        err.as_conversion().unwrap().cause,
        Some(ConvertError::Underflow { .. })
    ));
}

#[test]
fn sequence_paths_mix_fields_and_indices() {
    let err = Decoder::default()
        .from_map::<Outer>(&map! {
            "rows" => vec![
                Value::from(map! { "value" => 1 }),
                Value::from(map! { "value" => 2 }),
                Value::from(map! { "small" => 1000 }),
            ],
        })
        .unwrap_err();
    assert_eq!(err.path().unwrap().to_string(), "rows[2].small");
}

#[test]
fn record_from_non_map() {
    let err = Decoder::default()
        .from_map::<Outer>(&map! { "inner" => 5 })
        .unwrap_err();
    let conversion = err.as_conversion().unwrap();
    assert!(conversion.cause.is_none());
    assert_eq!(conversion.value, Value::I32(5));
    assert!(conversion.target.is_type::<Inner>());
    insta::assert_snapshot!(err.to_string(), @"inner: cannot convert i32 to Inner");
}

#[test]
fn root_failures() {
    let mut number = 0_i32;
    let err = Decoder::default()
        .decode_value(&Value::from("x"), &mut number)
        .unwrap_err();
    assert!(err.path().unwrap().is_root());
    insta::assert_snapshot!(
        err.to_string(),
        @"root: cannot convert String to i32: invalid integer syntax: invalid digit found in string"
    );
}

#[test]
fn validation_errors_have_no_path() {
    let err = Decoder::default()
        .decode_dyn(&map! {}, None)
        .unwrap_err();
    assert!(err.path().is_none());
    assert!(matches!(err, DecodeError::Validation(_)));
}

#[test]
fn errors_stop_the_decode() {
    let mut outer = Outer::default();
    let err = Decoder::default()
        .decode(
            &map! { "inner" => map! { "value" => 1, "small" => "x" }, "rows" => Value::Null },
            &mut outer,
        )
        .unwrap_err();
    assert_eq!(err.path().unwrap().to_string(), "inner.small");
    // fields before the failure were already written
    assert_eq!(outer.inner.value, 1);
}
