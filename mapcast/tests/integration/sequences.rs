//! Sequence destinations: bulk copies, element-wise conversion, lifting.

use std::collections::VecDeque;

use mapcast::{ConvertError, Decode, Decoder, Value, map};
use mapcast_testhelpers::test;

#[derive(Debug, Clone, Default, PartialEq, Decode)]
struct Item {
    pub value: i32,
}

#[derive(Debug, Clone, Default, Decode)]
struct Lists {
    pub numbers: Vec<i32>,
    pub wide: Vec<i64>,
    pub names: Vec<String>,
    pub anything: Vec<Value>,
    pub bytes: Vec<u8>,
    pub items: Vec<Item>,
    pub queue: VecDeque<u16>,
    pub grid: Vec<Vec<i32>>,
}

fn decode(source: mapcast::Map) -> Lists {
    Decoder::default().from_map(&source).unwrap()
}

#[test]
fn typed_and_untyped_sources_decode_alike() {
    let typed = decode(map! { "numbers" => Value::native(vec![10_i32, 20, 30]) });
    let untyped = decode(map! {
        "numbers" => vec![Value::from(10), Value::from(20), Value::from(30)],
    });
    assert_eq!(typed.numbers, [10, 20, 30]);
    assert_eq!(untyped.numbers, [10, 20, 30]);
}

#[test]
fn mixed_elements_convert_one_by_one() {
    let lists = decode(map! {
        "numbers" => vec![Value::from(1), Value::from("2"), Value::from(3.0), Value::from(true)],
        "names" => vec![Value::from("a"), Value::from(1), Value::from(false)],
    });
    assert_eq!(lists.numbers, [1, 2, 3, 1]);
    assert_eq!(lists.names, ["a", "1", "0"]);
}

#[test]
fn element_types_widen() {
    let lists = decode(map! { "wide" => Value::native(vec![1_i32, -2]) });
    assert_eq!(lists.wide, [1, -2]);
}

#[test]
fn value_elements_are_lifted() {
    let lists = decode(map! { "anything" => Value::native(vec![1_i32, 2]) });
    assert_eq!(lists.anything, [Value::I32(1), Value::I32(2)]);

    let lists = decode(map! {
        "anything" => vec![Value::from("x"), Value::Null, Value::from(map! { "k" => 1 })],
    });
    assert_eq!(lists.anything.len(), 3);
    assert!(lists.anything[1].is_null());
    assert_eq!(lists.anything[2].as_map().unwrap()["k"], Value::I32(1));
}

#[test]
fn null_and_empty_sources_clear() {
    let mut lists = Lists {
        numbers: vec![9, 9],
        names: vec!["stale".into()],
        ..Lists::default()
    };
    Decoder::default()
        .decode(
            &map! { "numbers" => Value::Null, "names" => Vec::<Value>::new() },
            &mut lists,
        )
        .unwrap();
    assert!(lists.numbers.is_empty());
    assert!(lists.names.is_empty());
}

#[test]
fn previous_contents_are_replaced() {
    let mut lists = Lists {
        numbers: vec![7, 8, 9, 10],
        ..Lists::default()
    };
    Decoder::default()
        .decode(&map! { "numbers" => vec![Value::from("1")] }, &mut lists)
        .unwrap();
    assert_eq!(lists.numbers, [1]);
}

#[test]
fn byte_lists_use_the_byte_converter() {
    let lists = decode(map! { "bytes" => "hi" });
    assert_eq!(lists.bytes, b"hi");

    let lists = decode(map! { "bytes" => vec![Value::from(104), Value::from(105_u8)] });
    assert_eq!(lists.bytes, b"hi");

    let lists = decode(map! { "bytes" => Value::Bytes(vec![1, 2]) });
    assert_eq!(lists.bytes, [1, 2]);
}

#[test]
fn record_elements() {
    let lists = decode(map! {
        "items" => vec![
            Value::from(map! { "value" => 1 }),
            Value::from(map! { "value" => "2" }),
            Value::native(Item { value: 3 }),
        ],
    });
    assert_eq!(
        lists.items,
        [Item { value: 1 }, Item { value: 2 }, Item { value: 3 }]
    );
}

#[test]
fn other_sequence_kinds() {
    let lists = decode(map! {
        "queue" => vec![Value::from("1"), Value::from(2)],
        "grid" => vec![
            Value::from(vec![Value::from(1)]),
            Value::native(vec![2_i32, 3]),
            Value::Null,
        ],
    });
    assert_eq!(lists.queue, VecDeque::from([1, 2]));
    assert_eq!(lists.grid, [vec![1], vec![2, 3], vec![]]);
}

#[test]
fn non_sequence_sources_fail_without_a_cause() {
    let err = Decoder::default()
        .from_map::<Lists>(&map! { "numbers" => "abc" })
        .unwrap_err();
    let conversion = err.as_conversion().unwrap();
    assert!(conversion.cause.is_none());
    insta::assert_snapshot!(err.to_string(), @"numbers: cannot convert String to Vec<i32>");

    let err = Decoder::default()
        .from_map::<Lists>(&map! { "numbers" => map! { "0" => 1 } })
        .unwrap_err();
    assert_eq!(err.to_string(), "numbers: cannot convert Map to Vec<i32>");
}

#[test]
fn element_failures_carry_their_index() {
    let err = Decoder::default()
        .from_map::<Lists>(&map! { "numbers" => vec![Value::from(1), Value::from("x")] })
        .unwrap_err();
    assert_eq!(err.path().unwrap().to_string(), "numbers[1]");
    assert!(matches!(
        err.as_conversion().unwrap().cause,
        Some(ConvertError::InvalidInt(_))
    ));

    let err = Decoder::default()
        .from_map::<Lists>(&map! {
            "items" => vec![
                Value::from(map! { "value" => 1 }),
                Value::from(map! { "value" => "bad" }),
            ],
        })
        .unwrap_err();
    assert_eq!(err.path().unwrap().to_string(), "items[1].value");
}

#[test]
fn failed_element_decodes_keep_the_old_contents() {
    let mut lists = Lists {
        numbers: vec![7, 8, 9],
        queue: VecDeque::from([4, 5]),
        ..Lists::default()
    };
    let decoder = Decoder::default();

    let err = decoder
        .decode(
            &map! { "numbers" => vec![Value::from(1), Value::from("x")] },
            &mut lists,
        )
        .unwrap_err();
    assert_eq!(err.path().unwrap().to_string(), "numbers[1]");
    assert_eq!(lists.numbers, [7, 8, 9]);

    let err = decoder
        .decode(&map! { "queue" => vec![Value::from("1"), Value::from(-1)] }, &mut lists)
        .unwrap_err();
    assert_eq!(err.path().unwrap().to_string(), "queue[1]");
    assert_eq!(lists.queue, [4, 5]);
}
