use mapcast::{Decode, Decoder, Value, map};
use mapcast_testhelpers::test;

#[derive(Debug, Clone, Default, PartialEq, Decode)]
struct Inner {
    pub value: i32,
}

#[derive(Debug, Clone, Default, Decode)]
struct Pointers {
    pub count: Option<i32>,
    pub nested: Option<Inner>,
    pub boxed: Box<Inner>,
    pub names: Option<Vec<String>>,
    pub twice: Option<Option<u8>>,
}

#[test]
fn pointers_are_allocated_on_demand() {
    let decoded: Pointers = Decoder::default()
        .from_map(&map! {
            "count" => "5",
            "nested" => map! { "value" => 1 },
            "boxed" => map! { "value" => 2 },
            "names" => vec![Value::from("a")],
            "twice" => 7,
        })
        .unwrap();
    assert_eq!(decoded.count, Some(5));
    assert_eq!(decoded.nested, Some(Inner { value: 1 }));
    assert_eq!(*decoded.boxed, Inner { value: 2 });
    assert_eq!(decoded.names.as_deref(), Some(&["a".to_owned()][..]));
    assert_eq!(decoded.twice, Some(Some(7)));
}

#[test]
fn absent_keys_leave_pointers_alone() {
    let decoded: Pointers = Decoder::default().from_map(&map! {}).unwrap();
    assert_eq!(decoded.count, None);
    assert_eq!(decoded.nested, None);
}

#[test]
fn null_clears_pointers() {
    let mut pointers = Pointers {
        count: Some(1),
        nested: Some(Inner { value: 1 }),
        boxed: Box::new(Inner { value: 1 }),
        ..Pointers::default()
    };
    Decoder::default()
        .decode(
            &map! { "count" => Value::Null, "nested" => Value::Null, "boxed" => Value::Null },
            &mut pointers,
        )
        .unwrap();
    assert_eq!(pointers.count, None);
    assert_eq!(pointers.nested, None);
    assert_eq!(*pointers.boxed, Inner::default());
}

#[test]
fn existing_pointees_are_reused() {
    #[derive(Debug, Clone, Default, Decode)]
    struct Pair {
        pub left: i32,
        pub right: i32,
    }

    #[derive(Debug, Clone, Default, Decode)]
    struct Holder {
        pub pair: Option<Pair>,
    }

    let mut holder = Holder {
        pair: Some(Pair { left: 1, right: 2 }),
    };
    Decoder::default()
        .decode(&map! { "pair" => map! { "right" => 20 } }, &mut holder)
        .unwrap();
    let pair = holder.pair.unwrap();
    assert_eq!((pair.left, pair.right), (1, 20));
}

#[test]
fn errors_inside_pointers_name_the_pointee() {
    let err = Decoder::default()
        .from_map::<Pointers>(&map! { "count" => "x" })
        .unwrap_err();
    insta::assert_snapshot!(
        err.to_string(),
        @"count: cannot convert String to i32: invalid integer syntax: invalid digit found in string"
    );
}
