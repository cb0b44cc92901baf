/*
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use polybson::prelude::*;
use polybson::ser::Error;

fn encode<S: Serializer>(serializer: &S, value: &S::Value) -> Vec<u8> {
    let mut writer = VecWriter::new();
    writer.write_start_document().unwrap();
    writer.write_name("v").unwrap();
    serializer.serialize(&mut writer, value).unwrap();
    writer.write_end_document().unwrap();
    writer.into_bytes()
}

fn decode<S: Serializer>(serializer: &S, bytes: &[u8]) -> S::Value {
    let mut reader = SliceReader::new(bytes);
    reader.read_start_document().unwrap();
    reader.read_name().unwrap();
    let value = serializer.deserialize(&mut reader).unwrap();
    reader.read_end_document().unwrap();
    value
}

#[test]
fn test_item_name_grammar() {
    assert_eq!(try_parse_item_name("Item1"), Some(1));
    assert_eq!(try_parse_item_name("Item2"), Some(2));
    assert_eq!(try_parse_item_name("Item7"), Some(7));
    assert_eq!(try_parse_item_name("Rest"), Some(8));
    assert_eq!(try_parse_item_name("Item"), None);
    assert_eq!(try_parse_item_name("Item0"), None);
    assert_eq!(try_parse_item_name("Item8"), None);
    assert_eq!(try_parse_item_name("Item9"), None);
    assert_eq!(try_parse_item_name("Item10"), None);
    assert_eq!(try_parse_item_name("item1"), None);
    assert_eq!(try_parse_item_name("rest"), None);
    assert_eq!(try_parse_item_name(""), None);
}

#[test]
fn test_arity_bounds() {
    assert!(matches!(check_arity(0), Err(Error::InvalidArity(0))));
    for arity in 1..=MAX_TUPLE_ARITY {
        check_arity(arity).unwrap();
    }
    assert!(matches!(check_arity(9), Err(Error::InvalidArity(9))));
}

#[test]
fn test_pair_roundtrip() {
    let serializer = TupleSerializer2::new(Int32Serializer::new(), StringSerializer::new());
    let value = (7, "seven".to_string());
    let bytes = encode(&serializer, &value);
    assert_eq!(decode(&serializer, &bytes), value);
}

#[test]
fn test_pair_field_names() {
    let serializer = TupleSerializer2::new(Int32Serializer::new(), StringSerializer::new());
    let bytes = encode(&serializer, &(7, "seven".to_string()));
    let document = Document::from_bytes(&bytes).unwrap();
    let embedded = document.get_document("v").unwrap();
    let names: Vec<&str> = embedded.keys().collect();
    assert_eq!(names, vec!["Item1", "Item2"]);
}

#[test]
fn test_eighth_position_is_rest() {
    let serializer = TupleSerializer8::new(
        Int32Serializer::new(),
        Int32Serializer::new(),
        Int32Serializer::new(),
        Int32Serializer::new(),
        Int32Serializer::new(),
        Int32Serializer::new(),
        Int32Serializer::new(),
        StringSerializer::new(),
    );
    let value = (1, 2, 3, 4, 5, 6, 7, "tail".to_string());
    let bytes = encode(&serializer, &value);

    let document = Document::from_bytes(&bytes).unwrap();
    let embedded = document.get_document("v").unwrap();
    let names: Vec<&str> = embedded.keys().collect();
    assert_eq!(
        names,
        vec!["Item1", "Item2", "Item3", "Item4", "Item5", "Item6", "Item7", "Rest"]
    );
    assert_eq!(embedded.get_str("Rest"), Some("tail"));

    assert_eq!(decode(&serializer, &bytes), value);
}

#[test]
fn test_out_of_order_elements() {
    // the wire document lists Item2 before Item1
    let document = polybson::doc! {
        "v" => polybson::doc! { "Item2" => "b", "Item1" => 1 },
    };
    let bytes = document.to_bytes().unwrap();
    let serializer = TupleSerializer2::new(Int32Serializer::new(), StringSerializer::new());
    assert_eq!(decode(&serializer, &bytes), (1, "b".to_string()));
}

#[test]
fn test_unknown_elements_are_skipped() {
    let document = polybson::doc! {
        "v" => polybson::doc! { "Item1" => 1, "Extra" => "noise", "Item2" => "b" },
    };
    let bytes = document.to_bytes().unwrap();
    let serializer = TupleSerializer2::new(Int32Serializer::new(), StringSerializer::new());
    assert_eq!(decode(&serializer, &bytes), (1, "b".to_string()));
}

#[test]
fn test_missing_position_fails() {
    let document = polybson::doc! { "v" => polybson::doc! { "Item1" => 1 } };
    let bytes = document.to_bytes().unwrap();
    let serializer = TupleSerializer2::new(Int32Serializer::new(), StringSerializer::new());
    let mut reader = SliceReader::new(&bytes);
    reader.read_start_document().unwrap();
    reader.read_name().unwrap();
    match serializer.deserialize(&mut reader) {
        Err(Error::MissingField(name)) => assert_eq!(name, "Item2"),
        other => panic!("expected MissingField, got {other:?}"),
    }
}

#[test]
fn test_nested_tuples() {
    let serializer = TupleSerializer2::new(
        TupleSerializer1::new(BooleanSerializer::new()),
        VecSerializer::new(Int32Serializer::new()),
    );
    let value = ((true,), vec![1, 2]);
    let bytes = encode(&serializer, &value);
    assert_eq!(decode(&serializer, &bytes), value);
}
