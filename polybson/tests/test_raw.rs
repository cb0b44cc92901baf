/*
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use polybson::prelude::*;
use polybson::raw::Error;

#[test]
fn test_known_bytes() {
    // {"a": 1} with an int32 value
    let expected = [
        0x0c, 0x00, 0x00, 0x00, // document length
        0x10, b'a', 0x00, // int32 element named "a"
        0x01, 0x00, 0x00, 0x00, // 1
        0x00, // terminator
    ];

    let mut writer = VecWriter::new();
    writer.write_start_document().unwrap();
    writer.write_name("a").unwrap();
    writer.write_i32(1).unwrap();
    writer.write_end_document().unwrap();
    assert!(writer.is_finished());
    assert_eq!(writer.as_bytes(), &expected);

    let mut reader = SliceReader::new(&expected);
    reader.read_start_document().unwrap();
    assert_eq!(reader.peek_type().unwrap(), Some(ElementType::Int32));
    assert_eq!(reader.read_name().unwrap(), "a");
    assert_eq!(reader.read_i32().unwrap(), 1);
    assert_eq!(reader.peek_type().unwrap(), None);
    reader.read_end_document().unwrap();
    assert!(reader.is_finished());
}

#[test]
fn test_array_auto_index_names() {
    let mut writer = VecWriter::new();
    writer.write_start_document().unwrap();
    writer.write_name("a").unwrap();
    writer.write_start_array().unwrap();
    writer.write_i32(10).unwrap();
    writer.write_i32(20).unwrap();
    writer.write_end_array().unwrap();
    writer.write_end_document().unwrap();
    let bytes = writer.into_bytes();

    // the embedded array document carries "0" and "1" element names
    let names: Vec<u8> = bytes.windows(3).filter(|w| w[0] == 0x10).map(|w| w[1]).collect();
    assert_eq!(names, vec![b'0', b'1']);

    let document = Document::from_bytes(&bytes).unwrap();
    assert_eq!(
        document.get_array("a"),
        Some(&[Bson::Int32(10), Bson::Int32(20)][..])
    );
}

#[test]
fn test_value_without_name_is_out_of_grammar() {
    let mut writer = VecWriter::new();
    writer.write_start_document().unwrap();
    assert!(matches!(
        writer.write_i32(1),
        Err(Error::InvalidState { .. })
    ));
}

#[test]
fn test_top_level_value_is_out_of_grammar() {
    let mut writer = VecWriter::new();
    assert!(matches!(
        writer.write_i32(1),
        Err(Error::InvalidState { .. })
    ));
}

#[test]
fn test_name_inside_array_is_out_of_grammar() {
    let mut writer = VecWriter::new();
    writer.write_start_document().unwrap();
    writer.write_name("a").unwrap();
    writer.write_start_array().unwrap();
    assert!(matches!(
        writer.write_name("oops"),
        Err(Error::InvalidState { .. })
    ));
}

#[test]
fn test_close_with_pending_name_is_out_of_grammar() {
    let mut writer = VecWriter::new();
    writer.write_start_document().unwrap();
    writer.write_name("a").unwrap();
    assert!(matches!(
        writer.write_end_document(),
        Err(Error::InvalidState { .. })
    ));
}

#[test]
fn test_interior_nul_in_name() {
    let mut writer = VecWriter::new();
    writer.write_start_document().unwrap();
    assert!(matches!(writer.write_name("a\0b"), Err(Error::InteriorNul)));
}

#[test]
fn test_type_mismatch_on_read() {
    let document = polybson::doc! { "a" => "text" };
    let bytes = document.to_bytes().unwrap();
    let mut reader = SliceReader::new(&bytes);
    reader.read_start_document().unwrap();
    reader.read_name().unwrap();
    assert!(matches!(
        reader.read_i32(),
        Err(Error::TypeMismatch {
            expected: ElementType::Int32,
            actual: ElementType::String,
        })
    ));
}

#[test]
fn test_writer_depth_guard() {
    let mut writer = VecWriter::with_max_depth(4);
    writer.write_start_document().unwrap();
    for _ in 0..3 {
        writer.write_name("d").unwrap();
        writer.write_start_document().unwrap();
    }
    writer.write_name("d").unwrap();
    assert!(matches!(
        writer.write_start_document(),
        Err(Error::MaxDepthExceeded(4))
    ));
}

#[test]
fn test_reader_depth_guard() {
    let mut document = polybson::doc! {};
    for _ in 0..5 {
        document = polybson::doc! { "d" => document };
    }
    let bytes = document.to_bytes().unwrap();
    let mut reader = SliceReader::with_max_depth(&bytes, 4);
    reader.read_start_document().unwrap();
    for _ in 0..3 {
        reader.read_name().unwrap();
        reader.read_start_document().unwrap();
    }
    reader.read_name().unwrap();
    assert!(matches!(
        reader.read_start_document(),
        Err(Error::MaxDepthExceeded(4))
    ));
}

#[test]
fn test_skip_value_over_every_shape() {
    let document = polybson::doc! {
        "d" => 1.5,
        "s" => "text",
        "doc" => polybson::doc! { "inner" => 1 },
        "arr" => vec![Bson::Int32(1), Bson::String("x".to_string())],
        "bin" => Binary::generic(vec![1, 2, 3]),
        "oid" => ObjectId::from_bytes([7; 12]),
        "b" => true,
        "dt" => DateTime::from_millis(1_000),
        "null" => Bson::Null,
        "i32" => 42,
        "i64" => 42_i64,
        "dec" => Decimal128::from_bits(1),
        "last" => "reached",
    };
    let bytes = document.to_bytes().unwrap();
    let mut reader = SliceReader::new(&bytes);
    reader.read_start_document().unwrap();
    loop {
        let name = reader.read_name().unwrap();
        if name == "last" {
            assert_eq!(reader.read_string().unwrap(), "reached");
            break;
        }
        reader.skip_value().unwrap();
    }
    assert_eq!(reader.peek_type().unwrap(), None);
    reader.read_end_document().unwrap();
}

#[test]
fn test_bookmark_seek() {
    let document = polybson::doc! { "a" => 1, "b" => 2 };
    let bytes = document.to_bytes().unwrap();
    let mut reader = SliceReader::new(&bytes);
    let mark = reader.bookmark();
    let peeked = polybson::raw::read_document(&mut reader).unwrap();
    assert_eq!(peeked, document);
    reader.seek(mark);
    // after seeking back the document reads again in full
    let again = polybson::raw::read_document(&mut reader).unwrap();
    assert_eq!(again, document);
}

#[test]
fn test_truncated_stream() {
    let bytes = polybson::doc! { "a" => 1 }.to_bytes().unwrap();
    for len in 0..bytes.len() {
        assert!(Document::from_bytes(&bytes[..len]).is_err());
    }
}

#[test]
fn test_unrepresentable_scalar() {
    // regex element: 0x0b name cstring + two cstrings
    let mut bytes = vec![0x00, 0x00, 0x00, 0x00, 0x0b, b'r', 0x00];
    bytes.extend_from_slice(b"ab\0i\0");
    bytes.push(0x00);
    let len = bytes.len() as i32;
    bytes[..4].copy_from_slice(&len.to_le_bytes());
    assert!(matches!(
        Document::from_bytes(&bytes),
        Err(Error::Unrepresentable(ElementType::RegularExpression))
    ));
}
