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
    assert_eq!(reader.read_name().unwrap(), "v");
    let value = serializer.deserialize(&mut reader).unwrap();
    reader.read_end_document().unwrap();
    value
}

macro_rules! impl_test {
    ($serializer:expr, $value:expr) => {{
        let serializer = $serializer;
        let value = $value;
        let bytes = encode(&serializer, &value);
        assert_eq!(decode(&serializer, &bytes), value);
        // serialization is deterministic
        assert_eq!(encode(&serializer, &value), bytes);
    }};
}

macro_rules! test_roundtrip {
    ($test_name:ident, $serializer:expr, $($value:expr),+ $(,)?) => {
        #[test]
        fn $test_name() {
            $(impl_test!($serializer, $value);)+
        }
    };
}

test_roundtrip!(test_bool, BooleanSerializer::new(), true, false);
test_roundtrip!(test_i32, Int32Serializer::new(), i32::MIN, i32::MAX, 0, 7);
test_roundtrip!(test_i64, Int64Serializer::new(), i64::MIN, i64::MAX, 0, -7);
test_roundtrip!(
    test_f64,
    DoubleSerializer::new(),
    0.0,
    -0.0,
    f64::MIN_POSITIVE,
    f64::MAX,
    f64::INFINITY,
    f64::NEG_INFINITY,
);
test_roundtrip!(
    test_string,
    StringSerializer::new(),
    String::new(),
    "hello".to_string(),
    "péché à outrance".to_string(),
);
test_roundtrip!(
    test_object_id,
    ObjectIdSerializer::new(),
    ObjectId::from_bytes([0x55; 12]),
);
test_roundtrip!(
    test_date_time,
    DateTimeSerializer::new(),
    DateTime::from_millis(0),
    DateTime::from_millis(-62_135_596_800_000),
    DateTime::from_millis(253_402_300_799_999),
);
test_roundtrip!(
    test_decimal128,
    Decimal128Serializer::new(),
    Decimal128::from_bits(0),
    Decimal128::from_bits(u128::MAX),
    Decimal128::from_bits(0x3040_0000_0000_0000_0000_0000_0000_007b),
);
test_roundtrip!(
    test_binary,
    BinaryDataSerializer::new(),
    Binary {
        subtype: BinarySubtype::Generic,
        bytes: vec![],
    },
    Binary {
        subtype: BinarySubtype::Uuid,
        bytes: vec![0xde, 0xad, 0xbe, 0xef],
    },
    Binary {
        subtype: BinarySubtype::UserDefined(0x80),
        bytes: vec![0; 64],
    },
);
test_roundtrip!(
    test_option,
    OptionSerializer::new(Int32Serializer::new()),
    Some(42),
    None,
);
test_roundtrip!(
    test_vec,
    VecSerializer::new(Int32Serializer::new()),
    vec![],
    vec![1, 2, 3],
);
test_roundtrip!(
    test_nested_vec,
    VecSerializer::new(VecSerializer::new(StringSerializer::new())),
    vec![vec!["a".to_string()], vec![], vec!["b".to_string(), "c".to_string()]],
);
test_roundtrip!(
    test_vec_of_options,
    VecSerializer::new(OptionSerializer::new(BooleanSerializer::new())),
    vec![Some(true), None, Some(false)],
);

#[test]
fn test_nan_bit_exact() {
    let serializer = DoubleSerializer::new();
    for value in [f64::NAN, -f64::NAN, f64::from_bits(0x7ff8_dead_beef_0001)] {
        let bytes = encode(&serializer, &value);
        let copy = decode(&serializer, &bytes);
        assert_eq!(copy.to_bits(), value.to_bits());
    }
}

#[test]
fn test_widened_representation() {
    let serializer = Int32Serializer::with_representation(NumericRepresentation::Int64);
    let bytes = encode(&serializer, &42);
    // the stored element really is an Int64
    let document = Document::from_bytes(&bytes).unwrap();
    assert_eq!(document.get_i64("v"), Some(42));
    assert_eq!(decode(&serializer, &bytes), 42);
}

#[test]
fn test_narrowing_overflow() {
    let wide = Int64Serializer::new();
    let bytes = encode(&wide, &(i64::from(i32::MAX) + 1));
    let narrow = Int32Serializer::new();
    let mut reader = SliceReader::new(&bytes);
    reader.read_start_document().unwrap();
    reader.read_name().unwrap();
    assert!(matches!(
        narrow.deserialize(&mut reader),
        Err(Error::NumericOverflow { .. })
    ));
}

#[test]
fn test_non_finite_rejected_by_integral_representations() {
    for representation in [NumericRepresentation::Int32, NumericRepresentation::Int64] {
        let serializer = DoubleSerializer::with_representation(representation);
        for value in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY, 1.5] {
            let mut writer = VecWriter::new();
            writer.write_start_document().unwrap();
            writer.write_name("v").unwrap();
            assert!(matches!(
                serializer.serialize(&mut writer, &value),
                Err(Error::NumericOverflow { .. })
            ));
        }
    }
}

#[test]
fn test_fractional_double_rejected_as_i64() {
    let wide = DoubleSerializer::new();
    let bytes = encode(&wide, &1.5);
    let mut reader = SliceReader::new(&bytes);
    reader.read_start_document().unwrap();
    reader.read_name().unwrap();
    assert!(matches!(
        Int64Serializer::new().deserialize(&mut reader),
        Err(Error::NumericOverflow { .. })
    ));
}
