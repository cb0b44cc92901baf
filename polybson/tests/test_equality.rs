/*
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use polybson::prelude::*;
use polybson::ser::Error;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

fn hash_of<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

#[test]
fn test_same_configuration_is_equal() {
    assert_eq!(Int32Serializer::new(), Int32Serializer::new());
    assert_eq!(
        OptionSerializer::new(Int32Serializer::new()),
        OptionSerializer::new(Int32Serializer::new()),
    );
    assert_eq!(
        VecSerializer::new(StringSerializer::new()),
        VecSerializer::new(StringSerializer::new()),
    );
}

#[test]
fn test_different_configuration_is_not_equal() {
    assert_ne!(
        Int32Serializer::new(),
        Int32Serializer::with_representation(NumericRepresentation::Int64),
    );
}

#[test]
fn test_equality_never_crosses_serializer_types() {
    // both are zero-configuration serializers, but of different types
    let boolean: Arc<dyn DynSerializer> = Arc::new(BooleanSerializer::new());
    let string: Arc<dyn DynSerializer> = Arc::new(StringSerializer::new());
    assert!(!boolean.dyn_eq(&*string));
    assert!(!string.dyn_eq(&*boolean));
    assert!(boolean.dyn_eq(&BooleanSerializer::new()));
}

#[test]
fn test_wrapper_equality_compares_children() {
    let a: Arc<dyn DynSerializer> = Arc::new(OptionSerializer::new(Int32Serializer::new()));
    let b: Arc<dyn DynSerializer> = Arc::new(OptionSerializer::new(
        Int32Serializer::with_representation(NumericRepresentation::Double),
    ));
    assert!(!a.dyn_eq(&*b));
}

#[test]
fn test_constant_hash() {
    assert_eq!(
        hash_of(&Int32Serializer::new()),
        hash_of(&Int32Serializer::with_representation(
            NumericRepresentation::Int64
        )),
    );
    assert_eq!(
        hash_of(&OptionSerializer::new(StringSerializer::new())),
        hash_of(&OptionSerializer::new(StringSerializer::new())),
    );
}

#[test]
fn test_arc_serializer_preserves_equality() {
    let registry = SerializerRegistry::with_builtins();
    let a = ArcSerializer::<i32>::new(registry.lookup::<i32>().unwrap()).unwrap();
    let b = ArcSerializer::<i32>::new(registry.lookup::<i32>().unwrap()).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_arc_serializer_rejects_wrong_value_type() {
    let registry = SerializerRegistry::with_builtins();
    let erased = registry.lookup::<i32>().unwrap();
    assert!(matches!(
        ArcSerializer::<i64>::new(erased),
        Err(Error::InvalidArgument(_))
    ));
}

#[test]
fn test_projecting_deserializer_is_read_only() {
    let widen: fn(i32) -> i64 = i64::from;
    let serializer = ProjectingDeserializer::new(Int32Serializer::new(), widen);
    let mut writer = VecWriter::new();
    writer.write_start_document().unwrap();
    writer.write_name("v").unwrap();
    assert!(matches!(
        serializer.serialize(&mut writer, &1_i64),
        Err(Error::Unsupported(_))
    ));
}

#[test]
fn test_projecting_deserializer_projects() {
    let document = polybson::doc! { "v" => 41 };
    let bytes = document.to_bytes().unwrap();
    let increment: fn(i32) -> i32 = |v| v + 1;
    let serializer = ProjectingDeserializer::new(Int32Serializer::new(), increment);
    let mut reader = SliceReader::new(&bytes);
    reader.read_start_document().unwrap();
    reader.read_name().unwrap();
    assert_eq!(serializer.deserialize(&mut reader).unwrap(), 42);
}

#[test]
fn test_projecting_deserializer_equality_compares_projection() {
    fn double(v: i32) -> i64 {
        i64::from(v) * 2
    }
    fn triple(v: i32) -> i64 {
        i64::from(v) * 3
    }
    let a = ProjectingDeserializer::new(Int32Serializer::new(), double as fn(i32) -> i64);
    let b = ProjectingDeserializer::new(Int32Serializer::new(), double as fn(i32) -> i64);
    let c = ProjectingDeserializer::new(Int32Serializer::new(), triple as fn(i32) -> i64);
    assert_eq!(a, b);
    assert_ne!(a, c);
}

#[test]
fn test_downcasting_serializer() {
    let registry = SerializerRegistry::with_builtins();
    let serializer =
        DowncastingSerializer::<ArcSerializer<i32>>::from_dyn(registry.lookup::<i32>().unwrap())
            .unwrap();

    let boxed: Box<dyn std::any::Any + Send + Sync> = Box::new(5_i32);
    let mut writer = VecWriter::new();
    writer.write_start_document().unwrap();
    writer.write_name("v").unwrap();
    serializer.serialize(&mut writer, &boxed).unwrap();
    writer.write_end_document().unwrap();
    let bytes = writer.into_bytes();

    let mut reader = SliceReader::new(&bytes);
    reader.read_start_document().unwrap();
    reader.read_name().unwrap();
    let copy = serializer.deserialize(&mut reader).unwrap();
    assert_eq!(copy.downcast_ref::<i32>(), Some(&5));

    // a box of the wrong runtime type is rejected
    let wrong: Box<dyn std::any::Any + Send + Sync> = Box::new("nope".to_string());
    let mut writer = VecWriter::new();
    writer.write_start_document().unwrap();
    writer.write_name("v").unwrap();
    assert!(matches!(
        serializer.serialize(&mut writer, &wrong),
        Err(Error::Downcast { .. })
    ));
}

#[test]
fn test_downcasting_serializer_rejects_mismatched_dyn() {
    let registry = SerializerRegistry::with_builtins();
    assert!(matches!(
        DowncastingSerializer::<ArcSerializer<i64>>::from_dyn(registry.lookup::<i32>().unwrap()),
        Err(Error::InvalidArgument(_))
    ));
}
