/*
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! The built-in serializers: primitives, nullable and collection wrappers,
//! tuples, maps, and the adapters (downcasting, projecting,
//! document-backed).
//!
//! Every composite here owns its child serializers as configuration fields;
//! children come either from explicit constructor injection or from a
//! registry lookup wrapped in an
//! [`ArcSerializer`](crate::ser::ArcSerializer).

mod backed;
mod map;
mod option;
mod prim;
mod seq;
mod tuple;
mod value;
mod wrappers;

pub use backed::{BackedClassSerializer, DocumentBacked};
pub use map::{
    BTreeMapSerializer, DocumentMapSerializer, HashMapSerializer, KeyValuePairSerializer,
    MapRepresentation, PairRepresentation,
};
pub use option::OptionSerializer;
pub use prim::{
    BinaryDataSerializer, BooleanSerializer, DateTimeSerializer, Decimal128Serializer,
    DoubleSerializer, Int32Serializer, Int64Serializer, NumericRepresentation,
    ObjectIdSerializer, StringSerializer,
};
pub use seq::VecSerializer;
pub use tuple::{
    check_arity, try_parse_item_name, TupleSerializer1, TupleSerializer2, TupleSerializer3,
    TupleSerializer4, TupleSerializer5, TupleSerializer6, TupleSerializer7, TupleSerializer8,
    MAX_TUPLE_ARITY,
};
pub use value::{BsonValueSerializer, DocumentSerializer};
pub use wrappers::{DowncastingSerializer, ProjectingDeserializer};

use crate::bson::ElementType;
use crate::ser::Error;

/// Error for a value read where the stream holds a different type (or the
/// end of a container).
pub(crate) fn unexpected(
    expected: ElementType,
    found: Option<ElementType>,
    op: &'static str,
) -> Error {
    match found {
        Some(actual) => crate::raw::Error::TypeMismatch { expected, actual }.into(),
        None => crate::raw::Error::InvalidState {
            op,
            position: "before a container terminator",
        }
        .into(),
    }
}
