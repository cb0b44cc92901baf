/*
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! The in-memory document model: [`Bson`] values, ordered [`Document`]s and
//! the scalar types with dedicated wire layouts.
//!
//! This is the leaf layer of the engine; everything else (the raw ports, the
//! serializer registry, the discriminator conventions) is expressed in terms
//! of these types.

mod binary;
mod datetime;
mod decimal128;
mod document;
mod oid;
mod spec;

pub use binary::{Binary, BinarySubtype};
pub use datetime::DateTime;
pub use decimal128::Decimal128;
pub use document::Document;
pub use oid::{ObjectId, ParseObjectIdError};
pub use spec::ElementType;

/// A BSON array.
pub type Array = Vec<Bson>;

/// Any value representable in a BSON document.
#[derive(Debug, Clone, PartialEq)]
pub enum Bson {
    Double(f64),
    String(String),
    Document(Document),
    Array(Array),
    Binary(Binary),
    ObjectId(ObjectId),
    Boolean(bool),
    DateTime(DateTime),
    Null,
    Int32(i32),
    Int64(i64),
    Decimal128(Decimal128),
}

impl Bson {
    /// The wire type tag of this value.
    pub fn element_type(&self) -> ElementType {
        match self {
            Bson::Double(_) => ElementType::Double,
            Bson::String(_) => ElementType::String,
            Bson::Document(_) => ElementType::Document,
            Bson::Array(_) => ElementType::Array,
            Bson::Binary(_) => ElementType::Binary,
            Bson::ObjectId(_) => ElementType::ObjectId,
            Bson::Boolean(_) => ElementType::Boolean,
            Bson::DateTime(_) => ElementType::DateTime,
            Bson::Null => ElementType::Null,
            Bson::Int32(_) => ElementType::Int32,
            Bson::Int64(_) => ElementType::Int64,
            Bson::Decimal128(_) => ElementType::Decimal128,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Bson::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Bson::Int32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Bson::Int64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Bson::Double(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Bson::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_document(&self) -> Option<&Document> {
        match self {
            Bson::Document(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Bson]> {
        match self {
            Bson::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Bson::Null)
    }
}

macro_rules! impl_from {
    ($($ty:ty => $variant:ident,)*) => {$(
        impl From<$ty> for Bson {
            fn from(value: $ty) -> Self {
                Bson::$variant(value)
            }
        }
    )*};
}

impl_from!(
    f64 => Double,
    String => String,
    Document => Document,
    Array => Array,
    Binary => Binary,
    ObjectId => ObjectId,
    bool => Boolean,
    DateTime => DateTime,
    i32 => Int32,
    i64 => Int64,
    Decimal128 => Decimal128,
);

impl From<&str> for Bson {
    fn from(value: &str) -> Self {
        Bson::String(value.to_owned())
    }
}
