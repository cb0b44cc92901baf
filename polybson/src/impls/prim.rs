/*
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Serializers for the primitive BSON-mapped types.
//!
//! The numeric serializers carry a [`NumericRepresentation`]: the wire type
//! the value is stored under. Conversions that would lose information fail
//! with [`Error::NumericOverflow`]; in particular NaN and the infinities are
//! rejected by the integral representations, while the native double
//! representation round-trips them bit-exactly.

use super::unexpected;
use crate::bson::{Binary, DateTime, Decimal128, ElementType, ObjectId};
use crate::raw::{RawReader, RawWriter};
use crate::ser::{Error, Result, Serializer};

/// The wire type a numeric serializer stores its values under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericRepresentation {
    Int32,
    Int64,
    Double,
}

fn f64_to_i32(value: f64) -> Result<i32> {
    if !value.is_finite() || value.trunc() != value || value < i32::MIN as f64 || value > i32::MAX as f64 {
        return Err(Error::NumericOverflow {
            value,
            representation: "Int32",
        });
    }
    Ok(value as i32)
}

fn f64_to_i64(value: f64) -> Result<i64> {
    // 2^63 is exactly representable as an f64; i64::MAX is not.
    if !value.is_finite()
        || value.trunc() != value
        || value < -(2f64.powi(63))
        || value >= 2f64.powi(63)
    {
        return Err(Error::NumericOverflow {
            value,
            representation: "Int64",
        });
    }
    Ok(value as i64)
}

fn i64_to_i32(value: i64) -> Result<i32> {
    i32::try_from(value).map_err(|_| Error::NumericOverflow {
        value: value as f64,
        representation: "Int32",
    })
}

/// Serializer for `bool`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BooleanSerializer;

impl BooleanSerializer {
    pub fn new() -> Self {
        Self
    }
}

impl Serializer for BooleanSerializer {
    type Value = bool;

    fn serialize(&self, writer: &mut dyn RawWriter, value: &bool) -> Result<()> {
        Ok(writer.write_boolean(*value)?)
    }

    fn deserialize(&self, reader: &mut dyn RawReader) -> Result<bool> {
        Ok(reader.read_boolean()?)
    }
}

crate::constant_hash!(BooleanSerializer);

/// Serializer for `i32`, with a selectable wire representation.
///
/// Deserialization accepts any of the three numeric wire types and narrows,
/// failing with [`Error::NumericOverflow`] when the stored value does not
/// fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Int32Serializer {
    representation: NumericRepresentation,
}

impl Default for Int32Serializer {
    fn default() -> Self {
        Self::new()
    }
}

impl Int32Serializer {
    pub fn new() -> Self {
        Self::with_representation(NumericRepresentation::Int32)
    }

    pub fn with_representation(representation: NumericRepresentation) -> Self {
        Self { representation }
    }

    pub fn representation(&self) -> NumericRepresentation {
        self.representation
    }
}

impl Serializer for Int32Serializer {
    type Value = i32;

    fn serialize(&self, writer: &mut dyn RawWriter, value: &i32) -> Result<()> {
        match self.representation {
            NumericRepresentation::Int32 => writer.write_i32(*value)?,
            NumericRepresentation::Int64 => writer.write_i64(*value as i64)?,
            NumericRepresentation::Double => writer.write_double(*value as f64)?,
        }
        Ok(())
    }

    fn deserialize(&self, reader: &mut dyn RawReader) -> Result<i32> {
        match reader.peek_type()? {
            Some(ElementType::Int32) => Ok(reader.read_i32()?),
            Some(ElementType::Int64) => i64_to_i32(reader.read_i64()?),
            Some(ElementType::Double) => f64_to_i32(reader.read_double()?),
            other => Err(unexpected(ElementType::Int32, other, "read_i32")),
        }
    }
}

crate::constant_hash!(Int32Serializer);

/// Serializer for `i64`, with a selectable wire representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Int64Serializer {
    representation: NumericRepresentation,
}

impl Default for Int64Serializer {
    fn default() -> Self {
        Self::new()
    }
}

impl Int64Serializer {
    pub fn new() -> Self {
        Self::with_representation(NumericRepresentation::Int64)
    }

    pub fn with_representation(representation: NumericRepresentation) -> Self {
        Self { representation }
    }

    pub fn representation(&self) -> NumericRepresentation {
        self.representation
    }
}

impl Serializer for Int64Serializer {
    type Value = i64;

    fn serialize(&self, writer: &mut dyn RawWriter, value: &i64) -> Result<()> {
        match self.representation {
            NumericRepresentation::Int32 => writer.write_i32(i64_to_i32(*value)?)?,
            NumericRepresentation::Int64 => writer.write_i64(*value)?,
            NumericRepresentation::Double => {
                // only doubles with an exact i64 preimage may be written
                let as_double = *value as f64;
                if as_double as i64 != *value {
                    return Err(Error::NumericOverflow {
                        value: *value as f64,
                        representation: "Double",
                    });
                }
                writer.write_double(as_double)?
            }
        }
        Ok(())
    }

    fn deserialize(&self, reader: &mut dyn RawReader) -> Result<i64> {
        match reader.peek_type()? {
            Some(ElementType::Int32) => Ok(reader.read_i32()? as i64),
            Some(ElementType::Int64) => Ok(reader.read_i64()?),
            Some(ElementType::Double) => f64_to_i64(reader.read_double()?),
            other => Err(unexpected(ElementType::Int64, other, "read_i64")),
        }
    }
}

crate::constant_hash!(Int64Serializer);

/// Serializer for `f64`, with a selectable wire representation.
///
/// Under [`NumericRepresentation::Double`] every value round-trips
/// bit-exactly, NaN included. Under the integral representations only
/// finite, integral, in-range values are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DoubleSerializer {
    representation: NumericRepresentation,
}

impl Default for DoubleSerializer {
    fn default() -> Self {
        Self::new()
    }
}

impl DoubleSerializer {
    pub fn new() -> Self {
        Self::with_representation(NumericRepresentation::Double)
    }

    pub fn with_representation(representation: NumericRepresentation) -> Self {
        Self { representation }
    }

    pub fn representation(&self) -> NumericRepresentation {
        self.representation
    }
}

impl Serializer for DoubleSerializer {
    type Value = f64;

    fn serialize(&self, writer: &mut dyn RawWriter, value: &f64) -> Result<()> {
        match self.representation {
            NumericRepresentation::Int32 => writer.write_i32(f64_to_i32(*value)?)?,
            NumericRepresentation::Int64 => writer.write_i64(f64_to_i64(*value)?)?,
            NumericRepresentation::Double => writer.write_double(*value)?,
        }
        Ok(())
    }

    fn deserialize(&self, reader: &mut dyn RawReader) -> Result<f64> {
        match reader.peek_type()? {
            Some(ElementType::Int32) => Ok(reader.read_i32()? as f64),
            Some(ElementType::Int64) => Ok(reader.read_i64()? as f64),
            Some(ElementType::Double) => Ok(reader.read_double()?),
            other => Err(unexpected(ElementType::Double, other, "read_double")),
        }
    }
}

crate::constant_hash!(DoubleSerializer);

macro_rules! impl_plain_serializer {
    ($(#[$meta:meta] ($name:ident, $value:ty, $write:ident, $read:ident),)+) => {$(
        #[$meta]
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
        pub struct $name;

        impl $name {
            pub fn new() -> Self {
                Self
            }
        }

        impl Serializer for $name {
            type Value = $value;

            fn serialize(&self, writer: &mut dyn RawWriter, value: &Self::Value) -> Result<()> {
                Ok(writer.$write(*value)?)
            }

            fn deserialize(&self, reader: &mut dyn RawReader) -> Result<Self::Value> {
                Ok(reader.$read()?)
            }
        }

        crate::constant_hash!($name);
    )+};
}

impl_plain_serializer!(
    /// Serializer for [`ObjectId`].
    (ObjectIdSerializer, ObjectId, write_object_id, read_object_id),
    /// Serializer for [`DateTime`].
    (DateTimeSerializer, DateTime, write_date_time, read_date_time),
    /// Serializer for [`Decimal128`]; round-trips the 16 wire bytes exactly.
    (Decimal128Serializer, Decimal128, write_decimal128, read_decimal128),
);

/// Serializer for `String`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StringSerializer;

impl StringSerializer {
    pub fn new() -> Self {
        Self
    }
}

impl Serializer for StringSerializer {
    type Value = String;

    fn serialize(&self, writer: &mut dyn RawWriter, value: &String) -> Result<()> {
        Ok(writer.write_string(value)?)
    }

    fn deserialize(&self, reader: &mut dyn RawReader) -> Result<String> {
        Ok(reader.read_string()?)
    }
}

crate::constant_hash!(StringSerializer);

/// Serializer for [`Binary`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BinaryDataSerializer;

impl BinaryDataSerializer {
    pub fn new() -> Self {
        Self
    }
}

impl Serializer for BinaryDataSerializer {
    type Value = Binary;

    fn serialize(&self, writer: &mut dyn RawWriter, value: &Binary) -> Result<()> {
        Ok(writer.write_binary(value)?)
    }

    fn deserialize(&self, reader: &mut dyn RawReader) -> Result<Binary> {
        Ok(reader.read_binary()?)
    }
}

crate::constant_hash!(BinaryDataSerializer);
