/*
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Wire-level constants from the BSON specification.

/// The type tag preceding each element in a BSON document.
///
/// The numeric values are the byte values mandated by the
/// [BSON specification](https://bsonspec.org/spec.html). The full tag set is
/// represented even though the engine ships dedicated serializers only for a
/// subset; the remaining tags can be skipped over but not decoded into values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ElementType {
    Double = 0x01,
    String = 0x02,
    Document = 0x03,
    Array = 0x04,
    Binary = 0x05,
    Undefined = 0x06,
    ObjectId = 0x07,
    Boolean = 0x08,
    DateTime = 0x09,
    Null = 0x0A,
    RegularExpression = 0x0B,
    DbPointer = 0x0C,
    JavaScriptCode = 0x0D,
    Symbol = 0x0E,
    JavaScriptCodeWithScope = 0x0F,
    Int32 = 0x10,
    Timestamp = 0x11,
    Int64 = 0x12,
    Decimal128 = 0x13,
    MinKey = 0xFF,
    MaxKey = 0x7F,
}

impl ElementType {
    /// Decodes a wire type byte. Returns `None` for unassigned byte values,
    /// including the `0x00` document terminator.
    pub fn from_u8(tag: u8) -> Option<Self> {
        Some(match tag {
            0x01 => Self::Double,
            0x02 => Self::String,
            0x03 => Self::Document,
            0x04 => Self::Array,
            0x05 => Self::Binary,
            0x06 => Self::Undefined,
            0x07 => Self::ObjectId,
            0x08 => Self::Boolean,
            0x09 => Self::DateTime,
            0x0A => Self::Null,
            0x0B => Self::RegularExpression,
            0x0C => Self::DbPointer,
            0x0D => Self::JavaScriptCode,
            0x0E => Self::Symbol,
            0x0F => Self::JavaScriptCodeWithScope,
            0x10 => Self::Int32,
            0x11 => Self::Timestamp,
            0x12 => Self::Int64,
            0x13 => Self::Decimal128,
            0xFF => Self::MinKey,
            0x7F => Self::MaxKey,
            _ => return None,
        })
    }

    /// The wire byte value of this tag.
    pub fn to_u8(self) -> u8 {
        self as u8
    }
}
