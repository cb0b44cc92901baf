/*
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! BSON binary values.

/// The subtype byte attached to a BSON binary value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinarySubtype {
    Generic,
    Function,
    BinaryOld,
    UuidOld,
    Uuid,
    Md5,
    Encrypted,
    Column,
    UserDefined(u8),
}

impl BinarySubtype {
    pub fn from_u8(byte: u8) -> Self {
        match byte {
            0x00 => Self::Generic,
            0x01 => Self::Function,
            0x02 => Self::BinaryOld,
            0x03 => Self::UuidOld,
            0x04 => Self::Uuid,
            0x05 => Self::Md5,
            0x06 => Self::Encrypted,
            0x07 => Self::Column,
            other => Self::UserDefined(other),
        }
    }

    pub fn to_u8(self) -> u8 {
        match self {
            Self::Generic => 0x00,
            Self::Function => 0x01,
            Self::BinaryOld => 0x02,
            Self::UuidOld => 0x03,
            Self::Uuid => 0x04,
            Self::Md5 => 0x05,
            Self::Encrypted => 0x06,
            Self::Column => 0x07,
            Self::UserDefined(other) => other,
        }
    }
}

/// A BSON binary value: a subtype tag plus an opaque payload.
///
/// The deprecated `0x02` old-binary layout (payload wrapped in an extra
/// length prefix) is not special-cased; its payload is carried verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Binary {
    pub subtype: BinarySubtype,
    pub bytes: Vec<u8>,
}

impl Binary {
    pub fn new(subtype: BinarySubtype, bytes: Vec<u8>) -> Self {
        Self { subtype, bytes }
    }

    /// A generic-subtype binary.
    pub fn generic(bytes: Vec<u8>) -> Self {
        Self::new(BinarySubtype::Generic, bytes)
    }
}
