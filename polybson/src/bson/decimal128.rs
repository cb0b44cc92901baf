/*
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! BSON decimal128 values.

/// An IEEE 754-2008 decimal128 value carried as its 16-byte little-endian
/// wire form.
///
/// The engine guarantees byte-exact round-trips of these 16 bytes. Decimal
/// arithmetic, parsing and human-readable formatting belong to a numeric
/// layer above this crate.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Decimal128 {
    bytes: [u8; 16],
}

impl Decimal128 {
    pub const fn from_bits(bits: u128) -> Self {
        Self {
            bytes: bits.to_le_bytes(),
        }
    }

    pub const fn to_bits(&self) -> u128 {
        u128::from_le_bytes(self.bytes)
    }

    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self { bytes }
    }

    pub const fn bytes(&self) -> [u8; 16] {
        self.bytes
    }
}

impl core::fmt::Debug for Decimal128 {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "Decimal128(0x{:032x})", self.to_bits())
    }
}
