/*
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! BSON ObjectId values.

use rand::Rng;
use std::time::{SystemTime, UNIX_EPOCH};

/// A 12-byte BSON ObjectId.
///
/// The first four bytes hold a big-endian unix timestamp; the remaining eight
/// are random. Only generation and the hexadecimal text form are provided
/// here; the driver-level machine/process-id layout is not reproduced.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId {
    bytes: [u8; 12],
}

/// Errors raised when parsing the hexadecimal text form of an [`ObjectId`].
#[derive(thiserror::Error, Debug)]
pub enum ParseObjectIdError {
    #[error("an ObjectId is 24 hexadecimal characters, got {0}")]
    InvalidLength(usize),
    #[error(transparent)]
    InvalidHex(#[from] hex::FromHexError),
}

impl ObjectId {
    /// Generates a fresh id from the current time and a random payload.
    pub fn new() -> Self {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as u32)
            .unwrap_or(0);
        let mut bytes = [0u8; 12];
        bytes[..4].copy_from_slice(&secs.to_be_bytes());
        rand::thread_rng().fill(&mut bytes[4..]);
        Self { bytes }
    }

    pub const fn from_bytes(bytes: [u8; 12]) -> Self {
        Self { bytes }
    }

    pub const fn bytes(&self) -> [u8; 12] {
        self.bytes
    }

    /// Parses the 24-character hexadecimal text form.
    pub fn parse_str(s: &str) -> Result<Self, ParseObjectIdError> {
        if s.len() != 24 {
            return Err(ParseObjectIdError::InvalidLength(s.len()));
        }
        let decoded = hex::decode(s)?;
        let mut bytes = [0u8; 12];
        bytes.copy_from_slice(&decoded);
        Ok(Self { bytes })
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&hex::encode(self.bytes))
    }
}

impl core::fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "ObjectId(\"{}\")", self)
    }
}
