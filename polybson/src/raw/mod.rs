/*
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Sequential cursor ports over the wire encoding.
//!
//! [`RawWriter`] and [`RawReader`] expose one call per BSON primitive and
//! enforce the document grammar
//! `StartDocument (Name Value)* EndDocument` with a small state machine on
//! each side; any out-of-grammar call is an [`Error::InvalidState`]. Array
//! elements are named automatically with their decimal index, as the wire
//! format requires.
//!
//! [`VecWriter`] and [`SliceReader`] are the binary backends: fixed-width
//! little-endian numerics, length-prefixed UTF-8 strings with a trailing NUL,
//! and length-prefixed documents terminated by a `0x00` byte, with the length
//! back-patched when the document closes.

mod reader;
mod slice_reader;
mod vec_writer;
mod writer;

pub use reader::{read_array, read_bson, read_document, Bookmark, RawReader};
pub use slice_reader::SliceReader;
pub use vec_writer::VecWriter;
pub use writer::{write_bson, write_document, RawWriter};

pub type Result<T> = core::result::Result<T, Error>;

/// Nesting limit applied by both backends unless overridden.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Errors raised by the reader/writer ports. All of them denote a malformed
/// stream or an out-of-grammar call sequence; none are recoverable by
/// retrying.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("out-of-grammar call to {op} while positioned {position}")]
    InvalidState {
        op: &'static str,
        position: &'static str,
    },
    #[error("expected a {expected:?} value but the stream holds {actual:?}")]
    TypeMismatch {
        expected: crate::bson::ElementType,
        actual: crate::bson::ElementType,
    },
    #[error("unexpected end of stream")]
    UnexpectedEof,
    #[error("invalid element type byte 0x{0:02x}")]
    InvalidTypeByte(u8),
    #[error("invalid UTF-8 in string payload")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
    #[error("declared length {0} is inconsistent with the enclosing stream")]
    InvalidLength(i32),
    #[error("document nesting exceeds the configured limit of {0}")]
    MaxDepthExceeded(usize),
    #[error("element name contains an interior NUL byte")]
    InteriorNul,
    #[error("no in-memory representation for {0:?} values")]
    Unrepresentable(crate::bson::ElementType),
}

/// The two container shapes of the grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ContainerKind {
    Document,
    Array,
}
