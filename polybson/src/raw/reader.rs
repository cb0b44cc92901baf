/*
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! The reader port.

use super::{ContainerKind, Result};
use crate::bson::{
    Array, Binary, Bson, DateTime, Decimal128, Document, ElementType, ObjectId,
};

/// A saved reader position.
///
/// Produced by [`RawReader::bookmark`] and consumed by [`RawReader::seek`],
/// this is what lets a discriminator convention peek into a document without
/// consuming it.
#[derive(Clone)]
pub struct Bookmark {
    pub(crate) pos: usize,
    pub(crate) state: ReadState,
    pub(crate) ctx: Vec<ReadCtx>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ReadState {
    Initial,
    /// Positioned between elements; the next byte is a type tag or the
    /// document terminator.
    Type,
    /// Positioned on a value whose tag and name have been consumed.
    Value(ElementType),
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ReadCtx {
    pub(crate) kind: ContainerKind,
    /// Offset one past the container's terminator byte.
    pub(crate) end: usize,
}

/// A sequential, pull-based cursor reading one typed value at a time.
///
/// [`peek_type`] is non-consuming and idempotent: it reports the type of the
/// next element, or `None` when the cursor sits before a container
/// terminator. Inside a document each value read must be preceded by
/// [`read_name`]; inside an array the auto-generated index names are consumed
/// implicitly by the value reads.
///
/// [`peek_type`]: RawReader::peek_type
/// [`read_name`]: RawReader::read_name
pub trait RawReader {
    fn peek_type(&self) -> Result<Option<ElementType>>;
    fn read_name(&mut self) -> Result<String>;
    fn read_start_document(&mut self) -> Result<()>;
    fn read_end_document(&mut self) -> Result<()>;
    fn read_start_array(&mut self) -> Result<()>;
    fn read_end_array(&mut self) -> Result<()>;
    fn read_double(&mut self) -> Result<f64>;
    fn read_string(&mut self) -> Result<String>;
    fn read_boolean(&mut self) -> Result<bool>;
    fn read_i32(&mut self) -> Result<i32>;
    fn read_i64(&mut self) -> Result<i64>;
    fn read_decimal128(&mut self) -> Result<Decimal128>;
    fn read_date_time(&mut self) -> Result<DateTime>;
    fn read_object_id(&mut self) -> Result<ObjectId>;
    fn read_binary(&mut self) -> Result<Binary>;
    fn read_null(&mut self) -> Result<()>;

    /// Skips the value at the current position, whatever its type.
    fn skip_value(&mut self) -> Result<()>;

    /// Saves the current position.
    fn bookmark(&self) -> Bookmark;

    /// Restores a position previously saved with [`bookmark`](RawReader::bookmark).
    fn seek(&mut self, bookmark: Bookmark);

    /// Current container nesting depth.
    fn depth(&self) -> usize;
}

/// Reads an arbitrary [`Bson`] value at the current value position.
pub fn read_bson(reader: &mut dyn RawReader) -> Result<Bson> {
    let ty = reader.peek_type()?.ok_or(super::Error::InvalidState {
        op: "read_bson",
        position: "before a container terminator",
    })?;
    Ok(match ty {
        ElementType::Double => Bson::Double(reader.read_double()?),
        ElementType::String => Bson::String(reader.read_string()?),
        ElementType::Document => Bson::Document(read_document(reader)?),
        ElementType::Array => Bson::Array(read_array(reader)?),
        ElementType::Binary => Bson::Binary(reader.read_binary()?),
        ElementType::ObjectId => Bson::ObjectId(reader.read_object_id()?),
        ElementType::Boolean => Bson::Boolean(reader.read_boolean()?),
        ElementType::DateTime => Bson::DateTime(reader.read_date_time()?),
        ElementType::Null => {
            reader.read_null()?;
            Bson::Null
        }
        ElementType::Int32 => Bson::Int32(reader.read_i32()?),
        ElementType::Int64 => Bson::Int64(reader.read_i64()?),
        ElementType::Decimal128 => Bson::Decimal128(reader.read_decimal128()?),
        other => return Err(super::Error::Unrepresentable(other)),
    })
}

/// Reads a whole embedded document into a [`Document`], preserving element
/// order.
pub fn read_document(reader: &mut dyn RawReader) -> Result<Document> {
    reader.read_start_document()?;
    let mut document = Document::new();
    while reader.peek_type()?.is_some() {
        let name = reader.read_name()?;
        let value = read_bson(reader)?;
        document.insert(name, value);
    }
    reader.read_end_document()?;
    Ok(document)
}

/// Reads a whole array.
pub fn read_array(reader: &mut dyn RawReader) -> Result<Array> {
    reader.read_start_array()?;
    let mut items = Vec::new();
    while reader.peek_type()?.is_some() {
        items.push(read_bson(reader)?);
    }
    reader.read_end_array()?;
    Ok(items)
}
