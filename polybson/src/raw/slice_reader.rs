/*
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Binary reader backend.

use super::reader::{Bookmark, RawReader, ReadCtx, ReadState};
use super::{ContainerKind, Error, Result, DEFAULT_MAX_DEPTH};
use crate::bson::{Binary, BinarySubtype, DateTime, Decimal128, ElementType, ObjectId};

/// A [`RawReader`] decoding from a byte slice.
///
/// Positions are plain offsets into the slice, which makes
/// [`bookmark`](RawReader::bookmark)/[`seek`](RawReader::seek) cheap; the
/// discriminator conventions rely on that to peek at a document without
/// consuming it.
pub struct SliceReader<'a> {
    data: &'a [u8],
    pos: usize,
    ctx: Vec<ReadCtx>,
    state: ReadState,
    max_depth: usize,
}

impl<'a> SliceReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self::with_max_depth(data, DEFAULT_MAX_DEPTH)
    }

    pub fn with_max_depth(data: &'a [u8], max_depth: usize) -> Self {
        Self {
            data,
            pos: 0,
            ctx: Vec::new(),
            state: ReadState::Initial,
            max_depth,
        }
    }

    /// Whether the top-level document has been fully consumed.
    pub fn is_finished(&self) -> bool {
        self.state == ReadState::Done
    }

    fn position(&self) -> &'static str {
        match self.state {
            ReadState::Initial => "before the top-level document",
            ReadState::Type => "between elements",
            ReadState::Value(_) => "on a value",
            ReadState::Done => "after the top-level document",
        }
    }

    fn invalid(&self, op: &'static str) -> Error {
        Error::InvalidState {
            op,
            position: self.position(),
        }
    }

    fn byte_at(&self, pos: usize) -> Result<u8> {
        self.data.get(pos).copied().ok_or(Error::UnexpectedEof)
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        let end = self.pos.checked_add(n).ok_or(Error::UnexpectedEof)?;
        let bytes = self.data.get(self.pos..end).ok_or(Error::UnexpectedEof)?;
        self.pos = end;
        Ok(bytes)
    }

    fn take_i32(&mut self) -> Result<i32> {
        let mut buf = [0u8; 4];
        buf.copy_from_slice(self.take(4)?);
        Ok(i32::from_le_bytes(buf))
    }

    fn take_cstring(&mut self) -> Result<String> {
        let rel = self.data[self.pos.min(self.data.len())..]
            .iter()
            .position(|&b| b == 0)
            .ok_or(Error::UnexpectedEof)?;
        let bytes = self.take(rel)?.to_vec();
        self.pos += 1; // terminator
        Ok(String::from_utf8(bytes)?)
    }

    fn skip_cstring(&mut self) -> Result<()> {
        let rel = self.data[self.pos.min(self.data.len())..]
            .iter()
            .position(|&b| b == 0)
            .ok_or(Error::UnexpectedEof)?;
        self.pos += rel + 1;
        Ok(())
    }

    /// Positions the cursor on a value of the expected type, consuming the
    /// tag and auto-generated name when inside an array.
    fn begin_value(&mut self, expected: ElementType, op: &'static str) -> Result<()> {
        match self.state {
            ReadState::Value(ty) => {
                if ty != expected {
                    return Err(Error::TypeMismatch {
                        expected,
                        actual: ty,
                    });
                }
                Ok(())
            }
            ReadState::Type => {
                match self.ctx.last() {
                    Some(ctx) if ctx.kind == ContainerKind::Array => {}
                    _ => return Err(self.invalid(op)),
                }
                let tag = self.byte_at(self.pos)?;
                if tag == 0 {
                    return Err(self.invalid(op));
                }
                let ty = ElementType::from_u8(tag).ok_or(Error::InvalidTypeByte(tag))?;
                if ty != expected {
                    return Err(Error::TypeMismatch {
                        expected,
                        actual: ty,
                    });
                }
                self.pos += 1;
                self.skip_cstring()?;
                self.state = ReadState::Value(ty);
                Ok(())
            }
            _ => Err(self.invalid(op)),
        }
    }

    fn end_value(&mut self) {
        self.state = ReadState::Type;
    }

    fn open_container(&mut self, kind: ContainerKind, expected: ElementType, op: &'static str) -> Result<()> {
        if self.state != ReadState::Initial {
            self.begin_value(expected, op)?;
        } else if kind == ContainerKind::Array {
            // the top level of a BSON stream is always a document
            return Err(self.invalid(op));
        }
        if self.ctx.len() >= self.max_depth {
            return Err(Error::MaxDepthExceeded(self.max_depth));
        }
        let start = self.pos;
        let len = self.take_i32()?;
        if len < 5 {
            return Err(Error::InvalidLength(len));
        }
        let end = start.checked_add(len as usize).ok_or(Error::InvalidLength(len))?;
        if end > self.data.len() {
            return Err(Error::InvalidLength(len));
        }
        self.ctx.push(ReadCtx { kind, end });
        self.state = ReadState::Type;
        Ok(())
    }

    fn close_container(&mut self, kind: ContainerKind, op: &'static str) -> Result<()> {
        match self.ctx.last() {
            Some(ctx) if ctx.kind == kind => {}
            _ => return Err(self.invalid(op)),
        }
        if self.state != ReadState::Type {
            return Err(self.invalid(op));
        }
        if self.byte_at(self.pos)? != 0 {
            // elements remain unread
            return Err(self.invalid(op));
        }
        self.pos += 1;
        let Some(ctx) = self.ctx.pop() else {
            return Err(self.invalid(op));
        };
        if self.pos != ctx.end {
            return Err(Error::InvalidLength((ctx.end as i64 - self.pos as i64) as i32));
        }
        self.state = if self.ctx.is_empty() {
            ReadState::Done
        } else {
            ReadState::Type
        };
        Ok(())
    }

    fn skip_payload(&mut self, ty: ElementType) -> Result<()> {
        use ElementType::*;
        match ty {
            Double | Int64 | DateTime | Timestamp => {
                self.take(8)?;
            }
            Int32 => {
                self.take(4)?;
            }
            Boolean => {
                self.take(1)?;
            }
            Null | Undefined | MinKey | MaxKey => {}
            ObjectId => {
                self.take(12)?;
            }
            Decimal128 => {
                self.take(16)?;
            }
            String | JavaScriptCode | Symbol => {
                let len = self.take_i32()?;
                if len < 1 {
                    return Err(Error::InvalidLength(len));
                }
                self.take(len as usize)?;
            }
            Document | Array | JavaScriptCodeWithScope => {
                let len = self.take_i32()?;
                if len < 5 {
                    return Err(Error::InvalidLength(len));
                }
                self.take(len as usize - 4)?;
            }
            Binary => {
                let len = self.take_i32()?;
                if len < 0 {
                    return Err(Error::InvalidLength(len));
                }
                self.take(1 + len as usize)?;
            }
            RegularExpression => {
                self.skip_cstring()?;
                self.skip_cstring()?;
            }
            DbPointer => {
                let len = self.take_i32()?;
                if len < 1 {
                    return Err(Error::InvalidLength(len));
                }
                self.take(len as usize)?;
                self.take(12)?;
            }
        }
        Ok(())
    }
}

impl RawReader for SliceReader<'_> {
    fn peek_type(&self) -> Result<Option<ElementType>> {
        match self.state {
            ReadState::Initial => Ok(Some(ElementType::Document)),
            ReadState::Value(ty) => Ok(Some(ty)),
            ReadState::Type => {
                let tag = self.byte_at(self.pos)?;
                if tag == 0 {
                    return Ok(None);
                }
                match ElementType::from_u8(tag) {
                    Some(ty) => Ok(Some(ty)),
                    None => Err(Error::InvalidTypeByte(tag)),
                }
            }
            ReadState::Done => Ok(None),
        }
    }

    fn read_name(&mut self) -> Result<String> {
        match self.ctx.last() {
            Some(ctx) if ctx.kind == ContainerKind::Document => {}
            _ => return Err(self.invalid("read_name")),
        }
        if self.state != ReadState::Type {
            return Err(self.invalid("read_name"));
        }
        let tag = self.byte_at(self.pos)?;
        if tag == 0 {
            return Err(self.invalid("read_name"));
        }
        let ty = ElementType::from_u8(tag).ok_or(Error::InvalidTypeByte(tag))?;
        self.pos += 1;
        let name = self.take_cstring()?;
        self.state = ReadState::Value(ty);
        Ok(name)
    }

    fn read_start_document(&mut self) -> Result<()> {
        self.open_container(ContainerKind::Document, ElementType::Document, "read_start_document")
    }

    fn read_end_document(&mut self) -> Result<()> {
        self.close_container(ContainerKind::Document, "read_end_document")
    }

    fn read_start_array(&mut self) -> Result<()> {
        self.open_container(ContainerKind::Array, ElementType::Array, "read_start_array")
    }

    fn read_end_array(&mut self) -> Result<()> {
        self.close_container(ContainerKind::Array, "read_end_array")
    }

    fn read_double(&mut self) -> Result<f64> {
        self.begin_value(ElementType::Double, "read_double")?;
        let mut buf = [0u8; 8];
        buf.copy_from_slice(self.take(8)?);
        self.end_value();
        Ok(f64::from_le_bytes(buf))
    }

    fn read_string(&mut self) -> Result<String> {
        self.begin_value(ElementType::String, "read_string")?;
        let len = self.take_i32()?;
        if len < 1 {
            return Err(Error::InvalidLength(len));
        }
        let bytes = self.take(len as usize)?;
        if bytes[len as usize - 1] != 0 {
            return Err(Error::InvalidLength(len));
        }
        let value = String::from_utf8(bytes[..len as usize - 1].to_vec())?;
        self.end_value();
        Ok(value)
    }

    fn read_boolean(&mut self) -> Result<bool> {
        self.begin_value(ElementType::Boolean, "read_boolean")?;
        let byte = self.take(1)?[0];
        self.end_value();
        Ok(byte != 0)
    }

    fn read_i32(&mut self) -> Result<i32> {
        self.begin_value(ElementType::Int32, "read_i32")?;
        let value = self.take_i32()?;
        self.end_value();
        Ok(value)
    }

    fn read_i64(&mut self) -> Result<i64> {
        self.begin_value(ElementType::Int64, "read_i64")?;
        let mut buf = [0u8; 8];
        buf.copy_from_slice(self.take(8)?);
        self.end_value();
        Ok(i64::from_le_bytes(buf))
    }

    fn read_decimal128(&mut self) -> Result<Decimal128> {
        self.begin_value(ElementType::Decimal128, "read_decimal128")?;
        let mut buf = [0u8; 16];
        buf.copy_from_slice(self.take(16)?);
        self.end_value();
        Ok(Decimal128::from_bytes(buf))
    }

    fn read_date_time(&mut self) -> Result<DateTime> {
        self.begin_value(ElementType::DateTime, "read_date_time")?;
        let mut buf = [0u8; 8];
        buf.copy_from_slice(self.take(8)?);
        self.end_value();
        Ok(DateTime::from_millis(i64::from_le_bytes(buf)))
    }

    fn read_object_id(&mut self) -> Result<ObjectId> {
        self.begin_value(ElementType::ObjectId, "read_object_id")?;
        let mut buf = [0u8; 12];
        buf.copy_from_slice(self.take(12)?);
        self.end_value();
        Ok(ObjectId::from_bytes(buf))
    }

    fn read_binary(&mut self) -> Result<Binary> {
        self.begin_value(ElementType::Binary, "read_binary")?;
        let len = self.take_i32()?;
        if len < 0 {
            return Err(Error::InvalidLength(len));
        }
        let subtype = BinarySubtype::from_u8(self.take(1)?[0]);
        let bytes = self.take(len as usize)?.to_vec();
        self.end_value();
        Ok(Binary { subtype, bytes })
    }

    fn read_null(&mut self) -> Result<()> {
        self.begin_value(ElementType::Null, "read_null")?;
        self.end_value();
        Ok(())
    }

    fn skip_value(&mut self) -> Result<()> {
        match self.state {
            ReadState::Value(ty) => {
                self.skip_payload(ty)?;
                self.end_value();
                Ok(())
            }
            ReadState::Type => {
                match self.ctx.last() {
                    Some(ctx) if ctx.kind == ContainerKind::Array => {}
                    _ => return Err(self.invalid("skip_value")),
                }
                let tag = self.byte_at(self.pos)?;
                if tag == 0 {
                    return Err(self.invalid("skip_value"));
                }
                let ty = ElementType::from_u8(tag).ok_or(Error::InvalidTypeByte(tag))?;
                self.pos += 1;
                self.skip_cstring()?;
                self.skip_payload(ty)?;
                Ok(())
            }
            _ => Err(self.invalid("skip_value")),
        }
    }

    fn bookmark(&self) -> Bookmark {
        Bookmark {
            pos: self.pos,
            state: self.state,
            ctx: self.ctx.clone(),
        }
    }

    fn seek(&mut self, bookmark: Bookmark) {
        self.pos = bookmark.pos;
        self.state = bookmark.state;
        self.ctx = bookmark.ctx;
    }

    fn depth(&self) -> usize {
        self.ctx.len()
    }
}
