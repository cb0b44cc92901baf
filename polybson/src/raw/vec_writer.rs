/*
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Binary writer backend.

use super::{ContainerKind, Error, RawWriter, Result, DEFAULT_MAX_DEPTH};
use crate::bson::{Binary, DateTime, Decimal128, ElementType, ObjectId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriteState {
    Initial,
    /// Expecting a name or the end of the enclosing document.
    Name,
    /// Expecting a value (or, inside an array, the end of the array).
    Value,
    Done,
}

struct WriteCtx {
    kind: ContainerKind,
    /// Offset of the length prefix to back-patch.
    start: usize,
    /// Next auto-generated array index.
    index: u64,
}

/// A [`RawWriter`] encoding into an in-memory buffer.
///
/// Container lengths are reserved as four-byte placeholders and back-patched
/// when the container closes, so a document is written in a single forward
/// pass.
pub struct VecWriter {
    buf: Vec<u8>,
    ctx: Vec<WriteCtx>,
    state: WriteState,
    pending_name: Option<String>,
    max_depth: usize,
}

impl Default for VecWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl VecWriter {
    pub fn new() -> Self {
        Self::with_max_depth(DEFAULT_MAX_DEPTH)
    }

    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            buf: Vec::new(),
            ctx: Vec::new(),
            state: WriteState::Initial,
            pending_name: None,
            max_depth,
        }
    }

    /// Whether the top-level document has been closed.
    pub fn is_finished(&self) -> bool {
        self.state == WriteState::Done
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    fn position(&self) -> &'static str {
        match self.state {
            WriteState::Initial => "before the top-level document",
            WriteState::Name => "where an element name is expected",
            WriteState::Value => "where a value is expected",
            WriteState::Done => "after the top-level document",
        }
    }

    fn invalid(&self, op: &'static str) -> Error {
        Error::InvalidState {
            op,
            position: self.position(),
        }
    }

    fn push_cstring(&mut self, s: &str) -> Result<()> {
        if s.as_bytes().contains(&0) {
            return Err(Error::InteriorNul);
        }
        self.buf.extend_from_slice(s.as_bytes());
        self.buf.push(0);
        Ok(())
    }

    /// Emits the tag byte and element name of the next value.
    fn begin_element(&mut self, ty: ElementType, op: &'static str) -> Result<()> {
        if self.state != WriteState::Value {
            return Err(self.invalid(op));
        }
        let name = match self.ctx.last_mut() {
            Some(ctx) if ctx.kind == ContainerKind::Array => {
                let name = ctx.index.to_string();
                ctx.index += 1;
                name
            }
            Some(_) => self.pending_name.take().ok_or_else(|| self.invalid(op))?,
            None => return Err(self.invalid(op)),
        };
        self.buf.push(ty.to_u8());
        self.push_cstring(&name)
    }

    fn end_element(&mut self) {
        self.state = match self.ctx.last() {
            Some(ctx) if ctx.kind == ContainerKind::Array => WriteState::Value,
            Some(_) => WriteState::Name,
            None => WriteState::Done,
        };
    }

    fn open_container(&mut self, kind: ContainerKind) -> Result<()> {
        if self.ctx.len() >= self.max_depth {
            return Err(Error::MaxDepthExceeded(self.max_depth));
        }
        let start = self.buf.len();
        self.buf.extend_from_slice(&[0u8; 4]);
        self.ctx.push(WriteCtx {
            kind,
            start,
            index: 0,
        });
        self.state = match kind {
            ContainerKind::Document => WriteState::Name,
            ContainerKind::Array => WriteState::Value,
        };
        Ok(())
    }

    fn close_container(&mut self, kind: ContainerKind, op: &'static str) -> Result<()> {
        match self.ctx.last() {
            Some(ctx) if ctx.kind == kind => {}
            _ => return Err(self.invalid(op)),
        }
        let expected_state = match kind {
            ContainerKind::Document => WriteState::Name,
            ContainerKind::Array => WriteState::Value,
        };
        if self.state != expected_state || self.pending_name.is_some() {
            return Err(self.invalid(op));
        }
        let Some(ctx) = self.ctx.pop() else {
            return Err(self.invalid(op));
        };
        self.buf.push(0);
        let len = (self.buf.len() - ctx.start) as i32;
        self.buf[ctx.start..ctx.start + 4].copy_from_slice(&len.to_le_bytes());
        self.end_element();
        Ok(())
    }
}

impl RawWriter for VecWriter {
    fn write_start_document(&mut self) -> Result<()> {
        match self.state {
            WriteState::Initial => self.open_container(ContainerKind::Document),
            WriteState::Value => {
                self.begin_element(ElementType::Document, "write_start_document")?;
                self.open_container(ContainerKind::Document)
            }
            _ => Err(self.invalid("write_start_document")),
        }
    }

    fn write_end_document(&mut self) -> Result<()> {
        self.close_container(ContainerKind::Document, "write_end_document")
    }

    fn write_start_array(&mut self) -> Result<()> {
        if self.state != WriteState::Value {
            return Err(self.invalid("write_start_array"));
        }
        self.begin_element(ElementType::Array, "write_start_array")?;
        self.open_container(ContainerKind::Array)
    }

    fn write_end_array(&mut self) -> Result<()> {
        self.close_container(ContainerKind::Array, "write_end_array")
    }

    fn write_name(&mut self, name: &str) -> Result<()> {
        let in_document = matches!(
            self.ctx.last(),
            Some(ctx) if ctx.kind == ContainerKind::Document
        );
        if self.state != WriteState::Name || !in_document {
            return Err(self.invalid("write_name"));
        }
        if name.as_bytes().contains(&0) {
            return Err(Error::InteriorNul);
        }
        self.pending_name = Some(name.to_owned());
        self.state = WriteState::Value;
        Ok(())
    }

    fn write_double(&mut self, value: f64) -> Result<()> {
        self.begin_element(ElementType::Double, "write_double")?;
        self.buf.extend_from_slice(&value.to_le_bytes());
        self.end_element();
        Ok(())
    }

    fn write_string(&mut self, value: &str) -> Result<()> {
        self.begin_element(ElementType::String, "write_string")?;
        let len = (value.len() + 1) as i32;
        self.buf.extend_from_slice(&len.to_le_bytes());
        self.buf.extend_from_slice(value.as_bytes());
        self.buf.push(0);
        self.end_element();
        Ok(())
    }

    fn write_boolean(&mut self, value: bool) -> Result<()> {
        self.begin_element(ElementType::Boolean, "write_boolean")?;
        self.buf.push(value as u8);
        self.end_element();
        Ok(())
    }

    fn write_i32(&mut self, value: i32) -> Result<()> {
        self.begin_element(ElementType::Int32, "write_i32")?;
        self.buf.extend_from_slice(&value.to_le_bytes());
        self.end_element();
        Ok(())
    }

    fn write_i64(&mut self, value: i64) -> Result<()> {
        self.begin_element(ElementType::Int64, "write_i64")?;
        self.buf.extend_from_slice(&value.to_le_bytes());
        self.end_element();
        Ok(())
    }

    fn write_decimal128(&mut self, value: Decimal128) -> Result<()> {
        self.begin_element(ElementType::Decimal128, "write_decimal128")?;
        self.buf.extend_from_slice(&value.bytes());
        self.end_element();
        Ok(())
    }

    fn write_date_time(&mut self, value: DateTime) -> Result<()> {
        self.begin_element(ElementType::DateTime, "write_date_time")?;
        self.buf
            .extend_from_slice(&value.timestamp_millis().to_le_bytes());
        self.end_element();
        Ok(())
    }

    fn write_object_id(&mut self, value: ObjectId) -> Result<()> {
        self.begin_element(ElementType::ObjectId, "write_object_id")?;
        self.buf.extend_from_slice(&value.bytes());
        self.end_element();
        Ok(())
    }

    fn write_binary(&mut self, value: &Binary) -> Result<()> {
        self.begin_element(ElementType::Binary, "write_binary")?;
        let len = value.bytes.len() as i32;
        self.buf.extend_from_slice(&len.to_le_bytes());
        self.buf.push(value.subtype.to_u8());
        self.buf.extend_from_slice(&value.bytes);
        self.end_element();
        Ok(())
    }

    fn write_null(&mut self) -> Result<()> {
        self.begin_element(ElementType::Null, "write_null")?;
        self.end_element();
        Ok(())
    }

    fn depth(&self) -> usize {
        self.ctx.len()
    }
}
