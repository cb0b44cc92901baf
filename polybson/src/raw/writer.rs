/*
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! The writer port.

use super::Result;
use crate::bson::{Binary, Bson, DateTime, Decimal128, Document, ObjectId};

/// A sequential, push-based cursor writing one typed value at a time.
///
/// Inside a document each value must be preceded by [`write_name`]; inside an
/// array names are generated automatically and calling [`write_name`] is an
/// error. Implementations enforce the grammar and the nesting-depth limit.
///
/// [`write_name`]: RawWriter::write_name
pub trait RawWriter {
    fn write_start_document(&mut self) -> Result<()>;
    fn write_end_document(&mut self) -> Result<()>;
    fn write_start_array(&mut self) -> Result<()>;
    fn write_end_array(&mut self) -> Result<()>;
    fn write_name(&mut self, name: &str) -> Result<()>;
    fn write_double(&mut self, value: f64) -> Result<()>;
    fn write_string(&mut self, value: &str) -> Result<()>;
    fn write_boolean(&mut self, value: bool) -> Result<()>;
    fn write_i32(&mut self, value: i32) -> Result<()>;
    fn write_i64(&mut self, value: i64) -> Result<()>;
    fn write_decimal128(&mut self, value: Decimal128) -> Result<()>;
    fn write_date_time(&mut self, value: DateTime) -> Result<()>;
    fn write_object_id(&mut self, value: ObjectId) -> Result<()>;
    fn write_binary(&mut self, value: &Binary) -> Result<()>;
    fn write_null(&mut self) -> Result<()>;

    /// Current container nesting depth.
    fn depth(&self) -> usize;
}

/// Writes an arbitrary [`Bson`] value at the current value position.
///
/// Recursion is bounded by the writer's depth limit.
pub fn write_bson(writer: &mut dyn RawWriter, value: &Bson) -> Result<()> {
    match value {
        Bson::Double(v) => writer.write_double(*v),
        Bson::String(v) => writer.write_string(v),
        Bson::Document(v) => write_document(writer, v),
        Bson::Array(items) => {
            writer.write_start_array()?;
            for item in items {
                write_bson(writer, item)?;
            }
            writer.write_end_array()
        }
        Bson::Binary(v) => writer.write_binary(v),
        Bson::ObjectId(v) => writer.write_object_id(*v),
        Bson::Boolean(v) => writer.write_boolean(*v),
        Bson::DateTime(v) => writer.write_date_time(*v),
        Bson::Null => writer.write_null(),
        Bson::Int32(v) => writer.write_i32(*v),
        Bson::Int64(v) => writer.write_i64(*v),
        Bson::Decimal128(v) => writer.write_decimal128(*v),
    }
}

/// Writes a whole [`Document`] in its insertion order.
pub fn write_document(writer: &mut dyn RawWriter, document: &Document) -> Result<()> {
    writer.write_start_document()?;
    for (name, value) in document.iter() {
        writer.write_name(name)?;
        write_bson(writer, value)?;
    }
    writer.write_end_document()
}
