/*
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Serializers for the dynamically typed value tree.

use crate::bson::{Bson, Document};
use crate::raw::{read_bson, read_document, write_bson, write_document, RawReader, RawWriter};
use crate::ser::{Result, Serializer};

/// Serializer for [`Bson`]: writes whatever variant the value holds and
/// reads back whatever type the stream holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BsonValueSerializer;

impl BsonValueSerializer {
    pub fn new() -> Self {
        Self
    }
}

impl Serializer for BsonValueSerializer {
    type Value = Bson;

    fn serialize(&self, writer: &mut dyn RawWriter, value: &Bson) -> Result<()> {
        Ok(write_bson(writer, value)?)
    }

    fn deserialize(&self, reader: &mut dyn RawReader) -> Result<Bson> {
        Ok(read_bson(reader)?)
    }
}

crate::constant_hash!(BsonValueSerializer);

/// Serializer for [`Document`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DocumentSerializer;

impl DocumentSerializer {
    pub fn new() -> Self {
        Self
    }
}

impl Serializer for DocumentSerializer {
    type Value = Document;

    fn serialize(&self, writer: &mut dyn RawWriter, value: &Document) -> Result<()> {
        Ok(write_document(writer, value)?)
    }

    fn deserialize(&self, reader: &mut dyn RawReader) -> Result<Document> {
        Ok(read_document(reader)?)
    }
}

crate::constant_hash!(DocumentSerializer);
