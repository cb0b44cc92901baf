/*
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Map and pair serializers.
//!
//! Maps can travel in three shapes: a plain embedded document whose element
//! names are the keys, an array of `{"k": …, "v": …}` documents, or an array
//! of `[key, value]` two-element arrays. The document shape is only valid
//! when the key type is `String`, since BSON element names are strings; the
//! array shapes place the key in value position and so work for any key
//! type.
//!
//! A sorted map re-sorts on deserialization by construction: entries are
//! inserted into a fresh `BTreeMap` in wire order and come out in key order.

use core::any::{Any, TypeId};

use crate::raw::{RawReader, RawWriter};
use crate::ser::{Error, Result, Serializer};
use std::collections::{BTreeMap, HashMap};

/// The wire shape of a serialized map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapRepresentation {
    /// An embedded document; keys become element names. String keys only.
    Document,
    /// An array of `{"k": …, "v": …}` documents.
    ArrayOfDocuments,
    /// An array of `[key, value]` arrays.
    ArrayOfArrays,
}

/// The wire shape of a serialized key/value pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairRepresentation {
    /// A `{"k": …, "v": …}` document.
    Document,
    /// A `[key, value]` array.
    Array,
}

fn key_as_name<K: 'static>(key: &K) -> Result<&str> {
    (key as &dyn Any)
        .downcast_ref::<String>()
        .map(String::as_str)
        .ok_or(Error::Downcast { expected: "String" })
}

fn name_as_key<K: 'static>(name: String) -> Result<K> {
    match (Box::new(name) as Box<dyn Any>).downcast::<K>() {
        Ok(key) => Ok(*key),
        Err(_) => Err(Error::Downcast {
            expected: core::any::type_name::<K>(),
        }),
    }
}

fn write_pair<KS, VS>(
    writer: &mut dyn RawWriter,
    key_serializer: &KS,
    value_serializer: &VS,
    key: &KS::Value,
    value: &VS::Value,
    representation: PairRepresentation,
) -> Result<()>
where
    KS: Serializer,
    VS: Serializer,
{
    match representation {
        PairRepresentation::Document => {
            writer.write_start_document()?;
            writer.write_name("k")?;
            key_serializer.serialize(writer, key)?;
            writer.write_name("v")?;
            value_serializer.serialize(writer, value)?;
            Ok(writer.write_end_document()?)
        }
        PairRepresentation::Array => {
            writer.write_start_array()?;
            key_serializer.serialize(writer, key)?;
            value_serializer.serialize(writer, value)?;
            Ok(writer.write_end_array()?)
        }
    }
}

fn read_pair<KS, VS>(
    reader: &mut dyn RawReader,
    key_serializer: &KS,
    value_serializer: &VS,
    representation: PairRepresentation,
) -> Result<(KS::Value, VS::Value)>
where
    KS: Serializer,
    VS: Serializer,
{
    match representation {
        PairRepresentation::Document => {
            let mut key = None;
            let mut value = None;
            reader.read_start_document()?;
            while reader.peek_type()?.is_some() {
                let name = reader.read_name()?;
                match name.as_str() {
                    "k" => key = Some(key_serializer.deserialize(reader)?),
                    "v" => value = Some(value_serializer.deserialize(reader)?),
                    _ => reader.skip_value()?,
                }
            }
            reader.read_end_document()?;
            Ok((
                key.ok_or_else(|| Error::MissingField("k".to_string()))?,
                value.ok_or_else(|| Error::MissingField("v".to_string()))?,
            ))
        }
        PairRepresentation::Array => {
            reader.read_start_array()?;
            let key = key_serializer.deserialize(reader)?;
            let value = value_serializer.deserialize(reader)?;
            reader.read_end_array()?;
            Ok((key, value))
        }
    }
}

/// Serializer for a single key/value pair.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyValuePairSerializer<KS, VS> {
    key: KS,
    value: VS,
    representation: PairRepresentation,
}

impl<KS, VS> KeyValuePairSerializer<KS, VS> {
    pub fn new(key: KS, value: VS) -> Self {
        Self::with_representation(key, value, PairRepresentation::Document)
    }

    pub fn with_representation(key: KS, value: VS, representation: PairRepresentation) -> Self {
        Self {
            key,
            value,
            representation,
        }
    }

    pub fn representation(&self) -> PairRepresentation {
        self.representation
    }
}

impl<KS, VS> Serializer for KeyValuePairSerializer<KS, VS>
where
    KS: Serializer,
    VS: Serializer,
{
    type Value = (KS::Value, VS::Value);

    fn serialize(&self, writer: &mut dyn RawWriter, value: &Self::Value) -> Result<()> {
        write_pair(
            writer,
            &self.key,
            &self.value,
            &value.0,
            &value.1,
            self.representation,
        )
    }

    fn deserialize(&self, reader: &mut dyn RawReader) -> Result<Self::Value> {
        read_pair(reader, &self.key, &self.value, self.representation)
    }
}

crate::constant_hash!(KeyValuePairSerializer<KS, VS>);

/// Serializer for `BTreeMap`, with a selectable wire shape.
///
/// Construction fails with [`Error::InvalidArgument`] when the document
/// representation is requested for a non-`String` key type.
#[derive(Debug, Clone, PartialEq)]
pub struct BTreeMapSerializer<KS, VS> {
    key: KS,
    value: VS,
    representation: MapRepresentation,
}

impl<KS: Serializer, VS> BTreeMapSerializer<KS, VS> {
    pub fn new(key: KS, value: VS, representation: MapRepresentation) -> Result<Self> {
        if representation == MapRepresentation::Document
            && TypeId::of::<KS::Value>() != TypeId::of::<String>()
        {
            return Err(Error::InvalidArgument(format!(
                "the document map representation requires String keys, not {}",
                core::any::type_name::<KS::Value>(),
            )));
        }
        Ok(Self {
            key,
            value,
            representation,
        })
    }

    pub fn representation(&self) -> MapRepresentation {
        self.representation
    }
}

impl<KS, VS> Serializer for BTreeMapSerializer<KS, VS>
where
    KS: Serializer,
    KS::Value: Ord,
    VS: Serializer,
{
    type Value = BTreeMap<KS::Value, VS::Value>;

    fn serialize(&self, writer: &mut dyn RawWriter, value: &Self::Value) -> Result<()> {
        match self.representation {
            MapRepresentation::Document => {
                writer.write_start_document()?;
                for (key, value) in value {
                    writer.write_name(key_as_name(key)?)?;
                    self.value.serialize(writer, value)?;
                }
                Ok(writer.write_end_document()?)
            }
            MapRepresentation::ArrayOfDocuments => {
                writer.write_start_array()?;
                for (key, value) in value {
                    write_pair(
                        writer,
                        &self.key,
                        &self.value,
                        key,
                        value,
                        PairRepresentation::Document,
                    )?;
                }
                Ok(writer.write_end_array()?)
            }
            MapRepresentation::ArrayOfArrays => {
                writer.write_start_array()?;
                for (key, value) in value {
                    write_pair(
                        writer,
                        &self.key,
                        &self.value,
                        key,
                        value,
                        PairRepresentation::Array,
                    )?;
                }
                Ok(writer.write_end_array()?)
            }
        }
    }

    fn deserialize(&self, reader: &mut dyn RawReader) -> Result<Self::Value> {
        let mut map = BTreeMap::new();
        match self.representation {
            MapRepresentation::Document => {
                reader.read_start_document()?;
                while reader.peek_type()?.is_some() {
                    let name = reader.read_name()?;
                    let value = self.value.deserialize(reader)?;
                    map.insert(name_as_key(name)?, value);
                }
                reader.read_end_document()?;
            }
            MapRepresentation::ArrayOfDocuments => {
                reader.read_start_array()?;
                while reader.peek_type()?.is_some() {
                    let (key, value) =
                        read_pair(reader, &self.key, &self.value, PairRepresentation::Document)?;
                    map.insert(key, value);
                }
                reader.read_end_array()?;
            }
            MapRepresentation::ArrayOfArrays => {
                reader.read_start_array()?;
                while reader.peek_type()?.is_some() {
                    let (key, value) =
                        read_pair(reader, &self.key, &self.value, PairRepresentation::Array)?;
                    map.insert(key, value);
                }
                reader.read_end_array()?;
            }
        }
        Ok(map)
    }
}

crate::constant_hash!(BTreeMapSerializer<KS, VS>);

/// Serializer for an insertion-ordered string-keyed map, modeled as a
/// `Vec<(String, V)>` and stored as an embedded document.
///
/// Entries are written in their stored order and read back in wire order,
/// so this is the typed counterpart of [`Document`](crate::bson::Document).
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentMapSerializer<VS> {
    value: VS,
}

impl<VS> DocumentMapSerializer<VS> {
    pub fn new(value: VS) -> Self {
        Self { value }
    }
}

impl<VS: Serializer> Serializer for DocumentMapSerializer<VS> {
    type Value = Vec<(String, VS::Value)>;

    fn serialize(&self, writer: &mut dyn RawWriter, value: &Self::Value) -> Result<()> {
        writer.write_start_document()?;
        for (key, value) in value {
            writer.write_name(key)?;
            self.value.serialize(writer, value)?;
        }
        Ok(writer.write_end_document()?)
    }

    fn deserialize(&self, reader: &mut dyn RawReader) -> Result<Self::Value> {
        reader.read_start_document()?;
        let mut entries = Vec::new();
        while reader.peek_type()?.is_some() {
            let name = reader.read_name()?;
            entries.push((name, self.value.deserialize(reader)?));
        }
        reader.read_end_document()?;
        Ok(entries)
    }
}

crate::constant_hash!(DocumentMapSerializer<VS>);

/// Serializer for string-keyed `HashMap`, stored as an embedded document.
#[derive(Debug, Clone, PartialEq)]
pub struct HashMapSerializer<VS> {
    value: VS,
}

impl<VS> HashMapSerializer<VS> {
    pub fn new(value: VS) -> Self {
        Self { value }
    }
}

impl<VS: Serializer> Serializer for HashMapSerializer<VS> {
    type Value = HashMap<String, VS::Value>;

    fn serialize(&self, writer: &mut dyn RawWriter, value: &Self::Value) -> Result<()> {
        writer.write_start_document()?;
        for (key, value) in value {
            writer.write_name(key)?;
            self.value.serialize(writer, value)?;
        }
        Ok(writer.write_end_document()?)
    }

    fn deserialize(&self, reader: &mut dyn RawReader) -> Result<Self::Value> {
        reader.read_start_document()?;
        let mut map = HashMap::new();
        while reader.peek_type()?.is_some() {
            let name = reader.read_name()?;
            map.insert(name, self.value.deserialize(reader)?);
        }
        reader.read_end_document()?;
        Ok(map)
    }
}

crate::constant_hash!(HashMapSerializer<VS>);
