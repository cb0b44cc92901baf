/*
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Serialization of document-backed classes.
//!
//! A document-backed class keeps its state in an insertion-ordered backing
//! [`Document`] instead of in fields, so round-tripping preserves elements
//! the class was never taught about. The serializer carries a member table
//! mapping wire element names to backing entries; elements with no member
//! pass through the backing verbatim in both directions.

use core::any::{Any, TypeId};
use core::marker::PhantomData;
use std::sync::Arc;

use crate::bson::{Bson, Document};
use crate::raw::{read_bson, write_bson, RawReader, RawWriter};
use crate::ser::{DynSerializer, Error, Result, Serializer};

/// A type whose state lives in a backing [`Document`].
pub trait DocumentBacked: 'static + Sized {
    /// The current backing document.
    fn backing(&self) -> &Document;

    /// Reconstructs a value from a backing document.
    fn from_backing(backing: Document) -> Result<Self>;
}

struct BackedMember {
    /// Element name on the wire.
    name: String,
    /// Entry name in the backing document.
    key: String,
    /// Bound to [`Bson`]; checked at member registration.
    serializer: Arc<dyn DynSerializer>,
}

impl PartialEq for BackedMember {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.key == other.key
            && self.serializer.dyn_eq(&*other.serializer)
    }
}

/// Serializer for [`DocumentBacked`] classes.
pub struct BackedClassSerializer<T> {
    members: Vec<BackedMember>,
    _value: PhantomData<fn() -> T>,
}

impl<T: DocumentBacked> Default for BackedClassSerializer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: DocumentBacked> BackedClassSerializer<T> {
    /// A serializer with an empty member table: every element passes through
    /// the backing verbatim.
    pub fn new() -> Self {
        Self {
            members: Vec::new(),
            _value: PhantomData,
        }
    }

    /// Adds a member mapping the wire element `name` to the backing entry
    /// `key`, serialized through `serializer`.
    ///
    /// The serializer must be bound to [`Bson`], since backing entries are
    /// dynamically typed.
    pub fn member(
        mut self,
        name: impl Into<String>,
        key: impl Into<String>,
        serializer: Arc<dyn DynSerializer>,
    ) -> Result<Self> {
        if serializer.value_type() != TypeId::of::<Bson>() {
            return Err(Error::InvalidArgument(format!(
                "backed members require a serializer bound to Bson, got one for {}",
                serializer.value_type_name(),
            )));
        }
        self.members.push(BackedMember {
            name: name.into(),
            key: key.into(),
            serializer,
        });
        Ok(self)
    }

    fn member_for_name(&self, name: &str) -> Option<&BackedMember> {
        self.members.iter().find(|member| member.name == name)
    }

    fn member_for_key(&self, key: &str) -> Option<&BackedMember> {
        self.members.iter().find(|member| member.key == key)
    }
}

impl<T: DocumentBacked> Serializer for BackedClassSerializer<T> {
    type Value = T;

    fn serialize(&self, writer: &mut dyn RawWriter, value: &T) -> Result<()> {
        let backing = value.backing();
        writer.write_start_document()?;
        for (key, value) in backing.iter() {
            match self.member_for_key(key) {
                Some(member) => {
                    writer.write_name(&member.name)?;
                    member.serializer.serialize_any(writer, value as &dyn Any)?;
                }
                None => {
                    writer.write_name(key)?;
                    write_bson(writer, value)?;
                }
            }
        }
        Ok(writer.write_end_document()?)
    }

    fn deserialize(&self, reader: &mut dyn RawReader) -> Result<T> {
        reader.read_start_document()?;
        let mut backing = Document::new();
        while reader.peek_type()?.is_some() {
            let name = reader.read_name()?;
            match self.member_for_name(&name) {
                Some(member) => {
                    let boxed = member.serializer.deserialize_any(reader)?;
                    let value = match boxed.downcast::<Bson>() {
                        Ok(value) => *value,
                        Err(_) => return Err(Error::Downcast { expected: "Bson" }),
                    };
                    backing.insert(member.key.clone(), value);
                }
                None => {
                    backing.insert(name, read_bson(reader)?);
                }
            }
        }
        reader.read_end_document()?;
        T::from_backing(backing)
    }
}

impl<T> PartialEq for BackedClassSerializer<T> {
    fn eq(&self, other: &Self) -> bool {
        self.members == other.members
    }
}

crate::constant_hash!(BackedClassSerializer<T>);
