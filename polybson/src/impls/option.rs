/*
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! The nullable wrapper.

use crate::bson::ElementType;
use crate::raw::{RawReader, RawWriter};
use crate::ser::{Result, Serializer};

/// Wraps a child serializer for `T` into one for `Option<T>`.
///
/// `None` is written as the BSON null; a null token on the wire reads back
/// as `None`. Everything else is delegated to the child.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionSerializer<S> {
    inner: S,
}

impl<S> OptionSerializer<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S: Serializer> Serializer for OptionSerializer<S> {
    type Value = Option<S::Value>;

    fn serialize(&self, writer: &mut dyn RawWriter, value: &Self::Value) -> Result<()> {
        match value {
            None => Ok(writer.write_null()?),
            Some(value) => self.inner.serialize(writer, value),
        }
    }

    fn deserialize(&self, reader: &mut dyn RawReader) -> Result<Self::Value> {
        if reader.peek_type()? == Some(ElementType::Null) {
            reader.read_null()?;
            return Ok(None);
        }
        Ok(Some(self.inner.deserialize(reader)?))
    }
}

crate::constant_hash!(OptionSerializer<S>);
