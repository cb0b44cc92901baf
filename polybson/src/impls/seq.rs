/*
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! The collection wrapper.

use crate::raw::{RawReader, RawWriter};
use crate::ser::{Result, Serializer};

/// Wraps a child serializer for `T` into one for `Vec<T>`, stored as a BSON
/// array.
#[derive(Debug, Clone, PartialEq)]
pub struct VecSerializer<S> {
    inner: S,
}

impl<S> VecSerializer<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S: Serializer> Serializer for VecSerializer<S> {
    type Value = Vec<S::Value>;

    fn serialize(&self, writer: &mut dyn RawWriter, value: &Self::Value) -> Result<()> {
        writer.write_start_array()?;
        for item in value {
            self.inner.serialize(writer, item)?;
        }
        Ok(writer.write_end_array()?)
    }

    fn deserialize(&self, reader: &mut dyn RawReader) -> Result<Self::Value> {
        reader.read_start_array()?;
        let mut items = Vec::new();
        while reader.peek_type()?.is_some() {
            items.push(self.inner.deserialize(reader)?);
        }
        reader.read_end_array()?;
        Ok(items)
    }
}

crate::constant_hash!(VecSerializer<S>);
