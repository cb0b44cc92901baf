/*
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Adapter serializers.

use core::any::Any;
use std::sync::Arc;

use crate::raw::{RawReader, RawWriter};
use crate::ser::{ArcSerializer, DynSerializer, Error, Result, Serializer};

/// Adapts a serializer for a concrete type into one for boxed `dyn Any`
/// values.
///
/// Serialization downcasts the box and fails with [`Error::Downcast`] when
/// the runtime type does not match; deserialization re-boxes the typed
/// result. This is the bridge used when values only carry their type at
/// runtime.
#[derive(Debug, Clone, PartialEq)]
pub struct DowncastingSerializer<S> {
    inner: S,
}

impl<S> DowncastingSerializer<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<D: 'static> DowncastingSerializer<ArcSerializer<D>> {
    /// Adapts a registry-obtained erased serializer, checking that it is
    /// bound to `D`.
    pub fn from_dyn(inner: Arc<dyn DynSerializer>) -> Result<Self> {
        Ok(Self::new(ArcSerializer::new(inner)?))
    }
}

impl<S> Serializer for DowncastingSerializer<S>
where
    S: Serializer,
    S::Value: Send + Sync,
{
    type Value = Box<dyn Any + Send + Sync>;

    fn serialize(&self, writer: &mut dyn RawWriter, value: &Self::Value) -> Result<()> {
        let value = value.downcast_ref::<S::Value>().ok_or(Error::Downcast {
            expected: core::any::type_name::<S::Value>(),
        })?;
        self.inner.serialize(writer, value)
    }

    fn deserialize(&self, reader: &mut dyn RawReader) -> Result<Self::Value> {
        Ok(Box::new(self.inner.deserialize(reader)?))
    }
}

crate::constant_hash!(DowncastingSerializer<S>);

/// A read-only adapter that maps deserialized values through a projection.
///
/// Serialization is deliberately unsupported: the projection is one-way, so
/// there is no value of the inner type to write. Equality compares the inner
/// serializer and the projection function by address.
#[derive(Debug)]
pub struct ProjectingDeserializer<S: Serializer, T> {
    inner: S,
    project: fn(S::Value) -> T,
}

impl<S: Serializer, T> ProjectingDeserializer<S, T> {
    pub fn new(inner: S, project: fn(S::Value) -> T) -> Self {
        Self { inner, project }
    }
}

impl<S: Serializer + Clone, T> Clone for ProjectingDeserializer<S, T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            project: self.project,
        }
    }
}

impl<S: Serializer, T: 'static> Serializer for ProjectingDeserializer<S, T> {
    type Value = T;

    fn serialize(&self, _writer: &mut dyn RawWriter, _value: &Self::Value) -> Result<()> {
        Err(Error::Unsupported("ProjectingDeserializer"))
    }

    fn deserialize(&self, reader: &mut dyn RawReader) -> Result<Self::Value> {
        Ok((self.project)(self.inner.deserialize(reader)?))
    }
}

impl<S: Serializer + PartialEq, T> PartialEq for ProjectingDeserializer<S, T> {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner && self.project as usize == other.project as usize
    }
}

impl<S: Serializer, T> core::hash::Hash for ProjectingDeserializer<S, T> {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        state.write_u8(0);
    }
}
