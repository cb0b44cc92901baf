/*
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Serialization traits and types.
//!
//! [`Serializer`] is the typed core trait: a serializer is bound to exactly
//! one value type and is immutable once constructed. [`DynSerializer`] is its
//! type-erased counterpart, which is what the
//! [registry](crate::registry::SerializerRegistry) stores and hands out;
//! every `Serializer` that is comparable and thread-safe gets a
//! `DynSerializer` implementation for free. [`ArcSerializer`] closes the
//! loop by giving a registry-obtained erased serializer back its typed
//! surface, so composite serializers can be built from either explicitly
//! injected children or registry lookups.

use crate::raw::{RawReader, RawWriter};
use core::any::{Any, TypeId};
use std::sync::Arc;

pub type Result<T> = core::result::Result<T, Error>;

/// Errors raised by serializers, the registry and the discriminator
/// conventions.
///
/// All failures surface synchronously to the immediate caller; nothing is
/// swallowed or retried. This is a correctness-critical codec, not a
/// best-effort system.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Raw(#[from] crate::raw::Error),
    #[error("no serializer registered or constructible for type {0}")]
    SerializerNotFound(&'static str),
    #[error("a different serializer for type {0} was already resolved by a lookup; late registration rejected")]
    AlreadyRegistered(&'static str),
    #[error("unknown discriminator value '{0}'")]
    UnknownDiscriminator(String),
    #[error("discriminator '{0}' matches {1} registered implementors, exactly one required")]
    AmbiguousDiscriminator(String, usize),
    #[error("unsupported tuple arity {0}, supported arities are 1 through 8")]
    InvalidArity(usize),
    #[error("value {value} cannot be represented as {representation}")]
    NumericOverflow {
        value: f64,
        representation: &'static str,
    },
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("{0} does not support serialization")]
    Unsupported(&'static str),
    #[error("required element '{0}' is missing from the document")]
    MissingField(String),
    #[error("value is not of the expected type {expected}")]
    Downcast { expected: &'static str },
}

/// An entity bound to exactly one value type, able to write a value of that
/// type to a [`RawWriter`] and to reconstruct one from a [`RawReader`].
///
/// Implementations must be immutable once constructed: all the behavior of a
/// serializer is determined by its configuration fields, which is also what
/// its equality compares.
pub trait Serializer {
    type Value: 'static;

    fn serialize(&self, writer: &mut dyn RawWriter, value: &Self::Value) -> Result<()>;

    fn deserialize(&self, reader: &mut dyn RawReader) -> Result<Self::Value>;
}

/// The type-erased surface of a [`Serializer`], as stored by the registry.
///
/// `dyn_eq` implements the engine-wide equality contract: two serializers
/// are equal iff they are of the same concrete serializer type and all their
/// configuration fields compare equal. A serializer never equals one of a
/// different concrete type, even if the configurations look alike.
pub trait DynSerializer: Send + Sync + 'static {
    /// The `TypeId` of the value type this serializer is bound to.
    fn value_type(&self) -> TypeId;

    fn value_type_name(&self) -> &'static str;

    fn serialize_any(&self, writer: &mut dyn RawWriter, value: &dyn Any) -> Result<()>;

    fn deserialize_any(&self, reader: &mut dyn RawReader) -> Result<Box<dyn Any + Send + Sync>>;

    fn dyn_eq(&self, other: &dyn DynSerializer) -> bool;

    fn as_any(&self) -> &dyn Any;
}

impl<S> DynSerializer for S
where
    S: Serializer + PartialEq + Send + Sync + 'static,
    S::Value: Send + Sync,
{
    fn value_type(&self) -> TypeId {
        TypeId::of::<S::Value>()
    }

    fn value_type_name(&self) -> &'static str {
        core::any::type_name::<S::Value>()
    }

    fn serialize_any(&self, writer: &mut dyn RawWriter, value: &dyn Any) -> Result<()> {
        let value = value.downcast_ref::<S::Value>().ok_or(Error::Downcast {
            expected: core::any::type_name::<S::Value>(),
        })?;
        self.serialize(writer, value)
    }

    fn deserialize_any(&self, reader: &mut dyn RawReader) -> Result<Box<dyn Any + Send + Sync>> {
        Ok(Box::new(self.deserialize(reader)?))
    }

    fn dyn_eq(&self, other: &dyn DynSerializer) -> bool {
        other
            .as_any()
            .downcast_ref::<S>()
            .is_some_and(|other| self == other)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Implements [`core::hash::Hash`] as a constant for a serializer type.
///
/// Serializer equality is purely field-based and instances are either
/// process-wide singletons or short-lived configuration values, so they all
/// hash alike: they are unsuitable as high-volume hash-table keys but fine
/// as cache-correctness check values. Deriving a real hash here would
/// silently change the equality contract; don't.
#[macro_export]
macro_rules! constant_hash {
    ($name:ident $(<$($gen:ident),+>)?) => {
        impl $(<$($gen),+>)? ::core::hash::Hash for $name $(<$($gen),+>)? {
            fn hash<H: ::core::hash::Hasher>(&self, state: &mut H) {
                state.write_u8(0);
            }
        }
    };
}

/// A typed view over a shared, type-erased serializer.
///
/// This is how a composite serializer embeds a child obtained from the
/// registry: the registry hands out `Arc<dyn DynSerializer>`, and the
/// composite wraps it back into the typed [`Serializer`] surface.
pub struct ArcSerializer<T> {
    inner: Arc<dyn DynSerializer>,
    _value: core::marker::PhantomData<fn() -> T>,
}

impl<T: 'static> ArcSerializer<T> {
    /// Wraps an erased serializer, checking that it is actually bound to
    /// `T`.
    pub fn new(inner: Arc<dyn DynSerializer>) -> Result<Self> {
        if inner.value_type() != TypeId::of::<T>() {
            return Err(Error::InvalidArgument(format!(
                "serializer for {} cannot be used for values of type {}",
                inner.value_type_name(),
                core::any::type_name::<T>(),
            )));
        }
        Ok(Self {
            inner,
            _value: core::marker::PhantomData,
        })
    }
}

impl<T> core::fmt::Debug for ArcSerializer<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ArcSerializer")
            .field("value_type", &self.inner.value_type_name())
            .finish()
    }
}

impl<T: 'static> Clone for ArcSerializer<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            _value: core::marker::PhantomData,
        }
    }
}

impl<T: 'static> Serializer for ArcSerializer<T> {
    type Value = T;

    fn serialize(&self, writer: &mut dyn RawWriter, value: &Self::Value) -> Result<()> {
        self.inner.serialize_any(writer, value as &dyn Any)
    }

    fn deserialize(&self, reader: &mut dyn RawReader) -> Result<Self::Value> {
        let boxed = self.inner.deserialize_any(reader)?;
        match boxed.downcast::<T>() {
            Ok(value) => Ok(*value),
            Err(_) => Err(Error::Downcast {
                expected: core::any::type_name::<T>(),
            }),
        }
    }
}

impl<T: 'static> PartialEq for ArcSerializer<T> {
    fn eq(&self, other: &Self) -> bool {
        self.inner.dyn_eq(&*other.inner)
    }
}

crate::constant_hash!(ArcSerializer<T>);
