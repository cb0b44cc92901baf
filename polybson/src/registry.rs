/*
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! The process-wide serializer registry.
//!
//! The registry maps a value type to a shared serializer instance. Built-in
//! serializers are available out of the box; applications extend the mapping
//! with [`SerializerRegistry::register`] and generic container types
//! ([`Option`], [`Vec`], tuples, maps) are constructed structurally on first
//! lookup by recursively resolving their element types.
//!
//! The caching discipline is first-successful-lookup-wins: once a lookup has
//! resolved a type, every later lookup returns the same instance, and a
//! registration that would bind a *different* serializer to that type is
//! rejected with [`Error::AlreadyRegistered`]. Re-registration before first
//! use simply replaces the binding.

use crate::bson::{Bson, DateTime, Decimal128, Document, ObjectId};
use crate::impls::{
    BinaryDataSerializer, BooleanSerializer, BsonValueSerializer, DocumentSerializer,
    DoubleSerializer, Int32Serializer, Int64Serializer, ObjectIdSerializer, OptionSerializer,
    StringSerializer, TupleSerializer1, TupleSerializer2, TupleSerializer3, TupleSerializer4,
    TupleSerializer5, TupleSerializer6, TupleSerializer7, TupleSerializer8, VecSerializer,
    BTreeMapSerializer, DateTimeSerializer, Decimal128Serializer, HashMapSerializer,
    MapRepresentation,
};
use crate::ser::{ArcSerializer, DynSerializer, Error, Result};
use core::any::{type_name, TypeId};
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

struct Entry {
    serializer: Arc<dyn DynSerializer>,
    /// Set once a lookup has returned this serializer; from then on the
    /// binding is frozen.
    resolved: bool,
}

/// A mapping from value types to serializer instances.
///
/// Lookups for already-resolved types take only the read lock; registration
/// and first-time structural construction take the write lock. Construction
/// itself runs outside any lock, since it recurses into further lookups.
#[derive(Default)]
pub struct SerializerRegistry {
    entries: RwLock<HashMap<TypeId, Entry>>,
}

impl SerializerRegistry {
    /// An empty registry, with no built-ins.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry pre-populated with the built-in serializers for the
    /// primitive BSON-mapped types.
    pub fn with_builtins() -> Self {
        let registry = Self::new();
        registry.install_builtins();
        registry
    }

    fn install_builtins(&self) {
        // infallible: the registry is empty, so nothing is resolved yet
        let _ = self.register::<bool>(Arc::new(BooleanSerializer::new()));
        let _ = self.register::<i32>(Arc::new(Int32Serializer::new()));
        let _ = self.register::<i64>(Arc::new(Int64Serializer::new()));
        let _ = self.register::<f64>(Arc::new(DoubleSerializer::new()));
        let _ = self.register::<String>(Arc::new(StringSerializer::new()));
        let _ = self.register::<ObjectId>(Arc::new(ObjectIdSerializer::new()));
        let _ = self.register::<DateTime>(Arc::new(DateTimeSerializer::new()));
        let _ = self.register::<Decimal128>(Arc::new(Decimal128Serializer::new()));
        let _ = self.register::<crate::bson::Binary>(Arc::new(BinaryDataSerializer::new()));
        let _ = self.register::<Bson>(Arc::new(BsonValueSerializer::new()));
        let _ = self.register::<Document>(Arc::new(DocumentSerializer::new()));
    }

    /// Binds `T` to the given serializer.
    ///
    /// Fails with [`Error::AlreadyRegistered`] when a lookup has already
    /// resolved a different serializer for `T`; re-registering an equal
    /// serializer is a no-op, and re-registering before first use replaces
    /// the binding.
    pub fn register<T: 'static>(&self, serializer: Arc<dyn DynSerializer>) -> Result<()> {
        if serializer.value_type() != TypeId::of::<T>() {
            return Err(Error::InvalidArgument(format!(
                "serializer for {} registered under type {}",
                serializer.value_type_name(),
                type_name::<T>(),
            )));
        }
        let mut entries = self.entries.write();
        match entries.entry(TypeId::of::<T>()) {
            std::collections::hash_map::Entry::Occupied(mut occupied) => {
                if occupied.get().resolved {
                    if !occupied.get().serializer.dyn_eq(&*serializer) {
                        return Err(Error::AlreadyRegistered(type_name::<T>()));
                    }
                } else {
                    occupied.get_mut().serializer = serializer;
                }
            }
            std::collections::hash_map::Entry::Vacant(vacant) => {
                vacant.insert(Entry {
                    serializer,
                    resolved: false,
                });
            }
        }
        log::trace!("registered serializer for {}", type_name::<T>());
        Ok(())
    }

    /// Resolves the serializer for `T`, constructing and caching one
    /// structurally if the type is a known container shape.
    pub fn lookup<T: BsonSerializable>(&self) -> Result<Arc<dyn DynSerializer>> {
        let id = TypeId::of::<T>();
        {
            let entries = self.entries.read();
            if let Some(entry) = entries.get(&id) {
                if entry.resolved {
                    return Ok(entry.serializer.clone());
                }
            }
        }
        {
            let mut entries = self.entries.write();
            if let Some(entry) = entries.get_mut(&id) {
                entry.resolved = true;
                return Ok(entry.serializer.clone());
            }
        }
        // Construct outside the lock: construction recurses into lookups for
        // the element types.
        let constructed = T::construct(self)?;
        if constructed.value_type() != id {
            return Err(Error::InvalidArgument(format!(
                "structural construction for {} produced a serializer for {}",
                type_name::<T>(),
                constructed.value_type_name(),
            )));
        }
        log::trace!("constructed serializer for {}", type_name::<T>());
        let mut entries = self.entries.write();
        match entries.entry(id) {
            std::collections::hash_map::Entry::Occupied(mut occupied) => {
                // another thread won the race; its instance is the cached one
                occupied.get_mut().resolved = true;
                Ok(occupied.get().serializer.clone())
            }
            std::collections::hash_map::Entry::Vacant(vacant) => {
                let entry = vacant.insert(Entry {
                    serializer: constructed,
                    resolved: true,
                });
                Ok(entry.serializer.clone())
            }
        }
    }

    /// Non-throwing probe: whether a lookup for `T` would succeed.
    pub fn is_serializable<T: BsonSerializable>(&self) -> bool {
        self.lookup::<T>().is_ok()
    }
}

static GLOBAL: Lazy<SerializerRegistry> = Lazy::new(SerializerRegistry::with_builtins);

/// The process-wide registry, initialized with the built-in serializers on
/// first access and alive for the process lifetime.
pub fn global() -> &'static SerializerRegistry {
    &GLOBAL
}

/// Structural serializer construction.
///
/// A type is `BsonSerializable` when the registry knows how to build a
/// serializer for it: built-in types return their dedicated serializer, and
/// container types recursively look up their element types. User-defined
/// types that are only ever bound explicitly can implement this with the
/// [`lookup_only!`](crate::lookup_only) macro.
pub trait BsonSerializable: 'static + Sized {
    fn construct(registry: &SerializerRegistry) -> Result<Arc<dyn DynSerializer>>;
}

/// Implements [`BsonSerializable`] for types that must be explicitly
/// registered: structural construction fails with
/// [`SerializerNotFound`](crate::ser::Error::SerializerNotFound), so a
/// lookup succeeds only once [`SerializerRegistry::register`] has run.
#[macro_export]
macro_rules! lookup_only {
    ($($ty:ty),+ $(,)?) => {$(
        impl $crate::registry::BsonSerializable for $ty {
            fn construct(
                _: &$crate::registry::SerializerRegistry,
            ) -> $crate::ser::Result<::std::sync::Arc<dyn $crate::ser::DynSerializer>> {
                Err($crate::ser::Error::SerializerNotFound(
                    ::core::any::type_name::<$ty>(),
                ))
            }
        }
    )+};
}

macro_rules! impl_builtin {
    ($(($ty:ty, $serializer:expr),)+) => {$(
        impl BsonSerializable for $ty {
            fn construct(_: &SerializerRegistry) -> Result<Arc<dyn DynSerializer>> {
                Ok(Arc::new($serializer))
            }
        }
    )+};
}

impl_builtin!(
    (bool, BooleanSerializer::new()),
    (i32, Int32Serializer::new()),
    (i64, Int64Serializer::new()),
    (f64, DoubleSerializer::new()),
    (String, StringSerializer::new()),
    (ObjectId, ObjectIdSerializer::new()),
    (DateTime, DateTimeSerializer::new()),
    (Decimal128, Decimal128Serializer::new()),
    (crate::bson::Binary, BinaryDataSerializer::new()),
    (Bson, BsonValueSerializer::new()),
    (Document, DocumentSerializer::new()),
);

impl<T> BsonSerializable for Option<T>
where
    T: BsonSerializable + Send + Sync,
{
    fn construct(registry: &SerializerRegistry) -> Result<Arc<dyn DynSerializer>> {
        let child = ArcSerializer::<T>::new(registry.lookup::<T>()?)?;
        Ok(Arc::new(OptionSerializer::new(child)))
    }
}

impl<T> BsonSerializable for Vec<T>
where
    T: BsonSerializable + Send + Sync,
{
    fn construct(registry: &SerializerRegistry) -> Result<Arc<dyn DynSerializer>> {
        let child = ArcSerializer::<T>::new(registry.lookup::<T>()?)?;
        Ok(Arc::new(VecSerializer::new(child)))
    }
}

impl<V> BsonSerializable for HashMap<String, V>
where
    V: BsonSerializable + Send + Sync,
{
    fn construct(registry: &SerializerRegistry) -> Result<Arc<dyn DynSerializer>> {
        let value = ArcSerializer::<V>::new(registry.lookup::<V>()?)?;
        Ok(Arc::new(HashMapSerializer::new(value)))
    }
}

impl<V> BsonSerializable for BTreeMap<String, V>
where
    V: BsonSerializable + Send + Sync,
{
    fn construct(registry: &SerializerRegistry) -> Result<Arc<dyn DynSerializer>> {
        let key = ArcSerializer::<String>::new(registry.lookup::<String>()?)?;
        let value = ArcSerializer::<V>::new(registry.lookup::<V>()?)?;
        Ok(Arc::new(BTreeMapSerializer::new(
            key,
            value,
            MapRepresentation::Document,
        )?))
    }
}

macro_rules! impl_tuple_serializable {
    ($serializer:ident, $($t:ident),+) => {
        impl<$($t),+> BsonSerializable for ($($t,)+)
        where
            $($t: BsonSerializable + Send + Sync,)+
        {
            fn construct(registry: &SerializerRegistry) -> Result<Arc<dyn DynSerializer>> {
                Ok(Arc::new($serializer::new(
                    $(ArcSerializer::<$t>::new(registry.lookup::<$t>()?)?,)+
                )))
            }
        }
    };
}

impl_tuple_serializable!(TupleSerializer1, T1);
impl_tuple_serializable!(TupleSerializer2, T1, T2);
impl_tuple_serializable!(TupleSerializer3, T1, T2, T3);
impl_tuple_serializable!(TupleSerializer4, T1, T2, T3, T4);
impl_tuple_serializable!(TupleSerializer5, T1, T2, T3, T4, T5);
impl_tuple_serializable!(TupleSerializer6, T1, T2, T3, T4, T5, T6);
impl_tuple_serializable!(TupleSerializer7, T1, T2, T3, T4, T5, T6, T7);
impl_tuple_serializable!(TupleSerializer8, T1, T2, T3, T4, T5, T6, T7, T8);
