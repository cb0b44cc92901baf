/*
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Class maps and the hierarchy registry.

use core::any::TypeId;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use crate::ser::{Error, Result};

/// The serialization metadata of one class in a hierarchy.
///
/// A class map records the discriminator name the class travels under, its
/// discriminator chain (the names from the hierarchy root down to the class
/// itself), and the optional member that plays the document-id role.
pub struct ClassMap {
    name: String,
    type_id: TypeId,
    type_name: &'static str,
    is_root: bool,
    chain: Vec<String>,
    id_member: Option<String>,
}

impl ClassMap {
    /// Starts a builder for the class `T` under the discriminator `name`.
    pub fn builder<T: ?Sized + 'static>(name: impl Into<String>) -> ClassMapBuilder {
        ClassMapBuilder {
            name: name.into(),
            type_id: TypeId::of::<T>(),
            type_name: core::any::type_name::<T>(),
            parent: None,
            id_member: None,
            interfaces: Vec::new(),
        }
    }

    /// The discriminator name of this class.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Whether this class is the root of its hierarchy.
    pub fn is_root(&self) -> bool {
        self.is_root
    }

    /// The discriminator names from the hierarchy root down to this class.
    pub fn chain(&self) -> &[String] {
        &self.chain
    }

    /// The element name of the member playing the document-id role, if any.
    pub fn id_member(&self) -> Option<&str> {
        self.id_member.as_deref()
    }
}

impl core::fmt::Debug for ClassMap {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ClassMap")
            .field("name", &self.name)
            .field("type_name", &self.type_name)
            .field("chain", &self.chain)
            .finish_non_exhaustive()
    }
}

/// An unregistered [`ClassMap`]: the parent link is still a name, resolved
/// when the builder is handed to [`HierarchyRegistry::register`].
pub struct ClassMapBuilder {
    name: String,
    type_id: TypeId,
    type_name: &'static str,
    parent: Option<String>,
    id_member: Option<String>,
    interfaces: Vec<TypeId>,
}

impl ClassMapBuilder {
    /// Declares the parent class by its discriminator name. The parent must
    /// already be registered when this builder is. A class without a parent
    /// is a hierarchy root.
    pub fn parent(mut self, name: impl Into<String>) -> Self {
        self.parent = Some(name.into());
        self
    }

    /// Declares the element name of the member playing the document-id role.
    pub fn id_member(mut self, name: impl Into<String>) -> Self {
        self.id_member = Some(name.into());
        self
    }

    /// Declares that the class implements the interface `I`, making it a
    /// candidate for [`InterfaceDiscriminatorConvention`] resolution against
    /// `I`.
    ///
    /// [`InterfaceDiscriminatorConvention`]: super::InterfaceDiscriminatorConvention
    pub fn implements<I: ?Sized + 'static>(mut self) -> Self {
        self.interfaces.push(TypeId::of::<I>());
        self
    }
}

#[derive(Default)]
struct Inner {
    by_type: HashMap<TypeId, Arc<ClassMap>>,
    by_name: HashMap<String, Vec<TypeId>>,
    implementors: HashMap<TypeId, Vec<TypeId>>,
}

/// The set of registered class maps of a process (or a test).
///
/// Names are not required to be unique across unrelated hierarchies; it is
/// the conventions' job to reject a genuinely ambiguous resolution.
#[derive(Default)]
pub struct HierarchyRegistry {
    inner: RwLock<Inner>,
}

impl HierarchyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves the builder's parent link and registers the finished class
    /// map.
    ///
    /// Fails with [`Error::AlreadyRegistered`] when the class type already
    /// has a map, and with [`Error::UnknownDiscriminator`] when the declared
    /// parent has not been registered.
    pub fn register(&self, builder: ClassMapBuilder) -> Result<Arc<ClassMap>> {
        let mut inner = self.inner.write();
        if inner.by_type.contains_key(&builder.type_id) {
            return Err(Error::AlreadyRegistered(builder.type_name));
        }
        let mut chain = match &builder.parent {
            None => Vec::new(),
            Some(parent) => {
                let candidates = inner.by_name.get(parent).map(Vec::as_slice).unwrap_or(&[]);
                match candidates {
                    [] => return Err(Error::UnknownDiscriminator(parent.clone())),
                    [type_id] => {
                        // by_name only holds ids present in by_type
                        inner.by_type[type_id].chain.to_vec()
                    }
                    _ => {
                        return Err(Error::AmbiguousDiscriminator(
                            parent.clone(),
                            candidates.len(),
                        ))
                    }
                }
            }
        };
        chain.push(builder.name.clone());
        let map = Arc::new(ClassMap {
            name: builder.name,
            type_id: builder.type_id,
            type_name: builder.type_name,
            is_root: builder.parent.is_none(),
            chain,
            id_member: builder.id_member,
        });
        inner
            .by_name
            .entry(map.name.clone())
            .or_default()
            .push(map.type_id);
        for interface in builder.interfaces {
            inner
                .implementors
                .entry(interface)
                .or_default()
                .push(map.type_id);
        }
        inner.by_type.insert(map.type_id, map.clone());
        log::trace!("registered class map for {}", map.type_name);
        Ok(map)
    }

    /// The class map of a type, if registered.
    pub fn class_for_type(&self, type_id: TypeId) -> Option<Arc<ClassMap>> {
        self.inner.read().by_type.get(&type_id).cloned()
    }

    /// All registered classes traveling under a discriminator name.
    pub fn classes_for_name(&self, name: &str) -> Vec<Arc<ClassMap>> {
        let inner = self.inner.read();
        inner
            .by_name
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
            .iter()
            .filter_map(|type_id| inner.by_type.get(type_id).cloned())
            .collect()
    }

    /// All registered classes declared to implement the interface.
    pub fn implementors(&self, interface: TypeId) -> Vec<Arc<ClassMap>> {
        let inner = self.inner.read();
        inner
            .implementors
            .get(&interface)
            .map(Vec::as_slice)
            .unwrap_or(&[])
            .iter()
            .filter_map(|type_id| inner.by_type.get(type_id).cloned())
            .collect()
    }
}
