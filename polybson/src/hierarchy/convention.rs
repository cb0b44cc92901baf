/*
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Discriminator conventions.
//!
//! A convention owns two decisions: what discriminator (if any) to write for
//! a value of concrete type `actual` serialized through a slot of nominal
//! type `nominal`, and, on the way back, which concrete type a document on
//! the wire should deserialize into. The second decision must not consume
//! the document, so conventions peek through a reader bookmark.

use core::any::TypeId;
use std::sync::Arc;

use super::HierarchyRegistry;
use crate::bson::Bson;
use crate::raw::{read_bson, RawReader};
use crate::ser::{Error, Result};

/// The element name discriminators travel under unless configured otherwise.
pub const DEFAULT_DISCRIMINATOR_ELEMENT: &str = "_t";

/// How a [`StandardDiscriminatorConvention`] encodes the discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscriminatorFormat {
    /// A single string naming the concrete class.
    Scalar,
    /// An array of strings naming the path from the hierarchy root to the
    /// concrete class; the last element selects the type.
    Hierarchical,
}

/// Decides how concrete types travel inside serialized documents.
pub trait DiscriminatorConvention: Send + Sync {
    /// The element name the discriminator is written under.
    fn element_name(&self) -> &str;

    /// The discriminator value to write for a value of type `actual` in a
    /// slot of type `nominal`, or `None` to elide the element.
    fn discriminator(&self, nominal: TypeId, actual: TypeId) -> Result<Option<Bson>>;

    /// The concrete type the document at the current reader position should
    /// deserialize into. Must leave the reader where it found it.
    fn actual_type(&self, reader: &mut dyn RawReader, nominal: TypeId) -> Result<TypeId>;
}

/// Looks ahead for the named element inside the document at the current
/// position and returns its value, restoring the reader afterwards.
pub fn peek_discriminator(
    reader: &mut dyn RawReader,
    element_name: &str,
) -> Result<Option<Bson>> {
    let mark = reader.bookmark();
    let found = scan(reader, element_name);
    reader.seek(mark);
    found
}

fn scan(reader: &mut dyn RawReader, element_name: &str) -> Result<Option<Bson>> {
    reader.read_start_document()?;
    while reader.peek_type()?.is_some() {
        let name = reader.read_name()?;
        if name == element_name {
            return Ok(Some(read_bson(reader)?));
        }
        reader.skip_value()?;
    }
    Ok(None)
}

fn describe(value: &Bson) -> String {
    format!("{:?}", value.element_type())
}

/// The default convention: a scalar or hierarchical discriminator under a
/// configurable element name.
///
/// Writing elides the element exactly when the value's concrete type equals
/// the nominal type and that type is a registered hierarchy root. Reading
/// treats a missing or null discriminator as the nominal type, resolves a
/// string through the registry, and for an array takes the last element.
pub struct StandardDiscriminatorConvention {
    registry: Arc<HierarchyRegistry>,
    element_name: String,
    format: DiscriminatorFormat,
}

impl StandardDiscriminatorConvention {
    pub fn scalar(registry: Arc<HierarchyRegistry>) -> Self {
        Self::new(registry, DiscriminatorFormat::Scalar)
    }

    pub fn hierarchical(registry: Arc<HierarchyRegistry>) -> Self {
        Self::new(registry, DiscriminatorFormat::Hierarchical)
    }

    pub fn new(registry: Arc<HierarchyRegistry>, format: DiscriminatorFormat) -> Self {
        Self {
            registry,
            element_name: DEFAULT_DISCRIMINATOR_ELEMENT.to_string(),
            format,
        }
    }

    pub fn with_element_name(mut self, name: impl Into<String>) -> Self {
        self.element_name = name.into();
        self
    }

    pub fn format(&self) -> DiscriminatorFormat {
        self.format
    }

    fn resolve_name(&self, name: &str) -> Result<TypeId> {
        let candidates = self.registry.classes_for_name(name);
        match candidates.as_slice() {
            [] => Err(Error::UnknownDiscriminator(name.to_string())),
            [class] => Ok(class.type_id()),
            _ => Err(Error::AmbiguousDiscriminator(
                name.to_string(),
                candidates.len(),
            )),
        }
    }
}

impl DiscriminatorConvention for StandardDiscriminatorConvention {
    fn element_name(&self) -> &str {
        &self.element_name
    }

    fn discriminator(&self, nominal: TypeId, actual: TypeId) -> Result<Option<Bson>> {
        let class = self
            .registry
            .class_for_type(actual)
            .ok_or(Error::SerializerNotFound("unmapped concrete type"))?;
        if nominal == actual && class.is_root() {
            return Ok(None);
        }
        Ok(Some(match self.format {
            DiscriminatorFormat::Scalar => Bson::String(class.name().to_string()),
            DiscriminatorFormat::Hierarchical => Bson::Array(
                class
                    .chain()
                    .iter()
                    .map(|name| Bson::String(name.clone()))
                    .collect(),
            ),
        }))
    }

    fn actual_type(&self, reader: &mut dyn RawReader, nominal: TypeId) -> Result<TypeId> {
        match peek_discriminator(reader, &self.element_name)? {
            None | Some(Bson::Null) => Ok(nominal),
            Some(Bson::String(name)) => self.resolve_name(&name),
            Some(Bson::Array(chain)) => match chain.last() {
                Some(Bson::String(name)) => self.resolve_name(name),
                Some(other) => Err(Error::UnknownDiscriminator(describe(other))),
                None => Err(Error::UnknownDiscriminator("[]".to_string())),
            },
            Some(other) => Err(Error::UnknownDiscriminator(describe(&other))),
        }
    }
}

/// The convention a hierarchy falls back to when its root registers none:
/// hierarchical discriminators under [`DEFAULT_DISCRIMINATOR_ELEMENT`].
pub fn default_convention(registry: Arc<HierarchyRegistry>) -> Arc<dyn DiscriminatorConvention> {
    Arc::new(StandardDiscriminatorConvention::hierarchical(registry))
}

/// A convention for slots whose nominal type is an interface.
///
/// The discriminator is always written (an interface has no concrete root to
/// elide against), and resolution is restricted to the classes registered as
/// implementors of the nominal interface: exactly one must match the
/// discriminator, otherwise the read fails with
/// [`Error::AmbiguousDiscriminator`].
pub struct InterfaceDiscriminatorConvention {
    registry: Arc<HierarchyRegistry>,
    element_name: String,
}

impl InterfaceDiscriminatorConvention {
    pub fn new(registry: Arc<HierarchyRegistry>) -> Self {
        Self {
            registry,
            element_name: DEFAULT_DISCRIMINATOR_ELEMENT.to_string(),
        }
    }

    pub fn with_element_name(mut self, name: impl Into<String>) -> Self {
        self.element_name = name.into();
        self
    }
}

impl DiscriminatorConvention for InterfaceDiscriminatorConvention {
    fn element_name(&self) -> &str {
        &self.element_name
    }

    fn discriminator(&self, _nominal: TypeId, actual: TypeId) -> Result<Option<Bson>> {
        let class = self
            .registry
            .class_for_type(actual)
            .ok_or(Error::SerializerNotFound("unmapped concrete type"))?;
        Ok(Some(Bson::String(class.name().to_string())))
    }

    fn actual_type(&self, reader: &mut dyn RawReader, nominal: TypeId) -> Result<TypeId> {
        let name = match peek_discriminator(reader, &self.element_name)? {
            Some(Bson::String(name)) => name,
            Some(other) => return Err(Error::UnknownDiscriminator(describe(&other))),
            None => {
                return Err(Error::MissingField(self.element_name.clone()));
            }
        };
        let matching: Vec<_> = self
            .registry
            .implementors(nominal)
            .into_iter()
            .filter(|class| class.name() == name)
            .collect();
        match matching.as_slice() {
            [] => Err(Error::UnknownDiscriminator(name)),
            [class] => Ok(class.type_id()),
            _ => Err(Error::AmbiguousDiscriminator(name, matching.len())),
        }
    }
}
