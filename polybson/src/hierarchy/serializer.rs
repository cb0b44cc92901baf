/*
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! The hierarchy serializer.

use core::any::TypeId;
use std::sync::Arc;

use super::{ClassMap, DiscriminatorConvention};
use crate::raw::{write_bson, RawReader, RawWriter};
use crate::ser::{Error, Result, Serializer};

struct Member<R> {
    name: String,
    write: fn(&R, &mut dyn RawWriter) -> Result<()>,
}

impl<R> PartialEq for Member<R> {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.write as usize == other.write as usize
    }
}

/// One concrete class handled by a [`HierarchySerializer`]: its class map,
/// a predicate recognizing values of the class, the members to write, and a
/// function reconstructing a value from a document.
pub struct HierarchyVariant<R> {
    class: Arc<ClassMap>,
    matches: fn(&R) -> bool,
    read: fn(&mut dyn RawReader, &str) -> Result<R>,
    members: Vec<Member<R>>,
}

impl<R> HierarchyVariant<R> {
    /// A variant for `class`. `matches` recognizes values of the class;
    /// `read` is handed the reader positioned on the document and the
    /// discriminator element name, and typically delegates to
    /// [`read_members`].
    pub fn new(
        class: Arc<ClassMap>,
        matches: fn(&R) -> bool,
        read: fn(&mut dyn RawReader, &str) -> Result<R>,
    ) -> Self {
        Self {
            class,
            matches,
            read,
            members: Vec::new(),
        }
    }

    /// Appends a member; members are written in the order they are added.
    pub fn member(
        mut self,
        name: impl Into<String>,
        write: fn(&R, &mut dyn RawWriter) -> Result<()>,
    ) -> Self {
        self.members.push(Member {
            name: name.into(),
            write,
        });
        self
    }
}

impl<R> PartialEq for HierarchyVariant<R> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.class, &other.class)
            && self.matches as usize == other.matches as usize
            && self.read as usize == other.read as usize
            && self.members == other.members
    }
}

/// Serializer for a polymorphic slot of nominal type `R`.
///
/// On write, the first variant whose predicate matches the value is chosen;
/// the document then carries, in order, the id member (when the class has
/// one and id-first ordering is enabled), the discriminator element (unless
/// the convention elides it), and the remaining members as declared. On
/// read, the convention resolves the concrete type from the discriminator
/// and the matching variant reconstructs the value.
pub struct HierarchySerializer<R> {
    nominal: TypeId,
    convention: Arc<dyn DiscriminatorConvention>,
    id_first: bool,
    variants: Vec<HierarchyVariant<R>>,
}

impl<R: 'static> HierarchySerializer<R> {
    /// A serializer for the nominal type identified by `nominal`, which is
    /// the `TypeId` of the hierarchy root class or of the interface the slot
    /// is declared as.
    pub fn new(nominal: TypeId, convention: Arc<dyn DiscriminatorConvention>) -> Self {
        Self {
            nominal,
            convention,
            id_first: false,
            variants: Vec::new(),
        }
    }

    /// Whether the id member is written before the discriminator.
    pub fn serialize_id_first(mut self, id_first: bool) -> Self {
        self.id_first = id_first;
        self
    }

    pub fn variant(mut self, variant: HierarchyVariant<R>) -> Self {
        self.variants.push(variant);
        self
    }
}

impl<R: 'static> Serializer for HierarchySerializer<R> {
    type Value = R;

    fn serialize(&self, writer: &mut dyn RawWriter, value: &R) -> Result<()> {
        let variant = self
            .variants
            .iter()
            .find(|variant| (variant.matches)(value))
            .ok_or(Error::SerializerNotFound(core::any::type_name::<R>()))?;
        let discriminator = self
            .convention
            .discriminator(self.nominal, variant.class.type_id())?;
        writer.write_start_document()?;
        let id_member = if self.id_first {
            variant.class.id_member()
        } else {
            None
        };
        if let Some(id) = id_member {
            if let Some(member) = variant.members.iter().find(|member| member.name == id) {
                writer.write_name(&member.name)?;
                (member.write)(value, writer)?;
            }
        }
        if let Some(discriminator) = &discriminator {
            writer.write_name(self.convention.element_name())?;
            write_bson(writer, discriminator)?;
        }
        for member in &variant.members {
            if id_member == Some(member.name.as_str()) {
                continue;
            }
            writer.write_name(&member.name)?;
            (member.write)(value, writer)?;
        }
        Ok(writer.write_end_document()?)
    }

    fn deserialize(&self, reader: &mut dyn RawReader) -> Result<R> {
        let actual = self.convention.actual_type(reader, self.nominal)?;
        let variant = self
            .variants
            .iter()
            .find(|variant| variant.class.type_id() == actual)
            .ok_or_else(|| {
                Error::InvalidArgument(format!(
                    "resolved concrete type has no variant in the hierarchy serializer for {}",
                    core::any::type_name::<R>(),
                ))
            })?;
        (variant.read)(reader, self.convention.element_name())
    }
}

impl<R> PartialEq for HierarchySerializer<R> {
    fn eq(&self, other: &Self) -> bool {
        self.nominal == other.nominal
            && self.id_first == other.id_first
            && Arc::ptr_eq(&self.convention, &other.convention)
            && self.variants == other.variants
    }
}

crate::constant_hash!(HierarchySerializer<R>);

/// Drives a member-by-member read of the document at the current position.
///
/// The discriminator element is skipped; every other element is offered to
/// `on_member`, which returns whether it consumed the value. Unconsumed
/// values are skipped, so unknown elements are tolerated.
pub fn read_members<F>(
    reader: &mut dyn RawReader,
    discriminator_element: &str,
    mut on_member: F,
) -> Result<()>
where
    F: FnMut(&str, &mut dyn RawReader) -> Result<bool>,
{
    reader.read_start_document()?;
    while reader.peek_type()?.is_some() {
        let name = reader.read_name()?;
        if name == discriminator_element {
            reader.skip_value()?;
            continue;
        }
        if !on_member(&name, reader)? {
            reader.skip_value()?;
        }
    }
    reader.read_end_document()?;
    Ok(())
}
