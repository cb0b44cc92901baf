/*
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Polymorphic serialization.
//!
//! A class hierarchy is described by [`ClassMap`]s collected in a
//! [`HierarchyRegistry`]; a [`DiscriminatorConvention`] decides how the
//! concrete type of a value travels inside its document (by default as the
//! `_t` element); and [`HierarchySerializer`] ties the two together into a
//! [`Serializer`](crate::ser::Serializer) for the base type that dispatches
//! on the concrete one.

mod class_map;
mod convention;
mod serializer;

pub use class_map::{ClassMap, ClassMapBuilder, HierarchyRegistry};
pub use convention::{
    default_convention, peek_discriminator, DiscriminatorConvention, DiscriminatorFormat,
    InterfaceDiscriminatorConvention, StandardDiscriminatorConvention,
    DEFAULT_DISCRIMINATOR_ELEMENT,
};
pub use serializer::{read_members, HierarchySerializer, HierarchyVariant};
