/*
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

#![doc = include_str!("../README.md")]
#![deny(unconditional_recursion)]

pub mod bson;
pub mod hierarchy;
pub mod impls;
pub mod raw;
pub mod registry;
pub mod ser;

/// The most common imports: the value model, the core traits, the registry
/// entry points, and the built-in serializers.
pub mod prelude {
    pub use crate::bson::{
        Binary, BinarySubtype, Bson, DateTime, Decimal128, Document, ElementType, ObjectId,
    };
    pub use crate::doc;
    pub use crate::hierarchy::{
        ClassMap, DiscriminatorConvention, HierarchyRegistry, HierarchySerializer,
        HierarchyVariant, InterfaceDiscriminatorConvention, StandardDiscriminatorConvention,
    };
    pub use crate::impls::*;
    pub use crate::raw::{RawReader, RawWriter, SliceReader, VecWriter};
    pub use crate::registry::{global, BsonSerializable, SerializerRegistry};
    pub use crate::ser::{ArcSerializer, DynSerializer, Serializer};
}
