/*
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Tuple serializers.
//!
//! A tuple is stored as an embedded document whose element names encode the
//! positions: `Item1` through `Item7` for the first seven, and `Rest` for the
//! eighth. Arities 1 through 8 are supported; nesting a further tuple under
//! `Rest` extends beyond that.
//!
//! Deserialization is order-insensitive and skips unrecognized element names,
//! but every position must be present or the read fails with
//! [`Error::MissingField`].

use crate::raw::{RawReader, RawWriter};
use crate::ser::{Error, Result, Serializer};

/// The largest tuple arity with a dedicated serializer.
pub const MAX_TUPLE_ARITY: usize = 8;

/// Maps an element name to the tuple position it encodes, if any.
///
/// `Item1` through `Item7` map to positions 1 through 7 and `Rest` to
/// position 8. `Item`, `Item0`, `Item8` and beyond are not positional names.
pub fn try_parse_item_name(name: &str) -> Option<usize> {
    if name == "Rest" {
        return Some(MAX_TUPLE_ARITY);
    }
    let digits = name.strip_prefix("Item")?;
    match digits.as_bytes() {
        [digit @ b'1'..=b'7'] => Some((digit - b'0') as usize),
        _ => None,
    }
}

/// Fails with [`Error::InvalidArity`] unless `arity` is in `1..=8`.
pub fn check_arity(arity: usize) -> Result<()> {
    if arity == 0 || arity > MAX_TUPLE_ARITY {
        return Err(Error::InvalidArity(arity));
    }
    Ok(())
}

macro_rules! impl_tuple_serializer {
    ($name:ident; $(($field:ident, $s:ident, $idx:tt, $elem:literal)),+) => {
        #[derive(Debug, Clone, PartialEq)]
        pub struct $name<$($s),+> {
            $($field: $s,)+
        }

        impl<$($s),+> $name<$($s),+> {
            #[allow(clippy::too_many_arguments)]
            pub fn new($($field: $s),+) -> Self {
                Self { $($field,)+ }
            }
        }

        impl<$($s: Serializer),+> Serializer for $name<$($s),+> {
            type Value = ($($s::Value,)+);

            fn serialize(&self, writer: &mut dyn RawWriter, value: &Self::Value) -> Result<()> {
                writer.write_start_document()?;
                $(
                    writer.write_name($elem)?;
                    self.$field.serialize(writer, &value.$idx)?;
                )+
                Ok(writer.write_end_document()?)
            }

            fn deserialize(&self, reader: &mut dyn RawReader) -> Result<Self::Value> {
                $(let mut $field: Option<$s::Value> = None;)+
                reader.read_start_document()?;
                while reader.peek_type()?.is_some() {
                    let name = reader.read_name()?;
                    match name.as_str() {
                        $($elem => $field = Some(self.$field.deserialize(reader)?),)+
                        _ => reader.skip_value()?,
                    }
                }
                reader.read_end_document()?;
                Ok((
                    $($field.ok_or_else(|| Error::MissingField($elem.to_string()))?,)+
                ))
            }
        }

        crate::constant_hash!($name<$($s),+>);
    };
}

impl_tuple_serializer!(TupleSerializer1; (item1, S1, 0, "Item1"));
impl_tuple_serializer!(TupleSerializer2; (item1, S1, 0, "Item1"), (item2, S2, 1, "Item2"));
impl_tuple_serializer!(
    TupleSerializer3;
    (item1, S1, 0, "Item1"),
    (item2, S2, 1, "Item2"),
    (item3, S3, 2, "Item3")
);
impl_tuple_serializer!(
    TupleSerializer4;
    (item1, S1, 0, "Item1"),
    (item2, S2, 1, "Item2"),
    (item3, S3, 2, "Item3"),
    (item4, S4, 3, "Item4")
);
impl_tuple_serializer!(
    TupleSerializer5;
    (item1, S1, 0, "Item1"),
    (item2, S2, 1, "Item2"),
    (item3, S3, 2, "Item3"),
    (item4, S4, 3, "Item4"),
    (item5, S5, 4, "Item5")
);
impl_tuple_serializer!(
    TupleSerializer6;
    (item1, S1, 0, "Item1"),
    (item2, S2, 1, "Item2"),
    (item3, S3, 2, "Item3"),
    (item4, S4, 3, "Item4"),
    (item5, S5, 4, "Item5"),
    (item6, S6, 5, "Item6")
);
impl_tuple_serializer!(
    TupleSerializer7;
    (item1, S1, 0, "Item1"),
    (item2, S2, 1, "Item2"),
    (item3, S3, 2, "Item3"),
    (item4, S4, 3, "Item4"),
    (item5, S5, 4, "Item5"),
    (item6, S6, 5, "Item6"),
    (item7, S7, 6, "Item7")
);
impl_tuple_serializer!(
    TupleSerializer8;
    (item1, S1, 0, "Item1"),
    (item2, S2, 1, "Item2"),
    (item3, S3, 2, "Item3"),
    (item4, S4, 3, "Item4"),
    (item5, S5, 4, "Item5"),
    (item6, S6, 5, "Item6"),
    (item7, S7, 6, "Item7"),
    (rest, S8, 7, "Rest")
);
