/*
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Ordered documents.

use super::Bson;
use crate::raw::{self, read_document, write_document, SliceReader, VecWriter};

/// An ordered map from element names to [`Bson`] values.
///
/// Insertion order is preserved and is the order in which elements are
/// written to the wire. This is also the model used for untyped ("expando")
/// values: a document with no static schema. Lookups are linear, which is the
/// right trade-off for the small documents this engine manipulates.
#[derive(Clone, Default, PartialEq)]
pub struct Document {
    entries: Vec<(String, Bson)>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Inserts a value. An existing entry with the same name is replaced in
    /// place, keeping its position; otherwise the entry is appended. Returns
    /// the previous value, if any.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Bson>) -> Option<Bson> {
        let name = name.into();
        let value = value.into();
        for (key, slot) in &mut self.entries {
            if *key == name {
                return Some(core::mem::replace(slot, value));
            }
        }
        self.entries.push((name, value));
        None
    }

    pub fn get(&self, name: &str) -> Option<&Bson> {
        self.entries.iter().find(|(key, _)| key == name).map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Bson> {
        self.entries
            .iter_mut()
            .find(|(key, _)| key == name)
            .map(|(_, v)| v)
    }

    /// Removes an entry, preserving the order of the remaining ones.
    pub fn remove(&mut self, name: &str) -> Option<Bson> {
        let index = self.entries.iter().position(|(key, _)| key == name)?;
        Some(self.entries.remove(index).1)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Bson)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        match self.get(name) {
            Some(Bson::String(s)) => Some(s),
            _ => None,
        }
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        match self.get(name) {
            Some(Bson::Boolean(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn get_i32(&self, name: &str) -> Option<i32> {
        match self.get(name) {
            Some(Bson::Int32(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn get_i64(&self, name: &str) -> Option<i64> {
        match self.get(name) {
            Some(Bson::Int64(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn get_f64(&self, name: &str) -> Option<f64> {
        match self.get(name) {
            Some(Bson::Double(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn get_document(&self, name: &str) -> Option<&Document> {
        match self.get(name) {
            Some(Bson::Document(d)) => Some(d),
            _ => None,
        }
    }

    pub fn get_array(&self, name: &str) -> Option<&[Bson]> {
        match self.get(name) {
            Some(Bson::Array(a)) => Some(a),
            _ => None,
        }
    }

    /// Encodes this document to its wire form.
    pub fn to_bytes(&self) -> raw::Result<Vec<u8>> {
        let mut writer = VecWriter::new();
        write_document(&mut writer, self)?;
        Ok(writer.into_bytes())
    }

    /// Decodes a document from its wire form.
    pub fn from_bytes(bytes: &[u8]) -> raw::Result<Self> {
        let mut reader = SliceReader::new(bytes);
        read_document(&mut reader)
    }
}

impl core::fmt::Debug for Document {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl FromIterator<(String, Bson)> for Document {
    fn from_iter<I: IntoIterator<Item = (String, Bson)>>(iter: I) -> Self {
        let mut document = Document::new();
        for (name, value) in iter {
            document.insert(name, value);
        }
        document
    }
}

impl IntoIterator for Document {
    type Item = (String, Bson);
    type IntoIter = std::vec::IntoIter<(String, Bson)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Builds a [`Document`] from `name => value` pairs, converting values with
/// [`Bson::from`].
#[macro_export]
macro_rules! doc {
    () => { $crate::bson::Document::new() };
    ($($name:expr => $value:expr),+ $(,)?) => {{
        let mut document = $crate::bson::Document::new();
        $( document.insert($name, $crate::bson::Bson::from($value)); )+
        document
    }};
}
