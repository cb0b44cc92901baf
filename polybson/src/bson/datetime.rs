/*
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! BSON UTC datetime values.

/// A UTC instant with millisecond precision, stored as milliseconds since the
/// unix epoch, which is exactly the wire representation.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DateTime(i64);

impl DateTime {
    pub const fn from_millis(millis: i64) -> Self {
        Self(millis)
    }

    pub const fn timestamp_millis(&self) -> i64 {
        self.0
    }

    pub fn now() -> Self {
        Self(chrono::Utc::now().timestamp_millis())
    }

    pub fn from_chrono<Tz: chrono::TimeZone>(value: chrono::DateTime<Tz>) -> Self {
        Self(value.timestamp_millis())
    }

    /// Converts to a [`chrono::DateTime`], or `None` when the millisecond
    /// value falls outside chrono's representable range.
    pub fn to_chrono(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        chrono::DateTime::from_timestamp_millis(self.0)
    }
}

impl core::fmt::Display for DateTime {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.to_chrono() {
            Some(dt) => write!(f, "{}", dt.to_rfc3339()),
            None => write!(f, "{}ms", self.0),
        }
    }
}

impl core::fmt::Debug for DateTime {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "DateTime({})", self)
    }
}

impl<Tz: chrono::TimeZone> From<chrono::DateTime<Tz>> for DateTime {
    fn from(value: chrono::DateTime<Tz>) -> Self {
        Self::from_chrono(value)
    }
}
