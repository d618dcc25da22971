// III-IV
// Copyright 2023 Julio Merino
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not
// use this file except in compliance with the License.  You may obtain a copy
// of the License at:
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.  See the
// License for the specific language governing permissions and limitations
// under the License.

//! High-level data types.

use derive_getters::Getters;
use order_crud_core::model::{ModelError, ModelResult};
use serde::de::Visitor;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use time::OffsetDateTime;

/// Length of an order identifier in bytes.
const ORDER_ID_BYTES: usize = 12;

/// Mask to keep the per-identifier counter within its 3 bytes.
const COUNTER_MASK: u32 = 0x00ff_ffff;

/// Status assigned to orders created without an explicit one.
pub(crate) const DEFAULT_STATUS: &str = "pending";

/// Represents a correctly-formatted (but maybe non-existent) order identifier.
///
/// Identifiers are 12 bytes long and are always rendered as 24 lowercase hex digits.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub(crate) struct OrderId(String);

impl OrderId {
    /// Creates a new identifier from an untrusted string `s`, making sure it is valid.
    ///
    /// Hex digits are accepted in either case and normalized to lowercase.
    pub(crate) fn new<S: Into<String>>(s: S) -> ModelResult<Self> {
        let s = s.into();
        if s.len() != ORDER_ID_BYTES * 2 || !s.chars().all(|ch| ch.is_ascii_hexdigit()) {
            return Err(ModelError("Invalid order ID format".to_owned()));
        }
        Ok(Self(s.to_ascii_lowercase()))
    }

    /// Creates a new identifier from its binary representation.
    fn from_bytes(bytes: &[u8; ORDER_ID_BYTES]) -> Self {
        Self(bytes.iter().map(|b| format!("{:02x}", b)).collect())
    }

    /// Returns a string view of the identifier.
    pub(crate) fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

#[cfg(test)]
impl From<&'static str> for OrderId {
    /// Creates a new identifier from a hardcoded string, which must be valid.
    fn from(id: &'static str) -> Self {
        assert_eq!(id, id.to_lowercase(), "Hardcoded order IDs must be lowercase");
        OrderId::new(id).expect("Hardcoded order IDs must be valid")
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A deserialization visitor for an `OrderId`.
struct OrderIdVisitor;

impl Visitor<'_> for OrderIdVisitor {
    type Value = OrderId;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a string")
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        OrderId::new(v).map_err(|e| E::custom(e.to_string()))
    }

    fn visit_string<E>(self, v: String) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        OrderId::new(v).map_err(|e| E::custom(e.to_string()))
    }
}

impl<'de> Deserialize<'de> for OrderId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_string(OrderIdVisitor)
    }
}

/// Generator of unique order identifiers.
///
/// Identifiers are composed of 4 bytes with the big-endian seconds since the Unix epoch, 5 random
/// bytes chosen once per generator, and a 3-byte big-endian counter that starts at a random value
/// and wraps around.  Identifiers produced by one generator sort by creation second.
pub(crate) struct OrderIdGenerator {
    /// Random value that distinguishes this generator from others running concurrently.
    process_unique: [u8; 5],

    /// Source of the counter bytes.  Only the lower 3 bytes are used.
    counter: AtomicU32,
}

impl Default for OrderIdGenerator {
    fn default() -> Self {
        Self::new(rand::random::<[u8; 5]>(), rand::random::<u32>())
    }
}

impl OrderIdGenerator {
    /// Creates a generator with explicit `process_unique` bytes and an initial `counter`.
    pub(crate) fn new(process_unique: [u8; 5], counter: u32) -> Self {
        Self { process_unique, counter: AtomicU32::new(counter & COUNTER_MASK) }
    }

    /// Returns a new identifier for a record created at `now`.
    pub(crate) fn next(&self, now: OffsetDateTime) -> OrderId {
        // Seconds wrap in the year 2106, same as other 4-byte timestamp encodings.
        let secs = now.unix_timestamp() as u32;
        let counter = self.counter.fetch_add(1, Ordering::Relaxed) & COUNTER_MASK;

        let mut bytes = [0u8; ORDER_ID_BYTES];
        bytes[0..4].copy_from_slice(&secs.to_be_bytes());
        bytes[4..9].copy_from_slice(&self.process_unique);
        bytes[9..12].copy_from_slice(&counter.to_be_bytes()[1..4]);
        OrderId::from_bytes(&bytes)
    }
}

/// Wrapper for a field of a partial update that tells apart absent fields from present ones.
///
/// Use with `#[serde(default)]` so that missing fields deserialize as `Absent`.  A present `null`
/// is only accepted if `T` itself accepts it, as `Option` does.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Patch<T> {
    /// The field was not provided and must be left untouched.
    Absent,

    /// The field was provided with a new value.
    Set(T),
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Patch::Absent
    }
}

impl<T> Patch<T> {
    /// Returns a reference to the new value, if any.
    pub(crate) fn as_set(&self) -> Option<&T> {
        match self {
            Patch::Absent => None,
            Patch::Set(value) => Some(value),
        }
    }
}

impl<'de, T> Deserialize<'de> for Patch<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        T::deserialize(deserializer).map(Patch::Set)
    }
}

/// Returns the status of orders created without one.
fn default_status() -> String {
    DEFAULT_STATUS.to_owned()
}

/// The user-controlled fields of an order.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub(crate) struct OrderFields {
    /// Name of the customer that placed the order.
    pub(crate) customer_name: String,

    /// Total amount of the order.
    pub(crate) total_amount: f64,

    /// Free-form processing status of the order.
    #[serde(default = "default_status")]
    pub(crate) status: String,

    /// Optional free-form description of the order.
    #[serde(default)]
    pub(crate) description: Option<String>,
}

/// Payload to create a new order.
#[derive(Debug, Deserialize, PartialEq)]
#[cfg_attr(test, derive(Serialize))]
pub(crate) struct NewOrder {
    /// Contents of the order to create.
    #[serde(flatten)]
    pub(crate) fields: OrderFields,
}

/// Payload to partially update an existing order.  Fields not present are left untouched.
#[derive(Debug, Default, Deserialize, PartialEq)]
pub(crate) struct OrderPatch {
    /// New customer name, if present.
    #[serde(default)]
    pub(crate) customer_name: Patch<String>,

    /// New total amount, if present.
    #[serde(default)]
    pub(crate) total_amount: Patch<f64>,

    /// New status, if present.
    #[serde(default)]
    pub(crate) status: Patch<String>,

    /// New description, if present.  A present `null` clears the description.
    #[serde(default)]
    pub(crate) description: Patch<Option<String>>,
}

/// An order as persisted in the database and as returned to clients.
#[derive(Clone, Debug, Deserialize, Getters, PartialEq, Serialize)]
pub(crate) struct Order {
    /// Unique identifier of the order.
    id: OrderId,

    /// User-controlled contents of the order.
    #[serde(flatten)]
    fields: OrderFields,

    /// Time when the order was created.
    #[serde(with = "time::serde::rfc3339")]
    created_at: OffsetDateTime,

    /// Time when the order was last modified.
    #[serde(with = "time::serde::rfc3339")]
    updated_at: OffsetDateTime,
}

impl Order {
    /// Creates a new order from its parts.
    pub(crate) fn new(
        id: OrderId,
        fields: OrderFields,
        created_at: OffsetDateTime,
        updated_at: OffsetDateTime,
    ) -> Self {
        Self { id, fields, created_at, updated_at }
    }
}
