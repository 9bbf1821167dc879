//! Core shopping list item domain types.

use std::fmt::Display;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{Error, category::CategoryName};

/// Database identifier for an item.
///
/// IDs are assigned by the database, strictly increase and are never reused.
pub type ItemId = i64;

/// A validated, non-empty item name, e.g. "Milk".
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct ItemName(String);

impl ItemName {
    /// Create an item name from `name` with surrounding whitespace removed.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::MissingNameOrCategory] if `name` is empty
    /// after trimming.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            Err(Error::MissingNameOrCategory)
        } else {
            Ok(Self(name.to_string()))
        }
    }

    /// Create an item name without validation.
    ///
    /// The caller should ensure that the string is not empty.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl AsRef<str> for ItemName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for ItemName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How many of an item to buy. Always at least one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct Quantity(i64);

impl Quantity {
    /// The smallest quantity an item can have.
    pub const MIN: i64 = 1;

    /// Create a quantity, raising anything below [Quantity::MIN] to the minimum.
    pub fn new(value: i64) -> Self {
        Self(value.max(Self::MIN))
    }

    /// The quantity as a plain integer.
    pub fn get(self) -> i64 {
        self.0
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Self(Self::MIN)
    }
}

impl Display for Quantity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An unchecked entry on the shopping list as shown to clients.
///
/// The checked flag and creation time are stored but never sent to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct Item {
    pub id: ItemId,
    pub name: ItemName,
    pub category: CategoryName,
    pub quantity: Quantity,
}

/// The data needed to put a new item on the list.
#[derive(Debug, Clone, PartialEq)]
pub struct NewItem {
    pub name: ItemName,
    pub category: CategoryName,
    pub quantity: Quantity,
    pub created_at: OffsetDateTime,
}

impl NewItem {
    /// Create a new item stamped with the current time.
    pub fn new(name: ItemName, category: CategoryName, quantity: Quantity) -> Self {
        Self {
            name,
            category,
            quantity,
            created_at: OffsetDateTime::now_utc(),
        }
    }
}

/// Convert `date_time` to whole milliseconds since the Unix epoch.
pub(crate) fn unix_timestamp_millis(date_time: OffsetDateTime) -> i64 {
    (date_time.unix_timestamp_nanos() / 1_000_000) as i64
}
