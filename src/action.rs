//! The `action` selector and the typed requests it dispatches to.
//!
//! Clients send every field as loosely typed form text. This module turns that
//! text into one [ApiRequest] per action, applying the same coercion rules
//! regardless of which action is requested:
//!
//! - text fields are trimmed, and a missing field is treated as empty,
//! - integer fields use their leading integer, so `"2.5"` is 2 and `"abc"` is
//!   not a number,
//! - a missing or non-numeric quantity is 1, and anything below 1 becomes 1.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    Error,
    category::CategoryName,
    item::{ItemId, ItemName, Quantity},
};

/// One of the five operations a client can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Fetch all unchecked items.
    List,
    /// Put a new item on the list.
    Add,
    /// Check an item off the list.
    Check,
    /// Remove an item entirely.
    Delete,
    /// Change how many of an item to buy.
    UpdateQuantity,
}

impl Action {
    /// The name clients use to select this action.
    pub fn as_str(self) -> &'static str {
        match self {
            Action::List => "list",
            Action::Add => "add",
            Action::Check => "check",
            Action::Delete => "delete",
            Action::UpdateQuantity => "update_quantity",
        }
    }

    /// Whether the action only reads data and may be sent as a GET request.
    pub fn is_read_only(self) -> bool {
        matches!(self, Action::List)
    }
}

impl FromStr for Action {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "list" => Ok(Action::List),
            "add" => Ok(Action::Add),
            "check" => Ok(Action::Check),
            "delete" => Ok(Action::Delete),
            "update_quantity" => Ok(Action::UpdateQuantity),
            other => Err(Error::UnknownAction(other.to_owned())),
        }
    }
}

impl Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The raw fields of a request, from either the query string or the form body.
///
/// Fields that the selected action does not use are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<String>,
}

impl ApiParams {
    /// Decode URL encoded form data, e.g. `action=add&name=Milk`.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidParameters] if `bytes` is not valid form data.
    pub fn from_form_bytes(bytes: &[u8]) -> Result<Self, Error> {
        serde_urlencoded::from_bytes(bytes)
            .map_err(|error| Error::InvalidParameters(error.to_string()))
    }

    /// Parse the action selector.
    ///
    /// # Errors
    ///
    /// Returns [Error::UnknownAction] if there is no action or it is not one of
    /// the five known actions.
    pub fn action(&self) -> Result<Action, Error> {
        self.action.as_deref().unwrap_or_default().parse()
    }
}

/// The input for [Action::Add].
#[derive(Debug, Clone, PartialEq)]
pub struct AddItemRequest {
    pub name: ItemName,
    pub category: CategoryName,
    pub quantity: Quantity,
}

impl TryFrom<&ApiParams> for AddItemRequest {
    type Error = Error;

    fn try_from(params: &ApiParams) -> Result<Self, Self::Error> {
        Ok(Self {
            name: ItemName::new(params.name.as_deref().unwrap_or_default())?,
            category: CategoryName::new(params.category.as_deref().unwrap_or_default())?,
            quantity: coerce_quantity(params.quantity.as_deref()),
        })
    }
}

/// The input for [Action::UpdateQuantity].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UpdateQuantityRequest {
    pub id: ItemId,
    pub quantity: Quantity,
}

impl TryFrom<&ApiParams> for UpdateQuantityRequest {
    type Error = Error;

    fn try_from(params: &ApiParams) -> Result<Self, Self::Error> {
        Ok(Self {
            id: coerce_item_id(params.id.as_deref())?,
            quantity: coerce_quantity(params.quantity.as_deref()),
        })
    }
}

/// A request with its action selected and its fields validated.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiRequest {
    List,
    Add(AddItemRequest),
    Check(ItemId),
    Delete(ItemId),
    UpdateQuantity(UpdateQuantityRequest),
}

impl ApiRequest {
    /// Build the typed request for `action` from the raw `params`.
    ///
    /// # Errors
    ///
    /// Returns a validation error if a required field is missing or invalid.
    pub fn parse(action: Action, params: &ApiParams) -> Result<Self, Error> {
        match action {
            Action::List => Ok(ApiRequest::List),
            Action::Add => AddItemRequest::try_from(params).map(ApiRequest::Add),
            Action::Check => coerce_item_id(params.id.as_deref()).map(ApiRequest::Check),
            Action::Delete => coerce_item_id(params.id.as_deref()).map(ApiRequest::Delete),
            Action::UpdateQuantity => {
                UpdateQuantityRequest::try_from(params).map(ApiRequest::UpdateQuantity)
            }
        }
    }

    /// The action this request was parsed from.
    pub fn action(&self) -> Action {
        match self {
            ApiRequest::List => Action::List,
            ApiRequest::Add(_) => Action::Add,
            ApiRequest::Check(_) => Action::Check,
            ApiRequest::Delete(_) => Action::Delete,
            ApiRequest::UpdateQuantity(_) => Action::UpdateQuantity,
        }
    }
}

/// Parse the integer at the start of `raw`, ignoring surrounding whitespace and
/// anything after the digits.
///
/// Returns `None` if `raw` does not start with an optionally signed number.
/// Numbers too large for an `i64` saturate.
pub fn parse_leading_integer(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    let (is_negative, unsigned) = match raw.as_bytes().first() {
        Some(b'-') => (true, &raw[1..]),
        Some(b'+') => (false, &raw[1..]),
        _ => (false, raw),
    };

    let digit_count = unsigned.bytes().take_while(u8::is_ascii_digit).count();

    if digit_count == 0 {
        return None;
    }

    let magnitude = unsigned[..digit_count]
        .bytes()
        .fold(0i64, |total, digit| {
            total
                .saturating_mul(10)
                .saturating_add(i64::from(digit - b'0'))
        });

    Some(if is_negative {
        magnitude.saturating_neg()
    } else {
        magnitude
    })
}

/// Coerce a raw quantity, defaulting to one when it is missing or not a number.
pub fn coerce_quantity(raw: Option<&str>) -> Quantity {
    raw.and_then(parse_leading_integer)
        .map(Quantity::new)
        .unwrap_or_default()
}

/// Coerce a raw item ID, which must be a positive integer.
///
/// # Errors
///
/// Returns [Error::InvalidItemId] if the ID is missing, not a number, or not
/// positive.
pub fn coerce_item_id(raw: Option<&str>) -> Result<ItemId, Error> {
    match raw.and_then(parse_leading_integer) {
        Some(id) if id > 0 => Ok(id),
        _ => Err(Error::InvalidItemId),
    }
}


#[cfg(test)]
mod coercion_tests {
    use crate::{
        Error,
        action::{coerce_item_id, coerce_quantity, parse_leading_integer},
        item::Quantity,
    };

    #[test]
    fn parses_leading_integer() {
        assert_eq!(parse_leading_integer("42"), Some(42));
        assert_eq!(parse_leading_integer("  7 "), Some(7));
        assert_eq!(parse_leading_integer("+3"), Some(3));
        assert_eq!(parse_leading_integer("-5"), Some(-5));
        assert_eq!(parse_leading_integer("2.9"), Some(2));
        assert_eq!(parse_leading_integer("12abc"), Some(12));
    }

    #[test]
    fn rejects_non_numbers() {
        assert_eq!(parse_leading_integer(""), None);
        assert_eq!(parse_leading_integer("abc"), None);
        assert_eq!(parse_leading_integer("-"), None);
        assert_eq!(parse_leading_integer(".5"), None);
    }

    #[test]
    fn huge_numbers_saturate() {
        assert_eq!(
            parse_leading_integer("99999999999999999999999"),
            Some(i64::MAX)
        );
        assert_eq!(
            parse_leading_integer("-99999999999999999999999"),
            Some(-i64::MAX)
        );
    }

    #[test]
    fn quantity_defaults_to_one() {
        assert_eq!(coerce_quantity(None), Quantity::new(1));
        assert_eq!(coerce_quantity(Some("")), Quantity::new(1));
        assert_eq!(coerce_quantity(Some("lots")), Quantity::new(1));
    }

    #[test]
    fn quantity_is_floored_to_one() {
        assert_eq!(coerce_quantity(Some("0")), Quantity::new(1));
        assert_eq!(coerce_quantity(Some("-4")), Quantity::new(1));
        assert_eq!(coerce_quantity(Some("3")).get(), 3);
    }

    #[test]
    fn item_id_must_be_positive() {
        assert_eq!(coerce_item_id(Some("12")), Ok(12));
        assert_eq!(coerce_item_id(Some("0")), Err(Error::InvalidItemId));
        assert_eq!(coerce_item_id(Some("-1")), Err(Error::InvalidItemId));
        assert_eq!(coerce_item_id(Some("abc")), Err(Error::InvalidItemId));
        assert_eq!(coerce_item_id(None), Err(Error::InvalidItemId));
    }
}
