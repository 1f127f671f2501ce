//! Shipping address types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use essence_core::{AddressId, UserId};

/// Country used when the customer leaves it blank.
pub const DEFAULT_COUNTRY: &str = "US";

/// A saved shipping address.
#[derive(Debug, Clone, Serialize)]
pub struct Address {
    pub id: AddressId,
    #[serde(skip)]
    pub user_id: UserId,
    pub full_name: String,
    pub phone: String,
    pub address_line_1: String,
    pub address_line_2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
}

/// Address validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("{0} is required")]
    MissingField(&'static str),
}

/// Address submitted by the customer.
#[derive(Debug, Clone, Deserialize)]
pub struct NewAddress {
    pub full_name: String,
    pub phone: String,
    pub address_line_1: String,
    #[serde(default)]
    pub address_line_2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    #[serde(default)]
    pub country: Option<String>,
}

impl NewAddress {
    /// Trim every field, reject blanks, and default the country.
    ///
    /// # Errors
    ///
    /// Returns `AddressError::MissingField` naming the first blank field.
    pub fn validate(self) -> Result<Self, AddressError> {
        fn required(value: String, field: &'static str) -> Result<String, AddressError> {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                return Err(AddressError::MissingField(field));
            }
            Ok(trimmed.to_string())
        }

        let optional = |value: Option<String>| {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        Ok(Self {
            full_name: required(self.full_name, "full_name")?,
            phone: required(self.phone, "phone")?,
            address_line_1: required(self.address_line_1, "address_line_1")?,
            address_line_2: optional(self.address_line_2),
            city: required(self.city, "city")?,
            state: required(self.state, "state")?,
            postal_code: required(self.postal_code, "postal_code")?,
            country: Some(
                optional(self.country)
                    .map_or_else(|| DEFAULT_COUNTRY.to_string(), |c| c.to_uppercase()),
            ),
        })
    }

    /// Country after validation.
    #[must_use]
    pub fn country(&self) -> &str {
        self.country.as_deref().unwrap_or(DEFAULT_COUNTRY)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample() -> NewAddress {
        NewAddress {
            full_name: " Ada Lovelace ".to_string(),
            phone: "555-0100".to_string(),
            address_line_1: "1 Rose Lane".to_string(),
            address_line_2: Some("   ".to_string()),
            city: "Portland".to_string(),
            state: "OR".to_string(),
            postal_code: "97201".to_string(),
            country: None,
        }
    }

    #[test]
    fn test_validate_trims_and_defaults_country() {
        let address = sample().validate().unwrap();
        assert_eq!(address.full_name, "Ada Lovelace");
        assert_eq!(address.address_line_2, None);
        assert_eq!(address.country(), "US");
    }

    #[test]
    fn test_validate_rejects_blank_required_field() {
        let mut address = sample();
        address.city = "  ".to_string();
        assert_eq!(
            address.validate().unwrap_err(),
            AddressError::MissingField("city")
        );
    }

    #[test]
    fn test_country_is_uppercased() {
        let mut address = sample();
        address.country = Some("ca".to_string());
        assert_eq!(address.validate().unwrap().country(), "CA");
    }
}
