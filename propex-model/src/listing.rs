use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::ids::{ListingId, PropertyId};

/// Whether a listing offers the property for sale or for rent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ListingType {
    Sale,
    Rent,
}

impl ListingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListingType::Sale => "SALE",
            ListingType::Rent => "RENT",
        }
    }
}

impl fmt::Display for ListingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ListingType {
    type Err = ModelError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_uppercase().as_str() {
            "SALE" => Ok(ListingType::Sale),
            "RENT" => Ok(ListingType::Rent),
            _ => Err(ModelError::UnknownListingType(value.to_string())),
        }
    }
}

/// A published offer for a property. The listing carries a snapshot of the
/// agent contact details so reads do not fan out to the user service.
///
/// `property_id` is optional and may reference a property that has since
/// been soft-deleted; read paths degrade rather than fail in that case.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: ListingId,
    pub property_id: Option<PropertyId>,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub listing_type: ListingType,
    pub agent_id: Option<String>,
    pub agent_name: Option<String>,
    pub agent_phone: Option<String>,
    pub agent_email: Option<String>,
    pub bedrooms: i32,
    pub bathrooms: i32,
    pub area: f64,
    pub image_urls: Vec<String>,
    pub featured_image_url: Option<String>,
    #[serde(rename = "isActive")]
    pub active: bool,
    #[serde(rename = "isSold")]
    pub sold: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_type_round_trips_case_insensitively() {
        assert_eq!("sale".parse::<ListingType>().unwrap(), ListingType::Sale);
        assert_eq!("RENT".parse::<ListingType>().unwrap(), ListingType::Rent);
        assert_eq!(ListingType::Sale.as_str(), "SALE");
    }

    #[test]
    fn unknown_listing_type_is_rejected() {
        assert!("LEASE".parse::<ListingType>().is_err());
    }
}
