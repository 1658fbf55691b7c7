use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::error::ModelError;
use crate::ids::PropertyId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PropertyType {
    Apartment,
    House,
    Villa,
    Office,
    Retail,
    Industrial,
    Land,
}

impl PropertyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyType::Apartment => "APARTMENT",
            PropertyType::House => "HOUSE",
            PropertyType::Villa => "VILLA",
            PropertyType::Office => "OFFICE",
            PropertyType::Retail => "RETAIL",
            PropertyType::Industrial => "INDUSTRIAL",
            PropertyType::Land => "LAND",
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PropertyType {
    type Err = ModelError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_uppercase().as_str() {
            "APARTMENT" => Ok(PropertyType::Apartment),
            "HOUSE" => Ok(PropertyType::House),
            "VILLA" => Ok(PropertyType::Villa),
            "OFFICE" => Ok(PropertyType::Office),
            "RETAIL" => Ok(PropertyType::Retail),
            "INDUSTRIAL" => Ok(PropertyType::Industrial),
            "LAND" => Ok(PropertyType::Land),
            _ => Err(ModelError::UnknownPropertyType(value.to_string())),
        }
    }
}

/// A physical property that listings reference by id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub id: PropertyId,
    pub address: Address,
    pub property_type: PropertyType,
    pub year_built: i32,
    pub lot_size: f64,
    pub parking_spaces: i32,
    pub garage_size: f64,
    pub amenities: Vec<String>,
    pub hoa_fee: f64,
    #[serde(rename = "isActive")]
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
