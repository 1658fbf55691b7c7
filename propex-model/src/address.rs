use serde::{Deserialize, Serialize};

/// Postal address of a property, including the geographic coordinates used
/// by the location search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub street: String,
    pub district: String,
    pub city: String,
    pub province: String,
    pub country: String,
    pub postal_code: String,
    pub latitude: f64,
    pub longitude: f64,
}
