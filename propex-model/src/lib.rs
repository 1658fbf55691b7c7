//! Core data model definitions shared across Propex crates.

pub mod address;
pub mod criteria;
pub mod error;
pub mod events;
pub mod ids;
pub mod listing;
pub mod property;
pub mod user;

pub use address::Address;
pub use criteria::{ListingSearchCriteria, ListingWithProperty, PageRequest, SortDirection};
pub use error::{ModelError, Result as ModelResult};
pub use events::{EntityKind, EventKind};
pub use ids::{ListingId, PropertyId, UserId};
pub use listing::{Listing, ListingType};
pub use property::{Property, PropertyType};
pub use user::User;
