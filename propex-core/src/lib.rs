//! Domain services for the Propex listing platform: the search composer,
//! the geospatial locator, the event dispatcher, auth primitives, and the
//! Postgres repositories backing them.

pub mod auth;
pub mod error;
pub mod geo;
pub mod messaging;
pub mod ports;
pub mod repositories;
pub mod search;

pub use error::{CoreError, Result};
pub use geo::{BoundingBox, GeoLocator};
pub use messaging::EventDispatcher;
pub use search::SearchComposer;
