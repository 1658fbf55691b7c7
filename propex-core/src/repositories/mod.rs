//! Postgres-backed implementations of the storage ports. All reads filter
//! on `active = TRUE`; soft deletion is an update that flips the flag.

mod listings;
mod properties;
mod users;

pub use listings::PostgresListingRepository;
pub use properties::PostgresPropertyRepository;
pub use users::PostgresUserRepository;
