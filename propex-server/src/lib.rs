//! Listing service HTTP layer. The interesting logic lives in
//! `propex-core`; this crate wires it to axum routes and maps the core
//! error taxonomy onto HTTP statuses.

pub mod api;
pub mod errors;
pub mod handlers;
pub mod routes;
pub mod state;
