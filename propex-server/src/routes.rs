use axum::{
    Router,
    routing::{get, post},
};

use crate::handlers::{auth, listings, properties};
use crate::state::AppState;

/// All service routes. Authentication happens at the gateway; the routes
/// here trust the `X-User-*` headers it injects and stay open inside the
/// service mesh.
pub fn create_router() -> Router<AppState> {
    Router::new()
        // Auth endpoints (public at the gateway by prefix)
        .route("/api/auth/login", post(auth::login))
        .route(
            "/api/auth/password-reset/request",
            post(auth::request_password_reset),
        )
        .route(
            "/api/auth/password-reset/confirm",
            post(auth::reset_password),
        )
        // Listing search and composition
        .route(
            "/api/listings",
            get(listings::search_listings).post(listings::create_listing),
        )
        .route("/api/listings/count", get(listings::count_listings))
        .route(
            "/api/listings/location",
            get(listings::find_listings_by_location),
        )
        .route(
            "/api/listings/by-address",
            get(listings::find_listings_by_address),
        )
        .route(
            "/api/listings/agent/{agent_id}",
            get(listings::find_listings_by_agent),
        )
        .route(
            "/api/listings/{id}",
            get(listings::get_listing)
                .put(listings::update_listing)
                .delete(listings::delete_listing),
        )
        // Properties
        .route(
            "/api/properties",
            get(properties::list_properties).post(properties::create_property),
        )
        .route(
            "/api/properties/{id}",
            get(properties::get_property)
                .put(properties::update_property)
                .delete(properties::delete_property),
        )
}
