use std::sync::Arc;

use sqlx::PgPool;

use propex_config::AuthConfig;
use propex_core::auth::ResetTokenStore;
use propex_core::ports::{ListingStore, PropertyStore, UserStore};
use propex_core::repositories::{
    PostgresListingRepository, PostgresPropertyRepository, PostgresUserRepository,
};
use propex_core::{EventDispatcher, SearchComposer};

/// Shared handler state, assembled once at startup.
#[derive(Clone)]
pub struct AppState {
    pub composer: SearchComposer,
    pub listings: Arc<dyn ListingStore>,
    pub properties: Arc<dyn PropertyStore>,
    pub users: Arc<dyn UserStore>,
    pub dispatcher: EventDispatcher,
    pub reset_tokens: ResetTokenStore,
    pub auth: AuthConfig,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState").finish()
    }
}

impl AppState {
    pub fn new(
        pool: PgPool,
        dispatcher: EventDispatcher,
        reset_tokens: ResetTokenStore,
        auth: AuthConfig,
    ) -> Self {
        let listing_repo = PostgresListingRepository::new(pool.clone());
        let property_repo = PostgresPropertyRepository::new(pool.clone());
        let user_repo = PostgresUserRepository::new(pool);

        let listings: Arc<dyn ListingStore> = Arc::new(listing_repo);
        let properties: Arc<dyn PropertyStore> = Arc::new(property_repo.clone());
        let directory = Arc::new(property_repo);
        let users: Arc<dyn UserStore> = Arc::new(user_repo);

        let composer = SearchComposer::new(listings.clone(), properties.clone(), directory);

        Self {
            composer,
            listings,
            properties,
            users,
            dispatcher,
            reset_tokens,
            auth,
        }
    }
}
