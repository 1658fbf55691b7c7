//! Storage and lookup ports the services are written against. The Postgres
//! implementations live in [`crate::repositories`]; tests substitute mocks.

use async_trait::async_trait;

use propex_model::{
    Listing, ListingId, ListingSearchCriteria, PageRequest, Property, PropertyId, PropertyType,
    User, UserId,
};

use crate::Result;

/// Persistence port for listings. Every read returns `active = true` rows
/// only; soft-deleted rows stay invisible through this interface.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ListingStore: Send + Sync {
    async fn insert(&self, listing: &Listing) -> Result<()>;

    async fn update(&self, listing: &Listing) -> Result<()>;

    async fn find_by_id(&self, id: ListingId) -> Result<Option<Listing>>;

    /// Filtered, paginated search. `property_ids` narrows to listings whose
    /// foreign id is a member of the candidate set.
    async fn search(
        &self,
        criteria: &ListingSearchCriteria,
        property_ids: Option<Vec<PropertyId>>,
    ) -> Result<Vec<Listing>>;

    /// Row count for the same filters as [`ListingStore::search`].
    async fn count(
        &self,
        criteria: &ListingSearchCriteria,
        property_ids: Option<Vec<PropertyId>>,
    ) -> Result<i64>;

    async fn find_by_property_ids(&self, ids: Vec<PropertyId>) -> Result<Vec<Listing>>;

    async fn find_by_agent(&self, agent_id: &str, page: &PageRequest) -> Result<Vec<Listing>>;
}

/// Persistence port for properties.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PropertyStore: Send + Sync {
    async fn insert(&self, property: &Property) -> Result<()>;

    async fn update(&self, property: &Property) -> Result<()>;

    async fn find_by_id(&self, id: PropertyId) -> Result<Option<Property>>;

    async fn list(&self, page: &PageRequest) -> Result<Vec<Property>>;

    /// Ids of active properties inside an inclusive bounding box.
    async fn find_ids_in_box(
        &self,
        lat_min: f64,
        lat_max: f64,
        lon_min: f64,
        lon_max: f64,
    ) -> Result<Vec<PropertyId>>;

    /// Ids of active properties matching the property-side criteria: exact
    /// locality fields and the property type.
    async fn find_ids_matching(
        &self,
        city: Option<String>,
        district: Option<String>,
        property_type: Option<PropertyType>,
    ) -> Result<Vec<PropertyId>>;

    /// Case-insensitive substring match over all address components.
    async fn find_by_address_keyword(&self, keyword: &str) -> Result<Vec<Property>>;
}

/// Lookup port the composer joins through. Kept separate from
/// [`PropertyStore`] so a deployment can point it at a remote service; a
/// failing lookup degrades the row instead of the page.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PropertyDirectory: Send + Sync {
    async fn find(&self, id: PropertyId) -> Result<Option<Property>>;
}

/// Account lookup for the auth flows.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>>;

    async fn update_password(&self, id: UserId, password_hash: &str) -> Result<()>;
}
