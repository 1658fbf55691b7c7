use std::sync::Arc;

use tracing::{info, warn};

use propex_model::{
    Listing, ListingId, ListingSearchCriteria, ListingWithProperty, PageRequest, PropertyId,
};

use crate::Result;
use crate::geo::GeoLocator;
use crate::ports::{ListingStore, PropertyDirectory, PropertyStore};

/// Builds filtered listing pages and joins each row with its property.
///
/// The join is best-effort by contract: a row whose property cannot be
/// fetched is still returned, with the property absent. Fetches run
/// sequentially, one round trip per row.
#[derive(Clone)]
pub struct SearchComposer {
    listings: Arc<dyn ListingStore>,
    properties: Arc<dyn PropertyStore>,
    directory: Arc<dyn PropertyDirectory>,
    locator: GeoLocator,
}

impl std::fmt::Debug for SearchComposer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchComposer").finish()
    }
}

impl SearchComposer {
    pub fn new(
        listings: Arc<dyn ListingStore>,
        properties: Arc<dyn PropertyStore>,
        directory: Arc<dyn PropertyDirectory>,
    ) -> Self {
        let locator = GeoLocator::new(properties.clone());
        Self {
            listings,
            properties,
            directory,
            locator,
        }
    }

    /// Criteria-driven search. City, district and property type narrow the
    /// page through the property side first: no matching property means an
    /// empty page without touching the listing store.
    pub async fn search(
        &self,
        criteria: &ListingSearchCriteria,
    ) -> Result<Vec<ListingWithProperty>> {
        let property_ids = match self.locality_candidates(criteria).await? {
            LocalityFilter::Unconstrained => None,
            LocalityFilter::Candidates(ids) if ids.is_empty() => return Ok(Vec::new()),
            LocalityFilter::Candidates(ids) => Some(ids),
        };

        let rows = self.listings.search(criteria, property_ids).await?;
        info!(matches = rows.len(), "listing search completed");
        Ok(self.augment(rows).await)
    }

    /// Row count under the same filters as [`SearchComposer::search`].
    pub async fn count(&self, criteria: &ListingSearchCriteria) -> Result<i64> {
        let property_ids = match self.locality_candidates(criteria).await? {
            LocalityFilter::Unconstrained => None,
            LocalityFilter::Candidates(ids) if ids.is_empty() => return Ok(0),
            LocalityFilter::Candidates(ids) => Some(ids),
        };
        self.listings.count(criteria, property_ids).await
    }

    pub async fn get(&self, id: ListingId) -> Result<Option<ListingWithProperty>> {
        match self.listings.find_by_id(id).await? {
            Some(listing) => Ok(Some(self.attach(listing).await)),
            None => Ok(None),
        }
    }

    pub async fn find_by_agent(
        &self,
        agent_id: &str,
        page: &PageRequest,
    ) -> Result<Vec<ListingWithProperty>> {
        let rows = self.listings.find_by_agent(agent_id, page).await?;
        Ok(self.augment(rows).await)
    }

    /// Location search: bounding-box candidate ids first, then listings by
    /// foreign-id membership. An empty candidate set short-circuits.
    pub async fn find_near(
        &self,
        latitude: f64,
        longitude: f64,
        radius_km: f64,
    ) -> Result<Vec<ListingWithProperty>> {
        let candidates = self
            .locator
            .candidate_ids(latitude, longitude, radius_km)
            .await?;
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let rows = self.listings.find_by_property_ids(candidates).await?;
        Ok(self.augment(rows).await)
    }

    /// Address keyword search joined through the property side. The
    /// already-fetched properties serve as the join source, so no per-row
    /// fetch happens here.
    pub async fn find_by_address_keyword(
        &self,
        keyword: &str,
    ) -> Result<Vec<ListingWithProperty>> {
        if keyword.trim().is_empty() {
            return Ok(Vec::new());
        }

        let properties = self.properties.find_by_address_keyword(keyword).await?;
        if properties.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<PropertyId> = properties.iter().map(|property| property.id).collect();
        let rows = self.listings.find_by_property_ids(ids).await?;

        Ok(rows
            .into_iter()
            .map(|listing| {
                let property = listing
                    .property_id
                    .and_then(|id| properties.iter().find(|p| p.id == id).cloned());
                ListingWithProperty { listing, property }
            })
            .collect())
    }

    async fn locality_candidates(
        &self,
        criteria: &ListingSearchCriteria,
    ) -> Result<LocalityFilter> {
        if criteria.city.is_none()
            && criteria.district.is_none()
            && criteria.property_type.is_none()
        {
            return Ok(LocalityFilter::Unconstrained);
        }
        let ids = self
            .properties
            .find_ids_matching(
                criteria.city.clone(),
                criteria.district.clone(),
                criteria.property_type,
            )
            .await?;
        Ok(LocalityFilter::Candidates(ids))
    }

    async fn augment(&self, rows: Vec<Listing>) -> Vec<ListingWithProperty> {
        let mut out = Vec::with_capacity(rows.len());
        for listing in rows {
            out.push(self.attach(listing).await);
        }
        out
    }

    /// Joins a single listing with its property, degrading on failure.
    /// Mutation handlers use this to echo the composed row back.
    pub async fn attach(&self, listing: Listing) -> ListingWithProperty {
        let property = match listing.property_id {
            Some(id) => match self.directory.find(id).await {
                Ok(found) => found,
                Err(err) => {
                    warn!(
                        listing = %listing.id,
                        property = %id,
                        error = %err,
                        "property lookup failed; returning listing without it"
                    );
                    None
                }
            },
            None => None,
        };
        ListingWithProperty { listing, property }
    }
}

enum LocalityFilter {
    Unconstrained,
    Candidates(Vec<PropertyId>),
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::Utc;
    use mockall::predicate::eq;

    use propex_model::{Address, ListingType, Property, PropertyType};

    use crate::CoreError;
    use crate::ports::{MockListingStore, MockPropertyDirectory, MockPropertyStore};

    fn listing(property_id: Option<PropertyId>) -> Listing {
        let now = Utc::now();
        Listing {
            id: ListingId::new(),
            property_id,
            name: "Riverside apartment".to_string(),
            description: "Two bedrooms facing the river".to_string(),
            price: 250_000.0,
            listing_type: ListingType::Sale,
            agent_id: Some("agent-7".to_string()),
            agent_name: None,
            agent_phone: None,
            agent_email: None,
            bedrooms: 2,
            bathrooms: 1,
            area: 74.5,
            image_urls: Vec::new(),
            featured_image_url: None,
            active: true,
            sold: false,
            created_at: now,
            updated_at: now,
        }
    }

    fn property(id: PropertyId) -> Property {
        let now = Utc::now();
        Property {
            id,
            address: Address {
                street: "12 Ton Duc Thang".to_string(),
                district: "District 1".to_string(),
                city: "Ho Chi Minh City".to_string(),
                province: "Ho Chi Minh".to_string(),
                country: "Vietnam".to_string(),
                postal_code: "700000".to_string(),
                latitude: 10.0,
                longitude: 106.0,
            },
            property_type: PropertyType::Apartment,
            year_built: 2015,
            lot_size: 0.0,
            parking_spaces: 1,
            garage_size: 0.0,
            amenities: Vec::new(),
            hoa_fee: 120.0,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn composer(
        listings: MockListingStore,
        properties: MockPropertyStore,
        directory: MockPropertyDirectory,
    ) -> SearchComposer {
        SearchComposer::new(Arc::new(listings), Arc::new(properties), Arc::new(directory))
    }

    #[tokio::test]
    async fn failed_property_fetch_degrades_to_absent_field() {
        let property_id = PropertyId::new();
        let mut listings = MockListingStore::new();
        listings
            .expect_search()
            .returning(move |_, _| Ok(vec![listing(Some(property_id))]));

        let properties = MockPropertyStore::new();

        let mut directory = MockPropertyDirectory::new();
        directory
            .expect_find()
            .with(eq(property_id))
            .returning(|_| Err(CoreError::Dependency("connection refused".to_string())));

        let page = composer(listings, properties, directory)
            .search(&ListingSearchCriteria::default())
            .await
            .expect("page must survive a failed join");

        assert_eq!(page.len(), 1);
        assert!(page[0].property.is_none());
    }

    #[tokio::test]
    async fn resolved_property_is_attached_to_the_row() {
        let property_id = PropertyId::new();
        let mut listings = MockListingStore::new();
        listings
            .expect_search()
            .returning(move |_, _| Ok(vec![listing(Some(property_id))]));

        let properties = MockPropertyStore::new();

        let mut directory = MockPropertyDirectory::new();
        directory
            .expect_find()
            .with(eq(property_id))
            .returning(move |id| Ok(Some(property(id))));

        let page = composer(listings, properties, directory)
            .search(&ListingSearchCriteria::default())
            .await
            .unwrap();

        assert_eq!(page.len(), 1);
        assert_eq!(page[0].property.as_ref().unwrap().id, property_id);
    }

    #[tokio::test]
    async fn rows_without_foreign_id_skip_the_directory() {
        let mut listings = MockListingStore::new();
        listings
            .expect_search()
            .returning(|_, _| Ok(vec![listing(None)]));

        let properties = MockPropertyStore::new();
        // No expectation on the directory: a call would panic the test.
        let directory = MockPropertyDirectory::new();

        let page = composer(listings, properties, directory)
            .search(&ListingSearchCriteria::default())
            .await
            .unwrap();

        assert_eq!(page.len(), 1);
        assert!(page[0].property.is_none());
    }

    #[tokio::test]
    async fn empty_locality_candidates_short_circuit_to_empty_page() {
        // The listing store must never be queried when no property matches
        // the requested city.
        let listings = MockListingStore::new();

        let mut properties = MockPropertyStore::new();
        properties
            .expect_find_ids_matching()
            .returning(|_, _, _| Ok(Vec::new()));

        let directory = MockPropertyDirectory::new();

        let criteria = ListingSearchCriteria {
            city: Some("Da Lat".to_string()),
            ..Default::default()
        };
        let page = composer(listings, properties, directory)
            .search(&criteria)
            .await
            .unwrap();

        assert!(page.is_empty());
    }

    #[tokio::test]
    async fn empty_geo_candidates_short_circuit_to_empty_result() {
        let listings = MockListingStore::new();

        let mut properties = MockPropertyStore::new();
        properties
            .expect_find_ids_in_box()
            .returning(|_, _, _, _| Ok(Vec::new()));

        let directory = MockPropertyDirectory::new();

        let result = composer(listings, properties, directory)
            .find_near(10.0, 106.0, 1.0)
            .await
            .unwrap();

        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn geo_candidates_filter_listings_by_membership() {
        let property_id = PropertyId::new();

        let mut listings = MockListingStore::new();
        listings
            .expect_find_by_property_ids()
            .with(eq(vec![property_id]))
            .returning(move |_| Ok(vec![listing(Some(property_id))]));

        let mut properties = MockPropertyStore::new();
        properties
            .expect_find_ids_in_box()
            .returning(move |_, _, _, _| Ok(vec![property_id]));

        let mut directory = MockPropertyDirectory::new();
        directory
            .expect_find()
            .returning(move |id| Ok(Some(property(id))));

        let result = composer(listings, properties, directory)
            .find_near(10.0, 106.0, 1.0)
            .await
            .unwrap();

        assert_eq!(result.len(), 1);
        assert!(result[0].property.is_some());
    }

    #[tokio::test]
    async fn blank_address_keyword_returns_empty_without_lookups() {
        let listings = MockListingStore::new();
        let properties = MockPropertyStore::new();
        let directory = MockPropertyDirectory::new();

        let result = composer(listings, properties, directory)
            .find_by_address_keyword("   ")
            .await
            .unwrap();

        assert!(result.is_empty());
    }
}
