use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use propex_model::events::{EntityKind, EventKind};
use propex_model::{
    Listing, ListingId, ListingSearchCriteria, ListingType, ListingWithProperty, PageRequest,
    PropertyId, PropertyType, SortDirection,
};

use crate::api::ApiResponse;
use crate::errors::{AppError, AppResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchListingsQuery {
    pub listing_type: Option<ListingType>,
    pub property_type: Option<PropertyType>,
    pub city: Option<String>,
    pub district: Option<String>,
    pub agent_id: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub min_bedrooms: Option<i32>,
    pub max_bedrooms: Option<i32>,
    pub min_area: Option<f64>,
    pub max_area: Option<f64>,
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub sort: Option<String>,
    pub direction: Option<SortDirection>,
}

impl From<SearchListingsQuery> for ListingSearchCriteria {
    fn from(query: SearchListingsQuery) -> Self {
        ListingSearchCriteria {
            listing_type: query.listing_type,
            property_type: query.property_type,
            city: query.city,
            district: query.district,
            agent_id: query.agent_id,
            min_price: query.min_price,
            max_price: query.max_price,
            min_bedrooms: query.min_bedrooms,
            max_bedrooms: query.max_bedrooms,
            min_area: query.min_area,
            max_area: query.max_area,
            page: PageRequest {
                page: query.page,
                size: query.size,
                sort: query.sort,
                direction: query.direction,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationQuery {
    pub latitude: f64,
    pub longitude: f64,
    pub max_distance_km: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct KeywordQuery {
    pub keyword: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateListingRequest {
    pub property_id: Option<Uuid>,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub listing_type: ListingType,
    pub agent_id: Option<String>,
    pub agent_name: Option<String>,
    pub agent_phone: Option<String>,
    pub agent_email: Option<String>,
    pub bedrooms: Option<i32>,
    pub bathrooms: Option<i32>,
    pub area: Option<f64>,
    pub image_urls: Option<Vec<String>>,
    pub featured_image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateListingRequest {
    pub property_id: Option<Uuid>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub listing_type: Option<ListingType>,
    pub agent_id: Option<String>,
    pub bedrooms: Option<i32>,
    pub bathrooms: Option<i32>,
    pub area: Option<f64>,
    pub image_urls: Option<Vec<String>>,
    pub featured_image_url: Option<String>,
    pub sold: Option<bool>,
}

pub async fn search_listings(
    State(state): State<AppState>,
    Query(query): Query<SearchListingsQuery>,
) -> AppResult<Json<ApiResponse<Vec<ListingWithProperty>>>> {
    let criteria = ListingSearchCriteria::from(query);
    let page = state.composer.search(&criteria).await?;
    Ok(Json(ApiResponse::success(page)))
}

pub async fn count_listings(
    State(state): State<AppState>,
    Query(query): Query<SearchListingsQuery>,
) -> AppResult<Json<ApiResponse<i64>>> {
    let criteria = ListingSearchCriteria::from(query);
    let total = state.composer.count(&criteria).await?;
    Ok(Json(ApiResponse::success(total)))
}

pub async fn get_listing(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<ListingWithProperty>>> {
    let row = state
        .composer
        .get(ListingId(id))
        .await?
        .ok_or_else(|| AppError::not_found(format!("Listing not found with id: {id}")))?;
    Ok(Json(ApiResponse::success(row)))
}

pub async fn find_listings_by_location(
    State(state): State<AppState>,
    Query(query): Query<LocationQuery>,
) -> AppResult<Json<ApiResponse<Vec<ListingWithProperty>>>> {
    let radius_km = query.max_distance_km.unwrap_or(5.0);
    let rows = state
        .composer
        .find_near(query.latitude, query.longitude, radius_km)
        .await?;
    Ok(Json(ApiResponse::success(rows)))
}

pub async fn find_listings_by_address(
    State(state): State<AppState>,
    Query(query): Query<KeywordQuery>,
) -> AppResult<Json<ApiResponse<Vec<ListingWithProperty>>>> {
    let rows = state
        .composer
        .find_by_address_keyword(&query.keyword)
        .await?;
    Ok(Json(ApiResponse::success(rows)))
}

pub async fn find_listings_by_agent(
    State(state): State<AppState>,
    Path(agent_id): Path<String>,
    Query(query): Query<SearchListingsQuery>,
) -> AppResult<Json<ApiResponse<Vec<ListingWithProperty>>>> {
    let page = PageRequest {
        page: query.page,
        size: query.size,
        sort: query.sort,
        direction: query.direction,
    };
    let rows = state.composer.find_by_agent(&agent_id, &page).await?;
    Ok(Json(ApiResponse::success(rows)))
}

pub async fn create_listing(
    State(state): State<AppState>,
    Json(request): Json<CreateListingRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<ListingWithProperty>>)> {
    info!(name = %request.name, "creating listing");
    let now = Utc::now();
    let listing = Listing {
        id: ListingId::new(),
        property_id: request.property_id.map(PropertyId),
        name: request.name,
        description: request.description.unwrap_or_default(),
        price: request.price,
        listing_type: request.listing_type,
        agent_id: request.agent_id,
        agent_name: request.agent_name,
        agent_phone: request.agent_phone,
        agent_email: request.agent_email,
        bedrooms: request.bedrooms.unwrap_or(0),
        bathrooms: request.bathrooms.unwrap_or(0),
        area: request.area.unwrap_or(0.0),
        image_urls: request.image_urls.unwrap_or_default(),
        featured_image_url: request.featured_image_url,
        active: true,
        sold: false,
        created_at: now,
        updated_at: now,
    };

    state.listings.insert(&listing).await?;
    publish_listing_event(&state, EventKind::Created, &listing).await;

    let row = state.composer.attach(listing).await;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(row))))
}

pub async fn update_listing(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateListingRequest>,
) -> AppResult<Json<ApiResponse<ListingWithProperty>>> {
    info!(listing = %id, "updating listing");
    let mut listing = state
        .listings
        .find_by_id(ListingId(id))
        .await?
        .ok_or_else(|| AppError::not_found(format!("Listing not found with id: {id}")))?;

    if let Some(property_id) = request.property_id {
        listing.property_id = Some(PropertyId(property_id));
    }
    if let Some(name) = request.name {
        listing.name = name;
    }
    if let Some(description) = request.description {
        listing.description = description;
    }
    if let Some(price) = request.price {
        listing.price = price;
    }
    if let Some(listing_type) = request.listing_type {
        listing.listing_type = listing_type;
    }
    if let Some(agent_id) = request.agent_id {
        listing.agent_id = Some(agent_id);
    }
    if let Some(bedrooms) = request.bedrooms {
        listing.bedrooms = bedrooms;
    }
    if let Some(bathrooms) = request.bathrooms {
        listing.bathrooms = bathrooms;
    }
    if let Some(area) = request.area {
        listing.area = area;
    }
    if let Some(image_urls) = request.image_urls {
        listing.image_urls = image_urls;
    }
    if let Some(featured_image_url) = request.featured_image_url {
        listing.featured_image_url = Some(featured_image_url);
    }
    if let Some(sold) = request.sold {
        listing.sold = sold;
    }
    listing.updated_at = Utc::now();

    state.listings.update(&listing).await?;
    publish_listing_event(&state, EventKind::Updated, &listing).await;

    let row = state.composer.attach(listing).await;
    Ok(Json(ApiResponse::success(row)))
}

pub async fn delete_listing(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    info!(listing = %id, "deleting listing");
    let mut listing = state
        .listings
        .find_by_id(ListingId(id))
        .await?
        .ok_or_else(|| AppError::not_found(format!("Listing not found with id: {id}")))?;

    listing.active = false;
    listing.updated_at = Utc::now();
    state.listings.update(&listing).await?;

    // The row is gone from every read path; the deletion event still
    // references the original id.
    publish_listing_event(&state, EventKind::Deleted, &listing).await;

    Ok(StatusCode::NO_CONTENT)
}

/// Publish after the write has committed. A broker failure is logged and
/// swallowed: the write stands, the event may be lost.
async fn publish_listing_event(state: &AppState, kind: EventKind, listing: &Listing) {
    if let Err(err) = state
        .dispatcher
        .publish(EntityKind::Listing, kind, listing)
        .await
    {
        warn!(listing = %listing.id, event = %kind, error = %err, "event publish failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_maps_onto_criteria_field_by_field() {
        let query = SearchListingsQuery {
            listing_type: Some(ListingType::Rent),
            property_type: Some(PropertyType::Apartment),
            city: Some("Ho Chi Minh City".to_string()),
            district: None,
            agent_id: None,
            min_price: Some(500.0),
            max_price: None,
            min_bedrooms: None,
            max_bedrooms: Some(3),
            min_area: None,
            max_area: None,
            page: Some(2),
            size: Some(20),
            sort: Some("price".to_string()),
            direction: Some(SortDirection::Asc),
        };

        let criteria = ListingSearchCriteria::from(query);
        assert_eq!(criteria.listing_type, Some(ListingType::Rent));
        assert_eq!(criteria.property_type, Some(PropertyType::Apartment));
        assert_eq!(criteria.min_price, Some(500.0));
        assert_eq!(criteria.max_bedrooms, Some(3));
        assert_eq!(criteria.page.offset(), 20);
        assert_eq!(criteria.page.sort_column(), "price");
    }

    #[test]
    fn query_parameters_deserialize_from_camel_case() {
        let query: SearchListingsQuery = serde_json::from_value(serde_json::json!({
            "listingType": "SALE",
            "minPrice": 100.0,
            "maxPrice": 900.0,
            "direction": "DESC"
        }))
        .unwrap();
        assert_eq!(query.listing_type, Some(ListingType::Sale));
        assert_eq!(query.min_price, Some(100.0));
        assert_eq!(query.direction, Some(SortDirection::Desc));
    }
}
