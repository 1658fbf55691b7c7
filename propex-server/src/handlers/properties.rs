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
use propex_model::{Address, PageRequest, Property, PropertyId, PropertyType, SortDirection};

use crate::api::ApiResponse;
use crate::errors::{AppError, AppResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListPropertiesQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub sort: Option<String>,
    pub direction: Option<SortDirection>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePropertyRequest {
    pub address: Address,
    pub property_type: PropertyType,
    pub year_built: Option<i32>,
    pub lot_size: Option<f64>,
    pub parking_spaces: Option<i32>,
    pub garage_size: Option<f64>,
    pub amenities: Option<Vec<String>>,
    pub hoa_fee: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePropertyRequest {
    pub address: Option<Address>,
    pub property_type: Option<PropertyType>,
    pub year_built: Option<i32>,
    pub lot_size: Option<f64>,
    pub parking_spaces: Option<i32>,
    pub garage_size: Option<f64>,
    pub amenities: Option<Vec<String>>,
    pub hoa_fee: Option<f64>,
}

pub async fn list_properties(
    State(state): State<AppState>,
    Query(query): Query<ListPropertiesQuery>,
) -> AppResult<Json<ApiResponse<Vec<Property>>>> {
    let page = PageRequest {
        page: query.page,
        size: query.size,
        sort: query.sort,
        direction: query.direction,
    };
    let properties = state.properties.list(&page).await?;
    Ok(Json(ApiResponse::success(properties)))
}

pub async fn get_property(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Property>>> {
    let property = state
        .properties
        .find_by_id(PropertyId(id))
        .await?
        .ok_or_else(|| AppError::not_found(format!("Property not found with id: {id}")))?;
    Ok(Json(ApiResponse::success(property)))
}

pub async fn create_property(
    State(state): State<AppState>,
    Json(request): Json<CreatePropertyRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Property>>)> {
    info!(city = %request.address.city, "creating property");
    let now = Utc::now();
    let property = Property {
        id: PropertyId::new(),
        address: request.address,
        property_type: request.property_type,
        year_built: request.year_built.unwrap_or(0),
        lot_size: request.lot_size.unwrap_or(0.0),
        parking_spaces: request.parking_spaces.unwrap_or(0),
        garage_size: request.garage_size.unwrap_or(0.0),
        amenities: request.amenities.unwrap_or_default(),
        hoa_fee: request.hoa_fee.unwrap_or(0.0),
        active: true,
        created_at: now,
        updated_at: now,
    };

    state.properties.insert(&property).await?;
    publish_property_event(&state, EventKind::Created, &property).await;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(property))))
}

pub async fn update_property(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdatePropertyRequest>,
) -> AppResult<Json<ApiResponse<Property>>> {
    info!(property = %id, "updating property");
    let mut property = state
        .properties
        .find_by_id(PropertyId(id))
        .await?
        .ok_or_else(|| AppError::not_found(format!("Property not found with id: {id}")))?;

    if let Some(address) = request.address {
        property.address = address;
    }
    if let Some(property_type) = request.property_type {
        property.property_type = property_type;
    }
    if let Some(year_built) = request.year_built {
        property.year_built = year_built;
    }
    if let Some(lot_size) = request.lot_size {
        property.lot_size = lot_size;
    }
    if let Some(parking_spaces) = request.parking_spaces {
        property.parking_spaces = parking_spaces;
    }
    if let Some(garage_size) = request.garage_size {
        property.garage_size = garage_size;
    }
    if let Some(amenities) = request.amenities {
        property.amenities = amenities;
    }
    if let Some(hoa_fee) = request.hoa_fee {
        property.hoa_fee = hoa_fee;
    }
    property.updated_at = Utc::now();

    state.properties.update(&property).await?;
    publish_property_event(&state, EventKind::Updated, &property).await;

    Ok(Json(ApiResponse::success(property)))
}

pub async fn delete_property(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    info!(property = %id, "deleting property");
    let mut property = state
        .properties
        .find_by_id(PropertyId(id))
        .await?
        .ok_or_else(|| AppError::not_found(format!("Property not found with id: {id}")))?;

    property.active = false;
    property.updated_at = Utc::now();
    state.properties.update(&property).await?;
    publish_property_event(&state, EventKind::Deleted, &property).await;

    Ok(StatusCode::NO_CONTENT)
}

async fn publish_property_event(state: &AppState, kind: EventKind, property: &Property) {
    if let Err(err) = state
        .dispatcher
        .publish(EntityKind::Property, kind, property)
        .await
    {
        warn!(property = %property.id, event = %kind, error = %err, "event publish failed");
    }
}
