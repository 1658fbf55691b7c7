use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, QueryBuilder};
use uuid::Uuid;

use propex_model::{Address, PageRequest, Property, PropertyId, PropertyType};

use crate::Result;
use crate::ports::{PropertyDirectory, PropertyStore};

const PROPERTY_COLUMNS: &str = "id, street, district, city, province, country, postal_code, \
     latitude, longitude, property_type, year_built, lot_size, parking_spaces, garage_size, \
     amenities, hoa_fee, active, created_at, updated_at";

#[derive(Clone, Debug)]
pub struct PostgresPropertyRepository {
    pool: PgPool,
}

#[derive(Debug, sqlx::FromRow)]
struct PropertyRow {
    id: Uuid,
    street: String,
    district: String,
    city: String,
    province: String,
    country: String,
    postal_code: String,
    latitude: f64,
    longitude: f64,
    property_type: String,
    year_built: i32,
    lot_size: f64,
    parking_spaces: i32,
    garage_size: f64,
    amenities: Vec<String>,
    hoa_fee: f64,
    active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<PropertyRow> for Property {
    type Error = crate::CoreError;

    fn try_from(row: PropertyRow) -> Result<Property> {
        Ok(Property {
            id: PropertyId(row.id),
            address: Address {
                street: row.street,
                district: row.district,
                city: row.city,
                province: row.province,
                country: row.country,
                postal_code: row.postal_code,
                latitude: row.latitude,
                longitude: row.longitude,
            },
            property_type: row.property_type.parse()?,
            year_built: row.year_built,
            lot_size: row.lot_size,
            parking_spaces: row.parking_spaces,
            garage_size: row.garage_size,
            amenities: row.amenities,
            hoa_fee: row.hoa_fee,
            active: row.active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl PostgresPropertyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PropertyStore for PostgresPropertyRepository {
    async fn insert(&self, property: &Property) -> Result<()> {
        sqlx::query(
            "INSERT INTO properties (id, street, district, city, province, country, postal_code, \
             latitude, longitude, property_type, year_built, lot_size, parking_spaces, \
             garage_size, amenities, hoa_fee, active, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)",
        )
        .bind(property.id.to_uuid())
        .bind(&property.address.street)
        .bind(&property.address.district)
        .bind(&property.address.city)
        .bind(&property.address.province)
        .bind(&property.address.country)
        .bind(&property.address.postal_code)
        .bind(property.address.latitude)
        .bind(property.address.longitude)
        .bind(property.property_type.as_str())
        .bind(property.year_built)
        .bind(property.lot_size)
        .bind(property.parking_spaces)
        .bind(property.garage_size)
        .bind(&property.amenities)
        .bind(property.hoa_fee)
        .bind(property.active)
        .bind(property.created_at)
        .bind(property.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update(&self, property: &Property) -> Result<()> {
        sqlx::query(
            "UPDATE properties SET street = $2, district = $3, city = $4, province = $5, \
             country = $6, postal_code = $7, latitude = $8, longitude = $9, property_type = $10, \
             year_built = $11, lot_size = $12, parking_spaces = $13, garage_size = $14, \
             amenities = $15, hoa_fee = $16, active = $17, updated_at = $18 \
             WHERE id = $1",
        )
        .bind(property.id.to_uuid())
        .bind(&property.address.street)
        .bind(&property.address.district)
        .bind(&property.address.city)
        .bind(&property.address.province)
        .bind(&property.address.country)
        .bind(&property.address.postal_code)
        .bind(property.address.latitude)
        .bind(property.address.longitude)
        .bind(property.property_type.as_str())
        .bind(property.year_built)
        .bind(property.lot_size)
        .bind(property.parking_spaces)
        .bind(property.garage_size)
        .bind(&property.amenities)
        .bind(property.hoa_fee)
        .bind(property.active)
        .bind(property.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_by_id(&self, id: PropertyId) -> Result<Option<Property>> {
        let row: Option<PropertyRow> = sqlx::query_as(&format!(
            "SELECT {PROPERTY_COLUMNS} FROM properties WHERE active = TRUE AND id = $1"
        ))
        .bind(id.to_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Property::try_from).transpose()
    }

    async fn list(&self, page: &PageRequest) -> Result<Vec<Property>> {
        let rows: Vec<PropertyRow> = sqlx::query_as(&format!(
            "SELECT {PROPERTY_COLUMNS} FROM properties WHERE active = TRUE \
             ORDER BY created_at DESC LIMIT $1 OFFSET $2"
        ))
        .bind(page.effective_size())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Property::try_from).collect()
    }

    async fn find_ids_in_box(
        &self,
        lat_min: f64,
        lat_max: f64,
        lon_min: f64,
        lon_max: f64,
    ) -> Result<Vec<PropertyId>> {
        let ids: Vec<Uuid> = sqlx::query_scalar(
            "SELECT id FROM properties WHERE active = TRUE \
             AND latitude >= $1 AND latitude <= $2 \
             AND longitude >= $3 AND longitude <= $4",
        )
        .bind(lat_min)
        .bind(lat_max)
        .bind(lon_min)
        .bind(lon_max)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids.into_iter().map(PropertyId).collect())
    }

    async fn find_ids_matching(
        &self,
        city: Option<String>,
        district: Option<String>,
        property_type: Option<PropertyType>,
    ) -> Result<Vec<PropertyId>> {
        let mut builder = QueryBuilder::new("SELECT id FROM properties WHERE active = TRUE");
        if let Some(city) = city {
            builder.push(" AND city = ");
            builder.push_bind(city);
        }
        if let Some(district) = district {
            builder.push(" AND district = ");
            builder.push_bind(district);
        }
        if let Some(property_type) = property_type {
            builder.push(" AND property_type = ");
            builder.push_bind(property_type.as_str());
        }

        let ids: Vec<Uuid> = builder.build_query_scalar().fetch_all(&self.pool).await?;
        Ok(ids.into_iter().map(PropertyId).collect())
    }

    async fn find_by_address_keyword(&self, keyword: &str) -> Result<Vec<Property>> {
        let pattern = format!("%{}%", keyword.trim());
        let rows: Vec<PropertyRow> = sqlx::query_as(&format!(
            "SELECT {PROPERTY_COLUMNS} FROM properties WHERE active = TRUE AND ( \
             street ILIKE $1 OR district ILIKE $1 OR city ILIKE $1 OR province ILIKE $1 \
             OR country ILIKE $1 OR postal_code ILIKE $1)"
        ))
        .bind(pattern)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Property::try_from).collect()
    }
}

/// In-process directory used when the listing service owns the property
/// store. Deployments that split the stores swap in a remote-backed
/// implementation of the same port.
#[async_trait]
impl PropertyDirectory for PostgresPropertyRepository {
    async fn find(&self, id: PropertyId) -> Result<Option<Property>> {
        PropertyStore::find_by_id(self, id).await
    }
}
