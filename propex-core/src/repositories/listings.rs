use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use propex_model::{Listing, ListingId, ListingSearchCriteria, PageRequest, PropertyId};

use crate::Result;
use crate::ports::ListingStore;

const LISTING_COLUMNS: &str = "id, property_id, name, description, price, listing_type, \
     agent_id, agent_name, agent_phone, agent_email, bedrooms, bathrooms, area, \
     image_urls, featured_image_url, active, sold, created_at, updated_at";

#[derive(Clone, Debug)]
pub struct PostgresListingRepository {
    pool: PgPool,
}

#[derive(Debug, sqlx::FromRow)]
struct ListingRow {
    id: Uuid,
    property_id: Option<Uuid>,
    name: String,
    description: String,
    price: f64,
    listing_type: String,
    agent_id: Option<String>,
    agent_name: Option<String>,
    agent_phone: Option<String>,
    agent_email: Option<String>,
    bedrooms: i32,
    bathrooms: i32,
    area: f64,
    image_urls: Vec<String>,
    featured_image_url: Option<String>,
    active: bool,
    sold: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ListingRow> for Listing {
    type Error = crate::CoreError;

    fn try_from(row: ListingRow) -> Result<Listing> {
        Ok(Listing {
            id: ListingId(row.id),
            property_id: row.property_id.map(PropertyId),
            name: row.name,
            description: row.description,
            price: row.price,
            listing_type: row.listing_type.parse()?,
            agent_id: row.agent_id,
            agent_name: row.agent_name,
            agent_phone: row.agent_phone,
            agent_email: row.agent_email,
            bedrooms: row.bedrooms,
            bathrooms: row.bathrooms,
            area: row.area,
            image_urls: row.image_urls,
            featured_image_url: row.featured_image_url,
            active: row.active,
            sold: row.sold,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl PostgresListingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Appends the criteria filters to a statement that already carries a
    /// `WHERE active = TRUE` clause. Shared by `search` and `count` so the
    /// two can never disagree.
    fn push_filters(
        builder: &mut QueryBuilder<'_, Postgres>,
        criteria: &ListingSearchCriteria,
        property_ids: Option<Vec<PropertyId>>,
    ) {
        if let Some(listing_type) = criteria.listing_type {
            builder.push(" AND listing_type = ");
            builder.push_bind(listing_type.as_str());
        }
        if let Some(agent_id) = &criteria.agent_id {
            builder.push(" AND agent_id = ");
            builder.push_bind(agent_id.clone());
        }

        push_range(builder, "price", criteria.min_price, criteria.max_price);
        push_range(
            builder,
            "bedrooms",
            criteria.min_bedrooms,
            criteria.max_bedrooms,
        );
        push_range(builder, "area", criteria.min_area, criteria.max_area);

        if let Some(ids) = property_ids {
            builder.push(" AND property_id = ANY(");
            builder.push_bind(to_uuids(&ids));
            builder.push(")");
        }
    }
}

#[async_trait]
impl ListingStore for PostgresListingRepository {
    async fn insert(&self, listing: &Listing) -> Result<()> {
        sqlx::query(
            "INSERT INTO listings (id, property_id, name, description, price, listing_type, \
             agent_id, agent_name, agent_phone, agent_email, bedrooms, bathrooms, area, \
             image_urls, featured_image_url, active, sold, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)",
        )
        .bind(listing.id.to_uuid())
        .bind(listing.property_id.map(|id| id.to_uuid()))
        .bind(&listing.name)
        .bind(&listing.description)
        .bind(listing.price)
        .bind(listing.listing_type.as_str())
        .bind(&listing.agent_id)
        .bind(&listing.agent_name)
        .bind(&listing.agent_phone)
        .bind(&listing.agent_email)
        .bind(listing.bedrooms)
        .bind(listing.bathrooms)
        .bind(listing.area)
        .bind(&listing.image_urls)
        .bind(&listing.featured_image_url)
        .bind(listing.active)
        .bind(listing.sold)
        .bind(listing.created_at)
        .bind(listing.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update(&self, listing: &Listing) -> Result<()> {
        sqlx::query(
            "UPDATE listings SET property_id = $2, name = $3, description = $4, price = $5, \
             listing_type = $6, agent_id = $7, agent_name = $8, agent_phone = $9, \
             agent_email = $10, bedrooms = $11, bathrooms = $12, area = $13, image_urls = $14, \
             featured_image_url = $15, active = $16, sold = $17, updated_at = $18 \
             WHERE id = $1",
        )
        .bind(listing.id.to_uuid())
        .bind(listing.property_id.map(|id| id.to_uuid()))
        .bind(&listing.name)
        .bind(&listing.description)
        .bind(listing.price)
        .bind(listing.listing_type.as_str())
        .bind(&listing.agent_id)
        .bind(&listing.agent_name)
        .bind(&listing.agent_phone)
        .bind(&listing.agent_email)
        .bind(listing.bedrooms)
        .bind(listing.bathrooms)
        .bind(listing.area)
        .bind(&listing.image_urls)
        .bind(&listing.featured_image_url)
        .bind(listing.active)
        .bind(listing.sold)
        .bind(listing.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_by_id(&self, id: ListingId) -> Result<Option<Listing>> {
        let row: Option<ListingRow> = sqlx::query_as(&format!(
            "SELECT {LISTING_COLUMNS} FROM listings WHERE active = TRUE AND id = $1"
        ))
        .bind(id.to_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Listing::try_from).transpose()
    }

    async fn search(
        &self,
        criteria: &ListingSearchCriteria,
        property_ids: Option<Vec<PropertyId>>,
    ) -> Result<Vec<Listing>> {
        let mut builder = QueryBuilder::new(format!(
            "SELECT {LISTING_COLUMNS} FROM listings WHERE active = TRUE"
        ));
        Self::push_filters(&mut builder, criteria, property_ids);

        builder.push(" ORDER BY ");
        builder.push(criteria.page.sort_column());
        builder.push(" ");
        builder.push(criteria.page.direction().as_sql());
        builder.push(" LIMIT ");
        builder.push_bind(criteria.page.effective_size());
        builder.push(" OFFSET ");
        builder.push_bind(criteria.page.offset());

        let rows: Vec<ListingRow> = builder.build_query_as().fetch_all(&self.pool).await?;
        rows.into_iter().map(Listing::try_from).collect()
    }

    async fn count(
        &self,
        criteria: &ListingSearchCriteria,
        property_ids: Option<Vec<PropertyId>>,
    ) -> Result<i64> {
        let mut builder =
            QueryBuilder::new("SELECT COUNT(*) FROM listings WHERE active = TRUE");
        Self::push_filters(&mut builder, criteria, property_ids);

        let count: i64 = builder.build_query_scalar().fetch_one(&self.pool).await?;
        Ok(count)
    }

    async fn find_by_property_ids(&self, ids: Vec<PropertyId>) -> Result<Vec<Listing>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows: Vec<ListingRow> = sqlx::query_as(&format!(
            "SELECT {LISTING_COLUMNS} FROM listings \
             WHERE active = TRUE AND property_id = ANY($1) ORDER BY created_at DESC"
        ))
        .bind(to_uuids(&ids))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Listing::try_from).collect()
    }

    async fn find_by_agent(&self, agent_id: &str, page: &PageRequest) -> Result<Vec<Listing>> {
        let rows: Vec<ListingRow> = sqlx::query_as(&format!(
            "SELECT {LISTING_COLUMNS} FROM listings \
             WHERE active = TRUE AND agent_id = $1 \
             ORDER BY created_at DESC LIMIT $2 OFFSET $3"
        ))
        .bind(agent_id)
        .bind(page.effective_size())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Listing::try_from).collect()
    }
}

fn to_uuids(ids: &[PropertyId]) -> Vec<Uuid> {
    ids.iter().map(|id| id.to_uuid()).collect()
}

/// The uniform min/max rule: both bounds inclusive-between, one bound
/// one-sided, neither unconstrained.
fn push_range<'args, T>(
    builder: &mut QueryBuilder<'args, Postgres>,
    column: &str,
    min: Option<T>,
    max: Option<T>,
) where
    T: sqlx::Encode<'args, Postgres> + sqlx::Type<Postgres> + Send + 'args,
{
    match (min, max) {
        (Some(min), Some(max)) => {
            builder.push(format!(" AND {column} BETWEEN "));
            builder.push_bind(min);
            builder.push(" AND ");
            builder.push_bind(max);
        }
        (Some(min), None) => {
            builder.push(format!(" AND {column} >= "));
            builder.push_bind(min);
        }
        (None, Some(max)) => {
            builder.push(format!(" AND {column} <= "));
            builder.push_bind(max);
        }
        (None, None) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use propex_model::ListingType;

    fn rendered_search_sql(criteria: &ListingSearchCriteria) -> String {
        let mut builder = QueryBuilder::new("SELECT 1 FROM listings WHERE active = TRUE");
        PostgresListingRepository::push_filters(&mut builder, criteria, None);
        builder.sql().to_string()
    }

    #[test]
    fn both_bounds_render_an_inclusive_between() {
        let criteria = ListingSearchCriteria {
            min_price: Some(100.0),
            max_price: Some(500.0),
            ..Default::default()
        };
        let sql = rendered_search_sql(&criteria);
        assert!(sql.contains("price BETWEEN $1 AND $2"), "got: {sql}");
    }

    #[test]
    fn single_bounds_render_one_sided_comparisons() {
        let min_only = ListingSearchCriteria {
            min_bedrooms: Some(2),
            ..Default::default()
        };
        assert!(rendered_search_sql(&min_only).contains("bedrooms >= $1"));

        let max_only = ListingSearchCriteria {
            max_area: Some(120.0),
            ..Default::default()
        };
        assert!(rendered_search_sql(&max_only).contains("area <= $1"));
    }

    #[test]
    fn absent_bounds_add_no_constraint() {
        let sql = rendered_search_sql(&ListingSearchCriteria::default());
        assert_eq!(sql, "SELECT 1 FROM listings WHERE active = TRUE");
    }

    #[test]
    fn enum_and_membership_filters_compose() {
        let criteria = ListingSearchCriteria {
            listing_type: Some(ListingType::Rent),
            ..Default::default()
        };
        let mut builder = QueryBuilder::new("SELECT 1 FROM listings WHERE active = TRUE");
        PostgresListingRepository::push_filters(
            &mut builder,
            &criteria,
            Some(vec![PropertyId::new()]),
        );
        let sql = builder.sql();
        assert!(sql.contains("listing_type = $1"));
        assert!(sql.contains("property_id = ANY($2)"));
    }
}
