use std::sync::Arc;

use tracing::debug;

use propex_model::PropertyId;

use crate::Result;
use crate::ports::PropertyStore;

/// Kilometers per degree of latitude; the same constant is applied to
/// longitude after the cosine correction.
pub const KM_PER_DEGREE: f64 = 111.12;

/// Latitude magnitude beyond which the cosine correction is pinned. At the
/// poles `cos(lat)` reaches zero and the longitude span would be infinite;
/// clamping keeps the box finite and merely widens the over-approximation.
const MAX_COS_LATITUDE: f64 = 89.9;

/// Axis-aligned rectangle over-approximating a circular search radius.
///
/// Results drawn from the box are a candidate set: points near the corners
/// may lie outside the true circle. Callers needing an exact radius must
/// add a distance check on top.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub lat_min: f64,
    pub lat_max: f64,
    pub lon_min: f64,
    pub lon_max: f64,
}

impl BoundingBox {
    pub fn around(latitude: f64, longitude: f64, radius_km: f64) -> Self {
        let degree_delta = radius_km / KM_PER_DEGREE;

        let cos_lat = latitude
            .clamp(-MAX_COS_LATITUDE, MAX_COS_LATITUDE)
            .to_radians()
            .cos();
        let lon_delta = degree_delta / cos_lat;

        BoundingBox {
            lat_min: (latitude - degree_delta).max(-90.0),
            lat_max: (latitude + degree_delta).min(90.0),
            lon_min: (longitude - lon_delta).max(-180.0),
            lon_max: (longitude + lon_delta).min(180.0),
        }
    }

    /// Inclusive on all four edges.
    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        latitude >= self.lat_min
            && latitude <= self.lat_max
            && longitude >= self.lon_min
            && longitude <= self.lon_max
    }
}

/// Resolves a center point and radius to the candidate property ids inside
/// the bounding box.
#[derive(Clone)]
pub struct GeoLocator {
    properties: Arc<dyn PropertyStore>,
}

impl std::fmt::Debug for GeoLocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeoLocator").finish()
    }
}

impl GeoLocator {
    pub fn new(properties: Arc<dyn PropertyStore>) -> Self {
        Self { properties }
    }

    pub async fn candidate_ids(
        &self,
        latitude: f64,
        longitude: f64,
        radius_km: f64,
    ) -> Result<Vec<PropertyId>> {
        let bbox = BoundingBox::around(latitude, longitude, radius_km);
        debug!(
            lat_min = bbox.lat_min,
            lat_max = bbox.lat_max,
            lon_min = bbox.lon_min,
            lon_max = bbox.lon_max,
            "resolving location candidates"
        );
        self.properties
            .find_ids_in_box(bbox.lat_min, bbox.lat_max, bbox.lon_min, bbox.lon_max)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lon_delta_equals_lat_delta_at_equator() {
        let bbox = BoundingBox::around(0.0, 106.0, 111.12);
        assert!((bbox.lat_max - 1.0).abs() < 1e-9);
        assert!((bbox.lat_min + 1.0).abs() < 1e-9);
        assert!((bbox.lon_max - 107.0).abs() < 1e-9);
        assert!((bbox.lon_min - 105.0).abs() < 1e-9);
    }

    #[test]
    fn edges_are_inclusive() {
        let bbox = BoundingBox::around(0.0, 0.0, 111.12);
        assert!(bbox.contains(1.0, 0.0));
        assert!(bbox.contains(-1.0, 1.0));
        assert!(!bbox.contains(1.0000001, 0.0));
    }

    #[test]
    fn lon_span_widens_away_from_equator() {
        let equator = BoundingBox::around(0.0, 0.0, 10.0);
        let northern = BoundingBox::around(60.0, 0.0, 10.0);
        let equator_span = equator.lon_max - equator.lon_min;
        let northern_span = northern.lon_max - northern.lon_min;
        assert!(northern_span > equator_span * 1.9);
    }

    #[test]
    fn polar_latitudes_produce_finite_clamped_bounds() {
        let bbox = BoundingBox::around(90.0, 10.0, 5.0);
        assert!(bbox.lon_min.is_finite());
        assert!(bbox.lon_max.is_finite());
        assert!(bbox.lat_max <= 90.0);
        assert!(bbox.lon_min >= -180.0);
        assert!(bbox.lon_max <= 180.0);
    }

    #[test]
    fn one_km_box_keeps_nearby_point_and_drops_distant_center() {
        // Property at (10.0, 106.0); a 1 km search at the same point must
        // cover it, the same search ~50 km east must not.
        let near = BoundingBox::around(10.0, 106.0, 1.0);
        assert!(near.contains(10.0, 106.0));

        let far = BoundingBox::around(10.0, 106.45, 1.0);
        assert!(!far.contains(10.0, 106.0));
    }
}
