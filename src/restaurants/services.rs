use tracing::{debug, info, instrument, warn};

use super::cuisine::Cuisine;
use super::dto::Restaurant;
use super::fallback::FallbackSource;
use super::geo::{distance_km, round2};
use crate::config::PlacesConfig;
use crate::places::types::{LatLng, NearbyQuery, PlaceDetails, PlaceSummary};
use crate::places::{PlacesClient, PlacesError};
use crate::session::ports::Clock;

pub const EXCLUDED_TYPES: &[&str] = &["lodging", "hotel", "motel", "campground", "rv_park"];
const SEARCH_TYPE: &str = "restaurant";
const NO_ADDRESS: &str = "Address not available";
const NO_PHONE: &str = "Phone not available";
/// Upstream scale is 0 (free) to 4; 0 carries no price signal and is
/// replaced by a fallback like a missing value.
const PRICED_LEVELS: std::ops::RangeInclusive<u8> = 1..=4;

#[derive(Debug, thiserror::Error)]
pub enum AggregateError {
    #[error("nearby search failed: {0}")]
    Search(#[from] PlacesError),
}

#[derive(Debug, Clone, Copy)]
pub struct AggregationSettings {
    pub radius_m: u32,
    pub max_results: usize,
    pub photo_max_width: u32,
}

impl From<&PlacesConfig> for AggregationSettings {
    fn from(cfg: &PlacesConfig) -> Self {
        Self {
            radius_m: cfg.radius_m,
            max_results: cfg.max_results,
            photo_max_width: cfg.photo_max_width,
        }
    }
}

pub fn is_excluded(types: &[String]) -> bool {
    types.iter().any(|t| EXCLUDED_TYPES.contains(&t.as_str()))
}

/// Stable numeric id for a place: 31-multiplier hash over UTF-16 units,
/// wrapping at 32 bits, made non-negative.
pub fn place_hash_id(place_id: &str) -> i64 {
    let hash = place_id.encode_utf16().fold(0i32, |h, unit| {
        h.wrapping_shl(5).wrapping_sub(h).wrapping_add(i32::from(unit))
    });
    i64::from(hash).abs()
}

/// Turns a coordinate into a normalized restaurant list.
pub struct RestaurantAggregator<'a> {
    pub places: &'a dyn PlacesClient,
    pub fallback: &'a dyn FallbackSource,
    pub clock: &'a dyn Clock,
    pub settings: AggregationSettings,
}

impl RestaurantAggregator<'_> {
    /// Details are fetched one place at a time, in search order. A failed
    /// lookup degrades that entry; only a failed search fails the batch.
    #[instrument(skip(self))]
    pub async fn aggregate(&self, origin: LatLng) -> Result<Vec<Restaurant>, AggregateError> {
        let query = NearbyQuery {
            location: origin,
            radius_m: self.settings.radius_m,
            place_type: SEARCH_TYPE.to_string(),
        };
        let results = self.places.nearby_search(&query).await?;
        let total = results.len();

        let candidates: Vec<PlaceSummary> = results
            .into_iter()
            .filter(|p| !is_excluded(&p.types))
            .take(self.settings.max_results)
            .collect();
        debug!(total, kept = candidates.len(), "nearby results filtered");

        let mut restaurants = Vec::with_capacity(candidates.len());
        let mut degraded = 0usize;
        for place in &candidates {
            let restaurant = if place.place_id.is_empty() {
                degraded += 1;
                self.from_summary(place, origin)
            } else {
                match self.places.place_details(&place.place_id).await {
                    Ok(details) => self.from_details(place, details, origin),
                    Err(e) => {
                        warn!(error = %e, place_id = %place.place_id, "place enrichment failed");
                        degraded += 1;
                        self.from_summary(place, origin)
                    }
                }
            };
            restaurants.push(restaurant);
        }

        info!(count = restaurants.len(), degraded, "restaurants aggregated");
        Ok(restaurants)
    }

    fn id_for(&self, place: &PlaceSummary) -> i64 {
        if place.place_id.is_empty() {
            self.clock.now_millis()
        } else {
            place_hash_id(&place.place_id)
        }
    }

    fn from_details(&self, place: &PlaceSummary, details: PlaceDetails, origin: LatLng) -> Restaurant {
        let cuisine = Cuisine::infer(&place.name, &place.types);
        let photos: Vec<String> = details
            .photos
            .iter()
            .map(|p| self.places.photo_url(&p.photo_reference, self.settings.photo_max_width))
            .collect();
        let hours = details.opening_hours.unwrap_or_default();
        let is_open = hours
            .open_now
            .or_else(|| place.opening_hours.as_ref().and_then(|h| h.open_now))
            .unwrap_or(false);
        let image = photos
            .first()
            .cloned()
            .unwrap_or_else(|| self.fallback.stock_image());

        Restaurant {
            id: self.id_for(place),
            name: details.name.unwrap_or_else(|| place.name.clone()),
            cuisine: cuisine.label().to_string(),
            rating: details
                .rating
                .or(place.rating)
                .unwrap_or_else(|| self.fallback.rating()),
            distance: self.distance(origin, place),
            is_open,
            image,
            address: details
                .formatted_address
                .or_else(|| place.vicinity.clone())
                .unwrap_or_else(|| NO_ADDRESS.to_string()),
            phone: details
                .formatted_phone_number
                .unwrap_or_else(|| NO_PHONE.to_string()),
            coordinates: place.geometry.location,
            price_level: details
                .price_level
                .or(place.price_level)
                .filter(|p| PRICED_LEVELS.contains(p))
                .unwrap_or_else(|| self.fallback.price_level()),
            special_dish: self.fallback.special_dish(cuisine),
            photos,
            reviews: details.reviews,
            opening_hours: hours.weekday_text,
        }
    }

    fn from_summary(&self, place: &PlaceSummary, origin: LatLng) -> Restaurant {
        let cuisine = Cuisine::infer(&place.name, &place.types);
        let image = place
            .photos
            .first()
            .map(|p| self.places.photo_url(&p.photo_reference, self.settings.photo_max_width))
            .unwrap_or_else(|| self.fallback.stock_image());

        Restaurant {
            id: self.id_for(place),
            name: place.name.clone(),
            cuisine: cuisine.label().to_string(),
            rating: place.rating.unwrap_or_else(|| self.fallback.rating()),
            distance: self.distance(origin, place),
            is_open: place
                .opening_hours
                .as_ref()
                .and_then(|h| h.open_now)
                .unwrap_or(false),
            image,
            address: place
                .vicinity
                .clone()
                .unwrap_or_else(|| NO_ADDRESS.to_string()),
            phone: NO_PHONE.to_string(),
            coordinates: place.geometry.location,
            price_level: place
                .price_level
                .filter(|p| PRICED_LEVELS.contains(p))
                .unwrap_or_else(|| self.fallback.price_level()),
            special_dish: self.fallback.special_dish(cuisine),
            photos: Vec::new(),
            reviews: Vec::new(),
            opening_hours: Vec::new(),
        }
    }

    fn distance(&self, origin: LatLng, place: &PlaceSummary) -> f64 {
        let loc = place.geometry.location;
        round2(distance_km(origin.lat, origin.lng, loc.lat, loc.lng))
    }
}
