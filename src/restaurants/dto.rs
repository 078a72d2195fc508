use serde::{Deserialize, Serialize};

use crate::places::types::{LatLng, Review};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Restaurant {
    pub id: i64,
    pub name: String,
    pub cuisine: String,
    pub rating: f64,
    /// Kilometres from the caller, two decimals.
    pub distance: f64,
    pub is_open: bool,
    pub image: String,
    pub address: String,
    pub phone: String,
    pub coordinates: LatLng,
    pub price_level: u8,
    pub special_dish: String,
    pub photos: Vec<String>,
    pub reviews: Vec<Review>,
    pub opening_hours: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct NearbyParams {
    pub lat: f64,
    pub lng: f64,
}
