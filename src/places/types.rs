use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Geometry {
    pub location: LatLng,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OpeningHours {
    #[serde(default)]
    pub open_now: Option<bool>,
    #[serde(default)]
    pub weekday_text: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PhotoRef {
    pub photo_reference: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    #[serde(default)]
    pub author_name: String,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub relative_time_description: Option<String>,
}

/// One nearby-search hit.
#[derive(Debug, Clone, Deserialize)]
pub struct PlaceSummary {
    #[serde(default)]
    pub place_id: String,
    pub name: String,
    #[serde(default)]
    pub types: Vec<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub price_level: Option<u8>,
    pub geometry: Geometry,
    #[serde(default)]
    pub vicinity: Option<String>,
    #[serde(default)]
    pub opening_hours: Option<OpeningHours>,
    #[serde(default)]
    pub photos: Vec<PhotoRef>,
}

/// Detail lookup result for a single place.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlaceDetails {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub price_level: Option<u8>,
    #[serde(default)]
    pub formatted_address: Option<String>,
    #[serde(default)]
    pub formatted_phone_number: Option<String>,
    #[serde(default)]
    pub opening_hours: Option<OpeningHours>,
    #[serde(default)]
    pub photos: Vec<PhotoRef>,
    #[serde(default)]
    pub reviews: Vec<Review>,
}

#[derive(Debug, Clone)]
pub struct NearbyQuery {
    pub location: LatLng,
    pub radius_m: u32,
    pub place_type: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct NearbyResponse {
    pub status: String,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub results: Vec<PlaceSummary>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DetailsResponse {
    pub status: String,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub result: Option<PlaceDetails>,
}
