use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::types::{DetailsResponse, NearbyQuery, NearbyResponse, PlaceDetails, PlaceSummary};

const DETAIL_FIELDS: &str = "name,rating,formatted_phone_number,formatted_address,opening_hours,photos,reviews,price_level";

#[derive(Debug, thiserror::Error)]
pub enum PlacesError {
    #[error("places transport error: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("places upstream status {status}{}", .message.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
    Status {
        status: String,
        message: Option<String>,
    },
    #[error("places response decode error: {0}")]
    Decode(#[source] reqwest::Error),
    #[error("place {0} returned no details")]
    MissingResult(String),
}

/// Place search, detail lookup and photo URL construction.
#[async_trait]
pub trait PlacesClient: Send + Sync {
    async fn nearby_search(&self, query: &NearbyQuery) -> Result<Vec<PlaceSummary>, PlacesError>;
    async fn place_details(&self, place_id: &str) -> Result<PlaceDetails, PlacesError>;
    fn photo_url(&self, photo_reference: &str, max_width: u32) -> String;
}

fn check_status(status: &str, message: Option<String>) -> Result<(), PlacesError> {
    match status {
        "OK" | "ZERO_RESULTS" => Ok(()),
        other => Err(PlacesError::Status {
            status: other.to_string(),
            message,
        }),
    }
}

/// Google Places web service client.
#[derive(Clone)]
pub struct GooglePlacesClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl GooglePlacesClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl PlacesClient for GooglePlacesClient {
    async fn nearby_search(&self, query: &NearbyQuery) -> Result<Vec<PlaceSummary>, PlacesError> {
        let url = format!("{}/nearbysearch/json", self.base_url);
        let location = format!("{},{}", query.location.lat, query.location.lng);
        let radius = query.radius_m.to_string();
        let res = self
            .http
            .get(url)
            .query(&[
                ("location", location.as_str()),
                ("radius", radius.as_str()),
                ("type", query.place_type.as_str()),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(PlacesError::Transport)?;

        let body = res
            .json::<NearbyResponse>()
            .await
            .map_err(PlacesError::Decode)?;
        check_status(&body.status, body.error_message)?;
        debug!(count = body.results.len(), "nearby search");
        Ok(body.results)
    }

    async fn place_details(&self, place_id: &str) -> Result<PlaceDetails, PlacesError> {
        let url = format!("{}/details/json", self.base_url);
        let res = self
            .http
            .get(url)
            .query(&[
                ("place_id", place_id),
                ("fields", DETAIL_FIELDS),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(PlacesError::Transport)?;

        let body = res
            .json::<DetailsResponse>()
            .await
            .map_err(PlacesError::Decode)?;
        check_status(&body.status, body.error_message)?;
        body.result
            .ok_or_else(|| PlacesError::MissingResult(place_id.to_string()))
    }

    fn photo_url(&self, photo_reference: &str, max_width: u32) -> String {
        format!(
            "{}/photo?maxwidth={}&photo_reference={}&key={}",
            self.base_url, max_width, photo_reference, self.api_key
        )
    }
}
