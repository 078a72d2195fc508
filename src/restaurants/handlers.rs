use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{error, instrument, warn};

use super::dto::{NearbyParams, Restaurant};
use super::geo::is_valid_coordinate;
use super::services::{AggregationSettings, RestaurantAggregator};
use crate::{places::types::LatLng, session::ports::SystemClock, state::AppState};

pub const LOAD_FAILED: &str = "Failed to load map";

pub fn restaurant_routes() -> Router<AppState> {
    Router::new().route("/restaurants/nearby", get(nearby_restaurants))
}

#[instrument(skip(state))]
pub async fn nearby_restaurants(
    State(state): State<AppState>,
    Query(params): Query<NearbyParams>,
) -> Result<Json<Vec<Restaurant>>, (StatusCode, String)> {
    if !is_valid_coordinate(params.lat, params.lng) {
        warn!(lat = params.lat, lng = params.lng, "invalid coordinates");
        return Err((StatusCode::BAD_REQUEST, "Invalid coordinates".into()));
    }

    let aggregator = RestaurantAggregator {
        places: state.places.as_ref(),
        fallback: state.fallback.as_ref(),
        clock: &SystemClock,
        settings: AggregationSettings::from(&state.config.places),
    };
    let origin = LatLng {
        lat: params.lat,
        lng: params.lng,
    };

    aggregator.aggregate(origin).await.map(Json).map_err(|e| {
        error!(error = %e, "restaurant aggregation failed");
        (StatusCode::BAD_GATEWAY, LOAD_FAILED.to_string())
    })
}
