use serde::Deserialize;
use time::Date;

use super::content_key::ContentKey;

// Calendar dates travel as `YYYY-MM-DD`.
time::serde::format_description!(pub(crate) iso_date, Date, "[year]-[month]-[day]");

#[derive(Debug, Clone, Deserialize)]
pub struct UpsertFavouriteRequest {
    pub key: ContentKey,
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub nutrition: Option<serde_json::Value>,
    #[serde(default)]
    pub mood: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LastBiteRequest {
    #[serde(with = "iso_date")]
    pub date: Date,
    #[serde(default)]
    pub location: Option<String>,
}
