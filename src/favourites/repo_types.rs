use serde::Serialize;
use sqlx::FromRow;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use super::content_key::{ContentKey, ContentKeyError};
use super::dto::iso_date;

/// Row shape of the `favourites` table.
#[derive(Debug, Clone, FromRow)]
pub struct FavouriteRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub source: String,
    pub local_id: i64,
    pub name: String,
    pub image: Option<String>,
    pub description: Option<String>,
    pub nutrition: Option<serde_json::Value>,
    pub mood: Option<String>,
    pub last_bite_date: Option<Date>,
    pub location: Option<String>,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Favourite {
    pub id: Uuid,
    pub key: ContentKey,
    pub name: String,
    pub image: Option<String>,
    pub description: Option<String>,
    pub nutrition: Option<serde_json::Value>,
    pub mood: Option<String>,
    #[serde(with = "iso_date::option")]
    pub last_bite_date: Option<Date>,
    pub location: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl TryFrom<FavouriteRow> for Favourite {
    type Error = ContentKeyError;

    fn try_from(row: FavouriteRow) -> Result<Self, Self::Error> {
        Ok(Favourite {
            id: row.id,
            key: ContentKey::new(row.source.parse()?, row.local_id),
            name: row.name,
            image: row.image,
            description: row.description,
            nutrition: row.nutrition,
            mood: row.mood,
            last_bite_date: row.last_bite_date,
            location: row.location,
            created_at: row.created_at,
        })
    }
}
