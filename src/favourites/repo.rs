use sqlx::PgPool;
use time::Date;
use uuid::Uuid;

use super::content_key::ContentKey;
use super::dto::UpsertFavouriteRequest;
use super::repo_types::{Favourite, FavouriteRow};

const COLUMNS: &str = "id, user_id, source, local_id, name, image, description, nutrition, \
                       mood, last_bite_date, location, created_at";

fn into_favourite(row: FavouriteRow) -> anyhow::Result<Favourite> {
    Ok(Favourite::try_from(row)?)
}

impl Favourite {
    pub async fn list_by_user(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<Favourite>> {
        let rows = sqlx::query_as::<_, FavouriteRow>(&format!(
            r#"
            SELECT {COLUMNS}
            FROM favourites
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#
        ))
        .bind(user_id)
        .fetch_all(db)
        .await?;
        rows.into_iter().map(into_favourite).collect()
    }

    /// Insert, or refresh the stored fields when the owner already has this key.
    pub async fn upsert(
        db: &PgPool,
        user_id: Uuid,
        req: &UpsertFavouriteRequest,
    ) -> anyhow::Result<Favourite> {
        let row = sqlx::query_as::<_, FavouriteRow>(&format!(
            r#"
            INSERT INTO favourites (user_id, source, local_id, name, image, description, nutrition, mood)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (user_id, source, local_id) DO UPDATE
            SET name = EXCLUDED.name,
                image = EXCLUDED.image,
                description = EXCLUDED.description,
                nutrition = EXCLUDED.nutrition,
                mood = EXCLUDED.mood
            RETURNING {COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(req.key.source.as_str())
        .bind(req.key.local_id)
        .bind(&req.name)
        .bind(&req.image)
        .bind(&req.description)
        .bind(&req.nutrition)
        .bind(&req.mood)
        .fetch_one(db)
        .await?;
        into_favourite(row)
    }

    /// Returns whether a row was removed.
    pub async fn delete(db: &PgPool, user_id: Uuid, key: ContentKey) -> anyhow::Result<bool> {
        let res = sqlx::query(
            r#"
            DELETE FROM favourites
            WHERE user_id = $1 AND source = $2 AND local_id = $3
            "#,
        )
        .bind(user_id)
        .bind(key.source.as_str())
        .bind(key.local_id)
        .execute(db)
        .await?;
        Ok(res.rows_affected() > 0)
    }

    pub async fn set_last_bite(
        db: &PgPool,
        user_id: Uuid,
        key: ContentKey,
        date: Date,
        location: Option<&str>,
    ) -> anyhow::Result<Option<Favourite>> {
        let row = sqlx::query_as::<_, FavouriteRow>(&format!(
            r#"
            UPDATE favourites
            SET last_bite_date = $4, location = $5
            WHERE user_id = $1 AND source = $2 AND local_id = $3
            RETURNING {COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(key.source.as_str())
        .bind(key.local_id)
        .bind(date)
        .bind(location)
        .fetch_optional(db)
        .await?;
        row.map(into_favourite).transpose()
    }
}
