use async_trait::async_trait;
use sqlx::{postgres::PgRow, types::Json, PgPool, Row};

use crate::{
    domain::{
        errors::{PersistenceError, PersistenceResult},
        models::{
            Features, ImageRecord, Listing, ListingField, ListingFields, ListingImageRow,
            ListingUpdate, NewImageRecord, NewListing, StoredImage,
        },
        value_objects::{ListingId, StorageKey},
    },
    ports::repositories::ListingRepository,
};

/// SQL-based implementation of ListingRepository using PostgreSQL
#[derive(Clone)]
pub struct SqlListingRepository {
    pool: PgPool,
}

const LISTING_WITH_IMAGES: &str = r#"
    SELECT l.*, i.id AS "imageId", i."imageUrl", i."storageId"
    FROM "carListing" l
    LEFT JOIN "carImages" i ON i."carListingId" = l.id
"#;

impl SqlListingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Initialize database tables
    pub async fn migrate(&self) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS "carListing" (
                id BIGSERIAL PRIMARY KEY,
                "listingTitle" VARCHAR NOT NULL,
                tagline VARCHAR,
                "originalPrice" VARCHAR,
                "sellingPrice" VARCHAR NOT NULL,
                category VARCHAR NOT NULL,
                make VARCHAR NOT NULL,
                model VARCHAR NOT NULL,
                condition VARCHAR NOT NULL,
                year VARCHAR NOT NULL,
                "driveType" VARCHAR NOT NULL,
                "fuelType" VARCHAR NOT NULL,
                transmission VARCHAR NOT NULL,
                color VARCHAR NOT NULL,
                mileage VARCHAR NOT NULL,
                "engineSize" VARCHAR,
                cylinder VARCHAR,
                door VARCHAR NOT NULL,
                vin VARCHAR,
                "offerType" VARCHAR,
                "listingDescription" TEXT NOT NULL,
                features JSONB,
                "createdBy" VARCHAR NOT NULL,
                "postedOn" DATE NOT NULL,
                "updatedBy" VARCHAR,
                "updatedOn" DATE
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS "carImages" (
                id BIGSERIAL PRIMARY KEY,
                "imageUrl" VARCHAR NOT NULL,
                "storageId" VARCHAR NOT NULL,
                "carListingId" BIGINT NOT NULL REFERENCES "carListing"(id)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"CREATE INDEX IF NOT EXISTS idx_car_listing_created_by ON "carListing"("createdBy")"#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"CREATE INDEX IF NOT EXISTS idx_car_images_listing ON "carImages"("carListingId")"#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

/// `"listingTitle", tagline, ...` in `ListingField::ALL` order
fn field_columns() -> String {
    ListingField::ALL
        .iter()
        .map(|field| format!("\"{}\"", field.column()))
        .collect::<Vec<_>>()
        .join(", ")
}

fn db_error(context: &str, e: sqlx::Error) -> PersistenceError {
    PersistenceError::DatabaseError {
        message: format!("{}: {}", context, e),
        source: Some(e.to_string()),
    }
}

fn corrupt(e: impl std::fmt::Display) -> PersistenceError {
    PersistenceError::CorruptRow {
        message: e.to_string(),
    }
}

fn listing_from_row(row: &PgRow) -> PersistenceResult<Listing> {
    let id = ListingId::new(row.try_get("id").map_err(corrupt)?).map_err(corrupt)?;

    let mut fields = ListingFields::new();
    for field in ListingField::ALL {
        let value: Option<String> = row.try_get(field.column()).map_err(corrupt)?;
        if let Some(value) = value {
            fields.set(field, value);
        }
    }

    let features: Option<Json<Features>> = row.try_get("features").map_err(corrupt)?;

    Ok(Listing {
        id,
        fields,
        features: features.map(|Json(features)| features).unwrap_or_default(),
        created_by: row.try_get("createdBy").map_err(corrupt)?,
        posted_on: row.try_get("postedOn").map_err(corrupt)?,
        updated_by: row.try_get("updatedBy").map_err(corrupt)?,
        updated_on: row.try_get("updatedOn").map_err(corrupt)?,
    })
}

fn joined_row(row: &PgRow) -> PersistenceResult<ListingImageRow> {
    let listing = listing_from_row(row)?;

    let image_id: Option<i64> = row.try_get("imageId").map_err(corrupt)?;
    let image = match image_id {
        Some(id) => {
            let storage_id: String = row.try_get("storageId").map_err(corrupt)?;
            Some(StoredImage {
                id,
                listing_id: listing.id,
                record: ImageRecord {
                    image_url: row.try_get("imageUrl").map_err(corrupt)?,
                    storage_id: StorageKey::new(storage_id).map_err(corrupt)?,
                },
            })
        }
        None => None,
    };

    Ok(ListingImageRow { listing, image })
}

#[async_trait]
impl ListingRepository for SqlListingRepository {
    async fn insert_listing(&self, listing: &NewListing) -> PersistenceResult<ListingId> {
        let field_count = ListingField::ALL.len();
        let placeholders = (1..=field_count + 3)
            .map(|n| format!("${}", n))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            r#"INSERT INTO "carListing" ({}, features, "createdBy", "postedOn") VALUES ({}) RETURNING id"#,
            field_columns(),
            placeholders
        );

        let mut query = sqlx::query(&sql);
        for field in ListingField::ALL {
            query = query.bind(listing.fields.get(field));
        }
        let row = query
            .bind(Json(&listing.features))
            .bind(&listing.created_by)
            .bind(listing.posted_on)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| db_error("Database error inserting listing", e))?;

        ListingId::new(row.try_get("id").map_err(corrupt)?).map_err(corrupt)
    }

    async fn update_listing(&self, id: ListingId, update: &ListingUpdate) -> PersistenceResult<()> {
        let assignments = ListingField::ALL
            .iter()
            .enumerate()
            .map(|(i, field)| format!("\"{}\" = ${}", field.column(), i + 1))
            .collect::<Vec<_>>()
            .join(", ");
        let n = ListingField::ALL.len();
        let sql = format!(
            r#"UPDATE "carListing" SET {}, features = ${}, "updatedBy" = ${}, "updatedOn" = ${} WHERE id = ${}"#,
            assignments,
            n + 1,
            n + 2,
            n + 3,
            n + 4
        );

        let mut query = sqlx::query(&sql);
        for field in ListingField::ALL {
            query = query.bind(update.fields.get(field));
        }
        let result = query
            .bind(Json(&update.features))
            .bind(&update.updated_by)
            .bind(update.updated_on)
            .bind(id.value())
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("Database error updating listing", e))?;

        if result.rows_affected() == 0 {
            return Err(PersistenceError::ListingNotFound { id });
        }

        Ok(())
    }

    async fn delete_images_for_listing(&self, id: ListingId) -> PersistenceResult<()> {
        sqlx::query(r#"DELETE FROM "carImages" WHERE "carListingId" = $1"#)
            .bind(id.value())
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("Database error deleting images", e))?;

        Ok(())
    }

    async fn insert_image_record(&self, image: &NewImageRecord) -> PersistenceResult<StoredImage> {
        let row = sqlx::query(
            r#"
            INSERT INTO "carImages" ("imageUrl", "storageId", "carListingId")
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(&image.image_url)
        .bind(image.storage_id.as_str())
        .bind(image.listing_id.value())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db) = &e {
                if db.is_foreign_key_violation() {
                    return PersistenceError::ListingNotFound {
                        id: image.listing_id,
                    };
                }
            }
            db_error("Database error inserting image", e)
        })?;

        Ok(StoredImage {
            id: row.try_get("id").map_err(corrupt)?,
            listing_id: image.listing_id,
            record: ImageRecord {
                image_url: image.image_url.clone(),
                storage_id: image.storage_id.clone(),
            },
        })
    }

    async fn select_listing_with_images(
        &self,
        id: ListingId,
    ) -> PersistenceResult<Vec<ListingImageRow>> {
        let sql = format!("{} WHERE l.id = $1 ORDER BY i.id", LISTING_WITH_IMAGES);

        let rows = sqlx::query(&sql)
            .bind(id.value())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_error("Database error selecting listing", e))?;

        rows.iter().map(joined_row).collect()
    }

    async fn select_listings_by_owner(
        &self,
        owner: &str,
    ) -> PersistenceResult<Vec<ListingImageRow>> {
        let sql = format!(
            r#"{} WHERE l."createdBy" = $1 ORDER BY l.id DESC, i.id"#,
            LISTING_WITH_IMAGES
        );

        let rows = sqlx::query(&sql)
            .bind(owner)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_error("Database error selecting listings", e))?;

        rows.iter().map(joined_row).collect()
    }

    async fn delete_listing(&self, id: ListingId, owner: &str) -> PersistenceResult<bool> {
        let result = sqlx::query(r#"DELETE FROM "carListing" WHERE id = $1 AND "createdBy" = $2"#)
            .bind(id.value())
            .bind(owner)
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("Database error deleting listing", e))?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_columns_are_quoted_camel_case() {
        let columns = field_columns();
        assert!(columns.starts_with("\"listingTitle\", \"tagline\""));
        assert!(columns.ends_with("\"listingDescription\""));
        assert_eq!(columns.matches(", ").count(), ListingField::ALL.len() - 1);
    }
}
