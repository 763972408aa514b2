use serde::Serialize;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::cars::repo::Car;

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: Uuid,
    pub car_id: Uuid,
    pub rating: i32,
    pub comment: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// A validated review ready for insertion.
#[derive(Debug, Clone)]
pub struct NewReview {
    pub car_id: Uuid,
    pub rating: i32,
    pub comment: String,
}

/// Flat row for the review/car LEFT JOIN. Car columns are nullable:
/// a review whose car was deleted still resolves, with no car attached.
#[derive(Debug, FromRow)]
struct EnrichedRow {
    id: Uuid,
    car_id: Uuid,
    rating: i32,
    comment: String,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
    car_pk: Option<Uuid>,
    car_brand: Option<String>,
    car_model: Option<String>,
    car_year: Option<i32>,
    car_price: Option<f64>,
    car_mileage: Option<f64>,
    car_color: Option<String>,
    car_transmission: Option<String>,
    car_fuel: Option<String>,
    car_description: Option<String>,
    car_created_at: Option<OffsetDateTime>,
    car_updated_at: Option<OffsetDateTime>,
}

impl EnrichedRow {
    fn into_pair(self) -> (Review, Option<Car>) {
        let car = match (self.car_pk, self.car_created_at, self.car_updated_at) {
            (Some(id), Some(created_at), Some(updated_at)) => Some(Car {
                id,
                brand: self.car_brand.unwrap_or_default(),
                model: self.car_model.unwrap_or_default(),
                year: self.car_year.unwrap_or_default(),
                price: self.car_price.unwrap_or_default(),
                mileage: self.car_mileage,
                color: self.car_color.unwrap_or_default(),
                transmission: self.car_transmission.unwrap_or_default(),
                fuel: self.car_fuel.unwrap_or_default(),
                description: self.car_description.unwrap_or_default(),
                created_at,
                updated_at,
            }),
            _ => None,
        };
        (
            Review {
                id: self.id,
                car_id: self.car_id,
                rating: self.rating,
                comment: self.comment,
                created_at: self.created_at,
                updated_at: self.updated_at,
            },
            car,
        )
    }
}

const ENRICHED_SELECT: &str = r#"
    SELECT r.id, r.car_id, r.rating, r.comment, r.created_at, r.updated_at,
           c.id AS car_pk, c.brand AS car_brand, c.model AS car_model,
           c.year AS car_year, c.price AS car_price, c.mileage AS car_mileage,
           c.color AS car_color, c.transmission AS car_transmission,
           c.fuel AS car_fuel, c.description AS car_description,
           c.created_at AS car_created_at, c.updated_at AS car_updated_at
    FROM reviews r
    LEFT JOIN cars c ON c.id = r.car_id
"#;

/// All reviews, newest first, each joined with its car's current state.
pub async fn list_all_enriched(db: &PgPool) -> anyhow::Result<Vec<(Review, Option<Car>)>> {
    let rows = sqlx::query_as::<_, EnrichedRow>(&format!(
        "{ENRICHED_SELECT} ORDER BY r.created_at DESC"
    ))
    .fetch_all(db)
    .await?;
    Ok(rows.into_iter().map(EnrichedRow::into_pair).collect())
}

pub async fn find_enriched(
    db: &PgPool,
    id: Uuid,
) -> anyhow::Result<Option<(Review, Option<Car>)>> {
    let row = sqlx::query_as::<_, EnrichedRow>(&format!("{ENRICHED_SELECT} WHERE r.id = $1"))
        .bind(id)
        .fetch_optional(db)
        .await?;
    Ok(row.map(EnrichedRow::into_pair))
}

pub async fn insert(db: &PgPool, new: NewReview) -> anyhow::Result<Review> {
    let review = sqlx::query_as::<_, Review>(
        r#"
        INSERT INTO reviews (car_id, rating, comment)
        VALUES ($1, $2, $3)
        RETURNING id, car_id, rating, comment, created_at, updated_at
        "#,
    )
    .bind(new.car_id)
    .bind(new.rating)
    .bind(new.comment)
    .fetch_one(db)
    .await?;
    Ok(review)
}

/// Update only the supplied fields; car_id is immutable after creation.
pub async fn update_partial(
    db: &PgPool,
    id: Uuid,
    rating: Option<i32>,
    comment: Option<String>,
) -> anyhow::Result<Option<Review>> {
    let review = sqlx::query_as::<_, Review>(
        r#"
        UPDATE reviews
        SET rating = COALESCE($2, rating),
            comment = COALESCE($3, comment),
            updated_at = now()
        WHERE id = $1
        RETURNING id, car_id, rating, comment, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(rating)
    .bind(comment)
    .fetch_optional(db)
    .await?;
    Ok(review)
}

/// Hard delete. Returns false when no record matched.
pub async fn delete(db: &PgPool, id: Uuid) -> anyhow::Result<bool> {
    let deleted = sqlx::query("DELETE FROM reviews WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;
    Ok(deleted.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn orphaned_row() -> EnrichedRow {
        EnrichedRow {
            id: Uuid::new_v4(),
            car_id: Uuid::new_v4(),
            rating: 4,
            comment: "Solid ride".into(),
            created_at: OffsetDateTime::UNIX_EPOCH,
            updated_at: OffsetDateTime::UNIX_EPOCH,
            car_pk: None,
            car_brand: None,
            car_model: None,
            car_year: None,
            car_price: None,
            car_mileage: None,
            car_color: None,
            car_transmission: None,
            car_fuel: None,
            car_description: None,
            car_created_at: None,
            car_updated_at: None,
        }
    }

    #[test]
    fn deleted_car_leaves_review_resolvable_without_a_car() {
        let row = orphaned_row();
        let car_id = row.car_id;
        let (review, car) = row.into_pair();
        assert!(car.is_none());
        assert_eq!(review.car_id, car_id);
        assert_eq!(review.rating, 4);
        assert_eq!(review.comment, "Solid ride");
    }

    #[test]
    fn joined_row_carries_the_cars_current_state() {
        let car_id = Uuid::new_v4();
        let mut row = orphaned_row();
        row.car_id = car_id;
        row.car_pk = Some(car_id);
        row.car_brand = Some("Toyota".into());
        row.car_model = Some("Camry".into());
        row.car_year = Some(2022);
        row.car_price = Some(25000.0);
        row.car_color = Some("red".into());
        row.car_transmission = Some("automatic".into());
        row.car_fuel = Some("petrol".into());
        row.car_description = Some(String::new());
        row.car_created_at = Some(OffsetDateTime::UNIX_EPOCH);
        row.car_updated_at = Some(OffsetDateTime::UNIX_EPOCH);

        let (review, car) = row.into_pair();
        let car = car.expect("joined row should carry a car");
        assert_eq!(car.id, review.car_id);
        assert_eq!(car.brand, "Toyota");
        assert_eq!(car.year, 2022);
    }
}
