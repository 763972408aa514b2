use serde::Serialize;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// Car listing as persisted. Field names follow the wire contract
/// (camelCase) on serialization.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Car {
    pub id: Uuid,
    pub brand: String,
    pub model: String,
    pub year: i32,
    pub price: f64,
    pub mileage: Option<f64>,
    pub color: String,
    pub transmission: String,
    pub fuel: String,
    pub description: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// A validated car ready for insertion.
#[derive(Debug, Clone)]
pub struct NewCar {
    pub brand: String,
    pub model: String,
    pub year: i32,
    pub price: f64,
    pub mileage: Option<f64>,
    pub color: String,
    pub transmission: String,
    pub fuel: String,
    pub description: String,
}

const CAR_COLUMNS: &str =
    "id, brand, model, year, price, mileage, color, transmission, fuel, description, \
     created_at, updated_at";

pub async fn list_all(db: &PgPool) -> anyhow::Result<Vec<Car>> {
    let cars = sqlx::query_as::<_, Car>(&format!(
        "SELECT {CAR_COLUMNS} FROM cars ORDER BY created_at DESC"
    ))
    .fetch_all(db)
    .await?;
    Ok(cars)
}

pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Car>> {
    let car = sqlx::query_as::<_, Car>(&format!("SELECT {CAR_COLUMNS} FROM cars WHERE id = $1"))
        .bind(id)
        .fetch_optional(db)
        .await?;
    Ok(car)
}

pub async fn insert(db: &PgPool, new: NewCar) -> anyhow::Result<Car> {
    let car = sqlx::query_as::<_, Car>(&format!(
        r#"
        INSERT INTO cars (brand, model, year, price, mileage, color, transmission, fuel, description)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING {CAR_COLUMNS}
        "#
    ))
    .bind(new.brand)
    .bind(new.model)
    .bind(new.year)
    .bind(new.price)
    .bind(new.mileage)
    .bind(new.color)
    .bind(new.transmission)
    .bind(new.fuel)
    .bind(new.description)
    .fetch_one(db)
    .await?;
    Ok(car)
}

/// Replace every mutable field of an existing car. The caller merges
/// partial input into the current record first; last writer wins.
pub async fn update(db: &PgPool, id: Uuid, merged: NewCar) -> anyhow::Result<Option<Car>> {
    let car = sqlx::query_as::<_, Car>(&format!(
        r#"
        UPDATE cars
        SET brand = $2, model = $3, year = $4, price = $5, mileage = $6,
            color = $7, transmission = $8, fuel = $9, description = $10,
            updated_at = now()
        WHERE id = $1
        RETURNING {CAR_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(merged.brand)
    .bind(merged.model)
    .bind(merged.year)
    .bind(merged.price)
    .bind(merged.mileage)
    .bind(merged.color)
    .bind(merged.transmission)
    .bind(merged.fuel)
    .bind(merged.description)
    .fetch_optional(db)
    .await?;
    Ok(car)
}

/// Hard delete. Returns false when no record matched.
pub async fn delete(db: &PgPool, id: Uuid) -> anyhow::Result<bool> {
    let deleted = sqlx::query("DELETE FROM cars WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;
    Ok(deleted.rows_affected() > 0)
}
