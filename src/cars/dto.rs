use serde::{Deserialize, Serialize};

use crate::cars::repo::{Car, NewCar};

pub const YEAR_MIN: i32 = 1950;
pub const YEAR_MAX: i32 = 2100;

/// Body for POST /cars. Every field optional at the serde level so that
/// validation can report all missing/invalid fields in one response.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateCarRequest {
    pub brand: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    pub price: Option<f64>,
    pub mileage: Option<f64>,
    pub color: Option<String>,
    pub transmission: Option<String>,
    pub fuel: Option<String>,
    pub description: Option<String>,
}

/// Body for PUT /cars/:id. Absent fields keep their current value.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateCarRequest {
    pub brand: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    pub price: Option<f64>,
    pub mileage: Option<f64>,
    pub color: Option<String>,
    pub transmission: Option<String>,
    pub fuel: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CarsListResponse {
    pub count: usize,
    pub cars: Vec<Car>,
}

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub message: String,
}

impl CreateCarRequest {
    /// Check every constraint and report all violations together.
    pub fn validate(self) -> Result<NewCar, Vec<String>> {
        let mut errors = Vec::new();

        let brand = trimmed_required(self.brand.as_deref());
        if brand.is_none() {
            errors.push("brand is required".to_string());
        }
        let model = trimmed_required(self.model.as_deref());
        if model.is_none() {
            errors.push("model is required".to_string());
        }

        match self.year {
            None => errors.push("year is required".to_string()),
            Some(y) if !(YEAR_MIN..=YEAR_MAX).contains(&y) => {
                errors.push(format!("year must be between {YEAR_MIN} and {YEAR_MAX}"));
            }
            Some(_) => {}
        }

        match self.price {
            None => errors.push("price is required".to_string()),
            Some(p) if p < 0.0 => errors.push("price must be >= 0".to_string()),
            Some(_) => {}
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(NewCar {
            brand: brand.unwrap_or_default(),
            model: model.unwrap_or_default(),
            year: self.year.unwrap_or_default(),
            price: self.price.unwrap_or_default(),
            mileage: self.mileage,
            color: trimmed_or_empty(self.color),
            transmission: trimmed_or_empty(self.transmission),
            fuel: trimmed_or_empty(self.fuel),
            description: trimmed_or_empty(self.description),
        })
    }
}

impl UpdateCarRequest {
    /// Merge supplied fields into the current record, then re-validate the
    /// merged result against the same invariants as creation.
    pub fn merge_into(self, current: &Car) -> Result<NewCar, Vec<String>> {
        let mut errors = Vec::new();

        let brand = match self.brand {
            Some(b) => match trimmed_required(Some(&b)) {
                Some(b) => b,
                None => {
                    errors.push("brand is required".to_string());
                    String::new()
                }
            },
            None => current.brand.clone(),
        };
        let model = match self.model {
            Some(m) => match trimmed_required(Some(&m)) {
                Some(m) => m,
                None => {
                    errors.push("model is required".to_string());
                    String::new()
                }
            },
            None => current.model.clone(),
        };

        let year = self.year.unwrap_or(current.year);
        if !(YEAR_MIN..=YEAR_MAX).contains(&year) {
            errors.push(format!("year must be between {YEAR_MIN} and {YEAR_MAX}"));
        }

        let price = self.price.unwrap_or(current.price);
        if price < 0.0 {
            errors.push("price must be >= 0".to_string());
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(NewCar {
            brand,
            model,
            year,
            price,
            mileage: self.mileage.or(current.mileage),
            color: self
                .color
                .map(|v| v.trim().to_string())
                .unwrap_or_else(|| current.color.clone()),
            transmission: self
                .transmission
                .map(|v| v.trim().to_string())
                .unwrap_or_else(|| current.transmission.clone()),
            fuel: self
                .fuel
                .map(|v| v.trim().to_string())
                .unwrap_or_else(|| current.fuel.clone()),
            description: self
                .description
                .map(|v| v.trim().to_string())
                .unwrap_or_else(|| current.description.clone()),
        })
    }
}

fn trimmed_required(value: Option<&str>) -> Option<String> {
    let trimmed = value?.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn trimmed_or_empty(value: Option<String>) -> String {
    value.map(|v| v.trim().to_string()).unwrap_or_default()
}
