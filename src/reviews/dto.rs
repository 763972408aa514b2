use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::cars::repo::Car;
use crate::reviews::repo::{NewReview, Review};

pub const RATING_MIN: i32 = 1;
pub const RATING_MAX: i32 = 5;
pub const COMMENT_MIN_LEN: usize = 2;

/// Body for POST /reviews. Fields optional at the serde level so every
/// violation lands in one `details` array instead of failing one by one.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateReviewRequest {
    pub car_id: Option<String>,
    pub rating: Option<i32>,
    pub comment: Option<String>,
}

/// Body for PUT /reviews/:id. carId is not listed: it is immutable, and
/// unknown fields are rejected outright.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateReviewRequest {
    pub rating: Option<i32>,
    pub comment: Option<String>,
}

/// Review as served to clients: enriched with the referenced car's state
/// at read time, `null` when the car has since been deleted.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewResponse {
    pub id: Uuid,
    pub car_id: Uuid,
    pub rating: i32,
    pub comment: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    pub car: Option<Car>,
}

impl From<(Review, Option<Car>)> for ReviewResponse {
    fn from((review, car): (Review, Option<Car>)) -> Self {
        Self {
            id: review.id,
            car_id: review.car_id,
            rating: review.rating,
            comment: review.comment,
            created_at: review.created_at,
            updated_at: review.updated_at,
            car,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ReviewsListResponse {
    pub count: usize,
    pub reviews: Vec<ReviewResponse>,
}

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub message: String,
}

fn rating_in_range(rating: i32) -> bool {
    (RATING_MIN..=RATING_MAX).contains(&rating)
}

impl CreateReviewRequest {
    /// Field-level validation. Car existence is a separate, later check
    /// against the catalog.
    pub fn validate(self) -> Result<NewReview, Vec<String>> {
        let mut errors = Vec::new();

        let car_id = match self.car_id.as_deref() {
            None => {
                errors.push("carId is required".to_string());
                None
            }
            Some(raw) => match Uuid::parse_str(raw) {
                Ok(id) => Some(id),
                Err(_) => {
                    errors.push("carId is not a valid id".to_string());
                    None
                }
            },
        };

        match self.rating {
            Some(r) if rating_in_range(r) => {}
            _ => errors.push(format!(
                "rating must be between {RATING_MIN} and {RATING_MAX}"
            )),
        }

        let comment = self.comment.as_deref().map(str::trim).unwrap_or("");
        if comment.chars().count() < COMMENT_MIN_LEN {
            errors.push(format!(
                "comment is required (min {COMMENT_MIN_LEN} chars)"
            ));
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(NewReview {
            car_id: car_id.unwrap_or_default(),
            rating: self.rating.unwrap_or_default(),
            comment: comment.to_string(),
        })
    }
}

impl UpdateReviewRequest {
    /// Validate only the supplied fields; absent ones stay untouched.
    pub fn validate(self) -> Result<(Option<i32>, Option<String>), Vec<String>> {
        let mut errors = Vec::new();

        if let Some(r) = self.rating {
            if !rating_in_range(r) {
                errors.push(format!(
                    "rating must be between {RATING_MIN} and {RATING_MAX}"
                ));
            }
        }

        let comment = self.comment.map(|c| c.trim().to_string());
        if let Some(c) = &comment {
            if c.chars().count() < COMMENT_MIN_LEN {
                errors.push(format!("comment must be at least {COMMENT_MIN_LEN} chars"));
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok((self.rating, comment))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_request() -> CreateReviewRequest {
        CreateReviewRequest {
            car_id: Some(Uuid::new_v4().to_string()),
            rating: Some(5),
            comment: Some("Great car".into()),
        }
    }

    #[test]
    fn valid_review_passes_and_trims_comment() {
        let mut req = valid_request();
        req.comment = Some("  Great car  ".into());
        let new = req.validate().expect("should validate");
        assert_eq!(new.comment, "Great car");
        assert_eq!(new.rating, 5);
    }

    #[test]
    fn bad_rating_and_short_comment_are_both_reported() {
        let req = CreateReviewRequest {
            car_id: Some(Uuid::new_v4().to_string()),
            rating: Some(9),
            comment: Some("x".into()),
        };
        let errors = req.validate().unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors.contains(&"rating must be between 1 and 5".to_string()));
        assert!(errors.contains(&"comment is required (min 2 chars)".to_string()));
    }

    #[test]
    fn missing_car_id_is_reported() {
        let mut req = valid_request();
        req.car_id = None;
        let errors = req.validate().unwrap_err();
        assert_eq!(errors, vec!["carId is required".to_string()]);
    }

    #[test]
    fn malformed_car_id_is_reported() {
        let mut req = valid_request();
        req.car_id = Some("not-a-uuid".into());
        let errors = req.validate().unwrap_err();
        assert_eq!(errors, vec!["carId is not a valid id".to_string()]);
    }

    #[test]
    fn rating_bounds_are_inclusive() {
        for rating in [1, 5] {
            let mut req = valid_request();
            req.rating = Some(rating);
            assert!(req.validate().is_ok(), "rating {rating} should pass");
        }
        for rating in [0, 6] {
            let mut req = valid_request();
            req.rating = Some(rating);
            assert!(req.validate().is_err(), "rating {rating} should fail");
        }
    }

    #[test]
    fn whitespace_only_comment_fails_length_check() {
        let mut req = valid_request();
        req.comment = Some("  a  ".into());
        assert!(req.validate().is_err());
    }

    #[test]
    fn update_validates_only_supplied_fields() {
        let req = UpdateReviewRequest {
            rating: Some(3),
            comment: None,
        };
        let (rating, comment) = req.validate().expect("should validate");
        assert_eq!(rating, Some(3));
        assert_eq!(comment, None);
    }

    #[test]
    fn update_rejects_out_of_range_rating() {
        let req = UpdateReviewRequest {
            rating: Some(0),
            comment: Some("fine".into()),
        };
        let errors = req.validate().unwrap_err();
        assert_eq!(errors, vec!["rating must be between 1 and 5".to_string()]);
    }

    #[test]
    fn orphaned_review_serializes_null_car() {
        let review = Review {
            id: Uuid::new_v4(),
            car_id: Uuid::new_v4(),
            rating: 5,
            comment: "Great car".into(),
            created_at: OffsetDateTime::UNIX_EPOCH,
            updated_at: OffsetDateTime::UNIX_EPOCH,
        };
        let car_id = review.car_id;
        let json = serde_json::to_value(ReviewResponse::from((review, None))).unwrap();
        assert!(json["car"].is_null());
        assert_eq!(json["carId"], car_id.to_string());
        assert_eq!(json["rating"], 5);
    }

    #[test]
    fn update_cannot_touch_car_id() {
        let err = serde_json::from_str::<UpdateReviewRequest>(
            r#"{"rating":4,"carId":"00000000-0000-0000-0000-000000000000"}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("carId"));
    }
}
