use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct RecommendationRequest {
    #[validate(length(min = 1, message = "Gender is required"))]
    pub gender: String,

    #[validate(length(min = 1, message = "Category is required"))]
    pub category: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RecommendationResponse {
    pub status: String,
    pub data: String,
}
