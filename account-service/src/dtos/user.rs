use serde::Deserialize;
use validator::Validate;

/// Partial update. Role is deliberately not updatable through the API.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, message = "Name must not be empty"))]
    pub name: Option<String>,

    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: Option<String>,
}
