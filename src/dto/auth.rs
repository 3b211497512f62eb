use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::{entity::Role, models::Account};

#[derive(Deserialize, Debug, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(length(min = 20, max = 60, message = "Name must be 20-60 characters"))]
    pub name: String,
    #[validate(email(message = "Invalid email"))]
    pub email: String,
    #[validate(length(max = 400, message = "Address must be at most 400 characters"))]
    pub address: String,
    #[validate(custom(function = "validate_password_strength"))]
    pub password: String,
    /// `user` when omitted; `admin` is rejected.
    pub role: Option<Role>,
}

#[derive(Deserialize, Debug, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub user: Account,
}

#[derive(Deserialize, Debug, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePasswordRequest {
    pub user_id: i32,
    #[validate(length(min = 1, message = "Old password is required"))]
    pub old_password: String,
    #[validate(custom(function = "validate_password_strength"))]
    pub new_password: String,
}

#[derive(Deserialize, Debug, Default, Validate, ToSchema)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 60))]
    pub name: Option<String>,
    #[validate(email(message = "Invalid email"))]
    pub email: Option<String>,
    #[validate(length(max = 400))]
    pub address: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct Claims {
    pub sub: String,
    pub role: Role,
    pub iat: usize,
    pub exp: usize,
}

/// 8-16 characters with at least one uppercase letter and one symbol.
pub fn validate_password_strength(password: &str) -> Result<(), ValidationError> {
    let len = password.chars().count();
    if !(8..=16).contains(&len) {
        return Err(ValidationError::new("length")
            .with_message("Password must be 8-16 characters".into()));
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(ValidationError::new("uppercase")
            .with_message("Must include uppercase letter".into()));
    }
    if password.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ValidationError::new("special")
            .with_message("Must include special character".into()));
    }
    Ok(())
}
