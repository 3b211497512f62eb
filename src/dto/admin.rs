use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    dto::auth::validate_password_strength,
    entity::Role,
    models::{Account, Store},
};

#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardStats {
    pub users: u64,
    pub stores: u64,
    pub ratings: u64,
}

#[derive(Deserialize, Debug, Validate, ToSchema)]
pub struct AdminRegisterRequest {
    #[validate(length(min = 1, max = 60, message = "Name must be 1-60 characters"))]
    pub name: String,
    #[validate(email(message = "Invalid email"))]
    pub email: String,
    #[validate(custom(function = "validate_password_strength"))]
    pub password: String,
    #[validate(length(min = 1, max = 400, message = "Address must be 1-400 characters"))]
    pub address: String,
    pub role: Role,
}

#[derive(Deserialize, Debug, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddStoreRequest {
    #[validate(length(min = 1, max = 60, message = "Name must be 1-60 characters"))]
    pub name: String,
    #[validate(email(message = "Invalid email"))]
    pub email: String,
    #[validate(length(min = 1, max = 400, message = "Address must be 1-400 characters"))]
    pub address: String,
    pub description: Option<String>,
    #[validate(length(min = 1, max = 60, message = "Owner name must be 1-60 characters"))]
    pub owner_name: String,
    #[validate(email(message = "Invalid owner email"))]
    pub owner_email: String,
    #[validate(custom(function = "validate_password_strength"))]
    pub owner_password: String,
    #[validate(length(min = 1, max = 400, message = "Owner address must be 1-400 characters"))]
    pub owner_address: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StoreWithNewOwner {
    pub store: Store,
    pub owner: Account,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserList {
    pub users: Vec<Account>,
}

/// Store row plus `avgRating`, the name older dashboards read.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminStoreEntry {
    #[serde(flatten)]
    pub store: Store,
    pub avg_rating: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StoreList {
    pub stores: Vec<AdminStoreEntry>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OwnerStoreRating {
    pub store_id: i32,
    pub avg_rating: f64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserDetails {
    pub user: Account,
    /// Present only for owners.
    pub owner_rating: Option<Vec<OwnerStoreRating>>,
}
