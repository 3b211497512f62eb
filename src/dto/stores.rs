use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::Store;

#[derive(Deserialize, Debug, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateStoreRequest {
    #[validate(length(min = 1, max = 60, message = "Name must be 1-60 characters"))]
    pub name: String,
    #[validate(email(message = "Invalid email"))]
    pub email: String,
    #[validate(length(min = 1, max = 400, message = "Address must be 1-400 characters"))]
    pub address: String,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    pub owner_id: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StoreOwnerSummary {
    pub id: i32,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StoreWithOwner {
    #[serde(flatten)]
    pub store: Store,
    pub owner: Option<StoreOwnerSummary>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StoreListing {
    pub stores: Vec<StoreWithOwner>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoreRatingEntry {
    pub id: i32,
    pub user_id: i32,
    pub user_name: Option<String>,
    pub rating: i32,
    pub comment: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoreRatings {
    pub ratings: Vec<StoreRatingEntry>,
    pub avg_rating: f64,
}
