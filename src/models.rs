use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::entity::{Role, ratings, stores, users};

/// Public projection of an account; never carries the password hash.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub address: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl From<users::Model> for Account {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            email: model.email,
            address: model.address,
            role: model.role,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Store {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub address: String,
    pub description: Option<String>,
    pub owner_id: i32,
    pub rating: f64,
    pub created_at: DateTime<Utc>,
}

impl From<stores::Model> for Store {
    fn from(model: stores::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            email: model.email,
            address: model.address,
            description: model.description,
            owner_id: model.owner_id,
            rating: model.rating,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Rating {
    pub id: i32,
    pub store_id: i32,
    pub user_id: i32,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ratings::Model> for Rating {
    fn from(model: ratings::Model) -> Self {
        Self {
            id: model.id,
            store_id: model.store_id,
            user_id: model.user_id,
            rating: model.rating,
            comment: model.comment,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
