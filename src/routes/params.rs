use sea_orm::Order;
use serde::{
    Deserialize, Deserializer,
    de::{IntoDeserializer, value::StrDeserializer},
};
use utoipa::ToSchema;

use crate::entity::{Role, stores, users};

#[derive(Debug, Default, Clone, Copy, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_order(&self) -> Order {
        match self {
            SortOrder::Asc => Order::Asc,
            SortOrder::Desc => Order::Desc,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum UserSortBy {
    #[default]
    Name,
    Email,
    Address,
    Role,
    CreatedAt,
}

impl UserSortBy {
    pub fn column(&self) -> users::Column {
        match self {
            UserSortBy::Name => users::Column::Name,
            UserSortBy::Email => users::Column::Email,
            UserSortBy::Address => users::Column::Address,
            UserSortBy::Role => users::Column::Role,
            UserSortBy::CreatedAt => users::Column::CreatedAt,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum StoreSortBy {
    #[default]
    Name,
    Email,
    Address,
    Rating,
    CreatedAt,
}

impl StoreSortBy {
    pub fn column(&self) -> stores::Column {
        match self {
            StoreSortBy::Name => stores::Column::Name,
            StoreSortBy::Email => stores::Column::Email,
            StoreSortBy::Address => stores::Column::Address,
            StoreSortBy::Rating => stores::Column::Rating,
            StoreSortBy::CreatedAt => stores::Column::CreatedAt,
        }
    }
}

/// Exact-match filters plus sort key for the account listing.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserListQuery {
    pub name: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub role: Option<Role>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub sort_by: Option<UserSortBy>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub order: Option<SortOrder>,
}

/// Exact-match filters plus sort key for store listings.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoreListQuery {
    pub name: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub sort_by: Option<StoreSortBy>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub order: Option<SortOrder>,
}

/// Treat `?name=` the same as an absent filter.
pub fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Parse an enum-valued query parameter, treating `?role=` as absent.
fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => {
            let value: StrDeserializer<'_, D::Error> = value.into_deserializer();
            T::deserialize(value).map(Some)
        }
    }
}
