use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, ConnectionTrait, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Select,
    sea_query::{Expr, Func, SimpleExpr},
};
use validator::Validate;

use crate::{
    audit,
    dto::stores::{
        CreateStoreRequest, StoreListing, StoreOwnerSummary, StoreRatingEntry, StoreRatings,
        StoreWithOwner,
    },
    entity::{Ratings, Role, Stores, Users, ratings, stores, users},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::Store,
    response::{ApiResponse, Meta},
    routes::params::{StoreListQuery, non_empty},
    state::AppState,
};

pub struct NewStore<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub address: &'a str,
    pub description: Option<&'a str>,
    pub owner_id: i32,
}

/// Case-insensitive match on `stores.email`.
fn store_email_matches(email: &str) -> SimpleExpr {
    Expr::expr(Func::lower(Expr::col((Stores, stores::Column::Email))))
        .eq(email.trim().to_lowercase())
}

/// Insert a store with a zero rating after checking its email is free.
pub async fn insert_store<C: ConnectionTrait>(
    conn: &C,
    new_store: NewStore<'_>,
) -> AppResult<stores::Model> {
    let email = new_store.email.trim();
    let taken = Stores::find()
        .filter(store_email_matches(email))
        .count(conn)
        .await?;
    if taken > 0 {
        return Err(AppError::Conflict("Store email already registered".into()));
    }

    let now = Utc::now();
    let store = stores::ActiveModel {
        name: Set(new_store.name.trim().to_string()),
        email: Set(email.to_string()),
        address: Set(new_store.address.trim().to_string()),
        description: Set(new_store
            .description
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string)),
        owner_id: Set(new_store.owner_id),
        rating: Set(0.0),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(conn)
    .await?;

    Ok(store)
}

/// Apply exact-match filters and ordering shared by the store listings.
pub fn filtered_stores(query: &StoreListQuery) -> Select<Stores> {
    let mut condition = Condition::all();
    if let Some(name) = non_empty(&query.name) {
        condition = condition.add(stores::Column::Name.eq(name));
    }
    if let Some(email) = non_empty(&query.email) {
        condition = condition.add(stores::Column::Email.eq(email));
    }
    if let Some(address) = non_empty(&query.address) {
        condition = condition.add(stores::Column::Address.eq(address));
    }

    let sort_by = query.sort_by.unwrap_or_default();
    let order = query.order.unwrap_or_default();
    Stores::find()
        .filter(condition)
        .order_by(sort_by.column(), order.as_order())
        .order_by_asc(stores::Column::Id)
}

pub async fn create_store(
    state: &AppState,
    caller: &AuthUser,
    payload: CreateStoreRequest,
) -> AppResult<ApiResponse<Store>> {
    payload.validate()?;
    match caller.role {
        Role::Admin => {}
        Role::Owner if caller.user_id == payload.owner_id => {}
        _ => return Err(AppError::Forbidden),
    }

    let owner = Users::find_by_id(payload.owner_id).one(&state.orm).await?;
    match owner {
        Some(o) if o.role == Role::Owner => {}
        _ => {
            return Err(AppError::BadRequest(
                "Owner not found or not a store owner".into(),
            ));
        }
    }

    let store = insert_store(
        &state.orm,
        NewStore {
            name: &payload.name,
            email: &payload.email,
            address: &payload.address,
            description: payload.description.as_deref(),
            owner_id: payload.owner_id,
        },
    )
    .await?;
    tracing::info!(store_id = store.id, owner_id = store.owner_id, "store created");

    audit::record(
        state,
        Some(caller.user_id),
        "store_create",
        "stores",
        serde_json::json!({ "store_id": store.id, "owner_id": store.owner_id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Store added",
        Store::from(store),
        Some(Meta::empty()),
    ))
}

pub async fn list_stores(
    state: &AppState,
    query: StoreListQuery,
) -> AppResult<ApiResponse<StoreListing>> {
    let rows = filtered_stores(&query)
        .find_also_related(Users)
        .all(&state.orm)
        .await?;

    let stores: Vec<StoreWithOwner> = rows
        .into_iter()
        .map(|(store, owner)| StoreWithOwner {
            store: Store::from(store),
            owner: owner.map(owner_summary),
        })
        .collect();

    let total = stores.len() as u64;
    Ok(ApiResponse::success(
        "Stores",
        StoreListing { stores },
        Some(Meta::with_total(total)),
    ))
}

pub async fn list_store_ratings(
    state: &AppState,
    store_id: i32,
) -> AppResult<ApiResponse<StoreRatings>> {
    let store = Stores::find_by_id(store_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound("Store"))?;

    let ratings: Vec<StoreRatingEntry> = Ratings::find()
        .filter(ratings::Column::StoreId.eq(store.id))
        .order_by_desc(ratings::Column::UpdatedAt)
        .find_also_related(Users)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|(rating, user)| StoreRatingEntry {
            id: rating.id,
            user_id: rating.user_id,
            user_name: user.map(|u| u.name),
            rating: rating.rating,
            comment: rating.comment,
        })
        .collect();

    let total = ratings.len() as u64;
    Ok(ApiResponse::success(
        "Store ratings",
        StoreRatings {
            ratings,
            avg_rating: store.rating,
        },
        Some(Meta::with_total(total)),
    ))
}

fn owner_summary(model: users::Model) -> StoreOwnerSummary {
    StoreOwnerSummary {
        id: model.id,
        name: model.name,
        email: model.email,
    }
}
