use sea_orm::{
    ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    TransactionTrait,
};
use validator::Validate;

use crate::{
    audit,
    dto::admin::{
        AddStoreRequest, AdminRegisterRequest, AdminStoreEntry, DashboardStats, OwnerStoreRating,
        StoreWithNewOwner, StoreList, UserDetails, UserList,
    },
    entity::{Ratings, Role, Stores, Users, stores, users},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{Account, Store},
    response::{ApiResponse, Meta},
    routes::params::{StoreListQuery, UserListQuery, non_empty},
    services::{
        auth_service::{create_account, find_by_email},
        store_service::{NewStore, filtered_stores, insert_store},
    },
    state::AppState,
};

pub async fn dashboard(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<DashboardStats>> {
    ensure_admin(user)?;

    let stats = DashboardStats {
        users: Users::find().count(&state.orm).await?,
        stores: Stores::find().count(&state.orm).await?,
        ratings: Ratings::find().count(&state.orm).await?,
    };
    Ok(ApiResponse::success("Dashboard", stats, Some(Meta::empty())))
}

pub async fn list_users(
    state: &AppState,
    user: &AuthUser,
    query: UserListQuery,
) -> AppResult<ApiResponse<UserList>> {
    ensure_admin(user)?;

    let mut condition = Condition::all();
    if let Some(name) = non_empty(&query.name) {
        condition = condition.add(users::Column::Name.eq(name));
    }
    if let Some(email) = non_empty(&query.email) {
        condition = condition.add(users::Column::Email.eq(email));
    }
    if let Some(address) = non_empty(&query.address) {
        condition = condition.add(users::Column::Address.eq(address));
    }
    if let Some(role) = query.role {
        condition = condition.add(users::Column::Role.eq(role));
    }

    let sort_by = query.sort_by.unwrap_or_default();
    let order = query.order.unwrap_or_default();
    let users: Vec<Account> = Users::find()
        .filter(condition)
        .order_by(sort_by.column(), order.as_order())
        .order_by_asc(users::Column::Id)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Account::from)
        .collect();

    let total = users.len() as u64;
    Ok(ApiResponse::success(
        "Users",
        UserList { users },
        Some(Meta::with_total(total)),
    ))
}

pub async fn list_stores(
    state: &AppState,
    user: &AuthUser,
    query: StoreListQuery,
) -> AppResult<ApiResponse<StoreList>> {
    ensure_admin(user)?;

    let stores: Vec<AdminStoreEntry> = filtered_stores(&query)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|model| AdminStoreEntry {
            avg_rating: model.rating,
            store: Store::from(model),
        })
        .collect();

    let total = stores.len() as u64;
    Ok(ApiResponse::success(
        "Stores",
        StoreList { stores },
        Some(Meta::with_total(total)),
    ))
}

pub async fn register_user(
    state: &AppState,
    user: &AuthUser,
    payload: AdminRegisterRequest,
) -> AppResult<ApiResponse<Account>> {
    ensure_admin(user)?;
    payload.validate()?;

    let created = create_account(
        &state.orm,
        &payload.name,
        &payload.email,
        &payload.password,
        &payload.address,
        payload.role,
    )
    .await?;
    tracing::info!(user_id = created.id, role = %created.role, "user registered by admin");

    audit::record(
        state,
        Some(user.user_id),
        "admin_user_register",
        "users",
        serde_json::json!({ "user_id": created.id, "role": created.role }),
    )
    .await;

    Ok(ApiResponse::success(
        "User registered",
        Account::from(created),
        Some(Meta::empty()),
    ))
}

/// Create a store and, when needed, its owner in one transaction.
pub async fn add_store(
    state: &AppState,
    user: &AuthUser,
    payload: AddStoreRequest,
) -> AppResult<ApiResponse<StoreWithNewOwner>> {
    ensure_admin(user)?;
    payload.validate()?;

    let txn = state.orm.begin().await?;

    let owner = match find_by_email(&txn, &payload.owner_email).await? {
        Some(existing) if existing.role == Role::Owner => existing,
        Some(_) => {
            return Err(AppError::BadRequest(
                "Owner email belongs to an account that is not a store owner".into(),
            ));
        }
        None => {
            create_account(
                &txn,
                &payload.owner_name,
                &payload.owner_email,
                &payload.owner_password,
                &payload.owner_address,
                Role::Owner,
            )
            .await?
        }
    };

    let store = insert_store(
        &txn,
        NewStore {
            name: &payload.name,
            email: &payload.email,
            address: &payload.address,
            description: payload.description.as_deref(),
            owner_id: owner.id,
        },
    )
    .await?;

    txn.commit().await?;
    tracing::info!(store_id = store.id, owner_id = owner.id, "store and owner created");

    audit::record(
        state,
        Some(user.user_id),
        "admin_store_create",
        "stores",
        serde_json::json!({ "store_id": store.id, "owner_id": owner.id }),
    )
    .await;

    let data = StoreWithNewOwner {
        store: Store::from(store),
        owner: Account::from(owner),
    };
    Ok(ApiResponse::success(
        "Store and owner created",
        data,
        Some(Meta::empty()),
    ))
}

pub async fn user_details(
    state: &AppState,
    user: &AuthUser,
    id: i32,
) -> AppResult<ApiResponse<UserDetails>> {
    ensure_admin(user)?;

    let account = Users::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound("User"))?;

    let owner_rating = if account.role == Role::Owner {
        let owned = Stores::find()
            .filter(stores::Column::OwnerId.eq(account.id))
            .order_by_asc(stores::Column::Id)
            .all(&state.orm)
            .await?
            .into_iter()
            .map(|s| OwnerStoreRating {
                store_id: s.id,
                avg_rating: s.rating,
            })
            .collect();
        Some(owned)
    } else {
        None
    };

    Ok(ApiResponse::success(
        "User details",
        UserDetails {
            user: Account::from(account),
            owner_rating,
        },
        Some(Meta::empty()),
    ))
}
