use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};

use crate::{
    dto::admin::{
        AddStoreRequest, AdminRegisterRequest, DashboardStats, StoreList, StoreWithNewOwner,
        UserDetails, UserList,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::Account,
    response::ApiResponse,
    routes::extract::{ApiJson, ApiPath, ApiQuery},
    routes::params::{StoreListQuery, UserListQuery},
    services::admin_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard))
        .route("/users", get(list_users))
        .route("/stores", get(list_stores))
        .route("/user/{id}", get(user_details))
        .route("/register", post(register_user))
        .route("/add-store", post(add_store))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/dashboard",
    responses(
        (status = 200, description = "Row counts for users, stores and ratings", body = ApiResponse<DashboardStats>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn dashboard(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<DashboardStats>>> {
    let resp = admin_service::dashboard(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/users",
    params(
        ("name" = Option<String>, Query, description = "Exact name"),
        ("email" = Option<String>, Query, description = "Exact email"),
        ("address" = Option<String>, Query, description = "Exact address"),
        ("role" = Option<String>, Query, description = "admin, user, owner (store-owner accepted)"),
        ("sortBy" = Option<String>, Query, description = "name, email, address, role, createdAt"),
        ("order" = Option<String>, Query, description = "asc, desc")
    ),
    responses(
        (status = 200, description = "Filtered accounts", body = ApiResponse<UserList>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_users(
    State(state): State<AppState>,
    user: AuthUser,
    ApiQuery(query): ApiQuery<UserListQuery>,
) -> AppResult<Json<ApiResponse<UserList>>> {
    let resp = admin_service::list_users(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/stores",
    params(
        ("name" = Option<String>, Query, description = "Exact name"),
        ("email" = Option<String>, Query, description = "Exact email"),
        ("address" = Option<String>, Query, description = "Exact address"),
        ("sortBy" = Option<String>, Query, description = "name, email, address, rating, createdAt"),
        ("order" = Option<String>, Query, description = "asc, desc")
    ),
    responses(
        (status = 200, description = "Filtered stores", body = ApiResponse<StoreList>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_stores(
    State(state): State<AppState>,
    user: AuthUser,
    ApiQuery(query): ApiQuery<StoreListQuery>,
) -> AppResult<Json<ApiResponse<StoreList>>> {
    let resp = admin_service::list_stores(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/user/{id}",
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Account with owned store ratings", body = ApiResponse<UserDetails>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn user_details(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(id): ApiPath<i32>,
) -> AppResult<Json<ApiResponse<UserDetails>>> {
    let resp = admin_service::user_details(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/register",
    request_body = AdminRegisterRequest,
    responses(
        (status = 201, description = "Account created", body = ApiResponse<Account>),
        (status = 400, description = "Validation failed"),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Email already registered")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn register_user(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(payload): ApiJson<AdminRegisterRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Account>>)> {
    let resp = admin_service::register_user(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/add-store",
    request_body = AddStoreRequest,
    responses(
        (status = 201, description = "Store and owner created", body = ApiResponse<StoreWithNewOwner>),
        (status = 400, description = "Validation failed"),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Email already registered")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn add_store(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(payload): ApiJson<AddStoreRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<StoreWithNewOwner>>)> {
    let resp = admin_service::add_store(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}
